//! Sitemap generation.
//!
//! Two passes: the builder first reads the page tree and the configured
//! object sources into plain values ([`SitemapTree`] or a list of
//! [`FeedEntry`]), then those values are serialized.
//!
//! The HTML sitemap is a depth-first walk. Root pages come in `sort` order,
//! deeper levels in `id` order, and object listings attached to a page come
//! before that page's own children, highest priority first.
//!
//! The XML sitemap is flat: indexable root pages plus every record of every
//! configured object source, highest priority first.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/about/</loc>
//!     <lastmod>2025-01-01T00:00:00Z</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.50</priority>
//!   </url>
//! </urlset>
//! ```

use crate::config::{AuxiliarySource, SitemapConfig};
use crate::error::{DataError, Result, SitemapError};
use crate::markup::{escape_html, escape_xml};
use crate::model::{ChangeFrequency, ObjectRecord, Page, Priority, Robots};
use crate::store::{ContentStore, ObjectField, OrderBy, PageField, PageQuery, SourceId};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapTree {
    pub roots: Vec<SitemapNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapNode {
    pub page_id: i64,
    pub title: String,
    /// Site-relative link, e.g. `/about/team/`.
    pub link: String,
    pub listings: Vec<ObjectListing>,
    pub children: Vec<SitemapNode>,
}

/// Records of one object source attached under a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectListing {
    pub source: String,
    pub items: Vec<ObjectLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLink {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub link: String,
    pub last_modified: Option<i64>,
    pub change_frequency: ChangeFrequency,
    pub priority: Priority,
}

struct ResolvedSource {
    id: SourceId,
    config: AuxiliarySource,
}

pub struct SitemapBuilder<'a, S: ContentStore> {
    store: &'a S,
    sources: Vec<ResolvedSource>,
    exclude_classes: Vec<String>,
    base_url: String,
}

impl<'a, S: ContentStore> SitemapBuilder<'a, S> {
    /// Resolves every configured object source against the store up front,
    /// so an unknown source name fails here rather than mid-render.
    pub fn new(store: &'a S, config: &SitemapConfig) -> Result<Self> {
        let sources = config
            .objects
            .iter()
            .map(|source| {
                Ok(ResolvedSource {
                    id: store.resolve_source(&source.name)?,
                    config: source.clone(),
                })
            })
            .collect::<std::result::Result<Vec<_>, DataError>>()?;

        Ok(Self {
            store,
            sources,
            exclude_classes: config.exclude_classes.clone(),
            base_url: config.resolved_base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn render_html(&self) -> Result<String> {
        let tree = self.build_tree()?;
        let html = tree.to_html(&self.base_url);
        info!("Rendered HTML sitemap with {} links", tree.anchor_count());
        Ok(html)
    }

    pub fn render_xml(&self) -> Result<String> {
        let entries = self.build_feed()?;
        let xml = feed_to_xml(&entries, &self.base_url);
        info!("Rendered XML sitemap with {} urls", entries.len());
        Ok(xml)
    }

    fn root_query(&self) -> PageQuery {
        PageQuery::new()
            .is_null(PageField::ParentId)
            .exclude_any(
                PageField::ClassName,
                self.exclude_classes.iter().map(String::as_str),
            )
            .exclude(PageField::Robots, Robots::NoIndexNoFollow.as_str())
            .order_by(OrderBy::asc(PageField::Sort))
    }

    /// Flat entry list for the XML sitemap, highest priority first.
    pub fn build_feed(&self) -> Result<Vec<FeedEntry>> {
        let roots = self.store.pages(&self.root_query())?;
        let mut entries: Vec<FeedEntry> = roots
            .iter()
            .map(|page| FeedEntry {
                link: page_link("", &page.url_segment),
                last_modified: page.last_edited,
                change_frequency: page.meta.change_frequency,
                priority: page.meta.priority,
            })
            .collect();

        for source in &self.sources {
            let records = self.store.objects(&source.id, None)?;
            debug!("Merging {} records from {}", records.len(), source.config.name);
            entries.extend(records.iter().map(|record| FeedEntry {
                link: object_link(source.config.prefix.as_deref(), &record.url_segment),
                last_modified: record.last_edited,
                change_frequency: record.change_frequency,
                priority: record.priority,
            }));
        }

        // Stable, so equal priorities keep fetch order.
        entries.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(entries)
    }

    pub fn build_tree(&self) -> Result<SitemapTree> {
        let roots = self.store.pages(&self.root_query())?;
        let mut ancestors = HashSet::new();
        let roots = self.build_nodes(roots, "", &mut ancestors)?;
        Ok(SitemapTree { roots })
    }

    fn build_nodes(
        &self,
        pages: Vec<Page>,
        parent_link: &str,
        ancestors: &mut HashSet<i64>,
    ) -> Result<Vec<SitemapNode>> {
        pages
            .into_iter()
            .map(|page| self.build_node(page, parent_link, ancestors))
            .collect()
    }

    fn build_node(
        &self,
        page: Page,
        parent_link: &str,
        ancestors: &mut HashSet<i64>,
    ) -> Result<SitemapNode> {
        if !ancestors.insert(page.id) {
            return Err(SitemapError::Cycle(page.id));
        }

        let link = page_link(parent_link, &page.url_segment);

        let mut listings = Vec::new();
        for source in self.sources.iter().filter(|s| s.config.attaches_to(page.id)) {
            let records = self
                .store
                .objects(&source.id, Some(OrderBy::desc(ObjectField::Priority)))?;
            listings.push(ObjectListing {
                source: source.config.name.clone(),
                items: object_links(source.config.prefix.as_deref(), records),
            });
        }

        let children = self.store.children(page.id, OrderBy::asc(PageField::Id))?;
        debug!("Page {} has {} children", page.id, children.len());
        let children = self.build_nodes(children, &link, ancestors)?;

        ancestors.remove(&page.id);

        Ok(SitemapNode {
            page_id: page.id,
            title: page.title,
            link,
            listings,
            children,
        })
    }
}

impl SitemapTree {
    pub fn to_html(&self, base_url: &str) -> String {
        let mut html = String::with_capacity(4096);
        write_page_list(&mut html, &self.roots, base_url);
        html
    }

    /// Number of links the HTML rendering will contain.
    pub fn anchor_count(&self) -> usize {
        fn count(nodes: &[SitemapNode]) -> usize {
            nodes
                .iter()
                .map(|node| {
                    1 + node.listings.iter().map(|l| l.items.len()).sum::<usize>()
                        + count(&node.children)
                })
                .sum()
        }
        count(&self.roots)
    }
}

fn write_page_list(out: &mut String, nodes: &[SitemapNode], base_url: &str) {
    out.push_str("<ul>");
    for node in nodes {
        out.push_str("<li>");
        write_anchor(out, base_url, &node.link, &node.title);

        for listing in node.listings.iter().filter(|l| !l.items.is_empty()) {
            out.push_str("<ul>");
            for item in &listing.items {
                out.push_str("<li>");
                write_anchor(out, base_url, &item.link, &item.title);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }

        if !node.children.is_empty() {
            write_page_list(out, &node.children, base_url);
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

fn write_anchor(out: &mut String, base_url: &str, link: &str, title: &str) {
    out.push_str("<a href=\"");
    out.push_str(&escape_html(base_url));
    out.push_str(&escape_html(link));
    out.push_str("\">");
    out.push_str(&escape_html(title));
    out.push_str("</a>");
}

pub fn feed_to_xml(entries: &[FeedEntry], base_url: &str) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(base_url));
        xml.push_str(&escape_xml(&entry.link));
        xml.push_str("</loc>\n");
        if let Some(lastmod) = entry.last_modified.and_then(format_lastmod) {
            xml.push_str("    <lastmod>");
            xml.push_str(&lastmod);
            xml.push_str("</lastmod>\n");
        }
        xml.push_str("    <changefreq>");
        xml.push_str(entry.change_frequency.as_str());
        xml.push_str("</changefreq>\n    <priority>");
        xml.push_str(&entry.priority.to_string());
        xml.push_str("</priority>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn format_lastmod(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// `/parent/segment/` style link for a page below `parent_link`.
fn page_link(parent_link: &str, url_segment: &str) -> String {
    let parent = parent_link.trim_end_matches('/');
    let segment = url_segment.trim_matches('/');
    if segment.is_empty() {
        format!("{}/", parent)
    } else {
        format!("{}/{}/", parent, segment)
    }
}

fn object_link(prefix: Option<&str>, url_segment: &str) -> String {
    let segment = url_segment.trim_start_matches('/');
    match prefix {
        Some(prefix) => format!("/{}/{}", prefix, segment),
        None => format!("/{}", segment),
    }
}

fn object_links(prefix: Option<&str>, records: Vec<ObjectRecord>) -> Vec<ObjectLink> {
    records
        .into_iter()
        .map(|record| ObjectLink {
            link: object_link(prefix, &record.url_segment),
            title: record.title,
        })
        .collect()
}
