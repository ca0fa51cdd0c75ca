// Tests for HTML and XML sitemap generation against a real page store

use sitemapper_core::config::SitemapConfig;
use sitemapper_core::data::{Database, NewObject, NewPage};
use sitemapper_core::error::{DataError, SitemapError};
use sitemapper_core::model::{ObjectRecord, Page, PageMetadata, Priority, Robots};
use sitemapper_core::sitemap::SitemapBuilder;
use sitemapper_core::store::{
    ContentStore, Filter, ObjectField, OrderBy, PageField, PageQuery, SourceId,
};
use tempfile::TempDir;

const BASE: &str = r#""base_url": "https://example.com/""#;

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

fn config(json: &str) -> SitemapConfig {
    SitemapConfig::from_json_str(json).unwrap()
}

fn root(db: &Database, title: &str, segment: &str, sort: i64, priority: f64) -> i64 {
    let mut page = NewPage::new(title, segment);
    page.sort = sort;
    page.meta.priority = Priority::new(priority).unwrap();
    db.insert_page(&page).unwrap()
}

fn child(db: &Database, parent_id: i64, title: &str, segment: &str) -> i64 {
    let mut page = NewPage::new(title, segment);
    page.parent_id = Some(parent_id);
    db.insert_page(&page).unwrap()
}

fn object(db: &Database, source: &SourceId, title: &str, segment: &str, priority: f64) {
    let mut record = NewObject::new(title, segment);
    record.priority = Priority::new(priority).unwrap();
    db.insert_object(source, &record).unwrap();
}

fn anchor_count(html: &str) -> usize {
    html.matches("<a href=").count()
}

fn locs(xml: &str) -> Vec<&str> {
    xml.split("<loc>")
        .skip(1)
        .filter_map(|rest| rest.split("</loc>").next())
        .collect()
}

fn priorities(xml: &str) -> Vec<f64> {
    xml.split("<priority>")
        .skip(1)
        .filter_map(|rest| rest.split("</priority>").next())
        .map(|p| p.parse().unwrap())
        .collect()
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in {}", needle, haystack))
}

// ============================================================================
// Page Tree Tests
// ============================================================================

#[test]
fn test_two_roots_with_children() {
    let (_temp_dir, db) = create_test_db();
    let a = root(&db, "A", "a", 1, 0.9);
    let b = root(&db, "B", "b", 2, 0.3);
    child(&db, a, "A1", "a1");
    child(&db, b, "B1", "b1");

    let config = config(&format!("{{{BASE}}}"));
    let builder = SitemapBuilder::new(&db, &config).unwrap();

    let html = builder.render_html().unwrap();
    assert_eq!(
        html,
        "<ul>\
         <li><a href=\"https://example.com/a/\">A</a>\
         <ul><li><a href=\"https://example.com/a/a1/\">A1</a></li></ul></li>\
         <li><a href=\"https://example.com/b/\">B</a>\
         <ul><li><a href=\"https://example.com/b/b1/\">B1</a></li></ul></li>\
         </ul>"
    );

    let xml = builder.render_xml().unwrap();
    assert_eq!(
        locs(&xml),
        vec!["https://example.com/a/", "https://example.com/b/"]
    );
    assert!(xml.contains("<priority>0.90</priority>"));
    assert!(xml.contains("<priority>0.30</priority>"));
}

#[test]
fn test_roots_by_sort_deeper_levels_by_id() {
    let (_temp_dir, db) = create_test_db();
    let second = root(&db, "Second", "second", 20, 0.5);
    let first = root(&db, "First", "first", 10, 0.5);

    let mut late_sort = NewPage::new("Created First", "created-first");
    late_sort.parent_id = Some(first);
    late_sort.sort = 99;
    db.insert_page(&late_sort).unwrap();
    let mut early_sort = NewPage::new("Created Second", "created-second");
    early_sort.parent_id = Some(first);
    early_sort.sort = -5;
    db.insert_page(&early_sort).unwrap();
    child(&db, second, "Other", "other");

    let config = SitemapConfig::default();
    let html = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_html()
        .unwrap();

    assert!(position(&html, ">First<") < position(&html, ">Second<"));
    assert!(position(&html, ">Created First<") < position(&html, ">Created Second<"));
}

#[test]
fn test_root_sort_ties_fall_back_to_id() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "One", "one", 0, 0.5);
    root(&db, "Two", "two", 0, 0.5);

    let config = SitemapConfig::default();
    let tree = SitemapBuilder::new(&db, &config)
        .unwrap()
        .build_tree()
        .unwrap();

    let titles: Vec<&str> = tree.roots.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two"]);
}

#[test]
fn test_one_anchor_per_page() {
    let (_temp_dir, db) = create_test_db();
    let home = root(&db, "Home", "", 0, 1.0);
    let about = root(&db, "About", "about", 1, 0.5);
    let team = child(&db, about, "Team", "team");
    child(&db, team, "Jane", "jane");
    child(&db, team, "Joe", "joe");
    child(&db, home, "Welcome", "welcome");

    let config = SitemapConfig::default();
    let builder = SitemapBuilder::new(&db, &config).unwrap();
    let html = builder.render_html().unwrap();

    assert_eq!(anchor_count(&html), 6);
    assert_eq!(builder.build_tree().unwrap().anchor_count(), 6);
    assert!(html.contains("<a href=\"/about/team/jane/\">Jane</a>"));
    assert!(html.contains("<a href=\"/\">Home</a>"));
    assert!(html.contains("<a href=\"/welcome/\">Welcome</a>"));
}

#[test]
fn test_leaf_pages_have_no_nested_list() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "Solo", "solo", 0, 0.5);

    let config = SitemapConfig::default();
    let html = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_html()
        .unwrap();

    assert_eq!(html, "<ul><li><a href=\"/solo/\">Solo</a></li></ul>");
}

#[test]
fn test_empty_site() {
    let (_temp_dir, db) = create_test_db();

    let config = config(&format!("{{{BASE}}}"));
    let builder = SitemapBuilder::new(&db, &config).unwrap();

    assert_eq!(builder.render_html().unwrap(), "<ul></ul>");
    let xml = builder.render_xml().unwrap();
    assert!(xml.contains("<urlset"));
    assert!(!xml.contains("<url>"));
}

#[test]
fn test_titles_are_escaped() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "Fish & <Chips>", "fish", 0, 0.5);

    let config = SitemapConfig::default();
    let html = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_html()
        .unwrap();

    assert!(html.contains(">Fish &amp; &lt;Chips&gt;</a>"));
}

// ============================================================================
// Filtering Tests
// ============================================================================

#[test]
fn test_noindex_root_hidden_everywhere() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "Visible", "visible", 0, 0.5);
    let mut hidden = NewPage::new("Hidden", "hidden");
    hidden.meta.robots = Some(Robots::NoIndexNoFollow);
    let hidden_id = db.insert_page(&hidden).unwrap();
    child(&db, hidden_id, "Under Hidden", "under");

    let config = SitemapConfig::default();
    let builder = SitemapBuilder::new(&db, &config).unwrap();

    let html = builder.render_html().unwrap();
    assert!(!html.contains("Hidden"));
    assert!(!html.contains("Under Hidden"));

    let xml = builder.render_xml().unwrap();
    assert_eq!(locs(&xml), vec!["/visible/"]);
}

#[test]
fn test_noindex_child_still_listed_in_html() {
    let (_temp_dir, db) = create_test_db();
    let parent = root(&db, "Parent", "parent", 0, 0.5);
    let mut secret = NewPage::new("Secret", "secret");
    secret.parent_id = Some(parent);
    secret.meta.robots = Some(Robots::NoIndexNoFollow);
    db.insert_page(&secret).unwrap();

    let config = SitemapConfig::default();
    let builder = SitemapBuilder::new(&db, &config).unwrap();

    assert!(builder.render_html().unwrap().contains(">Secret</a>"));
    assert!(!builder.render_xml().unwrap().contains("secret"));
}

#[test]
fn test_other_robots_directives_kept() {
    let (_temp_dir, db) = create_test_db();
    let mut page = NewPage::new("Follow Only", "follow-only");
    page.meta.robots = Some(Robots::NoIndexFollow);
    db.insert_page(&page).unwrap();

    let config = SitemapConfig::default();
    let xml = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_xml()
        .unwrap();

    assert_eq!(locs(&xml), vec!["/follow-only/"]);
}

#[test]
fn test_error_pages_excluded_by_default() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "Home", "", 0, 0.5);
    let mut not_found = NewPage::new("Page not found", "page-not-found");
    not_found.class_name = "ErrorPage".to_string();
    db.insert_page(&not_found).unwrap();

    let default_config = SitemapConfig::default();
    let html = SitemapBuilder::new(&db, &default_config)
        .unwrap()
        .render_html()
        .unwrap();
    assert!(!html.contains("Page not found"));

    let include_all = config(r#"{"exclude_classes": []}"#);
    let html = SitemapBuilder::new(&db, &include_all)
        .unwrap()
        .render_html()
        .unwrap();
    assert!(html.contains("Page not found"));
}

// ============================================================================
// Auxiliary Source Tests
// ============================================================================

#[test]
fn test_listing_comes_before_children_by_priority() {
    let (_temp_dir, db) = create_test_db();
    let blog = root(&db, "Blog", "blog", 0, 0.5);
    child(&db, blog, "Archive", "archive");
    let posts = db.register_object_type("BlogPost").unwrap();
    object(&db, &posts, "Old News", "old-news", 0.2);
    object(&db, &posts, "Big News", "big-news", 0.9);

    let config = config(&format!(
        r#"{{{BASE}, "objects": {{"BlogPost": {{"parent_id": {blog}, "prefix": "blog"}}}}}}"#
    ));
    let html = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_html()
        .unwrap();

    assert_eq!(
        html,
        "<ul><li><a href=\"https://example.com/blog/\">Blog</a>\
         <ul>\
         <li><a href=\"https://example.com/blog/big-news\">Big News</a></li>\
         <li><a href=\"https://example.com/blog/old-news\">Old News</a></li>\
         </ul>\
         <ul><li><a href=\"https://example.com/blog/archive/\">Archive</a></li></ul>\
         </li></ul>"
    );
}

#[test]
fn test_listing_attaches_to_nested_page() {
    let (_temp_dir, db) = create_test_db();
    let shop = root(&db, "Shop", "shop", 0, 0.5);
    let range = child(&db, shop, "Range", "range");
    let products = db.register_object_type("Product").unwrap();
    object(&db, &products, "Widget", "widget", 0.5);

    let config = config(&format!(
        r#"{{"objects": {{"Product": {{"parent_id": {range}}}}}}}"#
    ));
    let html = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_html()
        .unwrap();

    assert!(position(&html, ">Range</a>") < position(&html, ">Widget</a>"));
    assert!(html.contains("<a href=\"/widget\">Widget</a>"));
    assert_eq!(anchor_count(&html), 3);
}

#[test]
fn test_empty_source_adds_no_list() {
    let (_temp_dir, db) = create_test_db();
    let blog = root(&db, "Blog", "blog", 0, 0.5);
    db.register_object_type("BlogPost").unwrap();

    let config = config(&format!(
        r#"{{"objects": {{"BlogPost": {{"parent_id": {blog}}}}}}}"#
    ));
    let html = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_html()
        .unwrap();

    assert_eq!(html, "<ul><li><a href=\"/blog/\">Blog</a></li></ul>");
}

#[test]
fn test_parent_zero_only_in_xml() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "Home", "", 0, 0.5);
    let products = db.register_object_type("Product").unwrap();
    object(&db, &products, "Widget", "widget", 0.7);

    let config = config(&format!(
        r#"{{{BASE}, "objects": {{"Product": {{"parent_id": 0, "prefix": "/shop/"}}}}}}"#
    ));
    let builder = SitemapBuilder::new(&db, &config).unwrap();

    let html = builder.render_html().unwrap();
    assert!(!html.contains("Widget"));
    assert_eq!(anchor_count(&html), 1);

    let xml = builder.render_xml().unwrap();
    assert_eq!(
        locs(&xml),
        vec!["https://example.com/shop/widget", "https://example.com/"]
    );
}

#[test]
fn test_xml_merges_sources_by_priority() {
    let (_temp_dir, db) = create_test_db();
    let blog = root(&db, "Blog", "blog", 0, 0.6);
    root(&db, "Contact", "contact", 1, 0.1);
    let posts = db.register_object_type("BlogPost").unwrap();
    let products = db.register_object_type("Product").unwrap();
    object(&db, &posts, "Post", "post", 0.8);
    object(&db, &posts, "Tied Post", "tied-post", 0.6);
    object(&db, &products, "Widget", "widget", 1.0);
    object(&db, &products, "Gadget", "gadget", 0.3);

    let config = config(&format!(
        r#"{{
            "objects": {{
                "BlogPost": {{"parent_id": {blog}, "prefix": "blog"}},
                "Product": {{"parent_id": 0, "prefix": "products"}}
            }}
        }}"#
    ));
    let xml = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_xml()
        .unwrap();

    let ordered = priorities(&xml);
    assert!(ordered.windows(2).all(|w| w[0] >= w[1]));
    // Equal priorities keep fetch order: root pages before object records
    assert_eq!(
        locs(&xml),
        vec![
            "/products/widget",
            "/blog/post",
            "/blog/",
            "/blog/tied-post",
            "/products/gadget",
            "/contact/",
        ]
    );
}

#[test]
fn test_unknown_source_fails_before_render() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "Home", "", 0, 0.5);

    let config = config(r#"{"objects": {"Missing": {"parent_id": 1}}}"#);
    let err = SitemapBuilder::new(&db, &config).err().unwrap();

    assert!(matches!(
        err,
        SitemapError::Data(DataError::UnknownSource(ref name)) if name == "Missing"
    ));
}

// ============================================================================
// XML Output Tests
// ============================================================================

#[test]
fn test_xml_entry_fields() {
    let (_temp_dir, db) = create_test_db();
    let mut page = NewPage::new("About", "about");
    page.last_edited = Some(1_735_689_600);
    page.meta.priority = Priority::new(0.8).unwrap();
    page.meta.change_frequency = "monthly".parse().unwrap();
    db.insert_page(&page).unwrap();

    let config = config(&format!("{{{BASE}}}"));
    let xml = SitemapBuilder::new(&db, &config)
        .unwrap()
        .render_xml()
        .unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
    assert!(xml.contains("<loc>https://example.com/about/</loc>"));
    assert!(xml.contains("<lastmod>2025-01-01T00:00:00Z</lastmod>"));
    assert!(xml.contains("<changefreq>monthly</changefreq>"));
    assert!(xml.contains("<priority>0.80</priority>"));
}

#[test]
fn test_missing_base_url_gives_relative_links() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "About", "about", 0, 0.5);

    let config = SitemapConfig::default();
    let builder = SitemapBuilder::new(&db, &config).unwrap();

    assert_eq!(builder.base_url(), "");
    assert_eq!(locs(&builder.render_xml().unwrap()), vec!["/about/"]);
}

#[test]
fn test_invalid_base_url_ignored() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "About", "about", 0, 0.5);

    let config = config(r#"{"base_url": "not a url"}"#);
    let builder = SitemapBuilder::new(&db, &config).unwrap();

    assert_eq!(builder.base_url(), "");
}

#[test]
fn test_feed_matches_rendered_xml() {
    let (_temp_dir, db) = create_test_db();
    root(&db, "A", "a", 0, 0.4);
    root(&db, "B", "b", 1, 0.6);

    let config = SitemapConfig::default();
    let builder = SitemapBuilder::new(&db, &config).unwrap();
    let feed = builder.build_feed().unwrap();

    let links: Vec<&str> = feed.iter().map(|e| e.link.as_str()).collect();
    assert_eq!(links, vec!["/b/", "/a/"]);
    assert_eq!(feed.len(), locs(&builder.render_xml().unwrap()).len());
}

// ============================================================================
// Store Failure Tests
// ============================================================================

/// Two root pages; any object fetch fails.
struct BrokenObjectStore;

fn stub_page(id: i64, segment: &str) -> Page {
    Page {
        id,
        parent_id: None,
        class_name: "Page".to_string(),
        title: segment.to_uppercase(),
        url_segment: segment.to_string(),
        sort: id,
        last_edited: None,
        meta: PageMetadata::default(),
    }
}

impl ContentStore for BrokenObjectStore {
    fn pages(&self, query: &PageQuery) -> Result<Vec<Page>, DataError> {
        if query.filters.contains(&Filter::IsNull(PageField::ParentId)) {
            Ok(vec![stub_page(1, "first"), stub_page(2, "second")])
        } else {
            Ok(Vec::new())
        }
    }

    fn resolve_source(&self, name: &str) -> Result<SourceId, DataError> {
        Ok(SourceId::new(1, name))
    }

    fn objects(
        &self,
        _source: &SourceId,
        _order: Option<OrderBy<ObjectField>>,
    ) -> Result<Vec<ObjectRecord>, DataError> {
        Err(DataError::InvalidValue {
            field: "priority",
            value: "250 (hundredths)".to_string(),
        })
    }
}

#[test]
fn test_store_error_mid_walk_aborts_html() {
    // Attached to the second root, so the first is already built when it fails
    let config = config(r#"{"objects": {"BlogPost": {"parent_id": 2}}}"#);
    let builder = SitemapBuilder::new(&BrokenObjectStore, &config).unwrap();

    let result = builder.render_html();
    assert!(matches!(
        result,
        Err(SitemapError::Data(DataError::InvalidValue { field: "priority", .. }))
    ));
    assert!(builder.build_tree().is_err());
}

#[test]
fn test_store_error_aborts_xml() {
    let config = config(r#"{"objects": {"BlogPost": {"parent_id": 0}}}"#);
    let builder = SitemapBuilder::new(&BrokenObjectStore, &config).unwrap();

    assert!(builder.render_xml().is_err());
    assert!(builder.build_feed().is_err());
}

#[test]
fn test_broken_source_unused_without_config() {
    let config = SitemapConfig::default();
    let html = SitemapBuilder::new(&BrokenObjectStore, &config)
        .unwrap()
        .render_html()
        .unwrap();

    assert_eq!(anchor_count(&html), 2);
}
