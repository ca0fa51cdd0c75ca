//! `<head>` meta tags for a page.
//!
//! Social tags (Open Graph and Twitter) are left out when the page has
//! `hide_social` set. Extra head tags always come last, in stored order.

use crate::markup::escape_html;
use crate::model::Page;

/// `link` is the page's site-relative link, e.g. `/about/team/`.
pub fn render_head(page: &Page, base_url: &str, link: &str) -> String {
    let meta = &page.meta;
    let title = meta.meta_title.as_deref().unwrap_or(&page.title);
    let mut head = String::with_capacity(1024);

    head.push_str(&format!("<title>{}</title>\n", escape_html(title)));

    if let Some(description) = &meta.meta_description {
        push_meta(&mut head, "name", "description", description);
    }
    if let Some(canonical) = &meta.canonical {
        head.push_str(&format!(
            "<link rel=\"canonical\" href=\"{}\">\n",
            escape_html(canonical)
        ));
    }
    if let Some(robots) = meta.robots {
        push_meta(&mut head, "name", "robots", robots.as_str());
    }

    if !meta.hide_social {
        let url = format!("{}{}", base_url, link);
        let image = meta.social_image.as_ref().map(|image| image.url(base_url));

        push_meta(&mut head, "property", "og:title", title);
        if let Some(description) = &meta.meta_description {
            push_meta(&mut head, "property", "og:description", description);
        }
        if let Some(og_type) = meta.og_type {
            push_meta(&mut head, "property", "og:type", og_type.as_str());
        }
        if let Some(locale) = meta.og_locale {
            push_meta(&mut head, "property", "og:locale", locale.code());
        }
        push_meta(&mut head, "property", "og:url", &url);
        if let Some(image) = &image {
            push_meta(&mut head, "property", "og:image", image);
        }

        if let Some(card) = meta.twitter_card {
            push_meta(&mut head, "name", "twitter:card", card.as_str());
        }
        push_meta(&mut head, "name", "twitter:title", title);
        if let Some(description) = &meta.meta_description {
            push_meta(&mut head, "name", "twitter:description", description);
        }
        if let Some(image) = &image {
            push_meta(&mut head, "name", "twitter:image", image);
        }
    }

    for tag in &meta.head_tags {
        push_meta(&mut head, "name", &tag.name, &tag.value);
    }

    head
}

fn push_meta(head: &mut String, attr: &str, key: &str, content: &str) {
    head.push_str(&format!(
        "<meta {}=\"{}\" content=\"{}\">\n",
        attr,
        escape_html(key),
        escape_html(content)
    ));
}
