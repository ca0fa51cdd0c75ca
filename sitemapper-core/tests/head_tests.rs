use sitemapper_core::head::render_head;
use sitemapper_core::model::{
    HeadTag, OgType, Page, PageMetadata, Robots, SocialImage, TwitterCard,
};

fn page(meta: PageMetadata) -> Page {
    Page {
        id: 4,
        parent_id: Some(1),
        class_name: "Page".to_string(),
        title: "Team".to_string(),
        url_segment: "team".to_string(),
        sort: 0,
        last_edited: None,
        meta,
    }
}

#[test]
fn test_title_falls_back_to_page_title() {
    let head = render_head(&page(PageMetadata::default()), "", "/about/team/");

    assert!(head.starts_with("<title>Team</title>\n"));
    assert!(!head.contains("name=\"description\""));
    assert!(!head.contains("name=\"robots\""));
}

#[test]
fn test_full_metadata() {
    let meta = PageMetadata {
        meta_title: Some("Our Team".to_string()),
        meta_description: Some("People & places".to_string()),
        canonical: Some("https://example.com/team/".to_string()),
        robots: Some(Robots::NoIndexFollow),
        og_type: Some(OgType::Profile),
        og_locale: Some("en_GB".parse().unwrap()),
        twitter_card: Some(TwitterCard::Summary),
        social_image: Some(SocialImage {
            path: "/assets/Social/team.png".to_string(),
        }),
        ..PageMetadata::default()
    };
    let head = render_head(&page(meta), "https://example.com", "/about/team/");

    assert!(head.contains("<title>Our Team</title>"));
    assert!(head.contains("<meta name=\"description\" content=\"People &amp; places\">"));
    assert!(head.contains("<link rel=\"canonical\" href=\"https://example.com/team/\">"));
    assert!(head.contains("<meta name=\"robots\" content=\"noindex,follow\">"));
    assert!(head.contains("<meta property=\"og:title\" content=\"Our Team\">"));
    assert!(head.contains("<meta property=\"og:type\" content=\"profile\">"));
    assert!(head.contains("<meta property=\"og:locale\" content=\"en_GB\">"));
    assert!(head.contains("<meta property=\"og:url\" content=\"https://example.com/about/team/\">"));
    assert!(head.contains(
        "<meta property=\"og:image\" content=\"https://example.com/assets/Social/team.png\">"
    ));
    assert!(head.contains("<meta name=\"twitter:card\" content=\"summary\">"));
    assert!(head.contains("<meta name=\"twitter:description\" content=\"People &amp; places\">"));
}

#[test]
fn test_hide_social() {
    let meta = PageMetadata {
        hide_social: true,
        twitter_card: Some(TwitterCard::Summary),
        ..PageMetadata::default()
    };
    let head = render_head(&page(meta), "https://example.com", "/team/");

    assert!(!head.contains("og:"));
    assert!(!head.contains("twitter:"));
}

#[test]
fn test_extra_head_tags_last_in_order() {
    let meta = PageMetadata {
        head_tags: vec![
            HeadTag {
                name: "theme-color".to_string(),
                value: "#000".to_string(),
            },
            HeadTag {
                name: "author".to_string(),
                value: "Jane \"JD\" Doe".to_string(),
            },
        ],
        ..PageMetadata::default()
    };
    let head = render_head(&page(meta), "", "/team/");
    let lines: Vec<&str> = head.lines().collect();

    assert_eq!(lines[lines.len() - 2], "<meta name=\"theme-color\" content=\"#000\">");
    assert_eq!(
        lines[lines.len() - 1],
        "<meta name=\"author\" content=\"Jane &quot;JD&quot; Doe\">"
    );
}
