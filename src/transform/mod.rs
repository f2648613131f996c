// src/transform/mod.rs

pub mod cleanup;
pub mod markdown;

use crate::error::ScrapeError;
use markdown::{to_markdown, ConvertOptions};
use scraper::{Html, Selector};

/// Fixed structural marker for the page header (country name, flag, rating
/// image). One place to fix if the site's markup drifts.
pub static HEADER_SELECTOR: &str = "div.pb30";

/// Fixed structural marker for the substantive legal content.
pub static BODY_SELECTOR: &str = "div.main-column";

/// The rating is carried by the descriptive text of the ratings image in
/// the header. The path filter keeps decorative images with alt text (the
/// country flag) from being mistaken for the rating.
pub static RATING_IMG_SELECTOR: &str = r#"img[src*="/ratings/"][alt]"#;

/// The two regions of one profile page, as raw fragment markup. Transient;
/// lives only within one transformation call.
#[derive(Debug)]
pub struct PageSections {
    pub header_html: String,
    pub body_html: String,
}

/// Result of transforming one profile page.
#[derive(Debug)]
pub struct TransformedPage {
    /// Concatenated header + body Markdown, ready for rendering.
    pub markdown: String,
    /// Compatibility rating scraped from the header image, if present.
    pub rating: Option<String>,
}

/// Split a fetched page into its header and body regions. Either marker
/// missing means the page cannot be transformed at all.
pub fn split_sections(html: &str) -> Result<PageSections, ScrapeError> {
    let header_sel = Selector::parse(HEADER_SELECTOR).expect("selector should parse");
    let body_sel = Selector::parse(BODY_SELECTOR).expect("selector should parse");
    let document = Html::parse_document(html);

    let header = document
        .select(&header_sel)
        .next()
        .ok_or(ScrapeError::MissingElement {
            selector: HEADER_SELECTOR,
            context: "profile page",
        })?;
    let body = document
        .select(&body_sel)
        .next()
        .ok_or(ScrapeError::MissingElement {
            selector: BODY_SELECTOR,
            context: "profile page",
        })?;

    Ok(PageSections {
        header_html: header.html(),
        body_html: body.html(),
    })
}

/// Extract the compatibility rating from the header fragment. A header
/// without a rating image is tolerated; the page simply carries no rating.
pub fn extract_rating(header_html: &str) -> Option<String> {
    let img_sel = Selector::parse(RATING_IMG_SELECTOR).expect("selector should parse");
    let fragment = Html::parse_fragment(header_html);
    fragment
        .select(&img_sel)
        .filter_map(|img| img.value().attr("alt"))
        .map(str::trim)
        .find(|alt| !alt.is_empty())
        .map(String::from)
}

/// Transform one fetched profile page into a renderable Markdown document.
///
/// Header images are suppressed (decorative, and the rating they carry is
/// re-inserted as text); body images are kept. Asset links are rewritten to
/// absolute URLs, converter artifacts stripped, and the site's malformed
/// treaty table repaired.
pub fn transform_page(html: &str) -> Result<TransformedPage, ScrapeError> {
    let sections = split_sections(html)?;
    let rating = extract_rating(&sections.header_html);

    let mut header_md = to_markdown(
        &sections.header_html,
        ConvertOptions { strip_images: true },
    );
    if let Some(ref rating) = rating {
        header_md = cleanup::splice_rating(&header_md, rating);
    }

    let body_md = to_markdown(&sections.body_html, ConvertOptions::default());
    let body_md = cleanup::repair_treaty_table(&body_md);

    let mut markdown = format!("{}\n{}", header_md, body_md);
    markdown = cleanup::rewrite_asset_links(&markdown);
    markdown = cleanup::strip_control_chars(&markdown);

    Ok(TransformedPage { markdown, rating })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="pb30">
            <h1>Chad</h1>
            <img src="/images/ratings/partial.png" alt="Partially compliant">
            <p>Compliance with international standards</p>
          </div>
          <div class="main-column">
            <h2>Constitution</h2>
            <p>Download the <a href="/assets/downloads/constitution.pdf">text</a>.</p>
          </div>
        </body></html>
    "#;

    #[test]
    fn splits_header_and_body() {
        let sections = split_sections(PAGE).unwrap();
        assert!(sections.header_html.contains("Chad"));
        assert!(sections.body_html.contains("Constitution"));
    }

    #[test]
    fn missing_header_is_fatal() {
        let err = split_sections(r#"<div class="main-column">body</div>"#).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement { selector, .. } if selector == HEADER_SELECTOR
        ));
    }

    #[test]
    fn missing_body_is_fatal() {
        let err = split_sections(r#"<div class="pb30">header</div>"#).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement { selector, .. } if selector == BODY_SELECTOR
        ));
    }

    #[test]
    fn extracts_rating_from_header_image() {
        let sections = split_sections(PAGE).unwrap();
        assert_eq!(
            extract_rating(&sections.header_html).as_deref(),
            Some("Partially compliant")
        );
    }

    #[test]
    fn missing_rating_is_tolerated() {
        assert_eq!(extract_rating("<div><h1>Chad</h1></div>"), None);
    }

    #[test]
    fn decorative_images_are_not_mistaken_for_the_rating() {
        let header = r#"
            <div>
              <img src="/images/flags/chad.png" alt="Flag of Chad">
              <h1>Chad</h1>
            </div>
        "#;
        assert_eq!(extract_rating(header), None);

        let header_with_rating = r#"
            <div>
              <img src="/images/flags/chad.png" alt="Flag of Chad">
              <img src="/images/ratings/partial.png" alt="Partially compliant">
            </div>
        "#;
        assert_eq!(
            extract_rating(header_with_rating).as_deref(),
            Some("Partially compliant")
        );
    }

    #[test]
    fn transforms_full_page() {
        let page = transform_page(PAGE).unwrap();
        assert_eq!(page.rating.as_deref(), Some("Partially compliant"));
        // Header images are suppressed; the rating is spliced back as text.
        assert!(!page.markdown.contains("![Partially compliant]"));
        assert!(page
            .markdown
            .contains("Compliance with international standards: Partially compliant"));
        // Asset links are absolute.
        assert!(page
            .markdown
            .contains("](https://www.policinglaw.info/assets/downloads/constitution.pdf)"));
        assert!(!page.markdown.contains("](/assets"));
        // Header precedes body.
        let header_pos = page.markdown.find("# Chad").unwrap();
        let body_pos = page.markdown.find("## Constitution").unwrap();
        assert!(header_pos < body_pos);
    }
}
