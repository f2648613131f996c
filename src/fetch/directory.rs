// src/fetch/directory.rs

use crate::error::ScrapeError;
use crate::BASE_URL;
use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashMap;
use tracing::warn;
use url::Url;

/// The navigation element listing every country profile. Fixed site marker;
/// if the site's markup drifts, this is the one place to fix.
pub static COUNTRY_NAV_SELECTOR: &str = "ul.dropdown-menu.country-dropdown";

/// Profile links within the navigation element.
pub static COUNTRY_LINK_SELECTOR: &str = "li a";

/// One country profile discovered in the site navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReference {
    pub url: Url,
    pub short_name: String,
}

/// Fetch the site root and return every profile listed in the country
/// dropdown, in document order. Duplicates are not removed.
pub async fn collect_profiles(client: &Client) -> Result<Vec<ProfileReference>> {
    let html = client
        .get(BASE_URL)
        .send()
        .await
        .with_context(|| format!("GET {}", BASE_URL))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body from {}", BASE_URL))?;

    let base = Url::parse(BASE_URL).expect("base URL should parse");
    Ok(parse_profiles(&html, &base)?)
}

/// Extract profile references from the root page markup. An absent dropdown
/// is fatal (there is no country list to walk), and so is a dropdown with
/// no usable links; the two cases carry distinct error contexts.
pub fn parse_profiles(html: &str, base: &Url) -> Result<Vec<ProfileReference>, ScrapeError> {
    let nav_selector = Selector::parse(COUNTRY_NAV_SELECTOR).expect("selector should parse");
    let link_selector = Selector::parse(COUNTRY_LINK_SELECTOR).expect("selector should parse");
    let document = Html::parse_document(html);

    let nav = document
        .select(&nav_selector)
        .next()
        .ok_or(ScrapeError::MissingElement {
            selector: COUNTRY_NAV_SELECTOR,
            context: "site root page",
        })?;

    let mut profiles = Vec::new();
    for anchor in nav.select(&link_selector) {
        let href = match anchor.value().attr("href") {
            Some(h) => h,
            None => {
                warn!("skipping country entry without an href");
                continue;
            }
        };
        let url = match base.join(href) {
            Ok(u) => u,
            Err(err) => {
                warn!(href, "skipping country entry with unjoinable link: {err}");
                continue;
            }
        };
        let short_name = short_name(&url);
        profiles.push(ProfileReference { url, short_name });
    }

    if profiles.is_empty() {
        return Err(ScrapeError::MissingElement {
            selector: COUNTRY_LINK_SELECTOR,
            context: "country dropdown",
        });
    }
    Ok(profiles)
}

/// Last non-empty path segment of a profile URL, used as the per-country
/// file and row key.
pub fn short_name(url: &Url) -> String {
    url.path()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Output file stems for a batch, one per profile in order. The resolver
/// keeps duplicates, so two entries can share a short name; repeats get a
/// numeric suffix so concurrent renders never target the same path.
pub fn output_stems(profiles: &[ProfileReference]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    profiles
        .iter()
        .map(|profile| {
            let count = seen.entry(profile.short_name.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                profile.short_name.clone()
            } else {
                format!("{}-{}", profile.short_name, count)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_PAGE: &str = r#"
        <html><body>
          <ul class="dropdown-menu country-dropdown">
            <li><a href="/en/countries/albania/">Albania</a></li>
            <li><a href="/en/countries/belgium/">Belgium</a></li>
            <li><a href="https://www.policinglaw.info/en/countries/chad/">Chad</a></li>
          </ul>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse(BASE_URL).unwrap()
    }

    #[test]
    fn parses_profiles_in_document_order() {
        let profiles = parse_profiles(ROOT_PAGE, &base()).unwrap();
        let names: Vec<_> = profiles.iter().map(|p| p.short_name.as_str()).collect();
        assert_eq!(names, ["albania", "belgium", "chad"]);
        assert_eq!(
            profiles[0].url.as_str(),
            "https://www.policinglaw.info/en/countries/albania/"
        );
    }

    #[test]
    fn missing_dropdown_is_fatal() {
        let err = parse_profiles("<html><body><p>no nav here</p></body></html>", &base())
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement { selector, .. } if selector == COUNTRY_NAV_SELECTOR
        ));
    }

    #[test]
    fn empty_dropdown_is_distinguished_from_absent() {
        let html = r#"<ul class="dropdown-menu country-dropdown"></ul>"#;
        let err = parse_profiles(html, &base()).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement { context, .. } if context == "country dropdown"
        ));
    }

    #[test]
    fn entries_without_usable_links_are_skipped() {
        let html = r#"
            <ul class="dropdown-menu country-dropdown">
              <li><a>Nowhere</a></li>
              <li><a href="/en/countries/albania/">Albania</a></li>
            </ul>
        "#;
        let profiles = parse_profiles(html, &base()).unwrap();
        let names: Vec<_> = profiles.iter().map(|p| p.short_name.as_str()).collect();
        assert_eq!(names, ["albania"]);
    }

    #[test]
    fn short_name_is_last_nonempty_segment() {
        let with_slash = Url::parse("https://example.org/en/countries/fiji/").unwrap();
        let without_slash = Url::parse("https://example.org/en/countries/fiji").unwrap();
        assert_eq!(short_name(&with_slash), "fiji");
        assert_eq!(short_name(&without_slash), "fiji");
    }

    #[test]
    fn duplicate_entries_are_kept_but_stems_stay_unique() {
        let html = r#"
            <ul class="dropdown-menu country-dropdown">
              <li><a href="/en/countries/alpha/">Alpha</a></li>
              <li><a href="/en/countries/alpha/">Alpha</a></li>
              <li><a href="/en/countries/beta/">Beta</a></li>
            </ul>
        "#;
        let profiles = parse_profiles(html, &base()).unwrap();
        let names: Vec<_> = profiles.iter().map(|p| p.short_name.as_str()).collect();
        assert_eq!(names, ["alpha", "alpha", "beta"]);

        let stems = output_stems(&profiles);
        assert_eq!(stems, ["alpha", "alpha-2", "beta"]);
    }
}
