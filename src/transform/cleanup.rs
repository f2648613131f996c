// src/transform/cleanup.rs
//
// Post-conversion fixes applied to the Markdown output. All of these are
// workarounds for quirks of one specific site and converter; each constant
// is the single place to touch when the site drifts.

use crate::BASE_URL;
use once_cell::sync::Lazy;
use regex::Regex;

/// The site serves downloadable assets (treaty texts, national laws) via
/// root-relative paths. The rendered PDF is read outside that context, so
/// every such link target must become absolute.
pub static ASSET_PREFIX: &str = "/assets";

/// The stray control character the conversion step leaves behind. It
/// corrupts rendering downstream.
pub const STRAY_CONTROL_CHAR: char = '\u{0002}';

/// Header line of the treaty-adherence block that the site emits as
/// pipe-delimited text without a separator row. Without one the block is
/// not a valid Markdown table.
pub static TREATY_TABLE_MARKER: &str = "| Treaty | State party? |";

/// Phrase in the header region after which the extracted rating is spliced.
pub static RATING_ANCHOR: &str = "Compliance with international standards";

static ASSET_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\(/assets").expect("regex should parse"));

/// Rewrite root-relative asset link targets to absolute URLs. Total (no
/// `](/assets` survives) and idempotent (absolute targets are left alone).
pub fn rewrite_asset_links(markdown: &str) -> String {
    let absolute = format!("]({}assets", BASE_URL);
    ASSET_LINK.replace_all(markdown, absolute.as_str()).into_owned()
}

/// Strip every occurrence of the stray control character.
pub fn strip_control_chars(markdown: &str) -> String {
    markdown.replace(STRAY_CONTROL_CHAR, "")
}

/// Insert a header-separator row after the treaty-table marker line when
/// one is missing. Site-specific structural workaround, not a general
/// table-repair rule; idempotent.
pub fn repair_treaty_table(markdown: &str) -> String {
    let columns = TREATY_TABLE_MARKER.matches('|').count().saturating_sub(1);
    let separator = format!("|{}", " --- |".repeat(columns));

    let mut out = Vec::new();
    let mut lines = markdown.lines().peekable();
    while let Some(line) = lines.next() {
        out.push(line.to_string());
        if line.trim() == TREATY_TABLE_MARKER {
            let next_is_separator = lines
                .peek()
                .map(|next| is_separator_row(next))
                .unwrap_or(false);
            if !next_is_separator {
                out.push(separator.clone());
            }
        }
    }

    let mut repaired = out.join("\n");
    if markdown.ends_with('\n') {
        repaired.push('\n');
    }
    repaired
}

fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
        && trimmed.contains('-')
}

/// Splice the extracted rating into the header document: the first
/// occurrence of the anchor phrase is replaced with itself plus the rating,
/// so the PDF shows the rating inline where the suppressed image used to be.
pub fn splice_rating(header_markdown: &str, rating: &str) -> String {
    header_markdown.replacen(RATING_ANCHOR, &format!("{}: {}", RATING_ANCHOR, rating), 1)
}
