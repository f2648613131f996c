// src/transform/markdown.rs
//
// HTML fragment → Markdown. The pack carries no HTML-to-Markdown crate, so
// the conversion is a DOM walk over the same `scraper` tree the fetch layer
// already parses. Only the elements the source site actually emits are
// handled; unknown elements fall through to their children.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("regex should parse"));

/// Conversion options for one region of a page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Drop `<img>` elements entirely instead of emitting image syntax.
    pub strip_images: bool,
}

/// Convert an HTML fragment to Markdown.
pub fn to_markdown(html: &str, opts: ConvertOptions) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    render_children(fragment.root_element(), &mut out, opts, 0);

    let out = EXCESS_BLANK_LINES.replace_all(&out, "\n\n");
    let mut out = out.trim().to_string();
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_children(el: ElementRef, out: &mut String, opts: ConvertOptions, depth: usize) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            push_collapsed(out, &text.text);
        } else if child.value().is_element() {
            if let Some(child_el) = ElementRef::wrap(child) {
                render_element(child_el, out, opts, depth);
            }
        }
    }
}

fn render_element(el: ElementRef, out: &mut String, opts: ConvertOptions, depth: usize) {
    match el.value().name() {
        name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
            let level = usize::from(name.as_bytes()[1] - b'0');
            let text = inline_content(el, opts);
            if !text.is_empty() {
                ensure_blank_line(out);
                out.push_str(&"#".repeat(level));
                out.push(' ');
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
        "p" => {
            let text = inline_content(el, opts);
            if !text.is_empty() {
                ensure_blank_line(out);
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
        "ul" => render_list(el, out, opts, depth, false),
        "ol" => render_list(el, out, opts, depth, true),
        "table" => render_table(el, out, opts),
        "blockquote" => {
            let text = inline_content(el, opts);
            if !text.is_empty() {
                ensure_blank_line(out);
                out.push_str("> ");
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
        "hr" => {
            ensure_blank_line(out);
            out.push_str("---\n\n");
        }
        "br" => out.push('\n'),
        "script" | "style" | "noscript" => {}
        "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside"
        | "figure" => {
            ensure_blank_line(out);
            render_children(el, out, opts, depth);
            ensure_blank_line(out);
        }
        // Anchors, images, emphasis and anything unrecognized render inline.
        _ => {
            let text = render_inline_element(el, opts);
            out.push_str(&text);
        }
    }
}

/// Concatenated inline content of an element, whitespace-collapsed.
fn inline_content(el: ElementRef, opts: ConvertOptions) -> String {
    let mut buf = String::new();
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            push_collapsed(&mut buf, &text.text);
        } else if child.value().is_element() {
            if let Some(child_el) = ElementRef::wrap(child) {
                if child_el.value().name() == "br" {
                    buf.push('\n');
                    continue;
                }
                buf.push_str(&render_inline_element(child_el, opts));
            }
        }
    }
    buf.trim().to_string()
}

fn render_inline_element(el: ElementRef, opts: ConvertOptions) -> String {
    match el.value().name() {
        "a" => {
            let text = inline_content(el, opts);
            match el.value().attr("href") {
                Some(href) if !href.is_empty() => {
                    let label = if text.is_empty() { href } else { &text };
                    format!("[{}]({})", label, href)
                }
                _ => text,
            }
        }
        "img" => {
            if opts.strip_images {
                return String::new();
            }
            let alt = el.value().attr("alt").unwrap_or_default();
            match el.value().attr("src") {
                Some(src) => format!("![{}]({})", alt, src),
                None => String::new(),
            }
        }
        "strong" | "b" => wrap_nonempty(&inline_content(el, opts), "**"),
        "em" | "i" => wrap_nonempty(&inline_content(el, opts), "*"),
        "code" => wrap_nonempty(&inline_content(el, opts), "`"),
        "br" => "\n".to_string(),
        "script" | "style" | "noscript" => String::new(),
        _ => inline_content(el, opts),
    }
}

fn wrap_nonempty(text: &str, mark: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{mark}{text}{mark}")
    }
}

fn render_list(el: ElementRef, out: &mut String, opts: ConvertOptions, depth: usize, ordered: bool) {
    if depth == 0 {
        ensure_blank_line(out);
    }
    let mut index = 1usize;
    for child in el.children() {
        let li = match ElementRef::wrap(child) {
            Some(e) if e.value().name() == "li" => e,
            _ => continue,
        };

        // Item text first, nested lists after.
        let mut text = String::new();
        let mut nested = Vec::new();
        for li_child in li.children() {
            if let Some(t) = li_child.value().as_text() {
                push_collapsed(&mut text, &t.text);
            } else if let Some(li_el) = ElementRef::wrap(li_child) {
                match li_el.value().name() {
                    "ul" | "ol" => nested.push(li_el),
                    _ => text.push_str(&render_inline_element(li_el, opts)),
                }
            }
        }

        out.push_str(&"  ".repeat(depth));
        if ordered {
            out.push_str(&format!("{}. ", index));
            index += 1;
        } else {
            out.push_str("* ");
        }
        out.push_str(text.trim());
        out.push('\n');

        for sublist in nested {
            render_list(sublist, out, opts, depth + 1, sublist.value().name() == "ol");
        }
    }
    if depth == 0 {
        out.push('\n');
    }
}

fn render_table(el: ElementRef, out: &mut String, opts: ConvertOptions) {
    let row_selector = Selector::parse("tr").expect("selector should parse");
    let cell_selector = Selector::parse("th, td").expect("selector should parse");

    ensure_blank_line(out);
    for (i, row) in el.select(&row_selector).enumerate() {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| inline_content(cell, opts).replace('\n', " "))
            .collect();
        if cells.is_empty() {
            continue;
        }
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
        if i == 0 {
            out.push_str("| ");
            out.push_str(&vec!["---"; cells.len()].join(" | "));
            out.push_str(" |\n");
        }
    }
    out.push('\n');
}

/// Append text with runs of whitespace collapsed to single spaces, without
/// doubling spaces at the join point.
fn push_collapsed(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    // Drop trailing spaces so the blank line is genuinely blank.
    while out.ends_with(' ') {
        out.pop();
    }
    while !out.ends_with("\n\n") {
        out.push('\n');
    }
}
