//! Selector-driven extraction of article text from an HTML document.
//!
//! Two paths: a specialized one for encyclopedia-style pages (MediaWiki
//! content containers) and a generic one that walks a priority list of
//! content-container selectors. Boilerplate subtrees (scripts, navigation,
//! ads, social widgets) are skipped during text collection rather than
//! removed from the tree.

use scraper::{ElementRef, Html, Selector};

use super::clean::collapse_whitespace;

/// Title and raw (pre-cleanup) text of a page.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub title: String,
    pub text: String,
}

/// Tags whose subtrees never contain article text.
const STRIP_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "form",
];

/// Content-container selectors, in priority order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".story-body",
];

/// Minimum characters for a block in the generic path.
const MIN_BLOCK_CHARS: usize = 20;

/// Minimum characters for an encyclopedia paragraph.
const MIN_ENCYCLOPEDIA_PARA_CHARS: usize = 10;

/// Minimum total characters for the encyclopedia path to be trusted.
const MIN_ENCYCLOPEDIA_TOTAL_CHARS: usize = 50;

/// Parse a page and pull out its title and main text.
pub fn extract_content(html: &str) -> PageContent {
    let doc = Html::parse_document(html);
    let title = resolve_title(&doc);
    let text = encyclopedia_text(&doc).unwrap_or_else(|| generic_text(&doc));
    PageContent { title, text }
}

/// Title resolution: `<title>` tag, then first `<h1>`, then "Untitled".
fn resolve_title(doc: &Html) -> String {
    let title_sel = Selector::parse("title").unwrap();
    if let Some(el) = doc.select(&title_sel).next() {
        let text = collapse_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            return text;
        }
    }

    let h1_sel = Selector::parse("h1").unwrap();
    if let Some(el) = doc.select(&h1_sel).next() {
        let text = element_text(el);
        if !text.is_empty() {
            return text;
        }
    }

    "Untitled".to_string()
}

/// Specialized path for encyclopedia-style layouts.
///
/// Gathers paragraphs under the MediaWiki content container, dropping
/// citation superscripts and edit links, and keeping paragraphs long enough
/// to be prose. Yields `None` (fall back to the generic path) when the
/// markers are absent or the result is too thin.
fn encyclopedia_text(doc: &Html) -> Option<String> {
    let container_sel = Selector::parse("div.mw-parser-output, #mw-content-text").unwrap();
    let container = doc.select(&container_sel).next()?;

    let p_sel = Selector::parse("p").unwrap();
    let mut paragraphs = Vec::new();
    for p in container.select(&p_sel) {
        let text = element_text(p);
        if text.len() > MIN_ENCYCLOPEDIA_PARA_CHARS && !looks_like_chrome(&text) {
            paragraphs.push(text);
        }
    }

    let joined = paragraphs.join("\n");
    (joined.len() >= MIN_ENCYCLOPEDIA_TOTAL_CHARS).then_some(joined)
}

/// Generic path: priority-ordered container selectors, then all `<p>`
/// elements, then full body text.
fn generic_text(doc: &Html) -> String {
    let block_sel = Selector::parse("p, h1, h2, h3, h4, h5, h6, li").unwrap();

    for selector_str in CONTENT_SELECTORS {
        let sel = Selector::parse(selector_str).unwrap();
        let mut blocks: Vec<String> = Vec::new();
        for container in doc.select(&sel) {
            for block in container.select(&block_sel) {
                if in_skipped_subtree(block) {
                    continue;
                }
                let text = element_text(block);
                if text.len() > MIN_BLOCK_CHARS {
                    blocks.push(text);
                }
            }
        }
        if !blocks.is_empty() {
            return blocks.join("\n");
        }
    }

    // No recognizable container: all paragraphs with the length filter
    let p_sel = Selector::parse("p").unwrap();
    let paragraphs: Vec<String> = doc
        .select(&p_sel)
        .filter(|p| !in_skipped_subtree(*p))
        .map(element_text)
        .filter(|text| text.len() > MIN_BLOCK_CHARS)
        .collect();
    if !paragraphs.is_empty() {
        return paragraphs.join("\n");
    }

    body_text(doc)
}

/// Last resort: every text node under `<body>`.
fn body_text(doc: &Html) -> String {
    let body_sel = Selector::parse("body").unwrap();
    match doc.select(&body_sel).next() {
        Some(body) => element_text(body),
        None => collapse_whitespace(&doc.root_element().text().collect::<String>()),
    }
}

/// Collect the visible text of an element, skipping boilerplate subtrees.
fn element_text(el: ElementRef) -> String {
    if is_skippable(&el) {
        return String::new();
    }
    let mut out = String::new();
    collect_text(el, &mut out);
    collapse_whitespace(&out)
}

fn collect_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !is_skippable(&child_el) {
                collect_text(child_el, out);
            }
        }
    }
}

/// Whether an element's subtree should be excluded from extraction.
fn is_skippable(el: &ElementRef) -> bool {
    let element = el.value();
    if STRIP_TAGS.contains(&element.name()) {
        return true;
    }
    for attr in ["class", "id"] {
        if let Some(value) = element.attr(attr) {
            if has_clutter_token(value) {
                return true;
            }
        }
    }
    false
}

fn in_skipped_subtree(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_skippable(&ancestor))
}

/// Whether a class/id attribute value marks boilerplate.
///
/// Matching is per token (split on non-alphanumeric), case-insensitive, so
/// "header" does not trip on the embedded "ad".
fn has_clutter_token(attr_value: &str) -> bool {
    attr_value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| {
            let token = token.to_lowercase();
            matches!(token.as_str(), "ad" | "ads" | "advert" | "advertisement")
                || token.starts_with("nav")
                || token.starts_with("menu")
                || token.starts_with("sidebar")
                || token.starts_with("social")
                || token.starts_with("comment")
                || token.starts_with("related")
                || token.starts_with("reference")
                || token.starts_with("editsection")
        })
}

/// Filter for encyclopedia paragraphs that are navigation chrome, not prose.
fn looks_like_chrome(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.starts_with("jump to")
        || lower.starts_with("coordinates")
        || lower.starts_with("from wikipedia")
        || !text.chars().any(|c| c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_title_tag() {
        let html = "<html><head><title>Page Title</title></head><body><h1>Other</h1></body></html>";
        let content = extract_content(html);
        assert_eq!(content.title, "Page Title");
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = "<html><body><h1>Heading Title</h1><p>text</p></body></html>";
        let content = extract_content(html);
        assert_eq!(content.title, "Heading Title");
    }

    #[test]
    fn test_title_defaults_to_untitled() {
        let html = "<html><body><p>no headline anywhere on this page</p></body></html>";
        let content = extract_content(html);
        assert_eq!(content.title, "Untitled");
    }

    #[test]
    fn test_article_preferred_over_body() {
        let html = r#"
            <html><body>
              <nav><a href="/">Home</a><a href="/about">About</a></nav>
              <article>
                <p>This is the main article body with enough length to keep.</p>
              </article>
              <footer>Copyright notice text that should never appear.</footer>
            </body></html>
        "#;
        let content = extract_content(html);
        assert!(content.text.contains("main article body"));
        assert!(!content.text.contains("Copyright"));
        assert!(!content.text.contains("Home"));
    }

    #[test]
    fn test_clutter_classes_skipped() {
        let html = r#"
            <html><body>
              <article>
                <div class="sidebar-widget"><p>Trending stories you may have missed today.</p></div>
                <p>Actual paragraph content that belongs to the article itself.</p>
                <div class="ad-banner"><p>Buy one get one free, limited time offer!</p></div>
              </article>
            </body></html>
        "#;
        let content = extract_content(html);
        assert!(content.text.contains("Actual paragraph content"));
        assert!(!content.text.contains("Trending stories"));
        assert!(!content.text.contains("limited time offer"));
    }

    #[test]
    fn test_header_tag_not_confused_with_ad_token() {
        let html = r#"
            <html><body>
              <article>
                <div class="page-header-inner"><p>Section intro paragraph with sufficient length.</p></div>
              </article>
            </body></html>
        "#;
        // class tokens are "page", "header", "inner" - none is clutter
        let content = extract_content(html);
        assert!(content.text.contains("Section intro paragraph"));
    }

    #[test]
    fn test_encyclopedia_path() {
        let html = r#"
            <html><body>
              <div id="mw-content-text"><div class="mw-parser-output">
                <p>The Eiffel Tower is a wrought-iron lattice tower in Paris.<sup class="reference">[1]</sup></p>
                <p>It was completed in 1889 as the entrance arch to the fair.<span class="mw-editsection">edit</span></p>
                <p>Short.</p>
              </div></div>
            </body></html>
        "#;
        let content = extract_content(html);
        assert!(content.text.contains("wrought-iron lattice tower"));
        assert!(content.text.contains("completed in 1889"));
        assert!(!content.text.contains("[1]"));
        assert!(!content.text.contains("edit"));
        assert!(!content.text.contains("Short."));
    }

    #[test]
    fn test_encyclopedia_falls_back_when_thin() {
        let html = r#"
            <html><body>
              <div class="mw-parser-output"><p>Tiny stub here.</p></div>
              <article><p>The generic path still finds this longer paragraph of text.</p></article>
            </body></html>
        "#;
        let content = extract_content(html);
        assert!(content.text.contains("generic path still finds"));
    }

    #[test]
    fn test_paragraph_fallback_without_containers() {
        let html = r#"
            <html><body>
              <div><p>A paragraph without any recognizable content container around it.</p></div>
            </body></html>
        "#;
        let content = extract_content(html);
        assert!(content.text.contains("without any recognizable"));
    }

    #[test]
    fn test_body_fallback() {
        let html = "<html><body>Loose text directly in the body, no paragraph tags at all here.</body></html>";
        let content = extract_content(html);
        assert!(content.text.contains("Loose text directly"));
    }

    #[test]
    fn test_scripts_and_styles_never_leak() {
        let html = r#"
            <html><body>
              <article>
                <script>var tracker = "evil";</script>
                <style>.hidden { display: none; }</style>
                <p>Visible paragraph text that survives the extraction pass.</p>
              </article>
            </body></html>
        "#;
        let content = extract_content(html);
        assert!(content.text.contains("Visible paragraph"));
        assert!(!content.text.contains("tracker"));
        assert!(!content.text.contains("display"));
    }
}
