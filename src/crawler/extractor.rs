//! HTML content extraction
//!
//! Pulls the human-visible substance out of a fetched page: title, meta
//! description, main content text, and a lightweight keyword set. Boilerplate
//! containers (scripts, styles, navigation, page chrome) are skipped during
//! text collection.

use crate::keywords;
use scraper::{ElementRef, Html, Selector};

/// Elements whose subtrees never contribute content text
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "noscript", "iframe",
];

/// Candidate containers for the main content, most specific first
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    "#content",
    "#main-content",
    ".main-content",
    ".post-content",
    ".entry-content",
    ".content",
];

/// Caps applied to the derived keyword set
const HEADING_KEYWORD_CAP: usize = 10;
const FREQUENT_KEYWORD_CAP: usize = 10;
const PAGE_KEYWORD_CAP: usize = 15;

/// Content extracted from one HTML page
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    /// Text of the `<title>` element
    pub title: String,

    /// Value of the description meta tag
    pub meta_description: String,

    /// Main content text, whitespace-normalized and length-capped
    pub content: String,

    /// Keywords derived from headings and frequent content words
    pub keywords: Vec<String>,
}

/// Extracts title, description, content, and keywords from raw HTML
///
/// Parsing is lenient: malformed markup degrades to whatever the parser can
/// recover rather than failing. Content comes from the first matching
/// candidate container, falling back to the whole body.
pub fn extract_content(html: &str, max_content_length: usize) -> ExtractedContent {
    let document = Html::parse_document(html);

    let title = select_text(&document, "title");
    let meta_description = select_attr(&document, "meta[name=\"description\"]", "content");

    let content = normalize_whitespace(&main_content_text(&document));
    let content = truncate_chars(&content, max_content_length);

    let keywords = derive_keywords(&document, &content);

    ExtractedContent {
        title,
        meta_description,
        content,
        keywords,
    }
}

/// Collects the filtered text of the best content container
fn main_content_text(document: &Html) -> String {
    for selector in CONTENT_SELECTORS {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        if let Some(element) = document.select(&parsed).next() {
            let text = filtered_text(element);
            if !text.trim().is_empty() {
                return text;
            }
        }
    }

    // No recognized container; fall back to the whole body
    if let Ok(body) = Selector::parse("body") {
        if let Some(element) = document.select(&body).next() {
            return filtered_text(element);
        }
    }

    String::new()
}

/// Recursively collects text, skipping boilerplate subtrees
fn filtered_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if SKIPPED_TAGS.contains(&child_element.value().name()) {
                continue;
            }
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Derives the page keyword set from heading text and frequent content words
fn derive_keywords(document: &Html, content: &str) -> Vec<String> {
    let mut heading_text = String::new();
    if let Ok(selector) = Selector::parse("h1, h2, h3") {
        for heading in document.select(&selector) {
            heading_text.push_str(&heading.text().collect::<String>());
            heading_text.push(' ');
        }
    }

    let mut combined = keywords::extract_keywords(&heading_text, HEADING_KEYWORD_CAP);
    for word in keywords::top_frequent(content, FREQUENT_KEYWORD_CAP) {
        if !combined.contains(&word) {
            combined.push(word);
        }
        if combined.len() >= PAGE_KEYWORD_CAP {
            break;
        }
    }
    combined.truncate(PAGE_KEYWORD_CAP);
    combined
}

fn select_text(document: &Html, selector: &str) -> String {
    let Ok(parsed) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&parsed)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> String {
    let Ok(parsed) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&parsed)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_LEN: usize = 10_000;

    #[test]
    fn test_extract_title_and_description() {
        let html = r#"<html><head>
            <title>  Widget Emporium  </title>
            <meta name="description" content="The finest widgets online.">
            </head><body><p>hello</p></body></html>"#;

        let extracted = extract_content(html, MAX_LEN);
        assert_eq!(extracted.title, "Widget Emporium");
        assert_eq!(extracted.meta_description, "The finest widgets online.");
    }

    #[test]
    fn test_missing_title_and_description_are_empty() {
        let extracted = extract_content("<html><body><p>text</p></body></html>", MAX_LEN);
        assert_eq!(extracted.title, "");
        assert_eq!(extracted.meta_description, "");
    }

    #[test]
    fn test_prefers_main_container_over_body() {
        let html = r#"<html><body>
            <div class="sidebar">sidebar junk</div>
            <main>primary article text</main>
            </body></html>"#;

        let extracted = extract_content(html, MAX_LEN);
        assert_eq!(extracted.content, "primary article text");
    }

    #[test]
    fn test_falls_back_to_body_text() {
        let html = "<html><body><p>just a paragraph</p></body></html>";
        let extracted = extract_content(html, MAX_LEN);
        assert_eq!(extracted.content, "just a paragraph");
    }

    #[test]
    fn test_scripts_and_chrome_are_stripped() {
        let html = r#"<html><body>
            <nav>home about contact</nav>
            <header>site banner</header>
            <p>visible words</p>
            <script>var hidden = "code";</script>
            <style>.x { color: red }</style>
            <footer>copyright notice</footer>
            </body></html>"#;

        let extracted = extract_content(html, MAX_LEN);
        assert_eq!(extracted.content, "visible words");
    }

    #[test]
    fn test_content_is_truncated() {
        let body = "word ".repeat(100);
        let html = format!("<html><body><p>{}</p></body></html>", body);

        let extracted = extract_content(&html, 20);
        assert_eq!(extracted.content.chars().count(), 20);
    }

    #[test]
    fn test_keywords_from_headings() {
        let html = r#"<html><body>
            <h1>Premium Widget Catalog</h1>
            <h2>Wholesale Pricing</h2>
            <p>short body</p>
            </body></html>"#;

        let extracted = extract_content(html, MAX_LEN);
        assert!(extracted.keywords.contains(&"premium".to_string()));
        assert!(extracted.keywords.contains(&"widget".to_string()));
        assert!(extracted.keywords.contains(&"catalog".to_string()));
        assert!(extracted.keywords.contains(&"wholesale".to_string()));
    }

    #[test]
    fn test_keywords_include_frequent_content_words() {
        let html = r#"<html><body>
            <p>turbines turbines turbines generate power power</p>
            </body></html>"#;

        let extracted = extract_content(html, MAX_LEN);
        assert!(extracted.keywords.contains(&"turbines".to_string()));
        assert!(extracted.keywords.contains(&"power".to_string()));
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let extracted = extract_content("<html><body><div><p>unclosed", MAX_LEN);
        assert_eq!(extracted.content, "unclosed");
    }

    #[test]
    fn test_empty_document() {
        let extracted = extract_content("", MAX_LEN);
        assert_eq!(extracted.content, "");
        assert!(extracted.keywords.is_empty());
    }
}
