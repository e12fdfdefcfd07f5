use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};

/// `<a ... href="...">anchor</a>`. Only anchors carry outbound citations.
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#,
    )
    .expect("valid regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Elements whose text never reaches a reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Elements that start a new run of text.
const BLOCK_ELEMENTS: [&str; 22] = [
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "table", "section", "article", "blockquote", "header", "footer", "figcaption",
];

/// An outbound link found in a document's raw source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub anchor_text: String,
    /// Byte offset of the `<a` tag in the raw source.
    pub offset: usize,
    /// 1-based line of the `<a` tag in the raw source.
    pub line: usize,
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Plain-text projection of an HTML document: hidden elements dropped,
/// entities decoded, whitespace normalized.
pub fn plain_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 2);

    for node in document.tree.root().descendants() {
        let text = match node.value() {
            Node::Text(text) => text,
            Node::Element(el) => {
                if BLOCK_ELEMENTS.contains(&el.name()) {
                    out.push(' ');
                }
                continue;
            }
            _ => continue,
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(el) => HIDDEN_ELEMENTS.contains(&el.name()),
            _ => false,
        });
        if hidden {
            continue;
        }
        out.push_str(text);
    }

    normalize_whitespace(&out)
}

/// Text content of an HTML fragment (anchor bodies).
fn fragment_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect::<Vec<_>>().join(" ");
    normalize_whitespace(&text)
}

/// Hrefs that do not leave the page or are not navigable.
fn is_navigable(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    !(href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}

/// Extract every anchor with its URL, anchor text, offset, and line number.
/// Hrefs are entity-decoded (`&amp;` in query strings) and trimmed.
pub fn extract_links(html: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut line = 1;
    let mut scanned_to = 0;

    for caps in ANCHOR_RE.captures_iter(html) {
        let href = caps.get(1).or_else(|| caps.get(2));
        let (Some(whole), Some(href), Some(body)) = (caps.get(0), href, caps.get(3)) else {
            continue;
        };
        let href = href.as_str().trim().replace("&amp;", "&");
        if !is_navigable(&href) {
            continue;
        }

        line += html[scanned_to..whole.start()].matches('\n').count();
        scanned_to = whole.start();

        links.push(Link {
            url: href,
            anchor_text: fragment_text(body.as_str()),
            offset: whole.start(),
            line,
        });
    }

    links
}

/// Largest char boundary `<= index`.
pub fn floor_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= index`.
pub fn ceil_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Up to `radius` bytes of context on each side of `start..end`, aligned to
/// char boundaries.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let from = floor_boundary(text, start.saturating_sub(radius));
    let to = ceil_boundary(text, end.saturating_add(radius));
    text[from..to].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_strips_tags_and_decodes_entities() {
        let html = "<html><body><h1>Claim&nbsp;check</h1>\n<p>Tom &amp; Jerry   said <b>so</b>.</p></body></html>";
        assert_eq!(plain_text(html), "Claim check Tom & Jerry said so.");
    }

    #[test]
    fn plain_text_drops_scripts_and_styles() {
        let html = "<head><style>p { color: red }</style><script>var always = 1;</script></head><body><p>Visible</p></body>";
        assert_eq!(plain_text(html), "Visible");
    }

    #[test]
    fn extracts_links_with_anchor_text_and_lines() {
        let html = "<p>Intro</p>\n<p>See <a href=\"https://www.cdc.gov/data\">CDC <em>data</em></a></p>\n<a class='x' href='https://example.com/a?x=1&amp;y=2'>here</a>";
        let links = extract_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://www.cdc.gov/data");
        assert_eq!(links[0].anchor_text, "CDC data");
        assert_eq!(links[0].line, 2);
        assert_eq!(&html[links[0].offset..links[0].offset + 2], "<a");
        assert_eq!(links[1].url, "https://example.com/a?x=1&y=2");
        assert_eq!(links[1].anchor_text, "here");
        assert_eq!(links[1].line, 3);
    }

    #[test]
    fn quoted_hrefs_may_contain_the_other_quote() {
        let html = r#"<a href="https://x.com/it's-fine">One</a> <a href='https://x.com/say-"hi"'>Two</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://x.com/it's-fine");
        assert_eq!(links[1].url, r#"https://x.com/say-"hi""#);
        assert_eq!(links[1].anchor_text, "Two");
    }

    #[test]
    fn skips_non_navigable_hrefs() {
        let html = r##"<a href="#top">Top</a><a href="mailto:a@b.c">Mail</a><a href="javascript:void(0)">JS</a><a href="/about">About</a>"##;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "/about");
    }

    #[test]
    fn context_window_respects_char_boundaries() {
        let text = "ééééé 100% false ééééé";
        let start = text.find("100%").unwrap();
        let end = start + "100% false".len();
        let window = context_window(text, start, end, 3);
        assert!(window.contains("100% false"));
    }

    #[test]
    fn context_window_clamps_to_text() {
        let text = "short";
        assert_eq!(context_window(text, 0, 5, 100), "short");
    }
}
