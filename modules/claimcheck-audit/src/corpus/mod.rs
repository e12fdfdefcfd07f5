pub mod html;
pub mod loader;

pub use html::Link;
pub use loader::{load_corpus, Corpus};

use claimcheck_common::DocumentMeta;

/// One report in the corpus. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    pub meta: DocumentMeta,
    /// Raw source as read from disk.
    pub raw: String,
    /// Plain-text projection of `raw`.
    pub text: String,
    pub links: Vec<Link>,
}

impl Document {
    pub fn from_html(meta: DocumentMeta, raw: String) -> Self {
        let text = html::plain_text(&raw);
        let links = html::extract_links(&raw);
        Self {
            meta,
            raw,
            text,
            links,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }
}

impl Link {
    /// Absolute http(s) or protocol-relative links leave the site.
    pub fn is_external(&self) -> bool {
        let lower = self.url.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
    }
}
