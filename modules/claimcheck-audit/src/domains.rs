use url::Url;

use claimcheck_common::{DomainClass, DomainsConfig};

/// Tertiary references. Checked first: citing them is a compliance violation.
const ENCYCLOPEDIA_HOSTS: &[&str] = &[
    "wikipedia.org",
    "wikimedia.org",
    "wiktionary.org",
    "wikiwand.com",
    "britannica.com",
    "encyclopedia.com",
    "everipedia.org",
    "fandom.com",
    "infoplease.com",
];

const GOVERNMENT_HOSTS: &[&str] = &[
    "europa.eu",
    "un.org",
    "who.int",
    "worldbank.org",
    "imf.org",
    "oecd.org",
    "gc.ca",
    "canada.ca",
    "gouv.fr",
    "bund.de",
];

/// Host suffixes that mark government domains (`.gov`, `.gov.uk`, `.mil`, ...).
const GOVERNMENT_LABELS: &[&str] = &["gov", "mil"];

const ACADEMIC_HOSTS: &[&str] = &[
    "doi.org",
    "arxiv.org",
    "jstor.org",
    "nature.com",
    "science.org",
    "sciencedirect.com",
    "springer.com",
    "wiley.com",
    "plos.org",
    "thelancet.com",
    "nejm.org",
    "bmj.com",
    "jamanetwork.com",
    "cochranelibrary.com",
    "ssrn.com",
    "researchgate.net",
    "scholar.google.com",
    "semanticscholar.org",
    "pnas.org",
];

/// Host labels that mark academic domains (`.edu`, `.ac.uk`, `.edu.au`, ...).
const ACADEMIC_LABELS: &[&str] = &["edu", "ac"];

/// Curated news allow-list.
const NEWS_HOSTS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "afp.com",
    "bbc.com",
    "bbc.co.uk",
    "npr.org",
    "pbs.org",
    "nytimes.com",
    "washingtonpost.com",
    "wsj.com",
    "theguardian.com",
    "ft.com",
    "economist.com",
    "bloomberg.com",
    "cnn.com",
    "nbcnews.com",
    "cbsnews.com",
    "abcnews.go.com",
    "latimes.com",
    "usatoday.com",
    "politico.com",
    "axios.com",
    "aljazeera.com",
    "propublica.org",
];

/// Substrings of the host that indicate opinion or self-published content.
const OPINION_HOST_MARKERS: &[&str] = &[
    "blog",
    "opinion",
    "substack",
    "medium.com",
    "wordpress",
    "tumblr",
    "editorial",
];

/// Path segments that indicate opinion pages on otherwise unclassified hosts.
const OPINION_PATH_MARKERS: &[&str] = &["/opinion", "/op-ed", "/oped", "/editorial", "/blog"];

/// `host` equals `domain` or is a subdomain of it.
fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
    !domain.is_empty()
        && (host == domain
            || host
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.')))
}

/// `host` ends in one of `labels`, either as the top-level label (`cdc.gov`)
/// or just before a two-letter country code (`ox.ac.uk`, `data.gov.au`).
fn has_suffix_label(host: &str, labels: &[&str]) -> bool {
    let parts: Vec<&str> = host.split('.').collect();
    match parts.as_slice() {
        [.., _, tld] if labels.contains(tld) => true,
        [.., sld, cc] => {
            cc.len() == 2 && cc.bytes().all(|b| b.is_ascii_alphabetic()) && labels.contains(sld)
        }
        _ => false,
    }
}

/// Ordered, first-match-wins URL classifier.
///
/// Rules run encyclopedia, government, academic, news, opinion. Anything else,
/// including relative or unparseable URLs, is `Other`, so every input maps to
/// exactly one class.
#[derive(Debug, Clone, Default)]
pub struct DomainClassifier {
    extra: DomainsConfig,
}

impl DomainClassifier {
    pub fn new(extra: DomainsConfig) -> Self {
        Self { extra }
    }

    pub fn classify(&self, url: &str) -> DomainClass {
        let Some((host, path)) = parse_host(url) else {
            return DomainClass::Other;
        };
        let listed = |builtin: &[&str], extra: &[String]| {
            builtin.iter().any(|d| host_matches(&host, d))
                || extra.iter().any(|d| host_matches(&host, d))
        };

        if listed(ENCYCLOPEDIA_HOSTS, &self.extra.encyclopedia) {
            return DomainClass::Encyclopedia;
        }
        if has_suffix_label(&host, GOVERNMENT_LABELS)
            || listed(GOVERNMENT_HOSTS, &self.extra.government)
        {
            return DomainClass::Government;
        }
        if has_suffix_label(&host, ACADEMIC_LABELS)
            || listed(ACADEMIC_HOSTS, &self.extra.academic)
        {
            return DomainClass::Academic;
        }
        if listed(NEWS_HOSTS, &self.extra.news) {
            return DomainClass::News;
        }
        if OPINION_HOST_MARKERS.iter().any(|m| host.contains(m))
            || OPINION_PATH_MARKERS.iter().any(|m| path.starts_with(m))
            || listed(&[], &self.extra.opinion)
        {
            return DomainClass::Opinion;
        }
        DomainClass::Other
    }
}

/// Lowercased host without `www.`, and the lowercased path.
fn parse_host(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    let parsed = if url.starts_with("//") {
        Url::parse(&format!("https:{url}")).ok()?
    } else {
        Url::parse(url).ok()?
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    Some((host, parsed.path().to_ascii_lowercase()))
}
