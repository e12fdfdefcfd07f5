use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::AuditError;

/// Category assigned when a record does not declare one.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Published verdict of a fact-check report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Verdict {
    True,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
    Misleading,
    Unproven,
    /// A label outside the known set, kept verbatim.
    Other(String),
    /// Missing, null, empty, or the literal `undefined`.
    #[default]
    Undefined,
}

impl Verdict {
    /// Parse a verdict label. Case-insensitive; spaces and hyphens count as `_`.
    pub fn parse(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "" | "undefined" | "null" | "none" => Verdict::Undefined,
            "true" | "correct" => Verdict::True,
            "mostly_true" => Verdict::MostlyTrue,
            "mixed" | "half_true" | "mixture" => Verdict::Mixed,
            "mostly_false" => Verdict::MostlyFalse,
            "false" | "incorrect" => Verdict::False,
            "misleading" => Verdict::Misleading,
            "unproven" | "unverified" | "unsubstantiated" => Verdict::Unproven,
            _ => Verdict::Other(label.trim().to_string()),
        }
    }

    /// Explicit conversion rules from a raw JSON value.
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Verdict::Undefined,
            Some(Value::String(s)) => Verdict::parse(s),
            Some(Value::Bool(true)) => Verdict::True,
            Some(Value::Bool(false)) => Verdict::False,
            Some(other) => Verdict::Other(other.to_string()),
        }
    }

    /// `true` and `false` are the strong verdicts that need the most evidence.
    pub fn is_strong(&self) -> bool {
        matches!(self, Verdict::True | Verdict::False)
    }

    /// Verdicts that reject a claim and should address the other side.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Verdict::False | Verdict::MostlyFalse | Verdict::Misleading
        )
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::MostlyTrue => write!(f, "mostly_true"),
            Self::Mixed => write!(f, "mixed"),
            Self::MostlyFalse => write!(f, "mostly_false"),
            Self::False => write!(f, "false"),
            Self::Misleading => write!(f, "misleading"),
            Self::Unproven => write!(f, "unproven"),
            Self::Other(label) => write!(f, "{label}"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Typed metadata for one report in the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub id: String,
    pub title: Option<String>,
    /// `UNKNOWN_CATEGORY` when not declared.
    pub category: String,
    pub verdict: Verdict,
    /// Declared source count, `None` when absent or unparseable.
    pub sources: Option<u32>,
    pub date: Option<String>,
}

impl DocumentMeta {
    /// Metadata for a document with nothing declared beyond its id.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            category: UNKNOWN_CATEGORY.to_string(),
            verdict: Verdict::Undefined,
            sources: None,
            date: None,
        }
    }
}

/// Wire shape of a listing record before the defaulting rules are applied.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, alias = "slug")]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    verdict: Option<Value>,
    #[serde(default, alias = "source_count", alias = "sourceCount")]
    sources: Option<Value>,
    #[serde(default, alias = "published", alias = "publication_date")]
    date: Option<String>,
}

fn parse_sources(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_id(value: Option<&Value>) -> Option<String> {
    let id = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Result of parsing a metadata listing: usable records plus record-level warnings.
#[derive(Debug, Default)]
pub struct ParsedListing {
    pub records: Vec<DocumentMeta>,
    pub warnings: Vec<String>,
}

/// Parse a metadata listing.
///
/// Accepts a JSON array of records, or a JavaScript data module whose array
/// literal (first `[` to last `]`) is valid JSON. Nothing is evaluated.
/// Records without an id and repeated ids are dropped with a warning; a body
/// that is not a record array is fatal.
pub fn parse_listing(text: &str, path: &Path) -> Result<ParsedListing, AuditError> {
    let parse_err = |reason: String| AuditError::MetadataParse {
        path: path.to_path_buf(),
        reason,
    };

    let trimmed = text.trim_start_matches('\u{feff}').trim();
    let body = if trimmed.starts_with('[') {
        trimmed
    } else {
        let start = trimmed
            .find('[')
            .ok_or_else(|| parse_err("no array literal found".to_string()))?;
        let end = trimmed
            .rfind(']')
            .filter(|end| *end > start)
            .ok_or_else(|| parse_err("unterminated array literal".to_string()))?;
        &trimmed[start..=end]
    };

    let raw: Vec<Value> = serde_json::from_str(body).map_err(|e| parse_err(e.to_string()))?;

    let mut parsed = ParsedListing::default();
    let mut seen = HashSet::new();

    for (index, value) in raw.into_iter().enumerate() {
        let record: RawRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                parsed
                    .warnings
                    .push(format!("record #{index} is malformed: {e}"));
                continue;
            }
        };

        let Some(id) = parse_id(record.id.as_ref()) else {
            parsed
                .warnings
                .push(format!("record #{index} has no id, skipped"));
            continue;
        };

        if !seen.insert(id.clone()) {
            parsed
                .warnings
                .push(format!("duplicate id '{id}' at record #{index}, keeping the first"));
            continue;
        }

        let category = record
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        parsed.records.push(DocumentMeta {
            id,
            title: record.title,
            category,
            verdict: Verdict::from_value(record.verdict.as_ref()),
            sources: parse_sources(record.sources.as_ref()),
            date: record.date,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedListing {
        parse_listing(text, Path::new("claims.json")).unwrap()
    }

    #[test]
    fn parses_plain_json_array() {
        let listing = parse(
            r#"[{"id": "vaccine-claim", "category": "health", "verdict": "False", "sources": 9, "date": "2024-03-01"}]"#,
        );
        assert_eq!(listing.records.len(), 1);
        let meta = &listing.records[0];
        assert_eq!(meta.id, "vaccine-claim");
        assert_eq!(meta.category, "health");
        assert_eq!(meta.verdict, Verdict::False);
        assert_eq!(meta.sources, Some(9));
        assert_eq!(meta.date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn parses_javascript_data_module() {
        let listing = parse(
            "// generated\nconst claims = [\n  {\"slug\": \"a\", \"verdict\": \"mostly true\"}\n];\nexport default claims;\n",
        );
        assert_eq!(listing.records.len(), 1);
        assert_eq!(listing.records[0].id, "a");
        assert_eq!(listing.records[0].verdict, Verdict::MostlyTrue);
    }

    #[test]
    fn missing_fields_take_explicit_defaults() {
        let listing = parse(r#"[{"id": "bare"}]"#);
        let meta = &listing.records[0];
        assert_eq!(meta.category, UNKNOWN_CATEGORY);
        assert_eq!(meta.verdict, Verdict::Undefined);
        assert_eq!(meta.sources, None);
    }

    #[test]
    fn source_count_accepts_aliases_and_numeric_strings() {
        let listing = parse(
            r#"[{"id": "a", "sourceCount": "12"}, {"id": "b", "source_count": 4}, {"id": "c", "sources": "many"}]"#,
        );
        let counts: Vec<_> = listing.records.iter().map(|m| m.sources).collect();
        assert_eq!(counts, vec![Some(12), Some(4), None]);
    }

    #[test]
    fn literal_undefined_and_null_verdicts_are_undefined() {
        let listing = parse(
            r#"[{"id": "a", "verdict": "undefined"}, {"id": "b", "verdict": null}, {"id": "c", "verdict": ""}]"#,
        );
        assert!(listing
            .records
            .iter()
            .all(|m| m.verdict == Verdict::Undefined));
    }

    #[test]
    fn unknown_verdict_label_is_kept() {
        assert_eq!(
            Verdict::parse("Pants on Fire"),
            Verdict::Other("Pants on Fire".to_string())
        );
    }

    #[test]
    fn records_without_id_and_duplicates_warn() {
        let listing = parse(r#"[{"category": "x"}, {"id": "a"}, {"id": "a"}]"#);
        assert_eq!(listing.records.len(), 1);
        assert_eq!(listing.warnings.len(), 2);
    }

    #[test]
    fn non_array_listing_is_fatal() {
        let err = parse_listing(r#"{"id": "a"}"#, Path::new("claims.json")).unwrap_err();
        assert!(matches!(err, AuditError::MetadataParse { .. }));
    }

    #[test]
    fn broken_json_is_fatal() {
        let err = parse_listing("[{\"id\": ", Path::new("claims.json")).unwrap_err();
        assert!(matches!(err, AuditError::MetadataParse { .. }));
    }

    #[test]
    fn strong_and_negative_verdicts() {
        assert!(Verdict::True.is_strong());
        assert!(Verdict::False.is_strong());
        assert!(!Verdict::Mixed.is_strong());
        assert!(Verdict::Misleading.is_negative());
        assert!(!Verdict::True.is_negative());
    }
}
