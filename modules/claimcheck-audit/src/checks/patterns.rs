use regex::Regex;
use tracing::warn;

use claimcheck_common::{AuditConfig, DomainClass, PatternDef, PatternTarget, Severity};

use crate::types::{ProcessIssue, Stage};

/// Bumped whenever a built-in pattern is added, removed, or changes meaning.
pub const PATTERN_TABLE_VERSION: &str = "claimcheck-patterns/4";

/// Built-in concern types.
pub mod kinds {
    pub const VAGUE_AUTHORITY: &str = "vague_authority";
    pub const TRUNCATED_QUOTE: &str = "truncated_quote";
    pub const ABSOLUTIST_LANGUAGE: &str = "absolutist_language";
    pub const OPINION_SOURCE: &str = "opinion_source";
    pub const ENCYCLOPEDIA_SOURCE: &str = "encyclopedia_source";
    pub const CIRCULAR_REASONING: &str = "circular_reasoning";
    pub const LOW_INFORMATION_LINK_TEXT: &str = "low_information_link_text";
    pub const UNDEFINED_VERDICT: &str = "undefined_verdict";
    pub const THIN_EVIDENCE: &str = "thin_evidence";
    pub const MISSING_COUNTERPOINT: &str = "missing_counterpoint";
}

/// Checks computed from document metadata rather than a text match.
#[derive(Debug, Clone)]
pub enum MetadataCheck {
    /// The verdict is missing or literally `undefined`.
    UndefinedVerdict,
    /// A strong verdict backed by fewer than `min_sources` declared sources.
    ThinEvidence { min_sources: u32 },
    /// A hedged negative verdict (`mostly_false`, `misleading`) whose text
    /// never matches the counter-argument phrasing. Strong verdicts are
    /// covered by thin evidence instead.
    MissingCounterpoint(Regex),
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Prose(Regex),
    LinkUrl(Regex),
    LinkText(Regex),
    LinkClass(DomainClass),
    Metadata(MetadataCheck),
}

/// A named detector with its default severity and remediation hint.
#[derive(Debug, Clone)]
pub struct ConcernPattern {
    pub kind: String,
    pub matcher: Matcher,
    pub severity: Severity,
    pub remediation: String,
}

/// Source form of a built-in matcher, compiled through the same fallible
/// path as configured patterns.
enum BuiltinMatcher {
    Regex(PatternTarget, &'static str),
    LinkClass(DomainClass),
    UndefinedVerdict,
    ThinEvidence,
    MissingCounterpoint(&'static str),
}

struct Builtin {
    kind: &'static str,
    severity: Severity,
    matcher: BuiltinMatcher,
    remediation: &'static str,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        kind: kinds::VAGUE_AUTHORITY,
        severity: Severity::Medium,
        matcher: BuiltinMatcher::Regex(
            PatternTarget::Prose,
            r"(?i)\b(?:(?:many|some|most|top|leading)\s+)?(?:experts|scientists|researchers|doctors|studies|research|officials|sources)\s+(?:say|says|said|show|shows|showed|suggest|suggests|agree|claim|claims|believe)\b|\bit\s+is\s+(?:widely|commonly|generally)\s+(?:believed|known|accepted)\b|\bsome\s+people\s+say\b",
        ),
        remediation: "Name the expert, study, or institution and link to it.",
    },
    Builtin {
        kind: kinds::TRUNCATED_QUOTE,
        severity: Severity::Medium,
        matcher: BuiltinMatcher::Regex(
            PatternTarget::Prose,
            r#"["\u{201C}][^"\u{201C}\u{201D}]{0,300}?(?:\.\.\.|\u{2026}|\[\s*\.\.\.\s*\])[^"\u{201C}\u{201D}]{0,300}?["\u{201D}]"#,
        ),
        remediation: "Quote the full passage or link to the unedited source so elisions can be checked.",
    },
    Builtin {
        kind: kinds::ABSOLUTIST_LANGUAGE,
        severity: Severity::Medium,
        matcher: BuiltinMatcher::Regex(
            PatternTarget::Prose,
            r"(?i)\b(?:100\s?%\s+(?:false|true|wrong|accurate|fake|fabricated)|completely\s+(?:false|untrue|fabricated|debunked)|totally\s+(?:false|untrue|fabricated)|always|never|undeniabl[ey]|indisputabl[ey]|without\s+(?:a|any)\s+doubt)\b",
        ),
        remediation: "State the finding with the confidence the evidence supports.",
    },
    Builtin {
        kind: kinds::OPINION_SOURCE,
        severity: Severity::Medium,
        matcher: BuiltinMatcher::LinkClass(DomainClass::Opinion),
        remediation: "Replace opinion or self-published sources with primary evidence.",
    },
    Builtin {
        kind: kinds::ENCYCLOPEDIA_SOURCE,
        severity: Severity::High,
        matcher: BuiltinMatcher::LinkClass(DomainClass::Encyclopedia),
        remediation: "Cite the primary source the encyclopedia entry relies on instead.",
    },
    Builtin {
        kind: kinds::CIRCULAR_REASONING,
        severity: Severity::Medium,
        matcher: BuiltinMatcher::Regex(
            PatternTarget::Prose,
            r"(?i)\b(?:is|are)\s+(?:true|false|wrong|right)\s+because\s+(?:it|they|this)\s+(?:is|are)\s+(?:true|false|wrong|right)\b|\bas\s+everyone\s+knows\b|\bit\s+goes\s+without\s+saying\b|\bself-evident(?:ly)?\b|\bobviously\s+(?:true|false)\b",
        ),
        remediation: "Support the conclusion with evidence rather than restating it.",
    },
    Builtin {
        kind: kinds::LOW_INFORMATION_LINK_TEXT,
        severity: Severity::Low,
        matcher: BuiltinMatcher::Regex(
            PatternTarget::LinkText,
            r"(?i)^\s*(?:click\s+here|here|read\s+more|learn\s+more|more|this|this\s+link|link|source|see\s+here)\s*[.!:]?\s*$",
        ),
        remediation: "Use anchor text that names the source being cited.",
    },
    Builtin {
        kind: kinds::UNDEFINED_VERDICT,
        severity: Severity::High,
        matcher: BuiltinMatcher::UndefinedVerdict,
        remediation: "Publish a verdict label in the report metadata.",
    },
    Builtin {
        kind: kinds::THIN_EVIDENCE,
        severity: Severity::High,
        matcher: BuiltinMatcher::ThinEvidence,
        remediation: "Strong verdicts need more independent sources; add sources or soften the verdict.",
    },
    Builtin {
        kind: kinds::MISSING_COUNTERPOINT,
        severity: Severity::Medium,
        matcher: BuiltinMatcher::MissingCounterpoint(
            r"(?i)\b(?:however|on\s+the\s+other\s+hand|critics|proponents|supporters\s+(?:argue|say|claim|point)|counter-?arguments?|in\s+fairness|to\s+be\s+fair|while\s+it\s+is\s+true|defenders|advocates\s+(?:argue|say)|the\s+other\s+side)\b",
        ),
        remediation: "Present the strongest argument for the claim before rejecting it.",
    },
];

/// A compiled, versioned pattern table. Passed into the scanner by value so
/// each pattern can be exercised in isolation.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    pub version: String,
    pub patterns: Vec<ConcernPattern>,
}

impl PatternSet {
    /// Built-in table minus disabled kinds, plus configured extra patterns.
    /// Patterns that fail to compile are skipped and reported.
    pub fn from_config(config: &AuditConfig) -> (Self, Vec<ProcessIssue>) {
        let mut issues = Vec::new();
        let mut patterns = Vec::new();
        let min_sources = config.scoring.min_sources;

        for builtin in BUILTINS {
            if config.patterns.disabled.iter().any(|k| k == builtin.kind) {
                continue;
            }
            let matcher = match &builtin.matcher {
                BuiltinMatcher::Regex(target, source) => compile_regex(builtin.kind, source)
                    .map(|re| regex_matcher(*target, re)),
                BuiltinMatcher::LinkClass(class) => Ok(Matcher::LinkClass(*class)),
                BuiltinMatcher::UndefinedVerdict => {
                    Ok(Matcher::Metadata(MetadataCheck::UndefinedVerdict))
                }
                BuiltinMatcher::ThinEvidence => {
                    Ok(Matcher::Metadata(MetadataCheck::ThinEvidence { min_sources }))
                }
                BuiltinMatcher::MissingCounterpoint(source) => compile_regex(builtin.kind, source)
                    .map(|re| Matcher::Metadata(MetadataCheck::MissingCounterpoint(re))),
            };
            match matcher {
                Ok(matcher) => patterns.push(ConcernPattern {
                    kind: builtin.kind.to_string(),
                    matcher,
                    severity: builtin.severity,
                    remediation: builtin.remediation.to_string(),
                }),
                Err(issue) => issues.push(issue),
            }
        }

        let (extra, extra_issues) = Self::from_defs(&config.patterns.extra);
        patterns.extend(extra.patterns);
        issues.extend(extra_issues);

        (
            Self {
                version: PATTERN_TABLE_VERSION.to_string(),
                patterns,
            },
            issues,
        )
    }

    /// The built-in table with default settings.
    pub fn builtin() -> Self {
        Self::from_config(&AuditConfig::default()).0
    }

    /// Compile regex pattern definitions. Malformed ones are skipped.
    pub fn from_defs(defs: &[PatternDef]) -> (Self, Vec<ProcessIssue>) {
        let mut issues = Vec::new();
        let mut patterns = Vec::new();

        for def in defs {
            match compile_regex(&def.kind, &def.pattern) {
                Ok(re) => patterns.push(ConcernPattern {
                    kind: def.kind.clone(),
                    matcher: regex_matcher(def.target, re),
                    severity: def.severity,
                    remediation: def.remediation.clone(),
                }),
                Err(issue) => issues.push(issue),
            }
        }

        (
            Self {
                version: PATTERN_TABLE_VERSION.to_string(),
                patterns,
            },
            issues,
        )
    }

    /// Only the patterns of one kind, for testing a detector on its own.
    pub fn only(&self, kind: &str) -> Self {
        Self {
            version: self.version.clone(),
            patterns: self
                .patterns
                .iter()
                .filter(|p| p.kind == kind)
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Remediation hint of a kind, if the table has it.
    pub fn remediation(&self, kind: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.remediation.as_str())
    }
}

fn regex_matcher(target: PatternTarget, re: Regex) -> Matcher {
    match target {
        PatternTarget::Prose => Matcher::Prose(re),
        PatternTarget::LinkUrl => Matcher::LinkUrl(re),
        PatternTarget::LinkText => Matcher::LinkText(re),
    }
}

fn compile_regex(kind: &str, source: &str) -> Result<Regex, ProcessIssue> {
    Regex::new(source).map_err(|e| {
        warn!(pattern = kind, error = %e, "Pattern failed to compile, skipping");
        ProcessIssue::warning(
            Stage::Patterns,
            kind,
            format!("pattern failed to compile: {e}"),
        )
    })
}
