use std::path::{Path, PathBuf};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::types::{ScanMode, Severity, StratifyBy};

/// Audit run configuration: built-in defaults, optionally overlaid by a TOML
/// file, then by command-line flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Directory holding one document per metadata record.
    pub documents_dir: PathBuf,
    /// JSON (or JavaScript data module) listing of report metadata.
    pub metadata_path: PathBuf,
    pub document_extension: String,
    pub mode: ScanMode,
    pub sample_size: usize,
    pub stratify_by: StratifyBy,
    /// Sampling seed. Drawn from the process RNG and recorded when absent.
    pub seed: Option<u64>,
    /// Characters of context captured on each side of a match.
    pub context_chars: usize,
    /// Documents scanned concurrently.
    pub concurrency: usize,
    pub weights: ScoreWeights,
    pub scoring: ScoringConfig,
    pub patterns: PatternsConfig,
    pub domains: DomainsConfig,
    pub structure: StructureConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("reports"),
            metadata_path: PathBuf::from("data/claims.json"),
            document_extension: "html".to_string(),
            mode: ScanMode::Sample,
            sample_size: 28,
            stratify_by: StratifyBy::Verdict,
            seed: None,
            context_chars: 60,
            concurrency: 8,
            weights: ScoreWeights::default(),
            scoring: ScoringConfig::default(),
            patterns: PatternsConfig::default(),
            domains: DomainsConfig::default(),
            structure: StructureConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Load a TOML config file. Missing sections keep their defaults.
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuditError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            AuditError::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
        })
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        self.weights.validate()?;
        self.scoring.validate()?;
        if self.sample_size == 0 {
            return Err(AuditError::InvalidConfig(
                "sample_size must be at least 1".to_string(),
            ));
        }
        if self.context_chars > 1000 {
            return Err(AuditError::InvalidConfig(format!(
                "context_chars must be at most 1000, got {}",
                self.context_chars
            )));
        }
        if self.concurrency == 0 {
            return Err(AuditError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.document_extension.trim_start_matches('.').is_empty() {
            return Err(AuditError::InvalidConfig(
                "document_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Weights of the four sub-scores in the overall score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    pub source: f64,
    pub methodology: f64,
    pub technical: f64,
    pub consistency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            source: 0.35,
            methodology: 0.25,
            technical: 0.25,
            consistency: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), AuditError> {
        let all = [self.source, self.methodology, self.technical, self.consistency];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AuditError::InvalidConfig(format!(
                "score weights must be finite and non-negative, got {all:?}"
            )));
        }
        let sum: f64 = all.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AuditError::InvalidConfig(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Parses `source,methodology,technical,consistency`.
impl FromStr for ScoreWeights {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AuditError::InvalidConfig(format!("invalid weights '{s}': {e}")))?;

        let &[source, methodology, technical, consistency] = &values[..] else {
            return Err(AuditError::InvalidConfig(format!(
                "expected four comma-separated weights, got '{s}'"
            )));
        };

        let weights = Self {
            source,
            methodology,
            technical,
            consistency,
        };
        weights.validate()?;
        Ok(weights)
    }
}

/// Every threshold, penalty, and bonus used by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub target_avg_sources: f64,
    pub avg_sources_penalty_per_point: f64,
    pub bonus_avg_sources: f64,
    pub avg_sources_bonus: f64,
    pub encyclopedia_penalty_per_link: f64,
    pub encyclopedia_penalty_cap: f64,
    pub authoritative_bonus_max: f64,
    /// Documents declaring fewer sources than this are under-threshold.
    pub min_sources: u32,
    pub thin_doc_source_penalty: f64,
    pub thin_doc_source_cap: f64,
    pub thin_doc_method_penalty: f64,
    pub thin_doc_method_cap: f64,
    pub balance_threshold: f64,
    pub balance_penalty_scale: f64,
    pub dominance_threshold: f64,
    pub dominance_penalty_scale: f64,
    pub styling_penalty_per_violation: f64,
    pub styling_penalty_cap: f64,
    pub visual_target_fraction: f64,
    pub visual_scale: f64,
    pub encyclopedia_technical_penalty: f64,
    pub encyclopedia_technical_cap: f64,
    pub consistency_penalty_per_document: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_avg_sources: 8.0,
            avg_sources_penalty_per_point: 5.0,
            bonus_avg_sources: 10.0,
            avg_sources_bonus: 5.0,
            encyclopedia_penalty_per_link: 5.0,
            encyclopedia_penalty_cap: 25.0,
            authoritative_bonus_max: 10.0,
            min_sources: 6,
            thin_doc_source_penalty: 2.0,
            thin_doc_source_cap: 20.0,
            thin_doc_method_penalty: 1.5,
            thin_doc_method_cap: 15.0,
            balance_threshold: 0.6,
            balance_penalty_scale: 50.0,
            dominance_threshold: 0.5,
            dominance_penalty_scale: 40.0,
            styling_penalty_per_violation: 2.0,
            styling_penalty_cap: 30.0,
            visual_target_fraction: 0.5,
            visual_scale: 20.0,
            encyclopedia_technical_penalty: 1.0,
            encyclopedia_technical_cap: 10.0,
            consistency_penalty_per_document: 5.0,
        }
    }
}

impl ScoringConfig {
    /// Every constant must be a finite, non-negative number.
    pub fn validate(&self) -> Result<(), AuditError> {
        let values = [
            ("target_avg_sources", self.target_avg_sources),
            ("avg_sources_penalty_per_point", self.avg_sources_penalty_per_point),
            ("bonus_avg_sources", self.bonus_avg_sources),
            ("avg_sources_bonus", self.avg_sources_bonus),
            ("encyclopedia_penalty_per_link", self.encyclopedia_penalty_per_link),
            ("encyclopedia_penalty_cap", self.encyclopedia_penalty_cap),
            ("authoritative_bonus_max", self.authoritative_bonus_max),
            ("thin_doc_source_penalty", self.thin_doc_source_penalty),
            ("thin_doc_source_cap", self.thin_doc_source_cap),
            ("thin_doc_method_penalty", self.thin_doc_method_penalty),
            ("thin_doc_method_cap", self.thin_doc_method_cap),
            ("balance_threshold", self.balance_threshold),
            ("balance_penalty_scale", self.balance_penalty_scale),
            ("dominance_threshold", self.dominance_threshold),
            ("dominance_penalty_scale", self.dominance_penalty_scale),
            ("styling_penalty_per_violation", self.styling_penalty_per_violation),
            ("styling_penalty_cap", self.styling_penalty_cap),
            ("visual_target_fraction", self.visual_target_fraction),
            ("visual_scale", self.visual_scale),
            ("encyclopedia_technical_penalty", self.encyclopedia_technical_penalty),
            ("encyclopedia_technical_cap", self.encyclopedia_technical_cap),
            ("consistency_penalty_per_document", self.consistency_penalty_per_document),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(AuditError::InvalidConfig(format!(
                    "scoring.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// What a configured pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PatternTarget {
    /// Plain-text projection of the document.
    Prose,
    /// Outbound link URLs.
    LinkUrl,
    /// Anchor text of outbound links.
    LinkText,
}

/// A regex-backed concern pattern, as written in config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PatternDef {
    pub kind: String,
    pub target: PatternTarget,
    pub pattern: String,
    pub severity: Severity,
    pub remediation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PatternsConfig {
    /// Built-in concern types to switch off.
    pub disabled: Vec<String>,
    /// Additional patterns compiled after the built-in table.
    pub extra: Vec<PatternDef>,
}

/// Extra hosts per domain class, consulted after the built-in lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct DomainsConfig {
    pub encyclopedia: Vec<String>,
    pub government: Vec<String>,
    pub academic: Vec<String>,
    pub news: Vec<String>,
    pub opinion: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct StructureConfig {
    /// Regexes counted as disallowed styling in raw document source.
    pub disallowed_styling: Vec<String>,
    /// A document has its required visual when any of these regexes match.
    pub required_visual: Vec<String>,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            disallowed_styling: vec![
                r"(?i)(?:linear|radial|conic)-gradient\s*\(".to_string(),
                r"(?i)<font\b".to_string(),
                r"(?i)<marquee\b".to_string(),
                r"(?i)<blink\b".to_string(),
                r"(?i)style\s*=\s*[\x22'][^\x22']*!important".to_string(),
            ],
            required_visual: vec![
                r"(?i)<svg\b".to_string(),
                r"(?i)<canvas\b".to_string(),
                r#"(?i)(?:class|id)\s*=\s*["'][^"']*\bchart"#.to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        AuditConfig::default().validate().unwrap();
    }

    #[test]
    fn weights_parse_from_cli_string() {
        let weights: ScoreWeights = "0.4, 0.2, 0.2, 0.2".parse().unwrap();
        assert_eq!(weights.source, 0.4);
        assert_eq!(weights.consistency, 0.2);
    }

    #[test]
    fn weights_must_sum_to_one() {
        assert!("0.5,0.5,0.5,0.5".parse::<ScoreWeights>().is_err());
        assert!("0.5,0.5".parse::<ScoreWeights>().is_err());
        assert!("-0.5,0.5,0.5,0.5".parse::<ScoreWeights>().is_err());
    }

    #[test]
    fn toml_overlays_defaults() {
        let config: AuditConfig = toml::from_str(
            r#"
            mode = "full"
            sample_size = 10

            [weights]
            source = 0.25
            methodology = 0.25
            technical = 0.25
            consistency = 0.25

            [patterns]
            disabled = ["absolutist_language"]

            [[patterns.extra]]
            kind = "anonymous_source"
            target = "prose"
            pattern = "(?i)a source who asked not to be named"
            severity = "medium"
            remediation = "Attribute the claim or drop it."
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, ScanMode::Full);
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.weights.consistency, 0.25);
        assert_eq!(config.context_chars, 60);
        assert_eq!(config.patterns.disabled, vec!["absolutist_language"]);
        assert_eq!(config.patterns.extra[0].target, PatternTarget::Prose);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<AuditConfig, _> = toml::from_str("sample_sise = 3");
        assert!(result.is_err());
    }

    #[test]
    fn non_finite_or_negative_scoring_constants_are_invalid() {
        let config: AuditConfig = toml::from_str(
            r#"
            [scoring]
            styling_penalty_cap = nan
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(AuditError::InvalidConfig(msg)) if msg.contains("styling_penalty_cap")
        ));

        let mut config = AuditConfig::default();
        config.scoring.encyclopedia_penalty_cap = -5.0;
        assert!(matches!(
            config.validate(),
            Err(AuditError::InvalidConfig(msg)) if msg.contains("encyclopedia_penalty_cap")
        ));
    }

    #[test]
    fn zero_sample_size_is_invalid() {
        let config = AuditConfig {
            sample_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AuditError::InvalidConfig(_))
        ));
    }
}
