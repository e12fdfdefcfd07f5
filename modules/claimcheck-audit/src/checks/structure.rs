use regex::Regex;
use tracing::warn;

use claimcheck_common::StructureConfig;

use crate::types::{ProcessIssue, Stage};

/// Compiled structural rules: disallowed styling and the required visual.
#[derive(Debug, Clone, Default)]
pub struct StructureRules {
    disallowed_styling: Vec<Regex>,
    required_visual: Vec<Regex>,
}

impl StructureRules {
    pub fn compile(config: &StructureConfig) -> (Self, Vec<ProcessIssue>) {
        let mut issues = Vec::new();
        let mut compile_all = |name: &str, sources: &[String]| -> Vec<Regex> {
            sources
                .iter()
                .filter_map(|source| match Regex::new(source) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(rule = name, error = %e, "Structure rule failed to compile, skipping");
                        issues.push(ProcessIssue::warning(
                            Stage::Patterns,
                            name,
                            format!("rule '{source}' failed to compile: {e}"),
                        ));
                        None
                    }
                })
                .collect()
        };

        let disallowed_styling = compile_all("disallowed_styling", &config.disallowed_styling);
        let required_visual = compile_all("required_visual", &config.required_visual);

        (
            Self {
                disallowed_styling,
                required_visual,
            },
            issues,
        )
    }

    /// Number of disallowed styling occurrences in a raw source.
    pub fn styling_violations(&self, raw: &str) -> usize {
        self.disallowed_styling
            .iter()
            .map(|re| re.find_iter(raw).count())
            .sum()
    }

    /// Whether the raw source contains the required chart or visual element.
    pub fn has_visual(&self, raw: &str) -> bool {
        self.required_visual.iter().any(|re| re.is_match(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> StructureRules {
        let (rules, issues) = StructureRules::compile(&StructureConfig::default());
        assert!(issues.is_empty());
        rules
    }

    #[test]
    fn counts_disallowed_styling() {
        let raw = r#"<div style="background: linear-gradient(red, blue)"><font color="red">x</font><p style="color: red !important">y</p></div>"#;
        assert_eq!(rules().styling_violations(raw), 3);
        assert_eq!(rules().styling_violations("<p>plain</p>"), 0);
    }

    #[test]
    fn detects_required_visual() {
        assert!(rules().has_visual(r#"<figure><svg viewBox="0 0 10 10"></svg></figure>"#));
        assert!(rules().has_visual(r#"<div class="verdict-chart"></div>"#));
        assert!(!rules().has_visual("<p>No chart here</p>"));
    }

    #[test]
    fn malformed_rule_is_reported() {
        let config = StructureConfig {
            disallowed_styling: vec!["[".to_string()],
            required_visual: vec![],
        };
        let (rules, issues) = StructureRules::compile(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(rules.styling_violations("[[["), 0);
    }
}
