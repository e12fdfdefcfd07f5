use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How serious a detected concern is. Ordered so that `High > Medium > Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Taxonomy bucket for an outbound URL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DomainClass {
    Government,
    Academic,
    News,
    /// Tertiary reference works. Citing one is a compliance violation,
    /// not a weaker source tier.
    Encyclopedia,
    Opinion,
    Other,
}

impl DomainClass {
    pub const ALL: [DomainClass; 6] = [
        DomainClass::Government,
        DomainClass::Academic,
        DomainClass::News,
        DomainClass::Encyclopedia,
        DomainClass::Opinion,
        DomainClass::Other,
    ];

    /// Government and academic links count as authoritative sourcing.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, DomainClass::Government | DomainClass::Academic)
    }
}

impl fmt::Display for DomainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Government => write!(f, "government"),
            Self::Academic => write!(f, "academic"),
            Self::News => write!(f, "news"),
            Self::Encyclopedia => write!(f, "encyclopedia"),
            Self::Opinion => write!(f, "opinion"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Categorical key used to stratify the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StratifyBy {
    #[default]
    Verdict,
    Category,
}

impl FromStr for StratifyBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verdict" => Ok(Self::Verdict),
            "category" => Ok(Self::Category),
            other => Err(format!("unknown stratification key '{other}' (expected verdict or category)")),
        }
    }
}

impl fmt::Display for StratifyBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verdict => write!(f, "verdict"),
            Self::Category => write!(f, "category"),
        }
    }
}

/// Whether the audit scans a stratified sample or the whole corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Sample,
    Full,
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sample" => Ok(Self::Sample),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown scan mode '{other}' (expected sample or full)")),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sample => write!(f, "sample"),
            Self::Full => write!(f, "full"),
        }
    }
}
