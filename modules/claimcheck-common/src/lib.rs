pub mod config;
pub mod error;
pub mod metadata;
pub mod types;

pub use config::{
    AuditConfig, DomainsConfig, PatternDef, PatternTarget, PatternsConfig, ScoreWeights,
    ScoringConfig, StructureConfig,
};
pub use error::AuditError;
pub use metadata::{parse_listing, DocumentMeta, ParsedListing, Verdict, UNKNOWN_CATEGORY};
pub use types::*;
