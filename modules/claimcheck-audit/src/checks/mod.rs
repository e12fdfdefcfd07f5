pub mod metadata;
pub mod patterns;
pub mod scanner;
pub mod structure;

pub use patterns::{kinds, ConcernPattern, Matcher, MetadataCheck, PatternSet, PATTERN_TABLE_VERSION};
pub use scanner::{ScanOutcome, Scanner};
pub use structure::StructureRules;
