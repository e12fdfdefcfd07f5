pub mod aggregate;
pub mod auditor;
pub mod checks;
pub mod corpus;
pub mod domains;
pub mod report;
pub mod sampler;
pub mod scoring;
pub mod types;

pub use auditor::Auditor;
pub use checks::{PatternSet, Scanner, PATTERN_TABLE_VERSION};
pub use corpus::{load_corpus, Corpus, Document, Link};
pub use domains::DomainClassifier;
pub use types::*;
