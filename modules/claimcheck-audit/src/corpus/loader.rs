use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use claimcheck_common::{parse_listing, AuditError};

use super::Document;
use crate::types::{ProcessIssue, Stage};

/// The loaded corpus plus what the loader noticed along the way.
#[derive(Debug, Default)]
pub struct Corpus {
    /// Documents with both metadata and a readable file, sorted by id.
    pub documents: Vec<Document>,
    /// Records in the metadata listing that carried an id.
    pub metadata_records: usize,
    /// Document files present on disk, with or without metadata.
    pub documents_found: usize,
    /// Metadata ids whose document could not be found or read.
    pub missing: Vec<String>,
    pub issues: Vec<ProcessIssue>,
}

/// Ids of the documents on disk: `<id>.<ext>` files and `<id>/index.<ext>` directories.
fn documents_on_disk(dir: &Path, extension: &str) -> Result<BTreeSet<String>, AuditError> {
    let unreadable = |source: std::io::Error| AuditError::CorpusUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut ids = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();

        // A directory's whole name is the id; dots in it are not an extension.
        let id = if path.is_dir() {
            path.join(format!("index.{extension}"))
                .is_file()
                .then(|| path.file_name())
                .flatten()
        } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            path.file_stem()
        } else {
            None
        };
        if let Some(id) = id.and_then(|id| id.to_str()) {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}

fn locate(dir: &Path, id: &str, extension: &str) -> Option<PathBuf> {
    [
        dir.join(format!("{id}.{extension}")),
        dir.join(id).join(format!("index.{extension}")),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}

/// Load every document named by the metadata listing.
///
/// An unreadable or unparseable listing, or an unreadable corpus directory,
/// is fatal. A record whose document is missing is skipped with a warning:
/// partial corpora are normal while reports are still being published.
pub fn load_corpus(
    documents_dir: &Path,
    metadata_path: &Path,
    extension: &str,
) -> Result<Corpus, AuditError> {
    let extension = extension.trim_start_matches('.');
    let listing_text =
        std::fs::read_to_string(metadata_path).map_err(|source| AuditError::MetadataRead {
            path: metadata_path.to_path_buf(),
            source,
        })?;
    let listing = parse_listing(&listing_text, metadata_path)?;

    let mut corpus = Corpus {
        metadata_records: listing.records.len(),
        ..Default::default()
    };

    for warning in listing.warnings {
        warn!(listing = %metadata_path.display(), "{warning}");
        corpus.issues.push(ProcessIssue::warning(
            Stage::Load,
            metadata_path.display().to_string(),
            warning,
        ));
    }

    let on_disk = documents_on_disk(documents_dir, extension)?;
    corpus.documents_found = on_disk.len();

    for meta in listing.records {
        let Some(path) = locate(documents_dir, &meta.id, extension) else {
            warn!(doc = meta.id.as_str(), "No document file for metadata record, skipping");
            corpus.issues.push(ProcessIssue::warning(
                Stage::Load,
                &meta.id,
                "document file not found",
            ));
            corpus.missing.push(meta.id);
            continue;
        };

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(doc = meta.id.as_str(), error = %e, "Failed to read document, skipping");
                corpus.issues.push(ProcessIssue::warning(
                    Stage::Load,
                    &meta.id,
                    format!("failed to read {}: {e}", path.display()),
                ));
                corpus.missing.push(meta.id);
                continue;
            }
        };

        let raw = match String::from_utf8(bytes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(doc = meta.id.as_str(), "Document is not valid UTF-8, decoding lossily");
                corpus.issues.push(ProcessIssue::warning(
                    Stage::Load,
                    &meta.id,
                    "document is not valid UTF-8; invalid sequences replaced",
                ));
                String::from_utf8_lossy(&e.into_bytes()).into_owned()
            }
        };

        corpus.documents.push(Document::from_html(meta, raw));
    }

    let declared: BTreeSet<&str> = corpus
        .documents
        .iter()
        .map(|d| d.id())
        .chain(corpus.missing.iter().map(String::as_str))
        .collect();
    for orphan in on_disk.iter().filter(|id| !declared.contains(id.as_str())) {
        corpus.issues.push(ProcessIssue::info(
            Stage::Load,
            orphan,
            "document file has no metadata record",
        ));
    }

    corpus.documents.sort_by(|a, b| a.id().cmp(b.id()));

    info!(
        records = corpus.metadata_records,
        found = corpus.documents_found,
        loaded = corpus.documents.len(),
        missing = corpus.missing.len(),
        "Corpus loaded"
    );

    Ok(corpus)
}
