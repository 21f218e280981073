use pmcharvest_core::{MetadataRecord, extract_identifier, parse_record};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::PmcError;
use crate::fetcher::DocumentFetcher;

/// Why an input URL produced no record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("no identifier in URL")]
    EmptyIdentifier,

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("empty document")]
    EmptyDocument,

    #[error("parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, PartialEq, Eq)]
pub struct SkippedItem {
    pub url: String,
    pub identifier: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct HarvestReport {
    pub records: Vec<MetadataRecord>,
    pub skipped: Vec<SkippedItem>,
}

pub type ItemOutcome = std::result::Result<MetadataRecord, SkipReason>;

/// Sequential load → fetch → parse loop. Each item is processed in
/// isolation; a failed item is recorded as skipped and never emits a
/// partial record.
pub struct Harvester<F> {
    fetcher: F,
}

impl<F: DocumentFetcher> Harvester<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch and extract one identifier.
    pub async fn process(&self, identifier: &str) -> ItemOutcome {
        if identifier.is_empty() {
            return Err(SkipReason::EmptyIdentifier);
        }

        let xml = match self.fetcher.fetch(identifier).await {
            Ok(xml) if xml.trim().is_empty() => return Err(SkipReason::EmptyDocument),
            Ok(xml) => xml,
            Err(PmcError::EmptyResponse(_)) => return Err(SkipReason::EmptyDocument),
            Err(e) => return Err(SkipReason::Fetch(e.to_string())),
        };

        parse_record(&xml).map_err(|e| SkipReason::Parse(e.to_string()))
    }

    pub async fn run(&self, urls: &[String]) -> HarvestReport {
        let total = urls.len();
        let mut report = HarvestReport::default();

        for url in urls {
            let identifier = extract_identifier(url);
            match self.process(&identifier).await {
                Ok(record) => {
                    if record.is_empty() {
                        debug!(%identifier, "document yielded no metadata fields");
                    }
                    report.records.push(record);
                    info!("saved {} / {}", report.records.len(), total);
                }
                Err(reason) => {
                    warn!(%url, %identifier, %reason, "skipping item");
                    report.skipped.push(SkippedItem {
                        url: url.clone(),
                        identifier,
                        reason,
                    });
                }
            }
        }

        info!(
            saved = report.records.len(),
            skipped = report.skipped.len(),
            "harvest complete"
        );
        report
    }
}
