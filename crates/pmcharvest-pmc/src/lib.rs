//! pmcharvest PMC: Entrez efetch client and the harvest loop.

pub mod entrez;
pub mod error;
pub mod fetcher;
pub mod harvest;
pub mod http;

pub use entrez::EntrezClient;
pub use error::{PmcError, Result};
pub use fetcher::DocumentFetcher;
pub use harvest::{HarvestReport, Harvester, SkipReason, SkippedItem};
