//! pmcharvest core: JATS document tree, metadata extraction, record hygiene.

pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
pub mod extract;
pub mod identifier;
pub mod links;
pub mod models;
pub mod output;

pub use config::{AppConfig, EntrezConfig, HarvestConfig};
pub use document::{Document, Element, Node};
pub use error::{CoreError, Result};
pub use extract::{TitleRule, extract_record, parse_record, resolve_title};
pub use identifier::extract_identifier;
pub use models::MetadataRecord;
