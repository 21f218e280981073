use serde::{Deserialize, Serialize};

/// Flat bibliographic record extracted from one JATS document.
///
/// Every field is independently optional. Absent fields serialize as `null`
/// so each record in the output array carries the same keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub pmid: Option<String>,
    pub doi: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub journal: Option<String>,
    pub year: Option<String>,
    /// `None` when no contributor yielded a name; never `Some(vec![])`.
    pub authors: Option<Vec<String>>,
}

impl MetadataRecord {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_absent_fields_as_null_in_order() {
        let record = MetadataRecord {
            pmid: Some("123".to_string()),
            title: Some("A title".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"pmid":"123","doi":null,"title":"A title","abstract":null,"journal":null,"year":null,"authors":null}"#
        );
    }

    #[test]
    fn default_record_is_empty() {
        assert!(MetadataRecord::default().is_empty());
        let record = MetadataRecord {
            year: Some("2020".to_string()),
            ..Default::default()
        };
        assert!(!record.is_empty());
    }
}
