use serde::Serialize;

use ingestlink_domain::{IngestError, Result};

/// A serialized JSON array of documents plus its document count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineBatch {
    body: Vec<u8>,
    documents: usize,
}

impl PipelineBatch {
    /// Serialize `documents` as one JSON array.
    ///
    /// # Errors
    /// [`IngestError::Serialization`] if any document fails to serialize.
    pub fn from_documents<T: Serialize>(documents: &[T]) -> Result<Self> {
        Ok(Self { body: serde_json::to_vec(documents)?, documents: documents.len() })
    }

    /// Wrap an already-serialized JSON array.
    ///
    /// # Errors
    /// [`IngestError::Serialization`] if `body` is not a JSON array.
    pub fn from_json_array(body: Vec<u8>) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        let documents = value
            .as_array()
            .map(Vec::len)
            .ok_or_else(|| IngestError::Serialization("batch body is not a JSON array".into()))?;
        Ok(Self { body, documents })
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Number of documents in the batch
    pub fn len(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_documents() {
        let batch = PipelineBatch::from_documents(&[json!({"id": "1"}), json!({"id": "2"})]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.body(), br#"[{"id":"1"},{"id":"2"}]"#);
    }

    #[test]
    fn test_from_json_array_counts_documents() {
        let batch = PipelineBatch::from_json_array(br#"[{"id":1},{"id":2},{"id":3}]"#.to_vec()).unwrap();
        assert_eq!(batch.len(), 3);

        assert!(PipelineBatch::from_json_array(b"[]".to_vec()).unwrap().is_empty());
        assert!(matches!(
            PipelineBatch::from_json_array(br#"{"id":1}"#.to_vec()),
            Err(IngestError::Serialization(_))
        ));
        assert!(PipelineBatch::from_json_array(b"not json".to_vec()).is_err());
    }
}
