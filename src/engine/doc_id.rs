//! CRITs document identifiers.
//!
//! A reference that is not a local file is decoded into a 12-byte ObjectId and fetched from
//! the CRITs file server as `<cfs>/<hex-id>`. Two encodings are accepted:
//!
//! - the 24-character hex rendering of the ObjectId (what CRITs shows in its UI and exports);
//! - a raw BSON document whose `_id` element is an ObjectId (other elements are skipped).

use bson::oid::ObjectId;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Length of a BSON ObjectId in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// A CRITs document id (BSON ObjectId).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId([u8; OBJECT_ID_LEN]);

#[derive(Debug, Error)]
pub enum IdError {
    #[error("empty reference")]
    Empty,
    #[error("not a BSON document with an ObjectId `_id`: {0}")]
    Bson(#[from] bson::de::Error),
}

/// Only `_id` is read; any other field in the document is ignored.
#[derive(Deserialize)]
struct IdRecord {
    #[serde(rename = "_id")]
    id: ObjectId,
}

impl DocumentId {
    pub fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Lowercase hex rendering used in CFS URLs.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode a sample reference: hex ObjectId first, then BSON document.
    pub fn decode(reference: &str) -> Result<Self, IdError> {
        if let Some(id) = Self::parse_hex(reference) {
            return Ok(id);
        }
        Self::from_bson(reference.as_bytes())
    }

    /// Parse a 24-char hex ObjectId (case-insensitive, surrounding whitespace ignored).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != OBJECT_ID_LEN * 2 {
            return None;
        }
        let mut out = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut out).ok()?;
        Some(Self(out))
    }

    /// Extract the `_id` ObjectId from a raw BSON document.
    pub fn from_bson(doc: &[u8]) -> Result<Self, IdError> {
        if doc.is_empty() {
            return Err(IdError::Empty);
        }
        let record: IdRecord = bson::from_slice(doc)?;
        Ok(Self(record.id.bytes()))
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self(oid.bytes())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    const OID: [u8; 12] = [
        0x50, 0x7f, 0x1f, 0x77, 0xbc, 0xf8, 0x6c, 0xd7, 0x99, 0x43, 0x90, 0x11,
    ];

    fn encode(d: &bson::Document) -> Vec<u8> {
        let mut buf = Vec::new();
        d.to_writer(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_bson_id_after_other_fields() {
        let raw = encode(&doc! {
            "md5": "d41d8cd98f00b204e9800998ecf8427e",
            "n": 7_i32,
            "_id": ObjectId::from_bytes(OID),
        });
        let id = DocumentId::from_bson(&raw).unwrap();
        assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_bson_missing_id() {
        let raw = encode(&doc! { "md5": "abc" });
        assert!(matches!(DocumentId::from_bson(&raw), Err(IdError::Bson(_))));
    }

    #[test]
    fn test_bson_id_wrong_type() {
        let raw = encode(&doc! { "_id": "abc" });
        assert!(matches!(DocumentId::from_bson(&raw), Err(IdError::Bson(_))));
    }

    #[test]
    fn test_bson_truncated() {
        let raw = encode(&doc! { "_id": ObjectId::from_bytes(OID) });
        assert!(DocumentId::from_bson(&raw[..raw.len() - 6]).is_err());
    }

    #[test]
    fn test_from_object_id() {
        let id = DocumentId::from(ObjectId::from_bytes(OID));
        assert_eq!(id.as_bytes(), &OID);
    }
}
