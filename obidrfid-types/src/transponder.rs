//! Transponder (tag) observations

use std::fmt;

/// A tag seen during one inventory scan
///
/// The reader sends each record as 20 bytes of text:
///
/// ```text
/// ┌──────────┬──────────┬──────────────────────┐
/// │ TR-TYPE  │  DSFID   │         IID          │
/// │ 2 bytes  │ 2 bytes  │       16 bytes       │
/// └──────────┴──────────┴──────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransponderRecord {
    /// Transponder type
    pub tr_type: String,

    /// Data Storage Format Identifier
    pub dsfid: String,

    /// Item/instance identifier
    pub iid: String,
}

impl TransponderRecord {
    /// Size of one record on the wire
    pub const SIZE: usize = 20;

    /// Width of the TR-TYPE field
    pub const TR_TYPE_LEN: usize = 2;

    /// Width of the DSFID field
    pub const DSFID_LEN: usize = 2;

    /// Width of the IID field
    pub const IID_LEN: usize = Self::SIZE - Self::TR_TYPE_LEN - Self::DSFID_LEN;

    pub fn new(
        tr_type: impl Into<String>,
        dsfid: impl Into<String>,
        iid: impl Into<String>,
    ) -> Self {
        Self {
            tr_type: tr_type.into(),
            dsfid: dsfid.into(),
            iid: iid.into(),
        }
    }

    /// Recompose the wire bytes from the three fields
    ///
    /// For a record decoded from the reader this yields the original 20 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(self.tr_type.as_bytes());
        buf.extend_from_slice(self.dsfid.as_bytes());
        buf.extend_from_slice(self.iid.as_bytes());
        buf
    }
}

impl fmt::Display for TransponderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TR_TYPE = {} | DSFID = {} | IID = {}",
            self.tr_type, self.dsfid, self.iid
        )
    }
}

/// Ordered records from one inventory scan
///
/// An empty result means no tags were in range; it is not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryResult {
    records: Vec<TransponderRecord>,
}

impl InventoryResult {
    pub fn new(records: Vec<TransponderRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransponderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransponderRecord> {
        self.records.iter()
    }
}

impl From<Vec<TransponderRecord>> for InventoryResult {
    fn from(records: Vec<TransponderRecord>) -> Self {
        Self::new(records)
    }
}

impl IntoIterator for InventoryResult {
    type Item = TransponderRecord;
    type IntoIter = std::vec::IntoIter<TransponderRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a InventoryResult {
    type Item = &'a TransponderRecord;
    type IntoIter = std::slice::Iter<'a, TransponderRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_widths() {
        assert_eq!(TransponderRecord::IID_LEN, 16);
        assert_eq!(
            TransponderRecord::TR_TYPE_LEN
                + TransponderRecord::DSFID_LEN
                + TransponderRecord::IID_LEN,
            TransponderRecord::SIZE
        );
    }

    #[test]
    fn test_record_to_bytes() {
        let record = TransponderRecord::new("TY", "DS", "1234567890123456");
        assert_eq!(record.to_bytes(), b"TYDS1234567890123456".to_vec());
    }

    #[test]
    fn test_record_display() {
        let record = TransponderRecord::new("03", "00", "E004010012345678");
        assert_eq!(
            record.to_string(),
            "TR_TYPE = 03 | DSFID = 00 | IID = E004010012345678"
        );
    }

    #[test]
    fn test_inventory_empty() {
        let result = InventoryResult::default();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert_eq!(result.iter().count(), 0);
    }

    #[test]
    fn test_inventory_keeps_order() {
        let result = InventoryResult::from(vec![
            TransponderRecord::new("01", "00", "AAAAAAAAAAAAAAAA"),
            TransponderRecord::new("02", "00", "BBBBBBBBBBBBBBBB"),
        ]);

        let types: Vec<_> = result.iter().map(|r| r.tr_type.as_str()).collect();
        assert_eq!(types, vec!["01", "02"]);
    }
}
