//! Reading back length-prefixed X9.37 files.

use crate::error::{Error, Result};
use std::io::Read;

/// One record as stored in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Two digit record type.
    pub record_type: u8,
    /// Record bytes without the length prefix.
    pub bytes: Vec<u8>,
}

impl RawRecord {
    /// Text of a field at a 1-indexed position, trailing spaces removed.
    pub fn text(&self, position: usize, width: usize) -> String {
        let start = position.saturating_sub(1).min(self.bytes.len());
        let end = (start + width).min(self.bytes.len());
        String::from_utf8_lossy(&self.bytes[start..end])
            .trim_end()
            .to_string()
    }

    /// Numeric field at a 1-indexed position.
    pub fn number(&self, position: usize, width: usize) -> Result<u64> {
        let text = self.text(position, width);
        text.trim()
            .parse()
            .map_err(|_| Error::ParseError(format!("'{}' at column {} is not a number", text, position)))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Split a file written with 4-byte big-endian record length prefixes.
pub fn read_records<R: Read>(reader: &mut R) -> Result<Vec<RawRecord>> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;

    let mut records = Vec::new();
    let mut offset = 0;
    while offset < content.len() {
        let prefix = content
            .get(offset..offset + 4)
            .ok_or_else(|| Error::ParseError(format!("truncated length prefix at byte {}", offset)))?;
        let length = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        offset += 4;

        let bytes = content
            .get(offset..offset + length)
            .ok_or_else(|| Error::ParseError(format!("truncated record at byte {}", offset)))?
            .to_vec();
        offset += length;

        let record_type = std::str::from_utf8(bytes.get(0..2).unwrap_or_default())
            .ok()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| Error::ParseError(format!("record {} has no record type", records.len() + 1)))?;

        records.push(RawRecord { record_type, bytes });
    }

    Ok(records)
}
