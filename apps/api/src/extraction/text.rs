use std::path::Path;

use crate::extraction::ExtractionError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub fn extract(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Strict UTF-8 decode; a leading byte-order mark is dropped.
pub fn decode(bytes: &[u8]) -> Result<String, ExtractionError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|_| ExtractionError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_utf8() {
        assert_eq!(decode("Zoë Müller, Staff Engineer".as_bytes()).unwrap(), "Zoë Müller, Staff Engineer");
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Resume");
        assert_eq!(decode(&bytes).unwrap(), "Resume");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(matches!(decode(&[0xC3, 0x28]), Err(ExtractionError::Encoding)));
    }
}
