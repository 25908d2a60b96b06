use crate::KeyParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte entity hash (transaction hash, merkle component hash).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash256(#[serde(with = "hex::serde")] pub [u8; 32]);

impl Hash256 {
    /// Parses the 64-hex form, case insensitive.
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if s.len() != 64 {
            return Err(KeyParseError::InvalidLength { expected: 64, actual: s.len() });
        }
        let mut raw = [0u8; 32];
        hex::decode_to_slice(s, &mut raw)?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "C8FC3FB54FDDFBCE0E8C71224990124E4EEC5AD5D30E592EDFA9524669A23810";

    #[test]
    fn parses_and_displays_64_hex() {
        let hash = Hash256::parse(HASH).unwrap();
        assert_eq!(hash.to_string(), HASH);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Hash256::parse(&HASH.to_lowercase()).unwrap(), Hash256::parse(HASH).unwrap());
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Hash256::parse(&HASH[..62]).unwrap_err();
        assert_eq!(err, KeyParseError::InvalidLength { expected: 64, actual: 62 });
        // A 66 character hash is a length error, not a hex error.
        let err = Hash256::parse(&format!("{HASH}AB")).unwrap_err();
        assert_eq!(err, KeyParseError::InvalidLength { expected: 64, actual: 66 });
    }
}
