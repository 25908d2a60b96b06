use crate::KeyParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block height. Parsed from decimal only; `0` is a valid parse and is given
/// meaning (or not) by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(pub u64);

impl Height {
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyParseError::InvalidDecimal);
        }
        s.parse().map(Self).map_err(|_| KeyParseError::InvalidDecimal)
    }

    /// The stored representation: chain quantities live as two's-complement
    /// i64 in the document store.
    pub fn as_stored(&self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! hex_u64_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Parses the canonical 16-hex form.
            pub fn parse(s: &str) -> Result<Self, KeyParseError> {
                if s.len() != 16 {
                    return Err(KeyParseError::InvalidLength { expected: 16, actual: s.len() });
                }
                let mut raw = [0u8; 8];
                hex::decode_to_slice(s, &mut raw)?;
                Ok(Self(u64::from_be_bytes(raw)))
            }

            pub fn as_stored(&self) -> i64 {
                self.0 as i64
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:016X}", self.0)
            }
        }
    };
}

hex_u64_id!(MosaicId, "Mosaic id, displayed and parsed as 16 uppercase hex characters.");
hex_u64_id!(NamespaceId, "Namespace id, displayed and parsed as 16 uppercase hex characters.");

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("1", 1)]
    #[case("3601", 3601)]
    #[case("18446744073709551615", u64::MAX)]
    fn height_parses_decimal(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(Height::parse(input), Ok(Height(expected)));
    }

    #[rstest]
    #[case("")]
    #[case("-1")]
    #[case("0x10")]
    #[case("12a")]
    #[case("18446744073709551616")]
    fn height_rejects_non_decimal(#[case] input: &str) {
        assert_eq!(Height::parse(input), Err(KeyParseError::InvalidDecimal));
    }

    #[test]
    fn mosaic_id_round_trips() {
        let id = MosaicId::parse("85BBEA6CC462B244").unwrap();
        assert_eq!(id, MosaicId(0x85BB_EA6C_C462_B244));
        assert_eq!(id.to_string(), "85BBEA6CC462B244");
    }

    #[test]
    fn mosaic_id_rejects_wrong_length() {
        assert_eq!(
            MosaicId::parse("85BBEA6CC462B2"),
            Err(KeyParseError::InvalidLength { expected: 16, actual: 14 })
        );
    }

    #[test]
    fn namespace_id_rejects_non_hex() {
        assert!(matches!(NamespaceId::parse("85BBEA6CC462B2XY"), Err(KeyParseError::InvalidHex(_))));
    }

    #[test]
    fn stored_form_is_twos_complement() {
        assert_eq!(MosaicId(0x85BB_EA6C_C462_B244).as_stored(), 0x85BB_EA6C_C462_B244_u64 as i64);
        assert!(MosaicId(0x85BB_EA6C_C462_B244).as_stored() < 0);
    }
}
