use crate::{KeyParseError, Network};
use data_encoding::BASE32;
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;

/// A 32-byte account public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(#[serde(with = "hex::serde")] pub [u8; 32]);

impl PublicKey {
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if s.len() != 64 {
            return Err(KeyParseError::InvalidLength { expected: 64, actual: s.len() });
        }
        let mut raw = [0u8; 32];
        hex::decode_to_slice(s, &mut raw)?;
        Ok(Self(raw))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// A 25-byte account address: one network prefix byte, the 160-bit public
/// key digest, and a 4-byte checksum. Displayed as 40 base32 characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(#[serde(with = "hex::serde")] pub [u8; 25]);

impl Address {
    pub const ENCODED_LEN: usize = 40;
    pub const HEX_LEN: usize = 50;

    /// Parses the 40-character base32 form.
    pub fn parse_base32(s: &str) -> Result<Self, KeyParseError> {
        if s.len() != Self::ENCODED_LEN {
            return Err(KeyParseError::InvalidLength { expected: Self::ENCODED_LEN, actual: s.len() });
        }
        let raw = BASE32.decode(s.to_ascii_uppercase().as_bytes()).map_err(|_| KeyParseError::InvalidBase32)?;
        let raw: [u8; 25] = raw.try_into().map_err(|_| KeyParseError::InvalidBase32)?;
        Ok(Self(raw))
    }

    /// Parses the 50-character hex form used by stored documents.
    pub fn parse_hex(s: &str) -> Result<Self, KeyParseError> {
        if s.len() != Self::HEX_LEN {
            return Err(KeyParseError::InvalidLength { expected: Self::HEX_LEN, actual: s.len() });
        }
        let mut raw = [0u8; 25];
        hex::decode_to_slice(s, &mut raw)?;
        Ok(Self(raw))
    }

    /// Derives the address of a public key on the given network:
    /// sha3-256 of the key, ripemd-160 of that digest, the network prefix
    /// byte, then the first four sha3-256 bytes of the prefixed digest as
    /// checksum.
    pub fn from_public_key(network: Network, public_key: &PublicKey) -> Self {
        let key_digest = Sha3_256::digest(public_key.0);
        let ripe = Ripemd160::digest(key_digest);

        let mut raw = [0u8; 25];
        raw[0] = network.address_prefix();
        raw[1..21].copy_from_slice(&ripe);
        let checksum = Sha3_256::digest(&raw[..21]);
        raw[21..].copy_from_slice(&checksum[..4]);
        Self(raw)
    }

    /// The stored representation: addresses live in documents as binary,
    /// queried through their hex form.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }

    pub fn as_bytes(&self) -> &[u8; 25] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE32.encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn base32_round_trips() {
        let address = Address([0x68; 25]);
        let encoded = address.to_string();
        assert_eq!(encoded.len(), Address::ENCODED_LEN);
        assert_eq!(Address::parse_base32(&encoded), Ok(address));
    }

    #[test]
    fn base32_parse_accepts_lowercase() {
        let address = Address([0x98; 25]);
        let encoded = address.to_string().to_ascii_lowercase();
        assert_eq!(Address::parse_base32(&encoded), Ok(address));
    }

    #[test]
    fn hex_round_trips() {
        let address = Address(*b"\x68ABCDEFGHIJKLMNOPQRSTUVWX");
        assert_eq!(Address::parse_hex(&address.to_hex()), Ok(address));
    }

    #[rstest]
    #[case("TOOSHORT")]
    #[case("THIRTYNINECHARACTERSTHIRTYNINECHARACTER")]
    fn base32_rejects_wrong_length(#[case] input: &str) {
        assert!(matches!(Address::parse_base32(input), Err(KeyParseError::InvalidLength { .. })));
    }

    #[test]
    fn base32_rejects_bad_alphabet() {
        // '1' and '8' are outside the RFC 4648 base32 alphabet.
        let input = "18181818181818181818181818181818181818__";
        assert_eq!(Address::parse_base32(input), Err(KeyParseError::InvalidBase32));
    }

    #[test]
    fn derivation_is_deterministic_and_network_prefixed() {
        let key = PublicKey::parse("75D8BB873DA8F5CCA741435DE76A46AAA2840803EBBBB0E931195B7D4BD9100B").unwrap();
        let mainnet = Address::from_public_key(Network::Mainnet, &key);
        let testnet = Address::from_public_key(Network::Testnet, &key);

        assert_eq!(mainnet.0[0], 0x68);
        assert_eq!(testnet.0[0], 0x98);
        assert_ne!(mainnet, testnet);
        assert_eq!(mainnet, Address::from_public_key(Network::Mainnet, &key));
        // The checksum commits to the prefixed ripemd digest.
        let checksum = &mainnet.0[21..];
        assert_ne!(checksum, &testnet.0[21..]);
    }
}
