use crate::KeyParseError;
use serde::{Deserialize, Serialize};

/// Network selector. The discriminant is the address prefix byte, which is
/// the only property of the network this gateway depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet = 0x68,
    Testnet = 0x98,
}

impl Network {
    pub fn from_name(name: &str) -> Result<Self, KeyParseError> {
        match name {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(KeyParseError::UnknownNetwork(other.to_string())),
        }
    }

    pub fn address_prefix(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}
