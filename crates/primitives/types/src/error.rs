/// Rejection of a user-supplied key. Surfaced by the gateway as HTTP 409.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KeyParseError {
    #[error("invalid length: expected {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid base32 address")]
    InvalidBase32,
    #[error("invalid decimal number")]
    InvalidDecimal,
    #[error("unknown transaction type `{0}`")]
    UnknownTransactionType(String),
    #[error("unknown transfer filter `{0}`")]
    UnknownTransferFilter(String),
    #[error("filter `{filter}` cannot be combined with transaction type `{kind}`")]
    InvalidFilterCombination { kind: String, filter: String },
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),
}
