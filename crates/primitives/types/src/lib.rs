//! Primitive chain types shared by the Trebuchet REST gateway.
//!
//! Everything a route parses out of a URL lives here: heights, hashes,
//! mosaic/namespace ids, public keys and addresses, plus the enums naming
//! transaction types and transfer filters. Parsers are strict — a key of the
//! wrong length or alphabet is rejected with [`KeyParseError`], which the
//! gateway surfaces as HTTP 409.

mod address;
mod error;
mod hash;
mod ids;
mod network;
mod transaction_kind;

pub use address::{Address, PublicKey};
pub use error::KeyParseError;
pub use hash::Hash256;
pub use ids::{Height, MosaicId, NamespaceId};
pub use network::Network;
pub use transaction_kind::{TransactionKind, TransferFilter};
