//! # REST gateway server
//!
//! The read-only HTTP surface of a Trebuchet node. Every route is a GET over
//! chain state stored in the document database; nothing here writes.
//!
//! ## List regimes
//!
//! Two limit regimes exist side by side. The legacy block-range route
//! validates its limit against the configured pageSize grid; cursor routes
//! validate against the count range. In both regimes an unacceptable limit
//! is answered with a `302` to the canonical URL rather than an error.
//!
//! Cursor routes page an entity collection in both directions from an
//! anchor:
//!
//! ```text
//! /blocks/{from|since}/{height|latest|earliest}/limit/{limit}
//! /transactions/{from|since}/{hash|id|latest|earliest}/limit/{limit}
//! /transactions/{from|since}/{...}/type/{type}/limit/{limit}
//! /transactions/{from|since}/{...}/type/transfer/filter/{mosaic|multisig}/limit/{limit}
//! /transactions/{unconfirmed|partial}/{from|since}/{...}/limit/{limit}
//! /mosaics/{from|since}/{mosaicId|id|latest|earliest}/limit/{limit}
//! /namespaces/{from|since}/{namespaceId|id|latest|earliest}/limit/{limit}
//! /accounts/importance/{from|since}/{account|most|least}/limit/{limit}
//! /accounts/harvested/{blocks|fees}/{from|since}/{account|most|least}/limit/{limit}
//! /accounts/balance/{currency|harvest}/{from|since}/{account|most|least}/limit/{limit}
//! /account/{account}/transactions/{from|since}/{hash|id|latest|earliest}/limit/{limit}
//! ```
//!
//! Account anchors accept a 40-character base32 address, a 50-hex address
//! or a 64-hex public key (converted through the configured network).
//!
//! ## Single-document routes
//!
//! ```text
//! /chain/info            /chain/height          /chain/score
//! /diagnostic/storage
//! /block/{height}        /block/{height}/transactions
//! /blocks/{height}/limit/{limit}
//! /transaction/{hash|id} /account/{address|publicKey}
//! /account/{address|publicKey}/multisig
//! /mosaic/{mosaicId}     /namespace/{namespaceId}
//! ```
//!
//! A transaction fetched by id that is an aggregate has its dependent
//! sub-transactions attached under `transaction.transactions`.
//!
//! ## Status codes
//!
//! `200` success (possibly an empty array), `302` limit sanitization,
//! `404` no such anchor document (or a block height above the tip),
//! `409` malformed key or unknown enum value, `500` store fault (redacted).

mod error;
mod handler;
mod helpers;
mod router;
pub mod service;
