//! Trebuchet chain-state database.
//!
//! This crate is strictly read-only: documents are written by the chain
//! synchronizer (an external process) and are immutable here. The backend
//! holds a pooled connection handle and the static chain configuration, and
//! nothing else — there is no engine-level cache, so freshly committed
//! documents become visible to the next query immediately.
//!
//! Reads come in two shapes:
//!
//! - single-document getters (`block_at`, `transaction_by_key`, ...), and
//! - cursor pages: every entity collection can be paged bidirectionally
//!   from an anchor with the `*_page` methods. See the [`cursor`] module
//!   for the shared machinery and the per-entity modules for the sort keys
//!   and anchor resolvers.
//!
//! The primary sort field of every collection must be indexed; an unindexed
//! primary sort is a production defect. [`TrebuchetBackend::ensure_indexes`]
//! creates the required set on startup.

use anyhow::Context;
use mongodb::options::ClientOptions;
use std::sync::Arc;
use std::time::Duration;
use tp_chain_config::ChainConfig;

mod error;
pub mod store;

pub mod accounts;
pub mod blocks;
pub mod chain;
pub mod cursor;
pub mod mosaics;
pub mod namespaces;
pub mod transactions;

pub use accounts::{AccountAnchor, AccountRanking};
pub use blocks::BlockAnchor;
pub use cursor::{Direction, Extreme};
pub use error::{StorageError, StorageResult};
pub use mosaics::MosaicAnchor;
pub use namespaces::NamespaceAnchor;
pub use transactions::{TransactionAnchor, TransactionGroup, TransactionKey, TransactionTypeFilter};

/// Collection names of the consumed state layout.
pub mod collections {
    pub const BLOCKS: &str = "blocks";
    pub const TRANSACTIONS: &str = "transactions";
    pub const UNCONFIRMED_TRANSACTIONS: &str = "unconfirmedTransactions";
    pub const PARTIAL_TRANSACTIONS: &str = "partialTransactions";
    pub const MOSAICS: &str = "mosaics";
    pub const NAMESPACES: &str = "namespaces";
    pub const ACCOUNTS: &str = "accounts";
    pub const MULTISIGS: &str = "multisigs";
    pub const CHAIN_STATISTIC: &str = "chainStatistic";
}

pub struct TrebuchetBackend {
    store: store::DocumentStore,
    chain_config: Arc<ChainConfig>,
}

impl TrebuchetBackend {
    /// Opens the database connection pool. Server selection is bounded so a
    /// dead store surfaces at startup instead of on the first request.
    pub async fn open(url: &str, db_name: &str, chain_config: Arc<ChainConfig>) -> anyhow::Result<Arc<Self>> {
        let mut options =
            ClientOptions::parse(url).await.with_context(|| format!("Parsing database url {url}"))?;
        options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = mongodb::Client::with_options(options).context("Opening database client")?;
        tracing::debug!("opening document store {db_name} at {url}");

        let store = store::DocumentStore::new(client.database(db_name), chain_config.store_page_window);
        Ok(Arc::new(Self { store, chain_config }))
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    pub(crate) fn store(&self) -> &store::DocumentStore {
        &self.store
    }

    /// Creates the indexes the cursor engine sorts on, plus the natural-key
    /// lookups. Idempotent.
    pub async fn ensure_indexes(&self) -> StorageResult<()> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        let keys = [
            (collections::BLOCKS, doc! { "block.height": 1 }),
            (collections::TRANSACTIONS, doc! { "meta.height": 1, "meta.index": 1 }),
            (collections::TRANSACTIONS, doc! { "meta.hash": 1 }),
            (collections::TRANSACTIONS, doc! { "meta.aggregateId": 1 }),
            (collections::UNCONFIRMED_TRANSACTIONS, doc! { "meta.height": 1, "meta.index": 1 }),
            (collections::UNCONFIRMED_TRANSACTIONS, doc! { "meta.hash": 1 }),
            (collections::PARTIAL_TRANSACTIONS, doc! { "meta.height": 1, "meta.index": 1 }),
            (collections::PARTIAL_TRANSACTIONS, doc! { "meta.hash": 1 }),
            (collections::MOSAICS, doc! { "mosaic.startHeight": 1 }),
            (collections::MOSAICS, doc! { "mosaic.id": 1 }),
            (collections::NAMESPACES, doc! { "namespace.startHeight": 1 }),
            (collections::NAMESPACES, doc! { "namespace.id": 1 }),
            (collections::ACCOUNTS, doc! { "account.address": 1 }),
            (collections::ACCOUNTS, doc! { "account.publicKeyHeight": 1 }),
            (collections::MULTISIGS, doc! { "multisig.accountAddress": 1 }),
        ];

        for (collection, key) in keys {
            let model = IndexModel::builder().keys(key).build();
            self.store
                .database()
                .collection::<mongodb::bson::Document>(collection)
                .create_index(model)
                .await?;
        }
        Ok(())
    }
}
