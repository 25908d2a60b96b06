//! Chain statistic and storage diagnostics.

use crate::error::{StorageError, StorageResult};
use crate::store::strip_id;
use crate::{collections, TrebuchetBackend};
use mongodb::bson::{doc, Document};
use tp_types::Height;

impl TrebuchetBackend {
    /// The current chain statistic document (height and score), without the
    /// internal id.
    pub async fn chain_statistic(&self) -> StorageResult<Document> {
        let statistic = self
            .store()
            .find_one(collections::CHAIN_STATISTIC, doc! {}, None)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(strip_id(statistic))
    }

    /// The chain tip height at query time.
    pub async fn chain_height(&self) -> StorageResult<Height> {
        let statistic = self.chain_statistic().await?;
        let height = statistic
            .get_document("current")
            .ok()
            .and_then(|current| current.get_i64("height").ok())
            .ok_or(StorageError::NotFound)?;
        Ok(Height(height as u64))
    }

    /// The current chain score as a `(high, low)` 128-bit pair.
    pub async fn chain_score(&self) -> StorageResult<(i64, i64)> {
        let statistic = self.chain_statistic().await?;
        let current = statistic.get_document("current").map_err(|_| StorageError::NotFound)?;
        let high = current.get_i64("scoreHigh").map_err(|_| StorageError::NotFound)?;
        let low = current.get_i64("scoreLow").map_err(|_| StorageError::NotFound)?;
        Ok((high, low))
    }

    /// Collection counts for the storage diagnostic route.
    pub async fn storage_info(&self) -> StorageResult<Document> {
        let num_blocks = self.store().count(collections::BLOCKS).await?;
        let num_transactions = self.store().count(collections::TRANSACTIONS).await?;
        let num_accounts = self.store().count(collections::ACCOUNTS).await?;
        Ok(doc! {
            "numBlocks": num_blocks as i64,
            "numTransactions": num_transactions as i64,
            "numAccounts": num_accounts as i64,
        })
    }
}
