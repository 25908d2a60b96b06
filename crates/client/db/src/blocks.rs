//! Block reads.
//!
//! Blocks sort on `(block.height desc, _id desc)`. The `latest` anchor is
//! chain-dependent: it resolves to `chain height + 1` so that the tip block
//! itself lands in the first `from(latest)` page.

use crate::cursor::{flat_page, Direction, Extreme, SortKey};
use crate::error::{StorageError, StorageResult};
use crate::store::{max_document_id, strip_id, strip_id_page};
use crate::{collections, TrebuchetBackend};
use mongodb::bson::{doc, Bson, Document};
use tp_types::{Height, KeyParseError};

const BLOCKS_SORT_KEY: SortKey = SortKey::new(&["block.height", "_id"]);

/// Anchor accepted by the block cursor routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAnchor {
    Absolute(Extreme),
    Height(Height),
}

impl BlockAnchor {
    /// Tries the time keywords, then a decimal height.
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if let Some(extreme) = Extreme::from_time_keyword(s) {
            return Ok(Self::Absolute(extreme));
        }
        Height::parse(s).map(Self::Height)
    }
}

impl TrebuchetBackend {
    /// Single block at the given height. A height above the tip is
    /// distinguished from a hole in storage by the caller-facing message,
    /// but both are not-found here.
    pub async fn block_at(&self, height: Height) -> StorageResult<Document> {
        let block = self
            .store()
            .find_one(collections::BLOCKS, doc! { "block.height": height.as_stored() }, None)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(strip_id(block))
    }

    /// Block-range read: up to `count` blocks starting at `height`,
    /// ascending. This is the legacy paged regime, not a cursor.
    pub async fn blocks_in_range(&self, height: Height, count: u64) -> StorageResult<Vec<Document>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let page = self
            .store()
            .find_sorted(
                collections::BLOCKS,
                doc! { "block.height": { "$gte": height.as_stored() } },
                None,
                doc! { "block.height": 1 },
                count,
            )
            .await?;
        Ok(strip_id_page(page))
    }

    /// One cursor page of blocks.
    pub async fn blocks_page(
        &self,
        direction: Direction,
        anchor: &BlockAnchor,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let tuple = match anchor {
            BlockAnchor::Absolute(Extreme::Highest) => {
                // One past the tip, so `from(latest)` includes the tip block.
                let above_tip = self.chain_height().await?.0 + 1;
                vec![Bson::Int64(above_tip as i64), Bson::ObjectId(max_document_id())]
            }
            BlockAnchor::Absolute(Extreme::Lowest) => BLOCKS_SORT_KEY.absolute_tuple(Extreme::Lowest),
            BlockAnchor::Height(height) => {
                let block = self
                    .store()
                    .find_one(
                        collections::BLOCKS,
                        doc! { "block.height": height.as_stored() },
                        Some(doc! { "block.height": 1 }),
                    )
                    .await?
                    .ok_or(StorageError::NotFound)?;
                anchor_tuple_of(&block)?
            }
        };

        let page =
            flat_page(self.store(), collections::BLOCKS, BLOCKS_SORT_KEY, direction, &tuple, None, limit)
                .await?;
        Ok(strip_id_page(page))
    }
}

fn anchor_tuple_of(block: &Document) -> StorageResult<Vec<Bson>> {
    let height = block
        .get_document("block")
        .ok()
        .and_then(|b| b.get("height").cloned())
        .ok_or(StorageError::NotFound)?;
    let id = block.get("_id").cloned().ok_or(StorageError::NotFound)?;
    Ok(vec![height, id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("latest", BlockAnchor::Absolute(Extreme::Highest))]
    #[case("earliest", BlockAnchor::Absolute(Extreme::Lowest))]
    #[case("42", BlockAnchor::Height(Height(42)))]
    fn anchor_parse_order(#[case] input: &str, #[case] expected: BlockAnchor) {
        assert_eq!(BlockAnchor::parse(input), Ok(expected));
    }

    #[rstest]
    // Quantity keywords belong to the account routes.
    #[case("most")]
    #[case("least")]
    #[case("0x10")]
    #[case("")]
    fn anchor_rejects_foreign_keywords(#[case] input: &str) {
        assert_eq!(BlockAnchor::parse(input), Err(KeyParseError::InvalidDecimal));
    }

    #[test]
    fn height_anchor_tuple_reads_the_document() {
        let id = mongodb::bson::oid::ObjectId::new();
        let block = doc! { "_id": id, "block": { "height": 9_i64 } };
        assert_eq!(anchor_tuple_of(&block).unwrap(), vec![Bson::Int64(9), Bson::ObjectId(id)]);
    }
}
