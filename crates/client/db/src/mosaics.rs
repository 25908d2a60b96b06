//! Mosaic reads. Sort order `(mosaic.startHeight desc, _id desc)`.

use crate::cursor::{flat_page, Direction, Extreme, SortKey};
use crate::error::{StorageError, StorageResult};
use crate::store::{promote_id_to_meta, promote_id_to_meta_page};
use crate::{collections, TrebuchetBackend};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use tp_types::{KeyParseError, MosaicId};

const MOSAICS_SORT_KEY: SortKey = SortKey::new(&["mosaic.startHeight", "_id"]);

/// Anchor accepted by the mosaic cursor routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicAnchor {
    Absolute(Extreme),
    Id(MosaicId),
    DocumentId(ObjectId),
}

impl MosaicAnchor {
    /// Tries the time keywords, then the 16-hex mosaic id, then the 24-hex
    /// internal id.
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if let Some(extreme) = Extreme::from_time_keyword(s) {
            return Ok(Self::Absolute(extreme));
        }
        if s.len() == 24 {
            return crate::cursor::parse_document_id(s).map(Self::DocumentId);
        }
        MosaicId::parse(s).map(Self::Id)
    }
}

impl TrebuchetBackend {
    pub async fn mosaic_by_id(&self, id: MosaicId) -> StorageResult<Document> {
        let mosaic = self
            .store()
            .find_one(collections::MOSAICS, doc! { "mosaic.id": id.as_stored() }, None)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(promote_id_to_meta(mosaic))
    }

    /// One cursor page of mosaics.
    pub async fn mosaics_page(
        &self,
        direction: Direction,
        anchor: &MosaicAnchor,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let tuple = match anchor {
            MosaicAnchor::Absolute(extreme) => MOSAICS_SORT_KEY.absolute_tuple(*extreme),
            MosaicAnchor::Id(id) => {
                self.start_height_tuple(collections::MOSAICS, "mosaic", doc! { "mosaic.id": id.as_stored() })
                    .await?
            }
            MosaicAnchor::DocumentId(id) => {
                self.start_height_tuple(collections::MOSAICS, "mosaic", doc! { "_id": *id }).await?
            }
        };

        let page =
            flat_page(self.store(), collections::MOSAICS, MOSAICS_SORT_KEY, direction, &tuple, None, limit)
                .await?;
        Ok(promote_id_to_meta_page(page))
    }

    /// Reads the `(startHeight, _id)` anchor tuple out of the one document
    /// matching `filter`. Shared by the mosaic and namespace cursors.
    pub(crate) async fn start_height_tuple(
        &self,
        collection: &str,
        root: &str,
        filter: Document,
    ) -> StorageResult<Vec<Bson>> {
        let start_height_path = format!("{root}.startHeight");
        let document = self
            .store()
            .find_one(collection, filter, Some(doc! { &start_height_path: 1 }))
            .await?
            .ok_or(StorageError::NotFound)?;

        let start_height = document
            .get_document(root)
            .ok()
            .and_then(|entity| entity.get("startHeight").cloned())
            .ok_or(StorageError::NotFound)?;
        let id = document.get("_id").cloned().ok_or(StorageError::NotFound)?;
        Ok(vec![start_height, id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_parse_order() {
        assert_eq!(MosaicAnchor::parse("latest"), Ok(MosaicAnchor::Absolute(Extreme::Highest)));
        assert_eq!(
            MosaicAnchor::parse("85BBEA6CC462B244"),
            Ok(MosaicAnchor::Id(MosaicId(0x85BB_EA6C_C462_B244)))
        );
        let id = ObjectId::new();
        assert_eq!(MosaicAnchor::parse(&id.to_hex()), Ok(MosaicAnchor::DocumentId(id)));
    }

    #[test]
    fn anchor_rejects_malformed_keys() {
        assert!(MosaicAnchor::parse("most").is_err());
        assert!(MosaicAnchor::parse("85BBEA6CC462B2").is_err());
        // 24 characters that are not hex fail as a document id.
        assert!(MosaicAnchor::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }
}
