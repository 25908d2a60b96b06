//! Namespace reads. Sort order `(namespace.startHeight desc, _id desc)`.
//!
//! Namespaces also carry the mosaic aliases behind the well-known currency
//! and harvest ids; [`TrebuchetBackend::mosaic_id_aliased_by`] is re-read on
//! every query that needs it because aliases may be relinked at any height.

use crate::cursor::{flat_page, parse_document_id, Direction, Extreme, SortKey};
use crate::error::{StorageError, StorageResult};
use crate::store::{promote_id_to_meta, promote_id_to_meta_page};
use crate::{collections, TrebuchetBackend};
use mongodb::bson::{doc, oid::ObjectId, Document};
use tp_types::{KeyParseError, NamespaceId};

const NAMESPACES_SORT_KEY: SortKey = SortKey::new(&["namespace.startHeight", "_id"]);

/// Anchor accepted by the namespace cursor routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceAnchor {
    Absolute(Extreme),
    Id(NamespaceId),
    DocumentId(ObjectId),
}

impl NamespaceAnchor {
    /// Tries the time keywords, then the 16-hex namespace id, then the
    /// 24-hex internal id.
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if let Some(extreme) = Extreme::from_time_keyword(s) {
            return Ok(Self::Absolute(extreme));
        }
        if s.len() == 24 {
            return parse_document_id(s).map(Self::DocumentId);
        }
        NamespaceId::parse(s).map(Self::Id)
    }
}

impl TrebuchetBackend {
    pub async fn namespace_by_id(&self, id: NamespaceId) -> StorageResult<Document> {
        let namespace = self
            .store()
            .find_one(collections::NAMESPACES, doc! { "namespace.id": id.as_stored() }, None)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(promote_id_to_meta(namespace))
    }

    /// The mosaic id currently aliased by a namespace. Deliberately not
    /// cached: an alias can be relinked while the process runs.
    pub async fn mosaic_id_aliased_by(&self, namespace_id: NamespaceId) -> StorageResult<i64> {
        let namespace = self
            .store()
            .find_one(
                collections::NAMESPACES,
                doc! { "namespace.id": namespace_id.as_stored() },
                Some(doc! { "namespace.alias.mosaicId": 1 }),
            )
            .await?
            .ok_or(StorageError::NotFound)?;

        namespace
            .get_document("namespace")
            .ok()
            .and_then(|namespace| namespace.get_document("alias").ok())
            .and_then(|alias| alias.get_i64("mosaicId").ok())
            .ok_or(StorageError::NotFound)
    }

    /// One cursor page of namespaces.
    pub async fn namespaces_page(
        &self,
        direction: Direction,
        anchor: &NamespaceAnchor,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let tuple = match anchor {
            NamespaceAnchor::Absolute(extreme) => NAMESPACES_SORT_KEY.absolute_tuple(*extreme),
            NamespaceAnchor::Id(id) => {
                self.start_height_tuple(
                    collections::NAMESPACES,
                    "namespace",
                    doc! { "namespace.id": id.as_stored() },
                )
                .await?
            }
            NamespaceAnchor::DocumentId(id) => {
                self.start_height_tuple(collections::NAMESPACES, "namespace", doc! { "_id": *id }).await?
            }
        };

        let page = flat_page(
            self.store(),
            collections::NAMESPACES,
            NAMESPACES_SORT_KEY,
            direction,
            &tuple,
            None,
            limit,
        )
        .await?;
        Ok(promote_id_to_meta_page(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("latest")]
    #[case("earliest")]
    fn keywords_parse_first(#[case] input: &str) {
        assert!(matches!(NamespaceAnchor::parse(input), Ok(NamespaceAnchor::Absolute(_))));
    }

    #[test]
    fn id_forms_are_split_by_length() {
        assert_eq!(
            NamespaceAnchor::parse("941299B2B7E1291C"),
            Ok(NamespaceAnchor::Id(NamespaceId(0x9412_99B2_B7E1_291C)))
        );
        let id = ObjectId::new();
        assert_eq!(NamespaceAnchor::parse(&id.to_hex()), Ok(NamespaceAnchor::DocumentId(id)));
        assert_eq!(
            NamespaceAnchor::parse("941299B2B7E1291C00"),
            Err(KeyParseError::InvalidLength { expected: 16, actual: 18 })
        );
    }
}
