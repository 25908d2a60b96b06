//! Thin adapter over the document database.
//!
//! Every read the backend performs goes through the four operations here.
//! The adapter clamps page sizes, appends the trailing sort/projection/limit
//! stages of aggregations, and owns the id sanitizers and the sentinel
//! values the cursor engine builds absolute anchors from. It adds no
//! retries and no error mapping of its own.

use crate::error::StorageResult;
use futures::TryStreamExt;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{doc, oid::ObjectId, Binary, Bson, Document};
use tp_chain_config::StorePageWindow;

/// Smallest value a stored 64-bit chain quantity can take.
pub const MIN_LONG: i64 = i64::MIN;
/// Largest value a stored 64-bit chain quantity can take.
pub const MAX_LONG: i64 = i64::MAX;

/// All-zero internal document id, strictly below every real id.
pub fn min_document_id() -> ObjectId {
    ObjectId::from_bytes([0x00; 12])
}

/// All-0xFF internal document id, strictly above every real id.
pub fn max_document_id() -> ObjectId {
    ObjectId::from_bytes([0xFF; 12])
}

/// The stored form of hashes and addresses: a generic binary value.
pub fn binary(bytes: Vec<u8>) -> Bson {
    Bson::Binary(Binary { subtype: BinarySubtype::Generic, bytes })
}

pub struct DocumentStore {
    db: mongodb::Database,
    page_window: StorePageWindow,
}

impl DocumentStore {
    pub fn new(db: mongodb::Database, page_window: StorePageWindow) -> Self {
        Self { db, page_window }
    }

    pub fn database(&self) -> &mongodb::Database {
        &self.db
    }

    pub async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> StorageResult<Option<Document>> {
        let coll = self.db.collection::<Document>(collection);
        let mut action = coll.find_one(filter);
        if let Some(projection) = projection {
            action = action.projection(projection);
        }
        Ok(action.await?)
    }

    /// Bounded find-project-sort-limit. The limit is clamped into the
    /// configured page window before it reaches the store.
    pub async fn find_sorted(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
        sort: Document,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let limit = self.page_window.clamp(limit);
        let coll = self.db.collection::<Document>(collection);
        let mut action = coll.find(filter).sort(sort).limit(limit as i64);
        if let Some(projection) = projection {
            action = action.projection(projection);
        }
        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    /// Runs the given stages in order, then sorts, strips the scaffold
    /// fields and bounds the result.
    ///
    /// 64-bit integers survive the pipeline untouched: the BSON mapping
    /// keeps `Int64` values as `Int64`, there is no numeric widening to
    /// disable on this driver.
    pub async fn aggregate(
        &self,
        collection: &str,
        stages: Vec<Document>,
        sort: Document,
        unset: &[&str],
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let limit = self.page_window.clamp(limit);
        let mut pipeline = stages;
        pipeline.push(doc! { "$sort": sort });
        if !unset.is_empty() {
            let fields: Vec<&str> = unset.to_vec();
            pipeline.push(doc! { "$unset": fields });
        }
        pipeline.push(doc! { "$limit": limit as i64 });

        let cursor = self.db.collection::<Document>(collection).aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self, collection: &str) -> StorageResult<u64> {
        Ok(self.db.collection::<Document>(collection).count_documents(doc! {}).await?)
    }
}

/// Deletes the internal id from a document.
pub fn strip_id(mut document: Document) -> Document {
    document.remove("_id");
    document
}

/// Moves the internal id to the public `meta.id` field.
pub fn promote_id_to_meta(mut document: Document) -> Document {
    if let Some(id) = document.remove("_id") {
        match document.get_document_mut("meta") {
            Ok(meta) => {
                meta.insert("id", id);
            }
            Err(_) => {
                document.insert("meta", doc! { "id": id });
            }
        }
    }
    document
}

pub fn strip_id_page(page: Vec<Document>) -> Vec<Document> {
    page.into_iter().map(strip_id).collect()
}

pub fn promote_id_to_meta_page(page: Vec<Document>) -> Vec<Document> {
    page.into_iter().map(promote_id_to_meta).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn sentinel_ids_bracket_real_ids() {
        let real = ObjectId::new();
        assert!(min_document_id() < real);
        assert!(real < max_document_id());
    }

    #[test]
    fn strip_id_deletes_only_the_internal_id() {
        let id = ObjectId::new();
        let stripped = strip_id(doc! { "_id": id, "block": { "height": 7_i64 } });
        assert_eq!(stripped, doc! { "block": { "height": 7_i64 } });
    }

    #[test]
    fn promote_moves_the_id_into_existing_meta() {
        let id = ObjectId::new();
        let promoted = promote_id_to_meta(doc! { "_id": id, "meta": { "height": 3_i64 }, "transaction": {} });
        assert_eq!(promoted.get_document("meta").unwrap().get("id"), Some(&Bson::ObjectId(id)));
        assert!(!promoted.contains_key("_id"));
        // The pre-existing meta content survives.
        assert_eq!(promoted.get_document("meta").unwrap().get("height"), Some(&Bson::Int64(3)));
    }

    #[test]
    fn promote_creates_meta_when_absent() {
        let id = ObjectId::new();
        let promoted = promote_id_to_meta(doc! { "_id": id, "namespace": {} });
        assert_eq!(promoted.get_document("meta").unwrap().get("id"), Some(&Bson::ObjectId(id)));
    }

    #[test]
    fn promote_without_id_is_identity() {
        let document = doc! { "meta": {}, "transaction": {} };
        assert_eq!(promote_id_to_meta(document.clone()), document);
    }
}
