//! Transaction reads across the three transaction collections.
//!
//! Transactions sort on `(meta.height desc, meta.index desc, _id desc)`.
//! Sub-transactions of an aggregate carry a `meta.aggregateId`
//! back-reference; cursor pages exclude them everywhere except in the
//! partial-transactions collection, where the back-reference is required.
//! That toggle is the [`TransactionGroup::dependent_documents`] flag, not a
//! collection-name comparison.

use crate::cursor::{flat_page, parse_document_id, pipeline_page, Direction, Extreme, SortKey};
use crate::error::{StorageError, StorageResult};
use crate::store::{binary, promote_id_to_meta, promote_id_to_meta_page};
use crate::{collections, TrebuchetBackend};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use tp_chain_config::{CURRENCY_NAMESPACE_ID, HARVEST_NAMESPACE_ID};
use tp_types::{Address, Hash256, Height, KeyParseError, TransactionKind, TransferFilter};

const TRANSACTIONS_SORT_KEY: SortKey = SortKey::new(&["meta.height", "meta.index", "_id"]);

/// Whether a collection's cursor pages exclude or require documents with an
/// aggregate back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DependentDocuments {
    Exclude,
    Require,
}

/// The transaction collection a route addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionGroup {
    Confirmed,
    Unconfirmed,
    Partial,
}

impl TransactionGroup {
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Confirmed => collections::TRANSACTIONS,
            Self::Unconfirmed => collections::UNCONFIRMED_TRANSACTIONS,
            Self::Partial => collections::PARTIAL_TRANSACTIONS,
        }
    }

    fn dependent_documents(&self) -> DependentDocuments {
        match self {
            Self::Partial => DependentDocuments::Require,
            _ => DependentDocuments::Exclude,
        }
    }

    /// The dependent-document toggle AND-ed into every cursor condition.
    fn dependents_condition(&self) -> Document {
        let required = self.dependent_documents() == DependentDocuments::Require;
        doc! { "meta.aggregateId": { "$exists": required } }
    }
}

/// A key naming one concrete transaction document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKey {
    Hash(Hash256),
    DocumentId(ObjectId),
}

impl TransactionKey {
    /// Splits the 64-hex hash form from the 24-hex internal id form by
    /// length; anything else is rejected as a malformed hash.
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if s.len() == 24 {
            return parse_document_id(s).map(Self::DocumentId);
        }
        Hash256::parse(s).map(Self::Hash)
    }

    fn condition(&self) -> Document {
        match self {
            Self::Hash(hash) => doc! { "meta.hash": binary(hash.as_bytes().to_vec()) },
            Self::DocumentId(id) => doc! { "_id": *id },
        }
    }
}

/// Anchor accepted by the transaction cursor routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAnchor {
    Absolute(Extreme),
    Key(TransactionKey),
}

impl TransactionAnchor {
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if let Some(extreme) = Extreme::from_time_keyword(s) {
            return Ok(Self::Absolute(extreme));
        }
        TransactionKey::parse(s).map(Self::Key)
    }
}

/// A validated `(type, filter)` selection from the typed transaction routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionTypeFilter {
    pub kind: TransactionKind,
    pub filter: Option<TransferFilter>,
}

impl TransactionTypeFilter {
    /// Only the transfer type supports secondary filters; any other pair is
    /// a hard error.
    pub fn new(kind: TransactionKind, filter: Option<TransferFilter>) -> Result<Self, KeyParseError> {
        match filter {
            Some(filter) if kind != TransactionKind::Transfer => Err(KeyParseError::InvalidFilterCombination {
                kind: kind.route_name().to_string(),
                filter: filter.route_name().to_string(),
            }),
            filter => Ok(Self { kind, filter }),
        }
    }
}

impl TrebuchetBackend {
    /// Single transaction by hash or internal id. Aggregates come back with
    /// their dependent sub-transactions attached under
    /// `transaction.transactions`.
    pub async fn transaction_by_key(
        &self,
        group: TransactionGroup,
        key: &TransactionKey,
    ) -> StorageResult<Document> {
        let document = self
            .store()
            .find_one(group.collection(), key.condition(), None)
            .await?
            .ok_or(StorageError::NotFound)?;

        let id = document.get_object_id("_id").ok();
        let mut document = promote_id_to_meta(document);

        if let Some(id) = id {
            if is_aggregate(&document) {
                let dependents = self
                    .store()
                    .find_sorted(
                        group.collection(),
                        doc! { "meta.aggregateId": id },
                        None,
                        doc! { "_id": 1 },
                        u64::MAX,
                    )
                    .await?;
                let dependents: Vec<Bson> =
                    promote_id_to_meta_page(dependents).into_iter().map(Bson::Document).collect();
                if let Ok(transaction) = document.get_document_mut("transaction") {
                    transaction.insert("transactions", dependents);
                }
            }
        }
        Ok(document)
    }

    /// Transactions included in the block at `height`, in inclusion order.
    /// The caller is responsible for rejecting heights above the tip.
    pub async fn transactions_at_height(&self, height: Height, count: u64) -> StorageResult<Vec<Document>> {
        let page = self
            .store()
            .find_sorted(
                collections::TRANSACTIONS,
                doc! {
                    "meta.height": height.as_stored(),
                    "meta.aggregateId": { "$exists": false },
                },
                None,
                doc! { "meta.index": 1 },
                count,
            )
            .await?;
        Ok(promote_id_to_meta_page(page))
    }

    /// One cursor page of a transaction collection.
    pub async fn transactions_page(
        &self,
        group: TransactionGroup,
        direction: Direction,
        anchor: &TransactionAnchor,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let tuple = self.transaction_anchor_tuple(group, anchor).await?;
        let page = flat_page(
            self.store(),
            group.collection(),
            TRANSACTIONS_SORT_KEY,
            direction,
            &tuple,
            Some(group.dependents_condition()),
            limit,
        )
        .await?;
        Ok(promote_id_to_meta_page(page))
    }

    /// One cursor page of confirmed transactions of a given type, with the
    /// optional transfer filter applied.
    pub async fn transactions_by_type_page(
        &self,
        direction: Direction,
        anchor: &TransactionAnchor,
        selection: &TransactionTypeFilter,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let group = TransactionGroup::Confirmed;
        let tuple = self.transaction_anchor_tuple(group, anchor).await?;
        let type_condition = doc! { "transaction.type": selection.kind.code() as i32 };

        let Some(filter) = selection.filter else {
            let extra = doc! { "$and": [type_condition, group.dependents_condition()] };
            let page = flat_page(
                self.store(),
                group.collection(),
                TRANSACTIONS_SORT_KEY,
                direction,
                &tuple,
                Some(extra),
                limit,
            )
            .await?;
            return Ok(promote_id_to_meta_page(page));
        };

        // Filtered queries join or scan per-document arrays, so the range
        // match runs first to keep the scan bounded by cheap fields.
        let range = crate::cursor::range::range_condition(TRANSACTIONS_SORT_KEY, direction, &tuple);
        let mut stages =
            vec![doc! { "$match": { "$and": [range, type_condition, group.dependents_condition()] } }];

        let unset: &[&str] = match filter {
            TransferFilter::Mosaic => {
                let currency = self.mosaic_id_aliased_by(CURRENCY_NAMESPACE_ID).await?;
                let harvest = self.mosaic_id_aliased_by(HARVEST_NAMESPACE_ID).await?;
                stages.extend(mosaic_filter_stages(currency, harvest));
                &["meta.hasOtherMosaics"]
            }
            TransferFilter::Multisig => {
                stages.extend(multisig_filter_stages());
                &["meta.multisigEntries"]
            }
        };

        let page = pipeline_page(
            self.store(),
            group.collection(),
            stages,
            TRANSACTIONS_SORT_KEY,
            direction,
            unset,
            limit,
        )
        .await?;
        Ok(promote_id_to_meta_page(page))
    }

    /// One cursor page of confirmed transactions touching the given
    /// address, in any role recorded in `meta.addresses`.
    pub async fn account_transactions_page(
        &self,
        address: &Address,
        direction: Direction,
        anchor: &TransactionAnchor,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let group = TransactionGroup::Confirmed;
        let tuple = self.transaction_anchor_tuple(group, anchor).await?;
        let extra = doc! { "$and": [
            { "meta.addresses": binary(address.as_bytes().to_vec()) },
            group.dependents_condition(),
        ] };

        let page = flat_page(
            self.store(),
            group.collection(),
            TRANSACTIONS_SORT_KEY,
            direction,
            &tuple,
            Some(extra),
            limit,
        )
        .await?;
        Ok(promote_id_to_meta_page(page))
    }

    async fn transaction_anchor_tuple(
        &self,
        group: TransactionGroup,
        anchor: &TransactionAnchor,
    ) -> StorageResult<Vec<Bson>> {
        let key = match anchor {
            TransactionAnchor::Absolute(extreme) => return Ok(TRANSACTIONS_SORT_KEY.absolute_tuple(*extreme)),
            TransactionAnchor::Key(key) => key,
        };

        let document = self
            .store()
            .find_one(
                group.collection(),
                key.condition(),
                Some(doc! { "meta.height": 1, "meta.index": 1 }),
            )
            .await?
            .ok_or(StorageError::NotFound)?;

        let meta = document.get_document("meta").map_err(|_| StorageError::NotFound)?;
        let height = meta.get("height").cloned().ok_or(StorageError::NotFound)?;
        let index = meta.get("index").cloned().ok_or(StorageError::NotFound)?;
        let id = document.get("_id").cloned().ok_or(StorageError::NotFound)?;
        Ok(vec![height, index, id])
    }
}

/// Keeps transfers carrying at least one mosaic other than the two
/// well-known network mosaics: a `$reduce` ORs `not in [currency, harvest]`
/// across `transaction.mosaics[]`.
fn mosaic_filter_stages(currency: i64, harvest: i64) -> Vec<Document> {
    vec![
        doc! { "$addFields": { "meta.hasOtherMosaics": { "$reduce": {
            "input": { "$ifNull": ["$transaction.mosaics", []] },
            "initialValue": false,
            "in": { "$or": ["$$value", { "$not": [{ "$in": ["$$this.id", [currency, harvest]] }] }] },
        } } } },
        doc! { "$match": { "meta.hasOtherMosaics": true } },
    ]
}

/// Keeps transfers referencing at least one address with a multisig entry:
/// an array-localField `$lookup` into the multisig collection, then a
/// non-empty check on the joined array.
fn multisig_filter_stages() -> Vec<Document> {
    vec![
        doc! { "$lookup": {
            "from": collections::MULTISIGS,
            "localField": "meta.addresses",
            "foreignField": "multisig.accountAddress",
            "as": "meta.multisigEntries",
        } },
        doc! { "$match": { "meta.multisigEntries.0": { "$exists": true } } },
    ]
}

fn is_aggregate(document: &Document) -> bool {
    let code = document
        .get_document("transaction")
        .ok()
        .and_then(|transaction| transaction.get_i32("type").ok());
    matches!(
        code,
        Some(code)
            if code == TransactionKind::AggregateComplete.code() as i32
                || code == TransactionKind::AggregateBonded.code() as i32
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn groups_map_to_their_collections() {
        assert_eq!(TransactionGroup::Confirmed.collection(), "transactions");
        assert_eq!(TransactionGroup::Unconfirmed.collection(), "unconfirmedTransactions");
        assert_eq!(TransactionGroup::Partial.collection(), "partialTransactions");
    }

    #[rstest]
    #[case(TransactionGroup::Confirmed, false)]
    #[case(TransactionGroup::Unconfirmed, false)]
    #[case(TransactionGroup::Partial, true)]
    fn dependent_toggle_follows_the_group(#[case] group: TransactionGroup, #[case] required: bool) {
        assert_eq!(group.dependents_condition(), doc! { "meta.aggregateId": { "$exists": required } });
    }

    #[test]
    fn anchor_parse_splits_key_forms_by_length() {
        let hash = "C8FC3FB54FDDFBCE0E8C71224990124E4EEC5AD5D30E592EDFA9524669A23810";
        assert_eq!(
            TransactionAnchor::parse(hash),
            Ok(TransactionAnchor::Key(TransactionKey::Hash(Hash256::parse(hash).unwrap())))
        );

        let id = ObjectId::new();
        assert_eq!(
            TransactionAnchor::parse(&id.to_hex()),
            Ok(TransactionAnchor::Key(TransactionKey::DocumentId(id)))
        );

        assert_eq!(
            TransactionAnchor::parse("latest"),
            Ok(TransactionAnchor::Absolute(Extreme::Highest))
        );
    }

    #[test]
    fn oversized_hash_is_a_length_error() {
        let err = TransactionKey::parse(&"AB".repeat(33)).unwrap_err();
        assert_eq!(err, KeyParseError::InvalidLength { expected: 64, actual: 66 });
    }

    #[test]
    fn filters_require_the_transfer_type() {
        assert!(TransactionTypeFilter::new(TransactionKind::Transfer, Some(TransferFilter::Mosaic)).is_ok());
        assert!(TransactionTypeFilter::new(TransactionKind::HashLock, None).is_ok());
        assert_eq!(
            TransactionTypeFilter::new(TransactionKind::HashLock, Some(TransferFilter::Multisig)),
            Err(KeyParseError::InvalidFilterCombination {
                kind: "hashLock".to_string(),
                filter: "multisig".to_string(),
            })
        );
    }

    #[test]
    fn mosaic_filter_folds_over_the_well_known_ids() {
        let currency = 0x0DC6_7FBE_1CAD_29E3_u64 as i64;
        let harvest = 0x2651_4E2A_1EF3_3824_u64 as i64;
        let stages = mosaic_filter_stages(currency, harvest);
        assert_eq!(stages.len(), 2);

        let reduce = stages[0]
            .get_document("$addFields")
            .unwrap()
            .get_document("meta.hasOtherMosaics")
            .unwrap()
            .get_document("$reduce")
            .unwrap();
        assert_eq!(reduce.get("initialValue"), Some(&mongodb::bson::Bson::Boolean(false)));
        assert_eq!(stages[1], doc! { "$match": { "meta.hasOtherMosaics": true } });
    }

    #[test]
    fn multisig_filter_joins_on_the_address_array() {
        let stages = multisig_filter_stages();
        let lookup = stages[0].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from"), Ok("multisigs"));
        assert_eq!(lookup.get_str("localField"), Ok("meta.addresses"));
        assert_eq!(lookup.get_str("foreignField"), Ok("multisig.accountAddress"));
        assert_eq!(stages[1], doc! { "$match": { "meta.multisigEntries.0": { "$exists": true } } });
    }

    #[test]
    fn aggregate_detection_reads_the_type_code() {
        assert!(is_aggregate(&doc! { "transaction": { "type": 0x4141 } }));
        assert!(is_aggregate(&doc! { "transaction": { "type": 0x4241 } }));
        assert!(!is_aggregate(&doc! { "transaction": { "type": 0x4154 } }));
        assert!(!is_aggregate(&doc! { "transaction": {} }));
    }
}
