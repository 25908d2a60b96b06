//! Account reads and the four computed account rankings.
//!
//! None of the ranking fields are stored: the importance is the last entry
//! of `account.importances[]`, the harvested counters are folds over
//! `account.activityBuckets[]`, and the balances are folds over
//! `account.mosaics[]` against the mosaic currently aliased by a well-known
//! namespace. Each ranking materializes its fields with `$addFields` before
//! the range match and strips them again before documents leave the engine.

use crate::cursor::{pipeline_page, Direction, Extreme, SortKey};
use crate::error::{StorageError, StorageResult};
use crate::store::{binary, strip_id};
use crate::{collections, TrebuchetBackend};
use mongodb::bson::{doc, Bson, Document};
use tp_chain_config::{CURRENCY_NAMESPACE_ID, HARVEST_NAMESPACE_ID};
use tp_types::{Address, KeyParseError, NamespaceId, PublicKey};

const IMPORTANCE_SORT_KEY: SortKey =
    SortKey::new(&["account.importance", "account.publicKeyHeight", "_id"]);
const HARVESTED_BLOCKS_SORT_KEY: SortKey =
    SortKey::new(&["account.harvestedBlocks", "account.publicKeyHeight", "_id"]);
const HARVESTED_FEES_SORT_KEY: SortKey = SortKey::new(&[
    "account.harvestedFees",
    "account.harvestedBlocks",
    "account.publicKeyHeight",
    "_id",
]);
const BALANCE_SORT_KEY: SortKey = SortKey::new(&["account.balance", "account.publicKeyHeight", "_id"]);

/// The composite order an account page is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRanking {
    Importance,
    HarvestedBlocks,
    HarvestedFees,
    CurrencyBalance,
    HarvestBalance,
}

impl AccountRanking {
    fn sort_key(&self) -> SortKey {
        match self {
            Self::Importance => IMPORTANCE_SORT_KEY,
            Self::HarvestedBlocks => HARVESTED_BLOCKS_SORT_KEY,
            Self::HarvestedFees => HARVESTED_FEES_SORT_KEY,
            Self::CurrencyBalance | Self::HarvestBalance => BALANCE_SORT_KEY,
        }
    }

    /// The scaffold fields to strip before documents are returned.
    fn computed_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Importance => &["account.importance"],
            Self::HarvestedBlocks => &["account.harvestedBlocks"],
            Self::HarvestedFees => &["account.harvestedFees", "account.harvestedBlocks"],
            Self::CurrencyBalance | Self::HarvestBalance => &["account.balance"],
        }
    }

    /// Which namespace aliases the mosaic a balance ranking sums. Each
    /// balance field reads its own namespace.
    fn balance_namespace(&self) -> Option<NamespaceId> {
        match self {
            Self::CurrencyBalance => Some(CURRENCY_NAMESPACE_ID),
            Self::HarvestBalance => Some(HARVEST_NAMESPACE_ID),
            _ => None,
        }
    }
}

/// Anchor accepted by the account cursor routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAnchor {
    Absolute(Extreme),
    Address(Address),
    PublicKey(PublicKey),
}

impl AccountAnchor {
    /// Tries the quantity keywords, then splits the key forms by length:
    /// 40 characters parse as a base32 address, 50 as a hex address and 64
    /// as a public key.
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if let Some(extreme) = Extreme::from_quantity_keyword(s) {
            return Ok(Self::Absolute(extreme));
        }
        match s.len() {
            Address::HEX_LEN => Address::parse_hex(s).map(Self::Address),
            64 => PublicKey::parse(s).map(Self::PublicKey),
            _ => Address::parse_base32(s).map(Self::Address),
        }
    }

    /// The concrete address this anchor names, if it names one. Public keys
    /// convert through the network's address prefix.
    pub fn address(&self, network: tp_types::Network) -> Option<Address> {
        match self {
            Self::Address(address) => Some(*address),
            Self::PublicKey(public_key) => Some(Address::from_public_key(network, public_key)),
            Self::Absolute(_) => None,
        }
    }
}

impl TrebuchetBackend {
    /// Single account by address or public key.
    pub async fn account_by_key(&self, anchor: &AccountAnchor) -> StorageResult<Document> {
        let address = self.anchor_address(anchor)?;
        let account = self
            .store()
            .find_one(collections::ACCOUNTS, address_condition(&address), None)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(strip_id(account))
    }

    /// The multisig entry of an account, if it participates in one.
    pub async fn multisig_by_key(&self, anchor: &AccountAnchor) -> StorageResult<Document> {
        let address = self.anchor_address(anchor)?;
        let entry = self
            .store()
            .find_one(
                collections::MULTISIGS,
                doc! { "multisig.accountAddress": binary(address.as_bytes().to_vec()) },
                None,
            )
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(strip_id(entry))
    }

    /// One cursor page of accounts under the given ranking.
    pub async fn accounts_page(
        &self,
        ranking: AccountRanking,
        direction: Direction,
        anchor: &AccountAnchor,
        limit: u64,
    ) -> StorageResult<Vec<Document>> {
        let sort_key = ranking.sort_key();
        let computed = self.ranking_stages(ranking).await?;

        let tuple = match anchor {
            AccountAnchor::Absolute(extreme) => sort_key.absolute_tuple(*extreme),
            anchor => {
                let address = self.anchor_address(anchor)?;
                self.account_anchor_tuple(&address, sort_key, &computed).await?
            }
        };

        let range = crate::cursor::range::range_condition(sort_key, direction, &tuple);
        let mut stages = computed;
        stages.push(doc! { "$match": range });

        let page = pipeline_page(
            self.store(),
            collections::ACCOUNTS,
            stages,
            sort_key,
            direction,
            ranking.computed_paths(),
            limit,
        )
        .await?;
        Ok(page.into_iter().map(strip_id).collect())
    }

    /// Materializes a single account's computed sort fields and reads the
    /// anchor tuple off the result.
    async fn account_anchor_tuple(
        &self,
        address: &Address,
        sort_key: SortKey,
        computed: &[Document],
    ) -> StorageResult<Vec<Bson>> {
        let mut stages = vec![doc! { "$match": address_condition(address) }];
        stages.extend(computed.iter().cloned());

        let matches = self
            .store()
            .aggregate(collections::ACCOUNTS, stages, doc! { "_id": 1 }, &[], 1)
            .await?;
        let account = matches.into_iter().next().ok_or(StorageError::NotFound)?;

        sort_key
            .fields()
            .iter()
            .map(|field| dotted_value(&account, field).ok_or(StorageError::NotFound))
            .collect()
    }

    /// The `$addFields` stages materializing the ranking's computed fields.
    async fn ranking_stages(&self, ranking: AccountRanking) -> StorageResult<Vec<Document>> {
        if let Some(namespace_id) = ranking.balance_namespace() {
            let mosaic_id = self.mosaic_id_aliased_by(namespace_id).await?;
            return Ok(vec![balance_stage(mosaic_id)]);
        }

        Ok(match ranking {
            // The last recorded importance; an account with no importances
            // yet sorts as zero.
            AccountRanking::Importance => vec![doc! { "$addFields": { "account.importance": {
                "$ifNull": [
                    { "$arrayElemAt": [{ "$ifNull": ["$account.importances.value", []] }, -1] },
                    Bson::Int64(0),
                ],
            } } }],
            AccountRanking::HarvestedBlocks => vec![harvested_blocks_stage()],
            AccountRanking::HarvestedFees => vec![
                harvested_blocks_stage(),
                doc! { "$addFields": { "account.harvestedFees": {
                    "$sum": "$account.activityBuckets.totalFeesPaid",
                } } },
            ],
            AccountRanking::CurrencyBalance | AccountRanking::HarvestBalance => unreachable!(),
        })
    }

    fn anchor_address(&self, anchor: &AccountAnchor) -> StorageResult<Address> {
        anchor.address(self.chain_config().network).ok_or(StorageError::NotFound)
    }
}

fn address_condition(address: &Address) -> Document {
    doc! { "account.address": binary(address.as_bytes().to_vec()) }
}

fn harvested_blocks_stage() -> Document {
    doc! { "$addFields": { "account.harvestedBlocks": {
        "$size": { "$ifNull": ["$account.activityBuckets", []] },
    } } }
}

/// The summed amount this account holds of `mosaic_id`. The accumulator is
/// an explicit 64-bit zero so empty holdings sort as `Long(0)`.
fn balance_stage(mosaic_id: i64) -> Document {
    doc! { "$addFields": { "account.balance": { "$reduce": {
        "input": { "$ifNull": ["$account.mosaics", []] },
        "initialValue": Bson::Int64(0),
        "in": { "$add": ["$$value", {
            "$cond": [{ "$eq": ["$$this.id", mosaic_id] }, "$$this.amount", Bson::Int64(0)],
        }] },
    } } } }
}

fn dotted_value(document: &Document, path: &str) -> Option<Bson> {
    let mut current = document;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            return current.get(part).cloned();
        }
        current = current.get_document(part).ok()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tp_types::Network;

    #[rstest]
    #[case("most", AccountAnchor::Absolute(Extreme::Highest))]
    #[case("least", AccountAnchor::Absolute(Extreme::Lowest))]
    fn quantity_keywords_parse_first(#[case] input: &str, #[case] expected: AccountAnchor) {
        assert_eq!(AccountAnchor::parse(input), Ok(expected));
    }

    #[test]
    fn key_forms_are_split_by_length() {
        let address = Address([0x68; 25]);
        assert_eq!(AccountAnchor::parse(&address.to_string()), Ok(AccountAnchor::Address(address)));
        assert_eq!(AccountAnchor::parse(&address.to_hex()), Ok(AccountAnchor::Address(address)));

        let key = PublicKey([0xAB; 32]);
        assert_eq!(AccountAnchor::parse(&key.to_string()), Ok(AccountAnchor::PublicKey(key)));

        // Time keywords belong to the other entity families.
        assert!(AccountAnchor::parse("latest").is_err());
    }

    #[test]
    fn each_balance_ranking_reads_its_own_namespace() {
        assert_eq!(AccountRanking::CurrencyBalance.balance_namespace(), Some(CURRENCY_NAMESPACE_ID));
        assert_eq!(AccountRanking::HarvestBalance.balance_namespace(), Some(HARVEST_NAMESPACE_ID));
        assert_eq!(AccountRanking::Importance.balance_namespace(), None);
    }

    #[test]
    fn harvested_fees_sorts_over_four_fields() {
        let fields = AccountRanking::HarvestedFees.sort_key().fields();
        assert_eq!(
            fields,
            &["account.harvestedFees", "account.harvestedBlocks", "account.publicKeyHeight", "_id"]
        );
        assert_eq!(fields.last(), Some(&"_id"));
    }

    #[test]
    fn computed_paths_cover_every_computed_sort_field() {
        for ranking in [
            AccountRanking::Importance,
            AccountRanking::HarvestedBlocks,
            AccountRanking::HarvestedFees,
            AccountRanking::CurrencyBalance,
            AccountRanking::HarvestBalance,
        ] {
            for path in ranking.computed_paths() {
                assert!(ranking.sort_key().fields().contains(path));
            }
            // The stored tie-breakers are never stripped.
            assert!(!ranking.computed_paths().contains(&"account.publicKeyHeight"));
            assert!(!ranking.computed_paths().contains(&"_id"));
        }
    }

    #[test]
    fn balance_stage_folds_with_a_long_accumulator() {
        let stage = balance_stage(0x0DC6_7FBE_1CAD_29E3_u64 as i64);
        let reduce = stage
            .get_document("$addFields")
            .unwrap()
            .get_document("account.balance")
            .unwrap()
            .get_document("$reduce")
            .unwrap();
        assert_eq!(reduce.get("initialValue"), Some(&Bson::Int64(0)));
    }

    #[test]
    fn dotted_value_walks_nested_documents() {
        let document = doc! { "account": { "publicKeyHeight": 5_i64 }, "_id": 1_i32 };
        assert_eq!(dotted_value(&document, "account.publicKeyHeight"), Some(Bson::Int64(5)));
        assert_eq!(dotted_value(&document, "_id"), Some(Bson::Int32(1)));
        assert_eq!(dotted_value(&document, "account.importance"), None);
    }

    #[test]
    fn public_keys_resolve_through_the_network_prefix() {
        let key = PublicKey([0x11; 32]);
        let derived = Address::from_public_key(Network::Mainnet, &key);
        assert_eq!(derived.as_bytes()[0], 0x68);
    }
}
