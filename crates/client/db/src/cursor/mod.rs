//! Cursor engine core: directions, anchors and the sorted-page executor.
//!
//! Every entity collection pages through this machinery. An anchor resolves
//! to an [`AnchorTuple`] congruent with the entity's [`SortKey`], the range
//! condition of [`range`] selects everything strictly before or after that
//! tuple, and the executor returns at most `limit` documents, always in
//! descending sort order.

use crate::error::StorageResult;
use crate::store::{max_document_id, min_document_id, DocumentStore, MAX_LONG, MIN_LONG};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use tp_types::KeyParseError;

pub mod range;

/// Parses the 24-hex internal document id form.
pub fn parse_document_id(s: &str) -> Result<ObjectId, KeyParseError> {
    if s.len() != 24 {
        return Err(KeyParseError::InvalidLength { expected: 24, actual: s.len() });
    }
    let mut raw = [0u8; 12];
    hex::decode_to_slice(s, &mut raw)?;
    Ok(ObjectId::from_bytes(raw))
}

/// Paging direction of the two public cursor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Documents strictly preceding the anchor, newest first.
    From,
    /// Documents strictly following the anchor, newest first.
    Since,
}

impl Direction {
    pub fn from_route_name(name: &str) -> Option<Self> {
        match name {
            "from" => Some(Self::From),
            "since" => Some(Self::Since),
            _ => None,
        }
    }

    pub fn route_name(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::Since => "since",
        }
    }
}

/// Which end of the sort order an absolute anchor keyword names.
///
/// `latest` and `most` name the highest point, `earliest` and `least` the
/// lowest. The time and quantity spellings are accepted per entity family
/// by the anchor parsers; once parsed they are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Highest,
    Lowest,
}

impl Extreme {
    pub fn from_time_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "latest" => Some(Self::Highest),
            "earliest" => Some(Self::Lowest),
            _ => None,
        }
    }

    pub fn from_quantity_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "most" => Some(Self::Highest),
            "least" => Some(Self::Lowest),
            _ => None,
        }
    }
}

/// An anchor resolved to a concrete point in an entity's composite sort
/// order. One element per sort-key field, in sort-key order.
pub type AnchorTuple = Vec<Bson>;

/// The ordered field paths that totally order an entity. The last field is
/// always the internal document id, so ties are impossible.
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    fields: &'static [&'static str],
}

impl SortKey {
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The sort document for the stored query: descending for `from`,
    /// ascending for `since` (the page is put back into descending order
    /// after the fact).
    pub fn sort_document(&self, direction: Direction) -> Document {
        let order = match direction {
            Direction::From => -1,
            Direction::Since => 1,
        };
        let mut sort = Document::new();
        for field in self.fields {
            sort.insert(*field, order);
        }
        sort
    }

    /// The absolute anchor tuple for one end of the order: every non-id
    /// field takes the signed-64 sentinel, the trailing id field takes the
    /// all-zero or all-0xFF id.
    pub fn absolute_tuple(&self, extreme: Extreme) -> AnchorTuple {
        let (long, id) = match extreme {
            Extreme::Highest => (MAX_LONG, max_document_id()),
            Extreme::Lowest => (MIN_LONG, min_document_id()),
        };
        let mut tuple: AnchorTuple = vec![Bson::Int64(long); self.fields.len() - 1];
        tuple.push(Bson::ObjectId(id));
        tuple
    }
}

/// Runs one cursor page against a plain collection.
///
/// `extra` is AND-ed with the range condition (transaction type selection,
/// the aggregate-dependent toggle). `limit == 0` short-circuits without
/// touching the store.
pub(crate) async fn flat_page(
    store: &DocumentStore,
    collection: &str,
    sort_key: SortKey,
    direction: Direction,
    anchor: &AnchorTuple,
    extra: Option<Document>,
    limit: u64,
) -> StorageResult<Vec<Document>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let condition = match extra {
        Some(extra) => doc! { "$and": [range::range_condition(sort_key, direction, anchor), extra] },
        None => range::range_condition(sort_key, direction, anchor),
    };

    let mut page =
        store.find_sorted(collection, condition, None, sort_key.sort_document(direction), limit).await?;
    finish_page(&mut page, direction, limit);
    Ok(page)
}

/// Runs one cursor page through an aggregation pipeline. The caller supplies
/// the `$addFields`/`$match`/`$lookup` stages (the `$match` must already
/// contain the range condition); sort, scaffold projection and limit are
/// appended by the adapter.
pub(crate) async fn pipeline_page(
    store: &DocumentStore,
    collection: &str,
    stages: Vec<Document>,
    sort_key: SortKey,
    direction: Direction,
    unset: &[&str],
    limit: u64,
) -> StorageResult<Vec<Document>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut page =
        store.aggregate(collection, stages, sort_key.sort_document(direction), unset, limit).await?;
    finish_page(&mut page, direction, limit);
    Ok(page)
}

/// Restores the invariant output order: pages are always descending, and
/// never longer than the requested count even when the store clamp raised
/// the page size.
fn finish_page(page: &mut Vec<Document>, direction: Direction, limit: u64) {
    page.truncate(limit as usize);
    if direction == Direction::Since {
        page.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    const KEY: SortKey = SortKey::new(&["block.height", "_id"]);

    #[test]
    fn sort_document_follows_direction() {
        assert_eq!(KEY.sort_document(Direction::From), doc! { "block.height": -1, "_id": -1 });
        assert_eq!(KEY.sort_document(Direction::Since), doc! { "block.height": 1, "_id": 1 });
    }

    #[test]
    fn absolute_tuples_use_the_sentinels() {
        assert_eq!(
            KEY.absolute_tuple(Extreme::Highest),
            vec![Bson::Int64(i64::MAX), Bson::ObjectId(ObjectId::from_bytes([0xFF; 12]))]
        );
        assert_eq!(
            KEY.absolute_tuple(Extreme::Lowest),
            vec![Bson::Int64(i64::MIN), Bson::ObjectId(ObjectId::from_bytes([0x00; 12]))]
        );
    }

    #[test]
    fn quantity_and_time_keywords_are_disjoint() {
        assert_eq!(Extreme::from_time_keyword("latest"), Some(Extreme::Highest));
        assert_eq!(Extreme::from_time_keyword("most"), None);
        assert_eq!(Extreme::from_quantity_keyword("most"), Some(Extreme::Highest));
        assert_eq!(Extreme::from_quantity_keyword("earliest"), None);
        assert_eq!(Extreme::from_quantity_keyword("least"), Some(Extreme::Lowest));
    }

    #[test]
    fn finish_page_truncates_then_reverses() {
        let mut page = vec![doc! { "n": 1 }, doc! { "n": 2 }, doc! { "n": 3 }];
        finish_page(&mut page, Direction::Since, 2);
        assert_eq!(page, vec![doc! { "n": 2 }, doc! { "n": 1 }]);
    }
}
