//! The lexicographic range condition.

use super::{AnchorTuple, Direction, SortKey};
use mongodb::bson::{doc, Document};

/// Builds the strict lexicographic predicate selecting everything before
/// (`From`) or after (`Since`) the anchor tuple in the sort order.
///
/// For sort key `(f1, .., fk)` and anchor `(a1, .., ak)` the `From`
/// condition is the OR-chain
///
/// ```text
/// (f1 < a1) OR (f1 = a1 AND f2 < a2) OR .. OR (f1 = a1 AND .. AND fk < ak)
/// ```
///
/// with `>` substituted for `Since`. The chain must stay per-prefix: a
/// single compound comparator would lose tie-break fidelity between the
/// primary field and the trailing document id.
pub fn range_condition(sort_key: SortKey, direction: Direction, anchor: &AnchorTuple) -> Document {
    debug_assert_eq!(sort_key.len(), anchor.len());

    let comparator = match direction {
        Direction::From => "$lt",
        Direction::Since => "$gt",
    };

    let fields = sort_key.fields();
    let mut clauses = Vec::with_capacity(fields.len());
    for bound in 0..fields.len() {
        let mut clause = Document::new();
        for (field, value) in fields.iter().zip(anchor).take(bound) {
            clause.insert(*field, doc! { "$eq": value.clone() });
        }
        clause.insert(fields[bound], doc! { comparator: anchor[bound].clone() });
        clauses.push(clause);
    }
    doc! { "$or": clauses }
}
