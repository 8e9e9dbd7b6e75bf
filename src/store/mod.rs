//! In-process state: the flat block collections documents are built from, and
//! the keyed store holding database-view data.

pub mod blocks;
pub mod keyed;
pub mod meta;
pub mod records;
pub mod relations;
pub mod views;

pub use blocks::BlockStore;
pub use keyed::{EntityKind, KeyedStore, ObjectType, Scope, SmartBlockType, StoreChange};
pub use meta::{Meta, MetaPatch};
pub use records::{FieldInterceptor, FormatCoercion, InsertAt, Record, RecordCollection};
pub use relations::{Relation, RelationFormat, RelationPatch};
pub use views::{derive_relations, View, ViewPatch, ViewRegistry, ViewRelation, ViewType};

/// Writes `value` into `slot` unless it is already equal. Returns whether it wrote.
pub(crate) fn guarded_write<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
