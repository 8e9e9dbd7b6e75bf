use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::relations::{coerce_value, Relation};

/// One row of database-view data. Identity is `id`; every other field is free-form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Where `add` places a record that is not already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Front,
    Back,
}

impl From<i32> for InsertAt {
    fn from(dir: i32) -> Self {
        if dir > 0 {
            Self::Back
        } else {
            Self::Front
        }
    }
}

/// Validation/coercion hook every field write on a `Record` passes through.
///
/// Returning `None` rejects the write and leaves the field unchanged.
pub trait FieldInterceptor {
    fn intercept(
        &self,
        relations: &[Relation],
        key: &str,
        current: Option<&Value>,
        incoming: Value,
    ) -> Option<Value>;
}

/// Default hook: coerces the value to its relation's declared format and drops
/// writes that would not change anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatCoercion;

impl FieldInterceptor for FormatCoercion {
    fn intercept(
        &self,
        relations: &[Relation],
        key: &str,
        current: Option<&Value>,
        incoming: Value,
    ) -> Option<Value> {
        let value = match relations.iter().find(|r| r.relation_key == key) {
            Some(relation) => coerce_value(relation.format, incoming)?,
            None => incoming,
        };
        if current == Some(&value) {
            return None;
        }
        Some(value)
    }
}

/// Ordered records of one scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Upserts each record: existing ids are merged in place, new ones appended in input order.
    pub fn set(
        &mut self,
        list: Vec<Record>,
        relations: &[Relation],
        interceptor: &dyn FieldInterceptor,
    ) -> bool {
        let mut changed = false;
        for record in list {
            if self.index_of(&record.id).is_some() {
                changed |= self.update(record, relations, interceptor);
            } else {
                self.records.push(record);
                changed = true;
            }
        }
        changed
    }

    /// Upserts one record. Returns the index it ends up at and whether the
    /// collection changed.
    pub fn add(
        &mut self,
        record: Record,
        at: InsertAt,
        relations: &[Relation],
        interceptor: &dyn FieldInterceptor,
    ) -> (usize, bool) {
        if let Some(idx) = self.index_of(&record.id) {
            let changed = self.update(record, relations, interceptor);
            return (idx, changed);
        }
        match at {
            InsertAt::Back => {
                self.records.push(record);
                (self.records.len() - 1, true)
            }
            InsertAt::Front => {
                self.records.insert(0, record);
                (0, true)
            }
        }
    }

    /// Merges `patch` field by field into the record with the same id. Missing ids are ignored.
    pub fn update(
        &mut self,
        patch: Record,
        relations: &[Relation],
        interceptor: &dyn FieldInterceptor,
    ) -> bool {
        let Some(idx) = self.index_of(&patch.id) else {
            tracing::trace!(record_id = %patch.id, "update for unknown record ignored");
            return false;
        };
        let mut changed = false;
        for (key, value) in patch.fields {
            changed |= write_field(&mut self.records[idx], &key, value, relations, interceptor);
        }
        changed
    }

    pub fn set_field(
        &mut self,
        id: &str,
        key: &str,
        value: Value,
        relations: &[Relation],
        interceptor: &dyn FieldInterceptor,
    ) -> bool {
        match self.index_of(id) {
            Some(idx) => write_field(&mut self.records[idx], key, value, relations, interceptor),
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }
}

fn write_field(
    record: &mut Record,
    key: &str,
    value: Value,
    relations: &[Relation],
    interceptor: &dyn FieldInterceptor,
) -> bool {
    if key == "id" {
        return false;
    }
    match interceptor.intercept(relations, key, record.fields.get(key), value) {
        Some(accepted) => {
            record.fields.insert(key.to_string(), accepted);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::relations::RelationFormat;
    use serde_json::json;

    struct RejectAll;

    impl FieldInterceptor for RejectAll {
        fn intercept(&self, _: &[Relation], _: &str, _: Option<&Value>, _: Value) -> Option<Value> {
            None
        }
    }

    fn relations() -> Vec<Relation> {
        vec![
            Relation::new("name", "Name", RelationFormat::ShortText),
            Relation::new("count", "Count", RelationFormat::Number),
        ]
    }

    #[test]
    fn record_serializes_flat() {
        let record = Record::new("r1").with_field("name", json!("Alpha"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, json!({"id": "r1", "name": "Alpha"}));
    }

    #[test]
    fn add_front_and_back_report_indexes() {
        let mut records = RecordCollection::new();
        let rels = relations();
        assert_eq!(records.add(Record::new("r1"), InsertAt::from(-1), &rels, &FormatCoercion), (0, true));
        assert_eq!(records.add(Record::new("r2"), InsertAt::from(1), &rels, &FormatCoercion), (1, true));
        assert_eq!(records.add(Record::new("r0"), InsertAt::Front, &rels, &FormatCoercion), (0, true));

        let ids: Vec<&str> = records.as_slice().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r0", "r1", "r2"]);
    }

    #[test]
    fn add_existing_updates_in_place() {
        let mut records = RecordCollection::new();
        let rels = relations();
        records.add(Record::new("r1"), InsertAt::Back, &rels, &FormatCoercion);
        records.add(Record::new("r2"), InsertAt::Back, &rels, &FormatCoercion);
        let added = records.add(
            Record::new("r1").with_field("name", json!("x")),
            InsertAt::Back,
            &rels,
            &FormatCoercion,
        );
        assert_eq!(added, (0, true));
        let again = records.add(
            Record::new("r1").with_field("name", json!("x")),
            InsertAt::Front,
            &rels,
            &FormatCoercion,
        );
        assert_eq!(again, (0, false));
        assert_eq!(records.len(), 2);
        assert_eq!(records.get("r1").unwrap().get("name"), Some(&json!("x")));
    }

    #[test]
    fn set_merges_and_preserves_order() {
        let mut records = RecordCollection::new();
        let rels = relations();
        records.set(
            vec![Record::new("a"), Record::new("b")],
            &rels,
            &FormatCoercion,
        );
        records.set(
            vec![Record::new("c"), Record::new("a").with_field("count", json!(2))],
            &rels,
            &FormatCoercion,
        );

        let ids: Vec<&str> = records.as_slice().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(records.get("a").unwrap().get("count"), Some(&json!(2)));
    }

    #[test]
    fn update_coerces_through_relation_format() {
        let mut records = RecordCollection::new();
        let rels = relations();
        records.add(Record::new("r1"), InsertAt::Back, &rels, &FormatCoercion);

        let changed = records.update(
            Record::new("r1").with_field("count", json!("41")),
            &rels,
            &FormatCoercion,
        );
        assert!(changed);
        assert_eq!(records.get("r1").unwrap().get("count"), Some(&json!(41)));
    }

    #[test]
    fn rejected_value_leaves_field_unchanged() {
        let mut records = RecordCollection::new();
        let rels = relations();
        records.add(
            Record::new("r1").with_field("count", json!(1)),
            InsertAt::Back,
            &rels,
            &FormatCoercion,
        );

        assert!(!records.set_field("r1", "count", json!("not a number"), &rels, &FormatCoercion));
        assert_eq!(records.get("r1").unwrap().get("count"), Some(&json!(1)));
    }

    #[test]
    fn identical_value_is_not_a_change() {
        let mut records = RecordCollection::new();
        let rels = relations();
        records.add(
            Record::new("r1").with_field("name", json!("same")),
            InsertAt::Back,
            &rels,
            &FormatCoercion,
        );
        assert!(!records.set_field("r1", "name", json!("same"), &rels, &FormatCoercion));
    }

    #[test]
    fn custom_interceptor_can_veto_everything() {
        let mut records = RecordCollection::new();
        records.add(Record::new("r1"), InsertAt::Back, &[], &RejectAll);
        assert!(!records.set_field("r1", "name", json!("x"), &[], &RejectAll));
        assert!(records.get("r1").unwrap().fields.is_empty());
    }

    #[test]
    fn update_and_delete_missing_are_noops() {
        let mut records = RecordCollection::new();
        assert!(!records.update(Record::new("ghost").with_field("a", json!(1)), &[], &FormatCoercion));
        assert!(!records.delete("ghost"));
        assert!(records.is_empty());
    }

    #[test]
    fn id_field_cannot_be_rewritten() {
        let mut records = RecordCollection::new();
        records.add(Record::new("r1"), InsertAt::Back, &[], &FormatCoercion);
        assert!(!records.set_field("r1", "id", json!("r2"), &[], &FormatCoercion));
        assert!(records.get("r1").is_some());
    }
}
