use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::types::DataviewEvent;

use super::meta::{Meta, MetaPatch, EMPTY_META};
use super::records::{FieldInterceptor, FormatCoercion, InsertAt, Record, RecordCollection};
use super::relations::{Relation, RelationPatch};
use super::views::{View, ViewPatch, ViewRegistry};

/// Composite address of one sub-collection: a block inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope {
    pub root_id: String,
    pub block_id: String,
}

impl Scope {
    pub fn new(root_id: &str, block_id: &str) -> Self {
        Self {
            root_id: root_id.to_string(),
            block_id: block_id.to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}:{}", self.root_id, self.block_id)
    }

    /// Id used for nested stores derived from this scope.
    pub fn sub_id(&self) -> String {
        format!("{}-{}", self.root_id, self.block_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Relations,
    Views,
    Records,
    Meta,
}

/// Emitted for every mutation that actually changed stored data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Scoped { scope: Scope, kind: EntityKind },
    ObjectTypes,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SmartBlockType {
    Page,
    Set,
    Profile,
    Template,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectType {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub types: Vec<SmartBlockType>,
    #[serde(default)]
    pub is_archived: bool,
}

/// Store for database-view data, addressed by `Scope`.
///
/// Not a global: create one per workspace and pass it where it is needed.
/// All methods expect to run on the single event thread.
pub struct KeyedStore {
    object_types: Vec<ObjectType>,
    relations: HashMap<Scope, Vec<Relation>>,
    views: HashMap<Scope, ViewRegistry>,
    records: HashMap<Scope, RecordCollection>,
    meta: HashMap<Scope, Meta>,
    interceptor: Box<dyn FieldInterceptor>,
    changes: Vec<StoreChange>,
}

impl Default for KeyedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyedStore {
    pub fn new() -> Self {
        Self::with_interceptor(Box::new(FormatCoercion))
    }

    pub fn with_interceptor(interceptor: Box<dyn FieldInterceptor>) -> Self {
        Self {
            object_types: Vec::new(),
            relations: HashMap::new(),
            views: HashMap::new(),
            records: HashMap::new(),
            meta: HashMap::new(),
            interceptor,
            changes: Vec::new(),
        }
    }

    fn notify(&mut self, change: StoreChange) {
        if self.changes.last() != Some(&change) {
            self.changes.push(change);
        }
    }

    fn notify_scoped(&mut self, scope: &Scope, kind: EntityKind) {
        self.notify(StoreChange::Scoped {
            scope: scope.clone(),
            kind,
        });
    }

    /// Returns and forgets every change recorded since the last call.
    pub fn drain_changes(&mut self) -> Vec<StoreChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn clear_all(&mut self) {
        self.object_types.clear();
        self.relations.clear();
        self.views.clear();
        self.records.clear();
        self.meta.clear();
        self.changes.clear();
        self.notify(StoreChange::All);
    }

    // --- Object types ---

    pub fn object_types(&self) -> &[ObjectType] {
        &self.object_types
    }

    pub fn get_object_type(&self, id: &str) -> Option<&ObjectType> {
        self.object_types.iter().find(|t| t.id == id)
    }

    pub fn object_types_set(&mut self, list: Vec<ObjectType>) {
        for object_type in list {
            self.object_type_add(object_type);
        }
    }

    pub fn object_type_add(&mut self, object_type: ObjectType) {
        if self.get_object_type(&object_type.id).is_some() {
            self.object_type_update(object_type);
        } else {
            self.object_types.push(object_type);
            self.notify(StoreChange::ObjectTypes);
        }
    }

    pub fn object_type_update(&mut self, object_type: ObjectType) {
        if let Some(existing) = self.object_types.iter_mut().find(|t| t.id == object_type.id) {
            if *existing != object_type {
                *existing = object_type;
                self.notify(StoreChange::ObjectTypes);
            }
        }
    }

    /// Non-archived object types usable for the given smart block type.
    pub fn object_types_for(&self, sb_type: SmartBlockType) -> Vec<&ObjectType> {
        self.object_types
            .iter()
            .filter(|t| t.types.contains(&sb_type) && !t.is_archived)
            .collect()
    }

    // --- Relations ---

    pub fn get_relations(&self, scope: &Scope) -> &[Relation] {
        self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_relation(&self, scope: &Scope, relation_key: &str) -> Option<&Relation> {
        self.get_relations(scope)
            .iter()
            .find(|r| r.relation_key == relation_key)
    }

    pub fn relations_set(&mut self, scope: &Scope, list: Vec<Relation>) {
        let mut changed = false;
        {
            let relations = self.relations.entry(scope.clone()).or_default();
            for item in list {
                changed |= upsert_relation(relations, item);
            }
        }
        if changed {
            self.relations_changed(scope);
        }
    }

    pub fn relation_add(&mut self, scope: &Scope, item: Relation) {
        let relations = self.relations.entry(scope.clone()).or_default();
        if upsert_relation(relations, item) {
            self.relations_changed(scope);
        }
    }

    /// Merges `patch` into the relation with the same key. Missing keys are ignored.
    pub fn relation_update(&mut self, scope: &Scope, patch: RelationPatch) {
        let Some(relations) = self.relations.get_mut(scope) else {
            return;
        };
        let Some(existing) = relations
            .iter_mut()
            .find(|r| r.relation_key == patch.relation_key)
        else {
            tracing::trace!(relation_key = %patch.relation_key, "update for unknown relation ignored");
            return;
        };
        if existing.merge(patch) {
            self.relations_changed(scope);
        }
    }

    pub fn relation_delete(&mut self, scope: &Scope, relation_key: &str) {
        let Some(relations) = self.relations.get_mut(scope) else {
            return;
        };
        let before = relations.len();
        relations.retain(|r| r.relation_key != relation_key);
        if relations.len() != before {
            self.relations_changed(scope);
        }
    }

    pub fn relations_clear(&mut self, scope: &Scope) {
        if self.relations.remove(scope).is_some() {
            self.relations_changed(scope);
        }
    }

    fn relations_changed(&mut self, scope: &Scope) {
        self.notify_scoped(scope, EntityKind::Relations);
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let rederived = self
            .views
            .get_mut(scope)
            .is_some_and(|views| views.rederive(relations));
        if rederived {
            self.notify_scoped(scope, EntityKind::Views);
        }
    }

    // --- Views ---

    pub fn get_views(&self, scope: &Scope) -> &[View] {
        self.views.get(scope).map(ViewRegistry::as_slice).unwrap_or(&[])
    }

    pub fn get_view(&self, scope: &Scope, id: &str) -> Option<&View> {
        self.views.get(scope).and_then(|views| views.get(id))
    }

    pub fn views_set(&mut self, scope: &Scope, list: Vec<View>) {
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let views = self.views.entry(scope.clone()).or_default();
        if views.set(list, relations) {
            self.notify_scoped(scope, EntityKind::Views);
        }
    }

    pub fn view_add(&mut self, scope: &Scope, view: View) {
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let views = self.views.entry(scope.clone()).or_default();
        if views.add(view, relations) {
            self.notify_scoped(scope, EntityKind::Views);
        }
    }

    pub fn view_update(&mut self, scope: &Scope, patch: ViewPatch) {
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let updated = self
            .views
            .get_mut(scope)
            .is_some_and(|views| views.update(patch, relations));
        if updated {
            self.notify_scoped(scope, EntityKind::Views);
        }
    }

    pub fn view_delete(&mut self, scope: &Scope, id: &str) {
        let deleted = self
            .views
            .get_mut(scope)
            .is_some_and(|views| views.delete(id));
        if deleted {
            self.notify_scoped(scope, EntityKind::Views);
        }
    }

    pub fn views_sort(&mut self, scope: &Scope, ids: &[String]) {
        let sorted = self
            .views
            .get_mut(scope)
            .is_some_and(|views| views.sort(ids));
        if sorted {
            self.notify_scoped(scope, EntityKind::Views);
        }
    }

    pub fn views_clear(&mut self, scope: &Scope) {
        if self.views.remove(scope).is_some() {
            self.notify_scoped(scope, EntityKind::Views);
        }
    }

    // --- Meta ---

    /// Meta of `scope`, or all-zero defaults when none was written.
    pub fn get_meta(&self, scope: &Scope) -> &Meta {
        self.meta.get(scope).unwrap_or(&EMPTY_META)
    }

    pub fn meta_set(&mut self, scope: &Scope, patch: MetaPatch) {
        let changed = match self.meta.get_mut(scope) {
            Some(meta) => meta.merge(patch),
            None => {
                self.meta.insert(scope.clone(), Meta::from_patch(patch));
                true
            }
        };
        if changed {
            self.notify_scoped(scope, EntityKind::Meta);
        }
    }

    pub fn meta_clear(&mut self, scope: &Scope) {
        if self.meta.remove(scope).is_some() {
            self.notify_scoped(scope, EntityKind::Meta);
        }
    }

    // --- Records ---

    pub fn get_records(&self, scope: &Scope) -> &[Record] {
        self.records
            .get(scope)
            .map(RecordCollection::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_record(&self, scope: &Scope, id: &str) -> Option<&Record> {
        self.records.get(scope).and_then(|records| records.get(id))
    }

    pub fn records_set(&mut self, scope: &Scope, list: Vec<Record>) {
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let records = self.records.entry(scope.clone()).or_default();
        if records.set(list, relations, self.interceptor.as_ref()) {
            self.notify_scoped(scope, EntityKind::Records);
        }
    }

    /// Upserts `record` and returns the index it landed at: 0 when prepended,
    /// the last index when appended, its existing index when it was already present.
    pub fn record_add(&mut self, scope: &Scope, record: Record, dir: i32) -> usize {
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let records = self.records.entry(scope.clone()).or_default();
        let (index, changed) =
            records.add(record, InsertAt::from(dir), relations, self.interceptor.as_ref());
        if changed {
            self.notify_scoped(scope, EntityKind::Records);
        }
        index
    }

    pub fn record_update(&mut self, scope: &Scope, patch: Record) {
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let updated = self
            .records
            .get_mut(scope)
            .is_some_and(|records| records.update(patch, relations, self.interceptor.as_ref()));
        if updated {
            self.notify_scoped(scope, EntityKind::Records);
        }
    }

    /// Writes one field through the interceptor. Returns whether the write was accepted.
    pub fn record_set_field(&mut self, scope: &Scope, id: &str, key: &str, value: Value) -> bool {
        let relations = self.relations.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let written = self.records.get_mut(scope).is_some_and(|records| {
            records.set_field(id, key, value, relations, self.interceptor.as_ref())
        });
        if written {
            self.notify_scoped(scope, EntityKind::Records);
        }
        written
    }

    pub fn record_delete(&mut self, scope: &Scope, id: &str) {
        let deleted = self
            .records
            .get_mut(scope)
            .is_some_and(|records| records.delete(id));
        if deleted {
            self.notify_scoped(scope, EntityKind::Records);
        }
    }

    pub fn records_clear(&mut self, scope: &Scope) {
        if self.records.remove(scope).is_some() {
            self.notify_scoped(scope, EntityKind::Records);
        }
    }

    // --- Ingestion ---

    /// Applies one backend delta to the scope `(root_id, event.block_id())`.
    pub fn apply_event(&mut self, root_id: &str, event: &DataviewEvent) {
        let scope = Scope::new(root_id, event.block_id());
        match event {
            DataviewEvent::RelationsSet { relations, .. } => self.relations_set(&scope, relations.clone()),
            DataviewEvent::RelationUpdate { relation, .. } => self.relation_update(&scope, relation.clone()),
            DataviewEvent::RelationDelete { relation_key, .. } => self.relation_delete(&scope, relation_key),
            DataviewEvent::ViewsSet { views, .. } => self.views_set(&scope, views.clone()),
            DataviewEvent::ViewUpdate { view, .. } => self.view_update(&scope, view.clone()),
            DataviewEvent::ViewDelete { view_id, .. } => self.view_delete(&scope, view_id),
            DataviewEvent::ViewsSort { ids, .. } => self.views_sort(&scope, ids),
            DataviewEvent::RecordsSet { records, .. } => self.records_set(&scope, records.clone()),
            DataviewEvent::RecordAdd { record, dir, .. } => {
                self.record_add(&scope, record.clone(), *dir);
            }
            DataviewEvent::RecordUpdate { record, .. } => self.record_update(&scope, record.clone()),
            DataviewEvent::RecordDelete { record_id, .. } => self.record_delete(&scope, record_id),
            DataviewEvent::MetaSet { meta, .. } => self.meta_set(&scope, meta.clone()),
        }
    }

    pub fn apply_events(&mut self, root_id: &str, events: &[DataviewEvent]) {
        for event in events {
            self.apply_event(root_id, event);
        }
    }
}

fn upsert_relation(relations: &mut Vec<Relation>, item: Relation) -> bool {
    match relations
        .iter_mut()
        .find(|r| r.relation_key == item.relation_key)
    {
        Some(existing) => existing.merge(item.into()),
        None => {
            relations.push(item);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::relations::RelationFormat;
    use crate::store::views::ViewRelation;
    use serde_json::json;

    fn scope() -> Scope {
        Scope::new("doc", "dataview")
    }

    fn record_ids(store: &KeyedStore, scope: &Scope) -> Vec<String> {
        store.get_records(scope).iter().map(|r| r.id.clone()).collect()
    }

    fn seeded() -> KeyedStore {
        let mut store = KeyedStore::new();
        store.relations_set(
            &scope(),
            vec![
                Relation::new("name", "Name", RelationFormat::ShortText),
                Relation::new("done", "Done", RelationFormat::Checkbox),
            ],
        );
        store
    }

    #[test]
    fn scope_ids_join_root_and_block() {
        let s = scope();
        assert_eq!(s.key(), "doc:dataview");
        assert_eq!(s.sub_id(), "doc-dataview");
    }

    #[test]
    fn unknown_scope_reads_empty() {
        let store = KeyedStore::new();
        let s = Scope::new("x", "y");
        assert!(store.get_relations(&s).is_empty());
        assert!(store.get_views(&s).is_empty());
        assert!(store.get_records(&s).is_empty());
        assert_eq!(store.get_meta(&s), &Meta::default());
        assert!(store.get_record(&s, "r").is_none());
    }

    #[test]
    fn scopes_are_isolated() {
        let mut store = seeded();
        let other = Scope::new("doc", "other");
        store.record_add(&scope(), Record::new("r1"), 1);
        assert!(store.get_records(&other).is_empty());
        assert!(store.get_relations(&other).is_empty());
    }

    #[test]
    fn record_add_returns_insertion_index() {
        let mut store = KeyedStore::new();
        assert_eq!(store.record_add(&scope(), Record::new("r1"), -1), 0);
        assert_eq!(store.record_add(&scope(), Record::new("r2"), 1), 1);
    }

    #[test]
    fn record_sequence_keeps_live_ids_with_latest_updates() {
        let mut store = seeded();
        let s = scope();
        store.records_set(&s, vec![Record::new("a"), Record::new("b")]);
        store.record_add(&s, Record::new("c"), 1);
        store.record_update(&s, Record::new("a").with_field("name", json!("first")));
        store.record_delete(&s, "b");
        store.record_update(&s, Record::new("b").with_field("name", json!("late")));
        store.record_update(&s, Record::new("a").with_field("name", json!("second")));
        store.record_add(&s, Record::new("z"), -1);

        assert_eq!(record_ids(&store, &s), vec!["z", "a", "c"]);
        assert_eq!(
            store.get_record(&s, "a").unwrap().get("name"),
            Some(&json!("second"))
        );
    }

    #[test]
    fn record_field_write_is_coerced_by_relation_format() {
        let mut store = seeded();
        let s = scope();
        store.record_add(&s, Record::new("r1"), 1);

        assert!(store.record_set_field(&s, "r1", "done", json!("true")));
        assert_eq!(store.get_record(&s, "r1").unwrap().get("done"), Some(&json!(true)));
        assert!(!store.record_set_field(&s, "r1", "done", json!({"bad": 1})));
        assert!(!store.record_set_field(&s, "missing", "done", json!(true)));
    }

    #[test]
    fn meta_first_write_normalizes() {
        let mut store = KeyedStore::new();
        store.meta_set(
            &scope(),
            MetaPatch {
                total: Some(-5),
                offset: Some(-1),
                ..Default::default()
            },
        );
        let meta = store.get_meta(&scope());
        assert_eq!(meta.total, 0);
        assert_eq!(meta.offset, 0);
    }

    #[test]
    fn meta_later_writes_merge_and_dedupe() {
        let mut store = KeyedStore::new();
        let s = scope();
        store.meta_set(
            &s,
            MetaPatch {
                total: Some(100),
                view_id: Some("v1".into()),
                ..Default::default()
            },
        );
        store.drain_changes();

        store.meta_set(
            &s,
            MetaPatch {
                total: Some(100),
                ..Default::default()
            },
        );
        assert!(store.drain_changes().is_empty());

        store.meta_set(
            &s,
            MetaPatch {
                offset: Some(50),
                ..Default::default()
            },
        );
        let meta = store.get_meta(&s);
        assert_eq!((meta.total, meta.offset, meta.view_id.as_str()), (100, 50, "v1"));
    }

    #[test]
    fn views_follow_relation_drift() {
        let mut store = seeded();
        let s = scope();
        store.view_add(
            &s,
            View::new(
                "v1",
                "Grid",
                vec![
                    ViewRelation::new("name", true, 200),
                    ViewRelation::new("done", true, 60),
                ],
            ),
        );
        assert_eq!(store.get_view(&s, "v1").unwrap().relations.len(), 2);

        store.relation_delete(&s, "done");
        let keys: Vec<&str> = store.get_view(&s, "v1").unwrap().relations.iter()
            .map(|r| r.relation_key.as_str())
            .collect();
        assert_eq!(keys, vec!["name"]);
    }

    #[test]
    fn views_sort_orders_by_ids() {
        let mut store = seeded();
        let s = scope();
        store.views_set(&s, vec![View::new("id1", "A", vec![]), View::new("id2", "B", vec![])]);
        store.views_sort(&s, &["id2".into(), "id1".into()]);
        let ids: Vec<&str> = store.get_views(&s).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["id2", "id1"]);
    }

    #[test]
    fn relation_set_upserts_by_key() {
        let mut store = seeded();
        let s = scope();
        let mut renamed = Relation::new("name", "Title", RelationFormat::ShortText);
        renamed.width = 300;
        store.relations_set(&s, vec![renamed, Relation::new("tags", "Tags", RelationFormat::Tag)]);

        let keys: Vec<&str> = store.get_relations(&s).iter().map(|r| r.relation_key.as_str()).collect();
        assert_eq!(keys, vec!["name", "done", "tags"]);
        assert_eq!(store.get_relation(&s, "name").unwrap().name, "Title");
    }

    #[test]
    fn partial_relation_update_merges_fields() {
        let mut store = seeded();
        let s = scope();
        store.relation_add(&s, Relation::new("due", "Due date", RelationFormat::Date));
        store.drain_changes();

        let patch: RelationPatch =
            serde_json::from_value(json!({"relationKey": "due", "width": 300})).unwrap();
        store.relation_update(&s, patch);

        let due = store.get_relation(&s, "due").unwrap();
        assert_eq!(due.name, "Due date");
        assert_eq!(due.format, RelationFormat::Date);
        assert_eq!(due.width, 300);
        assert_eq!(
            store.drain_changes(),
            vec![StoreChange::Scoped {
                scope: s.clone(),
                kind: EntityKind::Relations
            }]
        );
    }

    #[test]
    fn partial_view_update_keeps_derived_relations() {
        let mut store = seeded();
        let s = scope();
        store.view_add(&s, View::new("v1", "Grid", vec![ViewRelation::new("name", true, 200)]));

        let patch: ViewPatch =
            serde_json::from_value(json!({"id": "v1", "name": "Renamed"})).unwrap();
        store.view_update(&s, patch);

        let view = store.get_view(&s, "v1").unwrap();
        assert_eq!(view.name, "Renamed");
        assert_eq!(view.relations.len(), 1);
    }

    #[test]
    fn re_adding_identical_record_records_no_change() {
        let mut store = seeded();
        let s = scope();
        store.record_add(&s, Record::new("r1").with_field("name", json!("a")), 1);
        store.drain_changes();

        assert_eq!(store.record_add(&s, Record::new("r1").with_field("name", json!("a")), 1), 0);
        assert!(store.drain_changes().is_empty());
    }

    #[test]
    fn backend_deltas_land_in_their_scope() {
        let mut store = KeyedStore::new();
        let events: Vec<DataviewEvent> = serde_json::from_value(json!([
            {"type": "relationsSet", "blockId": "dataview", "relations": [
                {"relationKey": "name", "name": "Name"},
                {"relationKey": "done", "name": "Done", "format": "checkbox"}
            ]},
            {"type": "viewsSet", "blockId": "dataview", "views": [
                {"id": "v1", "name": "Grid", "relations": [{"relationKey": "done", "isVisible": true}]}
            ]},
            {"type": "recordsSet", "blockId": "dataview", "records": [{"id": "r1"}, {"id": "r2"}]},
            {"type": "recordUpdate", "blockId": "dataview", "record": {"id": "r1", "done": "1"}},
            {"type": "recordDelete", "blockId": "dataview", "recordId": "r2"},
            {"type": "metaSet", "blockId": "dataview", "meta": {"total": 1, "viewId": "v1"}}
        ]))
        .unwrap();

        store.apply_events("doc", &events);

        let s = scope();
        assert_eq!(store.get_relations(&s).len(), 2);
        assert_eq!(store.get_view(&s, "v1").unwrap().relations.len(), 1);
        assert_eq!(record_ids(&store, &s), vec!["r1"]);
        assert_eq!(store.get_record(&s, "r1").unwrap().get("done"), Some(&json!(true)));
        assert_eq!(store.get_meta(&s).view_id, "v1");
        assert!(store.get_records(&Scope::new("other", "dataview")).is_empty());
    }

    #[test]
    fn update_for_missing_items_is_silent() {
        let mut store = seeded();
        let s = scope();
        store.drain_changes();
        store.relation_update(&s, Relation::new("ghost", "Ghost", RelationFormat::Number).into());
        store.view_update(&s, View::new("ghost", "", vec![]).into());
        store.record_update(&s, Record::new("ghost").with_field("name", json!("x")));
        store.view_delete(&s, "ghost");
        store.record_delete(&s, "ghost");
        assert!(store.drain_changes().is_empty());
        assert!(store.get_relation(&s, "ghost").is_none());
    }

    #[test]
    fn changes_are_reported_per_scope_and_kind() {
        let mut store = KeyedStore::new();
        let s = scope();
        store.record_add(&s, Record::new("r1"), 1);
        store.record_add(&s, Record::new("r2"), 1);
        store.meta_set(&s, MetaPatch::default());

        assert_eq!(
            store.drain_changes(),
            vec![
                StoreChange::Scoped {
                    scope: s.clone(),
                    kind: EntityKind::Records
                },
                StoreChange::Scoped {
                    scope: s.clone(),
                    kind: EntityKind::Meta
                },
            ]
        );
        assert!(store.drain_changes().is_empty());
    }

    #[test]
    fn clear_scope_and_clear_all() {
        let mut store = seeded();
        let s = scope();
        store.record_add(&s, Record::new("r1"), 1);
        store.records_clear(&s);
        assert!(store.get_records(&s).is_empty());
        assert_eq!(store.get_relations(&s).len(), 2);

        store.meta_set(&s, MetaPatch::default());
        store.clear_all();
        assert!(store.get_relations(&s).is_empty());
        assert_eq!(store.drain_changes(), vec![StoreChange::All]);
    }

    #[test]
    fn object_types_upsert_and_filter() {
        let mut store = KeyedStore::new();
        store.object_types_set(vec![
            ObjectType {
                id: "page".into(),
                name: "Page".into(),
                types: vec![SmartBlockType::Page],
                is_archived: false,
            },
            ObjectType {
                id: "old".into(),
                name: "Old".into(),
                types: vec![SmartBlockType::Page],
                is_archived: true,
            },
        ]);
        store.object_types_set(vec![ObjectType {
            id: "page".into(),
            name: "Document".into(),
            types: vec![SmartBlockType::Page, SmartBlockType::Template],
            is_archived: false,
        }]);

        assert_eq!(store.object_types().len(), 2);
        assert_eq!(store.get_object_type("page").unwrap().name, "Document");
        let pages: Vec<&str> = store
            .object_types_for(SmartBlockType::Page)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(pages, vec!["page"]);
        assert_eq!(store.object_types_for(SmartBlockType::Template).len(), 1);
    }
}
