use serde::{Deserialize, Serialize};

use super::guarded_write;
use super::relations::Relation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewType {
    #[default]
    Grid,
    List,
    Gallery,
    Board,
}

/// A relation's placement inside one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRelation {
    pub relation_key: String,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub width: u32,
}

impl ViewRelation {
    pub fn new(relation_key: &str, is_visible: bool, width: u32) -> Self {
        Self {
            relation_key: relation_key.to_string(),
            is_visible,
            width,
        }
    }
}

/// A named arrangement of a scope's relations.
///
/// `configured` is the relation order as delivered by the backend; `relations`
/// is derived from it against the scope's relation collection on every write
/// and is what consumers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub view_type: ViewType,
    #[serde(default, rename = "relations")]
    pub configured: Vec<ViewRelation>,
    #[serde(skip)]
    pub relations: Vec<ViewRelation>,
}

impl View {
    pub fn new(id: &str, name: &str, configured: Vec<ViewRelation>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            view_type: ViewType::Grid,
            configured,
            relations: vec![],
        }
    }

    pub fn visible_relations(&self) -> impl Iterator<Item = &ViewRelation> {
        self.relations.iter().filter(|r| r.is_visible)
    }

    /// Merges the fields present in `patch`. `relations` is left for the caller to re-derive.
    pub fn merge(&mut self, patch: ViewPatch) -> bool {
        let mut changed = false;
        if let Some(name) = patch.name {
            changed |= guarded_write(&mut self.name, name);
        }
        if let Some(view_type) = patch.view_type {
            changed |= guarded_write(&mut self.view_type, view_type);
        }
        if let Some(configured) = patch.configured {
            changed |= guarded_write(&mut self.configured, configured);
        }
        changed
    }
}

/// Partial view delta; absent fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPatch {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub view_type: Option<ViewType>,
    #[serde(default, rename = "relations")]
    pub configured: Option<Vec<ViewRelation>>,
}

impl From<View> for ViewPatch {
    fn from(view: View) -> Self {
        Self {
            id: view.id,
            name: Some(view.name),
            view_type: Some(view.view_type),
            configured: Some(view.configured),
        }
    }
}

/// Keeps the configured entries whose relation still exists in the scope, in configured order.
pub fn derive_relations(configured: &[ViewRelation], relations: &[Relation]) -> Vec<ViewRelation> {
    configured
        .iter()
        .filter(|vr| {
            let found = relations.iter().any(|r| r.relation_key == vr.relation_key);
            if !found {
                tracing::trace!(relation_key = %vr.relation_key, "dropping dangling view relation");
            }
            found
        })
        .cloned()
        .collect()
}

/// Ordered views of one scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRegistry {
    views: Vec<View>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[View] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn set(&mut self, list: Vec<View>, relations: &[Relation]) -> bool {
        let mut changed = false;
        for view in list {
            changed |= self.add(view, relations);
        }
        changed
    }

    pub fn add(&mut self, mut view: View, relations: &[Relation]) -> bool {
        if self.get(&view.id).is_some() {
            return self.update(view.into(), relations);
        }
        view.relations = derive_relations(&view.configured, relations);
        self.views.push(view);
        true
    }

    /// Merges `patch` into the view with the same id. Missing ids are ignored.
    pub fn update(&mut self, patch: ViewPatch, relations: &[Relation]) -> bool {
        let Some(existing) = self.views.iter_mut().find(|v| v.id == patch.id) else {
            tracing::trace!(view_id = %patch.id, "update for unknown view ignored");
            return false;
        };
        let mut changed = existing.merge(patch);
        let derived = derive_relations(&existing.configured, relations);
        changed |= guarded_write(&mut existing.relations, derived);
        changed
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.views.len();
        self.views.retain(|v| v.id != id);
        self.views.len() != before
    }

    /// Re-derives every view after the scope's relations changed.
    pub fn rederive(&mut self, relations: &[Relation]) -> bool {
        let mut changed = false;
        for view in &mut self.views {
            let derived = derive_relations(&view.configured, relations);
            if derived != view.relations {
                view.relations = derived;
                changed = true;
            }
        }
        changed
    }

    /// Stable-sorts the views by their position in `ids`.
    ///
    /// Views missing from `ids` rank before every listed view and keep their
    /// relative order; ids with no matching view are ignored.
    pub fn sort(&mut self, ids: &[String]) -> bool {
        let before: Vec<String> = self.views.iter().map(|v| v.id.clone()).collect();
        self.views
            .sort_by_key(|v| ids.iter().position(|id| *id == v.id));
        self.views.iter().map(|v| &v.id).ne(before.iter())
    }
}
