use serde::{Deserialize, Serialize};

use super::guarded_write;

/// Pagination/query cursor state of one scope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub total: u64,
    pub offset: u64,
    pub view_id: String,
    pub keys: Vec<String>,
}

/// Partial meta write; absent fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaPatch {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub view_id: Option<String>,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
}

pub(crate) static EMPTY_META: Meta = Meta {
    total: 0,
    offset: 0,
    view_id: String::new(),
    keys: Vec::new(),
};

fn non_negative(v: i64) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

impl Meta {
    /// First write for a scope: every field normalized, missing ones defaulted.
    pub fn from_patch(patch: MetaPatch) -> Self {
        Self {
            total: patch.total.map(non_negative).unwrap_or(0),
            offset: patch.offset.map(non_negative).unwrap_or(0),
            view_id: patch.view_id.unwrap_or_default(),
            keys: patch.keys.unwrap_or_default(),
        }
    }

    /// Merges `patch` into `self`, skipping fields whose value would not change.
    /// Returns whether anything was written.
    pub fn merge(&mut self, patch: MetaPatch) -> bool {
        let mut changed = false;
        if let Some(total) = patch.total.map(non_negative) {
            changed |= guarded_write(&mut self.total, total);
        }
        if let Some(offset) = patch.offset.map(non_negative) {
            changed |= guarded_write(&mut self.offset, offset);
        }
        if let Some(view_id) = patch.view_id {
            changed |= guarded_write(&mut self.view_id, view_id);
        }
        if let Some(keys) = patch.keys {
            changed |= guarded_write(&mut self.keys, keys);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_clamps_negatives() {
        let meta = Meta::from_patch(MetaPatch {
            total: Some(-5),
            offset: Some(-1),
            ..Default::default()
        });
        assert_eq!(meta.total, 0);
        assert_eq!(meta.offset, 0);
        assert_eq!(meta.view_id, "");
        assert!(meta.keys.is_empty());
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let mut meta = Meta::from_patch(MetaPatch {
            total: Some(40),
            view_id: Some("v1".into()),
            ..Default::default()
        });
        assert!(meta.merge(MetaPatch {
            offset: Some(20),
            ..Default::default()
        }));
        assert_eq!(meta.total, 40);
        assert_eq!(meta.offset, 20);
        assert_eq!(meta.view_id, "v1");
    }

    #[test]
    fn merge_of_equal_values_is_not_a_change() {
        let mut meta = Meta::from_patch(MetaPatch {
            total: Some(10),
            keys: Some(vec!["name".into()]),
            ..Default::default()
        });
        assert!(!meta.merge(MetaPatch {
            total: Some(10),
            keys: Some(vec!["name".into()]),
            ..Default::default()
        }));
    }

    #[test]
    fn patch_deserializes_partial_json() {
        let patch: MetaPatch = serde_json::from_str(r#"{"viewId": "v2"}"#).unwrap();
        assert_eq!(patch.view_id.as_deref(), Some("v2"));
        assert!(patch.total.is_none());
    }
}
