use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::guarded_write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationFormat {
    #[default]
    ShortText,
    LongText,
    Number,
    Date,
    Checkbox,
    Status,
    Tag,
    Object,
    File,
    Url,
    Email,
    Phone,
}

/// Schema descriptor for one data column of a database-view block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub relation_key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub format: RelationFormat,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub width: u32,
}

fn default_visible() -> bool {
    true
}

impl Relation {
    pub fn new(relation_key: &str, name: &str, format: RelationFormat) -> Self {
        Self {
            relation_key: relation_key.to_string(),
            name: name.to_string(),
            format,
            is_visible: true,
            width: 0,
        }
    }
}

/// Partial relation delta from the backend; absent fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationPatch {
    pub relation_key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<RelationFormat>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub width: Option<u32>,
}

impl From<Relation> for RelationPatch {
    fn from(relation: Relation) -> Self {
        Self {
            relation_key: relation.relation_key,
            name: Some(relation.name),
            format: Some(relation.format),
            is_visible: Some(relation.is_visible),
            width: Some(relation.width),
        }
    }
}

impl Relation {
    /// Merges the fields present in `patch`. Returns whether anything changed.
    pub fn merge(&mut self, patch: RelationPatch) -> bool {
        let mut changed = false;
        if let Some(name) = patch.name {
            changed |= guarded_write(&mut self.name, name);
        }
        if let Some(format) = patch.format {
            changed |= guarded_write(&mut self.format, format);
        }
        if let Some(is_visible) = patch.is_visible {
            changed |= guarded_write(&mut self.is_visible, is_visible);
        }
        if let Some(width) = patch.width {
            changed |= guarded_write(&mut self.width, width);
        }
        changed
    }
}

/// Coerces a raw value to `format`, or returns `None` when it cannot represent one.
pub fn coerce_value(format: RelationFormat, value: Value) -> Option<Value> {
    match format {
        RelationFormat::ShortText
        | RelationFormat::LongText
        | RelationFormat::Url
        | RelationFormat::Email
        | RelationFormat::Phone => match value {
            Value::Null => Some(Value::String(String::new())),
            Value::String(_) => Some(value),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            Value::Array(_) | Value::Object(_) => None,
        },
        RelationFormat::Number | RelationFormat::Date => match value {
            Value::Null | Value::Number(_) => Some(value),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Some(Value::Null);
                }
                if let Ok(i) = s.parse::<i64>() {
                    return Some(Value::from(i));
                }
                s.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            }
            _ => None,
        },
        RelationFormat::Checkbox => match value {
            Value::Bool(_) => Some(value),
            Value::Null => Some(Value::Bool(false)),
            Value::Number(n) => Some(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
            Value::String(s) => match s.trim() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" | "" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        RelationFormat::Status => match value {
            Value::Null | Value::String(_) => Some(value),
            Value::Array(items) => Some(items.into_iter().find(Value::is_string).unwrap_or(Value::Null)),
            _ => None,
        },
        RelationFormat::Tag | RelationFormat::Object | RelationFormat::File => match value {
            Value::Null => Some(Value::Array(vec![])),
            Value::String(s) if s.is_empty() => Some(Value::Array(vec![])),
            Value::String(_) => Some(Value::Array(vec![value])),
            Value::Array(items) => Some(Value::Array(
                items.into_iter().filter(Value::is_string).collect(),
            )),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relation_deserializes_with_defaults() {
        let rel: Relation = serde_json::from_value(json!({"relationKey": "name"})).unwrap();
        assert_eq!(rel.relation_key, "name");
        assert_eq!(rel.format, RelationFormat::ShortText);
        assert!(rel.is_visible);
        assert_eq!(rel.width, 0);
    }

    #[test]
    fn patch_keeps_fields_it_does_not_carry() {
        let mut rel = Relation::new("due", "Due date", RelationFormat::Date);
        let patch: RelationPatch =
            serde_json::from_value(json!({"relationKey": "due", "width": 300})).unwrap();

        assert!(rel.merge(patch));
        assert_eq!(rel.name, "Due date");
        assert_eq!(rel.format, RelationFormat::Date);
        assert_eq!(rel.width, 300);
    }

    #[test]
    fn patch_with_current_values_is_not_a_change() {
        let mut rel = Relation::new("due", "Due date", RelationFormat::Date);
        assert!(!rel.merge(rel.clone().into()));
    }

    #[test]
    fn text_formats_stringify_scalars() {
        assert_eq!(coerce_value(RelationFormat::ShortText, json!(42)), Some(json!("42")));
        assert_eq!(coerce_value(RelationFormat::Url, json!(null)), Some(json!("")));
        assert_eq!(coerce_value(RelationFormat::LongText, json!(["a"])), None);
    }

    #[test]
    fn number_parses_strings() {
        assert_eq!(coerce_value(RelationFormat::Number, json!("17")), Some(json!(17)));
        assert_eq!(coerce_value(RelationFormat::Number, json!(" 2.5 ")), Some(json!(2.5)));
        assert_eq!(coerce_value(RelationFormat::Number, json!("")), Some(json!(null)));
        assert_eq!(coerce_value(RelationFormat::Number, json!("abc")), None);
        assert_eq!(coerce_value(RelationFormat::Date, json!(true)), None);
    }

    #[test]
    fn checkbox_accepts_truthy_forms() {
        assert_eq!(coerce_value(RelationFormat::Checkbox, json!(1)), Some(json!(true)));
        assert_eq!(coerce_value(RelationFormat::Checkbox, json!("false")), Some(json!(false)));
        assert_eq!(coerce_value(RelationFormat::Checkbox, json!(null)), Some(json!(false)));
        assert_eq!(coerce_value(RelationFormat::Checkbox, json!("maybe")), None);
    }

    #[test]
    fn list_formats_wrap_and_filter() {
        assert_eq!(coerce_value(RelationFormat::Tag, json!("t1")), Some(json!(["t1"])));
        assert_eq!(
            coerce_value(RelationFormat::Object, json!(["a", 1, "b"])),
            Some(json!(["a", "b"]))
        );
        assert_eq!(coerce_value(RelationFormat::File, json!(null)), Some(json!([])));
        assert_eq!(coerce_value(RelationFormat::Tag, json!({"k": 1})), None);
    }

    #[test]
    fn status_takes_first_string_of_array() {
        assert_eq!(
            coerce_value(RelationFormat::Status, json!([3, "done"])),
            Some(json!("done"))
        );
        assert_eq!(coerce_value(RelationFormat::Status, json!(5)), None);
    }
}
