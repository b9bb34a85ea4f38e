//! Structural checks on a servant document's raw JSON
//!
//! Mirrors the persisted data set's schema: required fields, primitive types,
//! the closed class set, numeric bounds and no unknown fields. Cardinality
//! (slot and level counts) is left to the invariant checks.

use serde_json::{Map, Value};

use super::Violation;
use crate::model::{ASCENSION_LEVELS, ServantClass};

const SERVANT_FIELDS: &[&str] = &[
    "id",
    "name",
    "false_name",
    "ascension_names",
    "klass",
    "rarity",
    "costumes",
    "skills",
    "append_skills",
    "ascension_resources",
    "skill_resources",
    "append_skill_resources",
];
const SKILL_FIELDS: &[&str] = &["slot", "level", "name", "rank", "icon"];
const COSTUME_FIELDS: &[&str] = &["id", "name", "resource"];
const RESOURCE_FIELDS: &[&str] = &["qp", "items"];
const ITEM_FIELDS: &[&str] = &["name", "piece"];

const MAX_RARITY: u64 = 5;

/// Collect every schema violation in `doc`
pub fn check_document(doc: &Value) -> Vec<Violation> {
    let mut checker = SchemaChecker::default();
    checker.servant(doc);
    checker.violations
}

#[derive(Default)]
struct SchemaChecker {
    violations: Vec<Violation>,
}

impl SchemaChecker {
    fn fail(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(Violation::Schema {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn servant(&mut self, doc: &Value) {
        let Some(map) = self.object("$", doc, SERVANT_FIELDS) else {
            return;
        };

        if let Some(id) = map.get("id") {
            self.integer("$.id", id, 1, u64::MAX);
        }
        if let Some(name) = map.get("name") {
            self.string("$.name", name);
        }
        if let Some(false_name) = map.get("false_name")
            && !false_name.is_null()
        {
            self.string("$.false_name", false_name);
        }
        if let Some(names) = map.get("ascension_names") {
            self.ascension_names(names);
        }
        if let Some(klass) = map.get("klass") {
            self.klass(klass);
        }
        if let Some(rarity) = map.get("rarity") {
            self.integer("$.rarity", rarity, 0, MAX_RARITY);
        }
        if let Some(costumes) = map.get("costumes") {
            for (i, costume) in self.array("$.costumes", costumes).iter().enumerate() {
                self.costume(&format!("$.costumes[{i}]"), costume);
            }
        }
        for field in ["skills", "append_skills"] {
            if let Some(slots) = map.get(field) {
                self.skill_slots(&format!("$.{field}"), slots);
            }
        }
        for field in ["ascension_resources", "skill_resources", "append_skill_resources"] {
            if let Some(levels) = map.get(field) {
                let path = format!("$.{field}");
                for (i, bundle) in self.array(&path, levels).iter().enumerate() {
                    self.resource(&format!("{path}[{i}]"), bundle);
                }
            }
        }
    }

    fn ascension_names(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        let names = self.array("$.ascension_names", value);
        if names.len() != ASCENSION_LEVELS {
            self.fail(
                "$.ascension_names",
                format!("expected {ASCENSION_LEVELS} names, found {}", names.len()),
            );
        }
        for (i, name) in names.iter().enumerate() {
            self.string(&format!("$.ascension_names[{i}]"), name);
        }
    }

    fn klass(&mut self, value: &Value) {
        let known = value.as_str().is_some_and(|name| {
            ServantClass::ALL
                .iter()
                .any(|class| class.as_str() == name)
        });
        if !known {
            self.fail("$.klass", format!("{value} is not a servant class"));
        }
    }

    fn skill_slots(&mut self, path: &str, value: &Value) {
        for (i, slot) in self.array(path, value).iter().enumerate() {
            let slot_path = format!("{path}[{i}]");
            for (j, skill) in self.array(&slot_path, slot).iter().enumerate() {
                self.skill(&format!("{slot_path}[{j}]"), skill);
            }
        }
    }

    fn skill(&mut self, path: &str, value: &Value) {
        let Some(map) = self.object(path, value, SKILL_FIELDS) else {
            return;
        };
        for field in ["slot", "level", "icon"] {
            if let Some(v) = map.get(field) {
                self.integer(&format!("{path}.{field}"), v, 0, u64::MAX);
            }
        }
        for field in ["name", "rank"] {
            if let Some(v) = map.get(field) {
                self.string(&format!("{path}.{field}"), v);
            }
        }
    }

    fn costume(&mut self, path: &str, value: &Value) {
        let Some(map) = self.object(path, value, COSTUME_FIELDS) else {
            return;
        };
        if let Some(id) = map.get("id") {
            self.integer(&format!("{path}.id"), id, 1, u64::MAX);
        }
        if let Some(name) = map.get("name") {
            self.string(&format!("{path}.name"), name);
        }
        if let Some(resource) = map.get("resource") {
            self.resource(&format!("{path}.resource"), resource);
        }
    }

    fn resource(&mut self, path: &str, value: &Value) {
        let Some(map) = self.object(path, value, RESOURCE_FIELDS) else {
            return;
        };
        if let Some(qp) = map.get("qp") {
            self.integer(&format!("{path}.qp"), qp, 0, u64::MAX);
        }
        let Some(items) = map.get("items") else {
            return;
        };
        let items_path = format!("{path}.items");
        for (i, item) in self.array(&items_path, items).iter().enumerate() {
            let item_path = format!("{items_path}[{i}]");
            let Some(item) = self.object(&item_path, item, ITEM_FIELDS) else {
                continue;
            };
            if let Some(name) = item.get("name") {
                self.string(&format!("{item_path}.name"), name);
            }
            if let Some(piece) = item.get("piece") {
                self.integer(&format!("{item_path}.piece"), piece, 0, u64::MAX);
            }
        }
    }

    /// Object with exactly the `fields` keys
    fn object<'v>(
        &mut self,
        path: &str,
        value: &'v Value,
        fields: &[&str],
    ) -> Option<&'v Map<String, Value>> {
        let Some(map) = value.as_object() else {
            self.fail(path, format!("expected an object, found {}", type_name(value)));
            return None;
        };
        for field in fields {
            if !map.contains_key(*field) {
                self.fail(path, format!("missing required field \"{field}\""));
            }
        }
        for key in map.keys() {
            if !fields.contains(&key.as_str()) {
                self.fail(path, format!("unexpected field \"{key}\""));
            }
        }
        Some(map)
    }

    fn array<'v>(&mut self, path: &str, value: &'v Value) -> &'v [Value] {
        if let Some(items) = value.as_array() {
            items
        } else {
            self.fail(path, format!("expected an array, found {}", type_name(value)));
            &[]
        }
    }

    fn string(&mut self, path: &str, value: &Value) {
        if !value.is_string() {
            self.fail(path, format!("expected a string, found {}", type_name(value)));
        }
    }

    fn integer(&mut self, path: &str, value: &Value, min: u64, max: u64) {
        match value.as_u64() {
            Some(n) if (min..=max).contains(&n) => {}
            Some(n) => self.fail(path, format!("{n} is outside {min}..={max}")),
            None if value.is_i64() => self.fail(path, format!("{value} is below {min}")),
            None => self.fail(
                path,
                format!("expected an integer, found {}", type_name(value)),
            ),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "id": 2,
            "name": "アルトリア",
            "false_name": null,
            "ascension_names": null,
            "klass": "Saber",
            "rarity": 5,
            "costumes": [{"id": 1, "name": "c", "resource": {"qp": 0, "items": []}}],
            "skills": [[{"slot": 1, "level": 1, "name": "s", "rank": "A", "icon": 3}]],
            "append_skills": [],
            "ascension_resources": [{"qp": 100, "items": [{"name": "i", "piece": 1}]}],
            "skill_resources": [],
            "append_skill_resources": []
        })
    }

    fn paths(violations: &[Violation]) -> Vec<String> {
        violations
            .iter()
            .map(|v| match v {
                Violation::Schema { path, .. } => path.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_well_formed_document() {
        assert!(check_document(&document()).is_empty());
    }

    #[test]
    fn test_bounds_and_enums() {
        let mut doc = document();
        doc["id"] = json!(0);
        doc["rarity"] = json!(6);
        doc["klass"] = json!("Gunner");
        doc["ascension_resources"][0]["items"][0]["piece"] = json!(-1);
        assert_eq!(
            paths(&check_document(&doc)),
            vec![
                "$.id",
                "$.klass",
                "$.rarity",
                "$.ascension_resources[0].items[0].piece"
            ]
        );
    }

    #[test]
    fn test_required_and_unknown_fields() {
        let mut doc = document();
        let map = doc.as_object_mut().unwrap();
        map.remove("false_name");
        map.insert("alias".to_string(), json!("x"));
        let violations = check_document(&doc);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| matches!(v, Violation::Schema { path, .. } if path == "$")));
    }

    #[test]
    fn test_ascension_names_need_four_entries() {
        let mut doc = document();
        doc["ascension_names"] = json!(["a", "b", "c", "d"]);
        assert!(check_document(&doc).is_empty());
        doc["ascension_names"] = json!(["a", "b"]);
        assert_eq!(paths(&check_document(&doc)), vec!["$.ascension_names"]);
    }

    #[test]
    fn test_nested_types() {
        let mut doc = document();
        doc["skills"][0][0]["icon"] = json!("3");
        doc["costumes"][0]["resource"]["qp"] = json!(1.5);
        assert_eq!(
            paths(&check_document(&doc)),
            vec!["$.costumes[0].resource.qp", "$.skills[0][0].icon"]
        );
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(paths(&check_document(&json!([]))), vec!["$"]);
    }
}
