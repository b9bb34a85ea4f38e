//! Servant record validation
//!
//! Two layers, both reporting every problem rather than the first:
//! - [`schema`] checks the raw JSON document's structure
//! - the invariant checks here judge the typed record: slot counts, level
//!   runs per slot, costume id ordering and resource list lengths
//!
//! [`validate_servant`] runs both on a typed record. Item names are checked
//! against `items.json` by [`check_item_names`] when the dictionary is available.
//!
//! ## Usage
//!
//! ```ignore
//! let report = validate_servant(&servant, &ValidationRules::default());
//! if !report.is_valid() {
//!     report.log();
//! }
//! ```

pub mod schema;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{
    ASCENSION_LEVELS, Costume, LeveledResourceList, ResourceBundle, SKILL_UPGRADE_LEVELS, Servant,
    ServantId, SkillCategory, SkillSlots, servant_span,
};
use crate::resolver::ItemNameResolver;

/// Expected cardinalities; the `[validation]` table of `fgodata.toml`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub active_slots: usize,
    pub append_slots: usize,
    pub ascension_levels: usize,
    pub skill_levels: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            active_slots: SkillCategory::Active.default_slots(),
            append_slots: SkillCategory::Append.default_slots(),
            ascension_levels: ASCENSION_LEVELS,
            skill_levels: SKILL_UPGRADE_LEVELS,
        }
    }
}

impl ValidationRules {
    pub fn slots(&self, category: SkillCategory) -> usize {
        match category {
            SkillCategory::Active => self.active_slots,
            SkillCategory::Append => self.append_slots,
        }
    }
}

/// A single failed check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("schema violation at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("{category}s require {expected} slots, found {actual}")]
    SlotCount {
        category: SkillCategory,
        expected: usize,
        actual: usize,
    },

    #[error("{category} {slot} is empty")]
    EmptySlot { category: SkillCategory, slot: usize },

    #[error("exist unexpected slot {found} in {category} {slot}")]
    UnexpectedSlot {
        category: SkillCategory,
        slot: usize,
        found: u32,
    },

    #[error("levels are not consecutive in {category} {slot}: {levels:?}")]
    NonContiguousLevels {
        category: SkillCategory,
        slot: usize,
        levels: Vec<u32>,
    },

    #[error("costume IDs are not sorted and unique: {ids:?}")]
    CostumeOrder { ids: Vec<u32> },

    #[error("unknown item \"{name}\" in {field}")]
    UnknownItem { field: String, name: String },

    #[error("{field} requires {expected} levels, found {actual}")]
    ResourceLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// All violations found in one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Log each violation at error level in the current span
    pub fn log(&self) {
        for violation in &self.violations {
            tracing::error!("{}", violation);
        }
    }
}

impl Extend<Violation> for ValidationReport {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.violations.extend(iter);
    }
}

/// Check a typed record: its JSON form against the schema, then the invariants
pub fn validate_servant(servant: &Servant, rules: &ValidationRules) -> ValidationReport {
    let mut report = match serde_json::to_value(servant) {
        Ok(doc) => ValidationReport {
            violations: schema::check_document(&doc),
        },
        Err(err) => ValidationReport {
            violations: vec![Violation::Schema {
                path: "$".to_string(),
                message: err.to_string(),
            }],
        },
    };
    report.extend(check_invariants(servant, rules));
    report
}

/// Check a stored document: schema first, then invariants when it
/// deserializes into a record. Item names are checked against `items` when given.
pub fn validate_document(
    doc: &Value,
    rules: &ValidationRules,
    items: Option<&ItemNameResolver>,
) -> ValidationReport {
    let mut report = ValidationReport {
        violations: schema::check_document(doc),
    };
    match Servant::deserialize(doc) {
        Ok(servant) => {
            report.extend(check_invariants(&servant, rules));
            if let Some(items) = items {
                report.extend(check_item_names(&servant, items));
            }
        }
        Err(err) if report.is_valid() => report.violations.push(Violation::Schema {
            path: "$".to_string(),
            message: err.to_string(),
        }),
        Err(_) => {}
    }
    report
}

/// Every item name in the record's bundles must be a known item
pub fn check_item_names(servant: &Servant, items: &ItemNameResolver) -> Vec<Violation> {
    let mut bundles: Vec<(String, &ResourceBundle)> = servant
        .costumes
        .iter()
        .enumerate()
        .map(|(i, costume)| (format!("costumes[{i}].resource"), &costume.resource))
        .collect();
    for (field, levels) in [
        ("ascension_resources", &servant.ascension_resources),
        ("skill_resources", &servant.skill_resources),
        ("append_skill_resources", &servant.append_skill_resources),
    ] {
        bundles.extend(
            levels
                .iter()
                .enumerate()
                .map(|(i, bundle)| (format!("{field}[{i}]"), bundle)),
        );
    }

    let mut violations = Vec::new();
    for (field, bundle) in bundles {
        for item in &bundle.items {
            if !items.contains(&item.name) {
                violations.push(Violation::UnknownItem {
                    field: field.clone(),
                    name: item.name.clone(),
                });
            }
        }
    }
    violations
}

fn check_invariants(servant: &Servant, rules: &ValidationRules) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (category, slots) in [
        (SkillCategory::Active, &servant.skills),
        (SkillCategory::Append, &servant.append_skills),
    ] {
        violations.extend(check_skill_slots(category, slots, rules.slots(category)));
    }
    violations.extend(check_costumes(&servant.costumes));
    violations.extend(check_resource_length(
        "ascension_resources",
        &servant.ascension_resources,
        rules.ascension_levels,
    ));
    violations.extend(check_resource_length(
        "skill_resources",
        &servant.skill_resources,
        rules.skill_levels,
    ));
    violations.extend(check_resource_length(
        "append_skill_resources",
        &servant.append_skill_resources,
        rules.skill_levels,
    ));
    violations
}

fn check_skill_slots(
    category: SkillCategory,
    slots: &SkillSlots,
    expected: usize,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    if slots.len() != expected {
        violations.push(Violation::SlotCount {
            category,
            expected,
            actual: slots.len(),
        });
    }

    for (slot, skills) in slots.iter() {
        if skills.is_empty() {
            violations.push(Violation::EmptySlot { category, slot });
        }
        if let Some(found) = skills
            .iter()
            .map(|skill| skill.slot)
            .find(|&found| found as usize != slot)
        {
            violations.push(Violation::UnexpectedSlot {
                category,
                slot,
                found,
            });
        }
        let levels: Vec<u32> = skills.iter().map(|skill| skill.level).collect();
        if !levels.iter().copied().eq(1..=levels.len() as u32) {
            violations.push(Violation::NonContiguousLevels {
                category,
                slot,
                levels,
            });
        }
    }
    violations
}

fn check_costumes(costumes: &[Costume]) -> Option<Violation> {
    let ids: Vec<u32> = costumes.iter().map(|costume| costume.id).collect();
    let sorted_unique = ids.windows(2).all(|pair| pair[0] < pair[1]);
    (!sorted_unique).then_some(Violation::CostumeOrder { ids })
}

fn check_resource_length(
    field: &'static str,
    levels: &LeveledResourceList,
    expected: usize,
) -> Option<Violation> {
    (levels.len() != expected).then(|| Violation::ResourceLength {
        field,
        expected,
        actual: levels.len(),
    })
}

/// Outcome of validating a batch of records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub passed: Vec<ServantId>,
    pub failed: Vec<ServantId>,
    /// Set when `halt_on_error` stopped the batch early
    pub halted: bool,
}

impl BatchReport {
    pub fn is_valid(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}

/// Validate records in order, logging every violation under the record's span.
///
/// With `halt_on_error` the batch stops at the first failing record.
pub fn validate_servants<'a, I>(
    servants: I,
    rules: &ValidationRules,
    halt_on_error: bool,
) -> BatchReport
where
    I: IntoIterator<Item = &'a Servant>,
{
    let mut batch = BatchReport::default();
    for servant in servants {
        let _span = servant_span(servant.id, &servant.name).entered();
        tracing::info!("start validation");
        let report = validate_servant(servant, rules);
        report.log();
        if report.is_valid() {
            batch.passed.push(servant.id);
        } else {
            batch.failed.push(servant.id);
            if halt_on_error {
                batch.halted = true;
                break;
            }
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, ItemQuantity, ResourceBundle, ServantClass, Skill};
    use pretty_assertions::assert_eq;

    fn skill(slot: u32, level: u32) -> Skill {
        Skill {
            slot,
            level,
            name: "Foo".to_string(),
            rank: "A".to_string(),
            icon: 1,
        }
    }

    fn slots(count: usize) -> SkillSlots {
        let mut slots = SkillSlots::with_slots(count);
        for slot in 1..=count as u32 {
            slots.insert(skill(slot, 1));
        }
        slots
    }

    fn costume(id: u32) -> Costume {
        Costume {
            id,
            name: format!("costume {id}"),
            resource: ResourceBundle::new(),
        }
    }

    fn valid_servant() -> Servant {
        Servant {
            id: 2,
            name: "アルトリア".to_string(),
            false_name: None,
            ascension_names: None,
            klass: ServantClass::Saber,
            rarity: 5,
            skills: slots(3),
            append_skills: slots(5),
            costumes: vec![costume(1), costume(2), costume(3)],
            ascension_resources: vec![ResourceBundle::new(); 4],
            skill_resources: vec![ResourceBundle::new(); 9],
            append_skill_resources: vec![ResourceBundle::new(); 9],
        }
    }

    #[test]
    fn test_valid_record() {
        let report = validate_servant(&valid_servant(), &ValidationRules::default());
        assert_eq!(report.violations, vec![]);
    }

    #[test]
    fn test_typed_record_is_checked_against_schema() {
        let mut servant = valid_servant();
        servant.id = 0;
        servant.rarity = 9;
        servant.ascension_names = Some(vec!["a".to_string()]);

        let report = validate_servant(&servant, &ValidationRules::default());
        let paths: Vec<&str> = report
            .violations
            .iter()
            .map(|v| match v {
                Violation::Schema { path, .. } => path.as_str(),
                other => panic!("unexpected violation {other:?}"),
            })
            .collect();
        assert_eq!(paths, vec!["$.id", "$.ascension_names", "$.rarity"]);

        let doc = serde_json::to_value(&servant).unwrap();
        assert_eq!(
            validate_document(&doc, &ValidationRules::default(), None),
            report
        );
    }

    #[test]
    fn test_costume_ordering() {
        let rules = ValidationRules::default();
        for ids in [vec![2, 1, 3], vec![1, 1, 2]] {
            let mut servant = valid_servant();
            servant.costumes = ids.iter().copied().map(costume).collect();
            let report = validate_servant(&servant, &rules);
            assert_eq!(report.violations, vec![Violation::CostumeOrder { ids }]);
        }
        let mut servant = valid_servant();
        servant.costumes = Vec::new();
        assert!(validate_servant(&servant, &rules).is_valid());
    }

    #[test]
    fn test_all_violations_are_reported() {
        let mut servant = valid_servant();
        servant.skills = SkillSlots::from(vec![
            vec![skill(1, 1), skill(1, 3)],
            vec![],
            vec![skill(2, 1)],
            vec![skill(4, 1)],
        ]);
        servant.skill_resources.pop();

        let report = validate_servant(&servant, &ValidationRules::default());
        let active = SkillCategory::Active;
        assert_eq!(
            report.violations,
            vec![
                Violation::SlotCount {
                    category: active,
                    expected: 3,
                    actual: 4
                },
                Violation::NonContiguousLevels {
                    category: active,
                    slot: 1,
                    levels: vec![1, 3]
                },
                Violation::EmptySlot {
                    category: active,
                    slot: 2
                },
                Violation::UnexpectedSlot {
                    category: active,
                    slot: 3,
                    found: 2
                },
                Violation::ResourceLength {
                    field: "skill_resources",
                    expected: 9,
                    actual: 8
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_levels_rejected() {
        let mut servant = valid_servant();
        servant.append_skills = SkillSlots::from(vec![
            vec![skill(1, 1), skill(1, 1)],
            vec![skill(2, 1)],
            vec![skill(3, 1)],
            vec![skill(4, 1)],
            vec![skill(5, 1)],
        ]);
        let report = validate_servant(&servant, &ValidationRules::default());
        assert_eq!(report.violations.len(), 1);
        assert!(matches!(
            report.violations[0],
            Violation::NonContiguousLevels {
                category: SkillCategory::Append,
                slot: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_rules_are_configurable() {
        let mut servant = valid_servant();
        servant.append_skills = slots(3);
        let rules = ValidationRules {
            append_slots: 3,
            ..ValidationRules::default()
        };
        assert!(validate_servant(&servant, &rules).is_valid());
        assert!(!validate_servant(&servant, &ValidationRules::default()).is_valid());
    }

    #[test]
    fn test_validate_document_runs_both_layers() {
        let mut doc = serde_json::to_value(valid_servant()).unwrap();
        assert!(validate_document(&doc, &ValidationRules::default(), None).is_valid());

        doc["costumes"] = serde_json::json!([
            {"id": 2, "name": "b", "resource": {"qp": 0, "items": []}},
            {"id": 1, "name": "a", "resource": {"qp": 0, "items": [], "extra": 1}}
        ]);
        let report = validate_document(&doc, &ValidationRules::default(), None);
        assert_eq!(report.violations.len(), 2);
        assert!(matches!(report.violations[0], Violation::Schema { .. }));
        assert!(matches!(report.violations[1], Violation::CostumeOrder { .. }));
    }

    #[test]
    fn test_undeserializable_document() {
        let report = validate_document(&serde_json::json!({"id": 1}), &ValidationRules::default(), None);
        assert!(!report.is_valid());
        assert!(report
            .violations
            .iter()
            .all(|v| matches!(v, Violation::Schema { .. })));
    }

    #[test]
    fn test_batch_halts_on_first_failure() {
        let mut bad = valid_servant();
        bad.id = 3;
        bad.skills = slots(2);
        let mut good = valid_servant();
        good.id = 4;
        let servants = [valid_servant(), bad, good];
        let rules = ValidationRules::default();

        let batch = validate_servants(&servants, &rules, false);
        assert_eq!((batch.passed.clone(), batch.failed.clone()), (vec![2, 4], vec![3]));
        assert!(!batch.halted);

        let batch = validate_servants(&servants, &rules, true);
        assert_eq!((batch.passed, batch.failed), (vec![2], vec![3]));
        assert!(batch.halted);
    }

    #[test]
    fn test_unknown_item_names() {
        let items = ItemNameResolver::from_items(&[Item {
            id: 1,
            rarity: "銅".to_string(),
            name: "英雄の証".to_string(),
        }]);
        let mut servant = valid_servant();
        servant.ascension_resources[1]
            .extend([ItemQuantity::new("英雄の証", 5), ItemQuantity::new("英雄の症", 3)]);
        servant.costumes[0].resource.extend([ItemQuantity::new("凶骨", 1)]);

        assert_eq!(
            check_item_names(&servant, &items),
            vec![
                Violation::UnknownItem {
                    field: "costumes[0].resource".to_string(),
                    name: "凶骨".to_string(),
                },
                Violation::UnknownItem {
                    field: "ascension_resources[1]".to_string(),
                    name: "英雄の症".to_string(),
                },
            ]
        );

        let doc = serde_json::to_value(&servant).unwrap();
        let rules = ValidationRules::default();
        assert!(validate_document(&doc, &rules, None).is_valid());
        assert_eq!(validate_document(&doc, &rules, Some(&items)).violations.len(), 2);
    }
}
