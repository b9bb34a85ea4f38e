//! Skill records and per-slot grouping

use serde::{Deserialize, Serialize};

/// One level of a skill as it appears on the wiki
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill slot (1-based)
    pub slot: u32,
    /// Upgrade level within the slot (1 = base skill)
    pub level: u32,
    /// Skill name without the rank suffix
    pub name: String,
    /// Rank suffix such as `A`, `EX`, `B++`; empty when the skill has none
    pub rank: String,
    /// Icon identifier (0 when the icon cell could not be parsed)
    pub icon: u32,
}

/// Which skill table a slot list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillCategory {
    /// Active skills (保有スキル)
    Active,
    /// Append skills (アペンドスキル)
    Append,
}

impl SkillCategory {
    /// Number of slots a servant normally has in this category
    pub fn default_slots(self) -> usize {
        match self {
            Self::Active => 3,
            Self::Append => 5,
        }
    }

    /// Label used in log messages and violations
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "skill",
            Self::Append => "append skill",
        }
    }
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest slot number [`SkillSlots::insert`] accepts
pub const MAX_SLOTS: usize = 9;

/// Skills grouped by slot; index 0 holds slot 1
///
/// Serialized as a list of lists, matching the persisted data set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSlots {
    slots: Vec<Vec<Skill>>,
}

impl SkillSlots {
    /// Create `count` empty slots
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![Vec::new(); count],
        }
    }

    /// Append a skill to its slot's list.
    ///
    /// Slots beyond the current count (up to [`MAX_SLOTS`]) are created so
    /// that a malformed extraction stays visible to validation instead of
    /// being dropped. Slot 0 is filed under slot 1 where the slot-membership
    /// check flags it. Skills past [`MAX_SLOTS`] are logged and discarded.
    pub fn insert(&mut self, skill: Skill) -> bool {
        let index = (skill.slot as usize).saturating_sub(1);
        if index >= MAX_SLOTS {
            tracing::error!(
                "skill {}-{} \"{}\" is beyond slot {}",
                skill.slot,
                skill.level,
                skill.name,
                MAX_SLOTS
            );
            return false;
        }
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, Vec::new);
        }
        self.slots[index].push(skill);
        true
    }

    /// Skills in `slot` (1-based)
    pub fn slot(&self, slot: usize) -> Option<&[Skill]> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .map(Vec::as_slice)
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate `(slot, skills)` with 1-based slot numbers
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Skill])> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, skills)| (i + 1, skills.as_slice()))
    }
}

impl From<Vec<Vec<Skill>>> for SkillSlots {
    fn from(slots: Vec<Vec<Skill>>) -> Self {
        Self { slots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(slot: u32, level: u32) -> Skill {
        Skill {
            slot,
            level,
            name: "Foo".to_string(),
            rank: String::new(),
            icon: 0,
        }
    }

    #[test]
    fn test_insert_keeps_order_within_slot() {
        let mut slots = SkillSlots::with_slots(3);
        slots.insert(skill(2, 1));
        slots.insert(skill(2, 2));
        let levels: Vec<u32> = slots.slot(2).unwrap().iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![1, 2]);
        assert!(slots.slot(1).unwrap().is_empty());
    }

    #[test]
    fn test_insert_grows_for_unexpected_slot() {
        let mut slots = SkillSlots::with_slots(3);
        slots.insert(skill(4, 1));
        assert_eq!(slots.len(), 4);
        assert_eq!(slots.slot(4).unwrap().len(), 1);
    }

    #[test]
    fn test_slot_past_limit_is_discarded() {
        let mut slots = SkillSlots::with_slots(3);
        assert!(slots.insert(skill(MAX_SLOTS as u32, 1)));
        assert!(!slots.insert(skill(u32::MAX, 1)));
        assert_eq!(slots.len(), MAX_SLOTS);
    }

    #[test]
    fn test_slot_zero_lands_in_first_slot() {
        let mut slots = SkillSlots::with_slots(3);
        slots.insert(skill(0, 1));
        assert_eq!(slots.slot(1).unwrap()[0].slot, 0);
        assert!(slots.slot(0).is_none());
    }
}
