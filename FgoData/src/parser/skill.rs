//! Skill heading parsing
//!
//! Headings look like `Skill1：魔力放出 A` or `Skill2[強化後1]：直感 A+`.
//! The bracketed marker means "upgraded"; its optional number counts
//! previous upgrades, so `[強化後]` is level 2 and `[強化後2]` is level 3.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::{Skill, SkillSlots};

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Skill\s*(?P<slot>[0-9])\s*(?P<upgraded>\[強化後(?P<level>[0-9]+)?\])?\s*[：:]\s*(?P<name>.+)$",
    )
    .expect("valid regex")
});

static HALF_WIDTH_KATAKANA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{FF66}-\u{FF9F}]+").expect("valid regex"));

static ICON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<id>[0-9]+)(?:\s*,(?P<rest>.*))?").expect("valid regex"));

const RANK: &str = r"(?:EX|[A-E])[+-]*|None";

/// Rank suffix forms, tried in this order; the first match wins.
static RANK_FORMS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    let build = |pattern: String| Regex::new(&pattern).expect("valid regex");
    [
        // <name>/Rank <rank>( (note))?(|<rank>|preupgrade=y)?
        build(format!(
            r"^(?P<name>.+?)/Rank (?P<rank>{RANK})(?:\s*\([\w& ]+\))?(?:\|(?:(?:{RANK})|preupgrade=y))?$"
        )),
        // <name>|<rank>
        build(format!(r"^(?P<name>.+)\|(?P<rank>{RANK})\s*$")),
        // <name> <rank>
        build(format!(r"^(?P<name>.+?)\s+(?P<rank>{RANK})$")),
        // <name> '<rank>'
        build(format!(r"^(?P<name>.+?) '(?P<rank>{RANK})'$")),
    ]
});

const ACTIVE_SKILL_SUFFIX: &str = " (Active Skill)";

/// Fields pulled from one skill heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillHeading {
    pub slot: u32,
    pub level: u32,
    pub name: String,
    pub rank: String,
}

/// Parse a skill heading; `None` when the text is not a skill heading
pub fn parse_skill_heading(text: &str) -> Option<SkillHeading> {
    let caps = HEADING.captures(text.trim())?;
    let slot = caps["slot"].parse().ok()?;
    let level = match (caps.name("upgraded"), caps.name("level")) {
        (None, _) => 1,
        (Some(_), None) => 2,
        (Some(_), Some(level)) => level.as_str().parse::<u32>().ok()?.checked_add(1)?,
    };
    let (name, rank) = parse_skill_rank(&caps["name"]);
    Some(SkillHeading {
        slot,
        level,
        name,
        rank,
    })
}

/// Split a trailing rank suffix from a skill name.
///
/// Returns `(name, rank)`; `rank` is empty when no form matches, in which
/// case the (normalized) text is returned unchanged as the name.
pub fn parse_skill_rank(text: &str) -> (String, String) {
    let text = normalize_half_width_katakana(text.trim());
    for form in RANK_FORMS.iter() {
        if let Some(caps) = form.captures(&text) {
            let name = caps["name"].trim();
            let name = name.strip_suffix(ACTIVE_SKILL_SUFFIX).unwrap_or(name);
            let rank = match &caps["rank"] {
                "None" => "",
                rank => rank,
            };
            return (name.to_string(), rank.to_string());
        }
    }
    let name = text.strip_suffix(ACTIVE_SKILL_SUFFIX).unwrap_or(&text);
    (name.to_string(), String::new())
}

/// Half-width katakana (ｱｲｳ) → full-width (アイウ); other text is untouched
pub fn normalize_half_width_katakana(text: &str) -> String {
    HALF_WIDTH_KATAKANA
        .replace_all(text, |caps: &regex::Captures<'_>| caps[0].nfkc().collect::<String>())
        .into_owned()
}

/// Parse a skill icon cell such as `312` or `312,A`.
///
/// Unparseable cells log a warning and yield 0.
pub fn parse_skill_icon(text: &str) -> u32 {
    let text = text.trim();
    match ICON.captures(text).and_then(|caps| caps["id"].parse().ok()) {
        Some(icon) => icon,
        None => {
            tracing::warn!("failed to parse as a skill icon \"{}\"", text);
            0
        }
    }
}

/// Build a [`Skill`] from a heading and its icon cell
pub fn parse_skill(heading: &str, icon_cell: &str) -> Option<Skill> {
    let SkillHeading {
        slot,
        level,
        name,
        rank,
    } = parse_skill_heading(heading)?;
    let icon = parse_skill_icon(icon_cell);
    tracing::debug!(
        "skill {}-{}: \"{}\" (rank: \"{}\", icon: {})",
        slot,
        level,
        name,
        rank,
        icon
    );
    Some(Skill {
        slot,
        level,
        name,
        rank,
        icon,
    })
}

/// Group `(heading, icon cell)` pairs into `slots` slots.
///
/// Non-heading text is skipped. Slot counts and level runs are left for
/// validation to judge.
pub fn parse_skill_slots<I, H, C>(entries: I, slots: usize) -> SkillSlots
where
    I: IntoIterator<Item = (H, C)>,
    H: AsRef<str>,
    C: AsRef<str>,
{
    let mut result = SkillSlots::with_slots(slots);
    for (heading, icon) in entries {
        if let Some(skill) = parse_skill(heading.as_ref(), icon.as_ref()) {
            result.insert(skill);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rank(text: &str) -> (String, String) {
        parse_skill_rank(text)
    }

    fn pair(name: &str, rank: &str) -> (String, String) {
        (name.to_string(), rank.to_string())
    }

    #[test]
    fn test_heading_levels() {
        let base = parse_skill_heading("Skill1：Foo A").unwrap();
        assert_eq!((base.slot, base.level), (1, 1));
        let upgraded = parse_skill_heading("Skill1[強化後]：Foo B").unwrap();
        assert_eq!((upgraded.slot, upgraded.level), (1, 2));
        let twice = parse_skill_heading("Skill3[強化後2]：Foo EX").unwrap();
        assert_eq!((twice.slot, twice.level), (3, 3));
    }

    #[test]
    fn test_not_a_heading() {
        assert!(parse_skill_heading("保有スキル").is_none());
        assert!(parse_skill_heading("Skill：Foo").is_none());
        assert!(parse_skill_heading("Skill10000000：Foo A").is_none());
    }

    #[test]
    fn test_oversized_slot_does_not_grow_slots() {
        let slots = parse_skill_slots([("Skill10000000：Foo A", "1"), ("Skill9：Bar B", "2")], 3);
        assert_eq!(slots.len(), 9);
        assert_eq!(slots.slot(9).unwrap()[0].name, "Bar");
    }

    #[test]
    fn test_heading_scenario() {
        let slots = parse_skill_slots(
            [("Skill1：Foo A", "100"), ("Skill1[強化後]：Foo B", "101,B")],
            3,
        );
        let skills = slots.slot(1).unwrap();
        assert_eq!(
            skills,
            &[
                Skill {
                    slot: 1,
                    level: 1,
                    name: "Foo".to_string(),
                    rank: "A".to_string(),
                    icon: 100,
                },
                Skill {
                    slot: 1,
                    level: 2,
                    name: "Foo".to_string(),
                    rank: "B".to_string(),
                    icon: 101,
                },
            ]
        );
        assert!(slots.slot(2).unwrap().is_empty());
    }

    #[test]
    fn test_rank_forms() {
        assert_eq!(rank("Mana Burst A+"), pair("Mana Burst", "A+"));
        assert_eq!(rank("魔力放出 EX"), pair("魔力放出", "EX"));
        assert_eq!(rank("Charisma|B-"), pair("Charisma", "B-"));
        assert_eq!(rank("Eye of the Mind 'C'"), pair("Eye of the Mind", "C"));
        assert_eq!(
            rank("Instinct/Rank A (Upgraded)|preupgrade=y"),
            pair("Instinct", "A")
        );
        assert_eq!(rank("Presence Concealment/Rank None"), pair("Presence Concealment", ""));
    }

    #[test]
    fn test_rank_form_priority() {
        // "/Rank" wins over the whitespace form that would also match.
        assert_eq!(rank("Golden Rule/Rank B"), pair("Golden Rule", "B"));
        // Delimiter form wins over whitespace form.
        assert_eq!(rank("Battle Continuation A|A++"), pair("Battle Continuation A", "A++"));
    }

    #[test]
    fn test_rank_stripping_is_idempotent_without_suffix() {
        assert_eq!(rank("騎乗"), pair("騎乗", ""));
        assert_eq!(rank("Foo"), pair("Foo", ""));
        assert_eq!(rank("Rank"), pair("Rank", ""));
    }

    #[test]
    fn test_active_skill_suffix_is_dropped() {
        assert_eq!(rank("Protection of the Faith (Active Skill) A"), pair("Protection of the Faith", "A"));
    }

    #[test]
    fn test_half_width_katakana_is_normalized() {
        assert_eq!(rank("ｶﾘｽﾏ B"), pair("カリスマ", "B"));
        assert_eq!(normalize_half_width_katakana("ﾊﾞｰｻｰｸ abc"), "バーサーク abc");
    }

    #[test]
    fn test_icon_parsing() {
        assert_eq!(parse_skill_icon("312"), 312);
        assert_eq!(parse_skill_icon(" 45,A+ "), 45);
        assert_eq!(parse_skill_icon("icon"), 0);
        assert_eq!(parse_skill_icon(""), 0);
    }

    #[test]
    fn test_unparseable_icon_keeps_skill() {
        let skill = parse_skill("Skill2：Foo", "n/a").unwrap();
        assert_eq!(skill.icon, 0);
        assert_eq!(skill.rank, "");
    }
}
