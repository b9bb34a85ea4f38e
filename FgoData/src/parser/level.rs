//! Level-bucketing of resource table cells
//!
//! A resource table is a flat run of cells: a level-transition marker opens a
//! level, the cells after it list that level's resources. One fold handles
//! every table layout; only the marker recognizer differs between the
//! ascension table (`1段階`) and the skill-upgrade tables (`Lv1→Lv2`).

use std::sync::LazyLock;

use regex::Regex;

use super::quantity::parse_items;
use crate::error::{Error, Result};
use crate::model::{LeveledResourceList, ResourceBundle};

/// Recognizes the cell that opens a new level
pub trait LevelMarker {
    /// Return the level the cell opens, `None` for non-marker cells.
    ///
    /// An `Err` means the marker exists but breaks the table's structure.
    fn recognize(&self, text: &str) -> Result<Option<u32>>;
}

impl<F> LevelMarker for F
where
    F: Fn(&str) -> Result<Option<u32>>,
{
    fn recognize(&self, text: &str) -> Result<Option<u32>> {
        self(text)
    }
}

static ASCENSION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<level>[0-9]+)段階").expect("valid regex"));

static SKILL_UPGRADE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Lv\.?\s*(?P<current>[0-9]+)\s*→\s*Lv\.?\s*(?P<next>[0-9]+)").expect("valid regex")
});

/// `N段階` markers of the ascension (霊基再臨) table
#[derive(Debug, Clone, Copy, Default)]
pub struct AscensionMarker;

impl LevelMarker for AscensionMarker {
    fn recognize(&self, text: &str) -> Result<Option<u32>> {
        Ok(ASCENSION_MARKER
            .captures(text)
            .and_then(|caps| caps["level"].parse().ok()))
    }
}

/// `LvX→LvY` markers of the skill-upgrade tables; `Y` must be `X + 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillUpgradeMarker;

impl LevelMarker for SkillUpgradeMarker {
    fn recognize(&self, text: &str) -> Result<Option<u32>> {
        let Some(caps) = SKILL_UPGRADE_MARKER.captures(text) else {
            return Ok(None);
        };
        let (Ok(current), Ok(next)) = (caps["current"].parse::<u32>(), caps["next"].parse::<u32>())
        else {
            return Ok(None);
        };
        if current.checked_add(1) != Some(next) {
            return Err(Error::LevelTransition { current, next });
        }
        Ok(Some(current))
    }
}

/// Fold state: finished bundles plus the level currently being filled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelFold {
    finished: LeveledResourceList,
    open: Option<(u32, ResourceBundle)>,
}

impl LevelFold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one cell.
    ///
    /// Empty cells are skipped; resource cells before the first marker are
    /// discarded.
    pub fn step<M: LevelMarker + ?Sized>(mut self, cell: &str, marker: &M) -> Result<Self> {
        let text = cell.trim();
        if text.is_empty() {
            return Ok(self);
        }

        if let Some(level) = marker.recognize(text)? {
            tracing::debug!("Lv.{} -> Lv.{}", level, level + 1);
            if let Some((_, bundle)) = self.open.take() {
                self.finished.push(bundle);
            }
            self.open = Some((level, ResourceBundle::new()));
        } else if let Some((_, bundle)) = self.open.as_mut() {
            bundle.extend(parse_items(text));
        }

        Ok(self)
    }

    /// Level currently open, if any
    pub fn current_level(&self) -> Option<u32> {
        self.open.as_ref().map(|(level, _)| *level)
    }

    /// Close the open level and return all bundles
    pub fn finish(mut self) -> LeveledResourceList {
        if let Some((_, bundle)) = self.open.take() {
            self.finished.push(bundle);
        }
        self.finished
    }
}

/// Bucket `cells` into one bundle per level-transition marker
pub fn parse_leveled_resources<I, S, M>(cells: I, marker: &M) -> Result<LeveledResourceList>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    M: LevelMarker + ?Sized,
{
    cells
        .into_iter()
        .try_fold(LevelFold::new(), |fold, cell| fold.step(cell.as_ref(), marker))
        .map(LevelFold::finish)
}

/// Parse an ascension (霊基再臨) table
pub fn parse_ascension_resources<I, S>(cells: I) -> Result<LeveledResourceList>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_leveled_resources(cells, &AscensionMarker)
}

/// Parse a skill or append-skill upgrade (スキル強化) table
pub fn parse_skill_resources<I, S>(cells: I) -> Result<LeveledResourceList>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_leveled_resources(cells, &SkillUpgradeMarker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemQuantity;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascension_scenario() {
        let cells = ["1段階", "item-A,x3", "2段階", "item-A,x5", "QP,x10000"];
        let levels = parse_ascension_resources(cells).unwrap();
        assert_eq!(
            levels,
            vec![
                ResourceBundle {
                    currency: 0,
                    items: vec![ItemQuantity::new("item-A", 3)],
                },
                ResourceBundle {
                    currency: 10_000,
                    items: vec![ItemQuantity::new("item-A", 5)],
                },
            ]
        );
    }

    #[test]
    fn test_level_count_matches_marker_count() {
        let mut cells = Vec::new();
        for level in 1..=9 {
            cells.push(format!("Lv{level}→Lv{}", level + 1));
            cells.push(format!("QP,x{level}0万"));
        }
        let levels = parse_skill_resources(&cells).unwrap();
        assert_eq!(levels.len(), 9);
        assert_eq!(levels[0].currency, 100_000);
        assert_eq!(levels[8].currency, 900_000);
    }

    #[test]
    fn test_cells_before_first_marker_are_discarded() {
        let cells = ["必要素材", "QP,x100", "1段階", "", "  ", "A,x1"];
        let levels = parse_ascension_resources(cells).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].currency, 0);
        assert_eq!(levels[0].items, vec![ItemQuantity::new("A", 1)]);
    }

    #[test]
    fn test_marker_without_resources_yields_empty_bundle() {
        let levels = parse_ascension_resources(["1段階", "2段階"]).unwrap();
        assert_eq!(levels, vec![ResourceBundle::new(), ResourceBundle::new()]);
    }

    #[test]
    fn test_no_markers_yields_no_levels() {
        assert!(parse_skill_resources(["A,x1", "QP,x5"]).unwrap().is_empty());
    }

    #[test]
    fn test_skill_marker_must_advance_by_one() {
        let err = parse_skill_resources(["Lv1→Lv2", "A,x1", "Lv2→Lv4"]).unwrap_err();
        assert!(matches!(err, Error::LevelTransition { current: 2, next: 4 }));
    }

    #[test]
    fn test_ascension_marker_is_not_a_skill_marker() {
        assert_eq!(SkillUpgradeMarker.recognize("1段階").unwrap(), None);
        assert_eq!(AscensionMarker.recognize("Lv1→Lv2").unwrap(), None);
        assert_eq!(SkillUpgradeMarker.recognize("Lv.9 → Lv.10").unwrap(), Some(9));
    }

    #[test]
    fn test_closure_marker() {
        let marker = |text: &str| -> Result<Option<u32>> {
            Ok(text.strip_prefix("stage ").and_then(|n| n.parse().ok()))
        };
        let levels = parse_leveled_resources(["stage 1", "A,x2", "stage 2", "B,x3"], &marker).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].items, vec![ItemQuantity::new("B", 3)]);
    }

    #[test]
    fn test_fold_steps_individually() {
        let fold = LevelFold::new()
            .step("1段階", &AscensionMarker)
            .unwrap();
        assert_eq!(fold.current_level(), Some(1));
        let fold = fold.step("A,x1", &AscensionMarker).unwrap();
        assert_eq!(fold.clone().finish().len(), 1);
        let fold = fold.step("2段階", &AscensionMarker).unwrap();
        assert_eq!(fold.current_level(), Some(2));
        assert_eq!(fold.finish().len(), 2);
    }

    #[test]
    fn test_large_currency_cells_do_not_overflow() {
        let levels =
            parse_ascension_resources(["1段階", "QP,x18446744073709551615", "QP,x1"]).unwrap();
        assert_eq!(levels[0].currency, u64::MAX);
    }
}
