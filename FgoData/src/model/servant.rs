//! Servant records and the auxiliary documents used to assemble them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::resource::{LeveledResourceList, ResourceBundle};
use super::skill::SkillSlots;
use crate::error::Error;

/// Servant identifier (the wiki's collection number)
pub type ServantId = u32;

/// Costume identifier
pub type CostumeId = u32;

/// Servants listed on the wiki that cannot be summoned or used by players
pub const UNPLAYABLE_SERVANT_IDS: &[ServantId] = &[
    83,  // Solomon
    149, // Tiamat
    151, // Goetia
    152, // Solomon
    168, // Beast III/R
    240, // Beast III/L
    333, // Beast IV
    411, // E-Flare Marie
    412, // E-Aqua Marie
    436, // E-Grand Marie
];

/// Span carrying a record's identity; entered once per record at batch level
pub fn servant_span(id: ServantId, name: &str) -> tracing::Span {
    tracing::info_span!("servant", id = %format_args!("{id:03}"), name = %name)
}

/// Closed set of servant classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServantClass {
    Saber,
    Archer,
    Lancer,
    Rider,
    Caster,
    Assassin,
    Berserker,
    Shielder,
    Ruler,
    Avenger,
    AlterEgo,
    MoonCancer,
    Foreigner,
    Pretender,
    Beast,
}

impl ServantClass {
    pub const ALL: [ServantClass; 15] = [
        Self::Saber,
        Self::Archer,
        Self::Lancer,
        Self::Rider,
        Self::Caster,
        Self::Assassin,
        Self::Berserker,
        Self::Shielder,
        Self::Ruler,
        Self::Avenger,
        Self::AlterEgo,
        Self::MoonCancer,
        Self::Foreigner,
        Self::Pretender,
        Self::Beast,
    ];

    /// Map the one-character class code used in the wiki's servant list
    pub fn from_code(code: &str) -> Option<Self> {
        let class = match code.trim() {
            "剣" => Self::Saber,
            "弓" => Self::Archer,
            "槍" => Self::Lancer,
            "騎" => Self::Rider,
            "術" => Self::Caster,
            "殺" => Self::Assassin,
            "狂" => Self::Berserker,
            "盾" => Self::Shielder,
            "裁" => Self::Ruler,
            "讐" => Self::Avenger,
            "分" => Self::AlterEgo,
            "月" => Self::MoonCancer,
            "降" => Self::Foreigner,
            "詐" => Self::Pretender,
            "獣" => Self::Beast,
            _ => return None,
        };
        Some(class)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saber => "Saber",
            Self::Archer => "Archer",
            Self::Lancer => "Lancer",
            Self::Rider => "Rider",
            Self::Caster => "Caster",
            Self::Assassin => "Assassin",
            Self::Berserker => "Berserker",
            Self::Shielder => "Shielder",
            Self::Ruler => "Ruler",
            Self::Avenger => "Avenger",
            Self::AlterEgo => "AlterEgo",
            Self::MoonCancer => "MoonCancer",
            Self::Foreigner => "Foreigner",
            Self::Pretender => "Pretender",
            Self::Beast => "Beast",
        }
    }
}

impl fmt::Display for ServantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServantClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .or_else(|| Self::from_code(s))
            .ok_or_else(|| Error::UnknownClass(s.to_string()))
    }
}

/// A cosmetic variant (spiritron dress) and its unlock cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Costume {
    /// Costume id; the sort key within a servant
    pub id: CostumeId,
    pub name: String,
    pub resource: ResourceBundle,
}

/// The normalized record extracted from one servant page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Servant {
    pub id: ServantId,
    pub name: String,
    /// Name shown before the true name is revealed
    pub false_name: Option<String>,
    /// Per-ascension display names (exactly 4 when present)
    pub ascension_names: Option<Vec<String>>,
    pub klass: ServantClass,
    /// Rarity in stars (0-5)
    pub rarity: u8,
    pub skills: SkillSlots,
    pub append_skills: SkillSlots,
    pub costumes: Vec<Costume>,
    pub ascension_resources: LeveledResourceList,
    pub skill_resources: LeveledResourceList,
    pub append_skill_resources: LeveledResourceList,
}

/// A row of the wiki's servant list pointing at the servant page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServantLink {
    pub id: ServantId,
    pub name: String,
    pub klass: ServantClass,
    pub rarity: u8,
    pub url: String,
}

/// Curated name overrides (`name.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServantName {
    pub id: ServantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascension_names: Option<Vec<String>>,
}

/// A costume record as stored in `costumes.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostumeData {
    pub costume_id: CostumeId,
    pub servant_id: ServantId,
    pub name: String,
    #[serde(default)]
    pub flavor_text: String,
    pub resource: ResourceBundle,
}

impl From<CostumeData> for Costume {
    fn from(data: CostumeData) -> Self {
        Self {
            id: data.costume_id,
            name: data.name,
            resource: data.resource,
        }
    }
}
