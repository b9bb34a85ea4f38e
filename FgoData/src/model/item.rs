//! Item and sound records consumed by the merge step

use serde::{Deserialize, Serialize};

use super::resource::ResourceBundle;

/// Item identifier
pub type ItemId = u32;

/// An entry of `items.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub rarity: String,
    pub name: String,
}

/// A sound-player track and the items needed to unlock it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sound {
    /// Story part or event the track belongs to
    pub source: String,
    pub index: u32,
    pub title: String,
    pub resource: ResourceBundle,
}
