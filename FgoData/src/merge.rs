//! Merged data set (`merged_data.json`)
//!
//! Combines items, servant records and sounds into one document with every
//! resource bundle resolved to item ids. A bundle that fails resolution is
//! logged and replaced by an empty bundle, so a partially resolved bundle is
//! never written.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Item, LeveledResourceList, ResourceBundle, ResourceBundleById, Servant, ServantClass,
    ServantId, SkillSlots, Sound, servant_span,
};
use crate::resolver::ItemNameResolver;
use crate::store::{self, DataDir};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedCostume {
    pub id: u32,
    pub name: String,
    pub resource: ResourceBundleById,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedServant {
    pub id: ServantId,
    pub name: String,
    pub false_name: Option<String>,
    pub klass: ServantClass,
    pub rarity: u8,
    pub skills: SkillSlots,
    pub append_skills: SkillSlots,
    pub costumes: Vec<MergedCostume>,
    pub ascension_resources: Vec<ResourceBundleById>,
    pub skill_resources: Vec<ResourceBundleById>,
    pub append_skill_resources: Vec<ResourceBundleById>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSound {
    pub source: String,
    pub index: u32,
    pub title: String,
    pub resource: ResourceBundleById,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedData {
    pub items: Vec<Item>,
    pub servants: Vec<MergedServant>,
    pub sounds: Vec<MergedSound>,
}

/// Resolve a bundle, substituting an empty one on failure
fn resolve_or_empty(resolver: &ItemNameResolver, bundle: &ResourceBundle) -> ResourceBundleById {
    resolver.resolve_bundle(bundle).unwrap_or_else(|err| {
        tracing::error!("failed to convert resource: {}", err);
        ResourceBundleById::default()
    })
}

fn resolve_levels(resolver: &ItemNameResolver, levels: &LeveledResourceList) -> Vec<ResourceBundleById> {
    levels
        .iter()
        .map(|bundle| resolve_or_empty(resolver, bundle))
        .collect()
}

pub fn merge_servant(servant: &Servant, resolver: &ItemNameResolver) -> MergedServant {
    let _span = servant_span(servant.id, &servant.name).entered();
    tracing::debug!("start conversion");
    MergedServant {
        id: servant.id,
        name: servant.name.clone(),
        false_name: servant.false_name.clone(),
        klass: servant.klass,
        rarity: servant.rarity,
        skills: servant.skills.clone(),
        append_skills: servant.append_skills.clone(),
        costumes: servant
            .costumes
            .iter()
            .map(|costume| MergedCostume {
                id: costume.id,
                name: costume.name.clone(),
                resource: resolve_or_empty(resolver, &costume.resource),
            })
            .collect(),
        ascension_resources: resolve_levels(resolver, &servant.ascension_resources),
        skill_resources: resolve_levels(resolver, &servant.skill_resources),
        append_skill_resources: resolve_levels(resolver, &servant.append_skill_resources),
    }
}

pub fn merge_sound(sound: &Sound, resolver: &ItemNameResolver) -> MergedSound {
    MergedSound {
        source: sound.source.clone(),
        index: sound.index,
        title: sound.title.clone(),
        resource: resolve_or_empty(resolver, &sound.resource),
    }
}

/// Build the merged document; the resolver comes from `items`
pub fn merge(
    items: Vec<Item>,
    servants: &[Servant],
    sounds: &[Sound],
    default_item_id: Option<u32>,
) -> MergedData {
    let mut resolver = ItemNameResolver::from_items(&items);
    if let Some(id) = default_item_id {
        resolver = resolver.with_default(id);
    }
    MergedData {
        servants: servants
            .iter()
            .map(|servant| merge_servant(servant, &resolver))
            .collect(),
        sounds: sounds
            .iter()
            .map(|sound| merge_sound(sound, &resolver))
            .collect(),
        items,
    }
}

/// Merge the documents of a data directory and write `merged_data.json`
pub fn merge_data_dir(data: &DataDir, default_item_id: Option<u32>) -> Result<MergedData> {
    let items: Vec<Item> = store::load_json(&data.items_path())?.unwrap_or_else(|| {
        tracing::error!("failed to load items from {}", data.items_path().display());
        Vec::new()
    });
    let servants = store::load_servants(&data.servant_dir())?;
    let sounds: Vec<Sound> = store::load_json(&data.sounds_path())?.unwrap_or_else(|| {
        tracing::error!("failed to load sounds from {}", data.sounds_path().display());
        Vec::new()
    });

    let merged = merge(items, &servants, &sounds, default_item_id);
    let path = data.merged_path();
    tracing::info!("save merged data to {}", path.display());
    store::save_json(&path, &merged)?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemQuantity, ItemQuantityById};
    use pretty_assertions::assert_eq;

    fn items() -> Vec<Item> {
        vec![Item {
            id: 1,
            rarity: "銅".to_string(),
            name: "英雄の証".to_string(),
        }]
    }

    fn sound(names: &[&str]) -> Sound {
        Sound {
            source: "第1部".to_string(),
            index: 1,
            title: "track".to_string(),
            resource: names.iter().map(|n| ItemQuantity::new(*n, 3)).collect(),
        }
    }

    #[test]
    fn test_resolved_bundle() {
        let merged = merge(items(), &[], &[sound(&["英雄の証", "QP"])], None);
        assert_eq!(
            merged.sounds[0].resource,
            ResourceBundleById {
                currency: 3,
                items: vec![ItemQuantityById { id: 1, quantity: 3 }],
            }
        );
        assert_eq!(merged.items.len(), 1);
    }

    #[test]
    fn test_unresolved_bundle_becomes_empty() {
        let merged = merge(items(), &[], &[sound(&["英雄の証", "未知の素材"])], None);
        assert_eq!(merged.sounds[0].resource, ResourceBundleById::default());
    }

    #[test]
    fn test_default_item_id() {
        let merged = merge(items(), &[], &[sound(&["未知の素材"])], Some(0));
        assert_eq!(
            merged.sounds[0].resource.items,
            vec![ItemQuantityById { id: 0, quantity: 3 }]
        );
    }
}
