//! Item name → id resolution for the merge step

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Item, ItemId, ItemQuantityById, ResourceBundle, ResourceBundleById};
use crate::store;

/// Immutable item-name dictionary built once per run
#[derive(Debug, Clone, Default)]
pub struct ItemNameResolver {
    ids: HashMap<String, ItemId>,
    default_id: Option<ItemId>,
}

impl ItemNameResolver {
    pub fn new(ids: HashMap<String, ItemId>) -> Self {
        Self {
            ids,
            default_id: None,
        }
    }

    /// Fall back to `id` for names missing from the dictionary
    #[must_use]
    pub fn with_default(mut self, id: ItemId) -> Self {
        self.default_id = Some(id);
        self
    }

    pub fn from_items(items: &[Item]) -> Self {
        Self::new(
            items
                .iter()
                .map(|item| (item.name.clone(), item.id))
                .collect(),
        )
    }

    /// Build from an `items.json` document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let items: Vec<Item> = store::load_json(path)?.ok_or_else(|| Error::MissingDataFile {
            path: path.to_path_buf(),
        })?;
        tracing::info!("{} item names from {}", items.len(), path.display());
        Ok(Self::from_items(&items))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `name` is in the dictionary (the default id does not count)
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Look up one name.
    ///
    /// A miss is logged; it yields the default id when one is configured.
    pub fn resolve(&self, name: &str) -> Result<ItemId> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }
        tracing::error!("failed to convert item name \"{}\" to id", name);
        self.default_id.ok_or_else(|| Error::UnresolvedItem {
            name: name.to_string(),
        })
    }

    /// Resolve every item of a bundle; any miss fails the whole bundle
    pub fn resolve_bundle(&self, bundle: &ResourceBundle) -> Result<ResourceBundleById> {
        let items = bundle
            .items
            .iter()
            .map(|item| {
                Ok(ItemQuantityById {
                    id: self.resolve(&item.name)?,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ResourceBundleById {
            currency: bundle.currency,
            items,
        })
    }
}
