//! Resource bundles: the currency plus items needed for one upgrade level

use serde::{Deserialize, Serialize};

/// Item name whose quantities accumulate into [`ResourceBundle::currency`].
pub const CURRENCY_TOKEN: &str = "QP";

/// Number of bundles in an ascension list (stage 1→2 … 4→max).
pub const ASCENSION_LEVELS: usize = 4;

/// Number of bundles in a skill-upgrade list (Lv1→2 … Lv9→10).
pub const SKILL_UPGRADE_LEVELS: usize = 9;

/// An item requirement as written on the wiki
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantity {
    /// Item name (Japanese, as used on the wiki)
    pub name: String,
    /// Required amount
    #[serde(rename = "piece")]
    pub quantity: u64,
}

impl ItemQuantity {
    pub fn new(name: impl Into<String>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// Whether this entry is the currency token rather than an item
    pub fn is_currency(&self) -> bool {
        self.name == CURRENCY_TOKEN
    }
}

/// Currency and items required for one upgrade level
///
/// Items keep source order. Repeated item names are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    /// Accumulated currency (QP)
    #[serde(rename = "qp")]
    pub currency: u64,
    /// Non-currency items in source order
    pub items: Vec<ItemQuantity>,
}

impl ResourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one extracted pair, routing the currency token into `currency`.
    ///
    /// A currency total past `u64::MAX` is logged and saturated.
    pub fn push(&mut self, item: ItemQuantity) {
        if item.is_currency() {
            match self.currency.checked_add(item.quantity) {
                Some(total) => self.currency = total,
                None => {
                    tracing::warn!(
                        "{} total overflows: {} + {}",
                        CURRENCY_TOKEN,
                        self.currency,
                        item.quantity
                    );
                    self.currency = u64::MAX;
                }
            }
        } else {
            self.items.push(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.currency == 0 && self.items.is_empty()
    }
}

impl FromIterator<ItemQuantity> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = ItemQuantity>>(iter: I) -> Self {
        let mut bundle = Self::new();
        for item in iter {
            bundle.push(item);
        }
        bundle
    }
}

impl Extend<ItemQuantity> for ResourceBundle {
    fn extend<I: IntoIterator<Item = ItemQuantity>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

/// Bundles ordered by level: index 0 is level 1→2
pub type LeveledResourceList = Vec<ResourceBundle>;

/// An item requirement after name resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantityById {
    /// Item identifier
    pub id: u32,
    /// Required amount
    #[serde(rename = "piece")]
    pub quantity: u64,
}

/// A [`ResourceBundle`] whose item names were all resolved to ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundleById {
    #[serde(rename = "qp")]
    pub currency: u64,
    pub items: Vec<ItemQuantityById>,
}
