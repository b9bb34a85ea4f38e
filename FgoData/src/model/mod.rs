//! Data model for extracted servant data
//!
//! Every record here round-trips through JSON with the field names used by
//! the persisted data set (`qp`, `piece`, `klass`).

mod item;
mod resource;
mod servant;
mod skill;

pub use item::{Item, ItemId, Sound};
pub use resource::{
    ASCENSION_LEVELS, CURRENCY_TOKEN, ItemQuantity, ItemQuantityById, LeveledResourceList,
    ResourceBundle, ResourceBundleById, SKILL_UPGRADE_LEVELS,
};
pub use servant::{
    Costume, CostumeData, CostumeId, Servant, ServantClass, ServantId, ServantLink, ServantName,
    UNPLAYABLE_SERVANT_IDS, servant_span,
};
pub use skill::{MAX_SLOTS, Skill, SkillCategory, SkillSlots};
