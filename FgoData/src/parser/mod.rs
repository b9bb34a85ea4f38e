//! Wiki page parsing
//!
//! Turns servant pages and the servant list into typed records:
//! - [`html`] slices raw markup by tag blocks
//! - [`quantity`] reads `name,xN` item pairs from a cell
//! - [`level`] folds table cells into one resource bundle per level
//! - [`skill`] reads skill headings, ranks and icons
//! - [`page`] locates the regions of a servant page and assembles a [`Servant`](crate::model::Servant)
//! - [`links`] reads the servant list
//! - [`sound`] reads the sound player list
//!
//! ## Usage
//!
//! ```ignore
//! let links = parse_servant_links(&list_html)?;
//! let servant = parse_servant_page(&page_html, &links[0], None, &[])?;
//! ```

pub mod html;
pub mod level;
pub mod links;
pub mod page;
pub mod quantity;
pub mod skill;
pub mod sound;

pub use level::{
    AscensionMarker, LevelFold, LevelMarker, SkillUpgradeMarker, parse_ascension_resources,
    parse_leveled_resources, parse_skill_resources,
};
pub use links::parse_servant_links;
pub use page::{ServantPage, parse_servant_page};
pub use quantity::{parse_items, parse_quantity};
pub use skill::{
    SkillHeading, parse_skill, parse_skill_heading, parse_skill_icon, parse_skill_rank,
    parse_skill_slots,
};
pub use sound::parse_sounds;
