//! # fgodata
//!
//! Extraction, patching and validation of Fate/Grand Order servant data
//! from the community wiki.
//!
//! ## Pipeline
//!
//! - **Parse** - page regions become leveled resource lists and skill slots
//! - **Patch** - curator corrections with a `before` precondition
//! - **Validate** - schema and cross-field invariants, every violation logged
//! - **Merge** - item names resolved to ids for downstream tooling
//!
//! ## Quick Start
//!
//! ### Parsing a resource table
//!
//! ```
//! use fgodata::parser::parse_ascension_resources;
//!
//! let levels = parse_ascension_resources(["1段階", "英雄の証,x5", "QP,x3万"])?;
//! assert_eq!(levels[0].currency, 30_000);
//! assert_eq!(levels[0].items[0].quantity, 5);
//! # Ok::<(), fgodata::Error>(())
//! ```
//!
//! ### Validating stored records
//!
//! ```no_run
//! use std::path::Path;
//! use fgodata::store::load_servants;
//! use fgodata::validate::{ValidationRules, validate_servants};
//!
//! let servants = load_servants(Path::new("data/servant"))?;
//! let batch = validate_servants(&servants, &ValidationRules::default(), false);
//! println!("{} passed, {} failed", batch.passed.len(), batch.failed.len());
//! # Ok::<(), fgodata::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `http` - Enables [`fetch::HttpFetcher`] (blocking `reqwest`)
//! - `cli` - Enables the `fgodata` command-line binary

pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod model;
pub mod parser;
pub mod patch;
pub mod resolver;
pub mod store;
pub mod update;
pub mod validate;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::model::{
        Costume, ItemQuantity, LeveledResourceList, ResourceBundle, ResourceBundleById, Servant,
        ServantClass, ServantId, ServantLink, Skill, SkillCategory, SkillSlots,
    };

    // Parsing
    pub use crate::parser::{
        LevelMarker, parse_ascension_resources, parse_servant_links, parse_servant_page,
        parse_skill_resources, parse_skill_slots, parse_sounds,
    };

    pub use crate::patch::{Patch, PatchError, PathStep, apply_patch, apply_patches};
    pub use crate::resolver::ItemNameResolver;
    pub use crate::validate::{ValidationReport, ValidationRules, Violation, validate_servant};

    pub use crate::config::Config;
    pub use crate::fetch::Fetch;
    pub use crate::store::DataDir;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
