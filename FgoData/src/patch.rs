//! Curator corrections applied to extracted records
//!
//! A patch names a field by its path through the record's JSON form and
//! carries the value it expects to find (`before`) plus its replacement
//! (`after`). A patch whose `before` no longer matches is skipped, so stale
//! corrections never overwrite data the wiki has since fixed.
//!
//! Patch file (`patch.json`):
//!
//! ```json
//! {
//!   "2": [
//!     { "path": ["skills", 0, 1, "rank"], "before": "A", "after": "A+" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::model::{Servant, ServantId};
use crate::store;

/// One step of a patch path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathStep {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl From<usize> for PathStep {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

/// A precondition-checked field replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub path: Vec<PathStep>,
    pub before: Value,
    pub after: Value,
}

impl Patch {
    pub fn new<I, S>(path: I, before: impl Into<Value>, after: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathStep>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            before: before.into(),
            after: after.into(),
        }
    }

    /// Dotted path for log messages, e.g. `skills.0.1.rank`
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Why a single patch was not applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("patch has an empty path")]
    EmptyPath,

    #[error("patch {path}: no value at step \"{step}\"")]
    Missing { path: String, step: String },

    #[error("patch {path}: before is different. actual={actual}, expected={expected}")]
    BeforeMismatch {
        path: String,
        actual: Value,
        expected: Value,
    },
}

/// Patches per servant, as stored in `patch.json`
pub type PatchSet = BTreeMap<ServantId, Vec<Patch>>;

fn step_mut<'a>(value: &'a mut Value, step: &PathStep) -> Option<&'a mut Value> {
    match (value, step) {
        (Value::Object(map), PathStep::Key(key)) => map.get_mut(key),
        (Value::Array(items), PathStep::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

/// Apply one patch, or report why it does not apply.
///
/// `data` is untouched on error.
pub fn try_apply_patch(data: &mut Value, patch: &Patch) -> std::result::Result<(), PatchError> {
    if patch.path.is_empty() {
        return Err(PatchError::EmptyPath);
    }

    let mut target = data;
    for step in &patch.path {
        target = step_mut(target, step).ok_or_else(|| PatchError::Missing {
            path: patch.dotted_path(),
            step: step.to_string(),
        })?;
    }

    if *target != patch.before {
        return Err(PatchError::BeforeMismatch {
            path: patch.dotted_path(),
            actual: target.clone(),
            expected: patch.before.clone(),
        });
    }

    tracing::debug!(
        "patch {}: apply {} -> {}",
        patch.dotted_path(),
        target,
        patch.after
    );
    *target = patch.after.clone();
    Ok(())
}

/// Apply one patch; failures are logged and skipped
pub fn apply_patch(data: &mut Value, patch: &Patch) -> bool {
    match try_apply_patch(data, patch) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!("failed to apply patch: {}", err);
            false
        }
    }
}

/// Apply patches in order; returns how many were applied
pub fn apply_patches(data: &mut Value, patches: &[Patch]) -> usize {
    patches
        .iter()
        .filter(|patch| apply_patch(data, patch))
        .count()
}

/// Load `patch.json`; a missing file is an empty set
pub fn load_patches<P: AsRef<Path>>(path: P) -> Result<PatchSet> {
    let path = path.as_ref();
    let Some(raw) = store::load_json::<BTreeMap<String, Vec<Patch>>>(path)? else {
        tracing::info!("No patch file at {}", path.display());
        return Ok(PatchSet::new());
    };
    tracing::info!("Loaded patches from {}", path.display());
    raw.into_iter()
        .map(|(key, patches)| {
            let id = key
                .trim()
                .parse()
                .map_err(|_| Error::InvalidPatchKey(key.clone()))?;
            Ok((id, patches))
        })
        .collect()
}

impl Servant {
    /// Apply curator patches to this record.
    ///
    /// Patches address the record's JSON form. A patch that would leave the
    /// record unrepresentable (e.g. a string where a number belongs) is
    /// logged and rolled back.
    pub fn apply_patches(&mut self, patches: &[Patch]) -> Result<usize> {
        if patches.is_empty() {
            return Ok(0);
        }

        let mut data = serde_json::to_value(&*self)?;
        let mut applied = 0;
        for patch in patches {
            let previous = data.clone();
            if !apply_patch(&mut data, patch) {
                continue;
            }
            if let Err(err) = serde_json::from_value::<Servant>(data.clone()) {
                tracing::error!("patch {}: result is not a valid record: {}", patch.dotted_path(), err);
                data = previous;
                continue;
            }
            applied += 1;
        }

        *self = serde_json::from_value(data)?;
        Ok(applied)
    }
}
