//! JSON persistence and data directory layout
//!
//! ```text
//! <data_dir>/
//! ├── items.json
//! ├── sound.json
//! ├── merged_data.json
//! └── servant/
//!     ├── 001.json ...      one record per servant
//!     ├── link.json
//!     ├── name.json
//!     ├── costumes.json
//!     ├── patch.json
//!     └── page/001.html ... fetched page text
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::Result;
use crate::model::{Costume, CostumeData, Servant, ServantId, ServantLink, ServantName};

static RECORD_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<id>[0-9]{3,})\.json$").expect("valid regex"));

/// Paths inside a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn servant_dir(&self) -> PathBuf {
        self.root.join("servant")
    }

    pub fn servant_path(&self, id: ServantId) -> PathBuf {
        servant_path(self.servant_dir(), id)
    }

    pub fn page_path(&self, id: ServantId) -> PathBuf {
        self.servant_dir().join("page").join(format!("{id:03}.html"))
    }

    pub fn links_path(&self) -> PathBuf {
        self.servant_dir().join("link.json")
    }

    pub fn names_path(&self) -> PathBuf {
        self.servant_dir().join("name.json")
    }

    pub fn costumes_path(&self) -> PathBuf {
        self.servant_dir().join("costumes.json")
    }

    pub fn patches_path(&self) -> PathBuf {
        self.servant_dir().join("patch.json")
    }

    pub fn items_path(&self) -> PathBuf {
        self.root.join("items.json")
    }

    pub fn sounds_path(&self) -> PathBuf {
        self.root.join("sound.json")
    }

    pub fn merged_path(&self) -> PathBuf {
        self.root.join("merged_data.json")
    }
}

/// `<dir>/NNN.json`
pub fn servant_path<P: AsRef<Path>>(dir: P, id: ServantId) -> PathBuf {
    dir.as_ref().join(format!("{id:03}.json"))
}

/// Read a JSON document; `None` when the file does not exist
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

/// Write a JSON document with two-space indentation, creating parent directories
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// Read a text file; `None` when it does not exist
pub fn load_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn save_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// Record files (`NNN.json`) directly inside `dir`, sorted by filename id
pub fn servant_files(dir: &Path) -> Result<Vec<(ServantId, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(id) = RECORD_FILE
            .captures(&name)
            .and_then(|caps| caps["id"].parse().ok())
        else {
            continue;
        };
        files.push((id, entry.into_path()));
    }
    files.sort_by_key(|(id, _)| *id);
    Ok(files)
}

/// Raw JSON of every record file in `dir`, for schema validation
pub fn load_servant_documents(dir: &Path) -> Result<Vec<(ServantId, Value)>> {
    let mut documents = Vec::new();
    for (id, path) in servant_files(dir)? {
        tracing::debug!("load {}", path.display());
        if let Some(doc) = load_json(&path)? {
            documents.push((id, doc));
        }
    }
    Ok(documents)
}

/// Every record in `dir`, sorted by id; unreadable files are logged and skipped
pub fn load_servants(dir: &Path) -> Result<Vec<Servant>> {
    tracing::info!("Loading servants from {}", dir.display());
    let mut servants = Vec::new();
    for (id, path) in servant_files(dir)? {
        let servant = match load_json::<Servant>(&path) {
            Ok(Some(servant)) => servant,
            Ok(None) => continue,
            Err(err) => {
                tracing::error!("servant {:03}: failed to load {}: {}", id, path.display(), err);
                continue;
            }
        };
        if servant.id != id {
            tracing::error!(
                "servant id {:03} does not match file name {}",
                servant.id,
                path.display()
            );
        }
        servants.push(servant);
    }
    servants.sort_by_key(|servant| servant.id);
    tracing::info!("Loaded {} servants", servants.len());
    Ok(servants)
}

pub fn load_servant(dir: &Path, id: ServantId) -> Result<Option<Servant>> {
    load_json(&servant_path(dir, id))
}

pub fn save_servant(dir: &Path, servant: &Servant) -> Result<PathBuf> {
    let path = servant_path(dir, servant.id);
    tracing::info!("save to {}", path.display());
    save_json(&path, servant)?;
    Ok(path)
}

/// `link.json`; `None` when it has not been fetched yet
pub fn load_links(path: &Path) -> Result<Option<Vec<ServantLink>>> {
    load_json(path)
}

/// `name.json` keyed by servant id; missing file is an empty map
pub fn load_names(path: &Path) -> Result<BTreeMap<ServantId, ServantName>> {
    let names: Vec<ServantName> = load_json(path)?.unwrap_or_else(|| {
        tracing::warn!("No name overrides at {}", path.display());
        Vec::new()
    });
    Ok(names.into_iter().map(|name| (name.id, name)).collect())
}

/// `costumes.json` grouped by servant and sorted by costume id
pub fn load_costumes(path: &Path) -> Result<BTreeMap<ServantId, Vec<Costume>>> {
    let costumes: Vec<CostumeData> = load_json(path)?.unwrap_or_else(|| {
        tracing::warn!("No costumes at {}", path.display());
        Vec::new()
    });
    Ok(group_costumes_by_servant(costumes))
}

pub fn group_costumes_by_servant(
    costumes: impl IntoIterator<Item = CostumeData>,
) -> BTreeMap<ServantId, Vec<Costume>> {
    let mut grouped: BTreeMap<ServantId, Vec<Costume>> = BTreeMap::new();
    for costume in costumes {
        grouped
            .entry(costume.servant_id)
            .or_default()
            .push(costume.into());
    }
    for costumes in grouped.values_mut() {
        costumes.sort_by_key(|costume| costume.id);
    }
    grouped
}
