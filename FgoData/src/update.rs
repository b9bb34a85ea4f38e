//! Servant update pipeline
//!
//! For each selected servant: take the page (cached under `page/` or
//! fetched), parse it, apply curator patches, validate, and save the record
//! only when it passes. Each record is finished before the next starts.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::fetch::Fetch;
use crate::model::{
    Costume, Item, Servant, ServantId, ServantLink, ServantName, Sound, servant_span,
};
use crate::parser::{parse_servant_links, parse_servant_page, parse_sounds};
use crate::patch::{PatchSet, load_patches};
use crate::resolver::ItemNameResolver;
use crate::store::{self, DataDir};
use crate::validate::{ValidationReport, ValidationRules, check_item_names, validate_servant};

/// The wiki's servant list page
pub const SERVANT_LIST_URL: &str = "https://w.atwiki.jp/f_go/pages/713.html";

/// The sound player guide
pub const SOUND_LIST_URL: &str = "https://kamigame.jp/fgo/初心者攻略/サウンドプレイヤー.html";

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Refetch pages and rebuild records that already exist
    pub force: bool,
    /// Do not write pages, links or records
    pub no_save: bool,
    /// Only these servants; empty means all
    pub targets: Vec<ServantId>,
    /// Pause after each request
    pub request_interval: Duration,
    /// Stop at the first record that fails
    pub halt_on_error: bool,
    pub rules: ValidationRules,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            force: false,
            no_save: false,
            targets: Vec::new(),
            request_interval: Duration::from_secs(5),
            halt_on_error: false,
            rules: ValidationRules::default(),
        }
    }
}

/// Progress callback type for update runs
pub type UpdateProgressCallback<'a> = &'a dyn Fn(&UpdateProgress);

/// Progress information during an update run
#[derive(Debug, Clone)]
pub struct UpdateProgress {
    /// Current servant number (1-indexed)
    pub current: usize,
    pub total: usize,
    pub id: ServantId,
    pub name: String,
}

/// What happened to one servant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Valid and written to this path
    Saved(PathBuf),
    /// Valid; saving disabled
    Passed,
    /// Record exists and no `--force`
    Skipped,
    /// Failed validation with this many violations
    Invalid(usize),
    /// Page could not be fetched or parsed
    Failed(String),
}

impl UpdateOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::Failed(_))
    }
}

/// Per-record results of an update run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub outcomes: Vec<(ServantId, UpdateOutcome)>,
    /// Set when `halt_on_error` stopped the run early
    pub halted: bool,
}

impl UpdateSummary {
    pub fn passed(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpdateOutcome::Saved(_) | UpdateOutcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(UpdateOutcome::is_failure)
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpdateOutcome::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, predicate: impl Fn(&UpdateOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

/// Curated documents merged into every record
#[derive(Debug, Clone, Default)]
pub struct SideData {
    pub names: BTreeMap<ServantId, ServantName>,
    pub costumes: BTreeMap<ServantId, Vec<Costume>>,
    pub patches: PatchSet,
    /// Known item names from `items.json`; records are checked against it when present
    pub items: Option<ItemNameResolver>,
}

impl SideData {
    pub fn load(data: &DataDir) -> Result<Self> {
        let items = store::load_json::<Vec<Item>>(&data.items_path())?
            .map(|items| ItemNameResolver::from_items(&items));
        if items.is_none() {
            tracing::warn!("No items at {}; item names are not checked", data.items_path().display());
        }
        Ok(Self {
            names: store::load_names(&data.names_path())?,
            costumes: store::load_costumes(&data.costumes_path())?,
            patches: load_patches(data.patches_path())?,
            items,
        })
    }

    /// Validate a built record, including item names when they are known
    pub fn validate(&self, servant: &Servant, rules: &ValidationRules) -> ValidationReport {
        let mut report = validate_servant(servant, rules);
        if let Some(items) = &self.items {
            report.extend(check_item_names(servant, items));
        }
        report
    }
}

/// Servant links from `link.json`, fetching the list page when missing or forced
pub fn servant_links<F: Fetch + ?Sized>(
    data: &DataDir,
    fetcher: &F,
    options: &UpdateOptions,
) -> Result<Vec<ServantLink>> {
    let path = data.links_path();
    if !options.force
        && let Some(links) = store::load_links(&path)?
    {
        tracing::info!("Loaded {} links from {}", links.len(), path.display());
        return Ok(links);
    }

    let html = fetcher.fetch(SERVANT_LIST_URL)?;
    let links = parse_servant_links(&html)?;
    if !options.no_save {
        tracing::info!("save links to {}", path.display());
        store::save_json(&path, &links)?;
    }
    pause(options.request_interval);
    Ok(links)
}

/// Sounds from `sound.json`, fetching the sound player page when missing or forced
pub fn sound_list<F: Fetch + ?Sized>(
    data: &DataDir,
    fetcher: &F,
    options: &UpdateOptions,
) -> Result<Vec<Sound>> {
    let path = data.sounds_path();
    if !options.force
        && let Some(sounds) = store::load_json::<Vec<Sound>>(&path)?
    {
        tracing::info!("Loaded {} sounds from {}", sounds.len(), path.display());
        return Ok(sounds);
    }

    let html = fetcher.fetch(SOUND_LIST_URL)?;
    let sounds = parse_sounds(&html);
    if !options.no_save {
        tracing::info!("save sounds to {}", path.display());
        store::save_json(&path, &sounds)?;
    }
    pause(options.request_interval);
    Ok(sounds)
}

/// Links restricted to `targets` (all links when `targets` is empty)
pub fn select_links<'l>(links: &'l [ServantLink], targets: &[ServantId]) -> Vec<&'l ServantLink> {
    if targets.is_empty() {
        return links.iter().collect();
    }
    for target in targets {
        if !links.iter().any(|link| link.id == *target) {
            tracing::warn!("target {:03} is not in the servant list", target);
        }
    }
    links
        .iter()
        .filter(|link| targets.contains(&link.id))
        .collect()
}

fn pause(interval: Duration) {
    if !interval.is_zero() {
        std::thread::sleep(interval);
    }
}

/// Runs the per-servant pipeline against one data directory
pub struct Updater<'a, F: Fetch + ?Sized> {
    data: &'a DataDir,
    fetcher: &'a F,
    side: &'a SideData,
    options: &'a UpdateOptions,
}

impl<'a, F: Fetch + ?Sized> Updater<'a, F> {
    pub fn new(
        data: &'a DataDir,
        fetcher: &'a F,
        side: &'a SideData,
        options: &'a UpdateOptions,
    ) -> Self {
        Self {
            data,
            fetcher,
            side,
            options,
        }
    }

    /// Update every selected servant in list order
    pub fn run(&self, links: &[ServantLink], progress: UpdateProgressCallback<'_>) -> UpdateSummary {
        let selected = select_links(links, &self.options.targets);
        let total = selected.len();
        let mut summary = UpdateSummary::default();

        for (i, link) in selected.into_iter().enumerate() {
            progress(&UpdateProgress {
                current: i + 1,
                total,
                id: link.id,
                name: link.name.clone(),
            });
            let outcome = self.update_one(link);
            let failed = outcome.is_failure();
            summary.outcomes.push((link.id, outcome));
            if failed && self.options.halt_on_error {
                tracing::error!("halt on error at servant {:03}", link.id);
                summary.halted = true;
                break;
            }
        }
        summary
    }

    /// Update one servant; errors are logged and reported as the outcome
    pub fn update_one(&self, link: &ServantLink) -> UpdateOutcome {
        let _span = servant_span(link.id, &link.name).entered();
        let path = self.data.servant_path(link.id);
        if !self.options.force && path.exists() {
            tracing::info!("skip updating");
            return UpdateOutcome::Skipped;
        }

        let servant = match self.build(link) {
            Ok(servant) => servant,
            Err(err) => {
                tracing::error!("failed to update: {}", err);
                return UpdateOutcome::Failed(err.to_string());
            }
        };

        tracing::info!("start validation");
        let report = self.side.validate(&servant, &self.options.rules);
        if !report.is_valid() {
            report.log();
            return UpdateOutcome::Invalid(report.violations.len());
        }
        if self.options.no_save {
            return UpdateOutcome::Passed;
        }
        match store::save_servant(&self.data.servant_dir(), &servant) {
            Ok(path) => UpdateOutcome::Saved(path),
            Err(err) => {
                tracing::error!("failed to save: {}", err);
                UpdateOutcome::Failed(err.to_string())
            }
        }
    }

    /// Parse and patch one servant's record
    pub fn build(&self, link: &ServantLink) -> Result<Servant> {
        let html = self.page_text(link)?;
        let costumes = self.side.costumes.get(&link.id).map_or(&[][..], Vec::as_slice);
        let mut servant = parse_servant_page(&html, link, self.side.names.get(&link.id), costumes)?;
        if let Some(patches) = self.side.patches.get(&link.id) {
            let applied = servant.apply_patches(patches)?;
            tracing::info!("applied {}/{} patches", applied, patches.len());
        }
        Ok(servant)
    }

    fn page_text(&self, link: &ServantLink) -> Result<String> {
        let path = self.data.page_path(link.id);
        if !self.options.force
            && let Some(text) = store::load_text(&path)?
        {
            tracing::info!("load page from {}", path.display());
            return Ok(text);
        }

        let text = self.fetcher.fetch(&link.url)?;
        if !self.options.no_save {
            tracing::info!("save page to {}", path.display());
            store::save_text(&path, &text)?;
        }
        pause(self.options.request_interval);
        Ok(text)
    }
}
