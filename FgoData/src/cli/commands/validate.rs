//! CLI command for validating stored servant records

use std::time::Instant;

use crate::cli::progress::{LOOKING_GLASS, print_counts, print_done, print_step};
use crate::config::Config;
use crate::model::{Item, servant_span};
use crate::resolver::ItemNameResolver;
use crate::store;
use crate::validate::validate_document;

pub fn execute(config: &Config, halt_on_error: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let halt_on_error = halt_on_error || config.validation.halt_on_error;
    let data = config.data();
    let dir = data.servant_dir();
    let items = match store::load_json::<Vec<Item>>(&data.items_path())? {
        Some(items) => Some(ItemNameResolver::from_items(&items)),
        None => {
            tracing::warn!("No items at {}; item names are not checked", data.items_path().display());
            None
        }
    };

    print_step(1, 1, &LOOKING_GLASS, &format!("Validating {}...", dir.display()));
    let documents = store::load_servant_documents(&dir)?;

    let mut passed = 0;
    let mut failed = Vec::new();
    for (id, doc) in &documents {
        let name = doc.get("name").and_then(serde_json::Value::as_str).unwrap_or_default();
        let _span = servant_span(*id, name).entered();
        tracing::info!("start validation");
        let report = validate_document(doc, &config.validation.rules, items.as_ref());
        report.log();
        if report.is_valid() {
            passed += 1;
        } else {
            failed.push(*id);
            if halt_on_error {
                tracing::error!("halt on error");
                break;
            }
        }
    }

    print_counts(passed, failed.len(), documents.len() - passed - failed.len());
    print_done(started.elapsed());

    if !failed.is_empty() {
        let ids: Vec<String> = failed.iter().map(|id| format!("{id:03}")).collect();
        anyhow::bail!("validation failed: {}", ids.join(", "));
    }
    Ok(())
}
