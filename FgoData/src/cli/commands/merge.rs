//! CLI command for building merged_data.json

use std::time::Instant;

use crate::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step};
use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::merge::merge_data_dir;
use crate::update::{UpdateOptions, sound_list};

pub fn execute(
    config: &Config,
    default_item_id: Option<u32>,
    update_sounds: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let data = config.data();
    let default_item_id = default_item_id.or(config.merge.default_item_id);

    if update_sounds {
        print_step(1, 2, &LOOKING_GLASS, "Fetching sound list...");
        let fetcher = HttpFetcher::from_config(&config.request)?;
        let options = UpdateOptions {
            force: true,
            request_interval: std::time::Duration::ZERO,
            ..UpdateOptions::default()
        };
        let sounds = sound_list(&data, &fetcher, &options)?;
        println!("{} sounds", sounds.len());
    }

    let (step, total) = if update_sounds { (2, 2) } else { (1, 1) };
    print_step(step, total, &DISK, &format!("Merging into {}...", data.merged_path().display()));
    let merged = merge_data_dir(&data, default_item_id)?;
    println!(
        "{} items, {} servants, {} sounds",
        merged.items.len(),
        merged.servants.len(),
        merged.sounds.len()
    );
    print_done(started.elapsed());
    Ok(())
}
