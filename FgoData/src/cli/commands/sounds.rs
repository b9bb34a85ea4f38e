//! CLI command for the sound player list

use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::update::{UpdateOptions, sound_list};

pub fn execute(config: &Config, force: bool, no_save: bool) -> anyhow::Result<()> {
    let options = UpdateOptions {
        force,
        no_save,
        request_interval: std::time::Duration::ZERO,
        ..UpdateOptions::default()
    };
    let fetcher = HttpFetcher::from_config(&config.request)?;
    let sounds = sound_list(&config.data(), &fetcher, &options)?;

    for sound in &sounds {
        let items: Vec<String> = sound
            .resource
            .items
            .iter()
            .map(|item| format!("{} x{}", item.name, item.quantity))
            .collect();
        println!("{:<8} {:>3}  {}  {}", sound.source, sound.index, sound.title, items.join(", "));
    }
    println!("{} sounds", sounds.len());
    Ok(())
}
