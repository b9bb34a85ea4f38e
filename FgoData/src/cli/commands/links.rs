//! CLI command for the servant list

use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::update::{UpdateOptions, servant_links};

pub fn execute(config: &Config, force: bool, no_save: bool) -> anyhow::Result<()> {
    let options = UpdateOptions {
        force,
        no_save,
        request_interval: std::time::Duration::ZERO,
        ..UpdateOptions::default()
    };
    let fetcher = HttpFetcher::from_config(&config.request)?;
    let links = servant_links(&config.data(), &fetcher, &options)?;

    for link in &links {
        println!(
            "{:03}  {}  {:<10}  {}  {}",
            link.id,
            "★".repeat(usize::from(link.rarity)),
            link.klass,
            link.name,
            link.url
        );
    }
    println!("{} servants", links.len());
    Ok(())
}
