//! CLI command for updating servant records

use std::time::Instant;

use crate::cli::progress::{DISK, GEAR, LINK, print_counts, print_done, print_step, simple_bar};
use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::model::ServantId;
use crate::update::{SideData, UpdateOptions, Updater, select_links, servant_links};

/// Update flags from the command line
#[derive(Debug, Clone, Default)]
pub struct UpdateArgs {
    pub force: bool,
    pub no_save: bool,
    pub targets: Vec<ServantId>,
    /// Overrides `[request] interval_secs`
    pub request_interval: Option<f64>,
    /// Overrides `[request] timeout_secs`
    pub request_timeout: Option<f64>,
    pub halt_on_error: bool,
    pub progress: bool,
}

pub fn execute(config: &Config, args: &UpdateArgs) -> anyhow::Result<()> {
    let started = Instant::now();
    let data = config.data();

    let mut request = config.request.clone();
    if let Some(interval) = args.request_interval {
        request.interval_secs = interval;
    }
    if let Some(timeout) = args.request_timeout {
        request.timeout_secs = timeout;
    }
    let options = UpdateOptions {
        force: args.force,
        no_save: args.no_save,
        targets: args.targets.clone(),
        request_interval: request.interval(),
        halt_on_error: args.halt_on_error || config.validation.halt_on_error,
        rules: config.validation.rules,
    };
    let fetcher = HttpFetcher::from_config(&request)?;

    print_step(1, 3, &LINK, "Loading servant links...");
    let links = servant_links(&data, &fetcher, &options)?;
    let side = SideData::load(&data)?;
    let total = select_links(&links, &options.targets).len();

    print_step(2, 3, &GEAR, &format!("Updating {total} servants..."));
    let updater = Updater::new(&data, &fetcher, &side, &options);
    let summary = if args.progress {
        let pb = simple_bar(total as u64, "Updating");
        let summary = updater.run(&links, &|progress| {
            pb.set_position((progress.current - 1) as u64);
            pb.set_message(format!("{:03} {}", progress.id, progress.name));
        });
        pb.finish_with_message("done");
        summary
    } else {
        updater.run(&links, &|_| {})
    };

    print_step(3, 3, &DISK, "Summary");
    for (id, outcome) in summary.outcomes.iter().filter(|(_, o)| o.is_failure()) {
        println!("  {id:03}: {outcome:?}");
    }
    print_counts(summary.passed(), summary.failed(), summary.skipped());
    print_done(started.elapsed());

    if options.halt_on_error && !summary.is_success() {
        anyhow::bail!("{} servants failed", summary.failed());
    }
    Ok(())
}
