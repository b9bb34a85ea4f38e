use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;
use crate::model::ServantId;

pub mod links;
pub mod merge;
pub mod parse;
pub mod sounds;
pub mod update;
pub mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, parse, validate and save servant records
    Update {
        /// Refetch pages and rebuild existing records
        #[arg(short, long)]
        force: bool,

        /// Skip saving pages, links and records
        #[arg(long)]
        no_save: bool,

        /// Only update these servants
        #[arg(short, long = "target", value_name = "SERVANT_ID", num_args = 1..)]
        targets: Vec<ServantId>,

        /// Seconds to wait after each request
        #[arg(long, value_name = "SECONDS")]
        request_interval: Option<f64>,

        /// Request timeout in seconds
        #[arg(long, value_name = "SECONDS")]
        request_timeout: Option<f64>,

        /// Stop at the first servant that fails
        #[arg(long)]
        halt_on_error: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Fetch and list the servant links
    Links {
        /// Refetch the servant list even when link.json exists
        #[arg(short, long)]
        force: bool,

        /// Skip saving link.json
        #[arg(long)]
        no_save: bool,
    },

    /// Fetch and list the sound player tracks (sound.json)
    Sounds {
        /// Refetch the sound list even when sound.json exists
        #[arg(short, long)]
        force: bool,

        /// Skip saving sound.json
        #[arg(long)]
        no_save: bool,
    },

    /// Validate every stored servant record
    Validate {
        /// Stop at the first record that fails
        #[arg(long)]
        halt_on_error: bool,
    },

    /// Build merged_data.json from items, servants and sounds
    Merge {
        /// Item id for names missing from items.json
        #[arg(long, value_name = "ITEM_ID")]
        default_item_id: Option<u32>,

        /// Refetch sound.json before merging
        #[arg(long)]
        update_sounds: bool,
    },

    /// Parse one saved servant page and print the record
    Parse {
        /// Servant page (HTML)
        #[arg(short, long)]
        source: PathBuf,

        /// Servant id (looked up in link.json)
        #[arg(short, long)]
        id: ServantId,

        /// Apply the servant's entries from patch.json
        #[arg(long)]
        patch: bool,

        /// Write the record here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match self {
            Commands::Update {
                force,
                no_save,
                targets,
                request_interval,
                request_timeout,
                halt_on_error,
                quiet,
            } => update::execute(
                config,
                &update::UpdateArgs {
                    force: *force,
                    no_save: *no_save,
                    targets: targets.clone(),
                    request_interval: *request_interval,
                    request_timeout: *request_timeout,
                    halt_on_error: *halt_on_error,
                    progress: !*quiet,
                },
            ),
            Commands::Links { force, no_save } => links::execute(config, *force, *no_save),
            Commands::Validate { halt_on_error } => validate::execute(config, *halt_on_error),
            Commands::Sounds { force, no_save } => sounds::execute(config, *force, *no_save),
            Commands::Merge {
                default_item_id,
                update_sounds,
            } => merge::execute(config, *default_item_id, *update_sounds),
            Commands::Parse {
                source,
                id,
                patch,
                output,
            } => parse::execute(config, source, *id, *patch, output.as_deref()),
        }
    }
}
