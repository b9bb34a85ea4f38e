//! CLI command for parsing one saved servant page

use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::model::ServantId;
use crate::parser::parse_servant_page;
use crate::store;
use crate::update::SideData;

pub fn execute(
    config: &Config,
    source: &Path,
    id: ServantId,
    patch: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let data = config.data();
    let links = store::load_links(&data.links_path())?
        .with_context(|| format!("{} not found", data.links_path().display()))?;
    let Some(link) = links.iter().find(|link| link.id == id) else {
        anyhow::bail!("servant {id:03} is not in {}", data.links_path().display());
    };
    let html = std::fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    let side = SideData::load(&data)?;
    let costumes = side.costumes.get(&id).map_or(&[][..], Vec::as_slice);
    let mut servant = parse_servant_page(&html, link, side.names.get(&id), costumes)?;
    if patch && let Some(patches) = side.patches.get(&id) {
        servant.apply_patches(patches)?;
    }
    side.validate(&servant, &config.validation.rules).log();

    match output {
        Some(path) => store::save_json(path, &servant)?,
        None => println!("{}", serde_json::to_string_pretty(&servant)?),
    }
    Ok(())
}
