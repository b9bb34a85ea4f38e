//! Sound player list parsing
//!
//! The sound player guide has one `wt*` table per story part, in
//! [`SOUND_SOURCES`] order. Rows are `no | title | unlock item`; the item cell
//! holds the item icon (its `alt` is the item name) followed by `N個`.

use std::sync::LazyLock;

use regex::Regex;

use super::html::{attribute, open_tag, open_tags, tag_blocks, text_content};
use crate::model::{ItemQuantity, ResourceBundle, Sound};

/// Story parts, one per sound table
pub const SOUND_SOURCES: [&str; 4] = ["Part1", "Part1_5", "Part2", "Event"];

const SOUND_TABLE_CLASS: &str = "wt";

static PIECES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<count>[0-9]+)個").expect("valid regex"));

/// Collect every track from the sound player page
pub fn parse_sounds(html: &str) -> Vec<Sound> {
    let tables = tag_blocks(html, "table").into_iter().filter(|table| {
        attribute(open_tag(table), "class").is_some_and(|class| class.starts_with(SOUND_TABLE_CLASS))
    });

    let mut sounds = Vec::new();
    for (i, table) in tables.enumerate() {
        let Some(source) = SOUND_SOURCES.get(i) else {
            tracing::warn!("unexpected sound table {}", i + 1);
            break;
        };
        let body = tag_blocks(table, "tbody").into_iter().next().unwrap_or(table);
        for (index, row) in tag_blocks(body, "tr").into_iter().enumerate() {
            if let Some(sound) = parse_row(source, index, row) {
                tracing::info!(
                    "sound: {}, {}, \"{}\"",
                    sound.source,
                    sound.index,
                    sound.title
                );
                sounds.push(sound);
            }
        }
    }
    sounds
}

fn parse_row(source: &str, index: usize, row: &str) -> Option<Sound> {
    let cells = tag_blocks(row, "td");
    if cells.is_empty() {
        tracing::debug!("skip header row: {}, {}", source, index);
        return None;
    }
    if cells.len() < 3 {
        tracing::error!("parse failed: {}, {}", source, index);
        return None;
    }
    Some(Sound {
        source: source.to_string(),
        index: u32::try_from(index).ok()?,
        title: text_content(cells[1]),
        resource: parse_unlock_item(cells[2]),
    })
}

/// The unlock item of one track; no icon means no cost
fn parse_unlock_item(cell: &str) -> ResourceBundle {
    let mut bundle = ResourceBundle::new();
    let Some(name) = open_tags(cell, "img")
        .into_iter()
        .find_map(|img| attribute(img, "alt"))
    else {
        tracing::debug!("resource: none");
        return bundle;
    };

    let text = text_content(cell);
    match PIECES
        .captures(&text)
        .and_then(|caps| caps["count"].parse().ok())
    {
        Some(piece) => {
            tracing::debug!("resource: {} x {}", name.trim(), piece);
            bundle.push(ItemQuantity::new(name.trim(), piece));
        }
        None => tracing::error!("piece match failed \"{}\"", text),
    }
    bundle
}
