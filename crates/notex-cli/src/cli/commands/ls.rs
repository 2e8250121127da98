//! Catalog listing for scripting.

use anyhow::{Context, Result, bail};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use notex_core::catalog::Catalog;
use notex_core::config::Config;
use notex_core::hierarchy::Level;

pub async fn run(level_id: &str, parent: Option<&str>, config: &Config) -> Result<()> {
    let Some(level) = Level::from_id(level_id) else {
        bail!(
            "unknown level '{level_id}' (expected one of: exam, course, subject, unit, chapter, topic)"
        );
    };
    let catalog = Catalog::from_config(config).context("build catalog")?;

    let nodes = match (level.parent(), parent) {
        (None, _) => catalog.fetch_root().await?,
        (Some(_), Some(parent_id)) => catalog.fetch_children(level, parent_id).await?,
        (Some(parent_level), None) => bail!(
            "listing {}s needs --parent <{} id>",
            level.id(),
            parent_level.id()
        ),
    };

    if nodes.is_empty() {
        println!("No entries.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "NAME"]);
    for node in &nodes {
        table.add_row(vec![node.id.as_str(), node.name.as_str()]);
    }
    println!("{table}");
    Ok(())
}
