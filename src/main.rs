use anyhow::Context;
use clap::Parser;
use mlt_decoder::logging;
use mlt_decoder::shared::config::settings;
use mlt_decoder::{
    DecodeOptions, FilterExpression, RescaleConfig, decode_metadata, decode_tile,
    filter_feature_table,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "mlt_inspect")]
#[command(about = "Decode a MapLibre tile and summarise its feature tables", long_about = None)]
struct Args {
    /// Encoded tile
    tile: PathBuf,

    /// Protobuf tileset metadata the tile was encoded against
    #[arg(short, long)]
    metadata: PathBuf,

    /// Only decode these layers (repeatable)
    #[arg(short, long = "layer")]
    layers: Vec<String>,

    /// Style filter applied to every decoded table, as a JSON array
    #[arg(short, long)]
    filter: Option<String>,

    /// Rescale vertices to this extent
    #[arg(long)]
    target_extent: Option<u32>,

    /// Settings file; defaults to `MLT_CONFIG` or `config.toml`
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = settings(args.config.as_deref())?;
    logging::init(&settings.logging)?;

    let metadata_bytes = fs::read(&args.metadata)
        .with_context(|| format!("reading metadata {}", args.metadata.display()))?;
    let tile = fs::read(&args.tile).with_context(|| format!("reading tile {}", args.tile.display()))?;
    let metadata = decode_metadata(&metadata_bytes)?;

    let mut options = DecodeOptions::from(&settings.decoder);
    if let Some(extent) = args.target_extent {
        options.rescale = Some(RescaleConfig::new(extent));
    }
    if !args.layers.is_empty() {
        options.column_filter = Some(layer_filter(&metadata, &args.layers));
    }
    let filter = args
        .filter
        .as_deref()
        .map(str::parse::<FilterExpression>)
        .transpose()?;

    info!(tile = %args.tile.display(), bytes = tile.len(), "Inspecting tile");
    let tables = decode_tile(&tile, &metadata, &options).inspect_err(|e| e.log_error())?;

    for table in &tables {
        let selection = filter_feature_table(table, filter.as_ref())?;
        let properties: Vec<_> = table
            .properties()
            .iter()
            .map(|v| json!({ "name": v.name(), "type": v.type_name() }))
            .collect();
        let line = json!({
            "name": table.name(),
            "extent": table.extent(),
            "features": table.num_features(),
            "properties": properties,
            "selected": selection.limit(),
        });
        println!("{}", line);
    }
    Ok(())
}

/// Every property column of the requested layers.
fn layer_filter(
    metadata: &mlt_decoder::TileSetMetadata,
    layers: &[String],
) -> HashMap<String, HashSet<String>> {
    metadata
        .feature_tables
        .iter()
        .filter(|t| layers.contains(&t.name))
        .map(|t| {
            let columns = t.columns.iter().flat_map(|c| {
                let mut names = vec![c.name.clone()];
                names.extend(
                    c.children()
                        .iter()
                        .map(|child| format!("{}:{}", c.name, child.name)),
                );
                names
            });
            (t.name.clone(), columns.collect())
        })
        .collect()
}
