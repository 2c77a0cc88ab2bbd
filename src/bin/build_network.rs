use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use crosslink_engine::config::EngineConfig;
use crosslink_engine::data::{read_snapshot_from_json_file, write_snapshot_to_file};
use crosslink_engine::network::LinkGraph;
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SnapshotMetadata {
    source: String,
    epoch_jd: f64,
    objects: usize,
    crosslinks: usize,
    effective_radius_km: f64,
    max_range_km: Option<f64>,
    generated_at_epoch: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: build_network <propagator-export.json> [output-dir]"))?;
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));

    let config = EngineConfig::from_env().context("failed to load engine configuration")?;
    let model = config.occlusion_model()?;

    let snapshot = read_snapshot_from_json_file(&input)
        .with_context(|| format!("failed to read propagator export {}", input.display()))?;
    info!(
        "Read {} objects at JD {} from {}",
        snapshot.objects.len(),
        snapshot.epoch_jd,
        input.display()
    );

    let graph = LinkGraph::build(snapshot.objects.clone(), &model, config.link.max_range_km)?;

    fs::create_dir_all(&output_dir).context("failed to create output directory")?;
    let snapshot_path = output_dir.join("snapshot.bin");
    write_snapshot_to_file(&snapshot, &snapshot_path)
        .with_context(|| format!("failed to write snapshot to {}", snapshot_path.display()))?;

    let metadata = SnapshotMetadata {
        source: input.display().to_string(),
        epoch_jd: snapshot.epoch_jd,
        objects: graph.len(),
        crosslinks: graph.edge_count(),
        effective_radius_km: model.effective_radius(),
        max_range_km: config.link.max_range_km,
        generated_at_epoch: current_epoch_seconds(),
    };

    let metadata_path = output_dir.join("snapshot.meta.json");
    let metadata_json = serde_json::to_vec_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("failed to write metadata to {}", metadata_path.display()))?;

    info!(
        "Wrote snapshot to {} ({} objects, {} crosslinks)",
        snapshot_path.display(),
        metadata.objects,
        metadata.crosslinks
    );

    Ok(())
}

fn current_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
