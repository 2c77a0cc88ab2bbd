use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Vector3;
use crate::TrackedObject;

/// Compression level used when encoding serialized snapshots.
const SNAPSHOT_COMPRESSION_LEVEL: i32 = 19;

/// Largest epoch spread, in days (~86 ms), still treated as one instant.
pub const EPOCH_TOLERANCE_DAYS: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("object {id} sampled at JD {found}, snapshot epoch is JD {expected}")]
    EpochMismatch { id: u32, expected: f64, found: f64 },
}

/// Positions of every tracked object at one common epoch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Julian date of the epoch all positions refer to.
    pub epoch_jd: f64,
    pub objects: Vec<TrackedObject>,
}

/// One record of a propagator export.
#[derive(Debug, Deserialize)]
struct PropagatedRecord {
    id: u32,
    name: String,
    epoch_jd: f64,
    pos: [f64; 3],
}

pub fn serialize_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(snapshot)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, SNAPSHOT_COMPRESSION_LEVEL)
        .map_err(DataError::Compression)
}

pub fn deserialize_snapshot(bytes: &[u8]) -> Result<Snapshot, DataError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(DataError::Compression)?;
    Ok(bincode::deserialize(&decoded)?)
}

pub fn write_snapshot_to_file<P: AsRef<Path>>(
    snapshot: &Snapshot,
    path: P,
) -> Result<(), DataError> {
    let bytes = serialize_snapshot(snapshot)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_snapshot_from_file<P: AsRef<Path>>(path: P) -> Result<Snapshot, DataError> {
    let bytes = fs::read(path.as_ref())?;
    let snapshot = deserialize_snapshot(&bytes)?;
    debug!(
        "loaded snapshot {} ({} objects, JD {})",
        path.as_ref().display(),
        snapshot.objects.len(),
        snapshot.epoch_jd
    );
    Ok(snapshot)
}

/// Builds a snapshot from a propagator JSON export.
///
/// All records must share one epoch; the engine never interpolates across
/// time. Records with non-finite coordinates are dropped.
pub fn snapshot_from_json(json: &str) -> Result<Snapshot, DataError> {
    let records: Vec<PropagatedRecord> = serde_json::from_str(json)?;
    let epoch_jd = records.first().map(|r| r.epoch_jd).unwrap_or(0.0);

    let mut objects = Vec::with_capacity(records.len());
    for record in records {
        if (record.epoch_jd - epoch_jd).abs() > EPOCH_TOLERANCE_DAYS {
            return Err(DataError::EpochMismatch {
                id: record.id,
                expected: epoch_jd,
                found: record.epoch_jd,
            });
        }
        let pos = Vector3::from(record.pos);
        if !pos.is_finite() {
            warn!("dropping object {} ({}): non-finite position", record.id, record.name);
            continue;
        }
        objects.push(TrackedObject {
            id: record.id,
            name: record.name,
            pos,
        });
    }

    Ok(Snapshot { epoch_jd, objects })
}

pub fn read_snapshot_from_json_file<P: AsRef<Path>>(path: P) -> Result<Snapshot, DataError> {
    let contents = fs::read_to_string(path)?;
    snapshot_from_json(&contents)
}
