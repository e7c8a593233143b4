use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::{ObservationLog, ObservationRecord, Payload};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

const PAYLOAD_KEYS: [&str; 2] = ["spectra", "sdr"];

/// Writes the whole observation log to a fixed file, replacing what was
/// there. The file is truncated in place, so a crash mid-write leaves it
/// incomplete.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialises the log while holding its lock. Returns the number of
    /// records written.
    pub fn write(&self, log: &ObservationLog) -> Result<usize, SnapshotError> {
        log.with_records(|records| -> Result<usize, SnapshotError> {
            self.write_records(records)?;
            Ok(records.len())
        })
    }

    fn write_records(&self, records: &[ObservationRecord]) -> Result<(), SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        };

        let file = File::create(&self.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
        records.serialize(&mut ser)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

/// Reads a snapshot file back into records. Every record must hold a
/// `time` and exactly one payload key, and nothing else.
pub fn load(path: &Path) -> Result<Vec<ObservationRecord>, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Vec<Value> = serde_json::from_str(&content)?;

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| -> Result<ObservationRecord, SnapshotError> {
            check_record_keys(&value).map_err(|reason| SnapshotError::InvalidRecord {
                index,
                reason,
            })?;
            serde_json::from_value(value).map_err(|e| SnapshotError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn check_record_keys(value: &Value) -> Result<(), String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "not a JSON object".to_string())?;
    if !obj.contains_key("time") {
        return Err("missing time".into());
    }
    if let Some(key) = obj
        .keys()
        .find(|k| *k != "time" && !PAYLOAD_KEYS.contains(&k.as_str()))
    {
        return Err(format!("unexpected key {key:?}"));
    }
    match PAYLOAD_KEYS.iter().filter(|k| obj.contains_key(**k)).count() {
        1 => Ok(()),
        0 => Err("missing payload".into()),
        _ => Err("more than one payload".into()),
    }
}

/// Counts and time span of a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotSummary {
    pub spectra: usize,
    pub sdr: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub acc_cnt_range: Option<(u64, u64)>,
}

pub fn summarize(records: &[ObservationRecord]) -> SnapshotSummary {
    let mut summary = SnapshotSummary {
        first: records.iter().map(|r| r.time).min(),
        last: records.iter().map(|r| r.time).max(),
        ..Default::default()
    };

    for record in records {
        match &record.payload {
            Payload::Spectra(reading) => {
                summary.spectra += 1;
                if let Some(cnt) = reading.acc_cnt() {
                    summary.acc_cnt_range = Some(match summary.acc_cnt_range {
                        Some((lo, hi)) => (lo.min(cnt), hi.max(cnt)),
                        None => (cnt, cnt),
                    });
                }
            }
            Payload::Sdr(_) => summary.sdr += 1,
        }
    }

    summary
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} records ({} spectra, {} sdr)",
            self.spectra + self.sdr,
            self.spectra,
            self.sdr
        )?;
        if let (Some(first), Some(last)) = (self.first, self.last) {
            writeln!(
                f,
                "  span: {} .. {} ({}s)",
                first.to_rfc3339(),
                last.to_rfc3339(),
                (last - first).num_seconds()
            )?;
        }
        if let Some((lo, hi)) = self.acc_cnt_range {
            writeln!(f, "  acc_cnt: {} .. {}", lo, hi)?;
        }
        Ok(())
    }
}
