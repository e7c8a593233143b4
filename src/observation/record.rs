use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ACC_CNT: &str = "acc_cnt";

/// One spectrometer poll result, kept exactly as the driver returned it.
/// A new integration is signalled by the presence of the `acc_cnt` key,
/// whatever its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SpectrometerReading {
    pub fields: Map<String, Value>,
}

impl SpectrometerReading {
    pub fn with_count(acc_cnt: u64) -> Self {
        let mut fields = Map::new();
        fields.insert(ACC_CNT.into(), Value::from(acc_cnt));
        Self { fields }
    }

    pub fn has_counter(&self) -> bool {
        self.fields.contains_key(ACC_CNT)
    }

    /// The counter as an integer, if it is one. Integral floats are
    /// accepted; null, negative or fractional values are not.
    pub fn acc_cnt(&self) -> Option<u64> {
        let n = match self.fields.get(ACC_CNT)? {
            Value::Number(n) => n,
            _ => return None,
        };
        n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        })
    }
}

/// Samples returned by the SDR driver, stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SdrCapture(pub Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Spectra(SpectrometerReading),
    Sdr(SdrCapture),
}

impl Payload {
    #[allow(dead_code)]
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Spectra(_) => "spectra",
            Payload::Sdr(_) => "sdr",
        }
    }
}

/// A timestamped entry of the observation log. Serialises as
/// `{"time": ..., "spectra": {...}}` or `{"time": ..., "sdr": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl ObservationRecord {
    pub fn spectra(time: DateTime<Utc>, reading: SpectrometerReading) -> Self {
        Self {
            time,
            payload: Payload::Spectra(reading),
        }
    }

    pub fn sdr(time: DateTime<Utc>, capture: SdrCapture) -> Self {
        Self {
            time,
            payload: Payload::Sdr(capture),
        }
    }
}
