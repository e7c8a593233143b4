//! Narrow interfaces to the telescope, spectrometer and SDR drivers.
//!
//! All calls are blocking; the session runs them on the blocking thread
//! pool, outside of any lock.

mod command;
mod error;
mod sim;

use std::sync::Arc;

use serde::Deserialize;

use crate::observation::{SdrCapture, SpectrometerReading};

pub use command::{CommandPointer, CommandSdr, CommandSpectrometer};
pub use error::HardwareError;
pub use sim::{SimulatedInterferometer, SimulatedSdr, SimulatedSpectrometer};

pub trait Pointer: Send + Sync {
    fn point(&self, altitude_deg: f64, azimuth_deg: f64) -> Result<(), HardwareError>;
}

pub trait Spectrometer: Send + Sync {
    /// Returns the latest reading. It carries `acc_cnt` only when an
    /// integration newer than `prev_cnt` is available.
    fn read_data(&self, prev_cnt: Option<u64>) -> Result<SpectrometerReading, HardwareError>;
}

pub trait SdrCapturer: Send {
    fn capture_data(&mut self, nsamples: usize, nblocks: usize)
        -> Result<SdrCapture, HardwareError>;
}

/// Opens the SDR dongle. A session opens exactly one handle.
pub trait SdrOpener: Send + Sync {
    fn open(&self) -> Result<Box<dyn SdrCapturer>, HardwareError>;
}

#[derive(Clone)]
pub struct Hardware {
    pub pointer: Arc<dyn Pointer>,
    pub spectrometer: Arc<dyn Spectrometer>,
    pub sdr: Arc<dyn SdrOpener>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum HardwareConfig {
    #[default]
    Simulated,
    Command {
        pointer_cmd: String,
        spectrometer_cmd: String,
        sdr_cmd: String,
    },
}

impl Hardware {
    pub fn from_config(config: &HardwareConfig) -> Self {
        match config {
            HardwareConfig::Simulated => Self {
                pointer: Arc::new(SimulatedInterferometer::new()),
                spectrometer: Arc::new(SimulatedSpectrometer::new()),
                sdr: Arc::new(SimulatedSdr::new()),
            },
            HardwareConfig::Command {
                pointer_cmd,
                spectrometer_cmd,
                sdr_cmd,
            } => Self {
                pointer: Arc::new(CommandPointer::new(pointer_cmd.clone())),
                spectrometer: Arc::new(CommandSpectrometer::new(spectrometer_cmd.clone())),
                sdr: Arc::new(CommandSdr::new(sdr_cmd.clone())),
            },
        }
    }
}
