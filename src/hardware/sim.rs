use std::f64::consts::TAU;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use super::{HardwareError, Pointer, SdrCapturer, SdrOpener, Spectrometer};
use crate::observation::{SdrCapture, SpectrometerReading};

const SPECTROMETER_CHANNELS: usize = 64;
const SPECTROMETER_INTEGRATION: Duration = Duration::from_millis(500);
const SDR_TONE_CYCLES_PER_SAMPLE: f64 = 0.05;

/// Stand-in for the interferometer: remembers where it was last pointed.
#[derive(Debug, Default)]
pub struct SimulatedInterferometer {
    position: Mutex<Option<(f64, f64)>>,
}

impl SimulatedInterferometer {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn position(&self) -> Option<(f64, f64)> {
        *self.position.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Pointer for SimulatedInterferometer {
    fn point(&self, altitude_deg: f64, azimuth_deg: f64) -> Result<(), HardwareError> {
        if !(0.0..=90.0).contains(&altitude_deg) {
            return Err(HardwareError::Device(format!(
                "altitude {altitude_deg:.2} outside pointing limits"
            )));
        }
        let azimuth = azimuth_deg.rem_euclid(360.0);
        *self.position.lock().unwrap_or_else(|p| p.into_inner()) = Some((altitude_deg, azimuth));
        Ok(())
    }
}

/// Spectrometer that completes one integration every `integration`.
#[derive(Debug)]
pub struct SimulatedSpectrometer {
    started: Instant,
    integration: Duration,
}

impl Default for SimulatedSpectrometer {
    fn default() -> Self {
        Self::with_integration(SPECTROMETER_INTEGRATION)
    }
}

impl SimulatedSpectrometer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_integration(integration: Duration) -> Self {
        Self {
            started: Instant::now(),
            integration,
        }
    }

    fn current_count(&self) -> u64 {
        let elapsed = self.started.elapsed().as_nanos();
        let step = self.integration.as_nanos().max(1);
        (elapsed / step) as u64
    }
}

impl Spectrometer for SimulatedSpectrometer {
    fn read_data(&self, prev_cnt: Option<u64>) -> Result<SpectrometerReading, HardwareError> {
        let acc_cnt = self.current_count();
        if prev_cnt.is_some_and(|prev| prev >= acc_cnt) {
            return Ok(SpectrometerReading::default());
        }

        // Flat baseline with a line in the middle of the band.
        let centre = SPECTROMETER_CHANNELS as f64 / 2.0;
        let spectrum: Vec<f64> = (0..SPECTROMETER_CHANNELS)
            .map(|ch| {
                let offset = (ch as f64 - centre) / 3.0;
                1.0 + 4.0 * (-0.5 * offset * offset).exp()
            })
            .collect();

        let mut reading = SpectrometerReading::with_count(acc_cnt);
        reading.fields.insert("auto0_real".into(), json!(spectrum));
        reading.fields.insert("nchan".into(), json!(SPECTROMETER_CHANNELS));
        Ok(reading)
    }
}

/// SDR producing a pure tone as interleaved 8-bit I/Q pairs.
#[derive(Debug, Default)]
pub struct SimulatedSdr;

impl SimulatedSdr {
    pub fn new() -> Self {
        Self
    }
}

impl SdrOpener for SimulatedSdr {
    fn open(&self) -> Result<Box<dyn SdrCapturer>, HardwareError> {
        Ok(Box::new(SimulatedSdrHandle { phase_index: 0 }))
    }
}

struct SimulatedSdrHandle {
    phase_index: u64,
}

impl SdrCapturer for SimulatedSdrHandle {
    fn capture_data(
        &mut self,
        nsamples: usize,
        nblocks: usize,
    ) -> Result<SdrCapture, HardwareError> {
        if nsamples == 0 || nblocks == 0 {
            return Err(HardwareError::Device(
                "nsamples and nblocks must be positive".into(),
            ));
        }

        let blocks: Vec<Value> = (0..nblocks)
            .map(|_| {
                let block: Vec<[i8; 2]> = (0..nsamples)
                    .map(|_| {
                        let phase = TAU * SDR_TONE_CYCLES_PER_SAMPLE * self.phase_index as f64;
                        self.phase_index += 1;
                        [
                            (100.0 * phase.cos()).round() as i8,
                            (100.0 * phase.sin()).round() as i8,
                        ]
                    })
                    .collect();
                json!(block)
            })
            .collect();

        Ok(SdrCapture(Value::Array(blocks)))
    }
}
