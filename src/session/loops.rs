use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::params::SessionParams;
use super::status::LoopState;
use crate::abort::Termination;
use crate::coord::{utc_now, AltAz};
use crate::hardware::{HardwareError, Pointer, SdrOpener, Spectrometer};
use crate::observation::{ObservationLog, ObservationRecord, SnapshotWriter};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopIntervals {
    pub pointing: Duration,
    pub spectrometer: Duration,
    pub sdr: Duration,
    pub snapshot: Duration,
}

impl Default for LoopIntervals {
    fn default() -> Self {
        Self {
            pointing: Duration::from_secs(5),
            spectrometer: Duration::from_secs(1),
            sdr: Duration::from_secs(1),
            snapshot: Duration::from_secs(10),
        }
    }
}

/// Sleeps for `interval` or until termination. Returns true when the
/// loop should stop.
async fn pause(termination: &Termination, interval: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => termination.is_set(),
        _ = termination.triggered() => true,
    }
}

/// Runs a driver call on the blocking pool so it never stalls the runtime.
async fn blocking<T, F>(call: F) -> Result<T, HardwareError>
where
    F: FnOnce() -> Result<T, HardwareError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call).await?
}

pub async fn run_pointing_loop(
    pointer: Arc<dyn Pointer>,
    target: AltAz,
    interval: Duration,
    termination: Termination,
) -> LoopState {
    loop {
        if termination.is_set() {
            return LoopState::StoppedOnSignal;
        }

        let driver = pointer.clone();
        let result =
            blocking(move || driver.point(target.altitude_deg, target.azimuth_deg)).await;
        if let Err(e) = result {
            log::error!("Telescope error: {}", e);
            return LoopState::StoppedOnError(e.to_string());
        }
        log::info!(
            "Telescope pointed to Alt: {:.2}, Az: {:.2}",
            target.altitude_deg,
            target.azimuth_deg
        );

        if pause(&termination, interval).await {
            return LoopState::StoppedOnSignal;
        }
    }
}

pub async fn run_spectrometer_loop(
    spectrometer: Arc<dyn Spectrometer>,
    duration: Duration,
    interval: Duration,
    observations: ObservationLog,
    termination: Termination,
) -> LoopState {
    let start = Instant::now();
    let mut prev_cnt = None;

    while start.elapsed() < duration {
        if termination.is_set() {
            return LoopState::StoppedOnSignal;
        }

        let driver = spectrometer.clone();
        let reading = match blocking(move || driver.read_data(prev_cnt)).await {
            Ok(reading) => reading,
            Err(e) => {
                log::error!("Spectrometer error: {}", e);
                return LoopState::StoppedOnError(e.to_string());
            }
        };

        if reading.has_counter() {
            if termination.is_set() {
                return LoopState::StoppedOnSignal;
            }
            prev_cnt = reading.acc_cnt();
            if prev_cnt.is_none() {
                log::debug!("Spectrometer counter is not an integer");
            }
            observations.append(ObservationRecord::spectra(utc_now(), reading));
            log::debug!("Spectrometer integration {:?} recorded", prev_cnt);
        }

        if pause(&termination, interval).await {
            return LoopState::StoppedOnSignal;
        }
    }

    log::info!("Spectrometer finished collecting.");
    LoopState::StoppedOnTimeout
}

pub async fn run_sdr_loop(
    opener: Arc<dyn SdrOpener>,
    params: SessionParams,
    interval: Duration,
    observations: ObservationLog,
    termination: Termination,
) -> LoopState {
    if termination.is_set() {
        return LoopState::StoppedOnSignal;
    }
    let mut sdr = match blocking(move || opener.open()).await {
        Ok(sdr) => sdr,
        Err(e) => {
            log::error!("SDR error: {}", e);
            return LoopState::StoppedOnError(e.to_string());
        }
    };

    let SessionParams {
        nsamples,
        nblocks,
        duration,
    } = params;
    let start = Instant::now();

    while start.elapsed() < duration {
        if termination.is_set() {
            return LoopState::StoppedOnSignal;
        }

        // The handle moves onto the blocking thread and comes back with
        // the result.
        let call = tokio::task::spawn_blocking(move || {
            let result = sdr.capture_data(nsamples, nblocks);
            (sdr, result)
        });
        let (returned, result) = match call.await {
            Ok(pair) => pair,
            Err(e) => {
                let e = HardwareError::from(e);
                log::error!("SDR error: {}", e);
                return LoopState::StoppedOnError(e.to_string());
            }
        };
        sdr = returned;
        let capture = match result {
            Ok(capture) => capture,
            Err(e) => {
                log::error!("SDR error: {}", e);
                return LoopState::StoppedOnError(e.to_string());
            }
        };

        if termination.is_set() {
            return LoopState::StoppedOnSignal;
        }
        observations.append(ObservationRecord::sdr(utc_now(), capture));
        log::debug!("SDR captured {} x {} samples", nblocks, nsamples);

        if pause(&termination, interval).await {
            return LoopState::StoppedOnSignal;
        }
    }

    log::info!("SDR finished collecting.");
    LoopState::StoppedOnTimeout
}

/// Rewrites the snapshot file every `interval` until termination.
/// Write failures are logged and retried on the next tick.
pub async fn run_snapshot_loop(
    writer: SnapshotWriter,
    observations: ObservationLog,
    interval: Duration,
    termination: Termination,
) -> LoopState {
    loop {
        if termination.is_set() {
            return LoopState::StoppedOnSignal;
        }

        save(&writer, &observations).await;

        if pause(&termination, interval).await {
            return LoopState::StoppedOnSignal;
        }
    }
}

/// One snapshot, logged. Returns the number of records written.
pub async fn save(writer: &SnapshotWriter, observations: &ObservationLog) -> Option<usize> {
    let (writer, observations) = (writer.clone(), observations.clone());
    let path = writer.path().display().to_string();
    match tokio::task::spawn_blocking(move || writer.write(&observations)).await {
        Ok(Ok(count)) => {
            log::info!("Data saved successfully ({} records to {}).", count, path);
            Some(count)
        }
        Ok(Err(e)) => {
            log::error!("Error saving data: {}", e);
            None
        }
        Err(e) => {
            log::error!("Error saving data: {}", e);
            None
        }
    }
}
