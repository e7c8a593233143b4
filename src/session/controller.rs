use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinSet;

use super::loops::{
    run_pointing_loop, run_sdr_loop, run_snapshot_loop, run_spectrometer_loop, save,
    LoopIntervals,
};
use super::params::{ParamOverrides, SessionParams};
use super::prompt::{gather, InputError, Prompter};
use super::status::{LoopKind, LoopState, StatusBoard};
use crate::abort::{Termination, TerminationReason};
use crate::coord::{utc_now, AltAz, GroundStation};
use crate::hardware::Hardware;
use crate::observation::{ObservationLog, SnapshotWriter};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub intervals: LoopIntervals,
    /// How long to wait for loops to notice termination before giving up.
    pub shutdown_grace: Duration,
    pub output: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            intervals: LoopIntervals::default(),
            shutdown_grace: Duration::from_secs(6),
            output: PathBuf::from("observations.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub reason: TerminationReason,
    pub records: usize,
    pub final_snapshot: Option<usize>,
    pub loops: BTreeMap<LoopKind, LoopState>,
    pub output: PathBuf,
}

impl SessionReport {
    pub fn failed_loops(&self) -> impl Iterator<Item = (&LoopKind, &LoopState)> {
        self.loops.iter().filter(|(_, state)| state.is_error())
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session ended ({})", self.reason)?;
        for (kind, state) in &self.loops {
            writeln!(f, "  {:<12} {}", kind.to_string(), state)?;
        }
        match self.final_snapshot {
            Some(count) => write!(
                f,
                "  {} records saved to {}",
                count,
                self.output.display()
            ),
            None => write!(
                f,
                "  {} records collected, final save to {} failed",
                self.records,
                self.output.display()
            ),
        }
    }
}

/// One observation run: a fixed target, fixed parameters, four loops.
pub struct Session {
    hardware: Hardware,
    target: AltAz,
    params: SessionParams,
    settings: SessionSettings,
    observations: ObservationLog,
}

impl Session {
    pub fn new(
        hardware: Hardware,
        target: AltAz,
        params: SessionParams,
        settings: SessionSettings,
    ) -> Self {
        Self {
            hardware,
            target,
            params,
            settings,
            observations: ObservationLog::new(),
        }
    }

    /// Asks for whatever `overrides` leaves open and fixes the target at
    /// the current time. An invalid answer returns before any hardware is
    /// touched or any file is written.
    pub fn from_prompts<R: BufRead, W: Write>(
        prompter: &mut Prompter<R, W>,
        overrides: &ParamOverrides,
        station: &GroundStation,
        hardware: Hardware,
        settings: SessionSettings,
    ) -> Result<Self, InputError> {
        let (target, params) = gather(prompter, overrides)?;
        let target = target.resolve(utc_now(), station);
        Ok(Self::new(hardware, target, params, settings))
    }

    #[allow(dead_code)]
    pub fn observations(&self) -> &ObservationLog {
        &self.observations
    }

    /// Runs all loops until the duration elapses or `interrupt` resolves,
    /// then raises termination, waits for the loops within the grace
    /// period and writes a final snapshot.
    pub async fn run<F>(&self, interrupt: F) -> SessionReport
    where
        F: Future<Output = ()>,
    {
        let termination = Termination::new();
        let board = StatusBoard::default();
        let writer = SnapshotWriter::new(self.settings.output.clone());
        let intervals = self.settings.intervals;
        let mut tasks = JoinSet::new();

        log::info!(
            "Starting session: target Alt {:.2} Az {:.2}, {} x {} samples, {:?}",
            self.target.altitude_deg,
            self.target.azimuth_deg,
            self.params.nblocks,
            self.params.nsamples,
            self.params.duration
        );

        spawn_loop(
            &mut tasks,
            &board,
            LoopKind::Pointing,
            run_pointing_loop(
                self.hardware.pointer.clone(),
                self.target,
                intervals.pointing,
                termination.clone(),
            ),
        );
        spawn_loop(
            &mut tasks,
            &board,
            LoopKind::Spectrometer,
            run_spectrometer_loop(
                self.hardware.spectrometer.clone(),
                self.params.duration,
                intervals.spectrometer,
                self.observations.clone(),
                termination.clone(),
            ),
        );
        spawn_loop(
            &mut tasks,
            &board,
            LoopKind::Sdr,
            run_sdr_loop(
                self.hardware.sdr.clone(),
                self.params,
                intervals.sdr,
                self.observations.clone(),
                termination.clone(),
            ),
        );
        spawn_loop(
            &mut tasks,
            &board,
            LoopKind::Snapshot,
            run_snapshot_loop(
                writer.clone(),
                self.observations.clone(),
                intervals.snapshot,
                termination.clone(),
            ),
        );

        let reason = tokio::select! {
            _ = tokio::time::sleep(self.params.duration) => TerminationReason::DurationElapsed,
            _ = interrupt => TerminationReason::Interrupted,
        };
        match reason {
            TerminationReason::DurationElapsed => {
                log::info!("Time duration reached, waiting for last block to complete...")
            }
            TerminationReason::Interrupted => log::warn!("Terminating data collection..."),
        }
        termination.trigger(reason);

        let drain = async { while tasks.join_next().await.is_some() {} };
        let drained = tokio::time::timeout(self.settings.shutdown_grace, drain).await;
        if drained.is_err() {
            log::warn!(
                "Loops still busy after {:?}, abandoning them",
                self.settings.shutdown_grace
            );
            tasks.abort_all();
        }

        let final_snapshot = save(&writer, &self.observations).await;
        let report = SessionReport {
            reason,
            records: self.observations.len(),
            final_snapshot,
            loops: board.states(),
            output: self.settings.output.clone(),
        };
        for (kind, state) in report.failed_loops() {
            log::warn!("{} loop ended early: {}", kind, state);
        }
        log::info!("Data collection completed.");
        report
    }
}

fn spawn_loop<F>(tasks: &mut JoinSet<()>, board: &StatusBoard, kind: LoopKind, run: F)
where
    F: Future<Output = LoopState> + Send + 'static,
{
    board.set(kind, LoopState::Running);
    let board = board.clone();
    tasks.spawn(async move {
        let state = run.await;
        log::debug!("{} loop {}", kind, state);
        board.set(kind, state);
    });
}
