//! Runs an [`Engine`] on its own thread at a fixed cadence.
//!
//! The host talks to the engine only through channels: commands go in, reports
//! come out. Commands received while a tick runs wait until the tick finishes.

use crate::{
    clock::ClockSource,
    engine::Engine,
    error::DriverError,
    protocol::{Command, StateReport},
};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Handle to an engine running on a background thread.
///
/// Dropping the handle stops the thread.
pub struct Driver {
    commands: flume::Sender<Command>,
    reports: flume::Receiver<StateReport>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Engine>>,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("pending_reports", &self.reports.len())
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Starts ticking `engine`, reading wall time from `clock`. The first tick
    /// covers one nominal interval, whatever clock the engine was ticked by before.
    pub fn spawn<C>(mut engine: Engine, clock: C) -> Self
    where
        C: ClockSource + Send + 'static,
    {
        engine.reset_clock();
        let (command_tx, command_rx) = flume::unbounded::<Command>();
        let (report_tx, report_rx) = flume::bounded(engine.config.report_buffer);
        let running = Arc::new(AtomicBool::new(true));

        let flag = running.clone();
        let thread = thread::spawn(move || {
            let interval = engine.config.tick_interval();
            log::info!("engine thread started, tick interval {interval:?}");

            while flag.load(Ordering::Acquire) {
                let started = clock.now();

                for command in command_rx.try_iter() {
                    if let Err(error) = engine.apply(command) {
                        log::warn!("dropping command: {error}");
                    }
                }

                let report = engine.tick_at(started);
                match report_tx.try_send(report) {
                    Ok(()) => {}
                    Err(flume::TrySendError::Full(_)) => {
                        log::trace!("host is behind, dropping report for tick {}", engine.frame);
                    }
                    Err(flume::TrySendError::Disconnected(_)) => {
                        log::info!("report receiver dropped, stopping");
                        break;
                    }
                }

                // A slow tick just delays the next one; there is no catch-up.
                let spent = clock.now().saturating_sub(started);
                thread::sleep(interval.saturating_sub(spent));
            }

            log::info!("engine thread stopped after {} ticks", engine.frame);
            engine
        });

        Self {
            commands: command_tx,
            reports: report_rx,
            running,
            thread: Some(thread),
        }
    }

    /// Queues a command for the next tick boundary.
    pub fn send(&self, command: Command) -> Result<(), DriverError> {
        command.validate()?;
        self.commands
            .send(command)
            .map_err(|_| DriverError::Disconnected)
    }

    /// Parses a JSON command and queues it. Malformed commands are logged and
    /// never reach the engine.
    pub fn send_json(&self, text: &str) -> Result<(), DriverError> {
        let command = Command::from_json(text).inspect_err(|error| {
            log::warn!("dropping command: {error}");
        })?;
        self.send(command)
    }

    /// The stream of per-tick reports.
    pub fn reports(&self) -> &flume::Receiver<StateReport> {
        &self.reports
    }

    /// Drains buffered reports and returns the newest one, if any.
    pub fn latest_report(&self) -> Option<StateReport> {
        self.reports.try_iter().last()
    }

    /// Stops the loop after the current tick and hands the engine back.
    pub fn stop(mut self) -> Option<Engine> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<Engine> {
        self.running.store(false, Ordering::Release);
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(engine) => Some(engine),
            Err(_) => {
                log::error!("engine thread panicked");
                None
            }
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
