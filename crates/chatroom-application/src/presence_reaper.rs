//! Presence reaper.
//!
//! Periodically scans the participant registry, evicts everyone whose last
//! heartbeat is older than the liveness deadline, and announces each eviction
//! in the message log.
//!
//! The staleness decision is taken on a snapshot at the start of the sweep
//! and is authoritative for that sweep: a heartbeat that lands between the
//! snapshot and the removal does not save the participant. A silent
//! participant is therefore gone within `deadline + tick` of its last
//! heartbeat, not exactly at `deadline`.

use chatroom_core::clock::Clock;
use chatroom_core::config::PresenceSettings;
use chatroom_core::error::{ChatError, Result};
use chatroom_core::message::{LEFT_TEXT, MessageDraft, MessageRepository};
use chatroom_core::participant::ParticipantRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Phase of the reaper loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaperState {
    /// Waiting for the next tick
    Idle,
    /// Evicting stale participants
    Sweeping,
    /// Cancelled; no further ticks will run
    Stopped,
}

/// Observable status published by a running reaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperStatus {
    pub state: ReaperState,
    /// Sweeps finished since start, including failed ones
    pub completed_sweeps: u64,
}

/// Outcome of one sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Participants removed and announced
    pub evicted: Vec<String>,
    /// Stale participants that could not be fully processed
    pub failed: Vec<(String, ChatError)>,
}

/// Evicts participants that stopped sending heartbeats.
pub struct PresenceReaper {
    participant_repository: Arc<dyn ParticipantRepository>,
    message_repository: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
    settings: PresenceSettings,
}

impl PresenceReaper {
    pub fn new(
        participant_repository: Arc<dyn ParticipantRepository>,
        message_repository: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
        settings: PresenceSettings,
    ) -> Self {
        Self {
            participant_repository,
            message_repository,
            clock,
            settings,
        }
    }

    /// Runs a single sweep.
    ///
    /// For each stale participant the registry removal happens first; the
    /// departure message is appended only if that removal actually deleted
    /// the entry, so a participant that left concurrently is never reported
    /// twice.
    ///
    /// # Errors
    ///
    /// Returns an error only if the registry snapshot cannot be taken.
    /// Per-participant failures are collected in the report and retried on
    /// the next sweep where possible.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let snapshot = self.participant_repository.list_all().await?;
        let now = self.clock.now();
        let deadline = self.settings.liveness_deadline();

        let mut report = SweepReport::default();
        for participant in snapshot.into_iter().filter(|p| p.is_stale(now, deadline)) {
            let name = participant.name;
            match self.participant_repository.remove(&name).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!(
                        target: "presence_reaper",
                        "Could not remove stale participant '{}': {}",
                        name,
                        e
                    );
                    report.failed.push((name, e));
                    continue;
                }
            }

            let departure =
                MessageDraft::status(&name, LEFT_TEXT, self.clock.format_time(self.clock.now()));
            match self.message_repository.append(departure).await {
                Ok(_) => {
                    tracing::info!(target: "presence_reaper", "Evicted '{}'", name);
                    report.evicted.push(name);
                }
                Err(e) => {
                    tracing::error!(
                        target: "presence_reaper",
                        "Evicted '{}' but the departure message was not stored: {}",
                        name,
                        e
                    );
                    report.failed.push((name, e));
                }
            }
        }

        Ok(report)
    }

    /// Starts the periodic loop on the current tokio runtime.
    pub fn spawn(self) -> ReaperHandle {
        self.spawn_with_cancellation(CancellationToken::new())
    }

    /// Starts the periodic loop, stopping when `cancel` is cancelled.
    ///
    /// The first sweep runs one full interval after start. Cancellation is
    /// observed between sweeps; a sweep in progress always runs to the end.
    pub fn spawn_with_cancellation(self, cancel: CancellationToken) -> ReaperHandle {
        let (status_tx, status_rx) = watch::channel(ReaperStatus {
            state: ReaperState::Idle,
            completed_sweeps: 0,
        });
        let period = self.settings.tick_interval().max(Duration::from_millis(1));
        let reaper = self;
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let Some(first_tick) = Instant::now().checked_add(period) else {
                tracing::error!(
                    target: "presence_reaper",
                    "Tick interval of {}s is out of range, reaper not started",
                    reaper.settings.tick_interval_secs
                );
                status_tx.send_modify(|status| status.state = ReaperState::Stopped);
                return;
            };
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                target: "presence_reaper",
                "Reaper started ({}s interval, {}s deadline)",
                reaper.settings.tick_interval_secs,
                reaper.settings.liveness_deadline_secs
            );

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                status_tx.send_modify(|status| status.state = ReaperState::Sweeping);
                tracing::debug!(target: "presence_reaper", "Tick - sweeping registry");

                match reaper.sweep().await {
                    Ok(report) if !report.evicted.is_empty() || !report.failed.is_empty() => {
                        tracing::debug!(
                            target: "presence_reaper",
                            "Sweep done: {} evicted, {} failed",
                            report.evicted.len(),
                            report.failed.len()
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(target: "presence_reaper", "Sweep failed: {}", e);
                    }
                }

                status_tx.send_modify(|status| {
                    status.state = ReaperState::Idle;
                    status.completed_sweeps += 1;
                });
            }

            status_tx.send_modify(|status| status.state = ReaperState::Stopped);
            tracing::info!(target: "presence_reaper", "Reaper stopped");
        });

        ReaperHandle {
            cancel,
            status: status_rx,
            task,
        }
    }
}

/// Control handle for a running reaper.
pub struct ReaperHandle {
    cancel: CancellationToken,
    status: watch::Receiver<ReaperStatus>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Returns the latest published status.
    pub fn status(&self) -> ReaperStatus {
        *self.status.borrow()
    }

    /// Returns a receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<ReaperStatus> {
        self.status.clone()
    }

    /// Waits until at least `count` sweeps have finished.
    pub async fn wait_for_sweeps(&self, count: u64) -> ReaperStatus {
        let mut status = self.status.clone();
        if status.wait_for(|s| s.completed_sweeps >= count).await.is_err() {
            tracing::debug!(target: "presence_reaper", "Reaper exited before {} sweeps", count);
        }
        *status.borrow()
    }

    /// Stops scheduling ticks and waits for the loop to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(target: "presence_reaper", "Reaper task ended abnormally: {}", e);
        }
    }
}
