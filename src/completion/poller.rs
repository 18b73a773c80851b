use crate::codec::pixels::PixelBuffer;
use crate::completion::detector::CompletionMode;
use crate::completion::worker::{CompletionVerdict, CompletionWorker};
use crate::foundation::error::PixelspreadResult;
use crate::playback::machine::{PlaybackState, PlaybackStateMachine, PlaybackTrigger};
use std::time::{Duration, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Counters for the polling loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    pub submitted: u64,
    pub verdicts_applied: u64,
    pub verdicts_discarded: u64,
}

/// Caller-side driving loop for the completion worker.
///
/// Each playback change (or resize) starts a new generation: pending polls are dropped, the
/// worker's cursors are reset and any verdict still in flight is discarded on arrival. While the
/// state is running, at most one check is outstanding and a new one is submitted `interval` after
/// the previous incomplete verdict.
#[derive(Debug)]
pub struct CompletionPoller {
    interval: Duration,
    generation: u64,
    watching: Option<CompletionMode>,
    outstanding: bool,
    next_poll_at: Option<Instant>,
    stats: PollStats,
}

fn mode_for_state(state: PlaybackState) -> Option<CompletionMode> {
    match state {
        PlaybackState::Forward => Some(CompletionMode::Paint),
        PlaybackState::Reverse => Some(CompletionMode::Dissolve),
        _ => None,
    }
}

fn trigger_for_mode(mode: CompletionMode) -> PlaybackTrigger {
    match mode {
        CompletionMode::Paint => PlaybackTrigger::PaintComplete,
        CompletionMode::Dissolve => PlaybackTrigger::DissolveComplete,
    }
}

impl CompletionPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            watching: None,
            outstanding: false,
            next_poll_at: None,
            stats: PollStats::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn watching(&self) -> Option<CompletionMode> {
        self.watching
    }

    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    /// Start a new generation for `state`. Polling begins immediately if the state is running.
    pub fn restart(
        &mut self,
        worker: &CompletionWorker,
        state: PlaybackState,
        now: Instant,
    ) -> PixelspreadResult<()> {
        self.generation += 1;
        self.outstanding = false;
        self.watching = mode_for_state(state);
        self.next_poll_at = self.watching.map(|_| now);
        worker.reset()?;
        tracing::trace!(generation = self.generation, ?state, "completion polling restarted");
        Ok(())
    }

    /// Drain verdicts, apply a fresh complete one, and submit the next check when due.
    ///
    /// `snapshot` is only called when a check is actually submitted. Returns the state entered
    /// because of a verdict, if any.
    pub fn pump(
        &mut self,
        worker: &CompletionWorker,
        machine: &mut PlaybackStateMachine,
        now: Instant,
        snapshot: impl FnOnce() -> PixelBuffer,
    ) -> PixelspreadResult<Option<PlaybackState>> {
        while let Some(verdict) = worker.try_recv()? {
            if let Some(entered) = self.accept(verdict, machine, now) {
                return Ok(Some(entered));
            }
        }

        let Some(mode) = self.watching else {
            return Ok(None);
        };
        let due = self.next_poll_at.is_some_and(|at| now >= at);
        if self.outstanding || !due {
            return Ok(None);
        }

        worker.submit_check(mode, self.generation, snapshot())?;
        self.outstanding = true;
        self.next_poll_at = None;
        self.stats.submitted += 1;
        Ok(None)
    }

    /// Block until the outstanding check of the current generation answers or `timeout` passes.
    ///
    /// Headless drivers call this after [`Self::pump`] so verdicts land in a reproducible frame.
    pub fn settle(
        &mut self,
        worker: &CompletionWorker,
        machine: &mut PlaybackStateMachine,
        now: Instant,
        timeout: Duration,
    ) -> PixelspreadResult<Option<PlaybackState>> {
        let deadline = Instant::now() + timeout;
        while self.outstanding {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                tracing::warn!(generation = self.generation, "completion check did not settle");
                break;
            }
            let Some(verdict) = worker.recv_timeout(left)? else {
                continue;
            };
            if let Some(entered) = self.accept(verdict, machine, now) {
                return Ok(Some(entered));
            }
        }
        Ok(None)
    }

    fn accept(
        &mut self,
        verdict: CompletionVerdict,
        machine: &mut PlaybackStateMachine,
        now: Instant,
    ) -> Option<PlaybackState> {
        if verdict.generation == self.generation {
            self.outstanding = false;
        }
        let current_mode = mode_for_state(machine.current());
        if verdict.generation != self.generation || current_mode != Some(verdict.mode) {
            self.stats.verdicts_discarded += 1;
            tracing::trace!(?verdict, "stale completion verdict discarded");
            return None;
        }

        if !verdict.complete {
            self.next_poll_at = Some(now + self.interval);
            return None;
        }

        self.stats.verdicts_applied += 1;
        self.watching = None;
        let entered = machine.apply(trigger_for_mode(verdict.mode));
        tracing::info!(mode = ?verdict.mode, ?entered, "completion detected");
        entered
    }
}

impl Default for CompletionPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/completion/poller.rs"]
mod tests;
