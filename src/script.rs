//! Headless input replay.
//!
//! A script is a JSON array of `{ "frame": N, "event": { "type": ... } }` steps. Steps are
//! dispatched right before frame `N` runs, in file order within a frame.

use crate::foundation::error::{PixelspreadError, PixelspreadResult};
use crate::input::{Dispatched, InputEvent};
use crate::playback::machine::PlaybackState;
use crate::session::PaintSession;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};

/// Frame period of the simulated clock (60 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(16_666_667);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    pub frame: u64,
    pub event: InputEvent,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
}

impl InputScript {
    /// Build from steps in any order. Steps of the same frame keep their relative order.
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.frame);
        Self { steps }
    }

    pub fn from_path(path: impl AsRef<Path>) -> PixelspreadResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PixelspreadError::validation(format!("open script JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn from_reader(r: impl Read) -> PixelspreadResult<Self> {
        let steps: Vec<ScriptStep> = serde_json::from_reader(r)
            .map_err(|e| PixelspreadError::serde(format!("parse script JSON: {e}")))?;
        Ok(Self::new(steps))
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Frame of the last step, if any.
    pub fn last_frame(&self) -> Option<u64> {
        self.steps.last().map(|s| s.frame)
    }
}

/// Options for [`run_script`].
#[derive(Clone, Copy, Debug)]
pub struct RunOpts {
    /// Upper bound on frames to run.
    pub max_frames: u64,
    /// Stop once every step was dispatched and playback settled in Done or Empty after leaving
    /// Empty at least once.
    pub until_done: bool,
    /// Longest wait for one completion verdict.
    pub settle_timeout: Duration,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            max_frames: 600,
            until_done: false,
            settle_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_run: u64,
    pub final_state: PlaybackState,
    /// Frames at which a save key was pressed.
    pub save_requests: Vec<u64>,
    /// Events with no effect in the state they arrived in.
    pub events_ignored: u64,
}

/// Replay `script` into `session` on a simulated 60 fps clock starting at `start`.
///
/// Each frame waits for its completion check to answer, so the result only depends on the
/// session seed and the script.
#[tracing::instrument(skip(session, script), fields(steps = script.steps.len()))]
pub fn run_script(
    session: &mut PaintSession,
    script: &InputScript,
    start: Instant,
    opts: &RunOpts,
) -> PixelspreadResult<RunSummary> {
    let mut summary = RunSummary {
        frames_run: 0,
        final_state: session.state(),
        save_requests: Vec::new(),
        events_ignored: 0,
    };
    let mut steps = script.steps.iter().peekable();
    let mut started = session.state() != PlaybackState::Empty;

    for frame in 0..opts.max_frames {
        while let Some(step) = steps.next_if(|s| s.frame <= frame) {
            match session.dispatch(&step.event) {
                Dispatched::Handled => {}
                Dispatched::Ignored => summary.events_ignored += 1,
                Dispatched::SaveRequested => summary.save_requests.push(frame),
            }
        }

        let now = start + FRAME_INTERVAL * u32::try_from(frame).unwrap_or(u32::MAX);
        session.frame(now)?;
        session.sync_completion(now, opts.settle_timeout)?;
        summary.frames_run += 1;

        let state = session.state();
        started |= state != PlaybackState::Empty;
        let settled = matches!(state, PlaybackState::Done | PlaybackState::Empty);
        if opts.until_done && started && settled && steps.peek().is_none() {
            tracing::debug!(frame, ?state, "playback settled");
            break;
        }
    }

    summary.final_state = session.state();
    tracing::info!(
        frames = summary.frames_run,
        state = ?summary.final_state,
        "script replay finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "../tests/unit/script/script.rs"]
mod tests;
