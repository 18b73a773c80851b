//! Frame driver wiring input, playback, the feedback loop and completion detection together.

use crate::codec::pixels::PixelBuffer;
use crate::completion::poller::{CompletionPoller, PollStats};
use crate::completion::worker::CompletionWorker;
use crate::config::SessionConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::PixelspreadResult;
use crate::foundation::math::derive_seed;
use crate::input::{Dispatched, InputEvent, KeyAction};
use crate::playback::machine::{PlaybackState, PlaybackStateMachine, PlaybackTrigger, StateChange};
use crate::render::export::{ExportFormat, export_pixels};
use crate::render::feedback::FeedbackRenderLoop;
use crate::render::transition::Direction;
use crate::stroke::rasterizer::{StrokePath, StrokeRasterizer};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Base file name offered to hosts for saving.
pub const EXPORT_BASENAME: &str = "pixelspread";

/// Session counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub ticks: u64,
    pub strokes_accepted: u64,
    pub strokes_rejected: u64,
    pub pixels_merged: u64,
    /// Resizes actually applied (after coalescing).
    pub resizes: u64,
    pub poll: PollStats,
}

/// Outcome of one [`PaintSession::frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub index: u64,
    /// State after the frame.
    pub state: PlaybackState,
    pub ticked: bool,
    /// State entered because the completion worker reported a finished canvas.
    pub completed: Option<PlaybackState>,
}

/// Single-threaded driver for one canvas.
///
/// Input methods may be called at any time between frames; state changes they cause are picked up
/// by the next [`PaintSession::frame`], which also applies the latest pending resize, ticks the
/// feedback loop while playback is running and pumps the completion worker.
pub struct PaintSession {
    config: SessionConfig,
    machine: PlaybackStateMachine,
    changes: mpsc::Receiver<StateChange>,
    rasterizer: StrokeRasterizer,
    render: FeedbackRenderLoop,
    worker: CompletionWorker,
    poller: CompletionPoller,
    pending_resize: Option<Canvas>,
    stats: SessionStats,
}

impl std::fmt::Debug for PaintSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintSession")
            .field("state", &self.machine.current())
            .field("canvas", &self.render.canvas())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl PaintSession {
    #[tracing::instrument(
        skip(config),
        fields(width = config.width, height = config.height, seed = config.seed)
    )]
    pub fn new(config: SessionConfig) -> PixelspreadResult<Self> {
        config.validate()?;
        let canvas = config.canvas();

        let mut machine = PlaybackStateMachine::new();
        let (_, changes) = machine.subscribe_channel();
        let rasterizer = StrokeRasterizer::new(
            canvas,
            config.stroke_color_variability,
            derive_seed(config.seed, "stroke"),
        );
        let render = FeedbackRenderLoop::new(
            canvas,
            config.transition,
            derive_seed(config.seed, "render"),
        );
        let worker = CompletionWorker::spawn()?;
        let poller = CompletionPoller::new(config.poll_interval());

        tracing::info!("paint session started");
        Ok(Self {
            config,
            machine,
            changes,
            rasterizer,
            render,
            worker,
            poller,
            pending_resize: None,
            stats: SessionStats::default(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.current()
    }

    /// Playback machine, e.g. to register listeners. Direct transitions are picked up next frame.
    pub fn playback_mut(&mut self) -> &mut PlaybackStateMachine {
        &mut self.machine
    }

    /// Current canvas size. A pending resize is not reflected until the next frame.
    pub fn canvas(&self) -> Canvas {
        self.render.canvas()
    }

    pub fn display(&self) -> &PixelBuffer {
        self.render.display()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            poll: self.poller.stats(),
            ..self.stats
        }
    }

    pub fn poll_stats(&self) -> PollStats {
        self.poller.stats()
    }

    /// Begin a stroke. Returns `false` when the current state does not accept strokes.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let state = self.machine.current();
        if !state.accepts_strokes() {
            self.stats.strokes_rejected += 1;
            tracing::debug!(?state, "stroke rejected");
            return false;
        }
        self.machine.apply(PlaybackTrigger::Stroke);
        self.stats.strokes_accepted += 1;

        let path = self.rasterizer.begin(x, y);
        self.merge(&path);
        true
    }

    /// Extend the active stroke. Returns the number of pixels written.
    ///
    /// If playback left a stroke-accepting state since the stroke began, the stroke ends here.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> usize {
        if !self.rasterizer.is_active() {
            return 0;
        }
        if !self.machine.current().accepts_strokes() {
            self.rasterizer.end();
            return 0;
        }
        let path = self.rasterizer.extend(x, y);
        self.merge(&path)
    }

    /// End the active stroke, if any.
    pub fn pointer_up(&mut self) -> bool {
        self.rasterizer.end()
    }

    pub fn handle_key(&mut self, action: KeyAction) -> Dispatched {
        let trigger = match action {
            KeyAction::ToggleDirection => PlaybackTrigger::ToggleDirection,
            KeyAction::TogglePlayPause => PlaybackTrigger::TogglePlayPause,
            KeyAction::SaveImage => return Dispatched::SaveRequested,
        };
        match self.machine.apply(trigger) {
            Some(_) => Dispatched::Handled,
            None => Dispatched::Ignored,
        }
    }

    /// Request a viewport resize. Only the latest request before the next frame is applied.
    /// Zero-sized requests (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let canvas = Canvas::new(width, height);
        if canvas.is_empty() {
            tracing::debug!(width, height, "ignoring zero-sized resize");
            return;
        }
        self.pending_resize = Some(canvas);
    }

    pub fn dispatch(&mut self, event: &InputEvent) -> Dispatched {
        match *event {
            InputEvent::PointerDown { x, y } => handled_if(self.pointer_down(x, y)),
            InputEvent::PointerMove { x, y } => {
                let active = self.rasterizer.is_active();
                self.pointer_move(x, y);
                handled_if(active)
            }
            InputEvent::PointerUp => handled_if(self.pointer_up()),
            InputEvent::Key { ref key, ctrl } => match KeyAction::from_key(key, ctrl) {
                Some(action) => self.handle_key(action),
                None => Dispatched::Ignored,
            },
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                Dispatched::Handled
            }
        }
    }

    /// Run one frame at time `now`.
    #[tracing::instrument(skip(self, now), fields(frame = self.stats.frames))]
    pub fn frame(&mut self, now: Instant) -> PixelspreadResult<FrameReport> {
        let resized = self.apply_pending_resize();
        self.sync_playback(now, resized)?;

        let ticked = match self.machine.current() {
            PlaybackState::Forward => {
                self.render.tick(Direction::Paint);
                true
            }
            PlaybackState::Reverse => {
                self.render.tick(Direction::Dissolve);
                true
            }
            _ => false,
        };
        if ticked {
            self.stats.ticks += 1;
        }

        let render = &self.render;
        let completed = self
            .poller
            .pump(&self.worker, &mut self.machine, now, || render.snapshot())?;
        self.sync_playback(now, false)?;

        let report = FrameReport {
            index: self.stats.frames,
            state: self.machine.current(),
            ticked,
            completed,
        };
        self.stats.frames += 1;
        Ok(report)
    }

    /// Wait for the outstanding completion check (if any) and apply its verdict.
    ///
    /// Interactive hosts never need this; headless runs call it after each frame so that the
    /// frame in which completion is observed does not depend on thread scheduling.
    pub fn sync_completion(
        &mut self,
        now: Instant,
        timeout: Duration,
    ) -> PixelspreadResult<Option<PlaybackState>> {
        // Changes made since the frame start a new generation; the verdict in flight is stale.
        self.sync_playback(now, false)?;
        let entered = self
            .poller
            .settle(&self.worker, &mut self.machine, now, timeout)?;
        self.sync_playback(now, false)?;
        Ok(entered)
    }

    /// Format an export would use right now.
    pub fn export_format(&self) -> ExportFormat {
        ExportFormat::for_state(self.machine.current())
    }

    /// `pixelspread.jpg` once the canvas is done, `pixelspread.png` otherwise.
    pub fn suggested_export_name(&self) -> String {
        format!("{EXPORT_BASENAME}.{}", self.export_format().extension())
    }

    /// Save the display surface. The extension of `path` is replaced by the chosen format's.
    pub fn export_image(&self, path: impl AsRef<Path>) -> PixelspreadResult<PathBuf> {
        let format = self.export_format();
        export_pixels(self.render.snapshot(), path.as_ref(), format)
    }

    fn merge(&mut self, path: &StrokePath) -> usize {
        let written = self.render.merge_stroke(path);
        self.stats.pixels_merged += written as u64;
        written
    }

    fn apply_pending_resize(&mut self) -> bool {
        let Some(canvas) = self.pending_resize.take() else {
            return false;
        };
        let old = self.render.canvas();
        if !self.render.resize(canvas.width, canvas.height) {
            return false;
        }
        self.rasterizer.set_bounds(canvas);
        self.stats.resizes += 1;

        let grew = canvas.width > old.width || canvas.height > old.height;
        if grew && self.machine.current() == PlaybackState::Done {
            self.machine.apply(PlaybackTrigger::ViewportGrew);
        }
        true
    }

    /// Drain playback notifications and restart completion polling when anything changed.
    fn sync_playback(&mut self, now: Instant, force: bool) -> PixelspreadResult<()> {
        let mut changed = force;
        while let Ok(change) = self.changes.try_recv() {
            tracing::debug!(
                previous = ?change.previous,
                new = ?change.new,
                "playback state changed"
            );
            changed = true;
        }
        if !changed {
            return Ok(());
        }
        let state = self.machine.current();
        if !state.accepts_strokes() {
            self.rasterizer.end();
        }
        self.poller.restart(&self.worker, state, now)
    }
}

fn handled_if(handled: bool) -> Dispatched {
    if handled {
        Dispatched::Handled
    } else {
        Dispatched::Ignored
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
