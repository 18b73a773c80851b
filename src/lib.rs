//! pixelspread renders a self-filling canvas.
//!
//! Pointer strokes seed colored pixels; a double-buffered feedback loop then spreads color to
//! neighboring pixels every frame until the canvas is fully painted, or, run in reverse, dissolves
//! it until nothing is left.
//!
//! # Pieces
//!
//! 1. **Strokes**: [`StrokeRasterizer`] turns pointer samples into a gap-free pixel path whose
//!    color random-walks from step to step.
//! 2. **Feedback loop**: [`FeedbackRenderLoop`] owns a [`RenderTargetPair`] and applies the fixed
//!    stochastic transition ([`paint_pixel`] / [`dissolve_pixel`]) each tick.
//! 3. **Playback**: [`PlaybackStateMachine`] gates painting, pausing and clearing.
//! 4. **Completion**: a [`CompletionWorker`] thread scans snapshots for a fully painted or fully
//!    cleared canvas; [`CompletionPoller`] feeds its verdicts back into playback.
//! 5. **Session**: [`PaintSession`] wires it all together behind pointer, key and resize input and
//!    a per-frame driver. [`run_script`] replays recorded input headlessly.
//!
//! The crate is deterministic for a given [`SessionConfig::seed`] and input sequence, and
//! pixels are straight (non-premultiplied) RGBA8 that are either fully transparent or opaque.
#![forbid(unsafe_code)]

mod codec;
mod completion;
mod config;
mod foundation;
mod input;
mod playback;
mod render;
mod script;
mod session;
mod stroke;

pub use codec::pixels::{PixelBuffer, pack_word, unpack_word};
pub use completion::detector::{CompletionDetector, CompletionMode};
pub use completion::poller::{CompletionPoller, DEFAULT_POLL_INTERVAL, PollStats};
pub use completion::worker::{CompletionVerdict, CompletionWorker, WorkerRequest};
pub use config::SessionConfig;
pub use foundation::core::{Canvas, PixelPos, Rgb8, Rgba8};
pub use foundation::error::{PixelspreadError, PixelspreadResult};
pub use foundation::rng::Rng64;
pub use input::{Dispatched, InputEvent, KeyAction};
pub use playback::machine::{
    ListenerId, PlaybackState, PlaybackStateMachine, PlaybackTrigger, StateChange, is_legal_edge,
    target_for,
};
pub use render::export::{ExportFormat, ensure_parent_dir, export_pixels};
pub use render::feedback::FeedbackRenderLoop;
pub use render::targets::RenderTargetPair;
pub use render::transition::{Direction, TransitionParams, dissolve_pixel, paint_pixel};
pub use script::{FRAME_INTERVAL, InputScript, RunOpts, RunSummary, ScriptStep, run_script};
pub use session::{EXPORT_BASENAME, FrameReport, PaintSession, SessionStats};
pub use stroke::rasterizer::{LineSteps, StrokePath, StrokePixel, StrokeRasterizer};
