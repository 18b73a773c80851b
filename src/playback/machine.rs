//! Playback finite state machine.
//!
//! One owned [`PlaybackStateMachine`] holds the current [`PlaybackState`]. Every change goes
//! through [`PlaybackStateMachine::transition`], which only accepts the edges of the transition
//! table and notifies listeners synchronously, in registration order, with `(new, previous)`.
//! Anything outside the table is a silent no-op.

use std::sync::mpsc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing painted yet (or everything dissolved).
    #[default]
    Empty,
    /// Filling.
    Forward,
    ForwardPaused,
    /// Clearing.
    Reverse,
    ReversePaused,
    /// Fully painted.
    Done,
}

impl PlaybackState {
    pub const ALL: [Self; 6] = [
        Self::Empty,
        Self::Forward,
        Self::ForwardPaused,
        Self::Reverse,
        Self::ReversePaused,
        Self::Done,
    ];

    /// Whether the feedback loop should tick in this state.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Forward | Self::Reverse)
    }

    /// Whether a new pointer stroke may paint.
    pub fn accepts_strokes(self) -> bool {
        matches!(self, Self::Empty | Self::Forward | Self::ForwardPaused)
    }
}

/// User and system events that may move playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackTrigger {
    /// A pointer stroke started.
    Stroke,
    TogglePlayPause,
    ToggleDirection,
    /// Completion worker saw a fully opaque canvas.
    PaintComplete,
    /// Completion worker saw a fully transparent canvas.
    DissolveComplete,
    /// The viewport grew and may have uncovered unpainted area.
    ViewportGrew,
}

impl PlaybackTrigger {
    pub const ALL: [Self; 6] = [
        Self::Stroke,
        Self::TogglePlayPause,
        Self::ToggleDirection,
        Self::PaintComplete,
        Self::DissolveComplete,
        Self::ViewportGrew,
    ];
}

/// Target of `trigger` from `from`, or `None` when the pair is not in the table.
pub fn target_for(from: PlaybackState, trigger: PlaybackTrigger) -> Option<PlaybackState> {
    use PlaybackState as S;
    use PlaybackTrigger as T;

    match (trigger, from) {
        (T::Stroke, S::Empty) => Some(S::Forward),

        (T::TogglePlayPause, S::Forward) => Some(S::ForwardPaused),
        (T::TogglePlayPause, S::ForwardPaused) => Some(S::Forward),
        (T::TogglePlayPause, S::Reverse) => Some(S::ReversePaused),
        (T::TogglePlayPause, S::ReversePaused) => Some(S::Reverse),

        (T::ToggleDirection, S::Forward | S::Done) => Some(S::Reverse),
        (T::ToggleDirection, S::ForwardPaused) => Some(S::ReversePaused),
        (T::ToggleDirection, S::Reverse) => Some(S::Forward),
        (T::ToggleDirection, S::ReversePaused) => Some(S::ForwardPaused),

        (T::PaintComplete, S::Forward) => Some(S::Done),
        (T::DissolveComplete, S::Reverse) => Some(S::Empty),
        (T::ViewportGrew, S::Done) => Some(S::Forward),

        _ => None,
    }
}

/// Whether `from -> to` is an edge of the transition table.
pub fn is_legal_edge(from: PlaybackState, to: PlaybackState) -> bool {
    PlaybackTrigger::ALL
        .iter()
        .any(|&t| target_for(from, t) == Some(to))
}

/// Change notification delivered to channel subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub new: PlaybackState,
    pub previous: PlaybackState,
}

/// Handle returned by [`PlaybackStateMachine::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(PlaybackState, PlaybackState)>;

pub struct PlaybackStateMachine {
    current: PlaybackState,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaybackStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackStateMachine")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self {
            current: PlaybackState::Empty,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn current(&self) -> PlaybackState {
        self.current
    }

    /// Move to `target` if `current -> target` is a table edge.
    ///
    /// Returns `false` (and notifies nobody) when the target equals the current state or the edge
    /// is not in the table.
    pub fn transition(&mut self, target: PlaybackState) -> bool {
        let previous = self.current;
        if target == previous || !is_legal_edge(previous, target) {
            return false;
        }

        self.current = target;
        tracing::debug!(?previous, new = ?target, "playback state changed");
        for (_, listener) in &mut self.listeners {
            listener(target, previous);
        }
        true
    }

    /// Resolve `trigger` through the table and transition. Returns the new state on change.
    pub fn apply(&mut self, trigger: PlaybackTrigger) -> Option<PlaybackState> {
        let target = target_for(self.current, trigger)?;
        self.transition(target).then_some(target)
    }

    /// Register a listener called with `(new, previous)` after each change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(PlaybackState, PlaybackState) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Subscribe through a channel; changes are queued until the receiver drains them.
    ///
    /// The listener stays registered after the receiver is dropped but sends become no-ops.
    pub fn subscribe_channel(&mut self) -> (ListenerId, mpsc::Receiver<StateChange>) {
        let (tx, rx) = mpsc::channel();
        let id = self.subscribe(move |new, previous| {
            let _ = tx.send(StateChange { new, previous });
        });
        (id, rx)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/machine.rs"]
mod tests;
