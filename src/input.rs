//! Host input events as seen by a [`crate::PaintSession`].

/// Keyboard commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    ToggleDirection,
    TogglePlayPause,
    SaveImage,
}

impl KeyAction {
    /// Map a key name (`"d"`, `"KeyD"`, ...) to an action. Saving needs Ctrl or Cmd held.
    pub fn from_key(key: &str, ctrl_or_meta: bool) -> Option<Self> {
        match key {
            "d" | "D" | "KeyD" => Some(Self::ToggleDirection),
            "p" | "P" | "KeyP" => Some(Self::TogglePlayPause),
            "s" | "S" | "KeyS" if ctrl_or_meta => Some(Self::SaveImage),
            _ => None,
        }
    }
}

/// One input event from the host (window, test, or replay script).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
    },
    Resize {
        width: u32,
        height: u32,
    },
}

/// What dispatching an [`InputEvent`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatched {
    Handled,
    /// The event had no effect in the current state (rejected stroke, unmapped key, ...).
    Ignored,
    /// The host should export the canvas.
    SaveRequested,
}

#[cfg(test)]
#[path = "../tests/unit/session/input.rs"]
mod tests;
