use crate::codec::pixels::PixelBuffer;
use crate::render::transition::Direction;

/// What "complete" means for a scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// Every alpha is 255.
    Paint,
    /// Every packed pixel word is zero.
    Dissolve,
}

impl CompletionMode {
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Paint => Self::Paint,
            Direction::Dissolve => Self::Dissolve,
        }
    }
}

/// Incremental completeness scan with a resumable cursor.
///
/// The cursor is the pixel index of the earliest pixel not yet confirmed complete. Pixels before
/// it are never re-read until [`CompletionDetector::reset`], so repeated polls over a converging
/// canvas amortize to one pass.
#[derive(Clone, Debug)]
pub struct CompletionDetector {
    mode: CompletionMode,
    cursor: usize,
}

impl CompletionDetector {
    pub fn new(mode: CompletionMode) -> Self {
        Self { mode, cursor: 0 }
    }

    pub fn mode(&self) -> CompletionMode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Scan from the cursor. Takes ownership of the buffer; the caller captures a fresh snapshot
    /// for the next check.
    pub fn check_is_complete(&mut self, pixels: PixelBuffer) -> bool {
        let start = self.cursor;
        let first_incomplete = match self.mode {
            CompletionMode::Paint => pixels.alphas_from(start).position(|a| a < 255),
            CompletionMode::Dissolve => pixels.packed_words_from(start).position(|w| w != 0),
        };

        match first_incomplete {
            Some(offset) => {
                self.cursor = start + offset;
                false
            }
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/completion/detector.rs"]
mod tests;
