use crate::codec::pixels::PixelBuffer;
use crate::completion::detector::{CompletionDetector, CompletionMode};
use crate::foundation::error::{PixelspreadError, PixelspreadResult};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Message from the frame driver to the worker thread.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Scan `pixels` (ownership moves to the worker).
    Check {
        mode: CompletionMode,
        generation: u64,
        pixels: PixelBuffer,
    },
    /// Zero both detectors' cursors.
    Reset,
    Shutdown,
}

/// Worker reply to one [`WorkerRequest::Check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionVerdict {
    pub mode: CompletionMode,
    /// Echo of the request generation; the driver drops verdicts from stale generations.
    pub generation: u64,
    pub complete: bool,
    /// Detector cursor after the scan.
    pub cursor: usize,
}

/// Completion detectors running on their own thread.
///
/// The driver never shares memory with the worker: pixel snapshots move in through one channel and
/// verdicts come back through another.
pub struct CompletionWorker {
    tx: mpsc::Sender<WorkerRequest>,
    rx: mpsc::Receiver<CompletionVerdict>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for CompletionWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionWorker")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl CompletionWorker {
    #[tracing::instrument]
    pub fn spawn() -> PixelspreadResult<Self> {
        let (tx, req_rx) = mpsc::channel::<WorkerRequest>();
        let (reply_tx, rx) = mpsc::channel::<CompletionVerdict>();

        let handle = std::thread::Builder::new()
            .name("completion-worker".to_string())
            .spawn(move || run_worker(req_rx, reply_tx))
            .map_err(|e| PixelspreadError::worker(format!("spawn completion worker: {e}")))?;

        tracing::debug!("completion worker started");
        Ok(Self {
            tx,
            rx,
            handle: Some(handle),
        })
    }

    pub fn submit_check(
        &self,
        mode: CompletionMode,
        generation: u64,
        pixels: PixelBuffer,
    ) -> PixelspreadResult<()> {
        self.send(WorkerRequest::Check {
            mode,
            generation,
            pixels,
        })
    }

    pub fn reset(&self) -> PixelspreadResult<()> {
        self.send(WorkerRequest::Reset)
    }

    /// Non-blocking poll for the next verdict.
    pub fn try_recv(&self) -> PixelspreadResult<Option<CompletionVerdict>> {
        match self.rx.try_recv() {
            Ok(v) => Ok(Some(v)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(PixelspreadError::worker(
                "completion worker disconnected unexpectedly",
            )),
        }
    }

    /// Wait up to `timeout` for the next verdict.
    pub fn recv_timeout(&self, timeout: Duration) -> PixelspreadResult<Option<CompletionVerdict>> {
        match self.rx.recv_timeout(timeout) {
            Ok(v) => Ok(Some(v)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(PixelspreadError::worker(
                "completion worker disconnected unexpectedly",
            )),
        }
    }

    fn send(&self, req: WorkerRequest) -> PixelspreadResult<()> {
        self.tx
            .send(req)
            .map_err(|_| PixelspreadError::worker("completion worker is not accepting requests"))
    }
}

impl Drop for CompletionWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("completion worker panicked");
        }
    }
}

fn run_worker(rx: mpsc::Receiver<WorkerRequest>, tx: mpsc::Sender<CompletionVerdict>) {
    let mut paint = CompletionDetector::new(CompletionMode::Paint);
    let mut dissolve = CompletionDetector::new(CompletionMode::Dissolve);

    while let Ok(req) = rx.recv() {
        match req {
            WorkerRequest::Check {
                mode,
                generation,
                pixels,
            } => {
                let detector = match mode {
                    CompletionMode::Paint => &mut paint,
                    CompletionMode::Dissolve => &mut dissolve,
                };
                let complete = detector.check_is_complete(pixels);
                let verdict = CompletionVerdict {
                    mode,
                    generation,
                    complete,
                    cursor: detector.cursor(),
                };
                if tx.send(verdict).is_err() {
                    break;
                }
            }
            WorkerRequest::Reset => {
                paint.reset();
                dissolve.reset();
            }
            WorkerRequest::Shutdown => break,
        }
    }
    tracing::debug!("completion worker stopped");
}

#[cfg(test)]
#[path = "../../tests/unit/completion/worker.rs"]
mod tests;
