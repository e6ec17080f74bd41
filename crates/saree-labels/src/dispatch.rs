//! # Print Dispatch
//!
//! Hands a rendered document to a print surface and prints it once every
//! embedded image has settled.
//!
//! ## Dispatch Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Dispatcher::dispatch                            │
//! │                                                                         │
//! │  1. host.open_surface() ──── None ────► DispatchError::PopupBlocked    │
//! │            │                            (reported at once, no retry)    │
//! │            ▼                                                            │
//! │  2. surface.write_document(html)        complete, self-contained HTML  │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  3. wait                                                               │
//! │     ├── 0 images ──► sleep(fallback_delay)                             │
//! │     └── N images ──► LoadBarrier: N × ImageLoadEvent                   │
//! │                      (Loaded or Failed, each resolves one slot)        │
//! │                      ├── channel closed early ──► SurfaceClosed        │
//! │                      └── watchdog (optional)  ──► LoadTimeout          │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  4. surface.print() ──► PrintReceipt                                   │
//! │                                                                         │
//! │  After step 4 the host owns the job. There is no cancel path back.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Printing before raster images finish decoding produces blank boxes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DispatchError, DispatchResult};
use crate::template::{RenderedHtml, DEFAULT_FALLBACK_DELAY_MS};

// =============================================================================
// Events & Receipts
// =============================================================================

/// How one embedded image finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed(String),
}

/// Reported by a surface for each embedded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLoadEvent {
    /// Position of the image in document order.
    pub index: usize,
    pub outcome: LoadOutcome,
}

impl ImageLoadEvent {
    pub fn loaded(index: usize) -> Self {
        Self {
            index,
            outcome: LoadOutcome::Loaded,
        }
    }

    pub fn failed(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            outcome: LoadOutcome::Failed(reason.into()),
        }
    }
}

/// Proof that a document was handed to the printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintReceipt {
    pub job_id: Uuid,
    /// Where the host put the job, when it is file-backed.
    pub path: Option<PathBuf>,
    pub image_count: usize,
    pub printed_at: DateTime<Utc>,
}

// =============================================================================
// Host Traits
// =============================================================================

/// Something that can open print surfaces (a browser, a spool directory).
pub trait PrintHost {
    type Surface: PrintSurface;

    /// Opens a fresh surface. `None` means the host refused.
    fn open_surface(&self) -> Option<Self::Surface>;
}

/// One open print window.
pub trait PrintSurface: Send {
    /// Writes the complete document.
    fn write_document(&mut self, html: &RenderedHtml) -> DispatchResult<()>;

    /// Load events for the images of the written document. The channel
    /// closes when the surface will report nothing further.
    fn image_events(&mut self) -> mpsc::Receiver<ImageLoadEvent>;

    /// Invokes the print command.
    fn print(self) -> DispatchResult<PrintReceipt>
    where
        Self: Sized;
}

// =============================================================================
// Load Barrier
// =============================================================================

/// Counts image load events until every image has reported once.
#[derive(Debug, Clone)]
pub struct LoadBarrier {
    settled: Vec<bool>,
    loaded: usize,
    failed: usize,
}

/// What the barrier saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
}

impl LoadBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            settled: vec![false; expected],
            loaded: 0,
            failed: 0,
        }
    }

    pub fn expected(&self) -> usize {
        self.settled.len()
    }

    pub fn pending(&self) -> usize {
        self.expected() - self.loaded - self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }

    /// Records one event. Repeats and unknown indices are ignored.
    /// Returns true once every image has reported.
    pub fn record(&mut self, event: &ImageLoadEvent) -> bool {
        match self.settled.get_mut(event.index) {
            Some(slot) if !*slot => {
                *slot = true;
                match &event.outcome {
                    LoadOutcome::Loaded => self.loaded += 1,
                    LoadOutcome::Failed(reason) => {
                        warn!(index = event.index, reason = %reason, "Label image failed to load");
                        self.failed += 1;
                    }
                }
            }
            Some(_) => debug!(index = event.index, "Duplicate image load event"),
            None => warn!(index = event.index, "Load event for unknown image"),
        }
        self.is_complete()
    }

    /// Waits until every image has reported.
    pub async fn wait(
        &mut self,
        events: &mut mpsc::Receiver<ImageLoadEvent>,
    ) -> DispatchResult<LoadSummary> {
        while !self.is_complete() {
            match events.recv().await {
                Some(event) => {
                    self.record(&event);
                }
                None => return Err(DispatchError::SurfaceClosed),
            }
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            loaded: self.loaded,
            failed: self.failed,
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Timing for the wait step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Wait before printing a document with no images.
    pub fallback_delay: Duration,
    /// Give up on images after this long. `None` waits indefinitely.
    pub load_timeout: Option<Duration>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            fallback_delay: Duration::from_millis(DEFAULT_FALLBACK_DELAY_MS),
            load_timeout: None,
        }
    }
}

/// Drives one print job at a time through a [`PrintHost`].
#[derive(Debug)]
pub struct Dispatcher<H> {
    host: H,
    options: DispatchOptions,
}

impl<H: PrintHost> Dispatcher<H> {
    pub fn new(host: H, options: DispatchOptions) -> Self {
        Self { host, options }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Opens a surface, writes `html`, waits for its images and prints.
    pub async fn dispatch(&self, html: &RenderedHtml) -> DispatchResult<PrintReceipt> {
        let mut surface = match self.host.open_surface() {
            Some(surface) => surface,
            None => {
                warn!("Print surface could not be opened");
                return Err(DispatchError::PopupBlocked);
            }
        };

        surface.write_document(html)?;
        let mut events = surface.image_events();

        if html.image_count == 0 {
            debug!(delay_ms = self.options.fallback_delay.as_millis() as u64, "No images, using fallback delay");
            tokio::time::sleep(self.options.fallback_delay).await;
        } else {
            let mut barrier = LoadBarrier::new(html.image_count);
            let summary = match self.options.load_timeout {
                None => barrier.wait(&mut events).await?,
                Some(limit) => {
                    let outcome = tokio::time::timeout(limit, barrier.wait(&mut events)).await;
                    match outcome {
                        Ok(result) => result?,
                        Err(_) => {
                            let pending = barrier.pending();
                            warn!(pending, waited_ms = limit.as_millis() as u64, "Image load watchdog fired");
                            return Err(DispatchError::LoadTimeout {
                                waited_ms: limit.as_millis() as u64,
                                pending,
                            });
                        }
                    }
                }
            };
            debug!(loaded = summary.loaded, failed = summary.failed, "All label images settled");
        }

        let receipt = surface.print()?;
        info!(
            job_id = %receipt.job_id,
            images = receipt.image_count,
            "Label document sent to printer"
        );
        Ok(receipt)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
