//! # Spool Host
//!
//! A file-backed [`PrintHost`]: each surface is an HTML file in a spool
//! directory, picked up by whatever drives the printer (a kiosk browser,
//! CUPS, a network share).
//!
//! ## Job Files
//! ```text
//! spool_dir/
//! ├── 3f0c…e1.html.part   ← written, images still being checked
//! └── 9a41…07.html        ← printed (renamed atomically)
//! ```
//!
//! Each embedded data URI is decoded on its own blocking task; the decode
//! result is the image's load event. An unprinted surface removes its
//! `.part` file when dropped.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::barcode::decode_data_uri;
use crate::dispatch::{ImageLoadEvent, PrintHost, PrintReceipt, PrintSurface};
use crate::error::{DispatchError, DispatchResult};
use crate::template::RenderedHtml;

const IMG_SRC: &str = "<img src=\"";

// =============================================================================
// Spool Host
// =============================================================================

/// Opens print surfaces as files under `dir`.
#[derive(Debug, Clone)]
pub struct SpoolHost {
    dir: PathBuf,
    permits: Arc<Semaphore>,
}

impl SpoolHost {
    /// At most `max_open_surfaces` jobs may be open at once; further opens
    /// are refused like a blocked popup.
    pub fn new(dir: impl Into<PathBuf>, max_open_surfaces: usize) -> Self {
        Self {
            dir: dir.into(),
            permits: Arc::new(Semaphore::new(max_open_surfaces)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Surfaces that could still be opened right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl PrintHost for SpoolHost {
    type Surface = SpoolSurface;

    fn open_surface(&self) -> Option<SpoolSurface> {
        let permit = match self.permits.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(dir = ?self.dir, "All spool surfaces are busy");
                return None;
            }
        };

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = ?self.dir, error = %e, "Spool directory unavailable");
            return None;
        }

        let job_id = Uuid::new_v4();
        debug!(%job_id, "Spool surface opened");
        Some(SpoolSurface {
            job_id,
            part_path: self.dir.join(format!("{}.html.part", job_id)),
            final_path: self.dir.join(format!("{}.html", job_id)),
            image_count: 0,
            events: None,
            printed: false,
            _permit: permit,
        })
    }
}

// =============================================================================
// Spool Surface
// =============================================================================

/// One job file in the spool directory.
#[derive(Debug)]
pub struct SpoolSurface {
    job_id: Uuid,
    part_path: PathBuf,
    final_path: PathBuf,
    image_count: usize,
    events: Option<mpsc::Receiver<ImageLoadEvent>>,
    printed: bool,
    _permit: OwnedSemaphorePermit,
}

impl SpoolSurface {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn part_path(&self) -> &Path {
        &self.part_path
    }
}

impl PrintSurface for SpoolSurface {
    fn write_document(&mut self, html: &RenderedHtml) -> DispatchResult<()> {
        std::fs::write(&self.part_path, html.html.as_bytes())
            .map_err(|e| DispatchError::Write(e.to_string()))?;

        let sources = embedded_images(&html.html);
        if sources.len() != html.image_count {
            warn!(
                job_id = %self.job_id,
                expected = html.image_count,
                found = sources.len(),
                "Embedded image count differs from document"
            );
        }
        self.image_count = html.image_count;

        let (tx, rx) = mpsc::channel(sources.len().max(1));
        for (index, src) in sources.into_iter().enumerate() {
            let tx = tx.clone();
            let src = src.to_string();
            tokio::task::spawn_blocking(move || {
                let event = match decode_data_uri(&src) {
                    Ok(_) => ImageLoadEvent::loaded(index),
                    Err(e) => ImageLoadEvent::failed(index, e.to_string()),
                };
                // receiver gone means the job was abandoned
                let _ = tx.blocking_send(event);
            });
        }
        self.events = Some(rx);

        debug!(job_id = %self.job_id, path = ?self.part_path, "Document spooled");
        Ok(())
    }

    fn image_events(&mut self) -> mpsc::Receiver<ImageLoadEvent> {
        match self.events.take() {
            Some(rx) => rx,
            None => {
                let (_, rx) = mpsc::channel(1);
                rx
            }
        }
    }

    fn print(mut self) -> DispatchResult<PrintReceipt> {
        std::fs::rename(&self.part_path, &self.final_path)?;
        self.printed = true;

        info!(job_id = %self.job_id, path = ?self.final_path, "Print job released");
        Ok(PrintReceipt {
            job_id: self.job_id,
            path: Some(self.final_path.clone()),
            image_count: self.image_count,
            printed_at: Utc::now(),
        })
    }
}

impl Drop for SpoolSurface {
    fn drop(&mut self) {
        if !self.printed && self.part_path.exists() {
            debug!(job_id = %self.job_id, "Removing abandoned spool file");
            let _ = std::fs::remove_file(&self.part_path);
        }
    }
}

/// `src` values of every inline `<img>` in document order.
fn embedded_images(html: &str) -> Vec<&str> {
    html.match_indices(IMG_SRC)
        .filter_map(|(start, _)| {
            let rest = &html[start + IMG_SRC.len()..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
