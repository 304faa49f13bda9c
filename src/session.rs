//! Frame analysis: detector in, viewport-space detections out.
//!
//! Runs on the single producer thread. Each frame is analysed at most once
//! and released on every path (analysed, empty, no payload, detector error).

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::detect::BarcodeDetector;
use crate::error::ScanFault;
use crate::frame::CameraFrame;
use crate::ingest::FrameSource;
use crate::mapper::ViewportTransform;
use crate::overlay::{Detection, OverlaySurface};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The active set was replaced with this many detections.
    Detected(usize),
    /// Nothing usable found. The active set is left alone.
    Empty,
    /// Recovered locally. The active set is left alone.
    Faulted(ScanFault),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub frames: u64,
    pub detected: u64,
    pub empty: u64,
    pub unavailable: u64,
    pub failed: u64,
}

impl AnalysisStats {
    pub fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Detected(_) => self.detected += 1,
            FrameOutcome::Empty => self.empty += 1,
            FrameOutcome::Faulted(ScanFault::FrameUnavailable { .. }) => self.unavailable += 1,
            FrameOutcome::Faulted(_) => self.failed += 1,
        }
    }
}

pub struct ScanSession<D: BarcodeDetector> {
    detector: D,
    surface: Arc<OverlaySurface>,
}

impl<D: BarcodeDetector> ScanSession<D> {
    pub fn new(detector: D, surface: Arc<OverlaySurface>) -> Self {
        Self { detector, surface }
    }

    pub fn surface(&self) -> &Arc<OverlaySurface> {
        &self.surface
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Analyses one frame and releases it.
    pub fn process_frame(&mut self, frame: CameraFrame) -> FrameOutcome {
        let frame_id = frame.id();
        let geometry = frame.geometry();

        let detected = match frame.view() {
            Some(view) => self.detector.detect(&view),
            None => {
                log::debug!("frame {} skipped: no image payload", frame_id);
                return FrameOutcome::Faulted(ScanFault::FrameUnavailable { frame_id });
            }
        };
        drop(frame);

        let barcodes = match detected {
            Ok(barcodes) => barcodes,
            Err(e) => {
                let fault = ScanFault::DetectionFailure {
                    detector: self.detector.name().to_string(),
                    frame_id,
                    reason: e.to_string(),
                };
                log::error!("barcode scanning failed: {}", fault);
                return FrameOutcome::Faulted(fault);
            }
        };

        // Viewport is read per frame; it changes with device rotation.
        let transform = ViewportTransform::fit_center(&geometry, &self.surface.viewport());
        let now = self.surface.clock().now_millis();
        let detections: Vec<Detection> = barcodes
            .iter()
            .filter_map(|barcode| {
                let bounds = barcode.bounding_box.filter(|b| !b.is_empty())?;
                Some(Detection {
                    rect: transform.apply(bounds.into()),
                    display_text: barcode.display_text().to_string(),
                    category: barcode.value_type.label().to_string(),
                    timestamp_millis: now,
                })
            })
            .collect();

        if detections.is_empty() {
            return FrameOutcome::Empty;
        }
        let count = detections.len();
        self.surface.submit_detections(detections);
        FrameOutcome::Detected(count)
    }

    /// Pulls frames until the source ends or `stop` is raised.
    pub fn run(&mut self, source: &mut dyn FrameSource, stop: &AtomicBool) -> Result<AnalysisStats> {
        self.detector.warm_up()?;
        log::debug!(
            "detector '{}' analysing frames from {}",
            self.detector.name(),
            source.name()
        );
        let mut stats = AnalysisStats::default();
        while !stop.load(Ordering::SeqCst) {
            let Some(frame) = source.next_frame()? else {
                break;
            };
            let outcome = self.process_frame(frame);
            stats.record(&outcome);
        }
        log::debug!("analysis of {} finished: {:?}", source.name(), stats);
        Ok(stats)
    }
}

/// Background analysis thread.
///
/// `stop` is checked between frames. A source that blocks waiting for frames
/// (e.g. a closed-over `LatestFrameSlot`) must also be closed to unblock it.
pub struct AnalysisWorker {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<Result<AnalysisStats>>>,
}

impl AnalysisWorker {
    pub fn spawn<D, S>(mut session: ScanSession<D>, mut source: S) -> Result<Self>
    where
        D: BarcodeDetector + 'static,
        S: FrameSource + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_thread = stop.clone();
        let join = std::thread::Builder::new()
            .name("frame-analysis".to_string())
            .spawn(move || session.run(&mut source, &stop_thread))?;
        Ok(Self {
            stop,
            join: Some(join),
        })
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the thread and returns its statistics.
    pub fn join(mut self) -> Result<AnalysisStats> {
        let join = self
            .join
            .take()
            .ok_or_else(|| anyhow!("analysis worker already joined"))?;
        join.join()
            .map_err(|_| anyhow!("analysis thread panicked"))?
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        self.request_stop();
    }
}
