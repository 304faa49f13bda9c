//! Camera frames handed from the pipeline to the analyzer.
//!
//! - `CameraFrame`: owned frame with an optional image payload. Releasing the
//!   frame back to its pipeline happens exactly once, on drop at the latest.
//! - `FrameView`: borrowed view a detector runs against. Only exists when the
//!   frame actually carries a payload.

use crate::geometry::{FrameGeometry, Rotation};

/// Called with the frame id when the frame is handed back to its pipeline.
pub type ReleaseHook = Box<dyn FnOnce(u64) + Send>;

pub struct CameraFrame {
    id: u64,
    geometry: FrameGeometry,
    /// `None` when the pipeline delivered a frame without a usable image.
    payload: Option<Vec<u8>>,
    release: Option<ReleaseHook>,
}

impl CameraFrame {
    pub fn new(id: u64, geometry: FrameGeometry, payload: Option<Vec<u8>>) -> Self {
        Self {
            id,
            geometry,
            payload,
            release: None,
        }
    }

    /// Attaches the pipeline's release callback.
    pub fn with_release(mut self, hook: ReleaseHook) -> Self {
        self.release = Some(hook);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Detector view, or `None` for a frame without payload.
    pub fn view(&self) -> Option<FrameView<'_>> {
        self.payload.as_deref().map(|pixels| FrameView {
            id: self.id,
            geometry: self.geometry,
            pixels,
        })
    }

    /// Hands the frame back to its pipeline now. Later calls and the eventual
    /// drop do nothing.
    pub fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.id);
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for CameraFrame {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for CameraFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraFrame")
            .field("id", &self.id)
            .field("geometry", &self.geometry)
            .field("payload_bytes", &self.payload.as_ref().map(Vec::len))
            .field("released", &self.is_released())
            .finish()
    }
}

/// Read-only view for detectors.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    id: u64,
    geometry: FrameGeometry,
    pixels: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    pub fn rotation(&self) -> Rotation {
        self.geometry.rotation
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn counting_frame(payload: Option<Vec<u8>>, counter: &Arc<AtomicU64>) -> CameraFrame {
        let counter = counter.clone();
        CameraFrame::new(7, FrameGeometry::new(4, 2, Rotation::Deg90), payload).with_release(
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn drop_releases_exactly_once() {
        let released = Arc::new(AtomicU64::new(0));
        let frame = counting_frame(Some(vec![1, 2, 3]), &released);
        assert!(!frame.is_released());
        drop(frame);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn early_release_is_not_repeated_on_drop() {
        let released = Arc::new(AtomicU64::new(0));
        let mut frame = counting_frame(None, &released);
        frame.release_now();
        frame.release_now();
        drop(frame);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn view_only_exists_with_payload() {
        let released = Arc::new(AtomicU64::new(0));
        let empty = counting_frame(None, &released);
        assert!(empty.view().is_none());

        let frame = counting_frame(Some(vec![9; 8]), &released);
        let view = frame.view().expect("view");
        assert_eq!(view.id(), 7);
        assert_eq!((view.width(), view.height()), (4, 2));
        assert_eq!(view.rotation(), Rotation::Deg90);
        assert_eq!(view.pixels().len(), 8);
    }
}
