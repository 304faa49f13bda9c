//! Producer frame space to viewport space.
//!
//! The preview is assumed to letterbox the frame: scale uniformly until the
//! whole frame fits, then centre it. Fill-center cropping is not modelled.

use crate::geometry::{FrameGeometry, RectF, ViewportGeometry};

/// Uniform scale plus centring offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Fit-center transform for one frame into one viewport.
    pub fn fit_center(frame: &FrameGeometry, viewport: &ViewportGeometry) -> Self {
        let (frame_w, frame_h) = frame.effective_size();
        let scale = (viewport.width / frame_w).min(viewport.height / frame_h);
        Self {
            scale,
            offset_x: (viewport.width - frame_w * scale) / 2.0,
            offset_y: (viewport.height - frame_h * scale) / 2.0,
        }
    }

    pub fn apply(&self, rect: RectF) -> RectF {
        RectF::new(
            rect.left * self.scale + self.offset_x,
            rect.top * self.scale + self.offset_y,
            rect.right * self.scale + self.offset_x,
            rect.bottom * self.scale + self.offset_y,
        )
    }
}

/// Maps a detection rectangle into viewport space.
///
/// `rect` is expected in the rotation-normalised frame, i.e. already expressed
/// against the effective (possibly swapped) frame size.
pub fn map_to_viewport(rect: RectF, frame: &FrameGeometry, viewport: &ViewportGeometry) -> RectF {
    ViewportTransform::fit_center(frame, viewport).apply(rect)
}
