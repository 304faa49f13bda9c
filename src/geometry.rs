//! Rectangles and frame/viewport geometry.
//!
//! Two coordinate spaces meet here:
//! - Producer frame space: pixels of the raw camera buffer, integer rectangles.
//! - Viewport space: pixels of the preview surface, floating point rectangles.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in floating point pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle with its top-left corner at `(left, top)`.
    pub fn from_origin_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn contains_rect(&self, other: &RectF) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer rectangle as reported by a detector, in producer frame space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn to_rect_f(self) -> RectF {
        RectF::new(
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        )
    }
}

impl From<PixelRect> for RectF {
    fn from(rect: PixelRect) -> Self {
        rect.to_rect_f()
    }
}

/// Clockwise rotation the producer applied relative to the display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Accepts any multiple of 90, negative values included.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(anyhow!(
                "rotation must be a multiple of 90 degrees, got {}",
                degrees
            )),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Sensor axes no longer line up with the display axes.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Raw frame dimensions plus the rotation delivered with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32, rotation: Rotation) -> Self {
        Self {
            width,
            height,
            rotation,
        }
    }

    /// Width and height after logically undoing the rotation.
    pub fn effective_size(&self) -> (f32, f32) {
        let (w, h) = (self.width as f32, self.height as f32);
        if self.rotation.swaps_axes() {
            (h, w)
        } else {
            (w, h)
        }
    }
}

/// Size of the render target. Read fresh for every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportGeometry {
    pub width: f32,
    pub height: f32,
}

impl ViewportGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> RectF {
        RectF::new(0.0, 0.0, self.width, self.height)
    }

    /// Positive and finite in both dimensions.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Parses `WIDTHxHEIGHT`, e.g. `1080x2400`.
    pub fn parse(value: &str) -> Result<Self> {
        let (w, h) = value
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow!("viewport must look like WIDTHxHEIGHT, got '{}'", value))?;
        let width: f32 = w
            .trim()
            .parse()
            .map_err(|_| anyhow!("invalid viewport width '{}'", w))?;
        let height: f32 = h
            .trim()
            .parse()
            .map_err(|_| anyhow!("invalid viewport height '{}'", h))?;
        let viewport = Self { width, height };
        if !viewport.is_valid() {
            return Err(anyhow!("viewport dimensions must be positive and finite"));
        }
        Ok(viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_accepts_multiples_of_ninety() -> Result<()> {
        assert_eq!(Rotation::from_degrees(0)?, Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(90)?, Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(-90)?, Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(450)?, Rotation::Deg90);
        assert!(Rotation::from_degrees(45).is_err());
        Ok(())
    }

    #[test]
    fn effective_size_swaps_for_quarter_turns() {
        let portrait = FrameGeometry::new(1280, 720, Rotation::Deg90);
        assert_eq!(portrait.effective_size(), (720.0, 1280.0));
        let flipped = FrameGeometry::new(1280, 720, Rotation::Deg180);
        assert_eq!(flipped.effective_size(), (1280.0, 720.0));
    }

    #[test]
    fn viewport_parse() -> Result<()> {
        let vp = ViewportGeometry::parse("1080x2400")?;
        assert_eq!(vp, ViewportGeometry::new(1080.0, 2400.0));
        assert!(ViewportGeometry::parse("1080").is_err());
        assert!(ViewportGeometry::parse("0x10").is_err());
        Ok(())
    }

    #[test]
    fn viewport_parse_rejects_non_finite_sizes() {
        assert!(ViewportGeometry::parse("infx1280").is_err());
        assert!(ViewportGeometry::parse("720xinf").is_err());
        assert!(ViewportGeometry::parse("NaNx1280").is_err());
        assert!(!ViewportGeometry::new(f32::INFINITY, 10.0).is_valid());
    }
}
