//! Frame producers.
//!
//! - `ReplaySource`: replays a scripted frame sequence (tests, demo).
//! - `LatestFrameSlot`: keep-only-latest hand-off between a producer and the
//!   analysis thread. A frame that is overwritten before it is taken is
//!   released, not queued.
//!
//! Every frame leaving a source carries its release hook; whoever ends up
//! owning it releases it exactly once by dropping it.

pub mod latest;
pub mod replay;

use anyhow::Result;

use crate::frame::CameraFrame;

pub use latest::{pump_into, LatestFrameSlot, SlotSource};
pub use replay::{ReplayFrame, ReplaySource};

/// Source of camera frames.
pub trait FrameSource: Send {
    fn name(&self) -> &str;

    /// Next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<CameraFrame>>;
}
