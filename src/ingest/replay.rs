use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::FrameSource;
use crate::frame::CameraFrame;
use crate::geometry::FrameGeometry;

/// One frame of a replay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayFrame {
    pub geometry: FrameGeometry,
    /// `false` delivers the frame without an image payload.
    pub has_payload: bool,
}

/// Replays a fixed frame sequence. Frame ids start at 1.
pub struct ReplaySource {
    name: String,
    frames: VecDeque<ReplayFrame>,
    next_id: u64,
    released: Arc<AtomicU64>,
}

impl ReplaySource {
    pub fn new(name: impl Into<String>, frames: Vec<ReplayFrame>) -> Self {
        Self {
            name: name.into(),
            frames: frames.into(),
            next_id: 1,
            released: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Frames handed out so far.
    pub fn delivered(&self) -> u64 {
        self.next_id - 1
    }

    /// Frames released back to this source so far.
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Shared release counter, readable after the source moved to a worker.
    pub fn release_counter(&self) -> Arc<AtomicU64> {
        self.released.clone()
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    fn synthetic_pixels(geometry: &FrameGeometry, id: u64) -> Vec<u8> {
        // Single luma plane with a moving gradient.
        let len = geometry.width as usize * geometry.height as usize;
        (0..len).map(|i| ((i as u64 + id) % 256) as u8).collect()
    }
}

impl FrameSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_frame(&mut self) -> Result<Option<CameraFrame>> {
        let Some(next) = self.frames.pop_front() else {
            return Ok(None);
        };
        let id = self.next_id;
        self.next_id += 1;

        let payload = next
            .has_payload
            .then(|| Self::synthetic_pixels(&next.geometry, id));
        let released = self.released.clone();
        Ok(Some(
            CameraFrame::new(id, next.geometry, payload).with_release(Box::new(move |_| {
                released.fetch_add(1, Ordering::SeqCst);
            })),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation;

    fn replay(n: usize) -> ReplaySource {
        let frames = (0..n)
            .map(|i| ReplayFrame {
                geometry: FrameGeometry::new(4, 4, Rotation::Deg0),
                has_payload: i % 2 == 0,
            })
            .collect();
        ReplaySource::new("test", frames)
    }

    #[test]
    fn replays_in_order_then_ends() -> Result<()> {
        let mut source = replay(3);
        let ids: Vec<u64> = std::iter::from_fn(|| source.next_frame().ok().flatten())
            .map(|frame| frame.id())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(source.next_frame()?.is_none());
        assert_eq!(source.delivered(), 3);
        // The frames above were dropped inside the iterator chain.
        assert_eq!(source.released(), 3);
        Ok(())
    }

    #[test]
    fn payload_follows_script() -> Result<()> {
        let mut source = replay(2);
        let first = source.next_frame()?.expect("frame 1");
        let second = source.next_frame()?.expect("frame 2");
        assert!(first.has_payload());
        assert!(!second.has_payload());
        assert_eq!(first.view().map(|v| v.pixels().len()), Some(16));
        assert_eq!(source.released(), 0);
        drop(first);
        drop(second);
        assert_eq!(source.released(), 2);
        Ok(())
    }
}
