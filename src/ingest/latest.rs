use anyhow::Result;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::FrameSource;
use crate::frame::CameraFrame;

#[derive(Default)]
struct SlotState {
    frame: Option<CameraFrame>,
    closed: bool,
    dropped: u64,
}

/// Single-frame hand-off with keep-only-latest semantics.
#[derive(Default)]
pub struct LatestFrameSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `frame`, replacing and releasing any frame nobody took yet.
    /// Returns whether a frame was replaced. Frames offered after `close`
    /// are released immediately.
    pub fn offer(&self, frame: CameraFrame) -> bool {
        let stale = {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            let stale = state.frame.replace(frame);
            if stale.is_some() {
                state.dropped += 1;
            }
            stale
        };
        self.ready.notify_one();
        // Released outside the lock.
        let replaced = stale.is_some();
        drop(stale);
        replaced
    }

    /// Takes the newest frame without waiting.
    pub fn take(&self) -> Option<CameraFrame> {
        self.lock().frame.take()
    }

    /// Waits for a frame. `None` once the slot is closed and drained.
    pub fn next_blocking(&self) -> Option<CameraFrame> {
        let mut state = self.lock();
        loop {
            if let Some(frame) = state.frame.take() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// No more frames will be offered. A frame already waiting can still be taken.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Frames overwritten before anyone took them.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Consumer side of a [`LatestFrameSlot`] as a [`FrameSource`].
#[derive(Clone)]
pub struct SlotSource {
    slot: Arc<LatestFrameSlot>,
}

impl SlotSource {
    pub fn new(slot: Arc<LatestFrameSlot>) -> Self {
        Self { slot }
    }
}

impl FrameSource for SlotSource {
    fn name(&self) -> &str {
        "latest-slot"
    }

    fn next_frame(&mut self) -> Result<Option<CameraFrame>> {
        Ok(self.slot.next_blocking())
    }
}

/// Moves every frame from `source` into `slot`, one per `interval`, then
/// closes the slot. Returns the number of frames offered.
///
/// Closing the slot from elsewhere stops the pump before its next pull.
pub fn pump_into(
    source: &mut dyn FrameSource,
    slot: &LatestFrameSlot,
    interval: Duration,
) -> Result<u64> {
    let mut offered = 0u64;
    let result = loop {
        if slot.is_closed() {
            log::debug!("{} stopped after {} frames: slot closed", source.name(), offered);
            break Ok(offered);
        }
        match source.next_frame() {
            Ok(Some(frame)) => {
                slot.offer(frame);
                offered += 1;
                if !interval.is_zero() {
                    std::thread::sleep(interval);
                }
            }
            Ok(None) => break Ok(offered),
            Err(e) => break Err(e),
        }
    };
    slot.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FrameGeometry, Rotation};
    use crate::ingest::{ReplayFrame, ReplaySource};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn frame(id: u64, released: &Arc<AtomicU64>) -> CameraFrame {
        let released = released.clone();
        CameraFrame::new(id, FrameGeometry::new(2, 2, Rotation::Deg0), Some(vec![0; 4]))
            .with_release(Box::new(move |_| {
                released.fetch_add(1, Ordering::SeqCst);
            }))
    }

    #[test]
    fn newer_frame_replaces_and_releases_older() {
        let released = Arc::new(AtomicU64::new(0));
        let slot = LatestFrameSlot::new();
        assert!(!slot.offer(frame(1, &released)));
        assert!(slot.offer(frame(2, &released)));
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert_eq!(slot.dropped(), 1);

        let taken = slot.take().expect("latest frame");
        assert_eq!(taken.id(), 2);
        assert!(slot.take().is_none());
    }

    #[test]
    fn closed_slot_drains_then_ends() {
        let released = Arc::new(AtomicU64::new(0));
        let slot = LatestFrameSlot::new();
        slot.offer(frame(1, &released));
        slot.close();
        assert!(!slot.offer(frame(2, &released)));
        assert_eq!(released.load(Ordering::SeqCst), 1);

        assert_eq!(slot.next_blocking().map(|f| f.id()), Some(1));
        assert!(slot.next_blocking().is_none());
    }

    #[test]
    fn blocking_consumer_wakes_on_offer() {
        let released = Arc::new(AtomicU64::new(0));
        let slot = Arc::new(LatestFrameSlot::new());
        let consumer_slot = slot.clone();
        let consumer = std::thread::spawn(move || {
            let mut source = SlotSource::new(consumer_slot);
            let mut ids = Vec::new();
            while let Ok(Some(frame)) = source.next_frame() {
                ids.push(frame.id());
            }
            ids
        });
        slot.offer(frame(5, &released));
        std::thread::sleep(Duration::from_millis(20));
        slot.close();
        let ids = consumer.join().expect("consumer thread");
        assert_eq!(ids, vec![5]);
    }

    #[test]
    fn pump_stops_once_slot_is_closed() -> Result<()> {
        let frames = vec![
            ReplayFrame {
                geometry: FrameGeometry::new(2, 2, Rotation::Deg0),
                has_payload: true,
            };
            50
        ];
        let mut source = ReplaySource::new("pump", frames);
        let slot = Arc::new(LatestFrameSlot::new());
        let closer_slot = slot.clone();
        let closer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            closer_slot.close();
        });

        let offered = pump_into(&mut source, &slot, Duration::from_millis(10))?;
        closer.join().expect("closer thread");
        assert!(offered < 50, "pump ran through the whole source");
        assert_eq!(source.remaining() as u64, 50 - offered);
        drop(slot);
        assert_eq!(source.released(), offered);
        Ok(())
    }

    #[test]
    fn pump_moves_all_frames_and_closes() -> Result<()> {
        let frames = vec![
            ReplayFrame {
                geometry: FrameGeometry::new(2, 2, Rotation::Deg0),
                has_payload: true,
            };
            4
        ];
        let mut source = ReplaySource::new("pump", frames);
        let slot = LatestFrameSlot::new();
        assert_eq!(pump_into(&mut source, &slot, Duration::ZERO)?, 4);
        assert!(slot.is_closed());
        // Nobody consumed: three were overwritten, the last one still waits.
        assert_eq!(slot.dropped(), 3);
        assert_eq!(source.released(), 3);
        assert_eq!(slot.take().map(|f| f.id()), Some(4));
        assert_eq!(source.released(), 4);
        Ok(())
    }
}
