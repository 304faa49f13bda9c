//! Periodic inactivity check for an [`OverlaySurface`].

use anyhow::{anyhow, Result};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::overlay::OverlaySurface;

/// Runs `expire_stale` on a fixed cadence until cancelled.
///
/// Cancel before the surface is torn down; dropping the ticker cancels it too.
#[derive(Debug)]
pub struct InactivityTicker {
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<u64>>,
    interval: Duration,
}

impl InactivityTicker {
    /// Ticks at the surface's own cadence (half the inactivity threshold).
    pub fn spawn(surface: Arc<OverlaySurface>) -> Result<Self> {
        let interval = surface.check_interval();
        Self::spawn_with_interval(surface, interval)
    }

    pub fn spawn_with_interval(surface: Arc<OverlaySurface>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(anyhow!("ticker interval must be greater than zero"));
        }
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let join = std::thread::Builder::new()
            .name("overlay-ticker".to_string())
            .spawn(move || {
                let mut expirations = 0u64;
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if surface.expire_stale() {
                                expirations += 1;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                expirations
            })?;
        log::info!("inactivity ticker started (every {:?})", interval);
        Ok(Self {
            stop: Some(stop_tx),
            join: Some(join),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the ticker and returns how many times it cleared the surface.
    pub fn cancel(mut self) -> Result<u64> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<u64> {
        // Dropping the sender wakes the thread immediately.
        self.stop.take();
        let Some(join) = self.join.take() else {
            return Ok(0);
        };
        let expirations = join
            .join()
            .map_err(|_| anyhow!("inactivity ticker thread panicked"))?;
        log::debug!("inactivity ticker stopped after {} expirations", expirations);
        Ok(expirations)
    }
}

impl Drop for InactivityTicker {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::geometry::{RectF, ViewportGeometry};
    use crate::layout::LayoutStyle;
    use crate::overlay::{Detection, LifecycleState};
    use std::time::Instant;

    fn surface(clock: Arc<ManualClock>) -> Arc<OverlaySurface> {
        Arc::new(OverlaySurface::new(
            ViewportGeometry::new(1000.0, 1000.0),
            LayoutStyle::default(),
            Duration::from_millis(2000),
            clock,
        ))
    }

    fn one_detection() -> Vec<Detection> {
        vec![Detection {
            rect: RectF::new(0.0, 0.0, 10.0, 10.0),
            display_text: "x".to_string(),
            category: "Text".to_string(),
            timestamp_millis: 0,
        }]
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn default_interval_is_half_the_threshold() -> Result<()> {
        let ticker = InactivityTicker::spawn(surface(Arc::new(ManualClock::new(0))))?;
        assert_eq!(ticker.interval(), Duration::from_millis(1000));
        ticker.cancel()?;
        Ok(())
    }

    #[test]
    fn ticker_clears_once_clock_passes_threshold() -> Result<()> {
        let clock = Arc::new(ManualClock::new(0));
        let surface = surface(clock.clone());
        surface.submit_detections(one_detection());

        let ticker = InactivityTicker::spawn_with_interval(surface.clone(), Duration::from_millis(5))?;
        std::thread::sleep(Duration::from_millis(40));
        assert!(matches!(surface.state(), LifecycleState::Populated { .. }));

        clock.set(2001);
        assert!(wait_for(|| surface.state() == LifecycleState::Empty));
        assert_eq!(ticker.cancel()?, 1);
        Ok(())
    }

    #[test]
    fn cancelled_ticker_stops_checking() -> Result<()> {
        let clock = Arc::new(ManualClock::new(0));
        let surface = surface(clock.clone());
        let ticker = InactivityTicker::spawn_with_interval(surface.clone(), Duration::from_millis(5))?;
        ticker.cancel()?;

        surface.submit_detections(one_detection());
        clock.set(10_000);
        std::thread::sleep(Duration::from_millis(40));
        assert!(matches!(surface.state(), LifecycleState::Populated { .. }));
        Ok(())
    }

    #[test]
    fn zero_interval_is_rejected() {
        let surface = surface(Arc::new(ManualClock::new(0)));
        assert!(InactivityTicker::spawn_with_interval(surface, Duration::ZERO).is_err());
    }
}
