//! Rendering surface state: the active detection set and its render pass.
//!
//! The active set is the only state shared between the analysis thread and
//! the render/UI side. It is replaced wholesale, never merged, and readers
//! always take a complete snapshot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::ScannerConfig;
use crate::geometry::{PointF, RectF, ViewportGeometry};
use crate::layout::{layout_annotation, LayoutStyle, TextBlock, TextMeasure};

/// One detection, already in viewport space.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub rect: RectF,
    pub display_text: String,
    pub category: String,
    pub timestamp_millis: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Empty,
    Populated {
        last_update_millis: i64,
        count: usize,
    },
}

pub type RedrawHook = Arc<dyn Fn() + Send + Sync>;

struct ActiveSet {
    detections: Arc<[Detection]>,
    last_update_millis: i64,
}

impl ActiveSet {
    fn empty() -> Self {
        Self {
            detections: Arc::from(Vec::new()),
            last_update_millis: 0,
        }
    }
}

/// Paint roles the host maps onto its own brushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    Highlight,
    PanelBackground,
    CategoryText,
    ContentText,
}

/// Display list entry produced by [`OverlaySurface::render`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    RoundRect {
        rect: RectF,
        radius: f32,
        stroke: Option<f32>,
        paint: Paint,
    },
    Text {
        origin: PointF,
        text: String,
        paint: Paint,
    },
    TextBlock {
        origin: PointF,
        block: TextBlock,
        paint: Paint,
    },
}

pub struct OverlaySurface {
    active: Mutex<ActiveSet>,
    viewport: Mutex<ViewportGeometry>,
    redraw: Mutex<Option<RedrawHook>>,
    style: LayoutStyle,
    inactivity: Duration,
    clock: Arc<dyn Clock>,
}

impl OverlaySurface {
    pub fn new(
        viewport: ViewportGeometry,
        style: LayoutStyle,
        inactivity: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            active: Mutex::new(ActiveSet::empty()),
            viewport: Mutex::new(viewport),
            redraw: Mutex::new(None),
            style,
            inactivity,
            clock,
        }
    }

    pub fn with_system_clock(
        viewport: ViewportGeometry,
        style: LayoutStyle,
        inactivity: Duration,
    ) -> Self {
        Self::new(viewport, style, inactivity, Arc::new(SystemClock))
    }

    /// Surface configured from [`ScannerConfig`], on the system clock.
    pub fn from_config(cfg: &ScannerConfig) -> Self {
        Self::with_system_clock(cfg.viewport, cfg.style.clone(), cfg.inactivity)
    }

    /// Registers the callback invoked after every mutation of the active set.
    pub fn on_redraw(&self, hook: RedrawHook) {
        *relock(self.redraw.lock()) = Some(hook);
    }

    pub fn inactivity(&self) -> Duration {
        self.inactivity
    }

    /// Cadence of the inactivity check.
    pub fn check_interval(&self) -> Duration {
        self.inactivity / 2
    }

    pub fn style(&self) -> &LayoutStyle {
        &self.style
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn viewport(&self) -> ViewportGeometry {
        *relock(self.viewport.lock())
    }

    /// Updates the render target size, e.g. after a device rotation.
    pub fn set_viewport(&self, viewport: ViewportGeometry) {
        *relock(self.viewport.lock()) = viewport;
        self.request_redraw();
    }

    /// Replaces the active set with a non-empty batch.
    ///
    /// An empty batch leaves the current set and its timestamp untouched, so a
    /// single missed frame does not blank the overlay. Returns whether the set
    /// was replaced.
    pub fn submit_detections(&self, detections: Vec<Detection>) -> bool {
        if detections.is_empty() {
            return false;
        }
        let count = detections.len();
        let now = self.clock.now_millis();
        {
            let mut active = self.lock_active();
            active.detections = Arc::from(detections);
            active.last_update_millis = now;
        }
        log::debug!("active detections replaced: {} at {}", count, now);
        self.request_redraw();
        true
    }

    /// Empties the active set.
    pub fn clear(&self) {
        {
            let mut active = self.lock_active();
            active.detections = Arc::from(Vec::new());
        }
        self.request_redraw();
    }

    /// Clears the set when nothing new arrived for longer than the threshold.
    pub fn expire_stale(&self) -> bool {
        let now = self.clock.now_millis();
        let expired = {
            let mut active = self.lock_active();
            let idle = now.saturating_sub(active.last_update_millis);
            if active.detections.is_empty() || idle <= self.inactivity.as_millis() as i64 {
                false
            } else {
                active.detections = Arc::from(Vec::new());
                true
            }
        };
        if expired {
            log::debug!("active detections expired after inactivity");
            self.request_redraw();
        }
        expired
    }

    pub fn snapshot(&self) -> Arc<[Detection]> {
        self.lock_active().detections.clone()
    }

    pub fn state(&self) -> LifecycleState {
        let active = self.lock_active();
        if active.detections.is_empty() {
            LifecycleState::Empty
        } else {
            LifecycleState::Populated {
                last_update_millis: active.last_update_millis,
                count: active.detections.len(),
            }
        }
    }

    /// Builds the display list for the current snapshot.
    pub fn render(&self, measure: &dyn TextMeasure) -> Vec<DrawCommand> {
        let detections = self.snapshot();
        let viewport = self.viewport();
        let style = &self.style;
        let mut commands = Vec::with_capacity(detections.len() * 4);

        for detection in detections.iter() {
            commands.push(DrawCommand::RoundRect {
                rect: detection.rect,
                radius: style.corner_radius,
                stroke: Some(style.highlight_stroke),
                paint: Paint::Highlight,
            });

            let layout = layout_annotation(
                &detection.rect,
                &detection.category,
                &detection.display_text,
                &viewport,
                measure,
                style,
            );
            commands.push(DrawCommand::RoundRect {
                rect: layout.panel,
                radius: style.corner_radius,
                stroke: None,
                paint: Paint::PanelBackground,
            });
            commands.push(DrawCommand::Text {
                origin: layout.category_origin,
                text: detection.category.clone(),
                paint: Paint::CategoryText,
            });
            if let Some(content) = layout.content {
                commands.push(DrawCommand::TextBlock {
                    origin: content.origin,
                    block: content.block,
                    paint: Paint::ContentText,
                });
            }
        }
        commands
    }

    fn request_redraw(&self) {
        let hook = relock(self.redraw.lock()).clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, ActiveSet> {
        relock(self.active.lock())
    }
}

// Every mutation under these locks is a single assignment, so a poisoned
// guard still holds a consistent value.
fn relock<'a, T>(
    result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}
