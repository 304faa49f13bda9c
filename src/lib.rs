//! Live barcode overlay core.
//!
//! Camera frames go through a barcode detector; every detection is mapped from
//! frame space into preview space and drawn as a highlight plus an annotation
//! panel. The overlay clears itself when detections stop arriving.
//!
//! # Architecture
//!
//! - One producer thread runs [`ScanSession`] over a [`FrameSource`] and
//!   replaces the active detection set on every non-empty batch.
//! - The render side owns an [`OverlaySurface`], snapshots the active set and
//!   turns it into a display list via [`layout_annotation`].
//! - An [`InactivityTicker`] clears the set after the inactivity threshold.
//!
//! # Module Structure
//!
//! - `geometry`, `mapper`: coordinate spaces and the fit-center transform
//! - `layout`: annotation panel placement and text measurement
//! - `overlay`, `ticker`, `clock`: the active set and its lifecycle
//! - `frame`, `ingest`, `detect`: frame producer and detector seams
//! - `session`: per-frame analysis
//! - `shell`: permission gate and scanner launch
//! - `config`, `script`: settings and JSON replay scripts

pub mod clock;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod ingest;
pub mod layout;
pub mod mapper;
pub mod overlay;
pub mod script;
pub mod session;
pub mod shell;
pub mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ScannerConfig;
pub use detect::{Barcode, BarcodeDetector, ScriptedDetector, ScriptedOutcome, ValueType};
pub use error::ScanFault;
pub use frame::{CameraFrame, FrameView, ReleaseHook};
pub use geometry::{FrameGeometry, PixelRect, PointF, RectF, Rotation, ViewportGeometry};
pub use ingest::{FrameSource, LatestFrameSlot, ReplayFrame, ReplaySource, SlotSource};
pub use layout::{
    layout_annotation, AnnotationLayout, ContentLayout, GlyphMeasure, LayoutStyle, TextBlock,
    TextLine, TextMeasure, TextRole,
};
pub use mapper::{map_to_viewport, ViewportTransform};
pub use overlay::{Detection, DrawCommand, LifecycleState, OverlaySurface, Paint, RedrawHook};
pub use script::{ScanScript, ScriptedBarcode, ScriptedFrame};
pub use session::{AnalysisStats, AnalysisWorker, FrameOutcome, ScanSession};
pub use shell::{
    on_permission_result, request_camera_and_start, GateDecision, HostShell, PermissionStatus,
};
pub use ticker::InactivityTicker;
