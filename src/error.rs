use thiserror::Error;

/// Recoverable faults reported by the scan pipeline.
///
/// None of these is fatal. The worst visible effect is a stale or missing
/// overlay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanFault {
    /// Camera access was not granted. The host stays on its current screen.
    #[error("camera permission denied")]
    PermissionDenied,
    /// A delivered frame carried no usable image payload.
    #[error("frame {frame_id} has no image payload")]
    FrameUnavailable { frame_id: u64 },
    /// The detector reported an error for a submitted frame.
    #[error("detector '{detector}' failed on frame {frame_id}: {reason}")]
    DetectionFailure {
        detector: String,
        frame_id: u64,
        reason: String,
    },
}
