use anyhow::Result;

use crate::detect::result::Barcode;
use crate::frame::FrameView;

/// Barcode detector trait.
///
/// One call per submitted frame, one outcome per call: the barcodes found
/// (possibly none) or an error. Implementations must not keep the pixel slice
/// beyond the call.
pub trait BarcodeDetector: Send {
    /// Detector identifier, used in logs and fault reports.
    fn name(&self) -> &'static str;

    fn detect(&mut self, frame: &FrameView<'_>) -> Result<Vec<Barcode>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
