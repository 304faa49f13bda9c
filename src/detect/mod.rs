mod backend;
mod backends;
mod result;

pub use backend::BarcodeDetector;
pub use backends::{ScriptedDetector, ScriptedOutcome};
pub use result::{Barcode, ValueType};
