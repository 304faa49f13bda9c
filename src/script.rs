//! JSON replay scripts: a frame sequence plus what the detector reports for
//! each frame.
//!
//! ```json
//! { "frames": [
//!     { "width": 1280, "height": 720, "rotation_degrees": 90,
//!       "barcodes": [ { "bounds": [100, 100, 300, 300],
//!                       "raw_value": "https://example.com",
//!                       "value_type": "url" } ] },
//!     { "width": 1280, "height": 720, "missing_payload": true },
//!     { "width": 1280, "height": 720, "failure": "decoder timeout" }
//! ] }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::detect::{Barcode, ScriptedDetector, ScriptedOutcome, ValueType};
use crate::geometry::{FrameGeometry, PixelRect, Rotation};
use crate::ingest::{ReplayFrame, ReplaySource};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanScript {
    #[serde(default)]
    pub frames: Vec<ScriptedFrame>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedFrame {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub rotation_degrees: i32,
    #[serde(default)]
    pub missing_payload: bool,
    #[serde(default)]
    pub failure: Option<String>,
    #[serde(default)]
    pub barcodes: Vec<ScriptedBarcode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedBarcode {
    /// `[left, top, right, bottom]` in frame pixels.
    #[serde(default)]
    pub bounds: Option<[i32; 4]>,
    #[serde(default)]
    pub raw_value: Option<String>,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub value_type: ValueType,
    /// Numeric SDK category code. Takes precedence over `value_type`.
    #[serde(default)]
    pub value_code: Option<i32>,
}

impl ScriptedBarcode {
    fn to_barcode(&self) -> Barcode {
        Barcode {
            bounding_box: self
                .bounds
                .map(|[left, top, right, bottom]| PixelRect::new(left, top, right, bottom)),
            raw_value: self.raw_value.clone(),
            display_value: self.display_value.clone(),
            value_type: self
                .value_code
                .map_or(self.value_type, ValueType::from_code),
        }
    }
}

impl ScanScript {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| anyhow!("invalid scan script: {}", e))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read scan script {}: {}", path.display(), e))?;
        Self::from_json(&raw)
            .map_err(|e| anyhow!("{} ({})", e, path.display()))
    }

    /// A short sequence exercising detection, a single-frame miss, a missing
    /// payload, a detector failure and then silence.
    pub fn builtin_demo() -> Self {
        let url = ScriptedBarcode {
            bounds: Some([420, 180, 620, 380]),
            raw_value: Some("https://example.com/menu?table=12".to_string()),
            display_value: None,
            value_type: ValueType::Url,
            value_code: None,
        };
        let wifi = ScriptedBarcode {
            bounds: Some([100, 420, 260, 580]),
            raw_value: None,
            display_value: Some("WIFI:S:guest;T:WPA;P:hunter2;;".to_string()),
            value_type: ValueType::Wifi,
            value_code: None,
        };
        let frame = |barcodes: Vec<ScriptedBarcode>| ScriptedFrame {
            width: 1280,
            height: 720,
            rotation_degrees: 0,
            missing_payload: false,
            failure: None,
            barcodes,
        };
        let mut frames = vec![
            frame(vec![url.clone()]),
            frame(vec![url.clone(), wifi.clone()]),
            frame(Vec::new()),
            frame(vec![wifi]),
        ];
        frames.push(ScriptedFrame {
            missing_payload: true,
            ..frame(Vec::new())
        });
        frames.push(ScriptedFrame {
            failure: Some("decoder timeout".to_string()),
            ..frame(Vec::new())
        });
        frames.push(frame(vec![url]));
        frames.extend((0..5).map(|_| frame(Vec::new())));
        Self { frames }
    }

    /// Splits the script into a frame source and a detector sharing frame ids.
    pub fn into_parts(self, name: &str) -> Result<(ReplaySource, ScriptedDetector)> {
        let mut frames = Vec::with_capacity(self.frames.len());
        let mut detector = ScriptedDetector::new();
        for (index, scripted) in self.frames.into_iter().enumerate() {
            let frame_id = index as u64 + 1;
            let rotation = Rotation::from_degrees(scripted.rotation_degrees)
                .map_err(|e| anyhow!("frame {}: {}", frame_id, e))?;
            if scripted.width == 0 || scripted.height == 0 {
                return Err(anyhow!("frame {}: dimensions must be non-zero", frame_id));
            }
            frames.push(ReplayFrame {
                geometry: FrameGeometry::new(scripted.width, scripted.height, rotation),
                has_payload: !scripted.missing_payload,
            });
            let outcome = match scripted.failure {
                Some(reason) => ScriptedOutcome::Failure(reason),
                None => ScriptedOutcome::Barcodes(
                    scripted.barcodes.iter().map(ScriptedBarcode::to_barcode).collect(),
                ),
            };
            detector.insert(frame_id, outcome);
        }
        Ok((ReplaySource::new(name, frames), detector))
    }
}
