use anyhow::{anyhow, Result};
use std::collections::HashMap;

use crate::detect::backend::BarcodeDetector;
use crate::detect::result::Barcode;
use crate::frame::FrameView;

/// What the scripted detector answers for one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptedOutcome {
    Barcodes(Vec<Barcode>),
    Failure(String),
}

/// Replays fixed per-frame results. Frames without a script entry yield no
/// barcodes.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    outcomes: HashMap<u64, ScriptedOutcome>,
    calls: u64,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, frame_id: u64, outcome: ScriptedOutcome) -> Self {
        self.outcomes.insert(frame_id, outcome);
        self
    }

    pub fn insert(&mut self, frame_id: u64, outcome: ScriptedOutcome) {
        self.outcomes.insert(frame_id, outcome);
    }

    /// Number of frames submitted so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl BarcodeDetector for ScriptedDetector {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, frame: &FrameView<'_>) -> Result<Vec<Barcode>> {
        self.calls += 1;
        match self.outcomes.get(&frame.id()) {
            Some(ScriptedOutcome::Barcodes(barcodes)) => Ok(barcodes.clone()),
            Some(ScriptedOutcome::Failure(reason)) => Err(anyhow!("{}", reason)),
            None => Ok(Vec::new()),
        }
    }
}
