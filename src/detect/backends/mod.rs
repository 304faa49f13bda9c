pub mod scripted;

pub use scripted::{ScriptedDetector, ScriptedOutcome};
