use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::geometry::ViewportGeometry;
use crate::layout::LayoutStyle;

const DEFAULT_INACTIVITY_MS: u64 = 2000;
const DEFAULT_VIEWPORT_WIDTH: f32 = 1080.0;
const DEFAULT_VIEWPORT_HEIGHT: f32 = 2400.0;

#[derive(Debug, Deserialize, Default)]
struct ScannerConfigFile {
    inactivity_ms: Option<u64>,
    viewport: Option<ViewportConfigFile>,
    style: Option<StyleConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ViewportConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct StyleConfigFile {
    padding: Option<f32>,
    corner_radius: Option<f32>,
    highlight_stroke: Option<f32>,
    category_text_size: Option<f32>,
    content_text_size: Option<f32>,
    line_spacing_mult: Option<f32>,
    line_spacing_add: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Idle time after which the overlay is cleared.
    pub inactivity: Duration,
    pub viewport: ViewportGeometry,
    pub style: LayoutStyle,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            inactivity: Duration::from_millis(DEFAULT_INACTIVITY_MS),
            viewport: ViewportGeometry::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            style: LayoutStyle::default(),
        }
    }
}

impl ScannerConfig {
    /// Defaults, then `SCAN_OVERLAY_CONFIG` (JSON file), then env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SCAN_OVERLAY_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads a JSON file directly, without environment overrides.
    pub fn from_path(path: &Path) -> Result<Self> {
        let cfg = Self::from_file(read_config_file(path)?);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Cadence of the inactivity check.
    pub fn check_interval(&self) -> Duration {
        self.inactivity / 2
    }

    fn from_file(file: ScannerConfigFile) -> Self {
        let defaults = Self::default();
        let inactivity = file
            .inactivity_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.inactivity);
        let viewport = ViewportGeometry::new(
            file.viewport
                .as_ref()
                .and_then(|vp| vp.width)
                .unwrap_or(defaults.viewport.width),
            file.viewport
                .as_ref()
                .and_then(|vp| vp.height)
                .unwrap_or(defaults.viewport.height),
        );
        let style_file = file.style.unwrap_or_default();
        let base = defaults.style;
        let style = LayoutStyle {
            padding: style_file.padding.unwrap_or(base.padding),
            corner_radius: style_file.corner_radius.unwrap_or(base.corner_radius),
            highlight_stroke: style_file.highlight_stroke.unwrap_or(base.highlight_stroke),
            category_text_size: style_file
                .category_text_size
                .unwrap_or(base.category_text_size),
            content_text_size: style_file
                .content_text_size
                .unwrap_or(base.content_text_size),
            line_spacing_mult: style_file
                .line_spacing_mult
                .unwrap_or(base.line_spacing_mult),
            line_spacing_add: style_file.line_spacing_add.unwrap_or(base.line_spacing_add),
        };
        Self {
            inactivity,
            viewport,
            style,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(ms) = std::env::var("SCAN_OVERLAY_INACTIVITY_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                anyhow!("SCAN_OVERLAY_INACTIVITY_MS must be an integer number of milliseconds")
            })?;
            self.inactivity = Duration::from_millis(ms);
        }
        if let Ok(viewport) = std::env::var("SCAN_OVERLAY_VIEWPORT") {
            if !viewport.trim().is_empty() {
                self.viewport = ViewportGeometry::parse(&viewport)
                    .map_err(|e| anyhow!("SCAN_OVERLAY_VIEWPORT: {}", e))?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.inactivity.as_millis() < 2 {
            return Err(anyhow!("inactivity must be at least 2 ms"));
        }
        if !self.viewport.is_valid() {
            return Err(anyhow!("viewport dimensions must be positive and finite"));
        }
        let style = &self.style;
        if style.padding < 0.0 || style.corner_radius < 0.0 || style.highlight_stroke < 0.0 {
            return Err(anyhow!("style padding, radius and stroke must not be negative"));
        }
        if !(style.category_text_size > 0.0 && style.content_text_size > 0.0) {
            return Err(anyhow!("text sizes must be positive"));
        }
        if style.line_spacing_mult <= 0.0 {
            return Err(anyhow!("line spacing multiplier must be positive"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ScannerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() -> Result<()> {
        let cfg = ScannerConfig::from_file(serde_json::from_str("{}")?);
        cfg.validate()?;
        assert_eq!(cfg.inactivity, Duration::from_millis(2000));
        assert_eq!(cfg.check_interval(), Duration::from_millis(1000));
        assert_eq!(cfg.viewport, ViewportGeometry::new(1080.0, 2400.0));
        assert_eq!(cfg.style, LayoutStyle::default());
        Ok(())
    }

    #[test]
    fn partial_style_keeps_other_defaults() -> Result<()> {
        let cfg = ScannerConfig::from_file(serde_json::from_str(
            r#"{ "style": { "padding": 20.0 } }"#,
        )?);
        assert_eq!(cfg.style.padding, 20.0);
        assert_eq!(cfg.style.content_text_size, 48.0);
        Ok(())
    }

    #[test]
    fn validation_rejects_nonsense() {
        let mut cfg = ScannerConfig::default();
        cfg.inactivity = Duration::ZERO;
        assert!(cfg.validate().is_err());

        let mut cfg = ScannerConfig::default();
        cfg.style.content_text_size = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScannerConfig::default();
        cfg.viewport.height = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScannerConfig::default();
        cfg.viewport.width = f32::INFINITY;
        assert!(cfg.validate().is_err());
    }
}
