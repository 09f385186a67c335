//! Tunables for marker placement and measure detection.
//!
//! Every field has a default, so an empty JSON object (or no config at all)
//! reproduces the renderer's standard layout.

use serde::{Deserialize, Serialize};

use crate::error::{LickError, Result};
use crate::measures::DetectOptions;
use crate::overlay::OverlayOptions;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LickConfig {
    pub overlay: OverlayOptions,
    pub detect: DetectOptions,
}

impl LickConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LickConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.overlay.radius.is_finite() || self.overlay.radius <= 0.0 {
            return Err(LickError::Config(format!(
                "marker radius must be positive, got {}",
                self.overlay.radius
            )));
        }
        if !self.overlay.glyph_spacing.is_finite() || self.overlay.glyph_spacing < 0.0 {
            return Err(LickError::Config(format!(
                "glyph spacing must be non-negative, got {}",
                self.overlay.glyph_spacing
            )));
        }
        if !self.detect.width_threshold.is_finite() || self.detect.width_threshold < 0.0 {
            return Err(LickError::Config(format!(
                "width threshold must be non-negative, got {}",
                self.detect.width_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::ScanStrategy;

    #[test]
    fn empty_json_uses_defaults() {
        let config = LickConfig::from_json("{}").unwrap();
        assert_eq!(config, LickConfig::default());
        assert_eq!(config.overlay.radius, 8.0);
        assert_eq!(config.detect.width_threshold, 20.0);
        assert_eq!(config.detect.repeat_check_index, 6);
        assert_eq!(config.detect.strategy, ScanStrategy::EarlyExit);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            LickConfig::from_json(r#"{"detect": {"strategy": "full_scan", "width_threshold": 12}}"#)
                .unwrap();
        assert_eq!(config.detect.strategy, ScanStrategy::FullScan);
        assert_eq!(config.detect.width_threshold, 12.0);
        assert_eq!(config.detect.repeat_check_index, 6);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(LickConfig::from_json(r#"{"overlay": {"radius": 0}}"#).is_err());
        assert!(LickConfig::from_json(r#"{"detect": {"width_threshold": -1}}"#).is_err());
    }
}
