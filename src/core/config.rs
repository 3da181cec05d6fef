//! Configuration system for fade and viewport-refresh tuning
//!
//! Users pick a preset profile or supply custom options, either in code or
//! as (partial) JSON layered over the defaults.

use crate::core::constants::{
    DEFAULT_BOUNDS_PADDING, DEFAULT_FADE_STEP, DEFAULT_FADE_TICK_MS, DEFAULT_REFRESH_DEBOUNCE_MS,
    DEFAULT_SIGNIFICANCE_RATIO,
};
use crate::{OverlayError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineProfile {
    Balanced,
    /// Snaps opacity in a single tick and refreshes imagery less eagerly.
    LowPower,
    Smooth,
    Custom(EngineOptions),
}

impl EngineProfile {
    pub fn resolve(&self) -> EngineOptions {
        match self {
            Self::Balanced => EngineOptions::default(),
            Self::LowPower => EngineOptions {
                fade: FadeConfig {
                    step: 1.0,
                    tick_interval_ms: 33,
                },
                viewport: ViewportGateConfig {
                    significance_ratio: 0.25,
                    padding_ratio: 0.5,
                    debounce_ms: 1000,
                    min_refresh_zoom: Some(12.0),
                },
            },
            Self::Smooth => EngineOptions {
                fade: FadeConfig {
                    step: 0.025,
                    tick_interval_ms: 16,
                },
                viewport: ViewportGateConfig {
                    significance_ratio: DEFAULT_SIGNIFICANCE_RATIO,
                    padding_ratio: DEFAULT_BOUNDS_PADDING,
                    debounce_ms: 250,
                    min_refresh_zoom: None,
                },
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineOptions {
    pub fade: FadeConfig,
    pub viewport: ViewportGateConfig,
}

impl EngineOptions {
    /// Parses options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: EngineOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        self.fade.validate()?;
        self.viewport.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FadeConfig {
    /// Fixed opacity increment per tick, in (0, 1]
    pub step: f32,
    pub tick_interval_ms: u64,
}

impl FadeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Worst-case number of ticks for a full 0 -> 1 fade
    pub fn max_ticks(&self) -> u32 {
        (1.0 / self.step).ceil() as u32
    }

    fn validate(&self) -> Result<()> {
        if !(self.step > 0.0 && self.step <= 1.0) {
            return Err(OverlayError::Config(format!(
                "fade step must be in (0, 1], got {}",
                self.step
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(OverlayError::Config(
                "fade tick interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_FADE_STEP,
            tick_interval_ms: DEFAULT_FADE_TICK_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportGateConfig {
    pub significance_ratio: f64,
    pub padding_ratio: f64,
    pub debounce_ms: u64,
    /// Refreshes are suppressed while the map is zoomed out past this level.
    pub min_refresh_zoom: Option<f64>,
}

impl ViewportGateConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    fn validate(&self) -> Result<()> {
        if !(self.significance_ratio > 0.0 && self.significance_ratio.is_finite()) {
            return Err(OverlayError::Config(format!(
                "significance ratio must be positive, got {}",
                self.significance_ratio
            )));
        }
        if !(self.padding_ratio >= 0.0 && self.padding_ratio.is_finite()) {
            return Err(OverlayError::Config(format!(
                "padding ratio must be non-negative, got {}",
                self.padding_ratio
            )));
        }
        Ok(())
    }
}

impl Default for ViewportGateConfig {
    fn default() -> Self {
        Self {
            significance_ratio: DEFAULT_SIGNIFICANCE_RATIO,
            padding_ratio: DEFAULT_BOUNDS_PADDING,
            debounce_ms: DEFAULT_REFRESH_DEBOUNCE_MS,
            min_refresh_zoom: None,
        }
    }
}
