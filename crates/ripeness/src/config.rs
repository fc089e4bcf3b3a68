use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{Result, RipenessError};

/// Canonical working resolution, width x height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalSize {
    pub width: u32,
    pub height: u32,
}

/// How the gamma value for lightness correction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GammaMode {
    /// Always use the same gamma
    Fixed { gamma: f32 },
    /// `target / mean(L)`, clamped to `[min, max]`
    Adaptive { target: f32, min: f32, max: f32 },
}

impl GammaMode {
    /// Adaptive parameters used when a gamma suggestion is requested.
    pub const DEFAULT_ADAPTIVE: GammaMode = GammaMode::Adaptive {
        target: 168.0,
        min: 0.7,
        max: 1.0,
    };
}

/// Closed range on one 8-bit LAB channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChannelRange {
    pub low: u8,
    pub high: u8,
}

impl ChannelRange {
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: u8) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Ratio cut-offs, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Thresholds {
    /// Ratios at or above this are ripe
    pub ripe_min: f64,
    /// Ratios at or below this are unripe
    pub unripe_max: f64,
}

/// Hysteresis thresholds for the Canny edge map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EdgeThresholds {
    pub low: f32,
    pub high: f32,
}

impl EdgeThresholds {
    /// Canny requires `0 <= low <= high`.
    pub fn validate(&self) -> Result<()> {
        if self.low >= 0.0 && self.low <= self.high && self.high.is_finite() {
            Ok(())
        } else {
            Err(RipenessError::InvalidConfig(format!(
                "edge thresholds need 0 <= low <= high, got low {}, high {}",
                self.low, self.high
            )))
        }
    }
}

/// Largest accepted structuring element side.
pub const MAX_KERNEL_SIZE: u32 = 99;

/// Every tunable constant of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisConfig {
    /// Side of the elliptical structuring element used for closing
    #[schemars(range(min = 1, max = 99))]
    pub kernel_size: u32,
    pub canonical_size: CanonicalSize,
    pub gamma: GammaMode,
    /// Range on the `a` channel treated as red
    pub red_range: ChannelRange,
    /// Range on the `b` channel treated as yellow
    pub yellow_range: ChannelRange,
    pub thresholds: Thresholds,
    pub edges: EdgeThresholds,
}

/// Named configuration presets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Preset {
    /// Single-image analysis
    #[default]
    InteractiveDefault,
    /// Dataset sorting
    BatchDefault,
}

impl Preset {
    pub fn config(self) -> AnalysisConfig {
        match self {
            Self::InteractiveDefault => AnalysisConfig::interactive(),
            Self::BatchDefault => AnalysisConfig::batch(),
        }
    }

    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }
}

impl AnalysisConfig {
    pub fn interactive() -> Self {
        Self {
            kernel_size: 11,
            canonical_size: CanonicalSize { width: 300, height: 300 },
            gamma: GammaMode::DEFAULT_ADAPTIVE,
            red_range: ChannelRange::new(140, 210),
            yellow_range: ChannelRange::new(165, 200),
            thresholds: Thresholds {
                ripe_min: 80.0,
                unripe_max: 20.0,
            },
            edges: EdgeThresholds { low: 50.0, high: 150.0 },
        }
    }

    pub fn batch() -> Self {
        Self {
            kernel_size: 5,
            canonical_size: CanonicalSize { width: 250, height: 300 },
            gamma: GammaMode::Fixed { gamma: 1.0 },
            red_range: ChannelRange::new(140, 200),
            thresholds: Thresholds {
                ripe_min: 85.0,
                unripe_max: 20.0,
            },
            ..Self::interactive()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RipenessError::InvalidConfig(msg));

        if self.canonical_size.width == 0 || self.canonical_size.height == 0 {
            return invalid(format!(
                "canonical size must be non-zero, got {}x{}",
                self.canonical_size.width, self.canonical_size.height
            ));
        }
        if self.kernel_size == 0 || self.kernel_size > MAX_KERNEL_SIZE || self.kernel_size % 2 == 0 {
            return invalid(format!(
                "kernel_size must be odd and within 1..={MAX_KERNEL_SIZE}, got {}",
                self.kernel_size
            ));
        }
        for (name, range) in [("red_range", self.red_range), ("yellow_range", self.yellow_range)] {
            if range.low > range.high {
                return invalid(format!("{name}: low {} exceeds high {}", range.low, range.high));
            }
        }
        if self.thresholds.unripe_max >= self.thresholds.ripe_min {
            return invalid(format!(
                "unripe_max {} must be below ripe_min {}",
                self.thresholds.unripe_max, self.thresholds.ripe_min
            ));
        }
        match self.gamma {
            GammaMode::Fixed { gamma } if !(gamma > 0.0) => {
                return invalid(format!("gamma must be positive, got {gamma}"));
            }
            GammaMode::Adaptive { target, min, max }
                if !(target > 0.0 && min > 0.0 && min <= max) =>
            {
                return invalid(format!(
                    "adaptive gamma needs target > 0 and 0 < min <= max, got target {target}, min {min}, max {max}"
                ));
            }
            _ => {}
        }
        self.edges.validate()
    }

    /// Get the JSON schema for the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisConfig)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            _ => Err(RipenessError::UnsupportedConfigFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in [Preset::InteractiveDefault, Preset::BatchDefault] {
            preset.config().validate().expect("Preset should validate");
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(Preset::names(), &["interactive-default", "batch-default"]);
        assert_eq!(
            "batch-default".parse::<Preset>().unwrap(),
            Preset::BatchDefault
        );
    }

    #[test]
    fn test_batch_preset_differs_where_expected() {
        let batch = AnalysisConfig::batch();
        assert_eq!(batch.red_range, ChannelRange::new(140, 200));
        assert_eq!(batch.yellow_range, ChannelRange::new(165, 200));
        assert_eq!(batch.kernel_size, 5);
        assert_eq!(batch.thresholds.ripe_min, 85.0);
        assert_eq!(batch.canonical_size, CanonicalSize { width: 250, height: 300 });
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalysisConfig::interactive();
        let text = config.to_toml().expect("Should serialize");
        assert!(text.contains("mode = \"adaptive\""));
        let parsed = AnalysisConfig::from_toml(&text).expect("Should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = AnalysisConfig::interactive();
        config.thresholds.unripe_max = 90.0;
        let json = config.to_json().unwrap();
        assert!(matches!(
            AnalysisConfig::from_json(&json),
            Err(RipenessError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_kernel_size_bounds() {
        for kernel_size in [0, 4, 101, 50_000] {
            let config = AnalysisConfig { kernel_size, ..AnalysisConfig::batch() };
            assert!(
                matches!(config.validate(), Err(RipenessError::InvalidConfig(_))),
                "kernel_size {kernel_size} should be rejected"
            );
        }
        for kernel_size in [1, 11, 99] {
            let config = AnalysisConfig { kernel_size, ..AnalysisConfig::batch() };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_inverted_edge_thresholds_rejected() {
        let mut text = AnalysisConfig::interactive().to_toml().unwrap();
        text = text.replace("low = 50.0", "low = 200.0");
        assert!(text.contains("low = 200.0"));
        assert!(matches!(
            AnalysisConfig::from_toml(&text),
            Err(RipenessError::InvalidConfig(_))
        ));
        assert!(EdgeThresholds { low: -1.0, high: 10.0 }.validate().is_err());
        assert!(EdgeThresholds { low: 50.0, high: 50.0 }.validate().is_ok());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert!(matches!(
            AnalysisConfig::from_file("config.yaml"),
            Err(RipenessError::UnsupportedConfigFormat)
        ));
    }

    #[test]
    fn test_channel_range_is_closed() {
        let range = ChannelRange::new(140, 210);
        assert!(range.contains(140));
        assert!(range.contains(210));
        assert!(!range.contains(139));
        assert!(!range.contains(211));
    }
}
