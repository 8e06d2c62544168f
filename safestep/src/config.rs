use crate::navigate::obstacle::{ObstacleClassSet, DEFAULT_OBSTACLE_CLASSES};
use crate::navigate::{Navigator, DEFAULT_MIN_HORIZONTAL_INTERSECTION};
use anyhow::{bail, Context, Result};
use safestep_inference::source::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    pub navigation: NavigationSection,
    pub detection: DetectionSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationSection {
    pub min_horizontal_intersection: f64,
    pub obstacle_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionSection {
    pub confidence_threshold: f64,
    /// Frame size assumed when the detector omits it.
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            min_horizontal_intersection: DEFAULT_MIN_HORIZONTAL_INTERSECTION,
            obstacle_classes: DEFAULT_OBSTACLE_CLASSES.map(String::from).to_vec(),
        }
    }
}

impl Default for DetectionSection {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl NavigationConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: NavigationConfig =
            toml::from_str(contents).context("Invalid navigation config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    /// Loads `path` when given, else the defaults, then applies a log level
    /// override. Runs before any logger exists, so it does not log.
    pub fn resolve(path: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(level) = log_level {
            config.logging.level = level.to_string();
            config.log_level()?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.navigation.min_horizontal_intersection;
        if !(threshold > 0.0 && threshold <= 1.0) {
            bail!("min_horizontal_intersection must be in (0, 1], got {threshold}");
        }
        if self.navigation.obstacle_classes.is_empty() {
            bail!("obstacle_classes must name at least one class");
        }

        let confidence = self.detection.confidence_threshold;
        if !(0.0..=1.0).contains(&confidence) {
            bail!("confidence_threshold must be in [0, 1], got {confidence}");
        }
        if self.detection.frame_width == 0 || self.detection.frame_height == 0 {
            bail!(
                "Frame size must be positive, got {}x{}",
                self.detection.frame_width,
                self.detection.frame_height
            );
        }

        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        self.logging
            .level
            .parse()
            .with_context(|| format!("Unknown log level '{}'", self.logging.level))
    }

    pub fn obstacle_classes(&self) -> ObstacleClassSet {
        self.navigation.obstacle_classes.iter().cloned().collect()
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(
            self.obstacle_classes(),
            self.navigation.min_horizontal_intersection,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() -> Result<()> {
        let config = NavigationConfig::from_toml_str("")?;
        assert_eq!(config, NavigationConfig::default());
        assert_eq!(config.navigation.min_horizontal_intersection, 0.33);
        assert_eq!(config.detection.confidence_threshold, 0.35);
        assert_eq!(
            (config.detection.frame_width, config.detection.frame_height),
            (960, 540)
        );
        assert_eq!(config.log_level()?, LevelFilter::INFO);
        Ok(())
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() -> Result<()> {
        let config = NavigationConfig::from_toml_str(
            r#"
            [navigation]
            obstacle_classes = ["person", "door"]

            [logging]
            level = "debug"
            "#,
        )?;

        let classes = config.obstacle_classes();
        assert_eq!(classes.sorted(), ["door", "person"]);
        assert_eq!(config.navigation.min_horizontal_intersection, 0.33);
        assert_eq!(config.log_level()?, LevelFilter::DEBUG);
        Ok(())
    }

    #[test]
    fn thresholds_render_as_written() -> Result<()> {
        let rendered = toml::to_string_pretty(&NavigationConfig::default())?;
        assert!(rendered.contains("min_horizontal_intersection = 0.33\n"), "{rendered}");
        assert!(rendered.contains("confidence_threshold = 0.35\n"), "{rendered}");
        Ok(())
    }

    #[test]
    fn resolve_applies_log_level_override() -> Result<()> {
        let config = NavigationConfig::resolve(None, Some("trace"))?;
        assert_eq!(config.log_level()?, LevelFilter::TRACE);
        assert_eq!(config.navigation, NavigationSection::default());

        assert!(NavigationConfig::resolve(None, Some("loud")).is_err());
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            "[navigation]\nmin_horizontal_intersection = 0.0",
            "[navigation]\nmin_horizontal_intersection = 1.5",
            "[navigation]\nobstacle_classes = []",
            "[detection]\nconfidence_threshold = -0.1",
            "[detection]\nframe_width = 0",
            "[logging]\nlevel = \"loud\"",
            "[navigation]\nthreshold = 0.5",
        ];

        for case in cases {
            assert!(
                NavigationConfig::from_toml_str(case).is_err(),
                "accepted: {case}"
            );
        }
    }
}
