use crate::error::{ContourError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upper bound on best point samples along one cell edge. Finer steps stop
/// moving the sample in `f32` anyway.
pub const MAX_EDGE_SAMPLES: f32 = (1u32 << 24) as f32;

/// How the surface crossing on a bipolar grid edge is estimated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePointMode {
    /// Interpolate between the two endpoint samples.
    #[default]
    LinearApproximation,
    /// Re-sample the edge at a fixed step and take the first sign change.
    BestPointSelection,
}

impl FromStr for ChangePointMode {
    type Err = ContourError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "linearapproximation" | "linear" => Ok(Self::LinearApproximation),
            "bestpointselection" | "bestpoint" => Ok(Self::BestPointSelection),
            _ => Err(ContourError::UnsupportedChangePointMode(s.to_owned())),
        }
    }
}

/// Configuration for [`DualContouringBuilder`](crate::DualContouringBuilder).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// World-space edge length of one cell.
    pub cell_size: f32,
    /// Regularize each cell's QEF toward its mass point.
    pub use_bias: bool,
    pub bias_strength: f32,
    /// Search the cell's faces, edges and corners when the unconstrained
    /// vertex leaves the cell.
    pub boundary: bool,
    /// Clamp any vertex still outside its cell into the cell box.
    pub clip_to_cell_bounds: bool,
    pub change_point_mode: ChangePointMode,
    /// Sampling step for [`ChangePointMode::BestPointSelection`].
    pub best_point_accuracy: f32,
    /// Worker count. `None` lets rayon decide.
    pub max_parallelism: Option<usize>,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            use_bias: true,
            bias_strength: 0.01,
            boundary: true,
            clip_to_cell_bounds: false,
            change_point_mode: ChangePointMode::LinearApproximation,
            best_point_accuracy: 0.01,
            max_parallelism: None,
        }
    }
}

impl BuilderOptions {
    /// Parses options from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let options: Self = toml::from_str(s)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ContourError::InvalidOptions(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.best_point_accuracy.is_finite() && self.best_point_accuracy > 0.0) {
            return Err(ContourError::InvalidOptions(format!(
                "best_point_accuracy must be positive, got {}",
                self.best_point_accuracy
            )));
        }
        if !(self.cell_size / self.best_point_accuracy <= MAX_EDGE_SAMPLES) {
            return Err(ContourError::InvalidOptions(format!(
                "best_point_accuracy {} is too fine for cell_size {}",
                self.best_point_accuracy, self.cell_size
            )));
        }
        if !self.bias_strength.is_finite() {
            return Err(ContourError::InvalidOptions(format!(
                "bias_strength must be finite, got {}",
                self.bias_strength
            )));
        }
        if self.max_parallelism == Some(0) {
            return Err(ContourError::InvalidOptions(
                "max_parallelism must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let options = BuilderOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.change_point_mode, ChangePointMode::LinearApproximation);
        assert!(options.use_bias);
        assert!(options.boundary);
        assert!(!options.clip_to_cell_bounds);
    }

    #[test]
    fn parses_partial_toml() {
        let options = BuilderOptions::from_toml_str(
            r#"
            cell_size = 0.25
            change_point_mode = "best_point_selection"
            max_parallelism = 2
            "#,
        )
        .unwrap();
        assert_eq!(options.cell_size, 0.25);
        assert_eq!(options.change_point_mode, ChangePointMode::BestPointSelection);
        assert_eq!(options.max_parallelism, Some(2));
        assert_eq!(options.bias_strength, 0.01);
    }

    #[test]
    fn rejects_unknown_mode_in_toml() {
        let err = BuilderOptions::from_toml_str(r#"change_point_mode = "bisection""#).unwrap_err();
        assert!(matches!(err, ContourError::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = BuilderOptions::from_toml_str("cell_size = 0.0").unwrap_err();
        assert!(matches!(err, ContourError::InvalidOptions(_)));

        let options = BuilderOptions {
            max_parallelism: Some(0),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = BuilderOptions {
            best_point_accuracy: -0.1,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn rejects_accuracy_too_fine_for_cell_size() {
        let options = BuilderOptions {
            best_point_accuracy: 1e-30,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(matches!(err, ContourError::InvalidOptions(_)));

        let options = BuilderOptions {
            cell_size: 2.0,
            best_point_accuracy: 2.0 / MAX_EDGE_SAMPLES,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn mode_from_str_is_lenient_about_spelling() {
        assert_eq!(
            "LinearApproximation".parse::<ChangePointMode>().unwrap(),
            ChangePointMode::LinearApproximation
        );
        assert_eq!(
            "best-point-selection".parse::<ChangePointMode>().unwrap(),
            ChangePointMode::BestPointSelection
        );
        let err = "newton".parse::<ChangePointMode>().unwrap_err();
        assert!(matches!(err, ContourError::UnsupportedChangePointMode(s) if s == "newton"));
    }
}
