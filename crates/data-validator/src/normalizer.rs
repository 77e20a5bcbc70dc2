//! Frozen Scalers and Encoders
//!
//! Parameters are learned offline and only ever applied here. Nothing in this
//! module updates its state after construction.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Treat a zero range/scale as 1 so constant training columns map to an offset
fn handle_zero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}

/// A fitted numeric scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// Min-max scaling into `feature_range`
    MinMax {
        data_min: f64,
        data_max: f64,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
    /// Median/IQR scaling
    Robust { center: f64, scale: f64 },
    /// Z-score scaling
    Standard { mean: f64, scale: f64 },
    /// Pass-through
    Identity,
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl Scaler {
    /// Apply the learned parameters to a single value
    pub fn transform(&self, value: f64) -> f64 {
        match *self {
            Scaler::MinMax {
                data_min,
                data_max,
                feature_range: (lo, hi),
            } => {
                let scale = (hi - lo) / handle_zero(data_max - data_min);
                value * scale + (lo - data_min * scale)
            }
            Scaler::Robust { center, scale } => (value - center) / handle_zero(scale),
            Scaler::Standard { mean, scale } => (value - mean) / handle_zero(scale),
            Scaler::Identity => value,
        }
    }

    /// Check that the parameters describe a usable scaler
    pub fn validate(&self) -> Result<(), ValidationError> {
        let params: Vec<f64> = match self {
            Scaler::MinMax {
                data_min,
                data_max,
                feature_range,
            } => {
                if data_max < data_min {
                    return Err(ValidationError::InvalidFormat(format!(
                        "min_max data_max {} is below data_min {}",
                        data_max, data_min
                    )));
                }
                if feature_range.1 <= feature_range.0 {
                    return Err(ValidationError::InvalidFormat(format!(
                        "min_max feature_range {:?} is empty",
                        feature_range
                    )));
                }
                vec![*data_min, *data_max, feature_range.0, feature_range.1]
            }
            Scaler::Robust { center, scale } => vec![*center, *scale],
            Scaler::Standard { mean, scale } => vec![*mean, *scale],
            Scaler::Identity => Vec::new(),
        };

        if params.iter().all(|p| p.is_finite()) {
            Ok(())
        } else {
            Err(ValidationError::InvalidFormat(format!(
                "non-finite scaler parameter in {:?}",
                self
            )))
        }
    }
}

/// A fitted label encoder: each label maps to its index in `classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Sorted, unique class labels
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from labels, sorting and de-duplicating them
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Encode a label
    pub fn transform(&self, label: &str) -> Result<usize, ValidationError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| ValidationError::UnknownLabel {
                label: label.to_string(),
                known: self.classes.clone(),
            })
    }

    /// Check that classes are non-empty, sorted and unique
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.classes.is_empty() {
            return Err(ValidationError::InvalidFormat(
                "label encoder has no classes".to_string(),
            ));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ValidationError::InvalidFormat(format!(
                "label encoder classes must be sorted and unique: {:?}",
                self.classes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_scaling() {
        let scaler = Scaler::MinMax {
            data_min: 2013.0,
            data_max: 2015.0,
            feature_range: (0.0, 1.0),
        };
        assert!((scaler.transform(2013.0)).abs() < 1e-12);
        assert!((scaler.transform(2014.0) - 0.5).abs() < 1e-12);
        assert!((scaler.transform(2015.0) - 1.0).abs() < 1e-12);
        // No clipping outside the training range
        assert!((scaler.transform(2016.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_min_max_custom_range() {
        let scaler = Scaler::MinMax {
            data_min: 0.0,
            data_max: 10.0,
            feature_range: (-1.0, 1.0),
        };
        assert!((scaler.transform(5.0)).abs() < 1e-12);
        assert!((scaler.transform(10.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let scaler = Scaler::MinMax {
            data_min: 3.0,
            data_max: 3.0,
            feature_range: (0.0, 1.0),
        };
        assert_eq!(scaler.transform(3.0), 0.0);

        let robust = Scaler::Robust {
            center: 1.0,
            scale: 0.0,
        };
        assert_eq!(robust.transform(4.0), 3.0);
    }

    #[test]
    fn test_robust_scaling() {
        let scaler = Scaler::Robust {
            center: 2330.0,
            scale: 5980.0,
        };
        assert!((scaler.transform(2330.0)).abs() < 1e-12);
        assert!((scaler.transform(8310.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_stateless() {
        let scaler = Scaler::Standard {
            mean: 10.0,
            scale: 2.0,
        };
        let apply = |values: &[f64]| values.iter().map(|&v| scaler.transform(v)).collect::<Vec<_>>();
        let first = apply(&[10.0, 12.0]);
        let _ = apply(&[1000.0, -1000.0, 5.0]);
        let again = apply(&[10.0, 12.0]);
        assert_eq!(first, again);
        assert_eq!(first, vec![0.0, 1.0]);
    }

    #[test]
    fn test_scaler_json_format() {
        let json = r#"{"kind":"min_max","data_min":2013,"data_max":2015}"#;
        let scaler: Scaler = serde_json::from_str(json).unwrap();
        assert_eq!(
            scaler,
            Scaler::MinMax {
                data_min: 2013.0,
                data_max: 2015.0,
                feature_range: (0.0, 1.0),
            }
        );
    }

    #[test]
    fn test_invalid_scalers() {
        let inverted = Scaler::MinMax {
            data_min: 5.0,
            data_max: 1.0,
            feature_range: (0.0, 1.0),
        };
        assert!(inverted.validate().is_err());

        let nan = Scaler::Robust {
            center: f64::NAN,
            scale: 1.0,
        };
        assert!(nan.validate().is_err());
        assert!(Scaler::Identity.validate().is_ok());
    }

    #[test]
    fn test_label_encoder() {
        let encoder = LabelEncoder::new(["d", "a", "c", "b", "a"]);
        assert_eq!(encoder.classes, vec!["a", "b", "c", "d"]);
        assert_eq!(encoder.transform("a").unwrap(), 0);
        assert_eq!(encoder.transform("d").unwrap(), 3);
        assert!(matches!(
            encoder.transform("e"),
            Err(ValidationError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_unsorted_label_encoder_rejected() {
        let encoder = LabelEncoder {
            classes: vec!["b".to_string(), "a".to_string()],
        };
        assert!(encoder.validate().is_err());
        assert!(LabelEncoder { classes: vec![] }.validate().is_err());
    }
}
