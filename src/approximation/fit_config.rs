//! Settings of the data driven fits: OLS degree, MARS and recursive partitioning.
//! Setters validate with `assert!`; configuration read from TOML is validated into errors.
use crate::Utils::logger::is_valid_loglevel;
use crate::algebra::algebra_errors::{FunctionError, Result};
use log::debug;
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    /// bracket width of the split refinement (relative to the data range) and
    /// minimal relative improvement of the residual sum of squares for a split to be accepted
    pub relative_tolerance: f64,
    pub max_splits: usize,
    /// total degree of the OLS monomial basis
    pub degree: usize,
    /// number of coarse grid points in split searches
    pub node_count: usize,
    pub min_points_per_region: usize,
    pub loglevel: Option<String>,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            relative_tolerance: 1e-2,
            max_splits: 5,
            degree: 1,
            node_count: 10,
            min_points_per_region: 5,
            loglevel: None,
        }
    }
}

impl FitConfig {
    pub fn new() -> FitConfig {
        FitConfig::default()
    }
    pub fn set_relative_tolerance(&mut self, relative_tolerance: f64) -> &mut Self {
        assert!(
            relative_tolerance > 0.0 && relative_tolerance < 1.0,
            "Relative tolerance should be in (0.0, 1.0)."
        );
        self.relative_tolerance = relative_tolerance;
        self
    }
    pub fn set_max_splits(&mut self, max_splits: usize) -> &mut Self {
        self.max_splits = max_splits;
        self
    }
    pub fn set_degree(&mut self, degree: usize) -> &mut Self {
        assert!(degree > 0, "Degree should be a positive number.");
        self.degree = degree;
        self
    }
    pub fn set_node_count(&mut self, node_count: usize) -> &mut Self {
        assert!(node_count > 1, "At least two grid nodes are needed.");
        self.node_count = node_count;
        self
    }
    pub fn set_min_points_per_region(&mut self, min_points: usize) -> &mut Self {
        assert!(min_points > 0, "Regions should hold at least one point.");
        self.min_points_per_region = min_points;
        self
    }
    pub fn set_loglevel(&mut self, loglevel: Option<String>) -> &mut Self {
        if let Some(level) = &loglevel {
            assert!(
                is_valid_loglevel(level),
                "loglevel must be debug, info, warn, error, off or none"
            );
        }
        self.loglevel = loglevel;
        self
    }

    /// Reads a flat TOML table, e.g.
    /// ```toml
    /// relative_tolerance = 1e-3
    /// max_splits = 7
    /// loglevel = "info"
    /// ```
    /// Missing keys keep their defaults. Unknown keys, wrong types and out of range values
    /// give `InvalidInput`.
    pub fn from_toml_str(content: &str) -> Result<FitConfig> {
        let table: Table = content
            .parse()
            .map_err(|err| FunctionError::InvalidInput(format!("malformed TOML: {}", err)))?;
        let mut config = FitConfig::default();
        for (key, value) in &table {
            debug!("fit config: {} = {}", key, value);
            match key.as_str() {
                "relative_tolerance" => {
                    let tolerance = float_value(key, value)?;
                    if !(tolerance > 0.0 && tolerance < 1.0) {
                        return Err(out_of_range(key, value));
                    }
                    config.relative_tolerance = tolerance;
                }
                "max_splits" => config.max_splits = count_value(key, value, 0)?,
                "degree" => config.degree = count_value(key, value, 1)?,
                "node_count" => config.node_count = count_value(key, value, 2)?,
                "min_points_per_region" => {
                    config.min_points_per_region = count_value(key, value, 1)?
                }
                "loglevel" => {
                    let level = value.as_str().ok_or_else(|| wrong_type(key, "string"))?;
                    if !is_valid_loglevel(level) {
                        return Err(out_of_range(key, value));
                    }
                    config.loglevel = Some(level.to_string());
                }
                _ => {
                    return Err(FunctionError::InvalidInput(format!(
                        "unknown fit setting '{}'",
                        key
                    )));
                }
            }
        }
        Ok(config)
    }
}

fn wrong_type(key: &str, expected: &str) -> FunctionError {
    FunctionError::InvalidInput(format!("setting '{}' should be a {}", key, expected))
}
fn out_of_range(key: &str, value: &Value) -> FunctionError {
    FunctionError::InvalidInput(format!("setting '{}' has invalid value {}", key, value))
}
// integers are accepted where floats are expected
fn float_value(key: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Float(number) => Ok(*number),
        Value::Integer(number) => Ok(*number as f64),
        _ => Err(wrong_type(key, "number")),
    }
}
fn count_value(key: &str, value: &Value, minimum: i64) -> Result<usize> {
    let number = value.as_integer().ok_or_else(|| wrong_type(key, "integer"))?;
    if number < minimum {
        return Err(out_of_range(key, value));
    }
    Ok(number as usize)
}
