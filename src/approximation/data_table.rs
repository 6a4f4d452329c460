//! Column oriented table of observations used by the regression constructors.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::Point;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct DataTable {
    pub columns: BTreeMap<String, Vec<f64>>,
    nrows: usize,
}

impl DataTable {
    pub fn new() -> DataTable {
        DataTable::default()
    }
    /// all columns must have the same length
    pub fn from_columns<I, S>(columns: I) -> Result<DataTable>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = DataTable::new();
        for (name, values) in columns {
            table.add_column(name, values)?;
        }
        Ok(table)
    }
    pub fn add_column<S: Into<String>>(&mut self, name: S, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.nrows {
            return Err(FunctionError::InvalidInput(format!(
                "column '{}' has {} rows, the table has {}",
                name,
                values.len(),
                self.nrows
            )));
        }
        if values.iter().any(|value| !value.is_finite()) {
            return Err(FunctionError::InvalidInput(format!(
                "column '{}' contains non-finite values",
                name
            )));
        }
        self.nrows = values.len();
        self.columns.insert(name, values);
        Ok(())
    }
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .get(name)
            .map(|values| values.as_slice())
            .ok_or_else(|| FunctionError::MissingDimension(name.to_string()))
    }
    /// the named columns in the given order
    pub fn columns_of(&self, names: &[String]) -> Result<Vec<&[f64]>> {
        names.iter().map(|name| self.column(name)).collect()
    }
    pub fn nrows(&self) -> usize {
        self.nrows
    }
    pub fn is_empty(&self) -> bool {
        self.nrows == 0
    }
    /// values of row `row` on `dims` as an evaluation point
    pub fn row_point(&self, row: usize, dims: &[String]) -> Result<Point> {
        let mut point = Point::new();
        for dim in dims {
            let column = self.column(dim)?;
            let value = column.get(row).ok_or_else(|| {
                FunctionError::InvalidInput(format!("row {} out of range", row))
            })?;
            point.insert(dim.clone(), *value);
        }
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_must_agree() {
        let mut table = DataTable::from_columns([("x", vec![1.0, 2.0]), ("y", vec![3.0, 4.0])]).unwrap();
        assert_eq!(table.nrows(), 2);
        let err = table.add_column("z", vec![1.0]).unwrap_err();
        assert!(matches!(err, FunctionError::InvalidInput(_)));
        let err = table.column("w").unwrap_err();
        assert_eq!(err, FunctionError::MissingDimension("w".to_string()));
        let point = table.row_point(1, &["x".to_string(), "y".to_string()]).unwrap();
        assert_eq!(point["y"], 4.0);
    }
}
