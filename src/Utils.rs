//! different utility modules used throughout the project
/// tiny module to start terminal logging at a given level
pub mod logger;
/// conversion of calendar dates into years since an epoch
/// ```
/// use RustedFunctionAlgebra::Utils::date_conversions::DateConverter;
/// use chrono::NaiveDate;
/// let converter = DateConverter::with_epoch(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
/// let years = converter.years_from_epoch(NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
/// assert_eq!(years, 1.0);
/// ```
pub mod date_conversions;
