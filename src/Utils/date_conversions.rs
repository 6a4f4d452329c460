//! Conversion of calendar dates into real-valued years since an epoch.
//! The algebra only ever sees the converted numbers; the converter is passed
//! explicitly to the constructors that accept dates.
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateConverter {
    pub epoch: NaiveDate,
    pub days_per_year: f64,
}

impl DateConverter {
    pub fn new(epoch: NaiveDate, days_per_year: f64) -> DateConverter {
        assert!(
            days_per_year > 0.0,
            "Days per year should be a positive number."
        );
        DateConverter {
            epoch,
            days_per_year,
        }
    }
    pub fn with_epoch(epoch: NaiveDate) -> DateConverter {
        DateConverter::new(epoch, 365.0)
    }
    /// signed year fraction, negative before the epoch
    pub fn years_from_epoch(&self, date: NaiveDate) -> f64 {
        let days = date.signed_duration_since(self.epoch).num_days();
        days as f64 / self.days_per_year
    }
    pub fn convert_all(&self, dates: &[NaiveDate]) -> Vec<f64> {
        dates.iter().map(|date| self.years_from_epoch(*date)).collect()
    }
}

impl Default for DateConverter {
    /// 1 January 2000, 365 day years
    fn default() -> Self {
        let epoch = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        DateConverter::with_epoch(epoch)
    }
}
