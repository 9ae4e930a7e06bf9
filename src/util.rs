use chrono::{Local, NaiveDate};
use crate::errors::{Result, ReportError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// 本地日历日期
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT).map_err(ReportError::from)
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Parses page percentages such as `+1.23%`, `(-0.45%)` or `1,234.5`.
pub fn parse_percent(text: &str) -> Result<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '%' | ',') && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|e| ReportError::DataError(format!("Invalid percentage '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_iso_dates() {
        let date = parse_date(" 2016-10-17 ").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 10, 17).unwrap());
        assert_eq!(format_date(&date), "2016-10-17");
        assert!(matches!(parse_date("17/10/2016"), Err(ReportError::DateError(_))));
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 3.0]), Some(2.0));
    }

    #[test]
    fn parse_percent_strips_decorations() {
        assert_eq!(parse_percent("(+1.25%)").unwrap(), 1.25);
        assert_eq!(parse_percent("-0.5%").unwrap(), -0.5);
        assert_eq!(parse_percent(" 1,000.5 ").unwrap(), 1000.5);
        assert!(parse_percent("n/a").is_err());
    }
}
