use crate::errors::{Result, ReportError};
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

/// 图表数据：有序的 (标签, 数值) 序列与坐标轴标题
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(String, f64)>,
}

impl ChartSeries {
    pub fn bar(x_label: &str, y_label: &str, points: Vec<(String, f64)>) -> Self {
        Self {
            kind: ChartKind::Bar,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            points,
        }
    }

    pub fn line(x_label: &str, y_label: &str, points: Vec<(String, f64)>) -> Self {
        Self {
            kind: ChartKind::Line,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            points,
        }
    }
}

fn format_error(e: fmt::Error) -> ReportError {
    ReportError::DataError(format!("Chart formatting failed: {}", e))
}

/// Base trait for anything that can draw a chart series
pub trait ChartRenderer {
    fn render(&self, series: &ChartSeries) -> Result<String>;
}

/// Horizontal ASCII bars, one row per point.
pub struct TextChartRenderer {
    width: usize,
}

impl TextChartRenderer {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(1) }
    }
}

impl ChartRenderer for TextChartRenderer {
    fn render(&self, series: &ChartSeries) -> Result<String> {
        if series.points.iter().any(|(_, v)| !v.is_finite()) {
            return Err(ReportError::DataError(format!(
                "Chart '{}' contains non-finite values",
                series.y_label
            )));
        }

        let label_width = series
            .points
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0)
            .max(series.x_label.chars().count());
        let max_abs = series
            .points
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max);

        let mut out = String::new();
        writeln!(out, "{}", series.y_label).map_err(format_error)?;
        writeln!(out, "{:<width$} | value", series.x_label, width = label_width).map_err(format_error)?;
        writeln!(out, "{:-<1$}", "", label_width + self.width + 12).map_err(format_error)?;

        for (label, value) in &series.points {
            let len = if max_abs > 0.0 {
                ((value.abs() / max_abs) * self.width as f64).round() as usize
            } else {
                0
            };
            // 涨为 +，跌为 -
            let glyph = if *value < 0.0 { "-" } else { "+" };
            writeln!(
                out,
                "{:<lw$} | {:>8.2} {}",
                label,
                value,
                glyph.repeat(len),
                lw = label_width
            )
            .map_err(format_error)?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_largest_absolute_value() {
        let series = ChartSeries::bar(
            "Sector",
            "Average Market Move (in %) on 2020-01-01",
            vec![("Tech".to_string(), 2.0), ("Energy".to_string(), -4.0)],
        );

        let text = TextChartRenderer::new(8).render(&series).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Average Market Move (in %) on 2020-01-01");
        assert!(lines[3].starts_with("Tech   |     2.00 ++++"));
        assert!(lines[3].ends_with("++++"));
        assert!(lines[4].ends_with("--------"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let series = ChartSeries::line("Date", "y", vec![("a".to_string(), f64::NAN)]);
        assert!(TextChartRenderer::new(10).render(&series).is_err());
    }
}
