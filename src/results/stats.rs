//! Summary statistics for one value series.

use serde::{Deserialize, Serialize};

use crate::results::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Growing,
    Declining,
    Flat,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Growing => "Growing",
            Trend::Declining => "Declining",
            Trend::Flat => "Flat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub first: f64,
    pub last: f64,
    /// `last - first`.
    pub change: f64,
    /// `None` when `first` is zero.
    pub percent_change: Option<f64>,
    pub trend: Trend,
}

/// Stats over the finite values of `values`; `None` if there are none.
pub fn summarize(values: &[f64]) -> Option<SeriesStats> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let first = *finite.first()?;
    let last = *finite.last()?;

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let change = last - first;

    let trend = if change > 0.0 {
        Trend::Growing
    } else if change < 0.0 {
        Trend::Declining
    } else {
        Trend::Flat
    };

    Some(SeriesStats {
        count: finite.len(),
        min,
        max,
        mean,
        first,
        last,
        change,
        percent_change: percent_change(first, last),
        trend,
    })
}

/// `(last - first) / |first| * 100`.
pub fn percent_change(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 || !first.is_finite() || !last.is_finite() {
        return None;
    }
    Some((last - first) / first.abs() * 100.0)
}

/// Change into `period` from the previous point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDelta {
    pub period: String,
    pub value: f64,
    pub change: f64,
    pub percent_change: Option<f64>,
}

pub fn period_deltas(series: &Series) -> Vec<PeriodDelta> {
    series
        .points
        .windows(2)
        .map(|w| PeriodDelta {
            period: w[1].period.clone(),
            value: w[1].value,
            change: w[1].value - w[0].value,
            percent_change: percent_change(w[0].value, w[1].value),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub label: String,
    pub stats: SeriesStats,
    pub deltas: Vec<PeriodDelta>,
}

pub fn summarize_series(series: &Series) -> Option<SeriesSummary> {
    let stats = summarize(&series.values())?;
    Some(SeriesSummary {
        label: series.label.clone(),
        stats,
        deltas: period_deltas(series),
    })
}

pub fn summarize_all(series: &[Series]) -> Vec<SeriesSummary> {
    series.iter().filter_map(summarize_series).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::SeriesPoint;

    fn series(values: &[f64]) -> Series {
        Series {
            label: "Net Income".to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| SeriesPoint {
                    period: format!("Y{}", i + 1),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn summarize_basic() {
        let s = summarize(&[100.0, 80.0, 150.0, 125.0]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 80.0);
        assert_eq!(s.max, 150.0);
        assert!((s.mean - 113.75).abs() < 1e-12);
        assert_eq!(s.change, 25.0);
        assert_eq!(s.percent_change, Some(25.0));
        assert_eq!(s.trend, Trend::Growing);
    }

    #[test]
    fn negative_base_uses_absolute_value() {
        let s = summarize(&[-200.0, -100.0]).unwrap();
        assert_eq!(s.percent_change, Some(50.0));
        assert_eq!(s.trend, Trend::Growing);
    }

    #[test]
    fn zero_base_has_no_percent_change() {
        let s = summarize(&[0.0, 10.0]).unwrap();
        assert_eq!(s.percent_change, None);
    }

    #[test]
    fn equal_ends_are_flat() {
        let s = summarize(&[5.0, 9.0, 5.0]).unwrap();
        assert_eq!(s.trend, Trend::Flat);
        assert_eq!(s.percent_change, Some(0.0));
    }

    #[test]
    fn empty_and_non_finite() {
        assert!(summarize(&[]).is_none());
        assert!(summarize(&[f64::NAN]).is_none());
        let s = summarize(&[f64::NAN, 4.0, 2.0]).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.trend, Trend::Declining);
    }

    #[test]
    fn deltas_follow_periods() {
        let d = period_deltas(&series(&[100.0, 110.0, 99.0]));
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].period, "Y2");
        assert_eq!(d[0].change, 10.0);
        assert_eq!(d[0].percent_change, Some(10.0));
        assert_eq!(d[1].change, -11.0);
        assert_eq!(d[1].percent_change, Some(-10.0));
    }

    #[test]
    fn summary_carries_label() {
        let summary = summarize_series(&series(&[1.0, 2.0])).unwrap();
        assert_eq!(summary.label, "Net Income");
        assert_eq!(summary.deltas.len(), 1);
        assert!(summarize_series(&series(&[])).is_none());
    }
}
