//! Weekly view: performance merged per `week_start`, in calendar order.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::metrics::{accumulate, BaseMetrics};
use crate::rates::Rates;
use crate::table::{metric_value, SortColumn, TableRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRow {
    pub week_start: String,
    #[serde(flatten)]
    pub metrics: BaseMetrics,
    #[serde(flatten)]
    pub rates: Rates,
}

impl TableRow for WeekRow {
    fn label(&self) -> &str {
        &self.week_start
    }

    fn value(&self, column: SortColumn) -> Option<f64> {
        metric_value(&self.metrics, &self.rates, column)
    }
}

/// One point of a weekly line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Chart series, in the same order as [`WeeklyView::weeks`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklySeries {
    pub revenue: Vec<SeriesPoint>,
    pub spend: Vec<SeriesPoint>,
    pub clicks: Vec<SeriesPoint>,
}

impl WeeklySeries {
    fn from_weeks(weeks: &[WeekRow]) -> Self {
        let series = |value: fn(&BaseMetrics) -> f64| {
            weeks
                .iter()
                .map(|week| SeriesPoint {
                    label: week.week_start.clone(),
                    value: value(&week.metrics),
                })
                .collect::<Vec<_>>()
        };
        Self {
            revenue: series(|m| m.revenue),
            spend: series(|m| m.spend),
            clicks: series(|m| m.clicks as f64),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklyView {
    /// Ascending by calendar date.
    pub weeks: Vec<WeekRow>,
    pub week_count: usize,
    pub series: WeeklySeries,
    pub totals: BaseMetrics,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_week_start(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub fn aggregate(dataset: &Dataset) -> WeeklyView {
    let mut weeks: Vec<WeekRow> = accumulate(dataset.weekly_records(), |record| {
        record.week_start.clone()
    })
    .into_iter()
    .map(|(week_start, metrics)| WeekRow {
        week_start,
        rates: Rates::derive(&metrics),
        metrics,
    })
    .collect();

    // Dated weeks first in calendar order, then anything unparseable by key.
    weeks.sort_by_cached_key(|week| {
        let date = parse_week_start(&week.week_start);
        (date.is_none(), date, week.week_start.clone())
    });

    let totals: BaseMetrics = weeks.iter().map(|w| &w.metrics).sum();
    WeeklyView {
        week_count: weeks.len(),
        series: WeeklySeries::from_weeks(&weeks),
        weeks,
        totals,
    }
}
