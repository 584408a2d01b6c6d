//! Column sorting for the breakdown tables.

use std::cmp::Ordering;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::metrics::BaseMetrics;
use crate::rates::Rates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Label,
    Impressions,
    Clicks,
    Conversions,
    Spend,
    Revenue,
    Ctr,
    ConversionRate,
    Roi,
}

impl SortColumn {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "label" => Ok(Self::Label),
            "impressions" => Ok(Self::Impressions),
            "clicks" => Ok(Self::Clicks),
            "conversions" => Ok(Self::Conversions),
            "spend" => Ok(Self::Spend),
            "revenue" => Ok(Self::Revenue),
            "ctr" => Ok(Self::Ctr),
            "conversion_rate" => Ok(Self::ConversionRate),
            "roi" => Ok(Self::Roi),
            _ => Err(anyhow!(
                "sort must be one of: label, impressions, clicks, conversions, spend, revenue, ctr, conversion_rate, roi"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("desc") => Ok(Self::Desc),
            Some("asc") => Ok(Self::Asc),
            Some(_) => Err(anyhow!("order must be one of: asc, desc")),
        }
    }
}

/// A row of a sortable table.
pub trait TableRow {
    fn label(&self) -> &str;

    /// Numeric value of `column`, or `None` if the row has no such column.
    /// Never called with [`SortColumn::Label`].
    fn value(&self, column: SortColumn) -> Option<f64>;
}

/// Numeric column lookup shared by every row type built from base metrics
/// and rates.
pub fn metric_value(metrics: &BaseMetrics, rates: &Rates, column: SortColumn) -> Option<f64> {
    match column {
        SortColumn::Label => None,
        SortColumn::Impressions => Some(metrics.impressions as f64),
        SortColumn::Clicks => Some(metrics.clicks as f64),
        SortColumn::Conversions => Some(metrics.conversions as f64),
        SortColumn::Spend => Some(metrics.spend),
        SortColumn::Revenue => Some(metrics.revenue),
        SortColumn::Ctr => Some(rates.ctr),
        SortColumn::ConversionRate => Some(rates.conversion_rate),
        SortColumn::Roi => rates.roi,
    }
}

/// Stable sort; rows without a value for `column` keep their relative order.
pub fn sort_rows<T: TableRow>(rows: &mut [T], column: SortColumn, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, column);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare<T: TableRow>(a: &T, b: &T, column: SortColumn) -> Ordering {
    if column == SortColumn::Label {
        return a.label().cmp(b.label());
    }
    match (a.value(column), b.value(column)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: &'static str,
        clicks: f64,
        roi: Option<f64>,
    }

    impl TableRow for Row {
        fn label(&self) -> &str {
            self.name
        }

        fn value(&self, column: SortColumn) -> Option<f64> {
            match column {
                SortColumn::Clicks => Some(self.clicks),
                SortColumn::Roi => self.roi,
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Tablet", clicks: 5.0, roi: None },
            Row { name: "Desktop", clicks: 15.0, roi: None },
            Row { name: "Mobile", clicks: 9.0, roi: None },
        ]
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    #[test]
    fn sorts_numeric_columns_both_ways() {
        let mut rows = rows();
        sort_rows(&mut rows, SortColumn::Clicks, SortOrder::Desc);
        assert_eq!(names(&rows), vec!["Desktop", "Mobile", "Tablet"]);

        sort_rows(&mut rows, SortColumn::Clicks, SortOrder::Asc);
        assert_eq!(names(&rows), vec!["Tablet", "Mobile", "Desktop"]);
    }

    #[test]
    fn sorts_by_label() {
        let mut rows = rows();
        sort_rows(&mut rows, SortColumn::Label, SortOrder::Asc);
        assert_eq!(names(&rows), vec!["Desktop", "Mobile", "Tablet"]);
    }

    #[test]
    fn missing_column_keeps_order() {
        let mut rows = rows();
        sort_rows(&mut rows, SortColumn::Roi, SortOrder::Desc);
        assert_eq!(names(&rows), vec!["Tablet", "Desktop", "Mobile"]);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(SortColumn::parse("conversion_rate").unwrap(), SortColumn::ConversionRate);
        assert!(SortColumn::parse("bounce_rate").is_err());
        assert_eq!(SortOrder::parse(None).unwrap(), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("asc")).unwrap(), SortOrder::Asc);
        assert!(SortOrder::parse(Some("up")).is_err());
    }
}
