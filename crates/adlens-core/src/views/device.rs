//! Device view: performance merged per device name across campaigns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::dataset::{Dataset, DeviceRecord};
use crate::metrics::{BaseMetrics, MetricSource};
use crate::rates::{self, Rates};
use crate::table::{metric_value, SortColumn, TableRow};

/// How the ROAS column of a merged device row is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRoasPolicy {
    /// Carry the ROAS of the first entry seen for the device, unchanged by
    /// later merges. This is what the dashboard has always displayed, even
    /// though it disagrees with the merged revenue and spend.
    #[default]
    PassThrough,
    /// Recompute `revenue / spend` from the merged totals.
    Recompute,
}

/// A ROAS cell: a ratio, or `"-"` when there is none to show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roas {
    Ratio(f64),
    Unavailable,
}

impl From<Option<f64>> for Roas {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Roas::Unavailable, Roas::Ratio)
    }
}

impl Serialize for Roas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Roas::Ratio(value) => serializer.serialize_f64(*value),
            Roas::Unavailable => serializer.serialize_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRow {
    pub device: String,
    #[serde(flatten)]
    pub metrics: BaseMetrics,
    #[serde(flatten)]
    pub rates: Rates,
    pub roas: Roas,
}

impl TableRow for DeviceRow {
    fn label(&self) -> &str {
        &self.device
    }

    fn value(&self, column: SortColumn) -> Option<f64> {
        metric_value(&self.metrics, &self.rates, column)
    }
}

/// Running merge of device entries.
///
/// Rates are recomputed after every [`DeviceMerge::push`], so a snapshot taken
/// between pushes is already consistent with its own totals.
#[derive(Debug, Clone, Default)]
pub struct DeviceMerge {
    policy: DeviceRoasPolicy,
    rows: BTreeMap<String, DeviceRow>,
}

impl DeviceMerge {
    pub fn new(policy: DeviceRoasPolicy) -> Self {
        Self {
            policy,
            rows: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, record: &DeviceRecord) {
        let row = self
            .rows
            .entry(record.device.clone())
            .or_insert_with(|| DeviceRow {
                device: record.device.clone(),
                metrics: BaseMetrics::default(),
                rates: Rates::default(),
                roas: Roas::from(record.roas),
            });

        row.metrics += record.base_metrics();
        row.rates = Rates::derive(&row.metrics);
        if self.policy == DeviceRoasPolicy::Recompute {
            row.roas = Roas::from(rates::roas(&row.metrics));
        }
    }

    pub fn get(&self, device: &str) -> Option<&DeviceRow> {
        self.rows.get(device)
    }

    pub fn snapshot(&self) -> Vec<DeviceRow> {
        self.rows.values().cloned().collect()
    }

    pub fn finish(self) -> DeviceView {
        let metrics_of = |device: &str| {
            self.rows
                .get(device)
                .map(|row| row.metrics)
                .unwrap_or_default()
        };
        let desktop = metrics_of(DESKTOP);
        let mobile = metrics_of(MOBILE);

        let devices: Vec<DeviceRow> = self.rows.into_values().collect();
        let totals: BaseMetrics = devices.iter().map(|d| &d.metrics).sum();
        DeviceView {
            devices,
            totals,
            desktop,
            mobile,
        }
    }
}

pub const DESKTOP: &str = "Desktop";
pub const MOBILE: &str = "Mobile";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceView {
    pub devices: Vec<DeviceRow>,
    pub totals: BaseMetrics,
    /// Side-by-side comparison cards. A device with no entries reads as zero.
    pub desktop: BaseMetrics,
    pub mobile: BaseMetrics,
}

pub fn aggregate(dataset: &Dataset, policy: DeviceRoasPolicy) -> DeviceView {
    dataset
        .device_records()
        .fold(DeviceMerge::new(policy), |mut merge, record| {
            merge.push(record);
            merge
        })
        .finish()
}
