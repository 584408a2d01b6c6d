//! Per-view aggregators.
//!
//! Each view is a pure function of the dataset: it is rebuilt from scratch on
//! every load and owns nothing once returned. A dataset with no campaigns, or
//! campaigns without the view's breakdown, produces an empty view with zero
//! totals.

pub mod demographic;
pub mod device;
pub mod region;
pub mod weekly;

use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::table::{sort_rows, SortColumn, SortOrder};

pub use demographic::{DemographicBucket, DemographicView, GenderTotals};
pub use device::{DeviceMerge, DeviceRoasPolicy, DeviceRow, DeviceView, Roas};
pub use region::{CityCountryOrder, CountryBubble, HeatPoint, RegionRow, RegionView};
pub use weekly::{SeriesPoint, WeekRow, WeeklySeries, WeeklyView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Demographic,
    Device,
    Region,
    Weekly,
}

impl View {
    pub const ALL: [View; 4] = [View::Demographic, View::Device, View::Region, View::Weekly];

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "demographic" => Ok(Self::Demographic),
            "device" => Ok(Self::Device),
            "region" => Ok(Self::Region),
            "weekly" => Ok(Self::Weekly),
            other => Err(anyhow!(
                "unknown view '{other}' (expected demographic, device, region or weekly)"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Demographic => "demographic",
            View::Device => "device",
            View::Region => "region",
            View::Weekly => "weekly",
        }
    }

    /// Column the dashboard orders this view's tables by until the user picks
    /// one. Region and weekly tables keep their aggregation order.
    pub fn default_sort(&self) -> Option<(SortColumn, SortOrder)> {
        match self {
            View::Demographic => Some((SortColumn::Conversions, SortOrder::Desc)),
            View::Device => Some((SortColumn::Clicks, SortOrder::Desc)),
            View::Region | View::Weekly => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policies for the two places where the dashboard's historical behaviour is
/// questionable. Defaults reproduce that behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOptions {
    pub region_order: CityCountryOrder,
    pub device_roas: DeviceRoasPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewModel {
    Demographic(DemographicView),
    Device(DeviceView),
    Region(RegionView),
    Weekly(WeeklyView),
}

impl ViewModel {
    /// Apply [`View::default_sort`]. The demographic age-group rows feed a
    /// chart and stay in key order.
    pub fn apply_default_sort(&mut self) {
        let Some((column, order)) = self.view().default_sort() else {
            return;
        };
        match self {
            ViewModel::Demographic(v) => {
                sort_rows(&mut v.male, column, order);
                sort_rows(&mut v.female, column, order);
            }
            ViewModel::Device(v) => sort_rows(&mut v.devices, column, order),
            ViewModel::Region(_) | ViewModel::Weekly(_) => {}
        }
    }

    pub fn view(&self) -> View {
        match self {
            ViewModel::Demographic(_) => View::Demographic,
            ViewModel::Device(_) => View::Device,
            ViewModel::Region(_) => View::Region,
            ViewModel::Weekly(_) => View::Weekly,
        }
    }

    /// Number of table rows across the view.
    pub fn row_count(&self) -> usize {
        match self {
            ViewModel::Demographic(v) => v.male.len() + v.female.len() + v.age_groups.len(),
            ViewModel::Device(v) => v.devices.len(),
            ViewModel::Region(v) => v.regions.len(),
            ViewModel::Weekly(v) => v.weeks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Re-sort every table in the view. The weekly table is chronological by
    /// contract and refuses to be re-sorted.
    pub fn sort(&mut self, column: SortColumn, order: SortOrder) -> Result<()> {
        match self {
            ViewModel::Demographic(v) => {
                sort_rows(&mut v.male, column, order);
                sort_rows(&mut v.female, column, order);
                sort_rows(&mut v.age_groups, column, order);
            }
            ViewModel::Device(v) => sort_rows(&mut v.devices, column, order),
            ViewModel::Region(v) => sort_rows(&mut v.regions, column, order),
            ViewModel::Weekly(_) => {
                return Err(anyhow!("the weekly view is always in calendar order"));
            }
        }
        Ok(())
    }
}

pub fn aggregate_view(view: View, dataset: &Dataset, options: &AggregationOptions) -> ViewModel {
    let model = match view {
        View::Demographic => ViewModel::Demographic(demographic::aggregate(dataset)),
        View::Device => ViewModel::Device(device::aggregate(dataset, options.device_roas)),
        View::Region => ViewModel::Region(region::aggregate(dataset, options.region_order)),
        View::Weekly => ViewModel::Weekly(weekly::aggregate(dataset)),
    };
    tracing::debug!(
        view = %view,
        campaigns = dataset.campaigns.len(),
        rows = model.row_count(),
        "aggregated view"
    );
    model
}
