//! Raw marketing dataset as delivered by the data source.
//!
//! Decoding is tolerant: absent or `null` numbers become 0, absent strings
//! become `""`, absent breakdown arrays become empty. A record with holes in
//! it still lands in some group and contributes zeros; it never fails the
//! whole dataset.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreResult;
use crate::metrics::{BaseMetrics, MetricSource};

/// The top-level payload: a list of campaigns, each with optional
/// per-dimension breakdowns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, deserialize_with = "default_if_null")]
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Campaign {
    /// Cost per click; demographic spend is derived from it.
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub cpc: f64,
    /// Demographic revenue is derived from it.
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub average_order_value: f64,
    #[serde(default, deserialize_with = "default_if_null")]
    pub demographic_breakdown: Vec<DemographicEntry>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub device_performance: Vec<DeviceRecord>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub regional_performance: Vec<RegionRecord>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub weekly_performance: Vec<WeeklyRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "male")]
    Male,
    #[serde(alias = "female")]
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemographicEntry {
    #[serde(default, deserialize_with = "default_if_null")]
    pub gender: Gender,
    #[serde(default, deserialize_with = "default_if_null")]
    pub age_group: String,
    #[serde(default, deserialize_with = "default_if_null")]
    pub performance: DemographicPerformance,
}

/// Demographic slices carry counts only; money is derived from the campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemographicPerformance {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub conversions: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default, deserialize_with = "default_if_null")]
    pub device: String,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub conversions: u64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub spend: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub revenue: f64,
    /// Upstream-computed return on ad spend. Accepted as a number or a
    /// numeric string.
    #[serde(default, deserialize_with = "lenient_ratio")]
    pub roas: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(default, deserialize_with = "default_if_null")]
    pub city: String,
    #[serde(default, deserialize_with = "default_if_null")]
    pub country: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub conversions: u64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub spend: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyRecord {
    #[serde(default, deserialize_with = "default_if_null")]
    pub week_start: String,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub conversions: u64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub spend: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub revenue: f64,
}

/// One demographic slice paired with the campaign it belongs to, so spend and
/// revenue can be derived from the campaign's unit economics.
#[derive(Debug, Clone, Copy)]
pub struct DemographicSlice<'a> {
    pub campaign: &'a Campaign,
    pub entry: &'a DemographicEntry,
}

impl Dataset {
    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_slice(raw: &[u8]) -> CoreResult<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    pub fn demographic_slices(&self) -> impl Iterator<Item = DemographicSlice<'_>> {
        self.campaigns.iter().flat_map(|campaign| {
            campaign
                .demographic_breakdown
                .iter()
                .map(move |entry| DemographicSlice { campaign, entry })
        })
    }

    pub fn device_records(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.campaigns
            .iter()
            .flat_map(|c| c.device_performance.iter())
    }

    pub fn region_records(&self) -> impl Iterator<Item = &RegionRecord> {
        self.campaigns
            .iter()
            .flat_map(|c| c.regional_performance.iter())
    }

    pub fn weekly_records(&self) -> impl Iterator<Item = &WeeklyRecord> {
        self.campaigns
            .iter()
            .flat_map(|c| c.weekly_performance.iter())
    }
}

impl MetricSource for DemographicSlice<'_> {
    fn base_metrics(&self) -> BaseMetrics {
        let perf = &self.entry.performance;
        BaseMetrics {
            impressions: perf.impressions,
            clicks: perf.clicks,
            conversions: perf.conversions,
            spend: perf.clicks as f64 * self.campaign.cpc,
            revenue: perf.conversions as f64 * self.campaign.average_order_value,
        }
    }
}

impl MetricSource for DeviceRecord {
    fn base_metrics(&self) -> BaseMetrics {
        BaseMetrics {
            impressions: self.impressions,
            clicks: self.clicks,
            conversions: self.conversions,
            spend: self.spend,
            revenue: self.revenue,
        }
    }
}

impl MetricSource for RegionRecord {
    fn base_metrics(&self) -> BaseMetrics {
        BaseMetrics {
            impressions: self.impressions,
            clicks: self.clicks,
            conversions: self.conversions,
            spend: self.spend,
            revenue: self.revenue,
        }
    }
}

impl MetricSource for WeeklyRecord {
    fn base_metrics(&self) -> BaseMetrics {
        BaseMetrics {
            impressions: self.impressions,
            clicks: self.clicks,
            conversions: self.conversions,
            spend: self.spend,
            revenue: self.revenue,
        }
    }
}

fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counts arrive as JSON numbers that are not always integers. Truncate toward
/// zero; negative, non-finite or missing values count as 0.
fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.trunc() as u64)
        .unwrap_or(0))
}

fn amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|v| v.is_finite()).unwrap_or(0.0))
}

fn lenient_ratio<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let value = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}
