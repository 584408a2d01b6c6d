//! Demographic view: performance split by gender and age group.
//!
//! Demographic slices carry only counts. Spend and revenue come from the
//! owning campaign (`clicks * cpc`, `conversions * average_order_value`) and
//! are summed slice by slice across every campaign.

use serde::Serialize;

use crate::dataset::{Dataset, Gender};
use crate::metrics::{accumulate, BaseMetrics};
use crate::rates::Rates;
use crate::table::{metric_value, SortColumn, TableRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicBucket {
    pub age_group: String,
    #[serde(flatten)]
    pub metrics: BaseMetrics,
    #[serde(flatten)]
    pub rates: Rates,
}

impl DemographicBucket {
    fn new(age_group: String, metrics: BaseMetrics) -> Self {
        Self {
            age_group,
            rates: Rates::derive(&metrics),
            metrics,
        }
    }
}

impl TableRow for DemographicBucket {
    fn label(&self) -> &str {
        &self.age_group
    }

    fn value(&self, column: SortColumn) -> Option<f64> {
        metric_value(&self.metrics, &self.rates, column)
    }
}

/// Card totals for one gender, summed over all of its age groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenderTotals {
    pub clicks: u64,
    pub spend: f64,
    pub revenue: f64,
}

impl GenderTotals {
    fn from_buckets(buckets: &[DemographicBucket]) -> Self {
        let total: BaseMetrics = buckets.iter().map(|b| &b.metrics).sum();
        Self {
            clicks: total.clicks,
            spend: total.spend,
            revenue: total.revenue,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemographicView {
    pub male: Vec<DemographicBucket>,
    pub female: Vec<DemographicBucket>,
    /// Both genders (and unlabelled slices) merged per age group, for the
    /// spend vs revenue comparison chart.
    pub age_groups: Vec<DemographicBucket>,
    pub male_totals: GenderTotals,
    pub female_totals: GenderTotals,
}

pub fn aggregate(dataset: &Dataset) -> DemographicView {
    let by_gender = accumulate(dataset.demographic_slices(), |slice| {
        (slice.entry.gender, slice.entry.age_group.clone())
    });
    let by_age_group = accumulate(dataset.demographic_slices(), |slice| {
        slice.entry.age_group.clone()
    });

    let mut male = Vec::new();
    let mut female = Vec::new();
    for ((gender, age_group), metrics) in by_gender {
        let bucket = DemographicBucket::new(age_group, metrics);
        match gender {
            Gender::Male => male.push(bucket),
            Gender::Female => female.push(bucket),
            Gender::Unknown => {}
        }
    }

    let age_groups = by_age_group
        .into_iter()
        .map(|(age_group, metrics)| DemographicBucket::new(age_group, metrics))
        .collect();

    DemographicView {
        male_totals: GenderTotals::from_buckets(&male),
        female_totals: GenderTotals::from_buckets(&female),
        male,
        female,
        age_groups,
    }
}
