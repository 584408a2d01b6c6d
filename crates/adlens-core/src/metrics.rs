//! Base metric accumulation.
//!
//! Every breakdown record reduces to the same five numbers. [`accumulate`]
//! folds a record stream into per-key totals; rates are derived afterwards
//! from those totals (see [`crate::rates`]), never summed.

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Summable totals shared by every breakdown dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseMetrics {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub spend: f64,
    pub revenue: f64,
}

/// Anything that can be reduced to [`BaseMetrics`].
pub trait MetricSource {
    fn base_metrics(&self) -> BaseMetrics;
}

impl MetricSource for BaseMetrics {
    fn base_metrics(&self) -> BaseMetrics {
        *self
    }
}

impl<T: MetricSource + ?Sized> MetricSource for &T {
    fn base_metrics(&self) -> BaseMetrics {
        (**self).base_metrics()
    }
}

impl BaseMetrics {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for BaseMetrics {
    type Output = BaseMetrics;

    fn add(mut self, rhs: BaseMetrics) -> BaseMetrics {
        self += rhs;
        self
    }
}

impl AddAssign for BaseMetrics {
    fn add_assign(&mut self, rhs: BaseMetrics) {
        self.impressions = self.impressions.saturating_add(rhs.impressions);
        self.clicks = self.clicks.saturating_add(rhs.clicks);
        self.conversions = self.conversions.saturating_add(rhs.conversions);
        self.spend += rhs.spend;
        self.revenue += rhs.revenue;
    }
}

impl Sum for BaseMetrics {
    fn sum<I: Iterator<Item = BaseMetrics>>(iter: I) -> Self {
        iter.fold(BaseMetrics::default(), Add::add)
    }
}

impl<'a> Sum<&'a BaseMetrics> for BaseMetrics {
    fn sum<I: Iterator<Item = &'a BaseMetrics>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Group `records` by `key_fn` and sum each group's base metrics.
///
/// An empty input yields an empty map. The result does not depend on input
/// order.
pub fn accumulate<R, K, I, F>(records: I, mut key_fn: F) -> BTreeMap<K, BaseMetrics>
where
    I: IntoIterator<Item = R>,
    R: MetricSource,
    K: Ord,
    F: FnMut(&R) -> K,
{
    records.into_iter().fold(BTreeMap::new(), |mut groups, record| {
        let key = key_fn(&record);
        *groups.entry(key).or_default() += record.base_metrics();
        groups
    })
}
