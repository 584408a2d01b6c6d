//! Derived rates. Every ratio in the crate goes through [`percentage`], so a
//! zero denominator always reads as `0.0`.

use serde::Serialize;

use crate::metrics::BaseMetrics;

/// `numerator / denominator * 100`, or `0.0` when the denominator is not
/// positive.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

pub fn ctr(metrics: &BaseMetrics) -> f64 {
    percentage(metrics.clicks as f64, metrics.impressions as f64)
}

pub fn conversion_rate(metrics: &BaseMetrics) -> f64 {
    percentage(metrics.conversions as f64, metrics.clicks as f64)
}

pub fn roi(metrics: &BaseMetrics) -> f64 {
    percentage(metrics.revenue - metrics.spend, metrics.spend)
}

/// Return on ad spend as a plain ratio, `None` when nothing was spent.
pub fn roas(metrics: &BaseMetrics) -> Option<f64> {
    (metrics.spend > 0.0).then(|| metrics.revenue / metrics.spend)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rates {
    pub ctr: f64,
    pub conversion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
}

impl Rates {
    pub fn derive(metrics: &BaseMetrics) -> Self {
        Self {
            ctr: ctr(metrics),
            conversion_rate: conversion_rate(metrics),
            roi: None,
        }
    }

    /// Same as [`Rates::derive`] plus ROI, for views that report it.
    pub fn derive_with_roi(metrics: &BaseMetrics) -> Self {
        Self {
            roi: Some(roi(metrics)),
            ..Self::derive(metrics)
        }
    }
}
