//! Region view: performance merged per `city-country` pair, with map
//! coordinates and dataset-wide totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, RegionRecord};
use crate::metrics::{accumulate, BaseMetrics};
use crate::rates::Rates;
use crate::table::{metric_value, SortColumn, TableRow};

/// City and country are free text upstream and are sometimes recorded in the
/// wrong fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityCountryOrder {
    /// Use the fields as recorded.
    #[default]
    AsRecorded,
    /// Swap the two fields when the city name is longer than the country
    /// name. Only meaningful for feeds known to write short country codes.
    SwapWhenCityLonger,
}

impl CityCountryOrder {
    pub fn resolve<'a>(self, city: &'a str, country: &'a str) -> (&'a str, &'a str) {
        match self {
            CityCountryOrder::SwapWhenCityLonger
                if city.chars().count() > country.chars().count() =>
            {
                (country, city)
            }
            _ => (city, country),
        }
    }
}

pub fn region_key(city: &str, country: &str) -> String {
    format!("{city}-{country}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub key: String,
    pub city: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(flatten)]
    pub metrics: BaseMetrics,
    #[serde(flatten)]
    pub rates: Rates,
}

impl TableRow for RegionRow {
    fn label(&self) -> &str {
        &self.key
    }

    fn value(&self, column: SortColumn) -> Option<f64> {
        metric_value(&self.metrics, &self.rates, column)
    }
}

/// One country on the bubble map: revenue and spend summed over its cities,
/// placed at the first coordinates recorded for any of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryBubble {
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub revenue: f64,
    pub spend: f64,
}

/// Heat-map point weighted by region revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionView {
    pub regions: Vec<RegionRow>,
    pub region_count: usize,
    pub countries: Vec<CountryBubble>,
    /// Only regions with both coordinates set and non-zero.
    pub heat_points: Vec<HeatPoint>,
    pub totals: BaseMetrics,
}

#[derive(Debug, Default)]
struct Location {
    city: String,
    country: String,
    lat: Option<f64>,
    lng: Option<f64>,
}

// First recorded coordinates win; later entries only fill gaps.
fn locate<'a, I, F>(records: I, order: CityCountryOrder, key_fn: F) -> BTreeMap<String, Location>
where
    I: IntoIterator<Item = &'a RegionRecord>,
    F: Fn(&str, &str) -> String,
{
    records
        .into_iter()
        .fold(BTreeMap::<String, Location>::new(), |mut acc, record| {
            let (city, country) = order.resolve(&record.city, &record.country);
            let location = acc.entry(key_fn(city, country)).or_insert_with(|| Location {
                city: city.to_string(),
                country: country.to_string(),
                ..Default::default()
            });
            location.lat = location.lat.or(record.lat);
            location.lng = location.lng.or(record.lng);
            acc
        })
}

pub fn aggregate(dataset: &Dataset, order: CityCountryOrder) -> RegionView {
    let key_of = |record: &RegionRecord| {
        let (city, country) = order.resolve(&record.city, &record.country);
        region_key(city, country)
    };
    let country_of = |record: &RegionRecord| {
        let (_, country) = order.resolve(&record.city, &record.country);
        country.to_string()
    };

    let totals_by_key = accumulate(dataset.region_records(), |record| key_of(*record));
    let locations = locate(dataset.region_records(), order, region_key);

    let regions: Vec<RegionRow> = totals_by_key
        .into_iter()
        .map(|(key, metrics)| {
            let location = locations.get(&key);
            RegionRow {
                city: location.map(|l| l.city.clone()).unwrap_or_default(),
                country: location.map(|l| l.country.clone()).unwrap_or_default(),
                lat: location.and_then(|l| l.lat),
                lng: location.and_then(|l| l.lng),
                rates: Rates::derive_with_roi(&metrics),
                metrics,
                key,
            }
        })
        .collect();

    let country_locations = locate(dataset.region_records(), order, |_, country| {
        country.to_string()
    });
    let countries = accumulate(dataset.region_records(), |record| country_of(*record))
        .into_iter()
        .map(|(country, metrics)| {
            let location = country_locations.get(&country);
            CountryBubble {
                lat: location.and_then(|l| l.lat).unwrap_or(0.0),
                lng: location.and_then(|l| l.lng).unwrap_or(0.0),
                revenue: metrics.revenue,
                spend: metrics.spend,
                country,
            }
        })
        .collect();

    let heat_points = regions
        .iter()
        .filter_map(|region| match (region.lat, region.lng) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(HeatPoint {
                lat,
                lng,
                value: region.metrics.revenue,
            }),
            _ => None,
        })
        .collect();

    let totals: BaseMetrics = regions.iter().map(|r| &r.metrics).sum();
    RegionView {
        region_count: regions.len(),
        regions,
        countries,
        heat_points,
        totals,
    }
}
