use crate::views::{AggregationOptions, CityCountryOrder, DeviceRoasPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// JSON dataset re-read on every view request.
    pub dataset_path: String,
    pub cors_origins: Vec<String>,
    pub region_order: CityCountryOrder,
    pub device_roas: DeviceRoasPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        Ok(Self {
            port: var("ADLENS_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            dataset_path: var("ADLENS_DATASET_PATH")
                .unwrap_or_else(|| "./data/marketing_data.json".to_string()),
            cors_origins: var("ADLENS_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            region_order: match var("ADLENS_REGION_SWAP_HEURISTIC").as_deref() {
                Some("true") | Some("1") => CityCountryOrder::SwapWhenCityLonger,
                _ => CityCountryOrder::AsRecorded,
            },
            device_roas: match var("ADLENS_DEVICE_ROAS").as_deref() {
                Some("recompute") => DeviceRoasPolicy::Recompute,
                _ => DeviceRoasPolicy::PassThrough,
            },
        })
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            region_order: self.region_order,
            device_roas: self.device_roas,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            dataset_path: "./data/marketing_data.json".to_string(),
            cors_origins: Vec::new(),
            region_order: CityCountryOrder::default(),
            device_roas: DeviceRoasPolicy::default(),
        }
    }
}
