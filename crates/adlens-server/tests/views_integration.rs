use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use adlens_core::views::{CityCountryOrder, DeviceRoasPolicy};
use adlens_core::{config::Config, Dataset};
use adlens_server::app::build_app;
use adlens_server::source::{DatasetSource, FileDatasetSource, StaticDatasetSource};
use adlens_server::state::AppState;

fn sample_dataset() -> Dataset {
    let raw = json!({
        "campaigns": [
            {
                "name": "Spring Sale",
                "cpc": 2,
                "average_order_value": 50,
                "demographic_breakdown": [
                    { "gender": "Male", "age_group": "25-34",
                      "performance": { "impressions": 100, "clicks": 10, "conversions": 2 } },
                    { "gender": "Female", "age_group": "18-24",
                      "performance": { "impressions": 80, "clicks": 4, "conversions": 1 } }
                ],
                "device_performance": [
                    { "device": "Desktop", "impressions": 100, "clicks": 10, "conversions": 2,
                      "spend": 50, "revenue": 200, "roas": 4 },
                    { "device": "Mobile", "impressions": 400, "clicks": 30, "conversions": 3,
                      "spend": 60, "revenue": 90 }
                ],
                "regional_performance": [
                    { "city": "Lyon", "country": "France", "impressions": 50, "clicks": 5,
                      "conversions": 1, "spend": 10, "revenue": 30 },
                    { "city": "France", "country": "Paris", "impressions": 150, "clicks": 15,
                      "conversions": 2, "spend": 40, "revenue": 100 }
                ],
                "weekly_performance": [
                    { "week_start": "2024-01-08", "impressions": 100, "clicks": 10 },
                    { "week_start": "2024-01-01", "impressions": 100, "clicks": 5 }
                ]
            },
            {
                "name": "Summer Launch",
                "device_performance": [
                    { "device": "Desktop", "impressions": 50, "clicks": 5, "conversions": 1,
                      "spend": 25, "revenue": 100, "roas": 4 }
                ]
            }
        ]
    });
    serde_json::from_value(raw).expect("sample dataset")
}

fn app_with(source: impl DatasetSource, config: Config) -> axum::Router {
    build_app(Arc::new(AppState::new(source, config)))
}

fn app() -> axum::Router {
    app_with(StaticDatasetSource::new(sample_dataset()), Config::default())
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, serde_json::from_slice(&bytes).expect("parse JSON"))
}

struct FailingSource;

#[async_trait]
impl DatasetSource for FailingSource {
    async fn load(&self) -> anyhow::Result<Dataset> {
        anyhow::bail!("upstream returned 500")
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

#[tokio::test]
async fn test_device_view_merges_devices() {
    let (status, body) = get(app(), "/api/views/device").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"], "device");

    let desktop = body["data"]["devices"]
        .as_array()
        .expect("devices array")
        .iter()
        .find(|d| d["device"] == "Desktop")
        .expect("desktop row");
    assert_eq!(desktop["impressions"], 150);
    assert_eq!(desktop["clicks"], 15);
    assert_eq!(desktop["conversions"], 3);
    assert_eq!(desktop["spend"], 75.0);
    assert_eq!(desktop["revenue"], 300.0);
    assert_eq!(desktop["ctr"], 10.0);
    assert_eq!(desktop["conversion_rate"], 20.0);
    assert_eq!(desktop["roas"], 4.0);
}

#[tokio::test]
async fn test_device_view_defaults_to_clicks_desc_with_comparison_cards() {
    let (status, body) = get(app(), "/api/views/device").await;
    assert_eq!(status, StatusCode::OK);

    let devices = &body["data"]["devices"];
    assert_eq!(devices[0]["device"], "Mobile");
    assert_eq!(devices[0]["roas"], "-");
    assert_eq!(devices[1]["device"], "Desktop");

    assert_eq!(body["data"]["desktop"]["clicks"], 15);
    assert_eq!(body["data"]["desktop"]["revenue"], 300.0);
    assert_eq!(body["data"]["mobile"]["spend"], 60.0);
    assert_eq!(body["data"]["mobile"]["conversions"], 3);
}

#[tokio::test]
async fn test_device_view_cards_are_zero_without_mobile() {
    let dataset: Dataset = serde_json::from_value(json!({
        "campaigns": [{ "device_performance": [
            { "device": "Desktop", "impressions": 10, "clicks": 2, "spend": 4, "revenue": 8 }
        ]}]
    }))
    .expect("dataset");
    let app = app_with(StaticDatasetSource::new(dataset), Config::default());
    let (_, body) = get(app, "/api/views/device").await;

    assert_eq!(body["data"]["desktop"]["clicks"], 2);
    assert_eq!(
        body["data"]["mobile"],
        json!({ "impressions": 0, "clicks": 0, "conversions": 0, "spend": 0.0, "revenue": 0.0 })
    );
}

#[tokio::test]
async fn test_device_view_sorted_by_clicks() {
    let (status, body) = get(app(), "/api/views/device?sort=clicks&order=desc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["devices"][0]["device"], "Mobile");

    let (_, body) = get(app(), "/api/views/device?sort=clicks&order=asc").await;
    assert_eq!(body["data"]["devices"][0]["device"], "Desktop");
}

#[tokio::test]
async fn test_weekly_view_is_chronological() {
    let (status, body) = get(app(), "/api/views/weekly").await;
    assert_eq!(status, StatusCode::OK);

    let weeks: Vec<&str> = body["data"]["weeks"]
        .as_array()
        .expect("weeks array")
        .iter()
        .map(|w| w["week_start"].as_str().expect("week_start"))
        .collect();
    assert_eq!(weeks, vec!["2024-01-01", "2024-01-08"]);
    assert_eq!(body["data"]["week_count"], 2);
    assert_eq!(body["data"]["series"]["clicks"][0]["value"], 5.0);
    assert_eq!(body["data"]["series"]["clicks"][1]["label"], "2024-01-08");
}

#[tokio::test]
async fn test_weekly_view_rejects_sort() {
    let (status, body) = get(app(), "/api/views/weekly?sort=clicks").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_demographic_view_derives_spend() {
    let (status, body) = get(app(), "/api/views/demographic").await;
    assert_eq!(status, StatusCode::OK);

    let male = &body["data"]["male"][0];
    assert_eq!(male["age_group"], "25-34");
    assert_eq!(male["spend"], 20.0);
    assert_eq!(male["revenue"], 100.0);
    assert_eq!(body["data"]["female_totals"]["clicks"], 4);
    assert_eq!(body["data"]["female_totals"]["spend"], 8.0);
}

#[tokio::test]
async fn test_region_view_reports_roi_and_totals() {
    let (status, body) = get(app(), "/api/views/region").await;
    assert_eq!(status, StatusCode::OK);

    let regions = body["data"]["regions"].as_array().expect("regions array");
    assert_eq!(regions.len(), 2);
    let lyon = regions
        .iter()
        .find(|r| r["key"] == "Lyon-France")
        .expect("lyon row");
    assert_eq!(lyon["roi"], 200.0);
    assert_eq!(body["data"]["totals"]["spend"], 50.0);
    assert_eq!(body["data"]["totals"]["revenue"], 130.0);
    assert_eq!(body["data"]["region_count"], 2);
    assert_eq!(body["data"]["heat_points"], json!([]));

    let countries: Vec<&str> = body["data"]["countries"]
        .as_array()
        .expect("countries array")
        .iter()
        .map(|c| c["country"].as_str().expect("country"))
        .collect();
    assert_eq!(countries, vec!["France", "Paris"]);
}

#[tokio::test]
async fn test_region_swap_policy_from_config() {
    let config = Config {
        region_order: CityCountryOrder::SwapWhenCityLonger,
        ..Config::default()
    };
    let (status, body) = get(
        app_with(StaticDatasetSource::new(sample_dataset()), config),
        "/api/views/region",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let keys: Vec<&str> = body["data"]["regions"]
        .as_array()
        .expect("regions array")
        .iter()
        .map(|r| r["key"].as_str().expect("key"))
        .collect();
    assert_eq!(keys, vec!["Lyon-France", "Paris-France"]);

    let countries = body["data"]["countries"].as_array().expect("countries array");
    assert_eq!(countries.len(), 1);
    assert_eq!(countries[0]["country"], "France");
    assert_eq!(countries[0]["spend"], 50.0);
    assert_eq!(countries[0]["revenue"], 130.0);
}

#[tokio::test]
async fn test_device_roas_recompute_policy_from_config() {
    let config = Config {
        device_roas: DeviceRoasPolicy::Recompute,
        ..Config::default()
    };
    let (_, body) = get(
        app_with(StaticDatasetSource::new(sample_dataset()), config),
        "/api/views/device",
    )
    .await;
    assert_eq!(body["data"]["devices"][0]["device"], "Mobile");
    assert_eq!(body["data"]["devices"][0]["roas"], 1.5);
    assert_eq!(body["data"]["devices"][1]["roas"], 4.0);
}

#[tokio::test]
async fn test_unknown_view_is_404() {
    let (status, body) = get(app(), "/api/views/campaign").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_invalid_sort_is_400() {
    let (status, _) = get(app(), "/api/views/device?sort=bounce_rate").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app(), "/api/views/device?sort=clicks&order=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dataset_failure_skips_aggregation() {
    let (status, body) = get(app_with(FailingSource, Config::default()), "/api/views/device").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "dataset_unavailable");
    assert_eq!(
        body["error"]["message"],
        "Error loading data: upstream returned 500"
    );
}

#[tokio::test]
async fn test_empty_dataset_returns_zero_totals() {
    let app = app_with(StaticDatasetSource::new(Dataset::default()), Config::default());
    let (status, body) = get(app, "/api/views/region").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["regions"], json!([]));
    assert_eq!(body["data"]["totals"]["revenue"], 0.0);
    assert_eq!(body["data"]["totals"]["clicks"], 0);
}

#[tokio::test]
async fn test_file_source_reloads_on_every_request() {
    let path = std::env::temp_dir().join(format!(
        "adlens-views-{}-{}.json",
        std::process::id(),
        line!()
    ));
    std::fs::write(
        &path,
        json!({ "campaigns": [{ "device_performance": [
            { "device": "Tablet", "impressions": 10, "clicks": 1 }
        ]}]})
        .to_string(),
    )
    .expect("write dataset");

    let app = app_with(FileDatasetSource::new(&path), Config::default());
    let (_, body) = get(app.clone(), "/api/views/device").await;
    assert_eq!(body["data"]["devices"][0]["clicks"], 1);

    std::fs::write(
        &path,
        json!({ "campaigns": [{ "device_performance": [
            { "device": "Tablet", "impressions": 10, "clicks": 7 }
        ]}]})
        .to_string(),
    )
    .expect("rewrite dataset");

    let (_, body) = get(app, "/api/views/device").await;
    assert_eq!(body["data"]["devices"][0]["clicks"], 7);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_malformed_dataset_file_is_unavailable() {
    let path = std::env::temp_dir().join(format!(
        "adlens-views-{}-{}.json",
        std::process::id(),
        line!()
    ));
    std::fs::write(&path, "{ not json").expect("write dataset");

    let app = app_with(FileDatasetSource::new(&path), Config::default());
    let (status, body) = get(app, "/api/views/weekly").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]["message"]
        .as_str()
        .expect("message")
        .starts_with("Error loading data:"));

    std::fs::remove_file(&path).ok();
}
