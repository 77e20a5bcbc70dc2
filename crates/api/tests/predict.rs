use std::sync::Arc;

use api::{create_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use data_validator::{LabelEncoder, Scaler};
use feature_engine::{PipelineConfig, SalesPipeline, TransformerSet};
use inference_engine::InferenceEngine;
use serde_json::{json, Value};
use tower::ServiceExt;

fn transformers() -> TransformerSet {
    TransformerSet {
        competition_distance: Scaler::Robust {
            center: 2330.0,
            scale: 5980.0,
        },
        competition_time_month: Scaler::Robust {
            center: 16.0,
            scale: 32.0,
        },
        promo_time_week: Scaler::MinMax {
            data_min: -3.0,
            data_max: 313.0,
            feature_range: (0.0, 1.0),
        },
        year: Scaler::MinMax {
            data_min: 2013.0,
            data_max: 2015.0,
            feature_range: (0.0, 1.0),
        },
        store_type: LabelEncoder::new(["a", "b", "c", "d"]),
    }
}

fn app_with(config: PipelineConfig) -> Router {
    let pipeline = SalesPipeline::new(transformers(), config);
    let state = AppState::new(pipeline, Box::new(InferenceEngine::mock()));
    create_router(Arc::new(state))
}

fn app() -> Router {
    app_with(PipelineConfig::default())
}

fn record(store: i64, open: i64) -> Value {
    json!({
        "Store": store,
        "DayOfWeek": 5,
        "Date": "2015-07-31",
        "Open": open,
        "Promo": 1,
        "StateHoliday": "0",
        "SchoolHoliday": 1,
        "StoreType": "a",
        "Assortment": "a",
        "CompetitionDistance": null,
        "CompetitionOpenSinceMonth": null,
        "CompetitionOpenSinceYear": null,
        "Promo2": 0,
        "Promo2SinceWeek": null,
        "Promo2SinceYear": null,
        "PromoInterval": 0
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/rossmann/predict")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_single_record_gets_prediction() {
    let (status, body) = post(app(), record(1, 1).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["Store"], json!(1));
    assert_eq!(items[0]["Date"], json!("2015-07-31"));

    // Mock model: 8.6 + 0.3 on promo days, on the log1p scale
    let prediction = items[0]["prediction"].as_f64().unwrap();
    assert!((prediction - 8.9f64.exp_m1()).abs() < 1e-6);
}

#[tokio::test]
async fn test_batch_keeps_order_and_skips_closed_stores() {
    let batch = json!([record(1, 1), record(2, 0), record(3, 1)]);
    let (status, body) = post(app(), batch.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    let stores: Vec<_> = items.iter().map(|i| i["Store"].clone()).collect();
    assert_eq!(stores, vec![json!(1), json!(2), json!(3)]);
    assert!(items[0]["prediction"].is_f64());
    assert!(items[1]["prediction"].is_null());
    assert!(items[2]["prediction"].is_f64());
}

#[tokio::test]
async fn test_closed_stores_rejected_when_configured() {
    let batch = json!([record(1, 1), record(2, 0)]);
    let (status, body) = post(app_with(PipelineConfig::strict()), batch.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Row 1"));
}

#[tokio::test]
async fn test_empty_requests_return_empty_object() {
    for body in ["", "{}", "[]", "null"] {
        let (status, value) = post(app(), body).await;
        assert_eq!(status, StatusCode::OK, "body {:?}", body);
        assert_eq!(value, json!({}), "body {:?}", body);
    }
}

#[tokio::test]
async fn test_extra_columns_are_echoed() {
    let mut input = record(5, 1);
    input["Id"] = json!(41088);
    let (status, body) = post(app(), input.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["Id"], json!(41088));
}

#[tokio::test]
async fn test_snake_case_record_comes_back_unchanged() {
    let input = json!({
        "store": 1,
        "day_of_week": 5,
        "date": "2015-07-31",
        "open": 1,
        "promo": 1,
        "state_holiday": 0,
        "school_holiday": 1,
        "store_type": "a",
        "assortment": "a",
        "competition_distance": 1270,
        "promo2": 0,
        "promo_interval": 0
    });
    let (status, mut body) = post(app(), input.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let mut item = body[0].take();
    assert!(item["prediction"].is_f64());
    item.as_object_mut().unwrap().remove("prediction");
    assert_eq!(item, input);
}

#[tokio::test]
async fn test_missing_column_is_a_data_error() {
    let mut input = record(1, 1);
    input.as_object_mut().unwrap().remove("Assortment");
    let (status, body) = post(app(), input.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Assortment"));
}

#[tokio::test]
async fn test_unknown_store_type_is_a_data_error() {
    let mut input = record(1, 1);
    input["StoreType"] = json!("z");
    let (status, _) = post(app(), input.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_assortment_falls_back() {
    let mut input = record(1, 1);
    input["Assortment"] = json!("q");
    let (status, body) = post(app(), input.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body[0]["prediction"].is_f64());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, body) = post(app(), "{\"Store\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["predictor"], json!("mock"));
    assert_eq!(body["feature_dimension"], json!(20));
    assert_eq!(body["store_types"], json!(["a", "b", "c", "d"]));
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
