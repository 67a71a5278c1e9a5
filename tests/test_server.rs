//! Integration test: prediction form endpoints

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;
use vgsales::artifacts::{ArtifactConfig, ArtifactStore};
use vgsales::model::{DecisionTree, RandomForest, TreeNode};
use vgsales::preprocessing::{EncoderTable, FeatureOrder, LabelEncoder};
use vgsales::server::{create_router, AppState, ServerConfig};

const KNOWN_FORM: &str = "platform=PS4&genre=Action&publisher=EA&year=2015\
    &na_sales=1.2&eu_sales=0.8&jp_sales=0.1&other_sales=0.3";

fn split(feature_idx: usize, threshold: f64, left: TreeNode, right: TreeNode) -> TreeNode {
    TreeNode::Split {
        feature_idx,
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn leaf(value: f64) -> TreeNode {
    TreeNode::Leaf { value }
}

fn test_store() -> ArtifactStore {
    let encoders = EncoderTable::new()
        .with_encoder("Platform", LabelEncoder::from_labels(["DS", "PS4", "X360"]).unwrap())
        .with_encoder("Genre", LabelEncoder::from_labels(["Action", "Sports"]).unwrap())
        .with_encoder("Publisher", LabelEncoder::from_labels(["Activision", "EA"]).unwrap());
    let order = FeatureOrder::new([
        "Platform", "Year", "Genre", "Publisher",
        "NA_Sales", "EU_Sales", "JP_Sales", "Other_Sales",
    ])
    .unwrap();
    let forest = RandomForest::from_trees(vec![
        DecisionTree::from_root(split(3, 0.5, leaf(1.0), leaf(2.0))),
        DecisionTree::from_root(split(4, 1.0, leaf(0.5), leaf(2.7456))),
    ])
    .with_n_features(8);
    ArtifactStore::new(forest, encoders, order).unwrap()
}

fn test_app() -> axum::Router {
    let config = ServerConfig::new(
        "127.0.0.1",
        5000,
        ArtifactConfig::new().with_dir("/srv/vgsales"),
    );
    let state = Arc::new(AppState::new(config, Arc::new(test_store())));
    create_router(state)
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn post_form(body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.into()))
        .unwrap()
}

#[tokio::test]
async fn test_root_serves_form() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains("action=\"/predict\""));
    assert!(html.contains("name=\"other_sales\""));
    assert!(!html.contains("Predicted Global Sales"));
}

#[tokio::test]
async fn test_predict_known_categories() {
    let response = test_app().oneshot(post_form(KNOWN_FORM)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Predicted Global Sales: 2.373 million units"));
    assert!(html.contains("value=\"EA\""));
}

#[tokio::test]
async fn test_predict_unseen_publisher() {
    let body = KNOWN_FORM.replace("publisher=EA", "publisher=UnknownStudioXYZ");
    let response = test_app().oneshot(post_form(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Predicted Global Sales: 1.873 million units"));
}

#[tokio::test]
async fn test_predict_invalid_year_renders_error() {
    let body = KNOWN_FORM.replace("year=2015", "year=not-a-number");
    let response = test_app().oneshot(post_form(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Error: could not convert year to a number"));
    assert!(!html.contains("Predicted Global Sales"));
}

#[tokio::test]
async fn test_predict_missing_field_renders_error() {
    let response = test_app()
        .oneshot(post_form("platform=PS4&genre=Action"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Error: missing form field &#39;publisher&#39;"));
}

#[tokio::test]
async fn test_predict_wrong_content_type_renders_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<p class=\"result\">Error: "));
}

#[tokio::test]
async fn test_predict_is_idempotent() {
    let app = test_app();
    let first = body_text(app.clone().oneshot(post_form(KNOWN_FORM)).await.unwrap()).await;
    let second = body_text(app.oneshot(post_form(KNOWN_FORM)).await.unwrap()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["features"], 8);
    assert_eq!(json["encoders"], 3);
    assert_eq!(json["listen"], "127.0.0.1:5000");
    assert_eq!(json["artifacts_dir"], "/srv/vgsales");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_predictions_agree() {
    let app = test_app();
    let requests = (0..16).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { body_text(app.oneshot(post_form(KNOWN_FORM)).await.unwrap()).await })
    });

    for handle in requests.collect::<Vec<_>>() {
        let html = handle.await.unwrap();
        assert!(html.contains("Predicted Global Sales: 2.373 million units"));
    }
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_predict_is_405() {
    let response = test_app()
        .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
