use std::sync::Arc;

use super::*;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct DirectoryServerState {
    market_queries: Arc<Mutex<Vec<serde_json::Value>>>,
    received_parts: Arc<Mutex<Vec<ReceivedPart>>>,
    upload_status: StatusCode,
    reels_body: serde_json::Value,
}

impl DirectoryServerState {
    fn new(upload_status: StatusCode, reels_body: serde_json::Value) -> Self {
        Self {
            market_queries: Arc::new(Mutex::new(Vec::new())),
            received_parts: Arc::new(Mutex::new(Vec::new())),
            upload_status,
            reels_body,
        }
    }
}

async fn handle_most_active(
    State(state): State<DirectoryServerState>,
    Json(query): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.market_queries.lock().await.push(query);
    Json(serde_json::json!({
        "Status": "Success",
        "Response": {
            "MostActiveList": [
                { "SecDesc": "HDFCBANK", "Token": "1333", "Ltp": 1650.0 },
                { "SecDesc": "INFY", "Token": 1594 }
            ]
        }
    }))
}

async fn handle_reels_latest(State(state): State<DirectoryServerState>) -> Json<serde_json::Value> {
    Json(state.reels_body.clone())
}

async fn handle_feature_reel(
    State(state): State<DirectoryServerState>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.received_parts.lock().await.push(ReceivedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    let body = if state.upload_status.is_success() {
        String::new()
    } else {
        "storage backend unavailable".to_string()
    };
    (state.upload_status, body)
}

async fn spawn_directory_server(state: DirectoryServerState) -> std::io::Result<ClientSettings> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/md/Data/MostActiveByIndex", post(handle_most_active))
        .route("/reels-latest", get(handle_reels_latest))
        .route("/feature-reel", post(handle_feature_reel))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let base = format!("http://{addr}");
    Ok(ClientSettings {
        market_data_url: format!("{base}/api/md/Data/MostActiveByIndex"),
        reels_list_url: format!("{base}/reels-latest"),
        reel_upload_url: format!("{base}/feature-reel"),
        ..ClientSettings::default()
    })
}

fn sample_reels() -> serde_json::Value {
    serde_json::json!([
        {
            "reel_id": "r-1",
            "caption": "gap up",
            "media_url": "https://cdn.example/r-1.mp4",
            "stock_identifier": "1@1333",
            "likes": 12
        },
        {
            "reel_id": 2,
            "caption": "fade",
            "media_url": "https://cdn.example/2.mp4",
            "stock_identifier": "1@1594",
            "likes": 0
        }
    ])
}

#[tokio::test]
async fn fetch_stocks_posts_index_query_and_maps_tokens() {
    let state = DirectoryServerState::new(StatusCode::CREATED, sample_reels());
    let settings = spawn_directory_server(state.clone())
        .await
        .expect("spawn server");
    let api = HttpReelsApi::new(&settings).expect("client");

    let stocks = api.fetch_stocks().await.expect("stocks");

    assert_eq!(
        state.market_queries.lock().await.as_slice(),
        &[serde_json::json!({ "IndexId": 26012, "SegmentId": 1, "MarketDataType": 1 })]
    );
    let labels: Vec<&str> = stocks.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["HDFCBANK", "INFY"]);
    assert_eq!(stocks[0].value.as_str(), "1@1333");
    assert_eq!(stocks[1].value.as_str(), "1@1594");
}

#[tokio::test]
async fn fetch_reels_reads_full_listing_in_order() {
    let state = DirectoryServerState::new(StatusCode::CREATED, sample_reels());
    let settings = spawn_directory_server(state).await.expect("spawn server");
    let api = HttpReelsApi::new(&settings).expect("client");

    let reels = api.fetch_reels().await.expect("reels");

    assert_eq!(reels.len(), 2);
    assert_eq!(reels[0].id.as_str(), "r-1");
    assert_eq!(reels[0].like_count, 12);
    assert_eq!(reels[1].id.as_str(), "2");
    assert_eq!(reels[1].stock_identifier.as_str(), "1@1594");
}

#[tokio::test]
async fn fetch_reels_tolerates_null_columns_in_one_record() {
    let state = DirectoryServerState::new(
        StatusCode::CREATED,
        serde_json::json!([
            { "reel_id": 1, "caption": "gap up", "media_url": "https://cdn.example/1.mp4",
              "stock_identifier": "1@2885", "likes": 4 },
            { "reel_id": 2, "caption": null, "media_url": null,
              "stock_identifier": null, "likes": null }
        ]),
    );
    let settings = spawn_directory_server(state).await.expect("spawn server");
    let api = HttpReelsApi::new(&settings).expect("client");

    let reels = api.fetch_reels().await.expect("reels");

    assert_eq!(reels.len(), 2);
    assert_eq!(reels[0].caption, "gap up");
    assert_eq!(reels[1].caption, "");
    assert_eq!(reels[1].like_count, 0);
}

#[tokio::test]
async fn fetch_reels_rejects_unexpected_shape_as_decode_error() {
    let state = DirectoryServerState::new(
        StatusCode::CREATED,
        serde_json::json!({ "detail": "not a list" }),
    );
    let settings = spawn_directory_server(state).await.expect("spawn server");
    let api = HttpReelsApi::new(&settings).expect("client");

    let err = api.fetch_reels().await.expect_err("decode failure");
    assert!(matches!(err, ReelsApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn upload_sends_three_multipart_parts() {
    let state = DirectoryServerState::new(StatusCode::CREATED, sample_reels());
    let settings = spawn_directory_server(state.clone())
        .await
        .expect("spawn server");
    let api = HttpReelsApi::new(&settings).expect("client");
    let video = VideoFile::new("open.mp4", Some("video/mp4".into()), b"frames".to_vec());

    api.upload_reel(&video, "opening bell", &StockIdentifier::from_parts(1, "1333"))
        .await
        .expect("upload");

    let parts = state.received_parts.lock().await.clone();
    assert_eq!(
        parts,
        vec![
            ReceivedPart {
                name: "file".into(),
                file_name: Some("open.mp4".into()),
                content_type: Some("video/mp4".into()),
                bytes: b"frames".to_vec(),
            },
            ReceivedPart {
                name: "caption".into(),
                file_name: None,
                content_type: None,
                bytes: b"opening bell".to_vec(),
            },
            ReceivedPart {
                name: "stock_identifier".into(),
                file_name: None,
                content_type: None,
                bytes: b"1@1333".to_vec(),
            },
        ]
    );
}

#[tokio::test]
async fn upload_maps_server_error_status_with_body() {
    let state = DirectoryServerState::new(StatusCode::INTERNAL_SERVER_ERROR, sample_reels());
    let settings = spawn_directory_server(state).await.expect("spawn server");
    let api = HttpReelsApi::new(&settings).expect("client");
    let video = VideoFile::new("open.mp4", None, b"frames".to_vec());

    let err = api
        .upload_reel(&video, "opening bell", &StockIdentifier::from_parts(1, "1333"))
        .await
        .expect_err("server failure");

    assert_eq!(
        err,
        ReelsApiError::Status {
            status: 500,
            body: "storage backend unavailable".into(),
        }
    );
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let settings = ClientSettings {
        reels_list_url: format!("http://{addr}/reels-latest"),
        ..ClientSettings::default()
    };
    let api = HttpReelsApi::new(&settings).expect("client");

    let err = api.fetch_reels().await.expect_err("refused");
    assert!(matches!(err, ReelsApiError::Transport(_)), "got {err:?}");
}
