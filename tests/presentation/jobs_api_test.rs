use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use webtoon_jobs::application::ports::{Downloader, JobRepository};
use webtoon_jobs::application::services::{DownloadExecutor, JobService};
use webtoon_jobs::domain::{JobId, JobStatus, JobUpdate, NewJob};
use webtoon_jobs::infrastructure::persistence::InMemoryJobRepository;
use webtoon_jobs::presentation::{AppState, create_router};

use crate::helpers::{FailingDownloader, GatedDownloader, SucceedingDownloader, wait_for_status};

fn create_test_app(downloader: Arc<dyn Downloader>) -> (axum::Router, Arc<InMemoryJobRepository>) {
    let repository = Arc::new(InMemoryJobRepository::new());
    let executor = Arc::new(DownloadExecutor::new(repository.clone(), downloader, None));
    let job_service = Arc::new(JobService::new(repository.clone(), executor));

    (create_router(AppState { job_service }), repository)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn given_valid_body_when_creating_then_created_queued_and_later_completed() {
    let (app, repository) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/downloads",
            json!({ "url": "https://example.com/comic", "startChapter": 1, "endChapter": 5 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "queued");
    assert_eq!(body["progress"], 0);
    assert_eq!(body["startChapter"], 1);
    assert_eq!(body["endChapter"], 5);
    assert!(body["completedAt"].is_null());

    let id = JobId::new(body["id"].as_i64().unwrap());
    wait_for_status(repository.as_ref(), id, JobStatus::Completed).await;

    let (status, body) = send(&app, get(&format!("/api/downloads/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["progress"], 100);
    assert!(body["completedAt"].is_string());
}

#[tokio::test]
async fn given_failing_tool_when_creating_then_job_ends_failed_with_error() {
    let (app, repository) =
        create_test_app(Arc::new(FailingDownloader::exit(1, "unsupported site")));

    let (status, body) = send(
        &app,
        json_request("POST", "/api/downloads", json!({ "url": "https://example.com/comic" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = JobId::new(body["id"].as_i64().unwrap());
    wait_for_status(repository.as_ref(), id, JobStatus::Failed).await;

    let (_, body) = send(&app, get(&format!("/api/downloads/{id}"))).await;
    assert_eq!(body["status"], "failed");
    assert!(body["error"].as_str().unwrap().contains("unsupported site"));
    assert!(body["completedAt"].is_null());
}

#[tokio::test]
async fn given_missing_url_when_creating_then_bad_request_and_nothing_stored() {
    let (app, repository) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let (status, body) = send(
        &app,
        json_request("POST", "/api/downloads", json!({ "startChapter": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL is required");
    assert!(repository.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_malformed_json_when_creating_then_bad_request() {
    let (app, _) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/downloads")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_unknown_id_when_getting_then_not_found() {
    let (app, _) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let (status, body) = send(&app, get("/api/downloads/9999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Download not found");
}

#[tokio::test]
async fn given_non_numeric_id_when_getting_then_bad_request() {
    let (app, _) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let (status, _) = send(&app, get("/api/downloads/abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_failed_filter_when_listing_then_only_failed_jobs_newest_first() {
    let (app, repository) = create_test_app(Arc::new(GatedDownloader::new()));
    let mut ids = Vec::new();
    for n in 0..3 {
        let job = repository
            .create(&NewJob::new(format!("https://example.com/comic/{n}")))
            .await
            .unwrap();
        ids.push(job.id);
    }
    for id in [ids[0], ids[2]] {
        repository
            .update(id, &JobUpdate::status(JobStatus::Failed).with_error("boom"))
            .await
            .unwrap();
    }

    let (status, body) = send(&app, get("/api/downloads?status=failed")).await;

    assert_eq!(status, StatusCode::OK);
    let listed: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2].as_i64(), ids[0].as_i64()]);

    let (_, all) = send(&app, get("/api/downloads")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn given_unknown_status_filter_when_listing_then_bad_request() {
    let (app, _) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let (status, _) = send(&app, get("/api/downloads?status=paused")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_patch_to_completed_when_updating_then_completed_at_is_set() {
    let (app, repository) = create_test_app(Arc::new(GatedDownloader::new()));
    let job = repository
        .create(&NewJob::new("https://example.com/comic"))
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/downloads/{}", job.id),
            json!({ "status": "completed", "progress": 100 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["progress"], 100);
    assert!(body["completedAt"].is_string());
}

#[tokio::test]
async fn given_error_with_completed_status_when_patching_then_error_is_not_kept() {
    let (app, repository) = create_test_app(Arc::new(GatedDownloader::new()));
    let job = repository
        .create(&NewJob::new("https://example.com/comic"))
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/downloads/{}", job.id),
            json!({ "status": "completed", "error": "boom" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn given_unknown_id_when_patching_then_not_found() {
    let (app, _) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/downloads/77", json!({ "progress": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_invalid_progress_when_patching_then_bad_request() {
    let (app, repository) = create_test_app(Arc::new(GatedDownloader::new()));
    let job = repository
        .create(&NewJob::new("https://example.com/comic"))
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/downloads/{}", job.id),
            json!({ "progress": 150 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_existing_job_when_deleting_then_no_content_and_second_delete_fails() {
    let (app, repository) = create_test_app(Arc::new(GatedDownloader::new()));
    let job = repository
        .create(&NewJob::new("https://example.com/comic"))
        .await
        .unwrap();
    let uri = format!("/api/downloads/{}", job.id);

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(&uri)
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to delete download");
}

#[tokio::test]
async fn given_unknown_id_when_deleting_then_internal_error() {
    let (app, _) = create_test_app(Arc::new(SucceedingDownloader::default()));

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/downloads/999")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to delete download");
}

#[tokio::test]
async fn given_jobs_in_each_state_when_requesting_stats_then_counts_match() {
    let (app, repository) = create_test_app(Arc::new(GatedDownloader::new()));
    for status in [
        JobStatus::Completed,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Queued,
        JobStatus::Downloading,
    ] {
        let job = repository
            .create(&NewJob::new("https://example.com/comic"))
            .await
            .unwrap();
        repository
            .update(job.id, &JobUpdate::status(status))
            .await
            .unwrap();
    }

    let (status, body) = send(&app, get("/api/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "total": 5, "completed": 2, "failed": 1, "active": 2 })
    );
}
