use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;

use cosecha_app::pages::{admin, contracts, jobs};
use cosecha_app::view::View;
use cosecha_client::{ContractCache, ResourceClient};
use cosecha_session::SessionState;
use cosecha_types::api::JobFilter;
use cosecha_types::models::{Contract, ContractStatus};

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn anonymous_client(base: &str) -> ResourceClient {
    let (tx, rx) = watch::channel(SessionState::Anonymous);
    Box::leak(Box::new(tx));
    ResourceClient::new(base, rx)
}

/// A port nothing listens on.
async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn failed_job_listing_degrades_to_samples_with_banner() {
    async fn boom() -> (StatusCode, Json<serde_json::Value>) {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "detail": "db down" })))
    }
    let base = serve(Router::new().route("/jobs", get(boom))).await;
    let client = anonymous_client(&base);

    let view = jobs::load(&client, &JobFilter::default()).await;
    match &view {
        View::Jobs { jobs, banner } => {
            assert!(!jobs.is_empty(), "sample jobs must replace the empty listing");
            assert!(banner.as_deref().unwrap().contains("verify the server is running"));
        }
        other => panic!("expected jobs view, got {other:?}"),
    }
    assert!(view.render_text().contains("Tomato Picker"));
}

#[tokio::test]
async fn healthy_job_listing_has_no_banner() {
    async fn list() -> Json<serde_json::Value> {
        Json(serde_json::json!([
            { "id": 3, "title": "Grape Picker", "pay": "$14/hr",
              "location": "Vineyard C", "date": "2025-11-22" }
        ]))
    }
    let base = serve(Router::new().route("/jobs", get(list))).await;
    let client = anonymous_client(&base);

    match jobs::load(&client, &JobFilter::default()).await {
        View::Jobs { jobs, banner } => {
            assert_eq!(jobs.len(), 1);
            assert_eq!(jobs[0].title, "Grape Picker");
            assert!(banner.is_none());
        }
        other => panic!("expected jobs view, got {other:?}"),
    }
}

#[tokio::test]
async fn contracts_fall_back_to_the_local_cache() {
    let base = dead_endpoint().await;
    let client = anonymous_client(&base);

    let cache = ContractCache::in_memory().unwrap();
    cache
        .append(&Contract {
            id: 11,
            job_id: 7,
            job_title: "Tomato Picker".to_string(),
            pay: "$12/hr".to_string(),
            location: "Farm A".to_string(),
            date: "2025-11-20".to_string(),
            status: ContractStatus::Pending,
            worker_id: Some("worker-1".to_string()),
            created_at: None,
        })
        .unwrap();

    let view = contracts::load(&client, Some(&cache), Some("worker-1")).await;
    match &view {
        View::Contracts { cards, from_cache } => {
            assert!(*from_cache);
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].contract.id, 11);
        }
        other => panic!("expected contracts view, got {other:?}"),
    }
    assert!(view.render_text().contains("locally saved"));
}

#[tokio::test]
async fn contracts_without_a_cache_fall_back_to_an_empty_list() {
    let base = dead_endpoint().await;
    let client = anonymous_client(&base);

    match contracts::load(&client, None, Some("worker-1")).await {
        View::Contracts { cards, from_cache } => {
            assert!(from_cache);
            assert!(cards.is_empty());
        }
        other => panic!("expected contracts view, got {other:?}"),
    }
}

#[tokio::test]
async fn admin_console_degrades_to_placeholder_stats() {
    let base = dead_endpoint().await;
    let client = anonymous_client(&base);

    let view = admin::load(&client).await;
    match &view {
        View::Admin { stats, degraded } => {
            assert!(*degraded);
            assert_eq!(stats.weekly_jobs.len(), 7);
            assert_eq!(stats.active_jobs, 0);
        }
        other => panic!("expected admin view, got {other:?}"),
    }
    assert!(view.render_text().contains("placeholders"));
}

#[tokio::test]
async fn admin_console_shows_live_stats_when_available() {
    async fn stats() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "active_jobs": 4,
            "total_applications": 9,
            "weekly_jobs": [ { "name": "Mon", "jobs": 2 } ],
            "category_stats": [ { "category": "Tomato", "jobs": 3, "workers": 12 } ]
        }))
    }
    let base = serve(Router::new().route("/stats", get(stats))).await;
    let client = anonymous_client(&base);

    match admin::load(&client).await {
        View::Admin { stats, degraded } => {
            assert!(!degraded);
            assert_eq!(stats.active_jobs, 4);
            assert_eq!(stats.category_stats[0].workers, 12);
        }
        other => panic!("expected admin view, got {other:?}"),
    }
}
