use tracing::warn;

use cosecha_client::ResourceClient;
use cosecha_types::api::{CategoryStat, DayApplications, DayJobs, MonthDemand, Stats};

use crate::view::View;

/// Zeroed datasets so the console renders without a backend.
pub fn placeholder_stats() -> Stats {
    let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
    Stats {
        active_jobs: 0,
        total_applications: 0,
        weekly_jobs: days
            .iter()
            .map(|d| DayJobs { name: d.to_string(), jobs: 0 })
            .collect(),
        weekly_applications: days
            .iter()
            .map(|d| DayApplications { name: d.to_string(), applications: 0 })
            .collect(),
        labor_demand_forecast: months
            .iter()
            .map(|m| MonthDemand { month: m.to_string(), demand: 0 })
            .collect(),
        category_stats: ["Tomato", "Strawberry"]
            .iter()
            .map(|c| CategoryStat { category: c.to_string(), jobs: 0, workers: 0 })
            .collect(),
    }
}

/// Admin console. A failed stats fetch degrades to placeholders instead of
/// an empty screen.
pub async fn load(client: &ResourceClient) -> View {
    match client.fetch_stats().await {
        Ok(stats) => View::Admin { stats, degraded: false },
        Err(err) => {
            warn!("could not load stats: {err}");
            View::Admin { stats: placeholder_stats(), degraded: true }
        }
    }
}
