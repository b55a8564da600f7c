use serde::{Deserialize, Serialize};

use crate::models::ApplicationStatus;

// -- Jobs --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Optional filters accepted by `GET /jobs`.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub crop_type: Option<String>,
    pub location: Option<String>,
    pub limit: Option<u32>,
}

// -- Contracts --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContractRequest {
    pub job_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

// -- Applications --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: ApplicationStatus,
}

// -- Stats --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayJobs {
    pub name: String,
    pub jobs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayApplications {
    pub name: String,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthDemand {
    pub month: String,
    pub demand: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub jobs: i64,
    pub workers: i64,
}

/// Aggregate payload of `GET /stats`, shaped for the admin console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub active_jobs: i64,
    pub total_applications: i64,
    #[serde(default)]
    pub weekly_jobs: Vec<DayJobs>,
    #[serde(default)]
    pub weekly_applications: Vec<DayApplications>,
    #[serde(default)]
    pub labor_demand_forecast: Vec<MonthDemand>,
    #[serde(default)]
    pub category_stats: Vec<CategoryStat>,
}
