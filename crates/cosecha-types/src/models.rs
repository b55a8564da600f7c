use serde::{Deserialize, Serialize};

/// Closed role vocabulary. Anything else coming from profile metadata or the
/// user registry is treated as "no role", never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Grower,
    Admin,
}

impl Role {
    /// Lenient parse used for profile metadata and registry rows.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "worker" => Some(Role::Worker),
            "grower" => Some(Role::Grower),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Grower => "grower",
            Role::Admin => "admin",
        }
    }
}

/// Who the signed-in user is, as far as the rest of the app needs to know.
/// The identity provider remains the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Profile fields carried in provider user metadata. `role` stays a free
/// string here; it only becomes a [`Role`] after a lenient parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "cropType", skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default, alias = "workersRequested", skip_serializing_if = "Option::is_none")]
    pub workers_requested: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Grower-facing record of a worker's request to fill a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub worker_name: Option<String>,
    #[serde(default)]
    pub worker_phone: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub grower_id: Option<String>,
    #[serde(default)]
    pub farm_name: Option<String>,
}

/// Canonical contract status. The backend historically emitted both
/// `signed` and `accepted` for the same state; `signed` is mapped to
/// [`ContractStatus::Accepted`] at the boundary and never leaks past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    #[default]
    Pending,
    Accepted,
    Completed,
    Rejected,
}

impl ContractStatus {
    /// Lenient parse of incoming status strings. Unknown or absent values
    /// fall back to `Pending`, matching how the pages always treated them.
    pub fn parse_lenient(raw: Option<&str>) -> ContractStatus {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("accepted") | Some("signed") => ContractStatus::Accepted,
            Some("completed") => ContractStatus::Completed,
            Some("rejected") => ContractStatus::Rejected,
            _ => ContractStatus::Pending,
        }
    }
}

/// Worker-visible projection of an application/job pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    pub status: ContractStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Worker ids arrive either as integers (backend default rows) or as
/// provider uuids. Canonical form is a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawWorkerId {
    Num(i64),
    Text(String),
}

impl RawWorkerId {
    fn into_string(self) -> String {
        match self {
            RawWorkerId::Num(n) => n.to_string(),
            RawWorkerId::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobRef {
    #[serde(default)]
    pub pay: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Contract payload as the backend actually sends it: snake_case or
/// camelCase field names, flat or nested job details, loose status strings.
/// Translated into the canonical [`Contract`] exactly once, here.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContract {
    pub id: i64,
    #[serde(default, alias = "jobId")]
    pub job_id: Option<i64>,
    #[serde(default, alias = "jobTitle")]
    pub job_title: Option<String>,
    #[serde(default)]
    pub pay: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "workerId")]
    pub worker_id: Option<RawWorkerId>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub jobs: Option<RawJobRef>,
}

impl RawContract {
    pub fn canonicalize(self) -> Contract {
        let jobs = self.jobs.unwrap_or_default();
        Contract {
            id: self.id,
            job_id: self.job_id.unwrap_or(0),
            job_title: self.job_title.unwrap_or_else(|| "Unknown job".to_string()),
            pay: self.pay.or(jobs.pay).unwrap_or_else(|| "$—".to_string()),
            location: self.location.or(jobs.location).unwrap_or_else(|| "TBD".to_string()),
            date: self.date.or(jobs.start_date).unwrap_or_default(),
            status: ContractStatus::parse_lenient(self.status.as_deref()),
            worker_id: self.worker_id.map(RawWorkerId::into_string),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_closed() {
        assert_eq!(Role::parse("worker"), Some(Role::Worker));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse(" grower "), Some(Role::Grower));
        assert_eq!(Role::parse("supervisor"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn snake_case_contract_canonicalizes() {
        let raw: RawContract = serde_json::from_value(serde_json::json!({
            "id": 7,
            "job_id": 3,
            "job_title": "Tomato Picker",
            "pay": "$12/hr",
            "location": "Farm A",
            "date": "2025-11-20",
            "status": "pending",
            "worker_id": 1,
            "created_at": "2025-11-18T09:00:00"
        }))
        .unwrap();
        let contract = raw.canonicalize();
        assert_eq!(contract.job_id, 3);
        assert_eq!(contract.job_title, "Tomato Picker");
        assert_eq!(contract.status, ContractStatus::Pending);
        assert_eq!(contract.worker_id.as_deref(), Some("1"));
    }

    #[test]
    fn camel_case_contract_canonicalizes() {
        let raw: RawContract = serde_json::from_value(serde_json::json!({
            "id": 8,
            "jobId": 4,
            "jobTitle": "Berry Harvester",
            "status": "signed",
            "workerId": "a2c0f7e4-1111-2222-3333-444455556666",
            "jobs": { "pay": "$10/hr", "location": "Farm B", "start_date": "2025-11-21" }
        }))
        .unwrap();
        let contract = raw.canonicalize();
        assert_eq!(contract.job_id, 4);
        assert_eq!(contract.pay, "$10/hr");
        assert_eq!(contract.location, "Farm B");
        assert_eq!(contract.date, "2025-11-21");
        // Legacy "signed" collapses into the canonical accepted state.
        assert_eq!(contract.status, ContractStatus::Accepted);
    }

    #[test]
    fn missing_fields_get_display_defaults() {
        let raw: RawContract = serde_json::from_value(serde_json::json!({ "id": 9 })).unwrap();
        let contract = raw.canonicalize();
        assert_eq!(contract.job_title, "Unknown job");
        assert_eq!(contract.pay, "$—");
        assert_eq!(contract.location, "TBD");
        assert_eq!(contract.status, ContractStatus::Pending);
    }

    #[test]
    fn job_accepts_both_field_spellings() {
        let a: Job = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "t", "pay": "$1", "location": "l", "date": "d",
            "crop_type": "Tomato", "workers_requested": 5
        }))
        .unwrap();
        let b: Job = serde_json::from_value(serde_json::json!({
            "id": 2, "title": "t", "pay": "$1", "location": "l", "date": "d",
            "cropType": "Tomato", "workersRequested": 5
        }))
        .unwrap();
        assert_eq!(a.crop_type.as_deref(), Some("Tomato"));
        assert_eq!(b.crop_type.as_deref(), Some("Tomato"));
        assert_eq!(a.workers_requested, Some(5));
        assert_eq!(b.workers_requested, Some(5));
    }

    #[test]
    fn unknown_contract_status_defaults_to_pending() {
        assert_eq!(ContractStatus::parse_lenient(Some("archived")), ContractStatus::Pending);
        assert_eq!(ContractStatus::parse_lenient(None), ContractStatus::Pending);
    }
}
