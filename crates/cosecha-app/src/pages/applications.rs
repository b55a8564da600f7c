use cosecha_client::ResourceClient;
use cosecha_types::Result;
use cosecha_types::models::{ApplicationStatus, Role};

use crate::view::{ApplicationCard, View};

/// Status filter tabs on the applications page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Accepted,
    Rejected,
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Option<StatusFilter> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "pending" => Some(StatusFilter::Pending),
            "accepted" => Some(StatusFilter::Accepted),
            "rejected" => Some(StatusFilter::Rejected),
            _ => None,
        }
    }

    fn as_status(self) -> Option<ApplicationStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(ApplicationStatus::Pending),
            StatusFilter::Accepted => Some(ApplicationStatus::Accepted),
            StatusFilter::Rejected => Some(ApplicationStatus::Rejected),
        }
    }
}

/// Review queue. Growers only see applications to their own jobs; admins
/// see everything.
pub async fn load(
    client: &ResourceClient,
    role: Option<Role>,
    user_id: Option<&str>,
    filter: StatusFilter,
) -> Result<View> {
    let grower_id = match role {
        Some(Role::Grower) => user_id,
        _ => None,
    };
    let applications = client.list_applications(grower_id, filter.as_status()).await?;
    Ok(View::Applications {
        cards: applications.into_iter().map(ApplicationCard::from).collect(),
    })
}

/// Accept or reject one application. Callers refetch the list afterwards so
/// the badge reflects the stored status, not a local guess.
pub async fn review(
    client: &ResourceClient,
    application_id: i64,
    accept: bool,
) -> Result<()> {
    let status = if accept { ApplicationStatus::Accepted } else { ApplicationStatus::Rejected };
    client.update_application_status(application_id, status).await
}
