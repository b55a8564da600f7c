use cosecha_client::ResourceClient;
use cosecha_types::api::CreateJobRequest;
use cosecha_types::models::Job;
use cosecha_types::{Error, Result};

use crate::view::View;

/// Grower console: post jobs, keep the latest postings visible.
#[derive(Default)]
pub struct DashboardPage {
    posted: Vec<Job>,
}

#[derive(Debug, Clone, Default)]
pub struct JobForm {
    pub title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    pub description: Option<String>,
}

impl DashboardPage {
    pub fn view(&self) -> View {
        // Only the last three postings are shown.
        let recent = self.posted.iter().rev().take(3).rev().cloned().collect();
        View::Dashboard { recent }
    }

    pub async fn post_job(&mut self, client: &ResourceClient, form: JobForm) -> Result<String> {
        for (value, field) in [
            (&form.title, "title"),
            (&form.pay, "pay"),
            (&form.location, "location"),
            (&form.date, "date"),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("Job {field} is required.")));
            }
        }

        let request = CreateJobRequest {
            title: form.title.trim().to_string(),
            pay: form.pay.trim().to_string(),
            location: form.location.trim().to_string(),
            date: form.date.trim().to_string(),
            description: form.description.filter(|d| !d.trim().is_empty()),
        };
        let job = client.create_job(&request).await?;
        self.posted.push(job);
        Ok("Job posted successfully!".to_string())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::watch;

    use cosecha_session::SessionState;

    use super::*;

    #[tokio::test]
    async fn missing_fields_are_rejected_before_any_request() {
        // Client pointed at a closed port: a request would fail loudly.
        let (_tx, rx) = watch::channel(SessionState::Anonymous);
        let client = ResourceClient::new("http://127.0.0.1:1", rx);
        let mut page = DashboardPage::default();

        let err = page
            .post_job(&client, JobForm { title: "Picker".to_string(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(page.view(), View::Dashboard { recent } if recent.is_empty()));
    }
}
