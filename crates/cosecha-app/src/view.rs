use cosecha_types::api::Stats;
use cosecha_types::models::{Application, ApplicationStatus, Contract, ContractStatus, Job};

/// Badge coloring hint; the shell maps it to whatever its toolkit offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Pending,
}

#[derive(Debug, Clone)]
pub struct ContractCard {
    pub contract: Contract,
    pub status_label: &'static str,
    pub tone: Tone,
}

impl ContractCard {
    pub fn from(contract: Contract) -> ContractCard {
        let (status_label, tone) = match contract.status {
            ContractStatus::Accepted => ("Accepted", Tone::Positive),
            ContractStatus::Completed => ("Completed", Tone::Positive),
            ContractStatus::Rejected => ("Rejected", Tone::Negative),
            ContractStatus::Pending => ("Pending", Tone::Pending),
        };
        ContractCard { contract, status_label, tone }
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationCard {
    pub application: Application,
    pub status_label: &'static str,
    pub tone: Tone,
    /// Accept/reject actions are only offered while pending.
    pub can_review: bool,
}

impl ApplicationCard {
    pub fn from(application: Application) -> ApplicationCard {
        let (status_label, tone) = match application.status {
            ApplicationStatus::Accepted => ("Accepted", Tone::Positive),
            ApplicationStatus::Rejected => ("Rejected", Tone::Negative),
            ApplicationStatus::Pending => ("Pending", Tone::Pending),
        };
        let can_review = application.status == ApplicationStatus::Pending;
        ApplicationCard { application, status_label, tone, can_review }
    }
}

/// Typed page output. Rendering stays toolkit-free; `render_text` is what
/// the line shell prints and what the tests assert on.
#[derive(Debug, Clone)]
pub enum View {
    Waiting,
    ConfigWarning,
    ErrorPanel { title: String, message: String },
    Jobs { jobs: Vec<Job>, banner: Option<String> },
    Contracts { cards: Vec<ContractCard>, from_cache: bool },
    Dashboard { recent: Vec<Job> },
    Applications { cards: Vec<ApplicationCard> },
    Admin { stats: Stats, degraded: bool },
    Login { notice: Option<String> },
    SignUp,
}

impl View {
    pub fn error(err: &cosecha_types::Error) -> View {
        View::ErrorPanel {
            title: "Something went wrong".to_string(),
            message: err.to_string(),
        }
    }

    /// Plain-text rendering. Never empty, whatever the state.
    pub fn render_text(&self) -> String {
        match self {
            View::Waiting => "Loading...".to_string(),
            View::ConfigWarning => {
                "⚠ Authentication not configured.\n\
                 Set COSECHA_AUTH_URL and COSECHA_AUTH_KEY to use this feature."
                    .to_string()
            }
            View::ErrorPanel { title, message } => {
                format!("⚠ {title}\n{message}\nType `reload` to try again, or `open /jobs` to go home.")
            }
            View::Jobs { jobs, banner } => {
                let mut out = String::from("== Available Jobs ==\n");
                if let Some(banner) = banner {
                    out.push_str(&format!("! {banner}\n"));
                }
                if jobs.is_empty() {
                    out.push_str("No jobs available at this time\n");
                }
                for job in jobs {
                    out.push_str(&format!(
                        "#{} {} — {} — {} — {}",
                        job.id, job.title, job.pay, job.location, job.date
                    ));
                    if let Some(crop) = &job.crop_type {
                        out.push_str(&format!(" [{crop}]"));
                    }
                    if let Some(count) = job.workers_requested {
                        out.push_str(&format!(" ({count} workers requested)"));
                    }
                    out.push('\n');
                }
                out
            }
            View::Contracts { cards, from_cache } => {
                let mut out = String::from("== My Contracts ==\n");
                if *from_cache {
                    out.push_str("! Showing locally saved contracts; the server could not be reached.\n");
                }
                if cards.is_empty() {
                    out.push_str("No contracts yet. Apply to jobs from the jobs tab.\n");
                }
                for card in cards {
                    out.push_str(&format!(
                        "#{} {} — {} — {} [{}]\n",
                        card.contract.id,
                        card.contract.job_title,
                        card.contract.pay,
                        card.contract.location,
                        card.status_label
                    ));
                }
                out
            }
            View::Dashboard { recent } => {
                let mut out = String::from("== Grower Console ==\nPost a job with: post <title>|<pay>|<location>|<date>[|description]\n");
                if !recent.is_empty() {
                    out.push_str("Recently posted:\n");
                    for job in recent {
                        out.push_str(&format!("  {} — {} — {}\n", job.title, job.location, job.date));
                    }
                }
                out
            }
            View::Applications { cards } => {
                let mut out = String::from("== Job Applications ==\n");
                if cards.is_empty() {
                    out.push_str("No applications found.\n");
                }
                for card in cards {
                    out.push_str(&format!(
                        "#{} {} — {} [{}]",
                        card.application.id,
                        card.application.job_title,
                        card.application.worker_name.as_deref().unwrap_or("Unknown worker"),
                        card.status_label
                    ));
                    if card.application.audio_url.is_some() {
                        out.push_str(" 🎤");
                    }
                    if card.can_review {
                        out.push_str(&format!(
                            "  (accept {0} / reject {0})",
                            card.application.id
                        ));
                    }
                    out.push('\n');
                }
                out
            }
            View::Admin { stats, degraded } => {
                let mut out = String::from("== Admin Console ==\n");
                if *degraded {
                    out.push_str("! Live stats unavailable; showing placeholders.\n");
                }
                out.push_str(&format!(
                    "Active jobs: {}\nTotal applications: {}\n",
                    stats.active_jobs, stats.total_applications
                ));
                for day in &stats.weekly_jobs {
                    out.push_str(&format!("  {} jobs:{}\n", day.name, day.jobs));
                }
                for entry in &stats.category_stats {
                    out.push_str(&format!(
                        "  {}: {} jobs / {} workers\n",
                        entry.category, entry.jobs, entry.workers
                    ));
                }
                out
            }
            View::Login { notice } => {
                let mut out = String::from("== Sign In ==\nlogin <email> <password>\n");
                if let Some(notice) = notice {
                    out.push_str(&format!("! {notice}\n"));
                }
                out
            }
            View::SignUp => {
                "== Sign Up ==\nsignup <email> <password> <name> [worker|grower|admin]\n".to_string()
            }
        }
    }
}
