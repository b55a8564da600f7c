use cosecha_types::models::Role;

/// Every page the client can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    SignUp,
    Jobs,
    MyContracts,
    Dashboard,
    Applications,
    Admin,
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        match path.trim().trim_end_matches('/') {
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::SignUp),
            "" | "/" | "/jobs" => Some(Route::Jobs),
            "/my-contracts" => Some(Route::MyContracts),
            "/dashboard" => Some(Route::Dashboard),
            "/applications" => Some(Route::Applications),
            "/admin" => Some(Route::Admin),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::SignUp => "/signup",
            Route::Jobs => "/jobs",
            Route::MyContracts => "/my-contracts",
            Route::Dashboard => "/dashboard",
            Route::Applications => "/applications",
            Route::Admin => "/admin",
        }
    }

    /// Roles allowed on this page, or `None` for public pages.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::Login | Route::SignUp => None,
            Route::Jobs | Route::MyContracts => Some(&[Role::Worker, Role::Admin]),
            Route::Dashboard | Route::Applications => Some(&[Role::Grower, Role::Admin]),
            Route::Admin => Some(&[Role::Admin]),
        }
    }
}

/// Landing page per role. Unknown or unassigned roles land on the jobs
/// listing.
pub fn default_route(role: Option<Role>) -> Route {
    match role {
        Some(Role::Grower) => Route::Dashboard,
        Some(Role::Admin) => Route::Admin,
        Some(Role::Worker) | None => Route::Jobs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_the_jobs_listing() {
        assert_eq!(Route::parse("/"), Some(Route::Jobs));
        assert_eq!(Route::parse("/jobs"), Some(Route::Jobs));
        assert_eq!(Route::parse("/jobs/"), Some(Route::Jobs));
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn role_defaults() {
        assert_eq!(default_route(Some(Role::Worker)), Route::Jobs);
        assert_eq!(default_route(Some(Role::Grower)), Route::Dashboard);
        assert_eq!(default_route(Some(Role::Admin)), Route::Admin);
        assert_eq!(default_route(None), Route::Jobs);
    }
}
