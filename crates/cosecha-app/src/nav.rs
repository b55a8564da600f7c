use cosecha_types::models::Role;

use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub icon: &'static str,
    pub label: &'static str,
    pub active: bool,
}

const ALL_TABS: &[(Route, &str, &str)] = &[
    (Route::Jobs, "💼", "Jobs"),
    (Route::MyContracts, "📋", "Contracts"),
    (Route::Dashboard, "➕", "Post Job"),
    (Route::Applications, "📥", "Applications"),
    (Route::Admin, "📊", "Admin"),
];

/// Bottom tabs for the signed-in role. Tabs the role cannot open are not
/// shown at all; the guard would only bounce them anyway.
pub fn items(role: Option<Role>, current: Route) -> Vec<NavItem> {
    ALL_TABS
        .iter()
        .filter(|(route, _, _)| match route.allowed_roles() {
            Some(allowed) => role.is_some_and(|r| allowed.contains(&r)),
            None => true,
        })
        .map(|(route, icon, label)| NavItem {
            route: *route,
            icon,
            label,
            active: *route == current,
        })
        .collect()
}
