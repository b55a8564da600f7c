use cosecha_session::SessionState;

use crate::routes::{Route, default_route};

/// What to do with a navigation request. Checked in strict priority order;
/// see [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Provider unconfigured: render the configuration warning instead of
    /// the page. An escape hatch, not a security control.
    Unconfigured,
    /// Session still resolving: render a waiting indicator and re-evaluate
    /// when it settles.
    Waiting,
    /// Nobody signed in: go to the sign-in page, remembering where the
    /// user wanted to be.
    RedirectToLogin { from: Route },
    /// Signed in but not allowed here: go to the role's landing page.
    Redirect(Route),
    Allow,
}

/// Decide whether `route` may render for the given session.
pub fn evaluate(state: &SessionState, configured: bool, route: Route) -> RouteDecision {
    let Some(allowed) = route.allowed_roles() else {
        return RouteDecision::Allow;
    };

    if !configured {
        return RouteDecision::Unconfigured;
    }
    if state.is_resolving() {
        return RouteDecision::Waiting;
    }

    match state {
        SessionState::Anonymous => RouteDecision::RedirectToLogin { from: route },
        SessionState::Authenticated { role, .. } => {
            match role {
                Some(role) if allowed.contains(role) => RouteDecision::Allow,
                other => {
                    let target = default_route(*other);
                    // A role whose landing page is the page being denied
                    // would redirect to itself forever; let it through.
                    if target == route {
                        RouteDecision::Allow
                    } else {
                        RouteDecision::Redirect(target)
                    }
                }
            }
        }
        // is_resolving() already handled these.
        SessionState::Uninitialized | SessionState::Loading => RouteDecision::Waiting,
    }
}
