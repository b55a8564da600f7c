use cosecha_session::SessionStore;
use cosecha_types::models::Profile;
use cosecha_types::{Error, Result};

use crate::routes::Route;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Sign in and hand back where to go next: the route the user originally
/// asked for, or the jobs listing. The guard re-checks either way, so a
/// role mismatch still bounces to the right landing page.
pub async fn sign_in(
    store: &SessionStore,
    form: LoginForm,
    from: Option<Route>,
) -> Result<Route> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(Error::Validation("Email and password are required.".to_string()));
    }
    store.sign_in(form.email.trim(), &form.password).await?;
    Ok(from.unwrap_or(Route::Jobs))
}

pub async fn sign_up(store: &SessionStore, form: SignUpForm) -> Result<String> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(Error::Validation("Email and password are required.".to_string()));
    }
    let profile = Profile {
        name: Some(form.name),
        phone: form.phone,
        role: form.role,
    };
    store.sign_up(form.email.trim(), &form.password, profile).await?;
    Ok("Account created. You can sign in now.".to_string())
}
