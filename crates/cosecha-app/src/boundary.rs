use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

use crate::view::View;

/// Isolation boundary around page rendering. A failing or panicking page
/// produces a minimal fallback panel; the rest of the app keeps running.
pub fn isolate<F>(page: &str, render: F) -> View
where
    F: FnOnce() -> cosecha_types::Result<View>,
{
    match catch_unwind(AssertUnwindSafe(render)) {
        Ok(Ok(view)) => view,
        Ok(Err(err)) => {
            error!(page, "page failed to render: {err}");
            View::error(&err)
        }
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(page, detail, "page panicked while rendering");
            View::ErrorPanel {
                title: "Something went wrong".to_string(),
                message: "An unexpected error occurred. The page couldn't load properly.".to_string(),
            }
        }
    }
}
