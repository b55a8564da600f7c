pub mod boundary;
pub mod guard;
pub mod nav;
pub mod pages;
pub mod routes;
pub mod view;

pub use guard::{RouteDecision, evaluate};
pub use routes::{Route, default_route};
pub use view::View;
