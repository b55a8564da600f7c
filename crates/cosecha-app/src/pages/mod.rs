pub mod admin;
pub mod applications;
pub mod auth;
pub mod contracts;
pub mod dashboard;
pub mod jobs;
