pub mod auth;
pub mod dashboard;
pub mod lead;
pub mod lead_filter;
pub mod profile;
pub mod site_visit;
pub mod task;
