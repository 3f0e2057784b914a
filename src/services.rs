pub mod auth;
pub mod dashboard_service;
pub mod lead_export;
pub mod lead_import;
pub mod lead_service;
pub mod site_visit_service;
pub mod task_service;
