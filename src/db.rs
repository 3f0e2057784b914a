pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod site_visit_repo;
pub use site_visit_repo::SiteVisitRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
