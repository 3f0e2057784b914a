pub mod dashboard;
pub mod leads;
pub mod profiles;
pub mod site_visits;
pub mod tasks;
