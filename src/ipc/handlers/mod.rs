pub mod core;
pub mod dashboard;
pub mod programs;
pub mod reports;
pub mod schedules;
pub mod session;
pub mod settings;
pub mod students;
pub mod transactions;
