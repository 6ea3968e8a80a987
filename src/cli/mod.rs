//! Terminal front end: tables, progress and JSON output over the services.

pub mod governance;
pub mod rankings;
pub mod setup;
pub mod ui;
