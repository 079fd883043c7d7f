//! Presentation layer: services container, report service, and view model.
//!
//! No GUI toolkit is bound here. A front end owns an `AppServices`, creates a
//! `ReportModel`, and calls `poll_channel` from its event loop or timer.

pub mod app_services;
pub mod models;
pub mod services;

pub use app_services::AppServices;
pub use models::ReportModel;
pub use services::{request_report, ReportServiceMessage};
