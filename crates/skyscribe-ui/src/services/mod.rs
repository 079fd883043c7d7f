pub mod report_service;

pub use report_service::{request_report, ReportServiceMessage};
