pub mod pipeline;

pub use pipeline::{run_report, Report, ReportPipeline, ReportSummary};
