//! Report backend: runs the fetch-then-narrate pipeline off the UI thread.
//! Results are sent back via mpsc for the model to pick up in `poll_channel`.

use std::sync::Arc;

use skyscribe_services::{Report, ReportPipeline};
use skyscribe_weather::WeatherError;
use tokio_util::sync::CancellationToken;

/// Messages sent from async operations back to the UI thread
#[derive(Debug)]
pub enum ReportServiceMessage {
    /// Result of one query. `request_id` lets the model drop superseded answers.
    ReportDone {
        request_id: u64,
        location: String,
        result: Result<Report, WeatherError>,
    },
}

/// Request a report for `location` asynchronously.
/// Sends `ReportDone` on the channel when complete, unless `shutdown` fires first.
pub fn request_report(
    tx: &std::sync::mpsc::Sender<ReportServiceMessage>,
    pipeline: Arc<ReportPipeline>,
    runtime: &tokio::runtime::Handle,
    shutdown: CancellationToken,
    request_id: u64,
    location: String,
) {
    let tx = tx.clone();

    runtime.spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!(request_id, "Report request cancelled by shutdown");
            }
            result = pipeline.run(&location) => {
                match &result {
                    Ok(report) => tracing::info!(
                        request_id,
                        location = report.reading.location(),
                        narrative = report.is_complete(),
                        "Report ready"
                    ),
                    Err(e) => tracing::warn!(request_id, "Report for '{}' failed: {}", location, e),
                }

                if tx
                    .send(ReportServiceMessage::ReportDone { request_id, location, result })
                    .is_err()
                {
                    tracing::debug!(request_id, "Report receiver dropped");
                }
            }
        }
    });
}
