//! View model for one weather report.
//!
//! Holds display state only. `request` hands the query to the report service;
//! the front end then calls `poll_channel` until `loading()` goes false.

use std::sync::Arc;

use skyscribe_core::{AppError, FetchError};
use skyscribe_services::Report;

use crate::app_services::AppServices;
use crate::services::{request_report, ReportServiceMessage};

pub const LOADING_MESSAGE: &str = "Fetching weather and generating AI summary...";

#[derive(Debug)]
pub struct ReportModel {
    services: Arc<AppServices>,

    loading: bool,
    has_data: bool,
    location_label: String,
    temperature_label: String,
    feels_like_label: String,
    humidity_label: String,
    wind_label: String,
    condition_label: String,
    narrative_label: String,
    warning_message: String,
    error_message: String,

    report: Option<Report>,
    next_request_id: u64,
    pending_request: Option<u64>,
}

impl ReportModel {
    pub fn new(services: Arc<AppServices>) -> Self {
        services.init_report_service_channel();
        Self {
            services,
            loading: false,
            has_data: false,
            location_label: String::new(),
            temperature_label: String::new(),
            feels_like_label: String::new(),
            humidity_label: String::new(),
            wind_label: String::new(),
            condition_label: String::new(),
            narrative_label: String::new(),
            warning_message: String::new(),
            error_message: String::new(),
            report: None,
            next_request_id: 1,
            pending_request: None,
        }
    }

    /// Start a query for `location`.
    ///
    /// Returns false when the query could not be started; `error_message`
    /// then says why. A newer request supersedes any pending one.
    pub fn request(&mut self, location: &str) -> bool {
        let location = location.trim();
        if location.is_empty() {
            self.show_error(&AppError::Fetch(FetchError::EmptyLocation));
            return false;
        }

        let (pipeline, tx) = match (self.services.pipeline(), self.services.report_service_tx()) {
            (Some(p), Some(tx)) => (p, tx),
            _ => {
                tracing::error!("Report requested before services were initialized");
                self.clear_labels();
                self.error_message = "Weather service not initialized".to_string();
                return false;
            }
        };

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending_request = Some(request_id);

        self.clear_labels();
        self.error_message.clear();
        self.loading = true;

        request_report(
            &tx,
            pipeline,
            &self.services.runtime(),
            self.services.shutdown_token(),
            request_id,
            location.to_string(),
        );
        true
    }

    /// Apply any finished report. Non-blocking.
    ///
    /// Returns true when the display state changed.
    pub fn poll_channel(&mut self) -> bool {
        let mut changed = false;

        while let Some(msg) = self.services.try_recv_report_message() {
            match msg {
                ReportServiceMessage::ReportDone {
                    request_id,
                    location,
                    result,
                } => {
                    if self.pending_request != Some(request_id) {
                        tracing::debug!(request_id, "Dropping superseded report for '{}'", location);
                        continue;
                    }
                    self.pending_request = None;
                    self.loading = false;

                    match result {
                        Ok(report) => self.show_report(report),
                        Err(e) => self.show_error(&AppError::from(e)),
                    }
                    changed = true;
                }
            }
        }

        changed
    }

    fn show_report(&mut self, report: Report) {
        let reading = &report.reading;
        self.location_label = reading.display_location();
        self.temperature_label = reading.temperature().to_string();
        self.feels_like_label = reading.feels_like().to_string();
        self.humidity_label = format!("{}%", reading.humidity());
        self.wind_label = reading.wind_speed().to_string();
        self.condition_label = match reading.description() {
            d if d.eq_ignore_ascii_case(reading.condition()) => reading.condition().to_string(),
            d => format!("{} ({})", reading.condition(), d),
        };

        match &report.narrative {
            Ok(text) => {
                self.narrative_label = text.as_str().to_string();
                self.warning_message.clear();
            }
            Err(e) => {
                self.narrative_label.clear();
                self.warning_message = e.user_message().to_string();
            }
        }

        self.error_message.clear();
        self.has_data = true;
        self.report = Some(report);
    }

    fn show_error(&mut self, error: &AppError) {
        tracing::debug!("Showing error: {}", error);
        self.loading = false;
        self.clear_labels();
        self.error_message = error.user_message().to_string();
    }

    fn clear_labels(&mut self) {
        self.has_data = false;
        self.report = None;
        self.location_label.clear();
        self.temperature_label.clear();
        self.feels_like_label.clear();
        self.humidity_label.clear();
        self.wind_label.clear();
        self.condition_label.clear();
        self.narrative_label.clear();
        self.warning_message.clear();
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Loading text while a query runs, otherwise empty
    pub fn status_message(&self) -> &str {
        if self.loading {
            LOADING_MESSAGE
        } else {
            ""
        }
    }

    pub fn location_label(&self) -> &str {
        &self.location_label
    }

    pub fn temperature_label(&self) -> &str {
        &self.temperature_label
    }

    pub fn feels_like_label(&self) -> &str {
        &self.feels_like_label
    }

    pub fn humidity_label(&self) -> &str {
        &self.humidity_label
    }

    pub fn wind_label(&self) -> &str {
        &self.wind_label
    }

    pub fn condition_label(&self) -> &str {
        &self.condition_label
    }

    pub fn narrative_label(&self) -> &str {
        &self.narrative_label
    }

    /// Non-fatal narrative problem, shown next to the reading
    pub fn warning_message(&self) -> &str {
        &self.warning_message
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// The last complete or partial report
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }
}
