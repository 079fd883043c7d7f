//! Centralized application services with mutable state support.
//!
//! `AppServices` holds the tokio runtime, the report pipeline, and the report
//! service channel. The pipeline sits behind a `RwLock` so a front end can
//! rebuild it (for example after switching units) without restarting.

use std::sync::mpsc;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use skyscribe_core::{AppError, Config, Credentials};
use skyscribe_services::ReportPipeline;

/// Message type for the report service channel
pub use crate::services::ReportServiceMessage;

/// Application services container.
///
/// Created once by the front end and shared through `Arc`.
pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    /// Cancelled on shutdown; in-flight report tasks stop without sending
    shutdown: CancellationToken,

    pipeline: RwLock<Option<Arc<ReportPipeline>>>,

    /// Report service channel sender
    report_service_tx: RwLock<Option<mpsc::Sender<ReportServiceMessage>>>,

    /// Report service channel receiver
    report_service_rx: RwLock<Option<Mutex<mpsc::Receiver<ReportServiceMessage>>>>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("pipeline", &self.pipeline.read().is_some())
            .field("shut_down", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl AppServices {
    /// Create the services container with its own multi-threaded runtime.
    pub fn new() -> Result<Arc<Self>, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("skyscribe-tokio")
            .build()?;

        Ok(Arc::new(Self {
            runtime,
            shutdown: CancellationToken::new(),
            pipeline: RwLock::new(None),
            report_service_tx: RwLock::new(None),
            report_service_rx: RwLock::new(None),
        }))
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Token that fires when the services shut down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Signal application shutdown.
    ///
    /// Cancels in-flight report tasks and clears all service references.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");

        self.shutdown.cancel();

        *self.pipeline.write() = None;
        *self.report_service_tx.write() = None;
        *self.report_service_rx.write() = None;

        tracing::info!("AppServices shutdown complete");
    }

    // =========== Report Pipeline ===========

    /// Get the report pipeline if initialized.
    pub fn pipeline(&self) -> Option<Arc<ReportPipeline>> {
        self.pipeline.read().clone()
    }

    /// Set or replace the report pipeline.
    pub fn set_pipeline(&self, pipeline: Option<Arc<ReportPipeline>>) {
        *self.pipeline.write() = pipeline;
    }

    /// Build the production pipeline from configuration and credentials.
    ///
    /// Fails when the weather key is missing; a missing narrative key only
    /// disables narratives.
    pub fn init_pipeline(&self, config: &Config, credentials: &Credentials) -> Result<(), AppError> {
        let pipeline = ReportPipeline::from_config(config, credentials)?;
        self.set_pipeline(Some(Arc::new(pipeline)));
        tracing::info!("Report pipeline initialized");
        Ok(())
    }

    // =========== Report Service Channel ===========

    /// Get report service sender.
    pub fn report_service_tx(&self) -> Option<mpsc::Sender<ReportServiceMessage>> {
        self.report_service_tx.read().clone()
    }

    /// Initialize report service channel.
    pub fn init_report_service_channel(&self) -> bool {
        if self.report_service_tx.read().is_some() {
            return true;
        }

        let (tx, rx) = mpsc::channel();
        *self.report_service_tx.write() = Some(tx);
        *self.report_service_rx.write() = Some(Mutex::new(rx));
        tracing::debug!("Report service channel initialized");
        true
    }

    /// Try to receive a message from the report service channel (non-blocking).
    pub fn try_recv_report_message(&self) -> Option<ReportServiceMessage> {
        let guard = self.report_service_rx.read();
        let rx_mutex = guard.as_ref()?;
        let result = rx_mutex.lock().try_recv().ok();
        result
    }
}
