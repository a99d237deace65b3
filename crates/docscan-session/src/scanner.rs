// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Public entry point: start scans and wait for their outcomes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use docscan_bridge::ScanBridge;
use docscan_core::config::ScanConfig;
use docscan_core::error::{Result, ScanError};
use docscan_core::types::{ScanId, ScanSource, ScanStage};
use docscan_document::{DocumentDetector, QuadDetector};
use tokio::sync::{oneshot, watch};
use tracing::{error, info};

use crate::cancel::{CancelHandle, cancel_pair};
use crate::completion::CompletionSlot;
use crate::outcome::{ScanOutcome, ScanResult};
use crate::session::{ScanSession, SessionParts};

/// Starts scan sessions against one bridge.
///
/// Each `start_scan` gets its own session task; sessions share the bridge,
/// the detector and the configuration, and nothing mutable.
pub struct Scanner<B> {
    bridge: Arc<B>,
    config: Arc<ScanConfig>,
    detector: Arc<dyn QuadDetector>,
}

impl<B: ScanBridge> Scanner<B> {
    /// A scanner using the built-in `DocumentDetector`.
    pub fn new(bridge: B, config: ScanConfig) -> Self {
        let detector = Arc::new(DocumentDetector::new(config.detector.clone()));
        Self {
            bridge: Arc::new(bridge),
            config: Arc::new(config),
            detector,
        }
    }

    /// Replace the detector, e.g. with one using different strategies.
    pub fn with_detector(mut self, detector: impl QuadDetector + 'static) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Validate `source` and spawn a session for it.
    ///
    /// Fails with `InvalidSource` for anything but `camera`, `gallery` or
    /// `select`, and with `Internal` outside a tokio runtime. Every other
    /// failure arrives through [`ScanHandle::outcome`].
    pub fn start_scan(&self, source: &str) -> Result<ScanHandle> {
        let source: ScanSource = source.parse()?;
        if tokio::runtime::Handle::try_current().is_err() {
            error!("start_scan called outside a tokio runtime");
            return Err(ScanError::Internal("no tokio runtime to run the scan on".into()));
        }

        let id = ScanId::new();
        let created_at = Utc::now();
        let (slot, receiver) = CompletionSlot::new();
        let (cancel, token) = cancel_pair();
        let (stage_tx, stage_rx) = watch::channel(ScanStage::Idle);

        let session = ScanSession::new(
            Arc::clone(&self.bridge),
            Arc::clone(&self.detector),
            SessionParts {
                id,
                source,
                created_at,
                config: Arc::clone(&self.config),
                slot: Arc::new(slot),
                cancel: token,
                stage_tx,
            },
        );
        tokio::spawn(session.run());
        info!(scan_id = %id, %source, "Scan started");

        Ok(ScanHandle {
            id,
            source,
            created_at,
            receiver,
            cancel,
            stage_rx,
        })
    }

    /// Start a scan and wait for it.
    ///
    /// `Ok(None)` when the user cancelled or permission was denied; use
    /// [`start_scan`](Self::start_scan) to tell those apart.
    pub async fn scan(&self, source: &str) -> Result<Option<ScanResult>> {
        self.start_scan(source)?.outcome().await.into_result()
    }
}

/// The caller's side of a running scan.
#[derive(Debug)]
pub struct ScanHandle {
    id: ScanId,
    source: ScanSource,
    created_at: DateTime<Utc>,
    receiver: oneshot::Receiver<ScanOutcome>,
    cancel: CancelHandle,
    stage_rx: watch::Receiver<ScanStage>,
}

impl ScanHandle {
    pub fn id(&self) -> ScanId {
        self.id
    }

    pub fn source(&self) -> ScanSource {
        self.source
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Ask the session to stop. The outcome becomes `Cancelled` unless the
    /// session already reached a terminal stage.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle that can cancel after this one is consumed by `outcome`.
    pub fn canceller(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Latest published stage.
    pub fn stage(&self) -> ScanStage {
        *self.stage_rx.borrow()
    }

    /// Subscribe to stage changes.
    pub fn stages(&self) -> watch::Receiver<ScanStage> {
        self.stage_rx.clone()
    }

    /// Wait for the single outcome of this scan.
    pub async fn outcome(self) -> ScanOutcome {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(scan_id = %self.id, "Scan session ended without an outcome");
                ScanOutcome::Failed(ScanError::Internal(
                    "scan session ended without an outcome".into(),
                ))
            }
        }
    }
}
