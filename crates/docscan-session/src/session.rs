// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The scan session task.
//
// A session owns one request. It moves through the stage machine by feeding
// events to `ScanStage::on`, awaits each collaborator under the cancel
// token, and fills its completion slot exactly once when it stops.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use docscan_bridge::{Acquisition, Confirmation, ScanBridge};
use docscan_core::config::ScanConfig;
use docscan_core::error::{Result, ScanError};
use docscan_core::types::{ScanId, ScanSource, ScanStage};
use docscan_core::{ScanEvent, Transition};
use docscan_document::{PerspectiveRectifier, QuadDetector, Quadrilateral};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::completion::CompletionSlot;
use crate::export::{ExportAdapter, discard};
use crate::outcome::{ScanOutcome, ScanResult};

/// Why a session stopped short of completion.
#[derive(Debug)]
enum Halt {
    Cancelled,
    Denied,
    Failed(ScanError),
}

impl From<ScanError> for Halt {
    fn from(err: ScanError) -> Self {
        Self::Failed(err)
    }
}

type Step<T> = std::result::Result<T, Halt>;

pub(crate) struct ScanSession<B> {
    id: ScanId,
    source: ScanSource,
    created_at: DateTime<Utc>,
    stage: ScanStage,
    bridge: Arc<B>,
    detector: Arc<dyn QuadDetector>,
    rectifier: PerspectiveRectifier,
    exporter: ExportAdapter,
    config: Arc<ScanConfig>,
    slot: Arc<CompletionSlot<ScanOutcome>>,
    cancel: CancelToken,
    stage_tx: watch::Sender<ScanStage>,
}

/// Everything a session needs besides the bridge and detector.
pub(crate) struct SessionParts {
    pub id: ScanId,
    pub source: ScanSource,
    pub created_at: DateTime<Utc>,
    pub config: Arc<ScanConfig>,
    pub slot: Arc<CompletionSlot<ScanOutcome>>,
    pub cancel: CancelToken,
    pub stage_tx: watch::Sender<ScanStage>,
}

impl<B: ScanBridge> ScanSession<B> {
    pub(crate) fn new(bridge: Arc<B>, detector: Arc<dyn QuadDetector>, parts: SessionParts) -> Self {
        let rectifier = PerspectiveRectifier::new(parts.config.rectify.clone());
        let exporter = ExportAdapter::new(parts.config.export.clone());
        Self {
            id: parts.id,
            source: parts.source,
            created_at: parts.created_at,
            stage: ScanStage::Idle,
            bridge,
            detector,
            rectifier,
            exporter,
            config: parts.config,
            slot: parts.slot,
            cancel: parts.cancel,
            stage_tx: parts.stage_tx,
        }
    }

    /// Drive the session to a terminal stage and deliver its outcome.
    #[instrument(skip_all, fields(scan_id = %self.id, source = %self.source, platform = self.bridge.platform_name()))]
    pub(crate) async fn run(mut self) {
        let outcome = match self.drive().await {
            Ok(result) => ScanOutcome::Completed(result),
            Err(halt) => {
                let (event, outcome) = match halt {
                    Halt::Cancelled => (ScanEvent::Cancelled, ScanOutcome::Cancelled),
                    Halt::Denied => (ScanEvent::PermissionDenied, ScanOutcome::PermissionDenied),
                    Halt::Failed(err) => {
                        warn!(code = err.code(), error = %err, stage = ?self.stage, "Scan failed");
                        (ScanEvent::Failed, ScanOutcome::Failed(err))
                    }
                };
                if let Err(err) = self.advance(event) {
                    warn!(error = %err, "Could not record terminal stage");
                }
                outcome
            }
        };

        let elapsed_ms = (Utc::now() - self.created_at).num_milliseconds();
        info!(stage = ?self.stage, code = ?outcome.code(), elapsed_ms, "Scan finished");
        self.slot.fill(outcome);
    }

    async fn drive(&mut self) -> Step<ScanResult> {
        if self.config.permissions.check_before_scan {
            let capabilities = self.source.required_capabilities();
            let granted = self
                .guarded(self.bridge.ensure_granted(capabilities))
                .await?
                .map_err(|err| ScanError::PermissionDenied(err.to_string()))?;
            if !granted {
                info!(?capabilities, "Permissions not granted");
                return Err(Halt::Denied);
            }
        }

        let preselected = self.source.preselected();
        self.advance(ScanEvent::Started {
            preselected: preselected.is_some(),
        })?;

        let source = match preselected {
            Some(source) => source,
            None => {
                let Some(chosen) = self.guarded(self.bridge.choose_source()).await?? else {
                    info!("Source selection dismissed");
                    return Err(Halt::Cancelled);
                };
                self.advance(ScanEvent::SourceChosen)?;
                chosen
            }
        };
        debug!(?source, "Acquiring image");

        let image = match self.guarded(self.bridge.acquire(source)).await?? {
            Acquisition::Image(image) => image,
            Acquisition::Cancelled => {
                info!(?source, "Acquisition dismissed");
                return Err(Halt::Cancelled);
            }
        };
        image.validate()?;
        self.advance(ScanEvent::ImageAcquired)?;

        let detector = Arc::clone(&self.detector);
        let (image, detected) = self
            .blocking(move || {
                let detected = detector.detect(&image);
                (image, detected)
            })
            .await?;
        let candidate = detected?;
        let auto_detected = candidate.is_some();
        let detection_score = candidate.as_ref().map(|c| c.score);
        let proposed = match candidate {
            Some(candidate) => candidate.quad,
            None => Quadrilateral::full_frame(image.width(), image.height()),
        };
        self.advance(ScanEvent::DetectionFinished {
            found: auto_detected,
        })?;

        let confirmation = self.guarded(self.bridge.confirm(&image, &proposed)).await??;
        let (quad, edited) = match confirmation {
            Confirmation::Accepted(quad) => (quad, false),
            Confirmation::Edited(quad) => (quad, true),
            Confirmation::Cancelled => {
                info!("Corner confirmation dismissed");
                return Err(Halt::Cancelled);
            }
        };
        let quad = quad.to_pixel(image.height() as f64);
        self.advance(ScanEvent::Confirmed { edited })?;

        let rectifier = self.rectifier.clone();
        let page = self
            .blocking(move || rectifier.rectify(image, &quad))
            .await??;
        self.advance(ScanEvent::Rectified)?;

        // Storage writes cannot be abandoned halfway, so export runs to the
        // end and a cancel that arrived meanwhile removes the page.
        let stored = self.exporter.export(page, self.bridge.as_ref()).await?;
        if self.cancel.is_cancelled() {
            info!(path = %stored.path.display(), "Cancelled during export, removing page");
            discard(&stored.path).await;
            return Err(Halt::Cancelled);
        }
        self.advance(ScanEvent::Exported)?;

        Ok(ScanResult {
            id: self.id,
            path: stored.path,
            width: stored.width,
            height: stored.height,
            format: stored.format,
            sha256: stored.sha256,
            auto_detected,
            detection_score,
            quad,
        })
    }

    /// Feed `event` to the stage machine and publish the new stage.
    fn advance(&mut self, event: ScanEvent) -> Result<()> {
        let from = self.stage;
        match from.on(event)? {
            Transition::Moved(to) => {
                info!(from = ?from, to = ?to, event = event.name(), "Scan stage changed");
                self.stage = to;
                self.stage_tx.send_replace(to);
            }
            Transition::Discarded => {
                warn!(stage = ?from, event = event.name(), "Event after terminal stage discarded");
            }
        }
        Ok(())
    }

    /// Await `fut` unless the request is cancelled first.
    async fn guarded<F: Future>(&self, fut: F) -> Step<F::Output> {
        self.cancel
            .run_until_cancelled(fut)
            .await
            .ok_or(Halt::Cancelled)
    }

    /// Run CPU-bound work on the blocking pool, still racing cancellation.
    async fn blocking<T, F>(&self, work: F) -> Step<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.guarded(tokio::task::spawn_blocking(work))
            .await?
            .map_err(|err| Halt::Failed(ScanError::Internal(format!("worker failed: {err}"))))
    }
}
