// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session transition table.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::types::ScanStage;

/// Something that happened to a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanEvent {
    /// The request was accepted; `preselected` when the source was fixed.
    Started { preselected: bool },
    SourceChosen,
    ImageAcquired,
    /// Detection ran; `found` when it produced a candidate.
    DetectionFinished { found: bool },
    /// The user accepted (or edited) the corners.
    Confirmed { edited: bool },
    Rectified,
    Exported,
    Failed,
    Cancelled,
    PermissionDenied,
}

impl ScanEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::SourceChosen => "source_chosen",
            Self::ImageAcquired => "image_acquired",
            Self::DetectionFinished { .. } => "detection_finished",
            Self::Confirmed { .. } => "confirmed",
            Self::Rectified => "rectified",
            Self::Exported => "exported",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::PermissionDenied => "permission_denied",
        }
    }
}

/// Result of feeding an event to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved(ScanStage),
    /// The stage is terminal; late events are ignored.
    Discarded,
}

impl ScanStage {
    /// The stage `event` leads to.
    ///
    /// Events arriving after a terminal stage are `Discarded`. Any other
    /// pairing not in the table is an `InvalidTransition`.
    pub fn on(self, event: ScanEvent) -> Result<Transition> {
        use ScanEvent as E;
        use ScanStage as S;

        if self.is_terminal() {
            return Ok(Transition::Discarded);
        }

        let next = match (self, event) {
            (S::Idle, E::Started { preselected: false }) => S::SourceSelection,
            (S::Idle, E::Started { preselected: true }) => S::Acquiring,
            (S::Idle, E::PermissionDenied) => S::Aborted,
            (S::SourceSelection, E::SourceChosen) => S::Acquiring,
            (S::Acquiring, E::ImageAcquired) => S::Detecting,
            (S::Detecting, E::DetectionFinished { .. }) => S::AwaitingConfirmation,
            (S::AwaitingConfirmation, E::Confirmed { .. }) => S::Rectifying,
            (S::Rectifying, E::Rectified) => S::Exporting,
            (S::Exporting, E::Exported) => S::Completed,
            (_, E::Failed) => S::Failed,
            (_, E::Cancelled) => S::Cancelled,
            (from, event) => {
                return Err(ScanError::InvalidTransition {
                    from,
                    event: event.name().to_owned(),
                });
            }
        };
        Ok(Transition::Moved(next))
    }
}
