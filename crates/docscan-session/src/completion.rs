// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-shot completion slot.

use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Delivers at most one value to the waiting caller.
///
/// The first `fill` takes the sender out of the slot; every later `fill` is
/// refused and logged. The slot is `Sync`, so clones of an `Arc` around it
/// may race to fill it and only one wins.
#[derive(Debug)]
pub struct CompletionSlot<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> CompletionSlot<T> {
    /// A fresh slot and the receiver its value will arrive on.
    pub fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Deliver `value`. Returns `false` (and drops `value`) when the slot
    /// was already filled.
    ///
    /// A receiver that has gone away still counts as filled: the caller
    /// stopped listening, but no second value may follow.
    pub fn fill(&self, value: T) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match sender {
            Some(tx) => {
                if tx.send(value).is_err() {
                    debug!("Completion receiver dropped before the result arrived");
                }
                true
            }
            None => {
                warn!("Completion slot already filled; discarding late result");
                false
            }
        }
    }

    pub fn is_filled(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }
}
