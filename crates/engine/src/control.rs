// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Control messages a run actor accepts at its dispatch boundaries (spec
//! §4.5/§4.9): stop, pause/resume, approval decisions and submitted runtime
//! inputs. Applied between steps, never mid-provider-call, except `Stop`
//! which also flips the run's [`fyreflow_core::Run::cancel_signal`]
//! immediately so an in-flight provider call can observe it.

use std::collections::HashMap;

use fyreflow_core::ApprovalId;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum ControlMessage {
    Stop,
    Pause,
    Resume,
    ResolveApproval {
        approval_id: ApprovalId,
        approved: bool,
        note: Option<String>,
    },
    SubmitInputs {
        values: HashMap<String, String>,
    },
}

/// Bounded: a run only ever has one control message in flight at a time in
/// practice (the HTTP layer serializes a pipeline's own control actions),
/// so a small capacity is enough headroom without risking unbounded growth.
pub const CONTROL_CHANNEL_CAPACITY: usize = 16;

pub type ControlSender = mpsc::Sender<ControlMessage>;
pub type ControlReceiver = mpsc::Receiver<ControlMessage>;

pub fn control_channel() -> (ControlSender, ControlReceiver) {
    mpsc::channel(CONTROL_CHANNEL_CAPACITY)
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
