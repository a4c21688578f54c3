// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fyreflow-engine: the run state machine (C5) and the runtime input broker
//! (C7) it calls synchronously from its dispatch loop.
//!
//! A [`dispatch::RunEngine`] drives exactly one [`fyreflow_core::Run`] from
//! `queued` to a terminal status, one dispatch boundary at a time, honoring
//! link conditions, loop/attempt caps, manual-approval suspension and the
//! runtime input-request protocol (spec §4.5-§4.7). It is transport- and
//! storage-agnostic: callers plug in an [`sink::EventSink`] and a
//! [`persist::RunPersist`] rather than this crate depending on
//! `fyreflow-daemon` or `fyreflow-store` directly.

pub mod broker;
pub mod context;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod persist;
pub mod sink;

pub use broker::{detect_input_request, request_signature, RuntimeInputRequest};
pub use context::{resolve_context, ContextInputs};
pub use control::{control_channel, ControlMessage, ControlReceiver, ControlSender, CONTROL_CHANNEL_CAPACITY};
pub use dispatch::{RunEngine, RUN_LOG_CAPACITY};
pub use error::EngineError;
pub use persist::{NullPersist, RunPersist};
pub use sink::{EventSink, NullSink};
