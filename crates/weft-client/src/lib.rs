// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Session controller and WebSocket transport for the Weft
//! screenshot-to-code client.
//!
//! One [`SessionController`] owns exactly one transformation session at a
//! time: it encodes the input image, opens the duplex connection, sends
//! the request once, folds the inbound event stream into a
//! [`SessionState`], and exposes `reset` as the only recovery path.
//! Observers subscribe to state snapshots through a watch channel; they
//! never mutate session state directly.

pub mod config;
pub mod controller;
pub mod state;
pub mod transport;

pub use config::*;
pub use controller::*;
pub use state::*;
pub use transport::*;
