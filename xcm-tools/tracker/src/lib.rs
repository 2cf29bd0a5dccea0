// Copyright (C) Parity Technologies (UK) Ltd.
// This file is part of Polkadot.

// Polkadot is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Polkadot is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Polkadot.  If not, see <http://www.gnu.org/licenses/>.

//! Cross-chain tracking of XCM messages.
//!
//! A message is identified by the source extrinsic that sent it. The tracker collects the
//! digests that extrinsic emitted, waits for the relay chain to include the source block when
//! the route crosses it, and then looks for the destination event that processed the message.

mod error;
mod follower;
mod state;
mod tracker;

#[cfg(test)]
mod tests;

pub use error::TrackError;
pub use state::{BlockRef, ExtrinsicRef, TrackPhase, TrackingSession, TrackingState, Transition};
pub use tracker::{
	Connector, MessageTracker, TrackOutcome, TrackParams, TrackerConfig, WsConnector,
};

/// Log target of this crate.
pub const LOG_TARGET: &str = "xcm-tracker";
