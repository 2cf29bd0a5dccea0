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

use crate::state::{ExtrinsicRef, TrackPhase, TrackingSession, TrackingState};
use thiserror::Error;
use xcm_client::{ChainError, ConnectError, Protocol};

/// Errors raised while tracking a message.
#[derive(Debug, Error)]
pub enum TrackError {
	#[error("invalid extrinsic index `{0}`, expected `<block>-<index>`")]
	InvalidExtrinsicIndex(String),
	#[error("extrinsic {0} not found")]
	ExtrinsicNotFound(ExtrinsicRef),
	#[error("extrinsic {extrinsic} emitted no {protocol} message digest")]
	DigestNotFound { extrinsic: ExtrinsicRef, protocol: Protocol },
	#[error("{0} tracking needs a relay chain endpoint")]
	RelayEndpointRequired(Protocol),
	/// `state` is the last state reached. `session` holds the progress made once the source
	/// digests were known, ending with the transition to `TimedOut`.
	#[error("tracking timed out in phase {phase} while {state}")]
	Timeout { phase: TrackPhase, state: TrackingState, session: Option<Box<TrackingSession>> },
	#[error("illegal transition from {from} to {to}")]
	IllegalTransition { from: TrackingState, to: TrackingState },
	#[error("failed to connect to {endpoint}: {source}")]
	Connect {
		endpoint: String,
		#[source]
		source: ConnectError,
	},
	#[error(transparent)]
	Chain(#[from] ChainError),
}
