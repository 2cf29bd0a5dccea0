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

//! Tracking state machine.

use crate::error::TrackError;
use std::{fmt, str::FromStr};
use xcm_client::{BlockNumber, Protocol, H256};

/// Progress of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingState {
	/// Sent by the source extrinsic, not seen anywhere else yet.
	Pending,
	/// The source block carrying the message was included by the relay chain.
	ForwardedToRelay,
	/// The destination picked the message up.
	ForwardedToDest,
	Executed,
	Failed,
	TimedOut,
}

impl TrackingState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, TrackingState::Executed | TrackingState::Failed | TrackingState::TimedOut)
	}

	/// Whether `next` may directly follow `self`.
	pub fn can_transition_to(&self, next: TrackingState) -> bool {
		use TrackingState::*;
		match (self, next) {
			(Pending, ForwardedToRelay | ForwardedToDest | Failed) => true,
			(ForwardedToRelay, ForwardedToDest) => true,
			(ForwardedToDest, Executed | Failed) => true,
			(from, TimedOut) => !from.is_terminal(),
			_ => false,
		}
	}
}

impl fmt::Display for TrackingState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

/// Leg of the route a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackPhase {
	Source,
	Relay,
	Destination,
}

impl fmt::Display for TrackPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			TrackPhase::Source => "source",
			TrackPhase::Relay => "relay",
			TrackPhase::Destination => "destination",
		})
	}
}

/// Position of an extrinsic, written `<block>-<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrinsicRef {
	pub block: BlockNumber,
	pub index: u32,
}

impl FromStr for ExtrinsicRef {
	type Err = TrackError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || TrackError::InvalidExtrinsicIndex(s.to_owned());
		let (block, index) = s.trim().split_once('-').ok_or_else(invalid)?;
		Ok(ExtrinsicRef {
			block: block.parse().map_err(|_| invalid())?,
			index: index.parse().map_err(|_| invalid())?,
		})
	}
}

impl fmt::Display for ExtrinsicRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.block, self.index)
	}
}

/// A block of one of the tracked chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
	pub number: BlockNumber,
	pub hash: H256,
}

/// A state change and where it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
	pub from: TrackingState,
	pub to: TrackingState,
	pub phase: TrackPhase,
	/// `None` when no block was involved, as for timeouts.
	pub block: Option<BlockRef>,
}

/// Everything known about one tracked message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSession {
	pub extrinsic: ExtrinsicRef,
	pub protocol: Protocol,
	/// Primary correlation digest.
	pub message_hash: H256,
	/// Every digest emitted by the source extrinsic, the primary one included.
	pub digests: Vec<H256>,
	state: TrackingState,
	history: Vec<Transition>,
}

impl TrackingSession {
	/// A pending session; `digests` must not be empty, the first one is the primary digest.
	pub fn new(
		extrinsic: ExtrinsicRef,
		protocol: Protocol,
		digests: Vec<H256>,
	) -> Result<Self, TrackError> {
		let message_hash =
			*digests.first().ok_or(TrackError::DigestNotFound { extrinsic, protocol })?;
		Ok(TrackingSession {
			extrinsic,
			protocol,
			message_hash,
			digests,
			state: TrackingState::Pending,
			history: Vec::new(),
		})
	}

	pub fn state(&self) -> TrackingState {
		self.state
	}

	pub fn history(&self) -> &[Transition] {
		&self.history
	}

	pub fn matches(&self, digest: &H256) -> bool {
		self.digests.contains(digest)
	}

	/// Move to `to`, recording where the change was observed.
	pub fn advance(
		&mut self,
		to: TrackingState,
		phase: TrackPhase,
		block: Option<BlockRef>,
	) -> Result<(), TrackError> {
		if !self.state.can_transition_to(to) {
			return Err(TrackError::IllegalTransition { from: self.state, to })
		}
		log::debug!(
			target: crate::LOG_TARGET,
			"Message {:?}: {} -> {to} in phase {phase} at {block:?}",
			self.message_hash,
			self.state,
		);
		self.history.push(Transition { from: self.state, to, phase, block });
		self.state = to;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;
	use TrackingState::*;

	fn session() -> TrackingSession {
		let extrinsic = ExtrinsicRef { block: 7, index: 2 };
		TrackingSession::new(extrinsic, Protocol::Ump, vec![H256::repeat_byte(1), H256::repeat_byte(2)])
			.unwrap()
	}

	#[test]
	fn terminal_states_accept_nothing() {
		let all = [Pending, ForwardedToRelay, ForwardedToDest, Executed, Failed, TimedOut];
		for from in [Executed, Failed, TimedOut] {
			assert!(all.iter().all(|to| !from.can_transition_to(*to)));
		}
		for from in [Pending, ForwardedToRelay, ForwardedToDest] {
			assert!(from.can_transition_to(TimedOut));
		}
	}

	#[test]
	fn states_cannot_be_skipped_backwards() {
		assert!(!ForwardedToDest.can_transition_to(ForwardedToRelay));
		assert!(!ForwardedToRelay.can_transition_to(Executed));
		assert!(!Pending.can_transition_to(Executed));
		assert!(Pending.can_transition_to(ForwardedToDest));
	}

	#[test]
	fn session_records_history() {
		let mut session = session();
		assert_eq!(session.message_hash, H256::repeat_byte(1));
		assert!(session.matches(&H256::repeat_byte(2)));

		let block = BlockRef { number: 3, hash: H256::repeat_byte(3) };
		session.advance(ForwardedToRelay, TrackPhase::Relay, Some(block)).unwrap();
		assert_matches!(
			session.advance(Executed, TrackPhase::Destination, None),
			Err(TrackError::IllegalTransition { from: ForwardedToRelay, to: Executed })
		);
		session.advance(TimedOut, TrackPhase::Destination, None).unwrap();

		assert_eq!(session.state(), TimedOut);
		assert_eq!(session.history().len(), 2);
		assert_eq!(session.history()[0].block, Some(block));
	}

	#[test]
	fn session_needs_a_digest() {
		assert_matches!(
			TrackingSession::new(ExtrinsicRef { block: 1, index: 1 }, Protocol::Hrmp, vec![]),
			Err(TrackError::DigestNotFound { protocol: Protocol::Hrmp, .. })
		);
	}

	#[test]
	fn extrinsic_refs_parse() {
		assert_eq!("100-2".parse::<ExtrinsicRef>().unwrap(), ExtrinsicRef { block: 100, index: 2 });
		assert_eq!(ExtrinsicRef { block: 100, index: 2 }.to_string(), "100-2");
		for invalid in ["100", "-2", "a-1", "1-2-3", ""] {
			assert_matches!(invalid.parse::<ExtrinsicRef>(), Err(TrackError::InvalidExtrinsicIndex(_)));
		}
	}
}
