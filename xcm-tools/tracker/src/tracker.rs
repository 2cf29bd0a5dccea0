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

//! Correlates one message across the source, relay and destination chains.

use crate::{
	error::TrackError,
	follower::BlockFollower,
	state::{BlockRef, ExtrinsicRef, TrackPhase, TrackingSession, TrackingState},
	LOG_TARGET,
};
use async_trait::async_trait;
use futures::future::{join, OptionFuture};
use std::{sync::Arc, time::Duration};
use tokio::time::{error::Elapsed, timeout_at, Instant};
use xcm_client::{
	events::describe_dispatch_error, metadata::XCM_PALLETS, BlockNumber, ChainError,
	ChainSession, ConnectError, ConnectionParams, EventRecord, Protocol, Value, H256,
};

/// Opens chain sessions.
#[async_trait]
pub trait Connector: Send + Sync {
	async fn connect(&self, endpoint: &str) -> Result<ChainSession, ConnectError>;
}

/// Connects over websockets.
#[derive(Debug, Clone, Default)]
pub struct WsConnector {
	pub params: ConnectionParams,
}

#[async_trait]
impl Connector for WsConnector {
	async fn connect(&self, endpoint: &str) -> Result<ChainSession, ConnectError> {
		ChainSession::connect(endpoint, self.params.clone()).await
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
	/// Deadline shared by all phases of one invocation.
	pub timeout: Duration,
	/// How long to wait on a silent heads subscription before polling the finalized head.
	pub poll_interval: Duration,
	/// Blocks to look back when no better starting point is known.
	pub lookback: BlockNumber,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		TrackerConfig {
			timeout: Duration::from_secs(600),
			poll_interval: Duration::from_secs(6),
			lookback: 10,
		}
	}
}

/// What to track and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackParams {
	pub source_endpoint: String,
	pub extrinsic: ExtrinsicRef,
	pub protocol: Protocol,
	pub dest_endpoint: String,
	/// Required for HRMP. UMP falls back to the destination, which is the relay chain.
	pub relay_endpoint: Option<String>,
}

impl TrackParams {
	fn relay_endpoint(&self) -> Result<Option<&str>, TrackError> {
		match self.protocol {
			Protocol::Ump => Ok(Some(self.relay_endpoint.as_deref().unwrap_or(&self.dest_endpoint))),
			Protocol::Hrmp => self
				.relay_endpoint
				.as_deref()
				.map(Some)
				.ok_or(TrackError::RelayEndpointRequired(Protocol::Hrmp)),
			Protocol::Dmp => Ok(None),
		}
	}
}

/// Final report of a tracked message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
	pub session: TrackingSession,
	/// Why the message failed, when it did.
	pub failure: Option<String>,
}

impl TrackOutcome {
	pub fn state(&self) -> TrackingState {
		self.session.state()
	}
}

/// Follows messages sent by source extrinsics until they are executed or fail.
pub struct MessageTracker<C = WsConnector> {
	connector: C,
	config: TrackerConfig,
}

impl MessageTracker<WsConnector> {
	pub fn new(params: ConnectionParams, config: TrackerConfig) -> Self {
		MessageTracker { connector: WsConnector { params }, config }
	}
}

impl<C: Connector> MessageTracker<C> {
	pub fn with_connector(connector: C, config: TrackerConfig) -> Self {
		MessageTracker { connector, config }
	}

	pub fn config(&self) -> &TrackerConfig {
		&self.config
	}

	/// Track the message sent by `params.extrinsic` to its final outcome.
	///
	/// Every session opened on the way is closed before returning.
	pub async fn track(&self, params: &TrackParams) -> Result<TrackOutcome, TrackError> {
		let relay_endpoint = params.relay_endpoint()?;
		let mut run = Run {
			connector: &self.connector,
			config: &self.config,
			deadline: Instant::now() + self.config.timeout,
			sessions: Vec::new(),
			state: TrackingState::Pending,
		};
		let result = run.execute(params, relay_endpoint).await;
		for session in &run.sessions {
			session.close().await;
		}
		result
	}
}

/// Digests and position of the source extrinsic.
struct SourceReport {
	block: BlockRef,
	digests: Vec<H256>,
	failure: Option<String>,
	relay_parent: Option<BlockNumber>,
}

/// Where the destination scan begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DestinationStart {
	/// The destination is the relay chain, which received the message in this block.
	Block(BlockNumber),
	/// The message is available to destination blocks built on this relay block or later.
	RelayParent(BlockNumber),
}

/// One `track` invocation.
struct Run<'a, C> {
	connector: &'a C,
	config: &'a TrackerConfig,
	deadline: Instant,
	sessions: Vec<Arc<ChainSession>>,
	/// Last state reached, reported on timeout.
	state: TrackingState,
}

impl<C: Connector> Run<'_, C> {
	async fn execute(
		&mut self,
		params: &TrackParams,
		relay_endpoint: Option<&str>,
	) -> Result<TrackOutcome, TrackError> {
		let source = self.connect(&params.source_endpoint, TrackPhase::Source).await?;
		let mut report = self
			.within(TrackPhase::Source, inspect_source(&source, params.extrinsic, params.protocol))
			.await??;
		let mut session =
			TrackingSession::new(params.extrinsic, params.protocol, std::mem::take(&mut report.digests))?;
		log::info!(
			target: LOG_TARGET,
			"Extrinsic {} sent {} message {:?}",
			params.extrinsic,
			params.protocol,
			session.message_hash,
		);

		if let Some(reason) = report.failure.take() {
			session.advance(TrackingState::Failed, TrackPhase::Source, Some(report.block))?;
			return Ok(TrackOutcome { session, failure: Some(reason) })
		}

		match self.forward(params, relay_endpoint, &report, &mut session).await {
			Ok(failure) => Ok(TrackOutcome { session, failure }),
			Err(TrackError::Timeout { phase, state, .. }) => {
				session.advance(TrackingState::TimedOut, phase, None)?;
				Err(TrackError::Timeout { phase, state, session: Some(Box::new(session)) })
			},
			Err(err) => Err(err),
		}
	}

	/// Follow the message through the relay chain to its execution at the destination.
	async fn forward(
		&mut self,
		params: &TrackParams,
		relay_endpoint: Option<&str>,
		report: &SourceReport,
		session: &mut TrackingSession,
	) -> Result<Option<String>, TrackError> {
		let (relay, dest) = self.connect_onward(relay_endpoint, &params.dest_endpoint).await?;

		// Downward messages are sent by the relay chain itself.
		let mut start = DestinationStart::RelayParent(report.block.number);
		if let Some(relay) = relay.as_ref() {
			let inclusion = find_inclusion(relay, self.config, report.block.hash, report.relay_parent);
			let (included, _) = self.within(TrackPhase::Relay, inclusion).await??;
			session.advance(TrackingState::ForwardedToRelay, TrackPhase::Relay, Some(included))?;
			self.state = session.state();
			start = match params.protocol {
				Protocol::Ump => DestinationStart::Block(included.number),
				_ => DestinationStart::RelayParent(included.number),
			};
		}

		let execution = find_execution(&dest, self.config, session.clone(), start);
		let (block, failure) = self.within(TrackPhase::Destination, execution).await??;
		session.advance(TrackingState::ForwardedToDest, TrackPhase::Destination, Some(block))?;
		let outcome = if failure.is_some() { TrackingState::Failed } else { TrackingState::Executed };
		session.advance(outcome, TrackPhase::Destination, Some(block))?;
		log::info!(
			target: LOG_TARGET,
			"Message {:?} {outcome} in block #{} of {}",
			session.message_hash,
			block.number,
			dest.endpoint(),
		);
		Ok(failure)
	}

	fn timeout(&self, phase: TrackPhase) -> TrackError {
		log::warn!(target: LOG_TARGET, "Deadline reached in phase {phase} while {}", self.state);
		TrackError::Timeout { phase, state: self.state, session: None }
	}

	/// Run `future` before the shared deadline.
	async fn within<T>(
		&self,
		phase: TrackPhase,
		future: impl std::future::Future<Output = T>,
	) -> Result<T, TrackError> {
		timeout_at(self.deadline, future).await.map_err(|_| self.timeout(phase))
	}

	async fn connect(
		&mut self,
		endpoint: &str,
		phase: TrackPhase,
	) -> Result<Arc<ChainSession>, TrackError> {
		let session = self
			.within(phase, self.connector.connect(endpoint))
			.await?
			.map_err(|source| TrackError::Connect { endpoint: endpoint.to_owned(), source })?;
		let session = Arc::new(session);
		self.sessions.push(session.clone());
		Ok(session)
	}

	/// Open relay and destination sessions concurrently, sharing one if the endpoints match.
	///
	/// Each connection is bounded by the deadline on its own, so a session that opened is kept
	/// for closing even when the other one runs out of time.
	async fn connect_onward(
		&mut self,
		relay_endpoint: Option<&str>,
		dest_endpoint: &str,
	) -> Result<(Option<Arc<ChainSession>>, Arc<ChainSession>), TrackError> {
		let shared = relay_endpoint == Some(dest_endpoint);
		let bounded = |endpoint| timeout_at(self.deadline, self.connector.connect(endpoint));
		let relay_connect: OptionFuture<_> =
			relay_endpoint.filter(|_| !shared).map(|endpoint| bounded(endpoint)).into();
		let (relay, dest) = join(relay_connect, bounded(dest_endpoint)).await;

		let opened = |endpoint: &str, result: Result<Result<ChainSession, ConnectError>, Elapsed>| {
			match result {
				Ok(Ok(session)) => Ok(Arc::new(session)),
				Ok(Err(source)) => Err(TrackError::Connect { endpoint: endpoint.to_owned(), source }),
				Err(_) => Err(self.timeout(TrackPhase::Relay)),
			}
		};
		let relay = relay.map(|result| opened(relay_endpoint.unwrap_or_default(), result));
		let dest = opened(dest_endpoint, dest);
		// Keep whatever opened so it is closed even if the other side failed.
		for session in relay.iter().flatten().chain(dest.iter()) {
			self.sessions.push(session.clone());
		}
		let dest = dest?;
		let relay = match relay.transpose()? {
			Some(relay) => Some(relay),
			None if shared => Some(dest.clone()),
			None => None,
		};
		Ok((relay, dest))
	}
}

/// Read the source extrinsic and the digests it emitted.
async fn inspect_source(
	source: &ChainSession,
	extrinsic: ExtrinsicRef,
	protocol: Protocol,
) -> Result<SourceReport, TrackError> {
	let hash = source
		.block_hash(extrinsic.block)
		.await?
		.ok_or(TrackError::ExtrinsicNotFound(extrinsic))?;
	let extrinsics =
		source.block_extrinsics(hash).await?.ok_or(TrackError::ExtrinsicNotFound(extrinsic))?;
	if extrinsic.index as usize >= extrinsics.len() {
		return Err(TrackError::ExtrinsicNotFound(extrinsic))
	}

	let events: Vec<EventRecord> = source
		.events_at(hash)
		.await?
		.into_iter()
		.filter(|event| event.emitted_by(extrinsic.index))
		.collect();
	let failure = events
		.iter()
		.find(|event| event.is("System", "ExtrinsicFailed"))
		.map(|event| describe_dispatch_error(source.registry(), event.field("dispatch_error")));
	let digests = collect_digests(&events, protocol);
	if digests.is_empty() && failure.is_none() {
		return Err(TrackError::DigestNotFound { extrinsic, protocol })
	}

	let relay_parent =
		if protocol.via_relay() { relay_parent_number(source, hash).await } else { None };
	Ok(SourceReport {
		block: BlockRef { number: extrinsic.block, hash },
		// A failed extrinsic has nothing to correlate, the block hash stands in.
		digests: if digests.is_empty() { vec![hash] } else { digests },
		failure,
		relay_parent,
	})
}

/// Digests emitted for `protocol`, protocol specific ones first.
pub(crate) fn collect_digests(events: &[EventRecord], protocol: Protocol) -> Vec<H256> {
	let mut digests = Vec::new();
	let mut push = |digest: Option<H256>| {
		if let Some(digest) = digest.filter(|digest| !digests.contains(digest)) {
			digests.push(digest);
		}
	};
	for event in events {
		match protocol {
			Protocol::Ump if event.is("ParachainSystem", "UpwardMessageSent") =>
				push(event.field("message_hash").and_then(Value::as_some).and_then(Value::as_hash)),
			Protocol::Hrmp if event.is("XcmpQueue", "XcmpMessageSent") =>
				push(event.field("message_hash").and_then(Value::as_hash)),
			_ => {},
		}
	}
	for event in events {
		if XCM_PALLETS.iter().any(|pallet| event.is(pallet, "Sent")) {
			push(event.field("message_id").and_then(Value::as_hash));
		}
	}
	digests
}

/// Relay block the source block was built on, if the source is a parachain.
async fn relay_parent_number(source: &ChainSession, at: H256) -> Option<BlockNumber> {
	match source.storage_value("ParachainSystem", "ValidationData", &[], Some(at)).await {
		Ok(data) => data
			.as_ref()
			.and_then(|data| data.field("relay_parent_number"))
			.and_then(Value::as_u128)
			.and_then(|number| BlockNumber::try_from(number).ok()),
		Err(err) => {
			log::debug!(target: LOG_TARGET, "No validation data at {at:?}: {err}");
			None
		},
	}
}

/// Find the relay block including the source block as a parachain candidate.
async fn find_inclusion(
	relay: &ChainSession,
	config: &TrackerConfig,
	para_head: H256,
	relay_parent: Option<BlockNumber>,
) -> Result<(BlockRef, ()), ChainError> {
	let from = match relay_parent {
		Some(number) => number,
		None => relay.finalized_number().await?.saturating_sub(config.lookback),
	};
	log::debug!(target: LOG_TARGET, "Looking for candidate {para_head:?} from relay block #{from}");
	let mut follower = BlockFollower::new(relay, from, config.poll_interval).await?;
	follower
		.find(|events| {
			events
				.iter()
				.filter(|event| event.is("ParaInclusion", "CandidateIncluded"))
				.filter_map(|event| event.fields.at(0))
				.filter_map(|receipt| receipt.field("descriptor")?.field("para_head")?.as_hash())
				.any(|head| head == para_head)
				.then_some(())
		})
		.await
}

/// Find the destination block that processed the message, and the failure reason if any.
async fn find_execution(
	dest: &ChainSession,
	config: &TrackerConfig,
	session: TrackingSession,
	start: DestinationStart,
) -> Result<(BlockRef, Option<String>), ChainError> {
	let from = match start {
		DestinationStart::Block(number) => Some(number),
		DestinationStart::RelayParent(relay_block) => first_block_on_relay(dest, relay_block).await?,
	};
	let from = match from {
		Some(number) => number,
		None => dest.finalized_number().await?.saturating_sub(config.lookback),
	};
	log::debug!(
		target: LOG_TARGET,
		"Looking for execution of {:?} from block #{from} of {}",
		session.message_hash,
		dest.endpoint(),
	);
	let mut follower = BlockFollower::new(dest, from, config.poll_interval).await?;
	follower.find(|events| events.iter().find_map(|event| execution_result(event, &session))).await
}

/// First finalized or upcoming block of a parachain built on `relay_block` or a later one.
///
/// `None` if the chain does not expose `ParachainSystem.ValidationData`.
async fn first_block_on_relay(
	dest: &ChainSession,
	relay_block: BlockNumber,
) -> Result<Option<BlockNumber>, ChainError> {
	let finalized = dest.finalized_number().await?;
	match relay_parent_at(dest, finalized).await? {
		None => return Ok(None),
		Some(number) if number < relay_block => return Ok(Some(finalized + 1)),
		Some(_) => {},
	}
	// Relay parents never decrease along a parachain, genesis has none.
	let (mut low, mut high) = (finalized.min(1), finalized);
	while low < high {
		let middle = low + (high - low) / 2;
		match relay_parent_at(dest, middle).await? {
			Some(number) if number >= relay_block => high = middle,
			Some(_) => low = middle + 1,
			None => return Ok(None),
		}
	}
	log::debug!(
		target: LOG_TARGET,
		"Block #{high} of {} is the first one built on relay block #{relay_block} or later",
		dest.endpoint(),
	);
	Ok(Some(high))
}

async fn relay_parent_at(
	session: &ChainSession,
	number: BlockNumber,
) -> Result<Option<BlockNumber>, ChainError> {
	Ok(match session.block_hash(number).await? {
		Some(hash) => relay_parent_number(session, hash).await,
		None => None,
	})
}

/// `Some(None)` if `event` reports the message executed, `Some(Some(reason))` if it failed.
pub(crate) fn execution_result(
	event: &EventRecord,
	session: &TrackingSession,
) -> Option<Option<String>> {
	let matches = |name: &str| {
		event.field(name).and_then(Value::as_hash).is_some_and(|hash| session.matches(&hash))
	};
	let outcome = |value: Option<&Value>| match value.and_then(Value::as_variant) {
		Some(variant) if variant.name == "Complete" => None,
		Some(variant) => Some(match variant.fields.field("error") {
			Some(error) => format!("{}({})", variant.name, variant_name(Some(error))),
			None => variant.name.clone(),
		}),
		None => Some("unknown outcome".into()),
	};
	match (event.pallet.as_str(), event.variant.as_str()) {
		("MessageQueue", "Processed") if matches("id") =>
			Some(match event.field("success").and_then(Value::as_bool) {
				Some(true) => None,
				_ => Some("MessageQueue::Processed unsuccessfully".into()),
			}),
		("MessageQueue", "ProcessingFailed") if matches("id") => Some(Some(format!(
			"MessageQueue::ProcessingFailed({})",
			variant_name(event.field("error"))
		))),
		("XcmpQueue", "Success") if matches("message_hash") || matches("message_id") => Some(None),
		("XcmpQueue", "Fail") if matches("message_hash") || matches("message_id") =>
			Some(Some(format!("XcmpQueue::Fail({})", variant_name(event.field("error"))))),
		("DmpQueue", "ExecutedDownward") if matches("message_hash") || matches("message_id") =>
			Some(outcome(event.field("outcome"))),
		("Ump", "ExecutedUpward")
			if event.fields.at(0).and_then(Value::as_hash).is_some_and(|id| session.matches(&id)) =>
			Some(outcome(event.fields.at(1))),
		_ => None,
	}
}

fn variant_name(value: Option<&Value>) -> &str {
	value.and_then(Value::as_variant).map_or("?", |variant| variant.name.as_str())
}
