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

//! Tracking scenarios against in-memory chains.

use crate::*;
use assert_matches::assert_matches;
use async_trait::async_trait;
use codec::Encode;
use std::{collections::HashMap, sync::Arc, time::Duration};
use xcm_client::{
	metadata::storage_prefix,
	test_utils::{
		fixtures::{self, RuntimeEvent},
		MockRpc,
	},
	ChainSession, ConnectError, ConnectionParams, Protocol, H256,
};

const SOURCE: &str = "ws://source";
const RELAY: &str = "ws://relay";
const DEST: &str = "ws://dest";

const UMP_HASH: [u8; 32] = [0x11; 32];
const HRMP_HASH: [u8; 32] = [0x12; 32];
const MESSAGE_ID: [u8; 32] = [0x22; 32];

#[derive(Default)]
struct MockConnector {
	chains: HashMap<String, Arc<MockRpc>>,
	/// Endpoints whose connection never completes.
	stalled: Vec<String>,
}

impl MockConnector {
	fn with(mut self, endpoint: &str, rpc: &Arc<MockRpc>) -> Self {
		self.chains.insert(endpoint.to_owned(), rpc.clone());
		self
	}

	fn stalled(mut self, endpoint: &str) -> Self {
		self.stalled.push(endpoint.to_owned());
		self
	}
}

#[async_trait]
impl Connector for MockConnector {
	async fn connect(&self, endpoint: &str) -> Result<ChainSession, ConnectError> {
		if self.stalled.iter().any(|stalled| stalled == endpoint) {
			futures::future::pending::<()>().await;
		}
		let rpc = self.chains.get(endpoint).ok_or_else(|| ConnectError::InvalidEndpoint {
			endpoint: endpoint.to_owned(),
			reason: "no such chain".into(),
		})?;
		ChainSession::from_rpc(endpoint, rpc.clone(), ConnectionParams::default()).await
	}
}

fn config(timeout: Duration) -> TrackerConfig {
	TrackerConfig { timeout, poll_interval: Duration::from_millis(10), lookback: 10 }
}

/// A parachain whose block 2 holds the sending extrinsic at index 1, built on relay block 3.
fn parachain_source(events: Vec<RuntimeEvent>) -> (Arc<MockRpc>, H256) {
	let rpc = Arc::new(MockRpc::default());
	rpc.push_empty_blocks(1);
	let hash = rpc.push_block(
		vec![vec![4, 0], vec![4, 1]],
		events.into_iter().map(|event| fixtures::record(1, event)).collect(),
	);
	let validation_data =
		fixtures::PersistedValidationData { relay_parent_number: 3, ..Default::default() };
	rpc.set_block_storage(
		hash,
		storage_prefix("ParachainSystem", "ValidationData"),
		validation_data.encode(),
	);
	(rpc, hash)
}

/// A relay chain including `para_head` in block 4, then emitting `events` in block 5.
fn relay_chain(para_head: Option<H256>, events: Vec<RuntimeEvent>) -> Arc<MockRpc> {
	let rpc = Arc::new(MockRpc::default());
	rpc.push_empty_blocks(3);
	let inclusion = para_head
		.map(|head| {
			let event = fixtures::ParaInclusionEvent::included(1000, head.0);
			vec![fixtures::record(0, RuntimeEvent::ParaInclusion(event))]
		})
		.unwrap_or_default();
	rpc.push_block(vec![], inclusion);
	rpc.push_block(vec![], events.into_iter().map(|event| fixtures::record(0, event)).collect());
	rpc
}

/// A parachain of `length` blocks where block `n` is built on relay block `relay_parent(n)`
/// and block `at` holds `events`.
fn parachain_dest(
	length: u32,
	relay_parent: impl Fn(u32) -> u32,
	at: u32,
	events: Vec<RuntimeEvent>,
) -> Arc<MockRpc> {
	let rpc = Arc::new(MockRpc::default());
	let mut events = Some(events);
	for number in 1..=length {
		let records = match number == at {
			true => events.take().unwrap_or_default(),
			false => vec![],
		};
		let hash =
			rpc.push_block(vec![], records.into_iter().map(|event| fixtures::record(0, event)).collect());
		let validation_data = fixtures::PersistedValidationData {
			relay_parent_number: relay_parent(number),
			..Default::default()
		};
		rpc.set_block_storage(
			hash,
			storage_prefix("ParachainSystem", "ValidationData"),
			validation_data.encode(),
		);
	}
	rpc
}

/// A relay chain whose block 2 holds a downward transfer at index 1.
fn relay_source() -> Arc<MockRpc> {
	let rpc = Arc::new(MockRpc::default());
	rpc.push_empty_blocks(1);
	rpc.push_block(
		vec![vec![4, 0], vec![4, 1]],
		vec![
			fixtures::record(1, RuntimeEvent::XcmPallet(fixtures::XcmPalletEvent::sent(MESSAGE_ID))),
			fixtures::record(1, RuntimeEvent::System(fixtures::SystemEvent::success())),
		],
	);
	rpc
}

fn executed_downward(outcome: fixtures::Outcome) -> RuntimeEvent {
	RuntimeEvent::DmpQueue(fixtures::DmpQueueEvent::ExecutedDownward {
		message_hash: [0x33; 32],
		message_id: MESSAGE_ID,
		outcome,
	})
}

fn ump_events() -> Vec<RuntimeEvent> {
	vec![
		RuntimeEvent::ParachainSystem(fixtures::ParachainSystemEvent::UpwardMessageSent {
			message_hash: Some(UMP_HASH),
		}),
		RuntimeEvent::PolkadotXcm(fixtures::XcmPalletEvent::sent(MESSAGE_ID)),
		RuntimeEvent::System(fixtures::SystemEvent::success()),
	]
}

fn hrmp_events() -> Vec<RuntimeEvent> {
	vec![
		RuntimeEvent::XcmpQueue(fixtures::XcmpQueueEvent::XcmpMessageSent { message_hash: HRMP_HASH }),
		RuntimeEvent::PolkadotXcm(fixtures::XcmPalletEvent::sent(MESSAGE_ID)),
		RuntimeEvent::System(fixtures::SystemEvent::success()),
	]
}

fn params(protocol: Protocol, dest: &str, relay: Option<&str>) -> TrackParams {
	TrackParams {
		source_endpoint: SOURCE.into(),
		extrinsic: "2-1".parse().unwrap(),
		protocol,
		dest_endpoint: dest.into(),
		relay_endpoint: relay.map(Into::into),
	}
}

fn steps(outcome: &TrackOutcome) -> Vec<(TrackingState, TrackPhase, u32)> {
	outcome
		.session
		.history()
		.iter()
		.map(|transition| {
			(transition.to, transition.phase, transition.block.map_or(0, |block| block.number))
		})
		.collect()
}

#[tokio::test]
async fn ump_message_is_executed_by_the_relay() {
	let (source, head) = parachain_source(ump_events());
	let relay = relay_chain(
		Some(head),
		vec![RuntimeEvent::MessageQueue(fixtures::MessageQueueEvent::processed(UMP_HASH, true))],
	);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay),
		config(Duration::from_secs(5)),
	);

	let outcome = tracker.track(&params(Protocol::Ump, RELAY, None)).await.unwrap();

	assert_eq!(outcome.state(), TrackingState::Executed);
	assert_eq!(outcome.failure, None);
	assert_eq!(outcome.session.message_hash, H256(UMP_HASH));
	assert_eq!(outcome.session.digests, vec![H256(UMP_HASH), H256(MESSAGE_ID)]);
	assert_eq!(
		steps(&outcome),
		vec![
			(TrackingState::ForwardedToRelay, TrackPhase::Relay, 4),
			(TrackingState::ForwardedToDest, TrackPhase::Destination, 5),
			(TrackingState::Executed, TrackPhase::Destination, 5),
		]
	);
	assert_eq!(source.close_count(), 1);
	assert_eq!(relay.close_count(), 1);
}

#[tokio::test]
async fn hrmp_message_is_executed_by_the_sibling() {
	let (source, head) = parachain_source(hrmp_events());
	let relay = relay_chain(Some(head), vec![]);
	let dest = Arc::new(MockRpc::default());
	dest.push_empty_blocks(2);
	dest.push_block(
		vec![],
		vec![fixtures::record(
			0,
			RuntimeEvent::XcmpQueue(fixtures::XcmpQueueEvent::Success {
				message_hash: HRMP_HASH,
				message_id: MESSAGE_ID,
				weight: Default::default(),
			}),
		)],
	);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay).with(DEST, &dest),
		config(Duration::from_secs(5)),
	);

	let outcome = tracker.track(&params(Protocol::Hrmp, DEST, Some(RELAY))).await.unwrap();

	assert_eq!(outcome.state(), TrackingState::Executed);
	assert_eq!(outcome.session.message_hash, H256(HRMP_HASH));
	assert_eq!(
		steps(&outcome),
		vec![
			(TrackingState::ForwardedToRelay, TrackPhase::Relay, 4),
			(TrackingState::ForwardedToDest, TrackPhase::Destination, 3),
			(TrackingState::Executed, TrackPhase::Destination, 3),
		]
	);
	assert_eq!([source.close_count(), relay.close_count(), dest.close_count()], [1, 1, 1]);
}

#[tokio::test]
async fn hrmp_destination_is_anchored_on_the_inclusion_block() {
	let (source, head) = parachain_source(hrmp_events());
	let relay = relay_chain(Some(head), vec![]);
	// Included in relay block 4, which the sibling reaches at its block #40 out of 60.
	let dest = parachain_dest(
		60,
		|number| number / 10,
		40,
		vec![RuntimeEvent::XcmpQueue(fixtures::XcmpQueueEvent::Success {
			message_hash: HRMP_HASH,
			message_id: MESSAGE_ID,
			weight: Default::default(),
		})],
	);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay).with(DEST, &dest),
		config(Duration::from_secs(5)),
	);

	let outcome = tracker.track(&params(Protocol::Hrmp, DEST, Some(RELAY))).await.unwrap();

	assert_eq!(
		steps(&outcome),
		vec![
			(TrackingState::ForwardedToRelay, TrackPhase::Relay, 4),
			(TrackingState::ForwardedToDest, TrackPhase::Destination, 40),
			(TrackingState::Executed, TrackPhase::Destination, 40),
		]
	);
}

#[tokio::test]
async fn hrmp_without_relay_endpoint_connects_nowhere() {
	let (source, _) = parachain_source(hrmp_events());
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source),
		config(Duration::from_secs(5)),
	);
	assert_matches!(
		tracker.track(&params(Protocol::Hrmp, DEST, None)).await,
		Err(TrackError::RelayEndpointRequired(Protocol::Hrmp))
	);
	assert_eq!(source.close_count(), 0);
}

#[tokio::test]
async fn dmp_failure_is_reported_with_the_outcome() {
	let source = relay_source();
	let dest = Arc::new(MockRpc::default());
	dest.push_block(
		vec![],
		vec![fixtures::record(
			0,
			executed_downward(fixtures::Outcome::Incomplete {
				used: Default::default(),
				error: fixtures::XcmError::TooExpensive,
			}),
		)],
	);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(DEST, &dest),
		config(Duration::from_secs(5)),
	);

	let outcome = tracker.track(&params(Protocol::Dmp, DEST, None)).await.unwrap();

	assert_eq!(outcome.state(), TrackingState::Failed);
	assert_eq!(outcome.failure.as_deref(), Some("Incomplete(TooExpensive)"));
	assert_eq!(
		steps(&outcome),
		vec![
			(TrackingState::ForwardedToDest, TrackPhase::Destination, 1),
			(TrackingState::Failed, TrackPhase::Destination, 1),
		]
	);
	assert_eq!([source.close_count(), dest.close_count()], [1, 1]);
}

#[tokio::test]
async fn dmp_executed_long_before_tracking_is_found() {
	let source = relay_source();
	// Sent in relay block 2, so parachain blocks from #6 on can receive it.
	let dest = parachain_dest(
		40,
		|number| number / 3,
		7,
		vec![executed_downward(fixtures::Outcome::Complete { used: Default::default() })],
	);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(DEST, &dest),
		config(Duration::from_secs(5)),
	);

	let outcome = tracker.track(&params(Protocol::Dmp, DEST, None)).await.unwrap();

	assert_eq!(outcome.state(), TrackingState::Executed);
	assert_eq!(
		steps(&outcome),
		vec![
			(TrackingState::ForwardedToDest, TrackPhase::Destination, 7),
			(TrackingState::Executed, TrackPhase::Destination, 7),
		]
	);
}

#[tokio::test]
async fn dmp_scan_waits_for_blocks_built_on_the_sending_block() {
	let source = relay_source();
	// Every block so far is built on relay block 1, the message was sent in block 2.
	let dest = parachain_dest(30, |_| 1, 0, vec![]);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(DEST, &dest),
		config(Duration::from_secs(5)),
	);

	let producer = {
		let dest = dest.clone();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(50)).await;
			let event = executed_downward(fixtures::Outcome::Complete { used: Default::default() });
			dest.push_block(vec![], vec![fixtures::record(0, event)])
		})
	};
	let outcome = tracker.track(&params(Protocol::Dmp, DEST, None)).await.unwrap();

	assert_eq!(outcome.state(), TrackingState::Executed);
	let executed = outcome.session.history()[1].block.unwrap();
	assert_eq!(executed, BlockRef { number: 31, hash: producer.await.unwrap() });
}

#[tokio::test]
async fn failed_source_extrinsic_ends_tracking() {
	let (source, _) = parachain_source(vec![RuntimeEvent::System(
		fixtures::SystemEvent::module_error(fixtures::XCM_PALLET_INDEX, 2),
	)]);
	let relay = Arc::new(MockRpc::default());
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay),
		config(Duration::from_secs(5)),
	);

	let outcome = tracker.track(&params(Protocol::Ump, RELAY, None)).await.unwrap();

	assert_eq!(outcome.state(), TrackingState::Failed);
	assert_eq!(outcome.failure.as_deref(), Some("PolkadotXcm::Filtered"));
	assert_eq!(steps(&outcome), vec![(TrackingState::Failed, TrackPhase::Source, 2)]);
	assert_eq!([source.close_count(), relay.close_count()], [1, 0]);
}

#[tokio::test]
async fn unknown_extrinsics_are_reported() {
	for extrinsic in ["2-5", "9-0"] {
		let (source, _) = parachain_source(ump_events());
		let tracker = MessageTracker::with_connector(
			MockConnector::default().with(SOURCE, &source),
			config(Duration::from_secs(5)),
		);
		let params =
			TrackParams { extrinsic: extrinsic.parse().unwrap(), ..params(Protocol::Ump, RELAY, None) };
		assert_matches!(tracker.track(&params).await, Err(TrackError::ExtrinsicNotFound(_)));
		assert_eq!(source.close_count(), 1);
	}
}

#[tokio::test]
async fn extrinsic_without_digest_is_reported() {
	let (source, _) = parachain_source(vec![RuntimeEvent::System(fixtures::SystemEvent::success())]);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source),
		config(Duration::from_secs(5)),
	);
	assert_matches!(
		tracker.track(&params(Protocol::Hrmp, DEST, Some(RELAY))).await,
		Err(TrackError::DigestNotFound { protocol: Protocol::Hrmp, .. })
	);
	assert_eq!(source.close_count(), 1);
}

#[tokio::test]
async fn unprocessed_message_times_out_at_the_destination() {
	let (source, head) = parachain_source(ump_events());
	let relay = relay_chain(Some(head), vec![]);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay),
		config(Duration::from_millis(300)),
	);

	let err = tracker.track(&params(Protocol::Ump, RELAY, None)).await.unwrap_err();

	let TrackError::Timeout { phase, state, session: Some(session) } = err else {
		panic!("expected a timeout with progress, got {err:?}")
	};
	assert_eq!((phase, state), (TrackPhase::Destination, TrackingState::ForwardedToRelay));
	assert_eq!(session.state(), TrackingState::TimedOut);
	let last = session.history().last().unwrap();
	assert_eq!(
		(last.from, last.to, last.phase, last.block),
		(TrackingState::ForwardedToRelay, TrackingState::TimedOut, TrackPhase::Destination, None)
	);
	assert_eq!(session.history().len(), 2);
	assert_eq!([source.close_count(), relay.close_count()], [1, 1]);
}

#[tokio::test]
async fn missing_inclusion_times_out_at_the_relay() {
	let (source, _) = parachain_source(hrmp_events());
	let relay = relay_chain(None, vec![]);
	let dest = Arc::new(MockRpc::default());
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay).with(DEST, &dest),
		config(Duration::from_millis(300)),
	);

	assert_matches!(
		tracker.track(&params(Protocol::Hrmp, DEST, Some(RELAY))).await,
		Err(TrackError::Timeout {
			phase: TrackPhase::Relay,
			state: TrackingState::Pending,
			session: Some(session),
		}) if session.state() == TrackingState::TimedOut && session.history().len() == 1
	);
	assert_eq!([source.close_count(), relay.close_count(), dest.close_count()], [1, 1, 1]);
}

#[tokio::test]
async fn source_timeout_has_no_progress_to_report() {
	let tracker = MessageTracker::with_connector(
		MockConnector::default().stalled(SOURCE),
		config(Duration::from_millis(100)),
	);
	assert_matches!(
		tracker.track(&params(Protocol::Ump, RELAY, None)).await,
		Err(TrackError::Timeout { phase: TrackPhase::Source, session: None, .. })
	);
}

#[tokio::test]
async fn sessions_opened_before_a_stalled_connect_are_closed() {
	let (source, _) = parachain_source(hrmp_events());
	let relay = relay_chain(None, vec![]);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay).stalled(DEST),
		config(Duration::from_millis(200)),
	);

	assert_matches!(
		tracker.track(&params(Protocol::Hrmp, DEST, Some(RELAY))).await,
		Err(TrackError::Timeout { phase: TrackPhase::Relay, state: TrackingState::Pending, .. })
	);
	assert_eq!([source.close_count(), relay.close_count()], [1, 1]);
}

#[tokio::test]
async fn sessions_opened_before_a_connect_failure_are_closed() {
	let (source, _) = parachain_source(hrmp_events());
	let relay = relay_chain(None, vec![]);
	let tracker = MessageTracker::with_connector(
		MockConnector::default().with(SOURCE, &source).with(RELAY, &relay),
		config(Duration::from_secs(5)),
	);

	assert_matches!(
		tracker.track(&params(Protocol::Hrmp, "ws://nowhere", Some(RELAY))).await,
		Err(TrackError::Connect { endpoint, .. }) if endpoint == "ws://nowhere"
	);
	assert_eq!([source.close_count(), relay.close_count()], [1, 1]);
}
