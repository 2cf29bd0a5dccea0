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

//! A live connection to one chain.

use crate::{
	error::{ChainError, ConnectError, RpcError, SubmitError},
	events::{decode_events, describe_dispatch_error, EventRecord},
	extrinsic::{ExtrinsicBuilder, SigningParams},
	keyring::{AccountId, Keyring},
	metadata::MetadataRegistry,
	rpc::{
		BlockNumber, ChainProperties, ChainRpc, Header, RpcStream, RuntimeVersion, SignedBlock,
		TransactionStatus, WsRpcClient,
	},
	transfer::{EncodedCall, TransferBuilder},
	value::{decode_value, Value},
	LOG_TARGET,
};
use futures::StreamExt;
use primitive_types::H256;
use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::Duration,
};
use xcm_format::Reader;

/// Transport and submission limits of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
	pub request_timeout: Duration,
	pub connection_timeout: Duration,
	pub max_request_size: u32,
	/// Runtime metadata alone can take several megabytes.
	pub max_response_size: u32,
	/// How long [`ChainSession::submit`] waits for the transaction to be included.
	pub inclusion_timeout: Duration,
}

impl Default for ConnectionParams {
	fn default() -> Self {
		ConnectionParams {
			request_timeout: Duration::from_secs(60),
			connection_timeout: Duration::from_secs(30),
			max_request_size: 15 * 1024 * 1024,
			max_response_size: 64 * 1024 * 1024,
			inclusion_timeout: Duration::from_secs(300),
		}
	}
}

/// An extrinsic included in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
	pub tx_hash: H256,
	pub block_hash: H256,
	pub block_number: BlockNumber,
	pub extrinsic_index: u32,
	/// Events emitted while applying the extrinsic.
	pub events: Vec<EventRecord>,
}

impl Submission {
	/// `0x`-prefixed transaction hash, 66 characters.
	pub fn tx_hash_hex(&self) -> String {
		array_bytes::bytes2hex("0x", self.tx_hash.as_bytes())
	}

	/// `<block>-<index>` reference accepted by the tracker.
	pub fn extrinsic_ref(&self) -> String {
		format!("{}-{}", self.block_number, self.extrinsic_index)
	}
}

/// Chain constants read once when the session is opened.
struct ChainInfo {
	registry: MetadataRegistry,
	runtime_version: RuntimeVersion,
	genesis_hash: H256,
	properties: ChainProperties,
}

impl ChainInfo {
	async fn fetch(rpc: &dyn ChainRpc) -> Result<Self, ConnectError> {
		let registry = MetadataRegistry::load(rpc).await?;
		let runtime_version = rpc.runtime_version().await?;
		let genesis_hash = rpc
			.block_hash(Some(0))
			.await?
			.ok_or_else(|| RpcError::InvalidResponse("node has no genesis block".into()))?;
		let properties = rpc.system_properties().await?;
		Ok(ChainInfo { registry, runtime_version, genesis_hash, properties })
	}
}

/// Metadata-aware connection to one chain.
pub struct ChainSession {
	endpoint: String,
	rpc: Arc<dyn ChainRpc>,
	registry: MetadataRegistry,
	runtime_version: RuntimeVersion,
	genesis_hash: H256,
	properties: ChainProperties,
	params: ConnectionParams,
	closed: AtomicBool,
}

impl std::fmt::Debug for ChainSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChainSession")
			.field("endpoint", &self.endpoint)
			.field("spec_name", &self.runtime_version.spec_name)
			.field("spec_version", &self.runtime_version.spec_version)
			.field("closed", &self.is_closed())
			.finish()
	}
}

impl ChainSession {
	/// Open a websocket to `endpoint` and load the chain's metadata.
	pub async fn connect(endpoint: &str, params: ConnectionParams) -> Result<Self, ConnectError> {
		validate_endpoint(endpoint)?;
		let rpc = WsRpcClient::connect(endpoint, &params).await?;
		Self::from_rpc(endpoint, Arc::new(rpc), params).await
	}

	/// Open a session over an established transport. The transport is closed if this fails.
	pub async fn from_rpc(
		endpoint: impl Into<String>,
		rpc: Arc<dyn ChainRpc>,
		params: ConnectionParams,
	) -> Result<Self, ConnectError> {
		let endpoint = endpoint.into();
		let info = match ChainInfo::fetch(rpc.as_ref()).await {
			Ok(info) => info,
			Err(err) => {
				log::warn!(target: LOG_TARGET, "Failed to open session to {endpoint}: {err}");
				rpc.close().await;
				return Err(err)
			},
		};
		log::info!(
			target: LOG_TARGET,
			"Connected to {endpoint}: {} v{}, genesis {:?}",
			info.runtime_version.spec_name,
			info.runtime_version.spec_version,
			info.genesis_hash,
		);
		Ok(ChainSession {
			endpoint,
			rpc,
			registry: info.registry,
			runtime_version: info.runtime_version,
			genesis_hash: info.genesis_hash,
			properties: info.properties,
			params,
			closed: AtomicBool::new(false),
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn registry(&self) -> &MetadataRegistry {
		&self.registry
	}

	pub fn runtime_version(&self) -> &RuntimeVersion {
		&self.runtime_version
	}

	pub fn genesis_hash(&self) -> H256 {
		self.genesis_hash
	}

	pub fn properties(&self) -> &ChainProperties {
		&self.properties
	}

	pub fn transfer_builder(&self) -> TransferBuilder<'_> {
		TransferBuilder::new(&self.registry)
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	fn ensure_open(&self) -> Result<(), ChainError> {
		if self.is_closed() {
			return Err(ChainError::Closed)
		}
		Ok(())
	}

	pub async fn block_hash(&self, number: BlockNumber) -> Result<Option<H256>, ChainError> {
		self.ensure_open()?;
		Ok(self.rpc.block_hash(Some(number)).await?)
	}

	pub async fn header(&self, hash: H256) -> Result<Option<Header>, ChainError> {
		self.ensure_open()?;
		Ok(self.rpc.header(Some(hash)).await?)
	}

	pub async fn finalized_number(&self) -> Result<BlockNumber, ChainError> {
		self.ensure_open()?;
		let hash = self.rpc.finalized_head().await?;
		let header = self
			.rpc
			.header(Some(hash))
			.await?
			.ok_or_else(|| ChainError::BlockNotFound(format!("{hash:?}")))?;
		Ok(header.number)
	}

	pub async fn block(&self, hash: H256) -> Result<Option<SignedBlock>, ChainError> {
		self.ensure_open()?;
		Ok(self.rpc.block(hash).await?)
	}

	/// Encoded extrinsics of block `hash`, `None` if the block is unknown.
	pub async fn block_extrinsics(&self, hash: H256) -> Result<Option<Vec<Vec<u8>>>, ChainError> {
		Ok(self.block(hash).await?.map(|signed| {
			signed.block.extrinsics.into_iter().map(|extrinsic| extrinsic.0).collect()
		}))
	}

	/// Events deposited in block `hash`.
	pub async fn events_at(&self, hash: H256) -> Result<Vec<EventRecord>, ChainError> {
		self.ensure_open()?;
		let key = self.registry.storage_key("System", "Events", &[])?;
		match self.rpc.storage(&key, Some(hash)).await? {
			Some(bytes) => Ok(decode_events(&self.registry, &bytes)?),
			None => Ok(Vec::new()),
		}
	}

	/// Decoded value of `module.entry`, falling back to the declared default for absent keys.
	pub async fn storage_value(
		&self,
		module: &str,
		entry: &str,
		keys: &[&[u8]],
		at: Option<H256>,
	) -> Result<Option<Value>, ChainError> {
		self.ensure_open()?;
		let key = self.registry.storage_key(module, entry, keys)?;
		let descriptor = self.registry.storage_entry(module, entry).ok_or_else(|| {
			crate::error::MetadataError::StorageNotFound { module: module.into(), entry: entry.into() }
		})?;
		let bytes = match self.rpc.storage(&key, at).await? {
			Some(bytes) => bytes,
			None if descriptor.optional => return Ok(None),
			None => descriptor.default.clone(),
		};
		let mut reader = Reader::new(&bytes);
		let value = decode_value(&self.registry, descriptor.value, &mut reader)?;
		reader.finish()?;
		Ok(Some(value))
	}

	pub async fn account_nonce(&self, account: &AccountId) -> Result<u32, ChainError> {
		let nonce = self
			.storage_value("System", "Account", &[account.as_slice()], None)
			.await?
			.and_then(|info| info.field("nonce").and_then(Value::as_u128))
			.unwrap_or_default();
		u32::try_from(nonce)
			.map_err(|_| ChainError::Metadata(crate::error::MetadataError::UnexpectedShape("nonce")))
	}

	pub async fn subscribe_finalized(&self) -> Result<RpcStream<Header>, ChainError> {
		self.ensure_open()?;
		Ok(self.rpc.subscribe_finalized_heads().await?)
	}

	/// Sign `call` with `keyring`, submit it and wait until it is included in a block.
	///
	/// The transaction is never resubmitted.
	pub async fn submit(&self, call: &EncodedCall, keyring: &Keyring) -> Result<Submission, SubmitError> {
		let nonce = self.account_nonce(&keyring.account_id()).await?;
		let params = SigningParams {
			spec_version: self.runtime_version.spec_version,
			transaction_version: self.runtime_version.transaction_version,
			genesis_hash: self.genesis_hash,
			nonce,
			tip: 0,
		};
		let extrinsic = ExtrinsicBuilder::new(&self.registry).sign(&call.encode(), keyring, &params)?;
		log::info!(
			target: LOG_TARGET,
			"Submitting {}.{} as {:?} with nonce {nonce}",
			call.module,
			call.call,
			extrinsic.hash,
		);

		let mut statuses = self.rpc.submit_and_watch(&extrinsic.bytes).await.map_err(|err| {
			if err.is_call_error() {
				SubmitError::Rejected(err.to_string())
			} else {
				SubmitError::Disconnected(err.to_string())
			}
		})?;
		let timeout = self.params.inclusion_timeout;
		let block_hash = tokio::time::timeout(timeout, wait_for_inclusion(&mut statuses))
			.await
			.map_err(|_| SubmitError::Timeout(timeout))??;
		drop(statuses);

		let block = self
			.block(block_hash)
			.await?
			.ok_or_else(|| ChainError::BlockNotFound(format!("{block_hash:?}")))?;
		let extrinsic_index = block
			.block
			.extrinsics
			.iter()
			.position(|included| included.0 == extrinsic.bytes)
			.ok_or(ChainError::ExtrinsicNotInBlock(block_hash))? as u32;
		let events = self
			.events_at(block_hash)
			.await?
			.into_iter()
			.filter(|event| event.emitted_by(extrinsic_index))
			.collect::<Vec<_>>();

		if let Some(failed) = events.iter().find(|event| event.is("System", "ExtrinsicFailed")) {
			let reason = describe_dispatch_error(&self.registry, failed.field("dispatch_error"));
			log::warn!(target: LOG_TARGET, "Extrinsic {:?} failed: {reason}", extrinsic.hash);
			return Err(SubmitError::Rejected(reason))
		}

		let submission = Submission {
			tx_hash: extrinsic.hash,
			block_hash,
			block_number: block.block.header.number,
			extrinsic_index,
			events,
		};
		log::info!(
			target: LOG_TARGET,
			"Extrinsic {} included at {}",
			submission.tx_hash_hex(),
			submission.extrinsic_ref(),
		);
		Ok(submission)
	}

	/// Release the transport. Further queries fail with [`ChainError::Closed`].
	pub async fn close(&self) {
		if !self.closed.swap(true, Ordering::SeqCst) {
			self.rpc.close().await;
			log::debug!(target: LOG_TARGET, "Session to {} closed", self.endpoint);
		}
	}
}

async fn wait_for_inclusion(
	statuses: &mut RpcStream<TransactionStatus>,
) -> Result<H256, SubmitError> {
	while let Some(status) = statuses.next().await {
		let status = status.map_err(|err| SubmitError::Disconnected(err.to_string()))?;
		log::debug!(target: LOG_TARGET, "Transaction status: {status:?}");
		match status {
			TransactionStatus::InBlock(hash) | TransactionStatus::Finalized(hash) => return Ok(hash),
			other =>
				if let Some(err) = SubmitError::from_status(&other) {
					return Err(err)
				},
		}
	}
	Err(SubmitError::Disconnected("status stream ended before inclusion".into()))
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConnectError> {
	let url = url::Url::parse(endpoint).map_err(|err| ConnectError::InvalidEndpoint {
		endpoint: endpoint.to_owned(),
		reason: err.to_string(),
	})?;
	match url.scheme() {
		"ws" | "wss" => Ok(()),
		other => Err(ConnectError::UnsupportedScheme(other.to_owned())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::BuildError,
		test_utils::{fixtures, metadata_v14, FixtureOptions, MockRpc, SubmitBehavior},
		transfer::{Protocol, TransferRequest},
	};
	use assert_matches::assert_matches;

	async fn session(rpc: &Arc<MockRpc>) -> ChainSession {
		ChainSession::from_rpc("ws://mock", rpc.clone(), ConnectionParams::default())
			.await
			.unwrap()
	}

	fn alice() -> Keyring {
		Keyring::from_secret("//Alice").unwrap()
	}

	fn ump_call(session: &ChainSession) -> EncodedCall {
		let request = TransferRequest {
			protocol: Protocol::Ump,
			dest_para_id: None,
			beneficiary: alice().public().to_vec(),
			amount: 1_000_000_000_000,
		};
		session.transfer_builder().build(&request).unwrap().call
	}

	#[tokio::test]
	async fn non_websocket_endpoints_are_rejected() {
		assert_matches!(
			ChainSession::connect("http://127.0.0.1:9944", ConnectionParams::default()).await,
			Err(ConnectError::UnsupportedScheme(scheme)) if scheme == "http"
		);
		assert_matches!(
			ChainSession::connect("not a url", ConnectionParams::default()).await,
			Err(ConnectError::InvalidEndpoint { .. })
		);
	}

	#[tokio::test]
	async fn chain_without_xcm_pallet_is_refused_and_released() {
		let rpc = Arc::new(MockRpc::new(metadata_v14(&FixtureOptions {
			xcm_pallet: None,
			..Default::default()
		})));
		assert_matches!(
			ChainSession::from_rpc("ws://mock", rpc.clone(), ConnectionParams::default()).await,
			Err(ConnectError::Unsupported)
		);
		assert_eq!(rpc.close_count(), 1);
	}

	#[tokio::test]
	async fn close_is_idempotent() {
		let rpc = Arc::new(MockRpc::default());
		let session = session(&rpc).await;
		session.close().await;
		session.close().await;
		assert_eq!(rpc.close_count(), 1);
		assert!(session.is_closed());
		assert_matches!(session.block_hash(0).await, Err(ChainError::Closed));
	}

	#[tokio::test]
	async fn nonce_comes_from_account_storage() {
		let rpc = Arc::new(MockRpc::default());
		let session = session(&rpc).await;
		assert_eq!(session.account_nonce(&alice().account_id()).await.unwrap(), 0);

		rpc.set_account_nonce(alice().account_id(), 7);
		assert_eq!(session.account_nonce(&alice().account_id()).await.unwrap(), 7);
	}

	#[tokio::test]
	async fn ump_transfer_is_submitted_and_located() {
		let rpc = Arc::new(MockRpc::default());
		rpc.on_submit(SubmitBehavior::Include {
			events: vec![fixtures::RuntimeEvent::System(fixtures::SystemEvent::success())],
		});
		let session = session(&rpc).await;
		let submission = session.submit(&ump_call(&session), &alice()).await.unwrap();

		assert_eq!(submission.tx_hash_hex().len(), 66);
		let submitted = rpc.submitted();
		assert_eq!(submitted.len(), 1);
		assert_eq!(submission.tx_hash, H256(sp_crypto_hashing::blake2_256(&submitted[0])));
		assert_eq!(submission.extrinsic_index, 1);
		assert_eq!(submission.extrinsic_ref(), format!("{}-1", submission.block_number));
		assert!(submission.events[0].is("System", "ExtrinsicSuccess"));
	}

	#[tokio::test]
	async fn rejections_are_not_retried() {
		let rpc = Arc::new(MockRpc::default());
		rpc.on_submit(SubmitBehavior::Reject("Invalid Transaction: Inability to pay some fees".into()));
		let session = session(&rpc).await;
		assert_matches!(
			session.submit(&ump_call(&session), &alice()).await,
			Err(SubmitError::Rejected(reason)) if reason.contains("Inability to pay")
		);
		assert_eq!(rpc.submitted().len(), 1);

		rpc.on_submit(SubmitBehavior::Statuses(vec![TransactionStatus::Ready, TransactionStatus::Invalid]));
		assert_matches!(session.submit(&ump_call(&session), &alice()).await, Err(SubmitError::Rejected(_)));

		rpc.on_submit(SubmitBehavior::Statuses(vec![TransactionStatus::Ready]));
		assert_matches!(
			session.submit(&ump_call(&session), &alice()).await,
			Err(SubmitError::Disconnected(_))
		);
		assert_eq!(rpc.submitted().len(), 3);
	}

	#[tokio::test]
	async fn dispatch_failures_name_the_pallet_error() {
		let rpc = Arc::new(MockRpc::default());
		rpc.on_submit(SubmitBehavior::Include {
			events: vec![fixtures::RuntimeEvent::System(fixtures::SystemEvent::module_error(
				fixtures::XCM_PALLET_INDEX,
				2,
			))],
		});
		let session = session(&rpc).await;
		assert_matches!(
			session.submit(&ump_call(&session), &alice()).await,
			Err(SubmitError::Rejected(reason)) if reason == "PolkadotXcm::Filtered"
		);
	}

	#[tokio::test]
	async fn unsupported_extensions_fail_before_submission() {
		let rpc = Arc::new(MockRpc::new(metadata_v14(&FixtureOptions {
			unknown_extension: true,
			..Default::default()
		})));
		let session = session(&rpc).await;
		assert_matches!(
			session.submit(&ump_call(&session), &alice()).await,
			Err(SubmitError::Build(BuildError::UnsupportedExtension(_)))
		);
		assert!(rpc.submitted().is_empty());
	}

	#[tokio::test]
	async fn queries_walk_the_mock_chain() {
		let rpc = Arc::new(MockRpc::default());
		let session = session(&rpc).await;
		let hash = rpc.push_block(
			vec![vec![4, 0xaa]],
			vec![fixtures::record(0, fixtures::RuntimeEvent::System(fixtures::SystemEvent::success()))],
		);
		assert_eq!(session.finalized_number().await.unwrap(), 1);
		assert_eq!(session.block_hash(1).await.unwrap(), Some(hash));
		assert_eq!(session.block_extrinsics(hash).await.unwrap(), Some(vec![vec![4, 0xaa]]));
		assert_eq!(session.events_at(hash).await.unwrap().len(), 1);
		assert_eq!(session.block_extrinsics(H256::repeat_byte(0xee)).await.unwrap(), None);
		assert_eq!(session.genesis_hash(), rpc.block_hash_at(0).unwrap());
		assert_eq!(session.properties().token_decimals, Some(12));
	}
}
