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

//! In-memory chains for tests.
//!
//! [`metadata_v14`] builds runtime metadata from the `TypeInfo` of the types in [`fixtures`], and
//! [`MockRpc`] serves it together with blocks, storage and scripted submissions.

use crate::{
	error::RpcError,
	metadata::{storage_prefix, StorageHasher},
	rpc::{
		Block, BlockNumber, Bytes, ChainProperties, ChainRpc, Header, RpcStream, RuntimeVersion,
		SignedBlock, TransactionStatus,
	},
};
use async_trait::async_trait;
use codec::Encode;
use futures::{channel::mpsc, StreamExt};
use parking_lot::Mutex;
use primitive_types::H256;
use std::{
	collections::HashMap,
	sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

pub mod fixtures {
	//! Runtime types shaped like the FRAME and XCM types the client reads.
	#![allow(non_camel_case_types)]

	use codec::Encode;
	use scale_info::TypeInfo;
	use std::marker::PhantomData;

	pub type Hash = [u8; 32];

	/// Pallet index of the XCM pallet, whatever its name.
	pub const XCM_PALLET_INDEX: u8 = 31;

	#[derive(TypeInfo)]
	pub struct Runtime;

	#[derive(Clone, Debug, Default, Encode, TypeInfo)]
	pub struct AccountData {
		pub free: u128,
		pub reserved: u128,
		pub frozen: u128,
		pub flags: u128,
	}

	#[derive(Clone, Debug, Default, Encode, TypeInfo)]
	pub struct AccountInfo {
		pub nonce: u32,
		pub consumers: u32,
		pub providers: u32,
		pub sufficients: u32,
		pub data: AccountData,
	}

	#[derive(Clone, Debug, Default, Encode, TypeInfo)]
	pub struct PersistedValidationData {
		pub parent_head: Vec<u8>,
		pub relay_parent_number: u32,
		pub relay_parent_storage_root: Hash,
		pub max_pov_size: u32,
	}

	#[derive(Clone, Debug, Default, Encode, TypeInfo)]
	pub struct Weight {
		#[codec(compact)]
		pub ref_time: u64,
		#[codec(compact)]
		pub proof_size: u64,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum Junction {
		Parachain(#[codec(compact)] u32),
		AccountId32 { network: Option<u8>, id: Hash },
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum Junctions {
		Here,
		X1([Junction; 1]),
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct Location {
		pub parents: u8,
		pub interior: Junctions,
	}

	impl Location {
		pub fn parent() -> Self {
			Location { parents: 1, interior: Junctions::Here }
		}
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct Asset {
		pub id: Location,
		#[codec(compact)]
		pub amount: u128,
	}

	#[derive(TypeInfo)]
	pub enum VersionedLocation {
		#[codec(index = 3)]
		V3(Location),
		#[codec(index = 4)]
		V4(Location),
	}

	#[derive(TypeInfo)]
	pub enum VersionedAssets {
		#[codec(index = 3)]
		V3(Vec<Asset>),
		#[codec(index = 4)]
		V4(Vec<Asset>),
	}

	/// Versioned wrappers of a runtime that predates XCM v4.
	#[derive(TypeInfo)]
	pub enum LegacyVersionedLocation {
		#[codec(index = 1)]
		V2(Location),
		#[codec(index = 3)]
		V3(Location),
	}

	#[derive(TypeInfo)]
	pub enum LegacyVersionedAssets {
		#[codec(index = 1)]
		V2(Vec<Asset>),
		#[codec(index = 3)]
		V3(Vec<Asset>),
	}

	/// Instructions of an XCM version newer than the ones modelled statically.
	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum NextInstruction {
		WithdrawAsset(Vec<Asset>),
		ClearOrigin,
		SetTopic(Hash),
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum VersionedXcm {
		#[codec(index = 5)]
		V5(Vec<NextInstruction>),
	}

	#[derive(TypeInfo)]
	pub enum WeightLimit {
		Unlimited,
		Limited(Weight),
	}

	#[derive(TypeInfo)]
	pub enum XcmCall<L: 'static, A: 'static> {
		#[codec(index = 0)]
		send { dest: Box<L>, message: Box<VersionedXcm> },
		#[codec(index = 2)]
		reserve_transfer_assets { dest: Box<L>, beneficiary: Box<L>, assets: Box<A>, fee_asset_item: u32 },
		#[codec(index = 8)]
		limited_reserve_transfer_assets {
			dest: Box<L>,
			beneficiary: Box<L>,
			assets: Box<A>,
			fee_asset_item: u32,
			weight_limit: WeightLimit,
		},
	}

	/// Call enum of a runtime where only the limited variant is left.
	#[derive(TypeInfo)]
	pub enum XcmLimitedCall<L: 'static, A: 'static> {
		#[codec(index = 8)]
		limited_reserve_transfer_assets {
			dest: Box<L>,
			beneficiary: Box<L>,
			assets: Box<A>,
			fee_asset_item: u32,
			weight_limit: WeightLimit,
		},
	}

	#[derive(TypeInfo)]
	pub enum XcmPalletError {
		Unreachable,
		SendFailure,
		Filtered,
		UnweighableMessage,
	}

	#[derive(TypeInfo)]
	pub enum RuntimeCall {
		#[codec(index = 31)]
		PolkadotXcm(XcmCall<VersionedLocation, VersionedAssets>),
	}

	#[derive(TypeInfo)]
	pub enum MultiAddress {
		Id(Hash),
		Index(#[codec(compact)] u32),
		Raw(Vec<u8>),
		Address32(Hash),
		Address20([u8; 20]),
	}

	#[derive(TypeInfo)]
	pub enum MultiSignature {
		Ed25519([u8; 64]),
		Sr25519([u8; 64]),
		Ecdsa([u8; 65]),
	}

	#[derive(TypeInfo)]
	pub struct UncheckedExtrinsic<Address: 'static, Call: 'static, Signature: 'static, Extra: 'static>(
		PhantomData<(Address, Call, Signature, Extra)>,
	);

	#[derive(TypeInfo)]
	pub enum Era {
		Immortal,
	}

	#[derive(TypeInfo)]
	pub struct CheckNonce(#[codec(compact)] pub u32);

	#[derive(TypeInfo)]
	pub struct ChargeTransactionPayment(#[codec(compact)] pub u128);

	#[derive(TypeInfo)]
	pub enum Mode {
		Disabled,
		Enabled,
	}

	#[derive(TypeInfo)]
	pub struct CheckFancyThing(pub u32);

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum DispatchClass {
		Normal,
		Operational,
		Mandatory,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum Pays {
		Yes,
		No,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct DispatchInfo {
		pub weight: Weight,
		pub class: DispatchClass,
		pub pays_fee: Pays,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct ModuleError {
		pub index: u8,
		pub error: [u8; 4],
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum DispatchError {
		Other,
		CannotLookup,
		BadOrigin,
		Module(ModuleError),
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum SystemEvent {
		ExtrinsicSuccess { dispatch_info: DispatchInfo },
		ExtrinsicFailed { dispatch_error: DispatchError, dispatch_info: DispatchInfo },
	}

	impl SystemEvent {
		fn info() -> DispatchInfo {
			DispatchInfo { weight: Weight::default(), class: DispatchClass::Normal, pays_fee: Pays::Yes }
		}

		pub fn success() -> Self {
			SystemEvent::ExtrinsicSuccess { dispatch_info: Self::info() }
		}

		pub fn module_error(index: u8, error: u8) -> Self {
			SystemEvent::ExtrinsicFailed {
				dispatch_error: DispatchError::Module(ModuleError { index, error: [error, 0, 0, 0] }),
				dispatch_info: Self::info(),
			}
		}
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum XcmError {
		Overflow,
		Unimplemented,
		UntrustedReserveLocation,
		Barrier,
		TooExpensive,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum Outcome {
		Complete { used: Weight },
		Incomplete { used: Weight, error: XcmError },
		Error { error: XcmError },
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum ParachainSystemEvent {
		ValidationFunctionStored,
		UpwardMessageSent { message_hash: Option<Hash> },
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum XcmpQueueEvent {
		Success { message_hash: Hash, message_id: Hash, weight: Weight },
		Fail { message_hash: Hash, message_id: Hash, error: XcmError, weight: Weight },
		XcmpMessageSent { message_hash: Hash },
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum XcmPalletEvent {
		Attempted { outcome: Outcome },
		Sent { origin: Location, destination: Location, message: Vec<u8>, message_id: Hash },
	}

	impl XcmPalletEvent {
		pub fn sent(message_id: Hash) -> Self {
			XcmPalletEvent::Sent {
				origin: Location { parents: 0, interior: Junctions::Here },
				destination: Location::parent(),
				message: vec![],
				message_id,
			}
		}
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum AggregateMessageOrigin {
		Here,
		Parent,
		Sibling(u32),
		Ump(u32),
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum ProcessMessageError {
		BadFormat,
		Corrupt,
		Unsupported,
		Overweight(Weight),
		Yield,
		StackLimitReached,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum MessageQueueEvent {
		ProcessingFailed { id: Hash, origin: AggregateMessageOrigin, error: ProcessMessageError },
		Processed { id: Hash, origin: AggregateMessageOrigin, weight_used: Weight, success: bool },
	}

	impl MessageQueueEvent {
		pub fn processed(id: Hash, success: bool) -> Self {
			MessageQueueEvent::Processed {
				id,
				origin: AggregateMessageOrigin::Parent,
				weight_used: Weight::default(),
				success,
			}
		}

		pub fn processing_failed(id: Hash) -> Self {
			MessageQueueEvent::ProcessingFailed {
				id,
				origin: AggregateMessageOrigin::Parent,
				error: ProcessMessageError::Unsupported,
			}
		}
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct CandidateDescriptor {
		pub para_id: u32,
		pub relay_parent: Hash,
		pub collator: Hash,
		pub persisted_validation_data_hash: Hash,
		pub pov_hash: Hash,
		pub erasure_root: Hash,
		pub signature: [u8; 64],
		pub para_head: Hash,
		pub validation_code_hash: Hash,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct CandidateReceipt {
		pub descriptor: CandidateDescriptor,
		pub commitments_hash: Hash,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct HeadData(pub Vec<u8>);

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum ParaInclusionEvent {
		CandidateBacked(CandidateReceipt, HeadData, u32, u32),
		CandidateIncluded(CandidateReceipt, HeadData, u32, u32),
	}

	impl ParaInclusionEvent {
		pub fn included(para_id: u32, para_head: Hash) -> Self {
			let descriptor = CandidateDescriptor {
				para_id,
				relay_parent: [0; 32],
				collator: [0; 32],
				persisted_validation_data_hash: [0; 32],
				pov_hash: [0; 32],
				erasure_root: [0; 32],
				signature: [0; 64],
				para_head,
				validation_code_hash: [0; 32],
			};
			ParaInclusionEvent::CandidateIncluded(
				CandidateReceipt { descriptor, commitments_hash: [0; 32] },
				HeadData(vec![]),
				0,
				0,
			)
		}
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum DmpQueueEvent {
		ExecutedDownward { message_hash: Hash, message_id: Hash, outcome: Outcome },
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum UmpEvent {
		ExecutedUpward(Hash, Outcome),
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum RuntimeEvent {
		#[codec(index = 0)]
		System(SystemEvent),
		#[codec(index = 1)]
		ParachainSystem(ParachainSystemEvent),
		#[codec(index = 30)]
		XcmpQueue(XcmpQueueEvent),
		#[codec(index = 31)]
		PolkadotXcm(XcmPalletEvent),
		#[codec(index = 32)]
		MessageQueue(MessageQueueEvent),
		#[codec(index = 33)]
		DmpQueue(DmpQueueEvent),
		#[codec(index = 53)]
		ParaInclusion(ParaInclusionEvent),
		#[codec(index = 54)]
		Ump(UmpEvent),
		#[codec(index = 99)]
		XcmPallet(XcmPalletEvent),
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub enum Phase {
		ApplyExtrinsic(u32),
		Finalization,
		Initialization,
	}

	#[derive(Clone, Debug, Encode, TypeInfo)]
	pub struct EventRecord {
		pub phase: Phase,
		pub event: RuntimeEvent,
		pub topics: Vec<Hash>,
	}

	/// `event` emitted by extrinsic `index`.
	pub fn record(index: u32, event: RuntimeEvent) -> EventRecord {
		EventRecord { phase: Phase::ApplyExtrinsic(index), event, topics: vec![] }
	}
}

/// Shape of the runtime described by [`metadata_v14`].
#[derive(Debug, Clone)]
pub struct FixtureOptions {
	/// Name of the XCM pallet, if the runtime has one.
	pub xcm_pallet: Option<&'static str>,
	/// Whether the XCM pallet exposes any call.
	pub xcm_calls: bool,
	/// Whether `reserve_transfer_assets` is still there next to the limited variant.
	pub reserve_transfer: bool,
	/// XCM v2 and v3 instead of v3 and v4.
	pub legacy_versions: bool,
	pub metadata_hash: bool,
	/// Adds an extension with data this client does not know how to fill.
	pub unknown_extension: bool,
}

impl Default for FixtureOptions {
	fn default() -> Self {
		FixtureOptions {
			xcm_pallet: Some("PolkadotXcm"),
			xcm_calls: true,
			reserve_transfer: true,
			legacy_versions: false,
			metadata_hash: false,
			unknown_extension: false,
		}
	}
}

/// Encoded `RuntimeMetadataPrefixed` of a runtime shaped after `options`.
pub fn metadata_v14(options: &FixtureOptions) -> Vec<u8> {
	use fixtures::*;
	use frame_metadata::{
		v14::{
			ExtrinsicMetadata, PalletCallMetadata, PalletErrorMetadata, PalletEventMetadata,
			PalletMetadata, PalletStorageMetadata, RuntimeMetadataV14, SignedExtensionMetadata,
			StorageEntryMetadata, StorageEntryModifier, StorageEntryType,
			StorageHasher as Hasher,
		},
		RuntimeMetadataPrefixed,
	};
	use scale_info::meta_type;

	let plain = |name: &'static str, ty, modifier, default: Vec<u8>| StorageEntryMetadata {
		name,
		modifier,
		ty: StorageEntryType::Plain(ty),
		default,
		docs: vec![],
	};
	let pallet = |name: &'static str, index: u8, event| PalletMetadata {
		name,
		storage: None,
		calls: None,
		event: Some(PalletEventMetadata { ty: event }),
		constants: vec![],
		error: None,
		index,
	};

	let system = PalletMetadata {
		storage: Some(PalletStorageMetadata {
			prefix: "System",
			entries: vec![
				StorageEntryMetadata {
					name: "Account",
					modifier: StorageEntryModifier::Default,
					ty: StorageEntryType::Map {
						hashers: vec![Hasher::Blake2_128Concat],
						key: meta_type::<Hash>(),
						value: meta_type::<AccountInfo>(),
					},
					default: AccountInfo::default().encode(),
					docs: vec![],
				},
				plain(
					"Events",
					meta_type::<Vec<EventRecord>>(),
					StorageEntryModifier::Default,
					vec![0],
				),
				plain("Number", meta_type::<u32>(), StorageEntryModifier::Default, vec![0; 4]),
			],
		}),
		..pallet("System", 0, meta_type::<SystemEvent>())
	};
	let parachain_system = PalletMetadata {
		storage: Some(PalletStorageMetadata {
			prefix: "ParachainSystem",
			entries: vec![plain(
				"ValidationData",
				meta_type::<PersistedValidationData>(),
				StorageEntryModifier::Optional,
				vec![0],
			)],
		}),
		..pallet("ParachainSystem", 1, meta_type::<ParachainSystemEvent>())
	};

	let mut pallets = vec![
		system,
		parachain_system,
		pallet("XcmpQueue", 30, meta_type::<XcmpQueueEvent>()),
		pallet("MessageQueue", 32, meta_type::<MessageQueueEvent>()),
		pallet("DmpQueue", 33, meta_type::<DmpQueueEvent>()),
		pallet("ParaInclusion", 53, meta_type::<ParaInclusionEvent>()),
		pallet("Ump", 54, meta_type::<UmpEvent>()),
	];
	if let Some(name) = options.xcm_pallet {
		let calls = match (options.legacy_versions, options.reserve_transfer) {
			(false, true) => meta_type::<XcmCall<VersionedLocation, VersionedAssets>>(),
			(false, false) => meta_type::<XcmLimitedCall<VersionedLocation, VersionedAssets>>(),
			(true, true) => meta_type::<XcmCall<LegacyVersionedLocation, LegacyVersionedAssets>>(),
			(true, false) =>
				meta_type::<XcmLimitedCall<LegacyVersionedLocation, LegacyVersionedAssets>>(),
		};
		pallets.push(PalletMetadata {
			calls: options.xcm_calls.then(|| PalletCallMetadata { ty: calls }),
			error: Some(PalletErrorMetadata { ty: meta_type::<XcmPalletError>() }),
			..pallet(name, XCM_PALLET_INDEX, meta_type::<XcmPalletEvent>())
		});
	}

	let extension = |identifier: &'static str, ty, additional_signed| SignedExtensionMetadata {
		identifier,
		ty,
		additional_signed,
	};
	let mut signed_extensions = vec![
		extension("CheckNonZeroSender", meta_type::<()>(), meta_type::<()>()),
		extension("CheckSpecVersion", meta_type::<()>(), meta_type::<u32>()),
		extension("CheckTxVersion", meta_type::<()>(), meta_type::<u32>()),
		extension("CheckGenesis", meta_type::<()>(), meta_type::<Hash>()),
		extension("CheckMortality", meta_type::<Era>(), meta_type::<Hash>()),
		extension("CheckNonce", meta_type::<CheckNonce>(), meta_type::<()>()),
		extension("CheckWeight", meta_type::<()>(), meta_type::<()>()),
		extension("ChargeTransactionPayment", meta_type::<ChargeTransactionPayment>(), meta_type::<()>()),
	];
	if options.metadata_hash {
		signed_extensions.push(extension(
			"CheckMetadataHash",
			meta_type::<Mode>(),
			meta_type::<Option<Hash>>(),
		));
	}
	if options.unknown_extension {
		signed_extensions.push(extension("CheckFancyThing", meta_type::<CheckFancyThing>(), meta_type::<()>()));
	}

	let extrinsic = ExtrinsicMetadata {
		ty: meta_type::<UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, ()>>(),
		version: 4,
		signed_extensions,
	};
	RuntimeMetadataPrefixed::from(RuntimeMetadataV14::new(pallets, extrinsic, meta_type::<Runtime>()))
		.encode()
}

/// What [`MockRpc`] does with the next submitted extrinsics.
#[derive(Debug, Clone)]
pub enum SubmitBehavior {
	/// Include the extrinsic at index 1 of a new block, emitting `events` while applying it.
	Include { events: Vec<fixtures::RuntimeEvent> },
	/// Report these statuses, then end the stream.
	Statuses(Vec<TransactionStatus>),
	/// Fail the submission call with this node error.
	Reject(String),
}

struct MockBlock {
	hash: H256,
	header: Header,
	extrinsics: Vec<Vec<u8>>,
	storage: HashMap<Vec<u8>, Vec<u8>>,
}

struct MockChain {
	blocks: Vec<MockBlock>,
	/// Values visible at every block.
	storage: HashMap<Vec<u8>, Vec<u8>>,
	submit: SubmitBehavior,
	submitted: Vec<Vec<u8>>,
	subscribers: Vec<mpsc::UnboundedSender<Header>>,
	salt: u64,
}

impl MockChain {
	fn push_block(
		&mut self,
		extrinsics: Vec<Vec<u8>>,
		events: Vec<fixtures::EventRecord>,
	) -> H256 {
		let parent = self.blocks.last().map(|block| block.hash).unwrap_or_default();
		let number = self.blocks.len() as BlockNumber;
		let hash = H256(sp_crypto_hashing::blake2_256(&(self.salt, number, parent.0).encode()));
		let header = Header {
			parent_hash: parent,
			number,
			state_root: H256::zero(),
			extrinsics_root: H256::zero(),
		};
		let mut storage = HashMap::new();
		storage.insert(storage_prefix("System", "Events"), events.encode());
		self.blocks.push(MockBlock { hash, header: header.clone(), extrinsics, storage });
		self.subscribers.retain(|subscriber| subscriber.unbounded_send(header.clone()).is_ok());
		hash
	}

	fn block(&self, hash: Option<H256>) -> Option<&MockBlock> {
		match hash {
			Some(hash) => self.blocks.iter().find(|block| block.hash == hash),
			None => self.blocks.last(),
		}
	}
}

/// An in-memory chain behind the [`ChainRpc`] seam.
///
/// Block `n` is at index `n`; the last block is both best and finalized.
pub struct MockRpc {
	metadata: Vec<u8>,
	chain: Mutex<MockChain>,
	closes: AtomicUsize,
}

impl Default for MockRpc {
	fn default() -> Self {
		MockRpc::new(metadata_v14(&FixtureOptions::default()))
	}
}

impl MockRpc {
	/// A chain with a genesis block, serving `metadata`.
	pub fn new(metadata: Vec<u8>) -> Self {
		static SALT: AtomicU64 = AtomicU64::new(0);
		let mut chain = MockChain {
			blocks: Vec::new(),
			storage: HashMap::new(),
			submit: SubmitBehavior::Include {
				events: vec![fixtures::RuntimeEvent::System(fixtures::SystemEvent::success())],
			},
			submitted: Vec::new(),
			subscribers: Vec::new(),
			salt: SALT.fetch_add(1, Ordering::SeqCst),
		};
		chain.push_block(vec![], vec![]);
		MockRpc { metadata, chain: Mutex::new(chain), closes: AtomicUsize::new(0) }
	}

	/// Append a block holding `extrinsics` and `events`, notifying finalized head subscribers.
	pub fn push_block(
		&self,
		extrinsics: Vec<Vec<u8>>,
		events: Vec<fixtures::EventRecord>,
	) -> H256 {
		self.chain.lock().push_block(extrinsics, events)
	}

	/// Append `count` blocks without extrinsics or events.
	pub fn push_empty_blocks(&self, count: u32) -> H256 {
		let mut chain = self.chain.lock();
		let mut hash = H256::zero();
		for _ in 0..count {
			hash = chain.push_block(vec![], vec![]);
		}
		hash
	}

	pub fn block_hash_at(&self, number: BlockNumber) -> Option<H256> {
		self.chain.lock().blocks.get(number as usize).map(|block| block.hash)
	}

	pub fn best_number(&self) -> BlockNumber {
		self.chain.lock().blocks.len() as BlockNumber - 1
	}

	/// Set a raw storage value at block `at`.
	pub fn set_block_storage(&self, at: H256, key: Vec<u8>, value: Vec<u8>) {
		if let Some(block) = self.chain.lock().blocks.iter_mut().find(|block| block.hash == at) {
			block.storage.insert(key, value);
		}
	}

	/// Set a raw storage value visible at every block.
	pub fn set_storage(&self, key: Vec<u8>, value: Vec<u8>) {
		self.chain.lock().storage.insert(key, value);
	}

	pub fn set_account_nonce(&self, account: [u8; 32], nonce: u32) {
		let mut key = storage_prefix("System", "Account");
		key.extend(StorageHasher::Blake2_128Concat.hash(&account));
		self.set_storage(key, fixtures::AccountInfo { nonce, ..Default::default() }.encode());
	}

	pub fn on_submit(&self, behavior: SubmitBehavior) {
		self.chain.lock().submit = behavior;
	}

	/// Every extrinsic received, accepted or not.
	pub fn submitted(&self) -> Vec<Vec<u8>> {
		self.chain.lock().submitted.clone()
	}

	pub fn close_count(&self) -> usize {
		self.closes.load(Ordering::SeqCst)
	}

	fn ensure_open(&self) -> Result<(), RpcError> {
		if self.close_count() > 0 {
			return Err(RpcError::Closed)
		}
		Ok(())
	}
}

#[async_trait]
impl ChainRpc for MockRpc {
	async fn metadata(&self) -> Result<Vec<u8>, RpcError> {
		self.ensure_open()?;
		Ok(self.metadata.clone())
	}

	async fn runtime_version(&self) -> Result<RuntimeVersion, RpcError> {
		self.ensure_open()?;
		Ok(RuntimeVersion { spec_name: "mock".into(), spec_version: 1_002_000, transaction_version: 25 })
	}

	async fn system_properties(&self) -> Result<ChainProperties, RpcError> {
		self.ensure_open()?;
		Ok(ChainProperties {
			token_decimals: Some(12),
			token_symbol: Some("UNIT".into()),
			ss58_format: Some(42),
		})
	}

	async fn block_hash(&self, number: Option<BlockNumber>) -> Result<Option<H256>, RpcError> {
		self.ensure_open()?;
		let chain = self.chain.lock();
		Ok(match number {
			Some(number) => chain.blocks.get(number as usize).map(|block| block.hash),
			None => chain.blocks.last().map(|block| block.hash),
		})
	}

	async fn finalized_head(&self) -> Result<H256, RpcError> {
		self.ensure_open()?;
		Ok(self.chain.lock().block(None).map(|block| block.hash).unwrap_or_default())
	}

	async fn header(&self, hash: Option<H256>) -> Result<Option<Header>, RpcError> {
		self.ensure_open()?;
		Ok(self.chain.lock().block(hash).map(|block| block.header.clone()))
	}

	async fn block(&self, hash: H256) -> Result<Option<SignedBlock>, RpcError> {
		self.ensure_open()?;
		Ok(self.chain.lock().block(Some(hash)).map(|block| SignedBlock {
			block: Block {
				header: block.header.clone(),
				extrinsics: block.extrinsics.iter().cloned().map(Bytes).collect(),
			},
		}))
	}

	async fn storage(&self, key: &[u8], at: Option<H256>) -> Result<Option<Vec<u8>>, RpcError> {
		self.ensure_open()?;
		let chain = self.chain.lock();
		let block = chain.block(at).ok_or_else(|| RpcError::Call(format!("unknown block {at:?}")))?;
		Ok(block.storage.get(key).or_else(|| chain.storage.get(key)).cloned())
	}

	async fn subscribe_finalized_heads(&self) -> Result<RpcStream<Header>, RpcError> {
		self.ensure_open()?;
		let (sender, receiver) = mpsc::unbounded();
		let mut chain = self.chain.lock();
		if let Some(block) = chain.blocks.last() {
			let _ = sender.unbounded_send(block.header.clone());
		}
		chain.subscribers.push(sender);
		Ok(receiver.map(Ok).boxed())
	}

	async fn submit_and_watch(
		&self,
		extrinsic: &[u8],
	) -> Result<RpcStream<TransactionStatus>, RpcError> {
		self.ensure_open()?;
		let mut chain = self.chain.lock();
		chain.submitted.push(extrinsic.to_vec());
		let statuses = match chain.submit.clone() {
			SubmitBehavior::Reject(reason) => return Err(RpcError::Call(reason)),
			SubmitBehavior::Statuses(statuses) => statuses,
			SubmitBehavior::Include { events } => {
				let records = events.into_iter().map(|event| fixtures::record(1, event)).collect();
				let hash = chain.push_block(vec![vec![4, 0], extrinsic.to_vec()], records);
				vec![TransactionStatus::Ready, TransactionStatus::InBlock(hash)]
			},
		};
		Ok(futures::stream::iter(statuses.into_iter().map(Ok)).boxed())
	}

	async fn close(&self) {
		self.closes.fetch_add(1, Ordering::SeqCst);
		self.chain.lock().subscribers.clear();
	}
}
