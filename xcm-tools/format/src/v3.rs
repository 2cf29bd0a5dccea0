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

//! Version 3 of the Cross-Consensus Message format data structures.

use crate::{
	table::{InstructionTable, Opcode},
	wire::{CodecError, Reader, WireDecode},
	DoubleEncoded,
};
use codec::Encode;
use serde::Serialize;

pub use crate::common::{BodyPart, OriginKind, WildFungibility};

/// Maximum length of an encoded dispatch error kept by [`MaybeErrorCode`].
pub const MAX_DISPATCH_ERROR_LEN: usize = 128;
/// Maximum length of pallet and module names in [`PalletInfo`].
pub const MAX_PALLET_NAME_LEN: usize = 48;
/// Maximum number of pallets reported by [`Response::PalletsInfo`].
pub const MAX_PALLETS_INFO: usize = 64;

/// A global identifier of a data structure existing within consensus.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum NetworkId {
	/// Network specified by the first 32 bytes of its genesis block.
	ByGenesis(#[serde(serialize_with = "crate::hex::serialize")] [u8; 32]),
	/// Network defined by the first 32-bytes of the hash and number of some block it contains.
	ByFork {
		block_number: u64,
		#[serde(serialize_with = "crate::hex::serialize")]
		block_hash: [u8; 32],
	},
	Polkadot,
	Kusama,
	Westend,
	Rococo,
	Wococo,
	/// An Ethereum network specified by its chain ID.
	Ethereum {
		#[codec(compact)]
		chain_id: u64,
	},
	BitcoinCore,
	BitcoinCash,
	PolkadotBulletin,
}

impl WireDecode for NetworkId {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => NetworkId::ByGenesis(reader.read_array()?),
			1 => NetworkId::ByFork { block_number: reader.read_u64()?, block_hash: reader.read_array()? },
			2 => NetworkId::Polkadot,
			3 => NetworkId::Kusama,
			4 => NetworkId::Westend,
			5 => NetworkId::Rococo,
			6 => NetworkId::Wococo,
			7 => NetworkId::Ethereum { chain_id: reader.read_compact_u64()? },
			8 => NetworkId::BitcoinCore,
			9 => NetworkId::BitcoinCash,
			10 => NetworkId::PolkadotBulletin,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::NetworkId", tag }),
		})
	}
}

/// An identifier of a pluralistic body.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum BodyId {
	Unit,
	Moniker([u8; 4]),
	Index(#[codec(compact)] u32),
	Executive,
	Technical,
	Legislative,
	Judicial,
	Defense,
	Administration,
	Treasury,
}

impl WireDecode for BodyId {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => BodyId::Unit,
			1 => BodyId::Moniker(reader.read_array()?),
			2 => BodyId::Index(reader.read_compact_u32()?),
			3 => BodyId::Executive,
			4 => BodyId::Technical,
			5 => BodyId::Legislative,
			6 => BodyId::Judicial,
			7 => BodyId::Defense,
			8 => BodyId::Administration,
			9 => BodyId::Treasury,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::BodyId", tag }),
		})
	}
}

/// A single item in a path to describe the relative location of a consensus system.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Junction {
	Parachain(#[codec(compact)] u32),
	AccountId32 {
		network: Option<NetworkId>,
		#[serde(serialize_with = "crate::hex::serialize")]
		id: [u8; 32],
	},
	AccountIndex64 {
		network: Option<NetworkId>,
		#[codec(compact)]
		index: u64,
	},
	AccountKey20 {
		network: Option<NetworkId>,
		#[serde(serialize_with = "crate::hex::serialize")]
		key: [u8; 20],
	},
	PalletInstance(u8),
	GeneralIndex(#[codec(compact)] u128),
	/// A nondescript array datum, `length` bytes of `data` are significant.
	GeneralKey {
		length: u8,
		#[serde(serialize_with = "crate::hex::serialize")]
		data: [u8; 32],
	},
	OnlyChild,
	Plurality { id: BodyId, part: BodyPart },
	GlobalConsensus(NetworkId),
}

impl WireDecode for Junction {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => Junction::Parachain(reader.read_compact_u32()?),
			1 => Junction::AccountId32 {
				network: Option::decode_from(reader)?,
				id: reader.read_array()?,
			},
			2 => Junction::AccountIndex64 {
				network: Option::decode_from(reader)?,
				index: reader.read_compact_u64()?,
			},
			3 => Junction::AccountKey20 {
				network: Option::decode_from(reader)?,
				key: reader.read_array()?,
			},
			4 => Junction::PalletInstance(reader.read_u8()?),
			5 => Junction::GeneralIndex(reader.read_compact_u128()?),
			6 => Junction::GeneralKey { length: reader.read_u8()?, data: reader.read_array()? },
			7 => Junction::OnlyChild,
			8 => Junction::Plurality {
				id: BodyId::decode_from(reader)?,
				part: BodyPart::decode_from(reader)?,
			},
			9 => Junction::GlobalConsensus(NetworkId::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::Junction", tag }),
		})
	}
}

pub type Junctions = crate::location::Junctions<Junction>;
pub type InteriorMultiLocation = Junctions;
pub type MultiLocation = crate::location::MultiLocation<Junction>;

/// A general identifier for an instance of a non-fungible asset class.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum AssetInstance {
	Undefined,
	Index(#[codec(compact)] u128),
	Array4([u8; 4]),
	Array8([u8; 8]),
	Array16([u8; 16]),
	Array32(#[serde(serialize_with = "crate::hex::serialize")] [u8; 32]),
}

impl WireDecode for AssetInstance {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => AssetInstance::Undefined,
			1 => AssetInstance::Index(reader.read_compact_u128()?),
			2 => AssetInstance::Array4(reader.read_array()?),
			3 => AssetInstance::Array8(reader.read_array()?),
			4 => AssetInstance::Array16(reader.read_array()?),
			5 => AssetInstance::Array32(reader.read_array()?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::AssetInstance", tag }),
		})
	}
}

/// Classification of an asset being concrete or abstract.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum AssetId {
	Concrete(MultiLocation),
	Abstract(#[serde(serialize_with = "crate::hex::serialize")] [u8; 32]),
}

impl WireDecode for AssetId {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => AssetId::Concrete(MultiLocation::decode_from(reader)?),
			1 => AssetId::Abstract(reader.read_array()?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::AssetId", tag }),
		})
	}
}

/// Classification of whether an asset is fungible or not, along with a mandatory amount or
/// instance.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Fungibility {
	Fungible(#[codec(compact)] u128),
	NonFungible(AssetInstance),
}

impl WireDecode for Fungibility {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => Fungibility::Fungible(reader.read_compact_u128()?),
			1 => Fungibility::NonFungible(AssetInstance::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::Fungibility", tag }),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub struct MultiAsset {
	pub id: AssetId,
	pub fun: Fungibility,
}

impl WireDecode for MultiAsset {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(MultiAsset { id: AssetId::decode_from(reader)?, fun: Fungibility::decode_from(reader)? })
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Encode, Serialize)]
#[serde(transparent)]
pub struct MultiAssets(pub Vec<MultiAsset>);

impl WireDecode for MultiAssets {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Vec::decode_from(reader).map(MultiAssets)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum WildMultiAsset {
	All,
	AllOf { id: AssetId, fun: WildFungibility },
	AllCounted(#[codec(compact)] u32),
	AllOfCounted {
		id: AssetId,
		fun: WildFungibility,
		#[codec(compact)]
		count: u32,
	},
}

impl WireDecode for WildMultiAsset {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => WildMultiAsset::All,
			1 => WildMultiAsset::AllOf {
				id: AssetId::decode_from(reader)?,
				fun: WildFungibility::decode_from(reader)?,
			},
			2 => WildMultiAsset::AllCounted(reader.read_compact_u32()?),
			3 => WildMultiAsset::AllOfCounted {
				id: AssetId::decode_from(reader)?,
				fun: WildFungibility::decode_from(reader)?,
				count: reader.read_compact_u32()?,
			},
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::WildMultiAsset", tag }),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum MultiAssetFilter {
	Definite(MultiAssets),
	Wild(WildMultiAsset),
}

impl WireDecode for MultiAssetFilter {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => MultiAssetFilter::Definite(MultiAssets::decode_from(reader)?),
			1 => MultiAssetFilter::Wild(WildMultiAsset::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::MultiAssetFilter", tag }),
		})
	}
}

/// Two dimensional weight: computation time and proof size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Encode, Serialize)]
pub struct Weight {
	#[codec(compact)]
	pub ref_time: u64,
	#[codec(compact)]
	pub proof_size: u64,
}

impl Weight {
	pub const fn from_parts(ref_time: u64, proof_size: u64) -> Self {
		Weight { ref_time, proof_size }
	}
}

impl WireDecode for Weight {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(Weight { ref_time: reader.read_compact_u64()?, proof_size: reader.read_compact_u64()? })
	}
}

/// An optional weight limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum WeightLimit {
	Unlimited,
	Limited(Weight),
}

impl WireDecode for WeightLimit {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => WeightLimit::Unlimited,
			1 => WeightLimit::Limited(Weight::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::WeightLimit", tag }),
		})
	}
}

/// Error codes used in XCM v3 and v4.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Error {
	Overflow,
	Unimplemented,
	UntrustedReserveLocation,
	UntrustedTeleportLocation,
	LocationFull,
	LocationNotInvertible,
	BadOrigin,
	InvalidLocation,
	AssetNotFound,
	FailedToTransactAsset,
	NotWithdrawable,
	LocationCannotHold,
	ExceedsMaxMessageSize,
	DestinationUnsupported,
	/// The reason string is never part of the encoding.
	Transport,
	Unroutable,
	UnknownClaim,
	FailedToDecode,
	MaxWeightInvalid,
	NotHoldingFees,
	TooExpensive,
	Trap(u64),
	ExpectationFalse,
	PalletNotFound,
	NameMismatch,
	VersionIncompatible,
	HoldingWouldOverflow,
	ExportError,
	ReanchorFailed,
	NoDeal,
	FeesNotMet,
	LockError,
	NoPermission,
	Unanchored,
	NotDepositable,
	UnhandledXcmVersion,
	WeightLimitReached(Weight),
	Barrier,
	WeightNotComputable,
	ExceedsStackLimit,
}

impl WireDecode for Error {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		use Error::*;
		Ok(match reader.read_u8()? {
			0 => Overflow,
			1 => Unimplemented,
			2 => UntrustedReserveLocation,
			3 => UntrustedTeleportLocation,
			4 => LocationFull,
			5 => LocationNotInvertible,
			6 => BadOrigin,
			7 => InvalidLocation,
			8 => AssetNotFound,
			9 => FailedToTransactAsset,
			10 => NotWithdrawable,
			11 => LocationCannotHold,
			12 => ExceedsMaxMessageSize,
			13 => DestinationUnsupported,
			14 => Transport,
			15 => Unroutable,
			16 => UnknownClaim,
			17 => FailedToDecode,
			18 => MaxWeightInvalid,
			19 => NotHoldingFees,
			20 => TooExpensive,
			21 => Trap(reader.read_u64()?),
			22 => ExpectationFalse,
			23 => PalletNotFound,
			24 => NameMismatch,
			25 => VersionIncompatible,
			26 => HoldingWouldOverflow,
			27 => ExportError,
			28 => ReanchorFailed,
			29 => NoDeal,
			30 => FeesNotMet,
			31 => LockError,
			32 => NoPermission,
			33 => Unanchored,
			34 => NotDepositable,
			35 => UnhandledXcmVersion,
			36 => WeightLimitReached(Weight::decode_from(reader)?),
			37 => Barrier,
			38 => WeightNotComputable,
			39 => ExceedsStackLimit,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::Error", tag }),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum MaybeErrorCode {
	Success,
	Error(#[serde(serialize_with = "crate::hex::serialize")] Vec<u8>),
	TruncatedError(#[serde(serialize_with = "crate::hex::serialize")] Vec<u8>),
}

impl WireDecode for MaybeErrorCode {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => MaybeErrorCode::Success,
			1 => MaybeErrorCode::Error(
				reader.read_bounded_vec("MaybeErrorCode::Error", MAX_DISPATCH_ERROR_LEN)?,
			),
			2 => MaybeErrorCode::TruncatedError(
				reader.read_bounded_vec("MaybeErrorCode::TruncatedError", MAX_DISPATCH_ERROR_LEN)?,
			),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "MaybeErrorCode", tag }),
		})
	}
}

/// Information regarding the composition of a pallet.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub struct PalletInfo {
	#[codec(compact)]
	pub index: u32,
	#[serde(serialize_with = "crate::hex::serialize")]
	pub name: Vec<u8>,
	#[serde(serialize_with = "crate::hex::serialize")]
	pub module_name: Vec<u8>,
	#[codec(compact)]
	pub major: u32,
	#[codec(compact)]
	pub minor: u32,
	#[codec(compact)]
	pub patch: u32,
}

impl WireDecode for PalletInfo {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(PalletInfo {
			index: reader.read_compact_u32()?,
			name: reader.read_bounded_vec("PalletInfo::name", MAX_PALLET_NAME_LEN)?,
			module_name: reader.read_bounded_vec("PalletInfo::module_name", MAX_PALLET_NAME_LEN)?,
			major: reader.read_compact_u32()?,
			minor: reader.read_compact_u32()?,
			patch: reader.read_compact_u32()?,
		})
	}
}

/// Decode the bounded list of [`Response::PalletsInfo`].
pub(crate) fn decode_pallets_info(reader: &mut Reader<'_>) -> Result<Vec<PalletInfo>, CodecError> {
	let pallets = Vec::<PalletInfo>::decode_from(reader)?;
	if pallets.len() > MAX_PALLETS_INFO {
		return Err(CodecError::BoundExceeded {
			ty: "Response::PalletsInfo",
			len: pallets.len(),
			max: MAX_PALLETS_INFO,
		})
	}
	Ok(pallets)
}

/// Response data to a query.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Response {
	Null,
	Assets(MultiAssets),
	ExecutionResult(Option<(u32, Error)>),
	Version(u32),
	PalletsInfo(Vec<PalletInfo>),
	DispatchResult(MaybeErrorCode),
}

impl WireDecode for Response {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => Response::Null,
			1 => Response::Assets(MultiAssets::decode_from(reader)?),
			2 => Response::ExecutionResult(Option::decode_from(reader)?),
			3 => Response::Version(reader.read_u32()?),
			4 => Response::PalletsInfo(decode_pallets_info(reader)?),
			5 => Response::DispatchResult(MaybeErrorCode::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v3::Response", tag }),
		})
	}
}

/// Information regarding the composition of a query response.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub struct QueryResponseInfo {
	pub destination: MultiLocation,
	#[codec(compact)]
	pub query_id: u64,
	pub max_weight: Weight,
}

impl WireDecode for QueryResponseInfo {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(QueryResponseInfo {
			destination: MultiLocation::decode_from(reader)?,
			query_id: reader.read_compact_u64()?,
			max_weight: Weight::decode_from(reader)?,
		})
	}
}

/// Cross-Consensus Message: a series of instructions to be executed in order.
#[derive(Clone, Debug, PartialEq, Eq, Default, Encode, Serialize)]
#[serde(transparent)]
pub struct Xcm(pub Vec<Instruction>);

impl WireDecode for Xcm {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		reader.nested(|reader| {
			let len = reader.read_compact_u32()?;
			reader.count_instructions(len)?;
			(0..len).map(|_| INSTRUCTIONS.decode(reader)).collect::<Result<Vec<_>, _>>().map(Xcm)
		})
	}
}

/// Cross-Consensus Message instructions of XCM v3.
///
/// The position of a variant is its opcode; [`INSTRUCTIONS`] must list the same order.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Instruction {
	WithdrawAsset(MultiAssets),
	ReserveAssetDeposited(MultiAssets),
	ReceiveTeleportedAsset(MultiAssets),
	QueryResponse {
		#[codec(compact)]
		query_id: u64,
		response: Response,
		max_weight: Weight,
		querier: Option<MultiLocation>,
	},
	TransferAsset { assets: MultiAssets, beneficiary: MultiLocation },
	TransferReserveAsset { assets: MultiAssets, dest: MultiLocation, xcm: Xcm },
	Transact { origin_kind: OriginKind, require_weight_at_most: Weight, call: DoubleEncoded },
	HrmpNewChannelOpenRequest {
		#[codec(compact)]
		sender: u32,
		#[codec(compact)]
		max_message_size: u32,
		#[codec(compact)]
		max_capacity: u32,
	},
	HrmpChannelAccepted {
		#[codec(compact)]
		recipient: u32,
	},
	HrmpChannelClosing {
		#[codec(compact)]
		initiator: u32,
		#[codec(compact)]
		sender: u32,
		#[codec(compact)]
		recipient: u32,
	},
	ClearOrigin,
	DescendOrigin(InteriorMultiLocation),
	ReportError(QueryResponseInfo),
	DepositAsset { assets: MultiAssetFilter, beneficiary: MultiLocation },
	DepositReserveAsset { assets: MultiAssetFilter, dest: MultiLocation, xcm: Xcm },
	ExchangeAsset { give: MultiAssetFilter, want: MultiAssets, maximal: bool },
	InitiateReserveWithdraw { assets: MultiAssetFilter, reserve: MultiLocation, xcm: Xcm },
	InitiateTeleport { assets: MultiAssetFilter, dest: MultiLocation, xcm: Xcm },
	ReportHolding { response_info: QueryResponseInfo, assets: MultiAssetFilter },
	BuyExecution { fees: MultiAsset, weight_limit: WeightLimit },
	RefundSurplus,
	SetErrorHandler(Xcm),
	SetAppendix(Xcm),
	ClearError,
	ClaimAsset { assets: MultiAssets, ticket: MultiLocation },
	Trap(#[codec(compact)] u64),
	SubscribeVersion {
		#[codec(compact)]
		query_id: u64,
		max_response_weight: Weight,
	},
	UnsubscribeVersion,
	BurnAsset(MultiAssets),
	ExpectAsset(MultiAssets),
	ExpectOrigin(Option<MultiLocation>),
	ExpectError(Option<(u32, Error)>),
	ExpectTransactStatus(MaybeErrorCode),
	QueryPallet {
		#[serde(serialize_with = "crate::hex::serialize")]
		module_name: Vec<u8>,
		response_info: QueryResponseInfo,
	},
	ExpectPallet {
		#[codec(compact)]
		index: u32,
		#[serde(serialize_with = "crate::hex::serialize")]
		name: Vec<u8>,
		#[serde(serialize_with = "crate::hex::serialize")]
		module_name: Vec<u8>,
		#[codec(compact)]
		crate_major: u32,
		#[codec(compact)]
		min_crate_minor: u32,
	},
	ReportTransactStatus(QueryResponseInfo),
	ClearTransactStatus,
	UniversalOrigin(Junction),
	ExportMessage { network: NetworkId, destination: InteriorMultiLocation, xcm: Xcm },
	LockAsset { asset: MultiAsset, unlocker: MultiLocation },
	UnlockAsset { asset: MultiAsset, target: MultiLocation },
	NoteUnlockable { asset: MultiAsset, owner: MultiLocation },
	RequestUnlock { asset: MultiAsset, locker: MultiLocation },
	SetFeesMode { jit_withdraw: bool },
	SetTopic(#[serde(serialize_with = "crate::hex::serialize")] [u8; 32]),
	ClearTopic,
	AliasOrigin(MultiLocation),
	UnpaidExecution { weight_limit: WeightLimit, check_origin: Option<MultiLocation> },
}

impl Instruction {
	/// Opcode of this instruction within XCM v3.
	pub fn opcode(&self) -> u8 {
		self.using_encoded(|bytes| bytes[0])
	}

	pub fn name(&self) -> &'static str {
		INSTRUCTIONS.name(self.opcode()).unwrap_or("Unknown")
	}
}

/// Opcode table of XCM v3.
pub static INSTRUCTIONS: InstructionTable<Instruction> = InstructionTable {
	version: 3,
	ty: "v3::Instruction",
	opcodes: &[
		Opcode {
			index: 0,
			name: "WithdrawAsset",
			decode: |r| Ok(Instruction::WithdrawAsset(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 1,
			name: "ReserveAssetDeposited",
			decode: |r| Ok(Instruction::ReserveAssetDeposited(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 2,
			name: "ReceiveTeleportedAsset",
			decode: |r| Ok(Instruction::ReceiveTeleportedAsset(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 3,
			name: "QueryResponse",
			decode: |r| {
				Ok(Instruction::QueryResponse {
					query_id: r.read_compact_u64()?,
					response: WireDecode::decode_from(r)?,
					max_weight: WireDecode::decode_from(r)?,
					querier: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 4,
			name: "TransferAsset",
			decode: |r| {
				Ok(Instruction::TransferAsset {
					assets: WireDecode::decode_from(r)?,
					beneficiary: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 5,
			name: "TransferReserveAsset",
			decode: |r| {
				Ok(Instruction::TransferReserveAsset {
					assets: WireDecode::decode_from(r)?,
					dest: WireDecode::decode_from(r)?,
					xcm: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 6,
			name: "Transact",
			decode: |r| {
				Ok(Instruction::Transact {
					origin_kind: WireDecode::decode_from(r)?,
					require_weight_at_most: WireDecode::decode_from(r)?,
					call: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 7,
			name: "HrmpNewChannelOpenRequest",
			decode: |r| {
				Ok(Instruction::HrmpNewChannelOpenRequest {
					sender: r.read_compact_u32()?,
					max_message_size: r.read_compact_u32()?,
					max_capacity: r.read_compact_u32()?,
				})
			},
		},
		Opcode {
			index: 8,
			name: "HrmpChannelAccepted",
			decode: |r| Ok(Instruction::HrmpChannelAccepted { recipient: r.read_compact_u32()? }),
		},
		Opcode {
			index: 9,
			name: "HrmpChannelClosing",
			decode: |r| {
				Ok(Instruction::HrmpChannelClosing {
					initiator: r.read_compact_u32()?,
					sender: r.read_compact_u32()?,
					recipient: r.read_compact_u32()?,
				})
			},
		},
		Opcode { index: 10, name: "ClearOrigin", decode: |_| Ok(Instruction::ClearOrigin) },
		Opcode {
			index: 11,
			name: "DescendOrigin",
			decode: |r| Ok(Instruction::DescendOrigin(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 12,
			name: "ReportError",
			decode: |r| Ok(Instruction::ReportError(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 13,
			name: "DepositAsset",
			decode: |r| {
				Ok(Instruction::DepositAsset {
					assets: WireDecode::decode_from(r)?,
					beneficiary: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 14,
			name: "DepositReserveAsset",
			decode: |r| {
				Ok(Instruction::DepositReserveAsset {
					assets: WireDecode::decode_from(r)?,
					dest: WireDecode::decode_from(r)?,
					xcm: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 15,
			name: "ExchangeAsset",
			decode: |r| {
				Ok(Instruction::ExchangeAsset {
					give: WireDecode::decode_from(r)?,
					want: WireDecode::decode_from(r)?,
					maximal: r.read_bool()?,
				})
			},
		},
		Opcode {
			index: 16,
			name: "InitiateReserveWithdraw",
			decode: |r| {
				Ok(Instruction::InitiateReserveWithdraw {
					assets: WireDecode::decode_from(r)?,
					reserve: WireDecode::decode_from(r)?,
					xcm: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 17,
			name: "InitiateTeleport",
			decode: |r| {
				Ok(Instruction::InitiateTeleport {
					assets: WireDecode::decode_from(r)?,
					dest: WireDecode::decode_from(r)?,
					xcm: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 18,
			name: "ReportHolding",
			decode: |r| {
				Ok(Instruction::ReportHolding {
					response_info: WireDecode::decode_from(r)?,
					assets: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 19,
			name: "BuyExecution",
			decode: |r| {
				Ok(Instruction::BuyExecution {
					fees: WireDecode::decode_from(r)?,
					weight_limit: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode { index: 20, name: "RefundSurplus", decode: |_| Ok(Instruction::RefundSurplus) },
		Opcode {
			index: 21,
			name: "SetErrorHandler",
			decode: |r| Ok(Instruction::SetErrorHandler(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 22,
			name: "SetAppendix",
			decode: |r| Ok(Instruction::SetAppendix(WireDecode::decode_from(r)?)),
		},
		Opcode { index: 23, name: "ClearError", decode: |_| Ok(Instruction::ClearError) },
		Opcode {
			index: 24,
			name: "ClaimAsset",
			decode: |r| {
				Ok(Instruction::ClaimAsset {
					assets: WireDecode::decode_from(r)?,
					ticket: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode { index: 25, name: "Trap", decode: |r| Ok(Instruction::Trap(r.read_compact_u64()?)) },
		Opcode {
			index: 26,
			name: "SubscribeVersion",
			decode: |r| {
				Ok(Instruction::SubscribeVersion {
					query_id: r.read_compact_u64()?,
					max_response_weight: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode { index: 27, name: "UnsubscribeVersion", decode: |_| Ok(Instruction::UnsubscribeVersion) },
		Opcode {
			index: 28,
			name: "BurnAsset",
			decode: |r| Ok(Instruction::BurnAsset(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 29,
			name: "ExpectAsset",
			decode: |r| Ok(Instruction::ExpectAsset(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 30,
			name: "ExpectOrigin",
			decode: |r| Ok(Instruction::ExpectOrigin(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 31,
			name: "ExpectError",
			decode: |r| Ok(Instruction::ExpectError(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 32,
			name: "ExpectTransactStatus",
			decode: |r| Ok(Instruction::ExpectTransactStatus(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 33,
			name: "QueryPallet",
			decode: |r| {
				Ok(Instruction::QueryPallet {
					module_name: r.read_vec()?,
					response_info: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 34,
			name: "ExpectPallet",
			decode: |r| {
				Ok(Instruction::ExpectPallet {
					index: r.read_compact_u32()?,
					name: r.read_vec()?,
					module_name: r.read_vec()?,
					crate_major: r.read_compact_u32()?,
					min_crate_minor: r.read_compact_u32()?,
				})
			},
		},
		Opcode {
			index: 35,
			name: "ReportTransactStatus",
			decode: |r| Ok(Instruction::ReportTransactStatus(WireDecode::decode_from(r)?)),
		},
		Opcode { index: 36, name: "ClearTransactStatus", decode: |_| Ok(Instruction::ClearTransactStatus) },
		Opcode {
			index: 37,
			name: "UniversalOrigin",
			decode: |r| Ok(Instruction::UniversalOrigin(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 38,
			name: "ExportMessage",
			decode: |r| {
				Ok(Instruction::ExportMessage {
					network: WireDecode::decode_from(r)?,
					destination: WireDecode::decode_from(r)?,
					xcm: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 39,
			name: "LockAsset",
			decode: |r| {
				Ok(Instruction::LockAsset {
					asset: WireDecode::decode_from(r)?,
					unlocker: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 40,
			name: "UnlockAsset",
			decode: |r| {
				Ok(Instruction::UnlockAsset {
					asset: WireDecode::decode_from(r)?,
					target: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 41,
			name: "NoteUnlockable",
			decode: |r| {
				Ok(Instruction::NoteUnlockable {
					asset: WireDecode::decode_from(r)?,
					owner: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 42,
			name: "RequestUnlock",
			decode: |r| {
				Ok(Instruction::RequestUnlock {
					asset: WireDecode::decode_from(r)?,
					locker: WireDecode::decode_from(r)?,
				})
			},
		},
		Opcode {
			index: 43,
			name: "SetFeesMode",
			decode: |r| Ok(Instruction::SetFeesMode { jit_withdraw: r.read_bool()? }),
		},
		Opcode { index: 44, name: "SetTopic", decode: |r| Ok(Instruction::SetTopic(r.read_array()?)) },
		Opcode { index: 45, name: "ClearTopic", decode: |_| Ok(Instruction::ClearTopic) },
		Opcode {
			index: 46,
			name: "AliasOrigin",
			decode: |r| Ok(Instruction::AliasOrigin(WireDecode::decode_from(r)?)),
		},
		Opcode {
			index: 47,
			name: "UnpaidExecution",
			decode: |r| {
				Ok(Instruction::UnpaidExecution {
					weight_limit: WireDecode::decode_from(r)?,
					check_origin: WireDecode::decode_from(r)?,
				})
			},
		},
	],
};

#[cfg(test)]
mod tests {
	use super::*;
	use crate::location::Junctions as GenericJunctions;
	use assert_matches::assert_matches;

	fn relay_token(amount: u128) -> MultiAsset {
		MultiAsset { id: AssetId::Concrete(MultiLocation::parent()), fun: Fungibility::Fungible(amount) }
	}

	#[test]
	fn opcode_table_is_dense() {
		assert_eq!(INSTRUCTIONS.len(), 48);
		for (position, opcode) in INSTRUCTIONS.opcodes.iter().enumerate() {
			assert_eq!(usize::from(opcode.index), position, "{}", opcode.name);
		}
	}

	#[test]
	fn withdraw_asset_matches_known_encoding() {
		let program = Xcm(vec![Instruction::WithdrawAsset(MultiAssets(vec![relay_token(10)]))]);
		// len, opcode, assets len, Concrete, parents, Here, Fungible, compact(10).
		let expected = [4, 0, 4, 0, 1, 0, 0, 40];
		assert_eq!(program.encode(), expected);
		assert_eq!(Xcm::decode_exact(&expected), Ok(program));
	}

	#[test]
	fn deposit_asset_has_no_max_assets() {
		let deposit = Instruction::DepositAsset {
			assets: MultiAssetFilter::Wild(WildMultiAsset::AllCounted(1)),
			beneficiary: MultiLocation::new(
				0,
				GenericJunctions::x1(Junction::AccountId32 { network: None, id: [7; 32] }),
			),
		};
		let encoded = deposit.encode();
		// opcode, Wild, AllCounted, count, beneficiary parents.
		assert_eq!(&encoded[..5], &[13, 1, 2, 4, 0]);
		assert_eq!(Xcm::decode_exact(&Xcm(vec![deposit.clone()]).encode()), Ok(Xcm(vec![deposit])));
	}

	#[test]
	fn full_instruction_set_roundtrips() {
		let here = MultiLocation::here();
		let info = QueryResponseInfo {
			destination: MultiLocation::parent(),
			query_id: 1 << 40,
			max_weight: Weight::from_parts(1_000_000_000, 65_536),
		};
		let program = Xcm(vec![
			Instruction::ReserveAssetDeposited(MultiAssets(vec![relay_token(u128::MAX)])),
			Instruction::QueryResponse {
				query_id: 3,
				response: Response::ExecutionResult(Some((2, Error::WeightLimitReached(Weight::from_parts(5, 6))))),
				max_weight: Weight::default(),
				querier: Some(here.clone()),
			},
			Instruction::ReportHolding {
				response_info: info.clone(),
				assets: MultiAssetFilter::Definite(MultiAssets(vec![relay_token(1)])),
			},
			Instruction::ExchangeAsset {
				give: MultiAssetFilter::Wild(WildMultiAsset::All),
				want: MultiAssets(vec![relay_token(2)]),
				maximal: true,
			},
			Instruction::ExpectTransactStatus(MaybeErrorCode::Error(vec![1, 2, 3])),
			Instruction::QueryPallet { module_name: b"pallet_xcm".to_vec(), response_info: info },
			Instruction::UniversalOrigin(Junction::GlobalConsensus(NetworkId::Ethereum { chain_id: 1 })),
			Instruction::ExportMessage {
				network: NetworkId::ByFork { block_number: 9, block_hash: [9; 32] },
				destination: GenericJunctions::x1(Junction::Parachain(1000)),
				xcm: Xcm(vec![Instruction::ClearTopic]),
			},
			Instruction::LockAsset { asset: relay_token(3), unlocker: here.clone() },
			Instruction::SetTopic([0xab; 32]),
			Instruction::SetErrorHandler(Xcm(vec![Instruction::SetAppendix(Xcm(vec![
				Instruction::RefundSurplus,
			]))])),
			Instruction::UnpaidExecution { weight_limit: WeightLimit::Unlimited, check_origin: None },
		]);
		assert_eq!(Xcm::decode_exact(&program.encode()), Ok(program));
	}

	#[test]
	fn unknown_instruction_is_rejected() {
		assert_matches!(
			Xcm::decode_exact(&[4, 48]),
			Err(CodecError::InvalidDiscriminant { ty: "v3::Instruction", tag: 48 })
		);
	}

	#[test]
	fn excessive_instruction_count_is_rejected() {
		let mut bytes = codec::Compact(101u32).encode();
		bytes.extend([10u8; 101]);
		assert_matches!(Xcm::decode_exact(&bytes), Err(CodecError::TooManyInstructions(100)));
	}
}
