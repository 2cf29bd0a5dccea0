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

//! Version 2 of the Cross-Consensus Message format data structures.

use crate::{
	table::{InstructionTable, Opcode},
	v3,
	wire::{CodecError, Reader, WireDecode},
	ConversionError, DoubleEncoded,
};
use codec::Encode;
use serde::Serialize;

pub use crate::common::{BodyPart, OriginKind, WildFungibility};

/// Maximum length of named identifiers (`NetworkId::Named`, `GeneralKey`, `BodyId::Named`).
pub const MAX_NAME_LEN: usize = 32;

/// A global identifier of an account-bearing consensus system.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum NetworkId {
	/// Unidentified/any.
	Any,
	/// Some named network.
	Named(#[serde(serialize_with = "crate::hex::serialize")] Vec<u8>),
	Polkadot,
	Kusama,
}

impl WireDecode for NetworkId {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => NetworkId::Any,
			1 => NetworkId::Named(reader.read_bounded_vec("v2::NetworkId::Named", MAX_NAME_LEN)?),
			2 => NetworkId::Polkadot,
			3 => NetworkId::Kusama,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::NetworkId", tag }),
		})
	}
}

/// An identifier of a pluralistic body.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum BodyId {
	Unit,
	Named(#[serde(serialize_with = "crate::hex::serialize")] Vec<u8>),
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
			1 => BodyId::Named(reader.read_bounded_vec("v2::BodyId::Named", MAX_NAME_LEN)?),
			2 => BodyId::Index(reader.read_compact_u32()?),
			3 => BodyId::Executive,
			4 => BodyId::Technical,
			5 => BodyId::Legislative,
			6 => BodyId::Judicial,
			7 => BodyId::Defense,
			8 => BodyId::Administration,
			9 => BodyId::Treasury,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::BodyId", tag }),
		})
	}
}

/// A single item in a path to describe the relative location of a consensus system.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Junction {
	Parachain(#[codec(compact)] u32),
	AccountId32 {
		network: NetworkId,
		#[serde(serialize_with = "crate::hex::serialize")]
		id: [u8; 32],
	},
	AccountIndex64 {
		network: NetworkId,
		#[codec(compact)]
		index: u64,
	},
	AccountKey20 {
		network: NetworkId,
		#[serde(serialize_with = "crate::hex::serialize")]
		key: [u8; 20],
	},
	PalletInstance(u8),
	GeneralIndex(#[codec(compact)] u128),
	GeneralKey(#[serde(serialize_with = "crate::hex::serialize")] Vec<u8>),
	OnlyChild,
	Plurality { id: BodyId, part: BodyPart },
}

impl WireDecode for Junction {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => Junction::Parachain(reader.read_compact_u32()?),
			1 => Junction::AccountId32 {
				network: NetworkId::decode_from(reader)?,
				id: reader.read_array()?,
			},
			2 => Junction::AccountIndex64 {
				network: NetworkId::decode_from(reader)?,
				index: reader.read_compact_u64()?,
			},
			3 => Junction::AccountKey20 {
				network: NetworkId::decode_from(reader)?,
				key: reader.read_array()?,
			},
			4 => Junction::PalletInstance(reader.read_u8()?),
			5 => Junction::GeneralIndex(reader.read_compact_u128()?),
			6 => Junction::GeneralKey(reader.read_bounded_vec("v2::Junction::GeneralKey", MAX_NAME_LEN)?),
			7 => Junction::OnlyChild,
			8 => Junction::Plurality {
				id: BodyId::decode_from(reader)?,
				part: BodyPart::decode_from(reader)?,
			},
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::Junction", tag }),
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
	Blob(#[serde(serialize_with = "crate::hex::serialize")] Vec<u8>),
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
			6 => AssetInstance::Blob(reader.read_vec()?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::AssetInstance", tag }),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum AssetId {
	Concrete(MultiLocation),
	Abstract(#[serde(serialize_with = "crate::hex::serialize")] Vec<u8>),
}

impl WireDecode for AssetId {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => AssetId::Concrete(MultiLocation::decode_from(reader)?),
			1 => AssetId::Abstract(reader.read_vec()?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::AssetId", tag }),
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
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::Fungibility", tag }),
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
}

impl WireDecode for WildMultiAsset {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => WildMultiAsset::All,
			1 => WildMultiAsset::AllOf {
				id: AssetId::decode_from(reader)?,
				fun: WildFungibility::decode_from(reader)?,
			},
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::WildMultiAsset", tag }),
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
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::MultiAssetFilter", tag }),
		})
	}
}

/// Error codes used in XCM v2.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Error {
	Overflow,
	Unimplemented,
	UntrustedReserveLocation,
	UntrustedTeleportLocation,
	MultiLocationFull,
	MultiLocationNotInvertible,
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
	UnhandledXcmVersion,
	WeightLimitReached(u64),
	Barrier,
	WeightNotComputable,
}

impl WireDecode for Error {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		use Error::*;
		Ok(match reader.read_u8()? {
			0 => Overflow,
			1 => Unimplemented,
			2 => UntrustedReserveLocation,
			3 => UntrustedTeleportLocation,
			4 => MultiLocationFull,
			5 => MultiLocationNotInvertible,
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
			22 => UnhandledXcmVersion,
			23 => WeightLimitReached(reader.read_u64()?),
			24 => Barrier,
			25 => WeightNotComputable,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::Error", tag }),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum Response {
	Null,
	Assets(MultiAssets),
	ExecutionResult(Option<(u32, Error)>),
	Version(u32),
}

impl WireDecode for Response {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => Response::Null,
			1 => Response::Assets(MultiAssets::decode_from(reader)?),
			2 => Response::ExecutionResult(Option::decode_from(reader)?),
			3 => Response::Version(reader.read_u32()?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::Response", tag }),
		})
	}
}

/// An optional weight limit; weights are a plain `u64` in this version.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum WeightLimit {
	Unlimited,
	Limited(#[codec(compact)] u64),
}

impl WireDecode for WeightLimit {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => WeightLimit::Unlimited,
			1 => WeightLimit::Limited(reader.read_compact_u64()?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "v2::WeightLimit", tag }),
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

/// Cross-Consensus Message instructions of XCM v2.
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
		#[codec(compact)]
		max_weight: u64,
	},
	TransferAsset { assets: MultiAssets, beneficiary: MultiLocation },
	TransferReserveAsset { assets: MultiAssets, dest: MultiLocation, xcm: Xcm },
	Transact {
		origin_type: OriginKind,
		#[codec(compact)]
		require_weight_at_most: u64,
		call: DoubleEncoded,
	},
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
	ReportError {
		#[codec(compact)]
		query_id: u64,
		dest: MultiLocation,
		#[codec(compact)]
		max_response_weight: u64,
	},
	DepositAsset {
		assets: MultiAssetFilter,
		#[codec(compact)]
		max_assets: u32,
		beneficiary: MultiLocation,
	},
	DepositReserveAsset {
		assets: MultiAssetFilter,
		#[codec(compact)]
		max_assets: u32,
		dest: MultiLocation,
		xcm: Xcm,
	},
	ExchangeAsset { give: MultiAssetFilter, receive: MultiAssets },
	InitiateReserveWithdraw { assets: MultiAssetFilter, reserve: MultiLocation, xcm: Xcm },
	InitiateTeleport { assets: MultiAssetFilter, dest: MultiLocation, xcm: Xcm },
	QueryHolding {
		#[codec(compact)]
		query_id: u64,
		dest: MultiLocation,
		assets: MultiAssetFilter,
		#[codec(compact)]
		max_response_weight: u64,
	},
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
		#[codec(compact)]
		max_response_weight: u64,
	},
	UnsubscribeVersion,
}

impl Instruction {
	/// Opcode of this instruction within XCM v2.
	pub fn opcode(&self) -> u8 {
		self.using_encoded(|bytes| bytes[0])
	}

	pub fn name(&self) -> &'static str {
		INSTRUCTIONS.name(self.opcode()).unwrap_or("Unknown")
	}
}

/// Opcode table of XCM v2.
pub static INSTRUCTIONS: InstructionTable<Instruction> = InstructionTable {
	version: 2,
	ty: "v2::Instruction",
	opcodes: &[
		Opcode { index: 0, name: "WithdrawAsset", decode: |r| Ok(Instruction::WithdrawAsset(WireDecode::decode_from(r)?)) },
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
					max_weight: r.read_compact_u64()?,
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
					origin_type: WireDecode::decode_from(r)?,
					require_weight_at_most: r.read_compact_u64()?,
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
			decode: |r| {
				Ok(Instruction::ReportError {
					query_id: r.read_compact_u64()?,
					dest: WireDecode::decode_from(r)?,
					max_response_weight: r.read_compact_u64()?,
				})
			},
		},
		Opcode {
			index: 13,
			name: "DepositAsset",
			decode: |r| {
				Ok(Instruction::DepositAsset {
					assets: WireDecode::decode_from(r)?,
					max_assets: r.read_compact_u32()?,
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
					max_assets: r.read_compact_u32()?,
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
					receive: WireDecode::decode_from(r)?,
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
			name: "QueryHolding",
			decode: |r| {
				Ok(Instruction::QueryHolding {
					query_id: r.read_compact_u64()?,
					dest: WireDecode::decode_from(r)?,
					assets: WireDecode::decode_from(r)?,
					max_response_weight: r.read_compact_u64()?,
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
					max_response_weight: r.read_compact_u64()?,
				})
			},
		},
		Opcode { index: 27, name: "UnsubscribeVersion", decode: |_| Ok(Instruction::UnsubscribeVersion) },
	],
};

impl TryFrom<v3::NetworkId> for NetworkId {
	type Error = ConversionError;

	fn try_from(network: v3::NetworkId) -> Result<Self, Self::Error> {
		match network {
			v3::NetworkId::Polkadot => Ok(NetworkId::Polkadot),
			v3::NetworkId::Kusama => Ok(NetworkId::Kusama),
			_ => Err(ConversionError::Unrepresentable { what: "NetworkId", version: 2 }),
		}
	}
}

fn network_from_v3(network: Option<v3::NetworkId>) -> Result<NetworkId, ConversionError> {
	network.map_or(Ok(NetworkId::Any), NetworkId::try_from)
}

impl TryFrom<v3::Junction> for Junction {
	type Error = ConversionError;

	fn try_from(junction: v3::Junction) -> Result<Self, Self::Error> {
		use v3::Junction as New;
		Ok(match junction {
			New::Parachain(id) => Junction::Parachain(id),
			New::AccountId32 { network, id } =>
				Junction::AccountId32 { network: network_from_v3(network)?, id },
			New::AccountIndex64 { network, index } =>
				Junction::AccountIndex64 { network: network_from_v3(network)?, index },
			New::AccountKey20 { network, key } =>
				Junction::AccountKey20 { network: network_from_v3(network)?, key },
			New::PalletInstance(index) => Junction::PalletInstance(index),
			New::GeneralIndex(index) => Junction::GeneralIndex(index),
			New::GeneralKey { length, data } =>
				Junction::GeneralKey(data[..usize::from(length).min(32)].to_vec()),
			New::OnlyChild => Junction::OnlyChild,
			New::Plurality { id, part } => Junction::Plurality { id: id.try_into()?, part },
			New::GlobalConsensus(_) =>
				return Err(ConversionError::Unrepresentable { what: "GlobalConsensus", version: 2 }),
		})
	}
}

impl TryFrom<v3::BodyId> for BodyId {
	type Error = ConversionError;

	fn try_from(id: v3::BodyId) -> Result<Self, Self::Error> {
		use v3::BodyId as New;
		Ok(match id {
			New::Unit => BodyId::Unit,
			New::Moniker(name) => BodyId::Named(name.to_vec()),
			New::Index(index) => BodyId::Index(index),
			New::Executive => BodyId::Executive,
			New::Technical => BodyId::Technical,
			New::Legislative => BodyId::Legislative,
			New::Judicial => BodyId::Judicial,
			New::Defense => BodyId::Defense,
			New::Administration => BodyId::Administration,
			New::Treasury => BodyId::Treasury,
		})
	}
}

impl TryFrom<v3::MultiLocation> for MultiLocation {
	type Error = ConversionError;

	fn try_from(location: v3::MultiLocation) -> Result<Self, Self::Error> {
		location.try_map(Junction::try_from)
	}
}

impl TryFrom<v3::MultiAsset> for MultiAsset {
	type Error = ConversionError;

	fn try_from(asset: v3::MultiAsset) -> Result<Self, Self::Error> {
		let id = match asset.id {
			v3::AssetId::Concrete(location) => AssetId::Concrete(location.try_into()?),
			v3::AssetId::Abstract(name) => AssetId::Abstract(name.to_vec()),
		};
		let fun = match asset.fun {
			v3::Fungibility::Fungible(amount) => Fungibility::Fungible(amount),
			v3::Fungibility::NonFungible(instance) => Fungibility::NonFungible(match instance {
				v3::AssetInstance::Undefined => AssetInstance::Undefined,
				v3::AssetInstance::Index(index) => AssetInstance::Index(index),
				v3::AssetInstance::Array4(data) => AssetInstance::Array4(data),
				v3::AssetInstance::Array8(data) => AssetInstance::Array8(data),
				v3::AssetInstance::Array16(data) => AssetInstance::Array16(data),
				v3::AssetInstance::Array32(data) => AssetInstance::Array32(data),
			}),
		};
		Ok(MultiAsset { id, fun })
	}
}

impl TryFrom<v3::MultiAssets> for MultiAssets {
	type Error = ConversionError;

	fn try_from(assets: v3::MultiAssets) -> Result<Self, Self::Error> {
		assets.0.into_iter().map(MultiAsset::try_from).collect::<Result<_, _>>().map(MultiAssets)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::location::Junctions as GenericJunctions;
	use assert_matches::assert_matches;

	fn relay_token(amount: u128) -> MultiAsset {
		MultiAsset {
			id: AssetId::Concrete(MultiLocation::parent()),
			fun: Fungibility::Fungible(amount),
		}
	}

	#[test]
	fn opcode_table_is_dense() {
		assert_eq!(INSTRUCTIONS.len(), 28);
		for (position, opcode) in INSTRUCTIONS.opcodes.iter().enumerate() {
			assert_eq!(usize::from(opcode.index), position, "{}", opcode.name);
		}
	}

	#[test]
	fn deposit_asset_carries_max_assets() {
		let beneficiary = MultiLocation::new(
			0,
			GenericJunctions::x1(Junction::AccountId32 { network: NetworkId::Any, id: [1; 32] }),
		);
		let deposit = Instruction::DepositAsset {
			assets: MultiAssetFilter::Wild(WildMultiAsset::All),
			max_assets: 1,
			beneficiary,
		};
		let encoded = deposit.encode();
		// opcode, Wild, All, max_assets.
		assert_eq!(&encoded[..4], &[13, 1, 0, 4]);
		assert_eq!(deposit.name(), "DepositAsset");

		let mut reader = Reader::new(&encoded);
		assert_eq!(INSTRUCTIONS.decode(&mut reader), Ok(deposit));
		assert_eq!(reader.remaining(), 0);
	}

	#[test]
	fn reserve_transfer_program_roundtrips() {
		let program = Xcm(vec![
			Instruction::WithdrawAsset(MultiAssets(vec![relay_token(10_000_000_000)])),
			Instruction::ClearOrigin,
			Instruction::BuyExecution { fees: relay_token(1_000), weight_limit: WeightLimit::Limited(4_000_000_000) },
			Instruction::SetAppendix(Xcm(vec![Instruction::RefundSurplus])),
			Instruction::Transact {
				origin_type: OriginKind::SovereignAccount,
				require_weight_at_most: 1_000_000,
				call: DoubleEncoded::from(vec![0x00, 0x01]),
			},
			Instruction::Trap(7),
		]);
		assert_eq!(Xcm::decode_exact(&program.encode()), Ok(program));
	}

	#[test]
	fn opcode_past_the_table_is_rejected() {
		// 28 is `BurnAsset` in v3 but does not exist in v2.
		assert_matches!(
			Xcm::decode_exact(&[4, 28]),
			Err(CodecError::InvalidDiscriminant { ty: "v2::Instruction", tag: 28 })
		);
	}

	#[test]
	fn general_key_is_bounded() {
		let mut bytes = vec![6, 33 << 2];
		bytes.extend([0u8; 33]);
		assert_matches!(Junction::decode_exact(&bytes), Err(CodecError::BoundExceeded { max: 32, .. }));
	}

	#[test]
	fn v3_location_converts_when_representable() {
		let location = v3::MultiLocation::new(
			0,
			GenericJunctions::x1(v3::Junction::AccountId32 { network: None, id: [3; 32] }),
		);
		assert_eq!(
			MultiLocation::try_from(location),
			Ok(MultiLocation::new(
				0,
				GenericJunctions::x1(Junction::AccountId32 { network: NetworkId::Any, id: [3; 32] })
			))
		);

		let global = v3::MultiLocation::new(
			1,
			GenericJunctions::x1(v3::Junction::GlobalConsensus(v3::NetworkId::Westend)),
		);
		assert_matches!(MultiLocation::try_from(global), Err(ConversionError::Unrepresentable { .. }));
	}
}
