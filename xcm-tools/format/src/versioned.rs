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

//! Version-tagged wrappers.
//!
//! The first byte of a versioned value selects the version. Tags keep the values used by
//! `pallet-xcm`, so the wrappers can be fed straight into a call or decoded from an event.

use crate::{
	v2, v3, v4,
	wire::{CodecError, Reader, WireDecode},
	XcmVersion,
};
use codec::Encode;
use serde::Serialize;

/// A single XCM message, together with its version code.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum VersionedXcm {
	#[codec(index = 2)]
	V2(v2::Xcm),
	#[codec(index = 3)]
	V3(v3::Xcm),
	#[codec(index = 4)]
	V4(v4::Xcm),
}

impl VersionedXcm {
	/// Version tags of [`VersionedXcm`] understood by this crate.
	pub const TAGS: [u8; 3] = [2, 3, 4];

	pub fn version(&self) -> XcmVersion {
		match self {
			VersionedXcm::V2(_) => 2,
			VersionedXcm::V3(_) => 3,
			VersionedXcm::V4(_) => 4,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			VersionedXcm::V2(xcm) => xcm.0.len(),
			VersionedXcm::V3(xcm) => xcm.0.len(),
			VersionedXcm::V4(xcm) => xcm.0.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Names of the top-level instructions, in order.
	pub fn instruction_names(&self) -> Vec<&'static str> {
		match self {
			VersionedXcm::V2(xcm) => xcm.0.iter().map(v2::Instruction::name).collect(),
			VersionedXcm::V3(xcm) => xcm.0.iter().map(v3::Instruction::name).collect(),
			VersionedXcm::V4(xcm) => xcm.0.iter().map(v4::Instruction::name).collect(),
		}
	}
}

impl WireDecode for VersionedXcm {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			2 => VersionedXcm::V2(v2::Xcm::decode_from(reader)?),
			3 => VersionedXcm::V3(v3::Xcm::decode_from(reader)?),
			4 => VersionedXcm::V4(v4::Xcm::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "VersionedXcm", tag }),
		})
	}
}

/// A location, together with its version code.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum VersionedLocation {
	#[codec(index = 1)]
	V2(v2::MultiLocation),
	#[codec(index = 3)]
	V3(v3::MultiLocation),
	#[codec(index = 4)]
	V4(v4::Location),
}

impl VersionedLocation {
	pub fn version(&self) -> XcmVersion {
		match self {
			VersionedLocation::V2(_) => 2,
			VersionedLocation::V3(_) => 3,
			VersionedLocation::V4(_) => 4,
		}
	}

	/// Payload of the location without the version tag.
	pub fn encode_inner(&self) -> Vec<u8> {
		match self {
			VersionedLocation::V2(location) => location.encode(),
			VersionedLocation::V3(location) => location.encode(),
			VersionedLocation::V4(location) => location.encode(),
		}
	}
}

impl WireDecode for VersionedLocation {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			1 => VersionedLocation::V2(WireDecode::decode_from(reader)?),
			3 => VersionedLocation::V3(WireDecode::decode_from(reader)?),
			4 => VersionedLocation::V4(WireDecode::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "VersionedLocation", tag }),
		})
	}
}

/// A collection of assets, together with its version code.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum VersionedAssets {
	#[codec(index = 1)]
	V2(v2::MultiAssets),
	#[codec(index = 3)]
	V3(v3::MultiAssets),
	#[codec(index = 4)]
	V4(v4::Assets),
}

impl VersionedAssets {
	pub fn version(&self) -> XcmVersion {
		match self {
			VersionedAssets::V2(_) => 2,
			VersionedAssets::V3(_) => 3,
			VersionedAssets::V4(_) => 4,
		}
	}

	/// Payload of the assets without the version tag.
	pub fn encode_inner(&self) -> Vec<u8> {
		match self {
			VersionedAssets::V2(assets) => assets.encode(),
			VersionedAssets::V3(assets) => assets.encode(),
			VersionedAssets::V4(assets) => assets.encode(),
		}
	}
}

impl WireDecode for VersionedAssets {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			1 => VersionedAssets::V2(WireDecode::decode_from(reader)?),
			3 => VersionedAssets::V3(WireDecode::decode_from(reader)?),
			4 => VersionedAssets::V4(WireDecode::decode_from(reader)?),
			tag => return Err(CodecError::InvalidDiscriminant { ty: "VersionedAssets", tag }),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	#[test]
	fn version_tag_selects_the_table() {
		// `ClearOrigin` has opcode 10 in every version.
		assert_eq!(
			VersionedXcm::decode_exact(&[2, 4, 10]),
			Ok(VersionedXcm::V2(v2::Xcm(vec![v2::Instruction::ClearOrigin])))
		);
		// Opcode 28 only exists from v3 on.
		assert_matches!(VersionedXcm::decode_exact(&[2, 4, 28, 0]), Err(_));
		assert_eq!(
			VersionedXcm::decode_exact(&[3, 4, 28, 0]),
			Ok(VersionedXcm::V3(v3::Xcm(vec![v3::Instruction::BurnAsset(v3::MultiAssets::default())])))
		);
	}

	#[test]
	fn unknown_version_is_a_hard_error() {
		for tag in [0u8, 1, 5, 0xff] {
			assert_eq!(
				VersionedXcm::decode_exact(&[tag, 0]),
				Err(CodecError::InvalidDiscriminant { ty: "VersionedXcm", tag })
			);
		}
	}

	#[test]
	fn empty_input_is_truncated() {
		assert_eq!(
			VersionedXcm::decode_exact(&[]),
			Err(CodecError::Truncated { needed: 1, remaining: 0 })
		);
	}

	#[test]
	fn versioned_location_roundtrips() {
		let location = VersionedLocation::V4(v4::Location::parent());
		let encoded = location.encode();
		assert_eq!(encoded, vec![4, 1, 0]);
		assert_eq!(location.encode_inner(), vec![1, 0]);
		assert_eq!(VersionedLocation::decode_exact(&encoded), Ok(location));
	}

	#[test]
	fn instruction_names_follow_the_version() {
		let message = VersionedXcm::V3(v3::Xcm(vec![
			v3::Instruction::ClearOrigin,
			v3::Instruction::SetTopic([1; 32]),
		]));
		assert_eq!(message.instruction_names(), vec!["ClearOrigin", "SetTopic"]);
		assert_eq!(message.version(), 3);
		assert_eq!(VersionedXcm::decode_exact(&message.encode()), Ok(message));
	}
}
