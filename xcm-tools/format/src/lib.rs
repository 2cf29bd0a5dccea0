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

//! Cross-Consensus Message format data structures, versions 2 to 4.
//!
//! Values are encoded with the `codec` derives and decoded with [`wire::WireDecode`], which
//! dispatches on the version tag first and then on the opcode table of that version only.

use codec::Encode;
use serde::Serialize;
use thiserror::Error;

mod common;
mod hex;
pub mod location;
pub mod table;
pub mod v2;
pub mod v3;
pub mod v4;
mod versioned;
pub mod wire;

pub use location::{LocationError, MAX_JUNCTIONS};
pub use versioned::{VersionedAssets, VersionedLocation, VersionedXcm};
pub use wire::{CodecError, Reader, WireDecode};

/// A version of the XCM format.
pub type XcmVersion = u32;

/// Versions with a static opcode table in this crate.
pub const SUPPORTED_VERSIONS: [XcmVersion; 3] = [2, 3, 4];

/// Errors raised when a value cannot be expressed in another XCM version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
	#[error("{what} cannot be expressed in XCM v{version}")]
	Unrepresentable { what: &'static str, version: XcmVersion },
}

/// An encoded call carried by `Transact`, kept opaque.
#[derive(Clone, PartialEq, Eq, Default, Encode)]
pub struct DoubleEncoded {
	encoded: Vec<u8>,
}

impl core::fmt::Debug for DoubleEncoded {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "{:?}", array_bytes::bytes2hex("0x", &self.encoded))
	}
}

impl Serialize for DoubleEncoded {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		hex::serialize(&self.encoded, serializer)
	}
}

impl From<Vec<u8>> for DoubleEncoded {
	fn from(encoded: Vec<u8>) -> Self {
		Self { encoded }
	}
}

impl DoubleEncoded {
	pub fn encoded(&self) -> &[u8] {
		&self.encoded
	}
}

impl WireDecode for DoubleEncoded {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		reader.read_vec().map(DoubleEncoded::from)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn double_encoded_is_a_length_prefixed_blob() {
		let call = DoubleEncoded::from(vec![0x1f, 0x08]);
		assert_eq!(call.encode(), vec![8, 0x1f, 0x08]);
		assert_eq!(format!("{call:?}"), "\"0x1f08\"");
		assert_eq!(DoubleEncoded::decode_exact(&[8, 0x1f, 0x08]), Ok(call));
	}

	#[test]
	fn decoded_message_serializes_to_json() {
		let message = VersionedXcm::decode_exact(&[3, 4, 0, 4, 0, 1, 0, 0, 40]).unwrap();
		let json = serde_json::to_value(&message).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"V3": [{ "WithdrawAsset": [{
					"id": { "Concrete": { "parents": 1, "interior": [] } },
					"fun": { "Fungible": 10 }
				}] }]
			})
		);
	}
}
