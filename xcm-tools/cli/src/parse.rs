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

//! Decoding of raw XCM messages.

use anyhow::{anyhow, Context};
use serde_json::Value as Json;
use xcm_client::{metadata::MetadataRegistry, value::decode_value};
use xcm_format::{CodecError, Reader, VersionedXcm, WireDecode};

/// How a message should be decoded.
#[derive(Debug)]
pub enum Decoded {
	/// One of the versions with a static instruction table.
	Static(VersionedXcm),
	/// A version this tool has no table for, needing runtime metadata.
	UnknownVersion(u8),
}

pub fn hex_message(message: &str) -> anyhow::Result<Vec<u8>> {
	array_bytes::hex2bytes(message.trim()).map_err(|err| anyhow!("message is not hex: {err:?}"))
}

/// Decode `bytes` with the static tables.
pub fn decode_static(bytes: &[u8]) -> anyhow::Result<Decoded> {
	match VersionedXcm::decode_exact(bytes) {
		Ok(message) => Ok(Decoded::Static(message)),
		Err(CodecError::InvalidDiscriminant { ty: "VersionedXcm", tag }) =>
			Ok(Decoded::UnknownVersion(tag)),
		Err(err) => Err(err).context("decoding message"),
	}
}

/// Decode `bytes` as the runtime's own `VersionedXcm` type.
pub fn decode_with_registry(registry: &MetadataRegistry, bytes: &[u8]) -> anyhow::Result<Json> {
	let ty = registry
		.find_type("VersionedXcm")
		.context("runtime metadata declares no `VersionedXcm` type")?;
	let mut reader = Reader::new(bytes);
	let value =
		decode_value(registry, ty, &mut reader).context("decoding message with runtime metadata")?;
	reader.finish().context("decoding message with runtime metadata")?;
	Ok(serde_json::to_value(&value)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;
	use codec::Encode;
	use xcm_client::test_utils::{fixtures, metadata_v14, FixtureOptions};

	#[test]
	fn known_versions_decode_statically() {
		let bytes = hex_message("0x03040004000100002800").unwrap();
		assert_matches!(decode_static(&bytes), Err(_));

		let bytes = hex_message("0x030400040001000028").unwrap();
		assert_matches!(
			decode_static(&bytes),
			Ok(Decoded::Static(message)) if message.instruction_names() == vec!["WithdrawAsset"]
		);
		assert_matches!(decode_static(&[5, 0]), Ok(Decoded::UnknownVersion(5)));
		assert!(hex_message("0xzz").is_err());
	}

	#[test]
	fn newer_versions_decode_with_metadata() {
		let registry =
			MetadataRegistry::from_bytes(&metadata_v14(&FixtureOptions::default())).unwrap();
		let message = fixtures::VersionedXcm::V5(vec![
			fixtures::NextInstruction::ClearOrigin,
			fixtures::NextInstruction::SetTopic([7; 32]),
		]);
		let json = decode_with_registry(&registry, &message.encode()).unwrap();
		assert_eq!(
			json,
			serde_json::json!({ "V5": ["ClearOrigin", { "SetTopic": format!("0x{}", "07".repeat(32)) }] })
		);

		let mut trailing = message.encode();
		trailing.push(0);
		assert!(decode_with_registry(&registry, &trailing).is_err());
	}
}
