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

//! Decoding of the `System.Events` storage value.

use crate::{
	error::MetadataError,
	metadata::MetadataRegistry,
	value::{decode_value, Composite, Value},
};
use primitive_types::H256;
use xcm_format::Reader;

/// When an event was deposited within its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	ApplyExtrinsic(u32),
	Finalization,
	Initialization,
}

/// One runtime event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
	pub phase: Phase,
	pub pallet: String,
	pub variant: String,
	pub fields: Composite,
	pub topics: Vec<H256>,
}

impl EventRecord {
	pub fn is(&self, pallet: &str, variant: &str) -> bool {
		self.pallet == pallet && self.variant == variant
	}

	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields.field(name)
	}

	/// Whether the event was emitted while applying extrinsic `index`.
	pub fn emitted_by(&self, index: u32) -> bool {
		self.phase == Phase::ApplyExtrinsic(index)
	}
}

/// Decode the raw `System.Events` value of a block.
pub fn decode_events(
	registry: &MetadataRegistry,
	bytes: &[u8],
) -> Result<Vec<EventRecord>, MetadataError> {
	let entry = registry.storage_entry("System", "Events").ok_or_else(|| {
		MetadataError::StorageNotFound { module: "System".into(), entry: "Events".into() }
	})?;
	let mut reader = Reader::new(bytes);
	let value = decode_value(registry, entry.value, &mut reader)?;
	reader.finish()?;

	let Value::Sequence(records) = value else {
		return Err(MetadataError::UnexpectedShape("System.Events"))
	};
	records.iter().map(event_record).collect()
}

fn event_record(record: &Value) -> Result<EventRecord, MetadataError> {
	let shape = || MetadataError::UnexpectedShape("EventRecord");

	let phase = record.field("phase").and_then(Value::as_variant).ok_or_else(shape)?;
	let phase = match phase.name.as_str() {
		"ApplyExtrinsic" => Phase::ApplyExtrinsic(
			phase.fields.at(0).and_then(Value::as_u128).ok_or_else(shape)? as u32,
		),
		"Finalization" => Phase::Finalization,
		"Initialization" => Phase::Initialization,
		_ => return Err(shape()),
	};

	// `RuntimeEvent::Pallet(pallet::Event::Variant { .. })`
	let outer = record.field("event").and_then(Value::as_variant).ok_or_else(shape)?;
	let inner = outer.fields.at(0).and_then(Value::as_variant).ok_or_else(shape)?;

	let topics = match record.field("topics") {
		Some(Value::Sequence(topics)) => topics.iter().filter_map(Value::as_hash).collect(),
		_ => Vec::new(),
	};

	Ok(EventRecord {
		phase,
		pallet: outer.name.clone(),
		variant: inner.name.clone(),
		fields: inner.fields.clone(),
		topics,
	})
}

/// Human readable form of a `DispatchError`, naming the pallet error when there is one.
pub fn describe_dispatch_error(registry: &MetadataRegistry, error: Option<&Value>) -> String {
	let Some(variant) = error.and_then(Value::as_variant) else {
		return "unknown dispatch error".into()
	};
	let inner = variant.fields.at(0);
	if variant.name == "Module" {
		let index = inner.and_then(|e| e.field("index")).and_then(Value::as_u128);
		// `error` is `[u8; 4]` on current runtimes and a plain `u8` on older ones.
		let code = inner.and_then(|e| e.field("error")).and_then(|code| {
			code.as_bytes().and_then(|bytes| bytes.first().copied()).or_else(|| {
				code.as_u128().and_then(|code| u8::try_from(code).ok())
			})
		});
		if let (Some(index), Some(code)) = (index, code) {
			let module = u8::try_from(index).ok().and_then(|index| registry.module_by_index(index));
			if let Some(module) = module {
				let name = module
					.error_ty
					.and_then(|ty| registry.resolve(ty))
					.and_then(|ty| ty.variant_by_index(code))
					.map_or("Unknown", |variant| variant.name.as_str());
				return format!("{}::{name}", module.name)
			}
		}
	}
	match inner.and_then(Value::as_variant) {
		Some(detail) => format!("{}::{}", variant.name, detail.name),
		None => variant.name.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{fixtures, metadata_v14, FixtureOptions};
	use assert_matches::assert_matches;
	use codec::Encode;

	#[test]
	fn events_expose_pallet_variant_and_fields() {
		let registry =
			MetadataRegistry::from_bytes(&metadata_v14(&FixtureOptions::default())).unwrap();
		let encoded = vec![
			fixtures::record(0, fixtures::RuntimeEvent::System(fixtures::SystemEvent::success())),
			fixtures::record(
				1,
				fixtures::RuntimeEvent::XcmpQueue(fixtures::XcmpQueueEvent::XcmpMessageSent {
					message_hash: [9; 32],
				}),
			),
			fixtures::EventRecord {
				phase: fixtures::Phase::Finalization,
				event: fixtures::RuntimeEvent::MessageQueue(fixtures::MessageQueueEvent::processed(
					[3; 32], true,
				)),
				topics: vec![[1; 32]],
			},
		]
		.encode();

		let events = decode_events(&registry, &encoded).unwrap();
		assert_eq!(events.len(), 3);
		assert!(events[0].is("System", "ExtrinsicSuccess"));
		assert!(events[0].emitted_by(0));
		assert!(events[1].is("XcmpQueue", "XcmpMessageSent"));
		assert_eq!(events[1].field("message_hash").and_then(Value::as_hash), Some(H256::repeat_byte(9)));
		assert_eq!(events[2].phase, Phase::Finalization);
		assert_eq!(events[2].field("success").and_then(Value::as_bool), Some(true));
		assert_eq!(events[2].topics, vec![H256::repeat_byte(1)]);
	}

	#[test]
	fn trailing_bytes_are_rejected() {
		let registry =
			MetadataRegistry::from_bytes(&metadata_v14(&FixtureOptions::default())).unwrap();
		let mut encoded = Vec::<fixtures::EventRecord>::new().encode();
		encoded.push(0);
		assert_matches!(decode_events(&registry, &encoded), Err(MetadataError::Codec(_)));
		assert_eq!(decode_events(&registry, &[0]).unwrap(), vec![]);
	}
}
