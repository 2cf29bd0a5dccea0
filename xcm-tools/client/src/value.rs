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

//! Dynamic values decoded through the runtime type registry.

use crate::metadata::{FieldDescriptor, MetadataRegistry, Primitive, TypeDef, TypeId};
use primitive_types::H256;
use serde::{ser::SerializeMap, Serialize, Serializer};
use xcm_format::{CodecError, Reader};

/// Fields of a composite or of a variant, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composite(pub Vec<(Option<String>, Value)>);

impl Composite {
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.0.iter().find(|(field, _)| field.as_deref() == Some(name)).map(|(_, value)| value)
	}

	pub fn at(&self, position: usize) -> Option<&Value> {
		self.0.get(position).map(|(_, value)| value)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
	pub name: String,
	pub index: u8,
	pub fields: Composite,
}

/// A value of any registry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	Bool(bool),
	Char(char),
	Str(String),
	UInt(u128),
	Int(i128),
	/// 256-bit integers, little endian.
	U256([u8; 32]),
	I256([u8; 32]),
	/// Sequences and arrays of `u8`.
	Bytes(Vec<u8>),
	Composite(Composite),
	Variant(Variant),
	Sequence(Vec<Value>),
	BitSequence { bits: u32, data: Vec<u8> },
}

impl Value {
	/// Peel single-field composites, the way newtypes are laid out in the registry.
	fn unwrap_newtype(&self) -> &Value {
		let mut value = self;
		while let Value::Composite(Composite(fields)) = value {
			match fields.as_slice() {
				[(_, inner)] => value = inner,
				_ => break,
			}
		}
		value
	}

	/// Named field of a composite or of a variant.
	pub fn field(&self, name: &str) -> Option<&Value> {
		match self {
			Value::Composite(composite) => composite.field(name),
			Value::Variant(variant) => variant.fields.field(name),
			_ => None,
		}
	}

	/// Positional field of a composite or of a variant.
	pub fn at(&self, position: usize) -> Option<&Value> {
		match self {
			Value::Composite(composite) => composite.at(position),
			Value::Variant(variant) => variant.fields.at(position),
			Value::Sequence(items) => items.get(position),
			_ => None,
		}
	}

	pub fn as_u128(&self) -> Option<u128> {
		match self.unwrap_newtype() {
			Value::UInt(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self.unwrap_newtype() {
			Value::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self.unwrap_newtype() {
			Value::Bytes(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// A 32-byte blob, possibly wrapped in newtypes such as `H256`.
	pub fn as_hash(&self) -> Option<H256> {
		self.as_bytes().filter(|bytes| bytes.len() == 32).map(H256::from_slice)
	}

	pub fn as_variant(&self) -> Option<&Variant> {
		match self.unwrap_newtype() {
			Value::Variant(variant) => Some(variant),
			_ => None,
		}
	}

	/// `Some(inner)` of an `Option`, `None` for `None` and for non-option values.
	pub fn as_some(&self) -> Option<&Value> {
		match self.as_variant()? {
			Variant { name, fields, .. } if name == "Some" => fields.at(0),
			_ => None,
		}
	}
}

impl Serialize for Composite {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		if !self.0.is_empty() && self.0.iter().all(|(name, _)| name.is_some()) {
			let mut map = serializer.serialize_map(Some(self.0.len()))?;
			for (name, value) in &self.0 {
				map.serialize_entry(name.as_deref().unwrap_or_default(), value)?;
			}
			map.end()
		} else {
			serializer.collect_seq(self.0.iter().map(|(_, value)| value))
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let hex = |bytes: &[u8]| array_bytes::bytes2hex("0x", bytes);
		match self {
			Value::Bool(value) => serializer.serialize_bool(*value),
			Value::Char(value) => serializer.serialize_char(*value),
			Value::Str(value) => serializer.serialize_str(value),
			Value::UInt(value) => serializer.serialize_u128(*value),
			Value::Int(value) => serializer.serialize_i128(*value),
			Value::U256(value) | Value::I256(value) => serializer.serialize_str(&hex(value)),
			Value::Bytes(value) => serializer.serialize_str(&hex(value)),
			Value::Composite(composite) => composite.serialize(serializer),
			Value::Variant(variant) if variant.fields.is_empty() =>
				serializer.serialize_str(&variant.name),
			Value::Variant(variant) => {
				let mut map = serializer.serialize_map(Some(1))?;
				match variant.fields.0.as_slice() {
					[(None, inner)] => map.serialize_entry(&variant.name, inner)?,
					_ => map.serialize_entry(&variant.name, &variant.fields)?,
				}
				map.end()
			},
			Value::Sequence(items) => serializer.collect_seq(items),
			Value::BitSequence { data, .. } => serializer.serialize_str(&hex(data)),
		}
	}
}

/// Decode one value of type `ty` from `reader`.
pub fn decode_value(
	registry: &MetadataRegistry,
	ty: TypeId,
	reader: &mut Reader<'_>,
) -> Result<Value, CodecError> {
	let descriptor = registry.resolve(ty).ok_or(CodecError::UnknownType(ty))?;
	Ok(match &descriptor.def {
		TypeDef::Primitive(primitive) => decode_primitive(*primitive, reader)?,
		TypeDef::Composite(fields) => Value::Composite(decode_fields(registry, fields, reader)?),
		TypeDef::Variant(variants) => {
			let tag = reader.read_u8()?;
			let variant = variants
				.iter()
				.find(|variant| variant.index == tag)
				.ok_or(CodecError::InvalidDiscriminant { ty: "enum", tag })?;
			Value::Variant(Variant {
				name: variant.name.clone(),
				index: variant.index,
				fields: decode_fields(registry, &variant.fields, reader)?,
			})
		},
		TypeDef::Sequence(elem) => {
			let len = reader.read_compact_u32()? as usize;
			decode_items(registry, *elem, len, reader)?
		},
		TypeDef::Array { len, elem } => decode_items(registry, *elem, *len as usize, reader)?,
		TypeDef::Tuple(fields) => Value::Composite(Composite(
			fields
				.iter()
				.map(|field| Ok((None, decode_value(registry, *field, reader)?)))
				.collect::<Result<_, CodecError>>()?,
		)),
		TypeDef::Compact(inner) => Value::UInt(decode_compact(registry, *inner, reader)?),
		TypeDef::BitSequence { store, .. } => {
			let bits = reader.read_compact_u32()?;
			let word = match registry.resolve(*store).map(|ty| &ty.def) {
				Some(TypeDef::Primitive(Primitive::U8)) => 1,
				Some(TypeDef::Primitive(Primitive::U16)) => 2,
				Some(TypeDef::Primitive(Primitive::U32)) => 4,
				Some(TypeDef::Primitive(Primitive::U64)) => 8,
				_ => return Err(CodecError::UnknownType(*store)),
			};
			let words = (bits as usize).div_ceil(word * 8);
			Value::BitSequence { bits, data: reader.read_bytes(words * word)?.to_vec() }
		},
	})
}

fn decode_fields(
	registry: &MetadataRegistry,
	fields: &[FieldDescriptor],
	reader: &mut Reader<'_>,
) -> Result<Composite, CodecError> {
	fields
		.iter()
		.map(|field| Ok((field.name.clone(), decode_value(registry, field.ty, reader)?)))
		.collect::<Result<_, _>>()
		.map(Composite)
}

fn decode_items(
	registry: &MetadataRegistry,
	elem: TypeId,
	len: usize,
	reader: &mut Reader<'_>,
) -> Result<Value, CodecError> {
	if matches!(registry.resolve(elem).map(|ty| &ty.def), Some(TypeDef::Primitive(Primitive::U8))) {
		return Ok(Value::Bytes(reader.read_bytes(len)?.to_vec()))
	}
	// Every non zero-sized item takes at least one byte.
	if len > reader.remaining() && !registry.is_zero_sized(elem) {
		return Err(CodecError::Truncated { needed: len, remaining: reader.remaining() })
	}
	(0..len)
		.map(|_| decode_value(registry, elem, reader))
		.collect::<Result<_, _>>()
		.map(Value::Sequence)
}

/// Compact integers, looking through single-field wrappers such as `Compact<Perbill>`.
fn decode_compact(
	registry: &MetadataRegistry,
	inner: TypeId,
	reader: &mut Reader<'_>,
) -> Result<u128, CodecError> {
	let mut ty = inner;
	loop {
		let descriptor = registry.resolve(ty).ok_or(CodecError::UnknownType(ty))?;
		match &descriptor.def {
			TypeDef::Composite(fields) if fields.len() == 1 => ty = fields[0].ty,
			TypeDef::Composite(fields) if fields.is_empty() => return Ok(0),
			TypeDef::Tuple(fields) if fields.is_empty() => return Ok(0),
			TypeDef::Primitive(Primitive::U8) => {
				let value = reader.read_compact_u32()?;
				return u8::try_from(value)
					.map(u128::from)
					.map_err(|_| CodecError::Overflow { ty: "Compact<u8>" })
			},
			TypeDef::Primitive(Primitive::U16) => {
				let value = reader.read_compact_u32()?;
				return u16::try_from(value)
					.map(u128::from)
					.map_err(|_| CodecError::Overflow { ty: "Compact<u16>" })
			},
			TypeDef::Primitive(Primitive::U32) => return reader.read_compact_u32().map(u128::from),
			TypeDef::Primitive(Primitive::U64) => return reader.read_compact_u64().map(u128::from),
			TypeDef::Primitive(Primitive::U128) => return reader.read_compact_u128(),
			_ => return Err(CodecError::UnknownType(ty)),
		}
	}
}

fn decode_primitive(primitive: Primitive, reader: &mut Reader<'_>) -> Result<Value, CodecError> {
	Ok(match primitive {
		Primitive::Bool => Value::Bool(reader.read_bool()?),
		Primitive::Char =>
			Value::Char(char::from_u32(reader.read_u32()?).ok_or(CodecError::InvalidUtf8("char"))?),
		Primitive::Str => Value::Str(
			String::from_utf8(reader.read_vec()?).map_err(|_| CodecError::InvalidUtf8("str"))?,
		),
		Primitive::U8 => Value::UInt(reader.read_u8()?.into()),
		Primitive::U16 => Value::UInt(reader.read_u16()?.into()),
		Primitive::U32 => Value::UInt(reader.read_u32()?.into()),
		Primitive::U64 => Value::UInt(reader.read_u64()?.into()),
		Primitive::U128 => Value::UInt(reader.read_u128()?),
		Primitive::U256 => Value::U256(reader.read_array()?),
		Primitive::I8 => Value::Int(i8::from_le_bytes(reader.read_array()?).into()),
		Primitive::I16 => Value::Int(i16::from_le_bytes(reader.read_array()?).into()),
		Primitive::I32 => Value::Int(i32::from_le_bytes(reader.read_array()?).into()),
		Primitive::I64 => Value::Int(i64::from_le_bytes(reader.read_array()?).into()),
		Primitive::I128 => Value::Int(i128::from_le_bytes(reader.read_array()?)),
		Primitive::I256 => Value::I256(reader.read_array()?),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{fixtures, metadata_v14, FixtureOptions};
	use assert_matches::assert_matches;
	use codec::Encode;

	fn registry() -> MetadataRegistry {
		MetadataRegistry::from_bytes(&metadata_v14(&FixtureOptions::default())).unwrap()
	}

	fn account_info_ty(registry: &MetadataRegistry) -> TypeId {
		registry.storage_entry("System", "Account").unwrap().value
	}

	#[test]
	fn decodes_composites_by_field_name() {
		let registry = registry();
		let info = fixtures::AccountInfo { nonce: 5, providers: 1, ..Default::default() };
		let encoded = info.encode();
		let mut reader = Reader::new(&encoded);
		let value = decode_value(&registry, account_info_ty(&registry), &mut reader).unwrap();
		reader.finish().unwrap();

		assert_eq!(value.field("nonce").and_then(Value::as_u128), Some(5));
		assert_eq!(value.field("providers").and_then(Value::as_u128), Some(1));
		assert_eq!(value.field("data").and_then(|data| data.field("free")).and_then(Value::as_u128), Some(0));
		assert!(value.field("missing").is_none());
	}

	#[test]
	fn truncated_input_is_an_error() {
		let registry = registry();
		let encoded = fixtures::AccountInfo::default().encode();
		let mut reader = Reader::new(&encoded[..encoded.len() - 1]);
		assert_matches!(
			decode_value(&registry, account_info_ty(&registry), &mut reader),
			Err(CodecError::Truncated { .. })
		);
	}

	#[test]
	fn unknown_type_is_reported() {
		let registry = registry();
		let mut reader = Reader::new(&[0]);
		assert_eq!(decode_value(&registry, u32::MAX, &mut reader), Err(CodecError::UnknownType(u32::MAX)));
	}

	#[test]
	fn values_serialize_to_readable_json() {
		let value = Value::Variant(Variant {
			name: "Sent".into(),
			index: 0,
			fields: Composite(vec![
				(Some("message_id".into()), Value::Bytes(vec![0xab; 2])),
				(Some("ok".into()), Value::Bool(true)),
			]),
		});
		assert_eq!(
			serde_json::to_value(&value).unwrap(),
			serde_json::json!({ "Sent": { "message_id": "0xabab", "ok": true } })
		);
		let unit = Value::Variant(Variant { name: "None".into(), index: 0, fields: Composite::default() });
		assert_eq!(serde_json::to_value(&unit).unwrap(), serde_json::json!("None"));
	}
}
