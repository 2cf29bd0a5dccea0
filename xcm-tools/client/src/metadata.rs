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

//! Runtime metadata, flattened into lookup tables.
//!
//! A [`MetadataRegistry`] is built once per session from a single `state_getMetadata` fetch and
//! is never mutated afterwards. Calls, storage entries and types are resolved by name at run time,
//! there are no compile-time call enums.

use crate::{error::MetadataError, rpc::ChainRpc, LOG_TARGET};
use codec::Decode;
use frame_metadata::{
	v14::{self, RuntimeMetadataV14},
	v15::RuntimeMetadataV15,
	RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED,
};
use scale_info::{form::PortableForm, PortableRegistry};
use std::collections::{BTreeMap, HashMap};

/// Identifier of a type in the portable registry.
pub type TypeId = u32;

/// Names of the pallets exposing the XCM transfer calls, in resolution order.
pub const XCM_PALLETS: [&str; 2] = ["XcmPallet", "PolkadotXcm"];

/// Bound on the recursion of [`MetadataRegistry::is_zero_sized`].
const MAX_TYPE_DEPTH: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
	Bool,
	Char,
	Str,
	U8,
	U16,
	U32,
	U64,
	U128,
	U256,
	I8,
	I16,
	I32,
	I64,
	I128,
	I256,
}

impl From<&scale_info::TypeDefPrimitive> for Primitive {
	fn from(primitive: &scale_info::TypeDefPrimitive) -> Self {
		use scale_info::TypeDefPrimitive as P;
		match primitive {
			P::Bool => Primitive::Bool,
			P::Char => Primitive::Char,
			P::Str => Primitive::Str,
			P::U8 => Primitive::U8,
			P::U16 => Primitive::U16,
			P::U32 => Primitive::U32,
			P::U64 => Primitive::U64,
			P::U128 => Primitive::U128,
			P::U256 => Primitive::U256,
			P::I8 => Primitive::I8,
			P::I16 => Primitive::I16,
			P::I32 => Primitive::I32,
			P::I64 => Primitive::I64,
			P::I128 => Primitive::I128,
			P::I256 => Primitive::I256,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
	pub name: Option<String>,
	pub ty: TypeId,
	pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
	pub name: String,
	pub index: u8,
	pub fields: Vec<FieldDescriptor>,
}

/// Shape of a registry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
	Primitive(Primitive),
	Composite(Vec<FieldDescriptor>),
	Variant(Vec<VariantDescriptor>),
	Sequence(TypeId),
	Array { len: u32, elem: TypeId },
	Tuple(Vec<TypeId>),
	Compact(TypeId),
	BitSequence { store: TypeId, order: TypeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
	/// Path segments of the Rust type, empty for primitives and tuples.
	pub path: Vec<String>,
	pub params: Vec<(String, Option<TypeId>)>,
	pub def: TypeDef,
}

impl TypeDescriptor {
	/// Last path segment, if the type has a path.
	pub fn name(&self) -> Option<&str> {
		self.path.last().map(String::as_str)
	}

	/// Type bound to the generic parameter `name`.
	pub fn param(&self, name: &str) -> Option<TypeId> {
		self.params.iter().find(|(param, _)| param == name).and_then(|(_, ty)| *ty)
	}

	pub fn variants(&self) -> &[VariantDescriptor] {
		match &self.def {
			TypeDef::Variant(variants) => variants,
			_ => &[],
		}
	}

	pub fn variant(&self, name: &str) -> Option<&VariantDescriptor> {
		self.variants().iter().find(|variant| variant.name == name)
	}

	pub fn variant_by_index(&self, index: u8) -> Option<&VariantDescriptor> {
		self.variants().iter().find(|variant| variant.index == index)
	}
}

/// A parameter of a dispatchable call, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSlot {
	pub name: String,
	pub ty: TypeId,
	pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
	pub name: String,
	pub index: u8,
	pub params: Vec<ParamSlot>,
}

/// Hashers of storage map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHasher {
	Blake2_128,
	Blake2_256,
	Blake2_128Concat,
	Twox128,
	Twox256,
	Twox64Concat,
	Identity,
}

impl From<&v14::StorageHasher> for StorageHasher {
	fn from(hasher: &v14::StorageHasher) -> Self {
		match hasher {
			v14::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
			v14::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
			v14::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
			v14::StorageHasher::Twox128 => StorageHasher::Twox128,
			v14::StorageHasher::Twox256 => StorageHasher::Twox256,
			v14::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
			v14::StorageHasher::Identity => StorageHasher::Identity,
		}
	}
}

impl StorageHasher {
	/// Hash an encoded key, appending the key itself for the concat hashers.
	pub fn hash(&self, key: &[u8]) -> Vec<u8> {
		use sp_crypto_hashing::{blake2_128, blake2_256, twox_128, twox_256, twox_64};
		match self {
			StorageHasher::Blake2_128 => blake2_128(key).to_vec(),
			StorageHasher::Blake2_256 => blake2_256(key).to_vec(),
			StorageHasher::Blake2_128Concat => [&blake2_128(key)[..], key].concat(),
			StorageHasher::Twox128 => twox_128(key).to_vec(),
			StorageHasher::Twox256 => twox_256(key).to_vec(),
			StorageHasher::Twox64Concat => [&twox_64(key)[..], key].concat(),
			StorageHasher::Identity => key.to_vec(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
	Plain,
	Map { hashers: Vec<StorageHasher>, key: TypeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDescriptor {
	pub name: String,
	pub kind: StorageKind,
	pub value: TypeId,
	/// `OptionQuery` entries have no value when the key is absent.
	pub optional: bool,
	/// Encoded value returned when the key is absent from the state.
	pub default: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
	pub name: String,
	pub index: u8,
	pub call_ty: Option<TypeId>,
	pub event_ty: Option<TypeId>,
	pub error_ty: Option<TypeId>,
	pub storage_prefix: Option<String>,
	calls: BTreeMap<String, CallDescriptor>,
	storage: BTreeMap<String, StorageDescriptor>,
}

impl ModuleDescriptor {
	pub fn call(&self, name: &str) -> Option<&CallDescriptor> {
		self.calls.get(name)
	}

	pub fn calls(&self) -> impl Iterator<Item = &CallDescriptor> {
		self.calls.values()
	}

	pub fn storage(&self, entry: &str) -> Option<&StorageDescriptor> {
		self.storage.get(entry)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedExtensionDescriptor {
	pub identifier: String,
	/// Type of the bytes carried in the extrinsic.
	pub ty: TypeId,
	/// Type of the bytes only mixed into the signing payload.
	pub additional: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicDescriptor {
	pub version: u8,
	pub address_ty: Option<TypeId>,
	pub signature_ty: Option<TypeId>,
	pub extensions: Vec<SignedExtensionDescriptor>,
}

/// Immutable snapshot of a runtime's metadata.
#[derive(Debug, Clone)]
pub struct MetadataRegistry {
	version: u32,
	modules: BTreeMap<String, ModuleDescriptor>,
	by_index: BTreeMap<u8, String>,
	types: HashMap<TypeId, TypeDescriptor>,
	extrinsic: ExtrinsicDescriptor,
}

impl MetadataRegistry {
	/// Fetch and decode the metadata of the chain behind `rpc`.
	pub async fn load(rpc: &dyn ChainRpc) -> Result<Self, MetadataError> {
		let bytes = rpc.metadata().await?;
		log::debug!(target: LOG_TARGET, "Fetched {} bytes of runtime metadata", bytes.len());
		Self::from_bytes(&bytes)
	}

	/// Decode an encoded `RuntimeMetadataPrefixed`.
	///
	/// Fails with [`MetadataError::Unsupported`] if the runtime has no XCM pallet.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
		let prefixed = RuntimeMetadataPrefixed::decode(&mut &bytes[..])?;
		if prefixed.0 != META_RESERVED {
			return Err(MetadataError::InvalidMagic(prefixed.0))
		}
		let registry = match prefixed.1 {
			RuntimeMetadata::V14(metadata) => Self::from_v14(metadata),
			RuntimeMetadata::V15(metadata) => Self::from_v15(metadata),
			other => return Err(MetadataError::UnsupportedVersion(other.version())),
		};

		match registry.xcm_pallet() {
			Some(module) => log::debug!(
				target: LOG_TARGET,
				"Loaded metadata v{} with {} modules, XCM pallet is {}",
				registry.version,
				registry.modules.len(),
				module.name,
			),
			None => return Err(MetadataError::Unsupported),
		}
		Ok(registry)
	}

	fn from_v14(metadata: RuntimeMetadataV14) -> Self {
		let types = convert_types(&metadata.types);
		let extrinsic_ty = types.get(&metadata.extrinsic.ty.id);
		let extrinsic = ExtrinsicDescriptor {
			version: metadata.extrinsic.version,
			address_ty: extrinsic_ty.and_then(|ty| ty.param("Address")),
			signature_ty: extrinsic_ty.and_then(|ty| ty.param("Signature")),
			extensions: convert_extensions(metadata.extrinsic.signed_extensions.iter().map(
				|extension| (&extension.identifier, extension.ty.id, extension.additional_signed.id),
			)),
		};
		let modules = metadata
			.pallets
			.iter()
			.map(|pallet| {
				module(
					&types,
					&pallet.name,
					pallet.index,
					pallet.calls.as_ref().map(|calls| calls.ty.id),
					pallet.event.as_ref().map(|event| event.ty.id),
					pallet.error.as_ref().map(|error| error.ty.id),
					pallet.storage.as_ref(),
				)
			})
			.collect();
		Self::assemble(14, modules, types, extrinsic)
	}

	fn from_v15(metadata: RuntimeMetadataV15) -> Self {
		let types = convert_types(&metadata.types);
		let extrinsic = ExtrinsicDescriptor {
			version: metadata.extrinsic.version,
			address_ty: Some(metadata.extrinsic.address_ty.id),
			signature_ty: Some(metadata.extrinsic.signature_ty.id),
			extensions: convert_extensions(metadata.extrinsic.signed_extensions.iter().map(
				|extension| (&extension.identifier, extension.ty.id, extension.additional_signed.id),
			)),
		};
		let modules = metadata
			.pallets
			.iter()
			.map(|pallet| {
				module(
					&types,
					&pallet.name,
					pallet.index,
					pallet.calls.as_ref().map(|calls| calls.ty.id),
					pallet.event.as_ref().map(|event| event.ty.id),
					pallet.error.as_ref().map(|error| error.ty.id),
					pallet.storage.as_ref(),
				)
			})
			.collect();
		Self::assemble(15, modules, types, extrinsic)
	}

	fn assemble(
		version: u32,
		modules: Vec<ModuleDescriptor>,
		types: HashMap<TypeId, TypeDescriptor>,
		extrinsic: ExtrinsicDescriptor,
	) -> Self {
		let by_index = modules.iter().map(|module| (module.index, module.name.clone())).collect();
		let modules = modules.into_iter().map(|module| (module.name.clone(), module)).collect();
		MetadataRegistry { version, modules, by_index, types, extrinsic }
	}

	/// Metadata format version the snapshot was decoded from.
	pub fn version(&self) -> u32 {
		self.version
	}

	pub fn find_module(&self, name: &str) -> Option<&ModuleDescriptor> {
		self.modules.get(name)
	}

	pub fn find_call(&self, module: &str, call: &str) -> Option<&CallDescriptor> {
		self.find_module(module)?.call(call)
	}

	pub fn module_by_index(&self, index: u8) -> Option<&ModuleDescriptor> {
		self.by_index.get(&index).and_then(|name| self.modules.get(name))
	}

	pub fn modules(&self) -> impl Iterator<Item = &ModuleDescriptor> {
		self.modules.values()
	}

	pub fn resolve(&self, ty: TypeId) -> Option<&TypeDescriptor> {
		self.types.get(&ty)
	}

	/// Lowest id among the types whose path ends with `name`.
	pub fn find_type(&self, name: &str) -> Option<TypeId> {
		self.types.iter().filter(|(_, ty)| ty.name() == Some(name)).map(|(id, _)| *id).min()
	}

	/// The first of [`XCM_PALLETS`] present in the runtime.
	pub fn xcm_pallet(&self) -> Option<&ModuleDescriptor> {
		XCM_PALLETS.iter().find_map(|name| self.find_module(name))
	}

	pub fn storage_entry(&self, module: &str, entry: &str) -> Option<&StorageDescriptor> {
		self.find_module(module)?.storage(entry)
	}

	pub fn extrinsic(&self) -> &ExtrinsicDescriptor {
		&self.extrinsic
	}

	/// Final storage key of `module.entry`, one encoded key per map hasher.
	pub fn storage_key(
		&self,
		module: &str,
		entry: &str,
		keys: &[&[u8]],
	) -> Result<Vec<u8>, MetadataError> {
		let not_found =
			|| MetadataError::StorageNotFound { module: module.into(), entry: entry.into() };
		let descriptor = self.find_module(module).ok_or_else(not_found)?;
		let prefix = descriptor.storage_prefix.as_deref().ok_or_else(not_found)?;
		let storage = descriptor.storage(entry).ok_or_else(not_found)?;

		let mut key = storage_prefix(prefix, entry);
		match &storage.kind {
			StorageKind::Plain if keys.is_empty() => (),
			StorageKind::Map { hashers, .. } if hashers.len() == keys.len() =>
				for (hasher, part) in hashers.iter().zip(keys) {
					key.extend(hasher.hash(part));
				},
			_ => return Err(MetadataError::UnexpectedShape("storage key arity")),
		}
		Ok(key)
	}

	/// Whether values of `ty` always encode to zero bytes.
	pub fn is_zero_sized(&self, ty: TypeId) -> bool {
		self.zero_sized_at(ty, 0)
	}

	fn zero_sized_at(&self, ty: TypeId, depth: u32) -> bool {
		if depth > MAX_TYPE_DEPTH {
			return false
		}
		let Some(descriptor) = self.resolve(ty) else { return false };
		match &descriptor.def {
			TypeDef::Composite(fields) =>
				fields.iter().all(|field| self.zero_sized_at(field.ty, depth + 1)),
			TypeDef::Tuple(fields) => fields.iter().all(|field| self.zero_sized_at(*field, depth + 1)),
			TypeDef::Array { len, elem } => *len == 0 || self.zero_sized_at(*elem, depth + 1),
			_ => false,
		}
	}
}

/// `twox128(prefix) ++ twox128(entry)`.
pub fn storage_prefix(module: &str, entry: &str) -> Vec<u8> {
	[sp_crypto_hashing::twox_128(module.as_bytes()), sp_crypto_hashing::twox_128(entry.as_bytes())]
		.concat()
}

fn convert_types(registry: &PortableRegistry) -> HashMap<TypeId, TypeDescriptor> {
	registry.types.iter().map(|ty| (ty.id, convert_type(&ty.ty))).collect()
}

fn convert_fields(fields: &[scale_info::Field<PortableForm>]) -> Vec<FieldDescriptor> {
	fields
		.iter()
		.map(|field| FieldDescriptor {
			name: field.name.clone(),
			ty: field.ty.id,
			type_name: field.type_name.clone(),
		})
		.collect()
}

fn convert_type(ty: &scale_info::Type<PortableForm>) -> TypeDescriptor {
	use scale_info::TypeDef as Def;
	let def = match &ty.type_def {
		Def::Composite(composite) => TypeDef::Composite(convert_fields(&composite.fields)),
		Def::Variant(variant) => TypeDef::Variant(
			variant
				.variants
				.iter()
				.map(|variant| VariantDescriptor {
					name: variant.name.clone(),
					index: variant.index,
					fields: convert_fields(&variant.fields),
				})
				.collect(),
		),
		Def::Sequence(sequence) => TypeDef::Sequence(sequence.type_param.id),
		Def::Array(array) => TypeDef::Array { len: array.len, elem: array.type_param.id },
		Def::Tuple(tuple) => TypeDef::Tuple(tuple.fields.iter().map(|field| field.id).collect()),
		Def::Primitive(primitive) => TypeDef::Primitive(primitive.into()),
		Def::Compact(compact) => TypeDef::Compact(compact.type_param.id),
		Def::BitSequence(bits) =>
			TypeDef::BitSequence { store: bits.bit_store_type.id, order: bits.bit_order_type.id },
	};
	TypeDescriptor {
		path: ty.path.segments.clone(),
		params: ty
			.type_params
			.iter()
			.map(|param| (param.name.clone(), param.ty.as_ref().map(|ty| ty.id)))
			.collect(),
		def,
	}
}

/// Signed extensions as `(identifier, type, additional signed type)`.
fn convert_extensions<'a>(
	extensions: impl Iterator<Item = (&'a String, TypeId, TypeId)>,
) -> Vec<SignedExtensionDescriptor> {
	extensions
		.map(|(identifier, ty, additional)| SignedExtensionDescriptor {
			identifier: identifier.clone(),
			ty,
			additional,
		})
		.collect()
}

fn module(
	types: &HashMap<TypeId, TypeDescriptor>,
	name: &str,
	index: u8,
	call_ty: Option<TypeId>,
	event_ty: Option<TypeId>,
	error_ty: Option<TypeId>,
	storage: Option<&v14::PalletStorageMetadata<PortableForm>>,
) -> ModuleDescriptor {
	let calls = call_ty
		.and_then(|ty| types.get(&ty))
		.map(|ty| {
			ty.variants()
				.iter()
				.map(|variant| {
					let call = CallDescriptor {
						name: variant.name.clone(),
						index: variant.index,
						params: variant
							.fields
							.iter()
							.enumerate()
							.map(|(position, field)| ParamSlot {
								name: field.name.clone().unwrap_or_else(|| position.to_string()),
								ty: field.ty,
								type_name: field.type_name.clone(),
							})
							.collect(),
					};
					(call.name.clone(), call)
				})
				.collect()
		})
		.unwrap_or_default();

	let entries = storage
		.map(|storage| {
			storage
				.entries
				.iter()
				.map(|entry| {
					let (kind, value) = match &entry.ty {
						v14::StorageEntryType::Plain(value) => (StorageKind::Plain, value.id),
						v14::StorageEntryType::Map { hashers, key, value } => (
							StorageKind::Map {
								hashers: hashers.iter().map(StorageHasher::from).collect(),
								key: key.id,
							},
							value.id,
						),
					};
					let descriptor = StorageDescriptor {
						name: entry.name.clone(),
						kind,
						value,
						optional: matches!(entry.modifier, v14::StorageEntryModifier::Optional),
						default: entry.default.clone(),
					};
					(descriptor.name.clone(), descriptor)
				})
				.collect()
		})
		.unwrap_or_default();

	ModuleDescriptor {
		name: name.to_owned(),
		index,
		call_ty,
		event_ty,
		error_ty,
		storage_prefix: storage.map(|storage| storage.prefix.clone()),
		calls,
		storage: entries,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{metadata_v14, FixtureOptions};
	use assert_matches::assert_matches;

	fn registry() -> MetadataRegistry {
		MetadataRegistry::from_bytes(&metadata_v14(&FixtureOptions::default())).unwrap()
	}

	#[test]
	fn lookups_are_exact_and_total() {
		let registry = registry();
		assert!(registry.find_module("NonexistentPallet").is_none());
		assert!(registry.find_module("polkadotxcm").is_none());
		assert!(registry.find_call("PolkadotXcm", "nonexistent_call").is_none());
		assert!(registry.storage_entry("System", "Nope").is_none());
		assert!(registry.resolve(u32::MAX).is_none());

		let call = registry.find_call("PolkadotXcm", "limited_reserve_transfer_assets").unwrap();
		assert_eq!(call.index, 8);
		assert_eq!(
			call.params.iter().map(|param| param.name.as_str()).collect::<Vec<_>>(),
			vec!["dest", "beneficiary", "assets", "fee_asset_item", "weight_limit"],
		);
		let module = registry.find_module("PolkadotXcm").unwrap();
		assert_eq!(registry.module_by_index(module.index).map(|m| &m.name), Some(&module.name));
		assert_eq!(registry.xcm_pallet().map(|m| m.name.as_str()), Some("PolkadotXcm"));
		assert!(registry.find_type("VersionedXcm").is_some());
		assert_eq!(registry.find_type("VersionedThing"), None);
	}

	#[test]
	fn metadata_without_xcm_pallet_is_unsupported() {
		let options = FixtureOptions { xcm_pallet: None, ..Default::default() };
		assert_matches!(
			MetadataRegistry::from_bytes(&metadata_v14(&options)),
			Err(MetadataError::Unsupported)
		);
	}

	#[test]
	fn garbage_is_rejected() {
		assert_matches!(MetadataRegistry::from_bytes(&[]), Err(MetadataError::Decode(_)));
		let mut bytes = metadata_v14(&FixtureOptions::default());
		bytes[0] ^= 0xff;
		assert_matches!(MetadataRegistry::from_bytes(&bytes), Err(MetadataError::InvalidMagic(_)));
	}

	#[test]
	fn extrinsic_types_come_from_type_params() {
		let registry = registry();
		let extrinsic = registry.extrinsic();
		assert_eq!(extrinsic.version, 4);
		let address = registry.resolve(extrinsic.address_ty.unwrap()).unwrap();
		assert_eq!(address.variant("Id").map(|v| v.index), Some(0));
		let signature = registry.resolve(extrinsic.signature_ty.unwrap()).unwrap();
		assert_eq!(signature.variant("Sr25519").map(|v| v.index), Some(1));

		let zero_sized = extrinsic
			.extensions
			.iter()
			.filter(|ext| registry.is_zero_sized(ext.ty) && registry.is_zero_sized(ext.additional))
			.map(|ext| ext.identifier.as_str())
			.collect::<Vec<_>>();
		assert_eq!(zero_sized, vec!["CheckNonZeroSender", "CheckWeight"]);
	}

	#[test]
	fn storage_keys_follow_the_hashers() {
		let registry = registry();
		let events = registry.storage_key("System", "Events", &[]).unwrap();
		assert_eq!(events, storage_prefix("System", "Events"));
		assert_eq!(
			array_bytes::bytes2hex("", &events),
			"26aa394eea5630e07c48ae0c9558cef780d41e5e16056765bc8461851072c9d7"
		);

		let account = [7u8; 32];
		let key = registry.storage_key("System", "Account", &[&account]).unwrap();
		assert_eq!(key.len(), 32 + 16 + 32);
		assert_eq!(&key[48..], &account);
		assert_matches!(
			registry.storage_key("System", "Account", &[]),
			Err(MetadataError::UnexpectedShape(_))
		);
		assert_matches!(
			registry.storage_key("System", "Missing", &[]),
			Err(MetadataError::StorageNotFound { .. })
		);
	}
}
