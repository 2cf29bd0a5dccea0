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

//! Version 4 signed extrinsics, laid out after the runtime's extrinsic metadata.

use crate::{
	error::BuildError,
	keyring::Keyring,
	metadata::{MetadataRegistry, TypeDef, TypeId},
	LOG_TARGET,
};
use codec::{Compact, Encode};
use primitive_types::H256;

const EXTRINSIC_VERSION: u8 = 4;
/// Signed flag of the version byte.
const SIGNED_BIT: u8 = 0b1000_0000;
/// Payloads longer than this are hashed before signing.
const MAX_UNHASHED_PAYLOAD: usize = 256;

/// Chain state mixed into the signed extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningParams {
	pub spec_version: u32,
	pub transaction_version: u32,
	pub genesis_hash: H256,
	pub nonce: u32,
	pub tip: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedExtrinsic {
	/// Length-prefixed encoding, as submitted to the node.
	pub bytes: Vec<u8>,
	/// `blake2_256` of [`Self::bytes`].
	pub hash: H256,
}

/// Extension data: `extra` travels in the extrinsic, `additional` is only signed.
#[derive(Debug, Default)]
struct Extensions {
	extra: Vec<u8>,
	additional: Vec<u8>,
}

pub struct ExtrinsicBuilder<'a> {
	registry: &'a MetadataRegistry,
}

impl<'a> ExtrinsicBuilder<'a> {
	pub fn new(registry: &'a MetadataRegistry) -> Self {
		ExtrinsicBuilder { registry }
	}

	/// Sign `call` (pallet index, call index, arguments) on behalf of `keyring`.
	pub fn sign(
		&self,
		call: &[u8],
		keyring: &Keyring,
		params: &SigningParams,
	) -> Result<SignedExtrinsic, BuildError> {
		let descriptor = self.registry.extrinsic();
		if descriptor.version != EXTRINSIC_VERSION {
			return Err(BuildError::UnsupportedExtrinsic(format!(
				"extrinsic version {}",
				descriptor.version
			)))
		}
		let extensions = self.extensions(params)?;

		let mut payload = Vec::with_capacity(call.len() + extensions.extra.len() + 64);
		payload.extend_from_slice(call);
		payload.extend_from_slice(&extensions.extra);
		payload.extend_from_slice(&extensions.additional);
		let signature = if payload.len() > MAX_UNHASHED_PAYLOAD {
			keyring.sign(&sp_crypto_hashing::blake2_256(&payload))
		} else {
			keyring.sign(&payload)
		};

		let mut body = vec![EXTRINSIC_VERSION | SIGNED_BIT];
		self.encode_address(&keyring.account_id(), &mut body)?;
		self.encode_signature(&signature, &mut body)?;
		body.extend_from_slice(&extensions.extra);
		body.extend_from_slice(call);

		let mut bytes = Compact(body.len() as u32).encode();
		bytes.extend(body);
		let hash = H256(sp_crypto_hashing::blake2_256(&bytes));
		log::debug!(
			target: LOG_TARGET,
			"Signed extrinsic {hash:?} ({} bytes, nonce {})",
			bytes.len(),
			params.nonce,
		);
		Ok(SignedExtrinsic { bytes, hash })
	}

	fn extensions(&self, params: &SigningParams) -> Result<Extensions, BuildError> {
		let mut out = Extensions::default();
		for extension in &self.registry.extrinsic().extensions {
			match extension.identifier.as_str() {
				"CheckSpecVersion" => params.spec_version.encode_to(&mut out.additional),
				"CheckTxVersion" => params.transaction_version.encode_to(&mut out.additional),
				"CheckGenesis" => params.genesis_hash.0.encode_to(&mut out.additional),
				// Immortal era, checked against the genesis hash.
				"CheckMortality" | "CheckEra" => {
					out.extra.push(0);
					params.genesis_hash.0.encode_to(&mut out.additional);
				},
				"CheckNonce" => Compact(params.nonce).encode_to(&mut out.extra),
				"ChargeTransactionPayment" => Compact(params.tip).encode_to(&mut out.extra),
				"ChargeAssetTxPayment" => {
					Compact(params.tip).encode_to(&mut out.extra);
					// No fee asset.
					out.extra.push(0);
				},
				"CheckMetadataHash" => {
					// Mode::Disabled, no metadata hash.
					out.extra.push(0);
					out.additional.push(0);
				},
				_ if self.registry.is_zero_sized(extension.ty) &&
					self.registry.is_zero_sized(extension.additional) => (),
				other => return Err(BuildError::UnsupportedExtension(other.to_owned())),
			}
		}
		Ok(out)
	}

	/// `MultiAddress::Id`, or a bare account id on runtimes without `MultiAddress`.
	fn encode_address(&self, account: &[u8; 32], out: &mut Vec<u8>) -> Result<(), BuildError> {
		let Some(ty) = self.registry.extrinsic().address_ty else {
			out.push(0);
			out.extend_from_slice(account);
			return Ok(())
		};
		let descriptor = self.registry.resolve(ty).ok_or(BuildError::UnknownType(ty))?;
		match &descriptor.def {
			TypeDef::Variant(_) => {
				let id = descriptor.variant("Id").ok_or_else(|| {
					BuildError::UnsupportedExtrinsic("address type has no `Id` variant".into())
				})?;
				out.push(id.index);
			},
			_ if self.is_bytes(ty, 32) => (),
			_ => return Err(BuildError::UnsupportedExtrinsic("unknown address type".into())),
		}
		out.extend_from_slice(account);
		Ok(())
	}

	/// `MultiSignature::Sr25519`.
	fn encode_signature(&self, signature: &[u8; 64], out: &mut Vec<u8>) -> Result<(), BuildError> {
		match self.registry.extrinsic().signature_ty {
			None => out.push(1),
			Some(ty) => {
				let descriptor = self.registry.resolve(ty).ok_or(BuildError::UnknownType(ty))?;
				match &descriptor.def {
					TypeDef::Variant(_) => {
						let sr25519 = descriptor.variant("Sr25519").ok_or_else(|| {
							BuildError::UnsupportedExtrinsic("signature type has no `Sr25519` variant".into())
						})?;
						out.push(sr25519.index);
					},
					_ if self.is_bytes(ty, 64) => (),
					_ => return Err(BuildError::UnsupportedExtrinsic("unknown signature type".into())),
				}
			},
		}
		out.extend_from_slice(signature);
		Ok(())
	}

	/// Whether `ty` is `[u8; len]`, possibly behind newtypes.
	fn is_bytes(&self, mut ty: TypeId, len: u32) -> bool {
		loop {
			match self.registry.resolve(ty).map(|descriptor| &descriptor.def) {
				Some(TypeDef::Composite(fields)) if fields.len() == 1 => ty = fields[0].ty,
				Some(TypeDef::Array { len: actual, .. }) => return *actual == len,
				_ => return false,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{metadata_v14, FixtureOptions};

	fn params() -> SigningParams {
		SigningParams {
			spec_version: 9430,
			transaction_version: 24,
			genesis_hash: H256::repeat_byte(0x91),
			nonce: 3,
			tip: 0,
		}
	}

	fn registry(options: &FixtureOptions) -> MetadataRegistry {
		MetadataRegistry::from_bytes(&metadata_v14(options)).unwrap()
	}

	#[test]
	fn signed_extrinsic_layout() {
		let registry = registry(&FixtureOptions::default());
		let alice = Keyring::from_secret("//Alice").unwrap();
		let call = vec![31, 8, 0xaa];
		let extrinsic = ExtrinsicBuilder::new(&registry).sign(&call, &alice, &params()).unwrap();

		// era + nonce + tip
		let extra = [0u8, 3 << 2, 0];
		let body_len = 1 + 33 + 65 + extra.len() + call.len();
		let prefix = Compact(body_len as u32).encode();
		assert_eq!(&extrinsic.bytes[..prefix.len()], &prefix[..]);
		let body = &extrinsic.bytes[prefix.len()..];
		assert_eq!(body.len(), body_len);
		assert_eq!(body[0], 0x84);
		assert_eq!(body[1], 0);
		assert_eq!(&body[2..34], &alice.public());
		assert_eq!(body[34], 1);
		assert_eq!(&body[99..102], &extra);
		assert_eq!(&body[102..], &call[..]);
		assert_eq!(extrinsic.hash, H256(sp_crypto_hashing::blake2_256(&extrinsic.bytes)));

		// The signature covers call, extra and the additional data.
		let mut payload = call.clone();
		payload.extend_from_slice(&extra);
		payload.extend_from_slice(&9430u32.encode());
		payload.extend_from_slice(&24u32.encode());
		payload.extend_from_slice(&[0x91; 32]);
		payload.extend_from_slice(&[0x91; 32]);
		let signature: [u8; 64] = body[35..99].try_into().unwrap();
		assert!(Keyring::verify(&alice.public(), &payload, &signature));
	}

	#[test]
	fn long_payloads_are_hashed_before_signing() {
		let registry = registry(&FixtureOptions::default());
		let alice = Keyring::from_secret("//Alice").unwrap();
		let call = vec![7u8; 300];
		let extrinsic = ExtrinsicBuilder::new(&registry).sign(&call, &alice, &params()).unwrap();
		let body = &extrinsic.bytes[2..];
		let signature: [u8; 64] = body[35..99].try_into().unwrap();

		let mut payload = call.clone();
		payload.extend_from_slice(&[0, 3 << 2, 0]);
		payload.extend_from_slice(&9430u32.encode());
		payload.extend_from_slice(&24u32.encode());
		payload.extend_from_slice(&[0x91; 64]);
		assert!(!Keyring::verify(&alice.public(), &payload, &signature));
		assert!(Keyring::verify(&alice.public(), &sp_crypto_hashing::blake2_256(&payload), &signature));
	}

	#[test]
	fn metadata_hash_extension_is_disabled() {
		let registry = registry(&FixtureOptions { metadata_hash: true, ..Default::default() });
		let alice = Keyring::from_secret("//Alice").unwrap();
		let call = vec![31, 8];
		let extrinsic = ExtrinsicBuilder::new(&registry).sign(&call, &alice, &params()).unwrap();
		// Two byte length prefix.
		let body = &extrinsic.bytes[2..];
		assert_eq!(&body[99..103], &[0, 3 << 2, 0, 0]);
	}

	#[test]
	fn unknown_extensions_with_data_are_rejected() {
		let registry = registry(&FixtureOptions { unknown_extension: true, ..Default::default() });
		let alice = Keyring::from_secret("//Alice").unwrap();
		assert_eq!(
			ExtrinsicBuilder::new(&registry).sign(&[0, 0], &alice, &params()),
			Err(BuildError::UnsupportedExtension("CheckFancyThing".into()))
		);
	}
}
