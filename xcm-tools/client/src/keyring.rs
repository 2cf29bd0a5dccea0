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

//! sr25519 signing keys.
//!
//! A secret reference is a `0x`-prefixed 32-byte mini secret key followed by an optional
//! derivation path, e.g. `0x..//polkadot/0`. A reference starting with the path (`//Alice`)
//! derives from the well-known development seed.

use crate::error::KeyringError;
use codec::Encode;
use schnorrkel::{
	derive::{ChainCode, Derivation},
	signing_context, ExpansionMode, Keypair, MiniSecretKey,
};

/// Mini secret key of the development phrase.
pub const DEV_SEED: [u8; 32] = [
	0xfa, 0xc7, 0x95, 0x9d, 0xbf, 0xe7, 0x2f, 0x05,
	0x2e, 0x5a, 0x0c, 0x3c, 0x8d, 0x65, 0x30, 0xf2,
	0x02, 0xb0, 0x2f, 0xd8, 0xf9, 0xf5, 0xca, 0x35,
	0x80, 0xec, 0x8d, 0xeb, 0x77, 0x97, 0x47, 0x9e,
];

const SIGNING_CTX: &[u8] = b"substrate";

/// 32-byte account identifier.
pub type AccountId = [u8; 32];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Junction {
	Soft([u8; 32]),
	Hard([u8; 32]),
}

impl Junction {
	fn new(segment: &str, hard: bool) -> Self {
		let encoded = match segment.parse::<u64>() {
			Ok(index) => index.encode(),
			Err(_) => segment.encode(),
		};
		let chain_code = if encoded.len() > 32 {
			sp_crypto_hashing::blake2_256(&encoded)
		} else {
			let mut chain_code = [0u8; 32];
			chain_code[..encoded.len()].copy_from_slice(&encoded);
			chain_code
		};
		if hard {
			Junction::Hard(chain_code)
		} else {
			Junction::Soft(chain_code)
		}
	}
}

fn parse_path(path: &str) -> Result<Vec<Junction>, KeyringError> {
	let mut junctions = Vec::new();
	let mut rest = path;
	while !rest.is_empty() {
		if rest.starts_with("///") {
			return Err(KeyringError::PasswordUnsupported)
		}
		let (hard, tail) = match rest.strip_prefix("//") {
			Some(tail) => (true, tail),
			None => (false, rest.strip_prefix('/').ok_or_else(|| KeyringError::InvalidPath(path.into()))?),
		};
		let end = tail.find('/').unwrap_or(tail.len());
		let segment = &tail[..end];
		if segment.is_empty() {
			return Err(KeyringError::InvalidPath(path.into()))
		}
		junctions.push(Junction::new(segment, hard));
		rest = &tail[end..];
	}
	Ok(junctions)
}

/// An sr25519 key pair. The secret never leaves this type and is not printed by `Debug`.
#[derive(Clone)]
pub struct Keyring {
	pair: Keypair,
}

impl std::fmt::Debug for Keyring {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Keyring({})", array_bytes::bytes2hex("0x", self.public()))
	}
}

impl Keyring {
	/// Parse a secret reference.
	pub fn from_secret(reference: &str) -> Result<Self, KeyringError> {
		let reference = reference.trim();
		let (phrase, path) = match reference.find('/') {
			Some(split) => reference.split_at(split),
			None => (reference, ""),
		};
		let seed = if phrase.is_empty() {
			DEV_SEED
		} else if phrase.starts_with("0x") {
			let bytes = array_bytes::hex2bytes(phrase).map_err(|_| KeyringError::InvalidHex)?;
			<[u8; 32]>::try_from(bytes.as_slice())
				.map_err(|_| KeyringError::InvalidLength(bytes.len()))?
		} else {
			return Err(KeyringError::UnsupportedPhrase)
		};

		let mut pair = Self::from_seed(&seed)?.pair;
		for junction in parse_path(path)? {
			pair = match junction {
				Junction::Hard(chain_code) => pair
					.secret
					.hard_derive_mini_secret_key(Some(ChainCode(chain_code)), b"")
					.0
					.expand_to_keypair(ExpansionMode::Ed25519),
				Junction::Soft(chain_code) =>
					pair.secret.derived_key_simple(ChainCode(chain_code), b"").0.to_keypair(),
			};
		}
		Ok(Keyring { pair })
	}

	pub fn from_seed(seed: &[u8; 32]) -> Result<Self, KeyringError> {
		let secret = MiniSecretKey::from_bytes(seed)
			.map_err(|_| KeyringError::InvalidLength(seed.len()))?;
		Ok(Keyring { pair: secret.expand_to_keypair(ExpansionMode::Ed25519) })
	}

	pub fn public(&self) -> [u8; 32] {
		self.pair.public.to_bytes()
	}

	pub fn account_id(&self) -> AccountId {
		self.public()
	}

	/// Sign `payload` in the Substrate signing context.
	pub fn sign(&self, payload: &[u8]) -> [u8; 64] {
		let context = signing_context(SIGNING_CTX);
		self.pair.sign(context.bytes(payload)).to_bytes()
	}

	pub fn verify(public: &[u8; 32], payload: &[u8], signature: &[u8; 64]) -> bool {
		let (Ok(public), Ok(signature)) = (
			schnorrkel::PublicKey::from_bytes(public),
			schnorrkel::Signature::from_bytes(signature),
		) else {
			return false
		};
		public.verify_simple(SIGNING_CTX, payload, &signature).is_ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	const ALICE: &str = "d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
	const BOB: &str = "8eaf04151687736326c9fea17e25fc5287613693c912909cb226aa4794f26a48";

	#[test]
	fn well_known_accounts_derive_from_the_dev_seed() {
		let alice = Keyring::from_secret("//Alice").unwrap();
		assert_eq!(array_bytes::bytes2hex("", alice.public()), ALICE);
		let bob = Keyring::from_secret("//Bob").unwrap();
		assert_eq!(array_bytes::bytes2hex("", bob.public()), BOB);

		let explicit = Keyring::from_secret(&format!("0x{}//Alice", array_bytes::bytes2hex("", DEV_SEED)))
			.unwrap();
		assert_eq!(explicit.public(), alice.public());
	}

	#[test]
	fn soft_and_hard_paths_differ() {
		let hard = Keyring::from_secret("//Alice//0").unwrap();
		let soft = Keyring::from_secret("//Alice/0").unwrap();
		assert_ne!(hard.public(), soft.public());
		assert_ne!(hard.public(), Keyring::from_secret("//Alice").unwrap().public());
	}

	#[test]
	fn signatures_verify() {
		let alice = Keyring::from_secret("//Alice").unwrap();
		let signature = alice.sign(b"payload");
		assert!(Keyring::verify(&alice.public(), b"payload", &signature));
		assert!(!Keyring::verify(&alice.public(), b"other", &signature));
	}

	#[test]
	fn invalid_references_are_rejected() {
		assert_eq!(
			Keyring::from_secret("bottom drive obey lake curtain smoke basket hold race lonely fit walk")
				.unwrap_err(),
			KeyringError::UnsupportedPhrase
		);
		assert_eq!(Keyring::from_secret("0x1234").unwrap_err(), KeyringError::InvalidLength(2));
		assert_eq!(Keyring::from_secret("0xzz").unwrap_err(), KeyringError::InvalidHex);
		assert_matches!(Keyring::from_secret("//Alice//"), Err(KeyringError::InvalidPath(_)));
		assert_eq!(Keyring::from_secret("//Alice///pw").unwrap_err(), KeyringError::PasswordUnsupported);
	}

	#[test]
	fn debug_output_hides_the_secret() {
		let alice = Keyring::from_secret("//Alice").unwrap();
		assert_eq!(format!("{alice:?}"), format!("Keyring(0x{ALICE})"));
	}
}
