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

//! Relative locations shared by every XCM version.
//!
//! All versions encode the interior of a location the same way: the number of junctions as a
//! single tag byte (`Here` = 0 up to `X8` = 8) followed by the junctions. Only the junction type
//! differs between versions, so the location is generic over it.

use crate::wire::{CodecError, Reader, WireDecode};
use codec::{Encode, Output};
use serde::Serialize;
use thiserror::Error;

/// Maximum number of junctions in the interior of a location.
pub const MAX_JUNCTIONS: usize = 8;

/// Errors raised while constructing a location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
	#[error("a location holds at most {MAX_JUNCTIONS} junctions, got {0}")]
	TooManyJunctions(usize),
}

/// Non-parent junctions that can be constructed, starting from the context of a location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Junctions<J>(Vec<J>);

impl<J> Junctions<J> {
	/// The interior pointing at the context itself.
	pub const fn here() -> Self {
		Junctions(Vec::new())
	}

	/// A single junction.
	pub fn x1(junction: J) -> Self {
		Junctions(vec![junction])
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn first(&self) -> Option<&J> {
		self.0.first()
	}

	pub fn as_slice(&self) -> &[J] {
		&self.0
	}

	pub fn iter(&self) -> impl Iterator<Item = &J> {
		self.0.iter()
	}

	/// Append a junction, failing once the interior is full.
	pub fn push(&mut self, junction: J) -> Result<(), LocationError> {
		if self.0.len() >= MAX_JUNCTIONS {
			return Err(LocationError::TooManyJunctions(self.0.len() + 1))
		}
		self.0.push(junction);
		Ok(())
	}

	/// Convert each junction, keeping the order.
	pub fn try_map<K, E>(self, f: impl FnMut(J) -> Result<K, E>) -> Result<Junctions<K>, E> {
		self.0.into_iter().map(f).collect::<Result<Vec<_>, _>>().map(Junctions)
	}
}

impl<J> Default for Junctions<J> {
	fn default() -> Self {
		Self::here()
	}
}

impl<J> TryFrom<Vec<J>> for Junctions<J> {
	type Error = LocationError;

	fn try_from(junctions: Vec<J>) -> Result<Self, Self::Error> {
		if junctions.len() > MAX_JUNCTIONS {
			return Err(LocationError::TooManyJunctions(junctions.len()))
		}
		Ok(Junctions(junctions))
	}
}

impl<J: Encode> Encode for Junctions<J> {
	fn size_hint(&self) -> usize {
		1 + self.0.iter().map(Encode::size_hint).sum::<usize>()
	}

	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		dest.push_byte(self.0.len() as u8);
		self.0.iter().for_each(|junction| junction.encode_to(dest));
	}
}

impl<J: WireDecode> WireDecode for Junctions<J> {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		let tag = reader.read_u8()?;
		if usize::from(tag) > MAX_JUNCTIONS {
			return Err(CodecError::InvalidDiscriminant { ty: "Junctions", tag })
		}
		(0..tag).map(|_| J::decode_from(reader)).collect::<Result<Vec<_>, _>>().map(Junctions)
	}
}

/// A relative path between two locations in the consensus hierarchy.
///
/// `parents` is the number of hops towards the common ancestor, `interior` the path down from
/// there.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Serialize)]
pub struct MultiLocation<J> {
	pub parents: u8,
	pub interior: Junctions<J>,
}

impl<J> MultiLocation<J> {
	pub fn new(parents: u8, interior: Junctions<J>) -> Self {
		MultiLocation { parents, interior }
	}

	/// The location of the context itself.
	pub const fn here() -> Self {
		MultiLocation { parents: 0, interior: Junctions::here() }
	}

	/// The parent of the context.
	pub const fn parent() -> Self {
		MultiLocation { parents: 1, interior: Junctions::here() }
	}

	/// `true` if this location points at the context itself.
	pub fn is_here(&self) -> bool {
		self.parents == 0 && self.interior.is_empty()
	}

	pub fn try_map<K, E>(self, f: impl FnMut(J) -> Result<K, E>) -> Result<MultiLocation<K>, E> {
		Ok(MultiLocation { parents: self.parents, interior: self.interior.try_map(f)? })
	}
}

impl<J: WireDecode> WireDecode for MultiLocation<J> {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(MultiLocation { parents: reader.read_u8()?, interior: Junctions::decode_from(reader)? })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	#[test]
	fn ninth_junction_is_a_construction_error() {
		let mut interior = Junctions::<u8>::try_from(vec![0; MAX_JUNCTIONS]).unwrap();
		assert_eq!(interior.push(9), Err(LocationError::TooManyJunctions(9)));
		assert_eq!(interior.len(), MAX_JUNCTIONS);
		assert_eq!(Junctions::try_from(vec![0u8; 9]), Err(LocationError::TooManyJunctions(9)));
	}

	#[test]
	fn interior_tag_is_the_junction_count() {
		let location = MultiLocation::new(1, Junctions::try_from(vec![7u8, 9]).unwrap());
		assert_eq!(location.encode(), vec![1, 2, 7, 9]);
		assert_eq!(MultiLocation::<u8>::decode_exact(&[1, 2, 7, 9]), Ok(location));
	}

	#[test]
	fn interior_tag_beyond_x8_is_rejected() {
		assert_matches!(
			MultiLocation::<u8>::decode_exact(&[0, 9]),
			Err(CodecError::InvalidDiscriminant { ty: "Junctions", tag: 9 })
		);
	}
}
