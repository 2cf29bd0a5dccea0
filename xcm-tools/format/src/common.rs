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

//! Types whose encoding did not change between XCM v2 and v4.

use crate::wire::{CodecError, Reader, WireDecode};
use codec::Encode;
use serde::Serialize;

/// A part of a pluralistic body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum BodyPart {
	/// The body's declaration, under whatever means it decides.
	Voice,
	/// A given number of members of the body.
	Members {
		#[codec(compact)]
		count: u32,
	},
	/// A given number of members of the body, out of some larger caucus.
	Fraction {
		#[codec(compact)]
		nom: u32,
		#[codec(compact)]
		denom: u32,
	},
	/// No less than the given proportion of members of the body.
	AtLeastProportion {
		#[codec(compact)]
		nom: u32,
		#[codec(compact)]
		denom: u32,
	},
	/// More than the given proportion of members of the body.
	MoreThanProportion {
		#[codec(compact)]
		nom: u32,
		#[codec(compact)]
		denom: u32,
	},
}

impl WireDecode for BodyPart {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => BodyPart::Voice,
			1 => BodyPart::Members { count: reader.read_compact_u32()? },
			2 => BodyPart::Fraction { nom: reader.read_compact_u32()?, denom: reader.read_compact_u32()? },
			3 => BodyPart::AtLeastProportion {
				nom: reader.read_compact_u32()?,
				denom: reader.read_compact_u32()?,
			},
			4 => BodyPart::MoreThanProportion {
				nom: reader.read_compact_u32()?,
				denom: reader.read_compact_u32()?,
			},
			tag => return Err(CodecError::InvalidDiscriminant { ty: "BodyPart", tag }),
		})
	}
}

/// Basically just the XCM (more general) version of `ParachainDispatchOrigin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum OriginKind {
	Native,
	SovereignAccount,
	Superuser,
	Xcm,
}

impl WireDecode for OriginKind {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => OriginKind::Native,
			1 => OriginKind::SovereignAccount,
			2 => OriginKind::Superuser,
			3 => OriginKind::Xcm,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "OriginKind", tag }),
		})
	}
}

/// Classification of whether an asset is fungible or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Serialize)]
pub enum WildFungibility {
	Fungible,
	NonFungible,
}

impl WireDecode for WildFungibility {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok(match reader.read_u8()? {
			0 => WildFungibility::Fungible,
			1 => WildFungibility::NonFungible,
			tag => return Err(CodecError::InvalidDiscriminant { ty: "WildFungibility", tag }),
		})
	}
}
