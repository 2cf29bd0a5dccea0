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

//! Strict SCALE reader.
//!
//! Encoding goes through the `codec` derives. Decoding is done by hand so that every integer
//! field is checked for its canonical compact form and every tag is checked against the table of
//! the version being decoded.

use thiserror::Error;

/// Maximum number of nested XCM programs (e.g. `SetAppendix` inside `SetErrorHandler`).
pub const MAX_XCM_DECODE_DEPTH: u32 = 8;

/// Maximum number of instructions accepted across all nesting levels of one message.
pub const MAX_INSTRUCTIONS_TO_DECODE: u32 = 100;

/// Errors produced while decoding wire bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
	/// The input ended before the value was complete.
	#[error("input truncated: {needed} bytes needed, {remaining} remaining")]
	Truncated { needed: usize, remaining: usize },
	/// A variant tag is outside of the range defined for the type.
	#[error("invalid discriminant {tag} for `{ty}`")]
	InvalidDiscriminant { ty: &'static str, tag: u8 },
	/// A compact integer uses more bytes than its minimal encoding.
	#[error("non-canonical compact encoding for `{ty}`")]
	NonCanonical { ty: &'static str },
	/// A compact integer does not fit into its target width.
	#[error("compact value does not fit into `{ty}`")]
	Overflow { ty: &'static str },
	/// A bounded collection holds more items than allowed.
	#[error("`{ty}` holds {len} items, at most {max} are allowed")]
	BoundExceeded { ty: &'static str, len: usize, max: usize },
	/// Bytes were left over after a top-level value was decoded.
	#[error("{0} bytes left after decoding")]
	TrailingBytes(usize),
	/// Nested programs go deeper than [`MAX_XCM_DECODE_DEPTH`].
	#[error("XCM nesting exceeds the depth limit of {0}")]
	DepthLimit(u32),
	/// The message holds more than [`MAX_INSTRUCTIONS_TO_DECODE`] instructions.
	#[error("XCM holds more than {0} instructions")]
	TooManyInstructions(u32),
	/// A string field is not valid UTF-8.
	#[error("invalid UTF-8 in `{0}`")]
	InvalidUtf8(&'static str),
	/// A type referenced by a runtime type registry is missing.
	#[error("unknown type id {0}")]
	UnknownType(u32),
}

/// Cursor over an input slice.
pub struct Reader<'a> {
	input: &'a [u8],
	depth: u32,
	instructions: u32,
}

impl<'a> Reader<'a> {
	pub fn new(input: &'a [u8]) -> Self {
		Reader { input, depth: 0, instructions: 0 }
	}

	/// Number of bytes not consumed yet.
	pub fn remaining(&self) -> usize {
		self.input.len()
	}

	/// Fails with [`CodecError::TrailingBytes`] unless the whole input was consumed.
	pub fn finish(self) -> Result<(), CodecError> {
		match self.input.len() {
			0 => Ok(()),
			left => Err(CodecError::TrailingBytes(left)),
		}
	}

	pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
		if len > self.input.len() {
			return Err(CodecError::Truncated { needed: len, remaining: self.input.len() })
		}
		let (head, tail) = self.input.split_at(len);
		self.input = tail;
		Ok(head)
	}

	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
		let mut out = [0u8; N];
		out.copy_from_slice(self.read_bytes(N)?);
		Ok(out)
	}

	pub fn read_u8(&mut self) -> Result<u8, CodecError> {
		Ok(self.read_array::<1>()?[0])
	}

	pub fn read_u16(&mut self) -> Result<u16, CodecError> {
		self.read_array().map(u16::from_le_bytes)
	}

	pub fn read_u32(&mut self) -> Result<u32, CodecError> {
		self.read_array().map(u32::from_le_bytes)
	}

	pub fn read_u64(&mut self) -> Result<u64, CodecError> {
		self.read_array().map(u64::from_le_bytes)
	}

	pub fn read_u128(&mut self) -> Result<u128, CodecError> {
		self.read_array().map(u128::from_le_bytes)
	}

	pub fn read_bool(&mut self) -> Result<bool, CodecError> {
		match self.read_u8()? {
			0 => Ok(false),
			1 => Ok(true),
			tag => Err(CodecError::InvalidDiscriminant { ty: "bool", tag }),
		}
	}

	pub fn read_compact_u32(&mut self) -> Result<u32, CodecError> {
		self.read_compact("Compact<u32>", 4).map(|v| v as u32)
	}

	pub fn read_compact_u64(&mut self) -> Result<u64, CodecError> {
		self.read_compact("Compact<u64>", 8).map(|v| v as u64)
	}

	pub fn read_compact_u128(&mut self) -> Result<u128, CodecError> {
		self.read_compact("Compact<u128>", 16)
	}

	/// Decode a compact integer at most `width` bytes wide, rejecting every encoding that is
	/// longer than needed.
	fn read_compact(&mut self, ty: &'static str, width: usize) -> Result<u128, CodecError> {
		let prefix = self.read_u8()?;
		let (value, lower_bound) = match prefix & 0b11 {
			0b00 => return Ok(u128::from(prefix >> 2)),
			0b01 => {
				let next = self.read_u8()?;
				(u128::from(u16::from_le_bytes([prefix, next]) >> 2), 1u128 << 6)
			},
			0b10 => {
				let [a, b, c] = self.read_array::<3>()?;
				(u128::from(u32::from_le_bytes([prefix, a, b, c]) >> 2), 1u128 << 14)
			},
			_ => {
				let len = usize::from(prefix >> 2) + 4;
				if len > width {
					return Err(CodecError::Overflow { ty })
				}
				let bytes = self.read_bytes(len)?;
				if bytes[len - 1] == 0 {
					return Err(CodecError::NonCanonical { ty })
				}
				let mut buf = [0u8; 16];
				buf[..len].copy_from_slice(bytes);
				(u128::from_le_bytes(buf), 1u128 << 30)
			},
		};
		if value < lower_bound {
			return Err(CodecError::NonCanonical { ty })
		}
		if width < 16 && value >> (width * 8) != 0 {
			return Err(CodecError::Overflow { ty })
		}
		Ok(value)
	}

	/// Length prefix of a sequence whose items take at least one byte each.
	pub fn read_seq_len(&mut self) -> Result<usize, CodecError> {
		let len = self.read_compact_u32()? as usize;
		if len > self.input.len() {
			return Err(CodecError::Truncated { needed: len, remaining: self.input.len() })
		}
		Ok(len)
	}

	/// Length-prefixed byte vector.
	pub fn read_vec(&mut self) -> Result<Vec<u8>, CodecError> {
		let len = self.read_seq_len()?;
		Ok(self.read_bytes(len)?.to_vec())
	}

	/// Length-prefixed byte vector holding at most `max` bytes.
	pub fn read_bounded_vec(&mut self, ty: &'static str, max: usize) -> Result<Vec<u8>, CodecError> {
		let bytes = self.read_vec()?;
		if bytes.len() > max {
			return Err(CodecError::BoundExceeded { ty, len: bytes.len(), max })
		}
		Ok(bytes)
	}

	/// Run `f` one nesting level deeper.
	pub fn nested<T>(
		&mut self,
		f: impl FnOnce(&mut Self) -> Result<T, CodecError>,
	) -> Result<T, CodecError> {
		if self.depth >= MAX_XCM_DECODE_DEPTH {
			return Err(CodecError::DepthLimit(MAX_XCM_DECODE_DEPTH))
		}
		self.depth += 1;
		let result = f(self);
		self.depth -= 1;
		result
	}

	/// Account for `count` more instructions across the whole message.
	pub fn count_instructions(&mut self, count: u32) -> Result<(), CodecError> {
		self.instructions = self.instructions.saturating_add(count);
		if self.instructions > MAX_INSTRUCTIONS_TO_DECODE {
			return Err(CodecError::TooManyInstructions(MAX_INSTRUCTIONS_TO_DECODE))
		}
		Ok(())
	}
}

/// Types that can be read back from their canonical SCALE encoding.
pub trait WireDecode: Sized {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError>;

	/// Decode `bytes`, requiring the whole input to be consumed.
	fn decode_exact(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut reader = Reader::new(bytes);
		let value = Self::decode_from(&mut reader)?;
		reader.finish()?;
		Ok(value)
	}
}

impl WireDecode for u8 {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		reader.read_u8()
	}
}

impl WireDecode for u32 {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		reader.read_u32()
	}
}

impl WireDecode for u64 {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		reader.read_u64()
	}
}

impl WireDecode for bool {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		reader.read_bool()
	}
}

impl<const N: usize> WireDecode for [u8; N] {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		reader.read_array()
	}
}

impl<T: WireDecode> WireDecode for Vec<T> {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		let len = reader.read_seq_len()?;
		(0..len).map(|_| T::decode_from(reader)).collect()
	}
}

impl<T: WireDecode> WireDecode for Option<T> {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		match reader.read_u8()? {
			0 => Ok(None),
			1 => T::decode_from(reader).map(Some),
			tag => Err(CodecError::InvalidDiscriminant { ty: "Option", tag }),
		}
	}
}

impl<A: WireDecode, B: WireDecode> WireDecode for (A, B) {
	fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
		Ok((A::decode_from(reader)?, B::decode_from(reader)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;
	use codec::{Compact, Encode};

	#[test]
	fn compact_roundtrip_at_mode_boundaries() {
		for value in [0u128, 63, 64, 16_383, 16_384, (1 << 30) - 1, 1 << 30, u64::MAX as u128, u128::MAX]
		{
			let encoded = Compact(value).encode();
			let mut reader = Reader::new(&encoded);
			assert_eq!(reader.read_compact_u128(), Ok(value));
			assert_eq!(reader.remaining(), 0);
		}
	}

	#[test]
	fn non_minimal_compact_is_rejected() {
		// 1 in two-byte mode.
		assert_matches!(
			Reader::new(&[0b0000_0101, 0]).read_compact_u32(),
			Err(CodecError::NonCanonical { .. })
		);
		// 64 in four-byte mode.
		assert_matches!(
			Reader::new(&[0b0000_0010, 1, 0, 0]).read_compact_u32(),
			Err(CodecError::NonCanonical { .. })
		);
		// 2^16 in big-integer mode, which fits four-byte mode.
		assert_matches!(
			Reader::new(&[0b0000_0011, 0, 0, 1, 0]).read_compact_u64(),
			Err(CodecError::NonCanonical { .. })
		);
		// Big-integer mode with a zero top byte.
		assert_matches!(
			Reader::new(&[0b0000_0111, 0, 0, 0, 0x80, 0]).read_compact_u64(),
			Err(CodecError::NonCanonical { .. })
		);
	}

	#[test]
	fn compact_too_wide_for_target_overflows() {
		let encoded = Compact(u64::MAX).encode();
		assert_matches!(Reader::new(&encoded).read_compact_u32(), Err(CodecError::Overflow { .. }));
	}

	#[test]
	fn truncated_and_trailing_input_are_reported() {
		assert_eq!(
			<[u8; 4]>::decode_exact(&[1, 2]),
			Err(CodecError::Truncated { needed: 4, remaining: 2 })
		);
		assert_eq!(u8::decode_exact(&[1, 2]), Err(CodecError::TrailingBytes(1)));
	}

	#[test]
	fn sequence_length_beyond_input_is_truncated() {
		// Claims 63 items with two bytes left.
		assert_matches!(Vec::<u8>::decode_exact(&[0xfc, 1, 2]), Err(CodecError::Truncated { .. }));
	}

	#[test]
	fn nesting_depth_is_limited() {
		fn dive(reader: &mut Reader<'_>, levels: u32) -> Result<(), CodecError> {
			if levels == 0 {
				return Ok(())
			}
			reader.nested(|r| dive(r, levels - 1))
		}
		assert!(dive(&mut Reader::new(&[]), MAX_XCM_DECODE_DEPTH).is_ok());
		assert_eq!(
			dive(&mut Reader::new(&[]), MAX_XCM_DECODE_DEPTH + 1),
			Err(CodecError::DepthLimit(MAX_XCM_DECODE_DEPTH))
		);
	}
}
