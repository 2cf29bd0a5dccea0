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

//! Opcode tables.
//!
//! Every XCM version owns one [`InstructionTable`] over its own instruction type. The position of
//! an entry is its opcode, so a version can never decode an operand with another version's shape.

use crate::wire::{CodecError, Reader};

/// Reads the operands of one instruction, the opcode byte being already consumed.
pub type DecodeFn<I> = fn(&mut Reader<'_>) -> Result<I, CodecError>;

/// One entry of an opcode table.
pub struct Opcode<I: 'static> {
	pub index: u8,
	pub name: &'static str,
	pub decode: DecodeFn<I>,
}

/// Opcode table of one XCM version.
pub struct InstructionTable<I: 'static> {
	pub version: u32,
	/// Type name reported in decode errors.
	pub ty: &'static str,
	pub opcodes: &'static [Opcode<I>],
}

impl<I> InstructionTable<I> {
	/// Read an opcode and its operands.
	pub fn decode(&self, reader: &mut Reader<'_>) -> Result<I, CodecError> {
		let tag = reader.read_u8()?;
		let opcode = self
			.opcodes
			.get(usize::from(tag))
			.ok_or(CodecError::InvalidDiscriminant { ty: self.ty, tag })?;
		(opcode.decode)(reader)
	}

	pub fn name(&self, opcode: u8) -> Option<&'static str> {
		self.opcodes.get(usize::from(opcode)).map(|entry| entry.name)
	}

	pub fn len(&self) -> usize {
		self.opcodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.opcodes.is_empty()
	}
}
