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

//! Exact decimal amounts.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
	#[error("`{0}` is not a decimal amount")]
	Invalid(String),
	#[error("`{amount}` has more than {decimals} fractional digits")]
	TooPrecise { amount: String, decimals: u8 },
	#[error("`{0}` does not fit into 128 bits of base units")]
	Overflow(String),
}

/// Convert an amount of whole tokens, such as `1.25`, into base units.
///
/// Digits finer than one base unit are an error unless they are zeros.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<u128, AmountError> {
	let amount = amount.trim();
	let invalid = || AmountError::Invalid(amount.to_owned());
	let overflow = || AmountError::Overflow(amount.to_owned());

	let (whole, fraction) = match amount.split_once('.') {
		Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
		Some(_) => return Err(invalid()),
		None => (amount, ""),
	};
	let is_digits = |s: &str| s.bytes().all(|byte| byte.is_ascii_digit());
	if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
		return Err(invalid())
	}

	let fraction = fraction.trim_end_matches('0');
	if fraction.len() > usize::from(decimals) {
		return Err(AmountError::TooPrecise { amount: amount.to_owned(), decimals })
	}

	let unit = 10u128.checked_pow(u32::from(decimals)).ok_or_else(overflow)?;
	let whole = whole.parse::<u128>().map_err(|_| overflow())?;
	let fraction = match fraction {
		"" => 0,
		digits => {
			let scale = 10u128.pow(u32::from(decimals) - digits.len() as u32);
			digits.parse::<u128>().map_err(|_| invalid())? * scale
		},
	};
	whole.checked_mul(unit).and_then(|base| base.checked_add(fraction)).ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	#[test]
	fn whole_and_fractional_amounts() {
		assert_eq!(to_base_units("1", 12), Ok(1_000_000_000_000));
		assert_eq!(to_base_units("1.5", 10), Ok(15_000_000_000));
		assert_eq!(to_base_units(" 0.000000000001 ", 12), Ok(1));
		assert_eq!(to_base_units("1.10", 1), Ok(11));
		assert_eq!(to_base_units("42", 0), Ok(42));
	}

	#[test]
	fn digits_finer_than_a_base_unit_are_rejected() {
		assert_matches!(to_base_units("0.0000000000001", 12), Err(AmountError::TooPrecise { .. }));
		assert_matches!(to_base_units("1.5", 0), Err(AmountError::TooPrecise { decimals: 0, .. }));
	}

	#[test]
	fn malformed_amounts_are_rejected() {
		for amount in ["", "abc", "1.", ".5", "-1", "1e3", "1.2.3", "0x10"] {
			assert_matches!(to_base_units(amount, 12), Err(AmountError::Invalid(_)), "{amount}");
		}
	}

	#[test]
	fn overflows_are_detected() {
		assert_matches!(
			to_base_units("340282366920938463463374607431768211456", 0),
			Err(AmountError::Overflow(_))
		);
		assert_matches!(to_base_units("1000000000000000000000000000", 12), Err(AmountError::Overflow(_)));
		assert_matches!(to_base_units("1", 39), Err(AmountError::Overflow(_)));
	}
}
