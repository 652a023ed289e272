//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt;

use num_enum::TryFromPrimitive;

/// A hardware generation with its own instruction encoding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum Generation {
	Gen4 = 4,
	Gen5 = 5,
	Gen6 = 6,
	Gen7 = 7,
	Gen8 = 8,
	Gen9 = 9,
}

/// First GRF that message registers are remapped onto once the MRF is gone.
pub const MRF_HACK_START: u32 = 112;

/// Number of general registers.
pub const MAX_GRF: u32 = 128;

impl Generation {
	pub const ALL: [Generation; 6] = [
		Generation::Gen4,
		Generation::Gen5,
		Generation::Gen6,
		Generation::Gen7,
		Generation::Gen8,
		Generation::Gen9,
	];

	pub const fn number(self) -> u32 {
		self as u32
	}

	/// Whether the message register file exists in hardware.
	pub const fn has_mrf(self) -> bool {
		(self as u32) < 7
	}

	pub const fn mrf_count(self) -> u32 {
		match self {
			Generation::Gen6 => 24,
			_ => 16,
		}
	}

	/// Whether three-source (Align16-only) instructions exist.
	pub const fn has_three_source(self) -> bool {
		(self as u32) >= 6
	}

	/// Whether three-source instructions carry their own operand types.
	pub const fn has_three_source_types(self) -> bool {
		(self as u32) >= 7
	}

	/// Whether header bits 13:12 are quarter control rather than
	/// compression control.
	pub const fn has_quarter_control(self) -> bool {
		(self as u32) >= 6
	}

	/// Whether the shared function ID lives in the header alongside the
	/// conditional modifier.
	pub const fn sfid_in_header(self) -> bool {
		(self as u32) >= 6
	}

	pub const fn has_df(self) -> bool {
		(self as u32) >= 7
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Gen{}", self.number())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generation_numbers() {
		assert_eq!(Generation::try_from(7).ok(), Some(Generation::Gen7));
		assert!(Generation::try_from(3).is_err());
		assert!(Generation::try_from(10).is_err());
		assert_eq!(Generation::Gen9.to_string(), "Gen9");
	}

	#[test]
	fn capabilities() {
		assert!(Generation::Gen6.has_mrf());
		assert!(!Generation::Gen7.has_mrf());
		assert!(!Generation::Gen5.has_three_source());
		assert!(Generation::Gen6.has_three_source());
		assert!(!Generation::Gen6.has_three_source_types());
		assert_eq!(Generation::Gen6.mrf_count(), 24);
	}
}
