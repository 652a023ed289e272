//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{fmt, marker::PhantomData};

use crate::{generation::Generation, util::low_bits};

/// Raw storage of one instruction.
pub type Words = [u32; 4];

/// A named, contiguous bit range inside an instruction.
///
/// Bit indices count from the least significant bit of word 0, so bit 96 is
/// the low bit of word 3. A field never crosses a word boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
	pub name: &'static str,
	pub high: u32,
	pub low: u32,
}

impl Field {
	pub const fn new(name: &'static str, high: u32, low: u32) -> Self {
		assert!(high >= low, "field high bit is below its low bit");
		assert!(high < 128, "field lies outside of the instruction");
		assert!(high / 32 == low / 32, "field crosses a word boundary");
		Self { name, high, low }
	}

	pub const fn width(&self) -> u32 {
		self.high - self.low + 1
	}

	/// The largest value this field can hold.
	pub const fn max_value(&self) -> u32 {
		(!0u32) >> (32 - self.width())
	}

	pub fn get(&self, words: &Words) -> u32 {
		get_bits(words, self.high, self.low)
	}

	pub fn set(&self, words: &mut Words, value: u32) {
		set_bits(words, self.high, self.low, value)
	}
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.high == self.low {
			write!(f, "{} [{}]", self.name, self.high)
		} else {
			write!(f, "{} [{}:{}]", self.name, self.high, self.low)
		}
	}
}

fn word_of(high: u32, low: u32) -> usize {
	assert!(high >= low, "bit range {}:{} is inverted", high, low);
	assert!(high < 128, "bit range {}:{} lies outside of the instruction", high, low);
	assert!(
		high / 32 == low / 32,
		"bit range {}:{} crosses a 32-bit word boundary",
		high,
		low
	);
	(high / 32) as usize
}

/// Extracts bits `high..=low` right-justified.
pub fn get_bits(words: &Words, high: u32, low: u32) -> u32 {
	let word = words[word_of(high, low)];
	let shift = low % 32;
	low_bits(word >> shift, high - low + 1)
}

/// Replaces bits `high..=low` with `value`. Bits of `value` that don't fit
/// are dropped.
pub fn set_bits(words: &mut Words, high: u32, low: u32, value: u32) {
	let index = word_of(high, low);
	let shift = low % 32;
	let mask = low_bits(!0, high - low + 1) << shift;
	words[index] = (words[index] & !mask) | ((value << shift) & mask);
}

/// Fields every layout names the same way, so encoding and decoding can be
/// written once for all generations.
///
/// `cond_modifier` is shared by the conditional modifier, the math function
/// and the shared function ID; read it through [`crate::Modifier`].
pub trait Fields {
	const OPCODE: Field;
	const ACCESS_MODE: Field;
	const MASK_CONTROL: Field;
	const DEP_CONTROL: Field;
	const NIB_CONTROL: Field;
	const QTR_CONTROL: Field;
	const THREAD_CONTROL: Field;
	const PRED_CONTROL: Field;
	const PRED_INV: Field;
	const EXEC_SIZE: Field;
	const COND_MODIFIER: Field;
	const ACC_WR_CONTROL: Field;
	const CMPT_CONTROL: Field;
	const DEBUG_CONTROL: Field;
	const SATURATE: Field;
	const FLAG_REG_NR: Field;
	const FLAG_SUBREG_NR: Field;
	/// Three-source instructions keep their flag register elsewhere on some
	/// generations.
	const FLAG_REG_NR_3SRC: Field;
	const FLAG_SUBREG_NR_3SRC: Field;

	const DST_REG_FILE: Field;
	const DST_REG_TYPE: Field;
	const DST_ADDRESS_MODE: Field;
	const DST_DA_REG_NR: Field;
	const DST_DA1_SUBREG_NR: Field;
	const DST_DA16_SUBREG_NR: Field;
	const DST_DA1_HSTRIDE: Field;
	const DA16_WRITEMASK: Field;

	const SRC0_REG_FILE: Field;
	const SRC0_REG_TYPE: Field;
	const SRC0_ADDRESS_MODE: Field;
	const SRC0_DA_REG_NR: Field;
	const SRC0_DA1_SUBREG_NR: Field;
	const SRC0_DA16_SUBREG_NR: Field;
	const SRC0_DA1_HSTRIDE: Field;
	const SRC0_DA1_WIDTH: Field;
	const SRC0_VERT_STRIDE: Field;
	const SRC0_ABS: Field;
	const SRC0_NEGATE: Field;
	const SRC0_DA16_SWIZ_X: Field;
	const SRC0_DA16_SWIZ_Y: Field;
	const SRC0_DA16_SWIZ_Z: Field;
	const SRC0_DA16_SWIZ_W: Field;

	const SRC1_REG_FILE: Field;
	const SRC1_REG_TYPE: Field;
	const SRC1_ADDRESS_MODE: Field;
	const SRC1_DA_REG_NR: Field;
	const SRC1_DA1_SUBREG_NR: Field;
	const SRC1_DA16_SUBREG_NR: Field;
	const SRC1_DA1_HSTRIDE: Field;
	const SRC1_DA1_WIDTH: Field;
	const SRC1_VERT_STRIDE: Field;
	const SRC1_ABS: Field;
	const SRC1_NEGATE: Field;
	const SRC1_DA16_SWIZ_X: Field;
	const SRC1_DA16_SWIZ_Y: Field;
	const SRC1_DA16_SWIZ_Z: Field;
	const SRC1_DA16_SWIZ_W: Field;

	const DST_3SRC_REG_NR: Field;
	const DST_3SRC_SUBREG_NR: Field;
	const DST_3SRC_WRITEMASK: Field;
	const DST_3SRC_TYPE: Field;
	const SRC_3SRC_TYPE: Field;

	const SRC0_3SRC_REP_CTRL: Field;
	const SRC0_3SRC_SWIZZLE: Field;
	const SRC0_3SRC_SUBREG_NR: Field;
	const SRC0_3SRC_REG_NR: Field;
	const SRC0_3SRC_ABS: Field;
	const SRC0_3SRC_NEGATE: Field;

	const SRC1_3SRC_REP_CTRL: Field;
	const SRC1_3SRC_SWIZZLE: Field;
	const SRC1_3SRC_SUBREG_NR_LOW: Field;
	const SRC1_3SRC_SUBREG_NR_HIGH: Field;
	const SRC1_3SRC_REG_NR: Field;
	const SRC1_3SRC_ABS: Field;
	const SRC1_3SRC_NEGATE: Field;

	const SRC2_3SRC_REP_CTRL: Field;
	const SRC2_3SRC_SWIZZLE: Field;
	const SRC2_3SRC_SUBREG_NR: Field;
	const SRC2_3SRC_REG_NR: Field;
	const SRC2_3SRC_ABS: Field;
	const SRC2_3SRC_NEGATE: Field;
}

/// Which operand slot of an instruction a register occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	Dst,
	Src0,
	Src1,
}

/// A two-source operand slot's fields.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceFields {
	pub reg_file: Field,
	pub reg_type: Field,
	pub address_mode: Field,
	pub reg_nr: Field,
	pub da1_subreg_nr: Field,
	pub da16_subreg_nr: Field,
	pub hstride: Field,
	pub width: Field,
	pub vert_stride: Field,
	pub abs: Field,
	pub negate: Field,
	pub swizzle: [Field; 4],
}

impl SourceFields {
	pub(crate) fn of<L: Fields>(role: Role) -> Self {
		match role {
			Role::Src0 => Self {
				reg_file: L::SRC0_REG_FILE,
				reg_type: L::SRC0_REG_TYPE,
				address_mode: L::SRC0_ADDRESS_MODE,
				reg_nr: L::SRC0_DA_REG_NR,
				da1_subreg_nr: L::SRC0_DA1_SUBREG_NR,
				da16_subreg_nr: L::SRC0_DA16_SUBREG_NR,
				hstride: L::SRC0_DA1_HSTRIDE,
				width: L::SRC0_DA1_WIDTH,
				vert_stride: L::SRC0_VERT_STRIDE,
				abs: L::SRC0_ABS,
				negate: L::SRC0_NEGATE,
				swizzle: [
					L::SRC0_DA16_SWIZ_X,
					L::SRC0_DA16_SWIZ_Y,
					L::SRC0_DA16_SWIZ_Z,
					L::SRC0_DA16_SWIZ_W,
				],
			},
			Role::Src1 => Self {
				reg_file: L::SRC1_REG_FILE,
				reg_type: L::SRC1_REG_TYPE,
				address_mode: L::SRC1_ADDRESS_MODE,
				reg_nr: L::SRC1_DA_REG_NR,
				da1_subreg_nr: L::SRC1_DA1_SUBREG_NR,
				da16_subreg_nr: L::SRC1_DA16_SUBREG_NR,
				hstride: L::SRC1_DA1_HSTRIDE,
				width: L::SRC1_DA1_WIDTH,
				vert_stride: L::SRC1_VERT_STRIDE,
				abs: L::SRC1_ABS,
				negate: L::SRC1_NEGATE,
				swizzle: [
					L::SRC1_DA16_SWIZ_X,
					L::SRC1_DA16_SWIZ_Y,
					L::SRC1_DA16_SWIZ_Z,
					L::SRC1_DA16_SWIZ_W,
				],
			},
			Role::Dst => panic!("the destination is not a source operand"),
		}
	}
}

/// A hardware instruction layout.
///
/// The shared field positions come from [`Fields`]; everything that differs
/// structurally between layouts, not just in bit position, lives here.
pub trait Layout: Fields + Sized + 'static {
	const NAME: &'static str;

	/// Whether this layout encodes instructions for `gen`.
	fn covers(gen: Generation) -> bool;

	/// The address subregister and signed byte offset of a register-indirect
	/// operand.
	fn indirect(words: &Words, role: Role) -> (u32, i32);

	fn set_indirect(words: &mut Words, role: Role, subreg: u32, offset: i32);

	/// Jump targets of a flow control instruction, in the order they're
	/// printed.
	fn jump_targets(words: &Words, gen: Generation) -> (i32, i32);

	fn set_jump_targets(words: &mut Words, gen: Generation, jip: i32, uip: i32);
}

/// One instruction encoded with layout `L` for a specific generation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Instruction<L: Layout> {
	data: Words,
	gen: Generation,
	layout: PhantomData<L>,
}

impl<L: Layout> Instruction<L> {
	/// An all-zero instruction.
	///
	/// Panics if `L` doesn't cover `gen`.
	pub fn new(gen: Generation) -> Self {
		Self::from_words(gen, [0; 4])
	}

	pub fn from_words(gen: Generation, data: Words) -> Self {
		assert!(
			L::covers(gen),
			"the {} layout does not encode {} instructions",
			L::NAME,
			gen
		);
		Self {
			data,
			gen,
			layout: PhantomData,
		}
	}

	pub fn words(&self) -> Words {
		self.data
	}

	pub fn generation(&self) -> Generation {
		self.gen
	}

	pub fn get(&self, field: Field) -> u32 {
		field.get(&self.data)
	}

	pub fn set(&mut self, field: Field, value: u32) {
		field.set(&mut self.data, value)
	}

	pub fn get_bits(&self, high: u32, low: u32) -> u32 {
		get_bits(&self.data, high, low)
	}

	pub fn set_bits(&mut self, high: u32, low: u32, value: u32) {
		set_bits(&mut self.data, high, low, value)
	}

	pub(crate) fn words_mut(&mut self) -> &mut Words {
		&mut self.data
	}
}

impl<L: Layout> fmt::Debug for Instruction<L> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Instruction<{}>({}, {:#010x} {:#010x} {:#010x} {:#010x})",
			L::NAME,
			self.gen,
			self.data[0],
			self.data[1],
			self.data[2],
			self.data[3]
		)
	}
}
