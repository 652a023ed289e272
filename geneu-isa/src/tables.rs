//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Field value to mnemonic tables used by the disassembler.
//!
//! A `None` entry marks a reserved encoding.

use crate::generation::Generation;

pub(crate) type Table = &'static [Option<&'static str>];

pub(crate) static CONDITIONAL_MODIFIER: Table = &[
	Some(""),
	Some(".e"),
	Some(".ne"),
	Some(".g"),
	Some(".ge"),
	Some(".l"),
	Some(".le"),
	None,
	Some(".o"),
	Some(".u"),
];

// Gen4 and Gen5 still have the round-increment modifier.
pub(crate) static CONDITIONAL_MODIFIER_GEN4: Table = &[
	Some(""),
	Some(".e"),
	Some(".ne"),
	Some(".g"),
	Some(".ge"),
	Some(".l"),
	Some(".le"),
	Some(".r"),
	Some(".o"),
	Some(".u"),
];

pub(crate) static NEGATE: Table = &[Some(""), Some("-")];

pub(crate) static ABS: Table = &[Some(""), Some("(abs)")];

pub(crate) static VERT_STRIDE: Table = &[
	Some("0"),
	Some("1"),
	Some("2"),
	Some("4"),
	Some("8"),
	Some("16"),
	Some("32"),
	None,
	None,
	None,
	None,
	None,
	None,
	None,
	None,
	Some("VxH"),
];

pub(crate) static WIDTH: Table = &[Some("1"), Some("2"), Some("4"), Some("8"), Some("16")];

pub(crate) static HORIZ_STRIDE: Table = &[Some("0"), Some("1"), Some("2"), Some("4")];

pub(crate) static CHAN_SEL: Table = &[Some("x"), Some("y"), Some("z"), Some("w")];

pub(crate) static DEBUG_CTRL: Table = &[Some(""), Some(".breakpoint")];

pub(crate) static SATURATE: Table = &[Some(""), Some(".sat")];

pub(crate) static ACC_WR: Table = &[Some(""), Some("AccWrEnable")];

pub(crate) static MASK_CTRL: Table = &[Some("WE_normal"), Some("WE_all")];

pub(crate) static EXEC_SIZE: Table = &[
	Some("1"),
	Some("2"),
	Some("4"),
	Some("8"),
	Some("16"),
	Some("32"),
];

pub(crate) static PRED_INV: Table = &[Some("+"), Some("-")];

pub(crate) static PRED_CTRL_ALIGN16: Table = &[
	Some(""),
	Some(""),
	Some(".x"),
	Some(".y"),
	Some(".z"),
	Some(".w"),
	Some(".any4h"),
	Some(".all4h"),
];

pub(crate) static PRED_CTRL_ALIGN1: Table = &[
	Some(""),
	Some(""),
	Some(".anyv"),
	Some(".allv"),
	Some(".any2h"),
	Some(".all2h"),
	Some(".any4h"),
	Some(".all4h"),
	Some(".any8h"),
	Some(".all8h"),
	Some(".any16h"),
	Some(".all16h"),
	Some(".any32h"),
	Some(".all32h"),
];

pub(crate) static THREAD_CTRL: Table = &[Some(""), Some("atomic"), Some("switch")];

pub(crate) static DEP_CTRL: Table = &[
	Some(""),
	Some("NoDDClr"),
	Some("NoDDChk"),
	Some("NoDDClr,NoDDChk"),
];

// Gen4 and Gen5 only.
pub(crate) static COMPR_CTRL: Table = &[Some(""), Some("sechalf"), Some("compr")];

pub(crate) static ACCESS_MODE: Table = &[Some("align1"), Some("align16")];

pub(crate) static REG_FILE: Table = &[Some("A"), Some("g"), None, Some("imm")];

pub(crate) static REG_FILE_GEN4: Table = &[Some("A"), Some("g"), Some("m"), Some("imm")];

pub(crate) static WRITEMASK: Table = &[
	Some(".(none)"),
	Some(".x"),
	Some(".y"),
	Some(".xy"),
	Some(".z"),
	Some(".xz"),
	Some(".yz"),
	Some(".xyz"),
	Some(".w"),
	Some(".xw"),
	Some(".yw"),
	Some(".xyw"),
	Some(".zw"),
	Some(".xzw"),
	Some(".yzw"),
	Some(""),
];

pub(crate) static EOT: Table = &[Some(""), Some("EOT")];

pub(crate) static SFID: Table = &[
	Some("null"),
	None,
	Some("sampler"),
	Some("gateway"),
	Some("dp/sampler_cache"),
	Some("dp/render_cache"),
	Some("URB"),
	Some("thread_spawner"),
	Some("vme"),
	Some("dp/constant_cache"),
	Some("dp/data_cache"),
	Some("pi"),
	Some("dp/data_cache:1"),
	Some("cre"),
];

// Gen4 and Gen5 message targets.
pub(crate) static SFID_GEN4: Table = &[
	Some("null"),
	Some("math"),
	Some("sampler"),
	Some("gateway"),
	Some("dp/read"),
	Some("dp/write"),
	Some("URB"),
	Some("thread_spawner"),
];

pub(crate) static MATH_FUNCTION: Table = &[
	None,
	Some("inv"),
	Some("log"),
	Some("exp"),
	Some("sqrt"),
	Some("rsq"),
	Some("sin"),
	Some("cos"),
	None,
	Some("fdiv"),
	Some("pow"),
	Some("intdivmod"),
	Some("intdiv"),
	Some("intmod"),
	Some("invm"),
	Some("rsqrtm"),
];

pub(crate) static URB_OPCODE: Table = &[
	Some("write HWord"),
	Some("write OWord"),
	Some("read HWord"),
	Some("read OWord"),
	Some("atomic mov"),
	Some("atomic inc"),
	Some("atomic add"),
	Some("SIMD8 write"),
	Some("SIMD8 read"),
];

// Gen4 through Gen6.
pub(crate) static URB_OPCODE_GEN4: Table = &[Some("write"), Some("ff_sync")];

pub(crate) static URB_INTERLEAVE: Table = &[Some(""), Some("interleaved")];

pub(crate) static URB_COMPLETE: Table = &[Some(""), Some("complete")];

pub(crate) fn conditional_modifier(gen: Generation) -> Table {
	if gen < Generation::Gen6 {
		CONDITIONAL_MODIFIER_GEN4
	} else {
		CONDITIONAL_MODIFIER
	}
}

pub(crate) fn reg_file(gen: Generation) -> Table {
	if gen.has_mrf() {
		REG_FILE_GEN4
	} else {
		REG_FILE
	}
}

pub(crate) fn sfid(gen: Generation) -> Table {
	if gen.sfid_in_header() {
		SFID
	} else {
		SFID_GEN4
	}
}

pub(crate) fn urb_opcode(gen: Generation) -> Table {
	if gen >= Generation::Gen7 {
		URB_OPCODE
	} else {
		URB_OPCODE_GEN4
	}
}

/// Looks up `value`; `None` if reserved or out of range.
pub(crate) fn lookup(table: Table, value: u32) -> Option<&'static str> {
	table.get(value as usize).copied().flatten()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reserved_entries() {
		assert_eq!(lookup(CONDITIONAL_MODIFIER, 7), None);
		assert_eq!(lookup(CONDITIONAL_MODIFIER_GEN4, 7), Some(".r"));
		assert_eq!(lookup(VERT_STRIDE, 15), Some("VxH"));
		assert_eq!(lookup(VERT_STRIDE, 7), None);
		assert_eq!(lookup(SFID, 1), None);
		assert_eq!(lookup(SFID, 14), None);
		assert_eq!(lookup(MATH_FUNCTION, 8), None);
	}

	#[test]
	fn tables_by_generation() {
		assert_eq!(lookup(reg_file(Generation::Gen6), 2), Some("m"));
		assert_eq!(lookup(reg_file(Generation::Gen7), 2), None);
		assert_eq!(lookup(sfid(Generation::Gen5), 1), Some("math"));
		assert_eq!(lookup(sfid(Generation::Gen6), 10), Some("dp/data_cache"));
	}
}
