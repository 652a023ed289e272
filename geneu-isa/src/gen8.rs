//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! The Gen8 encoding, also used by Gen9.

use geneu_isa_proc_macro::instruction_layout;

use crate::{
	generation::Generation,
	layout::{Field, Fields, Layout, Role, Words},
	util::sign_extend,
};

instruction_layout! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Gen8;

	impl Fields for Gen8 {
		opcode [6:0],
		access_mode [8],
		dep_control [10:9],
		nib_control [11],
		qtr_control [13:12],
		thread_control [15:14],
		pred_control [19:16],
		pred_inv [20],
		exec_size [23:21],
		cond_modifier [27:24],
		acc_wr_control [28],
		cmpt_control [29],
		debug_control [30],
		saturate [31],

		flag_subreg_nr [32],
		flag_reg_nr [33],
		flag_subreg_nr_3src [32],
		flag_reg_nr_3src [33],
		mask_control [34],

		dst_reg_file [36:35],
		dst_reg_type [40:37],
		src0_reg_file [42:41],
		src0_reg_type [46:43],
		dst_da_reg_nr [60:53],
		dst_da1_subreg_nr [52:48],
		dst_da16_subreg_nr [52],
		da16_writemask [51:48],
		dst_da1_hstride [62:61],
		dst_address_mode [63],

		src0_da1_subreg_nr [68:64],
		src0_da16_subreg_nr [68],
		src0_da16_swiz_x [65:64],
		src0_da16_swiz_y [67:66],
		src0_da_reg_nr [76:69],
		src0_abs [77],
		src0_negate [78],
		src0_address_mode [79],
		src0_da1_hstride [81:80],
		src0_da16_swiz_z [81:80],
		src0_da1_width [84:82],
		src0_da16_swiz_w [83:82],
		src0_vert_stride [88:85],

		src1_reg_file [90:89],
		src1_reg_type [94:91],
		src1_da1_subreg_nr [100:96],
		src1_da16_subreg_nr [100],
		src1_da16_swiz_x [97:96],
		src1_da16_swiz_y [99:98],
		src1_da_reg_nr [108:101],
		src1_abs [109],
		src1_negate [110],
		src1_address_mode [111],
		src1_da1_hstride [113:112],
		src1_da16_swiz_z [113:112],
		src1_da1_width [116:114],
		src1_da16_swiz_w [115:114],
		src1_vert_stride [120:117],

		src_3src_type [45:43],
		dst_3src_type [48:46],
		dst_3src_writemask [52:49],
		dst_3src_subreg_nr [55:53],
		dst_3src_reg_nr [63:56],

		src0_3src_negate [38],
		src0_3src_abs [37],
		src0_3src_rep_ctrl [64],
		src0_3src_swizzle [72:65],
		src0_3src_subreg_nr [75:73],
		src0_3src_reg_nr [83:76],

		src1_3src_negate [40],
		src1_3src_abs [39],
		src1_3src_rep_ctrl [85],
		src1_3src_swizzle [93:86],
		src1_3src_subreg_nr_low [95:94],
		src1_3src_subreg_nr_high [96],
		src1_3src_reg_nr [104:97],

		src2_3src_negate [42],
		src2_3src_abs [41],
		src2_3src_rep_ctrl [106],
		src2_3src_swizzle [114:107],
		src2_3src_subreg_nr [117:115],
		src2_3src_reg_nr [125:118],
	}

	impl Gen8 {
		dst_ida1_imm9 [47],
		dst_ida1_imm8 [56:48],
		dst_ida_subreg_nr [60:57],
		src0_ida1_imm9 [95],
		src0_ida1_imm8 [72:64],
		src0_ida_subreg_nr [76:73],
		src1_ida1_imm9 [121],
		src1_ida1_imm8 [104:96],
		src1_ida_subreg_nr [108:105],

		uip [95:64],
		jip [127:96],
	}
}

instruction_layout! {
	/// Send message descriptor fields of Gen8 and Gen9.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Gen8Message;

	impl Gen8Message {
		eot [127],
		mlen [124:121],
		rlen [120:116],
		header_present [115],
		function_control [114:96],

		urb_per_slot_offset [113],
		urb_interleave [111],
		urb_global_offset [110:100],
		urb_opcode [99:96],

		sampler_simd_mode [114:113],
		sampler_msg_type [112:108],
		sampler [107:104],
		sampler_binding_table_index [103:96],

		dp_category [114],
		dp_message_type [113:110],
		dp_message_control [109:104],
		dp_binding_table_index [103:96],

		ts_opcode [96],
		ts_request_type [97],
		ts_resource_select [100],

		vme_message_type [110:109],

		// Gen9 extended descriptor, scattered over unused src1 bits of SEND.
		extdesc_3_0 [67:64],
		extdesc_7_4 [83:80],
		extdesc_11_8 [88:85],
		extdesc_15_12 [94:91],
	}
}

impl Gen8 {
	fn indirect_fields(role: Role) -> (Field, Field, Field) {
		match role {
			Role::Dst => (
				Self::DST_IDA_SUBREG_NR,
				Self::DST_IDA1_IMM8,
				Self::DST_IDA1_IMM9,
			),
			Role::Src0 => (
				Self::SRC0_IDA_SUBREG_NR,
				Self::SRC0_IDA1_IMM8,
				Self::SRC0_IDA1_IMM9,
			),
			Role::Src1 => (
				Self::SRC1_IDA_SUBREG_NR,
				Self::SRC1_IDA1_IMM8,
				Self::SRC1_IDA1_IMM9,
			),
		}
	}
}

impl Layout for Gen8 {
	const NAME: &'static str = "Gen8";

	fn covers(gen: Generation) -> bool {
		gen >= Generation::Gen8
	}

	fn indirect(words: &Words, role: Role) -> (u32, i32) {
		let (subreg, imm8, imm9) = Self::indirect_fields(role);
		// the offset is 10 bits wide with its top bit stored apart from the
		// low nine
		let offset = imm8.get(words) | (imm9.get(words) << 9);
		(
			subreg.get(words),
			sign_extend(offset, 10),
		)
	}

	fn set_indirect(words: &mut Words, role: Role, subreg: u32, offset: i32) {
		let (subreg_field, imm8, imm9) = Self::indirect_fields(role);
		subreg_field.set(words, subreg);
		imm8.set(words, (offset as u32) & 0x1ff);
		imm9.set(words, ((offset as u32) >> 9) & 1);
	}

	fn jump_targets(words: &Words, _gen: Generation) -> (i32, i32) {
		(Self::JIP.get(words) as i32, Self::UIP.get(words) as i32)
	}

	fn set_jump_targets(words: &mut Words, _gen: Generation, jip: i32, uip: i32) {
		Self::JIP.set(words, jip as u32);
		Self::UIP.set(words, uip as u32);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::get_bits;

	#[test]
	fn documented_positions() {
		assert_eq!((Gen8::OPCODE.high, Gen8::OPCODE.low), (6, 0));
		assert_eq!((Gen8::EXEC_SIZE.high, Gen8::EXEC_SIZE.low), (23, 21));
		assert_eq!((Gen8::DST_REG_FILE.high, Gen8::DST_REG_FILE.low), (36, 35));
		assert_eq!((Gen8::DST_REG_TYPE.high, Gen8::DST_REG_TYPE.low), (40, 37));
		assert_eq!((Gen8Message::MLEN.high, Gen8Message::MLEN.low), (124, 121));
		assert_eq!((Gen8Message::RLEN.high, Gen8Message::RLEN.low), (120, 116));
		assert_eq!((Gen8Message::EOT.high, Gen8Message::EOT.low), (127, 127));
	}

	#[test]
	fn fields_table_lists_everything() {
		assert!(Gen8::FIELDS.contains(&Gen8::OPCODE));
		assert!(Gen8::FIELDS.contains(&Gen8::JIP));
		assert!(Gen8::FIELDS.iter().all(|field| field.high / 32 == field.low / 32));
		assert_eq!(Gen8Message::FIELDS.len(), 25);
	}

	#[test]
	fn indirect_offsets_are_ten_bit_signed() {
		for offset in [-512, -33, -1, 0, 1, 255, 256, 511] {
			let mut words = [0; 4];
			Gen8::set_indirect(&mut words, Role::Src1, 9, offset);
			assert_eq!(Gen8::indirect(&words, Role::Src1), (9, offset));
		}

		let mut words = [0; 4];
		Gen8::set_indirect(&mut words, Role::Dst, 3, -2);
		assert_eq!(get_bits(&words, 56, 48), 0x1fe);
		assert_eq!(get_bits(&words, 47, 47), 1);
		assert_eq!(get_bits(&words, 60, 57), 3);
	}

	#[test]
	fn jump_targets_are_full_words() {
		let mut words = [0; 4];
		Gen8::set_jump_targets(&mut words, Generation::Gen8, -64, 128);
		assert_eq!(words[3], -64i32 as u32);
		assert_eq!(words[2], 128);
		assert_eq!(Gen8::jump_targets(&words, Generation::Gen9), (-64, 128));
	}
}
