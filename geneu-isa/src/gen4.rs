//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! The legacy encoding shared by Gen4 through Gen7.
//!
//! Operand fields sit where Gen8 later put them, but the register files and
//! types are packed into word 1, the flag register moved to word 2 and
//! indirect addressing uses a 3-bit address subregister with a contiguous
//! offset. Message descriptors changed layout every generation or two.

use geneu_isa_proc_macro::instruction_layout;

use crate::{
	generation::Generation,
	layout::{Field, Fields, Layout, Role, Words},
	util::sign_extend,
};

instruction_layout! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Gen4;

	impl Fields for Gen4 {
		opcode [6:0],
		access_mode [8],
		mask_control [9],
		dep_control [11:10],
		// compression control before Gen6
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

		dst_reg_file [33:32],
		dst_reg_type [36:34],
		src0_reg_file [38:37],
		src0_reg_type [41:39],
		src1_reg_file [43:42],
		src1_reg_type [46:44],
		nib_control [47],
		dst_da1_subreg_nr [52:48],
		dst_da16_subreg_nr [52],
		da16_writemask [51:48],
		dst_da_reg_nr [60:53],
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
		flag_subreg_nr [89],
		flag_reg_nr [90],

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

		flag_subreg_nr_3src [33],
		flag_reg_nr_3src [34],
		src0_3src_abs [36],
		src0_3src_negate [37],
		src1_3src_abs [38],
		src1_3src_negate [39],
		src2_3src_abs [40],
		src2_3src_negate [41],
		// Gen7 only; Gen6 three-source instructions are always float
		src_3src_type [43:42],
		dst_3src_type [45:44],
		dst_3src_writemask [52:49],
		dst_3src_subreg_nr [55:53],
		dst_3src_reg_nr [63:56],

		src0_3src_rep_ctrl [64],
		src0_3src_swizzle [72:65],
		src0_3src_subreg_nr [75:73],
		src0_3src_reg_nr [83:76],

		src1_3src_rep_ctrl [85],
		src1_3src_swizzle [93:86],
		src1_3src_subreg_nr_low [95:94],
		src1_3src_subreg_nr_high [96],
		src1_3src_reg_nr [104:97],

		src2_3src_rep_ctrl [106],
		src2_3src_swizzle [114:107],
		src2_3src_subreg_nr [117:115],
		src2_3src_reg_nr [125:118],
	}

	impl Gen4 {
		dst_ia1_addr_imm [57:48],
		dst_ia_subreg_nr [60:58],
		src0_ia1_addr_imm [73:64],
		src0_ia_subreg_nr [76:74],
		src1_ia1_addr_imm [105:96],
		src1_ia_subreg_nr [108:106],

		gen7_jip [111:96],
		gen7_uip [127:112],
		gen6_jump_count [63:48],
		gen4_jump_count [111:96],
		gen4_pop_count [115:112],
	}
}

instruction_layout! {
	/// Send message descriptor fields of Gen7.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Gen7Message;

	impl Gen7Message {
		eot [127],
		mlen [124:121],
		rlen [120:116],
		header_present [115],
		function_control [114:96],

		urb_per_slot_offset [112],
		urb_complete [111],
		urb_interleave [110],
		urb_global_offset [109:99],
		urb_opcode [98:96],

		sampler_simd_mode [114:113],
		sampler_msg_type [112:108],
		sampler [107:104],
		sampler_binding_table_index [103:96],

		dp_category [114],
		dp_message_type [113:110],
		dp_message_control [109:104],
		dp_binding_table_index [103:96],
	}
}

instruction_layout! {
	/// Send message descriptor fields of Gen5 and Gen6.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Gen5Message;

	impl Gen5Message {
		eot [127],
		mlen [124:121],
		rlen [120:116],
		header_present [115],
		function_control [114:96],
		// Gen5 only; Gen6 moved it into the header
		sfid [95:92],

		urb_complete [111],
		urb_used [110],
		urb_allocate [109],
		urb_swizzle_control [107:106],
		urb_offset [105:100],
		urb_opcode [99:96],

		sampler_simd_mode [113:112],
		sampler_msg_type [111:108],
		sampler [107:104],
		sampler_binding_table_index [103:96],

		dp_binding_table_index [103:96],

		math_function [99:96],
	}
}

instruction_layout! {
	/// Send message descriptor fields of Gen4.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Gen4Message;

	impl Gen4Message {
		eot [127],
		msg_target [123:120],
		mlen [119:116],
		rlen [115:112],
		function_control [111:96],

		urb_complete [111],
		urb_used [110],
		urb_allocate [109],
		urb_swizzle_control [107:106],
		urb_offset [105:100],
		urb_opcode [99:96],

		sampler_msg_type [111:110],
		sampler_return_format [109:108],
		sampler [107:104],
		sampler_binding_table_index [103:96],

		dp_binding_table_index [103:96],

		math_function [99:96],
	}
}

impl Gen4 {
	fn indirect_fields(role: Role) -> (Field, Field) {
		match role {
			Role::Dst => (Self::DST_IA_SUBREG_NR, Self::DST_IA1_ADDR_IMM),
			Role::Src0 => (Self::SRC0_IA_SUBREG_NR, Self::SRC0_IA1_ADDR_IMM),
			Role::Src1 => (Self::SRC1_IA_SUBREG_NR, Self::SRC1_IA1_ADDR_IMM),
		}
	}
}

impl Layout for Gen4 {
	const NAME: &'static str = "Gen4";

	fn covers(gen: Generation) -> bool {
		gen <= Generation::Gen7
	}

	fn indirect(words: &Words, role: Role) -> (u32, i32) {
		let (subreg, offset) = Self::indirect_fields(role);
		(
			subreg.get(words),
			sign_extend(offset.get(words), offset.width()),
		)
	}

	fn set_indirect(words: &mut Words, role: Role, subreg: u32, offset: i32) {
		let (subreg_field, offset_field) = Self::indirect_fields(role);
		subreg_field.set(words, subreg);
		offset_field.set(words, offset as u32);
	}

	fn jump_targets(words: &Words, gen: Generation) -> (i32, i32) {
		let signed = |field: Field| sign_extend(field.get(words), field.width());

		match gen {
			Generation::Gen7 => (signed(Self::GEN7_JIP), signed(Self::GEN7_UIP)),
			Generation::Gen6 => (signed(Self::GEN6_JUMP_COUNT), signed(Self::GEN7_UIP)),
			_ => (
				signed(Self::GEN4_JUMP_COUNT),
				Self::GEN4_POP_COUNT.get(words) as i32,
			),
		}
	}

	fn set_jump_targets(words: &mut Words, gen: Generation, jip: i32, uip: i32) {
		match gen {
			Generation::Gen7 => {
				Self::GEN7_JIP.set(words, jip as u32);
				Self::GEN7_UIP.set(words, uip as u32);
			},
			Generation::Gen6 => {
				Self::GEN6_JUMP_COUNT.set(words, jip as u32);
				Self::GEN7_UIP.set(words, uip as u32);
			},
			_ => {
				Self::GEN4_JUMP_COUNT.set(words, jip as u32);
				Self::GEN4_POP_COUNT.set(words, uip as u32);
			},
		}
	}
}
