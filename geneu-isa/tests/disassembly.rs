//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use geneu_isa::{
	control::{AccessMode, MaskControl, MathFunction, Modifier, PredicateControl},
	disassemble,
	layout::Fields,
	message::{DataportMessage, SamplerMessage, Sfid, UrbMessage},
	opcode::OPCODE_DESCS,
	reg::{ExecSize, Region, RegisterType, Swizzle, Width, WriteMask},
	Gen4, Gen4Instruction, Gen8, Gen8Instruction, Generation, Instruction, Layout, Opcode,
	Register,
};

fn mov<L: Layout>(gen: Generation) -> Instruction<L> {
	let mut inst = Instruction::<L>::new(gen);
	inst.set_opcode(Opcode::Mov);
	inst.set_exec_size(ExecSize::E8);
	inst.set_dst(Register::grf(4, 0));
	inst.set_src0(Register::grf(5, 0).vec1());
	inst
}

fn mov_text(cluster: &str) -> String {
	format!(
		"{:<16}{:<16}{:<32}{}\n",
		"mov(8)", "g4<1>F", "g5<0,1,0>F", cluster
	)
}

#[test]
fn mov_scalar_broadcast() {
	let output = mov::<Gen8>(Generation::Gen8).disassemble();
	assert_eq!(output.errors, 0);
	assert_eq!(output.text, mov_text("{ align1 WE_normal 1Q };"));
}

#[test]
fn legacy_layout_prints_the_same_mov() {
	for gen in [Generation::Gen6, Generation::Gen7] {
		let output = mov::<Gen4>(gen).disassemble();
		assert!(output.is_clean(), "{}: {}", gen, output.text);
		assert_eq!(output.text, mov_text("{ align1 WE_normal 1Q };"));
	}

	// compression control instead of quarter control
	let output = mov::<Gen4>(Generation::Gen5).disassemble();
	assert!(output.is_clean());
	assert_eq!(output.text, mov_text("{ align1 WE_normal };"));
}

#[test]
fn sampler_send() {
	let mut inst = Gen8Instruction::new(Generation::Gen8);
	inst.set_opcode(Opcode::Send);
	inst.set_exec_size(ExecSize::E8);
	inst.set_dst(Register::grf(10, 0).with_type(RegisterType::UW));
	inst.set_src0(Register::grf(2, 0).with_type(RegisterType::UD));
	inst.set_sampler_message(
		&SamplerMessage {
			binding_table_index: 3,
			sampler: 0,
			msg_type: 2,
			simd_mode: 1,
		},
		2,
		4,
		true,
	);

	let output = inst.disassemble();
	assert!(output.is_clean(), "{}", output.text);

	let lines: Vec<&str> = output.text.lines().collect();
	assert_eq!(lines.len(), 2);
	assert!(lines[0].starts_with("send(8)"));
	assert!(lines[0].contains("g10<1>UW"));
	assert!(lines[0].contains("g2<8,8,1>UD"));
	assert!(lines[1].starts_with(&format!("{:16}sampler (3, 0, 2, 1) mlen 2 rlen 4", "")));
	assert!(lines[1].ends_with("{ align1 WE_normal 1Q };"));
	assert!(!output.text.contains("EOT"));
}

#[test]
fn urb_write_with_end_of_thread() {
	let mut inst = Gen8Instruction::new(Generation::Gen9);
	inst.set_opcode(Opcode::Send);
	inst.set_exec_size(ExecSize::E8);
	inst.set_mask_control(MaskControl::Disable);
	inst.set_dst(Register::null().with_type(RegisterType::UD));
	inst.set_urb_message(
		&UrbMessage {
			opcode: 0,
			offset: 3,
			interleave: true,
			complete: false,
		},
		5,
		0,
		true,
	);

	let output = inst.disassemble();
	assert!(output.is_clean(), "{}", output.text);
	assert!(output.text.contains("g113<8,8,1>F"));
	assert!(output
		.text
		.contains("URB write HWord interleaved 3 0 mlen 5 rlen 0"));
	assert!(output.text.ends_with("{ align1 WE_all 1Q EOT };\n"));
}

#[test]
fn dataport_function_control() {
	let mut inst = Gen4Instruction::new(Generation::Gen7);
	inst.set_opcode(Opcode::Send);
	inst.set_exec_size(ExecSize::E16);
	inst.set_dst(Register::grf(20, 0).with_type(RegisterType::UD).vec16());
	inst.set_src0(Register::grf(2, 0).with_type(RegisterType::UD));
	inst.set_dp_message(
		&DataportMessage {
			sfid: Sfid::DataCache,
			binding_table_index: 5,
			msg_type: 3,
			msg_control: 2,
		},
		1,
		2,
		false,
		false,
	);

	let output = inst.disassemble();
	assert!(output.is_clean(), "{}", output.text);
	assert!(output
		.text
		.contains("dp/data_cache (5, 0xc205) mlen 1 rlen 2"));
	assert!(output.text.ends_with("{ align1 WE_normal 1H };\n"));
}

#[test]
fn legacy_math_message() {
	let mut inst = Gen4Instruction::new(Generation::Gen5);
	inst.set_opcode(Opcode::Send);
	inst.set_exec_size(ExecSize::E8);
	inst.set_modifier(Modifier::MessageRegister(2));
	inst.set_dst(Register::grf(3, 0));
	inst.set_src0(Register::mrf(2, 0));
	inst.set_math_message(MathFunction::Sqrt, 1, 1);

	let output = inst.disassemble();
	assert!(output.is_clean(), "{}", output.text);
	assert!(output.text.starts_with("send 2(8)"));
	assert!(output.text.contains("m2<8,8,1>F"));
	assert!(output.text.contains("math sqrt mlen 1 rlen 1"));
}

#[test]
fn math_prints_its_function() {
	let mut inst = Gen8Instruction::new(Generation::Gen8);
	inst.set_opcode(Opcode::Math);
	inst.set_exec_size(ExecSize::E8);
	inst.set_modifier(Modifier::MathFunction(MathFunction::Rsq));
	inst.set_dst(Register::grf(6, 0));
	inst.set_src0(Register::grf(7, 0));
	inst.set_src1(Register::null().with_type(RegisterType::F));

	let output = inst.disassemble();
	assert!(output.is_clean());
	assert!(output.text.starts_with("math rsq(8)"));
	assert!(output.text.contains(" null "));
}

#[test]
fn invalid_opcode_keeps_going() {
	let mut inst = mov::<Gen8>(Generation::Gen8);
	inst.set(Gen8::OPCODE, 127);

	let output = inst.disassemble();
	assert!(output.errors > 0);
	assert!(output.text.starts_with("*** invalid opcode value 127 "));
	assert!(output.text.ends_with("{ align1 WE_normal 1Q };\n"));
}

#[test]
fn three_source_opcodes_need_gen6() {
	let mut inst = Gen4Instruction::new(Generation::Gen5);
	inst.set(Gen4::OPCODE, Opcode::Mad as u32);
	let output = inst.disassemble();
	assert!(output.text.starts_with("*** invalid opcode value 91 "));
	assert_eq!(output.errors, 1);
}

#[test]
fn invalid_fields_are_counted() {
	let mut inst = mov::<Gen8>(Generation::Gen8);
	// register file 2 was the MRF, which Gen8 doesn't have
	inst.set(Gen8::SRC0_REG_FILE, 2);
	inst.set(Gen8::SRC0_DA1_WIDTH, 7);

	let output = inst.disassemble();
	assert_eq!(output.errors, 2, "{}", output.text);
	assert!(output.text.contains("*** invalid src reg file value 2 "));
	assert!(output.text.contains("*** invalid width value 7 "));
}

#[test]
fn mad_text() {
	let mut inst = Gen8Instruction::new(Generation::Gen8);
	inst.set_opcode(Opcode::Mad);
	inst.set_access_mode(AccessMode::Align16);
	inst.set_exec_size(ExecSize::E8);
	inst.set_3src_dst(Register::grf(10, 0).with_writemask(WriteMask::X | WriteMask::Y));
	inst.set_3src_src(0, Register::grf(2, 0).vec4());
	inst.set_3src_src(1, Register::grf(3, 4).vec1().negated());
	inst.set_3src_src(2, Register::grf(4, 0).vec4().with_swizzle(Swizzle::WWWW));

	let output = inst.disassemble();
	assert!(output.is_clean(), "{}", output.text);
	assert_eq!(
		output.text,
		format!(
			"{:<16}{:<16}{:<16}{:<16}{} {}\n",
			"mad(8)",
			"g10<1>.xyF",
			"g2<4,1,1>F",
			"-g3.1<0,1,0>F",
			"g4<4,1,1>F.w",
			"{ align16 WE_normal 1Q };"
		)
	);
}

#[test]
fn predicated_legacy_mad() {
	for (gen, nr, subnr, prefix) in [
		(Generation::Gen6, 0, 1, "(+f0.1) "),
		(Generation::Gen7, 1, 1, "(+f1.1) "),
		(Generation::Gen7, 0, 0, "(+f0) "),
	] {
		let mut inst = Gen4Instruction::new(gen);
		inst.set_opcode(Opcode::Mad);
		inst.set_access_mode(AccessMode::Align16);
		inst.set_exec_size(ExecSize::E8);
		inst.set_predicate(PredicateControl::Normal, false);
		inst.set_3src_dst(Register::grf(10, 0));
		inst.set_3src_src(0, Register::grf(2, 0).vec4());
		inst.set_3src_src(1, Register::grf(3, 0).vec4().with_swizzle(Swizzle::YYYY));
		inst.set_3src_src(2, Register::grf(4, 0).vec4());
		inst.set_flag_reg(nr, subnr);

		assert_eq!(inst.flag_reg(), (nr, subnr));
		assert_eq!(inst.src_3src(1).unwrap().swizzle, Swizzle::YYYY);

		let output = inst.disassemble();
		assert!(output.is_clean(), "{}", output.text);
		assert!(
			output.text.starts_with(&format!("{}mad(8)", prefix)),
			"{:?}: {}",
			gen,
			output.text
		);
		assert!(output.text.contains("g3<4,1,1>F.y"), "{}", output.text);
	}
}

#[test]
fn every_opcode_encoding_prints() {
	for raw in 0..128u32 {
		let inst = Gen8Instruction::from_words(Generation::Gen8, [raw, 0, 0, 0]);
		let output = inst.disassemble();

		match OPCODE_DESCS[raw as usize].name {
			Some(name) => assert!(
				output.text.starts_with(name),
				"{}: {}",
				raw,
				output.text
			),
			None => {
				assert!(output
					.text
					.starts_with(&format!("*** invalid opcode value {} ", raw)));
				assert!(output.errors > 0);
			},
		}
		assert!(output.text.ends_with(";\n"));
	}
}

#[test]
fn dispatch_by_generation() {
	let gen8 = mov::<Gen8>(Generation::Gen8);
	assert_eq!(
		disassemble(Generation::Gen8, gen8.words()),
		gen8.disassemble()
	);

	let gen7 = mov::<Gen4>(Generation::Gen7);
	assert_eq!(
		disassemble(Generation::Gen7, gen7.words()),
		gen7.disassemble()
	);
	assert_ne!(gen7.words(), gen8.words());
}

#[test]
fn region_widths_print_as_elements() {
	let mut inst = Gen8Instruction::new(Generation::Gen8);
	inst.set_opcode(Opcode::Add);
	inst.set_exec_size(ExecSize::E16);
	inst.set_dst(Register::grf(8, 0).with_type(RegisterType::W).vec16());
	inst.set_src0(
		Register::grf(9, 4)
			.with_type(RegisterType::W)
			.with_region(Region::contiguous(Width::W16)),
	);
	inst.set_src1(Register::imm_w(-7));

	let output = inst.disassemble();
	assert!(output.is_clean(), "{}", output.text);
	assert!(output.text.contains("g8<1>W"));
	assert!(output.text.contains("g9.2<16,16,1>W"));
	assert!(output.text.contains("-7W"));
	assert!(output.text.contains(" 1H };"));
}
