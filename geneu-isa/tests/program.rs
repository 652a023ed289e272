//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use geneu_isa::{
	reg::ExecSize, Fields, Gen8, Gen8Instruction, Generation, Layout, Opcode, Program, Register,
};

fn add() -> Gen8Instruction {
	let mut inst = Gen8Instruction::new(Generation::Gen8);
	inst.set_opcode(Opcode::Add);
	inst.set_exec_size(ExecSize::E8);
	inst.set_dst(Register::grf(3, 0));
	inst.set_src0(Register::grf(4, 0));
	inst.set_src1(Register::imm_f(2.0));
	inst
}

#[test]
fn all_formats_agree() {
	let words = add().words();
	let program = Program::new(vec![words, words]);

	let from_words = Program::parse_words(&program.to_c_array()).unwrap();
	assert_eq!(from_words, program);

	let byte_text: String = program
		.to_binary()
		.iter()
		.map(|byte| format!("0x{:02x}, ", byte))
		.collect();
	let from_bytes = Program::parse_bytes(&byte_text).unwrap();
	assert_eq!(from_bytes, program);

	let from_binary = Program::from_binary(&program.to_binary());
	assert_eq!(from_binary, program);
}

#[test]
fn each_instruction_is_one_line() {
	let program: Program = (0..3).map(|_| add().words()).collect();
	let output = program.disassemble(Generation::Gen8);
	assert!(output.is_clean(), "{}", output.text);
	assert_eq!(output.text.lines().count(), 3);
	for line in output.text.lines() {
		assert!(line.starts_with("add(8)"), "{}", line);
		assert!(line.contains("2F"));
	}
}

#[test]
fn errors_are_summed_over_the_program() {
	let mut bad = add();
	bad.set(Gen8::OPCODE, 0);
	let program = Program::new(vec![bad.words(), add().words(), bad.words()]);

	let single = bad.disassemble().errors;
	assert!(single > 0);
	assert_eq!(program.disassemble(Generation::Gen8).errors, 2 * single);
}

#[test]
fn the_generation_picks_the_layout() {
	let program = Program::new(vec![add().words()]);
	assert!(Gen8::covers(Generation::Gen9));
	assert_eq!(
		program.disassemble(Generation::Gen9).text,
		program.disassemble(Generation::Gen8).text
	);
	// the same bits mean something else to the legacy layout
	assert_ne!(
		program.disassemble(Generation::Gen7).text,
		program.disassemble(Generation::Gen8).text
	);
}

#[test]
fn commented_listing() {
	let text = "\
// add(8) g3<1>F g4<8,8,1>F 2F
   { 0x00600040, 0x20600ce8, 0x3e000480, 0x40000000 },
/* trailing garbage: 0x1 0x2 */
";
	let program = Program::parse_words(text).unwrap();
	assert_eq!(program.len(), 1);
	assert_eq!(program.instructions()[0][0], 0x0060_0040);
}
