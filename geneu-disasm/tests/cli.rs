//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{
	fs,
	io::Write,
	path::Path,
	process::{Command, Output, Stdio},
};

use geneu_isa::{reg::ExecSize, Gen8Instruction, Generation, Opcode, Program, Register};

fn disasm(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_geneu-disasm"))
		.args(args)
		.output()
		.unwrap()
}

fn program() -> Program {
	let mut inst = Gen8Instruction::new(Generation::Gen8);
	inst.set_opcode(Opcode::Mov);
	inst.set_exec_size(ExecSize::E8);
	inst.set_dst(Register::grf(4, 0));
	inst.set_src0(Register::grf(5, 0).vec1());
	Program::new(vec![inst.words(), inst.words()])
}

fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> String {
	let path = dir.join(name);
	fs::write(&path, contents).unwrap();
	path.to_str().unwrap().to_string()
}

#[test]
fn word_input_to_stdout() {
	let dir = tempfile::tempdir().unwrap();
	let input = write(dir.path(), "prog.hex", program().to_c_array());

	let output = disasm(&["-g", "8", &input]);
	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout).unwrap();
	assert_eq!(stdout, program().disassemble(Generation::Gen8).text);
	assert_eq!(stdout.lines().count(), 2);
	assert!(stdout.starts_with("mov(8)"));
}

#[test]
fn all_input_formats() {
	let dir = tempfile::tempdir().unwrap();
	let expected = program().disassemble(Generation::Gen9).text;

	let raw = write(dir.path(), "prog.bin", program().to_binary());
	let byte_text: String = program()
		.to_binary()
		.iter()
		.map(|byte| format!("0x{:02x},\n", byte))
		.collect();
	let bytes = write(dir.path(), "prog.c", byte_text);

	for args in [["--raw", raw.as_str()], ["--binary", bytes.as_str()]] {
		let output_path = dir.path().join("out.txt");
		let output = disasm(&[
			"--gen",
			"9",
			"-o",
			output_path.to_str().unwrap(),
			args[0],
			args[1],
		]);
		assert!(output.status.success(), "{:?}", args);
		assert_eq!(fs::read_to_string(&output_path).unwrap(), expected);
	}
}

#[test]
fn reads_standard_input() {
	let mut child = Command::new(env!("CARGO_BIN_EXE_geneu-disasm"))
		.args(["-g", "8", "-"])
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.spawn()
		.unwrap();
	child
		.stdin
		.take()
		.unwrap()
		.write_all(program().to_c_array().as_bytes())
		.unwrap();

	let output = child.wait_with_output().unwrap();
	assert!(output.status.success());
	assert!(String::from_utf8(output.stdout).unwrap().starts_with("mov(8)"));
}

#[test]
fn invalid_fields_still_succeed() {
	let dir = tempfile::tempdir().unwrap();
	let input = write(dir.path(), "bad.hex", "0x0000007f 0x0 0x0 0x0");

	let output = disasm(&["-g", "9", &input]);
	assert!(output.status.success());
	assert!(String::from_utf8(output.stdout)
		.unwrap()
		.starts_with("*** invalid opcode value 127 "));
}

#[test]
fn missing_input_fails() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("missing.hex");

	let output = disasm(&[missing.to_str().unwrap()]);
	assert_eq!(output.status.code(), Some(1));
	assert!(output.stdout.is_empty());
	assert!(String::from_utf8(output.stderr)
		.unwrap()
		.contains("missing.hex"));
}

#[test]
fn empty_program_fails() {
	let dir = tempfile::tempdir().unwrap();
	let input = write(dir.path(), "empty.hex", "// nothing here\n0x1 0x2\n");

	let output = disasm(&[&input]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8(output.stderr)
		.unwrap()
		.contains("No instructions"));
}

#[test]
fn unwritable_output_fails() {
	let dir = tempfile::tempdir().unwrap();
	let input = write(dir.path(), "prog.hex", program().to_c_array());
	let output_path = dir.path().join("no-such-dir").join("out.txt");

	let output = disasm(&["-g", "8", "-o", output_path.to_str().unwrap(), &input]);
	assert_eq!(output.status.code(), Some(1));
}

#[test]
fn bad_arguments_fail() {
	let dir = tempfile::tempdir().unwrap();
	let input = write(dir.path(), "prog.hex", program().to_c_array());

	for args in [
		vec!["-g", "3", input.as_str()],
		vec!["-g", "10", input.as_str()],
		vec!["--raw", "--binary", input.as_str()],
		vec![],
	] {
		assert_eq!(disasm(&args).status.code(), Some(1), "{:?}", args);
	}

	assert!(disasm(&["--help"]).status.success());
}
