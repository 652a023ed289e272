//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Instruction lists as the assembler emits them and the disassembler reads
//! them.

use std::fmt::Write as _;

use byteorder::{ByteOrder, LittleEndian};
use log::{info, warn};
use pest::Parser;
use pest_derive::Parser;

use crate::{disasm::Disassembly, error::ProgramError, generation::Generation, layout::Words};

const INSTRUCTION_BYTES: usize = 16;

#[derive(Parser)]
#[grammar = "program.pest"]
struct ProgramParser;

/// An ordered list of raw instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
	instructions: Vec<Words>,
}

fn hex_literals(rule: Rule, literal: Rule, text: &str) -> Result<Vec<u32>, ProgramError> {
	let pairs = ProgramParser::parse(rule, text).map_err(Box::new)?;

	pairs
		.flatten()
		.filter(|pair| pair.as_rule() == literal)
		.map(|pair| {
			let literal = pair.as_str();
			u32::from_str_radix(&literal[2..], 16).map_err(|source| ProgramError::InvalidLiteral {
				literal: literal.to_string(),
				source,
			})
		})
		.collect()
}

fn check_trailing(what: &str, count: usize, per_instruction: usize) {
	let trailing = count % per_instruction;
	if trailing != 0 {
		warn!(
			"Ignoring {} trailing {}(s) that don't form a whole instruction",
			trailing, what
		);
	}
}

impl Program {
	pub fn new(instructions: Vec<Words>) -> Self {
		Self { instructions }
	}

	pub fn instructions(&self) -> &[Words] {
		&self.instructions
	}

	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}

	pub fn push(&mut self, instruction: Words) {
		self.instructions.push(instruction);
	}

	/// Reads every `0x` literal of up to eight hex digits as one word, four
	/// words to an instruction. Everything else in `text` is ignored.
	pub fn parse_words(text: &str) -> Result<Self, ProgramError> {
		let words = hex_literals(Rule::words, Rule::word, text)?;
		check_trailing("word", words.len(), 4);

		let instructions = words
			.chunks_exact(4)
			.map(|chunk| [chunk[0], chunk[1], chunk[2], chunk[3]])
			.collect();
		Ok(Self { instructions })
	}

	/// Reads every `0x` literal of up to two hex digits as one byte, sixteen
	/// little-endian bytes to an instruction.
	pub fn parse_bytes(text: &str) -> Result<Self, ProgramError> {
		let bytes: Vec<u8> = hex_literals(Rule::bytes, Rule::byte, text)?
			.into_iter()
			.map(|byte| byte as u8)
			.collect();
		Ok(Self::from_binary(&bytes))
	}

	/// Raw little-endian instructions.
	pub fn from_binary(bytes: &[u8]) -> Self {
		check_trailing("byte", bytes.len(), INSTRUCTION_BYTES);

		let instructions = bytes
			.chunks_exact(INSTRUCTION_BYTES)
			.map(|chunk| {
				let mut words = [0; 4];
				LittleEndian::read_u32_into(chunk, &mut words);
				words
			})
			.collect();
		Self { instructions }
	}

	pub fn to_binary(&self) -> Vec<u8> {
		let mut bytes = vec![0; self.instructions.len() * INSTRUCTION_BYTES];
		for (chunk, words) in bytes
			.chunks_exact_mut(INSTRUCTION_BYTES)
			.zip(&self.instructions)
		{
			LittleEndian::write_u32_into(words, chunk);
		}
		bytes
	}

	/// One `{ 0x..., 0x..., 0x..., 0x... },` line per instruction.
	pub fn to_c_array(&self) -> String {
		let mut text = String::new();
		for words in &self.instructions {
			// writing to a String can't fail
			let _ = writeln!(
				text,
				"   {{ 0x{:08x}, 0x{:08x}, 0x{:08x}, 0x{:08x} }},",
				words[0], words[1], words[2], words[3]
			);
		}
		text
	}

	pub fn disassemble(&self, gen: Generation) -> Disassembly {
		let mut output = Disassembly::default();
		for words in &self.instructions {
			output.append(crate::disassemble(gen, *words));
		}

		if !output.is_clean() {
			info!(
				"{} malformed field(s) in {} instruction(s)",
				output.errors,
				self.instructions.len()
			);
		}
		output
	}
}

impl FromIterator<Words> for Program {
	fn from_iter<T: IntoIterator<Item = Words>>(iter: T) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MOV: Words = [0x00600001, 0x28a00084, 0x00000000, 0x00000000];

	#[test]
	fn words_ignore_surrounding_text() {
		let program = Program::parse_words(
			"   { 0x00600001, 0x28a00084, 0x0, 0x00000000 },\n// 0x1 0x2\n 0x3",
		)
		.unwrap();
		assert_eq!(program.instructions(), &[MOV]);
	}

	#[test]
	fn long_literals_are_split() {
		let program = Program::parse_words("0x123456789 0x1 0x2 0x3").unwrap();
		assert_eq!(program.instructions(), &[[0x12345678, 0x1, 0x2, 0x3]]);
	}

	#[test]
	fn bytes_are_little_endian() {
		let text: String = (0..16).map(|byte| format!("0x{:02x}, ", byte)).collect();
		let program = Program::parse_bytes(&text).unwrap();
		assert_eq!(
			program.instructions(),
			&[[0x03020100, 0x07060504, 0x0b0a0908, 0x0f0e0d0c]]
		);
	}

	#[test]
	fn binary_round_trip() {
		let program: Program = [MOV, [1, 2, 3, 4]].into_iter().collect();
		let mut bytes = program.to_binary();
		assert_eq!(&bytes[..4], &[0x01, 0x00, 0x60, 0x00]);

		bytes.extend_from_slice(&[0xff; 5]);
		assert_eq!(Program::from_binary(&bytes), program);
	}

	#[test]
	fn c_array_is_parseable() {
		let program = Program::new(vec![MOV]);
		let text = program.to_c_array();
		assert_eq!(
			text,
			"   { 0x00600001, 0x28a00084, 0x00000000, 0x00000000 },\n"
		);
		assert_eq!(Program::parse_words(&text).unwrap(), program);
	}

	#[test]
	fn empty_input() {
		assert!(Program::parse_words("").unwrap().is_empty());
		assert!(Program::parse_bytes("no literals here").unwrap().is_empty());
	}
}
