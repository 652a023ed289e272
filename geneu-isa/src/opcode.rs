//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::collections::HashMap;

use lazy_static::lazy_static;
use num_enum::TryFromPrimitive;

use crate::generation::Generation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum Opcode {
	Mov = 1,
	Sel = 2,
	Not = 4,
	And = 5,
	Or = 6,
	Xor = 7,
	Shr = 8,
	Shl = 9,
	Asr = 12,
	Cmp = 16,
	Cmpn = 17,
	F32to16 = 19,
	F16to32 = 20,
	Bfrev = 23,
	Bfe = 24,
	Bfi1 = 25,
	Bfi2 = 26,
	Jmpi = 32,
	If = 34,
	Iff = 35,
	Else = 36,
	Endif = 37,
	Do = 38,
	While = 39,
	Break = 40,
	Continue = 41,
	Halt = 42,
	Msave = 44,
	Mrestore = 45,
	Push = 46,
	Pop = 47,
	Wait = 48,
	Send = 49,
	Sendc = 50,
	Math = 56,
	Add = 64,
	Mul = 65,
	Avg = 66,
	Frc = 67,
	Rndu = 68,
	Rndd = 69,
	Rnde = 70,
	Rndz = 71,
	Mac = 72,
	Mach = 73,
	Lzd = 74,
	Fbh = 75,
	Fbl = 76,
	Cbit = 77,
	Addc = 78,
	Subb = 79,
	Sad2 = 80,
	Sada2 = 81,
	Dp4 = 84,
	Dph = 85,
	Dp3 = 86,
	Dp2 = 87,
	Line = 89,
	Pln = 90,
	Mad = 91,
	Lrp = 92,
	Nop = 126,
}

/// Mnemonic and operand counts of one opcode encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDesc {
	/// `None` for reserved encodings.
	pub name: Option<&'static str>,
	pub nsrc: u8,
	pub ndst: u8,
}

/// How the bits shared by the conditional modifier are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeClass {
	Math,
	Send,
	Other,
}

impl OpcodeDesc {
	pub const RESERVED: Self = Self {
		name: None,
		nsrc: 0,
		ndst: 0,
	};
}

const OPCODES: &[(Opcode, &str, u8, u8)] = &[
	(Opcode::Mov, "mov", 1, 1),
	(Opcode::Frc, "frc", 1, 1),
	(Opcode::Rndu, "rndu", 1, 1),
	(Opcode::Rndd, "rndd", 1, 1),
	(Opcode::Rnde, "rnde", 1, 1),
	(Opcode::Rndz, "rndz", 1, 1),
	(Opcode::Not, "not", 1, 1),
	(Opcode::Lzd, "lzd", 1, 1),
	(Opcode::F32to16, "f32to16", 1, 1),
	(Opcode::F16to32, "f16to32", 1, 1),
	(Opcode::Bfrev, "bfrev", 1, 1),
	(Opcode::Fbh, "fbh", 1, 1),
	(Opcode::Fbl, "fbl", 1, 1),
	(Opcode::Cbit, "cbit", 1, 1),
	(Opcode::Mul, "mul", 2, 1),
	(Opcode::Mac, "mac", 2, 1),
	(Opcode::Mach, "mach", 2, 1),
	(Opcode::Line, "line", 2, 1),
	(Opcode::Pln, "pln", 2, 1),
	(Opcode::Mad, "mad", 3, 1),
	(Opcode::Lrp, "lrp", 3, 1),
	(Opcode::Sad2, "sad2", 2, 1),
	(Opcode::Sada2, "sada2", 2, 1),
	(Opcode::Dp4, "dp4", 2, 1),
	(Opcode::Dph, "dph", 2, 1),
	(Opcode::Dp3, "dp3", 2, 1),
	(Opcode::Dp2, "dp2", 2, 1),
	(Opcode::Math, "math", 2, 1),
	(Opcode::Avg, "avg", 2, 1),
	(Opcode::Add, "add", 2, 1),
	(Opcode::Sel, "sel", 2, 1),
	(Opcode::And, "and", 2, 1),
	(Opcode::Or, "or", 2, 1),
	(Opcode::Xor, "xor", 2, 1),
	(Opcode::Shr, "shr", 2, 1),
	(Opcode::Shl, "shl", 2, 1),
	(Opcode::Asr, "asr", 2, 1),
	(Opcode::Cmp, "cmp", 2, 1),
	(Opcode::Cmpn, "cmpn", 2, 1),
	(Opcode::Bfe, "bfe", 3, 1),
	(Opcode::Bfi1, "bfi1", 2, 1),
	(Opcode::Bfi2, "bfi2", 3, 1),
	(Opcode::Addc, "addc", 2, 1),
	(Opcode::Subb, "subb", 2, 1),
	(Opcode::Send, "send", 1, 1),
	(Opcode::Sendc, "sendc", 1, 1),
	(Opcode::Nop, "nop", 0, 0),
	(Opcode::Jmpi, "jmpi", 0, 0),
	(Opcode::If, "if", 0, 0),
	(Opcode::Iff, "iff", 0, 0),
	(Opcode::While, "while", 0, 0),
	(Opcode::Else, "else", 0, 0),
	(Opcode::Break, "break", 0, 0),
	(Opcode::Continue, "cont", 0, 0),
	(Opcode::Halt, "halt", 0, 0),
	(Opcode::Msave, "msave", 1, 1),
	(Opcode::Mrestore, "mrest", 1, 1),
	(Opcode::Push, "push", 0, 0),
	(Opcode::Pop, "pop", 0, 0),
	(Opcode::Wait, "wait", 1, 0),
	(Opcode::Do, "do", 0, 0),
	(Opcode::Endif, "endif", 0, 0),
];

const fn build_descs() -> [OpcodeDesc; 128] {
	let mut table = [OpcodeDesc::RESERVED; 128];
	let mut i = 0;
	while i < OPCODES.len() {
		let (opcode, name, nsrc, ndst) = OPCODES[i];
		table[opcode as usize] = OpcodeDesc {
			name: Some(name),
			nsrc,
			ndst,
		};
		i += 1;
	}
	table
}

/// Descriptor of every 7-bit opcode encoding.
pub static OPCODE_DESCS: [OpcodeDesc; 128] = build_descs();

lazy_static! {
	static ref MNEMONICS: HashMap<&'static str, Opcode> = OPCODES
		.iter()
		.map(|&(opcode, name, _, _)| (name, opcode))
		.collect();
}

/// Finds the opcode with the given mnemonic.
pub fn lookup(mnemonic: &str) -> Option<Opcode> {
	MNEMONICS.get(mnemonic).copied()
}

/// The descriptor of a raw opcode field value; reserved for values the field
/// can't hold.
pub fn desc(raw: u32) -> OpcodeDesc {
	OPCODE_DESCS
		.get(raw as usize)
		.copied()
		.unwrap_or(OpcodeDesc::RESERVED)
}

impl Opcode {
	pub fn desc(self) -> OpcodeDesc {
		OPCODE_DESCS[self as usize]
	}

	pub fn name(self) -> &'static str {
		self.desc().name.unwrap_or("")
	}

	pub fn class(self) -> OpcodeClass {
		match self {
			Opcode::Math => OpcodeClass::Math,
			Opcode::Send | Opcode::Sendc => OpcodeClass::Send,
			_ => OpcodeClass::Other,
		}
	}

	pub fn is_three_source(self) -> bool {
		self.desc().nsrc == 3
	}

	/// Whether `gen` can encode this opcode.
	pub fn is_available(self, gen: Generation) -> bool {
		!self.is_three_source() || gen.has_three_source()
	}

	/// Flow control opcodes that print jump targets instead of operands, and
	/// how many.
	pub fn jump_target_count(self) -> usize {
		match self {
			Opcode::Endif => 1,
			Opcode::If
			| Opcode::Else
			| Opcode::While
			| Opcode::Break
			| Opcode::Continue
			| Opcode::Halt => 2,
			_ => 0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_named_encoding_is_an_opcode() {
		for raw in 0..128u32 {
			match (OPCODE_DESCS[raw as usize].name, Opcode::try_from(raw)) {
				(Some(name), Ok(opcode)) => assert_eq!(opcode.name(), name),
				(None, Err(_)) => {},
				(name, opcode) => panic!("opcode {} mismatch: {:?} {:?}", raw, name, opcode.ok()),
			}
		}
	}

	#[test]
	fn reserved_encodings() {
		assert_eq!(desc(0), OpcodeDesc::RESERVED);
		assert_eq!(desc(127), OpcodeDesc::RESERVED);
		assert_eq!(desc(500), OpcodeDesc::RESERVED);
	}

	#[test]
	fn mnemonic_lookup() {
		assert_eq!(lookup("mov"), Some(Opcode::Mov));
		assert_eq!(lookup("cont"), Some(Opcode::Continue));
		assert_eq!(lookup("mrest"), Some(Opcode::Mrestore));
		assert_eq!(lookup("bogus"), None);
	}

	#[test]
	fn classes() {
		assert_eq!(Opcode::Math.class(), OpcodeClass::Math);
		assert_eq!(Opcode::Sendc.class(), OpcodeClass::Send);
		assert_eq!(Opcode::Sel.class(), OpcodeClass::Other);
		assert!(Opcode::Mad.is_three_source());
		assert!(!Opcode::Lrp.is_available(Generation::Gen5));
		assert!(Opcode::Lrp.is_available(Generation::Gen6));
	}
}
