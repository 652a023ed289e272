//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Bit-exact encoding and disassembly of Intel Gen4 through Gen9 EU
//! instructions.
//!
//! Instructions are four 32-bit words. Gen8 and Gen9 share the [`Gen8`]
//! layout; Gen4 through Gen7 share the structurally different [`Gen4`]
//! layout. Encoding and decoding are written once over [`Layout`].

pub mod control;
mod decode;
pub mod disasm;
mod encode;
pub mod error;
pub mod gen4;
pub mod gen8;
pub mod generation;
pub mod layout;
pub mod message;
pub mod opcode;
pub mod program;
pub mod reg;
mod tables;
mod util;

pub use disasm::Disassembly;
pub use encode::check_region;
pub use error::{DecodeError, ProgramError, RegionError};
pub use gen4::Gen4;
pub use gen8::Gen8;
pub use generation::Generation;
pub use layout::{Field, Fields, Instruction, Layout, Words};
pub use opcode::Opcode;
pub use program::Program;
pub use reg::Register;
pub use util::{float_to_vf, vf_to_float};

pub type Gen8Instruction = Instruction<Gen8>;
pub type Gen4Instruction = Instruction<Gen4>;

/// Disassembles one instruction with whichever layout encodes `gen`.
pub fn disassemble(gen: Generation, words: Words) -> Disassembly {
	if Gen8::covers(gen) {
		Gen8Instruction::from_words(gen, words).disassemble()
	} else {
		Gen4Instruction::from_words(gen, words).disassemble()
	}
}
