//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Instruction text output.
//!
//! Disassembly never fails: fields holding values with no meaning are
//! printed as inline `*** invalid ...` diagnostics and counted.

use std::fmt::{self, Write as _};

use log::{debug, trace};

use crate::{
	generation::Generation,
	layout::{Instruction, Layout, Role, SourceFields},
	message::{MessageLayout, Sfid},
	opcode::{Opcode, OpcodeDesc},
	reg::{arf, RegisterFile, RegisterType},
	tables::{self, Table},
	util::{format_g, vf_to_float},
};

/// Text of one or more instructions plus the number of malformed fields
/// found while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Disassembly {
	pub text: String,
	pub errors: u32,
}

impl Disassembly {
	pub fn is_clean(&self) -> bool {
		self.errors == 0
	}

	pub fn append(&mut self, other: Disassembly) {
		self.text.push_str(&other.text);
		self.errors += other.errors;
	}
}

/// Output of a single instruction; `column` only tracks the current line.
#[derive(Default)]
struct Printer {
	text: String,
	column: usize,
	errors: u32,
}

impl Printer {
	fn string(&mut self, string: &str) {
		self.text.push_str(string);
		self.column += string.len();
	}

	fn format(&mut self, args: fmt::Arguments<'_>) {
		let start = self.text.len();
		// writing to a String can't fail
		let _ = self.text.write_fmt(args);
		self.column += self.text.len() - start;
	}

	fn newline(&mut self) {
		self.text.push('\n');
		self.column = 0;
	}

	/// Always emits at least one space.
	fn pad(&mut self, column: usize) {
		loop {
			self.string(" ");
			if self.column >= column {
				break;
			}
		}
	}

	fn error(&mut self, name: &str, value: u32) {
		trace!("invalid {} value {}", name, value);
		self.errors += 1;
	}

	/// Diagnostics don't move the column.
	fn invalid(&mut self, name: &str, value: u32) {
		let _ = write!(self.text, "*** invalid {} value {} ", name, value);
		self.error(name, value);
	}

	/// Prints `table[value]`. With `space`, nonempty entries are separated
	/// from whatever was printed before them.
	fn control(&mut self, name: &str, table: Table, value: u32, space: Option<&mut bool>) {
		match tables::lookup(table, value) {
			None => self.invalid(name, value),
			Some("") => {},
			Some(text) => match space {
				Some(space) => {
					if *space {
						self.string(" ");
					}
					self.string(text);
					*space = true;
				},
				None => self.string(text),
			},
		}
	}

	fn register_type(&mut self, name: &str, file: u32, encoding: u32) {
		match decoded_type(file, encoding) {
			Some(ty) => self.string(ty.name()),
			None => self.invalid(name, encoding),
		}
	}

	fn swizzle(&mut self, swizzle: [u32; 4]) {
		let [x, y, z, w] = swizzle;
		if swizzle == [0, 1, 2, 3] {
			return;
		}

		self.string(".");
		if x == y && x == z && x == w {
			self.control("channel select", tables::CHAN_SEL, x, None);
		} else {
			for channel in swizzle {
				self.control("channel select", tables::CHAN_SEL, channel, None);
			}
		}
	}
}

fn decoded_type(file: u32, encoding: u32) -> Option<RegisterType> {
	RegisterFile::try_from(file)
		.ok()
		.and_then(|file| RegisterType::from_encoding(file, encoding))
}

/// Element size used to print sub-registers in elements rather than bytes.
fn type_size(file: u32, encoding: u32) -> u32 {
	decoded_type(file, encoding).map_or(1, RegisterType::size)
}

struct Disassembler<'a, L: Layout> {
	inst: &'a Instruction<L>,
	gen: Generation,
	out: Printer,
}

impl<'a, L: Layout> Disassembler<'a, L> {
	fn align1(&self) -> bool {
		self.inst.get(L::ACCESS_MODE) == 0
	}

	/// Only Gen7 and later have more than one flag register.
	fn flag(&mut self) {
		let (nr, subnr) = self.inst.flag_reg();
		let nr = if self.gen >= Generation::Gen7 { nr } else { 0 };
		self.out.format(format_args!("f{}", nr));
		if subnr != 0 {
			self.out.format(format_args!(".{}", subnr));
		}
	}

	/// Returns `false` for registers printed without region or type.
	fn reg(&mut self, file: u32, nr: u32) -> bool {
		if file == RegisterFile::Architecture as u32 {
			let instance = nr & 0x0f;
			match nr & 0xf0 {
				arf::NULL => {
					self.out.string("null");
					return false;
				},
				arf::ADDRESS => self.out.format(format_args!("a{}", instance)),
				arf::ACCUMULATOR => self.out.format(format_args!("acc{}", instance)),
				arf::FLAG => self.out.format(format_args!("f{}", instance)),
				arf::MASK => self.out.format(format_args!("mask{}", instance)),
				arf::MASK_STACK => self.out.format(format_args!("msd{}", instance)),
				arf::STATE => self.out.format(format_args!("sr{}", instance)),
				arf::CONTROL => self.out.format(format_args!("cr{}", instance)),
				arf::NOTIFICATION_COUNT => self.out.format(format_args!("n{}", instance)),
				arf::IP => {
					self.out.string("ip");
					return false;
				},
				_ => self.out.format(format_args!("ARF{}", nr)),
			}
		} else {
			self.out
				.control("src reg file", tables::reg_file(self.gen), file, None);
			self.out.format(format_args!("{}", nr));
		}
		true
	}

	fn indirect(&mut self, file: u32, role: Role) {
		let (subreg, offset) = L::indirect(&self.inst.words(), role);
		self.out
			.control("src reg file", tables::reg_file(self.gen), file, None);
		self.out.string("[a0");
		if subreg != 0 {
			self.out.format(format_args!(".{}", subreg));
		}
		if offset != 0 {
			self.out.format(format_args!(" {}", offset));
		}
		self.out.string("]");
	}

	fn dest(&mut self) {
		let inst = self.inst;
		let file = inst.get(L::DST_REG_FILE);
		let ty = inst.get(L::DST_REG_TYPE);

		if inst.get(L::DST_ADDRESS_MODE) != 0 {
			self.indirect(file, Role::Dst);
			self.out.string("<");
			self.out
				.control("horiz stride", tables::HORIZ_STRIDE, inst.get(L::DST_DA1_HSTRIDE), None);
			self.out.string(">");
		} else if self.align1() {
			if !self.reg(file, inst.get(L::DST_DA_REG_NR)) {
				return;
			}
			let subnr = inst.get(L::DST_DA1_SUBREG_NR);
			if subnr != 0 {
				self.out.format(format_args!(".{}", subnr / type_size(file, ty)));
			}
			self.out.string("<");
			self.out
				.control("horiz stride", tables::HORIZ_STRIDE, inst.get(L::DST_DA1_HSTRIDE), None);
			self.out.string(">");
		} else {
			if !self.reg(file, inst.get(L::DST_DA_REG_NR)) {
				return;
			}
			if inst.get(L::DST_DA16_SUBREG_NR) != 0 {
				self.out.format(format_args!(".{}", 16 / type_size(file, ty)));
			}
			self.out.string("<1>");
			self.out
				.control("writemask", tables::WRITEMASK, inst.get(L::DA16_WRITEMASK), None);
		}

		self.out.register_type("dest reg encoding", file, ty);
	}

	fn align1_region(&mut self, fields: &SourceFields) {
		let inst = self.inst;
		self.out.string("<");
		self.out
			.control("vert stride", tables::VERT_STRIDE, inst.get(fields.vert_stride), None);
		self.out.string(",");
		self.out
			.control("width", tables::WIDTH, inst.get(fields.width), None);
		self.out.string(",");
		self.out
			.control("horiz_stride", tables::HORIZ_STRIDE, inst.get(fields.hstride), None);
		self.out.string(">");
	}

	fn source(&mut self, role: Role) {
		let inst = self.inst;
		let fields = SourceFields::of::<L>(role);
		let file = inst.get(fields.reg_file);
		let ty = inst.get(fields.reg_type);

		if file == RegisterFile::Immediate as u32 {
			self.immediate(ty);
			return;
		}

		self.out
			.control("negate", tables::NEGATE, inst.get(fields.negate), None);
		self.out.control("abs", tables::ABS, inst.get(fields.abs), None);

		if inst.get(fields.address_mode) != 0 {
			self.indirect(file, role);
			self.align1_region(&fields);
			self.out.register_type("src reg encoding", file, ty);
		} else if self.align1() {
			if !self.reg(file, inst.get(fields.reg_nr)) {
				return;
			}
			let subnr = inst.get(fields.da1_subreg_nr);
			if subnr != 0 {
				self.out.format(format_args!(".{}", subnr / type_size(file, ty)));
			}
			self.align1_region(&fields);
			self.out.register_type("src reg encoding", file, ty);
		} else {
			if !self.reg(file, inst.get(fields.reg_nr)) {
				return;
			}
			// the single sub-register bit selects the upper half
			if inst.get(fields.da16_subreg_nr) != 0 {
				self.out.format(format_args!(".{}", 16 / type_size(file, ty)));
			}
			self.out.string("<");
			self.out
				.control("vert stride", tables::VERT_STRIDE, inst.get(fields.vert_stride), None);
			self.out.string(",4,1>");
			self.out.swizzle(fields.swizzle.map(|field| inst.get(field)));
			self.out.register_type("src da16 reg type", file, ty);
		}
	}

	fn immediate(&mut self, encoding: u32) {
		let value = self.inst.get_bits(127, 96);
		match RegisterType::from_encoding(RegisterFile::Immediate, encoding) {
			Some(RegisterType::UD) => self.out.format(format_args!("0x{:08x}UD", value)),
			Some(RegisterType::D) => self.out.format(format_args!("{}D", value as i32)),
			Some(RegisterType::UW) => self.out.format(format_args!("0x{:04x}UW", value as u16)),
			Some(RegisterType::W) => self.out.format(format_args!("{}W", value as u16 as i16)),
			Some(RegisterType::UB) => self.out.format(format_args!("0x{:02x}UB", value as u8)),
			Some(RegisterType::V) => self.out.format(format_args!("0x{:08x}V", value)),
			Some(RegisterType::VF) => {
				let [x, y, z, w] =
					value.to_le_bytes().map(|vf| format_g(vf_to_float(vf) as f64));
				self.out
					.format(format_args!("[{}, {}, {}, {}]VF", x, y, z, w));
			},
			Some(RegisterType::F) => self.out.format(format_args!(
				"{}F",
				format_g(f32::from_bits(value) as f64)
			)),
			_ => self.out.invalid("immediate type", encoding),
		}
	}

	fn three_source_type(&mut self, name: &str, encoding: Option<u32>) {
		match encoding {
			None => self.out.string(RegisterType::F.name()),
			Some(encoding) => match RegisterType::from_three_source_encoding(encoding) {
				Some(ty) => self.out.string(ty.name()),
				None => self.out.invalid(name, encoding),
			},
		}
	}

	fn three_source(&mut self) {
		let inst = self.inst;
		let typed = self.gen.has_three_source_types();
		let dst_type = typed.then(|| inst.get(L::DST_3SRC_TYPE));
		let src_type = typed.then(|| inst.get(L::SRC_3SRC_TYPE));

		self.out.pad(16);
		self.reg(RegisterFile::General as u32, inst.get(L::DST_3SRC_REG_NR));
		let subnr = inst.get(L::DST_3SRC_SUBREG_NR);
		if subnr != 0 {
			self.out.format(format_args!(".{}", subnr));
		}
		self.out.string("<1>");
		self.out
			.control("writemask", tables::WRITEMASK, inst.get(L::DST_3SRC_WRITEMASK), None);
		self.three_source_type("dest reg encoding", dst_type);

		for index in 0..3 {
			let operand = inst.three_source_operand(index);
			self.out.pad(32 + 16 * index);
			self.out
				.control("negate", tables::NEGATE, operand.negate as u32, None);
			self.out.control("abs", tables::ABS, operand.abs as u32, None);
			self.reg(RegisterFile::General as u32, operand.nr);
			if operand.subnr != 0 {
				self.out.format(format_args!(".{}", operand.subnr));
			}
			self.out.string(if operand.replicate {
				"<0,1,0>"
			} else {
				"<4,1,1>"
			});
			self.three_source_type("src da16 reg type", src_type);
			self.out.swizzle([0, 2, 4, 6].map(|shift| (operand.swizzle >> shift) & 0x3));
		}
	}

	fn message(&mut self) {
		let inst = self.inst;
		let layout = MessageLayout::of(self.gen);
		let sfid = inst.get(layout.sfid);

		self.out.newline();
		self.out.pad(16);
		let mut space = false;
		self.out
			.control("SFID", tables::sfid(self.gen), sfid, Some(&mut space));

		match (Sfid::try_from(sfid), layout.math_function) {
			(Ok(Sfid::Sampler), _) => self.out.format(format_args!(
				" ({}, {}, {}, {})",
				inst.get(layout.sampler_binding_table_index),
				inst.get(layout.sampler),
				inst.get(layout.sampler_msg_type),
				inst.get(layout.sampler_mode)
			)),
			(Ok(Sfid::Urb), _) => {
				space = true;
				self.out.control(
					"urb opcode",
					tables::urb_opcode(self.gen),
					inst.get(layout.urb_opcode),
					Some(&mut space),
				);
				if let Some(field) = layout.urb_interleave {
					self.out.control(
						"urb interleave",
						tables::URB_INTERLEAVE,
						inst.get(field),
						Some(&mut space),
					);
				}
				self.out.format(format_args!(
					" {} {}",
					inst.get(layout.urb_offset),
					layout.urb_per_slot_offset.map_or(0, |field| inst.get(field))
				));
				if let Some(field) = layout.urb_complete {
					self.out.control(
						"urb complete",
						tables::URB_COMPLETE,
						inst.get(field),
						Some(&mut space),
					);
				}
			},
			(Ok(Sfid::Math), Some(field)) => {
				space = true;
				self.out.control(
					"function",
					tables::MATH_FUNCTION,
					inst.get(field),
					Some(&mut space),
				);
			},
			(Ok(target), _) if target.is_dataport() => self.out.format(format_args!(
				" ({}, 0x{:x})",
				inst.get(layout.dp_binding_table_index),
				inst.get(layout.function_control)
			)),
			_ => self
				.out
				.format(format_args!(" unsupported shared function ID ({})", sfid)),
		}

		if space {
			self.out.string(" ");
		}
		self.out.format(format_args!("mlen {}", inst.get(layout.mlen)));
		self.out.format(format_args!(" rlen {}", inst.get(layout.rlen)));
	}

	fn quarter_control(&mut self, space: &mut bool) {
		let control = self.inst.get(L::QTR_CONTROL);

		if !self.gen.has_quarter_control() {
			self.out
				.control("compression control", tables::COMPR_CTRL, control, Some(space));
			return;
		}

		match tables::lookup(tables::EXEC_SIZE, self.inst.get(L::EXEC_SIZE)) {
			Some("8") => self.out.format(format_args!(" {}Q", control + 1)),
			Some("16") => self.out.string(if control < 2 { " 1H" } else { " 2H" }),
			_ => {},
		}
	}

	fn instruction(&mut self) {
		let inst = self.inst;
		let raw_opcode = inst.get(L::OPCODE);
		let opcode = Opcode::try_from(raw_opcode)
			.ok()
			.filter(|opcode| opcode.is_available(self.gen));
		let desc = opcode.map_or(OpcodeDesc::RESERVED, Opcode::desc);
		let is_send = matches!(opcode, Some(Opcode::Send | Opcode::Sendc));

		let predicate = inst.get(L::PRED_CONTROL);
		if predicate != 0 {
			self.out.string("(");
			self.out
				.control("predicate inverse", tables::PRED_INV, inst.get(L::PRED_INV), None);
			self.flag();
			if self.align1() {
				self.out.control(
					"predicate control align1",
					tables::PRED_CTRL_ALIGN1,
					predicate,
					None,
				);
			} else {
				self.out.control(
					"predicate control align16",
					tables::PRED_CTRL_ALIGN16,
					predicate,
					None,
				);
			}
			self.out.string(") ");
		}

		match desc.name {
			Some(name) => self.out.string(name),
			None => {
				self.out
					.format(format_args!("*** invalid opcode value {} ", raw_opcode));
				self.out.error("opcode", raw_opcode);
			},
		}
		self.out
			.control("saturate", tables::SATURATE, inst.get(L::SATURATE), None);
		self.out
			.control("debug control", tables::DEBUG_CTRL, inst.get(L::DEBUG_CONTROL), None);

		let modifier = inst.get(L::COND_MODIFIER);
		if opcode == Some(Opcode::Math) {
			self.out.string(" ");
			self.out
				.control("function", tables::MATH_FUNCTION, modifier, None);
		} else if is_send {
			// the first message register of the payload
			if !self.gen.sfid_in_header() {
				self.out.format(format_args!(" {}", modifier));
			}
		} else {
			self.out.control(
				"conditional modifier",
				tables::conditional_modifier(self.gen),
				modifier,
				None,
			);
			let flagless = opcode == Some(Opcode::Sel)
				|| (self.gen < Generation::Gen6
					&& matches!(opcode, Some(Opcode::If | Opcode::While)));
			if modifier != 0 && !flagless {
				self.out.string(".");
				self.flag();
			}
		}

		if opcode != Some(Opcode::Nop) {
			self.out.string("(");
			self.out
				.control("execution size", tables::EXEC_SIZE, inst.get(L::EXEC_SIZE), None);
			self.out.string(")");
		}

		if desc.nsrc == 3 {
			self.three_source();
		} else {
			if desc.ndst > 0 {
				self.out.pad(16);
				self.dest();
			} else if let Some(opcode) = opcode {
				let (jip, uip) = inst.jump_targets();
				match opcode.jump_target_count() {
					1 => self.out.format(format_args!(" {}", jip)),
					2 => self.out.format(format_args!(" {} {}", jip, uip)),
					_ => {},
				}
			}

			if desc.nsrc > 0 {
				self.out.pad(32);
				self.source(Role::Src0);
			}
			if desc.nsrc > 1 {
				self.out.pad(48);
				self.source(Role::Src1);
			}
		}

		if is_send {
			self.message();
		}

		self.out.pad(64);
		if opcode != Some(Opcode::Nop) {
			self.out.string("{");
			let mut space = true;
			self.out.control(
				"access mode",
				tables::ACCESS_MODE,
				inst.get(L::ACCESS_MODE),
				Some(&mut space),
			);
			self.out.control(
				"mask control",
				tables::MASK_CTRL,
				inst.get(L::MASK_CONTROL),
				Some(&mut space),
			);
			self.out.control(
				"dependency control",
				tables::DEP_CTRL,
				inst.get(L::DEP_CONTROL),
				Some(&mut space),
			);
			self.quarter_control(&mut space);
			self.out.control(
				"thread control",
				tables::THREAD_CTRL,
				inst.get(L::THREAD_CONTROL),
				Some(&mut space),
			);
			self.out.control(
				"acc write control",
				tables::ACC_WR,
				inst.get(L::ACC_WR_CONTROL),
				Some(&mut space),
			);
			if is_send {
				let eot = inst.get(MessageLayout::of(self.gen).eot);
				self.out
					.control("end of thread", tables::EOT, eot, Some(&mut space));
			}
			if space {
				self.out.string(" ");
			}
			self.out.string("}");
		}
		self.out.string(";");
		self.out.newline();
	}
}

impl<L: Layout> Instruction<L> {
	/// One line of text (two for SEND), newline terminated.
	pub fn disassemble(&self) -> Disassembly {
		let mut disassembler = Disassembler {
			inst: self,
			gen: self.generation(),
			out: Printer::default(),
		};
		disassembler.instruction();

		let Printer { text, errors, .. } = disassembler.out;
		if errors > 0 {
			debug!("{:?}: {} malformed field(s)", self, errors);
		}
		Disassembly { text, errors }
	}
}
