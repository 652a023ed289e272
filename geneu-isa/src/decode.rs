//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Decoding of instruction bits back into the operand model.

use num_enum::TryFromPrimitive;

use crate::{
	control::{AccessMode, Modifier},
	error::DecodeError,
	layout::{Field, Instruction, Layout, Role, SourceFields},
	message::{MessageDescriptor, MessageLayout, Sfid},
	opcode::Opcode,
	reg::{
		AddressMode, ExecSize, HorizontalStride, Region, Register, RegisterFile, RegisterType,
		Swizzle, VerticalStride, Width, WriteMask,
	},
};

/// Three-source operand fields; `subnr` is in dwords.
pub(crate) struct ThreeSourceOperand {
	pub nr: u32,
	pub subnr: u32,
	pub swizzle: u32,
	pub replicate: bool,
	pub negate: bool,
	pub abs: bool,
}

fn enumerated<T: TryFromPrimitive<Primitive = u32>>(field: Field, value: u32) -> Result<T, DecodeError> {
	T::try_from_primitive(value).map_err(|_| DecodeError::InvalidField {
		field: field.name,
		value,
	})
}

impl<L: Layout> Instruction<L> {
	fn decoded<T: TryFromPrimitive<Primitive = u32>>(&self, field: Field) -> Result<T, DecodeError> {
		enumerated(field, self.get(field))
	}

	fn register_type(&self, field: Field, file: RegisterFile) -> Result<RegisterType, DecodeError> {
		let value = self.get(field);
		RegisterType::from_encoding(file, value).ok_or(DecodeError::InvalidField {
			field: field.name,
			value,
		})
	}

	pub fn opcode(&self) -> Result<Opcode, DecodeError> {
		self.decoded(L::OPCODE)
	}

	pub(crate) fn is_three_source(&self) -> bool {
		Opcode::try_from(self.get(L::OPCODE))
			.map_or(false, |opcode| opcode.is_three_source() && opcode.is_available(self.generation()))
	}

	/// The flag register and sub-register fields this instruction's encoding uses.
	pub(crate) fn flag_fields(&self) -> (Field, Field) {
		if self.is_three_source() {
			(L::FLAG_REG_NR_3SRC, L::FLAG_SUBREG_NR_3SRC)
		} else {
			(L::FLAG_REG_NR, L::FLAG_SUBREG_NR)
		}
	}

	/// The flag register used by predication and conditional modifiers, as
	/// `(nr, subnr)`.
	pub fn flag_reg(&self) -> (u32, u32) {
		let (nr, subnr) = self.flag_fields();
		(self.get(nr), self.get(subnr))
	}

	pub fn access_mode(&self) -> AccessMode {
		if self.get(L::ACCESS_MODE) == 0 {
			AccessMode::Align1
		} else {
			AccessMode::Align16
		}
	}

	pub fn exec_size(&self) -> Result<ExecSize, DecodeError> {
		self.decoded(L::EXEC_SIZE)
	}

	/// Header bits 27:24 as the current opcode interprets them.
	pub fn modifier(&self) -> Result<Modifier, DecodeError> {
		let opcode = self.opcode()?;
		let value = self.get(L::COND_MODIFIER);
		Modifier::decode(opcode, value, self.generation().sfid_in_header()).ok_or(
			DecodeError::InvalidField {
				field: L::COND_MODIFIER.name,
				value,
			},
		)
	}

	pub fn jump_targets(&self) -> (i32, i32) {
		L::jump_targets(&self.words(), self.generation())
	}

	pub fn message_descriptor(&self) -> Result<MessageDescriptor, DecodeError> {
		let layout = MessageLayout::of(self.generation());
		Ok(MessageDescriptor {
			sfid: self.decoded::<Sfid>(layout.sfid)?,
			mlen: self.get(layout.mlen),
			rlen: self.get(layout.rlen),
			header_present: layout
				.header_present
				.map_or(false, |field| self.get(field) != 0),
			end_of_thread: self.get(layout.eot) != 0,
		})
	}

	pub fn dst(&self) -> Result<Register, DecodeError> {
		let file: RegisterFile = self.decoded(L::DST_REG_FILE)?;
		let ty = self.register_type(L::DST_REG_TYPE, file)?;
		let mut reg = Register::new(file, 0, 0, ty, Region::SCALAR);

		if self.get(L::DST_ADDRESS_MODE) != 0 {
			let (subreg, offset) = L::indirect(&self.words(), Role::Dst);
			reg.address_mode = AddressMode::Indirect { subreg, offset };
			reg.region.hstride = self.decoded(L::DST_DA1_HSTRIDE)?;
			return Ok(reg);
		}

		reg.nr = self.get(L::DST_DA_REG_NR);
		match self.access_mode() {
			AccessMode::Align1 => {
				reg.subnr = self.get(L::DST_DA1_SUBREG_NR);
				reg.region.hstride = self.decoded(L::DST_DA1_HSTRIDE)?;
			},
			AccessMode::Align16 => {
				reg.subnr = self.get(L::DST_DA16_SUBREG_NR) << 4;
				reg.region.hstride = HorizontalStride::S1;
				reg.writemask = WriteMask::from_bits_truncate(self.get(L::DA16_WRITEMASK));
			},
		}

		Ok(reg)
	}

	pub fn src0(&self) -> Result<Register, DecodeError> {
		self.source(Role::Src0)
	}

	pub fn src1(&self) -> Result<Register, DecodeError> {
		self.source(Role::Src1)
	}

	fn source(&self, role: Role) -> Result<Register, DecodeError> {
		let fields = SourceFields::of::<L>(role);
		let file: RegisterFile = self.decoded(fields.reg_file)?;
		let ty = self.register_type(fields.reg_type, file)?;

		if file == RegisterFile::Immediate {
			let value = self.get_bits(127, 96);
			let reg = match ty {
				RegisterType::V => Register::imm_v(value),
				RegisterType::VF => Register::imm_vf(value),
				_ => Register::imm_ud(value).with_type(ty),
			};
			return Ok(reg);
		}

		let mut reg = Register::new(file, 0, 0, ty, Region::SCALAR);
		reg.abs = self.get(fields.abs) != 0;
		reg.negate = self.get(fields.negate) != 0;

		if self.get(fields.address_mode) != 0 {
			let (subreg, offset) = L::indirect(&self.words(), role);
			reg.address_mode = AddressMode::Indirect { subreg, offset };
			reg.region = self.align1_region(&fields)?;
			return Ok(reg);
		}

		reg.nr = self.get(fields.reg_nr);
		match self.access_mode() {
			AccessMode::Align1 => {
				reg.subnr = self.get(fields.da1_subreg_nr);
				reg.region = self.align1_region(&fields)?;
			},
			AccessMode::Align16 => {
				reg.subnr = self.get(fields.da16_subreg_nr) << 4;
				reg.region = Region::new(
					self.decoded(fields.vert_stride)?,
					Width::W4,
					HorizontalStride::S1,
				);
				let mut swizzle = 0;
				for (channel, field) in fields.swizzle.iter().enumerate() {
					swizzle |= (self.get(*field) as u8) << (channel * 2);
				}
				reg.swizzle = Swizzle(swizzle);
			},
		}

		Ok(reg)
	}

	fn align1_region(&self, fields: &SourceFields) -> Result<Region, DecodeError> {
		Ok(Region::new(
			self.decoded(fields.vert_stride)?,
			self.decoded(fields.width)?,
			self.decoded(fields.hstride)?,
		))
	}

	fn three_source_type(&self, field: Field) -> Result<RegisterType, DecodeError> {
		if !self.generation().has_three_source_types() {
			return Ok(RegisterType::F);
		}
		let value = self.get(field);
		RegisterType::from_three_source_encoding(value).ok_or(DecodeError::InvalidField {
			field: field.name,
			value,
		})
	}

	pub fn dst_3src(&self) -> Result<Register, DecodeError> {
		let ty = self.three_source_type(L::DST_3SRC_TYPE)?;
		Ok(Register::new(
			RegisterFile::General,
			self.get(L::DST_3SRC_REG_NR),
			self.get(L::DST_3SRC_SUBREG_NR) * 4,
			ty,
			Region::contiguous(Width::W4),
		)
		.with_writemask(WriteMask::from_bits_truncate(
			self.get(L::DST_3SRC_WRITEMASK),
		)))
	}

	/// Raw fields of source `index` (0 through 2) of a three-source
	/// instruction.
	pub(crate) fn three_source_operand(&self, index: usize) -> ThreeSourceOperand {
		let (nr, subnr, swizzle, replicate, negate, abs) = match index {
			0 => (
				L::SRC0_3SRC_REG_NR,
				self.get(L::SRC0_3SRC_SUBREG_NR),
				L::SRC0_3SRC_SWIZZLE,
				L::SRC0_3SRC_REP_CTRL,
				L::SRC0_3SRC_NEGATE,
				L::SRC0_3SRC_ABS,
			),
			1 => (
				L::SRC1_3SRC_REG_NR,
				self.get(L::SRC1_3SRC_SUBREG_NR_LOW)
					| (self.get(L::SRC1_3SRC_SUBREG_NR_HIGH) << 2),
				L::SRC1_3SRC_SWIZZLE,
				L::SRC1_3SRC_REP_CTRL,
				L::SRC1_3SRC_NEGATE,
				L::SRC1_3SRC_ABS,
			),
			2 => (
				L::SRC2_3SRC_REG_NR,
				self.get(L::SRC2_3SRC_SUBREG_NR),
				L::SRC2_3SRC_SWIZZLE,
				L::SRC2_3SRC_REP_CTRL,
				L::SRC2_3SRC_NEGATE,
				L::SRC2_3SRC_ABS,
			),
			_ => panic!("three-source instructions have no source {}", index),
		};

		ThreeSourceOperand {
			nr: self.get(nr),
			subnr,
			swizzle: self.get(swizzle),
			replicate: self.get(replicate) != 0,
			negate: self.get(negate) != 0,
			abs: self.get(abs) != 0,
		}
	}

	/// Source `index` (0 through 2) of a three-source instruction.
	pub fn src_3src(&self, index: usize) -> Result<Register, DecodeError> {
		let operand = self.three_source_operand(index);
		let region = if operand.replicate {
			Region::SCALAR
		} else {
			Region::contiguous(Width::W4)
		};

		let mut reg = Register::new(
			RegisterFile::General,
			operand.nr,
			operand.subnr * 4,
			self.three_source_type(L::SRC_3SRC_TYPE)?,
			region,
		)
		.with_swizzle(Swizzle(operand.swizzle as u8));
		reg.negate = operand.negate;
		reg.abs = operand.abs;
		Ok(reg)
	}
}
