//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Operand and header encoding.
//!
//! Encoder misuse (operands no generation can encode, sub-registers that
//! break alignment rules, regions that break the region restrictions) is a
//! bug in the caller and panics.

use log::trace;

use crate::{
	control::{
		AccessMode, DependencyControl, MaskControl, MathFunction, Modifier, PredicateControl,
		ThreadControl,
	},
	error::RegionError,
	gen8::Gen8Message,
	generation::Generation,
	layout::{Field, Instruction, Layout, Role, SourceFields},
	message::{DataportMessage, MessageDescriptor, MessageLayout, SamplerMessage, Sfid, UrbMessage},
	opcode::Opcode,
	reg::{
		AddressMode, ExecSize, HorizontalStride, Region, Register, RegisterFile, RegisterType,
		VerticalStride, Width,
	},
};

/// Checks `region` against the register region restrictions for an
/// instruction executing `exec_size` channels.
pub fn check_region(exec_size: ExecSize, region: Region) -> Result<(), RegionError> {
	let exec_size = exec_size.channels();
	let width = region.width.elements();
	let hstride = region.hstride.elements();
	// `None` is VxH, which satisfies any vertical stride requirement
	let vstride = region.vstride.elements();

	if exec_size < width {
		return Err(RegionError::WidthExceedsExecSize { width, exec_size });
	}

	if exec_size == width && hstride != 0 {
		if let Some(vstride) = vstride {
			if vstride != width * hstride {
				return Err(RegionError::VerticalStrideMismatch {
					vstride,
					width,
					hstride,
				});
			}
		}
	}

	if width == 1 && hstride != 0 {
		return Err(RegionError::ScalarWithStride);
	}

	if exec_size == 1 && width == 1 && (hstride != 0 || vstride != Some(0)) {
		return Err(RegionError::ScalarExecutionWithStride);
	}

	if vstride == Some(0) && hstride == 0 && width != 1 {
		return Err(RegionError::BroadcastWithWidth);
	}

	Ok(())
}

fn type_encoding(reg: &Register) -> u32 {
	match reg.ty.encoding(reg.file) {
		Some(encoding) => encoding,
		None => panic!(
			"{} operands cannot be encoded in the {:?} register file",
			reg.ty, reg.file
		),
	}
}

fn three_source_type_encoding(ty: RegisterType) -> u32 {
	match ty.three_source_encoding() {
		Some(encoding) => encoding,
		None => panic!("three-source instructions cannot operate on {}", ty),
	}
}

impl<L: Layout> Instruction<L> {
	pub fn set_opcode(&mut self, opcode: Opcode) {
		assert!(
			opcode.is_available(self.generation()),
			"{} cannot encode {}",
			self.generation(),
			opcode.name()
		);
		self.set(L::OPCODE, opcode as u32);
	}

	pub fn set_access_mode(&mut self, mode: AccessMode) {
		self.set(L::ACCESS_MODE, mode as u32);
	}

	pub fn set_exec_size(&mut self, exec_size: ExecSize) {
		self.set(L::EXEC_SIZE, exec_size as u32);
	}

	pub fn set_predicate(&mut self, control: PredicateControl, inverse: bool) {
		self.set(L::PRED_CONTROL, control as u32);
		self.set(L::PRED_INV, inverse as u32);
	}

	/// Selects the flag register used by predication and conditional
	/// modifiers. Set the opcode first; three-source instructions keep the
	/// flag register in different bits.
	pub fn set_flag_reg(&mut self, nr: u32, subnr: u32) {
		assert!(nr <= 1 && subnr <= 1, "there is no flag register f{}.{}", nr, subnr);
		assert!(
			nr == 0 || self.generation() >= Generation::Gen7,
			"{} only has f0",
			self.generation()
		);
		let (nr_field, subnr_field) = self.flag_fields();
		self.set(nr_field, nr);
		self.set(subnr_field, subnr);
	}

	pub fn set_saturate(&mut self, saturate: bool) {
		self.set(L::SATURATE, saturate as u32);
	}

	pub fn set_debug_control(&mut self, breakpoint: bool) {
		self.set(L::DEBUG_CONTROL, breakpoint as u32);
	}

	pub fn set_mask_control(&mut self, control: MaskControl) {
		self.set(L::MASK_CONTROL, control as u32);
	}

	pub fn set_dependency_control(&mut self, control: DependencyControl) {
		self.set(L::DEP_CONTROL, control as u32);
	}

	/// Quarter control from Gen6 on, compression control before.
	pub fn set_quarter_control(&mut self, control: u32) {
		self.set(L::QTR_CONTROL, control);
	}

	pub fn set_thread_control(&mut self, control: ThreadControl) {
		self.set(L::THREAD_CONTROL, control as u32);
	}

	pub fn set_acc_wr_control(&mut self, enable: bool) {
		self.set(L::ACC_WR_CONTROL, enable as u32);
	}

	/// Writes header bits 27:24. The opcode must already be set, since it
	/// decides what those bits mean.
	pub fn set_modifier(&mut self, modifier: Modifier) {
		let raw_opcode = self.get(L::OPCODE);
		let opcode = match Opcode::try_from(raw_opcode) {
			Ok(opcode) => opcode,
			Err(_) => panic!("set the opcode before its modifier (found {})", raw_opcode),
		};
		assert!(
			modifier.is_valid_for(opcode, self.generation().sfid_in_header()),
			"{:?} is not a modifier of {} on {}",
			modifier,
			opcode.name(),
			self.generation()
		);
		self.set(L::COND_MODIFIER, modifier.encoding());
	}

	pub fn set_jump_targets(&mut self, jip: i32, uip: i32) {
		let gen = self.generation();
		L::set_jump_targets(self.words_mut(), gen, jip, uip);
	}

	fn current_exec_size(&self) -> ExecSize {
		let raw = self.get(L::EXEC_SIZE);
		match ExecSize::try_from(raw) {
			Ok(exec_size) => exec_size,
			Err(_) => panic!("execution size encoding {} is reserved", raw),
		}
	}

	fn is_align16(&self) -> bool {
		self.get(L::ACCESS_MODE) == AccessMode::Align16 as u32
	}

	/// Panics if `reg`'s region breaks the region restrictions for this
	/// instruction's execution size. Immediates and architecture registers
	/// are not checked.
	pub fn validate_register(&self, reg: &Register) {
		if matches!(reg.file, RegisterFile::Immediate | RegisterFile::Architecture) {
			return;
		}

		let exec_size = self.current_exec_size();
		if let Err(err) = check_region(exec_size, reg.region) {
			panic!(
				"region <{:?},{:?},{:?}> with execution size {}: {}",
				reg.region.vstride,
				reg.region.width,
				reg.region.hstride,
				exec_size.channels(),
				err
			);
		}
	}

	pub fn set_dst(&mut self, reg: Register) {
		let reg = reg.normalize(self.generation());

		self.set(L::DST_REG_FILE, reg.file as u32);
		self.set(L::DST_REG_TYPE, type_encoding(&reg));

		// destinations can't have a zero stride
		let hstride = match reg.region.hstride {
			HorizontalStride::S0 => HorizontalStride::S1,
			hstride => hstride,
		};

		match reg.address_mode {
			AddressMode::Direct => {
				self.set(L::DST_ADDRESS_MODE, 0);
				self.set(L::DST_DA_REG_NR, reg.nr);

				if self.is_align16() {
					assert!(
						reg.subnr == 0 || reg.subnr == 16,
						"Align16 destination sub-register {} is not 0 or 16",
						reg.subnr
					);
					self.set(L::DST_DA16_SUBREG_NR, reg.subnr >> 4);
					self.set(L::DA16_WRITEMASK, reg.writemask.bits());
				} else {
					self.set(L::DST_DA1_SUBREG_NR, reg.subnr);
					self.set(L::DST_DA1_HSTRIDE, hstride as u32);
				}
			},
			AddressMode::Indirect { subreg, offset } => {
				assert!(
					!self.is_align16(),
					"indirect destinations require Align1"
				);
				self.set(L::DST_ADDRESS_MODE, 1);
				self.set(L::DST_DA1_HSTRIDE, hstride as u32);
				L::set_indirect(self.words_mut(), Role::Dst, subreg, offset);
			},
		}

		// narrow registers shrink the execution size with them
		if (reg.region.width as u32) < (ExecSize::E8 as u32) {
			trace!(
				"Execution size reduced to {} to match the destination",
				reg.region.width.elements()
			);
			self.set(L::EXEC_SIZE, reg.region.width as u32);
		}
	}

	pub fn set_src0(&mut self, reg: Register) {
		self.set_source(Role::Src0, reg);
	}

	/// Panics if src0 is already an immediate; only one source can be.
	pub fn set_src1(&mut self, reg: Register) {
		self.set_source(Role::Src1, reg);
	}

	fn set_source(&mut self, role: Role, reg: Register) {
		let reg = reg.normalize(self.generation());
		self.validate_register(&reg);

		let fields = SourceFields::of::<L>(role);

		self.set(fields.reg_file, reg.file as u32);
		self.set(fields.reg_type, type_encoding(&reg));
		self.set(fields.abs, reg.abs as u32);
		self.set(fields.negate, reg.negate as u32);

		if role == Role::Src1 {
			assert!(
				self.get(L::SRC0_REG_FILE) != RegisterFile::Immediate as u32,
				"src1 cannot be set when src0 is an immediate"
			);
		}

		if reg.is_immediate() {
			self.set_bits(127, 96, reg.immediate);

			// the immediate occupies src1, which has to agree on its type
			if role == Role::Src0 {
				self.set(L::SRC1_REG_FILE, RegisterFile::Architecture as u32);
				self.set(L::SRC1_REG_TYPE, type_encoding(&reg));
			}
			return;
		}

		// a single channel reading a single element has only one encoding
		let (vstride, hstride) = if reg.region.width == Width::W1
			&& self.get(L::EXEC_SIZE) == ExecSize::E1 as u32
		{
			(VerticalStride::S0, HorizontalStride::S0)
		} else {
			(reg.region.vstride, reg.region.hstride)
		};

		match reg.address_mode {
			AddressMode::Direct => {
				self.set(fields.address_mode, 0);
				self.set(fields.reg_nr, reg.nr);

				if self.is_align16() {
					assert!(
						reg.subnr == 0 || reg.subnr == 16,
						"Align16 source sub-register {} is not 0 or 16",
						reg.subnr
					);
					self.set(fields.da16_subreg_nr, reg.subnr >> 4);

					for (channel, field) in fields.swizzle.iter().enumerate() {
						self.set(*field, reg.swizzle.get(channel as u32));
					}

					// Align16 regions are always 4 wide; a "vec8" here means
					// the same thing as a vec4
					let vstride = match reg.region.vstride {
						VerticalStride::S8 => VerticalStride::S4,
						vstride => vstride,
					};
					self.set(fields.vert_stride, vstride as u32);
				} else {
					self.set(fields.da1_subreg_nr, reg.subnr);
					self.set(fields.hstride, hstride as u32);
					self.set(fields.vert_stride, vstride as u32);
					self.set(fields.width, reg.region.width as u32);
				}
			},
			AddressMode::Indirect { subreg, offset } => {
				assert!(!self.is_align16(), "indirect sources require Align1");
				self.set(fields.hstride, hstride as u32);
				self.set(fields.vert_stride, vstride as u32);
				self.set(fields.width, reg.region.width as u32);
				self.set(fields.address_mode, 1);
				L::set_indirect(self.words_mut(), role, subreg, offset);
			},
		}
	}

	/// Writes the generic half of a SEND descriptor.
	///
	/// This rewrites src1 as a zero immediate and so clears all function
	/// control bits; fill in message specific bits afterwards.
	pub fn set_message_descriptor(&mut self, desc: &MessageDescriptor) {
		let gen = self.generation();
		let layout = MessageLayout::of(gen);

		self.set_src1(Register::imm_d(0));

		self.set(layout.sfid, desc.sfid as u32);
		self.set(layout.mlen, desc.mlen);
		self.set(layout.rlen, desc.rlen);
		if let Some(header_present) = layout.header_present {
			self.set(header_present, desc.header_present as u32);
		}
		self.set(layout.eot, desc.end_of_thread as u32);
	}

	/// A URB write of the payload starting at the first message register.
	pub fn set_urb_message(&mut self, msg: &UrbMessage, mlen: u32, rlen: u32, end_of_thread: bool) {
		let layout = MessageLayout::of(self.generation());

		self.set_message_descriptor(&MessageDescriptor {
			sfid: Sfid::Urb,
			mlen,
			rlen,
			header_present: true,
			end_of_thread,
		});
		self.set_src0(Register::mrf(1, 0));

		self.set(layout.urb_opcode, msg.opcode);
		self.set(layout.urb_offset, msg.offset);
		if let Some(interleave) = layout.urb_interleave {
			self.set(interleave, msg.interleave as u32);
		}
		// a zero per-slot offset ignores the offsets in the message header
		if let Some(per_slot_offset) = layout.urb_per_slot_offset {
			self.set(per_slot_offset, 0);
		}
		if let Some(complete) = layout.urb_complete {
			self.set(complete, msg.complete as u32);
		}
	}

	pub fn set_sampler_message(
		&mut self,
		msg: &SamplerMessage,
		mlen: u32,
		rlen: u32,
		header_present: bool,
	) {
		let layout = MessageLayout::of(self.generation());

		self.set_message_descriptor(&MessageDescriptor {
			sfid: Sfid::Sampler,
			mlen,
			rlen,
			header_present,
			end_of_thread: false,
		});

		self.set(layout.sampler_binding_table_index, msg.binding_table_index);
		self.set(layout.sampler, msg.sampler);
		self.set(layout.sampler_msg_type, msg.msg_type);
		self.set(layout.sampler_mode, msg.simd_mode);
	}

	/// Gen7 and later dataport messages.
	pub fn set_dp_message(
		&mut self,
		msg: &DataportMessage,
		mlen: u32,
		rlen: u32,
		header_present: bool,
		end_of_thread: bool,
	) {
		assert!(
			self.generation() >= Generation::Gen7,
			"{} dataport messages have a different descriptor",
			self.generation()
		);
		assert!(
			msg.sfid.is_dataport(),
			"{:?} is not a dataport",
			msg.sfid
		);
		assert!(
			msg.binding_table_index <= 0xff,
			"binding table index {} is over 255",
			msg.binding_table_index
		);
		assert!(
			msg.msg_type <= 0x1f,
			"message type {:#x} is wider than 5 bits",
			msg.msg_type
		);
		assert!(
			msg.msg_control <= 0x3f,
			"message control {:#x} is wider than 6 bits",
			msg.msg_control
		);

		let layout = MessageLayout::of(self.generation());

		self.set_message_descriptor(&MessageDescriptor {
			sfid: msg.sfid,
			mlen,
			rlen,
			header_present,
			end_of_thread,
		});
		self.set(
			layout.function_control,
			msg.binding_table_index | (msg.msg_type << 14) | (msg.msg_control << 8),
		);
	}

	/// Gen4 and Gen5 extended math, which is a message to the math unit.
	pub fn set_math_message(&mut self, function: MathFunction, mlen: u32, rlen: u32) {
		let layout = MessageLayout::of(self.generation());
		let math_function = match layout.math_function {
			Some(field) => field,
			None => panic!("{} has a MATH instruction instead", self.generation()),
		};

		self.set_message_descriptor(&MessageDescriptor {
			sfid: Sfid::Math,
			mlen,
			rlen,
			header_present: false,
			end_of_thread: false,
		});
		self.set(math_function, function as u32);
	}

	/// Gen9 extended message descriptor. Only bits 31:16 are encodable;
	/// they're scattered over src1 fields SEND doesn't use.
	pub fn set_send_extdesc(&mut self, value: u32) {
		assert!(
			self.generation() == Generation::Gen9,
			"{} has no extended message descriptor",
			self.generation()
		);
		self.set(Gen8Message::EXTDESC_3_0, value >> 16);
		self.set(Gen8Message::EXTDESC_7_4, value >> 20);
		self.set(Gen8Message::EXTDESC_11_8, value >> 24);
		self.set(Gen8Message::EXTDESC_15_12, value >> 28);
	}

	fn assert_three_source(&self, reg: &Register) {
		assert!(
			self.generation().has_three_source(),
			"{} has no three-source instructions",
			self.generation()
		);
		assert!(self.is_align16(), "three-source instructions require Align16");
		assert!(
			reg.file == RegisterFile::General,
			"three-source operands must be general registers"
		);
		assert!(
			reg.address_mode == AddressMode::Direct,
			"three-source operands must be directly addressed"
		);
		assert!(
			reg.subnr % 4 == 0,
			"three-source sub-register {} is not dword aligned",
			reg.subnr
		);
	}

	fn set_three_source_type(&mut self, field: Field, ty: RegisterType) {
		if self.generation().has_three_source_types() {
			self.set(field, three_source_type_encoding(ty));
		} else {
			assert!(
				ty == RegisterType::F,
				"{} three-source instructions only operate on floats",
				self.generation()
			);
		}
	}

	pub fn set_3src_dst(&mut self, reg: Register) {
		let reg = reg.normalize(self.generation());
		self.assert_three_source(&reg);

		self.set(L::DST_3SRC_REG_NR, reg.nr);
		self.set(L::DST_3SRC_SUBREG_NR, reg.subnr / 4);
		self.set(L::DST_3SRC_WRITEMASK, reg.writemask.bits());
		self.set_three_source_type(L::DST_3SRC_TYPE, reg.ty);
	}

	/// Sets source `index` (0 through 2). All three sources share one type.
	pub fn set_3src_src(&mut self, index: usize, reg: Register) {
		let reg = reg.normalize(self.generation());
		self.assert_three_source(&reg);

		let subnr = reg.subnr / 4;
		let replicate = (reg.region.vstride == VerticalStride::S0) as u32;

		match index {
			0 => {
				self.set(L::SRC0_3SRC_REG_NR, reg.nr);
				self.set(L::SRC0_3SRC_SUBREG_NR, subnr);
				self.set(L::SRC0_3SRC_SWIZZLE, reg.swizzle.0 as u32);
				self.set(L::SRC0_3SRC_REP_CTRL, replicate);
				self.set(L::SRC0_3SRC_NEGATE, reg.negate as u32);
				self.set(L::SRC0_3SRC_ABS, reg.abs as u32);
			},
			1 => {
				self.set(L::SRC1_3SRC_REG_NR, reg.nr);
				self.set(L::SRC1_3SRC_SUBREG_NR_LOW, subnr & 0x3);
				self.set(L::SRC1_3SRC_SUBREG_NR_HIGH, subnr >> 2);
				self.set(L::SRC1_3SRC_SWIZZLE, reg.swizzle.0 as u32);
				self.set(L::SRC1_3SRC_REP_CTRL, replicate);
				self.set(L::SRC1_3SRC_NEGATE, reg.negate as u32);
				self.set(L::SRC1_3SRC_ABS, reg.abs as u32);
			},
			2 => {
				self.set(L::SRC2_3SRC_REG_NR, reg.nr);
				self.set(L::SRC2_3SRC_SUBREG_NR, subnr);
				self.set(L::SRC2_3SRC_SWIZZLE, reg.swizzle.0 as u32);
				self.set(L::SRC2_3SRC_REP_CTRL, replicate);
				self.set(L::SRC2_3SRC_NEGATE, reg.negate as u32);
				self.set(L::SRC2_3SRC_ABS, reg.abs as u32);
			},
			_ => panic!("three-source instructions have no source {}", index),
		}

		self.set_three_source_type(L::SRC_3SRC_TYPE, reg.ty);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{gen4::Gen4, gen8::Gen8, layout::Fields};

	#[test]
	fn region_rules() {
		let scalar = Region::SCALAR;
		let vec8 = Region::contiguous(Width::W8);

		assert_eq!(check_region(ExecSize::E1, scalar), Ok(()));
		assert_eq!(check_region(ExecSize::E8, scalar), Ok(()));
		assert_eq!(check_region(ExecSize::E8, vec8), Ok(()));
		assert_eq!(check_region(ExecSize::E16, vec8), Ok(()));
		assert_eq!(
			check_region(ExecSize::E4, vec8),
			Err(RegionError::WidthExceedsExecSize {
				width: 8,
				exec_size: 4
			})
		);
		assert_eq!(
			check_region(
				ExecSize::E8,
				Region::new(VerticalStride::S4, Width::W8, HorizontalStride::S1)
			),
			Err(RegionError::VerticalStrideMismatch {
				vstride: 4,
				width: 8,
				hstride: 1
			})
		);
		assert_eq!(
			check_region(
				ExecSize::E8,
				Region::new(VerticalStride::VxH, Width::W8, HorizontalStride::S1)
			),
			Ok(())
		);
		assert_eq!(
			check_region(
				ExecSize::E8,
				Region::new(VerticalStride::S0, Width::W1, HorizontalStride::S1)
			),
			Err(RegionError::ScalarWithStride)
		);
		assert_eq!(
			check_region(
				ExecSize::E1,
				Region::new(VerticalStride::S1, Width::W1, HorizontalStride::S0)
			),
			Err(RegionError::ScalarExecutionWithStride)
		);
		assert_eq!(
			check_region(
				ExecSize::E8,
				Region::new(VerticalStride::S0, Width::W4, HorizontalStride::S0)
			),
			Err(RegionError::BroadcastWithWidth)
		);
	}

	#[test]
	fn narrow_destinations_reduce_the_execution_size() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_exec_size(ExecSize::E8);
		inst.set_dst(Register::grf(2, 0).vec4());
		assert_eq!(inst.get(Gen8::EXEC_SIZE), ExecSize::E4 as u32);

		inst.set_exec_size(ExecSize::E16);
		inst.set_dst(Register::grf(2, 0).vec16());
		assert_eq!(inst.get(Gen8::EXEC_SIZE), ExecSize::E16 as u32);
	}

	#[test]
	fn destination_stride_is_never_zero() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_exec_size(ExecSize::E8);
		inst.set_dst(Register::grf(2, 0).with_region(Region::new(
			VerticalStride::S8,
			Width::W8,
			HorizontalStride::S0,
		)));
		assert_eq!(inst.get(Gen8::DST_DA1_HSTRIDE), HorizontalStride::S1 as u32);
	}

	#[test]
	fn scalar_sources_collapse_strides() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_exec_size(ExecSize::E1);
		inst.set_src0(Register::grf(3, 4).vec1());
		assert_eq!(inst.get(Gen8::SRC0_VERT_STRIDE), 0);
		assert_eq!(inst.get(Gen8::SRC0_DA1_HSTRIDE), 0);
		assert_eq!(inst.get(Gen8::SRC0_DA1_WIDTH), Width::W1 as u32);
		assert_eq!(inst.get(Gen8::SRC0_DA1_SUBREG_NR), 4);
	}

	#[test]
	fn align16_vec8_becomes_vec4() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_access_mode(AccessMode::Align16);
		inst.set_exec_size(ExecSize::E8);
		inst.set_src1(Register::grf(7, 16).vec8());
		assert_eq!(inst.get(Gen8::SRC1_VERT_STRIDE), VerticalStride::S4 as u32);
		assert_eq!(inst.get(Gen8::SRC1_DA16_SUBREG_NR), 1);
		assert_eq!(inst.get(Gen8::SRC1_DA16_SWIZ_W), 3);
	}

	#[test]
	fn immediate_src0_fixes_up_src1() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_exec_size(ExecSize::E8);
		inst.set_src1(Register::grf(1, 0));
		inst.set_src0(Register::imm_ud(0xdead_beef));
		assert_eq!(inst.words()[3], 0xdead_beef);
		assert_eq!(inst.get(Gen8::SRC1_REG_FILE), RegisterFile::Architecture as u32);
		assert_eq!(inst.get(Gen8::SRC1_REG_TYPE), 0);
	}

	#[test]
	#[should_panic(expected = "src1 cannot be set when src0 is an immediate")]
	fn two_immediates_are_rejected() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_src0(Register::imm_d(1));
		inst.set_src1(Register::imm_d(2));
	}

	#[test]
	#[should_panic(expected = "is not 0 or 16")]
	fn misaligned_align16_destination() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_access_mode(AccessMode::Align16);
		inst.set_dst(Register::grf(1, 8));
	}

	#[test]
	#[should_panic(expected = "indirect sources require Align1")]
	fn indirect_align16_source() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_access_mode(AccessMode::Align16);
		inst.set_exec_size(ExecSize::E8);
		inst.set_src0(Register::grf(0, 0).indirect(0, 0));
	}

	#[test]
	#[should_panic(expected = "with execution size 4")]
	fn invalid_regions_panic() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_exec_size(ExecSize::E4);
		inst.set_src0(Register::grf(1, 0).vec8());
	}

	#[test]
	fn message_descriptor_clears_function_control() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_opcode(Opcode::Send);
		inst.set_bits(127, 96, !0);
		inst.set_message_descriptor(&MessageDescriptor {
			sfid: Sfid::DataCache,
			mlen: 1,
			rlen: 0,
			header_present: false,
			end_of_thread: true,
		});
		assert_eq!(inst.words()[3], (1 << 31) | (1 << 25));
		assert_eq!(inst.get(Gen8::COND_MODIFIER), Sfid::DataCache as u32);
	}

	#[test]
	fn dataport_function_control() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_opcode(Opcode::Send);
		inst.set_dp_message(
			&DataportMessage {
				sfid: Sfid::RenderCache,
				binding_table_index: 0x12,
				msg_type: 0x1c,
				msg_control: 0x05,
			},
			2,
			0,
			true,
			false,
		);
		assert_eq!(
			inst.get_bits(114, 96),
			0x12 | (0x1c << 14) | (0x05 << 8)
		);
		assert_eq!(inst.get_bits(115, 115), 1);
	}

	#[test]
	#[should_panic(expected = "wider than 5 bits")]
	fn dataport_message_type_is_five_bits() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_dp_message(
			&DataportMessage {
				sfid: Sfid::DataCache,
				binding_table_index: 0,
				msg_type: 0x20,
				msg_control: 0,
			},
			1,
			1,
			false,
			false,
		);
	}

	#[test]
	fn three_source_flag_register() {
		let mut inst = Instruction::<Gen4>::new(Generation::Gen7);
		inst.set_opcode(Opcode::Mad);
		inst.set_bits(93, 86, 0x55);
		inst.set_flag_reg(1, 1);
		assert_eq!(inst.get_bits(34, 33), 0b11);
		assert_eq!(inst.get(Gen4::SRC1_3SRC_SWIZZLE), 0x55);

		// everything else keeps the flag register in word 2
		inst.set_opcode(Opcode::Add);
		inst.set_flag_reg(1, 0);
		assert_eq!(inst.get_bits(90, 89), 0b10);

		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_opcode(Opcode::Mad);
		inst.set_flag_reg(1, 1);
		assert_eq!(inst.get_bits(33, 32), 0b11);
	}

	#[test]
	fn gen9_extended_descriptor() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen9);
		inst.set_send_extdesc(0x8765_0000);
		assert_eq!(inst.get_bits(67, 64), 0x5);
		assert_eq!(inst.get_bits(83, 80), 0x6);
		assert_eq!(inst.get_bits(88, 85), 0x7);
		assert_eq!(inst.get_bits(94, 91), 0x8);
		assert_eq!(inst.get(Gen8Message::EXTDESC_15_12), 0x8);
	}

	#[test]
	fn legacy_urb_write_keeps_message_registers() {
		let mut inst = Instruction::<Gen4>::new(Generation::Gen6);
		inst.set_opcode(Opcode::Send);
		inst.set_exec_size(ExecSize::E8);
		inst.set_urb_message(
			&UrbMessage {
				opcode: 0,
				offset: 3,
				interleave: false,
				complete: true,
			},
			3,
			0,
			true,
		);
		assert_eq!(inst.get(Gen4::SRC0_REG_FILE), RegisterFile::Message as u32);
		assert_eq!(inst.get(Gen4::SRC0_DA_REG_NR), 1);
		assert_eq!(inst.get_bits(105, 100), 3);
		assert_eq!(inst.get_bits(111, 111), 1);
		assert_eq!(inst.get_bits(127, 127), 1);
	}

	#[test]
	fn three_source_subregisters_are_dwords() {
		let mut inst = Instruction::<Gen8>::new(Generation::Gen8);
		inst.set_opcode(Opcode::Mad);
		inst.set_access_mode(AccessMode::Align16);
		inst.set_3src_src(1, Register::grf(9, 20).vec1());
		assert_eq!(inst.get(Gen8::SRC1_3SRC_SUBREG_NR_LOW), 1);
		assert_eq!(inst.get(Gen8::SRC1_3SRC_SUBREG_NR_HIGH), 1);
		assert_eq!(inst.get(Gen8::SRC1_3SRC_REP_CTRL), 1);
		assert_eq!(inst.get(Gen8::SRC_3SRC_TYPE), 0);
	}

	#[test]
	#[should_panic(expected = "only operate on floats")]
	fn gen6_three_source_is_float_only() {
		let mut inst = Instruction::<Gen4>::new(Generation::Gen6);
		inst.set_access_mode(AccessMode::Align16);
		inst.set_3src_dst(Register::grf(1, 0).with_type(RegisterType::D));
	}
}
