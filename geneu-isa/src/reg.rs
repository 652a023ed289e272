//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt;

use bitflags::bitflags;
use num_enum::TryFromPrimitive;

use crate::{
	generation::{Generation, MAX_GRF, MRF_HACK_START},
	util::float_to_vf,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum RegisterFile {
	Architecture = 0,
	General = 1,
	Message = 2,
	Immediate = 3,
}

/// Operand data types.
///
/// Register operands and immediates number their types differently; see
/// [`RegisterType::encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterType {
	UD,
	D,
	UW,
	W,
	UB,
	B,
	DF,
	F,
	/// Packed vector of four restricted floats (immediates only).
	VF,
	/// Packed vector of eight signed 4-bit integers (immediates only).
	V,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum VerticalStride {
	S0 = 0,
	S1 = 1,
	S2 = 2,
	S4 = 3,
	S8 = 4,
	S16 = 5,
	S32 = 6,
	S64 = 7,
	S128 = 8,
	S256 = 9,
	/// Per-lane indirect addressing; also the sentinel for "no vertical
	/// stride".
	VxH = 0xf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum Width {
	W1 = 0,
	W2 = 1,
	W4 = 2,
	W8 = 3,
	W16 = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum HorizontalStride {
	S0 = 0,
	S1 = 1,
	S2 = 2,
	S4 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum ExecSize {
	E1 = 0,
	E2 = 1,
	E4 = 2,
	E8 = 3,
	E16 = 4,
	E32 = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum Channel {
	X = 0,
	Y = 1,
	Z = 2,
	W = 3,
}

bitflags! {
	/// Align16 destination channel enables.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct WriteMask: u32 {
		const X = 1;
		const Y = 2;
		const Z = 4;
		const W = 8;
		const XYZW = Self::X.bits() | Self::Y.bits() | Self::Z.bits() | Self::W.bits();
	}
}

/// Four 2-bit channel selectors packed as hardware encodes them, X in the
/// low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swizzle(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
	pub vstride: VerticalStride,
	pub width: Width,
	pub hstride: HorizontalStride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
	Direct,
	/// `file[a0.subreg + offset]`; `offset` is a signed 10-bit byte offset.
	Indirect { subreg: u32, offset: i32 },
}

/// Architecture register numbers; the low nibble selects an instance.
pub mod arf {
	pub const NULL: u32 = 0x00;
	pub const ADDRESS: u32 = 0x10;
	pub const ACCUMULATOR: u32 = 0x20;
	pub const FLAG: u32 = 0x30;
	pub const MASK: u32 = 0x40;
	pub const MASK_STACK: u32 = 0x50;
	pub const STATE: u32 = 0x70;
	pub const CONTROL: u32 = 0x80;
	pub const NOTIFICATION_COUNT: u32 = 0x90;
	pub const IP: u32 = 0xa0;
}

/// One instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
	pub file: RegisterFile,
	pub ty: RegisterType,
	pub nr: u32,
	/// Byte offset within the register.
	pub subnr: u32,
	pub negate: bool,
	pub abs: bool,
	pub region: Region,
	pub swizzle: Swizzle,
	pub writemask: WriteMask,
	pub address_mode: AddressMode,
	/// Payload of immediate operands.
	pub immediate: u32,
}

impl RegisterType {
	/// Hardware type encoding in `file`, if the type is representable there.
	pub fn encoding(self, file: RegisterFile) -> Option<u32> {
		match (file, self) {
			(_, RegisterType::UD) => Some(0),
			(_, RegisterType::D) => Some(1),
			(_, RegisterType::UW) => Some(2),
			(_, RegisterType::W) => Some(3),
			(_, RegisterType::UB) => Some(4),
			(_, RegisterType::F) => Some(7),
			(RegisterFile::Immediate, RegisterType::VF) => Some(5),
			(RegisterFile::Immediate, RegisterType::V) => Some(6),
			(RegisterFile::Immediate, _) => None,
			(_, RegisterType::B) => Some(5),
			(_, RegisterType::DF) => Some(6),
			(_, RegisterType::VF | RegisterType::V) => None,
		}
	}

	pub fn from_encoding(file: RegisterFile, encoding: u32) -> Option<Self> {
		match (file, encoding) {
			(_, 0) => Some(RegisterType::UD),
			(_, 1) => Some(RegisterType::D),
			(_, 2) => Some(RegisterType::UW),
			(_, 3) => Some(RegisterType::W),
			(_, 4) => Some(RegisterType::UB),
			(RegisterFile::Immediate, 5) => Some(RegisterType::VF),
			(RegisterFile::Immediate, 6) => Some(RegisterType::V),
			(_, 5) => Some(RegisterType::B),
			(_, 6) => Some(RegisterType::DF),
			(_, 7) => Some(RegisterType::F),
			_ => None,
		}
	}

	/// Type encoding of three-source operands.
	pub fn three_source_encoding(self) -> Option<u32> {
		match self {
			RegisterType::F => Some(0),
			RegisterType::D => Some(1),
			RegisterType::UD => Some(2),
			RegisterType::DF => Some(3),
			_ => None,
		}
	}

	pub fn from_three_source_encoding(encoding: u32) -> Option<Self> {
		match encoding {
			0 => Some(RegisterType::F),
			1 => Some(RegisterType::D),
			2 => Some(RegisterType::UD),
			3 => Some(RegisterType::DF),
			_ => None,
		}
	}

	/// Size of one element in bytes.
	pub const fn size(self) -> u32 {
		match self {
			RegisterType::UD | RegisterType::D | RegisterType::F | RegisterType::VF => 4,
			RegisterType::UW | RegisterType::W | RegisterType::V => 2,
			RegisterType::UB | RegisterType::B => 1,
			RegisterType::DF => 8,
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			RegisterType::UD => "UD",
			RegisterType::D => "D",
			RegisterType::UW => "UW",
			RegisterType::W => "W",
			RegisterType::UB => "UB",
			RegisterType::B => "B",
			RegisterType::DF => "DF",
			RegisterType::F => "F",
			RegisterType::VF => "VF",
			RegisterType::V => "V",
		}
	}

	/// Whether `gen` has this type.
	pub const fn is_available(self, gen: Generation) -> bool {
		!matches!(self, RegisterType::DF) || gen.has_df()
	}
}

impl fmt::Display for RegisterType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl VerticalStride {
	/// Stride in elements; `None` for [`VerticalStride::VxH`].
	pub const fn elements(self) -> Option<u32> {
		match self {
			VerticalStride::VxH => None,
			_ => Some(match self as u32 {
				0 => 0,
				n => 1 << (n - 1),
			}),
		}
	}
}

impl Width {
	pub const fn elements(self) -> u32 {
		1 << (self as u32)
	}
}

impl HorizontalStride {
	pub const fn elements(self) -> u32 {
		match self as u32 {
			0 => 0,
			n => 1 << (n - 1),
		}
	}
}

impl ExecSize {
	pub const fn channels(self) -> u32 {
		1 << (self as u32)
	}

	/// The execution size covering as many channels as `width` elements.
	pub const fn from_width(width: Width) -> Self {
		match width {
			Width::W1 => ExecSize::E1,
			Width::W2 => ExecSize::E2,
			Width::W4 => ExecSize::E4,
			Width::W8 => ExecSize::E8,
			Width::W16 => ExecSize::E16,
		}
	}
}

impl Swizzle {
	pub const XYZW: Self = Self::new(Channel::X, Channel::Y, Channel::Z, Channel::W);
	pub const XXXX: Self = Self::new(Channel::X, Channel::X, Channel::X, Channel::X);
	pub const YYYY: Self = Self::new(Channel::Y, Channel::Y, Channel::Y, Channel::Y);
	pub const ZZZZ: Self = Self::new(Channel::Z, Channel::Z, Channel::Z, Channel::Z);
	pub const WWWW: Self = Self::new(Channel::W, Channel::W, Channel::W, Channel::W);

	pub const fn new(x: Channel, y: Channel, z: Channel, w: Channel) -> Self {
		Self((x as u8) | ((y as u8) << 2) | ((z as u8) << 4) | ((w as u8) << 6))
	}

	/// The source channel selected for destination channel `index`.
	pub const fn get(self, index: u32) -> u32 {
		((self.0 >> (index * 2)) & 0x3) as u32
	}
}

impl Region {
	pub const SCALAR: Self = Self::new(VerticalStride::S0, Width::W1, HorizontalStride::S0);

	pub const fn new(vstride: VerticalStride, width: Width, hstride: HorizontalStride) -> Self {
		Self {
			vstride,
			width,
			hstride,
		}
	}

	/// `<width;width,1>`, the contiguous region of `width` elements.
	pub const fn contiguous(width: Width) -> Self {
		let vstride = match width {
			Width::W1 => VerticalStride::S1,
			Width::W2 => VerticalStride::S2,
			Width::W4 => VerticalStride::S4,
			Width::W8 => VerticalStride::S8,
			Width::W16 => VerticalStride::S16,
		};
		Self::new(vstride, width, HorizontalStride::S1)
	}
}

impl Register {
	/// A direct-addressed register operand.
	pub const fn new(
		file: RegisterFile,
		nr: u32,
		subnr: u32,
		ty: RegisterType,
		region: Region,
	) -> Self {
		Self {
			file,
			ty,
			nr,
			subnr,
			negate: false,
			abs: false,
			region,
			swizzle: Swizzle::XYZW,
			writemask: WriteMask::XYZW,
			address_mode: AddressMode::Direct,
			immediate: 0,
		}
	}

	/// An 8-wide float GRF.
	pub const fn grf(nr: u32, subnr: u32) -> Self {
		Self::new(
			RegisterFile::General,
			nr,
			subnr,
			RegisterType::F,
			Region::contiguous(Width::W8),
		)
	}

	pub const fn mrf(nr: u32, subnr: u32) -> Self {
		Self::new(
			RegisterFile::Message,
			nr,
			subnr,
			RegisterType::F,
			Region::contiguous(Width::W8),
		)
	}

	pub const fn arf(nr: u32, subnr: u32) -> Self {
		Self::new(
			RegisterFile::Architecture,
			nr,
			subnr,
			RegisterType::F,
			Region::contiguous(Width::W8),
		)
	}

	pub const fn null() -> Self {
		Self::arf(arf::NULL, 0)
	}

	pub const fn address(subnr: u32) -> Self {
		Self::arf(arf::ADDRESS, subnr)
			.with_type(RegisterType::UW)
			.vec1()
	}

	pub const fn acc(nr: u32) -> Self {
		Self::arf(arf::ACCUMULATOR + nr, 0)
	}

	pub const fn flag(nr: u32, subnr: u32) -> Self {
		Self::arf(arf::FLAG + nr, subnr)
			.with_type(RegisterType::UW)
			.vec1()
	}

	const fn immediate(ty: RegisterType, value: u32) -> Self {
		let mut reg = Self::new(RegisterFile::Immediate, 0, 0, ty, Region::SCALAR);
		reg.immediate = value;
		reg
	}

	pub const fn imm_f(value: f32) -> Self {
		Self::immediate(RegisterType::F, value.to_bits())
	}

	pub const fn imm_d(value: i32) -> Self {
		Self::immediate(RegisterType::D, value as u32)
	}

	pub const fn imm_ud(value: u32) -> Self {
		Self::immediate(RegisterType::UD, value)
	}

	/// Word immediates are replicated into both halves of the payload.
	pub const fn imm_w(value: i16) -> Self {
		let bits = value as u16 as u32;
		Self::immediate(RegisterType::W, bits | (bits << 16))
	}

	pub const fn imm_uw(value: u16) -> Self {
		let bits = value as u32;
		Self::immediate(RegisterType::UW, bits | (bits << 16))
	}

	pub const fn imm_ub(value: u8) -> Self {
		Self::immediate(RegisterType::UB, value as u32)
	}

	/// Eight packed signed 4-bit integers.
	pub const fn imm_v(value: u32) -> Self {
		let mut reg = Self::immediate(RegisterType::V, value);
		reg.region = Region::new(VerticalStride::S0, Width::W8, HorizontalStride::S1);
		reg
	}

	/// Four packed restricted floats.
	pub const fn imm_vf(value: u32) -> Self {
		let mut reg = Self::immediate(RegisterType::VF, value);
		reg.region = Region::new(VerticalStride::S0, Width::W4, HorizontalStride::S1);
		reg
	}

	/// Packs four floats as a vector-float immediate; `None` if any of them
	/// has no restricted-float encoding.
	pub fn imm_vf4(x: f32, y: f32, z: f32, w: f32) -> Option<Self> {
		let mut value = 0;
		for (i, component) in [x, y, z, w].into_iter().enumerate() {
			value |= (float_to_vf(component)? as u32) << (i * 8);
		}
		Some(Self::imm_vf(value))
	}

	pub const fn with_type(mut self, ty: RegisterType) -> Self {
		self.ty = ty;
		self
	}

	pub const fn with_region(mut self, region: Region) -> Self {
		self.region = region;
		self
	}

	pub const fn vec1(self) -> Self {
		self.with_region(Region::SCALAR)
	}

	pub const fn vec2(self) -> Self {
		self.with_region(Region::contiguous(Width::W2))
	}

	pub const fn vec4(self) -> Self {
		self.with_region(Region::contiguous(Width::W4))
	}

	pub const fn vec8(self) -> Self {
		self.with_region(Region::contiguous(Width::W8))
	}

	pub const fn vec16(self) -> Self {
		self.with_region(Region::contiguous(Width::W16))
	}

	pub const fn with_swizzle(mut self, swizzle: Swizzle) -> Self {
		self.swizzle = swizzle;
		self
	}

	pub const fn with_writemask(mut self, writemask: WriteMask) -> Self {
		self.writemask = writemask;
		self
	}

	pub const fn negated(mut self) -> Self {
		self.negate = !self.negate;
		self
	}

	pub const fn absolute(mut self) -> Self {
		self.abs = true;
		self.negate = false;
		self
	}

	/// Addresses `file[a0.subreg + offset]` instead of this register's
	/// number.
	pub const fn indirect(mut self, subreg: u32, offset: i32) -> Self {
		self.address_mode = AddressMode::Indirect { subreg, offset };
		self
	}

	pub const fn is_immediate(&self) -> bool {
		matches!(self.file, RegisterFile::Immediate)
	}

	pub fn is_null(&self) -> bool {
		self.file == RegisterFile::Architecture && self.nr == arf::NULL
	}

	/// Remaps message registers onto the top of the GRF on generations
	/// without a message register file.
	///
	/// Panics if the result addresses a register that doesn't exist.
	pub fn normalize(mut self, gen: Generation) -> Self {
		if self.file == RegisterFile::Message && !gen.has_mrf() {
			self.file = RegisterFile::General;
			self.nr += MRF_HACK_START;
		}

		match self.file {
			RegisterFile::General => assert!(
				self.nr < MAX_GRF,
				"g{} is beyond the {} general registers",
				self.nr,
				MAX_GRF
			),
			RegisterFile::Message => assert!(
				self.nr < gen.mrf_count(),
				"m{} is beyond the {} message registers of {}",
				self.nr,
				gen.mrf_count(),
				gen
			),
			_ => {},
		}

		self
	}
}
