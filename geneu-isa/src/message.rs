//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! SEND message descriptors.

use num_enum::TryFromPrimitive;

use crate::{
	gen4::{Gen4Message, Gen5Message, Gen7Message},
	gen8::Gen8Message,
	generation::Generation,
	layout::Field,
};

/// Shared function IDs. Gen4 and Gen5 call 4 and 5 the dataport read and
/// write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum Sfid {
	Null = 0,
	/// Gen4 and Gen5 only.
	Math = 1,
	Sampler = 2,
	Gateway = 3,
	SamplerCache = 4,
	RenderCache = 5,
	Urb = 6,
	ThreadSpawner = 7,
	Vme = 8,
	ConstantCache = 9,
	DataCache = 10,
	PixelInterpolator = 11,
	DataCache1 = 12,
	Cre = 13,
}

impl Sfid {
	/// Whether this shared function is a dataport whose payload is a binding
	/// table index plus function control bits.
	pub fn is_dataport(self) -> bool {
		matches!(
			self,
			Sfid::SamplerCache | Sfid::RenderCache | Sfid::ConstantCache | Sfid::DataCache
		)
	}
}

/// The generic half of a SEND descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageDescriptor {
	pub sfid: Sfid,
	pub mlen: u32,
	pub rlen: u32,
	/// Ignored on Gen4, which has no header-present bit.
	pub header_present: bool,
	pub end_of_thread: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerMessage {
	pub binding_table_index: u32,
	pub sampler: u32,
	pub msg_type: u32,
	/// SIMD mode; the return format on Gen4.
	pub simd_mode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UrbMessage {
	pub opcode: u32,
	/// Global offset in 128-bit units.
	pub offset: u32,
	pub interleave: bool,
	/// Only encoded before Gen8.
	pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataportMessage {
	pub sfid: Sfid,
	pub binding_table_index: u32,
	pub msg_type: u32,
	pub msg_control: u32,
}

/// Where one generation keeps its message descriptor fields.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MessageLayout {
	pub sfid: Field,
	pub eot: Field,
	pub mlen: Field,
	pub rlen: Field,
	pub header_present: Option<Field>,
	pub function_control: Field,

	pub sampler_binding_table_index: Field,
	pub sampler: Field,
	pub sampler_msg_type: Field,
	/// SIMD mode, or the return format on Gen4.
	pub sampler_mode: Field,

	pub urb_opcode: Field,
	pub urb_offset: Field,
	pub urb_interleave: Option<Field>,
	pub urb_per_slot_offset: Option<Field>,
	pub urb_complete: Option<Field>,

	pub dp_binding_table_index: Field,
	pub math_function: Option<Field>,
}

// shares bits with the header's conditional modifier from Gen6 on
const HEADER_SFID: Field = Field::new("sfid", 27, 24);

const GEN8: MessageLayout = MessageLayout {
	sfid: HEADER_SFID,
	eot: Gen8Message::EOT,
	mlen: Gen8Message::MLEN,
	rlen: Gen8Message::RLEN,
	header_present: Some(Gen8Message::HEADER_PRESENT),
	function_control: Gen8Message::FUNCTION_CONTROL,
	sampler_binding_table_index: Gen8Message::SAMPLER_BINDING_TABLE_INDEX,
	sampler: Gen8Message::SAMPLER,
	sampler_msg_type: Gen8Message::SAMPLER_MSG_TYPE,
	sampler_mode: Gen8Message::SAMPLER_SIMD_MODE,
	urb_opcode: Gen8Message::URB_OPCODE,
	urb_offset: Gen8Message::URB_GLOBAL_OFFSET,
	urb_interleave: Some(Gen8Message::URB_INTERLEAVE),
	urb_per_slot_offset: Some(Gen8Message::URB_PER_SLOT_OFFSET),
	urb_complete: None,
	dp_binding_table_index: Gen8Message::DP_BINDING_TABLE_INDEX,
	math_function: None,
};

const GEN7: MessageLayout = MessageLayout {
	sfid: HEADER_SFID,
	eot: Gen7Message::EOT,
	mlen: Gen7Message::MLEN,
	rlen: Gen7Message::RLEN,
	header_present: Some(Gen7Message::HEADER_PRESENT),
	function_control: Gen7Message::FUNCTION_CONTROL,
	sampler_binding_table_index: Gen7Message::SAMPLER_BINDING_TABLE_INDEX,
	sampler: Gen7Message::SAMPLER,
	sampler_msg_type: Gen7Message::SAMPLER_MSG_TYPE,
	sampler_mode: Gen7Message::SAMPLER_SIMD_MODE,
	urb_opcode: Gen7Message::URB_OPCODE,
	urb_offset: Gen7Message::URB_GLOBAL_OFFSET,
	urb_interleave: Some(Gen7Message::URB_INTERLEAVE),
	urb_per_slot_offset: Some(Gen7Message::URB_PER_SLOT_OFFSET),
	urb_complete: Some(Gen7Message::URB_COMPLETE),
	dp_binding_table_index: Gen7Message::DP_BINDING_TABLE_INDEX,
	math_function: None,
};

const GEN6: MessageLayout = MessageLayout {
	sfid: HEADER_SFID,
	math_function: None,
	..GEN5
};

const GEN5: MessageLayout = MessageLayout {
	sfid: Gen5Message::SFID,
	eot: Gen5Message::EOT,
	mlen: Gen5Message::MLEN,
	rlen: Gen5Message::RLEN,
	header_present: Some(Gen5Message::HEADER_PRESENT),
	function_control: Gen5Message::FUNCTION_CONTROL,
	sampler_binding_table_index: Gen5Message::SAMPLER_BINDING_TABLE_INDEX,
	sampler: Gen5Message::SAMPLER,
	sampler_msg_type: Gen5Message::SAMPLER_MSG_TYPE,
	sampler_mode: Gen5Message::SAMPLER_SIMD_MODE,
	urb_opcode: Gen5Message::URB_OPCODE,
	urb_offset: Gen5Message::URB_OFFSET,
	urb_interleave: None,
	urb_per_slot_offset: None,
	urb_complete: Some(Gen5Message::URB_COMPLETE),
	dp_binding_table_index: Gen5Message::DP_BINDING_TABLE_INDEX,
	math_function: Some(Gen5Message::MATH_FUNCTION),
};

const GEN4: MessageLayout = MessageLayout {
	sfid: Gen4Message::MSG_TARGET,
	eot: Gen4Message::EOT,
	mlen: Gen4Message::MLEN,
	rlen: Gen4Message::RLEN,
	header_present: None,
	function_control: Gen4Message::FUNCTION_CONTROL,
	sampler_binding_table_index: Gen4Message::SAMPLER_BINDING_TABLE_INDEX,
	sampler: Gen4Message::SAMPLER,
	sampler_msg_type: Gen4Message::SAMPLER_MSG_TYPE,
	sampler_mode: Gen4Message::SAMPLER_RETURN_FORMAT,
	urb_opcode: Gen4Message::URB_OPCODE,
	urb_offset: Gen4Message::URB_OFFSET,
	urb_interleave: None,
	urb_per_slot_offset: None,
	urb_complete: Some(Gen4Message::URB_COMPLETE),
	dp_binding_table_index: Gen4Message::DP_BINDING_TABLE_INDEX,
	math_function: Some(Gen4Message::MATH_FUNCTION),
};

impl MessageLayout {
	pub fn of(gen: Generation) -> &'static Self {
		match gen {
			Generation::Gen4 => &GEN4,
			Generation::Gen5 => &GEN5,
			Generation::Gen6 => &GEN6,
			Generation::Gen7 => &GEN7,
			Generation::Gen8 | Generation::Gen9 => &GEN8,
		}
	}
}
