//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Instruction header controls.

use num_enum::TryFromPrimitive;

use crate::{
	message::Sfid,
	opcode::{Opcode, OpcodeClass},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum AccessMode {
	Align1 = 0,
	Align16 = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum MaskControl {
	Enable = 0,
	Disable = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum DependencyControl {
	None = 0,
	NoDDClear = 1,
	NoDDCheck = 2,
	NoDDClearCheck = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum ThreadControl {
	Normal = 0,
	Atomic = 1,
	Switch = 2,
}

/// Align1 predicate controls; Align16 reuses 0 through 7 with channel
/// selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum PredicateControl {
	None = 0,
	Normal = 1,
	AnyV = 2,
	AllV = 3,
	Any2H = 4,
	All2H = 5,
	Any4H = 6,
	All4H = 7,
	Any8H = 8,
	All8H = 9,
	Any16H = 10,
	All16H = 11,
	Any32H = 12,
	All32H = 13,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum ConditionalModifier {
	None = 0,
	Zero = 1,
	NotZero = 2,
	Greater = 3,
	GreaterEqual = 4,
	Less = 5,
	LessEqual = 6,
	/// Round increment; Gen4 and Gen5 only.
	Round = 7,
	Overflow = 8,
	Unordered = 9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum MathFunction {
	Inv = 1,
	Log = 2,
	Exp = 3,
	Sqrt = 4,
	Rsq = 5,
	Sin = 6,
	Cos = 7,
	Fdiv = 9,
	Pow = 10,
	IntDivQuotientAndRemainder = 11,
	IntDivQuotient = 12,
	IntDivRemainder = 13,
	Invm = 14,
	Rsqrtm = 15,
}

/// The meaning of header bits 27:24, which depends on the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
	Condition(ConditionalModifier),
	MathFunction(MathFunction),
	/// Gen6 and later SEND.
	SharedFunction(Sfid),
	/// Gen4 and Gen5 SEND: the first message register of the payload.
	MessageRegister(u32),
}

impl Modifier {
	pub fn encoding(self) -> u32 {
		match self {
			Modifier::Condition(cond) => cond as u32,
			Modifier::MathFunction(function) => function as u32,
			Modifier::SharedFunction(sfid) => sfid as u32,
			Modifier::MessageRegister(nr) => nr,
		}
	}

	/// Interprets `raw` for `opcode`; `None` for encodings with no meaning.
	pub fn decode(opcode: Opcode, raw: u32, sfid_in_header: bool) -> Option<Self> {
		match opcode.class() {
			OpcodeClass::Math => MathFunction::try_from(raw).ok().map(Modifier::MathFunction),
			OpcodeClass::Send if sfid_in_header => {
				Sfid::try_from(raw).ok().map(Modifier::SharedFunction)
			},
			OpcodeClass::Send => Some(Modifier::MessageRegister(raw)),
			OpcodeClass::Other => ConditionalModifier::try_from(raw)
				.ok()
				.map(Modifier::Condition),
		}
	}

	/// Whether this modifier may be written on an instruction with `opcode`.
	pub fn is_valid_for(self, opcode: Opcode, sfid_in_header: bool) -> bool {
		match (self, opcode.class()) {
			(Modifier::Condition(_), OpcodeClass::Other) => true,
			(Modifier::MathFunction(_), OpcodeClass::Math) => true,
			(Modifier::SharedFunction(_), OpcodeClass::Send) => sfid_in_header,
			(Modifier::MessageRegister(_), OpcodeClass::Send) => !sfid_in_header,
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn modifier_depends_on_opcode_class() {
		assert_eq!(
			Modifier::decode(Opcode::Math, 4, true),
			Some(Modifier::MathFunction(MathFunction::Sqrt))
		);
		assert_eq!(
			Modifier::decode(Opcode::Send, 2, true),
			Some(Modifier::SharedFunction(Sfid::Sampler))
		);
		assert_eq!(
			Modifier::decode(Opcode::Send, 2, false),
			Some(Modifier::MessageRegister(2))
		);
		assert_eq!(
			Modifier::decode(Opcode::Add, 3, true),
			Some(Modifier::Condition(ConditionalModifier::Greater))
		);
		assert_eq!(Modifier::decode(Opcode::Add, 12, true), None);
		assert_eq!(Modifier::decode(Opcode::Math, 8, true), None);
	}

	#[test]
	fn modifier_validity() {
		let sqrt = Modifier::MathFunction(MathFunction::Sqrt);
		assert!(sqrt.is_valid_for(Opcode::Math, true));
		assert!(!sqrt.is_valid_for(Opcode::Mov, true));
		assert!(!Modifier::SharedFunction(Sfid::Urb).is_valid_for(Opcode::Send, false));
		assert_eq!(Modifier::SharedFunction(Sfid::Urb).encoding(), 6);
	}
}
