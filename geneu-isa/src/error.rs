//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::num::ParseIntError;

use thiserror::Error;

use crate::program::Rule;

#[derive(Error, Debug)]
pub enum ProgramError {
	#[error("Invalid program text")]
	Syntax(#[from] Box<pest::error::Error<Rule>>),

	#[error("Invalid hex literal \"{literal}\"")]
	InvalidLiteral {
		literal: String,
		#[source]
		source: ParseIntError,
	},
}

/// A region that breaks the register region restrictions for an execution
/// size.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
	#[error("Region width {width} is wider than the execution size {exec_size}")]
	WidthExceedsExecSize { width: u32, exec_size: u32 },

	#[error("Vertical stride {vstride} must be width {width} times horizontal stride {hstride}")]
	VerticalStrideMismatch { vstride: u32, width: u32, hstride: u32 },

	#[error("Horizontal stride must be 0 for width 1")]
	ScalarWithStride,

	#[error("Strides must be 0 for a scalar access")]
	ScalarExecutionWithStride,

	#[error("Width must be 1 when both strides are 0")]
	BroadcastWithWidth,
}

/// A field holding a value the operand model can't represent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
	#[error("Invalid {field} value {value}")]
	InvalidField { field: &'static str, value: u32 },
}
