//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

/// The low `width` bits of `value`.
pub(crate) fn low_bits(value: u32, width: u32) -> u32 {
	value & u32::MAX.checked_shr(32 - width).unwrap_or(0)
}

/// Reads the low `width` bits of `value` as a two's complement number.
pub(crate) fn sign_extend(value: u32, width: u32) -> i32 {
	let shift = 32 - width;
	((value << shift) as i32) >> shift
}

/// Expands an 8-bit restricted float (sign, 3-bit exponent biased by 3,
/// 4-bit mantissa) as used by packed vector-float immediates.
pub fn vf_to_float(vf: u8) -> f32 {
	if (vf & 0x7f) == 0 {
		return if (vf & 0x80) != 0 { -0.0 } else { 0.0 };
	}

	let sign = ((vf as u32) & 0x80) << 24;
	let exponent = (((vf as u32) >> 4) & 0x7) + 124;
	let mantissa = ((vf as u32) & 0xf) << 19;
	f32::from_bits(sign | (exponent << 23) | mantissa)
}

/// The restricted-float encoding of `value`, if it has one.
pub fn float_to_vf(value: f32) -> Option<u8> {
	let bits = value.to_bits();
	let sign = ((bits >> 31) as u8) << 7;

	if (bits & 0x7fff_ffff) == 0 {
		return Some(sign);
	}

	let exponent = ((bits >> 23) & 0xff) as i32 - 127;
	let mantissa = bits & 0x7f_ffff;

	if !(-3..=4).contains(&exponent) || (mantissa & 0x7_ffff) != 0 {
		return None;
	}

	Some(sign | (((exponent + 3) as u8) << 4) | ((mantissa >> 19) as u8))
}

fn trim_fraction(digits: &str) -> &str {
	if digits.contains('.') {
		digits.trim_end_matches('0').trim_end_matches('.')
	} else {
		digits
	}
}

/// Formats `value` the way C's `%g` does: six significant digits, fixed or
/// scientific notation depending on the exponent, trailing zeros removed.
pub(crate) fn format_g(value: f64) -> String {
	const PRECISION: i32 = 6;

	if value.is_nan() {
		return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
	}
	if value.is_infinite() {
		return if value < 0.0 { "-inf" } else { "inf" }.to_string();
	}
	if value == 0.0 {
		return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
	}

	// rounding to the target precision may carry into the exponent, so take
	// the exponent from the rounded scientific form
	let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
	let (mantissa, exponent) = match scientific.split_once('e') {
		Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
		None => (scientific.as_str(), 0),
	};

	if exponent < -4 || exponent >= PRECISION {
		format!(
			"{}e{}{:02}",
			trim_fraction(mantissa),
			if exponent < 0 { '-' } else { '+' },
			exponent.abs()
		)
	} else {
		let fixed = format!("{:.*}", (PRECISION - 1 - exponent) as usize, value);
		trim_fraction(&fixed).to_string()
	}
}
