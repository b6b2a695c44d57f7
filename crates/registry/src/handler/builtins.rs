//! Handlers for primitive types.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::ParameterHandler;
use super::multiplier::split_multiplier;
use crate::error::HandlerError;

fn parse_scaled_int<T: TryFrom<i128>>(text: &str, type_name: &'static str) -> Result<T, HandlerError> {
	let trimmed = text.trim();
	let (literal, factor) =
		split_multiplier(trimmed).ok_or_else(|| HandlerError::parse(text, type_name, "multiplier suffix overflows"))?;
	if literal.is_empty() {
		return Err(HandlerError::parse(text, type_name, "no number before the multiplier suffix"));
	}
	let base: i128 = literal
		.parse()
		.map_err(|err: std::num::ParseIntError| HandlerError::parse(text, type_name, err.to_string()))?;
	let value = base
		.checked_mul(factor)
		.ok_or_else(|| HandlerError::parse(text, type_name, "value overflows"))?;
	T::try_from(value).map_err(|_| HandlerError::parse(text, type_name, format!("{value} is out of range")))
}

fn parse_scaled_float(text: &str, type_name: &'static str) -> Result<f64, HandlerError> {
	let trimmed = text.trim();
	let (literal, factor) =
		split_multiplier(trimmed).ok_or_else(|| HandlerError::parse(text, type_name, "multiplier suffix overflows"))?;
	if literal.is_empty() {
		return Err(HandlerError::parse(text, type_name, "no number before the multiplier suffix"));
	}
	let base: f64 = literal
		.parse()
		.map_err(|err: std::num::ParseFloatError| HandlerError::parse(text, type_name, err.to_string()))?;
	let value = base * factor as f64;
	if !value.is_finite() {
		return Err(HandlerError::parse(text, type_name, "value is not finite"));
	}
	Ok(value)
}

macro_rules! int_handlers {
	($($handler:ident => $ty:ty),* $(,)?) => {$(
		#[doc = concat!("Handler for `", stringify!($ty), "` accepting multiplier suffixes.")]
		#[derive(Debug, Default, Clone, Copy)]
		pub struct $handler;

		impl ParameterHandler for $handler {
			type Value = $ty;

			fn parse(&self, text: &str) -> Result<$ty, HandlerError> {
				parse_scaled_int(text, stringify!($ty))
			}

			fn format(&self, value: &$ty) -> String {
				value.to_string()
			}

			fn random_default(&self) -> String {
				// `isize` and `usize` have no uniform sampler; every int type holds 0..=100.
				let value = rand::rng().random_range(0_u8..=100) as $ty;
				value.to_string()
			}

			fn type_name(&self) -> &'static str {
				stringify!($ty)
			}
		}
	)*};
}

int_handlers! {
	I8Handler => i8,
	I16Handler => i16,
	I32Handler => i32,
	I64Handler => i64,
	IsizeHandler => isize,
	U8Handler => u8,
	U16Handler => u16,
	U32Handler => u32,
	U64Handler => u64,
	UsizeHandler => usize,
}

/// Handler for `f64` accepting multiplier suffixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct F64Handler;

impl ParameterHandler for F64Handler {
	type Value = f64;

	fn parse(&self, text: &str) -> Result<f64, HandlerError> {
		parse_scaled_float(text, "f64")
	}

	fn format(&self, value: &f64) -> String {
		value.to_string()
	}

	fn random_default(&self) -> String {
		format!("{:.2}", rand::rng().random_range(0.0..100.0_f64))
	}

	fn type_name(&self) -> &'static str {
		"f64"
	}
}

/// Handler for `f32` accepting multiplier suffixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct F32Handler;

impl ParameterHandler for F32Handler {
	type Value = f32;

	fn parse(&self, text: &str) -> Result<f32, HandlerError> {
		let value = parse_scaled_float(text, "f32")? as f32;
		if !value.is_finite() {
			return Err(HandlerError::parse(text, "f32", "value is out of range"));
		}
		Ok(value)
	}

	fn format(&self, value: &f32) -> String {
		value.to_string()
	}

	fn random_default(&self) -> String {
		format!("{:.2}", rand::rng().random_range(0.0..100.0_f32))
	}

	fn type_name(&self) -> &'static str {
		"f32"
	}
}

const STRING_EXAMPLES: &[&str] = &["text", "something", "hello!", "option"];

/// Identity handler for `String`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringHandler;

impl ParameterHandler for StringHandler {
	type Value = String;

	fn parse(&self, text: &str) -> Result<String, HandlerError> {
		Ok(text.to_string())
	}

	fn format(&self, value: &String) -> String {
		value.clone()
	}

	fn random_default(&self) -> String {
		STRING_EXAMPLES.choose(&mut rand::rng()).copied().unwrap_or("text").to_string()
	}

	fn type_name(&self) -> &'static str {
		"String"
	}
}

/// Handler for `bool` accepting true/false, yes/no, on/off and 1/0.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolHandler;

impl ParameterHandler for BoolHandler {
	type Value = bool;

	fn parse(&self, text: &str) -> Result<bool, HandlerError> {
		match text.trim().to_lowercase().as_str() {
			"true" | "yes" | "on" | "1" => Ok(true),
			"false" | "no" | "off" | "0" => Ok(false),
			_ => Err(HandlerError::parse(text, "bool", "expected true/false, yes/no, on/off or 1/0")),
		}
	}

	fn format(&self, value: &bool) -> String {
		value.to_string()
	}

	fn possibilities(&self) -> Vec<bool> {
		vec![true, false]
	}

	fn random_default(&self) -> String {
		rand::rng().random_bool(0.5).to_string()
	}

	fn type_name(&self) -> &'static str {
		"bool"
	}
}

/// Handler for single characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharHandler;

impl ParameterHandler for CharHandler {
	type Value = char;

	fn parse(&self, text: &str) -> Result<char, HandlerError> {
		let mut chars = text.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => Ok(c),
			_ => Err(HandlerError::parse(text, "char", "expected exactly one character")),
		}
	}

	fn format(&self, value: &char) -> String {
		value.to_string()
	}

	fn random_default(&self) -> String {
		rand::rng().random_range('a'..='z').to_string()
	}

	fn type_name(&self) -> &'static str {
		"char"
	}
}
