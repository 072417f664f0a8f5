//! Shared numeric and classification types.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default window capacity.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A finite number as received from upstream.
///
/// Equality is numeric equality, so `2` and `2.0` are the same value. Integral
/// values serialize as JSON integers so reported windows echo the upstream
/// payload instead of gaining a trailing `.0`; `-0.0` stays a float to keep
/// its sign.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Number(f64);

impl Number {
	/// Wrap `v`, rejecting NaN and infinities.
	pub fn new(v: f64) -> Option<Self> {
		v.is_finite().then_some(Self(v))
	}

	/// The underlying value.
	pub const fn get(self) -> f64 { self.0 }
}

impl From<i32> for Number {
	fn from(v: i32) -> Self { Self(f64::from(v)) }
}

impl From<Number> for f64 {
	fn from(n: Number) -> Self { n.0 }
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl Serialize for Number {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let integral = self.0.fract() == 0.0 && self.0.abs() <= MAX_SAFE_INTEGER;
		if integral && (self.0 != 0.0 || self.0.is_sign_positive()) {
			serializer.serialize_i64(self.0 as i64)
		} else {
			serializer.serialize_f64(self.0)
		}
	}
}

impl<'de> Deserialize<'de> for Number {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let v = f64::deserialize(deserializer)?;
		Number::new(v).ok_or_else(|| serde::de::Error::custom("number must be finite"))
	}
}

/// Upstream source selected by the request's classification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
	/// Prime numbers.
	Prime,
	/// Fibonacci numbers.
	Fibonacci,
	/// Even numbers.
	Even,
	/// Random numbers.
	Random,
}

impl NumberKind {
	/// Every kind, in token order `p`, `f`, `e`, `r`.
	pub const ALL: [NumberKind; 4] = [Self::Prime, Self::Fibonacci, Self::Even, Self::Random];

	/// Single-letter token used in request paths.
	pub const fn token(self) -> char {
		match self {
			Self::Prime => 'p',
			Self::Fibonacci => 'f',
			Self::Even => 'e',
			Self::Random => 'r',
		}
	}

	/// Path segment of the upstream endpoint serving this kind.
	pub const fn upstream_path(self) -> &'static str {
		match self {
			Self::Prime => "primes",
			Self::Fibonacci => "fibo",
			Self::Even => "even",
			Self::Random => "rand",
		}
	}

	/// Human-readable name.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Prime => "prime",
			Self::Fibonacci => "fibonacci",
			Self::Even => "even",
			Self::Random => "random",
		}
	}
}

impl fmt::Display for NumberKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Classification token that names no [`NumberKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid number type '{0}'. Use p(prime), f(fibonacci), e(even), or r(random)")]
pub struct UnknownKind(pub String);

impl FromStr for NumberKind {
	type Err = UnknownKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"p" | "prime" => Ok(Self::Prime),
			"f" | "fibonacci" => Ok(Self::Fibonacci),
			"e" | "even" => Ok(Self::Even),
			"r" | "random" => Ok(Self::Random),
			_ => Err(UnknownKind(s.to_string())),
		}
	}
}
