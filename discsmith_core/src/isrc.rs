/*!
# Disc Smith: ISRC
*/

use crate::DiscSmithError;
use std::{
	fmt,
	str::FromStr,
};



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # International Standard Recording Code.
///
/// Twelve characters laid out `CCOOOYYSSSSS`: a two-letter country, a
/// three-character owner, a two-digit year, and a five-digit serial. Letters
/// are stored upper-case.
pub struct Isrc([u8; 12]);

impl fmt::Display for Isrc {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<str as fmt::Display>::fmt(self.as_str(), f)
	}
}

impl FromStr for Isrc {
	type Err = DiscSmithError;

	#[inline]
	fn from_str(src: &str) -> Result<Self, Self::Err> { Self::try_from(src.as_bytes()) }
}

impl TryFrom<&[u8]> for Isrc {
	type Error = DiscSmithError;

	fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
		// Dashes are a common presentational flourish.
		let mut out = [0_u8; 12];
		let mut len = 0;
		for b in src.trim_ascii().iter().copied().filter(|&b| b != b'-') {
			if len == 12 { return Err(DiscSmithError::Isrc); }
			out[len] = b.to_ascii_uppercase();
			len += 1;
		}

		if
			len == 12 &&
			out[..5].iter().all(u8::is_ascii_alphanumeric) &&
			out[5..].iter().all(u8::is_ascii_digit)
		{
			Ok(Self(out))
		}
		else { Err(DiscSmithError::Isrc) }
	}
}

impl TryFrom<&str> for Isrc {
	type Error = DiscSmithError;

	#[inline]
	fn try_from(src: &str) -> Result<Self, Self::Error> { Self::try_from(src.as_bytes()) }
}

impl Isrc {
	#[must_use]
	/// # As Str.
	pub fn as_str(&self) -> &str { std::str::from_utf8(self.0.as_slice()).unwrap_or_default() }

	#[must_use]
	/// # From Q Sub-Channel.
	///
	/// Mode 3 Q data packs the first five characters as 6-bit values (offset
	/// from ASCII `0`) into bytes 1 through 4, followed by seven BCD digits.
	pub(crate) fn from_q(q: &[u8; 12]) -> Option<Self> {
		let chars = [
			q[1] >> 2,
			((q[1] & 0b0000_0011) << 4) | (q[2] >> 4),
			((q[2] & 0b0000_1111) << 2) | (q[3] >> 6),
			q[3] & 0b0011_1111,
			q[4] >> 2,
		];

		let mut out = [0_u8; 12];
		for (v, c) in out.iter_mut().zip(chars) {
			let c = b'0'.checked_add(c)?;
			if ! c.is_ascii_digit() && ! c.is_ascii_uppercase() { return None; }
			*v = c;
		}

		for i in 0..7 {
			let byte = q[5 + (i >> 1)];
			let digit = if 0 == i & 1 { byte >> 4 } else { byte & 0x0F };
			if 9 < digit { return None; }
			out[5 + i] = b'0' + digit;
		}

		Some(Self(out))
	}

	#[must_use]
	/// # To Q Sub-Channel Bytes.
	///
	/// Return the eight packed bytes used by [`Isrc::from_q`].
	pub(crate) fn to_q(self) -> [u8; 8] {
		let c = [
			self.0[0] - b'0',
			self.0[1] - b'0',
			self.0[2] - b'0',
			self.0[3] - b'0',
			self.0[4] - b'0',
		];

		let mut out = [0_u8; 8];
		out[0] = (c[0] << 2) | (c[1] >> 4);
		out[1] = ((c[1] & 0b0000_1111) << 4) | (c[2] >> 2);
		out[2] = ((c[2] & 0b0000_0011) << 6) | c[3];
		out[3] = c[4] << 2;
		for (i, v) in self.0[5..].iter().enumerate() {
			let digit = v - b'0';
			if 0 == i & 1 { out[4 + (i >> 1)] |= digit << 4; }
			else { out[4 + (i >> 1)] |= digit; }
		}
		out
	}
}
