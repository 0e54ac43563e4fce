/*!
# Disc Smith: Catalog Numbers
*/

use crate::DiscSmithError;
use std::{
	fmt,
	str::FromStr,
};
use trimothy::TrimSliceMatches;



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Media Catalog Number.
///
/// This is a simple wrapper for the thirteen-digit UPC/EAN stored in a disc's
/// table of contents and Q sub-channel.
pub struct Catalog([u8; 13]);

impl fmt::Display for Catalog {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<str as fmt::Display>::fmt(self.as_str(), f)
	}
}

impl FromStr for Catalog {
	type Err = DiscSmithError;

	#[inline]
	fn from_str(src: &str) -> Result<Self, Self::Err> { Self::try_from(src.as_bytes()) }
}

impl TryFrom<&[u8]> for Catalog {
	type Error = DiscSmithError;

	fn try_from(mut src: &[u8]) -> Result<Self, Self::Error> {
		// Remove whitespace and trailing nulls.
		src = src.trim_start_matches(|b| b.is_ascii_whitespace());
		src = src.trim_end_matches(|b| b.is_ascii_whitespace() || b == 0);

		// Make sure we've got 1-13 ASCII digits and nothing else.
		if ! (1..=13).contains(&src.len()) || ! src.iter().all(u8::is_ascii_digit) {
			return Err(DiscSmithError::Catalog);
		}

		// Zero-pad the left as needed so that it occupies thirteen bytes.
		let mut out = [b'0'; 13];
		out[13 - src.len()..].copy_from_slice(src);
		Ok(Self(out))
	}
}

impl TryFrom<&str> for Catalog {
	type Error = DiscSmithError;

	#[inline]
	fn try_from(src: &str) -> Result<Self, Self::Error> { Self::try_from(src.as_bytes()) }
}

impl Catalog {
	#[must_use]
	/// # As Str.
	pub fn as_str(&self) -> &str { std::str::from_utf8(self.0.as_slice()).unwrap_or_default() }

	#[must_use]
	/// # Is Valid EAN-13?
	///
	/// Discs are free to store any thirteen digits, but a real barcode will
	/// carry a valid check digit.
	pub fn is_ean13(&self) -> bool { is_ean13(&self.0) }

	#[must_use]
	/// # From Q Sub-Channel.
	///
	/// Mode 2 Q data packs the digits as BCD nibbles in bytes 1 through 7;
	/// the final nibble is unused.
	pub(crate) fn from_q(q: &[u8; 12]) -> Option<Self> {
		let mut out = [0_u8; 13];
		for (i, v) in out.iter_mut().enumerate() {
			let byte = q[1 + (i >> 1)];
			let digit = if 0 == i & 1 { byte >> 4 } else { byte & 0x0F };
			if 9 < digit { return None; }
			*v = b'0' + digit;
		}
		Some(Self(out))
	}

	#[must_use]
	/// # To Q Sub-Channel Digits.
	///
	/// Return the seven BCD-packed bytes used by [`Catalog::from_q`].
	pub(crate) fn to_q(self) -> [u8; 7] {
		let mut out = [0_u8; 7];
		for (i, v) in self.0.iter().enumerate() {
			let digit = v - b'0';
			if 0 == i & 1 { out[i >> 1] |= digit << 4; }
			else { out[i >> 1] |= digit; }
		}
		out
	}
}



/// # Is EAN13?
fn is_ean13(src: &[u8; 13]) -> bool {
	let mut chk = 0;
	let mut total = 0;
	let mut k = 13;
	for num in src.iter().copied().rev() {
		k -= 1;

		// Convert ASCII to decimal. (TryFrom verifies all values are digits.)
		let num = num ^ b'0';

		// The last entry (the first we're checking) is the check digit.
		if k == 12 { chk = num; }
		// Everything else goes into the total.
		else { total += ((k % 2) * 2 + 1) * u32::from(num); }
	}

	(10 - (total % 10)) % 10 == u32::from(chk)
}
