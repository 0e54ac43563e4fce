/*!
# Disc Smith: MSF
*/

use crate::{
	CD_LEADIN,
	DiscSmithError,
	FRAMES_PER_SECOND,
	SAMPLES_PER_SECTOR,
};
use std::{
	fmt,
	ops::Add,
	str::FromStr,
};



/// # Largest Expressible Value.
///
/// `99:59:74`.
const MAX_FRAMES: u32 = 99 * 60 * 75 + 59 * 75 + 74;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Minute:Second:Frame.
///
/// CD addresses and durations are counted in frames (sectors), seventy-five
/// to the second, and traditionally written `mm:ss:ff`. The value is stored
/// as a plain frame count, so LBA conversions are free and sample counts are
/// a multiplication away.
///
/// ```
/// use discsmith_core::Msf;
///
/// let msf = Msf::from_msf(1, 2, 3).unwrap();
/// assert_eq!(msf.lba(), 60 * 75 + 2 * 75 + 3);
/// assert_eq!(msf.to_string(), "01:02:03");
/// assert_eq!(msf.samples(), u64::from(msf.lba()) * 588);
/// ```
pub struct Msf(u32);

impl Add for Msf {
	type Output = Self;

	#[inline]
	fn add(self, rhs: Self) -> Self { Self(self.0.saturating_add(rhs.0)) }
}

impl fmt::Display for Msf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}:{:02}:{:02}", self.minutes(), self.sec(), self.frame())
	}
}

impl From<u32> for Msf {
	#[inline]
	fn from(lba: u32) -> Self { Self(lba) }
}

impl FromStr for Msf {
	type Err = DiscSmithError;

	fn from_str(src: &str) -> Result<Self, Self::Err> {
		let mut parts = src.trim().split(':');
		let (Some(m), Some(s), Some(f), None) = (parts.next(), parts.next(), parts.next(), parts.next())
		else { return Err(DiscSmithError::Msf); };

		let m = m.parse::<u8>().map_err(|_| DiscSmithError::Msf)?;
		let s = s.parse::<u8>().map_err(|_| DiscSmithError::Msf)?;
		let f = f.parse::<u8>().map_err(|_| DiscSmithError::Msf)?;
		Self::from_msf(m, s, f)
	}
}

impl Msf {
	/// # Zero.
	pub const ZERO: Self = Self(0);

	#[must_use]
	/// # From LBA.
	pub const fn from_lba(lba: u32) -> Self { Self(lba) }

	/// # From Minutes, Seconds, Frames.
	///
	/// ## Errors
	///
	/// Seconds must be under 60, frames under 75, and minutes at most 99.
	pub const fn from_msf(m: u8, s: u8, f: u8) -> Result<Self, DiscSmithError> {
		if 99 < m || 59 < s || FRAMES_PER_SECOND <= f { Err(DiscSmithError::Msf) }
		else {
			Ok(Self(m as u32 * 60 * FRAMES_PER_SECOND as u32 + s as u32 * FRAMES_PER_SECOND as u32 + f as u32))
		}
	}

	#[must_use]
	/// # From Samples (Rounding Down).
	pub const fn from_samples(samples: u64) -> Self {
		let frames = samples / SAMPLES_PER_SECTOR as u64;
		if frames > u32::MAX as u64 { Self(u32::MAX) }
		else { Self(frames as u32) }
	}

	#[must_use]
	/// # From Samples (Rounding Up).
	///
	/// A partial sector counts as a whole one.
	pub const fn from_samples_ceil(samples: u64) -> Self {
		let frames = samples.div_ceil(SAMPLES_PER_SECTOR as u64);
		if frames > u32::MAX as u64 { Self(u32::MAX) }
		else { Self(frames as u32) }
	}

	#[must_use]
	/// # Physical BCD Address.
	///
	/// Return the `[m, s, f]` BCD triplet used in sector headers and the Q
	/// sub-channel, which count from the start of the lead-in.
	pub const fn bcd(self) -> [u8; 3] {
		let phys = self.0 + CD_LEADIN as u32;
		let (m, s, f) = split(phys);
		[to_bcd(m), to_bcd(s), to_bcd(f)]
	}

	#[must_use]
	/// # From Physical BCD Address.
	///
	/// This is the dual of [`Msf::bcd`]. `None` is returned if any of the
	/// values are not valid BCD or the address falls within the lead-in.
	pub const fn from_bcd(src: [u8; 3]) -> Option<Self> {
		let (Some(m), Some(s), Some(f)) = (from_bcd(src[0]), from_bcd(src[1]), from_bcd(src[2]))
		else { return None; };
		if 59 < s || FRAMES_PER_SECOND <= f { return None; }

		let phys = m as u32 * 60 * FRAMES_PER_SECOND as u32 + s as u32 * FRAMES_PER_SECOND as u32 + f as u32;
		if phys < CD_LEADIN as u32 { None }
		else { Some(Self(phys - CD_LEADIN as u32)) }
	}
}

impl Msf {
	#[must_use]
	/// # LBA.
	pub const fn lba(self) -> u32 { self.0 }

	#[must_use]
	/// # Samples.
	pub const fn samples(self) -> u64 { self.0 as u64 * SAMPLES_PER_SECTOR as u64 }

	#[must_use]
	/// # Minutes.
	pub const fn minutes(self) -> u32 { self.0 / (60 * FRAMES_PER_SECOND as u32) }

	#[must_use]
	/// # Seconds.
	pub const fn sec(self) -> u8 {
		(self.0 / FRAMES_PER_SECOND as u32 % 60) as u8
	}

	#[must_use]
	/// # Frames.
	pub const fn frame(self) -> u8 { (self.0 % FRAMES_PER_SECOND as u32) as u8 }

	#[must_use]
	/// # Is Zero?
	pub const fn is_zero(self) -> bool { self.0 == 0 }

	#[must_use]
	/// # Expressible?
	///
	/// Returns `true` if the value fits within `99:59:74`.
	pub const fn is_valid(self) -> bool { self.0 <= MAX_FRAMES }

	#[must_use]
	/// # Checked Subtraction.
	pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
		if let Some(v) = self.0.checked_sub(rhs.0) { Some(Self(v)) }
		else { None }
	}

	#[must_use]
	/// # Saturating Subtraction.
	pub const fn saturating_sub(self, rhs: Self) -> Self { Self(self.0.saturating_sub(rhs.0)) }
}



/// # Split Frames.
const fn split(frames: u32) -> (u8, u8, u8) {
	let f = (frames % FRAMES_PER_SECOND as u32) as u8;
	let secs = frames / FRAMES_PER_SECOND as u32;
	let s = (secs % 60) as u8;
	let m = secs / 60;
	let m = if m > 99 { 99 } else { m as u8 };
	(m, s, f)
}

/// # Decimal to BCD.
pub(crate) const fn to_bcd(v: u8) -> u8 { ((v / 10 % 10) << 4) | (v % 10) }

/// # BCD to Decimal.
pub(crate) const fn from_bcd(v: u8) -> Option<u8> {
	let hi = v >> 4;
	let lo = v & 0x0F;
	if hi < 10 && lo < 10 { Some(hi * 10 + lo) }
	else { None }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_msf() {
		let msf = Msf::from_msf(3, 20, 5).expect("MSF failed.");
		assert_eq!(msf.lba(), 3 * 4500 + 20 * 75 + 5);
		assert_eq!(msf.minutes(), 3);
		assert_eq!(msf.sec(), 20);
		assert_eq!(msf.frame(), 5);
		assert_eq!(msf.to_string(), "03:20:05");
		assert_eq!(Msf::from_lba(msf.lba()), msf);

		// Bad values.
		assert!(Msf::from_msf(0, 60, 0).is_err(), "Seconds should max at 59.");
		assert!(Msf::from_msf(0, 0, 75).is_err(), "Frames should max at 74.");
		assert!(Msf::from_msf(100, 0, 0).is_err(), "Minutes should max at 99.");
	}

	#[test]
	fn t_msf_str() {
		for (raw, expected) in [
			("00:00:00", Some(0)),
			("00:02:00", Some(150)),
			("1:0:1", Some(4501)),
			("79:59:74", Some(79 * 4500 + 59 * 75 + 74)),
			("00:60:00", None),
			("00:00", None),
			("00:00:00:00", None),
			("a:b:c", None),
		] {
			let msf = raw.parse::<Msf>().ok().map(Msf::lba);
			assert_eq!(msf, expected, "Parsing {raw} failed.");
		}
	}

	#[test]
	fn t_msf_samples() {
		assert_eq!(Msf::from_samples(0), Msf::ZERO);
		assert_eq!(Msf::from_samples(587).lba(), 0);
		assert_eq!(Msf::from_samples(588).lba(), 1);
		assert_eq!(Msf::from_samples_ceil(587).lba(), 1);
		assert_eq!(Msf::from_samples_ceil(588).lba(), 1);
		assert_eq!(Msf::from_samples_ceil(589).lba(), 2);
		assert_eq!(Msf::from_lba(75).samples(), 44_100);
	}

	#[test]
	fn t_msf_bcd() {
		// LBA zero is 00:02:00 on the wire.
		assert_eq!(Msf::ZERO.bcd(), [0x00, 0x02, 0x00]);
		assert_eq!(Msf::from_lba(16).bcd(), [0x00, 0x02, 0x16]);
		assert_eq!(Msf::from_lba(4500 * 12 + 75 * 34 + 56 - 150).bcd(), [0x12, 0x34, 0x56]);

		for lba in [0, 1, 74, 75, 1234, 250_000] {
			let msf = Msf::from_lba(lba);
			assert_eq!(Msf::from_bcd(msf.bcd()), Some(msf), "BCD round trip failed for {lba}.");
		}

		// Lead-in and junk.
		assert_eq!(Msf::from_bcd([0, 1, 0]), None);
		assert_eq!(Msf::from_bcd([0, 0x0A, 0]), None);
		assert_eq!(Msf::from_bcd([0, 0x60, 0]), None);

		assert_eq!(to_bcd(42), 0x42);
		assert_eq!(from_bcd(0x42), Some(42));
		assert_eq!(from_bcd(0x4A), None);
	}
}
