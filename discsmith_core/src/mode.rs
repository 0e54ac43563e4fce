/*!
# Disc Smith: Modes
*/

use crate::{
	BYTES_PER_SAMPLE,
	CD_SUBPW_SIZE,
	SAMPLES_PER_SECTOR,
};
use std::fmt;



/// # Helper: Mode Keywords.
macro_rules! modes {
	( $( $k:ident $size:literal $vstr:literal ),+ $(,)? ) => (
		#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
		/// # Track (Sector) Mode.
		pub enum TrackMode {
			#[default]
			$(
				#[doc = concat!("# ", $vstr, ".")]
				$k,
			)+
		}

		impl TrackMode {
			/// # All Modes.
			pub const ALL: &'static [Self] = &[ $( Self::$k, )+ ];

			#[must_use]
			/// # Block Size.
			///
			/// Return the number of payload bytes a single sector of this
			/// mode carries, not counting sub-channel data.
			pub const fn block_size(self) -> u16 {
				match self {
					$( Self::$k => $size, )+
				}
			}

			#[must_use]
			/// # As Str.
			///
			/// Return the keyword used in TOC files.
			pub const fn as_str(self) -> &'static str {
				match self {
					$( Self::$k => $vstr, )+
				}
			}

			#[must_use]
			/// # From Keyword.
			pub fn from_keyword(src: &str) -> Option<Self> {
				match src {
					$( $vstr => Some(Self::$k), )+
					_ => None,
				}
			}
		}
	);
}

modes! {
	Audio        2352 "AUDIO",
	Mode0        2336 "MODE0",
	Mode1        2048 "MODE1",
	Mode1Raw     2352 "MODE1_RAW",
	Mode2        2336 "MODE2",
	Mode2Form1   2048 "MODE2_FORM1",
	Mode2Form2   2324 "MODE2_FORM2",
	Mode2FormMix 2336 "MODE2_FORM_MIX",
	Mode2Raw     2352 "MODE2_RAW",
}

impl fmt::Display for TrackMode {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<str as fmt::Display>::fmt(self.as_str(), f)
	}
}

impl TrackMode {
	#[must_use]
	/// # Is Audio?
	pub const fn is_audio(self) -> bool { matches!(self, Self::Audio) }

	#[must_use]
	/// # Is Raw?
	///
	/// Raw modes carry complete sectors, header and parity included.
	pub const fn is_raw(self) -> bool { matches!(self, Self::Mode1Raw | Self::Mode2Raw) }

	#[must_use]
	/// # Header Mode Byte.
	///
	/// The value written to byte 15 of a data sector.
	pub const fn header_byte(self) -> u8 {
		match self {
			Self::Audio | Self::Mode0 => 0,
			Self::Mode1 | Self::Mode1Raw => 1,
			_ => 2,
		}
	}
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Sub-Channel Mode.
///
/// Sub-channel data, when stored with a track, trails each sector's payload.
pub enum SubChannelMode {
	#[default]
	/// # None.
	None,

	/// # Cooked R-W.
	Rw,

	/// # Raw (Interleaved) R-W.
	RwRaw,
}

impl SubChannelMode {
	#[must_use]
	/// # Size.
	///
	/// Return the number of sub-channel bytes following each sector.
	pub const fn size(self) -> u16 {
		match self {
			Self::None => 0,
			Self::Rw | Self::RwRaw => CD_SUBPW_SIZE,
		}
	}

	#[must_use]
	/// # As Str.
	///
	/// Return the TOC keyword. This is empty for [`SubChannelMode::None`].
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::None => "",
			Self::Rw => "RW",
			Self::RwRaw => "RW_RAW",
		}
	}

	#[must_use]
	/// # From Keyword.
	pub fn from_keyword(src: &str) -> Option<Self> {
		match src {
			"RW" => Some(Self::Rw),
			"RW_RAW" => Some(Self::RwRaw),
			_ => None,
		}
	}

	#[must_use]
	/// # Is None?
	pub const fn is_none(self) -> bool { matches!(self, Self::None) }
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Cut Mode.
///
/// The unit a track's chunk lengths and edit positions are measured in.
/// Plain audio is cut by the sample; everything else by the byte.
pub enum CutMode {
	/// # Samples.
	Samples,

	/// # Bytes.
	Bytes,
}

impl CutMode {
	#[must_use]
	/// # Alignment.
	///
	/// Return the size, in this unit, every same-mode run must be a multiple
	/// of. Audio cut by the sample never needs padding.
	pub const fn alignment(self, mode: TrackMode, sub: SubChannelMode) -> u64 {
		match self {
			Self::Samples => 1,
			Self::Bytes => mode.block_size() as u64 + sub.size() as u64,
		}
	}

	#[must_use]
	/// # Units Per Sector.
	pub const fn per_sector(self, mode: TrackMode, sub: SubChannelMode) -> u64 {
		match self {
			Self::Samples => SAMPLES_PER_SECTOR as u64,
			Self::Bytes => mode.block_size() as u64 + sub.size() as u64,
		}
	}

	#[must_use]
	/// # Bytes Per Unit.
	pub const fn unit_bytes(self) -> u64 {
		match self {
			Self::Samples => BYTES_PER_SAMPLE as u64,
			Self::Bytes => 1,
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_block_sizes() {
		for (mode, size) in [
			(TrackMode::Audio, 2352),
			(TrackMode::Mode0, 2336),
			(TrackMode::Mode1, 2048),
			(TrackMode::Mode1Raw, 2352),
			(TrackMode::Mode2, 2336),
			(TrackMode::Mode2Form1, 2048),
			(TrackMode::Mode2Form2, 2324),
			(TrackMode::Mode2FormMix, 2336),
			(TrackMode::Mode2Raw, 2352),
		] {
			assert_eq!(mode.block_size(), size, "Wrong block size for {mode}.");
		}

		assert_eq!(SubChannelMode::None.size(), 0);
		assert_eq!(SubChannelMode::Rw.size(), 96);
		assert_eq!(SubChannelMode::RwRaw.size(), 96);
	}

	#[test]
	fn t_keywords() {
		for &mode in TrackMode::ALL {
			assert_eq!(TrackMode::from_keyword(mode.as_str()), Some(mode));
		}
		assert_eq!(TrackMode::from_keyword("MODE3"), None);

		for sub in [SubChannelMode::Rw, SubChannelMode::RwRaw] {
			assert_eq!(SubChannelMode::from_keyword(sub.as_str()), Some(sub));
		}
		assert_eq!(SubChannelMode::from_keyword(""), None);
	}

	#[test]
	fn t_cut_mode() {
		let cut = CutMode::Samples;
		assert_eq!(cut.alignment(TrackMode::Audio, SubChannelMode::None), 1);
		assert_eq!(cut.per_sector(TrackMode::Audio, SubChannelMode::None), 588);
		assert_eq!(cut.unit_bytes(), 4);

		let cut = CutMode::Bytes;
		assert_eq!(cut.alignment(TrackMode::Mode2Form1, SubChannelMode::None), 2048);
		assert_eq!(cut.alignment(TrackMode::Mode1, SubChannelMode::Rw), 2144);
		assert_eq!(cut.per_sector(TrackMode::Audio, SubChannelMode::None), 2352);
		assert_eq!(cut.unit_bytes(), 1);
	}
}
