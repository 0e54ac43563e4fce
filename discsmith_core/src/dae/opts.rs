/*!
# Disc Smith: Extraction Options
*/

use crate::dae::scsi::DriveFeatures;



/// # FLAG: Request C2 Error Pointers.
const FLAG_C2: u8 =         0b0000_0001;

/// # FLAG: Cross-Check the Q Sub-Channel.
const FLAG_SUBCHANNEL: u8 = 0b0000_0010;

/// # FLAG: Byte-Swap Output Samples.
const FLAG_SWAP: u8 =       0b0000_0100;

/// # FLAG: Verbose Logging.
const FLAG_VERBOSE: u8 =    0b0000_1000;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_C2 | FLAG_SUBCHANNEL;

/// # Minimum Read Speed.
pub const SPEED_MIN: u16 = 1;

/// # Maximum Read Speed.
pub const SPEED_MAX: u16 = 72;

/// # Default Read Speed.
const SPEED_DEFAULT: u16 = 8;

/// # Maximum Burst Size.
///
/// One second of audio.
const BURST_MAX: u8 = 75;

/// # Default Burst Size.
const BURST_DEFAULT: u8 = 25;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Extraction Options.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use discsmith_core::DaeOptions;
///
/// let opts = DaeOptions::default()
///     .with_speed(16)
///     .with_track(3) // Order doesn't matter.
///     .with_track(2);
///
/// assert_eq!(opts.speed(), 16);
/// assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[2, 3]);
/// ```
pub struct DaeOptions {
	features: DriveFeatures,
	speed: u16,
	burst: u8,
	flags: u8,
	tracks: u128,
}

impl Default for DaeOptions {
	fn default() -> Self {
		Self {
			features: DriveFeatures::GENERIC,
			speed: SPEED_DEFAULT,
			burst: BURST_DEFAULT,
			flags: FLAG_DEFAULT,
			tracks: 0,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl DaeOptions {
	#[must_use]
	/// # Burst Size.
	///
	/// The number of sectors requested per read while things are going well.
	/// Repairs always re-read a single sector.
	///
	/// Values are capped to `1..=75`, with a default of `25`.
	pub const fn with_burst(self, mut burst: u8) -> Self {
		if burst == 0 { burst = 1; }
		else if BURST_MAX < burst { burst = BURST_MAX; }
		Self {
			burst,
			..self
		}
	}

	with_flag!(
		with_c2,
		FLAG_C2,
		"# Request C2 Error Pointers.",
		"",
		"When `false`, or when the drive doesn't support them, every read is",
		"taken at face value and nothing is ever repaired.",
		"",
		"The default is `true`.",
	);

	#[must_use]
	/// # Drive Features.
	///
	/// Set the command set used to talk to the drive.
	///
	/// The default is [`DriveFeatures::GENERIC`].
	pub const fn with_features(self, features: DriveFeatures) -> Self {
		Self {
			features,
			..self
		}
	}

	#[must_use]
	/// # Maximum Read Speed.
	///
	/// Extraction starts at this speed, drops by half each time a sector
	/// comes back damaged, and climbs back up after a long enough clean
	/// stretch.
	///
	/// Values are capped to `1..=72`, with a default of `8`.
	pub const fn with_speed(self, mut speed: u16) -> Self {
		if speed < SPEED_MIN { speed = SPEED_MIN; }
		else if SPEED_MAX < speed { speed = SPEED_MAX; }
		Self {
			speed,
			..self
		}
	}

	with_flag!(
		with_subchannel,
		FLAG_SUBCHANNEL,
		"# Cross-Check the Q Sub-Channel.",
		"",
		"When `true`, and the drive returns sub-channel data, the track and",
		"index reported for each sector are compared against the table of",
		"contents. Mismatches are logged; they never stop the extraction.",
		"",
		"The default is `true`.",
	);

	with_flag!(
		with_swap,
		FLAG_SWAP,
		"# Swap Sample Bytes.",
		"",
		"When `true`, the output is written big-endian.",
		"",
		"The default is `false`.",
	);

	#[must_use]
	/// # Include Track.
	///
	/// Add a given track number to the extraction list. If no tracks are
	/// added, every audio track is extracted.
	pub const fn with_track(self, track: u8) -> Self {
		let tracks = self.tracks | track_idx_to_bits(track);
		Self {
			tracks,
			..self
		}
	}

	with_flag!(
		with_verbose,
		FLAG_VERBOSE,
		"# Verbose Logging.",
		"",
		"When `true`, the extraction log is printed to STDOUT once the job",
		"wraps up.",
		"",
		"The default is `false`.",
	);
}



macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl DaeOptions {
	get_flag!(subchannel, FLAG_SUBCHANNEL, "Cross-Check the Q Sub-Channel");
	get_flag!(swap, FLAG_SWAP, "Swap Sample Bytes");
	get_flag!(verbose, FLAG_VERBOSE, "Verbose Logging");

	#[must_use]
	/// # Burst Size.
	pub const fn burst(&self) -> u8 { self.burst }

	#[must_use]
	/// # Request C2?
	///
	/// This is only `true` if C2 was requested _and_ the drive supports it.
	pub const fn c2(&self) -> bool {
		FLAG_C2 == self.flags & FLAG_C2 && self.features.c2()
	}

	#[must_use]
	/// # Drive Features.
	///
	/// The C2 and sub-channel settings are folded in, so the returned value
	/// describes exactly what should be requested from the drive.
	pub const fn features(&self) -> DriveFeatures {
		let mut out = self.features;
		if ! self.c2() { out = out.without_c2(); }
		if ! self.subchannel() { out = out.without_sub(); }
		out
	}

	#[must_use]
	/// # Has Any Tracks?
	pub const fn has_tracks(&self) -> bool { self.tracks != 0 }

	#[must_use]
	/// # Maximum Read Speed.
	pub const fn speed(&self) -> u16 { self.speed }

	#[must_use]
	/// # Tracks.
	///
	/// Return an iterator over the included track numbers.
	pub const fn tracks(&self) -> DaeOptionsTracks {
		DaeOptionsTracks {
			set: self.tracks,
			pos: 1,
		}
	}
}



#[derive(Debug, Clone)]
/// # Option Tracks.
///
/// This iterator converts the `u128` flag back into individual `u8` track
/// numbers.
pub struct DaeOptionsTracks {
	set: u128,
	pos: u8,
}

impl Iterator for DaeOptionsTracks {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		while self.pos < 100 {
			let idx = self.pos;
			self.pos += 1;
			if 0 != self.set & track_idx_to_bits(idx) {
				return Some(idx);
			}
		}
		None
	}

	/// # Size Hint.
	///
	/// There will never be more than 99 tracks.
	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, Some(100_usize.saturating_sub(usize::from(self.pos))))
	}
}



/// # Track Number to Bitflag.
///
/// Out of range values, zero included, are silently ignored.
const fn track_idx_to_bits(idx: u8) -> u128 {
	if idx == 0 || 99 < idx { 0 }
	else { 2_u128.pow(idx as u32) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_dae_flags() {
		// Make sure our flags are unique.
		let mut all = vec![FLAG_C2, FLAG_SUBCHANNEL, FLAG_SWAP, FLAG_VERBOSE];
		all.sort_unstable();
		all.dedup();
		assert_eq!(all.len(), 4, "Flags must be unique.");
	}

	#[test]
	fn t_dae_options_flags() {
		macro_rules! t_flags {
			($name:literal, $set:ident, $get:ident) => (
				let mut opts = DaeOptions::default();
				for v in [false, true, false, true] {
					opts = opts.$set(v);
					assert_eq!(
						opts.$get(),
						v,
						concat!("Setting ", $name, " to {} failed."),
						v
					);
				}
			);
		}

		t_flags!("c2", with_c2, c2);
		t_flags!("subchannel", with_subchannel, subchannel);
		t_flags!("swap", with_swap, swap);
		t_flags!("verbose", with_verbose, verbose);
	}

	#[test]
	fn t_dae_options_c2() {
		// Toshiba drives can't do C2 no matter what we want.
		let opts = DaeOptions::default().with_features(DriveFeatures::TOSHIBA);
		assert!(! opts.c2(), "C2 should be unavailable.");

		let opts = DaeOptions::default();
		assert!(opts.c2());
		assert!(opts.features().c2());
		let opts = opts.with_c2(false);
		assert!(! opts.features().c2(), "C2 should be folded into the features.");

		let opts = DaeOptions::default().with_subchannel(false);
		assert_eq!(opts.features().sub_read().size(), 0);
	}

	#[test]
	fn t_dae_options_numbers() {
		for v in [1, 8, 72] {
			assert_eq!(DaeOptions::default().with_speed(v).speed(), v);
		}
		assert_eq!(DaeOptions::default().with_speed(0).speed(), SPEED_MIN);
		assert_eq!(DaeOptions::default().with_speed(1000).speed(), SPEED_MAX);

		assert_eq!(DaeOptions::default().burst(), BURST_DEFAULT);
		assert_eq!(DaeOptions::default().with_burst(0).burst(), 1);
		assert_eq!(DaeOptions::default().with_burst(200).burst(), BURST_MAX);
	}

	#[test]
	fn t_dae_options_tracks() {
		let mut opts = DaeOptions::default();
		assert!(! opts.has_tracks(), "The track list should be empty!");

		// Zero and 100 aren't tracks.
		opts = opts.with_track(0).with_track(100);
		assert!(! opts.has_tracks(), "The track list should still be empty!");

		for idx in 0..=u8::MAX { opts = opts.with_track(idx); }
		let tracks = opts.tracks().collect::<Vec<u8>>();
		assert_eq!(tracks.len(), 99, "Expected 99 tracks.");
		for (real, expected) in tracks.into_iter().zip(1..=99_u8) {
			assert_eq!(real, expected, "Options track mismatch: {real} instead of {expected}.");
		}
	}
}
