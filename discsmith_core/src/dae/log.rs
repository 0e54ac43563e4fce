/*!
# Disc Smith: DAE Log
*/

use crate::{
	DiscSmithError,
	Isrc,
};
use dactyl::NiceElapsed;
use std::{
	fmt,
	io::Write,
	time::Instant,
};
use utc2k::FmtUtc2k;



#[derive(Debug, Clone, Eq, PartialEq)]
/// # DAE Warning.
///
/// Data integrity issues noticed during extraction. These are only ever
/// logged; the table of contents remains the authority on where things are.
pub enum DaeWarning {
	/// # Q CRC Failure.
	QCrc,

	/// # Q Position Mismatch.
	///
	/// The track and index the table of contents expects, followed by what
	/// the sub-channel reported.
	QMismatch {
		/// # Expected (Track, Index).
		expected: (u8, u8),

		/// # Found (Track, Index).
		found: (u8, u8),
	},

	/// # ISRC Mismatch.
	Isrc(Isrc),

	/// # Gave Up.
	///
	/// The number of samples still flagged when repairs were abandoned.
	Degraded(u16),

	/// # Transport Hiccup.
	Transport(DiscSmithError),

	/// # Speed Change Failed.
	Speed(u16),
}

impl fmt::Display for DaeWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::QCrc => f.write_str("Q sub-channel CRC failure."),
			Self::QMismatch { expected, found } => write!(
				f,
				"Q sub-channel reports {:02}.{:02}; expected {:02}.{:02}.",
				found.0, found.1, expected.0, expected.1,
			),
			Self::Isrc(isrc) => write!(f, "Q sub-channel reports unexpected ISRC {isrc}."),
			Self::Degraded(n) => write!(f, "Gave up with {n} bad sample(s)."),
			Self::Transport(e) => write!(f, "Retrying: {e}"),
			Self::Speed(n) => write!(f, "Unable to change the read speed to {n}x."),
		}
	}
}



#[derive(Debug)]
/// # Extraction Log.
///
/// This holds the log-worthy details from an extraction, printing it out en
/// masse at the end of the run (if verbose).
///
/// Doing it this way, versus printing each line in realtime, keeps the
/// output from trampling the progress bar.
pub struct DaeLog {
	start: Option<Instant>,
	verbose: bool,
	entries: Vec<(u32, DaeWarning, FmtUtc2k)>,
}

impl Drop for DaeLog {
	/// # Final Print Maybe.
	fn drop(&mut self) { self.flush(); }
}

impl DaeLog {
	#[must_use]
	/// # New Instance.
	pub(crate) const fn new(verbose: bool) -> Self {
		Self {
			start: None,
			verbose,
			entries: Vec::new(),
		}
	}

	/// # Start!
	pub(crate) fn start(&mut self) {
		if self.start.is_none() { self.start.replace(Instant::now()); }
	}

	/// # Add Warning.
	pub(crate) fn add(&mut self, lba: u32, warning: DaeWarning) {
		self.entries.push((lba, warning, FmtUtc2k::now()));
	}

	#[must_use]
	/// # Entries.
	///
	/// Return the LBA and warning of each entry, in order.
	pub fn entries(&self) -> impl Iterator<Item=(u32, &DaeWarning)> {
		self.entries.iter().map(|(lba, w, _)| (*lba, w))
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.entries.len() }

	/// # Flush.
	///
	/// Print the log to STDOUT if verbose, then clear it. Either way, the
	/// entries are gone when this returns.
	pub fn flush(&mut self) {
		let Some(start) = self.start.take() else {
			self.entries.truncate(0);
			return;
		};
		if ! self.verbose {
			self.entries.truncate(0);
			return;
		}

		let writer = std::io::stdout();
		let mut handle = writer.lock();
		let _res = writeln!(
			&mut handle,
			r"##
## Extraction: {}
## Warnings: {}
##",
			NiceElapsed::from(start),
			self.entries.len(),
		);

		for (lba, warning, time) in self.entries.drain(..) {
			let _res = writeln!(&mut handle, r"## [{time}] {lba:06} {warning}");
		}

		let _res = handle.flush();
	}
}
