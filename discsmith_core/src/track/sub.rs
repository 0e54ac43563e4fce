/*!
# Disc Smith: Sub-Tracks
*/

use crate::TrackData;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Sub-Track Kind.
pub enum SubTrackKind {
	/// # Real Data.
	Data,

	/// # Synthetic Padding.
	///
	/// Pads are generated during [`Track::update`](crate::Track::update) to
	/// square up runs with the sector size, and are never saved.
	Pad,
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Sub-Track.
///
/// A [`TrackData`] positioned within its parent track. Neighbors are simply
/// the adjacent entries of the track's sub-track list.
pub struct SubTrack {
	kind: SubTrackKind,
	data: TrackData,
	start: u64,
}

impl From<TrackData> for SubTrack {
	#[inline]
	fn from(data: TrackData) -> Self { Self::new(data) }
}

impl SubTrack {
	#[must_use]
	/// # New (Data).
	pub const fn new(data: TrackData) -> Self {
		Self {
			kind: SubTrackKind::Data,
			data,
			start: 0,
		}
	}

	#[must_use]
	/// # New Pad.
	pub(crate) const fn pad(data: TrackData) -> Self {
		Self {
			kind: SubTrackKind::Pad,
			data,
			start: 0,
		}
	}

	#[must_use]
	/// # Kind.
	pub const fn kind(&self) -> SubTrackKind { self.kind }

	#[must_use]
	/// # Is Pad?
	pub const fn is_pad(&self) -> bool { matches!(self.kind, SubTrackKind::Pad) }

	#[must_use]
	/// # Data.
	pub const fn data(&self) -> &TrackData { &self.data }

	/// # Data (Mutable).
	pub(crate) fn data_mut(&mut self) -> &mut TrackData { &mut self.data }

	#[must_use]
	/// # Into Data.
	pub fn into_data(self) -> TrackData { self.data }

	#[must_use]
	/// # Start (in Units).
	///
	/// The offset of this chunk from the start of the track.
	pub const fn start(&self) -> u64 { self.start }

	#[must_use]
	/// # End (in Units).
	pub const fn end(&self) -> u64 { self.start + self.data.length() }

	#[must_use]
	/// # Length (in Units).
	pub const fn length(&self) -> u64 { self.data.length() }

	/// # Set Start.
	pub(crate) fn set_start(&mut self, start: u64) { self.start = start; }

	/// # Split.
	///
	/// Split in two at `pos` (relative to this chunk), keeping the kind.
	pub(crate) fn split(&self, pos: u64) -> Result<(Self, Self), crate::DiscSmithError> {
		let (a, b) = self.data.split(pos)?;
		Ok((
			Self { kind: self.kind, data: a, start: self.start },
			Self { kind: self.kind, data: b, start: self.start + pos },
		))
	}
}
