/*!
# Disc Smith: Tracks
*/

pub(super) mod data;
mod flags;
pub(super) mod sub;

use crate::{
	CdText,
	CutMode,
	DiscSmithError,
	Isrc,
	MAX_INDICES,
	Msf,
	SubChannelMode,
	SubTrack,
	TrackData,
	TrackMode,
};
pub use flags::TrackFlags;
use std::path::Path;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Run.
///
/// A maximal stretch of sub-tracks sharing the same mode and sub-channel
/// mode, padded out to a whole number of sectors.
pub(crate) struct Run {
	/// # Mode.
	pub(crate) mode: TrackMode,

	/// # Sub-Channel Mode.
	pub(crate) sub_mode: SubChannelMode,

	/// # Start (in Units).
	pub(crate) start: u64,

	/// # Length (in Units).
	pub(crate) len: u64,

	/// # Units Per Sector.
	pub(crate) per_sector: u64,

	/// # First Sector.
	pub(crate) first_sector: u32,

	/// # Sector Count.
	pub(crate) sectors: u32,
}

impl Run {
	/// # End (in Units).
	const fn end(&self) -> u64 { self.start + self.len }
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track.
///
/// A track is an ordered list of [`SubTrack`]s plus the bookkeeping that
/// goes with them: the pregap (index 1 position), index marks, post-gap,
/// flags, ISRC, and CD-TEXT.
///
/// Every change to the chunk list is followed by [`Track::update`], which
/// pads each same-mode run out to a whole number of sectors, so readers can
/// always assume run boundaries fall on sector boundaries.
///
/// All positions given to the editing methods are measured in the track's
/// unit, i.e. samples for plain audio and bytes for everything else. The
/// unit is fixed by the first chunk added.
///
/// Edits are atomic: a failed call leaves the track exactly as it was.
pub struct Track {
	mode: TrackMode,
	sub_mode: SubChannelMode,
	cut: Option<CutMode>,
	subs: Vec<SubTrack>,
	runs: Vec<Run>,
	length: u64,
	sectors: u32,
	start: Msf,
	end: Option<Msf>,
	indices: Vec<Msf>,
	flags: TrackFlags,
	isrc: Option<Isrc>,
	cd_text: CdText,
}

impl Track {
	#[must_use]
	/// # New.
	pub fn new(mode: TrackMode, sub_mode: SubChannelMode) -> Self {
		Self {
			mode,
			sub_mode,
			cut: None,
			subs: Vec::new(),
			runs: Vec::new(),
			length: 0,
			sectors: 0,
			start: Msf::ZERO,
			end: None,
			indices: Vec::new(),
			flags: TrackFlags::default(),
			isrc: None,
			cd_text: CdText::default(),
		}
	}
}

/// # Getters.
impl Track {
	#[must_use]
	/// # Mode.
	pub const fn mode(&self) -> TrackMode { self.mode }

	#[must_use]
	/// # Sub-Channel Mode.
	pub const fn sub_mode(&self) -> SubChannelMode { self.sub_mode }

	#[must_use]
	/// # Cut Mode.
	///
	/// This is `None` until the first chunk has been added.
	pub const fn cut_mode(&self) -> Option<CutMode> { self.cut }

	#[must_use]
	/// # Sub-Tracks.
	pub fn sub_tracks(&self) -> &[SubTrack] { &self.subs }

	#[must_use]
	/// # Data List.
	///
	/// Return copies of the real (non-pad) chunks, in order.
	pub fn data_list(&self) -> Vec<TrackData> {
		self.subs.iter()
			.filter(|s| ! s.is_pad())
			.map(|s| s.data().clone())
			.collect()
	}

	#[must_use]
	/// # Length (in Sectors).
	///
	/// A final partial sector of audio counts as a whole one.
	pub const fn length(&self) -> Msf { Msf::from_lba(self.sectors) }

	#[must_use]
	/// # Length (in Units).
	pub const fn length_units(&self) -> u64 { self.length }

	#[must_use]
	/// # Start.
	///
	/// The position of index 1 relative to the start of the track; anything
	/// before it is pregap.
	pub const fn start(&self) -> Msf { self.start }

	#[must_use]
	/// # End.
	///
	/// The start of the post-gap, if any.
	pub const fn end(&self) -> Option<Msf> { self.end }

	#[must_use]
	/// # Index Marks.
	///
	/// The positions of indices 2 and up, relative to [`Track::start`].
	pub fn indices(&self) -> &[Msf] { &self.indices }

	#[must_use]
	/// # Flags.
	pub const fn flags(&self) -> TrackFlags { self.flags }

	#[must_use]
	/// # ISRC.
	pub const fn isrc(&self) -> Option<Isrc> { self.isrc }

	#[must_use]
	/// # CD-TEXT.
	pub const fn cd_text(&self) -> &CdText { &self.cd_text }

	/// # CD-TEXT (Mutable).
	pub fn cd_text_mut(&mut self) -> &mut CdText { &mut self.cd_text }

	#[must_use]
	/// # Plain Audio?
	///
	/// Structural edits that move data between tracks are only supported
	/// for audio without sub-channel data, cut by the sample.
	pub fn is_bare_audio(&self) -> bool {
		self.mode.is_audio() &&
		self.sub_mode.is_none() &&
		self.cut.map_or(true, |c| c == CutMode::Samples)
	}
}

/// # Setters.
impl Track {
	/// # Set Flags.
	pub fn set_flags(&mut self, flags: TrackFlags) { self.flags = flags; }

	/// # Set ISRC.
	pub fn set_isrc(&mut self, isrc: Option<Isrc>) { self.isrc = isrc; }

	/// # Set Start (Pregap).
	///
	/// Index marks are relative to the start, so they move with it.
	///
	/// ## Errors
	///
	/// The start, and every index mark after it, must fall inside the track.
	pub fn set_start(&mut self, start: Msf) -> Result<(), DiscSmithError> {
		self.transact(|t| {
			t.start = start;
			t.validate()
		})
	}

	/// # Set End (Post-Gap).
	///
	/// ## Errors
	///
	/// The end must fall after the start and no later than the end of the
	/// track.
	pub fn set_end(&mut self, end: Option<Msf>) -> Result<(), DiscSmithError> {
		self.transact(|t| {
			t.end = end;
			t.validate()
		})
	}
}

/// # Chunk Editing.
impl Track {
	/// # Append.
	///
	/// ## Errors
	///
	/// Pads are managed internally and cannot be appended, and the chunk's
	/// unit must match the track's.
	pub fn append(&mut self, sub: SubTrack) -> Result<(), DiscSmithError> {
		if sub.is_pad() { return Err(DiscSmithError::PadChunk); }
		self.check_unit(sub.data())?;

		self.claim_unit(sub.data());
		self.subs.retain(|s| ! s.is_pad());
		self.subs.push(sub);
		self.merge_sub_tracks();
		Ok(())
	}

	/// # Append Data.
	///
	/// Shorthand for appending a single [`TrackData`].
	///
	/// ## Errors
	///
	/// See [`Track::append`].
	pub fn append_data(&mut self, data: TrackData) -> Result<(), DiscSmithError> {
		self.append(SubTrack::new(data))
	}

	/// # Append List.
	///
	/// Index marks and the pregap are left alone.
	///
	/// ## Errors
	///
	/// Every chunk's unit must match the track's.
	pub fn append_list(&mut self, list: Vec<TrackData>) -> Result<(), DiscSmithError> {
		self.transact(|t| {
			for d in list { t.append_data(d)?; }
			Ok(())
		})
	}

	/// # Prepend List.
	///
	/// Index marks and the pregap are left alone; callers moving a boundary
	/// adjust them afterwards.
	///
	/// ## Errors
	///
	/// Every chunk's unit must match the track's.
	pub fn prepend(&mut self, list: Vec<TrackData>) -> Result<(), DiscSmithError> {
		self.transact(|t| {
			for d in &list { t.check_unit(d)?; }
			if let Some(d) = list.first() { t.claim_unit(d); }
			t.subs.retain(|s| ! s.is_pad());
			t.subs.splice(0..0, list.into_iter().map(SubTrack::new));
			t.merge_sub_tracks();
			Ok(())
		})
	}

	/// # Remove To End.
	///
	/// Remove everything from `pos` to the end of the track, returning the
	/// removed chunks. Index marks past the cut are dropped.
	///
	/// ## Errors
	///
	/// The cut cannot leave the pregap reaching past the end of the track.
	pub fn remove_to_end(&mut self, pos: u64) -> Result<Vec<TrackData>, DiscSmithError> {
		if pos == self.length { Ok(Vec::new()) }
		else { self.remove_track_data(pos, self.length) }
	}

	/// # Remove From Start.
	///
	/// Remove everything before `pos`, returning the removed chunks. The
	/// pregap shrinks first; once it is gone, index marks shift back.
	///
	/// ## Errors
	///
	/// See [`Track::remove_track_data`].
	pub fn remove_from_start(&mut self, pos: u64) -> Result<Vec<TrackData>, DiscSmithError> {
		if pos == 0 { Ok(Vec::new()) }
		else { self.remove_track_data(0, pos) }
	}

	/// # Remove Track Data.
	///
	/// Remove the range `start..end`, splitting chunks as needed, and return
	/// the removed chunks. Marks inside the range are dropped and marks past
	/// it are shifted back by the number of sectors removed.
	///
	/// ## Errors
	///
	/// Returns an error if the range is empty or out of bounds, a FIFO would
	/// need splitting, or the pregap would no longer fit.
	pub fn remove_track_data(&mut self, start: u64, end: u64)
	-> Result<Vec<TrackData>, DiscSmithError> {
		if end <= start || self.length < end { return Err(DiscSmithError::Range); }

		self.transact(|t| {
			let sb = t.sector_of(start);
			let eb = t.sector_of(end);
			let delta = eb - sb;
			let shift = |m: u32|
				if m < sb { Some(m) }
				else if eb <= m { Some(m - delta) }
				else { None };

			let pregap = t.start.lba();
			let marks = t.marks_abs();
			let post = t.end;

			// Cut it out.
			let a = t.split_at(start)?;
			let b = t.split_at(end)?;
			let out: Vec<TrackData> = t.subs.drain(a..b)
				.filter(|s| ! s.is_pad())
				.map(SubTrack::into_data)
				.collect();
			t.merge_sub_tracks();

			// Fix up the marks.
			let pregap =
				if pregap <= sb { pregap }
				else if eb <= pregap { pregap - delta }
				else { sb };
			t.set_marks_abs(pregap, marks.into_iter().filter_map(shift));
			t.end = post.and_then(|e| shift(e.lba())).map(Msf::from_lba);
			if t.end.is_some_and(|e| e.lba() <= t.start.lba() || t.sectors < e.lba()) {
				t.end = None;
			}

			t.validate()?;
			Ok(out)
		})
	}

	/// # Insert Track Data.
	///
	/// Insert the chunks at `pos`, splitting the chunk there if needed. Marks
	/// at or after `pos` shift forward by the number of sectors added. The
	/// pregap grows only if `pos` falls strictly inside it.
	///
	/// ## Errors
	///
	/// Returns an error if `pos` is past the end, a chunk's unit does not
	/// match, or a FIFO would need splitting.
	pub fn insert_track_data(&mut self, pos: u64, list: Vec<TrackData>)
	-> Result<(), DiscSmithError> {
		if self.length < pos { return Err(DiscSmithError::Range); }
		if list.is_empty() { return Ok(()); }

		self.transact(|t| {
			for d in &list { t.check_unit(d)?; }

			let ib = t.sector_of(pos);
			let pregap = t.start.lba();
			let pregap_moves = pos < t.pos_of_sector(pregap);
			let marks: Vec<(u32, bool)> = t.marks_abs().into_iter()
				.map(|m| (m, pos <= t.pos_of_sector(m)))
				.collect();
			let post = t.end.map(|e| (e.lba(), pos <= t.pos_of_sector(e.lba())));

			// Splice it in.
			let added: u64 = list.iter().map(TrackData::length).sum();
			t.claim_unit(&list[0]);
			let idx = t.split_at(pos)?;
			t.subs.splice(idx..idx, list.into_iter().map(SubTrack::new));
			t.merge_sub_tracks();

			// Fix up the marks.
			let delta = t.sector_of(pos + added).saturating_sub(ib);
			let pregap = if pregap_moves { pregap + delta } else { pregap };
			t.set_marks_abs(
				pregap,
				marks.into_iter().map(|(m, moves)| if moves { m + delta } else { m }),
			);
			t.end = post.map(|(e, moves)| Msf::from_lba(if moves { e + delta } else { e }));

			t.validate()
		})
	}

	/// # Merge Sub-Tracks.
	///
	/// Coalesce neighboring chunks that directly continue one another, then
	/// [update](Track::update).
	pub fn merge_sub_tracks(&mut self) {
		let mut out: Vec<SubTrack> = Vec::with_capacity(self.subs.len());
		for sub in self.subs.drain(..) {
			if let Some(last) = out.last_mut() {
				if ! last.is_pad() && ! sub.is_pad() && last.data_mut().merge(sub.data()) {
					continue;
				}
			}
			out.push(sub);
		}
		self.subs = out;
		self.update();
	}

	/// # Update.
	///
	/// Strip the old pads, then walk the chunks run by run, padding any run
	/// whose length is not a multiple of its sector size, and recompute the
	/// chunk offsets and track length.
	///
	/// Calling this twice in a row changes nothing the second time.
	pub fn update(&mut self) {
		let mut out: Vec<SubTrack> = Vec::with_capacity(self.subs.len() + 1);
		let mut runs: Vec<Run> = Vec::new();
		let mut pos: u64 = 0;
		let mut sectors: u32 = 0;

		let cut = self.cut.unwrap_or(CutMode::Bytes);
		let mut iter = std::mem::take(&mut self.subs).into_iter()
			.filter(|s| ! s.is_pad())
			.peekable();

		while let Some(first) = iter.next() {
			let mode = first.data().mode();
			let sub_mode = first.data().sub_mode();
			let run_start = pos;

			let mut next = Some(first);
			while let Some(mut sub) = next.take() {
				sub.set_start(pos);
				pos += sub.length();
				out.push(sub);
				next = iter.next_if(|s| s.data().mode() == mode && s.data().sub_mode() == sub_mode);
			}

			// Square it up.
			let align = cut.alignment(mode, sub_mode);
			let rem = (pos - run_start) % align;
			if rem != 0 {
				let mut pad = SubTrack::pad(TrackData::pad(mode, sub_mode, cut, align - rem));
				pad.set_start(pos);
				pos += pad.length();
				out.push(pad);
			}

			let per_sector = cut.per_sector(mode, sub_mode);
			let len = pos - run_start;
			let count = u32::try_from(len.div_ceil(per_sector)).unwrap_or(u32::MAX);
			runs.push(Run {
				mode,
				sub_mode,
				start: run_start,
				len,
				per_sector,
				first_sector: sectors,
				sectors: count,
			});
			sectors = sectors.saturating_add(count);
		}

		self.subs = out;
		self.runs = runs;
		self.length = pos;
		self.sectors = sectors;
	}
}

/// # Index Editing.
impl Track {
	/// # Add Index.
	///
	/// Add a mark `rel` sectors after the start, returning its index number.
	///
	/// ## Errors
	///
	/// The mark must fall after the start and before the end of the track,
	/// must not already exist, and there can be no more than 98 of them.
	pub fn add_index(&mut self, rel: Msf) -> Result<u8, DiscSmithError> {
		if rel.is_zero() { return Err(DiscSmithError::IndexPosition); }
		if usize::from(MAX_INDICES) <= self.indices.len() {
			return Err(DiscSmithError::IndexCount);
		}
		if self.sectors <= self.start.lba() + rel.lba() {
			return Err(DiscSmithError::IndexPosition);
		}

		match self.indices.binary_search(&rel) {
			Ok(_) => Err(DiscSmithError::IndexPosition),
			Err(idx) => {
				self.indices.insert(idx, rel);
				u8::try_from(idx + 2).map_err(|_| DiscSmithError::IndexCount)
			},
		}
	}

	/// # Remove Index.
	///
	/// ## Errors
	///
	/// Only indices 2 and up can be removed.
	pub fn remove_index(&mut self, nr: u8) -> Result<(), DiscSmithError> {
		let idx = self.index_idx(nr)?;
		self.indices.remove(idx);
		Ok(())
	}

	/// # Move Index.
	///
	/// Move index `nr` to `pos`, measured from the start of the track.
	///
	/// Index 0 is the track boundary itself and cannot be moved here. Moving
	/// index 1 resizes the pregap, leaving the other marks where they are on
	/// disc. Other indices move between their neighbors.
	///
	/// ## Errors
	///
	/// Returns an error if the index does not exist, or the new position is
	/// out of order or out of range.
	pub fn move_index(&mut self, nr: u8, pos: Msf) -> Result<(), DiscSmithError> {
		let p = pos.lba();
		match nr {
			0 => Err(DiscSmithError::IndexZero),
			1 => {
				let marks = self.marks_abs();
				if
					self.sectors <= p ||
					marks.first().is_some_and(|&m| m <= p) ||
					self.end.is_some_and(|e| e.lba() <= p)
				{
					return Err(DiscSmithError::IndexPosition);
				}

				self.start = pos;
				self.indices = marks.into_iter().map(|m| Msf::from_lba(m - p)).collect();
				Ok(())
			},
			_ => {
				let idx = self.index_idx(nr)?;
				let start = self.start.lba();
				let lo = if idx == 0 { start } else { start + self.indices[idx - 1].lba() };
				let hi = self.indices.get(idx + 1).map_or(self.sectors, |m| start + m.lba());
				if p <= lo || hi <= p { return Err(DiscSmithError::IndexPosition); }

				self.indices[idx] = Msf::from_lba(p - start);
				Ok(())
			},
		}
	}
}

/// # Misc.
impl Track {
	/// # Check.
	///
	/// Verify the bookkeeping, and that every file-backed chunk exists and
	/// is long enough.
	///
	/// ## Errors
	///
	/// Returns the first problem found.
	pub fn check(&self, base: &Path) -> Result<(), DiscSmithError> {
		self.validate()?;
		for sub in self.subs.iter().filter(|s| ! s.is_pad()) {
			sub.data().check(base)?;
		}
		Ok(())
	}

	/// # Sector Position.
	///
	/// Return the sector containing unit position `pos`. The end of the track
	/// maps to the sector after the last whole one.
	pub(crate) fn sector_of(&self, pos: u64) -> u32 {
		for r in &self.runs {
			if pos < r.end() {
				let off = u32::try_from((pos - r.start) / r.per_sector)
					.unwrap_or(u32::MAX);
				return r.first_sector.saturating_add(off);
			}
		}

		self.runs.last().map_or(0, |r| {
			let off = u32::try_from(r.len / r.per_sector).unwrap_or(u32::MAX);
			r.first_sector.saturating_add(off)
		})
	}

	/// # Unit Position.
	///
	/// Return the unit position where sector `sector` begins.
	pub(crate) fn pos_of_sector(&self, sector: u32) -> u64 {
		for r in &self.runs {
			if sector < r.first_sector + r.sectors {
				let off = u64::from(sector - r.first_sector) * r.per_sector;
				return (r.start + off).min(r.end());
			}
		}
		self.length
	}

	/// # Sector Layout.
	///
	/// Return the mode, sub-channel mode, and unit range of a sector. The
	/// range is shorter than a full sector only for a final partial sector
	/// of audio.
	pub(crate) fn sector_layout(&self, sector: u32)
	-> Option<(TrackMode, SubChannelMode, u64, u64)> {
		let r = self.runs.iter().find(|r| r.first_sector <= sector && sector < r.first_sector + r.sectors)?;
		let start = r.start + u64::from(sector - r.first_sector) * r.per_sector;
		let end = (start + r.per_sector).min(r.end());
		Some((r.mode, r.sub_mode, start, end))
	}
}

/// # Internal.
impl Track {
	/// # Transaction.
	///
	/// Run the callback against a copy, committing only on success.
	fn transact<F, T>(&mut self, cb: F) -> Result<T, DiscSmithError>
	where F: FnOnce(&mut Self) -> Result<T, DiscSmithError> {
		let mut tmp = self.clone();
		let out = cb(&mut tmp)?;
		*self = tmp;
		Ok(out)
	}

	/// # Check Unit.
	fn check_unit(&self, data: &TrackData) -> Result<(), DiscSmithError> {
		match self.cut {
			Some(c) if c != data.cut_mode() => Err(DiscSmithError::CutMode),
			_ => Ok(()),
		}
	}

	/// # Claim Unit.
	///
	/// The first chunk decides the track's unit.
	fn claim_unit(&mut self, data: &TrackData) {
		if self.cut.is_none() { self.cut = Some(data.cut_mode()); }
	}

	/// # Index Number to Vec Position.
	fn index_idx(&self, nr: u8) -> Result<usize, DiscSmithError> {
		usize::from(nr).checked_sub(2)
			.filter(|&i| i < self.indices.len())
			.ok_or(DiscSmithError::NoIndex(nr))
	}

	/// # Absolute Marks.
	///
	/// Return the index marks relative to the start of the track.
	pub(crate) fn marks_abs(&self) -> Vec<u32> {
		let start = self.start.lba();
		self.indices.iter().map(|m| start + m.lba()).collect()
	}

	/// # Set Absolute Marks.
	///
	/// Set the pregap and index marks from track-relative sector positions,
	/// quietly dropping any that are out of order or out of range.
	fn set_marks_abs<I>(&mut self, start: u32, marks: I)
	where I: IntoIterator<Item=u32> {
		let sectors = self.sectors;
		let mut last = start;
		self.start = Msf::from_lba(start);
		self.indices = marks.into_iter()
			.filter(|&m| {
				let ok = last < m && m < sectors;
				if ok { last = m; }
				ok
			})
			.take(usize::from(MAX_INDICES))
			.map(|m| Msf::from_lba(m - start))
			.collect();
	}

	/// # Split At.
	///
	/// Make sure a chunk begins at `pos`, splitting one if necessary, and
	/// return its position in the list. The end of the track returns the
	/// list length.
	fn split_at(&mut self, pos: u64) -> Result<usize, DiscSmithError> {
		if self.length <= pos { return Ok(self.subs.len()); }

		let idx = self.subs.iter()
			.position(|s| s.start() <= pos && pos < s.end())
			.ok_or(DiscSmithError::Bug("sub-track offsets are stale"))?;

		let rel = pos - self.subs[idx].start();
		if rel == 0 { return Ok(idx); }

		let (a, b) = self.subs[idx].split(rel)?;
		self.subs[idx] = a;
		self.subs.insert(idx + 1, b);
		Ok(idx + 1)
	}

	/// # Validate.
	///
	/// Make sure the pregap, marks and post-gap all fit.
	fn validate(&self) -> Result<(), DiscSmithError> {
		let start = self.start.lba();
		if self.sectors == 0 {
			return
				if start == 0 && self.indices.is_empty() && self.end.is_none() { Ok(()) }
				else { Err(DiscSmithError::TrackStart) };
		}

		if self.sectors <= start { return Err(DiscSmithError::TrackStart); }
		if let Some(last) = self.indices.last() {
			if self.sectors <= start + last.lba() { return Err(DiscSmithError::IndexPosition); }
		}
		if let Some(end) = self.end {
			if end.lba() <= start || self.sectors < end.lba() {
				return Err(DiscSmithError::IndexPosition);
			}
		}

		Ok(())
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::SAMPLES_PER_SECTOR;

	const SPS: u64 = SAMPLES_PER_SECTOR as u64;

	/// # Runs Are Aligned?
	fn aligned(track: &Track) -> bool {
		let cut = track.cut_mode().unwrap_or(CutMode::Bytes);
		track.runs.iter().all(|r| r.len % cut.alignment(r.mode, r.sub_mode) == 0)
	}

	/// # Audio Track.
	fn audio(sectors: u64) -> Track {
		let mut track = Track::new(TrackMode::Audio, SubChannelMode::None);
		track.append_data(TrackData::audio_file("a.raw", 0, sectors * SPS))
			.expect("Append failed.");
		track
	}

	#[test]
	fn t_append_audio() {
		let mut track = Track::new(TrackMode::Audio, SubChannelMode::None);
		track.append_data(TrackData::silence(2 * 75 * SPS)).expect("Append failed.");
		track.append_data(TrackData::audio_file("song.wav", 0, 3 * 75 * SPS))
			.expect("Append failed.");

		assert_eq!(track.length().lba(), 5 * 75);
		assert_eq!(track.sub_tracks().len(), 2);
		assert!(track.sub_tracks().iter().all(|s| ! s.is_pad()), "No pads expected.");
		assert_eq!(track.sub_tracks()[1].start(), 2 * 75 * SPS);
		assert!(track.is_bare_audio());

		// Pads can't be added by hand, and units can't be mixed.
		assert_eq!(
			track.append(SubTrack::pad(TrackData::silence(1))),
			Err(DiscSmithError::PadChunk),
		);
		assert_eq!(
			track.append_data(TrackData::zero(TrackMode::Audio, SubChannelMode::None, 2352)),
			Err(DiscSmithError::CutMode),
		);
	}

	#[test]
	fn t_partial_audio() {
		let mut track = Track::new(TrackMode::Audio, SubChannelMode::None);
		track.append_data(TrackData::silence(SPS + 1)).expect("Append failed.");

		// Samples are never padded, but the sector count rounds up.
		assert_eq!(track.sub_tracks().len(), 1);
		assert_eq!(track.length_units(), SPS + 1);
		assert_eq!(track.length().lba(), 2);
		assert_eq!(track.sector_layout(1).map(|l| (l.2, l.3)), Some((SPS, SPS + 1)));
	}

	#[test]
	fn t_pad_form1() {
		let mut track = Track::new(TrackMode::Mode2Form1, SubChannelMode::None);
		track.append_data(TrackData::zero(TrackMode::Mode2Form1, SubChannelMode::None, 2050))
			.expect("Append failed.");

		let subs = track.sub_tracks();
		assert_eq!(subs.len(), 2);
		assert!(subs[1].is_pad(), "The second chunk should be padding.");
		assert_eq!(subs[1].length(), 2046);
		assert_eq!(subs[1].start(), 2050);
		assert_eq!(track.length_units(), 4096);
		assert_eq!(track.length().lba(), 2);
		assert!(aligned(&track));

		// Idempotence.
		let before = track.sub_tracks().to_vec();
		track.update();
		assert_eq!(track.sub_tracks(), before.as_slice(), "Update should be a no-op.");
		track.update();
		assert_eq!(track.sub_tracks(), before.as_slice(), "Update should be a no-op.");
	}

	#[test]
	fn t_mixed_runs() {
		let mut track = Track::new(TrackMode::Mode2FormMix, SubChannelMode::None);
		track.append_data(TrackData::zero(TrackMode::Mode2Form1, SubChannelMode::None, 3000))
			.expect("Append failed.");
		track.append_data(TrackData::zero(TrackMode::Mode2Form2, SubChannelMode::None, 2324))
			.expect("Append failed.");
		track.append_data(TrackData::zero(TrackMode::Mode2Form2, SubChannelMode::None, 100))
			.expect("Append failed.");

		// Form 1 run: 3000 + 1096 pad; Form 2 run (merged): 2424 + 2224 pad.
		assert!(aligned(&track));
		assert_eq!(track.length().lba(), 4);
		let pads: Vec<u64> = track.sub_tracks().iter()
			.filter(|s| s.is_pad())
			.map(SubTrack::length)
			.collect();
		assert_eq!(pads, vec![1096, 2224]);

		// The data list skips pads.
		assert_eq!(track.data_list().len(), 2);
	}

	/// # Edit.
	///
	/// Run an edit, returning whether it worked. Successful edits must leave
	/// every run aligned; failed ones must leave the track untouched.
	fn edit<T, F>(track: &mut Track, label: &str, cb: F) -> bool
	where F: FnOnce(&mut Track) -> Result<T, DiscSmithError> {
		let before = track.clone();
		if cb(track).is_ok() {
			assert!(aligned(track), "{label}: the runs are misaligned.");
			assert_eq!(
				track.sub_tracks().iter().map(SubTrack::length).sum::<u64>(),
				track.length_units(),
				"{label}: the chunk lengths do not add up.",
			);
			true
		}
		else {
			assert_eq!(track, &before, "{label}: a failed edit changed the track.");
			false
		}
	}

	/// # Middle of the Nth Chunk.
	fn mid(track: &Track, n: usize) -> u64 {
		let sub = track.sub_tracks().iter()
			.filter(|s| ! s.is_pad())
			.nth(n)
			.expect("Missing chunk.");
		sub.start() + sub.length() / 2
	}

	#[test]
	fn t_mixed_edits() {
		const F1: TrackMode = TrackMode::Mode2Form1;
		const F2: TrackMode = TrackMode::Mode2Form2;
		const AU: TrackMode = TrackMode::Audio;
		const NO: SubChannelMode = SubChannelMode::None;

		let mut track = Track::new(TrackMode::Mode2FormMix, NO);
		for d in [
			TrackData::zero(F1, NO, 3000),
			TrackData::data_file("d.bin", F1, NO, 0, 2048 * 40 + 7),
			TrackData::zero(F2, NO, 2324 * 40 + 100),
			TrackData::zero(AU, NO, 2352 * 40 + 10),
		] {
			assert!(edit(&mut track, "setup", |t| t.append_data(d)), "Setup failed.");
		}

		// Appending.
		assert!(edit(&mut track, "append", |t| t.append_data(TrackData::zero(F2, NO, 500))));
		assert!(! edit(&mut track, "append samples", |t| t.append_data(TrackData::silence(10))));
		assert!(! edit(&mut track, "append pad", |t| t.append(SubTrack::pad(TrackData::zero(F1, NO, 1)))));

		// Prepending.
		assert!(edit(&mut track, "prepend", |t| t.prepend(vec![
			TrackData::zero(AU, NO, 100),
			TrackData::zero(F1, NO, 10),
		])));
		assert!(! edit(&mut track, "prepend samples", |t| t.prepend(vec![
			TrackData::zero(F2, NO, 10),
			TrackData::silence(5),
		])));

		// Inserting.
		let pos = mid(&track, 2);
		assert!(edit(&mut track, "insert", |t| t.insert_track_data(pos, vec![
			TrackData::zero(F2, NO, 77),
			TrackData::zero(AU, NO, 9),
		])));
		let pos = track.length_units() + 1;
		assert!(! edit(&mut track, "insert past end", |t| t.insert_track_data(pos, vec![
			TrackData::zero(F1, NO, 1),
		])));
		let pos = mid(&track, 1);
		assert!(! edit(&mut track, "insert samples", |t| t.insert_track_data(pos, vec![
			TrackData::silence(3),
		])));

		// Removing.
		let (a, b) = (mid(&track, 1), mid(&track, 3));
		assert!(edit(&mut track, "remove", |t| t.remove_track_data(a, b)));
		assert!(! edit(&mut track, "remove nothing", |t| t.remove_track_data(5, 5)));
		let len = track.length_units();
		assert!(! edit(&mut track, "remove past end", |t| t.remove_track_data(0, len + 1)));

		let n = track.sub_tracks().iter().filter(|s| ! s.is_pad()).count();
		let pos = mid(&track, n - 1);
		assert!(edit(&mut track, "remove to end", |t| t.remove_to_end(pos)));
		let pos = mid(&track, 0);
		assert!(edit(&mut track, "remove from start", |t| t.remove_from_start(pos)));

		// Marks.
		assert!(30 < track.length().lba(), "The track is too short for the marks.");
		track.set_start(Msf::from_lba(4)).expect("Start failed.");
		assert_eq!(track.add_index(Msf::from_lba(6)), Ok(2));

		assert!(! edit(&mut track, "move zero", |t| t.move_index(0, Msf::from_lba(1))));
		assert!(! edit(&mut track, "move missing", |t| t.move_index(7, Msf::from_lba(20))));
		assert!(edit(&mut track, "move two", |t| t.move_index(2, Msf::from_lba(8))));
		assert!(! edit(&mut track, "move two early", |t| t.move_index(2, Msf::from_lba(3))));
		assert!(edit(&mut track, "move one", |t| t.move_index(1, Msf::from_lba(2))));
		assert!(! edit(&mut track, "move one late", |t| t.move_index(1, Msf::from_lba(9))));
		assert_eq!(track.start(), Msf::from_lba(2));
		assert_eq!(track.indices(), &[Msf::from_lba(6)]);

		// Cuts that would strand the pregap are refused; cuts inside it are not.
		let pos = track.pos_of_sector(1);
		assert!(! edit(&mut track, "strand pregap", |t| t.remove_to_end(pos)));
		assert!(edit(&mut track, "trim pregap", |t| t.remove_from_start(pos)));
		assert_eq!(track.start(), Msf::from_lba(1));
		assert_eq!(track.indices(), &[Msf::from_lba(6)], "The mark should keep its place on disc.");
	}

	#[test]
	fn t_remove_insert() {
		let mut track = audio(100);
		track.set_start(Msf::from_lba(10)).expect("Start failed.");
		assert_eq!(track.add_index(Msf::from_lba(20)), Ok(2));
		assert_eq!(track.add_index(Msf::from_lba(70)), Ok(3));

		// Remove sectors 40..50 (absolute); the mark at 30 stays, the mark at
		// 80 moves back to 70.
		let removed = track.remove_track_data(40 * SPS, 50 * SPS).expect("Remove failed.");
		assert_eq!(removed.len(), 1);
		assert_eq!(removed[0].length(), 10 * SPS);
		assert_eq!(removed[0].offset(), 40 * SPS * 4);
		assert_eq!(track.length().lba(), 90);
		assert_eq!(track.start().lba(), 10);
		assert_eq!(track.indices(), &[Msf::from_lba(20), Msf::from_lba(60)]);
		assert!(aligned(&track));

		// Put it back.
		track.insert_track_data(40 * SPS, removed).expect("Insert failed.");
		assert_eq!(track.length().lba(), 100);
		assert_eq!(track.start().lba(), 10);
		assert_eq!(track.indices(), &[Msf::from_lba(20), Msf::from_lba(70)]);

		// The file slices should have merged back into one.
		assert_eq!(track.sub_tracks().len(), 1);
		assert_eq!(track, {
			let mut t = audio(100);
			t.set_start(Msf::from_lba(10)).expect("Start failed.");
			t.add_index(Msf::from_lba(20)).expect("Index failed.");
			t.add_index(Msf::from_lba(70)).expect("Index failed.");
			t
		});
	}

	#[test]
	fn t_remove_marks() {
		let mut track = audio(100);
		track.add_index(Msf::from_lba(45)).expect("Index failed.");

		// Marks inside the cut disappear.
		track.remove_track_data(40 * SPS, 50 * SPS).expect("Remove failed.");
		assert!(track.indices().is_empty(), "The mark should be gone.");

		// Eating into the pregap shrinks it.
		let mut track = audio(100);
		track.set_start(Msf::from_lba(30)).expect("Start failed.");
		track.add_index(Msf::from_lba(10)).expect("Index failed.");
		track.remove_from_start(10 * SPS).expect("Remove failed.");
		assert_eq!(track.start().lba(), 20);
		assert_eq!(track.indices(), &[Msf::from_lba(10)]);

		// Eating past it zeroes it and shifts the marks.
		track.remove_from_start(25 * SPS).expect("Remove failed.");
		assert_eq!(track.start().lba(), 0);
		assert_eq!(track.indices(), &[Msf::from_lba(5)]);

		// The tail end drops everything after the cut.
		let mut track = audio(100);
		track.add_index(Msf::from_lba(80)).expect("Index failed.");
		let tail = track.remove_to_end(60 * SPS).expect("Remove failed.");
		assert_eq!(tail[0].length(), 40 * SPS);
		assert_eq!(track.length().lba(), 60);
		assert!(track.indices().is_empty());

		// A cut that would strand the pregap fails and changes nothing.
		let mut track = audio(100);
		track.set_start(Msf::from_lba(50)).expect("Start failed.");
		let before = track.clone();
		assert!(track.remove_to_end(40 * SPS).is_err(), "The pregap would not fit.");
		assert_eq!(track, before, "A failed edit should change nothing.");
	}

	#[test]
	fn t_insert_pregap() {
		// Inserting inside the pregap grows it.
		let mut track = audio(100);
		track.set_start(Msf::from_lba(10)).expect("Start failed.");
		track.insert_track_data(5 * SPS, vec![TrackData::silence(5 * SPS)])
			.expect("Insert failed.");
		assert_eq!(track.start().lba(), 15);

		// Inserting right at index 1 grows the track proper.
		track.insert_track_data(15 * SPS, vec![TrackData::silence(5 * SPS)])
			.expect("Insert failed.");
		assert_eq!(track.start().lba(), 15);
		assert_eq!(track.length().lba(), 110);
	}

	#[test]
	fn t_prepend() {
		let mut track = audio(10);
		track.prepend(vec![TrackData::silence(5 * SPS)]).expect("Prepend failed.");
		assert_eq!(track.length().lba(), 15);
		assert_eq!(track.sub_tracks()[0].data().kind(), crate::DataKind::Silence);
		assert_eq!(track.sub_tracks()[1].start(), 5 * SPS);

		assert_eq!(
			track.prepend(vec![TrackData::zero(TrackMode::Audio, SubChannelMode::None, 4)]),
			Err(DiscSmithError::CutMode),
		);
	}

	#[test]
	fn t_indices() {
		let mut track = audio(100);
		assert_eq!(track.add_index(Msf::from_lba(50)), Ok(2));
		assert_eq!(track.add_index(Msf::from_lba(20)), Ok(2));
		assert_eq!(track.indices(), &[Msf::from_lba(20), Msf::from_lba(50)]);

		// Bad positions.
		assert_eq!(track.add_index(Msf::ZERO), Err(DiscSmithError::IndexPosition));
		assert_eq!(track.add_index(Msf::from_lba(20)), Err(DiscSmithError::IndexPosition));
		assert_eq!(track.add_index(Msf::from_lba(100)), Err(DiscSmithError::IndexPosition));

		// Index 0 never moves.
		assert_eq!(track.move_index(0, Msf::from_lba(5)), Err(DiscSmithError::IndexZero));

		// Index 2 must stay between index 1 and index 3.
		assert_eq!(track.move_index(2, Msf::from_lba(50)), Err(DiscSmithError::IndexPosition));
		assert_eq!(track.move_index(2, Msf::from_lba(30)), Ok(()));
		assert_eq!(track.indices()[0], Msf::from_lba(30));

		// Index 1 absorbs the pregap; the other marks stay put on disc.
		assert_eq!(track.move_index(1, Msf::from_lba(10)), Ok(()));
		assert_eq!(track.start(), Msf::from_lba(10));
		assert_eq!(track.indices(), &[Msf::from_lba(20), Msf::from_lba(40)]);
		assert_eq!(track.move_index(1, Msf::from_lba(30)), Err(DiscSmithError::IndexPosition));

		// Removal.
		assert_eq!(track.remove_index(4), Err(DiscSmithError::NoIndex(4)));
		assert_eq!(track.remove_index(1), Err(DiscSmithError::NoIndex(1)));
		assert_eq!(track.remove_index(2), Ok(()));
		assert_eq!(track.indices(), &[Msf::from_lba(40)]);
	}

	#[test]
	fn t_index_limit() {
		let mut track = audio(200);
		for i in 1..=98 {
			assert!(track.add_index(Msf::from_lba(i)).is_ok(), "Index {i} failed.");
		}
		assert_eq!(track.add_index(Msf::from_lba(150)), Err(DiscSmithError::IndexCount));
	}

	#[test]
	fn t_start_end() {
		let mut track = audio(100);
		assert_eq!(track.set_start(Msf::from_lba(100)), Err(DiscSmithError::TrackStart));
		assert!(track.set_start(Msf::from_lba(99)).is_ok());
		assert!(track.set_start(Msf::ZERO).is_ok());

		track.add_index(Msf::from_lba(90)).expect("Index failed.");
		assert_eq!(track.set_start(Msf::from_lba(10)), Err(DiscSmithError::IndexPosition));
		assert_eq!(track.start(), Msf::ZERO, "A failed edit should change nothing.");

		assert!(track.set_end(Some(Msf::from_lba(95))).is_ok());
		assert!(track.set_end(Some(Msf::from_lba(101))).is_err());
		assert!(track.set_end(None).is_ok());
	}

	#[test]
	fn t_fifo_split() {
		let mut track = Track::new(TrackMode::Mode1, SubChannelMode::None);
		track.append_data(TrackData::fifo("pipe", TrackMode::Mode1, SubChannelMode::None, 2048 * 10))
			.expect("Append failed.");
		assert_eq!(track.remove_to_end(2048 * 5), Err(DiscSmithError::Unsplittable));
		assert_eq!(track.length().lba(), 10);
		assert!(! track.is_bare_audio());
	}
}
