/*!
# Disc Smith: Table of Contents
*/

mod edit;
mod parse;
mod text;

use crate::{
	Catalog,
	CD_LEADIN,
	CdText,
	DiscSmithError,
	MAX_TRACKS,
	MIN_TRACK_SECTORS,
	Msf,
	SubChannelMode,
	Track,
	TrackData,
	TrackMode,
};
pub use edit::{
	DIRTY_META,
	DIRTY_SAMPLES,
	DIRTY_SELECTION,
	DIRTY_TOC,
	DIRTY_TRACK,
	TocEdit,
};
use std::{
	fmt,
	path::Path,
};



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # Disc Type.
pub enum TocType {
	#[default]
	/// # Audio CD.
	CdDa,

	/// # CD-ROM.
	CdRom,

	/// # CD-ROM XA.
	CdRomXa,

	/// # CD-i.
	CdI,
}

impl fmt::Display for TocType {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<str as fmt::Display>::fmt(self.as_str(), f)
	}
}

impl TocType {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::CdDa => "CD_DA",
			Self::CdRom => "CD_ROM",
			Self::CdRomXa => "CD_ROM_XA",
			Self::CdI => "CD_I",
		}
	}

	#[must_use]
	/// # From Keyword.
	pub fn from_keyword(src: &str) -> Option<Self> {
		match src {
			"CD_DA" => Some(Self::CdDa),
			"CD_ROM" => Some(Self::CdRom),
			"CD_ROM_XA" => Some(Self::CdRomXa),
			"CD_I" => Some(Self::CdI),
			_ => None,
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track Entry.
///
/// A [`Track`] plus its position on the disc. The addressing is derived from
/// the lengths of the tracks before it and is never set directly.
pub struct TrackEntry {
	track: Track,
	number: u8,
	abs_start: Msf,
	start: Msf,
	end: Msf,
}

impl TrackEntry {
	/// # New.
	const fn new(track: Track) -> Self {
		Self {
			track,
			number: 0,
			abs_start: Msf::ZERO,
			start: Msf::ZERO,
			end: Msf::ZERO,
		}
	}

	#[must_use]
	/// # Track.
	pub const fn track(&self) -> &Track { &self.track }

	#[must_use]
	/// # Track Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Absolute Start.
	///
	/// The position of index 0 (the start of the pregap, if any).
	pub const fn abs_start(&self) -> Msf { self.abs_start }

	#[must_use]
	/// # Start.
	///
	/// The absolute position of index 1.
	pub const fn start(&self) -> Msf { self.start }

	#[must_use]
	/// # End.
	///
	/// The absolute position of the next track (exclusive).
	pub const fn end(&self) -> Msf { self.end }

	#[must_use]
	/// # Absolute Index Positions.
	///
	/// Return the absolute positions of indices 1 and up.
	pub fn index_positions(&self) -> Vec<Msf> {
		let mut out = vec![self.start];
		out.extend(self.track.indices().iter().map(|&m| self.start + m));
		out
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Table of Contents.
///
/// An ordered list of tracks plus the disc-level metadata. All positions
/// passed to the editing methods are absolute, either sectors (LBA) or
/// samples counted from the start of the program area.
///
/// Edits are atomic: each works against a scratch copy and only commits on
/// success.
pub struct Toc {
	kind: TocType,
	catalog: Option<Catalog>,
	cd_text: CdText,
	tracks: Vec<TrackEntry>,
}

/// # Getters.
impl Toc {
	#[must_use]
	/// # New.
	pub fn new(kind: TocType) -> Self {
		Self { kind, ..Self::default() }
	}

	#[must_use]
	/// # Disc Type.
	pub const fn kind(&self) -> TocType { self.kind }

	#[must_use]
	/// # Catalog.
	pub const fn catalog(&self) -> Option<Catalog> { self.catalog }

	#[must_use]
	/// # CD-TEXT.
	pub const fn cd_text(&self) -> &CdText { &self.cd_text }

	/// # CD-TEXT (Mutable).
	pub fn cd_text_mut(&mut self) -> &mut CdText { &mut self.cd_text }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[TrackEntry] { &self.tracks }

	#[must_use]
	/// # Track.
	pub fn track(&self, nr: u8) -> Option<&TrackEntry> {
		usize::from(nr).checked_sub(1).and_then(|idx| self.tracks.get(idx))
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.tracks.is_empty() }

	#[must_use]
	/// # Leadout.
	///
	/// The position just past the last track.
	pub fn leadout(&self) -> Msf { self.tracks.last().map_or(Msf::ZERO, |t| t.end) }

	#[must_use]
	/// # Find Track (by LBA).
	pub fn find_track(&self, lba: u32) -> Option<&TrackEntry> {
		self.find_idx(lba).ok().map(|idx| &self.tracks[idx])
	}

	#[must_use]
	/// # Find Track (by Sample).
	pub fn find_sample(&self, sample: u64) -> Option<&TrackEntry> {
		self.find_sample_idx(sample).ok().map(|idx| &self.tracks[idx])
	}

	#[must_use]
	/// # Disc IDs.
	///
	/// Build the [`cdtoc::Toc`] for the disc's layout, from which the CDDB,
	/// AccurateRip, CUETools and MusicBrainz IDs can be derived.
	///
	/// Returns `None` if the disc has no audio, or data tracks anywhere other
	/// than the first or last position.
	pub fn disc_ids(&self) -> Option<cdtoc::Toc> {
		let leadin = u32::from(CD_LEADIN);
		let last = self.tracks.len();
		let mut audio = Vec::with_capacity(last);
		let mut data = None;

		for t in &self.tracks {
			let start = t.start.lba() + leadin;
			if t.track.mode().is_audio() { audio.push(start); }
			else if data.is_none() && (t.number == 1 || usize::from(t.number) == last) {
				data = Some(start);
			}
			else { return None; }
		}

		cdtoc::Toc::from_parts(audio, data, self.leadout().lba() + leadin).ok()
	}

	/// # Check.
	///
	/// Validate the disc as a whole: track count, minimum track lengths, and
	/// the files each track references.
	///
	/// ## Errors
	///
	/// Returns the first problem found.
	pub fn check(&self, base: &Path) -> Result<(), DiscSmithError> {
		if self.tracks.is_empty() || usize::from(MAX_TRACKS) < self.tracks.len() {
			return Err(DiscSmithError::TrackCount);
		}

		for t in &self.tracks {
			check_min(&t.track, t.number)?;
			t.track.check(base)?;
		}

		Ok(())
	}
}

/// # Setters.
impl Toc {
	/// # Set Disc Type.
	pub fn set_kind(&mut self, kind: TocType) { self.kind = kind; }

	/// # Set Catalog.
	pub fn set_catalog(&mut self, catalog: Option<Catalog>) { self.catalog = catalog; }

	/// # Append Track.
	///
	/// ## Errors
	///
	/// A disc can hold at most 99 tracks.
	pub fn append(&mut self, track: Track) -> Result<u8, DiscSmithError> {
		if usize::from(MAX_TRACKS) <= self.tracks.len() {
			return Err(DiscSmithError::TrackCount);
		}

		self.tracks.push(TrackEntry::new(track));
		self.update();
		Ok(self.tracks.last().map_or(0, |t| t.number))
	}

	/// # Edit Track.
	///
	/// Run the callback against track `nr`. Changes are only kept if the
	/// callback succeeds.
	///
	/// ## Errors
	///
	/// Returns an error if the track does not exist, or whatever the callback
	/// returns.
	pub fn with_track<F, T>(&mut self, nr: u8, cb: F) -> Result<T, DiscSmithError>
	where F: FnOnce(&mut Track) -> Result<T, DiscSmithError> {
		let idx = self.idx(nr)?;
		self.transact(|toc| cb(&mut toc.tracks[idx].track))
	}
}

/// # Marker Editing.
impl Toc {
	/// # Add Track Marker.
	///
	/// Split the track containing `lba` in two, returning the new track's
	/// number. Index marks after the split move to the new track.
	///
	/// The new track inherits the copy and emphasis flags. The ISRC and
	/// CD-TEXT name a single recording, so they stay with the first half.
	///
	/// ## Errors
	///
	/// The track must be plain audio, there must be room for another track,
	/// and both halves must be at least four seconds long.
	pub fn add_track_marker(&mut self, lba: u32) -> Result<u8, DiscSmithError> {
		let idx = self.find_idx(lba)?;
		let e = &self.tracks[idx];
		let nr = e.number;
		let rel = lba - e.abs_start.lba();
		let len = e.track.length().lba();

		if rel == 0 { return Err(DiscSmithError::IndexPosition); }
		if ! e.track.is_bare_audio() { return Err(DiscSmithError::NotBareAudio(nr)); }
		if rel < MIN_TRACK_SECTORS { return Err(DiscSmithError::TrackShort(nr)); }
		if len - rel < MIN_TRACK_SECTORS { return Err(DiscSmithError::TrackShort(nr + 1)); }
		if usize::from(MAX_TRACKS) <= self.tracks.len() {
			return Err(DiscSmithError::TrackCount);
		}

		self.transact(|toc| {
			let cur = &mut toc.tracks[idx].track;
			let marks = cur.marks_abs();
			let post = cur.end().filter(|e| rel < e.lba());

			let tail = cur.remove_to_end(cur.pos_of_sector(rel))?;
			if post.is_some() { cur.set_end(None)?; }

			let mut next = Track::new(TrackMode::Audio, SubChannelMode::None);
			next.set_flags(cur.flags());
			next.append_list(tail)?;
			for m in marks.into_iter().filter(|&m| rel < m) {
				next.add_index(Msf::from_lba(m - rel))?;
			}
			if let Some(e) = post {
				next.set_end(Some(Msf::from_lba(e.lba() - rel)))?;
			}

			toc.tracks.insert(idx + 1, TrackEntry::new(next));
			Ok(nr + 1)
		})
	}

	/// # Remove Track Marker.
	///
	/// Fold track `nr` into the one before it. Its index marks (other than
	/// index 1) carry over.
	///
	/// ## Errors
	///
	/// The first track marker cannot be removed, and both tracks must be
	/// plain audio.
	pub fn remove_track_marker(&mut self, nr: u8) -> Result<(), DiscSmithError> {
		if nr == 1 { return Err(DiscSmithError::FirstTrack); }
		let idx = self.idx(nr)?;
		self.check_bare(idx - 1..=idx)?;

		self.transact(|toc| {
			let cur = toc.tracks.remove(idx).track;
			join(&mut toc.tracks[idx - 1].track, cur)
		})
	}

	/// # Add Pregap.
	///
	/// Turn everything from the start of the track containing `lba` up to
	/// `lba` into pregap.
	///
	/// ## Errors
	///
	/// The track must not already have a pregap, and at least four seconds
	/// must remain after it.
	pub fn add_pregap(&mut self, lba: u32) -> Result<(), DiscSmithError> {
		let idx = self.find_idx(lba)?;
		let e = &self.tracks[idx];
		let nr = e.number;
		let rel = lba - e.abs_start.lba();

		if ! e.track.start().is_zero() { return Err(DiscSmithError::PregapExists(nr)); }
		if rel == 0 { return Err(DiscSmithError::IndexPosition); }
		if e.track.length().lba() - rel < MIN_TRACK_SECTORS {
			return Err(DiscSmithError::TrackShort(nr));
		}

		self.transact(|toc| toc.tracks[idx].track.move_index(1, Msf::from_lba(rel)))
	}

	/// # Add Index Marker.
	///
	/// Add an index mark at `lba`, returning the track and index numbers.
	///
	/// ## Errors
	///
	/// The position must fall after index 1 of its track.
	pub fn add_index_marker(&mut self, lba: u32) -> Result<(u8, u8), DiscSmithError> {
		let idx = self.find_idx(lba)?;
		let e = &self.tracks[idx];
		let nr = e.number;
		let rel = lba.checked_sub(e.start.lba())
			.filter(|&r| r != 0)
			.ok_or(DiscSmithError::IndexPosition)?;

		self.transact(|toc| {
			let index = toc.tracks[idx].track.add_index(Msf::from_lba(rel))?;
			Ok((nr, index))
		})
	}

	/// # Move Track Marker.
	///
	/// Move index `index` of track `nr` to `lba`.
	///
	/// Index 0 is the track boundary: moving it shifts data between this
	/// track and the one before while index 1 stays put. Index 1 normally
	/// just resizes the pregap, but moving it before the boundary pulls the
	/// boundary back with it. Other indices move within the track.
	///
	/// ## Errors
	///
	/// The first track's index 0 can never move. Boundary moves require plain
	/// audio on both sides, and leave both tracks at least four seconds long.
	pub fn move_track_marker(&mut self, nr: u8, index: u8, lba: u32)
	-> Result<(), DiscSmithError> {
		if nr == 1 && index == 0 { return Err(DiscSmithError::FirstPregap); }
		let idx = self.idx(nr)?;
		if self.leadout().lba() <= lba { return Err(DiscSmithError::Position(lba)); }

		let e = &self.tracks[idx];
		let a = e.abs_start.lba();
		let s = e.start.lba();

		match index {
			0 => {
				if s < lba { return Err(DiscSmithError::IndexPosition); }
				self.check_bare(idx - 1..=idx)?;
				if lba == a { return Ok(()); }

				self.transact(|toc| {
					let (left, right) = toc.tracks.split_at_mut(idx);
					let prev = &mut left[idx - 1].track;
					let cur = &mut right[0].track;

					if lba < a {
						let delta = a - lba;
						let pregap = cur.start();
						move_tail(prev, cur, delta, nr - 1)?;
						cur.set_start(pregap + Msf::from_lba(delta))?;
					}
					else {
						let head = cur.remove_from_start(cur.pos_of_sector(lba - a))?;
						prev.append_list(head)?;
					}

					check_min(prev, nr - 1)?;
					check_min(cur, nr)
				})
			},
			1 =>
				if a <= lba {
					self.check_bare(idx..=idx)?;
					self.transact(|toc| toc.tracks[idx].track.move_index(1, Msf::from_lba(lba - a)))
				}
				else {
					self.check_bare(idx - 1..=idx)?;
					self.transact(|toc| {
						let (left, right) = toc.tracks.split_at_mut(idx);
						let prev = &mut left[idx - 1].track;
						let cur = &mut right[0].track;

						let delta = a - lba;
						let pregap = cur.start();
						move_tail(prev, cur, delta, nr - 1)?;
						cur.set_start(pregap + Msf::from_lba(delta))?;
						cur.move_index(1, Msf::ZERO)?;

						check_min(prev, nr - 1)?;
						check_min(cur, nr)
					})
				},
			_ => {
				let rel = lba.checked_sub(s)
					.filter(|&r| r != 0)
					.ok_or(DiscSmithError::IndexPosition)?;
				self.transact(|toc| toc.tracks[idx].track.move_index(index, Msf::from_lba(rel)))
			},
		}
	}
}

/// # Data Editing.
impl Toc {
	/// # Remove Track Data.
	///
	/// Remove the samples `start..end`, returning the removed chunks. If the
	/// range crosses a track boundary, whatever survives of the last track
	/// touched is folded into the first.
	///
	/// ## Errors
	///
	/// Every track touched must be plain audio and stay at least four
	/// seconds long.
	pub fn remove_track_data(&mut self, start: u64, end: u64)
	-> Result<Vec<TrackData>, DiscSmithError> {
		if end <= start { return Err(DiscSmithError::Range); }
		let ia = self.find_sample_idx(start)?;
		let ib = self.find_sample_idx(end - 1)?;
		self.check_bare(ia..=ib)?;

		self.transact(|toc| {
			let base_b = toc.tracks[ib].abs_start.samples();
			let base_a = toc.tracks[ia].abs_start.samples();

			if ia == ib {
				let nr = toc.tracks[ia].number;
				let t = &mut toc.tracks[ia].track;
				let s = (start - base_a).min(t.length_units());
				let e = (end - base_a).min(t.length_units());
				if e <= s { return Ok(Vec::new()); }

				let out = t.remove_track_data(s, e)?;
				check_min(t, nr)?;
				return Ok(out);
			}

			// Trim the far end first so the earlier positions hold.
			let b = &mut toc.tracks[ib].track;
			let head = b.remove_from_start((end - base_b).min(b.length_units()))?;
			let a = &mut toc.tracks[ia].track;
			let mut out = a.remove_to_end((start - base_a).min(a.length_units()))?;
			for t in &toc.tracks[ia + 1..ib] { out.extend(t.track.data_list()); }
			out.extend(head);

			let mut rest: Vec<TrackEntry> = toc.tracks.drain(ia + 1..=ib).collect();
			let last = rest.pop().ok_or(DiscSmithError::Bug("missing track"))?;
			let a = &mut toc.tracks[ia];
			join(&mut a.track, last.track)?;
			check_min(&a.track, a.number)?;

			Ok(out)
		})
	}

	/// # Insert Track Data.
	///
	/// Insert the chunks at absolute sample `pos`.
	///
	/// ## Errors
	///
	/// The track at that position must be plain audio.
	pub fn insert_track_data(&mut self, pos: u64, list: Vec<TrackData>)
	-> Result<(), DiscSmithError> {
		let idx =
			if pos == self.leadout().samples() && ! self.tracks.is_empty() { self.tracks.len() - 1 }
			else { self.find_sample_idx(pos)? };
		self.check_bare(idx..=idx)?;

		self.transact(|toc| {
			let e = &mut toc.tracks[idx];
			let rel = (pos - e.abs_start.samples()).min(e.track.length_units());
			e.track.insert_track_data(rel, list)
		})
	}
}

/// # Internal.
impl Toc {
	/// # Update.
	///
	/// Recompute the track numbers and absolute addressing.
	fn update(&mut self) {
		let mut pos = 0_u32;
		for (idx, e) in (1_u8..).zip(self.tracks.iter_mut()) {
			e.number = idx;
			e.abs_start = Msf::from_lba(pos);
			e.start = e.abs_start + e.track.start();
			pos = pos.saturating_add(e.track.length().lba());
			e.end = Msf::from_lba(pos);
		}
	}

	/// # Transaction.
	fn transact<F, T>(&mut self, cb: F) -> Result<T, DiscSmithError>
	where F: FnOnce(&mut Self) -> Result<T, DiscSmithError> {
		let mut tmp = self.clone();
		let out = cb(&mut tmp)?;
		tmp.update();
		*self = tmp;
		Ok(out)
	}

	/// # Track Number to Index.
	fn idx(&self, nr: u8) -> Result<usize, DiscSmithError> {
		usize::from(nr).checked_sub(1)
			.filter(|&i| i < self.tracks.len())
			.ok_or(DiscSmithError::NoTrack(nr))
	}

	/// # Find Index (LBA).
	fn find_idx(&self, lba: u32) -> Result<usize, DiscSmithError> {
		self.tracks.iter()
			.position(|t| t.abs_start.lba() <= lba && lba < t.end.lba())
			.ok_or(DiscSmithError::Position(lba))
	}

	/// # Find Index (Sample).
	fn find_sample_idx(&self, sample: u64) -> Result<usize, DiscSmithError> {
		self.tracks.iter()
			.position(|t| t.abs_start.samples() <= sample && sample < t.end.samples())
			.ok_or_else(|| DiscSmithError::Position(Msf::from_samples(sample).lba()))
	}

	/// # Check Plain Audio.
	fn check_bare(&self, rng: std::ops::RangeInclusive<usize>) -> Result<(), DiscSmithError> {
		for t in &self.tracks[rng] {
			if ! t.track.is_bare_audio() {
				return Err(DiscSmithError::NotBareAudio(t.number));
			}
		}
		Ok(())
	}
}



/// # Check Minimum Length.
fn check_min(track: &Track, nr: u8) -> Result<(), DiscSmithError> {
	if track.length().lba() < MIN_TRACK_SECTORS { Err(DiscSmithError::TrackShort(nr)) }
	else { Ok(()) }
}

/// # Join Tracks.
///
/// Append `cur` to `prev`, carrying over its index marks (minus index 1) and
/// post-gap.
fn join(prev: &mut Track, cur: Track) -> Result<(), DiscSmithError> {
	let base = prev.length_units();
	let marks: Vec<u64> = cur.marks_abs().into_iter()
		.map(|m| base + cur.pos_of_sector(m))
		.collect();
	let post = cur.end().map(|e| base + cur.pos_of_sector(e.lba()));

	prev.set_end(None)?;
	prev.append_list(cur.data_list())?;

	let start = prev.start().lba();
	for m in marks {
		let s = prev.sector_of(m);
		if start < s { prev.add_index(Msf::from_lba(s - start))?; }
	}
	if let Some(e) = post {
		prev.set_end(Some(Msf::from_lba(prev.sector_of(e))))?;
	}

	Ok(())
}

/// # Move Tail.
///
/// Move the last `delta` sectors of `prev` to the front of `cur`. Index marks
/// are left for the caller to sort out.
fn move_tail(prev: &mut Track, cur: &mut Track, delta: u32, prev_nr: u8)
-> Result<(), DiscSmithError> {
	let cut = prev.length().lba()
		.checked_sub(delta)
		.filter(|&c| MIN_TRACK_SECTORS <= c)
		.ok_or(DiscSmithError::TrackShort(prev_nr))?;
	let tail = prev.remove_to_end(prev.pos_of_sector(cut))?;
	cur.prepend(tail)
}
