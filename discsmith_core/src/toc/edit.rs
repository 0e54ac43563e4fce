/*!
# Disc Smith: TOC Editor
*/

use crate::{
	Catalog,
	DiscSmithError,
	Toc,
	TocType,
	Track,
	TrackData,
};



/// # DIRTY: Track Layout.
pub const DIRTY_TOC: u8 =       0b0000_0001;

/// # DIRTY: Track Contents.
pub const DIRTY_TRACK: u8 =     0b0000_0010;

/// # DIRTY: Sample Data.
pub const DIRTY_SAMPLES: u8 =   0b0000_0100;

/// # DIRTY: Selection.
///
/// Sample positions held by the caller may no longer point where they did.
pub const DIRTY_SELECTION: u8 = 0b0000_1000;

/// # DIRTY: Metadata.
pub const DIRTY_META: u8 =      0b0001_0000;



#[derive(Debug, Clone, Default)]
/// # TOC Editor.
///
/// This wraps a [`Toc`], forwarding the editing methods and noting what
/// changed after each successful call. Front-ends can poll the accumulated
/// bits with [`TocEdit::take_dirty`] to decide what needs redrawing.
pub struct TocEdit {
	toc: Toc,
	dirty: u8,
}

impl From<Toc> for TocEdit {
	#[inline]
	fn from(toc: Toc) -> Self { Self { toc, dirty: 0 } }
}

/// # Helper: Forward and Flag.
macro_rules! edit {
	($fn:ident ( $( $arg:ident: $ty:ty ),* ) -> $out:ty, $flags:expr, $doc:literal) => (
		#[doc = concat!("# ", $doc, ".")]
		///
		/// ## Errors
		///
		/// Failed edits change nothing and set no bits.
		pub fn $fn(&mut self, $( $arg: $ty ),*) -> Result<$out, DiscSmithError> {
			let out = self.toc.$fn($( $arg ),*)?;
			self.dirty |= $flags;
			Ok(out)
		}
	);
}

impl TocEdit {
	#[must_use]
	/// # TOC.
	pub const fn toc(&self) -> &Toc { &self.toc }

	#[must_use]
	/// # Into Inner.
	pub fn into_inner(self) -> Toc { self.toc }

	#[must_use]
	/// # Dirty Bits.
	pub const fn dirty(&self) -> u8 { self.dirty }

	/// # Take Dirty Bits.
	///
	/// Return the accumulated bits, resetting them to zero.
	pub fn take_dirty(&mut self) -> u8 { std::mem::take(&mut self.dirty) }

	/// # Set Disc Type.
	pub fn set_kind(&mut self, kind: TocType) {
		self.toc.set_kind(kind);
		self.dirty |= DIRTY_META;
	}

	/// # Set Catalog.
	pub fn set_catalog(&mut self, catalog: Option<Catalog>) {
		self.toc.set_catalog(catalog);
		self.dirty |= DIRTY_META;
	}

	/// # Edit Track Metadata.
	///
	/// ## Errors
	///
	/// Returns an error if the track does not exist or the callback fails.
	pub fn with_track<F, T>(&mut self, nr: u8, cb: F) -> Result<T, DiscSmithError>
	where F: FnOnce(&mut Track) -> Result<T, DiscSmithError> {
		let out = self.toc.with_track(nr, cb)?;
		self.dirty |= DIRTY_TOC | DIRTY_TRACK | DIRTY_META;
		Ok(out)
	}

	edit!(append(track: Track) -> u8, DIRTY_TOC | DIRTY_TRACK | DIRTY_SAMPLES, "Append Track");
	edit!(add_track_marker(lba: u32) -> u8, DIRTY_TOC | DIRTY_TRACK, "Add Track Marker");
	edit!(remove_track_marker(nr: u8) -> (), DIRTY_TOC | DIRTY_TRACK, "Remove Track Marker");
	edit!(add_pregap(lba: u32) -> (), DIRTY_TOC | DIRTY_TRACK, "Add Pregap");
	edit!(add_index_marker(lba: u32) -> (u8, u8), DIRTY_TRACK, "Add Index Marker");
	edit!(
		move_track_marker(nr: u8, index: u8, lba: u32) -> (),
		DIRTY_TOC | DIRTY_TRACK,
		"Move Track Marker"
	);
	edit!(
		remove_track_data(start: u64, end: u64) -> Vec<TrackData>,
		DIRTY_TOC | DIRTY_TRACK | DIRTY_SAMPLES | DIRTY_SELECTION,
		"Remove Track Data"
	);
	edit!(
		insert_track_data(pos: u64, list: Vec<TrackData>) -> (),
		DIRTY_TOC | DIRTY_TRACK | DIRTY_SAMPLES | DIRTY_SELECTION,
		"Insert Track Data"
	);
}
