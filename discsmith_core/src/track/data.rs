/*!
# Disc Smith: Track Data
*/

use crate::{
	CutMode,
	DiscSmithError,
	SubChannelMode,
	TrackMode,
	WAVE_SPEC,
};
use std::{
	io::Seek,
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Data Kind.
pub enum DataKind {
	/// # Audio File (Raw PCM or WAV).
	FileAudio,

	/// # Binary Data File.
	FileData,

	/// # Generated Zeroes (Data).
	Zero,

	/// # Generated Silence (Audio).
	Silence,

	/// # Named Pipe.
	Fifo,
}

impl DataKind {
	#[must_use]
	/// # File-Backed?
	pub const fn is_file(self) -> bool { matches!(self, Self::FileAudio | Self::FileData | Self::Fifo) }
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Track Data.
///
/// A single payload source: a slice of a file, or a run of generated
/// silence/zeroes. Lengths are counted in the chunk's [`CutMode`] unit, i.e.
/// samples for plain audio and bytes for everything else.
///
/// For audio files, the offset is counted from the start of the sample data,
/// so WAV headers never enter into it.
pub struct TrackData {
	kind: DataKind,
	mode: TrackMode,
	sub_mode: SubChannelMode,
	cut: CutMode,
	length: u64,
	file: Option<PathBuf>,
	offset: u64,
	swap: bool,
}

/// # Constructors.
impl TrackData {
	#[must_use]
	/// # Audio File.
	///
	/// A span of `samples` stereo samples starting `offset` bytes into the
	/// file's sample data.
	pub fn audio_file<P>(file: P, offset: u64, samples: u64) -> Self
	where P: Into<PathBuf> {
		Self {
			kind: DataKind::FileAudio,
			mode: TrackMode::Audio,
			sub_mode: SubChannelMode::None,
			cut: CutMode::Samples,
			length: samples,
			file: Some(file.into()),
			offset,
			swap: false,
		}
	}

	#[must_use]
	/// # Data File.
	///
	/// A span of `bytes` bytes starting `offset` bytes into the file.
	pub fn data_file<P>(file: P, mode: TrackMode, sub_mode: SubChannelMode, offset: u64, bytes: u64)
	-> Self
	where P: Into<PathBuf> {
		Self {
			kind: DataKind::FileData,
			mode,
			sub_mode,
			cut: CutMode::Bytes,
			length: bytes,
			file: Some(file.into()),
			offset,
			swap: false,
		}
	}

	#[must_use]
	/// # FIFO.
	pub fn fifo<P>(file: P, mode: TrackMode, sub_mode: SubChannelMode, bytes: u64) -> Self
	where P: Into<PathBuf> {
		Self {
			kind: DataKind::Fifo,
			mode,
			sub_mode,
			cut: CutMode::Bytes,
			length: bytes,
			file: Some(file.into()),
			offset: 0,
			swap: false,
		}
	}

	#[must_use]
	/// # Silence.
	pub const fn silence(samples: u64) -> Self {
		Self {
			kind: DataKind::Silence,
			mode: TrackMode::Audio,
			sub_mode: SubChannelMode::None,
			cut: CutMode::Samples,
			length: samples,
			file: None,
			offset: 0,
			swap: false,
		}
	}

	#[must_use]
	/// # Zeroes.
	pub const fn zero(mode: TrackMode, sub_mode: SubChannelMode, bytes: u64) -> Self {
		Self {
			kind: DataKind::Zero,
			mode,
			sub_mode,
			cut: CutMode::Bytes,
			length: bytes,
			file: None,
			offset: 0,
			swap: false,
		}
	}

	#[must_use]
	/// # Padding.
	///
	/// Silence or zeroes, whichever suits the unit.
	pub(crate) const fn pad(mode: TrackMode, sub_mode: SubChannelMode, cut: CutMode, len: u64)
	-> Self {
		match cut {
			CutMode::Samples => Self::silence(len),
			CutMode::Bytes => Self::zero(mode, sub_mode, len),
		}
	}

	#[must_use]
	/// # With Byte Swap.
	///
	/// Audio samples stored big-endian need their bytes swapped on the way
	/// in.
	pub fn with_swap(self, swap: bool) -> Self {
		Self {
			swap,
			..self
		}
	}
}

/// # Getters.
impl TrackData {
	#[must_use]
	/// # Kind.
	pub const fn kind(&self) -> DataKind { self.kind }

	#[must_use]
	/// # Mode.
	pub const fn mode(&self) -> TrackMode { self.mode }

	#[must_use]
	/// # Sub-Channel Mode.
	pub const fn sub_mode(&self) -> SubChannelMode { self.sub_mode }

	#[must_use]
	/// # Cut Mode.
	pub const fn cut_mode(&self) -> CutMode { self.cut }

	#[must_use]
	/// # Length (in Units).
	pub const fn length(&self) -> u64 { self.length }

	#[must_use]
	/// # Length (in Bytes).
	pub const fn byte_len(&self) -> u64 { self.length * self.cut.unit_bytes() }

	#[must_use]
	/// # File.
	pub fn file(&self) -> Option<&Path> { self.file.as_deref() }

	#[must_use]
	/// # Byte Offset.
	pub const fn offset(&self) -> u64 { self.offset }

	#[must_use]
	/// # Swap Bytes?
	pub const fn swap(&self) -> bool { self.swap }

	#[must_use]
	/// # Resolve Path.
	///
	/// Relative paths are relative to the TOC file's directory.
	pub fn resolve(&self, base: &Path) -> Option<PathBuf> {
		let file = self.file.as_deref()?;
		if file.is_absolute() { Some(file.to_path_buf()) }
		else { Some(base.join(file)) }
	}
}

/// # Split/Merge.
impl TrackData {
	/// # Split.
	///
	/// Split the chunk in two at `pos` (in units), returning the halves.
	///
	/// ## Errors
	///
	/// The position must fall strictly inside the chunk, and FIFOs, being
	/// streams, cannot be split at all.
	pub fn split(&self, pos: u64) -> Result<(Self, Self), DiscSmithError> {
		if self.kind == DataKind::Fifo { return Err(DiscSmithError::Unsplittable); }
		if pos == 0 || self.length <= pos { return Err(DiscSmithError::Range); }

		let mut lhs = self.clone();
		lhs.length = pos;

		let mut rhs = self.clone();
		rhs.length = self.length - pos;
		if self.kind.is_file() {
			rhs.offset = self.offset + pos * self.cut.unit_bytes();
		}

		Ok((lhs, rhs))
	}

	#[must_use]
	/// # Can Merge?
	///
	/// Returns `true` if `next` directly continues this chunk: same kind and
	/// format, and for files, the same file picking up where this one ends.
	pub fn can_merge(&self, next: &Self) -> bool {
		if
			self.kind != next.kind ||
			self.mode != next.mode ||
			self.sub_mode != next.sub_mode ||
			self.cut != next.cut ||
			self.swap != next.swap
		{
			return false;
		}

		match self.kind {
			DataKind::Zero | DataKind::Silence => true,
			DataKind::FileAudio | DataKind::FileData =>
				self.file == next.file &&
				self.offset + self.byte_len() == next.offset,
			DataKind::Fifo => false,
		}
	}

	/// # Merge.
	///
	/// Absorb `next` into this chunk if [`TrackData::can_merge`] allows it,
	/// returning `true` if it did.
	pub fn merge(&mut self, next: &Self) -> bool {
		if self.can_merge(next) {
			self.length += next.length;
			true
		}
		else { false }
	}
}

/// # Files.
impl TrackData {
	/// # Check.
	///
	/// Make sure the backing file, if any, exists and is long enough.
	///
	/// ## Errors
	///
	/// Returns a resource error if the file is missing, unreadable, or
	/// shorter than the chunk expects.
	pub fn check(&self, base: &Path) -> Result<(), DiscSmithError> {
		let Some(path) = self.resolve(base) else { return Ok(()); };
		match self.kind {
			DataKind::FileAudio => {
				let (_, len) = audio_info(&path)?;
				if len < self.offset + self.byte_len() {
					return Err(DiscSmithError::FileShort(path.to_string_lossy().into_owned()));
				}
			},
			DataKind::FileData => {
				let len = std::fs::metadata(&path)
					.map_err(|_| DiscSmithError::FileOpen(path.to_string_lossy().into_owned()))?
					.len();
				if len < self.offset + self.byte_len() {
					return Err(DiscSmithError::FileShort(path.to_string_lossy().into_owned()));
				}
			},
			DataKind::Fifo => if ! path.exists() {
				return Err(DiscSmithError::FileOpen(path.to_string_lossy().into_owned()));
			},
			DataKind::Zero | DataKind::Silence => {},
		}

		Ok(())
	}
}



/// # Is Wave?
pub(crate) fn is_wav(path: &Path) -> bool {
	path.extension().is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// # Audio File Info.
///
/// Return the byte position where the sample data begins and its length in
/// bytes. WAV headers are parsed with `hound`; anything else is assumed to be
/// raw PCM from start to finish.
///
/// ## Errors
///
/// Returns an error if the file cannot be opened, or is a WAV of the wrong
/// format.
pub(crate) fn audio_info(path: &Path) -> Result<(u64, u64), DiscSmithError> {
	if is_wav(path) {
		let reader = hound::WavReader::open(path)
			.map_err(|_| DiscSmithError::Wave(path.to_string_lossy().into_owned()))?;

		let spec = reader.spec();
		if
			spec.channels != WAVE_SPEC.channels ||
			spec.sample_rate != WAVE_SPEC.sample_rate ||
			spec.bits_per_sample != WAVE_SPEC.bits_per_sample ||
			spec.sample_format != WAVE_SPEC.sample_format
		{
			return Err(DiscSmithError::Wave(path.to_string_lossy().into_owned()));
		}

		let len = u64::from(reader.duration()) * u64::from(crate::BYTES_PER_SAMPLE);
		let start = reader.into_inner()
			.stream_position()
			.map_err(|_| DiscSmithError::FileRead(path.to_string_lossy().into_owned()))?;
		Ok((start, len))
	}
	else {
		let len = std::fs::metadata(path)
			.map_err(|_| DiscSmithError::FileOpen(path.to_string_lossy().into_owned()))?
			.len();
		Ok((0, len))
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use std::io::Write;

	#[test]
	fn t_split() {
		let data = TrackData::audio_file("a.wav", 100, 1000);
		let (a, b) = data.split(400).expect("Split failed.");
		assert_eq!(a.length(), 400);
		assert_eq!(a.offset(), 100);
		assert_eq!(b.length(), 600);
		assert_eq!(b.offset(), 100 + 400 * 4, "The byte offset should move by samples * 4.");

		// And back again.
		let mut a = a;
		assert!(a.merge(&b), "The halves should merge.");
		assert_eq!(a, data);

		// Out of range.
		assert!(data.split(0).is_err());
		assert!(data.split(1000).is_err());

		// Generated chunks don't have offsets.
		let data = TrackData::zero(TrackMode::Mode1, SubChannelMode::None, 4096);
		let (a, b) = data.split(2048).expect("Split failed.");
		assert_eq!((a.offset(), b.offset()), (0, 0));

		// FIFOs can't be split.
		let data = TrackData::fifo("pipe", TrackMode::Mode1, SubChannelMode::None, 4096);
		assert_eq!(data.split(2048), Err(DiscSmithError::Unsplittable));
	}

	#[test]
	fn t_merge() {
		let a = TrackData::audio_file("a.raw", 0, 100);
		let b = TrackData::audio_file("a.raw", 400, 100);
		let c = TrackData::audio_file("a.raw", 404, 100);
		let d = TrackData::audio_file("b.raw", 400, 100);
		assert!(a.can_merge(&b), "Contiguous slices should merge.");
		assert!(! a.can_merge(&c), "Gapped slices should not merge.");
		assert!(! a.can_merge(&d), "Different files should not merge.");
		assert!(! a.can_merge(&b.clone().with_swap(true)), "Swap mismatch.");

		let mut s = TrackData::silence(10);
		assert!(s.merge(&TrackData::silence(20)));
		assert_eq!(s.length(), 30);
		assert!(! s.merge(&TrackData::zero(TrackMode::Audio, SubChannelMode::None, 20)));

		let f = TrackData::fifo("pipe", TrackMode::Mode1, SubChannelMode::None, 2048);
		assert!(! f.can_merge(&f.clone()), "FIFOs never merge.");
	}

	#[test]
	fn t_check() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let path = dir.path().join("data.bin");
		std::fs::File::create(&path)
			.and_then(|mut f| f.write_all(&[0_u8; 4096]))
			.expect("Write failed.");

		let ok = TrackData::data_file("data.bin", TrackMode::Mode1, SubChannelMode::None, 0, 4096);
		assert!(ok.check(dir.path()).is_ok());

		let short = TrackData::data_file("data.bin", TrackMode::Mode1, SubChannelMode::None, 2048, 4096);
		assert!(matches!(short.check(dir.path()), Err(DiscSmithError::FileShort(_))));

		let missing = TrackData::data_file("nope.bin", TrackMode::Mode1, SubChannelMode::None, 0, 1);
		assert!(matches!(missing.check(dir.path()), Err(DiscSmithError::FileOpen(_))));

		// Raw audio counts bytes as samples * 4.
		let audio = TrackData::audio_file(path.clone(), 0, 1024);
		assert!(audio.check(dir.path()).is_ok());
		let audio = TrackData::audio_file(path, 0, 1025);
		assert!(audio.check(dir.path()).is_err());
	}

	#[test]
	fn t_wav_info() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let path = dir.path().join("test.wav");
		let mut writer = hound::WavWriter::create(&path, WAVE_SPEC).expect("WAV failed.");
		for i in 0..200_i16 { writer.write_sample(i).expect("WAV write failed."); }
		writer.finalize().expect("WAV finalize failed.");

		let (start, len) = audio_info(&path).expect("WAV info failed.");
		assert_eq!(start, 44, "A plain WAV header is 44 bytes.");
		assert_eq!(len, 400, "100 stereo samples should be 400 bytes.");
	}
}
