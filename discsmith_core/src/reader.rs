/*!
# Disc Smith: Readers

[`TrackReader`] walks a single track sector by sector, pulling the payload
from the files (or generators) behind each chunk; [`TocReader`] chains them
together for a whole disc. Either can hand back the stored payload or run it
through the sector codec for a full physical image.
*/

use crate::{
	codec::{
		encode,
		encode_plain,
		payload_size,
		physical_size,
	},
	CutMode,
	DataKind,
	DiscSmithError,
	FileWriter,
	KillSwitch,
	Sample,
	SubChannelMode,
	Toc,
	Track,
	TrackData,
	TrackMode,
	track::data::audio_info,
};
use fyi_msg::Progless;
use std::{
	fs::File,
	io::{
		BufReader,
		ErrorKind,
		Read,
		Seek,
		SeekFrom,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Sector Info.
///
/// Details about the sector most recently read.
pub struct SectorInfo {
	lba: u32,
	track: u8,
	mode: TrackMode,
	sub_mode: SubChannelMode,
	partial: bool,
}

impl SectorInfo {
	#[must_use]
	/// # LBA.
	///
	/// The absolute position, relative to the start of the program area.
	pub const fn lba(&self) -> u32 { self.lba }

	#[must_use]
	/// # Track Number.
	///
	/// This is zero for sectors read by a standalone [`TrackReader`].
	pub const fn track(&self) -> u8 { self.track }

	#[must_use]
	/// # Mode.
	pub const fn mode(&self) -> TrackMode { self.mode }

	#[must_use]
	/// # Sub-Channel Mode.
	pub const fn sub_mode(&self) -> SubChannelMode { self.sub_mode }

	#[must_use]
	/// # Partial?
	///
	/// Returns `true` for the final sector of an audio track whose length is
	/// not a whole number of sectors. The missing tail is zero-filled.
	pub const fn partial(&self) -> bool { self.partial }
}



#[derive(Debug)]
/// # Open File.
struct OpenFile {
	path: PathBuf,
	audio: bool,
	start: u64,
	pos: u64,
	file: BufReader<File>,
}

impl OpenFile {
	/// # Open.
	fn open(path: PathBuf, kind: DataKind) -> Result<Self, DiscSmithError> {
		let audio = matches!(kind, DataKind::FileAudio);
		let start = if audio { audio_info(&path)?.0 } else { 0 };
		let file = File::open(&path)
			.map_err(|_| DiscSmithError::FileOpen(path.to_string_lossy().into_owned()))?;

		Ok(Self {
			path,
			audio,
			start,
			pos: 0,
			file: BufReader::new(file),
		})
	}

	/// # Read.
	///
	/// Fill `dst` from byte `pos` (relative to the start of the audio data
	/// for audio files). Streams ignore the position and simply read on.
	fn read(&mut self, pos: u64, stream: bool, dst: &mut [u8]) -> Result<(), DiscSmithError> {
		let pos = self.start + pos;
		if ! stream && pos != self.pos {
			self.file.seek(SeekFrom::Start(pos)).map_err(|_| self.err_read())?;
		}

		self.file.read_exact(dst).map_err(|e|
			if e.kind() == ErrorKind::UnexpectedEof {
				DiscSmithError::FileShort(self.path.to_string_lossy().into_owned())
			}
			else { self.err_read() }
		)?;

		self.pos = pos + dst.len() as u64;
		Ok(())
	}

	/// # Read Error.
	fn err_read(&self) -> DiscSmithError {
		DiscSmithError::FileRead(self.path.to_string_lossy().into_owned())
	}
}



#[derive(Debug)]
/// # Track Reader.
///
/// Read a track's payload one sector at a time. Chunk boundaries are
/// invisible to the caller; pads and generated chunks come back as zeroes.
pub struct TrackReader<'a> {
	track: &'a Track,
	base: &'a Path,
	lba: u32,
	sector: u32,
	scramble: bool,
	file: Option<OpenFile>,
	buf: Vec<u8>,
}

impl<'a> TrackReader<'a> {
	#[must_use]
	/// # New.
	///
	/// Relative file paths are resolved against `base`. The `lba` is the
	/// absolute position of the track's first sector, used for the headers of
	/// encoded data sectors.
	pub const fn new(track: &'a Track, base: &'a Path, lba: u32) -> Self {
		Self {
			track,
			base,
			lba,
			sector: 0,
			scramble: true,
			file: None,
			buf: Vec::new(),
		}
	}

	#[must_use]
	/// # With Scrambling.
	///
	/// Data sectors returned by [`TrackReader::read_sector`] are scrambled by
	/// default, matching what a drive exchanges. Disable this to get the
	/// layout used by image files.
	pub fn with_scramble(mut self, scramble: bool) -> Self {
		self.scramble = scramble;
		self
	}

	#[must_use]
	/// # Sectors.
	pub const fn sectors(&self) -> u32 { self.track.length().lba() }

	#[must_use]
	/// # Position.
	///
	/// The next sector to be read, relative to the start of the track.
	pub const fn position(&self) -> u32 { self.sector }

	/// # Seek.
	///
	/// Move to a sector relative to the start of the track. Seeking to the
	/// very end is allowed; the next read will return `None`.
	///
	/// ## Errors
	///
	/// Returns an error if the sector is past the end.
	pub fn seek(&mut self, sector: u32) -> Result<(), DiscSmithError> {
		if self.sectors() < sector {
			return Err(DiscSmithError::Position(self.lba.saturating_add(sector)));
		}
		self.sector = sector;
		Ok(())
	}

	/// # Read Payload.
	///
	/// Read the next sector's payload, as stored by the track, into `out`,
	/// returning `None` at the end of the track.
	///
	/// ## Errors
	///
	/// Returns an error if a backing file cannot be read.
	pub fn read_payload(&mut self, out: &mut Vec<u8>)
	-> Result<Option<SectorInfo>, DiscSmithError> {
		let Some((mode, sub_mode, start, end)) = self.track.sector_layout(self.sector)
		else { return Ok(None); };

		let unit = self.track.cut_mode().unwrap_or(CutMode::Bytes).unit_bytes();
		out.clear();
		out.resize(payload_size(mode, sub_mode), 0);
		let filled = self.fill(start, end, unit, out)?;

		let info = SectorInfo {
			lba: self.lba.saturating_add(self.sector),
			track: 0,
			mode,
			sub_mode,
			partial: filled < out.len(),
		};
		self.sector += 1;
		Ok(Some(info))
	}

	/// # Read Sector.
	///
	/// Read the next sector and encode it into a physical image (sub-channel
	/// included), returning `None` at the end of the track.
	///
	/// ## Errors
	///
	/// Returns an error if a backing file cannot be read.
	pub fn read_sector(&mut self, out: &mut Vec<u8>)
	-> Result<Option<SectorInfo>, DiscSmithError> {
		let mut buf = std::mem::take(&mut self.buf);
		let res = self.read_payload(&mut buf);
		let res = match res {
			Ok(Some(info)) => {
				out.clear();
				out.resize(physical_size(info.sub_mode), 0);
				let enc = if self.scramble { encode } else { encode_plain };
				enc(info.mode, info.sub_mode, info.lba, &buf, out).map(|()| Some(info))
			},
			other => other,
		};
		self.buf = buf;
		res
	}

	/// # Read Samples.
	///
	/// Read the next sector of an audio track as samples, returning `None`
	/// at the end of the track.
	///
	/// ## Errors
	///
	/// Returns an error if this isn't an audio track or a backing file cannot
	/// be read.
	pub fn read_samples(&mut self, out: &mut Vec<Sample>)
	-> Result<Option<SectorInfo>, DiscSmithError> {
		if ! self.track.mode().is_audio() || ! self.track.sub_mode().is_none() {
			return Err(DiscSmithError::SectorMode);
		}

		let mut buf = std::mem::take(&mut self.buf);
		let res = self.read_payload(&mut buf);
		if let Ok(Some(_)) = res {
			out.clear();
			out.extend(buf.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]));
		}
		self.buf = buf;
		res
	}

	/// # Fill.
	///
	/// Copy the unit range `start..end` into the front of `out`, returning
	/// the number of bytes filled.
	fn fill(&mut self, start: u64, end: u64, unit: u64, out: &mut [u8])
	-> Result<usize, DiscSmithError> {
		let track = self.track;
		for sub in track.sub_tracks() {
			if sub.end() <= start { continue; }
			if end <= sub.start() { break; }
			if sub.is_pad() { continue; }

			let from = sub.start().max(start);
			let to = sub.end().min(end);
			let dst = out
				.get_mut(to_usize((from - start) * unit)?..to_usize((to - start) * unit)?)
				.ok_or(DiscSmithError::SectorSize)?;

			let data = sub.data();
			if data.kind().is_file() {
				self.read_chunk(data, (from - sub.start()) * unit, dst)?;
				if data.swap() {
					for pair in dst.chunks_exact_mut(2) { pair.swap(0, 1); }
				}
			}
		}

		to_usize((end - start) * unit)
	}

	/// # Read Chunk.
	fn read_chunk(&mut self, data: &TrackData, rel: u64, dst: &mut [u8])
	-> Result<(), DiscSmithError> {
		let path = data.resolve(self.base).ok_or(DiscSmithError::Bug("chunk has no file"))?;
		let audio = matches!(data.kind(), DataKind::FileAudio);
		if self.file.as_ref().map_or(true, |f| f.path != path || f.audio != audio) {
			self.file = Some(OpenFile::open(path, data.kind())?);
		}

		let file = self.file.as_mut().ok_or(DiscSmithError::Bug("missing file handle"))?;
		file.read(data.offset() + rel, matches!(data.kind(), DataKind::Fifo), dst)
	}
}



#[derive(Debug)]
/// # TOC Reader.
///
/// Read an entire disc, track by track.
pub struct TocReader<'a> {
	toc: &'a Toc,
	base: &'a Path,
	idx: usize,
	scramble: bool,
	reader: Option<TrackReader<'a>>,
}

impl<'a> TocReader<'a> {
	#[must_use]
	/// # New.
	pub fn new(toc: &'a Toc, base: &'a Path) -> Self {
		let mut out = Self {
			toc,
			base,
			idx: 0,
			scramble: true,
			reader: None,
		};
		out.open(0);
		out
	}

	#[must_use]
	/// # With Scrambling.
	///
	/// See [`TrackReader::with_scramble`].
	pub fn with_scramble(mut self, scramble: bool) -> Self {
		self.scramble = scramble;
		self.reader = self.reader.map(|r| r.with_scramble(scramble));
		self
	}

	#[must_use]
	/// # Sectors.
	pub fn sectors(&self) -> u32 { self.toc.leadout().lba() }

	/// # Seek.
	///
	/// Move to an absolute sector.
	///
	/// ## Errors
	///
	/// Returns an error if the sector is not on the disc.
	pub fn seek(&mut self, lba: u32) -> Result<(), DiscSmithError> {
		let idx = self.toc.tracks().iter()
			.position(|t| t.abs_start().lba() <= lba && lba < t.end().lba())
			.ok_or(DiscSmithError::Position(lba))?;

		self.open(idx);
		let start = self.toc.tracks()[idx].abs_start().lba();
		match self.reader.as_mut() {
			Some(r) => r.seek(lba - start),
			None => Err(DiscSmithError::Position(lba)),
		}
	}

	/// # Read Payload.
	///
	/// Read the next sector's stored payload, moving on to the next track as
	/// needed. `None` is returned at the end of the disc.
	///
	/// ## Errors
	///
	/// Returns an error if a backing file cannot be read.
	pub fn read_payload(&mut self, out: &mut Vec<u8>)
	-> Result<Option<SectorInfo>, DiscSmithError> {
		self.next(|r, out| r.read_payload(out), out)
	}

	/// # Read Sector.
	///
	/// Read and encode the next sector, moving on to the next track as
	/// needed. `None` is returned at the end of the disc.
	///
	/// ## Errors
	///
	/// Returns an error if a backing file cannot be read.
	pub fn read_sector(&mut self, out: &mut Vec<u8>)
	-> Result<Option<SectorInfo>, DiscSmithError> {
		self.next(|r, out| r.read_sector(out), out)
	}

	/// # Next.
	fn next<F>(&mut self, cb: F, out: &mut Vec<u8>) -> Result<Option<SectorInfo>, DiscSmithError>
	where F: Fn(&mut TrackReader<'a>, &mut Vec<u8>) -> Result<Option<SectorInfo>, DiscSmithError> {
		while let Some(reader) = self.reader.as_mut() {
			if let Some(mut info) = cb(reader, out)? {
				info.track = self.toc.tracks()[self.idx].number();
				return Ok(Some(info));
			}
			self.open(self.idx + 1);
		}
		Ok(None)
	}

	/// # Open Track.
	fn open(&mut self, idx: usize) {
		self.idx = idx;
		self.reader = self.toc.tracks().get(idx).map(|t|
			TrackReader::new(t.track(), self.base, t.abs_start().lba())
				.with_scramble(self.scramble)
		);
	}
}



/// # Write Image.
///
/// Rebuild the raw (unscrambled) sector image of a disc and save it to
/// `dst`, returning the number of sectors written.
///
/// The job runs one sector at a time, checking the kill switch in between.
/// If it trips, nothing is saved.
///
/// ## Errors
///
/// Returns an error if a source file cannot be read, the output cannot be
/// written, or the job was aborted.
pub fn write_image<P>(
	toc: &Toc,
	base: &Path,
	dst: P,
	progress: &Progless,
	killed: KillSwitch,
) -> Result<u32, DiscSmithError>
where P: AsRef<Path> {
	let dst = dst.as_ref();
	let mut writer = FileWriter::new(dst)?;
	let mut reader = TocReader::new(toc, base).with_scramble(false);
	let _res = progress.reset(reader.sectors());

	let mut buf = Vec::new();
	let mut total = 0_u32;
	while reader.read_sector(&mut buf)?.is_some() {
		if killed.killed() {
			progress.finish();
			return Err(DiscSmithError::Killed);
		}

		writer.writer().write_all(&buf)
			.map_err(|_| DiscSmithError::Write(dst.to_string_lossy().into_owned()))?;
		total += 1;
		progress.increment();
	}

	progress.finish();
	writer.finish()?;
	Ok(total)
}



/// # Usize.
fn to_usize(v: u64) -> Result<usize, DiscSmithError> {
	usize::try_from(v).map_err(|_| DiscSmithError::SectorSize)
}
