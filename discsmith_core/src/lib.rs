/*!
# Disc Smith: Library
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod catalog;
#[cfg(feature = "cdio")] mod cdio;
mod cdtext;
mod codec;
mod dae;
mod error;
mod isrc;
mod mode;
mod msf;
mod reader;
mod toc;
mod track;
mod writer;

pub use abort::KillSwitch;
pub use catalog::Catalog;
#[cfg(feature = "cdio")]
pub use cdio::LibcdioInstance;
pub use cdtext::{
	CdText,
	CdTextKind,
	CdTextValue,
};
pub use codec::{
	classify,
	decode,
	encode,
	patch_address,
	payload_size,
	QData,
	SECTOR_SIZE,
	SubQ,
	SYNC,
	verify,
};
pub use dae::{
	BlockSink,
	DaeBlock,
	DaeBlockSamples,
	DaeDevice,
	DaeLog,
	DaeOptions,
	DaeOptionsTracks,
	DaeProgress,
	DaeStats,
	DaeWarning,
	Extractor,
	opts::{
		SPEED_MAX,
		SPEED_MIN,
	},
	PcmSink,
	READ_RETRY_MAX,
	REPAIR_RETRY_MAX,
	scsi::{
		DriveFeatures,
		ReadCommand,
		ScsiDrive,
		ScsiTransport,
		SpeedCommand,
		SubRead,
	},
	SPEED_RAMP_BLOCKS,
	WavSink,
};
pub use error::{
	DiscSmithError,
	ErrorKind,
};
pub use isrc::Isrc;
pub use mode::{
	CutMode,
	SubChannelMode,
	TrackMode,
};
pub use msf::Msf;
pub use reader::{
	SectorInfo,
	TocReader,
	TrackReader,
	write_image,
};
pub use toc::{
	DIRTY_META,
	DIRTY_SAMPLES,
	DIRTY_SELECTION,
	DIRTY_TOC,
	DIRTY_TRACK,
	Toc,
	TocEdit,
	TocType,
	TrackEntry,
};
pub use track::{
	data::{
		DataKind,
		TrackData,
	},
	sub::{
		SubTrack,
		SubTrackKind,
	},
	Track,
	TrackFlags,
};
pub use writer::FileWriter;



/// # 16-bit Stereo Sample (raw PCM bytes).
pub type Sample = [u8; 4];

/// # Bytes Per Sample.
pub const BYTES_PER_SAMPLE: u16 = 4;

/// # Bytes Per Sector.
///
/// This is the number of bytes per sector of _audio_ data. Physical sectors
/// of every mode occupy the same space.
pub const BYTES_PER_SECTOR: u16 = SAMPLES_PER_SECTOR * BYTES_PER_SAMPLE;

/// # Samples per sector.
pub const SAMPLES_PER_SECTOR: u16 = 588;

/// # Frames (Sectors) Per Second.
pub const FRAMES_PER_SECOND: u8 = 75;

/// # Size of C2 block.
///
/// Note: some drives support a 296-byte variation with an extra block bit, but
/// such drives should also support the 294-bit version, and that extra bit is
/// redundant.
pub const CD_C2_SIZE: u16 = 294;

/// # Size of C2 block with block bit.
pub const CD_C2B_SIZE: u16 = 296;

/// # Size of data block.
pub const CD_DATA_SIZE: u16 = BYTES_PER_SECTOR;

/// # Size of a formatted Q sub-channel block.
pub const CD_SUBQ_SIZE: u16 = 16;

/// # Size of a raw P-W sub-channel block.
pub const CD_SUBPW_SIZE: u16 = 96;

/// # Number of lead-in sectors.
///
/// All discs have a 2-second region at the start before any data. Physical
/// sector headers and Q sub-channel absolute times include it; everything
/// else in this crate is relative to the start of the program area.
pub const CD_LEADIN: u16 = 150;

/// # Maximum Tracks.
pub const MAX_TRACKS: u8 = 99;

/// # Maximum Index Marks (per track).
///
/// Index 1 is the track start; the marks cover indices 2 through 99.
pub const MAX_INDICES: u8 = 98;

/// # Minimum Track Length (in sectors).
///
/// Four seconds.
pub const MIN_TRACK_SECTORS: u32 = 4 * FRAMES_PER_SECOND as u32;

/// # Null sample.
///
/// Audio CD silence is typically literally nothing.
pub const NULL_SAMPLE: Sample = [0, 0, 0, 0];

/// # Wave Spec.
pub(crate) const WAVE_SPEC: hound::WavSpec = hound::WavSpec {
	channels: 2,
	sample_rate: 44100,
	bits_per_sample: 16,
	sample_format: hound::SampleFormat::Int,
};
