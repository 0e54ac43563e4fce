/*!
# Disc Smith: Errors
*/

use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r#"
   ____
  / __ \    Disc Smith v"#, env!("CARGO_PKG_VERSION"), r#"
 | |  | |   Inspect, edit, rebuild and
 | |__| |   extract optical disc images.
  \____/

USAGE:
    discsmith <COMMAND> [OPTIONS] <FILE.toc>

COMMANDS:
    show              Print a summary of the tracks, indices and disc ids.
    check             Validate the TOC and the files it references.
    fmt               Reparse the TOC and print it back out to STDOUT.
    bin               Rebuild the raw sector image. Requires -o/--output.
    read              Extract audio from a physical drive (cdio builds only).
                      Requires -o/--output; the TOC argument is unused.

READ SETTINGS:
    -d, --dev <PATH>  The device path for the optical drive, like /dev/cdrom.
                      [default: auto]
        --driver <NAME>
                      The drive command set: generic, plextor, toshiba, or
                      plextor-scan. [default: generic]
        --no-c2       Do not request C2 error pointers; every read is taken
                      at face value.
        --no-subchannel
                      Skip the Q sub-channel cross-check against the table of
                      contents.
        --speed <NUM> The maximum read speed multiplier. The speed is halved
                      on errors and ramps back up after a clean stretch.
                      [default: 8; range: 1..=72]
    -t, --track <NUM> Extract a single track rather than the whole disc.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -o, --output <PATH>
                      The output file for the bin and read commands.
    -v, --verbose     Print the extraction log to STDOUT.
    -V, --version     Print version information to STDOUT and exit.

EARLY EXIT:
    Press CTRL+C to stop a long job early. The output file is only written
    when the job completes.
"#);



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Error Kind.
///
/// Every [`DiscSmithError`] falls into one of these buckets.
pub enum ErrorKind {
	/// # An edit would violate a structural invariant.
	Validation,

	/// # A track, index or address does not exist.
	NotFound,

	/// # The operation does not apply to this kind of track or sector.
	Unsupported,

	/// # The drive or its transport failed.
	Transport,

	/// # A file could not be opened, read or written.
	Resource,

	/// # Everything else.
	Other,
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum DiscSmithError {
	/// # Bug!
	Bug(&'static str),

	/// # Invalid catalog number.
	Catalog,

	/// # Invalid CD-TEXT.
	CdText,

	/// # Unable to read sector.
	CdRead(u32),

	/// # Too many failed reads.
	CdReadAbort(u32),

	/// # Mismatched sample/byte units.
	CutMode,

	/// # Invalid device.
	Device(String),

	/// # Unable to open device.
	DeviceOpen(Option<String>),

	/// # Unsupported disc.
	DiscMode,

	/// # File open.
	FileOpen(String),

	/// # File read.
	FileRead(String),

	/// # File too short.
	FileShort(String),

	/// # The first pregap cannot move.
	FirstPregap,

	/// # The first track marker cannot be removed.
	FirstTrack,

	/// # Index zero cannot move.
	IndexZero,

	/// # Invalid index position.
	IndexPosition,

	/// # Too many indices.
	IndexCount,

	/// # Invalid ISRC.
	Isrc,

	/// # User Abort.
	Killed,

	/// # Invalid MSF.
	Msf,

	/// # Missing index.
	NoIndex(u8),

	/// # Noop.
	Noop,

	/// # Missing track.
	NoTrack(u8),

	/// # Structural edits need plain audio.
	NotBareAudio(u8),

	/// # Explicit pad chunks.
	PadChunk,

	/// # Address outside the disc.
	Position(u32),

	/// # Track already has a pregap.
	PregapExists(u8),

	/// # Invalid range.
	Range,

	/// # SCSI command failure.
	Scsi(u8, u8, u8, u8),

	/// # Sector buffer size.
	SectorSize,

	/// # Unsupported sector mode.
	SectorMode,

	/// # Invalid speed.
	Speed(u16),

	/// # TOC syntax.
	TocSyntax(usize, String),

	/// # Too many (or too few) tracks.
	TrackCount,

	/// # Track too short.
	TrackShort(u8),

	/// # Invalid track start (pregap).
	TrackStart,

	/// # Chunk cannot be split.
	Unsplittable,

	/// # Unsupported wave format.
	Wave(String),

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for DiscSmithError {}

impl From<DiscSmithError> for Msg {
	#[inline]
	fn from(src: DiscSmithError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for DiscSmithError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::Catalog => f.write_str("Invalid catalog number."),
			Self::CdText => f.write_str("Invalid CD-TEXT."),
			Self::CdRead(n) => write!(f, "Read error at sector {n}."),
			Self::CdReadAbort(n) => write!(f, "Giving up on sector {n}; the drive keeps failing."),
			Self::CutMode => f.write_str("Sample- and byte-based chunks cannot share a track."),
			Self::Device(s) => write!(f, "Invalid device path {s}."),
			Self::DeviceOpen(s) =>
				if let Some(s) = s { write!(f, "Unable to open connection with {s}.") }
				else {
					f.write_str("Unable to open connection with default optical drive.")
				},
			Self::DiscMode => f.write_str("Missing or unsupported disc type."),
			Self::FileOpen(s) => write!(f, "Unable to open {s}."),
			Self::FileRead(s) => write!(f, "Unable to read {s}."),
			Self::FileShort(s) => write!(f, "{s} is shorter than the TOC expects."),
			Self::FirstPregap => f.write_str("Cannot move first pregap."),
			Self::FirstTrack => f.write_str("Cannot remove first track marker."),
			Self::IndexZero => f.write_str("Index 0 is the track boundary; move the track marker instead."),
			Self::IndexPosition => f.write_str("Invalid index position."),
			Self::IndexCount => f.write_str("A track cannot have more than 99 indices."),
			Self::Isrc => f.write_str("Invalid ISRC."),
			Self::Killed => f.write_str("User abort."),
			Self::Msf => f.write_str("Invalid MSF value."),
			Self::NoIndex(i) => write!(f, "There is no index #{i}."),
			Self::Noop => f.write_str("There's nothing to do!"),
			Self::NoTrack(n) => write!(f, "There is no track #{n}."),
			Self::NotBareAudio(n) => write!(f, "Track #{n} is not plain audio; the edit is unsupported."),
			Self::PadChunk => f.write_str("Pad chunks are managed automatically."),
			Self::Position(n) => write!(f, "Sector {n} is outside the disc."),
			Self::PregapExists(n) => write!(f, "Track #{n} already has a pregap."),
			Self::Range => f.write_str("Invalid range."),
			Self::Scsi(op, key, asc, ascq) => write!(
				f,
				"SCSI command {op:02X}h failed (sense {key:X}/{asc:02X}/{ascq:02X}).",
			),
			Self::SectorSize => f.write_str("Invalid sector buffer size."),
			Self::SectorMode => f.write_str("Unsupported sector mode."),
			Self::Speed(n) => write!(f, "Unable to set the read speed to {n}x."),
			Self::TocSyntax(n, s) => write!(f, "TOC syntax error on line {n}: {s}."),
			Self::TrackCount => f.write_str("A disc must have between 1 and 99 tracks."),
			Self::TrackShort(n) => write!(f, "Track #{n} would be shorter than four seconds."),
			Self::TrackStart => f.write_str("The pregap must end before the track does."),
			Self::Unsplittable => f.write_str("FIFO chunks cannot be split."),
			Self::Wave(s) => write!(f, "{s} is not 16-bit stereo 44.1kHz PCM."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Disc Smith v", env!("CARGO_PKG_VERSION"))),
		}
	}
}

impl DiscSmithError {
	#[must_use]
	/// # Kind.
	///
	/// Return the broad category of the error.
	pub const fn kind(&self) -> ErrorKind {
		match self {
			Self::Catalog | Self::CdText | Self::CutMode | Self::FirstPregap | Self::FirstTrack |
			Self::IndexZero | Self::IndexPosition | Self::IndexCount |
			Self::Isrc | Self::Msf | Self::PadChunk | Self::PregapExists(_) |
			Self::Range | Self::SectorSize | Self::TocSyntax(_, _) |
			Self::TrackCount | Self::TrackShort(_) | Self::TrackStart => ErrorKind::Validation,

			Self::NoIndex(_) | Self::NoTrack(_) | Self::Position(_) => ErrorKind::NotFound,

			Self::NotBareAudio(_) | Self::SectorMode | Self::Unsplittable => ErrorKind::Unsupported,

			Self::CdRead(_) | Self::CdReadAbort(_) | Self::Device(_) |
			Self::DeviceOpen(_) | Self::DiscMode | Self::Scsi(_, _, _, _) |
			Self::Speed(_) => ErrorKind::Transport,

			Self::FileOpen(_) | Self::FileRead(_) | Self::FileShort(_) |
			Self::Wave(_) | Self::Write(_) => ErrorKind::Resource,

			_ => ErrorKind::Other,
		}
	}
}
