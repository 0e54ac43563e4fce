/*!
# Disc Smith: CLI
*/

use argyle::Argument;
use dactyl::traits::BytesToUnsigned;
use discsmith_core::{
	DaeOptions,
	DiscSmithError,
	DriveFeatures,
};
use std::path::PathBuf;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Command.
pub(super) enum Command {
	/// # Rebuild the Sector Image.
	Bin,

	/// # Validate.
	Check,

	/// # Reformat.
	Fmt,

	/// # Extract Audio.
	Read,

	/// # Summarize.
	Show,
}

impl Command {
	/// # From Keyword.
	fn from_keyword(src: &str) -> Option<Self> {
		match src {
			"bin" => Some(Self::Bin),
			"check" => Some(Self::Check),
			"fmt" => Some(Self::Fmt),
			"read" => Some(Self::Read),
			"show" => Some(Self::Show),
			_ => None,
		}
	}
}



#[derive(Debug)]
/// # Parsed Settings.
pub(super) struct Settings {
	/// # Command.
	pub(super) cmd: Command,

	/// # TOC File.
	pub(super) src: Option<PathBuf>,

	/// # Output File.
	pub(super) dst: Option<PathBuf>,

	/// # Device.
	pub(super) dev: Option<String>,

	/// # Extraction Options.
	pub(super) opts: DaeOptions,
}

impl Settings {
	/// # Source or Bust.
	pub(super) fn src(&self) -> Result<&PathBuf, DiscSmithError> {
		self.src.as_ref().ok_or(DiscSmithError::CliParse("<FILE.toc>"))
	}

	/// # Destination or Bust.
	pub(super) fn dst(&self) -> Result<&PathBuf, DiscSmithError> {
		self.dst.as_ref().ok_or(DiscSmithError::CliParse("-o/--output"))
	}
}



/// # Parse Options.
pub(super) fn parse() -> Result<Settings, DiscSmithError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut cmd = None;
	let mut src = None;
	let mut dst = None;
	let mut dev = None;
	let mut opts = DaeOptions::default();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(DiscSmithError::PrintHelp),
			Argument::Key("--no-c2") => { opts = opts.with_c2(false); },
			Argument::Key("--no-subchannel") => { opts = opts.with_subchannel(false); },
			Argument::Key("-v" | "--verbose") => { opts = opts.with_verbose(true); },
			Argument::Key("-V" | "--version") => return Err(DiscSmithError::PrintVersion),

			Argument::KeyWithValue("-d" | "--dev", s) => { dev.replace(s); },
			Argument::KeyWithValue("--driver", s) => {
				let s = DriveFeatures::from_keyword(&s)
					.ok_or(DiscSmithError::CliParse("--driver"))?;
				opts = opts.with_features(s);
			},
			Argument::KeyWithValue("-o" | "--output", s) => { dst.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("--speed", s) => {
				let s = u16::btou(s.trim().as_bytes())
					.ok_or(DiscSmithError::CliParse("--speed"))?;
				opts = opts.with_speed(s);
			},
			Argument::KeyWithValue("-t" | "--track", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.filter(|n| (1..=99).contains(n))
					.ok_or(DiscSmithError::CliParse("-t/--track"))?;
				opts = opts.with_track(s);
			},

			// The first loose value is the command, the second is the file.
			Argument::Other(s) =>
				if cmd.is_none() {
					let c = Command::from_keyword(s.trim())
						.ok_or_else(|| DiscSmithError::CliArg(s.clone()))?;
					cmd.replace(c);
				}
				else if src.is_none() { src.replace(PathBuf::from(s)); }
				else { return Err(DiscSmithError::CliArg(s)); },

			_ => {},
		}
	}

	let cmd = cmd.ok_or(DiscSmithError::PrintHelp)?;
	Ok(Settings { cmd, src, dst, dev, opts })
}
