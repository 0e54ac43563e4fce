/*!
# Disc Smith: TOC Text (Writing)
*/

use crate::{
	CdText,
	CdTextValue,
	CutMode,
	DataKind,
	DiscSmithError,
	FileWriter,
	Msf,
	SAMPLES_PER_SECTOR,
	SubChannelMode,
	Toc,
	Track,
	TrackData,
	TrackMode,
};
use std::{
	fmt,
	io::Write,
	path::Path,
};



impl fmt::Display for Toc {
	/// # TOC Text.
	///
	/// Print the disc in the TOC text format. Parsing the output with
	/// [`Toc::parse_str`] yields an identical disc.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}", self.kind())?;
		if let Some(c) = self.catalog() {
			writeln!(f, "\nCATALOG \"{c}\"")?;
		}
		if ! self.cd_text().is_empty() {
			f.write_str("\n")?;
			write_cd_text(f, self.cd_text(), true)?;
		}

		for t in self.tracks() {
			writeln!(f, "\n// Track {}", t.number())?;
			write_track(f, t.track())?;
		}

		Ok(())
	}
}

impl Toc {
	/// # Save.
	///
	/// Write the TOC text to `dst`, atomically.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be written.
	pub fn save<P>(&self, dst: P) -> Result<(), DiscSmithError>
	where P: AsRef<Path> {
		let dst = dst.as_ref();
		let mut writer = FileWriter::new(dst)?;
		write!(writer.writer(), "{self}")
			.map_err(|_| DiscSmithError::Write(dst.to_string_lossy().into_owned()))?;
		writer.finish()
	}
}



/// # Write Track.
fn write_track(f: &mut fmt::Formatter<'_>, track: &Track) -> fmt::Result {
	let mode = track.mode();
	let sub = track.sub_mode();
	if sub.is_none() { writeln!(f, "TRACK {mode}")?; }
	else { writeln!(f, "TRACK {mode} {}", sub.as_str())?; }

	let flags = track.flags();
	f.write_str(if flags.copy() { "COPY\n" } else { "NO COPY\n" })?;
	if mode.is_audio() {
		f.write_str(if flags.pre_emphasis() { "PRE_EMPHASIS\n" } else { "NO PRE_EMPHASIS\n" })?;
		f.write_str(if flags.four_channel() { "FOUR_CHANNEL_AUDIO\n" } else { "TWO_CHANNEL_AUDIO\n" })?;
	}

	if let Some(isrc) = track.isrc() { writeln!(f, "ISRC \"{isrc}\"")?; }
	if ! track.cd_text().is_empty() { write_cd_text(f, track.cd_text(), false)?; }

	for data in track.data_list() { write_data(f, mode, sub, &data)?; }

	if ! track.start().is_zero() { writeln!(f, "START {}", track.start())?; }
	for idx in track.indices() { writeln!(f, "INDEX {idx}")?; }
	if let Some(end) = track.end() { writeln!(f, "END {end}")?; }

	Ok(())
}

/// # Write Chunk.
fn write_data(f: &mut fmt::Formatter<'_>, mode: TrackMode, sub: SubChannelMode, data: &TrackData)
-> fmt::Result {
	let per_sector = data.cut_mode().per_sector(data.mode(), data.sub_mode());
	let len = Length(data.length(), per_sector);
	let path = data.file().map(|p| Quoted(p.to_string_lossy().into_owned()));

	match (data.kind(), path) {
		(DataKind::FileAudio, Some(path)) => {
			write!(f, "FILE {path}")?;
			if data.swap() { f.write_str(" SWAP")?; }

			let unit = CutMode::Samples.unit_bytes();
			let off = data.offset();
			if off % unit == 0 {
				writeln!(f, " {} {len}", Length(off / unit, u64::from(SAMPLES_PER_SECTOR)))
			}
			else { writeln!(f, " #{off} 0 {len}") }
		},
		(DataKind::FileData, Some(path)) => {
			write!(f, "DATAFILE {path}")?;
			write_mode(f, mode, sub, data)?;
			if data.offset() != 0 { write!(f, " #{}", data.offset())?; }
			writeln!(f, " {len}")
		},
		(DataKind::Fifo, Some(path)) => {
			write!(f, "FIFO {path}")?;
			write_mode(f, mode, sub, data)?;
			writeln!(f, " {len}")
		},
		(DataKind::Silence, _) => writeln!(f, "SILENCE {len}"),
		(DataKind::Zero, _) => {
			f.write_str("ZERO")?;
			// Plain audio zero-fill would otherwise read back as silence.
			if data.mode().is_audio() && data.sub_mode().is_none() {
				write!(f, " {}", data.mode())?;
			}
			else { write_mode(f, mode, sub, data)?; }
			writeln!(f, " {len}")
		},
		_ => Err(fmt::Error),
	}
}

/// # Write Chunk Mode.
///
/// Chunk modes are only written when they differ from the track's.
fn write_mode(f: &mut fmt::Formatter<'_>, mode: TrackMode, sub: SubChannelMode, data: &TrackData)
-> fmt::Result {
	if data.mode() != mode || data.sub_mode() != sub {
		write!(f, " {}", data.mode())?;
		if ! data.sub_mode().is_none() { write!(f, " {}", data.sub_mode().as_str())?; }
	}
	Ok(())
}

/// # Write CD-TEXT.
fn write_cd_text(f: &mut fmt::Formatter<'_>, text: &CdText, disc: bool) -> fmt::Result {
	f.write_str("CD_TEXT {\n")?;

	if disc {
		let mut langs = text.languages().peekable();
		if langs.peek().is_some() {
			f.write_str("  LANGUAGE_MAP {\n")?;
			for (block, code) in langs { writeln!(f, "    {block} : {code}")?; }
			f.write_str("  }\n")?;
		}
	}

	for block in text.blocks() {
		writeln!(f, "  LANGUAGE {block} {{")?;
		for (_, kind, value) in text.iter().filter(|(b, _, _)| *b == block) {
			match value {
				CdTextValue::Text(s) => writeln!(f, "    {kind} {}", Quoted(s.clone()))?,
				CdTextValue::Binary(v) => {
					write!(f, "    {kind} {{")?;
					for (idx, b) in v.iter().enumerate() {
						if idx == 0 { write!(f, " {b}")?; }
						else { write!(f, ", {b}")?; }
					}
					f.write_str(" }\n")?;
				},
			}
		}
		f.write_str("  }\n")?;
	}

	f.write_str("}\n")
}



/// # Length.
///
/// A unit count, printed as `mm:ss:ff` when it lines up with whole sectors.
struct Length(u64, u64);

impl fmt::Display for Length {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Self(len, per_sector) = *self;
		if per_sector != 0 && len % per_sector == 0 {
			if let Ok(lba) = u32::try_from(len / per_sector) {
				let msf = Msf::from_lba(lba);
				if msf.is_valid() { return write!(f, "{msf}"); }
			}
		}
		write!(f, "{len}")
	}
}



/// # Quoted String.
///
/// Quotes and backslashes are escaped; control characters are written as
/// three-digit octal escapes.
struct Quoted(String);

impl fmt::Display for Quoted {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("\"")?;
		for c in self.0.chars() {
			match c {
				'"' => f.write_str("\\\"")?,
				'\\' => f.write_str("\\\\")?,
				c if c.is_ascii_control() => write!(f, "\\{:03o}", u32::from(c))?,
				c => write!(f, "{c}")?,
			}
		}
		f.write_str("\"")
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_length() {
		assert_eq!(Length(588 * 75, 588).to_string(), "00:01:00");
		assert_eq!(Length(589, 588).to_string(), "589");
		assert_eq!(Length(2048 * 2, 2048).to_string(), "00:00:02");
		assert_eq!(Length(0, 2048).to_string(), "00:00:00");
	}

	#[test]
	fn t_quoted() {
		assert_eq!(Quoted("Hello".to_owned()).to_string(), "\"Hello\"");
		assert_eq!(Quoted("a \"b\" \\c".to_owned()).to_string(), r#""a \"b\" \\c""#);
		assert_eq!(Quoted("tab\there".to_owned()).to_string(), r#""tab\011here""#);
	}
}
