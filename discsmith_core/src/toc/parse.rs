/*!
# Disc Smith: TOC Text (Parsing)
*/

use crate::{
	Catalog,
	CdText,
	CdTextKind,
	CdTextValue,
	CutMode,
	DiscSmithError,
	Isrc,
	Msf,
	SubChannelMode,
	Toc,
	TocType,
	Track,
	TrackData,
	TrackMode,
};
use std::path::Path;



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Token.
enum Token {
	/// # Bare Word (keywords, numbers, MSF).
	Word(String),

	/// # Quoted String.
	Str(String),

	/// # Open Brace.
	Open,

	/// # Close Brace.
	Close,

	/// # Comma.
	Comma,
}



impl Toc {
	/// # From Path.
	///
	/// Read and parse a TOC file. Relative file paths within are resolved
	/// against the TOC's own directory.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be read or parsed.
	pub fn from_path<P>(src: P) -> Result<Self, DiscSmithError>
	where P: AsRef<Path> {
		let src = src.as_ref();
		let raw = std::fs::read_to_string(src)
			.map_err(|_| DiscSmithError::FileRead(src.to_string_lossy().into_owned()))?;
		let base = src.parent().unwrap_or_else(|| Path::new("."));
		Self::parse_str(&raw, base)
	}

	/// # Parse String.
	///
	/// Parse TOC text. `base` is only consulted for file sources whose length
	/// is omitted, in which case the file is measured.
	///
	/// ## Errors
	///
	/// Syntax errors are returned as [`DiscSmithError::TocSyntax`] with the
	/// offending line number.
	pub fn parse_str(src: &str, base: &Path) -> Result<Self, DiscSmithError> {
		let tokens = tokenize(src)?;
		let mut parser = Parser { tokens, pos: 0, base };
		parser.toc()
	}
}



/// # Tokenize.
fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, DiscSmithError> {
	let mut out = Vec::new();
	let mut line = 1;
	let mut chars = src.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'\n' => { line += 1; },
			c if c.is_whitespace() => {},
			'/' if chars.peek() == Some(&'/') => {
				while chars.next_if(|&c| c != '\n').is_some() {}
			},
			'{' => out.push((line, Token::Open)),
			'}' => out.push((line, Token::Close)),
			',' => out.push((line, Token::Comma)),
			'"' => {
				let start = line;
				let mut s = String::new();
				loop {
					match chars.next() {
						Some('"') => break,
						Some('\\') => match chars.next() {
							Some(d @ '0'..='7') => {
								let mut v = d.to_digit(8).unwrap_or(0);
								for _ in 0..2 {
									if let Some(d) = chars.next_if(|c| ('0'..='7').contains(c)) {
										v = v * 8 + d.to_digit(8).unwrap_or(0);
									}
								}
								s.push(
									u8::try_from(v).map(char::from)
										.map_err(|_| syntax(line, "invalid escape"))?
								);
							},
							Some(c) => s.push(c),
							None => return Err(syntax(start, "unterminated string")),
						},
						Some(c) => {
							if c == '\n' { line += 1; }
							s.push(c);
						},
						None => return Err(syntax(start, "unterminated string")),
					}
				}
				out.push((start, Token::Str(s)));
			},
			c => {
				let mut s = String::from(c);
				while let Some(c) = chars.next_if(|c| ! c.is_whitespace() && ! matches!(c, '{' | '}' | ',' | '"')) {
					s.push(c);
				}
				out.push((line, Token::Word(s)));
			},
		}
	}

	Ok(out)
}

/// # Syntax Error.
fn syntax(line: usize, msg: &str) -> DiscSmithError {
	DiscSmithError::TocSyntax(line, msg.to_owned())
}



/// # Pending Track Marks.
///
/// `START`, `INDEX` and `END` are collected while the sources are read, and
/// applied once the track's data is complete.
struct Marks {
	start: Option<(usize, Msf)>,
	indices: Vec<(usize, Msf)>,
	end: Option<(usize, Msf)>,
}



/// # Parser.
struct Parser<'a> {
	tokens: Vec<(usize, Token)>,
	pos: usize,
	base: &'a Path,
}

impl Parser<'_> {
	/// # Disc.
	fn toc(&mut self) -> Result<Toc, DiscSmithError> {
		let mut toc = Toc::default();

		// Header.
		while let Some(word) = self.peek_word() {
			if word == "TRACK" { break; }
			let line = self.line();
			self.pos += 1;

			if let Some(kind) = TocType::from_keyword(&word) { toc.set_kind(kind); }
			else if word == "CATALOG" {
				let raw = self.string()?;
				let catalog = Catalog::try_from(raw.as_str())
					.map_err(|_| syntax(line, "invalid catalog number"))?;
				toc.set_catalog(Some(catalog));
			}
			else if word == "CD_TEXT" { self.cd_text(toc.cd_text_mut(), true)?; }
			else { return Err(syntax(line, &format!("unexpected {word}"))); }
		}

		// Tracks.
		while self.pos < self.tokens.len() {
			let line = self.line();
			let track = self.track()?;
			toc.append(track).map_err(|e| wrap(line, &e))?;
		}

		if toc.is_empty() { Err(syntax(self.line(), "no tracks")) }
		else { Ok(toc) }
	}

	/// # Track.
	fn track(&mut self) -> Result<Track, DiscSmithError> {
		let line = self.line();
		if self.word()? != "TRACK" { return Err(syntax(line, "expected TRACK")); }

		let mode = self.mode()?;
		let sub = self.sub_mode();
		let mut track = Track::new(mode, sub);
		let mut flags = track.flags();
		let mut marks = Marks { start: None, indices: Vec::new(), end: None };

		while let Some(word) = self.peek_word() {
			if word == "TRACK" { break; }
			let line = self.line();
			self.pos += 1;

			match word.as_str() {
				// Flags.
				"NO" => match self.word()?.as_str() {
					"COPY" => { flags = flags.with_copy(false); },
					"PRE_EMPHASIS" => { flags = flags.with_pre_emphasis(false); },
					_ => return Err(syntax(line, "expected COPY or PRE_EMPHASIS")),
				},
				"COPY" => { flags = flags.with_copy(true); },
				"PRE_EMPHASIS" => { flags = flags.with_pre_emphasis(true); },
				"TWO_CHANNEL_AUDIO" => { flags = flags.with_four_channel(false); },
				"FOUR_CHANNEL_AUDIO" => { flags = flags.with_four_channel(true); },

				// Metadata.
				"ISRC" => {
					let raw = self.string()?;
					let isrc = Isrc::try_from(raw.as_str())
						.map_err(|_| syntax(line, "invalid ISRC"))?;
					track.set_isrc(Some(isrc));
				},
				"CD_TEXT" => { self.cd_text(track.cd_text_mut(), false)?; },

				// Sources.
				"SILENCE" => {
					if ! mode.is_audio() { return Err(syntax(line, "SILENCE requires an audio track")); }
					let len = self.length(CutMode::Samples.per_sector(mode, sub))?;
					push(&mut track, line, TrackData::silence(len))?;
				},
				"ZERO" => {
					let before = self.pos;
					let (m, s) = self.chunk_mode(mode, sub);

					// Plain audio zero-fill is silence unless the track is cut
					// in bytes, or the mode was spelled out before the track
					// had a cut.
					let samples = match track.cut_mode() {
						Some(cut) => cut == CutMode::Samples,
						None => before == self.pos,
					};
					let data =
						if m.is_audio() && s.is_none() && samples {
							TrackData::silence(self.length(CutMode::Samples.per_sector(m, s))?)
						}
						else {
							TrackData::zero(m, s, self.length(CutMode::Bytes.per_sector(m, s))?)
						};
					push(&mut track, line, data)?;
				},
				"PREGAP" => {
					let msf = self.msf()?;
					let data =
						if mode.is_audio() && sub.is_none() { TrackData::silence(msf.samples()) }
						else {
							let per = CutMode::Bytes.per_sector(mode, sub);
							TrackData::zero(mode, sub, u64::from(msf.lba()) * per)
						};
					push(&mut track, line, data)?;
					marks.start.replace((line, msf));
				},
				"FILE" | "AUDIOFILE" => {
					if ! mode.is_audio() { return Err(syntax(line, "FILE requires an audio track")); }
					let data = self.audio_file(line)?;
					push(&mut track, line, data)?;
				},
				"DATAFILE" => {
					let data = self.data_file(line, mode, sub)?;
					push(&mut track, line, data)?;
				},
				"FIFO" => {
					let path = self.string()?;
					let (m, s) = self.chunk_mode(mode, sub);
					let len = self.length(CutMode::Bytes.per_sector(m, s))?;
					push(&mut track, line, TrackData::fifo(path, m, s, len))?;
				},

				// Marks.
				"START" => {
					let msf = self.opt_msf()?.unwrap_or_else(|| track.length());
					marks.start.replace((line, msf));
				},
				"END" => {
					let msf = self.opt_msf()?.unwrap_or_else(|| track.length());
					marks.end.replace((line, msf));
				},
				"INDEX" => {
					let msf = self.msf()?;
					marks.indices.push((line, msf));
				},

				_ => return Err(syntax(line, &format!("unexpected {word}"))),
			}
		}

		// Apply the marks.
		track.set_flags(flags);
		if let Some((line, start)) = marks.start {
			track.set_start(start).map_err(|e| wrap(line, &e))?;
		}
		for (line, idx) in marks.indices {
			track.add_index(idx).map_err(|e| wrap(line, &e))?;
		}
		if let Some((line, end)) = marks.end {
			track.set_end(Some(end)).map_err(|e| wrap(line, &e))?;
		}

		Ok(track)
	}

	/// # Audio File.
	///
	/// `"path" [SWAP] [#offset] start [length]`
	fn audio_file(&mut self, line: usize) -> Result<TrackData, DiscSmithError> {
		let per_sector = CutMode::Samples.per_sector(TrackMode::Audio, SubChannelMode::None);
		let unit = CutMode::Samples.unit_bytes();

		let path = self.string()?;
		let swap = self.keyword("SWAP");
		let off = self.offset()?;
		let start = self.length(per_sector)?;
		let off = off + start * unit;

		let len = match self.opt_length(per_sector)? {
			Some(len) => len,
			None => {
				let (_, total) = crate::track::data::audio_info(&self.base.join(&path))?;
				total.checked_sub(off)
					.map(|n| n / unit)
					.filter(|&n| n != 0)
					.ok_or_else(|| syntax(line, "offset is past the end of the file"))?
			},
		};

		Ok(TrackData::audio_file(path, off, len).with_swap(swap))
	}

	/// # Data File.
	///
	/// `"path" [mode [subchannel]] [#offset] [length]`
	fn data_file(&mut self, line: usize, mode: TrackMode, sub: SubChannelMode)
	-> Result<TrackData, DiscSmithError> {
		let path = self.string()?;
		let (m, s) = self.chunk_mode(mode, sub);
		let off = self.offset()?;

		let len = match self.opt_length(CutMode::Bytes.per_sector(m, s))? {
			Some(len) => len,
			None => {
				let src = self.base.join(&path);
				let total = std::fs::metadata(&src)
					.map_err(|_| DiscSmithError::FileOpen(src.to_string_lossy().into_owned()))?
					.len();
				total.checked_sub(off)
					.filter(|&n| n != 0)
					.ok_or_else(|| syntax(line, "offset is past the end of the file"))?
			},
		};

		Ok(TrackData::data_file(path, m, s, off, len))
	}

	/// # CD-TEXT Block.
	fn cd_text(&mut self, text: &mut CdText, disc: bool) -> Result<(), DiscSmithError> {
		self.open()?;
		loop {
			let line = self.line();
			match self.next() {
				Some(Token::Close) => return Ok(()),
				Some(Token::Word(w)) if w == "LANGUAGE_MAP" && disc => self.language_map(text)?,
				Some(Token::Word(w)) if w == "LANGUAGE" => {
					let block = self.number::<u8>()?;
					if CdText::MAX_BLOCK < block { return Err(syntax(line, "invalid language block")); }
					self.open()?;
					self.cd_text_items(text, block)?;
				},
				_ => return Err(syntax(line, "expected LANGUAGE")),
			}
		}
	}

	/// # CD-TEXT Items.
	fn cd_text_items(&mut self, text: &mut CdText, block: u8) -> Result<(), DiscSmithError> {
		loop {
			let line = self.line();
			let word = match self.next() {
				Some(Token::Close) => return Ok(()),
				Some(Token::Word(w)) => w,
				_ => return Err(syntax(line, "expected a CD-TEXT field")),
			};

			let kind =
				if word == "ISRC" { CdTextKind::UpcEan }
				else {
					CdTextKind::from_keyword(&word)
						.ok_or_else(|| syntax(line, &format!("unknown CD-TEXT field {word}")))?
				};

			let value = match self.next() {
				Some(Token::Str(s)) => CdTextValue::Text(s),
				Some(Token::Open) => {
					let mut v = Vec::new();
					loop {
						match self.next() {
							Some(Token::Close) => break,
							Some(Token::Comma) => {},
							Some(Token::Word(w)) => v.push(
								w.parse::<u8>().map_err(|_| syntax(line, "invalid byte"))?
							),
							_ => return Err(syntax(line, "unterminated binary value")),
						}
					}
					CdTextValue::Binary(v)
				},
				_ => return Err(syntax(line, "expected a CD-TEXT value")),
			};

			if ! text.set(block, kind, value) {
				return Err(syntax(line, &format!("invalid {kind} value")));
			}
		}
	}

	/// # Language Map.
	///
	/// `{ block : code ... }`, where the colons may or may not be
	/// surrounded by whitespace.
	fn language_map(&mut self, text: &mut CdText) -> Result<(), DiscSmithError> {
		self.open()?;

		let mut parts: Vec<(usize, String)> = Vec::new();
		loop {
			let line = self.line();
			match self.next() {
				Some(Token::Close) => break,
				Some(Token::Word(w)) => for p in w.split_inclusive(':') {
					if let Some(p) = p.strip_suffix(':') {
						if ! p.is_empty() { parts.push((line, p.to_owned())); }
						parts.push((line, ":".to_owned()));
					}
					else { parts.push((line, p.to_owned())); }
				},
				_ => return Err(syntax(line, "invalid LANGUAGE_MAP")),
			}
		}

		for chunk in parts.chunks(3) {
			let line = chunk[0].0;
			let [(_, block), (_, colon), (_, code)] = chunk else {
				return Err(syntax(line, "invalid LANGUAGE_MAP"));
			};
			if colon != ":" { return Err(syntax(line, "invalid LANGUAGE_MAP")); }

			let block = block.parse::<u8>().map_err(|_| syntax(line, "invalid language block"))?;
			let code =
				if code == "EN" { 9 }
				else { code.parse::<u8>().map_err(|_| syntax(line, "invalid language code"))? };
			if ! text.set_language(block, code) {
				return Err(syntax(line, "invalid language block"));
			}
		}

		Ok(())
	}
}

/// # Values.
impl Parser<'_> {
	/// # Current Line.
	fn line(&self) -> usize {
		self.tokens.get(self.pos)
			.or_else(|| self.tokens.last())
			.map_or(1, |(l, _)| *l)
	}

	/// # Next Token.
	fn next(&mut self) -> Option<Token> {
		let out = self.tokens.get(self.pos).map(|(_, t)| t.clone());
		if out.is_some() { self.pos += 1; }
		out
	}

	/// # Peek Word.
	fn peek_word(&self) -> Option<String> {
		match self.tokens.get(self.pos) {
			Some((_, Token::Word(w))) => Some(w.clone()),
			_ => None,
		}
	}

	/// # Optional Keyword.
	fn keyword(&mut self, word: &str) -> bool {
		if self.peek_word().is_some_and(|w| w == word) {
			self.pos += 1;
			true
		}
		else { false }
	}

	/// # Word.
	fn word(&mut self) -> Result<String, DiscSmithError> {
		let line = self.line();
		match self.next() {
			Some(Token::Word(w)) => Ok(w),
			_ => Err(syntax(line, "expected a keyword")),
		}
	}

	/// # String.
	fn string(&mut self) -> Result<String, DiscSmithError> {
		let line = self.line();
		match self.next() {
			Some(Token::Str(s)) => Ok(s),
			_ => Err(syntax(line, "expected a quoted string")),
		}
	}

	/// # Open Brace.
	fn open(&mut self) -> Result<(), DiscSmithError> {
		let line = self.line();
		if matches!(self.next(), Some(Token::Open)) { Ok(()) }
		else { Err(syntax(line, "expected {")) }
	}

	/// # Number.
	fn number<T: std::str::FromStr>(&mut self) -> Result<T, DiscSmithError> {
		let line = self.line();
		self.word()?.parse::<T>().map_err(|_| syntax(line, "expected a number"))
	}

	/// # Track Mode.
	fn mode(&mut self) -> Result<TrackMode, DiscSmithError> {
		let line = self.line();
		TrackMode::from_keyword(&self.word()?).ok_or_else(|| syntax(line, "invalid track mode"))
	}

	/// # Optional Sub-Channel Mode.
	fn sub_mode(&mut self) -> SubChannelMode {
		match self.peek_word().as_deref().and_then(SubChannelMode::from_keyword) {
			Some(sub) => {
				self.pos += 1;
				sub
			},
			None => SubChannelMode::None,
		}
	}

	/// # Optional Chunk Mode.
	///
	/// Chunks inherit the track's modes unless they say otherwise.
	fn chunk_mode(&mut self, mode: TrackMode, sub: SubChannelMode) -> (TrackMode, SubChannelMode) {
		match self.peek_word().as_deref().and_then(TrackMode::from_keyword) {
			Some(m) => {
				self.pos += 1;
				(m, self.sub_mode())
			},
			None => (mode, sub),
		}
	}

	/// # Optional Offset.
	///
	/// `#bytes`
	fn offset(&mut self) -> Result<u64, DiscSmithError> {
		let line = self.line();
		match self.peek_word().as_deref().and_then(|w| w.strip_prefix('#')) {
			Some(n) => {
				let n = n.parse::<u64>().map_err(|_| syntax(line, "invalid offset"))?;
				self.pos += 1;
				Ok(n)
			},
			None => Ok(0),
		}
	}

	/// # MSF.
	fn msf(&mut self) -> Result<Msf, DiscSmithError> {
		let line = self.line();
		self.word()?.parse::<Msf>().map_err(|_| syntax(line, "invalid MSF"))
	}

	/// # Optional MSF.
	fn opt_msf(&mut self) -> Result<Option<Msf>, DiscSmithError> {
		if self.peek_word().is_some_and(|w| w.contains(':')) { self.msf().map(Some) }
		else { Ok(None) }
	}

	/// # Length.
	///
	/// Either `mm:ss:ff` (converted to units) or a plain unit count.
	fn length(&mut self, per_sector: u64) -> Result<u64, DiscSmithError> {
		let line = self.line();
		let word = self.word()?;
		parse_length(&word, per_sector).ok_or_else(|| syntax(line, "invalid length"))
	}

	/// # Optional Length.
	fn opt_length(&mut self, per_sector: u64) -> Result<Option<u64>, DiscSmithError> {
		match self.peek_word() {
			Some(w) if w.starts_with(|c: char| c.is_ascii_digit()) =>
				self.length(per_sector).map(Some),
			_ => Ok(None),
		}
	}
}



/// # Parse Length.
fn parse_length(src: &str, per_sector: u64) -> Option<u64> {
	if src.contains(':') {
		src.parse::<Msf>().ok().map(|m| u64::from(m.lba()) * per_sector)
	}
	else { src.parse::<u64>().ok() }
}

/// # Append Chunk.
fn push(track: &mut Track, line: usize, data: TrackData) -> Result<(), DiscSmithError> {
	track.append_data(data).map_err(|e| wrap(line, &e))
}

/// # Wrap Error.
///
/// Attach a line number to a structural error raised while building the
/// disc.
fn wrap(line: usize, err: &DiscSmithError) -> DiscSmithError {
	match err {
		DiscSmithError::FileOpen(_) | DiscSmithError::FileRead(_) |
		DiscSmithError::Wave(_) => err.clone(),
		_ => {
			let msg = err.to_string();
			DiscSmithError::TocSyntax(line, msg.trim_end_matches('.').to_owned())
		},
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::SAMPLES_PER_SECTOR;
	use std::io::Write;

	const SPS: u64 = SAMPLES_PER_SECTOR as u64;

	const TOC: &str = r#"CD_DA

CATALOG "0724384960025"

CD_TEXT {
  LANGUAGE_MAP {
    0 : EN
    1:8
  }
  LANGUAGE 0 {
    TITLE "An \"Album\""
    PERFORMER "Band\\Group"
    SIZE_INFO { 0, 1, 2, 0, 10 }
  }
}

// Track 1
TRACK AUDIO
NO COPY
PRE_EMPHASIS
TWO_CHANNEL_AUDIO
ISRC "US-ABC-23-00001"
CD_TEXT {
  LANGUAGE 0 {
    TITLE "First"
  }
}
PREGAP 00:02:00
FILE "one.wav" 0 04:00:00
INDEX 01:00:00

// Track 2
TRACK AUDIO
COPY
FILE "one.wav" 04:00:00 03:00:00
SILENCE 1000
START 00:01:00
END 03:00:00
"#;

	#[test]
	fn t_parse() {
		let toc = Toc::parse_str(TOC, Path::new(".")).expect("Parse failed.");
		assert_eq!(toc.kind(), TocType::CdDa);
		assert_eq!(toc.catalog().map(|c| c.to_string()), Some("0724384960025".to_owned()));
		assert_eq!(toc.cd_text().language(0), Some(9));
		assert_eq!(toc.cd_text().language(1), Some(8));
		assert_eq!(
			toc.cd_text().get(0, CdTextKind::Title).and_then(CdTextValue::as_text),
			Some("An \"Album\""),
		);
		assert_eq!(
			toc.cd_text().get(0, CdTextKind::Performer).and_then(CdTextValue::as_text),
			Some("Band\\Group"),
		);
		assert_eq!(
			toc.cd_text().get(0, CdTextKind::SizeInfo),
			Some(&CdTextValue::Binary(vec![0, 1, 2, 0, 10])),
		);

		let tracks = toc.tracks();
		assert_eq!(tracks.len(), 2);

		// Track one: two-second pregap, then four minutes of file.
		let t = tracks[0].track();
		assert!(! t.flags().copy());
		assert!(t.flags().pre_emphasis());
		assert_eq!(t.isrc().map(|i| i.to_string()), Some("USABC2300001".to_owned()));
		assert_eq!(t.start().lba(), 150);
		assert_eq!(t.length().lba(), 150 + 4 * 60 * 75);
		assert_eq!(t.indices(), &[Msf::from_lba(75 * 60)]);

		// Track two picks up where the first left off in the same file.
		let t = tracks[1].track();
		assert!(t.flags().copy());
		let data = t.data_list();
		assert_eq!(data[0].offset(), 4 * 60 * 75 * SPS * 4);
		assert_eq!(data[1].length(), 1000);
		assert_eq!(t.start().lba(), 75);
		assert_eq!(t.end(), Some(Msf::from_lba(3 * 60 * 75)));
		assert_eq!(t.length_units(), 3 * 60 * 75 * SPS + 1000);
		assert_eq!(t.length().lba(), 3 * 60 * 75 + 2);
	}

	#[test]
	fn t_round_trip() {
		let toc = Toc::parse_str(TOC, Path::new(".")).expect("Parse failed.");
		let text = toc.to_string();
		let toc2 = Toc::parse_str(&text, Path::new(".")).expect("Reparse failed.");
		assert_eq!(toc, toc2, "Round trip changed the disc.");
		assert_eq!(text, toc2.to_string());

		let addr = |t: &Toc| -> Vec<(u32, u32, u32)> {
			t.tracks().iter()
				.map(|e| (e.abs_start().lba(), e.start().lba(), e.end().lba()))
				.collect()
		};
		assert_eq!(addr(&toc), addr(&toc2));
	}

	#[test]
	fn t_data_tracks() {
		let src = r#"CD_ROM_XA
TRACK MODE2_FORM_MIX
ZERO MODE2_FORM1 2050
ZERO MODE2_FORM2 00:00:02
DATAFILE "data.bin" #2336 00:05:00
TRACK MODE1 RW
FIFO "pipe" 2144
"#;
		let toc = Toc::parse_str(src, Path::new(".")).expect("Parse failed.");
		assert_eq!(toc.kind(), TocType::CdRomXa);

		let t = toc.tracks()[0].track();
		let data = t.data_list();
		assert_eq!(data[0].mode(), TrackMode::Mode2Form1);
		assert_eq!(data[1].length(), 2 * 2324);
		assert_eq!(data[2].mode(), TrackMode::Mode2FormMix);
		assert_eq!(data[2].offset(), 2336);
		assert_eq!(data[2].length(), 5 * 75 * 2336);

		// The 2050-byte form one run is padded out to two sectors.
		assert_eq!(t.length().lba(), 2 + 2 + 5 * 75);

		let t = toc.tracks()[1].track();
		assert_eq!(t.sub_mode(), SubChannelMode::Rw);
		assert_eq!(t.length().lba(), 1);

		// And back.
		let toc2 = Toc::parse_str(&toc.to_string(), Path::new(".")).expect("Reparse failed.");
		assert_eq!(toc, toc2);
	}

	#[test]
	fn t_audio_bytes() {
		// Audio cut in bytes keeps its zero-fill as zero-fill.
		let src = r#"CD_DA
TRACK AUDIO
ZERO AUDIO 00:00:02
DATAFILE "data.bin" 00:04:00
ZERO 2352
"#;
		let toc = Toc::parse_str(src, Path::new(".")).expect("Parse failed.");
		let t = toc.tracks()[0].track();
		assert_eq!(t.cut_mode(), Some(CutMode::Bytes));
		let data = t.data_list();
		assert_eq!(data.len(), 3);
		assert_eq!(data[0].kind(), crate::DataKind::Zero);
		assert_eq!(data[0].length(), 2 * 2352);
		assert_eq!(data[2].kind(), crate::DataKind::Zero);
		assert_eq!(data[2].length(), 2352);

		let text = toc.to_string();
		let toc2 = Toc::parse_str(&text, Path::new(".")).expect("Reparse failed.");
		assert_eq!(toc, toc2, "Round trip changed the disc.");

		// Plain audio still gets silence.
		let toc = Toc::parse_str("TRACK AUDIO\nZERO 588", Path::new(".")).expect("Parse failed.");
		let data = toc.tracks()[0].track().data_list();
		assert_eq!(data[0].kind(), crate::DataKind::Silence);
		assert_eq!(data[0].length(), 588);
	}

	#[test]
	fn t_file_length() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		std::fs::File::create(dir.path().join("a.raw"))
			.and_then(|mut f| f.write_all(&[0_u8; 588 * 4 * 10]))
			.expect("Write failed.");

		let toc = Toc::parse_str("TRACK AUDIO\nFILE \"a.raw\" 588", dir.path())
			.expect("Parse failed.");
		assert_eq!(toc.tracks()[0].track().length_units(), 588 * 9);

		assert!(matches!(
			Toc::parse_str("TRACK AUDIO\nFILE \"nope.raw\" 0", dir.path()),
			Err(DiscSmithError::FileOpen(_)),
		));
	}

	#[test]
	fn t_syntax() {
		for (src, line) in [
			("", 1),
			("CD_DA\nTRACK AUDIO\nSILENCE 1\nBOGUS", 4),
			("TRACK MODE9", 1),
			("TRACK AUDIO\n\nISRC \"nope\"", 3),
			("TRACK AUDIO\nSILENCE 00:10:00\nINDEX 00:20:00", 3),
			("TRACK MODE1\nSILENCE 10", 2),
			("TRACK AUDIO\nSILENCE 10\nCD_TEXT {\n LANGUAGE 0 {\n BOGUS \"x\" } }", 5),
			("CATALOG \"123\nTRACK AUDIO", 1),
		] {
			match Toc::parse_str(src, Path::new(".")) {
				Err(DiscSmithError::TocSyntax(n, _)) => assert_eq!(n, line, "Wrong line for {src:?}."),
				e => panic!("Expected syntax error for {src:?}, got {e:?}."),
			}
		}
	}
}
