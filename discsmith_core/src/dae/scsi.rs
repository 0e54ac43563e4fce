/*!
# Disc Smith: SCSI
*/

use crate::{
	CD_C2_SIZE,
	CD_DATA_SIZE,
	CD_SUBPW_SIZE,
	CD_SUBQ_SIZE,
	DaeBlock,
	DiscSmithError,
	Msf,
	SAMPLES_PER_SECTOR,
	SubChannelMode,
	Toc,
	TocType,
	Track,
	TrackData,
	TrackFlags,
	TrackMode,
};



/// # READ TOC.
const OP_READ_TOC: u8 = 0x43;

/// # MODE SENSE (10).
const OP_MODE_SENSE: u8 = 0x5A;

/// # MODE SELECT (10).
const OP_MODE_SELECT: u8 = 0x55;

/// # Mode Parameter Header Size.
const MODE_HEADER_SIZE: usize = 8;

/// # Kilobytes Per Second (1x).
const SPEED_UNIT: u16 = 176;

/// # Lead-Out (READ TOC).
const TOC_LEADOUT: u8 = 0xAA;



/// # SCSI Transport.
///
/// This is the whole of what the library needs from an operating system's
/// pass-through interface: send a command block, move some bytes, and report
/// sense data when it fails.
pub trait ScsiTransport {
	/// # Send Command.
	///
	/// Send `cdb`, along with `data_out` if writing, filling `data_in` if
	/// reading. Returns `true` on success.
	///
	/// When `silent` is `true`, the transport should keep any diagnostics of
	/// its own to itself; the caller expects the command might fail.
	fn send_cmd(
		&mut self,
		cdb: &[u8],
		data_out: Option<&[u8]>,
		data_in: Option<&mut [u8]>,
		silent: bool,
	) -> bool;

	/// # Sense Data.
	///
	/// Return the sense data from the most recent failed command.
	fn sense(&mut self) -> Vec<u8>;
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Read Command.
pub enum ReadCommand {
	/// # MMC READ CD (`0xBE`).
	ReadCd,

	/// # Plextor READ CD-DA (`0xD8`).
	PlextorCdda,

	/// # READ (10) (`0x28`).
	///
	/// Requires the block size to be switched to 2352 with MODE SELECT.
	Read10,
}

impl ReadCommand {
	#[must_use]
	/// # Opcode.
	pub const fn opcode(self) -> u8 {
		match self {
			Self::ReadCd => 0xBE,
			Self::PlextorCdda => 0xD8,
			Self::Read10 => 0x28,
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Sub-Channel Read Format.
pub enum SubRead {
	/// # None.
	None,

	/// # Formatted Q (16 Bytes).
	Q16,

	/// # Raw P-W (96 Bytes).
	Pw96,
}

impl SubRead {
	#[must_use]
	/// # Size (Bytes).
	pub const fn size(self) -> u16 {
		match self {
			Self::None => 0,
			Self::Q16 => CD_SUBQ_SIZE,
			Self::Pw96 => CD_SUBPW_SIZE,
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Speed Command.
pub enum SpeedCommand {
	/// # MMC SET CD SPEED (`0xBB`).
	SetCdSpeed,

	/// # The Drive Can't Be Told.
	None,
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Drive Features.
///
/// The handful of things that differ from one drive family to the next.
pub struct DriveFeatures {
	read: ReadCommand,
	c2: bool,
	sub: SubRead,
	speed: SpeedCommand,
}

impl DriveFeatures {
	/// # Generic MMC Drive.
	pub const GENERIC: Self = Self {
		read: ReadCommand::ReadCd,
		c2: true,
		sub: SubRead::Q16,
		speed: SpeedCommand::SetCdSpeed,
	};

	/// # Plextor.
	pub const PLEXTOR: Self = Self {
		read: ReadCommand::PlextorCdda,
		c2: false,
		sub: SubRead::Q16,
		speed: SpeedCommand::SetCdSpeed,
	};

	/// # Plextor (Raw Sub-Channel Scan).
	pub const PLEXTOR_SCAN: Self = Self {
		read: ReadCommand::ReadCd,
		c2: true,
		sub: SubRead::Pw96,
		speed: SpeedCommand::SetCdSpeed,
	};

	/// # Toshiba.
	pub const TOSHIBA: Self = Self {
		read: ReadCommand::Read10,
		c2: false,
		sub: SubRead::None,
		speed: SpeedCommand::None,
	};

	#[must_use]
	/// # From Keyword.
	///
	/// Parse `generic`, `plextor`, `plextor-scan` or `toshiba`.
	pub fn from_keyword(src: &str) -> Option<Self> {
		match src.trim().to_ascii_lowercase().as_str() {
			"generic" => Some(Self::GENERIC),
			"plextor" => Some(Self::PLEXTOR),
			"plextor-scan" => Some(Self::PLEXTOR_SCAN),
			"toshiba" => Some(Self::TOSHIBA),
			_ => None,
		}
	}

	#[must_use]
	/// # Without C2.
	pub const fn without_c2(self) -> Self {
		Self { c2: false, ..self }
	}

	#[must_use]
	/// # Without Sub-Channel.
	pub const fn without_sub(self) -> Self {
		Self { sub: SubRead::None, ..self }
	}

	#[must_use]
	/// # Read Command.
	pub const fn read_command(&self) -> ReadCommand { self.read }

	#[must_use]
	/// # C2 Supported?
	pub const fn c2(&self) -> bool { self.c2 }

	#[must_use]
	/// # Sub-Channel Format.
	///
	/// READ (10) can't return sub-channel data regardless.
	pub const fn sub_read(&self) -> SubRead {
		if matches!(self.read, ReadCommand::Read10) { SubRead::None }
		else { self.sub }
	}

	#[must_use]
	/// # Speed Command.
	pub const fn speed_command(&self) -> SpeedCommand { self.speed }

	#[must_use]
	/// # Bytes Per Sector.
	///
	/// The size of each sector in a read response.
	pub const fn sector_size(&self) -> usize {
		let c2 = if self.has_c2() { CD_C2_SIZE } else { 0 };
		(CD_DATA_SIZE + c2 + self.sub_read().size()) as usize
	}

	/// # C2 Included?
	///
	/// Only READ CD can return C2 pointers.
	const fn has_c2(&self) -> bool {
		self.c2 && matches!(self.read, ReadCommand::ReadCd)
	}
}



#[derive(Debug)]
/// # SCSI Drive.
///
/// An optical drive behind a [`ScsiTransport`], speaking whichever dialect
/// its [`DriveFeatures`] call for.
pub struct ScsiDrive<T: ScsiTransport> {
	transport: T,
	features: DriveFeatures,
	buf: Vec<u8>,
}

impl<T: ScsiTransport> ScsiDrive<T> {
	/// # New.
	///
	/// Drives reading with READ (10) are switched to 2352-byte audio blocks
	/// straight away.
	///
	/// ## Errors
	///
	/// Returns an error if the block size can't be changed.
	pub fn new(transport: T, features: DriveFeatures) -> Result<Self, DiscSmithError> {
		let mut out = Self {
			transport,
			features,
			buf: Vec::new(),
		};

		if matches!(features.read_command(), ReadCommand::Read10) {
			let mut params = [0_u8; MODE_HEADER_SIZE + 8];
			params[7] = 8; // Block descriptor length.
			params[MODE_HEADER_SIZE] = 0x82; // CD-DA density.
			params[MODE_HEADER_SIZE + 5..].copy_from_slice(&u32::from(CD_DATA_SIZE).to_be_bytes()[1..]);
			out.mode_select(&params)?;
		}

		Ok(out)
	}

	#[must_use]
	/// # Features.
	pub const fn features(&self) -> DriveFeatures { self.features }

	#[must_use]
	/// # Transport.
	pub const fn transport(&self) -> &T { &self.transport }

	/// # Send.
	///
	/// Send a command, converting failures into errors with the sense data
	/// attached.
	fn send(
		&mut self,
		cdb: &[u8],
		data_out: Option<&[u8]>,
		data_in: Option<&mut [u8]>,
		silent: bool,
	) -> Result<(), DiscSmithError> {
		if self.transport.send_cmd(cdb, data_out, data_in, silent) { Ok(()) }
		else {
			let sense = self.transport.sense();
			let (key, asc, ascq) =
				if 14 <= sense.len() { (sense[2] & 0x0F, sense[12], sense[13]) }
				else { (0, 0, 0) };
			Err(DiscSmithError::Scsi(cdb.first().copied().unwrap_or(0), key, asc, ascq))
		}
	}

	/// # Read Blocks.
	///
	/// Read `blocks.len()` consecutive audio sectors starting at `lba`, filling
	/// in the data, C2 and sub-channel bits as supported.
	///
	/// ## Errors
	///
	/// Returns an error if the command fails.
	pub fn read_blocks(&mut self, lba: u32, blocks: &mut [DaeBlock])
	-> Result<(), DiscSmithError> {
		let count = u32::try_from(blocks.len()).map_err(|_| DiscSmithError::Range)?;
		if count == 0 { return Ok(()); }

		let size = self.features.sector_size();
		let has_c2 = self.features.has_c2();
		let sub = usize::from(self.features.sub_read().size());

		let mut cdb = [0_u8; 12];
		cdb[0] = self.features.read_command().opcode();
		cdb[2..6].copy_from_slice(&lba.to_be_bytes());
		let cdb: &[u8] = match self.features.read_command() {
			ReadCommand::ReadCd => {
				cdb[1] = 0b0000_0100; // CD-DA only.
				cdb[6..9].copy_from_slice(&count.to_be_bytes()[1..]);
				cdb[9] = 0b0001_0000 | if has_c2 { 0b0000_0010 } else { 0 };
				cdb[10] = match self.features.sub_read() {
					SubRead::None => 0,
					SubRead::Q16 => 2,
					SubRead::Pw96 => 1,
				};
				&cdb
			},
			ReadCommand::PlextorCdda => {
				cdb[6..10].copy_from_slice(&count.to_be_bytes());
				cdb[10] = match self.features.sub_read() {
					SubRead::None => 0,
					SubRead::Q16 => 1,
					SubRead::Pw96 => 2,
				};
				&cdb
			},
			ReadCommand::Read10 => {
				let count = u16::try_from(count).map_err(|_| DiscSmithError::Range)?;
				cdb[7..9].copy_from_slice(&count.to_be_bytes());
				&cdb[..10]
			},
		};

		let mut buf = std::mem::take(&mut self.buf);
		buf.resize(size * blocks.len(), 0);
		let res = self.send(cdb, None, Some(&mut buf), false);
		if res.is_ok() {
			for (raw, block) in buf.chunks_exact(size).zip(blocks.iter_mut()) {
				let (data, rest) = raw.split_at(usize::from(CD_DATA_SIZE));
				block.data_mut().copy_from_slice(data);
				let (c2, rest) =
					if has_c2 { rest.split_at(usize::from(CD_C2_SIZE)) }
					else { (&[] as &[u8], rest) };
				block.set_c2(c2)?;
				block.set_sub(&rest[..sub]);
			}
		}
		self.buf = buf;
		res
	}

	/// # Set Speed.
	///
	/// Set the read speed as a multiple of 1x (176 kB/s). Drives without a
	/// speed command quietly ignore this.
	///
	/// ## Errors
	///
	/// Returns an error if the drive rejects the command.
	pub fn set_speed(&mut self, speed: u16) -> Result<(), DiscSmithError> {
		if matches!(self.features.speed_command(), SpeedCommand::None) { return Ok(()); }

		let kbs = speed.saturating_mul(SPEED_UNIT);
		let mut cdb = [0_u8; 12];
		cdb[0] = 0xBB;
		cdb[2..4].copy_from_slice(&kbs.to_be_bytes());
		cdb[4] = 0xFF;
		cdb[5] = 0xFF;
		self.send(&cdb, None, None, false).map_err(|_| DiscSmithError::Speed(speed))
	}

	/// # Mode Sense.
	///
	/// Return the requested mode page, minus the parameter header and any
	/// block descriptors.
	///
	/// ## Errors
	///
	/// Returns an error if the command fails or the response is malformed.
	pub fn mode_sense(&mut self, page: u8) -> Result<Vec<u8>, DiscSmithError> {
		let mut buf = vec![0_u8; 256];
		let len = u16::try_from(buf.len()).map_err(|_| DiscSmithError::Range)?;
		let mut cdb = [0_u8; 10];
		cdb[0] = OP_MODE_SENSE;
		cdb[1] = 0b0000_1000; // No block descriptors, please.
		cdb[2] = page & 0x3F;
		cdb[7..9].copy_from_slice(&len.to_be_bytes());
		self.send(&cdb, None, Some(&mut buf), true)?;

		let total = usize::from(u16::from_be_bytes([buf[0], buf[1]])) + 2;
		let desc = usize::from(u16::from_be_bytes([buf[6], buf[7]]));
		let start = MODE_HEADER_SIZE + desc;
		buf.get(start..total.min(buf.len()))
			.filter(|page| ! page.is_empty())
			.map(<[u8]>::to_vec)
			.ok_or(DiscSmithError::Scsi(OP_MODE_SENSE, 0, 0, 0))
	}

	/// # Mode Select.
	///
	/// Send a complete parameter list (header, block descriptors and pages).
	///
	/// ## Errors
	///
	/// Returns an error if the command fails.
	pub fn mode_select(&mut self, params: &[u8]) -> Result<(), DiscSmithError> {
		let len = u16::try_from(params.len()).map_err(|_| DiscSmithError::Range)?;
		let mut cdb = [0_u8; 10];
		cdb[0] = OP_MODE_SELECT;
		cdb[1] = 0b0001_0000; // Page format.
		cdb[7..9].copy_from_slice(&len.to_be_bytes());
		self.send(&cdb, Some(params), None, false)
	}

	/// # Read TOC.
	///
	/// Build a [`Toc`] from the drive's table of contents. Audio tracks are
	/// filled with silence and data tracks with zeroes; the layout is what
	/// matters here, not the content.
	///
	/// A gap before the first track becomes track one's pregap.
	///
	/// ## Errors
	///
	/// Returns an error if the command fails or the response doesn't make
	/// sense.
	pub fn read_toc(&mut self) -> Result<Toc, DiscSmithError> {
		let mut buf = vec![0_u8; 4 + 8 * 100];
		let len = u16::try_from(buf.len()).map_err(|_| DiscSmithError::Range)?;
		let mut cdb = [0_u8; 10];
		cdb[0] = OP_READ_TOC;
		cdb[7..9].copy_from_slice(&len.to_be_bytes());
		self.send(&cdb, None, Some(&mut buf), false)?;

		let total = (usize::from(u16::from_be_bytes([buf[0], buf[1]])) + 2).min(buf.len());
		let entries = buf.get(4..total).ok_or(DiscSmithError::DiscMode)?;

		// Track number, control, start.
		let mut list: Vec<(u8, u8, u32)> = Vec::with_capacity(entries.len() / 8);
		for e in entries.chunks_exact(8) {
			list.push((e[2], e[1] & 0x0F, u32::from_be_bytes([e[4], e[5], e[6], e[7]])));
		}

		// The lead-out has to be last.
		match list.last() {
			Some((TOC_LEADOUT, _, _)) if 2 <= list.len() => {},
			_ => return Err(DiscSmithError::DiscMode),
		}

		let mut toc = Toc::new(TocType::CdDa);
		let mut any_data = false;
		for pair in list.windows(2) {
			let (_, control, start) = pair[0];
			let (_, _, end) = pair[1];
			let len = end.checked_sub(start).ok_or(DiscSmithError::DiscMode)?;
			let first = toc.is_empty();
			let pregap = if first { start } else { 0 };
			let total = len + pregap;

			let data = 0 != control & 0b0100;
			let mut track =
				if data {
					any_data = true;
					let mut t = Track::new(TrackMode::Mode1, SubChannelMode::None);
					t.append_data(TrackData::zero(
						TrackMode::Mode1,
						SubChannelMode::None,
						u64::from(total) * u64::from(TrackMode::Mode1.block_size()),
					))?;
					t
				}
				else {
					let mut t = Track::new(TrackMode::Audio, SubChannelMode::None);
					t.append_data(TrackData::silence(u64::from(total) * u64::from(SAMPLES_PER_SECTOR)))?;
					t
				};

			if pregap != 0 { track.set_start(Msf::from_lba(pregap))?; }
			track.set_flags(
				TrackFlags::default()
					.with_copy(0 != control & 0b0010)
					.with_pre_emphasis(! data && 0 != control & 0b0001)
					.with_four_channel(! data && 0 != control & 0b1000)
			);
			toc.append(track)?;
		}

		if any_data { toc.set_kind(TocType::CdRom); }
		Ok(toc)
	}
}



#[cfg(test)]
pub(crate) mod test {
	use super::*;
	use std::collections::VecDeque;

	#[derive(Debug, Default)]
	/// # Scripted Transport.
	///
	/// Each command pops the next response: `Some(bytes)` succeeds, filling
	/// the input buffer; `None` fails.
	pub(crate) struct Scripted {
		pub(crate) cdbs: Vec<Vec<u8>>,
		pub(crate) outs: Vec<Vec<u8>>,
		pub(crate) responses: VecDeque<Option<Vec<u8>>>,
	}

	impl ScsiTransport for Scripted {
		fn send_cmd(
			&mut self,
			cdb: &[u8],
			data_out: Option<&[u8]>,
			data_in: Option<&mut [u8]>,
			_silent: bool,
		) -> bool {
			self.cdbs.push(cdb.to_vec());
			if let Some(out) = data_out { self.outs.push(out.to_vec()); }
			match self.responses.pop_front() {
				Some(Some(res)) => {
					if let Some(dst) = data_in {
						let len = dst.len().min(res.len());
						dst[..len].copy_from_slice(&res[..len]);
					}
					true
				},
				_ => false,
			}
		}

		fn sense(&mut self) -> Vec<u8> {
			let mut out = vec![0_u8; 18];
			out[0] = 0x70;
			out[2] = 0x03;
			out[12] = 0x11;
			out[13] = 0x05;
			out
		}
	}

	#[test]
	fn t_features() {
		assert_eq!(DriveFeatures::from_keyword("Plextor-Scan"), Some(DriveFeatures::PLEXTOR_SCAN));
		assert_eq!(DriveFeatures::from_keyword("nope"), None);
		assert_eq!(DriveFeatures::GENERIC.sector_size(), 2352 + 294 + 16);
		assert_eq!(DriveFeatures::PLEXTOR.sector_size(), 2352 + 16);
		assert_eq!(DriveFeatures::PLEXTOR_SCAN.sector_size(), 2352 + 294 + 96);
		assert_eq!(DriveFeatures::TOSHIBA.sector_size(), 2352);
		assert_eq!(DriveFeatures::GENERIC.without_c2().without_sub().sector_size(), 2352);
	}

	#[test]
	fn t_read_blocks() {
		// Two sectors: the first clean, the second with a bad sample.
		let size = DriveFeatures::GENERIC.sector_size();
		let mut res = vec![0_u8; size * 2];
		res[..2352].fill(1);
		res[size..size + 2352].fill(2);
		res[size + 2352] = 0b1111_0000;

		let transport = Scripted {
			responses: VecDeque::from([Some(res), None]),
			..Scripted::default()
		};
		let mut drive = ScsiDrive::new(transport, DriveFeatures::GENERIC).expect("Drive failed.");
		let mut blocks = vec![DaeBlock::default(); 2];
		drive.read_blocks(300, &mut blocks).expect("Read failed.");

		assert_eq!(
			drive.transport().cdbs[0],
			[0xBE, 0x04, 0, 0, 0x01, 0x2C, 0, 0, 2, 0x12, 2, 0],
		);
		assert!(blocks[0].is_clean());
		assert!(blocks[0].data().iter().all(|&v| v == 1));
		assert_eq!(blocks[1].error_count(), 1);
		assert!(blocks[1].data().iter().all(|&v| v == 2));
		assert!(blocks[1].has_sub());

		// And a failure.
		assert_eq!(
			drive.read_blocks(0, &mut blocks[..1]),
			Err(DiscSmithError::Scsi(0xBE, 0x03, 0x11, 0x05)),
		);
	}

	#[test]
	fn t_toshiba() {
		let transport = Scripted {
			responses: VecDeque::from([Some(Vec::new()), Some(vec![7_u8; 2352])]),
			..Scripted::default()
		};
		let mut drive = ScsiDrive::new(transport, DriveFeatures::TOSHIBA).expect("Drive failed.");

		// The block size should have been set.
		assert_eq!(drive.transport().cdbs[0][0], OP_MODE_SELECT);
		assert_eq!(
			drive.transport().outs[0],
			[0, 0, 0, 0, 0, 0, 0, 8, 0x82, 0, 0, 0, 0, 0, 0x09, 0x30],
		);

		let mut blocks = vec![DaeBlock::default(); 1];
		drive.read_blocks(1, &mut blocks).expect("Read failed.");
		assert_eq!(drive.transport().cdbs[1], [0x28, 0, 0, 0, 0, 1, 0, 0, 1, 0]);
		assert!(blocks[0].is_clean());
		assert!(! blocks[0].has_sub());

		// No speed command; nothing should be sent.
		drive.set_speed(4).expect("Speed failed.");
		assert_eq!(drive.transport().cdbs.len(), 2);
	}

	#[test]
	fn t_speed() {
		let transport = Scripted {
			responses: VecDeque::from([Some(Vec::new()), None]),
			..Scripted::default()
		};
		let mut drive = ScsiDrive::new(transport, DriveFeatures::GENERIC).expect("Drive failed.");
		drive.set_speed(8).expect("Speed failed.");
		assert_eq!(&drive.transport().cdbs[0][..6], &[0xBB, 0, 0x05, 0x80, 0xFF, 0xFF]);
		assert_eq!(drive.set_speed(4), Err(DiscSmithError::Speed(4)));
	}

	#[test]
	fn t_mode_sense() {
		let mut res = vec![0_u8; 8 + 4];
		res[1] = 10; // Length, less the two length bytes.
		res[8..].copy_from_slice(&[0x2A, 2, 0xAB, 0xCD]);
		let transport = Scripted {
			responses: VecDeque::from([Some(res)]),
			..Scripted::default()
		};
		let mut drive = ScsiDrive::new(transport, DriveFeatures::GENERIC).expect("Drive failed.");
		assert_eq!(drive.mode_sense(0x2A), Ok(vec![0x2A, 2, 0xAB, 0xCD]));
		assert_eq!(drive.transport().cdbs[0][..3], [OP_MODE_SENSE, 0x08, 0x2A]);
	}

	#[test]
	fn t_read_toc() {
		// Two audio tracks and a data track, with a one-second gap before the
		// first.
		let mut res = vec![0_u8; 4];
		for (nr, control, start) in [(1_u8, 0_u8, 75_u32), (2, 2, 20_000), (3, 4, 40_000), (TOC_LEADOUT, 4, 50_000)] {
			res.extend_from_slice(&[0, 0x10 | control, nr, 0]);
			res.extend_from_slice(&start.to_be_bytes());
		}
		let len = u16::try_from(res.len() - 2).expect("Length failed.");
		res[..2].copy_from_slice(&len.to_be_bytes());
		res[2] = 1;
		res[3] = 3;

		let transport = Scripted {
			responses: VecDeque::from([Some(res)]),
			..Scripted::default()
		};
		let mut drive = ScsiDrive::new(transport, DriveFeatures::GENERIC).expect("Drive failed.");
		let toc = drive.read_toc().expect("TOC failed.");

		assert_eq!(toc.kind(), TocType::CdRom);
		assert_eq!(toc.tracks().len(), 3);
		let t1 = &toc.tracks()[0];
		assert_eq!(t1.abs_start(), Msf::ZERO);
		assert_eq!(t1.start(), Msf::from_lba(75), "The gap should be a pregap.");
		assert_eq!(toc.tracks()[1].start(), Msf::from_lba(20_000));
		assert!(toc.tracks()[1].track().flags().copy());
		assert_eq!(toc.tracks()[2].track().mode(), TrackMode::Mode1);
		assert_eq!(toc.leadout(), Msf::from_lba(50_000));

		// An empty response is no good.
		let transport = Scripted {
			responses: VecDeque::from([Some(vec![0, 2, 0, 0])]),
			..Scripted::default()
		};
		let mut drive = ScsiDrive::new(transport, DriveFeatures::GENERIC).expect("Drive failed.");
		assert_eq!(drive.read_toc(), Err(DiscSmithError::DiscMode));
	}
}
