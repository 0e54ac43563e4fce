/*!
# Disc Smith: Sector Codec

This module translates between the logical payload a track stores and the
physical 2352-byte sector image (sync, header, sub-header, user data, parity,
scrambling) a drive exchanges. Everything here is stateless.

Public functions taking a "sector" expect the physical, scrambled image
followed by any sub-channel bytes.
*/

mod lec;
mod subq;

pub use subq::{
	QData,
	SubQ,
};
pub(crate) use subq::LEADOUT;

use crate::{
	DiscSmithError,
	Msf,
	SubChannelMode,
	TrackMode,
};



/// # Sync Pattern.
pub const SYNC: [u8; 12] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// # Physical Sector Size.
///
/// This does not include sub-channel data.
pub const SECTOR_SIZE: usize = 2352;

/// # Form 1 Sub-Header.
const SUBHEADER_FORM1: [u8; 8] = [0, 0, 0x08, 0, 0, 0, 0x08, 0];

/// # Form 2 Sub-Header.
const SUBHEADER_FORM2: [u8; 8] = [0, 0, 0x20, 0, 0, 0, 0x20, 0];

/// # Mode 1 EDC Offset.
const EDC_MODE1: usize = 0x810;

/// # Form 1 EDC Offset.
const EDC_FORM1: usize = 0x818;

/// # Form 2 EDC Offset.
const EDC_FORM2: usize = 0x92C;



#[must_use]
/// # Payload Size.
///
/// Return the number of bytes a track of this mode stores per sector,
/// sub-channel included.
pub const fn payload_size(mode: TrackMode, sub: SubChannelMode) -> usize {
	mode.block_size() as usize + sub.size() as usize
}

#[must_use]
/// # Physical Size.
///
/// Return the size of a physical sector image, sub-channel included.
pub(crate) const fn physical_size(sub: SubChannelMode) -> usize {
	SECTOR_SIZE + sub.size() as usize
}

/// # Encode.
///
/// Build the physical sector image for `payload` at `lba` (relative to the
/// start of the program area) into `out`.
///
/// Audio is copied as-is. Cooked data modes get sync, header, sub-header and
/// parity as appropriate; raw modes only have their address patched. All data
/// modes are then scrambled.
///
/// ## Errors
///
/// Returns an error if the buffers are not sized for the mode.
pub fn encode(mode: TrackMode, sub: SubChannelMode, lba: u32, payload: &[u8], out: &mut [u8])
-> Result<(), DiscSmithError> {
	encode_plain(mode, sub, lba, payload, out)?;
	if ! mode.is_audio() { lec::scramble(out); }
	Ok(())
}

/// # Encode (Unscrambled).
///
/// This is [`encode`] without the final scrambling step, producing the
/// sector as it is stored in image files.
pub(crate) fn encode_plain(
	mode: TrackMode,
	sub: SubChannelMode,
	lba: u32,
	payload: &[u8],
	out: &mut [u8],
) -> Result<(), DiscSmithError> {
	if payload.len() != payload_size(mode, sub) || out.len() != physical_size(sub) {
		return Err(DiscSmithError::SectorSize);
	}

	let block = usize::from(mode.block_size());
	let (data, extra) = payload.split_at(block);
	out[SECTOR_SIZE..].copy_from_slice(extra);

	if mode.is_audio() || mode.is_raw() {
		out[..SECTOR_SIZE].copy_from_slice(data);
		if mode.is_raw() { patch_address(out, lba)?; }
		return Ok(());
	}

	out[..12].copy_from_slice(&SYNC);
	patch_address(out, lba)?;
	out[15] = mode.header_byte();

	match mode {
		TrackMode::Mode1 => {
			out[16..EDC_MODE1].copy_from_slice(data);
			lec::write_edc(out, 0, EDC_MODE1);
			out[EDC_MODE1 + 4..lec::P_PARITY].fill(0);
			lec::write_ecc(out, false);
		},
		TrackMode::Mode2Form1 => {
			out[16..24].copy_from_slice(&SUBHEADER_FORM1);
			out[24..EDC_FORM1].copy_from_slice(data);
			lec::write_edc(out, 16, EDC_FORM1);
			lec::write_ecc(out, true);
		},
		TrackMode::Mode2Form2 => {
			out[16..24].copy_from_slice(&SUBHEADER_FORM2);
			out[24..EDC_FORM2].copy_from_slice(data);
			lec::write_edc(out, 16, EDC_FORM2);
		},
		// Mode 0, formless Mode 2, and mixed forms carry everything after
		// the header verbatim.
		_ => { out[16..SECTOR_SIZE].copy_from_slice(data); },
	}

	Ok(())
}

/// # Decode.
///
/// Strip a physical sector image back down to the payload a track of the
/// given mode stores. This is the dual of [`encode`].
///
/// ## Errors
///
/// Returns an error if the buffers are not sized for the mode.
pub fn decode(mode: TrackMode, sub: SubChannelMode, sector: &[u8], out: &mut [u8])
-> Result<(), DiscSmithError> {
	if out.len() != payload_size(mode, sub) || sector.len() != physical_size(sub) {
		return Err(DiscSmithError::SectorSize);
	}

	let mut buf = [0_u8; SECTOR_SIZE];
	buf.copy_from_slice(&sector[..SECTOR_SIZE]);
	if ! mode.is_audio() { lec::scramble(&mut buf); }

	let block = usize::from(mode.block_size());
	let (data, extra) = out.split_at_mut(block);
	extra.copy_from_slice(&sector[SECTOR_SIZE..]);
	data.copy_from_slice(&buf[user_range(mode)]);

	Ok(())
}

#[must_use]
/// # Classify.
///
/// Determine the actual mode of a physical sector image. Sectors without a
/// sync pattern are audio; `None` is returned for impossible mode bytes.
///
/// Formless Mode 2 is returned when the sub-header copies disagree.
pub fn classify(sector: &[u8]) -> Option<TrackMode> {
	let sector = unscrambled(sector)?;
	if sector[..12] != SYNC { return Some(TrackMode::Audio); }

	match sector[15] {
		0 => Some(TrackMode::Mode0),
		1 => Some(TrackMode::Mode1),
		2 =>
			if sector[16..20] != sector[20..24] { Some(TrackMode::Mode2) }
			else if 0 == sector[18] & 0x20 { Some(TrackMode::Mode2Form1) }
			else { Some(TrackMode::Mode2Form2) },
		_ => None,
	}
}

#[must_use]
/// # Verify.
///
/// Recompute the EDC (and ECC, where present) of a Mode 1 or Mode 2 Form 1/2
/// sector and report whether it matches. Form 2 sectors with an empty EDC
/// field pass.
///
/// `None` is returned for sectors that carry no checksums.
pub fn verify(sector: &[u8]) -> Option<bool> {
	let mode = classify(sector)?;
	let sector = unscrambled(sector)?;
	match mode {
		TrackMode::Mode1 => Some(
			lec::check_edc(&sector, 0, EDC_MODE1) &&
			lec::check_ecc(&sector, false)
		),
		TrackMode::Mode2Form1 => Some(
			lec::check_edc(&sector, 16, EDC_FORM1) &&
			lec::check_ecc(&sector, true)
		),
		TrackMode::Mode2Form2 => Some(
			sector[EDC_FORM2..] == [0, 0, 0, 0] ||
			lec::check_edc(&sector, 16, EDC_FORM2)
		),
		_ => None,
	}
}

/// # Patch Address.
///
/// Write the BCD absolute address for `lba` into bytes 12 through 14 of an
/// unscrambled sector. Raw sectors relocated within a track must be patched
/// before they are encoded.
///
/// ## Errors
///
/// Returns an error if the buffer is too small or the address falls beyond
/// the end of a disc.
pub fn patch_address(sector: &mut [u8], lba: u32) -> Result<(), DiscSmithError> {
	let msf = Msf::from_lba(lba);
	if ! msf.is_valid() { return Err(DiscSmithError::Position(lba)); }
	let dst = sector.get_mut(12..15).ok_or(DiscSmithError::SectorSize)?;
	dst.copy_from_slice(&msf.bcd());
	Ok(())
}



/// # User Data Range.
///
/// Return the part of an unscrambled sector a track of the given mode stores.
const fn user_range(mode: TrackMode) -> std::ops::Range<usize> {
	match mode {
		TrackMode::Audio | TrackMode::Mode1Raw | TrackMode::Mode2Raw => 0..SECTOR_SIZE,
		TrackMode::Mode1 => 16..EDC_MODE1,
		TrackMode::Mode2Form1 => 24..EDC_FORM1,
		TrackMode::Mode2Form2 => 24..EDC_FORM2,
		TrackMode::Mode0 | TrackMode::Mode2 | TrackMode::Mode2FormMix => 16..SECTOR_SIZE,
	}
}

/// # Unscrambled Copy.
fn unscrambled(sector: &[u8]) -> Option<[u8; SECTOR_SIZE]> {
	let mut buf = [0_u8; SECTOR_SIZE];
	buf.copy_from_slice(sector.get(..SECTOR_SIZE)?);
	if buf[..12] == SYNC { lec::scramble(&mut buf); }
	Some(buf)
}
