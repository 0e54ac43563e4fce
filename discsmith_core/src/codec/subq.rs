/*!
# Disc Smith: Q Sub-Channel
*/

use crate::{
	Catalog,
	CD_SUBPW_SIZE,
	Isrc,
	Msf,
	msf::{
		from_bcd,
		to_bcd,
	},
};
use crc::{
	Crc,
	CRC_16_GSM,
};



/// # Q Checksum.
///
/// CRC-16/CCITT with the result inverted.
const QCRC: Crc<u16> = Crc::<u16>::new(&CRC_16_GSM);

/// # Lead-Out Track Number.
pub(crate) const LEADOUT: u8 = 0xAA;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Q Payload.
pub enum QData {
	/// # Position (ADR 1).
	Position {
		/// # Track Number.
		///
		/// The lead-out is reported as `0xAA`.
		track: u8,

		/// # Index Number.
		index: u8,

		/// # Track-Relative Time.
		///
		/// This counts down through a pregap.
		rel: Msf,

		/// # Absolute Position.
		abs: Msf,
	},

	/// # Media Catalog Number (ADR 2).
	Catalog(Catalog),

	/// # ISRC (ADR 3).
	Isrc(Isrc),

	/// # Anything Else.
	Other(u8),
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Q Sub-Channel.
///
/// A decoded, CRC-verified 12-byte Q block.
pub struct SubQ {
	control: u8,
	data: QData,
}

impl SubQ {
	#[must_use]
	/// # New.
	pub const fn new(control: u8, data: QData) -> Self {
		Self { control: control & 0x0F, data }
	}

	#[must_use]
	/// # From Raw Q.
	///
	/// Parse twelve bytes of Q data, returning `None` if the CRC fails or the
	/// payload is malformed.
	pub fn parse(q: &[u8; 12]) -> Option<Self> {
		if ! crc_ok(q) { return None; }

		let control = q[0] >> 4;
		let data = match q[0] & 0x0F {
			1 => {
				let track =
					if q[1] == LEADOUT { LEADOUT }
					else { from_bcd(q[1])? };
				let index = from_bcd(q[2])?;
				let rel = Msf::from_msf(from_bcd(q[3])?, from_bcd(q[4])?, from_bcd(q[5])?).ok()?;
				let abs = Msf::from_bcd([q[7], q[8], q[9]])?;
				QData::Position { track, index, rel, abs }
			},
			2 => QData::Catalog(Catalog::from_q(q)?),
			3 => QData::Isrc(Isrc::from_q(q)?),
			adr => QData::Other(adr),
		};

		Some(Self { control, data })
	}

	#[must_use]
	/// # From Formatted Q.
	///
	/// Drives return sixteen bytes of "formatted" Q; the first twelve are the
	/// raw block.
	pub fn from_formatted(src: &[u8]) -> Option<Self> {
		let q: &[u8; 12] = src.get(..12)?.try_into().ok()?;
		Self::parse(q)
	}

	#[must_use]
	/// # From Raw P-W.
	///
	/// De-interleave the Q bits (`0x40`) from ninety-six bytes of raw P-W
	/// sub-channel data, then parse.
	pub fn from_pw(src: &[u8]) -> Option<Self> {
		let src = src.get(..usize::from(CD_SUBPW_SIZE))?;
		let mut q = [0_u8; 12];
		for (i, b) in src.iter().enumerate() {
			if 0 != b & 0x40 { q[i >> 3] |= 0x80 >> (i & 7); }
		}
		Self::parse(&q)
	}

	#[must_use]
	/// # Control Nibble.
	pub const fn control(&self) -> u8 { self.control }

	#[must_use]
	/// # Data.
	pub const fn data(&self) -> QData { self.data }

	#[must_use]
	/// # Is Data Track?
	pub const fn is_data(&self) -> bool { 0 != self.control & 0b0100 }

	#[must_use]
	/// # Position.
	///
	/// Return the track, index, and absolute position if this is a position
	/// block.
	pub const fn position(&self) -> Option<(u8, u8, Msf)> {
		if let QData::Position { track, index, abs, .. } = self.data {
			Some((track, index, abs))
		}
		else { None }
	}

	#[must_use]
	/// # To Bytes.
	///
	/// Encode the block, CRC included.
	pub fn to_bytes(&self) -> [u8; 12] {
		let mut q = [0_u8; 12];
		match self.data {
			QData::Position { track, index, rel, abs } => {
				q[0] = 1;
				q[1] = if track == LEADOUT { LEADOUT } else { to_bcd(track) };
				q[2] = to_bcd(index);
				let m = u8::try_from(rel.minutes()).unwrap_or(99);
				q[3] = to_bcd(m);
				q[4] = to_bcd(rel.sec());
				q[5] = to_bcd(rel.frame());
				q[7..10].copy_from_slice(&abs.bcd());
			},
			QData::Catalog(c) => {
				q[0] = 2;
				q[1..8].copy_from_slice(&c.to_q());
			},
			QData::Isrc(i) => {
				q[0] = 3;
				q[1..9].copy_from_slice(&i.to_q());
			},
			QData::Other(adr) => { q[0] = adr & 0x0F; },
		}
		q[0] |= self.control << 4;

		let crc = QCRC.checksum(&q[..10]).to_be_bytes();
		q[10..].copy_from_slice(&crc);
		q
	}

	#[must_use]
	/// # To Raw P-W.
	///
	/// Interleave the block into the Q bits of ninety-six otherwise empty
	/// P-W bytes.
	pub fn to_pw(&self) -> [u8; 96] {
		let q = self.to_bytes();
		let mut out = [0_u8; 96];
		for (i, b) in out.iter_mut().enumerate() {
			if 0 != q[i >> 3] & (0x80 >> (i & 7)) { *b = 0x40; }
		}
		out
	}
}



/// # Q CRC Okay?
fn crc_ok(q: &[u8; 12]) -> bool {
	QCRC.checksum(&q[..10]).to_be_bytes() == [q[10], q[11]]
}
