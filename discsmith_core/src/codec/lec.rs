/*!
# Disc Smith: Layered Error Correction
*/

use crc::{
	Crc,
	CRC_32_CD_ROM_EDC,
};



/// # EDC Checksum.
const EDC: Crc<u32> = Crc::<u32>::new(&CRC_32_CD_ROM_EDC);

/// # GF(2^8) Forward/Backward Tables.
const GF: ([u8; 256], [u8; 256]) = gf_tables();

/// # Scramble Table.
///
/// The ECMA-130 LFSR output for bytes 12..2352.
const SCRAMBLE: [u8; 2340] = scramble_table();

/// # P Parity Offset.
pub(super) const P_PARITY: usize = 0x81C;

/// # Q Parity Offset.
pub(super) const Q_PARITY: usize = 0x8C8;



/// # EDC.
pub(super) fn edc(src: &[u8]) -> u32 { EDC.checksum(src) }

/// # Write EDC.
///
/// Checksum `sector[from..to]` and store the result little-endian at `to`.
pub(super) fn write_edc(sector: &mut [u8], from: usize, to: usize) {
	let crc = edc(&sector[from..to]).to_le_bytes();
	sector[to..to + 4].copy_from_slice(&crc);
}

/// # Check EDC.
pub(super) fn check_edc(sector: &[u8], from: usize, to: usize) -> bool {
	let mut crc = [0_u8; 4];
	crc.copy_from_slice(&sector[to..to + 4]);
	edc(&sector[from..to]) == u32::from_le_bytes(crc)
}

/// # Write ECC.
///
/// Compute the P and Q parity bytes for a 2352-byte sector. Mode 2 sectors
/// are computed with their header zeroed.
pub(super) fn write_ecc(sector: &mut [u8], zero_header: bool) {
	let header = zero_header.then(|| {
		let mut tmp = [0_u8; 4];
		tmp.copy_from_slice(&sector[12..16]);
		sector[12..16].fill(0);
		tmp
	});

	ecc_block(sector, 86, 24, 2, 86, P_PARITY);
	ecc_block(sector, 52, 43, 86, 88, Q_PARITY);

	if let Some(tmp) = header { sector[12..16].copy_from_slice(&tmp); }
}

/// # Check ECC.
pub(super) fn check_ecc(sector: &[u8], zero_header: bool) -> bool {
	let mut tmp = [0_u8; 2352];
	tmp.copy_from_slice(&sector[..2352]);
	write_ecc(&mut tmp, zero_header);
	tmp[P_PARITY..] == sector[P_PARITY..2352]
}

/// # Scramble (or Unscramble).
///
/// XOR bytes 12..2352 with the scramble table. The operation is its own
/// inverse.
pub(super) fn scramble(sector: &mut [u8]) {
	for (b, s) in sector[12..2352].iter_mut().zip(SCRAMBLE) { *b ^= s; }
}

/// # ECC Block.
///
/// Generate one set of Reed-Solomon parity bytes, reading the 2340 bytes
/// following the sync pattern in the interleaved order described by the
/// counts.
fn ecc_block(
	sector: &mut [u8],
	major_count: usize,
	minor_count: usize,
	major_mult: usize,
	minor_inc: usize,
	dst: usize,
) {
	let (f, b) = &GF;
	let size = major_count * minor_count;
	for major in 0..major_count {
		let mut idx = (major >> 1) * major_mult + (major & 1);
		let mut ecc_a = 0_u8;
		let mut ecc_b = 0_u8;
		for _ in 0..minor_count {
			let v = sector[12 + idx];
			idx += minor_inc;
			if idx >= size { idx -= size; }
			ecc_a ^= v;
			ecc_b ^= v;
			ecc_a = f[usize::from(ecc_a)];
		}
		ecc_a = b[usize::from(f[usize::from(ecc_a)] ^ ecc_b)];
		sector[dst + major] = ecc_a;
		sector[dst + major + major_count] = ecc_a ^ ecc_b;
	}
}



#[expect(clippy::cast_possible_truncation, reason = "False positive.")]
/// # Build GF(2^8) Tables.
const fn gf_tables() -> ([u8; 256], [u8; 256]) {
	let mut f = [0_u8; 256];
	let mut b = [0_u8; 256];
	let mut i = 0;
	while i < 256 {
		let j = (i << 1) ^ (if i & 0x80 == 0 { 0 } else { 0x11D });
		f[i] = j as u8;
		b[i ^ j] = i as u8;
		i += 1;
	}
	(f, b)
}

#[expect(clippy::cast_possible_truncation, reason = "False positive.")]
/// # Build Scramble Table.
const fn scramble_table() -> [u8; 2340] {
	let mut out = [0_u8; 2340];
	let mut shift: u16 = 1;
	let mut i = 0;
	while i < 2340 {
		let mut byte = 0_u8;
		let mut bit = 0;
		while bit < 8 {
			byte |= ((shift & 1) as u8) << bit;
			let carry = (shift & 1) ^ ((shift >> 1) & 1);
			shift = (carry << 14) | (shift >> 1);
			bit += 1;
		}
		out[i] = byte;
		i += 1;
	}
	out
}
