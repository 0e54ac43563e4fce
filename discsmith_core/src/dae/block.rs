/*!
# Disc Smith: DAE Block
*/

use crate::{
	BYTES_PER_SAMPLE,
	CD_C2_SIZE,
	CD_C2B_SIZE,
	CD_DATA_SIZE,
	CD_SUBPW_SIZE,
	CD_SUBQ_SIZE,
	DiscSmithError,
	Sample,
	SubQ,
};



#[derive(Debug, Clone)]
/// # DAE Block.
///
/// One sector's worth of audio as returned by the drive, along with its C2
/// error pointers and (optional) sub-channel data.
///
/// Each C2 bit corresponds to a data byte. Zero is good, one is bad. Because
/// a sample is four bytes, each C2 byte covers two samples; the high nibble
/// belongs to the even one, the low nibble to the odd one.
pub struct DaeBlock {
	data: [u8; CD_DATA_SIZE as usize],
	c2: [u8; CD_C2_SIZE as usize],
	sub: [u8; CD_SUBPW_SIZE as usize],
	sub_len: u8,
}

impl Default for DaeBlock {
	#[inline]
	fn default() -> Self {
		Self {
			data: [0; CD_DATA_SIZE as usize],
			c2: [0; CD_C2_SIZE as usize],
			sub: [0; CD_SUBPW_SIZE as usize],
			sub_len: 0,
		}
	}
}

impl DaeBlock {
	#[must_use]
	/// # Data.
	pub const fn data(&self) -> &[u8] { &self.data }

	/// # Data (Mutable).
	pub fn data_mut(&mut self) -> &mut [u8] { &mut self.data }

	#[must_use]
	/// # C2 Error Pointers.
	pub const fn c2(&self) -> &[u8] { &self.c2 }

	#[must_use]
	/// # Error Count.
	///
	/// Return the number of samples with at least one bad byte.
	pub fn error_count(&self) -> u16 {
		self.c2.iter().fold(0, |acc, &pair|
			acc + u16::from(0 != pair & 0b1111_0000) + u16::from(0 != pair & 0b0000_1111)
		)
	}

	#[must_use]
	/// # Clean?
	///
	/// Returns `true` if no bytes are flagged.
	pub fn is_clean(&self) -> bool { self.c2.iter().all(|&v| v == 0) }

	/// # Merge.
	///
	/// Copy every sample that is bad here but good in `other` into place,
	/// clearing its error flag. Samples that are still bad in both are left
	/// untouched.
	///
	/// Returns the number of samples repaired.
	pub fn merge(&mut self, other: &Self) -> u16 {
		let mut repaired = 0;
		for (idx, (ours, theirs)) in self.c2.iter_mut().zip(other.c2.iter()).enumerate() {
			for (mask, offset) in [(0b1111_0000_u8, 0), (0b0000_1111, 1)] {
				if 0 != *ours & mask && 0 == theirs & mask {
					let start = (idx * 2 + offset) * usize::from(BYTES_PER_SAMPLE);
					let end = start + usize::from(BYTES_PER_SAMPLE);
					self.data[start..end].copy_from_slice(&other.data[start..end]);
					*ours &= ! mask;
					repaired += 1;
				}
			}
		}
		repaired
	}

	/// # Make Bad.
	///
	/// Flag every sample. This is used when a drive can't say which bytes are
	/// broken, only that some of them are.
	pub fn make_bad(&mut self) {
		for v in &mut self.c2 { *v = 0b1111_1111; }
	}

	/// # Make Good.
	pub fn make_good(&mut self) {
		for v in &mut self.c2 { *v = 0; }
	}

	#[must_use]
	/// # Samples.
	///
	/// Return an iterator over the samples, noting which ones are flagged.
	pub const fn samples(&self) -> DaeBlockSamples {
		DaeBlockSamples {
			set: self,
			pos: 0,
		}
	}

	/// # Set C2.
	///
	/// Replace the error pointers with the ones provided. The 294-byte form is
	/// copied straight; the 296-byte form carries an extra pair of block-wide
	/// bytes on one end that has to be found and dropped.
	///
	/// An empty slice means the drive didn't send any, so everything is
	/// assumed to be fine.
	///
	/// ## Errors
	///
	/// Returns an error if the slice is some other size.
	pub fn set_c2(&mut self, new: &[u8]) -> Result<(), DiscSmithError> {
		if new.is_empty() || new.iter().all(|&v| v == 0) {
			self.make_good();
			return Ok(());
		}

		if new.len() == usize::from(CD_C2B_SIZE) {
			let last = usize::from(CD_C2B_SIZE) - 1;
			let lhs = new[0] != 0 || new[1] != 0;
			let rhs = new[last] != 0 || new[last - 1] != 0;

			// Both ends set: there's no telling which pair is the block bit.
			if lhs && rhs { self.make_bad(); }
			// Zero on the right means the block bits are leading (or absent
			// entirely, in which case it doesn't matter which zeroes go).
			else if ! rhs { self.c2.copy_from_slice(&new[2..]); }
			else { self.c2.copy_from_slice(&new[..last - 1]); }
			Ok(())
		}
		else if new.len() == usize::from(CD_C2_SIZE) {
			self.c2.copy_from_slice(new);
			Ok(())
		}
		else { Err(DiscSmithError::Bug("Invalid C2 block size")) }
	}

	/// # Set Sub-Channel.
	///
	/// Copy in formatted Q (16 bytes) or raw P-W (96 bytes) data. Anything
	/// else clears it.
	pub fn set_sub(&mut self, new: &[u8]) {
		if new.len() == usize::from(CD_SUBQ_SIZE) || new.len() == usize::from(CD_SUBPW_SIZE) {
			self.sub[..new.len()].copy_from_slice(new);
			self.sub_len = u8::try_from(new.len()).unwrap_or(0);
		}
		else { self.sub_len = 0; }
	}

	#[must_use]
	/// # Has Sub-Channel?
	pub const fn has_sub(&self) -> bool { self.sub_len != 0 }

	#[must_use]
	/// # Q Sub-Channel.
	///
	/// Returns `None` if there's no sub-channel data or it failed its CRC.
	pub fn subq(&self) -> Option<SubQ> {
		match u16::from(self.sub_len) {
			CD_SUBQ_SIZE => SubQ::from_formatted(&self.sub[..usize::from(CD_SUBQ_SIZE)]),
			CD_SUBPW_SIZE => SubQ::from_pw(&self.sub),
			_ => None,
		}
	}

	/// # Swap Bytes.
	///
	/// Flip each sixteen-bit value between little- and big-endian.
	pub fn swap(&mut self) {
		for pair in self.data.chunks_exact_mut(2) { pair.swap(0, 1); }
	}
}



#[derive(Debug)]
/// # Block Samples.
///
/// Yields each sample with a `bool` indicating whether or not it is flagged.
pub struct DaeBlockSamples<'a> {
	set: &'a DaeBlock,
	pos: usize,
}

impl Iterator for DaeBlockSamples<'_> {
	type Item = (Sample, bool);

	fn next(&mut self) -> Option<Self::Item> {
		let start = self.pos * usize::from(BYTES_PER_SAMPLE);
		let sample: Sample = self.set.data.get(start..start + usize::from(BYTES_PER_SAMPLE))?
			.try_into()
			.ok()?;
		let pair = self.set.c2[self.pos >> 1];
		let bad =
			if self.pos & 1 == 0 { 0 != pair & 0b1111_0000 }
			else { 0 != pair & 0b0000_1111 };
		self.pos += 1;
		Some((sample, bad))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let len = self.len();
		(len, Some(len))
	}
}

impl ExactSizeIterator for DaeBlockSamples<'_> {
	fn len(&self) -> usize {
		usize::from(CD_DATA_SIZE / BYTES_PER_SAMPLE).saturating_sub(self.pos)
	}
}
