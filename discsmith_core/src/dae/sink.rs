/*!
# Disc Smith: Block Sinks
*/

use crate::{
	DiscSmithError,
	WAVE_SPEC,
};
use hound::WavWriter;
use std::io::{
	Seek,
	Write,
};



/// # Block Sink.
///
/// Somewhere for extracted audio to go. Blocks arrive in disc order, one
/// 2352-byte sector at a time.
pub trait BlockSink {
	/// # Write Block.
	///
	/// ## Errors
	///
	/// Returns an error if the data can't be written.
	fn write_block(&mut self, data: &[u8]) -> Result<(), DiscSmithError>;

	/// # Raw?
	///
	/// Byte-swapping only applies to raw sinks; containers like WAV have
	/// their own ideas about endianness.
	fn is_raw(&self) -> bool { true }
}



#[derive(Debug)]
/// # Raw PCM Sink.
///
/// Write the samples straight through.
pub struct PcmSink<W: Write>(W);

impl<W: Write> From<W> for PcmSink<W> {
	#[inline]
	fn from(src: W) -> Self { Self(src) }
}

impl<W: Write> BlockSink for PcmSink<W> {
	fn write_block(&mut self, data: &[u8]) -> Result<(), DiscSmithError> {
		self.0.write_all(data)
			.map_err(|_| DiscSmithError::Write("PCM stream".to_owned()))
	}
}

impl<W: Write> PcmSink<W> {
	/// # Into Inner.
	pub fn into_inner(self) -> W { self.0 }
}



/// # WAV Sink.
///
/// Write the samples to a 16-bit stereo WAV.
pub struct WavSink<W: Write + Seek>(WavWriter<W>);

impl<W: Write + Seek> std::fmt::Debug for WavSink<W> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WavSink")
			.field("duration", &self.0.duration())
			.finish()
	}
}

impl<W: Write + Seek> BlockSink for WavSink<W> {
	fn write_block(&mut self, data: &[u8]) -> Result<(), DiscSmithError> {
		// In CD contexts, a sample is one L+R pair; hound counts each channel
		// separately.
		for pair in data.chunks_exact(2) {
			self.0.write_sample(i16::from_le_bytes([pair[0], pair[1]]))
				.map_err(|_| DiscSmithError::Write("WAV stream".to_owned()))?;
		}
		Ok(())
	}

	fn is_raw(&self) -> bool { false }
}

impl<W: Write + Seek> WavSink<W> {
	/// # New.
	///
	/// ## Errors
	///
	/// Returns an error if the header can't be written.
	pub fn new(dst: W) -> Result<Self, DiscSmithError> {
		WavWriter::new(dst, WAVE_SPEC)
			.map(Self)
			.map_err(|_| DiscSmithError::Write("WAV stream".to_owned()))
	}

	/// # Finish.
	///
	/// Patch the header sizes and flush.
	///
	/// ## Errors
	///
	/// Returns an error if the header can't be updated.
	pub fn finish(self) -> Result<(), DiscSmithError> {
		self.0.finalize()
			.map_err(|_| DiscSmithError::Write("WAV stream".to_owned()))
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn t_pcm() {
		let mut sink = PcmSink::from(Vec::new());
		assert!(sink.is_raw());
		sink.write_block(&[1, 2, 3, 4]).expect("Write failed.");
		sink.write_block(&[5, 6, 7, 8]).expect("Write failed.");
		assert_eq!(sink.into_inner(), [1, 2, 3, 4, 5, 6, 7, 8]);
	}

	#[test]
	fn t_wav() {
		let mut buf = Cursor::new(Vec::new());
		{
			let mut sink = WavSink::new(&mut buf).expect("WAV failed.");
			assert!(! sink.is_raw());
			sink.write_block(&[1, 0, 2, 0, 3, 0, 4, 0]).expect("Write failed.");
			sink.finish().expect("Finish failed.");
		}

		buf.set_position(0);
		let mut reader = hound::WavReader::new(buf).expect("Reader failed.");
		assert_eq!(reader.spec(), WAVE_SPEC);
		assert_eq!(reader.duration(), 2, "Expected two stereo samples.");
		let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.expect("Sample failed.")).collect();
		assert_eq!(samples, [1, 2, 3, 4]);
	}
}
