/*!
# Disc Smith: File Writer
*/

use crate::DiscSmithError;
use std::{
	io::{
		BufWriter,
		Seek,
		SeekFrom,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
};
use tempfile::NamedTempFile;



/// # Buffer Size.
const BUFFER_SIZE: usize = 64 * 1024;



#[derive(Debug)]
/// # File Writer.
///
/// Output is written to a temporary file in the destination's directory and
/// only moved into place by [`FileWriter::finish`], so an aborted job never
/// leaves a half-written file behind.
pub struct FileWriter {
	dst: PathBuf,
	file: BufWriter<NamedTempFile>,
}

impl Write for FileWriter {
	#[inline]
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.file.write(buf) }

	#[inline]
	fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.file.write_all(buf) }

	#[inline]
	fn flush(&mut self) -> std::io::Result<()> { self.file.flush() }
}

impl Seek for FileWriter {
	#[inline]
	/// # Seek.
	///
	/// WAV headers are patched after the fact.
	fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> { self.file.seek(pos) }
}

impl FileWriter {
	/// # New.
	///
	/// ## Errors
	///
	/// Returns an error if the destination's directory does not exist or
	/// is not writable.
	pub fn new<P>(dst: P) -> Result<Self, DiscSmithError>
	where P: AsRef<Path> {
		let dst = dst.as_ref();
		let err = || DiscSmithError::Write(dst.to_string_lossy().into_owned());

		let dir = match dst.parent() {
			Some(p) if ! p.as_os_str().is_empty() => p,
			_ => Path::new("."),
		};
		if dst.is_dir() || ! dir.is_dir() { return Err(err()); }

		let file = NamedTempFile::new_in(dir).map_err(|_| err())?;
		Ok(Self {
			dst: dst.to_path_buf(),
			file: BufWriter::with_capacity(BUFFER_SIZE, file),
		})
	}

	/// # Writer.
	pub fn writer(&mut self) -> &mut BufWriter<NamedTempFile> { &mut self.file }

	/// # Finish.
	///
	/// Flush the buffer and move the file into place.
	///
	/// ## Errors
	///
	/// Returns an error if the data cannot be flushed or the file cannot be
	/// moved.
	pub fn finish(self) -> Result<(), DiscSmithError> {
		let Self { dst, file } = self;
		let err = || DiscSmithError::Write(dst.to_string_lossy().into_owned());

		let file = file.into_inner().map_err(|_| err())?;
		file.persist(&dst).map_err(|_| err())?;
		Ok(())
	}
}
