/*!
# Disc Smith: Digital Audio Extraction
*/

mod block;
mod log;
pub(super) mod opts;
pub(super) mod scsi;
mod sink;

pub use block::{
	DaeBlock,
	DaeBlockSamples,
};
pub use log::{
	DaeLog,
	DaeWarning,
};
pub use opts::{
	DaeOptions,
	DaeOptionsTracks,
};
pub use sink::{
	BlockSink,
	PcmSink,
	WavSink,
};

use crate::{
	codec::LEADOUT,
	DiscSmithError,
	ErrorKind,
	KillSwitch,
	QData,
	Toc,
	TrackEntry,
};
use fyi_msg::Progless;
use scsi::{
	ScsiDrive,
	ScsiTransport,
};
use std::ops::Range;



/// # Repair Retries.
///
/// Once a damaged block's re-reads exceed this many, the best of what was
/// gathered is written as-is.
pub const REPAIR_RETRY_MAX: u8 = 80;

/// # Speed Ramp.
///
/// The number of consecutive clean blocks required before the read speed is
/// doubled back up.
pub const SPEED_RAMP_BLOCKS: u32 = 1000;

/// # First-Read Retries.
///
/// The number of times a transport failure is tolerated when first reading a
/// block before the whole extraction is aborted.
pub const READ_RETRY_MAX: u8 = 10;



/// # DAE Device.
///
/// Anything that can read audio sectors.
pub trait DaeDevice {
	/// # Read Blocks.
	///
	/// Fill `blocks` with consecutive sectors starting at `lba`.
	///
	/// ## Errors
	///
	/// Returns an error if the read fails.
	fn read_blocks(&mut self, lba: u32, blocks: &mut [DaeBlock]) -> Result<(), DiscSmithError>;

	/// # Set Speed.
	///
	/// ## Errors
	///
	/// Returns an error if the drive won't change speed.
	fn set_speed(&mut self, speed: u16) -> Result<(), DiscSmithError>;
}

impl<T: ScsiTransport> DaeDevice for ScsiDrive<T> {
	#[inline]
	fn read_blocks(&mut self, lba: u32, blocks: &mut [DaeBlock]) -> Result<(), DiscSmithError> {
		Self::read_blocks(self, lba, blocks)
	}

	#[inline]
	fn set_speed(&mut self, speed: u16) -> Result<(), DiscSmithError> {
		Self::set_speed(self, speed)
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # DAE Progress.
///
/// The state of things after an [`Extractor::step`].
pub struct DaeProgress {
	lba: u32,
	done: u32,
	total: u32,
	speed: u16,
	repairing: bool,
}

impl DaeProgress {
	#[must_use]
	/// # Current Position.
	///
	/// The next block to be read, or the end of the last range if finished.
	pub const fn lba(&self) -> u32 { self.lba }

	#[must_use]
	/// # Blocks Written.
	pub const fn done(&self) -> u32 { self.done }

	#[must_use]
	/// # Total Blocks.
	pub const fn total(&self) -> u32 { self.total }

	#[must_use]
	/// # Current Speed.
	pub const fn speed(&self) -> u16 { self.speed }

	#[must_use]
	/// # Repairing?
	pub const fn repairing(&self) -> bool { self.repairing }

	#[must_use]
	/// # Finished?
	pub const fn is_done(&self) -> bool { self.total <= self.done }
}



#[derive(Debug, Clone, Default)]
/// # DAE Statistics.
pub struct DaeStats {
	read: u32,
	clean: u32,
	repaired: u32,
	degraded: u32,
	retries: u32,
	q_crc: u32,
	q_mismatch: u32,
	crc: crc32fast::Hasher,
}

impl DaeStats {
	#[must_use]
	/// # Blocks Read.
	///
	/// This counts first reads only.
	pub const fn read(&self) -> u32 { self.read }

	#[must_use]
	/// # Blocks Clean (First Read).
	pub const fn clean(&self) -> u32 { self.clean }

	#[must_use]
	/// # Blocks Repaired.
	pub const fn repaired(&self) -> u32 { self.repaired }

	#[must_use]
	/// # Blocks Written With Errors.
	pub const fn degraded(&self) -> u32 { self.degraded }

	#[must_use]
	/// # Transport Retries.
	pub const fn retries(&self) -> u32 { self.retries }

	#[must_use]
	/// # Q CRC Failures.
	pub const fn q_crc(&self) -> u32 { self.q_crc }

	#[must_use]
	/// # Q Position Mismatches.
	pub const fn q_mismatch(&self) -> u32 { self.q_mismatch }

	#[must_use]
	/// # CRC32.
	///
	/// The checksum of the audio written so far, before any byte-swapping.
	pub fn crc32(&self) -> u32 { self.crc.clone().finalize() }
}



#[derive(Debug)]
/// # Repair In Progress.
struct Repair {
	block: DaeBlock,
	retries: u8,
}



#[derive(Debug)]
/// # Extractor.
///
/// This walks the audio tracks of a [`Toc`], reading from a [`DaeDevice`] and
/// writing to a [`BlockSink`]. Blocks that come back with C2 errors are
/// re-read one at a time, keeping whatever samples turn up clean, until they
/// are either whole or out of retries.
///
/// Work is done in small bursts via [`Extractor::step`] so the caller can
/// update a display or bail between calls; [`Extractor::run`] is a ready-made
/// loop for the common case.
pub struct Extractor<'a, D: DaeDevice> {
	device: D,
	toc: &'a Toc,
	opts: DaeOptions,

	ranges: Vec<Range<u32>>,
	range: usize,
	lba: u32,
	done: u32,
	total: u32,

	blocks: Vec<DaeBlock>,
	scratch: DaeBlock,
	repair: Option<Repair>,
	read_failures: u8,

	speed: u16,
	applied: Option<u16>,
	clean_run: u32,

	stats: DaeStats,
	log: DaeLog,
}

impl<'a, D: DaeDevice> Extractor<'a, D> {
	/// # New.
	///
	/// Extract the tracks named in the options, or every audio track if none
	/// were. Whole-disc extractions include each track's pregap; single
	/// tracks start at index one and run up to the next track.
	///
	/// ## Errors
	///
	/// Returns an error if a requested track doesn't exist or isn't audio, or
	/// if there's no audio to extract.
	pub fn new(device: D, toc: &'a Toc, opts: DaeOptions) -> Result<Self, DiscSmithError> {
		let mut ranges: Vec<Range<u32>> = Vec::new();
		let mut push = |rng: Range<u32>| {
			if rng.is_empty() { return; }
			if let Some(last) = ranges.last_mut() {
				if last.end == rng.start {
					last.end = rng.end;
					return;
				}
			}
			ranges.push(rng);
		};

		if opts.has_tracks() {
			for nr in opts.tracks() {
				let entry = toc.track(nr).ok_or(DiscSmithError::NoTrack(nr))?;
				if ! entry.track().mode().is_audio() { return Err(DiscSmithError::SectorMode); }
				push(entry.start().lba()..entry.end().lba());
			}
		}
		else {
			for entry in toc.tracks().iter().filter(|t| t.track().mode().is_audio()) {
				push(entry.abs_start().lba()..entry.end().lba());
			}
		}

		let total = ranges.iter().fold(0_u32, |acc, r| acc + (r.end - r.start));
		if total == 0 { return Err(DiscSmithError::DiscMode); }

		let lba = ranges[0].start;
		Ok(Self {
			device,
			toc,
			opts,

			ranges,
			range: 0,
			lba,
			done: 0,
			total,

			blocks: vec![DaeBlock::default(); usize::from(opts.burst())],
			scratch: DaeBlock::default(),
			repair: None,
			read_failures: 0,

			speed: opts.speed(),
			applied: None,
			clean_run: 0,

			stats: DaeStats::default(),
			log: DaeLog::new(opts.verbose()),
		})
	}

	#[must_use]
	/// # Statistics.
	pub const fn stats(&self) -> &DaeStats { &self.stats }

	#[must_use]
	/// # Log.
	pub const fn log(&self) -> &DaeLog { &self.log }

	/// # Log (Mutable).
	///
	/// Mostly useful for flushing early.
	pub fn log_mut(&mut self) -> &mut DaeLog { &mut self.log }

	#[must_use]
	/// # Device.
	pub const fn device(&self) -> &D { &self.device }

	#[must_use]
	/// # Repair Block.
	///
	/// Return the block currently under repair, if any.
	pub fn repair_block(&self) -> Option<&DaeBlock> {
		self.repair.as_ref().map(|r| &r.block)
	}

	#[must_use]
	/// # Progress.
	pub const fn progress(&self) -> DaeProgress {
		DaeProgress {
			lba: self.lba,
			done: self.done,
			total: self.total,
			speed: self.speed,
			repairing: self.repair.is_some(),
		}
	}

	/// # Step.
	///
	/// Read one burst, or re-read the block under repair, writing whatever is
	/// finished to the sink.
	///
	/// ## Errors
	///
	/// Returns an error if the drive keeps failing, a non-transport error
	/// comes up, or the sink can't be written to.
	pub fn step<S: BlockSink>(&mut self, sink: &mut S) -> Result<DaeProgress, DiscSmithError> {
		if self.total <= self.done { return Ok(self.progress()); }

		self.log.start();
		self.apply_speed();

		if let Some(repair) = self.repair.take() { self.step_repair(repair, sink)?; }
		else { self.step_burst(sink)?; }

		Ok(self.progress())
	}

	/// # Run.
	///
	/// Step until finished, updating the progress bar and checking the kill
	/// switch between steps.
	///
	/// ## Errors
	///
	/// Returns any error from [`Extractor::step`], or [`DiscSmithError::Killed`]
	/// if the switch is flipped.
	pub fn run<S: BlockSink>(&mut self, sink: &mut S, progress: &Progless, killed: KillSwitch)
	-> Result<(), DiscSmithError> {
		let _res = progress.reset(self.total - self.done);
		while self.done < self.total {
			if killed.killed() {
				progress.finish();
				return Err(DiscSmithError::Killed);
			}

			let before = self.done;
			match self.step(sink) {
				Ok(p) => { progress.increment_n(p.done() - before); },
				Err(e) => {
					progress.finish();
					return Err(e);
				},
			}
		}

		progress.finish();
		Ok(())
	}
}

impl<D: DaeDevice> Extractor<'_, D> {
	/// # Apply Speed.
	///
	/// Failures are logged, never fatal.
	fn apply_speed(&mut self) {
		if self.applied != Some(self.speed) {
			if self.device.set_speed(self.speed).is_err() {
				self.log.add(self.lba, DaeWarning::Speed(self.speed));
			}
			self.applied = Some(self.speed);
		}
	}

	/// # Burst.
	fn step_burst<S: BlockSink>(&mut self, sink: &mut S) -> Result<(), DiscSmithError> {
		let end = self.ranges[self.range].end;
		let len = usize::from(self.opts.burst())
			.min(usize::try_from(end - self.lba).unwrap_or(usize::MAX));

		let mut blocks = std::mem::take(&mut self.blocks);
		let res = self.device.read_blocks(self.lba, &mut blocks[..len]);
		let res = match res {
			Ok(()) => {
				self.read_failures = 0;
				self.take_burst(&mut blocks[..len], sink)
			},
			Err(e) => self.transport_failure(e),
		};
		self.blocks = blocks;
		res
	}

	/// # Process Burst.
	///
	/// Write blocks until the first damaged one, which is set aside for
	/// repair. Anything after it is discarded and read again later.
	fn take_burst<S: BlockSink>(&mut self, blocks: &mut [DaeBlock], sink: &mut S)
	-> Result<(), DiscSmithError> {
		for block in blocks {
			self.stats.read += 1;
			self.check_q(block);

			if block.is_clean() {
				self.stats.clean += 1;
				self.accept(block, sink)?;
				self.ramp_up();
			}
			else {
				self.speed = (self.speed / 2).max(opts::SPEED_MIN);
				self.clean_run = 0;
				self.repair = Some(Repair {
					block: block.clone(),
					retries: 0,
				});
				break;
			}
		}

		Ok(())
	}

	/// # Repair.
	///
	/// Re-read the damaged block and merge in whatever came back clean.
	fn step_repair<S: BlockSink>(&mut self, mut repair: Repair, sink: &mut S)
	-> Result<(), DiscSmithError> {
		repair.retries += 1;

		let mut scratch = std::mem::take(&mut self.scratch);
		let res = self.device.read_blocks(self.lba, std::slice::from_mut(&mut scratch));
		match res {
			Ok(()) => { repair.block.merge(&scratch); },
			Err(e) if e.kind() == ErrorKind::Transport => {
				self.stats.retries += 1;
				self.log.add(self.lba, DaeWarning::Transport(e));
			},
			Err(e) => {
				self.scratch = scratch;
				return Err(e);
			},
		}
		self.scratch = scratch;

		if repair.block.is_clean() {
			self.stats.repaired += 1;
			self.accept(&mut repair.block, sink)
		}
		else if REPAIR_RETRY_MAX < repair.retries {
			self.stats.degraded += 1;
			self.log.add(self.lba, DaeWarning::Degraded(repair.block.error_count()));
			self.accept(&mut repair.block, sink)
		}
		else {
			self.repair = Some(repair);
			Ok(())
		}
	}

	/// # First-Read Transport Failure.
	fn transport_failure(&mut self, err: DiscSmithError) -> Result<(), DiscSmithError> {
		if err.kind() != ErrorKind::Transport { return Err(err); }

		self.read_failures += 1;
		if READ_RETRY_MAX < self.read_failures {
			return Err(DiscSmithError::CdReadAbort(self.lba));
		}

		self.stats.retries += 1;
		self.log.add(self.lba, DaeWarning::Transport(err));
		Ok(())
	}

	/// # Accept Block.
	///
	/// Write it and move on.
	fn accept<S: BlockSink>(&mut self, block: &mut DaeBlock, sink: &mut S)
	-> Result<(), DiscSmithError> {
		self.stats.crc.update(block.data());
		if self.opts.swap() && sink.is_raw() { block.swap(); }
		sink.write_block(block.data())?;

		self.done += 1;
		self.lba += 1;
		if self.lba == self.ranges[self.range].end && self.range + 1 < self.ranges.len() {
			self.range += 1;
			self.lba = self.ranges[self.range].start;
		}

		Ok(())
	}

	/// # Ramp Speed.
	fn ramp_up(&mut self) {
		self.clean_run += 1;
		if SPEED_RAMP_BLOCKS <= self.clean_run {
			self.clean_run = 0;
			self.speed = self.speed.saturating_mul(2).min(self.opts.speed());
		}
	}

	/// # Check Q.
	///
	/// Compare the sub-channel's idea of where we are with the table of
	/// contents. Problems are only logged.
	fn check_q(&mut self, block: &DaeBlock) {
		if ! self.opts.subchannel() || ! block.has_sub() { return; }

		// Bursts never straddle ranges and stop at the first bad block, so
		// the block being checked is always the next one to be written.
		let lba = self.lba;
		let Some(q) = block.subq() else {
			self.stats.q_crc += 1;
			self.log.add(lba, DaeWarning::QCrc);
			return;
		};
		let Some(entry) = self.toc.find_track(lba) else { return; };

		match q.data() {
			QData::Position { track, index, .. } if track != LEADOUT => {
				let expected = (entry.number(), expected_index(entry, lba));
				if expected != (track, index) {
					self.stats.q_mismatch += 1;
					self.log.add(lba, DaeWarning::QMismatch { expected, found: (track, index) });
				}
			},
			QData::Isrc(isrc) if entry.track().isrc().is_some_and(|i| i != isrc) => {
				self.log.add(lba, DaeWarning::Isrc(isrc));
			},
			_ => {},
		}
	}
}



/// # Expected Index.
///
/// Zero for the pregap, otherwise one plus the number of index marks at or
/// before the position.
fn expected_index(entry: &TrackEntry, lba: u32) -> u8 {
	if lba < entry.start().lba() { 0 }
	else {
		let count = entry.index_positions().iter().filter(|p| p.lba() <= lba).count();
		u8::try_from(count).unwrap_or(u8::MAX)
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		Msf,
		SAMPLES_PER_SECTOR,
		SubChannelMode,
		SubQ,
		Track,
		TrackData,
		TrackMode,
	};
	use std::collections::{
		HashMap,
		VecDeque,
	};

	#[derive(Debug, Default)]
	/// # Scripted Device.
	///
	/// Sectors are clean and filled with the low byte of their LBA unless a
	/// script says otherwise. Scripted entries are consumed one read at a
	/// time; `None` is a transport failure.
	struct Fake {
		script: HashMap<u32, VecDeque<Option<DaeBlock>>>,
		always_bad: Option<u32>,
		q_track: Option<u8>,
		reads: Vec<(u32, usize)>,
		speeds: Vec<u16>,
	}

	impl DaeDevice for Fake {
		fn read_blocks(&mut self, lba: u32, blocks: &mut [DaeBlock]) -> Result<(), DiscSmithError> {
			self.reads.push((lba, blocks.len()));
			for (block, lba) in blocks.iter_mut().zip(lba..) {
				if let Some(next) = self.script.get_mut(&lba).and_then(VecDeque::pop_front) {
					*block = next.ok_or(DiscSmithError::CdRead(lba))?;
				}
				else {
					*block = clean(lba as u8);
					if self.always_bad == Some(lba) { block.make_bad(); }
				}

				if let Some(track) = self.q_track {
					let q = SubQ::new(0, QData::Position {
						track,
						index: 1,
						rel: Msf::ZERO,
						abs: Msf::from_lba(lba),
					});
					block.set_sub(&q.to_pw());
				}
			}
			Ok(())
		}

		fn set_speed(&mut self, speed: u16) -> Result<(), DiscSmithError> {
			self.speeds.push(speed);
			Ok(())
		}
	}

	/// # Clean Block.
	fn clean(fill: u8) -> DaeBlock {
		let mut out = DaeBlock::default();
		for v in out.data_mut() { *v = fill; }
		out
	}

	/// # Block With Flagged Samples.
	fn flagged(fill: u8, bad: &[usize]) -> DaeBlock {
		let mut out = clean(fill);
		let mut c2 = [0_u8; 294];
		for &idx in bad {
			c2[idx >> 1] |= if idx & 1 == 0 { 0b1111_0000 } else { 0b0000_1111 };
		}
		out.set_c2(&c2).expect("C2 failed.");
		out
	}

	/// # Audio Disc.
	///
	/// Tracks of the given sector lengths; the second has a 10-sector pregap.
	fn disc(lengths: &[u32]) -> Toc {
		let mut toc = Toc::new(crate::TocType::CdDa);
		for (idx, &len) in lengths.iter().enumerate() {
			let mut track = Track::new(TrackMode::Audio, SubChannelMode::None);
			track.append_data(TrackData::silence(u64::from(len) * u64::from(SAMPLES_PER_SECTOR)))
				.expect("Append failed.");
			if idx == 1 { track.set_start(Msf::from_lba(10)).expect("Start failed."); }
			toc.append(track).expect("Track failed.");
		}
		toc
	}

	/// # Run To Completion.
	fn finish<D: DaeDevice>(ex: &mut Extractor<'_, D>) -> Vec<u8> {
		let mut sink = PcmSink::from(Vec::new());
		let mut steps = 0;
		while ! ex.step(&mut sink).expect("Step failed.").is_done() {
			steps += 1;
			assert!(steps < 100_000, "The extractor is going in circles.");
		}
		sink.into_inner()
	}

	#[test]
	fn t_clean() {
		let toc = disc(&[20, 30]);
		let opts = DaeOptions::default().with_burst(8);
		let mut ex = Extractor::new(Fake::default(), &toc, opts).expect("Extractor failed.");
		let out = finish(&mut ex);

		assert_eq!(out.len(), 50 * 2352);
		for (idx, chunk) in out.chunks_exact(2352).enumerate() {
			assert!(chunk.iter().all(|&v| usize::from(v) == idx), "Sector {idx} is out of place.");
		}
		assert_eq!(ex.stats().read(), 50);
		assert_eq!(ex.stats().clean(), 50);
		assert_eq!(ex.stats().crc32(), crc32fast::hash(&out));

		// Bursts never cross the end of the disc.
		assert!(ex.device().reads.iter().all(|&(lba, len)| lba as usize + len <= 50));
		assert_eq!(ex.device().speeds, [8], "The speed should have been set once.");
	}

	#[test]
	fn t_single_track() {
		let toc = disc(&[20, 30]);

		// Track two starts after its pregap.
		let opts = DaeOptions::default().with_track(2);
		let mut ex = Extractor::new(Fake::default(), &toc, opts).expect("Extractor failed.");
		let out = finish(&mut ex);
		assert_eq!(out.len(), 20 * 2352);
		assert_eq!(out[0], 30);

		// Track one runs up to track two's pregap.
		let opts = DaeOptions::default().with_track(1);
		let mut ex = Extractor::new(Fake::default(), &toc, opts).expect("Extractor failed.");
		assert_eq!(finish(&mut ex).len(), 20 * 2352);

		// Bad tracks.
		let opts = DaeOptions::default().with_track(3);
		assert!(matches!(
			Extractor::new(Fake::default(), &toc, opts),
			Err(DiscSmithError::NoTrack(3)),
		));
	}

	#[test]
	fn t_repair() {
		let toc = disc(&[20]);
		let mut fake = Fake::default();
		fake.script.insert(5, VecDeque::from([
			Some(flagged(1, &[4, 5])),
			Some(flagged(2, &[4])),
		]));

		let opts = DaeOptions::default().with_burst(8);
		let mut ex = Extractor::new(fake, &toc, opts).expect("Extractor failed.");
		let mut sink = PcmSink::from(Vec::new());

		// The first burst stops at the bad block.
		let p = ex.step(&mut sink).expect("Step failed.");
		assert_eq!(p.done(), 5);
		assert_eq!(p.lba(), 5);
		assert!(p.repairing());
		assert_eq!(p.speed(), 4, "The speed should have been halved.");

		// The second read fixes sample five but not four.
		let p = ex.step(&mut sink).expect("Step failed.");
		assert_eq!(p.done(), 5, "Nothing should advance during a repair.");
		let block = ex.repair_block().expect("Missing repair block.");
		assert_eq!(block.samples().nth(5), Some(([2, 2, 2, 2], false)));
		assert_eq!(block.samples().nth(4), Some(([1, 1, 1, 1], true)));
		assert_eq!(block.samples().nth(3), Some(([1, 1, 1, 1], false)));

		// The third read is clean.
		let p = ex.step(&mut sink).expect("Step failed.");
		assert_eq!(p.done(), 6);
		assert!(! p.repairing());
		assert_eq!(ex.device().speeds, [8, 4]);

		let out = {
			while ! ex.step(&mut sink).expect("Step failed.").is_done() {}
			sink.into_inner()
		};
		let sector = &out[5 * 2352..6 * 2352];
		assert_eq!(&sector[16..20], &[5, 5, 5, 5], "Sample 4 should come from read three.");
		assert_eq!(&sector[20..24], &[2, 2, 2, 2], "Sample 5 should come from read two.");
		assert_eq!(&sector[12..16], &[1, 1, 1, 1], "Sample 3 should come from read one.");
		assert_eq!(ex.stats().repaired(), 1);
		assert_eq!(ex.stats().degraded(), 0);
	}

	#[test]
	fn t_abandon() {
		let toc = disc(&[10]);
		let fake = Fake {
			always_bad: Some(3),
			..Fake::default()
		};

		let mut ex = Extractor::new(fake, &toc, DaeOptions::default()).expect("Extractor failed.");
		let out = finish(&mut ex);
		assert_eq!(out.len(), 10 * 2352, "Degraded blocks are still written.");
		assert_eq!(ex.stats().degraded(), 1);

		let rereads = ex.device().reads.iter().filter(|&&(lba, len)| lba == 3 && len == 1).count();
		assert_eq!(
			rereads,
			usize::from(REPAIR_RETRY_MAX) + 1,
			"The block should be abandoned once its retries exceed the limit.",
		);
		assert!(ex.log().entries().any(|(lba, w)| lba == 3 && *w == DaeWarning::Degraded(588)));
	}

	#[test]
	fn t_read_retry() {
		let toc = disc(&[10]);

		// Ten failures are fine.
		let mut fake = Fake::default();
		fake.script.insert(0, std::iter::repeat(None).take(usize::from(READ_RETRY_MAX)).collect());
		let mut ex = Extractor::new(fake, &toc, DaeOptions::default()).expect("Extractor failed.");
		assert_eq!(finish(&mut ex).len(), 10 * 2352);
		assert_eq!(ex.stats().retries(), u32::from(READ_RETRY_MAX));

		// Eleven are not.
		let mut fake = Fake::default();
		fake.script.insert(0, std::iter::repeat(None).take(usize::from(READ_RETRY_MAX) + 1).collect());
		let mut ex = Extractor::new(fake, &toc, DaeOptions::default()).expect("Extractor failed.");
		let mut sink = PcmSink::from(Vec::new());
		let res = loop {
			match ex.step(&mut sink) {
				Ok(p) if p.is_done() => break Ok(()),
				Ok(_) => {},
				Err(e) => break Err(e),
			}
		};
		assert_eq!(res, Err(DiscSmithError::CdReadAbort(0)));
		assert!(sink.into_inner().is_empty(), "Nothing should have been written.");
	}

	#[test]
	fn t_repair_transport() {
		// Failures during a repair don't count against the first-read budget.
		let toc = disc(&[10]);
		let mut fake = Fake::default();
		let mut script = VecDeque::from([Some(flagged(1, &[0]))]);
		script.extend(std::iter::repeat(None).take(usize::from(READ_RETRY_MAX) + 5));
		fake.script.insert(2, script);

		let mut ex = Extractor::new(fake, &toc, DaeOptions::default()).expect("Extractor failed.");
		assert_eq!(finish(&mut ex).len(), 10 * 2352);
		assert_eq!(ex.stats().repaired(), 1);
		assert_eq!(ex.stats().retries(), u32::from(READ_RETRY_MAX) + 5);
	}

	#[test]
	fn t_speed_ramp() {
		// The ramp lands mid-burst; the drive hears about it before the next.
		let toc = disc(&[SPEED_RAMP_BLOCKS + 100]);
		let mut fake = Fake::default();
		fake.script.insert(2, VecDeque::from([Some(flagged(1, &[0]))]));

		let opts = DaeOptions::default().with_speed(16).with_burst(75);
		let mut ex = Extractor::new(fake, &toc, opts).expect("Extractor failed.");
		finish(&mut ex);
		assert_eq!(ex.device().speeds, [16, 8, 16], "The speed should drop and recover.");
	}

	#[test]
	fn t_q_check() {
		let toc = disc(&[20, 30]);
		let fake = Fake {
			q_track: Some(1),
			..Fake::default()
		};

		// Everything claims to be track one.
		let mut ex = Extractor::new(fake, &toc, DaeOptions::default()).expect("Extractor failed.");
		assert_eq!(finish(&mut ex).len(), 50 * 2352, "Mismatches are not fatal.");

		// Track two's pregap (index 0) and body (index 1) are both wrong.
		assert_eq!(ex.stats().q_mismatch(), 30);
		assert!(ex.log().entries().any(|(lba, w)|
			lba == 20 &&
			*w == DaeWarning::QMismatch { expected: (2, 0), found: (1, 1) }
		));

		// Unless we aren't checking.
		let fake = Fake {
			q_track: Some(1),
			..Fake::default()
		};
		let opts = DaeOptions::default().with_subchannel(false);
		let mut ex = Extractor::new(fake, &toc, opts).expect("Extractor failed.");
		finish(&mut ex);
		assert_eq!(ex.stats().q_mismatch(), 0);
	}
}
