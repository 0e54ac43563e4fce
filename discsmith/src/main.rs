/*!
# Disc Smith
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]



mod cli;

use cli::{
	Command,
	Settings,
};
use dactyl::NiceU32;
use discsmith_core::{
	DiscSmithError,
	KillSwitch,
	Msf,
	Toc,
	write_image,
};
use fyi_ansi::{
	csi,
	dim,
};
use fyi_msg::{
	Msg,
	Progless,
};
use std::{
	path::Path,
	process::ExitCode,
};



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e @ (DiscSmithError::PrintHelp | DiscSmithError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<(), DiscSmithError> {
	let settings = cli::parse()?;

	match settings.cmd {
		Command::Bin => bin(&settings),
		Command::Check => {
			let src = settings.src()?;
			let toc = Toc::from_path(src)?;
			toc.check(base_dir(src))?;
			Msg::success(format!(
				"{} is valid; {} track(s), {} sectors.",
				src.to_string_lossy(),
				toc.tracks().len(),
				NiceU32::from(toc.leadout().lba()),
			)).eprint();
			Ok(())
		},
		Command::Fmt => {
			let toc = Toc::from_path(settings.src()?)?;
			print!("{toc}");
			Ok(())
		},
		Command::Read => read(&settings),
		Command::Show => {
			let toc = Toc::from_path(settings.src()?)?;
			show(&toc);
			Ok(())
		},
	}
}

/// # Rebuild Image.
fn bin(settings: &Settings) -> Result<(), DiscSmithError> {
	let src = settings.src()?;
	let dst = settings.dst()?;
	let toc = Toc::from_path(src)?;

	let killed = KillSwitch::from(Progless::sigint_keepalive());
	let progress = Progless::default();
	progress.set_title(Some(Msg::custom("Building", 199, &dst.to_string_lossy())));
	let total = write_image(&toc, base_dir(src), dst, &progress, killed)?;

	Msg::success(format!(
		"Wrote {} sectors to {}.",
		NiceU32::from(total),
		dst.to_string_lossy(),
	)).eprint();
	Ok(())
}

#[cfg(feature = "cdio")]
/// # Extract Audio.
fn read(settings: &Settings) -> Result<(), DiscSmithError> {
	use discsmith_core::{
		Extractor,
		FileWriter,
		LibcdioInstance,
		PcmSink,
		ScsiDrive,
		WavSink,
	};

	let dst = settings.dst()?;
	let opts = settings.opts;
	let instance = LibcdioInstance::new(settings.dev.as_deref())?;
	let mut drive = ScsiDrive::new(instance, opts.features())?;
	let toc = drive.read_toc()?;

	if opts.verbose() { log_header(&toc, dst); }

	let killed = KillSwitch::from(Progless::sigint_keepalive());
	let progress = Progless::default();
	progress.set_title(Some(Msg::custom("Extracting", 199, &dst.to_string_lossy())));

	let mut writer = FileWriter::new(dst)?;
	let mut ex = Extractor::new(drive, &toc, opts)?;
	let wav = dst.extension().is_some_and(|e| e.eq_ignore_ascii_case("wav"));
	if wav {
		let mut sink = WavSink::new(&mut writer)?;
		ex.run(&mut sink, &progress, killed)?;
		sink.finish()?;
	}
	else {
		let mut sink = PcmSink::from(&mut writer);
		ex.run(&mut sink, &progress, killed)?;
	}
	writer.finish()?;

	ex.log_mut().flush();
	let stats = ex.stats();
	Msg::success(format!(
		"Extracted {} sectors to {}; {} repaired, {} degraded, CRC32 {:08X}.",
		NiceU32::from(stats.read()),
		dst.to_string_lossy(),
		NiceU32::from(stats.repaired()),
		NiceU32::from(stats.degraded()),
		stats.crc32(),
	)).eprint();
	Ok(())
}

#[cfg(not(feature = "cdio"))]
/// # Extract Audio (Unsupported).
fn read(_settings: &Settings) -> Result<(), DiscSmithError> {
	Err(DiscSmithError::CliArg("read (this build lacks drive support)".to_owned()))
}

#[cfg(feature = "cdio")]
/// # Log Header.
///
/// Print a few basic setup details for the log. Only applies when -v/--verbose
/// is set.
fn log_header(toc: &Toc, dst: &Path) {
	use std::io::Write;

	let writer = std::io::stdout();
	let mut handle = writer.lock();
	let _res = writeln!(
		&mut handle,
		concat!("#####
## Disc Smith v", env!("CARGO_PKG_VERSION"), "
## Disc:   {disc}
## Output: {dst}
## Date:   {date}
##
## Warnings are listed by sector.
#####"),
		disc=toc.disc_ids().map_or_else(String::new, |t| t.cddb_id().to_string()),
		dst=dst.to_string_lossy(),
		date=utc2k::FmtUtc2k::now(),
	);
	let _res = handle.flush();
}

/// # Base Directory.
///
/// Files referenced by a TOC are relative to its directory.
fn base_dir(src: &Path) -> &Path {
	match src.parent() {
		Some(p) if ! p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	}
}

/// # Show.
///
/// Print the disc ids and a summary of the tracks.
fn show(toc: &Toc) {
	/// # Divider.
	const DIVIDER: &str = dim!("--------------------------------------------------------");

	let mut kv: Vec<(&str, String)> = vec![
		("Type:", toc.kind().as_str().to_owned()),
		("Tracks:", toc.tracks().len().to_string()),
		("Length:", toc.leadout().to_string()),
	];
	if let Some(c) = toc.catalog() { kv.push(("Catalog:", c.to_string())); }
	if let Some(ids) = toc.disc_ids() {
		kv.push(("AccurateRip:", ids.accuraterip_id().to_string()));
		kv.push(("CDDB:", ids.cddb_id().to_string()));
		kv.push(("CUETools:", ids.ctdb_id().to_string()));
		kv.push(("MusicBrainz:", ids.musicbrainz_id().to_string()));
	}

	let col_max: usize = kv.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
	for (k, v) in kv {
		eprintln!(
			concat!(csi!(bold, 199), "{k:col_max$}", csi!(), " {v}"),
			k=k,
			col_max=col_max,
			v=v,
		);
	}

	eprintln!(dim!("\n##  MODE          PREGAP     START       END  IDX  ISRC"));
	eprintln!("{DIVIDER}");
	for t in toc.tracks() {
		let track = t.track();
		let pregap = t.start().saturating_sub(t.abs_start());
		eprintln!(
			"{:02}  {:<10}  {:>8}  {:>8}  {:>8}  {:>3}  {}",
			t.number(),
			track.mode().as_str(),
			if pregap.is_zero() { String::new() } else { pregap.to_string() },
			t.start(),
			t.end().saturating_sub(Msf::from_lba(1)),
			t.index_positions().len(),
			track.isrc().map_or_else(String::new, |i| i.to_string()),
		);
	}
	eprintln!(
		concat!(csi!(dim), "AA  {:<10}  {:>8}  {:>8}", csi!()),
		"LEAD-OUT",
		"",
		toc.leadout(),
	);
	eprintln!("{DIVIDER}");
}
