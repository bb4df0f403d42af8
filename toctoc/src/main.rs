/*!
# Toc Toc
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
mod progress;

use dactyl::{
	NiceElapsed,
	NiceU32,
};
use fyi_msg::Msg;
use oxford_join::JoinFmt;
use progress::Bar;
use std::{
	process::ExitCode,
	time::Instant,
};
use toctoc_core::{
	Cdrdao,
	Device,
	DriveInfo,
	KillSwitch,
	Platform,
	ReadOptions,
	Table,
	TocTocError,
};
use utc2k::FmtUtc2k;



/// # A Divider Line.
///
/// This is used to encase the drive vendor/model during summary. We'll slice
/// it to match the length rather than `"-".repeat()` or whatever.
const DIVIDER: &str = "----------------------------------------";



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e @ (TocTocError::PrintHelp | TocTocError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e @ TocTocError::Killed) => {
			Msg::warning("The read was aborted.").eprint();
			ExitCode::from(exit_status(&e))
		},
		Err(e) => {
			let code = exit_status(&e);
			Msg::from(e).eprint();
			ExitCode::from(code)
		},
	}
}

/// # Exit Status.
///
/// Problems that need the user to step in before trying again (a busy drive,
/// a missing cdrdao, etc.) exit with `2`; everything else gets `1`.
const fn exit_status(err: &TocTocError) -> u8 {
	if err.is_fatal() { 2 } else { 1 }
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<(), TocTocError> {
	let cli::Settings { opts, dev, drives } = cli::parse()?;
	init_logger(opts.verbose());

	// Just listing the drives?
	if drives {
		list_drives();
		return Ok(());
	}

	// Figure out the drive.
	let device = match dev {
		Some(d) => d,
		None => toctoc_core::drive_paths()
			.into_iter()
			.next()
			.ok_or(TocTocError::NoDrive)?,
	};
	let device = Device::new(device, Platform::host());
	let program = Cdrdao::from(&opts);

	// Make sure cdrdao is there before doing anything else.
	let version = toctoc_core::cdrdao_version(&program)?;

	let info =
		if opts.summary() || opts.verbose() { DriveInfo::probe(device.real_path()) }
		else { None };
	if opts.summary() { summarize(&device, info.as_ref()); }
	if opts.verbose() {
		log_header(&device, info.as_ref(), version.as_deref(), &program, &opts);
	}

	// Set up the progress bar and killswitch.
	let killed = KillSwitch::default();
	let handler = killed.clone();
	if let Err(e) = ctrlc::set_handler(move || { handler.kill(); }) {
		log::warn!("Unable to set up the CTRL+C handler: {e}");
	}
	let progress = Bar::default();

	// Read!
	let now = Instant::now();
	let res = toctoc_core::read_all_sessions(
		&program,
		&device,
		&opts,
		&progress,
		&killed,
	);
	progress.finish();
	let table = res?;

	print_table(&table);
	Msg::success(format!(
		"Read {} track(s) from {} session(s) in {}.",
		table.len(),
		table.sessions(),
		NiceElapsed::from(now.elapsed()),
	)).eprint();

	Ok(())
}

/// # Initialize Logger.
///
/// Warnings and worse are always shown; the parser chatter needs -v.
fn init_logger(verbose: bool) {
	let level =
		if verbose { log::LevelFilter::Debug }
		else { log::LevelFilter::Warn };

	env_logger::Builder::new()
		.filter_level(level)
		.format_timestamp(None)
		.parse_default_env()
		.init();
}

/// # List Drives.
///
/// Print the path and identity of each optical drive found.
fn list_drives() {
	let paths = toctoc_core::drive_paths();
	if paths.is_empty() {
		Msg::warning("No drives found.").eprint();
		return;
	}

	for path in &paths {
		if let Some(info) = DriveInfo::probe(path) {
			println!(
				"drive: {path}, vendor: {}, model: {}, release: {}",
				info.vendor(),
				info.model(),
				info.revision(),
			);
		}
		else { println!("drive: {path}"); }
	}

	Msg::custom("Toc Toc", 199, &format!(
		"Found {} drive(s): {}.",
		paths.len(),
		JoinFmt::new(paths.iter(), ", "),
	)).eprint();
}

/// # Drive Summary.
fn summarize(device: &Device, info: Option<&DriveInfo>) {
	let name = info.map_or_else(|| device.path().to_owned(), ToString::to_string);
	let line = &DIVIDER[..name.len().min(DIVIDER.len())];
	eprintln!("{line}\n{name}\n{line}");
	if info.is_some() { eprintln!("Device: {device}"); }
	eprintln!();
}

/// # Log Header.
///
/// Print a few basic setup details for the log. Only applies when -v/--verbose
/// is set.
fn log_header(
	device: &Device,
	info: Option<&DriveInfo>,
	version: Option<&str>,
	program: &Cdrdao,
	opts: &ReadOptions,
) {
	use std::io::Write;

	let writer = std::io::stderr();
	let mut handle = writer.lock();

	let _res = writeln!(
		&mut handle,
		concat!("#####
## Toc Toc v", env!("CARGO_PKG_VERSION"), "
## cdrdao:  {} ({})
## Device:  {} (cdrdao: {})"),
		program.bin().display(),
		version.unwrap_or("unknown version"),
		device,
		device.cdrdao_device(),
	);

	if let Some(info) = info {
		let _res = writeln!(&mut handle, "## Drive:   {info}");
	}

	let _res = writeln!(
		&mut handle,
		"## Mode:    {}
## Date:    {}
#####",
		if opts.fast() { "Fast TOC" } else { "Full TOC" },
		FmtUtc2k::now(),
	);

	let _res = handle.flush();
}

/// # Print Table.
///
/// The table itself goes to STDOUT, followed by the disc identifiers, if
/// they can be worked out.
fn print_table(table: &Table) {
	println!("{table}");

	if let Some(catalog) = table.catalog() { println!("Catalog:     {catalog}"); }
	if let Some(leadout) = table.leadout() {
		println!("Leadout:     {} frames", NiceU32::from(leadout));
	}

	match table.to_cdtoc() {
		Ok(toc) => {
			println!("CDDB:        {}", toc.cddb_id());
			println!("AccurateRip: {}", toc.accuraterip_id());
			println!("CTDB:        {}", toc.ctdb_id());
			println!("MusicBrainz: {}", toc.musicbrainz_id());
		},
		Err(e) => { log::warn!("Unable to work out the disc IDs: {e}"); },
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_exit_status() {
		assert_eq!(exit_status(&TocTocError::Killed), 2);
		assert_eq!(exit_status(&TocTocError::DeviceAccess("Busy".to_owned())), 2);
		assert_eq!(exit_status(&TocTocError::MissingProgram("cdrdao")), 2);
		assert_eq!(exit_status(&TocTocError::ProgramFailed(Some(1))), 1);
		assert_eq!(exit_status(&TocTocError::NoDrive), 1);
	}
}
