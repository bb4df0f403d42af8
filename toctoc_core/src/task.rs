/*!
# Toc Toc: Reading Tasks
*/

use crate::{
	Channel,
	Device,
	DiscInfoParser,
	Flow,
	KillSwitch,
	OutputParser,
	parse::parse_version,
	Platform,
	Program,
	ReadOptions,
	Table,
	TocFile,
	TocTocError,
	Track,
};
use std::process::{
	Command,
	Stdio,
};



/// # Progress.
///
/// Long-running reads report what they're up to here. Fractions are clamped
/// to `0.0..=1.0` before being passed along.
pub trait Progress {
	/// # Set Title.
	fn set_title(&self, title: &str);

	/// # Set Fraction.
	fn set_fraction(&self, fraction: f64);
}

#[derive(Debug, Clone, Copy, Default)]
/// # No Progress.
///
/// For when nobody is watching.
pub struct NoProgress;

impl Progress for NoProgress {
	#[inline]
	fn set_title(&self, _title: &str) {}

	#[inline]
	fn set_fraction(&self, _fraction: f64) {}
}



/// # Cdrdao Version.
///
/// Run `cdrdao` without arguments and pull the version from its banner.
///
/// ## Errors
///
/// Returns an error if the program can't be run at all. A program that runs
/// but doesn't say what version it is yields `None`.
pub fn cdrdao_version<P>(program: &P) -> Result<Option<String>, TocTocError>
where P: Program + ?Sized {
	let mut out = Vec::new();
	let mut err = Vec::new();

	// This always "fails" since the arguments are missing.
	let _exit = program.run(
		&[],
		&mut |channel, chunk| {
			match channel {
				Channel::Stdout => out.extend_from_slice(chunk),
				Channel::Stderr => err.extend_from_slice(chunk),
			}
			true
		},
		&KillSwitch::default(),
	)?;

	Ok(
		err.split(|b| b'\n'.eq(b))
			.chain(out.split(|b| b'\n'.eq(b)))
			.find_map(parse_version)
	)
}

/// # Run Discovery.
///
/// Ask `cdrdao disk-info` how many sessions the disc has.
///
/// ## Errors
///
/// Returns an error if the program fails, the drive is busy, or no session
/// count was reported.
pub fn run_discovery<P>(
	program: &P,
	device: &Device,
	progress: &dyn Progress,
	killed: &KillSwitch,
) -> Result<u8, TocTocError>
where P: Program + ?Sized {
	progress.set_title("Scanning disc…");
	progress.set_fraction(0.0);
	unmount(device);

	let args = vec![
		"disk-info".to_owned(),
		"--device".to_owned(),
		device.cdrdao_device().into_owned(),
	];

	let mut parser = DiscInfoParser::default();
	let exit = program.run(
		&args,
		&mut |channel, chunk| ! matches!(parser.feed(channel, chunk), Flow::Abort(_)),
		killed,
	)?;

	let sessions = parser.finish(exit)?;
	log::debug!("The disc has {sessions} session(s).");
	progress.set_fraction(1.0);
	Ok(sessions)
}

/// # Read Session.
///
/// Run `cdrdao read-toc` for a single session, returning its table.
///
/// Tracks are numbered from one, but their offsets are disc-wide, i.e.
/// relative to the start of the first session.
///
/// ## Errors
///
/// Returns an error if the program fails, the drive is busy, the resulting
/// TOC file is bad, or the read is killed.
pub fn read_session<P>(
	program: &P,
	device: &Device,
	session: u8,
	opts: &ReadOptions,
	progress: &dyn Progress,
	killed: &KillSwitch,
) -> Result<Table, TocTocError>
where P: Program + ?Sized {
	let dir = tempfile::Builder::new()
		.prefix("toctoc")
		.tempdir()
		.map_err(|e| TocTocError::TocFile(e.to_string()))?;
	let path = dir.path().join("session.toc");

	let mut args = vec!["read-toc".to_owned()];
	if opts.fast() { args.push("--fast-toc".to_owned()); }
	args.extend([
		"--device".to_owned(),
		device.cdrdao_device().into_owned(),
		"--session".to_owned(),
		session.to_string(),
		path.to_string_lossy().into_owned(),
	]);

	let mut parser = OutputParser::new(session);
	progress.set_title(parser.description());
	progress.set_fraction(0.0);
	unmount(device);

	let mut title = parser.description().to_owned();
	let res = program.run(
		&args,
		&mut |channel, chunk| match channel {
			Channel::Stdout => {
				log::debug!("cdrdao: {}", String::from_utf8_lossy(chunk).trim());
				true
			},
			Channel::Stderr => match parser.feed(chunk) {
				Flow::Idle => true,
				Flow::Continue { progress: p } => {
					if parser.description() != title {
						parser.description().clone_into(&mut title);
						progress.set_title(&title);
					}
					if let Some(p) = p { progress.set_fraction(p.clamp(0.0, 1.0)); }
					true
				},
				Flow::Abort(_) => false,
			},
		},
		killed,
	);

	let exit = match res {
		Ok(exit) => exit,
		Err(e) => {
			parser.done();
			return Err(e);
		},
	};

	let parsed = parser.finish(exit)?;
	if let Some(v) = parsed.version.as_deref() { log::debug!("cdrdao version {v}."); }

	// The TOC file has the details, but its offsets are all relative to the
	// start of the session.
	let mut table = TocFile::read(&path)?.into_table();
	table.absolutize();
	table.drop_relative();
	if let Some(start) = parsed.table.track(1).and_then(Track::start) {
		table.rebase(start)?;
	}
	if let Some(leadout) = parsed.table.leadout() {
		table.set_leadout(Some(leadout));
	}
	table.set_session(session);

	if opts.fast() && ! table.has_toc() {
		return Err(TocTocError::Bug("fast read did not produce a TOC"));
	}

	progress.set_fraction(1.0);
	Ok(table)
}

/// # Read All Sessions.
///
/// Figure out how many sessions there are, read each of them in turn, and
/// merge the results into a single table.
///
/// ## Errors
///
/// Any failure along the way is returned as-is; nothing partial is kept.
pub fn read_all_sessions<P>(
	program: &P,
	device: &Device,
	opts: &ReadOptions,
	progress: &dyn Progress,
	killed: &KillSwitch,
) -> Result<Table, TocTocError>
where P: Program + ?Sized {
	let sessions = run_discovery(program, device, progress, killed)?;
	log::info!("Reading {sessions} session(s).");

	let mut table: Option<Table> = None;
	for session in 1..=sessions {
		let next = read_session(program, device, session, opts, progress, killed)?;
		if let Some(t) = table.as_mut() { t.merge(next, session); }
		else { table = Some(next); }
	}

	let table = table.ok_or(TocTocError::Sessions)?;
	table.complete().map_err(|_| TocTocError::Bug("merged table has no leadout"))?;

	Ok(table)
}



/// # Unmount.
///
/// macOS automounts data sessions, which gets in the way of `cdrdao`. This
/// unmounts the disc before each run. Failures are logged but otherwise
/// ignored.
fn unmount(device: &Device) {
	if ! matches!(device.platform(), Platform::Darwin) { return; }

	log::debug!("Unmounting {}.", device.non_raw());
	match Command::new("diskutil")
		.args(["unmountDisk", device.non_raw()])
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.status()
	{
		Ok(status) if status.success() => {},
		Ok(status) => log::warn!("Unable to unmount {} ({status}).", device.non_raw()),
		Err(e) => log::warn!("Unable to unmount {}: {e}", device.non_raw()),
	}
}
