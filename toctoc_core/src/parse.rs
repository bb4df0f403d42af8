/*!
# Toc Toc: Output Parsing
*/

use crate::{
	Channel,
	Exit,
	FRAMES_PER_SECOND,
	LineBuffer,
	Table,
	TocTocError,
	Track,
	TrackMode,
};
use dactyl::traits::BytesToUnsigned;
use regex::bytes::Regex;
use std::sync::OnceLock;
use trimothy::TrimSliceMatches;



/// # The Column Header Preceding the Track Rows.
const TRACK_HEADER: &[u8] = b"Track   Mode    Flags  Start                Length";

static RE_ANALYZING: OnceLock<Regex> = OnceLock::new();
static RE_ERROR: OnceLock<Regex> = OnceLock::new();
static RE_EXCLUSIVE: OnceLock<Regex> = OnceLock::new();
static RE_LEADOUT: OnceLock<Regex> = OnceLock::new();
static RE_POSITION: OnceLock<Regex> = OnceLock::new();
static RE_TRACK: OnceLock<Regex> = OnceLock::new();
static RE_VERSION: OnceLock<Regex> = OnceLock::new();



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # Parser State.
pub enum ParseState {
	#[default]
	/// # Waiting for the Track Table.
	Start,

	/// # Reading Track Rows.
	Track,

	/// # Analyzing (Counters).
	Leadout,

	/// # Finished.
	///
	/// The program has exited (or been killed); nothing more is parsed.
	Done,
}



#[derive(Debug, Clone, PartialEq)]
/// # Feed Result.
pub enum Flow {
	/// # Nothing Complete Yet.
	Idle,

	/// # Keep Going.
	///
	/// If new progress was found, it is included. It is usually within
	/// `0.0..=1.0`, but can briefly overshoot because of counter rounding.
	Continue {
		/// # Progress.
		progress: Option<f64>,
	},

	/// # Stop!
	///
	/// A fatal condition was found. The program should be terminated; the
	/// reason is included for reference.
	Abort(String),
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Error Line.
pub enum Diagnostic {
	/// # Exclusive Access Denied.
	///
	/// The drive is held by something else; retrying won't help.
	Fatal(String),

	/// # Anything Else.
	Error(String),
}

impl Diagnostic {
	#[must_use]
	/// # Classify a Line.
	///
	/// Returns `None` if the line isn't an `ERROR:` line at all.
	pub fn classify(line: &[u8]) -> Option<Self> {
		if let Some(m) = re_exclusive().captures(line).and_then(|c| c.get(1)) {
			return Some(Self::Fatal(String::from_utf8_lossy(m.as_bytes()).into_owned()));
		}

		re_error().captures(line)
			.and_then(|c| c.get(1))
			.map(|m| Self::Error(String::from_utf8_lossy(m.as_bytes()).trim().to_owned()))
	}

	#[must_use]
	/// # Message.
	pub fn message(&self) -> &str {
		match self { Self::Fatal(s) | Self::Error(s) => s }
	}

	#[must_use]
	/// # Is Fatal?
	pub const fn is_fatal(&self) -> bool { matches!(self, Self::Fatal(_)) }
}



#[derive(Debug, Clone)]
/// # Parse Results.
///
/// This is what [`OutputParser::finish`] hands back after a successful run.
pub struct Parsed {
	/// # Table.
	///
	/// Tracks are numbered relative to the session, with index one at the
	/// absolute start `cdrdao` reported.
	pub table: Table,

	/// # Version.
	pub version: Option<String>,

	/// # Recoverable Errors.
	pub errors: Vec<String>,
}



#[derive(Debug, Clone)]
/// # `read-toc` Output Parser.
///
/// This consumes the (stderr) chatter of a `cdrdao read-toc` run as it
/// arrives, in whatever sized chunks, building up a table of the tracks it
/// announces, and tracking progress through the subsequent analysis.
///
/// Output is expected in roughly the following shape:
///
/// ```text
/// Cdrdao version 1.2.4 - (C) Andreas Mueller <andreas@daneb.de>
/// ...
/// Track   Mode    Flags  Start                Length
/// ------------------------------------------------------------
///  1      AUDIO   0      00:00:00(     0)     04:35:30( 20655)
///  2      AUDIO   0      04:35:30( 20655)     03:40:71( 16571)
/// Leadout AUDIO   0      08:16:26( 37226)
/// ...
/// Analyzing track 01 (AUDIO): start 00:00:00, length 04:35:30...
/// 00:01:00\r00:02:00\r...
/// ```
pub struct OutputParser {
	/// # Line Buffer.
	buf: LineBuffer,

	/// # Counter Scan Position.
	///
	/// The number of pending bytes already checked for counters.
	scanned: usize,

	/// # State.
	state: ParseState,

	/// # Session.
	session: u8,

	/// # Table.
	table: Table,

	/// # Track Count.
	tracks: u8,

	/// # First Track Number (As Printed).
	///
	/// `cdrdao` numbers tracks disc-wide, so this is where the session's own
	/// numbering starts.
	first: Option<u8>,

	/// # Total Frames.
	frames: Option<u32>,

	/// # Track Being Analyzed.
	track: Option<u8>,

	/// # Description.
	description: String,

	/// # Version.
	version: Option<String>,

	/// # Recoverable Errors.
	errors: Vec<String>,

	/// # Fatal Error.
	fatal: Option<String>,
}

impl OutputParser {
	#[must_use]
	/// # New.
	pub fn new(session: u8) -> Self {
		Self {
			buf: LineBuffer::default(),
			scanned: 0,
			state: ParseState::Start,
			session,
			table: Table::default(),
			tracks: 0,
			first: None,
			frames: None,
			track: None,
			description: format!("Reading session {session}…"),
			version: None,
			errors: Vec::new(),
			fatal: None,
		}
	}

	/// # Feed.
	///
	/// Process a chunk of output. Complete lines are parsed immediately; any
	/// trailing fragment is held until the rest of it arrives.
	pub fn feed(&mut self, chunk: &[u8]) -> Flow {
		if let Some(err) = &self.fatal { return Flow::Abort(err.clone()); }
		if matches!(self.state, ParseState::Done) || chunk.is_empty() {
			return Flow::Idle;
		}

		// Hold onto the bytes the counter scan hasn't seen yet.
		let before = self.buf.pending().len();
		let mut fresh = self.buf.pending()[self.scanned.min(before)..].to_vec();
		fresh.extend_from_slice(chunk);

		let lines = self.buf.feed(chunk);
		let drained = before + chunk.len() - self.buf.pending().len();
		let mut fallback = None;
		for line in &lines {
			let old = self.track;
			if let Some(err) = self.parse_line(line) {
				// Anything after this is moot.
				return Flow::Abort(err);
			}
			if self.track != old { fallback = self.track_progress(); }
		}

		// Counters only show up during analysis.
		let mut progress = None;
		let mut consumed = 0;
		if matches!(self.state, ParseState::Leadout) {
			if let Some(last) = fresh.iter().rposition(|b| b'\r'.eq(b)) {
				consumed = last + 1;
				progress = self.scan_counters(&fresh[..last]);
			}
		}
		self.scanned = (self.scanned.min(before) + consumed).saturating_sub(drained);

		let progress = progress.or(fallback);
		if lines.is_empty() && progress.is_none() { Flow::Idle }
		else { Flow::Continue { progress } }
	}

	/// # Done.
	///
	/// Stop parsing. Further feeds are ignored.
	pub fn done(&mut self) { self.state = ParseState::Done; }

	/// # Finish.
	///
	/// Flush any unterminated output, then decide the outcome of the run
	/// given the program's exit status.
	///
	/// ## Errors
	///
	/// Returns an error if exclusive access was denied, or the program failed.
	/// In the latter case, any `ERROR:` lines collected along the way make up
	/// the message.
	pub fn finish(mut self, exit: Exit) -> Result<Parsed, TocTocError> {
		if let Some(line) = self.buf.finish() {
			if self.fatal.is_none() && ! matches!(self.state, ParseState::Done) {
				let _res = self.parse_line(&line);
			}
		}
		self.state = ParseState::Done;

		if let Some(err) = self.fatal { return Err(TocTocError::DeviceAccess(err)); }
		conclude(exit, &self.errors)?;

		Ok(Parsed {
			table: self.table,
			version: self.version,
			errors: self.errors,
		})
	}
}

impl OutputParser {
	#[must_use]
	/// # State.
	pub const fn state(&self) -> ParseState { self.state }

	#[must_use]
	/// # Session.
	pub const fn session(&self) -> u8 { self.session }

	#[must_use]
	/// # Table (So Far).
	pub const fn table(&self) -> &Table { &self.table }

	#[must_use]
	/// # Track Count (So Far).
	pub const fn tracks(&self) -> u8 { self.tracks }

	#[must_use]
	/// # Track Being Analyzed.
	///
	/// This uses the session's own numbering, i.e. one is the session's
	/// first track.
	pub const fn track(&self) -> Option<u8> { self.track }

	#[must_use]
	/// # Description.
	pub fn description(&self) -> &str { &self.description }

	#[must_use]
	/// # Version.
	pub fn version(&self) -> Option<&str> { self.version.as_deref() }

	#[must_use]
	/// # Errors (So Far).
	pub fn errors(&self) -> &[String] { &self.errors }
}

impl OutputParser {
	/// # Parse Line.
	///
	/// Returns the reason if the line was fatal.
	fn parse_line(&mut self, line: &[u8]) -> Option<String> {
		let line = visible(line);

		// Errors are errors no matter where they turn up.
		if let Some(diag) = Diagnostic::classify(line) {
			return record(&diag, &mut self.errors, &mut self.fatal);
		}

		match self.state {
			ParseState::Start => self.parse_start(line),
			ParseState::Track => self.parse_track(line),
			ParseState::Leadout => self.parse_leadout(line),
			ParseState::Done => {},
		}

		None
	}

	/// # Parse (Start).
	fn parse_start(&mut self, line: &[u8]) {
		if let Some(v) = parse_version(line) {
			log::debug!("Found cdrdao version {v}.");
			self.version = Some(v);
		}
		else if line == TRACK_HEADER {
			log::debug!("Found track header; moving to TRACK state.");
			self.state = ParseState::Track;
		}
	}

	/// # Parse (Track).
	fn parse_track(&mut self, line: &[u8]) {
		if line.starts_with(b"---") { return; }

		if let Some(caps) = re_track().captures(line) {
			let start = caps.name("start").and_then(|m| u32::btou(m.as_bytes().trim_ascii()));
			let Some(start) = start else { return; };
			let mode = caps.name("mode").map_or(TrackMode::Data, |m| TrackMode::from(m.as_bytes()));

			let printed = caps.name("track").and_then(|m| u8::btou(m.as_bytes().trim_ascii()));
			self.tracks = self.tracks.saturating_add(1);
			if self.first.is_none() { self.first = printed; }

			let mut track = Track::new(self.tracks, self.session).with_mode(mode);
			if track.index(1, Some(start), None).is_ok() {
				log::debug!(
					"Found absolute track {}, session-relative {} at {start}.",
					printed.unwrap_or(self.tracks),
					self.tracks,
				);
				self.table.push(track);
			}
		}
		else if let Some(start) = re_leadout().captures(line)
			.and_then(|c| c.name("start"))
			.and_then(|m| u32::btou(m.as_bytes().trim_ascii()))
		{
			log::debug!("Found leadout at {start}; moving to LEADOUT state.");
			log::info!("{} tracks found for session {}.", self.tracks, self.session);
			self.frames = Some(start);
			self.table.set_leadout(Some(start));
			self.state = ParseState::Leadout;
		}
	}

	/// # Parse (Leadout).
	fn parse_leadout(&mut self, line: &[u8]) {
		if let Some(track) = re_analyzing().captures(line)
			.and_then(|c| c.name("track"))
			.and_then(|m| u8::btou(m.as_bytes()))
		{
			log::debug!("Analyzing track {track}.");
			self.description = format!("Analyzing track {track}…");
			self.track = Some(self.local_track(track));
		}
	}

	/// # Session-Relative Track Number.
	///
	/// Convert a disc-wide track number to the session's own numbering.
	fn local_track(&self, track: u8) -> u8 {
		let first = self.first.unwrap_or(1);
		track.checked_sub(first).map_or(track, |v| v.saturating_add(1))
	}

	/// # Scan Counters.
	///
	/// Look through the carriage-return-terminated segments for the last
	/// valid counter, returning the corresponding progress.
	fn scan_counters(&self, raw: &[u8]) -> Option<f64> {
		let frames = self.frames.filter(|v| 0 != *v)?;
		let elapsed = raw.split(|b| b'\r'.eq(b))
			.rev()
			.find_map(|seg| {
				// Real lines can precede the first counter.
				let seg = seg.iter()
					.rposition(|b| b'\n'.eq(b))
					.map_or(seg, |p| &seg[p + 1..]);
				let caps = re_position().captures(seg)?;
				let a = caps.get(1).and_then(|m| u32::btou(m.as_bytes()))?;
				let b = caps.get(2).and_then(|m| u32::btou(m.as_bytes()))?;
				let c = caps.get(3).and_then(|m| u32::btou(m.as_bytes()))?;
				Some(a * 60 * FRAMES_PER_SECOND + b * FRAMES_PER_SECOND + c)
			})?;

		let start = self.table.track(self.track.unwrap_or(1))
			.and_then(Track::start)
			.unwrap_or(0);
		let now = start.saturating_add(elapsed);
		log::trace!("At frame {now} of {frames}.");

		Some(f64::from(now) / f64::from(frames))
	}

	/// # Track Progress.
	///
	/// The coarse fallback: the share of tracks already analyzed.
	fn track_progress(&self) -> Option<f64> {
		let track = self.track?;
		if self.tracks == 0 { None }
		else {
			Some(f64::from(track.saturating_sub(1)) / f64::from(self.tracks))
		}
	}
}



#[derive(Debug, Clone, Default)]
/// # `disk-info` Output Parser.
///
/// This is a much simpler affair: all that's wanted is the session count.
/// Both output channels are checked, each with its own line buffer.
pub struct DiscInfoParser {
	/// # Line Buffer (STDOUT).
	out: LineBuffer,

	/// # Line Buffer (STDERR).
	err: LineBuffer,

	/// # Sessions.
	sessions: Option<u8>,

	/// # Recoverable Errors.
	errors: Vec<String>,

	/// # Fatal Error.
	fatal: Option<String>,
}

impl DiscInfoParser {
	/// # Feed.
	pub fn feed(&mut self, channel: Channel, chunk: &[u8]) -> Flow {
		if let Some(err) = &self.fatal { return Flow::Abort(err.clone()); }

		let lines = match channel {
			Channel::Stdout => self.out.feed(chunk),
			Channel::Stderr => self.err.feed(chunk),
		};
		if lines.is_empty() { return Flow::Idle; }

		for line in &lines {
			if let Some(err) = self.parse_line(line) { return Flow::Abort(err); }
		}

		Flow::Continue { progress: None }
	}

	#[must_use]
	/// # Sessions (So Far).
	pub const fn sessions(&self) -> Option<u8> { self.sessions }

	/// # Finish.
	///
	/// ## Errors
	///
	/// Returns an error if exclusive access was denied, the program failed,
	/// or no (positive) session count was found.
	pub fn finish(mut self, exit: Exit) -> Result<u8, TocTocError> {
		for line in [self.out.finish(), self.err.finish()].into_iter().flatten() {
			if self.fatal.is_none() { let _res = self.parse_line(&line); }
		}

		if let Some(err) = self.fatal { return Err(TocTocError::DeviceAccess(err)); }
		conclude(exit, &self.errors)?;

		self.sessions.filter(|v| 0 != *v).ok_or(TocTocError::Sessions)
	}

	/// # Parse Line.
	fn parse_line(&mut self, line: &[u8]) -> Option<String> {
		let line = visible(line);
		if let Some(diag) = Diagnostic::classify(line) {
			return record(&diag, &mut self.errors, &mut self.fatal);
		}

		if let Some(rest) = line.strip_prefix(b"Sessions") {
			let sessions = rest.iter()
				.position(|b| b':'.eq(b))
				.and_then(|p| u8::btou(rest[p + 1..].trim_ascii()));
			if let Some(sessions) = sessions {
				log::debug!("Found {sessions} session(s).");
				self.sessions = Some(sessions);
			}
		}

		None
	}
}



/// # Parse Version.
///
/// Pull the version out of a `cdrdao` banner line, if that's what it is.
pub(crate) fn parse_version(line: &[u8]) -> Option<String> {
	re_version().captures(line)
		.and_then(|c| c.get(1))
		.map(|m| String::from_utf8_lossy(m.as_bytes()).trim().to_owned())
		.filter(|v| ! v.is_empty())
}

/// # Conclude.
///
/// Turn an exit status and any collected errors into a final verdict.
/// Errors from a run that exits successfully are only worth a warning.
fn conclude(exit: Exit, errors: &[String]) -> Result<(), TocTocError> {
	if exit.success() {
		for e in errors { log::warn!("cdrdao: {e}"); }
		Ok(())
	}
	else if errors.is_empty() { Err(TocTocError::ProgramFailed(exit.code())) }
	else { Err(TocTocError::Program(errors.join("\n"))) }
}

/// # Record Diagnostic.
///
/// Add the message to the error list, and for fatal ones, mark the parser
/// as finished. Returns the message if it was fatal.
fn record(diag: &Diagnostic, errors: &mut Vec<String>, fatal: &mut Option<String>)
-> Option<String> {
	let msg = diag.message().to_owned();
	if diag.is_fatal() {
		log::debug!("Fatal cdrdao error: {msg}");
		errors.push(msg.clone());
		fatal.replace(msg.clone());
		Some(msg)
	}
	else {
		log::debug!("Found cdrdao error: {msg}");
		errors.push(msg);
		None
	}
}

/// # Visible Text.
///
/// Counters are redrawn in place with carriage returns, so only the part of
/// a line after the last one would have been visible in a terminal.
fn visible(line: &[u8]) -> &[u8] {
	let line = line.trim_end_matches(|b| b == b'\r');
	line.iter()
		.rposition(|b| b'\r'.eq(b))
		.map_or(line, |p| &line[p + 1..])
}



/// # Regex: Analyzing.
fn re_analyzing() -> &'static Regex {
	RE_ANALYZING.get_or_init(|| Regex::new(r"^Analyzing track (?P<track>\d+)").expect("Bad regex."))
}

/// # Regex: Error.
fn re_error() -> &'static Regex {
	RE_ERROR.get_or_init(|| Regex::new(r"^ERROR: (?P<error>.*)").expect("Bad regex."))
}

/// # Regex: Exclusive Access Error.
fn re_exclusive() -> &'static Regex {
	RE_EXCLUSIVE.get_or_init(|| Regex::new(
		r"^ERROR: init: (?P<error>ObtainExclusiveAccess failed):"
	).expect("Bad regex."))
}

/// # Regex: Leadout Row.
fn re_leadout() -> &'static Regex {
	RE_LEADOUT.get_or_init(|| Regex::new(
		r"^Leadout\s\w+\s+\d\s+\d\d:\d\d:\d\d\((?P<start>[^)]+)\)"
	).expect("Bad regex."))
}

/// # Regex: Counter.
fn re_position() -> &'static Regex {
	RE_POSITION.get_or_init(|| Regex::new(r"^(\d\d):(\d\d):(\d\d)").expect("Bad regex."))
}

/// # Regex: Track Row.
fn re_track() -> &'static Regex {
	RE_TRACK.get_or_init(|| Regex::new(
		r"^(?P<track>[\d\s]{2})\s+(?P<mode>\w+)\s+\d\s+\d\d:\d\d:\d\d\((?P<start>[^)]+)\)\s+\d\d:\d\d:\d\d\((?P<length>[^)]+)\)"
	).expect("Bad regex."))
}

/// # Regex: Version Banner.
fn re_version() -> &'static Regex {
	RE_VERSION.get_or_init(|| Regex::new(r"^Cdrdao version (?P<version>.+?) -").expect("Bad regex."))
}
