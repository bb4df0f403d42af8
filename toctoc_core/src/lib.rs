/*!
# Toc Toc: Library

This library drives [`cdrdao`](http://cdrdao.sourceforge.net/) to read the
complete table of contents (including pregaps and sub-indexes) from every
session of an audio CD, producing a single frame-accurate [`Table`].

The general flow is:

1. Ask `cdrdao disk-info` how many sessions are on the disc;
2. Run `cdrdao read-toc` once for each session, parsing its chatter as it
   arrives for progress and errors, and reading the `.toc` file it writes;
3. Merge the per-session tables into one.

See [`read_all_sessions`] for the all-in-one entry point.
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod cdio;
mod device;
mod drive;
mod error;
mod lines;
mod msf;
mod opts;
mod parse;
mod program;
mod table;
mod task;
mod tocfile;

pub use abort::KillSwitch;
pub(crate) use cdio::LibcdioInstance;
pub use device::{
	Device,
	Platform,
};
pub use drive::{
	drive_paths,
	DriveInfo,
	PROBE_DELAYS,
	wait_for_path,
};
pub use error::TocTocError;
pub use lines::LineBuffer;
pub use msf::{
	frames_to_msf,
	msf_to_frames,
};
pub use opts::ReadOptions;
pub use parse::{
	Diagnostic,
	DiscInfoParser,
	Flow,
	OutputParser,
	ParseState,
	Parsed,
};
pub use program::{
	Cdrdao,
	Channel,
	Exit,
	Program,
};
pub use table::{
	Index,
	Table,
	Track,
	TrackMode,
};
pub use task::{
	cdrdao_version,
	NoProgress,
	Progress,
	read_all_sessions,
	read_session,
	run_discovery,
};
pub use tocfile::TocFile;



/// # Frames Per Second.
///
/// A frame (sector) is the smallest addressable unit on a CD.
pub const FRAMES_PER_SECOND: u32 = 75;

/// # Number of Lead-in Frames.
///
/// All discs have a 2-second region at the start before any data. `cdrdao`
/// numbers frames from the end of it, but most disc identifiers don't.
pub const CD_LEADIN: u32 = 150;

/// # Lead-out Label.
///
/// This is used solely for the table of contents printout; e.g. 01 02 03 AA.
pub const CD_LEADOUT_LABEL: &str = "AA";

/// # Session Gap (Second Session).
///
/// Lead-out/lead-in overhead (11,250) plus the pregap of the first track after
/// it (150).
pub const SESSION_GAP_FIRST: u32 = 11_400;

/// # Session Gap (Later Sessions).
///
/// Lead-out/lead-in overhead (6,750) plus the pregap of the first track after
/// it (150).
pub const SESSION_GAP_NEXT: u32 = 6_900;

/// # Program Name.
pub const CDRDAO: &str = "cdrdao";
