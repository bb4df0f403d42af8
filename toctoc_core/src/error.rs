/*!
# Toc Toc: Errors
*/

use cdtoc::TocError;
#[cfg(feature = "bin")] use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r"
 _____         _____
|_   _|__  ___|_   _|__  ___
  | |/ _ \/ __| | |/ _ \/ __|   Toc Toc v", env!("CARGO_PKG_VERSION"), r"
  | | (_) \__ \ | | (_) \__ \   Multi-session CD table of contents
  |_|\___/\___/ |_|\___/\___/   reader, powered by cdrdao.

USAGE:
    toctoc [OPTIONS]

READ SETTINGS:
        --fast        Read a fast TOC, i.e. track starts and the leadout
                      without scanning for pregaps and sub-indexes. This is
                      much quicker, but less thorough.
        --cdrdao <PATH>
                      Use this cdrdao executable rather than whatever is in
                      the $PATH.

DRIVE SETTINGS:
    -d, --dev <PATH>  The device path for the optical drive containing the CD
                      of interest, like /dev/cdrom. [default: auto]
        --drives      List the detected optical drives with their vendor,
                      model, and firmware revision, then exit.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -v, --verbose     Print debug details from the cdrdao output as it is
                      parsed, along with a log header, to STDERR.
    -V, --version     Print version information to STDOUT and exit.
        --no-summary  Skip the drive summary and jump straight to reading.

EARLY EXIT:
    Press CTRL+C to stop cdrdao early. The table will not be printed.
");



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum TocTocError {
	/// # Bug!
	///
	/// A structural invariant was violated; this should never happen if the
	/// preceding steps succeeded.
	Bug(&'static str),

	/// # CDTOC passthrough.
	Cdtoc(TocError),

	/// # Invalid device.
	Device(String),

	/// # Exclusive device access denied.
	///
	/// Some other process (or the OS automounter) is holding the drive.
	/// Retrying won't help until it lets go.
	DeviceAccess(String),

	/// # Index without an offset.
	Index(u8, u8),

	/// # User Abort.
	Killed,

	/// # Unable to get leadout.
	Leadout,

	/// # Missing program.
	MissingProgram(&'static str),

	/// # No drive.
	NoDrive,

	/// # Program error(s).
	///
	/// One or more `ERROR:` lines were reported by a run that ultimately
	/// failed.
	Program(String),

	/// # Program exited with a failure code.
	ProgramFailed(Option<i32>),

	/// # Unable to determine the session count.
	Sessions,

	/// # Invalid/unreadable TOC file.
	TocFile(String),

	/// # Invalid TOC file line.
	TocLine(usize),

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for TocTocError {}

impl From<TocError> for TocTocError {
	#[inline]
	fn from(err: TocError) -> Self { Self::Cdtoc(err) }
}

#[cfg(feature = "bin")]
impl From<TocTocError> for Msg {
	#[inline]
	fn from(src: TocTocError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for TocTocError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::Cdtoc(s) => write!(f, "{s}"),
			Self::Device(s) => write!(f, "Invalid device path {s}."),
			Self::DeviceAccess(s) => write!(f, "Unable to obtain exclusive access to the drive: {s}"),
			Self::Index(t, i) => write!(f, "Track #{t}, index #{i} has no offset."),
			Self::Killed => f.write_str("User abort."),
			Self::Leadout => f.write_str("Unable to obtain leadout."),
			Self::MissingProgram(s) => write!(f, "Unable to run {s}; is it installed?"),
			Self::NoDrive => f.write_str("No optical drives were found."),
			Self::Program(s) => f.write_str(s),
			Self::ProgramFailed(code) =>
				if let Some(code) = code { write!(f, "The program exited with code {code}.") }
				else { f.write_str("The program was terminated by a signal.") },
			Self::Sessions => f.write_str("Unable to obtain the number of sessions."),
			Self::TocFile(s) => write!(f, "Unable to read TOC file {s}."),
			Self::TocLine(n) => write!(f, "Invalid TOC file entry on line {n}."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Toc Toc v", env!("CARGO_PKG_VERSION"))),
		}
	}
}

impl TocTocError {
	#[must_use]
	/// # Is Fatal?
	///
	/// Returns `true` for conditions a retry cannot fix without outside
	/// intervention, like another program holding the drive or cdrdao not
	/// being installed.
	pub const fn is_fatal(&self) -> bool {
		matches!(
			self,
			Self::Bug(_) | Self::DeviceAccess(_) | Self::Killed | Self::MissingProgram(_)
		)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_display() {
		assert_eq!(
			TocTocError::ProgramFailed(Some(1)).to_string(),
			"The program exited with code 1.",
		);
		assert_eq!(
			TocTocError::ProgramFailed(None).to_string(),
			"The program was terminated by a signal.",
		);
		assert_eq!(
			TocTocError::Program("a\nb".to_owned()).to_string(),
			"a\nb",
		);
		assert_eq!(
			TocTocError::MissingProgram("cdrdao").to_string(),
			"Unable to run cdrdao; is it installed?",
		);
	}

	#[test]
	fn t_fatal() {
		assert!(TocTocError::DeviceAccess(String::new()).is_fatal());
		assert!(TocTocError::MissingProgram("cdrdao").is_fatal());
		assert!(! TocTocError::Program(String::new()).is_fatal());
		assert!(! TocTocError::ProgramFailed(Some(1)).is_fatal());
	}
}
