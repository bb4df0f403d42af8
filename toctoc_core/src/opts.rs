/*!
# Toc Toc: Read Options
*/

use crate::CDRDAO;
use std::path::{
	Path,
	PathBuf,
};



/// # FLAG: Fast TOC.
const FLAG_FAST: u8 =    0b0000_0001;

/// # FLAG: Summary.
const FLAG_SUMMARY: u8 = 0b0000_0010;

/// # FLAG: Verbose.
const FLAG_VERBOSE: u8 = 0b0000_0100;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_SUMMARY;



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Read Options.
///
/// This struct holds the settings for a table-of-contents read.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use toctoc_core::ReadOptions;
///
/// let opts = ReadOptions::default()
///     .with_fast(true)
///     .with_program("/opt/bin/cdrdao");
///
/// assert!(opts.fast());
/// assert_eq!(opts.program(), std::path::Path::new("/opt/bin/cdrdao"));
/// ```
pub struct ReadOptions {
	flags: u8,
	program: Option<PathBuf>,
}

impl Default for ReadOptions {
	fn default() -> Self {
		Self {
			flags: FLAG_DEFAULT,
			program: None,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl ReadOptions {
	with_flag!(
		with_fast,
		FLAG_FAST,
		"# Fast TOC.",
		"",
		"When `true`, `cdrdao` is asked for a fast TOC: track starts and the",
		"leadout, but no scan for pregaps or sub-indexes.",
		"",
		"The default is `false`.",
	);

	#[must_use]
	/// # Program Path.
	///
	/// Run this `cdrdao` executable instead of whichever one is first in the
	/// `$PATH`. Empty values are ignored.
	pub fn with_program<P>(self, program: P) -> Self
	where P: AsRef<Path> {
		let program = program.as_ref();
		let program =
			if program.as_os_str().is_empty() { None }
			else { Some(program.to_path_buf()) };

		Self {
			program,
			..self
		}
	}

	with_flag!(
		with_summary,
		FLAG_SUMMARY,
		"# Summarize Drive.",
		"",
		"When `true`, the drive details are printed before reading begins.",
		"",
		"The default is `true`.",
	);

	with_flag!(
		with_verbose,
		FLAG_VERBOSE,
		"# Verbose.",
		"",
		"When `true`, the parsing details are logged as they happen.",
		"",
		"The default is `false`.",
	);
}



macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl ReadOptions {
	get_flag!(fast, FLAG_FAST, "Fast TOC");
	get_flag!(summary, FLAG_SUMMARY, "Summarize Drive");
	get_flag!(verbose, FLAG_VERBOSE, "Verbose");

	#[must_use]
	/// # Program Path.
	pub fn program(&self) -> &Path {
		self.program.as_deref().unwrap_or_else(|| Path::new(CDRDAO))
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_read_flags() {
		// Make sure our flags are unique.
		let mut all = vec![FLAG_FAST, FLAG_SUMMARY, FLAG_VERBOSE];
		all.sort_unstable();
		all.dedup();
		assert_eq!(all.len(), 3);
	}

	#[test]
	fn t_read_options() {
		let opts = ReadOptions::default();
		assert!(! opts.fast());
		assert!(opts.summary());
		assert!(! opts.verbose());
		assert_eq!(opts.program(), Path::new("cdrdao"));

		let opts = opts.with_fast(true).with_summary(false).with_verbose(true);
		assert!(opts.fast());
		assert!(! opts.summary());
		assert!(opts.verbose());

		// And back again.
		let opts = opts.with_fast(false);
		assert!(! opts.fast());
		assert!(opts.verbose());
	}

	#[test]
	fn t_program() {
		let opts = ReadOptions::default().with_program("/usr/local/bin/cdrdao");
		assert_eq!(opts.program(), Path::new("/usr/local/bin/cdrdao"));

		let opts = opts.with_program("");
		assert_eq!(opts.program(), Path::new(CDRDAO));
	}
}
