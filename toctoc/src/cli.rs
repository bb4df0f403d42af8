/*!
# Toc Toc: CLI
*/

use argyle::Argument;
use toctoc_core::{
	ReadOptions,
	TocTocError,
};



#[derive(Debug, Clone, Default)]
/// # Settings.
///
/// Everything gleaned from the command line.
pub(super) struct Settings {
	/// # Read Options.
	pub(super) opts: ReadOptions,

	/// # Device Path.
	pub(super) dev: Option<String>,

	/// # List Drives and Exit.
	pub(super) drives: bool,
}



/// # Parse Options.
pub(super) fn parse() -> Result<Settings, TocTocError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut out = Settings::default();
	for arg in args {
		match arg {
			Argument::Key("--drives") => { out.drives = true; },
			Argument::Key("--fast") => { out.opts = out.opts.with_fast(true); },
			Argument::Key("-h" | "--help") => return Err(TocTocError::PrintHelp),
			Argument::Key("--no-summary") => {
				out.opts = out.opts.with_summary(false);
			},
			Argument::Key("-v" | "--verbose") => {
				out.opts = out.opts.with_verbose(true);
			},
			Argument::Key("-V" | "--version") => return Err(TocTocError::PrintVersion),

			Argument::KeyWithValue("--cdrdao", s) => {
				let s = parse_path(&s, "--cdrdao")?;
				out.opts = out.opts.with_program(s);
			},
			Argument::KeyWithValue("-d" | "--dev", s) => {
				let s = parse_path(&s, "-d/--dev")?;
				out.dev.replace(s.to_owned());
			},

			Argument::Other(s) => return Err(TocTocError::CliArg(s)),

			_ => {},
		}
	}

	Ok(out)
}



/// # Parse Path.
///
/// Paths can be just about anything, but they can't be empty.
fn parse_path<'a>(raw: &'a str, flag: &'static str) -> Result<&'a str, TocTocError> {
	let raw = raw.trim();
	if raw.is_empty() { Err(TocTocError::CliParse(flag)) }
	else { Ok(raw) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_parse_path() {
		assert_eq!(parse_path(" /dev/sr0 ", "-d/--dev"), Ok("/dev/sr0"));
		assert_eq!(
			parse_path("  ", "-d/--dev"),
			Err(TocTocError::CliParse("-d/--dev")),
		);
		assert_eq!(
			parse_path("", "--cdrdao").map_err(|e| e.to_string()),
			Err("Unable to parse --cdrdao.".to_owned()),
		);
	}
}
