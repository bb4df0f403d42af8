/*!
# Toc Toc: Drives
*/

use crate::{
	cdio,
	LibcdioInstance,
};
use std::{
	fmt,
	path::Path,
	time::Duration,
};



/// # Probe Delays.
///
/// Drives can briefly disappear right after another program lets go of them
/// (macOS in particular). These are the pauses between attempts to find the
/// device again before giving up.
pub const PROBE_DELAYS: [Duration; 3] = [
	Duration::from_millis(500),
	Duration::from_secs(2),
	Duration::from_secs(10),
];

/// # Usual Suspects.
///
/// Checked when `libcdio` can't come up with anything.
const STATIC_PATHS: [&str; 3] = ["/dev/cdrom", "/dev/cdrecorder", "/dev/rdisk1"];



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Drive Info.
///
/// The vendor, model, and firmware revision reported by a drive.
pub struct DriveInfo {
	vendor: String,
	model: String,
	revision: String,
}

impl fmt::Display for DriveInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.vendor.is_empty() { f.write_str(&self.model)?; }
		else { write!(f, "{} {}", self.vendor, self.model)?; }

		if self.revision.is_empty() { Ok(()) }
		else { write!(f, " ({})", self.revision) }
	}
}

impl DriveInfo {
	#[must_use]
	/// # New.
	pub(crate) const fn new(vendor: String, model: String, revision: String) -> Self {
		Self { vendor, model, revision }
	}

	#[must_use]
	/// # Probe.
	///
	/// Ask the drive at `path` what it is, waiting (per [`PROBE_DELAYS`]) for
	/// the path to become available if need be.
	///
	/// Returns `None` if the drive never turns up or won't say.
	pub fn probe<P>(path: P) -> Option<Self>
	where P: AsRef<Path> {
		let path = path.as_ref();
		if ! wait_for_path(path, &PROBE_DELAYS) {
			log::warn!("{} is not available.", path.display());
			return None;
		}

		LibcdioInstance::new(path).ok()?.hwinfo()
	}

	#[must_use]
	/// # Vendor.
	pub fn vendor(&self) -> &str { &self.vendor }

	#[must_use]
	/// # Model.
	pub fn model(&self) -> &str { &self.model }

	#[must_use]
	/// # Revision.
	pub fn revision(&self) -> &str { &self.revision }
}



#[must_use]
/// # Drive Paths.
///
/// Return the paths of all known optical drives, falling back to a few
/// common locations if `libcdio` doesn't find any.
pub fn drive_paths() -> Vec<String> {
	let found = cdio::devices();
	if found.is_empty() {
		log::debug!("libcdio found no drives; checking the usual places.");
		STATIC_PATHS.iter()
			.filter(|p| Path::new(p).exists())
			.map(|p| (*p).to_owned())
			.collect()
	}
	else { found }
}

/// # Wait for Path.
///
/// Return `true` as soon as `path` can be stat'd, sleeping for each of the
/// `delays` in turn between attempts. Returns `false` if it never shows.
pub fn wait_for_path<P>(path: P, delays: &[Duration]) -> bool
where P: AsRef<Path> {
	let path = path.as_ref();
	if std::fs::metadata(path).is_ok() { return true; }

	for delay in delays {
		log::debug!("Waiting {}ms for {}.", delay.as_millis(), path.display());
		std::thread::sleep(*delay);
		if std::fs::metadata(path).is_ok() { return true; }
	}

	false
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_wait_for_path() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		assert!(wait_for_path(dir.path(), &[]));

		let missing = dir.path().join("sr0");
		let delays = [Duration::from_millis(1); 3];
		assert!(! wait_for_path(&missing, &delays));

		// Turn up mid-wait.
		let path = missing.clone();
		let handle = std::thread::spawn(move || {
			std::thread::sleep(Duration::from_millis(50));
			std::fs::write(&path, b"").expect("Write failed.");
		});
		assert!(wait_for_path(&missing, &[Duration::from_millis(200); 5]));
		handle.join().expect("Thread failed.");
	}

	#[test]
	fn t_display() {
		let info = DriveInfo::new("HL-DT-ST".to_owned(), "BD-RE WH16NS60".to_owned(), "1.02".to_owned());
		assert_eq!(info.to_string(), "HL-DT-ST BD-RE WH16NS60 (1.02)");
		assert_eq!(info.vendor(), "HL-DT-ST");

		let info = DriveInfo::new(String::new(), "Mystery".to_owned(), String::new());
		assert_eq!(info.to_string(), "Mystery");
	}
}
