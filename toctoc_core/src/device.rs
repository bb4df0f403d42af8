/*!
# Toc Toc: Device Identity
*/

use regex::Regex;
use std::{
	borrow::Cow,
	fmt,
	path::{
		Path,
		PathBuf,
	},
	sync::OnceLock,
};



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Platform.
///
/// Device naming differs by operating system, so [`Device`] needs to know
/// which rules apply.
pub enum Platform {
	/// # macOS.
	Darwin,

	/// # Linux.
	Linux,

	/// # Windows.
	Windows,

	/// # Something Else.
	Other,
}

impl Platform {
	#[must_use]
	/// # Host Platform.
	pub const fn host() -> Self {
		if cfg!(target_os = "macos") { Self::Darwin }
		else if cfg!(target_os = "linux") { Self::Linux }
		else if cfg!(target_os = "windows") { Self::Windows }
		else { Self::Other }
	}
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Device.
///
/// An optical drive path, in both its raw and non-raw (block) forms.
///
/// On macOS, `/dev/diskN` and `/dev/rdiskN` are two views of the same drive:
/// the raw one is what reading programs want, the other is what gets mounted
/// and unmounted. Everywhere else the two are one and the same.
///
/// ## Examples
///
/// ```
/// use toctoc_core::{Device, Platform};
///
/// let dev = Device::new("/dev/disk3", Platform::Darwin);
/// assert_eq!(dev.raw(), "/dev/rdisk3");
/// assert_eq!(dev.non_raw(), "/dev/disk3");
///
/// let dev = Device::new("/dev/sr0", Platform::Linux);
/// assert_eq!(dev.raw(), "/dev/sr0");
/// assert_eq!(dev.non_raw(), "/dev/sr0");
/// ```
pub struct Device {
	/// # Path as Given.
	path: String,

	/// # Raw Path.
	raw: String,

	/// # Non-Raw Path.
	non_raw: String,

	/// # Platform.
	platform: Platform,
}

impl fmt::Display for Device {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path)
	}
}

impl Device {
	#[must_use]
	/// # New.
	///
	/// Only the first `disk` reference in the path is rewritten; paths that
	/// don't contain one are left as they are.
	pub fn new<S>(path: S, platform: Platform) -> Self
	where S: Into<String> {
		let path: String = path.into();
		let (raw, non_raw) =
			if matches!(platform, Platform::Darwin) {
				let re = darwin_re();
				(
					re.replace(&path, "/dev/rdisk$2").into_owned(),
					re.replace(&path, "/dev/disk$2").into_owned(),
				)
			}
			else { (path.clone(), path.clone()) };

		Self { path, raw, non_raw, platform }
	}

	#[must_use]
	/// # Path (As Given).
	pub fn path(&self) -> &str { &self.path }

	#[must_use]
	/// # Raw Path.
	pub fn raw(&self) -> &str { &self.raw }

	#[must_use]
	/// # Non-Raw Path.
	pub fn non_raw(&self) -> &str { &self.non_raw }

	#[must_use]
	/// # Platform.
	pub const fn platform(&self) -> Platform { self.platform }

	#[must_use]
	/// # Device Argument for `cdrdao`.
	///
	/// On macOS, `cdrdao` addresses drives by SCSI bus/id/lun rather than
	/// path; the first (and usually only) drive is `0,0,0`.
	pub fn cdrdao_device(&self) -> Cow<'_, str> {
		if matches!(self.platform, Platform::Darwin) { Cow::Borrowed("0,0,0") }
		else { Cow::Borrowed(&self.raw) }
	}

	#[must_use]
	/// # Real Path.
	///
	/// Resolve symlinks like `/dev/cdrom` to the underlying device node,
	/// falling back to the path as given.
	pub fn real_path(&self) -> PathBuf {
		let path = Path::new(&self.path);
		std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
	}
}



/// # Darwin Disk Regex.
fn darwin_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"/dev/(r?)disk(\d+)").expect("Bad regex."))
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_darwin() {
		for (raw, expected_raw, expected_non) in [
			("/dev/disk1", "/dev/rdisk1", "/dev/disk1"),
			("/dev/rdisk1", "/dev/rdisk1", "/dev/disk1"),
			("/dev/disk12", "/dev/rdisk12", "/dev/disk12"),
			("/dev/cdrom", "/dev/cdrom", "/dev/cdrom"),
			// Only the first match.
			("/dev/disk2/dev/disk3", "/dev/rdisk2/dev/disk3", "/dev/disk2/dev/disk3"),
		] {
			let dev = Device::new(raw, Platform::Darwin);
			assert_eq!(dev.raw(), expected_raw, "Raw mismatch for {raw}.");
			assert_eq!(dev.non_raw(), expected_non, "Non-raw mismatch for {raw}.");
			assert_eq!(dev.path(), raw);
			assert_eq!(dev.cdrdao_device(), "0,0,0");
		}
	}

	#[test]
	fn t_other() {
		for platform in [Platform::Linux, Platform::Windows, Platform::Other] {
			for raw in ["/dev/rdisk1", "/dev/disk1", "/dev/sr0"] {
				let dev = Device::new(raw, platform);
				assert_eq!(dev.raw(), raw);
				assert_eq!(dev.non_raw(), raw);
				assert_eq!(dev.cdrdao_device(), raw);
			}
		}
	}

	#[test]
	fn t_real_path() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let file = dir.path().join("sr0");
		std::fs::write(&file, b"").expect("Write failed.");

		let dev = Device::new(file.to_string_lossy(), Platform::Linux);
		assert_eq!(
			dev.real_path(),
			std::fs::canonicalize(&file).expect("Canonicalize failed."),
		);

		// Missing paths come back as-is.
		let dev = Device::new("/no/such/toctoc/device", Platform::Linux);
		assert_eq!(dev.real_path(), PathBuf::from("/no/such/toctoc/device"));
	}
}
