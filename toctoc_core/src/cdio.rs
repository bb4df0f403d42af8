/*!
# Toc Toc: `libcdio` Wrappers
*/

use crate::{
	DriveInfo,
	TocTocError,
};
use libcdio_sys::{
	cdio_hwinfo,
	driver_id_t_DRIVER_DEVICE, // The equivalent of "use whatever's best".
};
use std::{
	ffi::{
		CStr,
		CString,
	},
	os::{
		raw::c_char,
		unix::ffi::OsStrExt,
	},
	path::Path,
	sync::Once,
};



static LIBCDIO_INIT: Once = Once::new();



#[derive(Debug)]
#[allow(dead_code)] // We just want to make sure dev lives as long as the ptr.
/// # CDIO Instance.
///
/// This is only used to ask a drive about itself; reading is left to
/// `cdrdao`.
pub(crate) struct LibcdioInstance {
	dev: CString,
	ptr: *mut libcdio_sys::CdIo_t,
}

impl Drop for LibcdioInstance {
	#[allow(unsafe_code)]
	fn drop(&mut self) {
		// Release the C memory!
		if ! self.ptr.is_null() {
			unsafe { libcdio_sys::cdio_destroy(self.ptr); }
		}
	}
}

impl LibcdioInstance {
	#[allow(unsafe_code)]
	/// # New!
	///
	/// Connect to a specific device.
	///
	/// ## Errors
	///
	/// This will return an error if the path is obviously wrong or the device
	/// cannot be opened.
	pub(crate) fn new(dev: &Path) -> Result<Self, TocTocError> {
		// Make sure the library has been initialized.
		init();

		let original: String = dev.to_string_lossy().into_owned();
		if ! dev.exists() { return Err(TocTocError::Device(original)); }
		let dev = CString::new(dev.as_os_str().as_bytes())
			.map_err(|_| TocTocError::Device(original.clone()))?;

		let ptr = unsafe {
			libcdio_sys::cdio_open(dev.as_ptr(), driver_id_t_DRIVER_DEVICE)
		};

		// NULL is bad.
		if ptr.is_null() { Err(TocTocError::Device(original)) }
		else { Ok(Self { dev, ptr }) }
	}

	/// # As Ptr.
	const fn as_ptr(&self) -> *const libcdio_sys::CdIo_t { self.ptr.cast() }

	#[allow(unsafe_code, clippy::cast_sign_loss)]
	/// # Hardware Info.
	///
	/// Fetch the drive vendor, model, and firmware revision, if possible.
	pub(crate) fn hwinfo(&self) -> Option<DriveInfo> {
		let mut raw = cdio_hwinfo {
			psz_vendor: [0; 9],
			psz_model: [0; 17],
			psz_revision: [0; 5],
		};

		// The return code is a bool, true for good, instead of the usual
		// 0 for good.
		if 1 == unsafe { libcdio_sys::cdio_get_hwinfo(self.as_ptr(), &mut raw) } {
			// Rather than deal with the uncertainty of pointers, let's recast
			// the signs since we have everything right here.
			let vendor = bytes_to_string(&raw.psz_vendor.map(|b| b as u8));
			let model = bytes_to_string(&raw.psz_model.map(|b| b as u8));
			let revision = bytes_to_string(&raw.psz_revision.map(|b| b as u8));

			// Model is required.
			if model.is_empty() { None }
			else { Some(DriveInfo::new(vendor, model, revision)) }
		}
		else { None }
	}
}



#[allow(unsafe_code)]
/// # Device List.
///
/// Return the paths of the optical drives `libcdio` knows about.
pub(crate) fn devices() -> Vec<String> {
	init();

	let list = unsafe { libcdio_sys::cdio_get_devices(driver_id_t_DRIVER_DEVICE) };
	if list.is_null() { return Vec::new(); }

	let mut out = Vec::new();
	let mut ptr = list;
	loop {
		let entry = unsafe { *ptr };
		if entry.is_null() { break; }
		if let Some(path) = c_char_to_string(entry) {
			if ! out.contains(&path) { out.push(path); }
		}
		ptr = unsafe { ptr.add(1) };
	}

	unsafe { libcdio_sys::cdio_free_device_list(list); }
	out
}

#[allow(unsafe_code)]
/// # Initialize `libcdio`.
fn init() {
	LIBCDIO_INIT.call_once(|| unsafe { libcdio_sys::cdio_init(); });
}

/// # Fixed Buffer to String.
///
/// The hardware info fields are NUL-terminated, unless they're full.
fn bytes_to_string(src: &[u8]) -> String {
	let end = src.iter().position(|b| 0.eq(b)).unwrap_or(src.len());
	String::from_utf8_lossy(&src[..end]).trim().to_owned()
}

#[allow(unsafe_code)]
/// # Pointer to String.
///
/// Convert C-string pointers to a string, unless they're null.
fn c_char_to_string(ptr: *const c_char) -> Option<String> {
	if ptr.is_null() { None }
	else {
		unsafe { CStr::from_ptr(ptr) }
			.to_str()
			.ok()
			.map(|s| s.trim().to_owned())
			.filter(|s| ! s.is_empty())
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_bytes_to_string() {
		assert_eq!(bytes_to_string(b"HL-DT-ST\0"), "HL-DT-ST");
		assert_eq!(bytes_to_string(b"BD-RE  WH16NS60 \0"), "BD-RE  WH16NS60");
		assert_eq!(bytes_to_string(b"1.02"), "1.02");
		assert_eq!(bytes_to_string(b"\0\0\0\0\0"), "");
	}

	#[test]
	fn t_missing_device() {
		assert!(matches!(
			LibcdioInstance::new(Path::new("/no/such/toctoc/device")),
			Err(TocTocError::Device(_)),
		));
	}
}
