/*!
# Toc Toc: Frame Arithmetic
*/

use crate::FRAMES_PER_SECOND;
use dactyl::traits::BytesToUnsigned;



/// # MSF to Frames.
///
/// Convert an `MM:SS:FF` timestamp (or a bare frame count) into frames.
///
/// Returns `None` if the value is malformed or out of range.
///
/// ## Examples
///
/// ```
/// use toctoc_core::msf_to_frames;
///
/// assert_eq!(msf_to_frames(b"00:02:00"), Some(150));
/// assert_eq!(msf_to_frames(b"03:40:71"), Some(16_571));
/// assert_eq!(msf_to_frames(b"1234"), Some(1234));
/// assert_eq!(msf_to_frames(b"00:60"), None);
/// ```
pub fn msf_to_frames(src: &[u8]) -> Option<u32> {
	let src = src.trim_ascii();
	if ! src.contains(&b':') { return u32::btou(src); }

	let mut parts = src.split(|b| b':'.eq(b));
	let m = parts.next().and_then(u32::btou)?;
	let s = parts.next().and_then(u32::btou)?;
	let f = parts.next().and_then(u32::btou)?;
	if parts.next().is_some() || 59 < s || FRAMES_PER_SECOND <= f { return None; }

	m.checked_mul(60 * FRAMES_PER_SECOND)?
		.checked_add(s * FRAMES_PER_SECOND)?
		.checked_add(f)
}

#[must_use]
#[allow(clippy::integer_division)] // It's intentional.
/// # Frames to MSF.
///
/// Format a frame count as an `MM:SS:FF` timestamp.
///
/// ## Examples
///
/// ```
/// use toctoc_core::frames_to_msf;
///
/// assert_eq!(frames_to_msf(150), "00:02:00");
/// assert_eq!(frames_to_msf(16_571), "03:40:71");
/// ```
pub fn frames_to_msf(frames: u32) -> String {
	let f = frames % FRAMES_PER_SECOND;
	let s = (frames / FRAMES_PER_SECOND) % 60;
	let m = frames / FRAMES_PER_SECOND / 60;
	format!("{m:02}:{s:02}:{f:02}")
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_msf() {
		for (raw, frames) in [
			("00:00:00", 0),
			("00:00:74", 74),
			("00:01:00", 75),
			("01:00:00", 4500),
			("79:59:74", 359_999),
		] {
			assert_eq!(msf_to_frames(raw.as_bytes()), Some(frames), "Failed to parse {raw}.");
			assert_eq!(frames_to_msf(frames), raw, "Failed to format {frames}.");
		}

		// Bad stuff.
		for raw in ["", "00:00", "00:00:75", "00:61:00", "aa:bb:cc", "00:00:00:00"] {
			assert_eq!(msf_to_frames(raw.as_bytes()), None, "Parsed {raw:?}.");
		}

		// Whitespace is fine.
		assert_eq!(msf_to_frames(b" 00:02:00 "), Some(150));
	}
}
