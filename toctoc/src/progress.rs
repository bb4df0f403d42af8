/*!
# Toc Toc: Progress Bar
*/

use fyi_msg::{
	Msg,
	Progless,
};
use std::sync::atomic::{
	AtomicU32,
	Ordering::SeqCst,
};
use toctoc_core::Progress;



/// # Steps.
///
/// Fractions are mapped onto this many ticks.
const STEPS: u32 = 1000;

/// # Not Started.
const IDLE: u32 = u32::MAX;



#[derive(Debug)]
/// # Progress Bar.
///
/// This feeds the library's fractional progress updates into a `Progless`.
pub(super) struct Bar {
	/// # Progress Bar.
	inner: Progless,

	/// # Ticks Done.
	done: AtomicU32,
}

impl Default for Bar {
	fn default() -> Self {
		Self {
			inner: Progless::default(),
			done: AtomicU32::new(IDLE),
		}
	}
}

impl Progress for Bar {
	fn set_title(&self, title: &str) {
		self.inner.set_title(Some(Msg::custom("Toc Toc", 199, title)));
	}

	fn set_fraction(&self, fraction: f64) {
		let next = ticks(fraction);
		let done = self.done.load(SeqCst);

		// Each step starts over at zero.
		if done == IDLE || next == 0 {
			let _res = self.inner.reset(STEPS);
			self.done.store(0, SeqCst);
			if next != 0 { self.advance(0, next); }
		}
		else if done < next { self.advance(done, next); }
	}
}

impl Bar {
	/// # Advance.
	fn advance(&self, from: u32, to: u32) {
		self.inner.increment_n(to - from);
		self.done.store(to, SeqCst);
	}

	/// # Finish.
	pub(super) fn finish(&self) {
		if self.done.swap(IDLE, SeqCst) != IDLE { self.inner.finish(); }
	}
}



#[expect(clippy::cast_possible_truncation, reason = "Clamped.")]
#[expect(clippy::cast_sign_loss, reason = "Clamped.")]
/// # Fraction to Ticks.
fn ticks(fraction: f64) -> u32 {
	if fraction.is_nan() { 0 }
	else { (fraction.clamp(0.0, 1.0) * f64::from(STEPS)).round() as u32 }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_ticks() {
		assert_eq!(ticks(0.0), 0);
		assert_eq!(ticks(0.25), 250);
		assert_eq!(ticks(1.0), STEPS);
		assert_eq!(ticks(1.5), STEPS);
		assert_eq!(ticks(-1.0), 0);
		assert_eq!(ticks(f64::NAN), 0);
	}
}
