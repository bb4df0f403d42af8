/*!
# Toc Toc: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Release,
		},
	},
};



#[derive(Debug, Clone, Default)]
/// # Kill Switch.
///
/// This is a short-circuit for the long-running `cdrdao` reads. Clones share
/// the same state, so the main program's CTRL-C intercept can hold one while
/// the read holds another.
///
/// Once flipped, the running subprocess is terminated and the read returns
/// [`TocTocError::Killed`](crate::TocTocError::Killed).
pub struct KillSwitch(Arc<AtomicBool>);

impl From<Arc<AtomicBool>> for KillSwitch {
	#[inline]
	fn from(src: Arc<AtomicBool>) -> Self { Self(src) }
}

impl KillSwitch {
	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }

	/// # Kill.
	pub fn kill(&self) { self.0.store(true, Release); }
}
