/*!
# Disc Smith: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::Acquire,
	},
};



#[derive(Debug, Clone, Copy)]
/// # Kill Switch.
///
/// The library never cancels anything on its own; long jobs are driven in
/// bursts by the caller, and the convenience loops ([`write_image`](crate::write_image),
/// [`Extractor::run`](crate::Extractor::run)) check this switch between
/// bursts.
///
/// The binary's CTRL-C intercept flips the value.
pub struct KillSwitch(&'static Arc<AtomicBool>);

impl From<&'static Arc<AtomicBool>> for KillSwitch {
	#[inline]
	fn from(src: &'static Arc<AtomicBool>) -> Self { Self(src) }
}

impl KillSwitch {
	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }
}
