/*!
# Disc Smith: Track Flags
*/



/// # FLAG: Digital Copy Permitted.
const FLAG_COPY: u8 =          0b0000_0001;

/// # FLAG: Pre-Emphasis.
const FLAG_PRE_EMPHASIS: u8 =  0b0000_0010;

/// # FLAG: Four-Channel Audio.
const FLAG_FOUR_CHANNEL: u8 =  0b0000_0100;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # Track Flags.
///
/// The control bits carried in the Q sub-channel and written to TOC files.
/// Flags are set using builder-style methods:
///
/// ```
/// use discsmith_core::TrackFlags;
///
/// let flags = TrackFlags::default().with_copy(true);
/// assert!(flags.copy());
/// assert!(! flags.pre_emphasis());
/// ```
pub struct TrackFlags(u8);

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			if v { Self(self.0 | $flag) }
			else { Self(self.0 & ! $flag) }
		}
	)
}

macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.0 & $flag }
	);
}

impl TrackFlags {
	with_flag!(
		with_copy,
		FLAG_COPY,
		"# Copy Permitted.",
		"",
		"The default is `false`.",
	);

	with_flag!(
		with_pre_emphasis,
		FLAG_PRE_EMPHASIS,
		"# Pre-Emphasis.",
		"",
		"Only meaningful for audio tracks. The default is `false`.",
	);

	with_flag!(
		with_four_channel,
		FLAG_FOUR_CHANNEL,
		"# Four-Channel Audio.",
		"",
		"Only meaningful for audio tracks. The default is `false`.",
	);

	get_flag!(copy, FLAG_COPY, "Copy Permitted");
	get_flag!(pre_emphasis, FLAG_PRE_EMPHASIS, "Pre-Emphasis");
	get_flag!(four_channel, FLAG_FOUR_CHANNEL, "Four-Channel Audio");

	#[must_use]
	/// # Q Control Nibble.
	///
	/// Return the control bits as they appear in the high nibble of the Q
	/// sub-channel's first byte, given whether or not the track is audio.
	pub const fn control(self, audio: bool) -> u8 {
		let mut out = 0;
		if self.four_channel() { out |= 0b1000; }
		if ! audio { out |= 0b0100; }
		if self.copy() { out |= 0b0010; }
		if self.pre_emphasis() { out |= 0b0001; }
		out
	}
}
