/*!
# Toc Toc: Table of Contents
*/

use cdtoc::Toc;
use crate::{
	CD_LEADIN,
	CD_LEADOUT_LABEL,
	frames_to_msf,
	SESSION_GAP_FIRST,
	SESSION_GAP_NEXT,
	TocTocError,
};
use std::{
	collections::BTreeMap,
	fmt,
};



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # Track Mode.
///
/// The modes `cdrdao` knows about. `Data` is a catch-all for anything it
/// reports that isn't one of the specific data modes.
pub enum TrackMode {
	#[default]
	/// # Red Book Audio.
	Audio,

	/// # Data (Unspecified).
	Data,

	/// # Mode 1.
	Mode1,

	/// # Mode 1 (Raw).
	Mode1Raw,

	/// # Mode 2.
	Mode2,

	/// # Mode 2, Form 1.
	Mode2Form1,

	/// # Mode 2, Form 2.
	Mode2Form2,

	/// # Mode 2, Mixed Forms.
	Mode2FormMix,

	/// # Mode 2 (Raw).
	Mode2Raw,
}

impl fmt::Display for TrackMode {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<&[u8]> for TrackMode {
	fn from(src: &[u8]) -> Self {
		match src.trim_ascii() {
			b"AUDIO" => Self::Audio,
			b"MODE1" => Self::Mode1,
			b"MODE1_RAW" => Self::Mode1Raw,
			b"MODE2" => Self::Mode2,
			b"MODE2_FORM1" => Self::Mode2Form1,
			b"MODE2_FORM2" => Self::Mode2Form2,
			b"MODE2_FORM_MIX" => Self::Mode2FormMix,
			b"MODE2_RAW" => Self::Mode2Raw,
			_ => Self::Data,
		}
	}
}

impl TrackMode {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Audio => "AUDIO",
			Self::Data => "DATA",
			Self::Mode1 => "MODE1",
			Self::Mode1Raw => "MODE1_RAW",
			Self::Mode2 => "MODE2",
			Self::Mode2Form1 => "MODE2_FORM1",
			Self::Mode2Form2 => "MODE2_FORM2",
			Self::Mode2FormMix => "MODE2_FORM_MIX",
			Self::Mode2Raw => "MODE2_RAW",
		}
	}

	#[must_use]
	/// # Is Audio?
	pub const fn is_audio(self) -> bool { matches!(self, Self::Audio) }
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Index.
///
/// A position within a track. Index one marks the start of the track proper;
/// index zero, when present, the start of its pregap.
///
/// Positions may be known in absolute terms (frames from the start of the
/// disc, sans lead-in) and/or relative terms (frames from the start of the
/// image backing the table). At least one of the two is always set.
pub struct Index {
	/// # Index Number.
	number: u8,

	/// # Absolute Offset.
	absolute: Option<u32>,

	/// # Relative Offset.
	relative: Option<u32>,
}

impl Index {
	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Absolute Offset.
	pub const fn absolute(&self) -> Option<u32> { self.absolute }

	#[must_use]
	/// # Relative Offset.
	pub const fn relative(&self) -> Option<u32> { self.relative }
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Track.
///
/// A track, its mode, and its indexes.
pub struct Track {
	/// # Track Number.
	number: u8,

	/// # Session Number.
	session: u8,

	/// # Mode.
	mode: TrackMode,

	/// # ISRC.
	isrc: Option<String>,

	/// # Indexes.
	indexes: BTreeMap<u8, Index>,
}

impl Track {
	#[must_use]
	/// # New.
	pub const fn new(number: u8, session: u8) -> Self {
		Self {
			number,
			session,
			mode: TrackMode::Audio,
			isrc: None,
			indexes: BTreeMap::new(),
		}
	}

	#[must_use]
	/// # With Mode.
	pub fn with_mode(self, mode: TrackMode) -> Self {
		Self { mode, ..self }
	}

	/// # Set Index.
	///
	/// Add or update an index. Offsets passed as `None` leave any existing
	/// value alone.
	///
	/// ## Errors
	///
	/// An error is returned if the resulting index would have neither an
	/// absolute nor relative offset.
	pub fn index(&mut self, number: u8, absolute: Option<u32>, relative: Option<u32>)
	-> Result<(), TocTocError> {
		let entry = self.indexes.get(&number).copied().unwrap_or(Index {
			number,
			absolute: None,
			relative: None,
		});

		let absolute = absolute.or(entry.absolute);
		let relative = relative.or(entry.relative);
		if absolute.is_none() && relative.is_none() {
			return Err(TocTocError::Index(self.number, number));
		}

		self.indexes.insert(number, Index { number, absolute, relative });
		Ok(())
	}

	/// # Set ISRC.
	pub fn set_isrc(&mut self, isrc: Option<String>) {
		self.isrc = isrc.filter(|v| ! v.is_empty());
	}
}

impl Track {
	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Session.
	pub const fn session(&self) -> u8 { self.session }

	#[must_use]
	/// # Mode.
	pub const fn mode(&self) -> TrackMode { self.mode }

	#[must_use]
	/// # ISRC.
	pub fn isrc(&self) -> Option<&str> { self.isrc.as_deref() }

	#[must_use]
	/// # Get Index.
	pub fn get_index(&self, number: u8) -> Option<&Index> {
		self.indexes.get(&number)
	}

	/// # Indexes.
	///
	/// Return an iterator over the indexes, in order.
	pub fn indexes(&self) -> impl Iterator<Item=&Index> { self.indexes.values() }

	#[must_use]
	/// # First Index.
	pub fn first_index(&self) -> Option<&Index> {
		self.indexes.first_key_value().map(|(_, v)| v)
	}

	#[must_use]
	/// # Last Index.
	pub fn last_index(&self) -> Option<&Index> {
		self.indexes.last_key_value().map(|(_, v)| v)
	}

	#[must_use]
	/// # Start.
	///
	/// Return the absolute offset of index one, if known.
	pub fn start(&self) -> Option<u32> {
		self.get_index(1).and_then(Index::absolute)
	}

	#[must_use]
	/// # Pregap Length.
	///
	/// Return the distance between index zero and one, if both are known.
	pub fn pregap(&self) -> Option<u32> {
		let zero = self.get_index(0).and_then(Index::absolute)?;
		self.start()?.checked_sub(zero)
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Table.
///
/// The tracks and indexes of a disc (or one session of it), along with the
/// leadout.
pub struct Table {
	/// # Tracks.
	tracks: Vec<Track>,

	/// # Leadout.
	leadout: Option<u32>,

	/// # Leadout of the Last Merged Session.
	last_leadout: Option<u32>,

	/// # Catalog Number.
	catalog: Option<String>,
}

impl fmt::Display for Table {
	/// # Summarize the Table.
	///
	/// Print the tracks, their starts, lengths, and pregaps in a little
	/// table.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		/// # Divider.
		const DIVIDER: &str = "--------------------------------------------------------------\n";

		f.write_str("##  S  MODE        START     LENGTH    PREGAP            ISRC\n")?;
		f.write_str(DIVIDER)?;

		for t in &self.tracks {
			let start = t.start().map_or_else(|| String::from("--:--:--"), frames_to_msf);
			let len = self.duration(t.number)
				.map_or_else(|| String::from("--:--:--"), frames_to_msf);
			let pregap = t.pregap()
				.filter(|v| 0 != *v)
				.map_or_else(String::new, frames_to_msf);

			writeln!(
				f,
				"{:02}  {}  {:<10}  {start}  {len}  {pregap:>8}  {:>14}",
				t.number,
				t.session,
				t.mode.as_str(),
				t.isrc().unwrap_or_default(),
			)?;
		}

		writeln!(
			f,
			"{CD_LEADOUT_LABEL}              {}",
			self.leadout.map_or_else(|| String::from("--:--:--"), frames_to_msf),
		)?;
		f.write_str(DIVIDER)
	}
}

/// # Setters.
impl Table {
	/// # Push Track.
	pub fn push(&mut self, track: Track) { self.tracks.push(track); }

	/// # Track (Mutable).
	pub fn track_mut(&mut self, number: u8) -> Option<&mut Track> {
		self.tracks.iter_mut().find(|t| t.number == number)
	}

	/// # Set Leadout.
	pub fn set_leadout(&mut self, leadout: Option<u32>) { self.leadout = leadout; }

	/// # Set Session.
	///
	/// Tag every track with the given session number.
	pub fn set_session(&mut self, session: u8) {
		for t in &mut self.tracks { t.session = session; }
	}

	/// # Set Catalog.
	pub fn set_catalog(&mut self, catalog: Option<String>) {
		self.catalog = catalog.filter(|v| ! v.is_empty());
	}
}

/// # Getters.
impl Table {
	#[must_use]
	/// # Catalog.
	pub fn catalog(&self) -> Option<&str> { self.catalog.as_deref() }

	/// # Complete?
	///
	/// ## Errors
	///
	/// Returns an error if the leadout is unknown.
	pub const fn complete(&self) -> Result<(), TocTocError> {
		if self.leadout.is_some() { Ok(()) }
		else { Err(TocTocError::Leadout) }
	}

	#[must_use]
	/// # Track Duration.
	///
	/// Return the number of frames between the start of a track and the start
	/// of the next one (or the leadout).
	pub fn duration(&self, number: u8) -> Option<u32> {
		let pos = self.tracks.iter().position(|t| t.number == number)?;
		let start = self.tracks[pos].start()?;
		let end = match self.tracks.get(pos + 1) {
			Some(next) => next.start()?,
			None => self.leadout?,
		};
		end.checked_sub(start)
	}

	#[must_use]
	/// # Has TOC?
	///
	/// A full TOC has the leadout and an absolute index one for every track.
	/// This is what a fast read gives you: track boundaries without pregap or
	/// sub-index detail.
	pub fn has_toc(&self) -> bool {
		self.leadout.is_some() && self.tracks.iter().all(|t| t.start().is_some())
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.tracks.is_empty() }

	#[must_use]
	/// # Last Session Leadout.
	///
	/// The leadout reported for the last merged session. This is purely
	/// informational; the table's own leadout is what counts.
	pub const fn last_leadout(&self) -> Option<u32> { self.last_leadout }

	#[must_use]
	/// # Leadout.
	pub const fn leadout(&self) -> Option<u32> { self.leadout }

	#[must_use]
	/// # Number of Tracks.
	pub fn len(&self) -> usize { self.tracks.len() }

	#[must_use]
	/// # Number of Sessions.
	pub fn sessions(&self) -> u8 {
		self.tracks.iter().map(Track::session).max().unwrap_or(0)
	}

	#[must_use]
	/// # Track.
	pub fn track(&self, number: u8) -> Option<&Track> {
		self.tracks.iter().find(|t| t.number == number)
	}

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[Track] { &self.tracks }
}

/// # Transformations.
impl Table {
	/// # Absolutize.
	///
	/// The relative offsets of a table read from a single, continuous rip
	/// image are also its absolute offsets (within that image). This copies
	/// them over wherever an absolute offset isn't already known.
	///
	/// This is idempotent.
	pub fn absolutize(&mut self) {
		for idx in self.tracks.iter_mut().flat_map(|t| t.indexes.values_mut()) {
			if idx.absolute.is_none() { idx.absolute = idx.relative; }
		}
	}

	/// # Drop Relative Offsets.
	///
	/// Forget the relative offsets of every index with a known absolute
	/// offset. This is useful when there is no real file backing the table.
	pub fn drop_relative(&mut self) {
		for idx in self.tracks.iter_mut().flat_map(|t| t.indexes.values_mut()) {
			if idx.absolute.is_some() { idx.relative = None; }
		}
	}

	/// # Rebase.
	///
	/// Shift every absolute offset (including the leadout) so that the first
	/// track's index one lands on `start`.
	///
	/// Returns `false` if the table has no such starting point to work from.
	///
	/// ## Errors
	///
	/// This will return an error if the shift would push any offset below
	/// zero.
	pub fn rebase(&mut self, start: u32) -> Result<bool, TocTocError> {
		let Some(first) = self.tracks.first().and_then(Track::start) else {
			return Ok(false);
		};
		let delta = i64::from(start) - i64::from(first);
		if delta == 0 { return Ok(true); }

		let shift = |v: u32| -> Result<u32, TocTocError> {
			u32::try_from(i64::from(v) + delta)
				.map_err(|_| TocTocError::Bug("rebase underflow"))
		};

		// Check the smallest value first so a failure leaves things untouched.
		if let Some(min) = self.tracks.iter()
			.flat_map(Track::indexes)
			.filter_map(Index::absolute)
			.min()
		{
			shift(min)?;
		}

		for idx in self.tracks.iter_mut().flat_map(|t| t.indexes.values_mut()) {
			if let Some(v) = idx.absolute { idx.absolute = Some(shift(v)?); }
		}
		if let Some(v) = self.leadout { self.leadout = Some(shift(v)?); }

		Ok(true)
	}

	/// # Merge.
	///
	/// Append the tracks of another session to this table, renumbering them
	/// to continue where this one leaves off and tagging them with `session`.
	///
	/// If the other table's offsets overlap this one's, i.e. they are
	/// relative to the start of their own session, they are shifted past the
	/// end of this table plus the lead-out/lead-in gap between sessions.
	///
	/// This table's leadout is kept as-is. The other's is only remembered as
	/// [`Table::last_leadout`].
	pub fn merge(&mut self, other: Self, session: u8) {
		let count = u8::try_from(self.tracks.len()).unwrap_or(u8::MAX);

		// Session-local offsets need to be moved past what we've already got.
		let end = self.last_leadout.or(self.leadout).unwrap_or(0);
		let shift = match other.tracks.first().and_then(Track::first_index).and_then(Index::absolute) {
			Some(first) if first < end => end.saturating_add(session_gap(session)),
			_ => 0,
		};

		for mut t in other.tracks {
			t.number = t.number.saturating_add(count);
			t.session = session;
			for idx in t.indexes.values_mut() {
				if let Some(v) = idx.absolute { idx.absolute = Some(v.saturating_add(shift)); }
			}
			log::debug!("Merged session {session} track as #{:02}.", t.number);
			self.tracks.push(t);
		}

		if let Some(v) = other.leadout {
			self.last_leadout = Some(v.saturating_add(shift));
		}
		if self.catalog.is_none() { self.catalog = other.catalog; }
	}
}

/// # Conversion.
impl Table {
	/// # To `cdtoc::Toc`.
	///
	/// Build a [`Toc`] from the table, for the benefit of its various disc
	/// identifiers (CDDB, AccurateRip, etc.).
	///
	/// ## Errors
	///
	/// This will return an error if the leadout or any track starts are
	/// unknown, or if the layout is something `cdtoc` doesn't support (e.g.
	/// multiple data tracks).
	pub fn to_cdtoc(&self) -> Result<Toc, TocTocError> {
		let mut audio = Vec::with_capacity(self.tracks.len());
		let mut data = None;
		for t in &self.tracks {
			let start = t.start()
				.ok_or(TocTocError::Index(t.number, 1))?
				.saturating_add(CD_LEADIN);

			if t.mode.is_audio() { audio.push(start); }
			else if data.replace(start).is_some() {
				return Err(TocTocError::Bug("multiple data tracks"));
			}
		}

		// A trailing data track lives past the audio session's leadout.
		let trailing_data = self.tracks.last().is_some_and(|t| ! t.mode.is_audio()) &&
			1 < self.tracks.len();
		let leadout =
			if trailing_data { self.last_leadout.or(self.leadout) }
			else { self.leadout }
			.ok_or(TocTocError::Leadout)?
			.saturating_add(CD_LEADIN);

		Ok(Toc::from_parts(audio, data, leadout)?)
	}
}



/// # Session Gap.
///
/// Return the number of frames between the end of one session and the start
/// of the first track of the `session` that follows.
const fn session_gap(session: u8) -> u32 {
	if session <= 2 { SESSION_GAP_FIRST }
	else { SESSION_GAP_NEXT }
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Build a Table.
	///
	/// Each entry is a track's index-one absolute offset.
	fn table(starts: &[u32], leadout: u32, session: u8) -> Table {
		let mut out = Table::default();
		for (k, v) in starts.iter().copied().enumerate() {
			let mut t = Track::new(u8::try_from(k + 1).unwrap(), session);
			t.index(1, Some(v), None).unwrap();
			out.push(t);
		}
		out.set_leadout(Some(leadout));
		out
	}

	#[test]
	fn t_mode() {
		for m in [
			TrackMode::Audio,
			TrackMode::Mode1,
			TrackMode::Mode1Raw,
			TrackMode::Mode2,
			TrackMode::Mode2Form1,
			TrackMode::Mode2Form2,
			TrackMode::Mode2FormMix,
			TrackMode::Mode2Raw,
		] {
			assert_eq!(TrackMode::from(m.as_str().as_bytes()), m);
		}
		assert_eq!(TrackMode::from(&b"DATA"[..]), TrackMode::Data);
		assert_eq!(TrackMode::from(&b"WHATEVER"[..]), TrackMode::Data);
		assert!(TrackMode::Audio.is_audio());
		assert!(! TrackMode::Mode1.is_audio());
	}

	#[test]
	fn t_index() {
		let mut t = Track::new(3, 1);
		assert_eq!(t.index(1, None, None), Err(TocTocError::Index(3, 1)));
		assert!(t.get_index(1).is_none());

		t.index(1, None, Some(500)).unwrap();
		t.index(1, Some(650), None).unwrap();
		let idx = t.get_index(1).copied().unwrap();
		assert_eq!(idx.absolute(), Some(650));
		assert_eq!(idx.relative(), Some(500));

		// Now an existing index can be updated with nothing.
		assert!(t.index(1, None, None).is_ok());

		t.index(0, Some(500), None).unwrap();
		assert_eq!(t.first_index().map(Index::number), Some(0));
		assert_eq!(t.last_index().map(Index::number), Some(1));
		assert_eq!(t.pregap(), Some(150));
		assert_eq!(t.start(), Some(650));
	}

	#[test]
	fn t_complete() {
		let mut t = table(&[0, 100], 200, 1);
		assert!(t.complete().is_ok());
		assert!(t.has_toc());

		t.set_leadout(None);
		assert_eq!(t.complete(), Err(TocTocError::Leadout));
		assert!(! t.has_toc());

		// Relative-only tracks aren't a TOC until absolutized.
		let mut t = Table::default();
		let mut track = Track::new(1, 1);
		track.index(1, None, Some(0)).unwrap();
		t.push(track);
		t.set_leadout(Some(500));
		assert!(! t.has_toc());
		t.absolutize();
		assert!(t.has_toc());
	}

	#[test]
	fn t_absolutize() {
		let mut t = Table::default();
		for (num, rel) in [(1_u8, 0_u32), (2, 1000), (3, 2500)] {
			let mut track = Track::new(num, 1);
			track.index(1, None, Some(rel + 150)).unwrap();
			if num == 2 { track.index(0, None, Some(rel)).unwrap(); }
			t.push(track);
		}
		t.set_leadout(Some(4000));

		t.absolutize();
		let once = t.clone();
		t.absolutize();
		assert_eq!(t, once, "Absolutize is not idempotent.");

		assert_eq!(t.track(2).and_then(Track::start), Some(1150));
		assert_eq!(t.track(2).and_then(Track::pregap), Some(150));

		// Existing absolutes are left alone.
		let mut t2 = Table::default();
		let mut track = Track::new(1, 1);
		track.index(1, Some(9), Some(5)).unwrap();
		t2.push(track);
		t2.absolutize();
		assert_eq!(t2.track(1).and_then(Track::start), Some(9));

		// Dropping relative keeps absolute.
		t.drop_relative();
		assert!(t.tracks().iter().flat_map(Track::indexes).all(|i| i.relative().is_none()));
		assert_eq!(t.track(3).and_then(Track::start), Some(2650));
	}

	#[test]
	fn t_rebase() {
		let mut t = table(&[0, 1000], 2000, 2);
		assert_eq!(t.rebase(190_000), Ok(true));
		assert_eq!(t.track(1).and_then(Track::start), Some(190_000));
		assert_eq!(t.track(2).and_then(Track::start), Some(191_000));
		assert_eq!(t.leadout(), Some(192_000));

		// And back.
		assert_eq!(t.rebase(0), Ok(true));
		assert_eq!(t.track(2).and_then(Track::start), Some(1000));

		// Can't go negative.
		assert!(t.rebase(0).is_ok());
		let mut t = table(&[500, 1000], 2000, 1);
		t.track_mut(1).unwrap().index(0, Some(100), None).unwrap();
		assert!(t.rebase(0).is_err());

		// Nothing to do.
		let mut t = Table::default();
		assert_eq!(t.rebase(10), Ok(false));
	}

	#[test]
	fn t_merge() {
		// Disc-wide offsets are taken as-is.
		let mut t1 = table(&[0, 10_000, 20_000], 30_000, 1);
		let t2 = table(&[41_400, 50_000], 60_000, 2);
		t1.merge(t2, 2);

		assert_eq!(t1.len(), 5);
		assert_eq!(
			t1.tracks().iter().map(Track::number).collect::<Vec<_>>(),
			[1, 2, 3, 4, 5],
		);
		assert_eq!(
			t1.tracks().iter().map(Track::session).collect::<Vec<_>>(),
			[1, 1, 1, 2, 2],
		);
		assert_eq!(t1.track(4).and_then(Track::start), Some(41_400));
		assert_eq!(t1.leadout(), Some(30_000), "The leadout should be preserved.");
		assert_eq!(t1.last_leadout(), Some(60_000));
		assert_eq!(t1.sessions(), 2);

		// Session-local offsets get moved past the previous session.
		let mut t1 = table(&[0, 10_000, 20_000], 30_000, 1);
		let t2 = table(&[0, 5000], 9000, 1);
		t1.merge(t2, 2);
		assert_eq!(t1.track(4).and_then(Track::start), Some(30_000 + SESSION_GAP_FIRST));
		assert_eq!(t1.track(5).and_then(Track::start), Some(35_000 + SESSION_GAP_FIRST));
		assert_eq!(t1.last_leadout(), Some(39_000 + SESSION_GAP_FIRST));

		// And a third session after that.
		let t3 = table(&[0], 1000, 1);
		t1.merge(t3, 3);
		assert_eq!(
			t1.track(6).and_then(Track::start),
			Some(39_000 + SESSION_GAP_FIRST + SESSION_GAP_NEXT),
		);
		assert_eq!(t1.leadout(), Some(30_000));
	}

	#[test]
	fn t_relative_absolutize_merge() {
		let mut all = Table::default();
		for session in 1..=3_u8 {
			let mut t = Table::default();
			for num in 1..=4_u8 {
				let mut track = Track::new(num, 1);
				track.index(1, None, Some(u32::from(num - 1) * 1000)).unwrap();
				t.push(track);
			}
			t.set_leadout(Some(4000));
			t.absolutize();
			t.drop_relative();

			if session == 1 { all = t; }
			else { all.merge(t, session); }
		}

		assert_eq!(all.len(), 12);
		for (k, t) in all.tracks().iter().enumerate() {
			assert_eq!(usize::from(t.number()), k + 1, "Track numbers have gaps.");
		}

		// Starts should be strictly increasing too.
		let starts: Vec<u32> = all.tracks().iter().filter_map(Track::start).collect();
		assert_eq!(starts.len(), 12);
		assert!(starts.windows(2).all(|w| w[0] < w[1]));
	}

	#[test]
	fn t_duration() {
		let t = table(&[0, 10_000, 20_000], 30_000, 1);
		assert_eq!(t.duration(1), Some(10_000));
		assert_eq!(t.duration(3), Some(10_000));
		assert_eq!(t.duration(4), None);
	}

	#[test]
	fn t_cdtoc() {
		// Plain audio.
		let t = table(&[0, 15_068, 25_264], 40_179, 1);
		let toc = t.to_cdtoc().expect("Toc failed.");
		assert_eq!(toc.audio_len(), 3);
		assert_eq!(toc.leadout(), 40_179 + CD_LEADIN);

		// CD-Extra: the leadout comes from the data session.
		let mut t = table(&[0, 15_068], 25_000, 1);
		let mut data = Table::default();
		data.push(Track::new(1, 2).with_mode(TrackMode::Mode2Form1));
		data.track_mut(1).unwrap().index(1, Some(36_400), None).unwrap();
		data.set_leadout(Some(50_000));
		t.merge(data, 2);
		let toc = t.to_cdtoc().expect("Toc failed.");
		assert_eq!(toc.audio_len(), 2);
		assert_eq!(toc.leadout(), 50_000 + CD_LEADIN);

		// No leadout, no Toc.
		let mut t = table(&[0], 100, 1);
		t.set_leadout(None);
		assert_eq!(t.to_cdtoc(), Err(TocTocError::Leadout));
	}

	#[test]
	fn t_display() {
		let mut t = table(&[0, 15_068], 25_000, 1);
		t.track_mut(2).unwrap().index(0, Some(14_918), None).unwrap();
		let out = t.to_string();
		assert!(out.contains("01  1  AUDIO"));
		assert!(out.contains("00:02:00"), "Missing pregap.");
		assert!(out.contains("AA"));
	}
}
