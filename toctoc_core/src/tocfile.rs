/*!
# Toc Toc: TOC Files
*/

use crate::{
	msf_to_frames,
	Table,
	TocTocError,
	Track,
	TrackMode,
};
use std::path::Path;
use trimothy::TrimSliceMatches;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Token.
enum Token<'a> {
	/// # Bare Word.
	Word(&'a [u8]),

	/// # Quoted String (Sans Quotes).
	Quoted(&'a [u8]),

	/// # Open Brace.
	Open,

	/// # Close Brace.
	Close,
}

impl<'a> Token<'a> {
	/// # Word.
	const fn word(self) -> Option<&'a [u8]> {
		if let Self::Word(v) = self { Some(v) } else { None }
	}

	/// # Quoted.
	const fn quoted(self) -> Option<&'a [u8]> {
		if let Self::Quoted(v) = self { Some(v) } else { None }
	}
}



#[derive(Debug, Clone, Default)]
/// # Track Builder.
///
/// Positions are relative to the start of the (virtual) rip image.
struct Pending {
	/// # The Track.
	track: Track,

	/// # Where Its Data Begins.
	begin: Option<u32>,

	/// # Index Zero.
	zero: Option<u32>,

	/// # Index One.
	one: Option<u32>,

	/// # Later Indexes (Relative to Index One).
	extra: Vec<u32>,
}

impl Pending {
	/// # Mark Begin.
	fn begin(&mut self, pos: u32) { self.begin.get_or_insert(pos); }

	/// # Finish.
	fn finish(mut self, line: usize) -> Result<Track, TocTocError> {
		let one = self.one.or(self.begin).ok_or(TocTocError::TocLine(line))?;

		if let Some(zero) = self.zero.filter(|z| *z < one) {
			self.track.index(0, None, Some(zero))?;
		}
		self.track.index(1, None, Some(one))?;

		for (k, v) in self.extra.into_iter().enumerate() {
			let idx = u8::try_from(k + 2).map_err(|_| TocTocError::TocLine(line))?;
			let pos = one.checked_add(v).ok_or(TocTocError::TocLine(line))?;
			self.track.index(idx, None, Some(pos))?;
		}

		Ok(self.track)
	}
}



#[derive(Debug, Clone, Default)]
/// # TOC File.
///
/// A reader for the `.toc` files written by `cdrdao read-toc`. Only the
/// parts relevant to the track layout are kept; CD-TEXT and the various
/// audio flags are skipped.
///
/// The resulting table holds relative offsets only, i.e. positions within
/// the rip image the file describes, which always begins at zero.
///
/// ## Examples
///
/// ```
/// use toctoc_core::TocFile;
///
/// let toc = TocFile::parse(br#"CD_DA
/// TRACK AUDIO
/// FILE "data.wav" 0 04:35:30
/// TRACK AUDIO
/// FILE "data.wav" 04:35:30 03:40:71
/// START 00:02:00
/// "#).unwrap();
///
/// let table = toc.table();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.leadout(), Some(37_226));
///
/// let track = table.track(2).unwrap();
/// assert_eq!(track.get_index(0).and_then(|i| i.relative()), Some(20_655));
/// assert_eq!(track.get_index(1).and_then(|i| i.relative()), Some(20_805));
/// ```
pub struct TocFile {
	/// # Table.
	table: Table,
}

impl TocFile {
	/// # Read.
	///
	/// Read and parse the file at `path`.
	///
	/// ## Errors
	///
	/// Returns an error if the file can't be read or parsed.
	pub fn read<P>(path: P) -> Result<Self, TocTocError>
	where P: AsRef<Path> {
		let path = path.as_ref();
		let raw = std::fs::read(path)
			.map_err(|_| TocTocError::TocFile(path.to_string_lossy().into_owned()))?;
		Self::parse(&raw)
	}

	/// # Parse.
	///
	/// ## Errors
	///
	/// Returns an error, usually [`TocTocError::TocLine`], if anything looks
	/// amiss.
	pub fn parse(src: &[u8]) -> Result<Self, TocTocError> {
		let mut table = Table::default();
		let mut depth = 0_usize;
		let mut cursor = 0_u32;
		let mut current: Option<Pending> = None;
		let mut count = 0_u8;
		let mut last_line = 0;

		for (k, line) in src.split(|b| b'\n'.eq(b)).enumerate() {
			let num = k + 1;
			last_line = num;
			let tokens = tokenize(line).ok_or(TocTocError::TocLine(num))?;

			// Skip anything inside CD-TEXT blocks.
			let mut words = Vec::with_capacity(tokens.len());
			for t in tokens {
				match t {
					Token::Open => { depth += 1; },
					Token::Close => {
						depth = depth.checked_sub(1).ok_or(TocTocError::TocLine(num))?;
					},
					t => if depth == 0 { words.push(t); },
				}
			}
			let Some(keyword) = words.first().and_then(|t| t.word()) else { continue; };
			let args = &words[1..];

			match keyword {
				b"TRACK" => {
					if let Some(done) = current.take() { table.push(done.finish(num)?); }
					count = count.checked_add(1).ok_or(TocTocError::TocLine(num))?;
					let mode = args.first()
						.and_then(|t| t.word())
						.map(TrackMode::from)
						.ok_or(TocTocError::TocLine(num))?;
					current = Some(Pending {
						track: Track::new(count, 1).with_mode(mode),
						..Pending::default()
					});
				},
				b"CATALOG" => {
					let catalog = args.first()
						.and_then(|t| t.quoted())
						.ok_or(TocTocError::TocLine(num))?;
					table.set_catalog(Some(String::from_utf8_lossy(catalog).into_owned()));
				},
				b"ISRC" => {
					let isrc = args.first()
						.and_then(|t| t.quoted())
						.ok_or(TocTocError::TocLine(num))?;
					let cur = current.as_mut().ok_or(TocTocError::TocLine(num))?;
					cur.track.set_isrc(Some(String::from_utf8_lossy(isrc).into_owned()));
				},
				b"FILE" | b"AUDIOFILE" => {
					let cur = current.as_mut().ok_or(TocTocError::TocLine(num))?;
					// The start is the position within the audio file, which
					// needn't match the image position if there are gaps.
					let mut rest = args.iter().skip(1).filter_map(|t| t.word());
					rest.next()
						.and_then(msf_to_frames)
						.ok_or(TocTocError::TocLine(num))?;
					cur.begin(cursor);
					if let Some(len) = rest.next() {
						let len = msf_to_frames(len).ok_or(TocTocError::TocLine(num))?;
						cursor = cursor.checked_add(len).ok_or(TocTocError::TocLine(num))?;
					}
				},
				b"DATAFILE" => {
					let cur = current.as_mut().ok_or(TocTocError::TocLine(num))?;
					cur.begin(cursor);
					// The byte offset (#n) doesn't matter, only the length.
					if let Some(len) = args.iter()
						.skip(1)
						.filter_map(|t| t.word())
						.find(|w| ! w.starts_with(b"#"))
					{
						let len = msf_to_frames(len).ok_or(TocTocError::TocLine(num))?;
						cursor = cursor.checked_add(len).ok_or(TocTocError::TocLine(num))?;
					}
				},
				b"SILENCE" | b"ZERO" => {
					let cur = current.as_mut().ok_or(TocTocError::TocLine(num))?;
					cur.begin(cursor);
					// A data mode and/or subchannel mode might come first.
					let len = args.iter()
						.filter_map(|t| t.word())
						.last()
						.and_then(msf_to_frames)
						.ok_or(TocTocError::TocLine(num))?;
					cursor = cursor.checked_add(len).ok_or(TocTocError::TocLine(num))?;
				},
				b"START" => {
					let cur = current.as_mut().ok_or(TocTocError::TocLine(num))?;
					let begin = *cur.begin.get_or_insert(cursor);
					let one = match args.first().and_then(|t| t.word()) {
						Some(v) => {
							let v = msf_to_frames(v).ok_or(TocTocError::TocLine(num))?;
							begin.checked_add(v).ok_or(TocTocError::TocLine(num))?
						},
						None => cursor,
					};
					cur.zero = Some(begin);
					cur.one = Some(one);
				},
				b"PREGAP" => {
					let cur = current.as_mut().ok_or(TocTocError::TocLine(num))?;
					let len = args.first()
						.and_then(|t| t.word())
						.and_then(msf_to_frames)
						.ok_or(TocTocError::TocLine(num))?;
					cur.begin(cursor);
					cur.zero = Some(cursor);
					cursor = cursor.checked_add(len).ok_or(TocTocError::TocLine(num))?;
					cur.one = Some(cursor);
				},
				b"INDEX" => {
					let cur = current.as_mut().ok_or(TocTocError::TocLine(num))?;
					let pos = args.first()
						.and_then(|t| t.word())
						.and_then(msf_to_frames)
						.ok_or(TocTocError::TocLine(num))?;
					cur.extra.push(pos);
				},
				// Flags and disc types don't affect the layout.
				b"CD_DA" | b"CD_ROM" | b"CD_ROM_XA" | b"CD_I" | b"CD_TEXT" | b"NO" |
				b"COPY" | b"PRE_EMPHASIS" | b"TWO_CHANNEL_AUDIO" |
				b"FOUR_CHANNEL_AUDIO" => {},
				_ => {
					log::debug!(
						"Unknown TOC keyword on line {num}: {}",
						String::from_utf8_lossy(keyword),
					);
					return Err(TocTocError::TocLine(num));
				},
			}
		}

		if 0 != depth { return Err(TocTocError::TocLine(last_line)); }
		if let Some(done) = current.take() { table.push(done.finish(last_line)?); }
		if table.is_empty() { return Err(TocTocError::TocLine(last_line)); }

		// The leadout comes right after the last bit of data.
		table.set_leadout(Some(cursor));
		Ok(Self { table })
	}

	#[must_use]
	/// # Table.
	pub const fn table(&self) -> &Table { &self.table }

	#[must_use]
	/// # Into Table.
	pub fn into_table(self) -> Table { self.table }
}



/// # Tokenize.
///
/// Split a line into words, quoted strings, and braces, stopping at any
/// comment. Returns `None` if a quote is left open.
fn tokenize(line: &[u8]) -> Option<Vec<Token<'_>>> {
	let mut out = Vec::new();
	let mut line = line.trim_matches(|b| b.is_ascii_whitespace());

	while let Some(&first) = line.first() {
		match first {
			b'{' => {
				out.push(Token::Open);
				line = &line[1..];
			},
			b'}' => {
				out.push(Token::Close);
				line = &line[1..];
			},
			b'"' => {
				// Find the closing quote, minding escapes.
				let mut end = None;
				let mut escaped = false;
				for (k, b) in line.iter().copied().enumerate().skip(1) {
					if escaped { escaped = false; }
					else if b == b'\\' { escaped = true; }
					else if b == b'"' {
						end = Some(k);
						break;
					}
				}
				let end = end?;
				out.push(Token::Quoted(&line[1..end]));
				line = &line[end + 1..];
			},
			b'/' if line.starts_with(b"//") => break,
			_ => {
				let end = line.iter()
					.position(|b| b.is_ascii_whitespace() || matches!(b, b'"' | b'{' | b'}'))
					.unwrap_or(line.len());
				out.push(Token::Word(&line[..end]));
				line = &line[end..];
			},
		}

		line = line.trim_start_matches(|b| b.is_ascii_whitespace());
	}

	Some(out)
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::Index;

	/// # Typical Read-Toc Output.
	const TOC: &[u8] = br#"CD_DA

CATALOG "0724384260925"

CD_TEXT {
  LANGUAGE_MAP {
    0 : EN
  }
  LANGUAGE 0 {
    TITLE "Some { Album"
    PERFORMER "Somebody"
  }
}

// Track 1
TRACK AUDIO
NO COPY
NO PRE_EMPHASIS
TWO_CHANNEL_AUDIO
ISRC "GBAYE9200070"
FILE "data.wav" 0 04:35:30

// Track 2
TRACK AUDIO
NO COPY
NO PRE_EMPHASIS
TWO_CHANNEL_AUDIO
FILE "data.wav" 04:35:30 03:40:71
START 00:02:00
INDEX 01:00:00

// Track 3
TRACK AUDIO
NO COPY
NO PRE_EMPHASIS
TWO_CHANNEL_AUDIO
FILE "data.wav" 08:16:26 01:00:00
"#;

	/// # Index Offsets.
	fn offsets(toc: &TocFile, track: u8) -> Vec<(u8, Option<u32>)> {
		toc.table()
			.track(track)
			.map(|t| t.indexes().map(|i| (i.number(), i.relative())).collect())
			.unwrap_or_default()
	}

	#[test]
	fn t_parse() {
		let toc = TocFile::parse(TOC).expect("Parse failed.");
		let table = toc.table();

		assert_eq!(table.len(), 3);
		assert_eq!(table.catalog(), Some("0724384260925"));
		assert_eq!(table.leadout(), Some(37_226 + 4500));
		assert_eq!(table.track(1).and_then(Track::isrc), Some("GBAYE9200070"));
		assert_eq!(table.track(2).and_then(Track::isrc), None);

		assert_eq!(offsets(&toc, 1), [(1, Some(0))]);
		assert_eq!(
			offsets(&toc, 2),
			[(0, Some(20_655)), (1, Some(20_805)), (2, Some(25_305))],
		);
		assert_eq!(offsets(&toc, 3), [(1, Some(37_226))]);

		// Nothing is absolute yet.
		assert!(table.tracks().iter().flat_map(Track::indexes).all(|i| i.absolute().is_none()));
		assert!(table.tracks().iter().all(|t| t.mode().is_audio() && t.session() == 1));
	}

	#[test]
	fn t_read() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let path = dir.path().join("session.toc");
		std::fs::write(&path, TOC).expect("Write failed.");

		let toc = TocFile::read(&path).expect("Read failed.");
		assert_eq!(toc.table().len(), 3);

		// Missing files.
		let missing = dir.path().join("nope.toc");
		assert_eq!(
			TocFile::read(&missing).map(|_| ()),
			Err(TocTocError::TocFile(missing.to_string_lossy().into_owned())),
		);
	}

	#[test]
	fn t_data() {
		let toc = TocFile::parse(br#"CD_ROM_XA
TRACK MODE2_FORM1
NO COPY
ZERO MODE2_FORM1 00:02:00
DATAFILE "data_1" 10:00:00 // length in bytes: 92160000
START 00:02:00
TRACK MODE2_FORM1 RW_RAW
DATAFILE "data_2" #92160000 00:30:00
"#).expect("Parse failed.");

		let table = toc.table();
		assert_eq!(table.len(), 2);
		assert_eq!(table.track(1).map(Track::mode), Some(TrackMode::Mode2Form1));
		assert_eq!(offsets(&toc, 1), [(0, Some(0)), (1, Some(150))]);
		assert_eq!(offsets(&toc, 2), [(1, Some(45_150))]);
		assert_eq!(table.leadout(), Some(45_150 + 2250));
	}

	#[test]
	fn t_pregap() {
		let toc = TocFile::parse(br#"CD_DA
TRACK AUDIO
FILE "data.wav" 0 01:00:00
TRACK AUDIO
PREGAP 00:02:00
FILE "data.wav" 01:00:00 01:00:00
TRACK AUDIO
SILENCE 00:01:00
START
FILE "data.wav" 02:00:00 01:00:00
"#).expect("Parse failed.");

		// Pregaps aren't in the audio file, but still take up room.
		assert_eq!(offsets(&toc, 2), [(0, Some(4500)), (1, Some(4650))]);

		// A bare START marks the current position.
		let track = toc.table().track(3).expect("Missing track.");
		assert_eq!(track.get_index(0).and_then(Index::relative), Some(9150));
		assert_eq!(track.get_index(1).and_then(Index::relative), Some(9225));
		assert_eq!(toc.table().leadout(), Some(13_725));

		// Longer stretches of silence work the same way.
		let toc = TocFile::parse(br#"CD_DA
TRACK AUDIO
SILENCE 02:00:00
START
FILE "data.wav" 0 01:00:00
"#).expect("Parse failed.");
		assert_eq!(offsets(&toc, 1), [(0, Some(0)), (1, Some(9000))]);
		assert_eq!(toc.table().leadout(), Some(13_500));
	}

	#[test]
	fn t_bad() {
		for (raw, line) in [
			(&b"TRACK AUDIO\nFILE \"data.wav\"\n"[..], 2),
			(&b"TRACK AUDIO\nFILE \"data.wav\" 0 00:00:99\n"[..], 2),
			(&b"TRACK AUDIO\nFILE \"data.wav 0\n"[..], 2),
			(&b"ISRC \"ABC\"\n"[..], 1),
			(&b"TRACK\n"[..], 1),
			(&b"TRACK AUDIO\nBOGUS 1\n"[..], 2),
			(&b"CD_TEXT {\nTRACK AUDIO\n"[..], 3),
			(&b"CD_DA\n"[..], 2),
			(&b"}\n"[..], 1),
		] {
			assert_eq!(
				TocFile::parse(raw).map(|_| ()),
				Err(TocTocError::TocLine(line)),
				"Expected failure on line {line} of {:?}.",
				String::from_utf8_lossy(raw),
			);
		}
	}

	#[test]
	fn t_tokenize() {
		assert_eq!(
			tokenize(br#"  FILE "my \"file\".wav" 0 01:00:00 // comment "#),
			Some(vec![
				Token::Word(b"FILE"),
				Token::Quoted(br#"my \"file\".wav"#),
				Token::Word(b"0"),
				Token::Word(b"01:00:00"),
			]),
		);
		assert_eq!(
			tokenize(b"LANGUAGE 0 {"),
			Some(vec![Token::Word(b"LANGUAGE"), Token::Word(b"0"), Token::Open]),
		);
		assert_eq!(tokenize(b"// Track 1"), Some(Vec::new()));
		assert_eq!(tokenize(b""), Some(Vec::new()));
		assert_eq!(tokenize(b"TITLE \"open"), None);
	}
}
