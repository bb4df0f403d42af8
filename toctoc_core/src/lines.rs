/*!
# Toc Toc: Line Reassembly
*/



#[derive(Debug, Clone, Default)]
/// # Line Buffer.
///
/// Subprocess output arrives in arbitrarily-sized chunks that have nothing to
/// do with line boundaries. This accumulates the bytes and hands back whole
/// (`\n`-terminated) lines as they become available, holding onto any
/// unterminated remainder for next time.
///
/// Lines are returned without their terminator, but are otherwise untouched;
/// there is no UTF-8 or length requirement.
///
/// ## Examples
///
/// ```
/// use toctoc_core::LineBuffer;
///
/// let mut buf = LineBuffer::default();
/// assert!(buf.feed(b"Hello W").is_empty());
/// assert_eq!(buf.feed(b"orld\nGood"), vec![b"Hello World".to_vec()]);
/// assert_eq!(buf.pending(), b"Good");
/// assert_eq!(buf.finish(), Some(b"Good".to_vec()));
/// ```
pub struct LineBuffer(Vec<u8>);

impl LineBuffer {
	/// # Feed.
	///
	/// Add a chunk to the buffer, returning any lines it completed, in order.
	pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
		// Only the new bytes can contain a new terminator.
		let Some(last) = chunk.iter().rposition(|b| b'\n'.eq(b)) else {
			self.0.extend_from_slice(chunk);
			return Vec::new();
		};

		self.0.extend_from_slice(&chunk[..=last]);
		let mut out: Vec<Vec<u8>> = self.0.split(|b| b'\n'.eq(b))
			.map(<[u8]>::to_vec)
			.collect();

		// The buffer ended with a terminator, so the split leaves an empty
		// entry at the end.
		out.pop();

		// Start over with whatever followed the last terminator.
		self.0.truncate(0);
		self.0.extend_from_slice(&chunk[last + 1..]);

		out
	}

	#[must_use]
	/// # Pending Bytes.
	///
	/// Return the unterminated bytes being held for the next line.
	pub fn pending(&self) -> &[u8] { &self.0 }

	/// # Finish.
	///
	/// Return (and clear) the unterminated remainder, if any, at the end of
	/// the stream.
	pub fn finish(&mut self) -> Option<Vec<u8>> {
		if self.0.is_empty() { None }
		else { Some(std::mem::take(&mut self.0)) }
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Test Output.
	const OUTPUT: &[u8] = b"Cdrdao version 1.2.4 - (C) Andreas Mueller <andreas@daneb.de>\n\
		\n\
		Track   Mode    Flags  Start                Length\n\
		------------------------------------------------------------\n\
		 1      AUDIO   0      00:00:00(     0)     04:35:30( 20655)\n\
		Leadout AUDIO   0      04:35:30( 20655)\n\
		\n\
		Analyzing track 01 (AUDIO): start 00:00:00, length 04:35:30...\n\
		00:01:00\r00:02:00\r\n\
		\xff\xfe not utf-8\n";

	#[test]
	fn t_chunking() {
		// Feed it all at once for reference.
		let mut buf = LineBuffer::default();
		let expected = buf.feed(OUTPUT);
		assert_eq!(expected.len(), 10);
		assert!(buf.pending().is_empty());
		assert!(buf.finish().is_none());
		assert_eq!(expected[1], b"");
		assert_eq!(expected[8], b"00:01:00\r00:02:00\r");

		// Now split it everywhere possible.
		for i in 0..=OUTPUT.len() {
			let mut buf = LineBuffer::default();
			let mut lines = buf.feed(&OUTPUT[..i]);
			lines.extend(buf.feed(&OUTPUT[i..]));
			assert_eq!(lines, expected, "Split at {i} went wrong.");
			assert!(buf.pending().is_empty());
		}

		// And one byte at a time.
		let mut buf = LineBuffer::default();
		let mut lines = Vec::new();
		for b in OUTPUT { lines.extend(buf.feed(std::slice::from_ref(b))); }
		assert_eq!(lines, expected);
	}

	#[test]
	fn t_pending() {
		let mut buf = LineBuffer::default();
		assert!(buf.feed(b"").is_empty());
		assert!(buf.feed(b"abc").is_empty());
		assert_eq!(buf.pending(), b"abc");

		// Empty lines count.
		assert_eq!(buf.feed(b"\n\n"), vec![b"abc".to_vec(), Vec::new()]);
		assert!(buf.pending().is_empty());

		// Long lines just keep growing.
		let long = vec![b'x'; 100_000];
		assert!(buf.feed(&long).is_empty());
		assert!(buf.feed(&long).is_empty());
		assert_eq!(buf.pending().len(), 200_000);
		assert_eq!(buf.finish().map(|v| v.len()), Some(200_000));
		assert!(buf.pending().is_empty());
	}
}
