/*!
# Toc Toc: Subprocesses
*/

use crate::{
	CDRDAO,
	KillSwitch,
	ReadOptions,
	TocTocError,
};
use std::{
	io::{
		ErrorKind,
		Read,
	},
	path::{
		Path,
		PathBuf,
	},
	process::{
		Child,
		Command,
		Stdio,
	},
	sync::mpsc::{
		self,
		RecvTimeoutError,
		Sender,
	},
	thread::JoinHandle,
	time::Duration,
};



/// # Poll Interval.
///
/// How long to wait for output before checking the kill switch again.
const POLL: Duration = Duration::from_millis(100);

/// # Read Chunk Size.
const CHUNK: usize = 4096;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Output Channel.
pub enum Channel {
	/// # STDOUT.
	Stdout,

	/// # STDERR.
	Stderr,
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Exit Status.
pub struct Exit {
	/// # Exit Code.
	///
	/// This is `None` if the program was terminated by a signal.
	code: Option<i32>,
}

impl Exit {
	#[must_use]
	/// # New.
	pub const fn new(code: Option<i32>) -> Self { Self { code } }

	#[must_use]
	/// # Exit Code.
	pub const fn code(self) -> Option<i32> { self.code }

	#[must_use]
	/// # Success?
	pub const fn success(self) -> bool { matches!(self.code, Some(0)) }
}



/// # Program.
///
/// This is the seam between the reading logic and the actual `cdrdao`
/// executable.
///
/// Implementations run the program with the given arguments, passing output
/// to `sink` in the order it is received. If `sink` returns `false`, the
/// program should be terminated (though the remaining output, if any, may
/// still be passed along). The same goes for the kill switch, except that
/// case should return [`TocTocError::Killed`].
pub trait Program {
	/// # Run.
	///
	/// ## Errors
	///
	/// Returns an error if the program cannot be started or is killed.
	fn run(
		&self,
		args: &[String],
		sink: &mut dyn FnMut(Channel, &[u8]) -> bool,
		killed: &KillSwitch,
	) -> Result<Exit, TocTocError>;
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Cdrdao.
///
/// The real deal, via [`std::process::Command`].
pub struct Cdrdao {
	/// # Executable.
	bin: PathBuf,
}

impl Default for Cdrdao {
	#[inline]
	fn default() -> Self { Self { bin: PathBuf::from(CDRDAO) } }
}

impl From<&ReadOptions> for Cdrdao {
	#[inline]
	fn from(src: &ReadOptions) -> Self { Self::new(src.program()) }
}

impl Cdrdao {
	#[must_use]
	/// # New.
	pub fn new<P>(bin: P) -> Self
	where P: AsRef<Path> {
		Self { bin: bin.as_ref().to_path_buf() }
	}

	#[must_use]
	/// # Executable.
	pub fn bin(&self) -> &Path { &self.bin }
}

impl Program for Cdrdao {
	fn run(
		&self,
		args: &[String],
		sink: &mut dyn FnMut(Channel, &[u8]) -> bool,
		killed: &KillSwitch,
	) -> Result<Exit, TocTocError> {
		log::debug!("Running {} {}", self.bin.display(), args.join(" "));

		let mut child = Command::new(&self.bin)
			.args(args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.map_err(|e|
				if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) {
					TocTocError::MissingProgram(CDRDAO)
				}
				else { TocTocError::Program(e.to_string()) }
			)?;

		// Each pipe gets its own reader so neither can fill up and stall the
		// other.
		let (tx, rx) = mpsc::channel();
		let mut readers = Vec::with_capacity(2);
		if let Some(src) = child.stdout.take() {
			readers.push(spawn_reader(src, Channel::Stdout, tx.clone()));
		}
		if let Some(src) = child.stderr.take() {
			readers.push(spawn_reader(src, Channel::Stderr, tx));
		}
		else { drop(tx); }

		let mut aborted = false;
		loop {
			if killed.killed() {
				terminate(&mut child);
				join(readers);
				return Err(TocTocError::Killed);
			}

			match rx.recv_timeout(POLL) {
				Ok((channel, chunk)) => if ! aborted && ! sink(channel, &chunk) {
					log::debug!("Aborting {}.", self.bin.display());
					aborted = true;
					terminate(&mut child);
				},
				Err(RecvTimeoutError::Timeout) => {},
				Err(RecvTimeoutError::Disconnected) => break,
			}
		}

		join(readers);
		let status = child.wait().map_err(|e| TocTocError::Program(e.to_string()))?;
		log::debug!("{} exited with {status}.", self.bin.display());
		Ok(Exit::new(status.code()))
	}
}



/// # Spawn Reader.
///
/// Forward everything read from `src` to the channel until EOF.
fn spawn_reader<R>(mut src: R, channel: Channel, tx: Sender<(Channel, Vec<u8>)>)
-> JoinHandle<()>
where R: Read + Send + 'static {
	std::thread::spawn(move || {
		let mut buf = [0_u8; CHUNK];
		loop {
			match src.read(&mut buf) {
				Ok(0) => break,
				Ok(n) => if tx.send((channel, buf[..n].to_vec())).is_err() { break; },
				Err(e) if e.kind() == ErrorKind::Interrupted => {},
				Err(_) => break,
			}
		}
	})
}

/// # Join Readers.
fn join(readers: Vec<JoinHandle<()>>) {
	for r in readers { let _res = r.join(); }
}

/// # Terminate Child.
fn terminate(child: &mut Child) {
	if let Err(e) = child.kill() { log::debug!("Unable to kill child: {e}"); }
	let _res = child.wait();
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_exit() {
		assert!(Exit::new(Some(0)).success());
		assert!(! Exit::new(Some(1)).success());
		assert!(! Exit::new(None).success());
		assert_eq!(Exit::new(Some(3)).code(), Some(3));
	}

	#[test]
	fn t_missing() {
		let prog = Cdrdao::new("/no/such/toctoc/cdrdao");
		let res = prog.run(&[], &mut |_, _| true, &KillSwitch::default());
		assert_eq!(res, Err(TocTocError::MissingProgram(CDRDAO)));
	}

	#[cfg(unix)]
	#[test]
	fn t_run() {
		// Any shell will do for checking the plumbing.
		let prog = Cdrdao::new("sh");
		let args = vec![
			"-c".to_owned(),
			"printf 'out\\n'; printf 'err\\n' >&2; exit 3".to_owned(),
		];

		let mut out = Vec::new();
		let mut err = Vec::new();
		let exit = prog.run(
			&args,
			&mut |channel, chunk| {
				match channel {
					Channel::Stdout => out.extend_from_slice(chunk),
					Channel::Stderr => err.extend_from_slice(chunk),
				}
				true
			},
			&KillSwitch::default(),
		).expect("Run failed.");

		assert_eq!(exit.code(), Some(3));
		assert_eq!(out, b"out\n");
		assert_eq!(err, b"err\n");
	}

	#[cfg(unix)]
	#[test]
	fn t_killed() {
		let prog = Cdrdao::new("sh");
		let args = vec!["-c".to_owned(), "exec sleep 30".to_owned()];
		let killed = KillSwitch::default();
		killed.kill();
		assert_eq!(
			prog.run(&args, &mut |_, _| true, &killed),
			Err(TocTocError::Killed),
		);
	}
}
