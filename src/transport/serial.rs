//! # Serial Capture Source
//!
//! Reads capture text from a printer emulator attached over a USB serial
//! link (an Arduino-class board that plays the printer to the console and
//! echoes every received frame as a hex dump line).
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so the text arrives unmodified:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **8-bit characters**: CS8 (8 data bits, no parity)
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON, reads return after
//!   [`POLL_INTERVAL_DS`] with whatever arrived
//!
//! ## Idle Detection
//!
//! The link has no end-of-job marker. [`SerialSource::read_line`] returns
//! `Ok(None)` once no byte has arrived for the caller-chosen idle time;
//! the caller decides what a quiet link means.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::GbpError;

/// Baud rate of the printer emulator firmware.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Read timeout of one poll, in deciseconds (VTIME units).
const POLL_INTERVAL_DS: u8 = 1;

/// Bytes requested per read.
const READ_CHUNK: usize = 1024;

/// # Serial Capture Source
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use gbprinter::transport::SerialSource;
///
/// let mut source = SerialSource::open("/dev/ttyUSB0", Duration::from_secs(2))?;
/// while let Some(line) = source.read_line()? {
///     println!("{}", line);
/// }
/// // Link went quiet
/// # Ok::<(), gbprinter::error::GbpError>(())
/// ```
pub struct SerialSource {
    file: File,
    idle: Duration,
    pending: Vec<u8>,
    log: Option<File>,
}

impl SerialSource {
    /// Open a serial device at [`DEFAULT_BAUD`].
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, idle: Duration) -> Result<Self, GbpError> {
        let path = device.as_ref();

        let file = OpenOptions::new().read(true).open(path).map_err(|e| {
            GbpError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(file.as_raw_fd(), DEFAULT_BAUD)?;
        debug!(device = %path.display(), baud = DEFAULT_BAUD, "serial port open");

        Ok(Self {
            file,
            idle,
            pending: Vec::new(),
            log: None,
        })
    }

    /// Copy every received byte to `log` (or stop logging with `None`).
    pub fn set_log(&mut self, log: Option<File>) {
        self.log = log;
    }

    /// Next line of text without its line ending.
    ///
    /// Returns `Ok(None)` when the link has been quiet for the idle time.
    /// A partial line received before the quiet period is returned first.
    pub fn read_line(&mut self) -> Result<Option<String>, GbpError> {
        let mut last_data = Instant::now();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(line) = take_line(&mut self.pending) {
                return Ok(Some(line));
            }

            let n = match self.file.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(GbpError::Transport(format!("Read failed: {}", e))),
            };

            if n > 0 {
                trace!(bytes = n, "serial read");
                last_data = Instant::now();
                self.pending.extend_from_slice(&chunk[..n]);
                if let Some(log) = self.log.as_mut() {
                    log.write_all(&chunk[..n])?;
                }
                continue;
            }

            if last_data.elapsed() >= self.idle {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let rest = std::mem::take(&mut self.pending);
                return Ok(Some(trim_line(&rest)));
            }
        }
    }
}

/// Split the first complete line off `pending`.
fn take_line(pending: &mut Vec<u8>) -> Option<String> {
    let end = pending.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = pending.drain(..=end).collect();
    Some(trim_line(&line))
}

fn trim_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\r', '\n', ' '])
        .to_string()
}

/// Configure a file descriptor for raw, polled TTY reads.
///
/// `VMIN = 0`, `VTIME = POLL_INTERVAL_DS`: a read returns as soon as any
/// byte is available, or empty after the poll interval.
#[cfg(unix)]
fn configure_tty_raw(fd: i32, baud: u32) -> Result<(), GbpError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(GbpError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = POLL_INTERVAL_DS;

    let speed = baud_constant(baud)?;
    let result = unsafe { libc::cfsetspeed(&mut termios, speed) };
    if result != 0 {
        return Err(GbpError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(GbpError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(unix)]
fn baud_constant(baud: u32) -> Result<libc::speed_t, GbpError> {
    Ok(match baud {
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        other => {
            return Err(GbpError::Transport(format!("Unsupported baud rate {}", other)));
        }
    })
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32, _baud: u32) -> Result<(), GbpError> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
