//! Terminal configuration so single keypresses reach the running program.

use std::io::stdin;
use std::os::fd::{AsRawFd, RawFd};
use termios::{ECHO, ICANON, TCSAFLUSH, Termios};

/// Keeps the original terminal attributes and restores them when dropped.
pub struct RawLock {
    fd: RawFd,
    termios_orig: Termios,
}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays unbuffered if this fails but there is no means to repair
        let _ = termios::tcsetattr(self.fd, TCSAFLUSH, &self.termios_orig);
    }
}

/// Turns off line buffering and echo on stdin.
///
/// Echo stays off for the whole run; the IN trap echoes its character
/// itself. Callers should hold the returned lock until the program is done.
///
/// # Errors
/// - stdin is not a terminal or its attributes cannot be changed
pub fn set_terminal_raw() -> Result<RawLock, std::io::Error> {
    let fd = stdin().as_raw_fd();
    let termios_orig = Termios::from_fd(fd)?;
    let mut termios_raw = termios_orig;
    // https://man7.org/linux/man-pages/man3/termios.3.html
    termios_raw.c_lflag &= !(ICANON | ECHO);
    termios::tcsetattr(fd, TCSAFLUSH, &termios_raw)?;
    Ok(RawLock { fd, termios_orig })
}
