//! Log output on the firmware console
//!
//! Diagnostics are recorded in the core log ring; the console prints the
//! lines it has not shown yet whenever the loader is about to wait for the
//! user or give up.

use crate::uefi::boot_services::SimpleTextOutputProtocol;
use log::Level;
use vmap_core::logger::{self, LogLine};

/// UCS-2 characters per `OutputString` call, terminator included
const CHUNK: usize = 128;

pub struct Console {
    con_out: *mut SimpleTextOutputProtocol,
    cursor: usize,
}

impl Console {
    /// # Safety
    /// `con_out` must be null or the console output of the system table.
    pub unsafe fn new(con_out: *mut SimpleTextOutputProtocol) -> Self {
        Self { con_out, cursor: 0 }
    }

    pub fn write_str(&mut self, s: &str) {
        output(self.con_out, s);
    }

    /// Print the log lines recorded since the last flush
    pub fn flush_log(&mut self) {
        let con_out = self.con_out;
        if con_out.is_null() {
            self.cursor = logger::log_total();
            return;
        }
        self.cursor = logger::for_each_since(self.cursor, |line| write_line(con_out, line));
    }
}

fn write_line(con_out: *mut SimpleTextOutputProtocol, line: &LogLine) {
    match line.level() {
        Level::Error => output(con_out, "error: "),
        Level::Warn => output(con_out, "warning: "),
        _ => {}
    }
    output(con_out, line.as_str());
    output(con_out, "\n");
}

/// Send `s` as UCS-2, `\n` becoming CR LF. Characters outside the BMP print as `?`.
fn output(con_out: *mut SimpleTextOutputProtocol, s: &str) {
    if con_out.is_null() {
        return;
    }
    let mut buf = [0u16; CHUNK];
    let mut len = 0;
    for c in s.chars() {
        // room for CR LF and the terminator
        if len + 3 > CHUNK {
            emit(con_out, &mut buf, len);
            len = 0;
        }
        if c == '\n' {
            buf[len] = u16::from(b'\r');
            len += 1;
        }
        buf[len] = u16::try_from(u32::from(c)).unwrap_or(u16::from(b'?'));
        len += 1;
    }
    if len > 0 {
        emit(con_out, &mut buf, len);
    }
}

fn emit(con_out: *mut SimpleTextOutputProtocol, buf: &mut [u16; CHUNK], len: usize) {
    buf[len] = 0;
    // SAFETY: `con_out` is the live console passed to `Console::new`
    unsafe {
        ((*con_out).output_string)(con_out, buf.as_ptr());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uefi::status::EFI_SUCCESS;
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;
    use log::LevelFilter;

    /// Console that keeps everything written to it
    #[repr(C)]
    struct Screen {
        protocol: SimpleTextOutputProtocol,
        text: Vec<u16>,
    }

    extern "efiapi" fn reset(_: *mut SimpleTextOutputProtocol, _: bool) -> usize {
        EFI_SUCCESS
    }

    extern "efiapi" fn record(this: *mut SimpleTextOutputProtocol, s: *const u16) -> usize {
        // SAFETY: `this` is the protocol at the start of a `Screen`, `s` is terminated
        unsafe {
            let screen = &mut *(this as *mut Screen);
            let mut n = 0;
            while *s.add(n) != 0 {
                screen.text.push(*s.add(n));
                n += 1;
            }
        }
        EFI_SUCCESS
    }

    fn screen() -> Box<Screen> {
        Box::new(Screen {
            protocol: SimpleTextOutputProtocol::new(reset, record),
            text: Vec::new(),
        })
    }

    fn shown(screen: *mut Screen) -> String {
        // SAFETY: no console call is running
        String::from_utf16_lossy(unsafe { &(*screen).text })
    }

    #[test]
    fn test_newlines_become_crlf() {
        let screen = Box::into_raw(screen());
        // SAFETY: `screen` outlives the console
        let mut console = unsafe { Console::new(screen.cast()) };
        console.write_str("Press any key\nto continue");
        assert_eq!(shown(screen), "Press any key\r\nto continue");
    }

    #[test]
    fn test_long_text_is_split_across_calls() {
        let text: String = (0..300).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let screen = Box::into_raw(screen());
        // SAFETY: `screen` outlives the console
        let mut console = unsafe { Console::new(screen.cast()) };
        console.write_str(&text);
        console.write_str("\u{1F600}");
        assert_eq!(shown(screen), text + "?");
    }

    #[test]
    fn test_flush_prints_each_line_once() {
        vmap_core::logger::init(LevelFilter::Info);
        let screen = Box::into_raw(screen());
        // SAFETY: `screen` outlives the console
        let mut console = unsafe { Console::new(screen.cast()) };

        log::error!("console flush check");
        console.flush_log();
        console.flush_log();

        let text = shown(screen);
        assert_eq!(text.matches("error: console flush check\r\n").count(), 1);
    }

    #[test]
    fn test_missing_console_is_ignored() {
        // SAFETY: null is allowed
        let mut console = unsafe { Console::new(core::ptr::null_mut()) };
        console.write_str("nowhere");
        console.flush_log();
    }
}
