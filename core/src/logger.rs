// Global logging system for vmap
//
// Records from the `log` facade are formatted into fixed-size lines and kept
// in a ring of the most recent MAX_LOG_ENTRIES lines. Firmware consoles come
// and go during boot, so callers pull lines out when they have somewhere to
// print them. Each reader keeps its own cursor (the count of lines it has
// seen) and asks for what came after it.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicUsize, Ordering};
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

const MAX_LOG_ENTRIES: usize = 64;
const MAX_LINE_LEN: usize = 120;

/// One formatted log line
#[derive(Clone, Copy)]
pub struct LogLine {
    level: Level,
    len: usize,
    text: [u8; MAX_LINE_LEN],
}

impl LogLine {
    const EMPTY: Self = Self {
        level: Level::Info,
        len: 0,
        text: [0; MAX_LINE_LEN],
    };

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.text[..self.len]).unwrap_or("")
    }
}

impl Write for LogLine {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = MAX_LINE_LEN - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.text[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

static LOG_BUFFER: Mutex<[LogLine; MAX_LOG_ENTRIES]> =
    Mutex::new([LogLine::EMPTY; MAX_LOG_ENTRIES]);
static LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

fn push(level: Level, args: fmt::Arguments<'_>) {
    let mut line = LogLine {
        level,
        ..LogLine::EMPTY
    };
    let _ = line.write_fmt(args);

    let mut buffer = LOG_BUFFER.lock();
    let idx = LOG_COUNT.fetch_add(1, Ordering::SeqCst);
    buffer[idx % MAX_LOG_ENTRIES] = line;
}

/// Lines recorded so far, including ones the ring has dropped
pub fn log_total() -> usize {
    LOG_COUNT.load(Ordering::SeqCst)
}

/// Visit the lines recorded after `cursor`, oldest first, and return the
/// cursor to pass next time. Lines that already left the ring are skipped.
pub fn for_each_since<F: FnMut(&LogLine)>(cursor: usize, mut f: F) -> usize {
    let buffer = LOG_BUFFER.lock();
    let total = LOG_COUNT.load(Ordering::SeqCst);
    let first = cursor.max(total.saturating_sub(MAX_LOG_ENTRIES));
    for n in first..total {
        f(&buffer[n % MAX_LOG_ENTRIES]);
    }
    total
}

/// `log` sink writing into the ring
pub struct RingLogger;

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            push(record.level(), *record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: RingLogger = RingLogger;

/// Route the `log` macros into the ring. Calling it again only changes the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
