use std::io::Write;

use crate::clock;
use crate::sink::AppendSink;

/// Timestamps a message and delivers it to the console and, when
/// configured, the append sink.
///
/// A failed sink write is reported once on the console and disables the
/// sink for the rest of the process; console output is never suppressed.
pub struct Logger {
    console: Box<dyn Write + Send>,
    sink: Option<AppendSink>,
    sink_failed: bool,
}

impl Logger {
    pub fn new(sink: Option<AppendSink>) -> Logger {
        Logger::with_console(Box::new(std::io::stdout()), sink)
    }

    pub fn with_console(console: Box<dyn Write + Send>, sink: Option<AppendSink>) -> Logger {
        Logger {
            console,
            sink,
            sink_failed: false,
        }
    }

    /// Write `[HH:MM:SS] {message}\n` to the console and the sink.
    pub fn log(&mut self, message: &str) {
        self.log_stamped(&clock::time_stamp(), message);
    }

    /// Write `{message}\n` to the console only, with no stamp prefix and
    /// no sink copy. Used for the startup and port-open banners.
    pub fn console(&mut self, message: &str) {
        let _ = self.console.write_all(message.as_bytes());
        let _ = self.console.write_all(b"\n");
        let _ = self.console.flush();
    }

    fn log_stamped(&mut self, stamp: &str, message: &str) {
        let line = format!("{stamp}{message}\n");

        let _ = self.console.write_all(line.as_bytes());
        let _ = self.console.flush();

        if self.sink_failed {
            return;
        }
        if let Some(sink) = &mut self.sink {
            if let Err(err) = sink.write(&line) {
                self.sink_failed = true;
                let notice = format!(
                    "{stamp}Error writing to log file {}: {err}; file logging disabled\n",
                    sink.path().display()
                );
                let _ = self.console.write_all(notice.as_bytes());
                let _ = self.console.flush();
                tracing::warn!(error = %err, "append sink write failed, disabling file logging");
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::capture::SharedBuf;
    use super::*;

    #[test]
    fn stamped_line_reaches_console_and_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        let console = SharedBuf::default();

        let mut logger = Logger::with_console(
            Box::new(console.clone()),
            Some(AppendSink::open(&path).unwrap()),
        );
        logger.log_stamped("[14:05:09] ", "hello");

        assert_eq!(console.contents(), "[14:05:09] hello\n");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[14:05:09] hello\n"
        );
    }

    #[test]
    fn console_banner_skips_stamp_and_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        let console = SharedBuf::default();

        let mut logger = Logger::with_console(
            Box::new(console.clone()),
            Some(AppendSink::open(&path).unwrap()),
        );
        logger.console("Monitoring port COM7 (baudRate=115200)...");

        assert_eq!(
            console.contents(),
            "Monitoring port COM7 (baudRate=115200)...\n"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn no_sink_means_console_only() {
        let console = SharedBuf::default();
        let mut logger = Logger::with_console(Box::new(console.clone()), None);

        logger.log_stamped("[00:00:00] ", "quiet");
        assert_eq!(console.contents(), "[00:00:00] quiet\n");
    }

    #[test]
    fn live_clock_output_is_stamp_prefixed() {
        let console = SharedBuf::default();
        let mut logger = Logger::with_console(Box::new(console.clone()), None);

        logger.log("tick");
        let out = console.contents();
        // [HH:MM:SS] is 10 chars plus the trailing space.
        assert_eq!(&out[0..1], "[");
        assert_eq!(&out[9..11], "] ");
        assert!(out.ends_with("tick\n"));
    }

    #[test]
    fn disabled_sink_suppresses_file_writes_but_not_console() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        let sink = AppendSink::open(&path).unwrap();

        let console = SharedBuf::default();
        let mut logger = Logger::with_console(Box::new(console.clone()), Some(sink));
        logger.sink_failed = true;

        logger.log_stamped("[09:00:00] ", "after failure");
        assert_eq!(console.contents(), "[09:00:00] after failure\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
