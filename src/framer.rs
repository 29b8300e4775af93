/// Splits a raw byte stream into newline-terminated lines.
///
/// One framer lives for the duration of one connected session. Bytes
/// arriving without a terminator accumulate in the pending buffer until a
/// later chunk completes the line; the buffer is dropped with the session,
/// so an unterminated trailing fragment is never emitted.
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> LineFramer {
        LineFramer {
            pending: Vec::new(),
        }
    }

    /// Feed a chunk of bytes, returning every line completed by it.
    ///
    /// Lines terminate on `\n`; an immediately preceding `\r` is stripped.
    /// Empty lines between two terminators are real blank lines and are
    /// emitted. Decoding is lossy UTF-8, applied per complete line so a
    /// multibyte character split across chunks survives intact.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Unterminated tail retained since the last emitted line.
    #[allow(dead_code)] // observed only by tests; the monitor drops the tail
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}
