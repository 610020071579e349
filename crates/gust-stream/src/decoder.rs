//! Incremental line decoding over a chunked byte stream

/// Splits a chunked byte stream into complete, newline-terminated text lines.
///
/// Bytes are buffered until a `\n` arrives, so both lines and multi-byte
/// UTF-8 sequences that straddle chunk boundaries are reassembled before
/// decoding. A `\n` byte never occurs inside a multi-byte sequence, which makes
/// splitting at the byte level safe.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed.
    ///
    /// Blank lines are dropped. A trailing `\r` is treated as part of the
    /// terminator.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let remainder = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, remainder);

        complete
            .split(|&b| b == b'\n')
            .filter_map(|raw| {
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                let line = String::from_utf8_lossy(raw);
                if line.trim().is_empty() {
                    None
                } else {
                    Some(line.into_owned())
                }
            })
            .collect()
    }

    /// Number of buffered bytes that have not yet seen a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any unterminated trailing fragment, returning how many bytes were discarded.
    pub fn discard_remainder(&mut self) -> usize {
        let discarded = self.buffer.len();
        self.buffer.clear();
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_multiple_lines() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"0:\"a\"\n0:\"b\"\n");
        assert_eq!(lines, vec!["0:\"a\"", "0:\"b\""]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"0:\"hel").is_empty());
        assert_eq!(decoder.pending(), 6);
        let lines = decoder.push(b"lo\"\n0:\"wo");
        assert_eq!(lines, vec!["0:\"hello\""]);
        let lines = decoder.push(b"rld\"\n");
        assert_eq!(lines, vec!["0:\"world\""]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let text = "0:\"22°C\"\n".as_bytes();
        let degree = text.iter().position(|&b| b == 0xC2).unwrap();

        let mut decoder = LineDecoder::new();
        assert!(decoder.push(&text[..degree + 1]).is_empty());
        let lines = decoder.push(&text[degree + 1..]);
        assert_eq!(lines, vec!["0:\"22°C\""]);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"\n   \n0:\"x\"\n\n");
        assert_eq!(lines, vec!["0:\"x\""]);
    }

    #[test]
    fn test_crlf_terminator() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"d:{}\r\n");
        assert_eq!(lines, vec!["d:{}"]);
    }

    #[test]
    fn test_discard_remainder() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"0:\"done\"\n0:\"tail");
        assert_eq!(lines, vec!["0:\"done\""]);
        assert_eq!(decoder.discard_remainder(), 7);
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.discard_remainder(), 0);
    }

    #[test]
    fn test_chunk_boundaries_do_not_change_lines() {
        let body = "f:{\"messageId\":\"m1\"}\n0:\"Sunny\"\n0:\" and 18°\"\ne:{\"finishReason\":\"stop\"}\n";
        let whole = LineDecoder::new().push(body.as_bytes());

        for size in 1..body.len() {
            let mut decoder = LineDecoder::new();
            let lines: Vec<String> = body
                .as_bytes()
                .chunks(size)
                .flat_map(|chunk| decoder.push(chunk))
                .collect();
            assert_eq!(lines, whole, "chunk size {}", size);
        }
    }
}
