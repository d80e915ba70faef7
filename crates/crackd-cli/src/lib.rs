use std::io::Write;

/// Shorten a string to at most `max_len` characters (not bytes), replacing
/// the tail with "..." when it is cut. Safe on multibyte text.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let cut = s
        .char_indices()
        .nth(keep)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    format!("{}...", &s[..cut])
}

/// Single status line: each update overwrites the previous one in place when
/// the writer is interactive, otherwise appends one plain line per update.
pub struct StatusLine<W: Write> {
    writer: W,
    interactive: bool,
    last_len: usize,
}

impl<W: Write> StatusLine<W> {
    pub fn new(writer: W, interactive: bool) -> Self {
        StatusLine {
            writer,
            interactive,
            last_len: 0,
        }
    }

    /// Write one announcement, padding over any longer previous one.
    pub fn update(&mut self, detail: &str) {
        if !self.interactive {
            let _ = writeln!(self.writer, "{}", detail);
            return;
        }
        let len = detail.chars().count();
        let pad = self.last_len.saturating_sub(len);
        let _ = write!(self.writer, "\r{}{}", detail, " ".repeat(pad));
        let _ = self.writer.flush();
        self.last_len = len;
    }

    /// Terminate the in-place line so later output starts on a fresh line.
    pub fn finish(&mut self) {
        if self.interactive && self.last_len > 0 {
            let _ = writeln!(self.writer);
            self.last_len = 0;
        }
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello", 5), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn long_strings_get_an_ellipsis() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("ab", 2), "ab");
        // max_len smaller than the ellipsis leaves only the ellipsis
        assert_eq!(truncate_string("abc", 2), "...");
        assert_eq!(truncate_string("hello", 0), "...");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // 30 two-byte chars fit within 50 chars untouched
        let accented = "é".repeat(30);
        assert_eq!(truncate_string(&accented, 50), accented);

        // Cutting inside multibyte text lands on a char boundary
        assert_eq!(truncate_string(&accented, 10), format!("{}...", "é".repeat(7)));
        assert_eq!(truncate_string("наша кошка смешная", 10), "наша ко...");
    }

    #[test]
    fn interactive_status_line_overwrites_in_place() {
        let mut buf = Vec::new();
        let mut line = StatusLine::new(&mut buf, true);
        line.update("Step 1/4: long announcement");
        line.update("short");
        line.finish();

        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("\rStep 1/4: long announcement"));
        // The shorter update pads over the remainder of the longer one.
        assert!(out.contains(&format!("\rshort{}", " ".repeat(22))));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn plain_status_line_appends() {
        let mut buf = Vec::new();
        let mut line = StatusLine::new(&mut buf, false);
        line.update("one");
        line.update("two");
        line.finish();

        assert_eq!(String::from_utf8(buf).unwrap(), "one\ntwo\n");
    }
}
