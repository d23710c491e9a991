//! Incremental column wrapping for styled terminal output.
//!
//! [`LineWrapper`] is a [`StreamTransform`] that greedily word-wraps
//! text to a fixed column width. It operates on already-styled text:
//! ANSI escape sequences pass through and count as zero width. The
//! wrapper buffers at most one partial word across `feed` calls;
//! `finish` drains it. Runs of inter-word spaces collapse to a single
//! space and spaces are dropped at line breaks.

use crate::render::StreamTransform;

/// Where we are inside an ANSI escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    /// Not inside a sequence.
    None,
    /// Saw ESC; the next byte selects the sequence kind.
    Escape,
    /// Inside a CSI sequence; a final byte in @..~ ends it.
    Csi,
}

/// Stateful incremental greedy word wrapper.
#[derive(Debug)]
pub struct LineWrapper {
    width: usize,
    column: usize,
    word: String,
    word_width: usize,
    escape: EscapeState,
}

impl LineWrapper {
    /// Creates a wrapper for the given column width.
    ///
    /// A width of zero behaves as one column; callers gate on a positive
    /// width before constructing a wrapper.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            column: 0,
            word: String::new(),
            word_width: 0,
            escape: EscapeState::None,
        }
    }

    /// Emits the buffered word, breaking the line first if it cannot fit.
    ///
    /// A word wider than the whole width is emitted unbroken on its own
    /// line rather than split mid-word.
    fn flush_word(&mut self, out: &mut String) {
        if self.word.is_empty() {
            return;
        }
        if self.column == 0 {
            out.push_str(&self.word);
            self.column = self.word_width;
        } else if self.column + 1 + self.word_width <= self.width {
            out.push(' ');
            out.push_str(&self.word);
            self.column += 1 + self.word_width;
        } else {
            out.push('\n');
            out.push_str(&self.word);
            self.column = self.word_width;
        }
        self.word.clear();
        self.word_width = 0;
    }
}

impl StreamTransform for LineWrapper {
    fn feed(&mut self, input: &str) -> String {
        let mut out = String::new();
        for c in input.chars() {
            match self.escape {
                EscapeState::Escape => {
                    self.word.push(c);
                    self.escape = if c == '[' {
                        EscapeState::Csi
                    } else {
                        // Two-byte escape; done.
                        EscapeState::None
                    };
                    continue;
                }
                EscapeState::Csi => {
                    self.word.push(c);
                    // CSI sequences terminate on a final byte in @..~.
                    if ('@'..='~').contains(&c) {
                        self.escape = EscapeState::None;
                    }
                    continue;
                }
                EscapeState::None => {}
            }
            match c {
                '\x1b' => {
                    self.word.push(c);
                    self.escape = EscapeState::Escape;
                }
                '\n' => {
                    self.flush_word(&mut out);
                    out.push('\n');
                    self.column = 0;
                }
                ' ' => {
                    self.flush_word(&mut out);
                }
                _ => {
                    self.word.push(c);
                    self.word_width += 1;
                }
            }
        }
        out
    }

    fn finish(&mut self) -> String {
        let mut out = String::new();
        self.flush_word(&mut out);
        self.column = 0;
        self.escape = EscapeState::None;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_all(wrapper: &mut LineWrapper, fragments: &[&str]) -> String {
        let mut out = String::new();
        for fragment in fragments {
            out.push_str(&wrapper.feed(fragment));
        }
        out.push_str(&wrapper.finish());
        out
    }

    #[test]
    fn wraps_at_width() {
        let mut wrapper = LineWrapper::new(10);
        let out = wrap_all(&mut wrapper, &["the quick brown fox"]);
        assert_eq!(out, "the quick\nbrown fox");
    }

    #[test]
    fn short_text_untouched() {
        let mut wrapper = LineWrapper::new(40);
        let out = wrap_all(&mut wrapper, &["hello world"]);
        assert_eq!(out, "hello world");
    }

    #[test]
    fn word_split_across_fragments() {
        let mut wrapper = LineWrapper::new(10);
        let out = wrap_all(&mut wrapper, &["the quick bro", "wn fox"]);
        assert_eq!(out, "the quick\nbrown fox");
    }

    #[test]
    fn explicit_newline_resets_column() {
        let mut wrapper = LineWrapper::new(10);
        let out = wrap_all(&mut wrapper, &["one two\nthree four"]);
        assert_eq!(out, "one two\nthree four");
    }

    #[test]
    fn ansi_sequences_are_zero_width() {
        let mut wrapper = LineWrapper::new(9);
        let out = wrap_all(&mut wrapper, &["\x1b[1mthe\x1b[0m quick fox"]);
        assert_eq!(out, "\x1b[1mthe\x1b[0m quick\nfox");
    }

    #[test]
    fn escape_split_across_fragments() {
        let mut wrapper = LineWrapper::new(9);
        let out = wrap_all(&mut wrapper, &["\x1b[", "1mthe\x1b[0m quick fox"]);
        assert_eq!(out, "\x1b[1mthe\x1b[0m quick\nfox");
    }

    #[test]
    fn overlong_word_not_split() {
        let mut wrapper = LineWrapper::new(5);
        let out = wrap_all(&mut wrapper, &["ab incomprehensible cd"]);
        assert_eq!(out, "ab\nincomprehensible\ncd");
    }

    #[test]
    fn finish_drains_partial_word() {
        let mut wrapper = LineWrapper::new(20);
        let mut out = wrapper.feed("dangl");
        assert_eq!(out, "");
        out.push_str(&wrapper.finish());
        assert_eq!(out, "dangl");
    }

    #[test]
    fn spaces_collapse() {
        let mut wrapper = LineWrapper::new(20);
        let out = wrap_all(&mut wrapper, &["a    b"]);
        assert_eq!(out, "a b");
    }
}
