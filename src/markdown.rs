//! Incremental markdown-to-ANSI styling.
//!
//! [`MarkdownStyler`] is a [`StreamTransform`] that converts a small
//! subset of markdown (`**bold**`, `*italic*`, `` `code` `` spans, and
//! `#` headings) into ANSI-styled text one fragment at a time. Marker
//! runs that end a fragment are held back until the next `feed`, so a
//! `**` split across two chunks still styles correctly; `finish` drains
//! the held-back text and closes any open span.

use crate::render::StreamTransform;

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for italic text.
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code for cyan text (used for code spans).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Stateful incremental markdown styler.
#[derive(Debug, Default)]
pub struct MarkdownStyler {
    pending: String,
    bold: bool,
    italic: bool,
    code: bool,
    heading: bool,
    at_line_start: bool,
}

impl MarkdownStyler {
    /// Creates a styler positioned at the start of a line.
    pub fn new() -> Self {
        Self {
            pending: String::new(),
            bold: false,
            italic: false,
            code: false,
            heading: false,
            at_line_start: true,
        }
    }

    /// Returns true if any style span is currently open.
    fn styled(&self) -> bool {
        self.bold || self.italic || self.code || self.heading
    }

    /// Emits a full reset followed by the codes for every open span.
    fn restyle(&self) -> String {
        let mut codes = String::from(ANSI_RESET);
        if self.bold || self.heading {
            codes.push_str(ANSI_BOLD);
        }
        if self.italic {
            codes.push_str(ANSI_ITALIC);
        }
        if self.code {
            codes.push_str(ANSI_CYAN);
        }
        codes
    }
}

impl StreamTransform for MarkdownStyler {
    fn feed(&mut self, input: &str) -> String {
        let mut text = std::mem::take(&mut self.pending);
        text.push_str(input);

        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            // Inside a code span only a backtick or newline is special.
            if self.code && c != '`' && c != '\n' {
                out.push(c);
                i += 1;
                continue;
            }

            match c {
                '`' => {
                    self.code = !self.code;
                    out.push_str(&self.restyle());
                    self.at_line_start = false;
                    i += 1;
                }
                '*' => {
                    if i + 1 >= chars.len() {
                        // Lone trailing asterisk: `*` or half of `**`.
                        self.pending.push('*');
                        break;
                    }
                    if chars[i + 1] == '*' {
                        self.bold = !self.bold;
                        i += 2;
                    } else {
                        self.italic = !self.italic;
                        i += 1;
                    }
                    out.push_str(&self.restyle());
                    self.at_line_start = false;
                }
                '#' if self.at_line_start => {
                    let run_end = chars[i..]
                        .iter()
                        .position(|ch| *ch != '#')
                        .map(|offset| i + offset);
                    let Some(run_end) = run_end else {
                        // The fragment ends mid-run; wait for more input.
                        self.pending.extend(&chars[i..]);
                        break;
                    };
                    if chars[run_end] == ' ' {
                        self.heading = true;
                        out.push_str(&self.restyle());
                        i = run_end + 1;
                    } else {
                        out.extend(&chars[i..run_end]);
                        i = run_end;
                    }
                    self.at_line_start = false;
                }
                '\n' => {
                    if self.heading || self.code {
                        // Headings and inline code never span lines.
                        self.heading = false;
                        self.code = false;
                        out.push_str(&self.restyle());
                    }
                    out.push('\n');
                    self.at_line_start = true;
                    i += 1;
                }
                _ => {
                    out.push(c);
                    self.at_line_start = false;
                    i += 1;
                }
            }
        }

        out
    }

    fn finish(&mut self) -> String {
        let mut out = std::mem::take(&mut self.pending);
        if self.styled() {
            out.push_str(ANSI_RESET);
        }
        self.bold = false;
        self.italic = false;
        self.code = false;
        self.heading = false;
        self.at_line_start = true;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(styler: &mut MarkdownStyler, fragments: &[&str]) -> String {
        let mut out = String::new();
        for fragment in fragments {
            out.push_str(&styler.feed(fragment));
        }
        out.push_str(&styler.finish());
        out
    }

    #[test]
    fn plain_text_passes_through() {
        let mut styler = MarkdownStyler::new();
        assert_eq!(feed_all(&mut styler, &["hello world"]), "hello world");
    }

    #[test]
    fn bold_span_in_one_fragment() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["a **b** c"]);
        assert_eq!(
            out,
            format!("a {ANSI_RESET}{ANSI_BOLD}b{ANSI_RESET} c")
        );
    }

    #[test]
    fn bold_marker_split_across_fragments() {
        let mut styler = MarkdownStyler::new();
        let split = feed_all(&mut styler, &["a *", "*b*", "* c"]);
        let mut styler = MarkdownStyler::new();
        let whole = feed_all(&mut styler, &["a **b** c"]);
        assert_eq!(split, whole);
    }

    #[test]
    fn italic_span() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["x *y* z"]);
        assert!(out.contains(ANSI_ITALIC));
        assert!(out.ends_with(" z"));
    }

    #[test]
    fn code_span_suppresses_markers() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["`a ** b`"]);
        assert!(out.contains(ANSI_CYAN));
        // The asterisks inside the span stay literal.
        assert!(out.contains("a ** b"));
        assert!(!out.contains(ANSI_BOLD));
    }

    #[test]
    fn heading_styles_whole_line() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["## Title\nbody"]);
        let expected = format!("{ANSI_RESET}{ANSI_BOLD}Title{ANSI_RESET}\nbody");
        assert_eq!(out, expected);
    }

    #[test]
    fn heading_run_split_across_fragments() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["#", "# Title\n"]);
        assert!(out.contains(ANSI_BOLD));
        assert!(out.contains("Title"));
        assert!(!out.contains('#'));
    }

    #[test]
    fn hashes_not_followed_by_space_stay_literal() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["#!/bin/sh\n"]);
        assert_eq!(out, "#!/bin/sh\n");
    }

    #[test]
    fn hash_mid_line_is_literal() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["a # b"]);
        assert_eq!(out, "a # b");
    }

    #[test]
    fn finish_flushes_dangling_marker() {
        let mut styler = MarkdownStyler::new();
        let mut out = styler.feed("tail *");
        assert_eq!(out, "tail ");
        out.push_str(&styler.finish());
        assert_eq!(out, "tail *");
    }

    #[test]
    fn finish_closes_open_span() {
        let mut styler = MarkdownStyler::new();
        let mut out = styler.feed("**never closed");
        out.push_str(&styler.finish());
        assert!(out.ends_with(ANSI_RESET));
    }

    #[test]
    fn newline_ends_code_span() {
        let mut styler = MarkdownStyler::new();
        let out = feed_all(&mut styler, &["`open\nplain"]);
        assert!(out.contains("plain"));
        // The reset fires at the newline, before the plain text.
        let reset_at = out.rfind(ANSI_RESET).unwrap();
        assert!(reset_at < out.find('\n').unwrap());
    }
}
