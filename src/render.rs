//! Stream rendering for chat responses.
//!
//! [`StreamRenderer`] consumes one chunked response, writing each text
//! fragment to the terminal as it arrives while reconstructing the full
//! response for history. Styling and wrapping are injected as
//! [`StreamTransform`] stages; with no stages configured the renderer
//! emits raw text.

use std::io::{self, Stdout, Write};

use futures::{Stream, StreamExt};

use crate::error::Result;
use crate::markdown::MarkdownStyler;
use crate::types::StreamChunk;
use crate::wrap::LineWrapper;

/// ANSI escape code for yellow text (used for warnings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// A stateful incremental text transform.
///
/// Each call to `feed` consumes one fragment and returns the styled
/// output for that fragment only; state carries across calls so markers
/// split over fragment boundaries are handled. `finish` drains whatever
/// the transform buffered but has not yet emitted.
pub trait StreamTransform {
    /// Transform one input fragment, returning the output owed so far.
    fn feed(&mut self, input: &str) -> String;

    /// Drain buffered-but-unemitted output at end of stream.
    fn finish(&mut self) -> String;
}

/// The outcome of rendering one response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// The full reconstructed response text, in arrival order.
    pub text: String,

    /// The number of chunks observed. Diagnostics only.
    pub chunks: u64,
}

/// Renders one streamed response to a terminal.
///
/// A renderer is instantiated fresh per response and discarded once
/// [`StreamRenderer::consume`] returns.
pub struct StreamRenderer<W: Write> {
    out: W,
    transforms: Vec<Box<dyn StreamTransform>>,
}

impl StreamRenderer<Stdout> {
    /// Creates a renderer that emits raw fragment text to stdout.
    pub fn raw() -> Self {
        Self::with_output(io::stdout(), Vec::new())
    }

    /// Creates a renderer that styles markdown, wrapping to `wrap_width`
    /// columns when one is given, and writes to stdout.
    pub fn styled(wrap_width: Option<usize>) -> Self {
        let mut transforms: Vec<Box<dyn StreamTransform>> = vec![Box::new(MarkdownStyler::new())];
        if let Some(width) = wrap_width.filter(|width| *width > 0) {
            transforms.push(Box::new(LineWrapper::new(width)));
        }
        Self::with_output(io::stdout(), transforms)
    }
}

impl<W: Write> StreamRenderer<W> {
    /// Creates a renderer over an arbitrary writer and transform pipeline.
    ///
    /// Transforms apply in order; an empty pipeline is the raw mode.
    pub fn with_output(out: W, transforms: Vec<Box<dyn StreamTransform>>) -> Self {
        Self { out, transforms }
    }

    /// Consumes the stream, emitting output chunk by chunk.
    ///
    /// Each fragment is appended to the reconstruction buffer, pushed
    /// through the transform pipeline, written, and flushed before the
    /// next chunk is awaited. Once the stream ends every transform is
    /// drained in pipeline order.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream yields one or a terminal write fails.
    pub async fn consume<S>(&mut self, mut stream: S) -> Result<RenderResult>
    where
        S: Stream<Item = Result<StreamChunk>> + Unpin,
    {
        let mut text = String::new();
        let mut chunks = 0u64;

        while let Some(item) = stream.next().await {
            let chunk = item?;
            chunks += 1;
            let Some(fragment) = chunk.text() else {
                continue;
            };
            text.push_str(fragment);

            let mut styled = fragment.to_string();
            for transform in &mut self.transforms {
                styled = transform.feed(&styled);
            }
            if !styled.is_empty() {
                self.out.write_all(styled.as_bytes())?;
                self.out.flush()?;
            }
        }

        // Drain each stage through the stages downstream of it.
        for index in 0..self.transforms.len() {
            let mut tail = self.transforms[index].finish();
            for downstream in index + 1..self.transforms.len() {
                tail = self.transforms[downstream].feed(&tail);
            }
            if !tail.is_empty() {
                self.out.write_all(tail.as_bytes())?;
            }
        }
        self.out.flush()?;

        Ok(RenderResult { text, chunks })
    }

    /// Consumes the renderer, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Print an informational message to stdout.
pub fn print_info(info: &str) {
    println!("{info}");
}

/// Print a warning to stdout with a distinct marker.
pub fn print_warning(warning: &str) {
    println!("{ANSI_YELLOW}Warning:{ANSI_RESET} {warning}");
}

/// Print an error to stderr with a distinct marker.
pub fn print_error(error: &str) {
    eprintln!("{ANSI_RED}Error:{ANSI_RESET} {error}");
}
