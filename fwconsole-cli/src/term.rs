//! Terminal implementations of the library's console I/O seams.
//!
//! Channel contract: device response lines go to stdout so they can be
//! piped; status, markers, warnings, and the prompt go to stderr.

use console::style;
use fwconsole::{CommandSource, OutputSink, Result};
use std::io::{self, BufRead as _, Write as _};

/// Output sink writing styled operator output to the terminal.
pub(crate) struct TermSink {
    quiet: bool,
    /// Whether the cursor sits after a run of progress markers.
    mid_markers: bool,
}

impl TermSink {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            mid_markers: false,
        }
    }

    /// Terminate a marker run so the next line starts in column one.
    fn break_markers(&mut self) {
        if self.mid_markers {
            eprintln!();
            self.mid_markers = false;
        }
    }
}

impl OutputSink for TermSink {
    fn status(&mut self, text: &str) {
        self.break_markers();
        if !self.quiet {
            eprintln!("{} {text}", style("::").cyan().bold());
        }
    }

    fn response(&mut self, line: &str) {
        self.break_markers();
        println!("{} {line}", style(">>").dim());
    }

    fn marker(&mut self) {
        eprint!(".");
        let _ = io::stderr().flush();
        self.mid_markers = true;
    }

    fn warning(&mut self, text: &str) {
        self.break_markers();
        eprintln!("{} {text}", style("warning:").yellow().bold());
    }
}

/// Command source reading one line per turn from stdin with a prompt.
pub(crate) struct StdioSource;

impl CommandSource for StdioSource {
    fn next_command(&mut self) -> Result<Option<String>> {
        eprint!("{} ", style("<<").green().bold());
        let _ = io::stderr().flush();

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            // End of input; leave the prompt line cleanly terminated.
            eprintln!();
            return Ok(None);
        }
        Ok(Some(line.trim_end().to_string()))
    }
}
