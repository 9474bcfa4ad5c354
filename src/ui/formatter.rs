//! Console output for the release pipeline.
//!
//! All operator-facing messages go through a [Reporter], which carries the
//! quiet and color switches instead of relying on process-wide state.

use console::{style, StyledObject};

use crate::boundary::BoundaryWarning;

const SPLASH: &str = r#"
      _ _                       _
     (_|_)_ __ __ _   _ __ ___ | | ___  __ _ ___  ___
     | | | '__/ _` | | '__/ _ \| |/ _ \/ _` / __|/ _ \
     | | | | | (_| | | | |  __/| |  __/ (_| \__ \  __/
    _/ |_|_|  \__,_| |_|  \___||_|\___|\__,_|___/\___|
   |__/
"#;

/// Prints status lines, warnings and errors for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reporter {
    verbose: bool,
    colors: bool,
}

impl Reporter {
    pub fn new(verbose: bool, colors: bool) -> Self {
        Reporter { verbose, colors }
    }

    /// A reporter that only prints errors, for tests and scripted runs.
    pub fn quiet() -> Self {
        Reporter::new(false, false)
    }

    fn paint<'a>(&self, styled: StyledObject<&'a str>) -> StyledObject<&'a str> {
        if self.colors {
            styled
        } else {
            styled.force_styling(false)
        }
    }

    pub fn splash(&self) {
        if self.verbose {
            println!("{}", self.paint(style(SPLASH).magenta()));
        }
    }

    /// Format and print a section header.
    pub fn header(&self, message: &str) {
        if self.verbose {
            println!("{}", self.paint(style(message).magenta().bold()));
        }
    }

    /// Format and print a success message with a green checkmark.
    pub fn success(&self, message: &str) {
        if self.verbose {
            println!("{} {}", self.paint(style("✓").green()), message);
        }
    }

    /// Format and print a status message with a yellow arrow.
    pub fn status(&self, message: &str) {
        if self.verbose {
            println!("{} {}", self.paint(style("→").yellow()), message);
        }
    }

    pub fn bullet(&self, item: &str) {
        if self.verbose {
            println!("{}", self.paint(style(item).green()));
        }
    }

    /// Display a boundary warning to the operator.
    pub fn warning(&self, warning: &BoundaryWarning) {
        if self.verbose {
            eprintln!("{} {}", self.paint(style("⚠ WARNING:").yellow()), warning);
        }
    }

    /// Errors are printed even when quiet.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.paint(style("ERROR:").red()), message);
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter::new(true, true)
    }
}
