//! Pretty-printing facility for error messages
//!
//! Command-line values are highlighted through `pest::error::Error::new_from_span`,
//! the difficult part of the formatting is handled there and `Error` only adds
//! aggregation of messages as well as colored output.
//!
//! # Example
//!
//! ```rust
//! Error::new("Invalid quantity")
//!     .with_span(&loc, "not a number")
//!     .with_text("invalid quantity value 'abc'")
//!     .with_hint("quantities are non-negative integers separated by commas")
//! ```
//!
//! ```txt
//! --> Error: Invalid quantity
//!  |     --> --quantities:1:5
//!  |      |
//!  |    1 | 2, ,abc
//!  |      |     ^-^
//!  |      |
//!  |      = not a number
//!  |  invalid quantity value 'abc'
//!  |      ? hint: quantities are non-negative integers separated by commas
//! ```

use std::fmt;

use crate::lib::parse::{rule_rename, Rule};

/// Location of an error
///
/// Contains the name of the input in which the error
/// occured (a file or a command-line flag) and the precise span within it
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single failure
///
/// All messages (`label` passed with `new`, arguments of `with_hint`
/// and `with_text`) should fit in a single line.
///
/// ```rust
/// // NO
/// Error::new("Fatal failure\ngeneral message\nhint to fix")
///
/// // YES
/// Error::new("Fatal failure")
///     .with_text("general message")
///     .with_hint("hint to fix")
/// ```
#[must_use]
#[derive(Debug)]
pub struct Error {
    /// name of the error
    label: String,
    /// contents of the error
    items: Vec<Item>,
}

/// Kinds of items that can be added to an error report
#[derive(Debug)]
enum Item {
    /// highlighted input
    Block(pest::error::Error<Rule>),
    /// important message
    Text(String),
    /// recommendations for fixes
    Hint(String),
}

impl Error {
    /// Create a new error
    pub fn new<S>(msg: S) -> Self
    where S: ToString {
        Self {
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Short description given at creation
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Add a pre-existing error (e.g. to build from a parsing error)
    pub fn with_error(mut self, err: pest::error::Error<Rule>) -> Self {
        self.items.push(Item::Block(err.renamed_rules(rule_rename)));
        self
    }

    /// Add a highlighted span of input and its associated message
    pub fn with_span<S>(mut self, loc: &Loc, msg: S) -> Self
    where S: ToString {
        self.items.push(Item::Block(pest::error::Error::new_from_span(
            pest::error::ErrorVariant::CustomError {
                message: msg.to_string(),
            },
            loc.1.clone(),
        ).with_path(loc.0)));
        self
    }

    /// Add an important note
    pub fn with_text<S>(mut self, msg: S) -> Self
    where S: ToString {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// Add a hint on how to fix
    pub fn with_hint<S>(mut self, msg: S) -> Self
    where S: ToString {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }
}

impl std::error::Error for Error {}

const RED: &str = "\x1b[0;91;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = RED;
        writeln!(f, "{}--> Error:{} {}{}", color, WHITE, self.label, NONE)?;
        for item in &self.items {
            match item {
                Item::Block(err) => {
                    let mut align = "   ".to_string();
                    let mut align_found = false;
                    for line in format!("{}", err).split('\n') {
                        write!(f, " {}|{}  {}", color, if align_found { &align } else { "" }, BLUE)?;
                        for c in line.chars() {
                            match c {
                                '-' if !align_found => {
                                    align_found = true;
                                    write!(f, "{}-", align)?;
                                }
                                ' ' if !align_found => {
                                    align.pop();
                                    write!(f, " ")?;
                                }
                                '|' => write!(f, "|{}", NONE)?,
                                '=' => write!(f, "={}", NONE)?,
                                '^' => write!(f, "{}^", color)?,
                                _ => write!(f, "{}", c)?,
                            }
                        }
                        writeln!(f)?;
                    }
                }
                Item::Text(txt) => {
                    writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?;
                }
                Item::Hint(txt) => {
                    writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?;
                }
            }
        }
        Ok(())
    }
}
