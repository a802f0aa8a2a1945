//! Read the few command-line values that carry structure:
//! quantity lists and ISO dates

#![allow(clippy::upper_case_acronyms)]

use pest::Parser;
use pest_derive::*;

use crate::lib::error::{Error, Loc};

#[derive(Parser)]
#[grammar = "invo.pest"]
struct InvoParser;

/// Name under which quantity lists appear in error reports
const QUANTITIES: &str = "--quantities";

/// Split a comma-separated list of quantities (`"2, ,3"`)
///
/// Blank fields are skipped. Any other field that is not a non-negative
/// integer aborts the whole list, and the report points at the offending token.
pub fn quantities(text: &str) -> Result<Vec<u32>, Error> {
    let pairs = InvoParser::parse(Rule::quantities, text).map_err(|e| {
        Error::new("Parsing failure")
            .with_error(e.with_path(QUANTITIES))
            .with_hint("quantities are written as \"2,1,3\"")
    })?;
    let mut qtys = Vec::new();
    for pair in pairs.flatten() {
        let loc: Loc = (QUANTITIES, pair.as_span());
        match pair.as_rule() {
            Rule::quantity => match pair.as_str().parse::<u32>() {
                Ok(q) => qtys.push(q),
                Err(_) => {
                    return Err(Error::new("Quantity out of range")
                        .with_span(&loc, "too large")
                        .with_text(format!("invalid quantity value '{}'", pair.as_str()))
                        .with_hint(format!("quantities may not exceed {}", u32::MAX)));
                }
            },
            Rule::invalid => {
                return Err(Error::new("Invalid quantity")
                    .with_span(&loc, "not a number")
                    .with_text(format!("invalid quantity value '{}'", pair.as_str()))
                    .with_hint("quantities are non-negative integers separated by commas"));
            }
            _ => {}
        }
    }
    Ok(qtys)
}

/// Split a strict `YYYY-MM-DD` date into its numeric components
///
/// Only the shape is checked here, `Date::parse_iso` does the calendar validation.
pub fn iso_date(text: &str) -> Option<(usize, usize, usize)> {
    let pairs = InvoParser::parse(Rule::iso_date, text).ok()?;
    let mut fields = pairs.flatten().filter_map(|pair| match pair.as_rule() {
        Rule::year | Rule::month | Rule::day => pair.as_str().parse::<usize>().ok(),
        _ => None,
    });
    Some((fields.next()?, fields.next()?, fields.next()?))
}

/// Convert rule names to user-friendly information about their purpose
pub fn rule_rename(rule: &Rule) -> String {
    String::from(match rule {
        Rule::EOI => "end of input",
        Rule::quantities => "a comma-separated list of quantities",
        Rule::quantity => "a quantity",
        Rule::invalid => "a field",
        Rule::iso_date => "a date ('YYYY-MM-DD')",
        Rule::year => "a 4-digit year",
        Rule::month => "a 2-digit month",
        Rule::day => "a 2-digit day",
        #[allow(unreachable_patterns)]
        _ => "a separator",
    })
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! qty {
        ( $text:expr => [ $( $q:expr ),* ] ) => {{
            let expected: Vec<u32> = vec![ $( $q ),* ];
            assert_eq!(quantities($text).unwrap(), expected);
        }};
        ( $text:expr => !$token:expr ) => {{
            let msg = quantities($text).unwrap_err().to_string();
            assert!(
                msg.contains(&format!("'{}'", $token)),
                "expected {:?} to be reported in:\n{}", $token, msg
            );
        }};
    }

    #[test]
    fn plain_lists() {
        qty!("1" => [1]);
        qty!("2,1" => [2, 1]);
        qty!("2, 1 ,  3" => [2, 1, 3]);
        qty!("0,10" => [0, 10]);
    }

    #[test]
    fn blanks_are_skipped() {
        qty!("" => []);
        qty!("  " => []);
        qty!("2,,3" => [2, 3]);
        qty!("2, ,3" => [2, 3]);
        qty!(",4," => [4]);
    }

    #[test]
    fn bad_tokens() {
        qty!("2, ,abc" => !"abc");
        qty!("abc,2" => !"abc");
        qty!("1 2" => !"1 2");
        qty!("-3" => !"-3");
        qty!("1.5" => !"1.5");
        qty!("12abc" => !"12abc");
        qty!("99999999999" => !"99999999999");
    }

    #[test]
    fn date_shapes() {
        assert_eq!(iso_date("2024-03-31"), Some((2024, 3, 31)));
        assert_eq!(iso_date("2024-13-45"), Some((2024, 13, 45)));
        assert_eq!(iso_date("24-03-31"), None);
        assert_eq!(iso_date("2024/03/31"), None);
        assert_eq!(iso_date(" 2024-03-31"), None);
        assert_eq!(iso_date(""), None);
    }
}
