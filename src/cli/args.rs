//! Command-line interface

use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;

use crate::lib::{
    date::{Date, DateError, Month},
    error::Error,
    invoice::Request,
    parse,
};

/// Values of the command line, checked and converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub config: PathBuf,
    pub number: String,
    pub year: u16,
    pub month: Month,
    pub quantities: Vec<u32>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    /// directory that receives the document
    pub output: PathBuf,
}

impl Options {
    /// The part of the options that shapes the invoice itself
    pub fn request(&self) -> Request<'_> {
        Request {
            number: &self.number,
            year: self.year,
            month: self.month,
            quantities: &self.quantities,
            invoice_date: self.invoice_date.as_deref(),
            due_date: self.due_date.as_deref(),
        }
    }
}

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .default_value("config.yaml")
                .help("Configuration file, unless ~/.config/invo/config.yaml exists"),
        )
        .arg(
            Arg::with_name("number")
                .short("n")
                .long("number")
                .value_name("SEED")
                .default_value("01")
                .help("Suffix of the invoice number"),
        )
        .arg(
            Arg::with_name("year")
                .short("y")
                .long("year")
                .value_name("YYYY")
                .allow_hyphen_values(true)
                .help("Billed year [default: current year]"),
        )
        .arg(
            Arg::with_name("month")
                .short("m")
                .long("month")
                .value_name("MM")
                .allow_hyphen_values(true)
                .default_value("1")
                .help("Billed month (1-12)"),
        )
        .arg(
            Arg::with_name("date")
                .short("d")
                .long("date")
                .value_name("YYYY-MM-DD")
                .help("Invoice date, used only together with --due"),
        )
        .arg(
            Arg::with_name("due")
                .short("D")
                .long("due")
                .value_name("YYYY-MM-DD")
                .help("Due date, used only together with --date"),
        )
        .arg(
            Arg::with_name("quantities")
                .short("q")
                .long("quantities")
                .value_name("Q1,Q2,...")
                .default_value("1")
                .allow_hyphen_values(true)
                .help("Quantities of the configured items, in order"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .default_value(".")
                .help("Directory in which to write the PDF"),
        )
}

/// Convert the matches of `app()` into `Options`
///
/// `current_year` is the default of `--year`.
pub fn options(matches: &ArgMatches<'_>, current_year: i32) -> Result<Options, Error> {
    let value = |name: &str| matches.value_of(name).unwrap_or_default();
    let quantities = parse::quantities(value("quantities"))?;
    let year = match matches.value_of("year") {
        Some(text) => number("--year", text)?,
        None => current_year as i64,
    };
    // negative years are reported as 0
    let year = usize::try_from(year).unwrap_or(0);
    Date::from(year, Month::Jan, 1).map_err(|e| invalid("--year", e))?;
    let year = year as u16;
    let month = number("--month", value("month"))?;
    let month = usize::try_from(month)
        .ok()
        .and_then(Month::from_number)
        .ok_or_else(|| invalid("--month", DateError::InvalidMonth(month.max(0) as usize)))?;
    Ok(Options {
        config: PathBuf::from(value("config")),
        number: value("number").to_string(),
        year,
        month,
        quantities,
        invoice_date: matches.value_of("date").map(String::from),
        due_date: matches.value_of("due").map(String::from),
        output: PathBuf::from(value("output")),
    })
}

fn number(flag: &str, text: &str) -> Result<i64, Error> {
    text.trim().parse::<i64>().map_err(|e| {
        Error::new("Invalid number")
            .with_text(format!("{} expects an integer, got '{}'", flag, text))
            .with_text(e)
    })
}

fn invalid(flag: &str, err: DateError) -> Error {
    Error::new(format!("Invalid {}", flag))
        .with_text(&err)
        .with_hint(err.fix_hint())
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, Error> {
        let matches = app()
            .get_matches_from_safe(std::iter::once("invo").chain(args.iter().copied()))
            .unwrap();
        options(&matches, 2024)
    }

    #[test]
    fn defaults() {
        let opts = parse(&[]).unwrap();
        assert_eq!(opts, Options {
            config: PathBuf::from("config.yaml"),
            number: "01".to_string(),
            year: 2024,
            month: Month::Jan,
            quantities: vec![1],
            invoice_date: None,
            due_date: None,
            output: PathBuf::from("."),
        });
        let req = opts.request();
        assert_eq!(req.quantities, &[1]);
        assert_eq!(req.invoice_date, None);
    }

    #[test]
    fn every_flag() {
        let opts = parse(&[
            "-c", "other.yaml", "-n", "07", "-y", "2023", "-m", "12",
            "-d", "2023-12-31", "-D", "2024-01-10", "-q", "2, ,3", "-o", "out",
        ])
        .unwrap();
        assert_eq!(opts.config, PathBuf::from("other.yaml"));
        assert_eq!(opts.number, "07");
        assert_eq!(opts.year, 2023);
        assert_eq!(opts.month, Month::Dec);
        assert_eq!(opts.quantities, vec![2, 3]);
        assert_eq!(opts.invoice_date.as_deref(), Some("2023-12-31"));
        assert_eq!(opts.due_date.as_deref(), Some("2024-01-10"));
        assert_eq!(opts.output, PathBuf::from("out"));
        let long = parse(&["--month", "3", "--quantities", "4", "--due", "2024-04-01"]).unwrap();
        assert_eq!(long.month, Month::Mar);
        assert_eq!(long.quantities, vec![4]);
        assert_eq!(long.due_date.as_deref(), Some("2024-04-01"));
    }

    macro_rules! rejected {
        ( $( $arg:expr ),* => $label:expr ) => {{
            let err = parse(&[ $( $arg ),* ]).unwrap_err();
            assert_eq!(err.label(), $label);
        }};
    }

    #[test]
    fn bad_values() {
        rejected!("-m", "13" => "Invalid --month");
        rejected!("-m", "0" => "Invalid --month");
        rejected!("-m", "-1" => "Invalid --month");
        rejected!("-m", "march" => "Invalid number");
        rejected!("-y", "999" => "Invalid --year");
        rejected!("-y", "10000" => "Invalid --year");
        rejected!("-y", "-5" => "Invalid --year");
        rejected!("-q", "2, ,abc" => "Invalid quantity");
        rejected!("-q", "-3" => "Invalid quantity");
    }

    #[test]
    fn quantities_are_checked_first() {
        rejected!("-m", "13", "-q", "x" => "Invalid quantity");
    }
}
