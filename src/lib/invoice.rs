//! Turn a configuration and the inputs of one run into a complete invoice
//!
//! Everything here is a pure function of its arguments: no clock, no
//! environment, no filesystem.

use crate::lib::{
    date::{Date, Month},
    item::{Amount, LineItem},
};
use crate::load::config::{Config, ItemTemplate, Payment, Recipient, Sender};

/// Quantity of every item not covered by the command line
pub const DEFAULT_QUANTITY: u32 = 1;

/// Per-run inputs of an invoice
#[derive(Debug, Clone)]
pub struct Request<'a> {
    /// invoice number seed, appended to the generated number
    pub number: &'a str,
    pub year: u16,
    pub month: Month,
    /// quantities in item order
    pub quantities: &'a [u32],
    /// `YYYY-MM-DD`, only honored together with `due_date`
    pub invoice_date: Option<&'a str>,
    /// `YYYY-MM-DD`, only honored together with `invoice_date`
    pub due_date: Option<&'a str>,
}

/// A fully resolved invoice, ready to be laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub year: u16,
    pub month: Month,
    /// billed month as `MM/YYYY`
    pub period: String,
    pub number: String,
    pub invoice_date: Date,
    pub due_date: Date,
    pub items: Vec<LineItem>,
    /// always the sum of the line totals of `items`
    pub subtotal: Amount,
    pub sender: Sender,
    pub recipient: Recipient,
    pub project: String,
    pub payment: Payment,
    pub currency: String,
}

impl Invoice {
    /// Resolve quantities, dates, number and subtotal
    ///
    /// Never fails: missing quantities default to `DEFAULT_QUANTITY`,
    /// and explicit dates that are absent or unreadable are replaced
    /// by the end-of-month / 10th-of-next-month pair. Totals cannot overflow
    /// since validated prices add up to at most `MAX_PRICE_SUM`.
    ///
    /// [`MAX_PRICE_SUM`]: crate::load::config::MAX_PRICE_SUM
    pub fn build(config: &Config, req: &Request<'_>) -> Self {
        let items = resolve_items(&config.items, req.quantities);
        let (invoice_date, due_date) = resolve_dates(req);
        let subtotal = items.iter().map(LineItem::total).sum();
        Self {
            year: req.year,
            month: req.month,
            period: period(req.year, req.month),
            number: invoice_number(&config.sender.name, req.number, req.year, req.month),
            invoice_date,
            due_date,
            items,
            subtotal,
            sender: config.sender.clone(),
            recipient: config.recipient.clone(),
            project: config.project.clone(),
            payment: config.payment.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Name of the generated document (`Acme_Services_03_2024.pdf`)
    pub fn filename(&self, ext: &str) -> String {
        format!(
            "{}_{:02}_{:04}.{}",
            self.sender.name.replace(' ', "_"),
            self.month.number(),
            self.year,
            ext
        )
    }
}

/// Copy every configured item with its quantity for this run
///
/// Item `i` gets `quantities[i]`, or `DEFAULT_QUANTITY` past the end of the list.
/// Quantities beyond the number of items are ignored.
pub fn resolve_items(templates: &[ItemTemplate], quantities: &[u32]) -> Vec<LineItem> {
    if quantities.len() > templates.len() {
        tracing::debug!(
            given = quantities.len(),
            items = templates.len(),
            "ignoring extra quantities"
        );
    }
    templates
        .iter()
        .enumerate()
        .map(|(i, tmpl)| {
            let quantity = quantities.get(i).copied().unwrap_or(DEFAULT_QUANTITY);
            if let Some(configured) = tmpl.quantity {
                tracing::debug!(item = %tmpl.description, configured, quantity, "quantity overridden");
            }
            LineItem {
                description: tmpl.description.clone(),
                unit_price: tmpl.unit_price,
                quantity,
            }
        })
        .collect()
}

/// Explicit dates if both are present and valid, otherwise both fallbacks
fn resolve_dates(req: &Request<'_>) -> (Date, Date) {
    let explicit = |field: &str, text: Option<&str>| {
        let text = text.filter(|t| !t.is_empty())?;
        match Date::parse_iso(text) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::debug!(field, %e, "ignoring explicit date");
                None
            }
        }
    };
    let invoice_date = explicit("invoice date", req.invoice_date);
    let due_date = explicit("due date", req.due_date);
    match (invoice_date, due_date) {
        (Some(invoice_date), Some(due_date)) => (invoice_date, due_date),
        _ => {
            tracing::debug!(year = req.year, month = %req.month, "computing dates from the period");
            (
                Date::last_of_month(req.year, req.month),
                Date::due_after(req.year, req.month),
            )
        }
    }
}

/// `MM/YYYY`
pub fn period(year: u16, month: Month) -> String {
    format!("{:02}/{:04}", month.number(), year)
}

/// `{initials}-{YYYY}-{MM}-{seed}` where the initials are the uppercased
/// first letters of the words of the sender name
///
/// A sender name without words yields a number starting with `-`.
pub fn invoice_number(sender: &str, seed: &str, year: u16, month: Month) -> String {
    let initials = sender
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect::<String>();
    format!("{}-{:04}-{:02}-{}", initials, year, month.number(), seed)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::load::config::MAX_PRICE_SUM;
    use proptest::prelude::*;
    use Month::*;

    fn config(prices: &[i64]) -> Config {
        Config {
            sender: Sender {
                name: "Acme Services".to_string(),
                city: "Riga".to_string(),
                address: "Brivibas iela 1".to_string(),
                reg_nr: "40001234567".to_string(),
                phone: "+371 20000000".to_string(),
            },
            recipient: Recipient {
                name: "Globex Corporation".to_string(),
                address: vec!["42 Industrial Way".to_string(), "Springfield".to_string()],
            },
            project: "Website redesign".to_string(),
            payment: Payment {
                bic: "HABALV22".to_string(),
                iban: "LV80BANK0000435195001".to_string(),
                address: "Riga, Latvia".to_string(),
            },
            items: prices
                .iter()
                .enumerate()
                .map(|(i, p)| ItemTemplate {
                    description: format!("Item {}", i),
                    unit_price: Amount(*p),
                    quantity: None,
                })
                .collect(),
            currency: "€".to_string(),
        }
    }

    fn request<'a>(quantities: &'a [u32]) -> Request<'a> {
        Request {
            number: "01",
            year: 2024,
            month: Mar,
            quantities,
            invoice_date: None,
            due_date: None,
        }
    }

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        }
    }

    macro_rules! qtys {
        ( $n:expr, [ $( $q:expr ),* ] => [ $( $r:expr ),* ] ) => {{
            let cfg = config(&vec![100; $n]);
            let inv = Invoice::build(&cfg, &request(&[ $( $q ),* ]));
            let expected: Vec<u32> = vec![ $( $r ),* ];
            assert_eq!(inv.items.iter().map(|it| it.quantity).collect::<Vec<_>>(), expected);
        }};
    }

    #[test]
    fn quantity_reconciliation() {
        qtys!(3, [] => [1, 1, 1]);
        qtys!(3, [5] => [5, 1, 1]);
        qtys!(3, [5, 0, 2] => [5, 0, 2]);
        qtys!(2, [5, 6, 7, 8] => [5, 6]);
        qtys!(1, [0] => [0]);
    }

    #[test]
    fn configuration_is_left_untouched() {
        let cfg = config(&[100, 200]);
        let before = cfg.clone();
        let inv = Invoice::build(&cfg, &request(&[4, 5]));
        assert_eq!(cfg, before);
        assert_eq!(inv.items[0].quantity, 4);
        assert_eq!(cfg.items[0].quantity, None);
    }

    #[test]
    fn subtotal_in_cents() {
        let cfg = config(&[4550, 1999, 10]);
        let inv = Invoice::build(&cfg, &request(&[2, 3, 3]));
        assert_eq!(inv.subtotal, Amount(4550 * 2 + 1999 * 3 + 10 * 3));
        assert_eq!(inv.subtotal.to_string(), "151.27");
    }

    #[test]
    fn largest_subtotal() {
        let half = MAX_PRICE_SUM.0 / 2;
        let cfg = config(&[half, MAX_PRICE_SUM.0 - half]);
        let inv = Invoice::build(&cfg, &request(&[u32::MAX, u32::MAX]));
        assert_eq!(inv.subtotal, Amount(MAX_PRICE_SUM.0 * u32::MAX as i64));
        assert!(!inv.subtotal.is_negative());
    }

    #[test]
    fn fallback_dates() {
        let cfg = config(&[100]);
        let inv = Invoice::build(&cfg, &request(&[]));
        assert_eq!(inv.invoice_date, dt!(2024-Mar-31));
        assert_eq!(inv.due_date, dt!(2024-Apr-10));
        let dec = Invoice::build(&cfg, &Request { year: 2023, month: Dec, ..request(&[]) });
        assert_eq!(dec.invoice_date, dt!(2023-Dec-31));
        assert_eq!(dec.due_date, dt!(2024-Jan-10));
        let feb = Invoice::build(&cfg, &Request { month: Feb, ..request(&[]) });
        assert_eq!(feb.invoice_date, dt!(2024-Feb-29));
    }

    macro_rules! dates {
        ( $inv:expr, $due:expr => $expect_inv:expr, $expect_due:expr ) => {{
            let cfg = config(&[100]);
            let req = Request { invoice_date: $inv, due_date: $due, ..request(&[]) };
            let inv = Invoice::build(&cfg, &req);
            assert_eq!((inv.invoice_date, inv.due_date), ($expect_inv, $expect_due));
        }};
    }

    #[test]
    fn explicit_dates_are_all_or_nothing() {
        let fallback = (dt!(2024-Mar-31), dt!(2024-Apr-10));
        dates!(Some("2024-03-15"), Some("2024-04-15") => dt!(2024-Mar-15), dt!(2024-Apr-15));
        // due before invoice is taken verbatim too
        dates!(Some("2024-05-01"), Some("2024-01-01") => dt!(2024-May-1), dt!(2024-Jan-1));
        dates!(Some("2024-03-15"), None => fallback.0, fallback.1);
        dates!(None, Some("2024-04-15") => fallback.0, fallback.1);
        dates!(Some(""), Some("2024-04-15") => fallback.0, fallback.1);
        dates!(Some("2024-03-15"), Some("15/04/2024") => fallback.0, fallback.1);
        dates!(Some("2023-02-29"), Some("2024-04-15") => fallback.0, fallback.1);
    }

    #[test]
    fn numbering() {
        assert_eq!(invoice_number("Acme Services", "01", 2024, Mar), "AS-2024-03-01");
        assert_eq!(invoice_number("", "01", 2024, Mar), "-2024-03-01");
        assert_eq!(invoice_number("   ", "07", 2024, Mar), "-2024-03-07");
        assert_eq!(invoice_number("john  q. public", "12", 999, Nov), "JQP-0999-11-12");
        assert_eq!(invoice_number("élan vital", "1", 2024, Jan), "ÉV-2024-01-1");
    }

    #[test]
    fn naming() {
        assert_eq!(period(2024, Mar), "03/2024");
        assert_eq!(period(2023, Dec), "12/2023");
        let inv = Invoice::build(&config(&[100]), &request(&[]));
        assert_eq!(inv.period, "03/2024");
        assert_eq!(inv.number, "AS-2024-03-01");
        assert_eq!(inv.filename("pdf"), "Acme_Services_03_2024.pdf");
    }

    proptest! {
        #[test]
        fn reconciliation_property(
            n in 1usize..12,
            quantities in proptest::collection::vec(0u32..1000, 0..20),
        ) {
            let items = resolve_items(&config(&vec![100; n]).items, &quantities);
            prop_assert_eq!(items.len(), n);
            for (i, item) in items.iter().enumerate() {
                let expected = if i < quantities.len() { quantities[i] } else { DEFAULT_QUANTITY };
                prop_assert_eq!(item.quantity, expected);
            }
        }

        #[test]
        fn subtotal_matches_printed_lines(
            lines in proptest::collection::vec((0i64..1_000_000, 0u32..500), 1..15),
        ) {
            let prices = lines.iter().map(|(p, _)| *p).collect::<Vec<_>>();
            let quantities = lines.iter().map(|(_, q)| *q).collect::<Vec<_>>();
            let inv = Invoice::build(&config(&prices), &request(&quantities));
            let expected: i64 = lines.iter().map(|(p, q)| p * *q as i64).sum();
            prop_assert_eq!(inv.subtotal, Amount(expected));
            let printed: i64 = inv.items.iter()
                .map(|it| it.total().to_string().replace('.', "").parse::<i64>().unwrap())
                .sum();
            prop_assert_eq!(inv.subtotal.to_string().replace('.', "").parse::<i64>().unwrap(), printed);
        }
    }
}
