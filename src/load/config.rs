//! Shape of the configuration file and the checks it must pass
//!
//! ```yaml
//! sender:
//!   name: Acme Services
//!   city: Riga
//!   address: Brivibas iela 1
//!   reg_nr: "40001234567"
//!   phone: "+371 20000000"
//! bill_to:
//!   name: Globex Corporation
//!   address:
//!     - 42 Industrial Way
//!     - Springfield
//! project_name: Website redesign
//! payment:
//!   bic: HABALV22
//!   iban: LV80BANK0000435195001
//!   address: Riga, Latvia
//! items:
//!   - description: Development hours
//!     unit_price: 45.5
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

use crate::lib::item::Amount;

/// Who bills
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sender {
    pub name: String,
    pub city: String,
    pub address: String,
    pub reg_nr: String,
    pub phone: String,
}

/// Who is billed
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Recipient {
    pub name: String,
    pub address: Vec<String>,
}

/// Where to send the money
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Payment {
    pub bic: String,
    pub iban: String,
    pub address: String,
}

/// A billable line as configured, before quantities are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTemplate {
    pub description: String,
    pub unit_price: Amount,
    /// overwritten when the invoice is built
    pub quantity: Option<u32>,
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sender: Sender,
    pub recipient: Recipient,
    pub project: String,
    pub payment: Payment,
    /// unit prices add up to at most `MAX_PRICE_SUM`
    pub items: Vec<ItemTemplate>,
    /// prefix of every printed amount
    pub currency: String,
}

pub const DEFAULT_CURRENCY: &str = "€";

/// Largest sum of unit prices for which no subtotal overflows,
/// even with every quantity at `u32::MAX`
pub const MAX_PRICE_SUM: Amount = Amount(i64::MAX / u32::MAX as i64);

/// Configuration file exactly as written
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    sender: Sender,
    bill_to: Recipient,
    project_name: String,
    payment: Payment,
    items: Vec<RawItem>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    description: String,
    unit_price: Decimal,
    #[serde(default)]
    quantity: Option<u32>,
}

/// Ways in which a configuration can be unusable
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `sender.name` absent or blank
    MissingSender,
    /// `bill_to.name` absent or blank
    MissingRecipient,
    /// `items` absent or empty
    NoItems,
    /// an item costs less than nothing
    NegativePrice(usize, String),
    /// an item price does not fit in cents
    PriceOutOfRange(usize, String),
    /// unit prices add up to more than `MAX_PRICE_SUM`
    PricesTooLarge,
}

impl RawConfig {
    /// Check the invariants and convert prices to cents
    ///
    /// All problems are reported at once rather than only the first one.
    pub fn validate(self) -> Result<Config, Vec<ConfigError>> {
        let mut errs = Vec::new();
        if self.sender.name.trim().is_empty() {
            errs.push(ConfigError::MissingSender);
        }
        if self.bill_to.name.trim().is_empty() {
            errs.push(ConfigError::MissingRecipient);
        }
        if self.items.is_empty() {
            errs.push(ConfigError::NoItems);
        }
        let mut items = Vec::new();
        for (idx, item) in self.items.into_iter().enumerate() {
            match Amount::from_decimal(item.unit_price) {
                None => errs.push(ConfigError::PriceOutOfRange(idx + 1, item.description)),
                Some((price, _)) if price.is_negative() => {
                    errs.push(ConfigError::NegativePrice(idx + 1, item.description))
                }
                Some((price, lossy)) => {
                    if lossy {
                        tracing::warn!(
                            item = %item.description,
                            price = %item.unit_price,
                            rounded = %price,
                            "unit price rounded to the cent"
                        );
                    }
                    items.push(ItemTemplate {
                        description: item.description,
                        unit_price: price,
                        quantity: item.quantity,
                    });
                }
            }
        }
        let price_sum: i128 = items.iter().map(|it| it.unit_price.0 as i128).sum();
        if price_sum > MAX_PRICE_SUM.0 as i128 {
            errs.push(ConfigError::PricesTooLarge);
        }
        if !errs.is_empty() {
            return Err(errs);
        }
        Ok(Config {
            sender: self.sender,
            recipient: self.bill_to,
            project: self.project_name,
            payment: self.payment,
            items,
            currency: self.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ConfigError::*;
        match self {
            MissingSender => write!(f, "sender name is required"),
            MissingRecipient => write!(f, "bill to name is required"),
            NoItems => write!(f, "at least one item is required"),
            NegativePrice(i, d) => write!(f, "item #{} ('{}') has a negative unit price", i, d),
            PriceOutOfRange(i, d) => write!(f, "item #{} ('{}') has an unrepresentable unit price", i, d),
            PricesTooLarge => write!(f, "unit prices add up to more than {}", MAX_PRICE_SUM),
        }
    }
}

impl ConfigError {
    /// What message to show to help fix the configuration
    pub fn fix_hint(&self) -> String {
        use ConfigError::*;
        match self {
            MissingSender => "add 'name' under 'sender'".to_string(),
            MissingRecipient => "add 'name' under 'bill_to'".to_string(),
            NoItems => "add an entry under 'items' with a 'description' and a 'unit_price'".to_string(),
            NegativePrice(i, _) => format!("make the unit price of item #{} zero or positive", i),
            PriceOutOfRange(i, _) => format!("lower the unit price of item #{}", i),
            PricesTooLarge => "lower the unit prices so that any subtotal stays representable".to_string(),
        }
    }
}
