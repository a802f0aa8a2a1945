//! Implementations that are useful accross the whole project
//!
//! Date management, amounts, input parsing, error reports,
//! and the construction of invoices

pub mod date;
pub mod error;
pub mod invoice;
pub mod item;
pub mod parse;
