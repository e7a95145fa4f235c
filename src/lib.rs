//! X9.37 Image Cash Letter Exporter
//!
//! A library for building X9.37 DSTU image cash letter files from deposited
//! check transactions.
//!
//! # Supported Destinations
//!
//! - **DSTU**: the generic X9.37 DSTU layout
//! - **Bank of the West**: credit detail and deposit slip per bundle
//! - **BMO Harris**: sequence-numbered items, credit detail and deposit slip
//! - **Wells Fargo**: location-based cash letter ids and its own credit detail layout
//!
//! # Features
//!
//! - Decode MICR lines into routing, account and check numbers
//! - Encode every record from a static field layout
//! - Keep file id modifiers and sequence numbers unique across runs
//! - Write to any `std::io::Write`
//!
//! # Examples
//!
//! ## Exporting a deposit
//!
//! ```no_run
//! use std::fs::File;
//! use chrono::Local;
//! use x937_export::{
//!     Destination, ExportRequest, Exporter, FormatConfig, JsonFileStore, MergeFields,
//!     Passthrough, PlainText, Services,
//! };
//!
//! let config = FormatConfig::new("first-bank", "123456780", "99887766");
//! let now = Local::now().naive_local();
//! let request = ExportRequest::new(config, Vec::new(), now, now.date());
//!
//! let images = Passthrough::new();
//! let services = Services::new(&PlainText, &images, &MergeFields);
//! let format = Destination::Dstu.file_format();
//! let mut store = JsonFileStore::open("state.json")?;
//!
//! let mut output = File::create("deposit.x937")?;
//! Exporter::new(format.as_ref(), services).export_to(&request, &mut store, &mut output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Decoding a MICR line
//!
//! ```
//! use x937_export::Micr;
//!
//! let micr = Micr::parse("c706001c d075901231d    456327c  0101   b0000039275b")?;
//! assert_eq!(micr.routing_number(), "075901231");
//! assert_eq!(micr.account_number(), "456327");
//! assert_eq!(micr.aux_on_us(), "706001");
//! # Ok::<(), x937_export::Error>(())
//! ```

pub mod error;
pub mod types;
pub mod micr;
pub mod field;
pub mod records;
pub mod state;
pub mod services;
pub mod strategy;
pub mod dstu_format;
pub mod bank_of_the_west_format;
pub mod bmo_format;
pub mod wells_fargo_format;
pub mod export;
pub mod manifest;
pub mod reader;

use std::str::FromStr;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::{Batch, CurrencyType, ExportRequest, FormatConfig, TransactionImage, TransactionView};
pub use micr::Micr;
pub use records::Record;
pub use state::{Counters, JsonFileStore, MemoryStore, StateStore};
pub use services::{MergeFields, Passthrough, PlainText, Services};
pub use strategy::{ExportContext, FileFormat, ItemParams};
pub use export::Exporter;

use bank_of_the_west_format::BankOfTheWestFormat;
use bmo_format::BmoFormat;
use dstu_format::DstuFormat;
use wells_fargo_format::WellsFargoFormat;

/// Supported export destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Generic X9.37 DSTU
    Dstu,
    /// Bank of the West
    BankOfTheWest,
    /// BMO Harris Bank
    Bmo,
    /// Wells Fargo
    WellsFargo,
}

impl FromStr for Destination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dstu" | "x937" | "x9.37" => Ok(Destination::Dstu),
            "bank-of-the-west" | "bankofthewest" | "botw" => Ok(Destination::BankOfTheWest),
            "bmo" | "bmo-harris" => Ok(Destination::Bmo),
            "wells-fargo" | "wellsfargo" | "wf" => Ok(Destination::WellsFargo),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

impl Destination {
    /// Hooks that build files for this destination.
    pub fn file_format(&self) -> Box<dyn FileFormat> {
        match self {
            Destination::Dstu => Box::new(DstuFormat),
            Destination::BankOfTheWest => Box::new(BankOfTheWestFormat),
            Destination::Bmo => Box::new(BmoFormat),
            Destination::WellsFargo => Box::new(WellsFargoFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_from_str() {
        assert_eq!("dstu".parse::<Destination>().unwrap(), Destination::Dstu);
        assert_eq!("BMO".parse::<Destination>().unwrap(), Destination::Bmo);
        assert_eq!("bank-of-the-west".parse::<Destination>().unwrap(), Destination::BankOfTheWest);
        assert_eq!("wells-fargo".parse::<Destination>().unwrap(), Destination::WellsFargo);
        assert!("unknown".parse::<Destination>().is_err());
    }

    #[test]
    fn test_destination_file_format() {
        assert_eq!(Destination::Dstu.file_format().name(), "X9.37 DSTU");
        assert_eq!(Destination::WellsFargo.file_format().max_items_per_bundle(), 299);
        assert_eq!(Destination::Bmo.file_format().max_items_per_bundle(), 200);
    }
}
