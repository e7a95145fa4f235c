//! CSV batch manifest.
//!
//! The command line exporter reads the transactions to deposit from a CSV
//! file with one row per check:
//!
//! ```text
//! batch_id,batch_name,transaction_id,processed_at,amount,currency_type,micr,front_image,back_image
//! 1,Sunday,1001,2019-01-13 09:15:00,125.00,check,d123456780d   123-456-7c  5431,1001-front.tif,1001-back.tif
//! ```
//!
//! Image paths are relative to an image directory.

use crate::error::{Error, Result};
use crate::types::{Batch, CurrencyType, TransactionImage, TransactionView};
use chrono::NaiveDateTime;
use csv::Reader;
use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// One manifest row.
#[derive(Debug, Deserialize)]
struct ManifestRecord {
    batch_id: u64,
    #[serde(default)]
    batch_name: String,
    transaction_id: u64,
    processed_at: String,
    amount: String,
    currency_type: String,
    #[serde(default)]
    micr: String,
    #[serde(default)]
    front_image: String,
    #[serde(default)]
    back_image: String,
}

/// Load batches from a manifest, in the order batches first appear.
///
/// # Arguments
///
/// * `reader` - Source of the CSV data
/// * `image_root` - Directory image paths are resolved against
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::path::Path;
/// use x937_export::manifest::load_batches;
///
/// let mut file = File::open("deposit.csv")?;
/// let batches = load_batches(&mut file, Path::new("images"))?;
/// println!("Loaded {} batches", batches.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_batches<R: Read>(reader: &mut R, image_root: &Path) -> Result<Vec<Batch>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut batches: Vec<Batch> = Vec::new();

    for (index, result) in csv_reader.deserialize().enumerate() {
        let row = index + 1;
        let record: ManifestRecord = result?;

        let processed = parse_timestamp(&record.processed_at)
            .map_err(|_| Error::InvalidDate(format!("row {}: '{}'", row, record.processed_at)))?;
        let amount = parse_amount(&record.amount)
            .map_err(|_| Error::InvalidAmount(format!("row {}: '{}'", row, record.amount)))?;
        let currency_type = CurrencyType::from_str(&record.currency_type)
            .map_err(|e| Error::ParseError(format!("row {}: {}", row, e)))?;

        let mut images = Vec::new();
        for path in [&record.front_image, &record.back_image] {
            if path.trim().is_empty() {
                break;
            }
            images.push(TransactionImage {
                data: fs::read(image_root.join(path.trim()))?,
                created: None,
            });
        }

        let transaction = TransactionView {
            id: record.transaction_id,
            processed,
            amount,
            currency_type,
            micr_encrypted: record.micr,
            images,
        };

        match batches.iter_mut().find(|b| b.id == record.batch_id) {
            Some(batch) => batch.add_transaction(transaction),
            None => {
                let mut batch = Batch::new(record.batch_id, record.batch_name);
                batch.add_transaction(transaction);
                batches.push(batch);
            }
        }
    }

    debug!("Loaded {} batches from manifest", batches.len());
    Ok(batches)
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    for format in formats {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value.trim(), format) {
            return Ok(timestamp);
        }
    }

    Err(Error::InvalidDate(value.to_string()))
}

fn parse_amount(value: &str) -> Result<Decimal> {
    let cleaned = value.trim().replace(['$', ','], "");

    Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount(value.to_string()))
}
