//! Common types shared by the record builders and the export pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a transaction was paid. Only checks can be placed in a cash letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyType {
    /// Paper check.
    Check,
    /// Cash.
    Cash,
    /// Credit or debit card.
    CreditCard,
    /// ACH transfer.
    Ach,
    /// Anything else the host system records.
    Other,
}

impl FromStr for CurrencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "check" | "cheque" => Ok(CurrencyType::Check),
            "cash" => Ok(CurrencyType::Cash),
            "credit_card" | "credit card" | "card" => Ok(CurrencyType::CreditCard),
            "ach" => Ok(CurrencyType::Ach),
            "other" => Ok(CurrencyType::Other),
            _ => Err(format!("Invalid currency type: {}", s)),
        }
    }
}

impl CurrencyType {
    /// Human readable label used in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            CurrencyType::Check => "Check",
            CurrencyType::Cash => "Cash",
            CurrencyType::CreditCard => "Credit Card",
            CurrencyType::Ach => "ACH",
            CurrencyType::Other => "Other",
        }
    }
}

/// Which side of the paper item an image shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSide {
    Front,
    Back,
}

impl ImageSide {
    /// View side indicator written to the image view detail record.
    pub fn indicator(&self) -> u64 {
        match self {
            ImageSide::Front => 0,
            ImageSide::Back => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageSide::Front => "front",
            ImageSide::Back => "back",
        }
    }
}

/// A scanned image attached to a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionImage {
    /// Raw image bytes as captured by the scanner.
    pub data: Vec<u8>,

    /// When the image was captured.
    pub created: Option<NaiveDateTime>,
}

/// Read-only view of a deposited transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionView {
    /// Host identifier of the transaction.
    pub id: u64,

    /// When the transaction was processed.
    pub processed: NaiveDateTime,

    /// Total amount of the transaction.
    pub amount: Decimal,

    /// How the transaction was paid.
    pub currency_type: CurrencyType,

    /// Encrypted MICR line read from the check.
    pub micr_encrypted: String,

    /// Images in scan order: front first, then back.
    pub images: Vec<TransactionImage>,
}

impl TransactionView {
    /// Image for the requested side, if the scanner produced one.
    pub fn image(&self, side: ImageSide) -> Option<&TransactionImage> {
        match side {
            ImageSide::Front => self.images.first(),
            ImageSide::Back => self.images.get(1),
        }
    }
}

/// A batch of deposited transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Host identifier of the batch.
    pub id: u64,

    /// Batch display name.
    pub name: String,

    /// Transactions in the batch.
    pub transactions: Vec<TransactionView>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transactions: Vec::new(),
        }
    }

    /// Add a transaction to the batch.
    pub fn add_transaction(&mut self, transaction: TransactionView) {
        self.transactions.push(transaction);
    }
}

fn default_true() -> bool {
    true
}

/// Configuration of one export destination.
///
/// Routing and account numbers are stored encrypted and pass through the
/// [`Decryptor`](crate::services::Decryptor) before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Prefix for the counter keys of this destination.
    pub destination_key: String,

    /// Bank routing number (encrypted).
    pub routing_number: String,

    /// Bank account number (encrypted).
    pub account_number: String,

    /// Name of the bank the deposit is made to.
    #[serde(default)]
    pub destination_name: String,

    /// Name of the depositing organization.
    #[serde(default)]
    pub origin_name: String,

    /// Person the bank contacts about problems.
    #[serde(default)]
    pub contact_name: String,

    /// Phone number the bank calls about problems.
    #[serde(default)]
    pub contact_phone: String,

    /// Mark generated files as test files.
    #[serde(default = "default_true")]
    pub test_mode: bool,

    /// Template for the deposit slip text.
    #[serde(default)]
    pub deposit_slip_template: Option<String>,

    /// Prefix every record with its 4-byte big-endian length.
    #[serde(default = "default_true")]
    pub record_length_prefix: bool,

    /// Bank-assigned header line written before the first record.
    #[serde(default)]
    pub pre_content_header: Option<String>,

    /// Account the credit detail deposits into, when not the main account (encrypted).
    #[serde(default)]
    pub deposit_account_number: Option<String>,

    /// Routing number for image view records, when not the main routing number (encrypted).
    #[serde(default)]
    pub image_view_routing_number: Option<String>,

    /// Write the business date as the cash letter settlement date.
    #[serde(default)]
    pub add_settlement_date: bool,

    /// Three digit bank location number used in cash letter ids.
    #[serde(default)]
    pub bank_location_number: Option<u16>,

    /// Emit a credit detail record per bundle for the generic format.
    #[serde(default)]
    pub generate_credit_detail: bool,

    /// Payor routing number of the generic credit detail record (encrypted).
    #[serde(default)]
    pub credit_detail_routing_number: Option<String>,
}

impl FormatConfig {
    /// Create a configuration with the required values and defaults elsewhere.
    pub fn new(
        destination_key: impl Into<String>,
        routing_number: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            destination_key: destination_key.into(),
            routing_number: routing_number.into(),
            account_number: account_number.into(),
            destination_name: String::new(),
            origin_name: String::new(),
            contact_name: String::new(),
            contact_phone: String::new(),
            test_mode: true,
            deposit_slip_template: None,
            record_length_prefix: true,
            pre_content_header: None,
            deposit_account_number: None,
            image_view_routing_number: None,
            add_settlement_date: false,
            bank_location_number: None,
            generate_credit_detail: false,
            credit_detail_routing_number: None,
        }
    }
}

/// Everything a single export run works from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Destination configuration.
    pub config: FormatConfig,

    /// Batches whose transactions are exported.
    pub batches: Vec<Batch>,

    /// When the export was run; used for every creation timestamp.
    pub export_time: NaiveDateTime,

    /// Business date of the deposit.
    pub business_date: NaiveDate,
}

impl ExportRequest {
    /// Create a request for the given batches.
    pub fn new(
        config: FormatConfig,
        batches: Vec<Batch>,
        export_time: NaiveDateTime,
        business_date: NaiveDate,
    ) -> Self {
        Self {
            config,
            batches,
            export_time,
            business_date,
        }
    }
}
