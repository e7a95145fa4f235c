//! Destination hooks for building a cash letter file.
//!
//! The [`Exporter`](crate::export::Exporter) always walks the same structure:
//! file header, cash letter header, bundles of items, controls. Every record
//! along the way is produced by a [`FileFormat`] hook. The provided methods
//! build the DSTU base layout; a bank format overrides only the hooks where
//! its requirements differ.

use crate::dstu_format;
use crate::error::{Error, Result};
use crate::micr::Micr;
use crate::records::{
    BundleControl, BundleHeader, CashLetterControl, CashLetterHeader, FileControl, FileHeader,
    Record,
};
use crate::services::Services;
use crate::state::Counters;
use crate::types::{ExportRequest, FormatConfig, TransactionView};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Write;

/// Default number of items in a bundle.
pub const DEFAULT_MAX_ITEMS_PER_BUNDLE: usize = 200;

/// State shared by every hook during one export.
pub struct ExportContext<'a> {
    pub request: &'a ExportRequest,
    pub services: Services<'a>,
    pub counters: Counters<'a>,
}

impl<'a> ExportContext<'a> {
    pub fn new(request: &'a ExportRequest, services: Services<'a>, counters: Counters<'a>) -> Self {
        Self {
            request,
            services,
            counters,
        }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.request.config
    }

    /// Decrypt a stored value.
    pub fn decrypt(&self, value: &str) -> String {
        self.services.decryptor.decrypt(value)
    }

    /// Decrypt an optional stored value; blank values count as absent.
    pub fn decrypt_optional(&self, value: Option<&str>) -> Option<String> {
        value
            .map(|v| self.decrypt(v))
            .filter(|v| !v.trim().is_empty())
    }

    /// Decrypted bank routing number.
    pub fn routing_number(&self) -> String {
        self.decrypt(&self.request.config.routing_number)
    }

    /// Decrypted bank account number.
    pub fn account_number(&self) -> String {
        self.decrypt(&self.request.config.account_number)
    }

    /// Decrypted MICR line of a transaction.
    pub fn micr_line(&self, transaction: &TransactionView) -> String {
        self.decrypt(&transaction.micr_encrypted)
    }

    /// Decoded MICR line of a transaction.
    pub fn micr(&self, transaction: &TransactionView) -> Result<Micr> {
        Micr::parse(&self.micr_line(transaction))
    }

    pub fn export_time(&self) -> NaiveDateTime {
        self.request.export_time
    }

    pub fn business_date(&self) -> NaiveDate {
        self.request.business_date
    }

    /// Split into the counter session, ending the context.
    pub fn into_counters(self) -> Counters<'a> {
        self.counters
    }
}

/// Per-item values a destination may customize.
///
/// Returned by [`FileFormat::item_params`] and consumed by
/// [`dstu_format::item_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemParams {
    /// Sequence number written to the check detail and image data records.
    pub item_sequence_number: String,
    /// Routing number for the image view records.
    pub image_routing_number: String,
    /// Emit a check detail addendum A record.
    pub include_addendum: bool,
    pub bofd_indicator: String,
    pub archive_type: String,
    /// Cycle number for the image view data records.
    pub image_cycle_number: String,
    pub on_us: String,
    pub aux_on_us: String,
}

/// A destination bank's variation of the X9.37 DSTU layout.
pub trait FileFormat {
    /// Display name of the destination.
    fn name(&self) -> &'static str;

    fn max_items_per_bundle(&self) -> usize {
        DEFAULT_MAX_ITEMS_PER_BUNDLE
    }

    /// File Header Record (type 01).
    fn file_header(&self, ctx: &mut ExportContext<'_>) -> Result<FileHeader> {
        dstu_format::file_header(ctx)
    }

    /// Cash letter id written to the cash letter header.
    fn cash_letter_id(&self, ctx: &mut ExportContext<'_>) -> Result<String> {
        let id = ctx.counters.next_cash_letter_id(1)?;
        Ok(format!("{:08}", id))
    }

    /// Cash Letter Header Record (type 10).
    fn cash_letter_header(&self, ctx: &mut ExportContext<'_>) -> Result<CashLetterHeader> {
        let id = self.cash_letter_id(ctx)?;
        Ok(dstu_format::cash_letter_header(ctx, id))
    }

    /// Bundle Header Record (type 20) for the bundle at `bundle_index`.
    fn bundle_header(&self, ctx: &mut ExportContext<'_>, bundle_index: usize) -> Result<BundleHeader> {
        Ok(dstu_format::bundle_header(ctx, bundle_index))
    }

    /// Credit detail records written at the start of a bundle.
    fn credit_detail_records(
        &self,
        _ctx: &mut ExportContext<'_>,
        _bundle_index: usize,
        _transactions: &[&TransactionView],
    ) -> Result<Vec<Record>> {
        Ok(Vec::new())
    }

    /// Values used to build the records of one item.
    fn item_params(
        &self,
        ctx: &mut ExportContext<'_>,
        _transaction: &TransactionView,
        micr: &Micr,
    ) -> Result<ItemParams> {
        Ok(dstu_format::default_item_params(ctx, micr))
    }

    /// Records for one check: detail, optional addendum, front and back images.
    fn item_records(&self, ctx: &mut ExportContext<'_>, transaction: &TransactionView) -> Result<Vec<Record>> {
        let micr = ctx.micr(transaction)?;
        let params = self.item_params(ctx, transaction, &micr)?;
        dstu_format::item_records(ctx, transaction, &micr, &params)
    }

    /// Whether a record counts as an item in the control records.
    fn is_item(&self, record: &Record) -> bool {
        matches!(record, Record::CheckDetail(_))
    }

    /// Bundle Control Record (type 70) for the records of one bundle.
    fn bundle_control(&self, _ctx: &ExportContext<'_>, records: &[Record]) -> Result<BundleControl> {
        dstu_format::bundle_control(records, |r| self.is_item(r))
    }

    /// Cash Letter Control Record (type 90) for the records of the cash letter.
    fn cash_letter_control(&self, ctx: &ExportContext<'_>, records: &[Record]) -> Result<CashLetterControl> {
        dstu_format::cash_letter_control(ctx, records, |r| self.is_item(r))
    }

    /// File Control Record (type 99) for every record emitted so far.
    fn file_control(&self, ctx: &ExportContext<'_>, records: &[Record]) -> Result<FileControl> {
        dstu_format::file_control(ctx, records, |r| self.is_item(r))
    }

    /// Bytes written before the first record.
    fn write_pre_content(&self, config: &FormatConfig, out: &mut dyn Write) -> Result<()> {
        if let Some(header) = config.pre_content_header.as_deref().filter(|h| !h.is_empty()) {
            out.write_all(header.as_bytes())?;
            out.write_all(b"\r\n")?;
        }
        Ok(())
    }

    /// Frame and write one record.
    fn write_record(&self, config: &FormatConfig, record: &Record, out: &mut dyn Write) -> Result<()> {
        let bytes = record.encode()?;
        if config.record_length_prefix {
            let length = u32::try_from(bytes.len())
                .map_err(|_| Error::encoding(record.name(), "*", "record is longer than 4 GiB"))?;
            out.write_all(&length.to_be_bytes())?;
        }
        out.write_all(&bytes)?;
        Ok(())
    }
}
