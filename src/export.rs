//! Assembly of a complete cash letter file.

use crate::error::{Error, Result};
use crate::records::Record;
use crate::services::Services;
use crate::state::{Counters, StateStore};
use crate::strategy::{ExportContext, FileFormat};
use crate::types::{Batch, CurrencyType, ExportRequest, TransactionView};
use log::{debug, info};
use std::io::Write;

/// Builds X9.37 files for one destination.
pub struct Exporter<'a> {
    format: &'a dyn FileFormat,
    services: Services<'a>,
}

impl<'a> Exporter<'a> {
    pub fn new(format: &'a dyn FileFormat, services: Services<'a>) -> Self {
        Self { format, services }
    }

    /// Export the request to a byte buffer.
    ///
    /// Counters in `store` are only advanced when the whole file was built
    /// and encoded.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] when any transaction is not a check
    /// - [`Error::Transaction`] when the records of one transaction fail
    /// - [`Error::Encoding`] when a value does not fit its field
    pub fn export(&self, request: &ExportRequest, store: &mut dyn StateStore) -> Result<Vec<u8>> {
        let transactions = ordered_transactions(&request.batches);
        validate(&transactions)?;

        info!(
            "Exporting {} transactions from {} batches for {}",
            transactions.len(),
            request.batches.len(),
            self.format.name()
        );

        let counters = Counters::new(store, request.config.destination_key.clone());
        let mut ctx = ExportContext::new(request, self.services, counters);
        let records = self.build_records(&mut ctx, &transactions)?;

        let mut out = Vec::new();
        self.format.write_pre_content(&request.config, &mut out)?;
        for record in &records {
            self.format.write_record(&request.config, record, &mut out)?;
        }

        ctx.into_counters().commit()?;

        info!("Wrote {} records ({} bytes)", records.len(), out.len());
        Ok(out)
    }

    /// Export the request to a writer. Nothing is written when the export fails.
    pub fn export_to<W: Write>(
        &self,
        request: &ExportRequest,
        store: &mut dyn StateStore,
        writer: &mut W,
    ) -> Result<()> {
        let bytes = self.export(request, store)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// All records of the file in write order.
    pub fn build_records(
        &self,
        ctx: &mut ExportContext<'_>,
        transactions: &[&TransactionView],
    ) -> Result<Vec<Record>> {
        let format = self.format;
        let mut records = vec![
            Record::FileHeader(format.file_header(ctx)?),
            Record::CashLetterHeader(format.cash_letter_header(ctx)?),
        ];

        let max_items = format.max_items_per_bundle().max(1);
        for (bundle_index, bundle) in transactions.chunks(max_items).enumerate() {
            let mut bundle_records = vec![Record::BundleHeader(format.bundle_header(ctx, bundle_index)?)];
            bundle_records.extend(format.credit_detail_records(ctx, bundle_index, bundle)?);

            for transaction in bundle {
                let items = format
                    .item_records(ctx, transaction)
                    .map_err(|e| Error::Transaction {
                        id: transaction.id,
                        source: Box::new(e),
                    })?;
                bundle_records.extend(items);
            }

            let control = format.bundle_control(ctx, &bundle_records)?;
            bundle_records.push(Record::BundleControl(control));

            debug!(
                "Bundle {} holds {} transactions in {} records",
                bundle_index + 1,
                bundle.len(),
                bundle_records.len()
            );
            records.extend(bundle_records);
        }

        let control = format.cash_letter_control(ctx, &records)?;
        records.push(Record::CashLetterControl(control));

        let control = format.file_control(ctx, &records)?;
        records.push(Record::FileControl(control));

        Ok(records)
    }
}

/// Transactions of all batches ordered by processing time, then id.
pub fn ordered_transactions(batches: &[Batch]) -> Vec<&TransactionView> {
    let mut transactions: Vec<&TransactionView> =
        batches.iter().flat_map(|b| b.transactions.iter()).collect();
    transactions.sort_by_key(|t| (t.processed, t.id));
    transactions
}

/// Reject transactions that cannot be placed in a cash letter.
pub fn validate(transactions: &[&TransactionView]) -> Result<()> {
    let messages: Vec<String> = transactions
        .iter()
        .filter(|t| t.currency_type != CurrencyType::Check)
        .map(|t| {
            format!(
                "Transaction {} is a {} payment; only checks can be exported",
                t.id,
                t.currency_type.label()
            )
        })
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(messages))
    }
}
