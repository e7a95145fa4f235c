//! Bank of the West image cash letter.
//!
//! Every bundle opens with a credit detail record for the bundle total,
//! followed by a deposit slip printed on the front only. Credits and items
//! share one sequence counter, and the credit counts as an item in the
//! control records.

use crate::dstu_format::{
    self, deposit_slip_records, sequence_number, standard_credit_detail, transactions_total,
};
use crate::error::Result;
use crate::micr::Micr;
use crate::records::{CreditDetail, Record};
use crate::strategy::{ExportContext, FileFormat, ItemParams};
use crate::types::TransactionView;

/// Payor routing number of the deposit credit.
pub const CREDIT_PAYOR_ROUTING_NUMBER: &str = "500100015";

/// Bank of the West destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct BankOfTheWestFormat;

impl FileFormat for BankOfTheWestFormat {
    fn name(&self) -> &'static str {
        "Bank of the West"
    }

    fn credit_detail_records(
        &self,
        ctx: &mut ExportContext<'_>,
        _bundle_index: usize,
        transactions: &[&TransactionView],
    ) -> Result<Vec<Record>> {
        let account_number = ctx.account_number();
        let routing_number = ctx.routing_number();
        let amount = transactions_total(transactions)?;
        let sequence = sequence_number(ctx.counters.next_item_sequence_number()?);

        let credit = standard_credit_detail(
            CREDIT_PAYOR_ROUTING_NUMBER,
            format!("{}/", account_number),
            amount,
            sequence,
        );

        let mut records = vec![Record::CreditDetail(CreditDetail::Standard(credit))];
        records.extend(deposit_slip_records(
            ctx,
            &routing_number,
            &account_number,
            amount,
            false,
        )?);
        Ok(records)
    }

    fn item_params(
        &self,
        ctx: &mut ExportContext<'_>,
        _transaction: &TransactionView,
        micr: &Micr,
    ) -> Result<ItemParams> {
        let mut params = dstu_format::default_item_params(ctx, micr);
        params.item_sequence_number = sequence_number(ctx.counters.next_item_sequence_number()?);
        Ok(params)
    }

    fn is_item(&self, record: &Record) -> bool {
        matches!(record, Record::CheckDetail(_) | Record::CreditDetail(_))
    }
}
