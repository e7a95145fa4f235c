//! BMO Harris Bank image cash letter.
//!
//! Differences from the base layout:
//!
//! - cash letter ids count up from `10000001`
//! - the account number replaces the client institution routing number in
//!   the cash letter and bundle headers
//! - every bundle opens with a credit detail record and a deposit slip
//!   printed on both sides
//! - items carry a sequence number from the counters and no addendum
//! - credit details count as items in the control records

use crate::dstu_format::{
    self, deposit_slip_records, sequence_number, standard_credit_detail, transactions_total,
};
use crate::error::Result;
use crate::micr::{official_check_aux_on_us, Micr};
use crate::records::{BundleHeader, CashLetterControl, CashLetterHeader, CreditDetail, Record};
use crate::strategy::{ExportContext, FileFormat, ItemParams};
use crate::types::TransactionView;

/// First cash letter id.
pub const INITIAL_CASH_LETTER_ID: u64 = 10000001;

/// Payor routing number of the deposit credit.
pub const CREDIT_PAYOR_ROUTING_NUMBER: &str = "572100001";

/// BMO Harris Bank destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct BmoFormat;

impl BmoFormat {
    /// Routing number for image view records.
    fn image_routing_number(ctx: &ExportContext<'_>) -> String {
        ctx.decrypt_optional(ctx.config().image_view_routing_number.as_deref())
            .unwrap_or_else(|| ctx.routing_number())
    }
}

impl FileFormat for BmoFormat {
    fn name(&self) -> &'static str {
        "BMO Harris Bank"
    }

    fn cash_letter_id(&self, ctx: &mut ExportContext<'_>) -> Result<String> {
        let id = ctx.counters.next_cash_letter_id(INITIAL_CASH_LETTER_ID)?;
        Ok(format!("{:08}", id))
    }

    fn cash_letter_header(&self, ctx: &mut ExportContext<'_>) -> Result<CashLetterHeader> {
        let id = self.cash_letter_id(ctx)?;
        Ok(CashLetterHeader {
            client_institution_routing_number: ctx.account_number(),
            ..dstu_format::cash_letter_header(ctx, id)
        })
    }

    fn bundle_header(&self, ctx: &mut ExportContext<'_>, bundle_index: usize) -> Result<BundleHeader> {
        Ok(BundleHeader {
            client_institution_routing_number: ctx.account_number(),
            ..dstu_format::bundle_header(ctx, bundle_index)
        })
    }

    fn credit_detail_records(
        &self,
        ctx: &mut ExportContext<'_>,
        _bundle_index: usize,
        transactions: &[&TransactionView],
    ) -> Result<Vec<Record>> {
        let account_number = ctx
            .decrypt_optional(ctx.config().deposit_account_number.as_deref())
            .unwrap_or_else(|| ctx.account_number());
        let routing_number = Self::image_routing_number(ctx);
        let amount = transactions_total(transactions)?;
        let sequence = sequence_number(ctx.counters.next_item_sequence_number()?);

        let credit = standard_credit_detail(
            CREDIT_PAYOR_ROUTING_NUMBER,
            format!("{}/", account_number),
            amount,
            sequence.clone(),
        );

        let mut records = vec![Record::CreditDetail(CreditDetail::Standard(credit))];
        records.extend(deposit_slip_records(ctx, &routing_number, &sequence, amount, true)?);
        Ok(records)
    }

    fn item_params(
        &self,
        ctx: &mut ExportContext<'_>,
        transaction: &TransactionView,
        micr: &Micr,
    ) -> Result<ItemParams> {
        let mut params = dstu_format::default_item_params(ctx, micr);
        params.item_sequence_number = sequence_number(ctx.counters.next_item_sequence_number()?);
        params.image_routing_number = Self::image_routing_number(ctx);
        params.include_addendum = false;

        // Official checks carry their serial as auxiliary on-us, not after the account.
        if let Some(serial) = official_check_aux_on_us(&ctx.micr_line(transaction)) {
            params.aux_on_us = serial;
            params.on_us = format!("{}/", micr.account_number());
        }

        Ok(params)
    }

    fn is_item(&self, record: &Record) -> bool {
        matches!(record, Record::CheckDetail(_) | Record::CreditDetail(_))
    }

    fn cash_letter_control(&self, ctx: &ExportContext<'_>, records: &[Record]) -> Result<CashLetterControl> {
        let mut control = dstu_format::cash_letter_control(ctx, records, |r| self.is_item(r))?;
        if ctx.config().add_settlement_date {
            control.settlement_date = Some(ctx.business_date());
        }
        Ok(control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MergeFields, Passthrough, PlainText, Services};
    use crate::state::{Counters, MemoryStore, StateStore};
    use crate::types::{CurrencyType, ExportRequest, FormatConfig, TransactionImage};
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn request() -> ExportRequest {
        ExportRequest::new(
            FormatConfig::new("bmo", "071000288", "4455667788"),
            Vec::new(),
            NaiveDateTime::parse_from_str("2019-01-15 13:58:08", "%Y-%m-%d %H:%M:%S").unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 15).unwrap(),
        )
    }

    fn transaction(micr: &str) -> TransactionView {
        TransactionView {
            id: 3,
            processed: NaiveDateTime::parse_from_str("2019-01-15 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            amount: Decimal::new(2500, 2),
            currency_type: CurrencyType::Check,
            micr_encrypted: micr.into(),
            images: vec![
                TransactionImage { data: vec![1], created: None },
                TransactionImage { data: vec![2], created: None },
            ],
        }
    }

    #[test]
    fn test_cash_letter_ids_start_at_10000001() {
        let request = request();
        let images = Passthrough::new();
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();
        let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "bmo"));

        let header = BmoFormat.cash_letter_header(&mut ctx).unwrap();

        assert_eq!(header.id, "10000001");
        assert_eq!(header.client_institution_routing_number, "4455667788");
        assert_eq!(header.destination_routing_number, "071000288");
        assert_eq!(BmoFormat.cash_letter_id(&mut ctx).unwrap(), "10000002");
    }

    #[test]
    fn test_items_use_sequence_numbers_without_addendum() {
        let mut request = request();
        request.config.image_view_routing_number = Some("071000013".into());
        let images = Passthrough::new();
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();
        store.set("bmo.LastItemSequenceNumber", "41").unwrap();
        let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "bmo"));

        let records = BmoFormat
            .item_records(&mut ctx, &transaction("     d123456780d   123-456-7c  5431"))
            .unwrap();

        let types: Vec<u8> = records.iter().map(|r| r.record_type()).collect();
        assert_eq!(types, vec![25, 50, 52, 50, 52]);
        match (&records[0], &records[2]) {
            (Record::CheckDetail(detail), Record::ImageViewData(data)) => {
                assert_eq!(detail.item_sequence_number, "000000000000042");
                assert_eq!(detail.addendum_count, 0);
                assert_eq!(detail.on_us, "123-456-7/5431");
                assert_eq!(data.item_sequence_number, "000000000000042");
                assert_eq!(data.institution_routing_number, "071000013");
            }
            other => panic!("unexpected records {:?}", other),
        }
    }

    #[test]
    fn test_official_check_moves_serial_to_aux_on_us() {
        let request = request();
        let images = Passthrough::new();
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();
        let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "bmo"));

        let records = BmoFormat
            .item_records(&mut ctx, &transaction("c706001c d075901231d    456327c  0101"))
            .unwrap();

        match &records[0] {
            Record::CheckDetail(detail) => {
                assert_eq!(detail.aux_on_us, "706001");
                assert_eq!(detail.on_us, "456327/");
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_credit_detail_uses_deposit_account() {
        let mut request = request();
        request.config.deposit_account_number = Some("9988".into());
        let images = Passthrough::with_deposit_slip(vec![9]);
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();
        let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "bmo"));

        let txn = transaction("d123456780d   123-456-7c  5431");
        let records = BmoFormat.credit_detail_records(&mut ctx, 0, &[&txn]).unwrap();

        assert_eq!(records.len(), 5);
        match (&records[0], &records[2]) {
            (Record::CreditDetail(CreditDetail::Standard(credit)), Record::ImageViewData(data)) => {
                assert_eq!(credit.payor_routing_number, "572100001");
                assert_eq!(credit.credit_account_number, "9988/");
                assert_eq!(credit.amount, 2500);
                assert_eq!(credit.item_sequence_number, "000000000000001");
                assert_eq!(data.item_sequence_number, "000000000000001");
            }
            other => panic!("unexpected records {:?}", other),
        }
    }

    #[test]
    fn test_settlement_date_and_item_counting() {
        let mut request = request();
        request.config.add_settlement_date = true;
        let images = Passthrough::new();
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();
        let ctx = ExportContext::new(&request, services, Counters::new(&mut store, "bmo"));

        let credit = standard_credit_detail("572100001", "1/".into(), 100, "1".into());
        let records = vec![Record::CreditDetail(CreditDetail::Standard(credit))];
        let control = BmoFormat.cash_letter_control(&ctx, &records).unwrap();

        assert_eq!(control.item_count, 1);
        assert_eq!(control.total_amount, 0);
        assert_eq!(control.settlement_date, NaiveDate::from_ymd_opt(2019, 1, 15));
    }
}
