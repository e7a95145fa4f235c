//! Wells Fargo image cash letter.

use crate::dstu_format::{self, sequence_number, transactions_total};
use crate::error::Result;
use crate::micr::Micr;
use crate::records::{BundleHeader, CashLetterHeader, CreditDetail, Record, WellsFargoCreditDetail};
use crate::strategy::{ExportContext, FileFormat, ItemParams};
use crate::types::TransactionView;

/// Items per bundle accepted by Wells Fargo.
pub const MAX_ITEMS_PER_BUNDLE: usize = 299;

/// Bank location used in cash letter ids when none is configured.
pub const DEFAULT_BANK_LOCATION_NUMBER: u16 = 31;

/// Payor routing number of the deposit credit.
pub const CREDIT_PAYOR_ROUTING_NUMBER: &str = "500000377";

/// Process control field of the deposit credit.
pub const CREDIT_PROCESS_CONTROL: &str = "6586";

/// Cycle number for bundles and images.
const CYCLE_NUMBER: &str = "01";

/// Wells Fargo destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellsFargoFormat;

impl FileFormat for WellsFargoFormat {
    fn name(&self) -> &'static str {
        "Wells Fargo"
    }

    fn max_items_per_bundle(&self) -> usize {
        MAX_ITEMS_PER_BUNDLE
    }

    /// `2`, the three digit bank location and a four digit counter.
    fn cash_letter_id(&self, ctx: &mut ExportContext<'_>) -> Result<String> {
        let location = ctx
            .config()
            .bank_location_number
            .unwrap_or(DEFAULT_BANK_LOCATION_NUMBER);
        let counter = ctx.counters.next_cash_letter_id(1)? % 10_000;
        Ok(format!("2{:03}{:04}", location, counter))
    }

    fn cash_letter_header(&self, ctx: &mut ExportContext<'_>) -> Result<CashLetterHeader> {
        let id = self.cash_letter_id(ctx)?;
        Ok(CashLetterHeader {
            work_type: "C".to_string(),
            ..dstu_format::cash_letter_header(ctx, id)
        })
    }

    fn bundle_header(&self, ctx: &mut ExportContext<'_>, bundle_index: usize) -> Result<BundleHeader> {
        Ok(BundleHeader {
            cycle_number: CYCLE_NUMBER.to_string(),
            ..dstu_format::bundle_header(ctx, bundle_index)
        })
    }

    fn credit_detail_records(
        &self,
        ctx: &mut ExportContext<'_>,
        _bundle_index: usize,
        transactions: &[&TransactionView],
    ) -> Result<Vec<Record>> {
        let credit = WellsFargoCreditDetail {
            amount: transactions_total(transactions)?,
            credit_account_number: ctx.account_number(),
            process_control: CREDIT_PROCESS_CONTROL.to_string(),
            payor_routing_number: CREDIT_PAYOR_ROUTING_NUMBER.to_string(),
            aux_on_us: String::new(),
            item_sequence_number: sequence_number(ctx.counters.next_item_sequence_number()?),
            external_processing_code: String::new(),
            type_of_account: String::new(),
            source_of_work: "3".to_string(),
        };

        Ok(vec![Record::CreditDetail(CreditDetail::WellsFargo(credit))])
    }

    fn item_params(
        &self,
        ctx: &mut ExportContext<'_>,
        _transaction: &TransactionView,
        micr: &Micr,
    ) -> Result<ItemParams> {
        Ok(ItemParams {
            item_sequence_number: sequence_number(ctx.counters.next_item_sequence_number()?),
            include_addendum: false,
            bofd_indicator: "U".to_string(),
            archive_type: "B".to_string(),
            image_cycle_number: CYCLE_NUMBER.to_string(),
            ..dstu_format::default_item_params(ctx, micr)
        })
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
            FormatConfig::new("wf", "121000248", "5566778899"),
            Vec::new(),
            NaiveDateTime::parse_from_str("2019-01-15 13:58:08", "%Y-%m-%d %H:%M:%S").unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_cash_letter_id_layout() {
        let mut request = request();
        let images = Passthrough::new();
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();

        {
            let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "wf"));
            let header = WellsFargoFormat.cash_letter_header(&mut ctx).unwrap();
            assert_eq!(header.id, "20310001");
            assert_eq!(header.work_type, "C");
        }

        request.config.bank_location_number = Some(7);
        store.set("wf.NextCashLetterId", "12345").unwrap();
        let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "wf"));
        assert_eq!(WellsFargoFormat.cash_letter_id(&mut ctx).unwrap(), "20072345");
    }

    #[test]
    fn test_credit_detail_layout() {
        let request = request();
        let images = Passthrough::new();
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();
        let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "wf"));

        let txn = TransactionView {
            id: 1,
            processed: request.export_time,
            amount: Decimal::new(12345, 2),
            currency_type: CurrencyType::Check,
            micr_encrypted: String::new(),
            images: Vec::new(),
        };
        let records = WellsFargoFormat.credit_detail_records(&mut ctx, 0, &[&txn]).unwrap();
        assert_eq!(records.len(), 1);

        let line = String::from_utf8(records[0].encode().unwrap()).unwrap();
        assert_eq!(&line[0..2], "61");
        assert_eq!(&line[2..14], "000000012345");
        assert_eq!(&line[14..31], "       5566778899");
        assert_eq!(&line[31..37], "  6586");
        assert_eq!(&line[37..46], "500000377");
        assert_eq!(&line[61..76], "000000000000001");
        assert_eq!(&line[78..79], "3");
    }

    #[test]
    fn test_item_params() {
        let request = request();
        let images = Passthrough::new();
        let services = Services::new(&PlainText, &images, &MergeFields);
        let mut store = MemoryStore::new();
        let mut ctx = ExportContext::new(&request, services, Counters::new(&mut store, "wf"));

        let txn = TransactionView {
            id: 1,
            processed: request.export_time,
            amount: Decimal::new(500, 2),
            currency_type: CurrencyType::Check,
            micr_encrypted: "d123456780d   123-456-7c  5431".into(),
            images: vec![
                TransactionImage { data: vec![1], created: None },
                TransactionImage { data: vec![2], created: None },
            ],
        };
        let records = WellsFargoFormat.item_records(&mut ctx, &txn).unwrap();

        let types: Vec<u8> = records.iter().map(|r| r.record_type()).collect();
        assert_eq!(types, vec![25, 50, 52, 50, 52]);
        match (&records[0], &records[4]) {
            (Record::CheckDetail(detail), Record::ImageViewData(data)) => {
                assert_eq!(detail.bofd_indicator, "U");
                assert_eq!(detail.archive_type, "B");
                assert_eq!(detail.addendum_count, 0);
                assert_eq!(detail.item_sequence_number, "000000000000001");
                assert_eq!(data.cycle_number, "01");
            }
            other => panic!("unexpected records {:?}", other),
        }
    }
}
