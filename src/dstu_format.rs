//! The X9.37 DSTU base layout.
//!
//! Builders here produce the records every destination shares. They are used
//! by the provided methods of [`FileFormat`] and by the bank formats when
//! they only need to change a few values of a base record.

use crate::error::{Error, Result};
use crate::field::to_cents;
use crate::micr::Micr;
use crate::records::{
    BundleControl, BundleHeader, CashLetterControl, CashLetterHeader, CheckDetail,
    CheckDetailAddendumA, CreditDetail, FileControl, FileHeader, FixedRecord, ImageViewData,
    ImageViewDetail, Record, StandardCreditDetail,
};
use crate::services::{format_currency, DEFAULT_DEPOSIT_SLIP_TEMPLATE};
use crate::strategy::{ExportContext, FileFormat, ItemParams};
use crate::types::{ImageSide, TransactionView};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Standard level written to the file header.
pub const STANDARD_LEVEL: u64 = 3;

/// Debit/credit indicator of a deposit credit.
pub const CREDIT_INDICATOR: &str = "2";

/// File Header Record with a file id modifier from the counters.
pub fn file_header(ctx: &mut ExportContext<'_>) -> Result<FileHeader> {
    let destination = ctx.routing_number();
    let origin = ctx.account_number();
    let created = ctx.export_time();
    let modifier = ctx
        .counters
        .next_file_id_modifier(&destination, &origin, created.date())?;
    let config = ctx.config();

    Ok(FileHeader {
        standard_level: STANDARD_LEVEL,
        test_file: config.test_mode,
        destination_routing_number: destination,
        origin_routing_number: origin,
        created,
        resend: false,
        destination_name: config.destination_name.clone(),
        origin_name: config.origin_name.clone(),
        file_id_modifier: modifier.to_string(),
        country_code: "US".to_string(),
        user_field: String::new(),
    })
}

/// Cash Letter Header Record with the given id.
pub fn cash_letter_header(ctx: &ExportContext<'_>, id: String) -> CashLetterHeader {
    let routing_number = ctx.routing_number();
    let config = ctx.config();

    CashLetterHeader {
        collection_type: 1,
        destination_routing_number: routing_number.clone(),
        client_institution_routing_number: routing_number,
        business_date: ctx.business_date(),
        created: ctx.export_time(),
        record_type_indicator: "I".to_string(),
        documentation_type: "G".to_string(),
        id,
        contact_name: config.contact_name.clone(),
        contact_phone: config.contact_phone.clone(),
        work_type: String::new(),
        user_field: String::new(),
    }
}

/// Bundle Header Record for the bundle at `bundle_index`.
pub fn bundle_header(ctx: &ExportContext<'_>, bundle_index: usize) -> BundleHeader {
    let routing_number = ctx.routing_number();

    BundleHeader {
        collection_type: 1,
        destination_routing_number: routing_number.clone(),
        client_institution_routing_number: routing_number.clone(),
        business_date: ctx.business_date(),
        created: ctx.export_time().date(),
        id: String::new(),
        sequence_number: bundle_index as u64 + 1,
        cycle_number: String::new(),
        return_location_routing_number: routing_number,
        user_field: String::new(),
    }
}

/// Item values of the base layout.
pub fn default_item_params(ctx: &ExportContext<'_>, micr: &Micr) -> ItemParams {
    ItemParams {
        item_sequence_number: ctx.account_number(),
        image_routing_number: ctx.routing_number(),
        include_addendum: true,
        bofd_indicator: "Y".to_string(),
        archive_type: String::new(),
        image_cycle_number: String::new(),
        on_us: format!("{}/{}", micr.account_number(), micr.check_number()),
        aux_on_us: micr.aux_on_us(),
    }
}

/// Format an item sequence number as 15 digits.
pub fn sequence_number(value: u64) -> String {
    format!("{:015}", value)
}

/// Check detail, optional addendum and the front and back image records.
pub fn item_records(
    ctx: &ExportContext<'_>,
    transaction: &TransactionView,
    micr: &Micr,
    params: &ItemParams,
) -> Result<Vec<Record>> {
    let routing = micr.routing_number();
    let (payor, check_digit) = match (routing.get(0..8), routing.get(8..9)) {
        (Some(payor), Some(digit)) => (payor.to_string(), digit.to_string()),
        _ => {
            return Err(Error::MicrParse {
                field: "routing number",
                message: format!("'{}' is shorter than 9 characters", routing),
            })
        }
    };

    let mut records = Vec::with_capacity(6);

    records.push(Record::CheckDetail(CheckDetail {
        aux_on_us: params.aux_on_us.clone(),
        external_processing_code: micr.external_processing_code(),
        payor_routing_number: payor,
        payor_routing_check_digit: check_digit,
        on_us: params.on_us.clone(),
        amount: to_cents(transaction.amount)?,
        item_sequence_number: params.item_sequence_number.clone(),
        documentation_type: "G".to_string(),
        return_acceptance: String::new(),
        micr_valid: String::new(),
        bofd_indicator: params.bofd_indicator.clone(),
        addendum_count: u64::from(params.include_addendum),
        correction: String::new(),
        archive_type: params.archive_type.clone(),
    }));

    if params.include_addendum {
        records.push(Record::CheckDetailAddendumA(CheckDetailAddendumA {
            record_number: 1,
            bofd_routing_number: ctx.routing_number(),
            bofd_business_date: ctx.business_date(),
            bofd_item_sequence_number: String::new(),
            deposit_account_number: String::new(),
            bofd_deposit_branch: String::new(),
            payee_name: String::new(),
            truncation: "N".to_string(),
            bofd_conversion: "2".to_string(),
            bofd_correction: "0".to_string(),
            user_field: String::new(),
        }));
    }

    for side in [ImageSide::Front, ImageSide::Back] {
        let image = transaction.image(side).ok_or_else(|| {
            Error::Image(format!("transaction has no {} image", side.label()))
        })?;
        let data = ctx.services.images.to_tiff_g4(&image.data)?;
        let created = image
            .created
            .map(|c| c.date())
            .unwrap_or_else(|| ctx.export_time().date());

        records.extend(image_records(
            ctx,
            ImageRecordParams {
                routing_number: &params.image_routing_number,
                item_sequence_number: &params.item_sequence_number,
                cycle_number: &params.image_cycle_number,
                creator_date: created,
                side,
            },
            data,
        ));
    }

    Ok(records)
}

/// Values shared by the two records describing one image.
pub struct ImageRecordParams<'a> {
    pub routing_number: &'a str,
    pub item_sequence_number: &'a str,
    pub cycle_number: &'a str,
    pub creator_date: NaiveDate,
    pub side: ImageSide,
}

/// Image View Detail and Image View Data records for one image.
pub fn image_records(ctx: &ExportContext<'_>, params: ImageRecordParams<'_>, data: Vec<u8>) -> [Record; 2] {
    let detail = ImageViewDetail {
        image_indicator: 1,
        creator_routing_number: params.routing_number.to_string(),
        creator_date: params.creator_date,
        view_format: 0,
        compression_algorithm: 0,
        data_size: data.len() as u64,
        side: params.side.indicator(),
        view_descriptor: 0,
        digital_signature: 0,
        user_field: String::new(),
    };

    let view = ImageViewData {
        institution_routing_number: params.routing_number.to_string(),
        bundle_business_date: ctx.business_date(),
        cycle_number: params.cycle_number.to_string(),
        item_sequence_number: params.item_sequence_number.to_string(),
        clipping_origin: 0,
        image_data: data,
    };

    [Record::ImageViewDetail(detail), Record::ImageViewData(view)]
}

/// Sum of transaction amounts in cents.
pub fn transactions_total(transactions: &[&TransactionView]) -> Result<i64> {
    transactions
        .iter()
        .try_fold(0i64, |sum, t| {
            sum.checked_add(to_cents(t.amount)?)
                .ok_or_else(|| Error::InvalidAmount(format!("deposit total exceeds {} cents", i64::MAX)))
        })
}

/// Rendered deposit slip text for a deposit of `amount` cents.
pub fn deposit_slip_text(ctx: &ExportContext<'_>, amount: i64) -> Result<String> {
    let config = ctx.config();
    let template = config
        .deposit_slip_template
        .as_deref()
        .unwrap_or(DEFAULT_DEPOSIT_SLIP_TEMPLATE);

    let mut fields = BTreeMap::new();
    fields.insert("OriginName", config.origin_name.clone());
    fields.insert("AccountNumber", ctx.account_number());
    fields.insert("Amount", format_currency(amount));

    ctx.services.templates.render(template, &fields)
}

/// Front and back deposit slip image records for a credit detail.
///
/// The slip text is printed on the front, and on the back as well when
/// `text_on_back` is set.
pub fn deposit_slip_records(
    ctx: &ExportContext<'_>,
    routing_number: &str,
    item_sequence_number: &str,
    amount: i64,
    text_on_back: bool,
) -> Result<Vec<Record>> {
    let text = deposit_slip_text(ctx, amount)?;
    let mut records = Vec::with_capacity(4);

    for side in [ImageSide::Front, ImageSide::Back] {
        let printed = side == ImageSide::Front || text_on_back;
        let data = ctx
            .services
            .images
            .deposit_slip(if printed { Some(text.as_str()) } else { None })?;

        records.extend(image_records(
            ctx,
            ImageRecordParams {
                routing_number,
                item_sequence_number,
                cycle_number: "",
                creator_date: ctx.export_time().date(),
                side,
            },
            data,
        ));
    }

    Ok(records)
}

/// Standard credit detail record depositing `amount` cents into `account`.
pub fn standard_credit_detail(
    payor_routing_number: &str,
    credit_account_number: String,
    amount: i64,
    item_sequence_number: String,
) -> StandardCreditDetail {
    StandardCreditDetail {
        aux_on_us: String::new(),
        external_processing_code: String::new(),
        payor_routing_number: payor_routing_number.to_string(),
        credit_account_number,
        amount,
        item_sequence_number,
        documentation_type: String::new(),
        type_of_account: String::new(),
        source_of_work: String::new(),
        debit_credit_indicator: CREDIT_INDICATOR.to_string(),
    }
}

/// Bundle Control Record totals for the records of one bundle.
pub fn bundle_control(records: &[Record], is_item: impl Fn(&Record) -> bool) -> Result<BundleControl> {
    let total = check_total(records, BundleControl::NAME)?;
    Ok(BundleControl {
        item_count: count(records, is_item),
        total_amount: total,
        micr_valid_total_amount: total,
        image_count: image_count(records),
        user_field: String::new(),
    })
}

/// Cash Letter Control Record totals for the records of the cash letter.
pub fn cash_letter_control(
    ctx: &ExportContext<'_>,
    records: &[Record],
    is_item: impl Fn(&Record) -> bool,
) -> Result<CashLetterControl> {
    Ok(CashLetterControl {
        bundle_count: count(records, |r| matches!(r, Record::BundleHeader(_))),
        item_count: count(records, is_item),
        total_amount: check_total(records, CashLetterControl::NAME)?,
        image_count: image_count(records),
        ece_institution_name: ctx.config().origin_name.clone(),
        settlement_date: None,
    })
}

/// File Control Record totals; the record itself is included in the record count.
pub fn file_control(
    ctx: &ExportContext<'_>,
    records: &[Record],
    is_item: impl Fn(&Record) -> bool,
) -> Result<FileControl> {
    let config = ctx.config();
    Ok(FileControl {
        cash_letter_count: count(records, |r| matches!(r, Record::CashLetterHeader(_))),
        total_record_count: records.len() as u64 + 1,
        total_item_count: count(records, is_item),
        total_amount: check_total(records, FileControl::NAME)?,
        contact_name: config.contact_name.clone(),
        contact_phone: config.contact_phone.clone(),
    })
}

/// Number of records matching a predicate.
pub fn count(records: &[Record], predicate: impl Fn(&Record) -> bool) -> u64 {
    records.iter().filter(|r| predicate(r)).count() as u64
}

/// Sum of check detail amounts in cents, for the control record `record`.
pub fn check_total(records: &[Record], record: &'static str) -> Result<i64> {
    records
        .iter()
        .filter_map(|r| match r {
            Record::CheckDetail(detail) => Some(detail.amount),
            _ => None,
        })
        .try_fold(0i64, |sum, amount| {
            sum.checked_add(amount)
                .ok_or_else(|| Error::encoding(record, "TotalAmount", "check total overflows"))
        })
}

/// Number of image view data records.
pub fn image_count(records: &[Record]) -> u64 {
    count(records, |r| matches!(r, Record::ImageViewData(_)))
}

/// The generic X9.37 DSTU destination.
///
/// Uses the base layout throughout. With `generate_credit_detail` set, every
/// bundle opens with a credit detail record and a deposit slip.
#[derive(Debug, Clone, Copy, Default)]
pub struct DstuFormat;

impl FileFormat for DstuFormat {
    fn name(&self) -> &'static str {
        "X9.37 DSTU"
    }

    fn credit_detail_records(
        &self,
        ctx: &mut ExportContext<'_>,
        _bundle_index: usize,
        transactions: &[&TransactionView],
    ) -> Result<Vec<Record>> {
        if !ctx.config().generate_credit_detail {
            return Ok(Vec::new());
        }

        let routing_number = ctx.routing_number();
        let payor = ctx
            .decrypt_optional(ctx.config().credit_detail_routing_number.as_deref())
            .unwrap_or_else(|| routing_number.clone());
        let amount = transactions_total(transactions)?;
        let sequence = ctx.export_time().format("%Y%m%d%H%M%S").to_string();

        let credit = standard_credit_detail(&payor, ctx.account_number(), amount, sequence.clone());

        let mut records = vec![Record::CreditDetail(CreditDetail::Standard(credit))];
        records.extend(deposit_slip_records(ctx, &routing_number, &sequence, amount, false)?);
        Ok(records)
    }
}
