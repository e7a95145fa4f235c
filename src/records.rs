//! X9.37 DSTU record types.
//!
//! Each record is an immutable value with a static field layout. Records are
//! built once with every field known up front and encoded with
//! [`Record::encode`].

use crate::error::{Error, Result};
use crate::field::{
    date, encode_fields, money, numeric, text, text_right, time, FieldSpec, Value,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Width of every fixed-length record.
pub const RECORD_WIDTH: usize = 80;

/// A record type with a fixed field layout.
pub trait FixedRecord {
    /// Record name used in error messages.
    const NAME: &'static str;
    /// Two digit record type.
    const TYPE: u8;
    /// Field layout in column order.
    const LAYOUT: &'static [FieldSpec];

    /// Field values in layout order.
    fn values(&self) -> Vec<Value<'_>>;

    /// Append the encoded fields to `out`.
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        encode_fields(Self::NAME, Self::LAYOUT, &self.values(), out)
    }
}

fn flag(set: bool, yes: &'static str, no: &'static str) -> &'static str {
    if set {
        yes
    } else {
        no
    }
}

/// File Header Record (type 01).
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub standard_level: u64,
    pub test_file: bool,
    pub destination_routing_number: String,
    pub origin_routing_number: String,
    pub created: NaiveDateTime,
    pub resend: bool,
    pub destination_name: String,
    pub origin_name: String,
    pub file_id_modifier: String,
    pub country_code: String,
    pub user_field: String,
}

impl FixedRecord for FileHeader {
    const NAME: &'static str = "FileHeader";
    const TYPE: u8 = 1;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("StandardLevel", 3, 2),
        text("TestFileIndicator", 5, 1),
        text("ImmediateDestinationRoutingNumber", 6, 9),
        text("ImmediateOriginRoutingNumber", 15, 9),
        date("FileCreationDate", 24),
        time("FileCreationTime", 32),
        text("ResendIndicator", 36, 1),
        text("ImmediateDestinationName", 37, 18),
        text("ImmediateOriginName", 55, 18),
        text("FileIdModifier", 73, 1),
        text("CountryCode", 74, 2),
        text("UserField", 76, 4),
        text("Reserved", 80, 1),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.standard_level),
            Value::Text(flag(self.test_file, "T", "P")),
            Value::Text(&self.destination_routing_number),
            Value::Text(&self.origin_routing_number),
            Value::Date(Some(self.created.date())),
            Value::Time(self.created.time()),
            Value::Text(flag(self.resend, "Y", "N")),
            Value::Text(&self.destination_name),
            Value::Text(&self.origin_name),
            Value::Text(&self.file_id_modifier),
            Value::Text(&self.country_code),
            Value::Text(&self.user_field),
            Value::Text(""),
        ]
    }
}

/// Cash Letter Header Record (type 10).
#[derive(Debug, Clone, PartialEq)]
pub struct CashLetterHeader {
    pub collection_type: u64,
    pub destination_routing_number: String,
    pub client_institution_routing_number: String,
    pub business_date: NaiveDate,
    pub created: NaiveDateTime,
    pub record_type_indicator: String,
    pub documentation_type: String,
    pub id: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub work_type: String,
    pub user_field: String,
}

impl FixedRecord for CashLetterHeader {
    const NAME: &'static str = "CashLetterHeader";
    const TYPE: u8 = 10;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("CollectionTypeIndicator", 3, 2),
        text("DestinationRoutingNumber", 5, 9),
        text("ClientInstitutionRoutingNumber", 14, 9),
        date("BusinessDate", 23),
        date("CreationDate", 31),
        time("CreationTime", 39),
        text("RecordTypeIndicator", 43, 1),
        text("DocumentationTypeIndicator", 44, 1),
        text("Id", 45, 8),
        text("OriginatorContactName", 53, 14),
        text("OriginatorContactPhoneNumber", 67, 10),
        text("WorkType", 77, 1),
        text("UserField", 78, 2),
        text("Reserved", 80, 1),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.collection_type),
            Value::Text(&self.destination_routing_number),
            Value::Text(&self.client_institution_routing_number),
            Value::Date(Some(self.business_date)),
            Value::Date(Some(self.created.date())),
            Value::Time(self.created.time()),
            Value::Text(&self.record_type_indicator),
            Value::Text(&self.documentation_type),
            Value::Text(&self.id),
            Value::Text(&self.contact_name),
            Value::Text(&self.contact_phone),
            Value::Text(&self.work_type),
            Value::Text(&self.user_field),
            Value::Text(""),
        ]
    }
}

/// Bundle Header Record (type 20).
#[derive(Debug, Clone, PartialEq)]
pub struct BundleHeader {
    pub collection_type: u64,
    pub destination_routing_number: String,
    pub client_institution_routing_number: String,
    pub business_date: NaiveDate,
    pub created: NaiveDate,
    pub id: String,
    pub sequence_number: u64,
    pub cycle_number: String,
    pub return_location_routing_number: String,
    pub user_field: String,
}

impl FixedRecord for BundleHeader {
    const NAME: &'static str = "BundleHeader";
    const TYPE: u8 = 20;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("CollectionTypeIndicator", 3, 2),
        text("DestinationRoutingNumber", 5, 9),
        text("ClientInstitutionRoutingNumber", 14, 9),
        date("BusinessDate", 23),
        date("CreationDate", 31),
        text("Id", 39, 10),
        numeric("SequenceNumber", 49, 4),
        text("CycleNumber", 53, 2),
        text("ReturnLocationRoutingNumber", 55, 9),
        text("UserField", 64, 5),
        text("Reserved", 69, 12),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.collection_type),
            Value::Text(&self.destination_routing_number),
            Value::Text(&self.client_institution_routing_number),
            Value::Date(Some(self.business_date)),
            Value::Date(Some(self.created)),
            Value::Text(&self.id),
            Value::Number(self.sequence_number),
            Value::Text(&self.cycle_number),
            Value::Text(&self.return_location_routing_number),
            Value::Text(&self.user_field),
            Value::Text(""),
        ]
    }
}

/// Check Detail Record (type 25).
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDetail {
    pub aux_on_us: String,
    pub external_processing_code: String,
    pub payor_routing_number: String,
    pub payor_routing_check_digit: String,
    pub on_us: String,
    /// Amount in cents.
    pub amount: i64,
    pub item_sequence_number: String,
    pub documentation_type: String,
    pub return_acceptance: String,
    pub micr_valid: String,
    pub bofd_indicator: String,
    pub addendum_count: u64,
    pub correction: String,
    pub archive_type: String,
}

impl FixedRecord for CheckDetail {
    const NAME: &'static str = "CheckDetail";
    const TYPE: u8 = 25;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        text_right("AuxiliaryOnUs", 3, 15),
        text("ExternalProcessingCode", 18, 1),
        text("PayorBankRoutingNumber", 19, 8),
        text("PayorBankRoutingNumberCheckDigit", 27, 1),
        text_right("OnUs", 28, 20),
        money("ItemAmount", 48, 10),
        text("ClientInstitutionItemSequenceNumber", 58, 15),
        text("DocumentationTypeIndicator", 73, 1),
        text("ReturnAcceptanceIndicator", 74, 1),
        text("MicrValidIndicator", 75, 1),
        text("BankOfFirstDepositIndicator", 76, 1),
        numeric("CheckDetailRecordAddendumCount", 77, 2),
        text("CorrectionIndicator", 79, 1),
        text("ArchiveTypeIndicator", 80, 1),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Text(&self.aux_on_us),
            Value::Text(&self.external_processing_code),
            Value::Text(&self.payor_routing_number),
            Value::Text(&self.payor_routing_check_digit),
            Value::Text(&self.on_us),
            Value::Money(self.amount),
            Value::Text(&self.item_sequence_number),
            Value::Text(&self.documentation_type),
            Value::Text(&self.return_acceptance),
            Value::Text(&self.micr_valid),
            Value::Text(&self.bofd_indicator),
            Value::Number(self.addendum_count),
            Value::Text(&self.correction),
            Value::Text(&self.archive_type),
        ]
    }
}

/// Check Detail Addendum A Record (type 26).
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDetailAddendumA {
    pub record_number: u64,
    pub bofd_routing_number: String,
    pub bofd_business_date: NaiveDate,
    pub bofd_item_sequence_number: String,
    pub deposit_account_number: String,
    pub bofd_deposit_branch: String,
    pub payee_name: String,
    pub truncation: String,
    pub bofd_conversion: String,
    pub bofd_correction: String,
    pub user_field: String,
}

impl FixedRecord for CheckDetailAddendumA {
    const NAME: &'static str = "CheckDetailAddendumA";
    const TYPE: u8 = 26;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("RecordNumber", 3, 1),
        text("BankOfFirstDepositRoutingNumber", 4, 9),
        date("BankOfFirstDepositBusinessDate", 13),
        text("BankOfFirstDepositItemSequenceNumber", 21, 15),
        text("DepositAccountNumber", 36, 18),
        text("BankOfFirstDepositBranch", 54, 5),
        text("PayeeName", 59, 15),
        text("TruncationIndicator", 74, 1),
        text("BankOfFirstDepositConversionIndicator", 75, 1),
        text("BankOfFirstDepositCorrectionIndicator", 76, 1),
        text("UserField", 77, 1),
        text("Reserved", 78, 3),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.record_number),
            Value::Text(&self.bofd_routing_number),
            Value::Date(Some(self.bofd_business_date)),
            Value::Text(&self.bofd_item_sequence_number),
            Value::Text(&self.deposit_account_number),
            Value::Text(&self.bofd_deposit_branch),
            Value::Text(&self.payee_name),
            Value::Text(&self.truncation),
            Value::Text(&self.bofd_conversion),
            Value::Text(&self.bofd_correction),
            Value::Text(&self.user_field),
            Value::Text(""),
        ]
    }
}

/// Image View Detail Record (type 50).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageViewDetail {
    pub image_indicator: u64,
    pub creator_routing_number: String,
    pub creator_date: NaiveDate,
    pub view_format: u64,
    pub compression_algorithm: u64,
    pub data_size: u64,
    pub side: u64,
    pub view_descriptor: u64,
    pub digital_signature: u64,
    pub user_field: String,
}

impl FixedRecord for ImageViewDetail {
    const NAME: &'static str = "ImageViewDetail";
    const TYPE: u8 = 50;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("ImageIndicator", 3, 1),
        text("ImageCreatorRoutingNumber", 4, 9),
        date("ImageCreatorDate", 13),
        numeric("ImageViewFormatIndicator", 21, 2),
        numeric("CompressionAlgorithmIdentifier", 23, 2),
        numeric("ImageViewDataSize", 25, 7),
        numeric("SideIndicator", 32, 1),
        numeric("ViewDescriptor", 33, 2),
        numeric("DigitalSignatureIndicator", 35, 1),
        text("DigitalSignatureMethod", 36, 2),
        text("SecurityKeySize", 38, 5),
        text("StartOfProtectedData", 43, 7),
        text("LengthOfProtectedData", 50, 7),
        text("ImageRecreateIndicator", 57, 1),
        text("UserField", 58, 8),
        text("Reserved", 66, 15),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.image_indicator),
            Value::Text(&self.creator_routing_number),
            Value::Date(Some(self.creator_date)),
            Value::Number(self.view_format),
            Value::Number(self.compression_algorithm),
            Value::Number(self.data_size),
            Value::Number(self.side),
            Value::Number(self.view_descriptor),
            Value::Number(self.digital_signature),
            Value::Text(""),
            Value::Text(""),
            Value::Text(""),
            Value::Text(""),
            Value::Text(""),
            Value::Text(&self.user_field),
            Value::Text(""),
        ]
    }
}

/// Image View Data Record (type 52).
///
/// The fixed part ends with the image data length; the image bytes follow.
/// Image reference keys and digital signatures are never written, so their
/// length fields are always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageViewData {
    pub institution_routing_number: String,
    pub bundle_business_date: NaiveDate,
    pub cycle_number: String,
    pub item_sequence_number: String,
    pub clipping_origin: u64,
    pub image_data: Vec<u8>,
}

impl FixedRecord for ImageViewData {
    const NAME: &'static str = "ImageViewData";
    const TYPE: u8 = 52;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        text("InstitutionRoutingNumber", 3, 9),
        date("BundleBusinessDate", 12),
        text("CycleNumber", 20, 2),
        text("ClientInstitutionItemSequenceNumber", 22, 15),
        text("SecurityOriginatorName", 37, 16),
        text("SecurityAuthenticatorName", 53, 16),
        text("SecurityKeyName", 69, 16),
        numeric("ClippingOrigin", 85, 1),
        text("ClippingCoordinateH1", 86, 4),
        text("ClippingCoordinateH2", 90, 4),
        text("ClippingCoordinateV1", 94, 4),
        text("ClippingCoordinateV2", 98, 4),
        numeric("LengthOfImageReferenceKey", 102, 4),
        numeric("LengthOfDigitalSignature", 106, 5),
        numeric("LengthOfImageData", 111, 7),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Text(&self.institution_routing_number),
            Value::Date(Some(self.bundle_business_date)),
            Value::Text(&self.cycle_number),
            Value::Text(&self.item_sequence_number),
            Value::Text(""),
            Value::Text(""),
            Value::Text(""),
            Value::Number(self.clipping_origin),
            Value::Text(""),
            Value::Text(""),
            Value::Text(""),
            Value::Text(""),
            Value::Number(0),
            Value::Number(0),
            Value::Number(self.image_data.len() as u64),
        ]
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        encode_fields(Self::NAME, Self::LAYOUT, &self.values(), out)?;
        out.extend_from_slice(&self.image_data);
        Ok(())
    }
}

/// Credit Detail Record (type 61) in its common layout.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardCreditDetail {
    pub aux_on_us: String,
    pub external_processing_code: String,
    pub payor_routing_number: String,
    pub credit_account_number: String,
    /// Amount in cents.
    pub amount: i64,
    pub item_sequence_number: String,
    pub documentation_type: String,
    pub type_of_account: String,
    pub source_of_work: String,
    pub debit_credit_indicator: String,
}

impl FixedRecord for StandardCreditDetail {
    const NAME: &'static str = "CreditDetail";
    const TYPE: u8 = 61;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        text_right("AuxiliaryOnUs", 3, 15),
        text("ExternalProcessingCode", 18, 1),
        text("PayorRoutingNumber", 19, 9),
        text_right("CreditAccountNumber", 28, 20),
        money("Amount", 48, 10),
        text_right("InstitutionItemSequenceNumber", 58, 15),
        text("DocumentationTypeIndicator", 73, 1),
        text("TypeOfAccountCode", 74, 1),
        text("SourceOfWorkCode", 75, 1),
        text("DebitCreditIndicator", 76, 1),
        text("Reserved", 77, 4),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Text(&self.aux_on_us),
            Value::Text(&self.external_processing_code),
            Value::Text(&self.payor_routing_number),
            Value::Text(&self.credit_account_number),
            Value::Money(self.amount),
            Value::Text(&self.item_sequence_number),
            Value::Text(&self.documentation_type),
            Value::Text(&self.type_of_account),
            Value::Text(&self.source_of_work),
            Value::Text(&self.debit_credit_indicator),
            Value::Text(""),
        ]
    }
}

/// Credit Detail Record (type 61) as laid out by Wells Fargo.
#[derive(Debug, Clone, PartialEq)]
pub struct WellsFargoCreditDetail {
    /// Amount in cents.
    pub amount: i64,
    pub credit_account_number: String,
    pub process_control: String,
    pub payor_routing_number: String,
    pub aux_on_us: String,
    pub item_sequence_number: String,
    pub external_processing_code: String,
    pub type_of_account: String,
    pub source_of_work: String,
}

impl FixedRecord for WellsFargoCreditDetail {
    const NAME: &'static str = "WellsFargoCreditDetail";
    const TYPE: u8 = 61;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        money("Amount", 3, 12),
        text_right("CreditAccountNumber", 15, 17),
        text_right("ProcessControl", 32, 6),
        text("PayorRoutingNumber", 38, 9),
        text_right("AuxiliaryOnUs", 47, 15),
        text_right("InstitutionItemSequenceNumber", 62, 15),
        text("ExternalProcessingCode", 77, 1),
        text("TypeOfAccountCode", 78, 1),
        text("SourceOfWorkCode", 79, 1),
        text("Reserved", 80, 1),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Money(self.amount),
            Value::Text(&self.credit_account_number),
            Value::Text(&self.process_control),
            Value::Text(&self.payor_routing_number),
            Value::Text(&self.aux_on_us),
            Value::Text(&self.item_sequence_number),
            Value::Text(&self.external_processing_code),
            Value::Text(&self.type_of_account),
            Value::Text(&self.source_of_work),
            Value::Text(""),
        ]
    }
}

/// A credit detail record in one of its bank layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum CreditDetail {
    Standard(StandardCreditDetail),
    WellsFargo(WellsFargoCreditDetail),
}

/// Bundle Control Record (type 70).
#[derive(Debug, Clone, PartialEq)]
pub struct BundleControl {
    pub item_count: u64,
    /// Amount in cents.
    pub total_amount: i64,
    /// Amount in cents.
    pub micr_valid_total_amount: i64,
    pub image_count: u64,
    pub user_field: String,
}

impl FixedRecord for BundleControl {
    const NAME: &'static str = "BundleControl";
    const TYPE: u8 = 70;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("ItemCount", 3, 4),
        money("TotalAmount", 7, 12),
        money("MicrValidTotalAmount", 19, 12),
        numeric("ImageCount", 31, 5),
        text("UserField", 36, 20),
        text("Reserved", 56, 25),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.item_count),
            Value::Money(self.total_amount),
            Value::Money(self.micr_valid_total_amount),
            Value::Number(self.image_count),
            Value::Text(&self.user_field),
            Value::Text(""),
        ]
    }
}

/// Cash Letter Control Record (type 90).
#[derive(Debug, Clone, PartialEq)]
pub struct CashLetterControl {
    pub bundle_count: u64,
    pub item_count: u64,
    /// Amount in cents.
    pub total_amount: i64,
    pub image_count: u64,
    pub ece_institution_name: String,
    pub settlement_date: Option<NaiveDate>,
}

impl FixedRecord for CashLetterControl {
    const NAME: &'static str = "CashLetterControl";
    const TYPE: u8 = 90;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("BundleCount", 3, 6),
        numeric("ItemCount", 9, 8),
        money("TotalAmount", 17, 14),
        numeric("ImageCount", 31, 9),
        text("EceInstitutionName", 40, 18),
        date("SettlementDate", 58),
        text("Reserved", 66, 15),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.bundle_count),
            Value::Number(self.item_count),
            Value::Money(self.total_amount),
            Value::Number(self.image_count),
            Value::Text(&self.ece_institution_name),
            Value::Date(self.settlement_date),
            Value::Text(""),
        ]
    }
}

/// File Control Record (type 99).
#[derive(Debug, Clone, PartialEq)]
pub struct FileControl {
    pub cash_letter_count: u64,
    pub total_record_count: u64,
    pub total_item_count: u64,
    /// Amount in cents.
    pub total_amount: i64,
    pub contact_name: String,
    pub contact_phone: String,
}

impl FixedRecord for FileControl {
    const NAME: &'static str = "FileControl";
    const TYPE: u8 = 99;
    const LAYOUT: &'static [FieldSpec] = &[
        numeric("RecordType", 1, 2),
        numeric("CashLetterCount", 3, 6),
        numeric("TotalRecordCount", 9, 8),
        numeric("TotalItemCount", 17, 8),
        money("TotalAmount", 25, 16),
        text("ImmediateOriginContactName", 41, 14),
        text("ImmediateOriginContactPhoneNumber", 55, 10),
        text("Reserved", 65, 16),
    ];

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Number(Self::TYPE.into()),
            Value::Number(self.cash_letter_count),
            Value::Number(self.total_record_count),
            Value::Number(self.total_item_count),
            Value::Money(self.total_amount),
            Value::Text(&self.contact_name),
            Value::Text(&self.contact_phone),
            Value::Text(""),
        ]
    }
}

/// Any record that can appear in a cash letter file.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    FileHeader(FileHeader),
    CashLetterHeader(CashLetterHeader),
    BundleHeader(BundleHeader),
    CheckDetail(CheckDetail),
    CheckDetailAddendumA(CheckDetailAddendumA),
    ImageViewDetail(ImageViewDetail),
    ImageViewData(ImageViewData),
    CreditDetail(CreditDetail),
    BundleControl(BundleControl),
    CashLetterControl(CashLetterControl),
    FileControl(FileControl),
}

impl Record {
    /// Two digit record type.
    pub fn record_type(&self) -> u8 {
        match self {
            Record::FileHeader(_) => FileHeader::TYPE,
            Record::CashLetterHeader(_) => CashLetterHeader::TYPE,
            Record::BundleHeader(_) => BundleHeader::TYPE,
            Record::CheckDetail(_) => CheckDetail::TYPE,
            Record::CheckDetailAddendumA(_) => CheckDetailAddendumA::TYPE,
            Record::ImageViewDetail(_) => ImageViewDetail::TYPE,
            Record::ImageViewData(_) => ImageViewData::TYPE,
            Record::CreditDetail(_) => StandardCreditDetail::TYPE,
            Record::BundleControl(_) => BundleControl::TYPE,
            Record::CashLetterControl(_) => CashLetterControl::TYPE,
            Record::FileControl(_) => FileControl::TYPE,
        }
    }

    /// Record name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Record::FileHeader(_) => FileHeader::NAME,
            Record::CashLetterHeader(_) => CashLetterHeader::NAME,
            Record::BundleHeader(_) => BundleHeader::NAME,
            Record::CheckDetail(_) => CheckDetail::NAME,
            Record::CheckDetailAddendumA(_) => CheckDetailAddendumA::NAME,
            Record::ImageViewDetail(_) => ImageViewDetail::NAME,
            Record::ImageViewData(_) => ImageViewData::NAME,
            Record::CreditDetail(CreditDetail::Standard(_)) => StandardCreditDetail::NAME,
            Record::CreditDetail(CreditDetail::WellsFargo(_)) => WellsFargoCreditDetail::NAME,
            Record::BundleControl(_) => BundleControl::NAME,
            Record::CashLetterControl(_) => CashLetterControl::NAME,
            Record::FileControl(_) => FileControl::NAME,
        }
    }

    /// Encode the record without any length prefix.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(RECORD_WIDTH);
        match self {
            Record::FileHeader(r) => r.encode_into(&mut out)?,
            Record::CashLetterHeader(r) => r.encode_into(&mut out)?,
            Record::BundleHeader(r) => r.encode_into(&mut out)?,
            Record::CheckDetail(r) => r.encode_into(&mut out)?,
            Record::CheckDetailAddendumA(r) => r.encode_into(&mut out)?,
            Record::ImageViewDetail(r) => r.encode_into(&mut out)?,
            Record::ImageViewData(r) => r.encode_into(&mut out)?,
            Record::CreditDetail(CreditDetail::Standard(r)) => r.encode_into(&mut out)?,
            Record::CreditDetail(CreditDetail::WellsFargo(r)) => r.encode_into(&mut out)?,
            Record::BundleControl(r) => r.encode_into(&mut out)?,
            Record::CashLetterControl(r) => r.encode_into(&mut out)?,
            Record::FileControl(r) => r.encode_into(&mut out)?,
        }

        if self.record_type() != ImageViewData::TYPE && out.len() != RECORD_WIDTH {
            return Err(Error::encoding(
                self.name(),
                "*",
                format!("record is {} bytes, expected {}", out.len(), RECORD_WIDTH),
            ));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::layout_width;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn check_tiling(name: &str, layout: &[FieldSpec], width: usize) {
        let mut column = 1;
        for spec in layout {
            assert_eq!(spec.position, column, "{}.{} starts at the wrong column", name, spec.name);
            column += spec.width;
        }
        assert_eq!(layout_width(layout), width, "{} has the wrong width", name);
    }

    #[test]
    fn test_layouts_tile_record_width() {
        check_tiling(FileHeader::NAME, FileHeader::LAYOUT, RECORD_WIDTH);
        check_tiling(CashLetterHeader::NAME, CashLetterHeader::LAYOUT, RECORD_WIDTH);
        check_tiling(BundleHeader::NAME, BundleHeader::LAYOUT, RECORD_WIDTH);
        check_tiling(CheckDetail::NAME, CheckDetail::LAYOUT, RECORD_WIDTH);
        check_tiling(CheckDetailAddendumA::NAME, CheckDetailAddendumA::LAYOUT, RECORD_WIDTH);
        check_tiling(ImageViewDetail::NAME, ImageViewDetail::LAYOUT, RECORD_WIDTH);
        check_tiling(ImageViewData::NAME, ImageViewData::LAYOUT, 117);
        check_tiling(StandardCreditDetail::NAME, StandardCreditDetail::LAYOUT, RECORD_WIDTH);
        check_tiling(WellsFargoCreditDetail::NAME, WellsFargoCreditDetail::LAYOUT, RECORD_WIDTH);
        check_tiling(BundleControl::NAME, BundleControl::LAYOUT, RECORD_WIDTH);
        check_tiling(CashLetterControl::NAME, CashLetterControl::LAYOUT, RECORD_WIDTH);
        check_tiling(FileControl::NAME, FileControl::LAYOUT, RECORD_WIDTH);
    }

    #[test]
    fn test_encode_file_header() {
        let created = NaiveDate::from_ymd_opt(2019, 1, 15)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(13, 58, 8).unwrap());
        let record = Record::FileHeader(FileHeader {
            standard_level: 3,
            test_file: true,
            destination_routing_number: "123456780".into(),
            origin_routing_number: "987654320".into(),
            created,
            resend: false,
            destination_name: "First Bank".into(),
            origin_name: "Shepherd Church".into(),
            file_id_modifier: "A".into(),
            country_code: "US".into(),
            user_field: String::new(),
        });

        let bytes = record.encode().unwrap();
        let line = String::from_utf8(bytes).unwrap();

        assert_eq!(
            line,
            "0103T123456780987654320201901151358NFirst Bank        Shepherd Church   AUS     "
        );
    }

    #[test]
    fn test_encode_check_detail() {
        let record = Record::CheckDetail(CheckDetail {
            aux_on_us: "706001".into(),
            external_processing_code: String::new(),
            payor_routing_number: "07590123".into(),
            payor_routing_check_digit: "1".into(),
            on_us: "456327/0101".into(),
            amount: 39275,
            item_sequence_number: "000000000000001".into(),
            documentation_type: "G".into(),
            return_acceptance: String::new(),
            micr_valid: String::new(),
            bofd_indicator: "Y".into(),
            addendum_count: 1,
            correction: String::new(),
            archive_type: String::new(),
        });

        let line = String::from_utf8(record.encode().unwrap()).unwrap();

        assert_eq!(line.len(), RECORD_WIDTH);
        assert_eq!(&line[0..2], "25");
        assert_eq!(&line[2..17], "         706001");
        assert_eq!(&line[18..26], "07590123");
        assert_eq!(&line[27..47], "         456327/0101");
        assert_eq!(&line[47..57], "0000039275");
        assert_eq!(&line[72..80], "G  Y01  ");
    }

    #[test]
    fn test_image_view_data_appends_payload() {
        let record = Record::ImageViewData(ImageViewData {
            institution_routing_number: "123456780".into(),
            bundle_business_date: NaiveDate::from_ymd_opt(2019, 1, 15).unwrap(),
            cycle_number: String::new(),
            item_sequence_number: "1".into(),
            clipping_origin: 0,
            image_data: vec![0x49, 0x49, 0x2a, 0x00],
        });

        let bytes = record.encode().unwrap();

        assert_eq!(bytes.len(), 117 + 4);
        assert_eq!(&bytes[110..117], b"0000004");
        assert_eq!(&bytes[117..], &[0x49, 0x49, 0x2a, 0x00]);
    }

    #[test]
    fn test_control_overflow_is_an_error() {
        let record = Record::BundleControl(BundleControl {
            item_count: 10_000,
            total_amount: 0,
            micr_valid_total_amount: 0,
            image_count: 0,
            user_field: String::new(),
        });

        assert!(matches!(
            record.encode(),
            Err(Error::Encoding { record: "BundleControl", field: "ItemCount", .. })
        ));
    }
}
