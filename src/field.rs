//! Fixed-position field encoding.
//!
//! Every X9.37 record is a run of fixed-width fields. A record type declares
//! its fields once as a static layout of [`FieldSpec`]s and supplies one
//! [`Value`] per field when it is encoded.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Padding side for text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

/// How a field renders its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Digits, right-justified and zero-padded.
    Numeric,
    /// Text padded with spaces on the opposite side of the justification.
    Text(Justify),
    /// Whole cents, zero-padded, no sign or decimal point.
    Money,
    /// `yyyyMMdd`, spaces when absent.
    Date,
    /// `HHmm`.
    Time,
}

/// Position and shape of one field inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// 1-indexed starting column.
    pub position: usize,
    pub width: usize,
    pub kind: FieldKind,
}

/// Build a field descriptor.
pub const fn field(name: &'static str, position: usize, width: usize, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        position,
        width,
        kind,
    }
}

/// Left-justified text field.
pub const fn text(name: &'static str, position: usize, width: usize) -> FieldSpec {
    field(name, position, width, FieldKind::Text(Justify::Left))
}

/// Right-justified text field.
pub const fn text_right(name: &'static str, position: usize, width: usize) -> FieldSpec {
    field(name, position, width, FieldKind::Text(Justify::Right))
}

/// Zero-padded numeric field.
pub const fn numeric(name: &'static str, position: usize, width: usize) -> FieldSpec {
    field(name, position, width, FieldKind::Numeric)
}

/// Money field in cents.
pub const fn money(name: &'static str, position: usize, width: usize) -> FieldSpec {
    field(name, position, width, FieldKind::Money)
}

/// Eight character date field.
pub const fn date(name: &'static str, position: usize) -> FieldSpec {
    field(name, position, 8, FieldKind::Date)
}

/// Four character time field.
pub const fn time(name: &'static str, position: usize) -> FieldSpec {
    field(name, position, 4, FieldKind::Time)
}

/// A field value supplied by a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Number(u64),
    Text(&'a str),
    Money(i64),
    Date(Option<NaiveDate>),
    Time(NaiveTime),
}

/// Convert a dollar amount to whole cents, rounding half to even.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.round().to_i64())
        .ok_or_else(|| Error::InvalidAmount(amount.to_string()))
}

/// Total width covered by a layout.
pub fn layout_width(layout: &[FieldSpec]) -> usize {
    layout
        .last()
        .map(|spec| spec.position + spec.width - 1)
        .unwrap_or(0)
}

/// Encode a record's values against its layout, appending to `out`.
///
/// Fields must follow each other without gaps or overlap, and every value
/// must match the kind of its field.
pub fn encode_fields(
    record: &'static str,
    layout: &[FieldSpec],
    values: &[Value<'_>],
    out: &mut Vec<u8>,
) -> Result<()> {
    if layout.len() != values.len() {
        return Err(Error::encoding(
            record,
            "*",
            format!("layout has {} fields but {} values were given", layout.len(), values.len()),
        ));
    }

    let start = out.len();
    for (spec, value) in layout.iter().zip(values) {
        let column = out.len() - start + 1;
        if spec.position != column {
            return Err(Error::encoding(
                record,
                spec.name,
                format!("field starts at column {} but previous field ends at {}", spec.position, column - 1),
            ));
        }

        let rendered = render(record, spec, value)?;
        debug_assert_eq!(rendered.len(), spec.width);
        out.extend_from_slice(rendered.as_bytes());
    }

    Ok(())
}

fn render(record: &'static str, spec: &FieldSpec, value: &Value<'_>) -> Result<String> {
    match (spec.kind, value) {
        (FieldKind::Numeric, Value::Number(n)) => zero_pad(record, spec, *n),
        (FieldKind::Money, Value::Money(cents)) => {
            let cents = u64::try_from(*cents)
                .map_err(|_| Error::encoding(record, spec.name, format!("negative amount {}", cents)))?;
            zero_pad(record, spec, cents)
        }
        (FieldKind::Text(justify), Value::Text(s)) => Ok(pad_text(record, spec, s, justify)),
        (FieldKind::Date, Value::Date(d)) => {
            check_width(record, spec, 8)?;
            Ok(d.map(|d| d.format("%Y%m%d").to_string())
                .unwrap_or_else(|| " ".repeat(8)))
        }
        (FieldKind::Time, Value::Time(t)) => {
            check_width(record, spec, 4)?;
            Ok(t.format("%H%M").to_string())
        }
        (kind, value) => Err(Error::encoding(
            record,
            spec.name,
            format!("value {:?} does not match field kind {:?}", value, kind),
        )),
    }
}

fn check_width(record: &'static str, spec: &FieldSpec, expected: usize) -> Result<()> {
    if spec.width != expected {
        return Err(Error::encoding(
            record,
            spec.name,
            format!("field is {} wide, expected {}", spec.width, expected),
        ));
    }
    Ok(())
}

fn zero_pad(record: &'static str, spec: &FieldSpec, n: u64) -> Result<String> {
    let digits = n.to_string();
    if digits.len() > spec.width {
        return Err(Error::encoding(
            record,
            spec.name,
            format!("value {} does not fit in {} digits", n, spec.width),
        ));
    }
    Ok(format!("{:0>width$}", digits, width = spec.width))
}

fn pad_text(record: &'static str, spec: &FieldSpec, s: &str, justify: Justify) -> String {
    let mut ascii: String = s
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();

    if ascii.len() > spec.width {
        warn!(
            "{}.{}: '{}' truncated to {} characters",
            record, spec.name, ascii, spec.width
        );
        ascii.truncate(spec.width);
    }

    match justify {
        Justify::Left => format!("{:<width$}", ascii, width = spec.width),
        Justify::Right => format!("{:>width$}", ascii, width = spec.width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LAYOUT: &[FieldSpec] = &[
        numeric("RecordType", 1, 2),
        text("Name", 3, 6),
        text_right("OnUs", 9, 6),
        money("Amount", 15, 8),
        date("Date", 23),
        time("Time", 31),
    ];

    fn encode(values: &[Value<'_>]) -> Result<String> {
        let mut out = Vec::new();
        encode_fields("Test", LAYOUT, values, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_encode_all_kinds() {
        let encoded = encode(&[
            Value::Number(25),
            Value::Text("ABC"),
            Value::Text("12/34"),
            Value::Money(12550),
            Value::Date(NaiveDate::from_ymd_opt(2019, 1, 15)),
            Value::Time(NaiveTime::from_hms_opt(13, 58, 8).unwrap()),
        ])
        .unwrap();

        assert_eq!(encoded, "25ABC    12/3400012550201901151358");
        assert_eq!(encoded.len(), layout_width(LAYOUT));
    }

    #[test]
    fn test_absent_date_is_blank() {
        let encoded = encode(&[
            Value::Number(1),
            Value::Text(""),
            Value::Text(""),
            Value::Money(0),
            Value::Date(None),
            Value::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        ])
        .unwrap();

        assert_eq!(&encoded[22..30], "        ");
        assert_eq!(&encoded[14..22], "00000000");
    }

    #[test]
    fn test_numeric_overflow_names_field() {
        let err = encode(&[
            Value::Number(100),
            Value::Text(""),
            Value::Text(""),
            Value::Money(0),
            Value::Date(None),
            Value::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        ])
        .unwrap_err();

        match err {
            Error::Encoding { record, field, .. } => {
                assert_eq!(record, "Test");
                assert_eq!(field, "RecordType");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_money_is_rejected() {
        let err = encode(&[
            Value::Number(1),
            Value::Text(""),
            Value::Text(""),
            Value::Money(-5),
            Value::Date(None),
            Value::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        ])
        .unwrap_err();

        assert!(matches!(err, Error::Encoding { field: "Amount", .. }));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let encoded = encode(&[
            Value::Number(1),
            Value::Text("Shepherd Church"),
            Value::Text("Café"),
            Value::Money(0),
            Value::Date(None),
            Value::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        ])
        .unwrap();

        assert_eq!(&encoded[2..8], "Shephe");
        assert_eq!(&encoded[8..14], "  Caf?");
    }

    #[test]
    fn test_kind_mismatch() {
        let err = encode(&[
            Value::Text("01"),
            Value::Text(""),
            Value::Text(""),
            Value::Money(0),
            Value::Date(None),
            Value::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        ])
        .unwrap_err();

        assert!(matches!(err, Error::Encoding { field: "RecordType", .. }));
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(Decimal::new(12550, 2)).unwrap(), 12550);
        assert_eq!(to_cents(Decimal::new(5, 0)).unwrap(), 500);
        assert_eq!(to_cents(Decimal::new(10005, 3)).unwrap(), 1000);
        assert!(matches!(to_cents(Decimal::MAX), Err(Error::InvalidAmount(_))));
        assert!(matches!(to_cents(Decimal::MIN), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_gap_in_layout() {
        let layout = [numeric("RecordType", 1, 2), text("Name", 4, 3)];
        let mut out = Vec::new();
        let err = encode_fields("Gap", &layout, &[Value::Number(1), Value::Text("x")], &mut out)
            .unwrap_err();

        assert!(matches!(err, Error::Encoding { field: "Name", .. }));
    }
}
