//! Host capabilities the exporter depends on.
//!
//! Decryption of stored bank numbers, TIFF conversion of check images and
//! deposit slip rendering belong to the host system. The exporter reaches them
//! only through these traits; the bundled implementations cover hosts that
//! keep values in plain text and already store TIFF images.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Default deposit slip text.
pub const DEFAULT_DEPOSIT_SLIP_TEMPLATE: &str =
    "Customer: {{ OriginName }}\nAccount: {{ AccountNumber }}\nAmount: {{ Amount }}";

/// Decrypts values stored encrypted by the host.
pub trait Decryptor {
    fn decrypt(&self, value: &str) -> String;
}

/// Values are stored unencrypted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Decryptor for PlainText {
    fn decrypt(&self, value: &str) -> String {
        value.to_string()
    }
}

/// Produces TIFF 6.0 CCITT Group 4 images.
pub trait ImageEncoder {
    /// Convert a scanned image.
    fn to_tiff_g4(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Render a deposit slip, optionally printed with `text`.
    fn deposit_slip(&self, text: Option<&str>) -> Result<Vec<u8>>;
}

/// Images are already TIFF; deposit slips come from a prepared file.
#[derive(Debug, Clone, Default)]
pub struct Passthrough {
    slip: Option<Vec<u8>>,
}

impl Passthrough {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `slip` for every deposit slip image.
    pub fn with_deposit_slip(slip: Vec<u8>) -> Self {
        Self { slip: Some(slip) }
    }
}

impl ImageEncoder for Passthrough {
    fn to_tiff_g4(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn deposit_slip(&self, _text: Option<&str>) -> Result<Vec<u8>> {
        self.slip
            .clone()
            .ok_or_else(|| Error::Image("no deposit slip image is configured".to_string()))
    }
}

/// Renders text templates with named merge fields.
pub trait TemplateRenderer {
    fn render(&self, template: &str, fields: &BTreeMap<&str, String>) -> Result<String>;
}

/// Replaces `{{ Name }}` tokens with field values. Unknown names render empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeFields;

impl TemplateRenderer for MergeFields {
    fn render(&self, template: &str, fields: &BTreeMap<&str, String>) -> Result<String> {
        let mut output = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                Error::Template(format!("unclosed merge field in '{}'", template))
            })?;

            let name = after[..end].trim();
            if let Some(value) = fields.get(name) {
                output.push_str(value);
            }
            rest = &after[end + 2..];
        }

        output.push_str(rest);
        Ok(output)
    }
}

/// The capabilities available to one export.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub decryptor: &'a dyn Decryptor,
    pub images: &'a dyn ImageEncoder,
    pub templates: &'a dyn TemplateRenderer,
}

impl<'a> Services<'a> {
    pub fn new(
        decryptor: &'a dyn Decryptor,
        images: &'a dyn ImageEncoder,
        templates: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            decryptor,
            images,
            templates,
        }
    }
}

/// Format cents as a dollar amount, e.g. `$1,234.56`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
