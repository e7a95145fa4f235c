//! MICR line decoding.
//!
//! Scanner drivers deliver the magnetic-ink line of a check as text where the
//! E-13B special symbols are replaced by letters: `d` is the transit symbol
//! around the routing number, `c` the on-us symbol and `b` the amount symbol.
//! Positions on a check are counted from the right edge, so the line is first
//! re-justified around the leftmost transit symbol and every field is then a
//! fixed substring counted from the right.

use crate::error::{Error, Result};

/// Transit symbol surrounding the routing number.
pub const TRANSIT_SYMBOL: char = 'd';

/// On-us symbol separating account, check number and auxiliary on-us.
pub const ON_US_SYMBOL: char = 'c';

/// Marker the scanner writes for characters it could not read.
pub const SCANNER_ERROR_MARKER: char = '!';

/// Distance of the leftmost transit symbol from the right edge.
const TRANSIT_POSITION: usize = 43;

/// A decoded MICR line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Micr {
    content: Vec<char>,
    scanner_error: bool,
}

impl Micr {
    /// Parse a MICR line in scanner driver format.
    ///
    /// # Examples
    ///
    /// ```
    /// use x937_export::micr::Micr;
    ///
    /// let micr = Micr::parse("     d123456780d   123-456-7c  5431             ")?;
    /// assert_eq!(micr.routing_number(), "123456780");
    /// assert_eq!(micr.check_number(), "5431");
    /// # Ok::<(), x937_export::Error>(())
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::MicrParse {
                field: "micr line",
                message: "MICR data is empty".to_string(),
            });
        }

        let mut content: Vec<char> = raw.chars().collect();
        let transit = content
            .iter()
            .position(|&c| c == TRANSIT_SYMBOL)
            .ok_or_else(|| Error::MicrParse {
                field: "routing number",
                message: format!("no transit symbol '{}' in MICR line", TRANSIT_SYMBOL),
            })?;

        // Truncates on the right when longer, pads with spaces when shorter.
        content.resize(transit + TRANSIT_POSITION, ' ');

        Ok(Micr {
            content,
            scanner_error: raw.contains(SCANNER_ERROR_MARKER),
        })
    }

    /// The re-justified line.
    pub fn normalized(&self) -> String {
        self.content.iter().collect()
    }

    /// Characters between two positions counted from the right (1-indexed, inclusive).
    ///
    /// Positions past the left edge are clamped; a start past the left edge
    /// yields an empty string.
    pub fn characters(&self, start: usize, end: usize) -> String {
        let len = self.content.len();
        if start == 0 || start > len || end < start {
            return String::new();
        }
        let end = end.min(len);

        self.content[len - end..=len - start].iter().collect()
    }

    /// Check amount (positions 2-11).
    pub fn amount(&self) -> String {
        self.characters(2, 11).trim().to_string()
    }

    /// Account number from the on-us field.
    pub fn account_number(&self) -> String {
        split_on_us(&self.on_us_block()).0
    }

    /// Check (serial) number from the on-us field.
    pub fn check_number(&self) -> String {
        split_on_us(&self.on_us_block()).1
    }

    /// Routing number (positions 34-42).
    pub fn routing_number(&self) -> String {
        self.characters(34, 42).trim().to_string()
    }

    /// External processing code (position 44).
    pub fn external_processing_code(&self) -> String {
        self.characters(44, 44).trim().to_string()
    }

    /// Auxiliary on-us (position 45 to the left edge) without on-us symbols.
    pub fn aux_on_us(&self) -> String {
        self.characters(45, self.content.len())
            .replace(ON_US_SYMBOL, "")
            .trim()
            .to_string()
    }

    /// Pre-flight check used before a batch is exported.
    ///
    /// The routing number must be 9 characters, the account number at least 6,
    /// and the scanner must not have flagged unreadable characters.
    pub fn is_valid(&self) -> bool {
        !self.scanner_error
            && self.routing_number().chars().count() == 9
            && self.account_number().chars().count() >= 6
    }

    fn on_us_block(&self) -> String {
        self.characters(13, 32)
    }
}

/// Split the on-us field into account number and check number.
///
/// With a single on-us symbol the account precedes it and the check number
/// follows. With two symbols the account sits between them and the check
/// number is whatever surrounds them.
fn split_on_us(block: &str) -> (String, String) {
    let first = block.find(ON_US_SYMBOL);
    let last = block.rfind(ON_US_SYMBOL);

    match (first, last) {
        (Some(first), Some(last)) if first != last => {
            let account = &block[first + 1..last];
            let check = format!("{}{}", block[..first].trim(), block[last + 1..].trim());
            (account.trim().to_string(), check)
        }
        (Some(index), _) => (
            block[..index].trim().to_string(),
            block[index + 1..].trim().to_string(),
        ),
        _ => (block.trim().to_string(), String::new()),
    }
}

/// Detect an official (bank-issued) check.
///
/// Official checks print their serial number inside on-us symbols at the far
/// left of the line (`c706001c d...`). When the line opens that way and the
/// enclosed text is uninterrupted by other symbols, the serial belongs in the
/// auxiliary on-us field rather than after the account number.
pub fn official_check_aux_on_us(raw: &str) -> Option<String> {
    let rest = raw.trim().strip_prefix(ON_US_SYMBOL)?;
    let end = rest.find(ON_US_SYMBOL)?;
    let candidate = &rest[..end];

    if candidate.is_empty() || candidate.contains(TRANSIT_SYMBOL) {
        return None;
    }

    Some(candidate.to_string())
}
