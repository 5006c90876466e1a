//! Counterparty name extraction from statement narrations.
//!
//! Narrations look like `CHANNEL REF~...~COUNTERPARTY NAME`. The name is the
//! text after the last `~`.

use serde::{Deserialize, Serialize};

/// Paybill number whose narrations are kept verbatim.
pub const PAYBILL_CODE: &str = "62412";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationParser {
    pub paybill_code: String,
}

impl Default for NarrationParser {
    fn default() -> Self {
        Self::new(PAYBILL_CODE)
    }
}

impl NarrationParser {
    pub fn new(paybill_code: impl Into<String>) -> Self {
        Self {
            paybill_code: paybill_code.into(),
        }
    }

    /// Extract the counterparty from `narration`.
    ///
    /// When the text before the first `~` mentions the paybill code the
    /// narration comes back unchanged. Otherwise the text after the last `~`
    /// is title-cased and all whitespace is removed.
    pub fn parse(&self, narration: &str) -> String {
        if self.is_paybill(narration) {
            return narration.to_string();
        }

        let tail = narration.rsplit('~').next().unwrap_or(narration);
        title_case(tail)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    pub fn is_paybill(&self, narration: &str) -> bool {
        let prefix = narration.split('~').next().unwrap_or(narration);
        !self.paybill_code.is_empty() && prefix.contains(self.paybill_code.as_str())
    }
}

/// [`NarrationParser::parse`] with the default paybill code.
pub fn parse_name(narration: &str) -> String {
    NarrationParser::default().parse(narration)
}

/// Upper-case a letter that follows a non-letter, lower-case every other letter.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(ch);
            prev_cased = false;
        }
    }
    out
}
