// WhatsApp — Recipient Normalization
// normalize_recipient

use crate::atoms::constants::{CHAT_ID_SUFFIX, COUNTRY_PREFIX, LOCAL_NUMBER_DIGITS};

/// Turn user-supplied phone input into a chat id.
///
/// Every non-digit is dropped. A bare ten-digit number is treated as a
/// local Indian mobile number and gets the `91` prefix; anything else is
/// used as-is. No further validation happens here.
pub fn normalize_recipient(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == LOCAL_NUMBER_DIGITS {
        digits.insert_str(0, COUNTRY_PREFIX);
    }
    digits.push_str(CHAT_ID_SUFFIX);
    digits
}

/// The digits of a chat id, without the `@c.us` suffix.
pub fn chat_id_digits(chat_id: &str) -> &str {
    chat_id.split('@').next().unwrap_or(chat_id)
}
