/// Normalized form of a phone number used as the merge key.
///
/// Surrounding whitespace is trimmed first, then every `+` is removed, so
/// `+79001234567` and `79001234567` compare equal.
pub fn normalize_phone(value: &str) -> String {
    value.trim().replace('+', "")
}
