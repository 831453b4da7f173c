//! Conversions between wei quantities and human-readable decimal strings.

/// Parses an Ethereum JSON-RPC quantity (`0x`-hex) or a plain decimal string.
pub fn parse_quantity(raw: &str) -> Option<u128> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if hex.is_empty() {
            return Some(0);
        }
        u128::from_str_radix(hex, 16).ok()
    } else if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        raw.parse().ok()
    } else {
        None
    }
}

/// Renders `value / 10^decimals`. Trailing fractional zeros are trimmed but at
/// least one fractional digit is kept, so one ether prints as `1.0`.
pub fn format_units(value: u128, decimals: u8) -> String {
    let Some(base) = 10u128.checked_pow(u32::from(decimals)) else {
        return "0.0".to_owned();
    };
    let whole = value / base;
    let frac = value % base;
    if decimals == 0 {
        return format!("{whole}.0");
    }

    let frac = format!("{frac:0width$}", width = usize::from(decimals));
    let trimmed = frac.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Formats a wei balance as ether. Any malformed input becomes `"0"`.
pub fn format_ether(raw: &str) -> String {
    match parse_quantity(raw) {
        Some(wei) => format_units(wei, 18),
        None => "0".to_owned(),
    }
}

/// Inverse of [`format_units`]. Rejects negative numbers, excess precision and
/// anything that would overflow.
pub fn parse_units(amount: &str, decimals: u8) -> Option<u128> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > usize::from(decimals) {
        return None;
    }

    let base = 10u128.checked_pow(u32::from(decimals))?;
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let padded = format!("{frac:0<width$}", width = usize::from(decimals));
    let frac: u128 = if padded.is_empty() { 0 } else { padded.parse().ok()? };
    whole.checked_mul(base)?.checked_add(frac)
}
