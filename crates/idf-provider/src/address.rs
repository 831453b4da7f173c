use sha3::{Digest, Keccak256};

/// EIP-55 mixed-case encoding of a `0x`-prefixed 20-byte hex address.
/// Returns `None` when the input is not 40 hex digits.
pub fn checksum_address(address: &str) -> Option<String> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))?
        .to_ascii_lowercase();
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let hash = hex::encode(Keccak256::digest(hex_part.as_bytes()));
    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (c, h) in hex_part.chars().zip(hash.chars()) {
        // Letters are uppercased where the matching hash nibble is >= 8.
        if c.is_ascii_alphabetic() && h.to_digit(16).unwrap_or(0) >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Checksums well-formed addresses and passes anything else through so that
/// wallets reporting non-standard identifiers still connect.
pub fn normalize_address(raw: &str) -> String {
    checksum_address(raw).unwrap_or_else(|| raw.to_owned())
}

/// Case-insensitive comparison; wallets report accounts in either case.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
