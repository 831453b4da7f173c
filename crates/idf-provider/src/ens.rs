//! Reverse name resolution over plain `eth_call`, for transports that only
//! expose raw JSON-RPC.

use sha3::{Digest, Keccak256};

/// ENS registry, same address on every chain that has one.
pub const ENS_REGISTRY: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

const RESOLVER_SELECTOR: &str = "0178b8bf";
const NAME_SELECTOR: &str = "691f3431";

pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = Keccak256::digest(label.as_bytes());
        let mut hasher = Keccak256::new();
        hasher.update(node);
        hasher.update(label_hash);
        node.copy_from_slice(&hasher.finalize());
    }
    node
}

/// Node of `<addr>.addr.reverse`.
pub fn reverse_node(address: &str) -> [u8; 32] {
    let bare = address.trim_start_matches("0x").to_ascii_lowercase();
    namehash(&format!("{bare}.addr.reverse"))
}

/// Calldata for `registry.resolver(node)`.
pub fn resolver_calldata(node: &[u8; 32]) -> String {
    format!("0x{RESOLVER_SELECTOR}{}", hex::encode(node))
}

/// Calldata for `resolver.name(node)`.
pub fn name_calldata(node: &[u8; 32]) -> String {
    format!("0x{NAME_SELECTOR}{}", hex::encode(node))
}

fn decode_words(raw: &str) -> Option<Vec<u8>> {
    hex::decode(raw.trim_start_matches("0x")).ok()
}

fn word_as_usize(word: &[u8]) -> Option<usize> {
    let (high, low) = word.split_at(24);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf)).ok()
}

/// ABI-decoded `address` return value. `None` for the zero address.
pub fn decode_address(raw: &str) -> Option<String> {
    let bytes = decode_words(raw)?;
    let word = bytes.get(..32)?;
    let addr = &word[12..];
    if addr.iter().all(|b| *b == 0) {
        return None;
    }
    Some(format!("0x{}", hex::encode(addr)))
}

/// ABI-decoded `string` return value. `None` for malformed or empty data.
pub fn decode_string(raw: &str) -> Option<String> {
    let bytes = decode_words(raw)?;
    let offset = word_as_usize(bytes.get(..32)?)?;
    let len_end = offset.checked_add(32)?;
    let len = word_as_usize(bytes.get(offset..len_end)?)?;
    let data = bytes.get(len_end..len_end.checked_add(len)?)?;
    let name = String::from_utf8(data.to_vec()).ok()?;
    (!name.is_empty()).then_some(name)
}
