use alloy::hex;
use alloy::primitives::{keccak256, Bytes, B256};

/// EIP-137 namehash. Labels are lowercased, which covers ASCII names but is
/// not full UTS-46 normalization.
pub fn namehash(name: &str) -> B256 {
    name.rsplit('.')
        .filter(|label| !label.is_empty())
        .fold(B256::ZERO, |node, label| {
            let label_hash = keccak256(label.to_lowercase().as_bytes());
            let mut preimage = [0u8; 64];
            preimage[..32].copy_from_slice(node.as_slice());
            preimage[32..].copy_from_slice(label_hash.as_slice());
            keccak256(preimage)
        })
}

/// DNS wire encoding used by ENSIP-10 `resolve(name, data)`. Labels longer
/// than 255 bytes are replaced by `[keccak256(label)]`.
pub fn dns_encode(name: &str) -> Bytes {
    let mut encoded = Vec::with_capacity(name.len() + 2);
    for label in name.split('.').filter(|label| !label.is_empty()) {
        let hashed;
        let label = if label.len() > 255 {
            hashed = format!("[{}]", hex::encode(keccak256(label.as_bytes())));
            hashed.as_str()
        } else {
            label
        };
        encoded.push(label.len() as u8);
        encoded.extend_from_slice(label.as_bytes());
    }
    encoded.push(0);
    encoded.into()
}
