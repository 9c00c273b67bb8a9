use sha2::{Digest, Sha256};

use crate::record::Record;

pub const KEY_LEN: usize = 16;

// Hashes `source|url|name|phone|` with the raw, un-normalized name and phone, so two
// spellings of the same number under one listing stay distinct keys.
pub fn identity(record: &Record) -> String {
    let mut hasher = Sha256::new();
    for part in [
        record.source(),
        record.url(),
        record.name.as_deref().unwrap_or(""),
        record.phone.as_deref().unwrap_or(""),
    ] {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    let mut key = hex::encode(hasher.finalize());
    key.truncate(KEY_LEN);
    key
}
