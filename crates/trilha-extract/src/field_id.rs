use sha2::{Digest, Sha256};

/// Length of a field identity, in hex characters (64 bits of digest).
pub const FIELD_ID_LEN: usize = 16;

/// Unit separator between derivation inputs. Cannot occur in sheet names or
/// question text, so the concatenation is unambiguous.
const DELIMITER: u8 = 0x1f;

/// Derive the stable identity of a question from its content and position.
///
/// The identity is the first [`FIELD_ID_LEN`] hex characters of the SHA-256
/// digest over `sheet_name ␟ row ␟ col ␟ text`. Any change to sheet name,
/// position, or exact text yields a different id; identity tracks
/// content+position, not question meaning.
pub fn field_id(sheet_name: &str, row: u32, col: u32, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sheet_name.as_bytes());
    hasher.update([DELIMITER]);
    hasher.update(row.to_string().as_bytes());
    hasher.update([DELIMITER]);
    hasher.update(col.to_string().as_bytes());
    hasher.update([DELIMITER]);
    hasher.update(text.as_bytes());

    let digest = format!("{:x}", hasher.finalize());
    digest[..FIELD_ID_LEN].to_string()
}
