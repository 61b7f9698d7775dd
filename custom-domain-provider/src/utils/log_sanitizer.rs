//! Log sanitization
//!
//! Email provider responses carry full DKIM public keys and hosting responses
//! can echo verification tokens; neither should land in logs verbatim.

/// Maximum number of bytes kept from a body.
const TRUNCATE_LIMIT: usize = 256;

/// DKIM key values shorter than this are left alone.
const MIN_KEY_LEN: usize = 32;

/// Mask DKIM key material (`p=<base64>`) and cap the length for logging.
pub fn truncate_for_log(s: &str) -> String {
    let masked = mask_dkim_keys(s);
    if masked.len() <= TRUNCATE_LIMIT {
        return masked;
    }

    let cut = masked
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= TRUNCATE_LIMIT)
        .last()
        .unwrap_or(0);
    format!(
        "{}... [truncated, total {} bytes]",
        &masked[..cut],
        masked.len()
    )
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

fn mask_dkim_keys(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("p=") {
        let (head, tail) = rest.split_at(pos + 2);
        out.push_str(head);

        let key_len = tail.find(|c: char| !is_key_char(c)).unwrap_or(tail.len());
        if key_len >= MIN_KEY_LEN {
            out.push_str(&format!("<dkim key, {key_len} chars>"));
        } else {
            out.push_str(&tail[..key_len]);
        }
        rest = &tail[key_len..];
    }

    out.push_str(rest);
    out
}
