//! JSON recovery from free-form assistant text.
//!
//! Models are asked for one bare JSON object but regularly wrap it in prose
//! or code fences. [`extract_first_json_object`] finds the first balanced
//! object, ignoring braces inside string literals. [`extract_outer_braces`]
//! is the cruder first-`{`-to-last-`}` cut, only used as a second guess.

/// Return the first balanced `{...}` substring of `text`.
///
/// Scans from the first `{`, counting depth on `{`/`}` outside strings.
/// A string opens on an unescaped `"` or `'` and closes on the next
/// unescaped quote of the same kind. A backslash skips the character after
/// it. Returns `None` if there is no `{` or depth never returns to zero.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }

        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        // `{` and `}` are ASCII, so both ends are char boundaries.
                        return Some(&text[start..=i]);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Return everything from the first `{` to the last `}` (inclusive).
pub fn extract_outer_braces(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last < first {
        return None;
    }
    Some(&text[first..=last])
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
