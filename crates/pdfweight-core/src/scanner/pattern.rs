//! Low-level byte pattern matching.
//!
//! Everything in this module works on raw `&[u8]` slices. No helper assumes
//! the data is UTF-8 or null-terminated, so embedded binary streams are
//! searched exactly like the structural bytes around them.

/// Find the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Find the first occurrence of `needle` at or after `from`.
///
/// The returned offset is absolute, i.e. relative to the start of `haystack`.
pub(crate) fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let tail = haystack.get(from..)?;
    find(tail, needle).map(|pos| from + pos)
}

/// Returns true if `needle` occurs anywhere in `haystack`.
pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

/// Whitespace as understood by C's `isspace` in the "C" locale.
pub(crate) fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Advance `pos` past any whitespace.
pub(crate) fn skip_space(data: &[u8], mut pos: usize) -> usize {
    while pos < data.len() && is_space(data[pos]) {
        pos += 1;
    }
    pos
}

/// Read the value that follows `key`, skipping leading whitespace and
/// stopping at whitespace, `/` or `>`.
///
/// Returns `None` when the key does not occur; the value itself may be empty.
pub(crate) fn value_after<'a>(data: &'a [u8], key: &[u8]) -> Option<&'a [u8]> {
    let start = skip_space(data, find(data, key)? + key.len());
    let len = data[start..]
        .iter()
        .position(|&b| is_space(b) || b == b'/' || b == b'>')
        .unwrap_or(data.len() - start);
    Some(&data[start..start + len])
}

/// Parse the unsigned decimal number that follows `key`.
///
/// Absent keys, missing digits and values that overflow `u32` all yield 0.
pub(crate) fn number_after(data: &[u8], key: &[u8]) -> u32 {
    let Some(pos) = find(data, key) else {
        return 0;
    };
    let start = skip_space(data, pos + key.len());
    let digits = data[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(Some(0u32), |acc, &b| {
            acc?.checked_mul(10)?.checked_add(u32::from(b - b'0'))
        });
    digits.unwrap_or(0)
}
