//! Joining string arrays and splitting text into them.

use super::{ArrayError, ArrayKind, TypedArray};

const DEFAULT_GLUE: &str = " ";

pub(super) fn join(array: &TypedArray, glue: Option<&str>, start: usize) -> Option<String> {
    if array.kind() != ArrayKind::Str || start >= array.len() {
        return None;
    }
    let glue = glue.unwrap_or(DEFAULT_GLUE);
    let mut out = String::new();
    for (i, item) in array.strings().skip(start).enumerate() {
        if i > 0 {
            out.push_str(glue);
        }
        out.push_str(item.unwrap_or_default());
    }
    Some(out)
}

/// Splits `text` on every exact occurrence of `separator` into a string array.
///
/// Empty tokens (from leading, trailing or doubled separators) are kept only when
/// `allow_empty` is set. An empty separator yields `text` as a single token.
///
/// # Examples
/// ```
/// use voxel_core::core::array::split;
///
/// let words = split("give  dirt 5", " ", false).unwrap();
/// assert_eq!(words.len(), 3);
/// assert_eq!(words.join(None, 0).as_deref(), Some("give dirt 5"));
/// ```
pub fn split(text: &str, separator: &str, allow_empty: bool) -> Result<TypedArray, ArrayError> {
    let mut tokens = TypedArray::new(ArrayKind::Str);
    if separator.is_empty() {
        if allow_empty || !text.is_empty() {
            tokens.push_string(Some(text))?;
        }
        return Ok(tokens);
    }

    for token in text.split(separator) {
        if allow_empty || !token.is_empty() {
            tokens.push_string(Some(token))?;
        }
    }
    Ok(tokens)
}
