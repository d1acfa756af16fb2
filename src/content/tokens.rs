//! Content stream tokenizer.
//!
//! A plain pass over content stream syntax that only counts operators. The
//! reader compares this count with what the operation parser produced: the
//! parser stops quietly at the first token it cannot read, the tokenizer
//! does not.

/// PDF whitespace characters (ISO 32000-1, Table 1).
fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\0' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

/// PDF delimiter characters (ISO 32000-1, Table 2).
fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// Count the operators in a content stream.
///
/// Operands (numbers, names, strings, arrays, dictionaries, `true`, `false`,
/// `null`) and comments are skipped. Inline image data between `ID` and `EI`
/// is skipped, with `BI`, `ID` and `EI` each counted as an operator.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::content::count_operators;
///
/// assert_eq!(count_operators(b"BT /F1 12 Tf (Hi) Tj ET"), 4);
/// assert_eq!(count_operators(b"% comment only\n"), 0);
/// ```
pub fn count_operators(data: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;

    while i < data.len() {
        let b = data[i];
        if is_whitespace(b) {
            i += 1;
        } else if b == b'%' {
            while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                i += 1;
            }
        } else if b == b'(' {
            i = skip_literal_string(data, i);
        } else if b == b'<' && data.get(i + 1) == Some(&b'<') {
            i += 2;
        } else if b == b'<' {
            while i < data.len() && data[i] != b'>' {
                i += 1;
            }
            i += 1;
        } else if b == b'/' {
            i += 1;
            while i < data.len() && is_regular(data[i]) {
                i += 1;
            }
        } else if is_delimiter(b) {
            i += 1;
        } else {
            let start = i;
            while i < data.len() && is_regular(data[i]) {
                i += 1;
            }
            let token = &data[start..i];
            if is_operand_keyword(token) {
                continue;
            }
            count += 1;
            if token == b"ID" {
                match skip_inline_image(data, i) {
                    Some(end) => {
                        count += 1;
                        i = end;
                    },
                    None => i = data.len(),
                }
            }
        }
    }

    count
}

fn is_operand_keyword(token: &[u8]) -> bool {
    matches!(token.first(), Some(b'0'..=b'9' | b'+' | b'-' | b'.'))
        || matches!(token, b"true" | b"false" | b"null")
}

/// Index just past the closing parenthesis of the string opening at `start`.
fn skip_literal_string(data: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < data.len() {
        match data[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            },
            _ => {},
        }
        i += 1;
    }
    data.len()
}

/// Index just past the `EI` that ends inline image data starting at `from`.
fn skip_inline_image(data: &[u8], from: usize) -> Option<usize> {
    (from..data.len().saturating_sub(1)).find_map(|i| {
        let ends_here = &data[i..i + 2] == b"EI"
            && i > from
            && is_whitespace(data[i - 1])
            && data.get(i + 2).map_or(true, |&b| is_whitespace(b));
        ends_here.then_some(i + 2)
    })
}
