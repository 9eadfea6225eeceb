//! Writing through JSON pointers (RFC 6901), creating missing containers on the way.
//!
//! Reading is left to `serde_json::Value::pointer()`, which has no creating counterpart.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Splits a JSON pointer into its unescaped reference tokens.
///
/// The empty pointer refers to the whole document and has no tokens.
pub(crate) fn tokens(pointer: &str) -> Result<Vec<String>> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }

    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(invalid(pointer, "a non-empty pointer must start with '/'"));
    };

    rest.split('/').map(|token| unescape(pointer, token)).collect()
}

fn unescape(pointer: &str, token: &str) -> Result<String> {
    let mut unescaped = String::with_capacity(token.len());
    let mut chars = token.chars();

    while let Some(c) = chars.next() {
        if c != '~' {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('0') => unescaped.push('~'),
            Some('1') => unescaped.push('/'),
            _ => return Err(invalid(pointer, "'~' must be followed by '0' or '1'")),
        }
    }

    Ok(unescaped)
}

/// Stores `value` at the location the tokens lead to.
///
/// Null values on the way are replaced with an array if the next token is an array index or
/// `-`, otherwise with an object. Both `-` and the index one past the last item append to the
/// array. Any larger index is an error.
pub(crate) fn set(root: &mut Value, pointer: &str, tokens: &[String], value: Value) -> Result<()> {
    let mut current = root;

    for token in tokens {
        current = child_or_insert(current, pointer, token)?;
    }

    *current = value;
    Ok(())
}

fn child_or_insert<'v>(node: &'v mut Value, pointer: &str, token: &str) -> Result<&'v mut Value> {
    if node.is_null() {
        *node = if is_array_token(token) {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }

    match node {
        Value::Object(map) => Ok(map.entry(token).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = array_index(pointer, token, items.len())?;

            if index == items.len() {
                items.push(Value::Null);
            }

            let len = items.len();

            items.get_mut(index).ok_or_else(|| {
                invalid(
                    pointer,
                    format!("array index {index} is past the end of an array of {len} items"),
                )
            })
        }
        _ => Err(invalid(
            pointer,
            format!("'{token}' refers into a value that is neither an object nor an array"),
        )),
    }
}

fn is_array_token(token: &str) -> bool {
    token == "-" || (!token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
}

fn array_index(pointer: &str, token: &str, len: usize) -> Result<usize> {
    if token == "-" {
        return Ok(len);
    }

    let has_leading_zero = token.len() > 1 && token.starts_with('0');

    if !is_array_token(token) || has_leading_zero {
        return Err(invalid(
            pointer,
            format!("'{token}' is not a valid array index"),
        ));
    }

    token
        .parse()
        .map_err(|_| invalid(pointer, format!("'{token}' is not a valid array index")))
}

fn invalid(pointer: &str, problem: impl Into<String>) -> Error {
    Error::Pointer {
        pointer: pointer.to_string(),
        problem: problem.into(),
    }
}
