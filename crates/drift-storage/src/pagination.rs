//! Keyset pagination: `(sort_value, id)` cursors, never OFFSET.
//!
//! Cursors are opaque to callers - base64 of the JSON tuple - so a consumer
//! cannot construct one that skips rows silently.

use serde::{Deserialize, Serialize};

/// Composite cursor after the last row of the previous page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub sort_value: String,
    pub id: String,
}

impl Cursor {
    pub fn new(sort_value: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sort_value: sort_value.into(),
            id: id.into(),
        }
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        b64_encode(json.as_bytes())
    }

    pub fn decode(token: &str) -> Option<Self> {
        let bytes = b64_decode(token)?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// One page of results plus the cursor for the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            next_cursor: None,
        }
    }

    /// Build a page from `limit + 1` fetched rows, deriving the cursor from
    /// the last row kept.
    pub fn from_overfetch(
        mut rows: Vec<T>,
        limit: usize,
        cursor_of: impl Fn(&T) -> Cursor,
    ) -> Self {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|row| cursor_of(row).encode())
        } else {
            None
        };
        Self {
            items: rows,
            has_more,
            next_cursor,
        }
    }
}

const B64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn b64_encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len().div_ceil(3) * 4);
    for chunk in input.chunks(3) {
        let b = [
            chunk[0],
            chunk.get(1).copied().unwrap_or(0),
            chunk.get(2).copied().unwrap_or(0),
        ];
        out.push(B64[(b[0] >> 2) as usize] as char);
        out.push(B64[(((b[0] & 0x03) << 4) | (b[1] >> 4)) as usize] as char);
        if chunk.len() > 1 {
            out.push(B64[(((b[1] & 0x0f) << 2) | (b[2] >> 6)) as usize] as char);
        } else {
            out.push('=');
        }
        if chunk.len() > 2 {
            out.push(B64[(b[2] & 0x3f) as usize] as char);
        } else {
            out.push('=');
        }
    }
    out
}

fn b64_decode(input: &str) -> Option<Vec<u8>> {
    fn value(c: u8) -> Option<u8> {
        match c {
            b'A'..=b'Z' => Some(c - b'A'),
            b'a'..=b'z' => Some(c - b'a' + 26),
            b'0'..=b'9' => Some(c - b'0' + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }

    let trimmed = input.trim_end_matches('=');
    let mut out = Vec::with_capacity(trimmed.len() * 3 / 4);
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for &c in trimmed.as_bytes() {
        acc = (acc << 6) | u32::from(value(c)?);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trip() {
        let cursor = Cursor::new("0.93", "pat-42");
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(Cursor::decode("!!!not-base64!!!").is_none());
    }

    #[test]
    fn overfetch_derives_next_cursor() {
        let rows: Vec<u32> = (0..11).collect();
        let page = Page::from_overfetch(rows, 10, |n| Cursor::new(n.to_string(), n.to_string()));
        assert_eq!(page.items.len(), 10);
        assert!(page.has_more);
        let next = Cursor::decode(page.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(next.id, "9");
    }

    #[test]
    fn exact_page_has_no_cursor() {
        let rows: Vec<u32> = (0..10).collect();
        let page = Page::from_overfetch(rows, 10, |n| Cursor::new(n.to_string(), n.to_string()));
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }
}
