// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cooked property values and their wire rendering
//!
//! A property starts life as a [`Raw`] list of unescaped strings straight
//! from the tokenizer. Cooking replaces that with a [`CookedValue`], the
//! strongly typed representation a flavor assigns to the property. Cooked
//! values know how to render themselves back to SGF value syntax.

use std::collections::BTreeMap;

use crate::backgammon::{BgMove, BgPoint, BgStone};
use crate::errors::SgfError;
use crate::tokenizer::{classify, ValueKind};
use crate::CheckerColor;

/// The uncooked value list of one property occurrence
///
/// Mutable only while the parser appends bracket groups; read-only once the
/// node is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raw {
    values: Vec<String>,
}

impl Raw {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub(crate) fn push(&mut self, value: String) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(|s| s.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|s| s.as_str())
    }
}

/// SGF "Double" data type, an emphasis marker (unrelated to the cube)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Strong,
}

/// A strongly typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum CookedValue {
    /// Signed 64-bit integer
    Number(i64),
    /// IEEE double, POSIX decimal on the wire
    Real(f64),
    /// Escaped single-line string; all whitespace collapsed to spaces
    SimpleText(String),
    /// Escaped string with hard line breaks preserved
    Text(String),
    /// Emphasis enumerant (SGF data type "Double")
    Double(Emphasis),
    /// Player color, for `PL`
    Color(CheckerColor),
    /// Ordered pair of two values, e.g. point:point for arrows
    Compose(Box<CookedValue>, Box<CookedValue>),
    /// Homogeneous ordered list, range-compressed on the wire
    List(Vec<CookedValue>),
    /// String-keyed match information for `MI`
    MatchInfo(BTreeMap<String, CookedValue>),
    /// Backgammon move notation
    Move(BgMove),
    /// Board point index 0-25
    Point(BgPoint),
    /// Checker on a board point
    Stone(BgStone),
}

impl CookedValue {
    /// Render to the bracket payloads this value occupies on the wire
    ///
    /// Most values occupy one bracket group; lists and match info render one
    /// group per item. Consecutive point/stone runs compress to `first:last`
    /// -- adjacency is judged in the supplied order, never sorted.
    pub fn wire_values(&self) -> Result<Vec<String>, SgfError> {
        match self {
            CookedValue::List(items) => render_list(items),
            CookedValue::MatchInfo(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let mut group = String::new();
                    group.push_str(key);
                    group.push(':');
                    group.push_str(&value.render_single(true)?);
                    out.push(group);
                }
                Ok(out)
            }
            _ => Ok(vec![self.render_single(false)?]),
        }
    }

    /// Render one bracket payload
    fn render_single(&self, in_compose: bool) -> Result<String, SgfError> {
        Ok(match self {
            CookedValue::Number(n) => n.to_string(),
            CookedValue::Real(r) => format_real(*r)?,
            CookedValue::SimpleText(s) | CookedValue::Text(s) => escape_text(s, in_compose),
            CookedValue::Double(Emphasis::Normal) => "1".to_string(),
            CookedValue::Double(Emphasis::Strong) => "2".to_string(),
            CookedValue::Color(CheckerColor::Black) => "B".to_string(),
            CookedValue::Color(CheckerColor::White) => "W".to_string(),
            CookedValue::Compose(first, second) => {
                let mut s = first.render_single(true)?;
                s.push(':');
                s.push_str(&second.render_single(true)?);
                s
            }
            CookedValue::Move(mv) => mv.to_wire(),
            CookedValue::Point(p) => p.letter().to_string(),
            CookedValue::Stone(s) => s.point().letter().to_string(),
            CookedValue::List(_) | CookedValue::MatchInfo(_) => {
                return Err(SgfError::Usage(
                    "list value cannot nest inside a single bracket group".into(),
                ))
            }
        })
    }

    /// Point index when this value is a point or a stone
    fn point_index(&self) -> Option<u8> {
        match self {
            CookedValue::Point(p) => Some(p.index()),
            CookedValue::Stone(s) => Some(s.point().index()),
            _ => None,
        }
    }
}

fn render_list(items: &[CookedValue]) -> Result<Vec<String>, SgfError> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < items.len() {
        match items[i].point_index() {
            Some(start) => {
                // Extend over strictly consecutive indices in supplied order.
                let mut end = start;
                let mut j = i + 1;
                while let Some(next) = items.get(j).and_then(|it| it.point_index()) {
                    if next != end + 1 {
                        break;
                    }
                    end = next;
                    j += 1;
                }
                if end > start {
                    out.push(format!(
                        "{}:{}",
                        BgPoint::new(start)?.letter(),
                        BgPoint::new(end)?.letter()
                    ));
                } else {
                    out.push(items[i].render_single(false)?);
                }
                i = j;
            }
            None => {
                out.push(items[i].render_single(false)?);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Escape a text payload for the wire
///
/// Backslash and the closing bracket always need escaping; the compose
/// separator only inside a composed value.
pub fn escape_text(text: &str, in_compose: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | ']' => {
                out.push('\\');
                out.push(c);
            }
            ':' if in_compose => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parse a strict base-10 signed number; trailing garbage is an error
pub fn parse_number(text: &str) -> Result<i64, SgfError> {
    if classify(text) != ValueKind::Number {
        return Err(SgfError::InvalidNumber(text.to_string()));
    }
    text.parse::<i64>()
        .map_err(|_| SgfError::InvalidNumber(text.to_string()))
}

/// Parse a real value; accepts plain integers as well
pub fn parse_real(text: &str) -> Result<f64, SgfError> {
    match classify(text) {
        ValueKind::Number | ValueKind::Real => text
            .parse::<f64>()
            .map_err(|_| SgfError::InvalidNumber(text.to_string())),
        ValueKind::Text => Err(SgfError::InvalidNumber(text.to_string())),
    }
}

const REAL_FRACTION_DIGITS: u32 = 10;

/// Render a real value in POSIX decimal form
///
/// Fractions are carried to ten digits and trailing zeros trimmed, so a
/// bare integer renders without a decimal point. Infinities clamp to the
/// extreme finite doubles; NaN has no wire form and is an error.
pub fn format_real(value: f64) -> Result<String, SgfError> {
    if value.is_nan() {
        return Err(SgfError::NaN);
    }
    let value = if value.is_infinite() {
        if value > 0.0 {
            f64::MAX
        } else {
            f64::MIN
        }
    } else {
        value
    };

    let trunc = value.trunc();
    let frac = (value - trunc).abs();
    let scale = 10u64.pow(REAL_FRACTION_DIGITS);
    let mut scaled = (frac * scale as f64).round() as u64;
    let mut int_digits = format!("{:.0}", trunc.abs());
    if scaled >= scale {
        // Fraction rounded all the way up; carry into the integer part.
        scaled = 0;
        int_digits = increment_decimal(&int_digits);
    }

    let mut out = String::new();
    if value.is_sign_negative() && (int_digits != "0" || scaled > 0) {
        out.push('-');
    }
    out.push_str(&int_digits);
    if scaled > 0 {
        let mut digits = format!("{:01$}", scaled, REAL_FRACTION_DIGITS as usize);
        while digits.ends_with('0') {
            digits.pop();
        }
        out.push('.');
        out.push_str(&digits);
    }
    Ok(out)
}

/// Add one to a decimal digit string
fn increment_decimal(digits: &str) -> String {
    let mut bytes: Vec<u8> = digits.bytes().collect();
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8(bytes).expect("decimal digits");
        }
    }
    let mut out = String::with_capacity(bytes.len() + 1);
    out.push('1');
    out.push_str(&String::from_utf8(bytes).expect("decimal digits"));
    out
}

/// Re-encode a byte-transparent string into UTF-8 per the `CA` charset
///
/// The tokenizer decodes bytes one-to-one, so the original byte sequence is
/// recoverable here. UTF-8 input is decoded properly; Latin-1 needs no
/// work; anything else passes through unchanged with a warning.
pub fn convert_charset(text: &str, charset: &str) -> String {
    let normalized = charset.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "utf-8" | "utf8" => {
            let mut bytes = Vec::with_capacity(text.len());
            for c in text.chars() {
                let code = c as u32;
                if code > 0xff {
                    // Already beyond byte range; nothing to re-decode.
                    return text.to_string();
                }
                bytes.push(code as u8);
            }
            match String::from_utf8(bytes) {
                Ok(decoded) => decoded,
                Err(_) => text.to_string(),
            }
        }
        "iso-8859-1" | "latin-1" | "latin1" => text.to_string(),
        other => {
            tracing::warn!("unsupported charset '{}', leaving text as-is", other);
            text.to_string()
        }
    }
}
