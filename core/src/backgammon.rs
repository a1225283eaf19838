// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backgammon flavor: game-specific property cooking and encodings
//!
//! Game id "6". Handles match information (`MI`), cube state (`CO`, `CV`),
//! move notation (`B`, `W`), setup and markup point lists with compressed
//! ranges, and delegates everything else to the base flavor.

use std::collections::BTreeMap;

use crate::errors::SgfError;
use crate::flavor::{BaseFlavor, CookContext, Flavor};
use crate::value::{CookedValue, Raw};

/// Board point index 0-25, letter-encoded `a`..`z` on the wire
///
/// 0 and 25 address the bar/home ends; 1-24 are the playing points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BgPoint(u8);

impl BgPoint {
    /// Highest valid point index
    pub const MAX: u8 = 25;

    pub fn new(index: u8) -> Result<Self, SgfError> {
        if index > Self::MAX {
            return Err(SgfError::semantic(format!(
                "point index {} out of range",
                index
            )));
        }
        Ok(Self(index))
    }

    pub fn from_letter(letter: char) -> Result<Self, SgfError> {
        match letter {
            'a'..='z' => Ok(Self(letter as u8 - b'a')),
            other => Err(SgfError::semantic(format!(
                "invalid point letter '{}'",
                other
            ))),
        }
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn letter(&self) -> char {
        (b'a' + self.0) as char
    }
}

/// A checker sitting on a board point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BgStone(BgPoint);

impl BgStone {
    pub fn new(point: BgPoint) -> Self {
        Self(point)
    }

    pub fn from_letter(letter: char) -> Result<Self, SgfError> {
        Ok(Self(BgPoint::from_letter(letter)?))
    }

    pub fn point(&self) -> BgPoint {
        self.0
    }
}

/// Backgammon move notation
///
/// Two dice digits followed by up to four from/to point pairs, or one of
/// the literal cube words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BgMove {
    /// Checker play: the rolled dice and the point pairs in played order
    Regular {
        dice: [u8; 2],
        steps: Vec<(u8, u8)>,
    },
    /// Cube offered
    Double,
    /// Cube accepted
    Take,
    /// Cube declined
    Drop,
}

impl BgMove {
    /// Parse wire text like `31ad` or the literal cube words
    pub fn from_wire(text: &str) -> Result<Self, SgfError> {
        match text {
            "double" => return Ok(BgMove::Double),
            "take" => return Ok(BgMove::Take),
            "drop" => return Ok(BgMove::Drop),
            _ => {}
        }

        let bytes = text.as_bytes();
        if bytes.len() < 2 || bytes.len() % 2 != 0 || bytes.len() > 10 {
            return Err(SgfError::InvalidMove(text.to_string()));
        }
        let mut dice = [0u8; 2];
        for (i, slot) in dice.iter_mut().enumerate() {
            match bytes[i] {
                d @ b'1'..=b'6' => *slot = d - b'0',
                _ => return Err(SgfError::InvalidMove(text.to_string())),
            }
        }
        let mut steps = Vec::with_capacity((bytes.len() - 2) / 2);
        for pair in bytes[2..].chunks(2) {
            let (from, to) = (pair[0], pair[1]);
            if !(from.is_ascii_lowercase() && to.is_ascii_lowercase()) {
                return Err(SgfError::InvalidMove(text.to_string()));
            }
            steps.push((from - b'a', to - b'a'));
        }
        Ok(BgMove::Regular { dice, steps })
    }

    /// Render back to wire text
    pub fn to_wire(&self) -> String {
        match self {
            BgMove::Regular { dice, steps } => {
                let mut out = String::with_capacity(2 + steps.len() * 2);
                out.push((b'0' + dice[0]) as char);
                out.push((b'0' + dice[1]) as char);
                for (from, to) in steps {
                    out.push((b'a' + from) as char);
                    out.push((b'a' + to) as char);
                }
                out
            }
            BgMove::Double => "double".to_string(),
            BgMove::Take => "take".to_string(),
            BgMove::Drop => "drop".to_string(),
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self, BgMove::Regular { .. })
    }

    pub fn is_double(&self) -> bool {
        matches!(self, BgMove::Double)
    }

    pub fn is_take(&self) -> bool {
        matches!(self, BgMove::Take)
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, BgMove::Drop)
    }

    /// Die value by index for a regular move
    pub fn die(&self, index: usize) -> Option<u8> {
        match self {
            BgMove::Regular { dice, .. } => dice.get(index).copied(),
            _ => None,
        }
    }

    /// Point pairs of a regular move, in played order
    pub fn steps(&self) -> &[(u8, u8)] {
        match self {
            BgMove::Regular { steps, .. } => steps,
            _ => &[],
        }
    }
}

/// Match-info keys carrying numbers rather than free text
const MI_NUMERIC_KEYS: [&str; 4] = ["length", "game", "ws", "bs"];

/// C-library strtol semantics with base 8: maximal octal-digit prefix,
/// zero when nothing parses
///
/// The match-info fields were historically read this way even though the
/// values are very unlikely to be intentionally octal; the behavior is
/// preserved, not corrected. See DESIGN.md.
fn parse_octal_prefix(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let mut chars = trimmed.chars().peekable();
    let mut negative = false;
    if let Some(&sign) = chars.peek() {
        if sign == '+' || sign == '-' {
            negative = sign == '-';
            chars.next();
        }
    }
    let mut value: i64 = 0;
    for c in chars {
        match c.to_digit(8) {
            Some(d) => value = value.saturating_mul(8).saturating_add(d as i64),
            None => break,
        }
    }
    if negative {
        -value
    } else {
        value
    }
}

/// The Backgammon flavor, game id "6"
pub struct BackgammonFlavor {
    base: BaseFlavor,
}

impl BackgammonFlavor {
    pub fn new() -> Self {
        Self { base: BaseFlavor }
    }

    /// Declared game id value of the `GM` property
    pub const GAME_ID: i64 = 6;

    fn cook_match_info(&self, raw: &Raw) -> Result<CookedValue, SgfError> {
        let mut entries = BTreeMap::new();
        for value in raw.values() {
            let (key, text) = match value.split_once(':') {
                Some((key, text)) => (key, text),
                None => {
                    return Err(SgfError::semantic(format!(
                        "Property 'MI': malformed key-value pair '{}'",
                        value
                    )))
                }
            };
            if key.is_empty() {
                return Err(SgfError::semantic(format!(
                    "Property 'MI': empty key in '{}'",
                    value
                )));
            }
            let cooked = if MI_NUMERIC_KEYS.contains(&key) {
                let number = parse_octal_prefix(text);
                if number < 0 {
                    return Err(SgfError::semantic(format!(
                        "Property 'MI': negative value {} for key '{}'",
                        number, key
                    )));
                }
                CookedValue::Number(number)
            } else {
                CookedValue::SimpleText(text.to_string())
            };
            entries.insert(key.to_string(), cooked);
        }
        Ok(CookedValue::MatchInfo(entries))
    }

    fn cook_cube_position(&self, raw: &Raw) -> Result<CookedValue, SgfError> {
        if raw.len() > 1 {
            return Err(SgfError::ListTooLong("CO".to_string()));
        }
        let value = raw
            .get(0)
            .ok_or_else(|| SgfError::Usage("property 'CO' has no value".into()))?;
        match value {
            "b" | "w" | "c" | "n" => Ok(CookedValue::SimpleText(value.to_string())),
            other => Err(SgfError::semantic(format!(
                "Property 'CO': invalid cube position '{}'",
                other
            ))),
        }
    }

    fn cook_cube_value(&self, raw: &Raw) -> Result<CookedValue, SgfError> {
        if raw.len() > 1 {
            return Err(SgfError::ListTooLong("CV".to_string()));
        }
        let value = raw
            .get(0)
            .ok_or_else(|| SgfError::Usage("property 'CV' has no value".into()))?;
        let number = crate::value::parse_number(value)?;
        if number < 2 || number & (number - 1) != 0 {
            return Err(SgfError::semantic(format!(
                "Property 'CV': invalid cube value {}",
                number
            )));
        }
        Ok(CookedValue::Number(number))
    }

    fn cook_move(&self, property_id: &str, raw: &Raw) -> Result<CookedValue, SgfError> {
        if raw.len() > 1 {
            return Err(SgfError::ListTooLong(property_id.to_string()));
        }
        let value = raw.get(0).ok_or_else(|| {
            SgfError::Usage(format!("property '{}' has no value", property_id))
        })?;
        self.create_move(value)
    }

    fn cook_point_list(
        &self,
        property_id: &str,
        raw: &Raw,
        stones: bool,
    ) -> Result<CookedValue, SgfError> {
        let mut items = Vec::new();
        for value in raw.values() {
            self.append_points(&mut items, property_id, value)?;
        }
        if stones {
            for item in &mut items {
                if let CookedValue::Point(p) = item {
                    *item = CookedValue::Stone(BgStone::new(*p));
                }
            }
        }
        Ok(CookedValue::List(items))
    }

    /// Cook `AR`/`LN`: a list of composed point pairs with markup rules
    fn cook_compose_list(&self, property_id: &str, raw: &Raw) -> Result<CookedValue, SgfError> {
        let noun = if property_id == "AR" { "Arrows" } else { "Lines" };
        let mut seen: Vec<(BgPoint, BgPoint)> = Vec::new();
        let mut items = Vec::new();
        for value in raw.values() {
            let (from, to) = parse_point_pair(property_id, value)?;
            if from == to {
                return Err(SgfError::semantic(format!(
                    "Property '{}': Start and end point must differ",
                    property_id
                )));
            }
            if seen.contains(&(from, to)) {
                return Err(SgfError::semantic(format!(
                    "Property '{}': {} must be unique",
                    property_id, noun
                )));
            }
            seen.push((from, to));
            items.push(CookedValue::Compose(
                Box::new(CookedValue::Point(from)),
                Box::new(CookedValue::Point(to)),
            ));
        }
        Ok(CookedValue::List(items))
    }
}

impl Default for BackgammonFlavor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_point_pair(property_id: &str, value: &str) -> Result<(BgPoint, BgPoint), SgfError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(':'), Some(b), None) => {
            Ok((BgPoint::from_letter(a)?, BgPoint::from_letter(b)?))
        }
        _ => Err(SgfError::semantic(format!(
            "Property '{}': invalid point pair '{}'",
            property_id, value
        ))),
    }
}

impl Flavor for BackgammonFlavor {
    fn game_id(&self) -> &str {
        "6"
    }

    fn cook(
        &self,
        property_id: &str,
        raw: &Raw,
        ctx: &CookContext,
    ) -> Result<Option<CookedValue>, SgfError> {
        let cooked = match property_id {
            "MI" => self.cook_match_info(raw)?,
            "CO" => self.cook_cube_position(raw)?,
            "CV" => self.cook_cube_value(raw)?,
            "B" | "W" => self.cook_move(property_id, raw)?,
            "AB" | "AW" => self.cook_point_list(property_id, raw, true)?,
            "AE" | "CR" => self.cook_point_list(property_id, raw, false)?,
            "AR" | "LN" => self.cook_compose_list(property_id, raw)?,
            _ => return self.base.cook(property_id, raw, ctx),
        };
        Ok(Some(cooked))
    }

    fn create_move(&self, text: &str) -> Result<CookedValue, SgfError> {
        Ok(CookedValue::Move(BgMove::from_wire(text)?))
    }

    fn create_point(&self, letter: char) -> Result<CookedValue, SgfError> {
        Ok(CookedValue::Point(BgPoint::from_letter(letter)?))
    }

    fn create_stone(&self, letter: char) -> Result<CookedValue, SgfError> {
        Ok(CookedValue::Stone(BgStone::from_letter(letter)?))
    }

    fn append_points(
        &self,
        out: &mut Vec<CookedValue>,
        property_id: &str,
        value: &str,
    ) -> Result<(), SgfError> {
        let chars: Vec<char> = value.chars().collect();
        match chars.as_slice() {
            [single] => {
                out.push(self.create_point(*single)?);
                Ok(())
            }
            [from, ':', to] => {
                let from = BgPoint::from_letter(*from)?;
                let to = BgPoint::from_letter(*to)?;
                if from.index() > to.index() {
                    return Err(SgfError::semantic(format!(
                        "Property '{}': invalid point range '{}'",
                        property_id, value
                    )));
                }
                for index in from.index()..=to.index() {
                    out.push(CookedValue::Point(BgPoint(index)));
                }
                Ok(())
            }
            _ => Err(SgfError::semantic(format!(
                "Property '{}': invalid point value '{}'",
                property_id, value
            ))),
        }
    }

    fn write_compressed_list(&self, items: &[CookedValue]) -> Result<Vec<String>, SgfError> {
        CookedValue::List(items.to_vec()).wire_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_of(values: &[&str]) -> Raw {
        let mut raw = Raw::new();
        for v in values {
            raw.push(v.to_string());
        }
        raw
    }

    #[test]
    fn move_parse_regular() {
        let mv = BgMove::from_wire("31ad").unwrap();
        assert!(mv.is_regular());
        assert_eq!(mv.die(0), Some(3));
        assert_eq!(mv.die(1), Some(1));
        assert_eq!(mv.steps(), &[(0, 3)]);
        assert_eq!(mv.to_wire(), "31ad");
    }

    #[test]
    fn move_parse_cube_words() {
        let double = BgMove::from_wire("double").unwrap();
        let take = BgMove::from_wire("take").unwrap();
        let drop = BgMove::from_wire("drop").unwrap();
        assert!(double.is_double() && !double.is_take() && !double.is_drop());
        assert!(take.is_take() && !take.is_double() && !take.is_drop());
        assert!(drop.is_drop() && !drop.is_double() && !drop.is_take());
    }

    #[test]
    fn move_parse_rejects_garbage() {
        for bad in ["", "3", "71ad", "31a", "31adX", "31adbecfdgeh", "doubled"] {
            assert!(
                matches!(BgMove::from_wire(bad), Err(SgfError::InvalidMove(s)) if s == bad),
                "expected InvalidMove for '{}'",
                bad
            );
        }
    }

    #[test]
    fn move_doubles_take_four_steps() {
        let mv = BgMove::from_wire("66mgmgsmsm").unwrap();
        assert_eq!(mv.steps().len(), 4);
    }

    #[test]
    fn octal_prefix_semantics() {
        assert_eq!(parse_octal_prefix("17"), 15);
        assert_eq!(parse_octal_prefix("19"), 1);
        assert_eq!(parse_octal_prefix("9"), 0);
        assert_eq!(parse_octal_prefix("0"), 0);
        assert_eq!(parse_octal_prefix("-7"), -7);
    }

    #[test]
    fn match_info_cooking() {
        let flavor = BackgammonFlavor::new();
        let cooked = flavor
            .cook_match_info(&raw_of(&["length:7", "game:2", "result:won"]))
            .unwrap();
        match cooked {
            CookedValue::MatchInfo(entries) => {
                assert_eq!(entries.get("length"), Some(&CookedValue::Number(7)));
                assert_eq!(entries.get("game"), Some(&CookedValue::Number(2)));
                assert_eq!(
                    entries.get("result"),
                    Some(&CookedValue::SimpleText("won".into()))
                );
            }
            other => panic!("expected match info, got {:?}", other),
        }
    }

    #[test]
    fn match_info_rejects_missing_colon_and_negatives() {
        let flavor = BackgammonFlavor::new();
        assert!(flavor.cook_match_info(&raw_of(&["length7"])).is_err());
        assert!(flavor.cook_match_info(&raw_of(&[":7"])).is_err());
        assert!(flavor.cook_match_info(&raw_of(&["length:-7"])).is_err());
    }

    #[test]
    fn cube_position_constrained() {
        let flavor = BackgammonFlavor::new();
        for ok in ["b", "w", "c", "n"] {
            assert!(flavor.cook_cube_position(&raw_of(&[ok])).is_ok());
        }
        let err = flavor.cook_cube_position(&raw_of(&["x"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Property 'CO': invalid cube position 'x'"
        );
        assert!(flavor.cook_cube_position(&raw_of(&["bb"])).is_err());
    }

    #[test]
    fn cube_value_powers_of_two() {
        let flavor = BackgammonFlavor::new();
        let mut power = 2i64;
        while power > 0 {
            let text = power.to_string();
            assert!(
                flavor.cook_cube_value(&raw_of(&[text.as_str()])).is_ok(),
                "power {}",
                power
            );
            power = power.wrapping_shl(1);
        }
        for bad in ["0", "1", "3", "6", "-4"] {
            assert!(flavor.cook_cube_value(&raw_of(&[bad])).is_err(), "{}", bad);
        }
        let err = flavor.cook_cube_value(&raw_of(&["5"])).unwrap_err();
        assert_eq!(err.to_string(), "Property 'CV': invalid cube value 5");
    }

    #[test]
    fn point_range_expansion() {
        let flavor = BackgammonFlavor::new();
        let mut out = Vec::new();
        flavor.append_points(&mut out, "AE", "a:d").unwrap();
        let indices: Vec<u8> = out
            .iter()
            .map(|v| match v {
                CookedValue::Point(p) => p.index(),
                _ => panic!("expected point"),
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn arrow_validation_messages() {
        let flavor = BackgammonFlavor::new();
        let err = flavor
            .cook_compose_list("AR", &raw_of(&["a:b", "c:c", "c:d"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Property 'AR': Start and end point must differ"
        );
        let err = flavor
            .cook_compose_list("AR", &raw_of(&["a:b", "c:d", "a:b"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Property 'AR': Arrows must be unique");
    }
}
