// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-game interpretation strategies for SGF properties
//!
//! A flavor maps property identifiers to cooked value types. Flavors form a
//! single-parent chain: the Backgammon flavor handles its own identifiers
//! and delegates everything else to the base flavor (game id "0"), which
//! understands only the generic SGF data types. The registry is a lazily
//! initialized process-wide map; registration is idempotent and never
//! replaces an existing id.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::backgammon::BackgammonFlavor;
use crate::errors::SgfError;
use crate::value::{convert_charset, parse_number, parse_real, CookedValue, Emphasis, Raw};
use crate::CheckerColor;

/// Context threaded through cooking calls
#[derive(Debug, Clone)]
pub struct CookContext<'a> {
    /// Charset for text re-encoding, from the tree's `CA` property
    pub charset: &'a str,
}

impl Default for CookContext<'_> {
    fn default() -> Self {
        Self { charset: "UTF-8" }
    }
}

/// A per-game-variant interpretation strategy
pub trait Flavor: Send + Sync {
    /// Numeric game id as it appears in the `GM` property
    fn game_id(&self) -> &str;

    /// Convert one property's raw values into a cooked value
    ///
    /// `Ok(None)` means the identifier is not understood by this flavor (or
    /// its parents) and the property stays raw.
    fn cook(
        &self,
        property_id: &str,
        raw: &Raw,
        ctx: &CookContext,
    ) -> Result<Option<CookedValue>, SgfError>;

    /// Build this flavor's move value from wire text
    fn create_move(&self, text: &str) -> Result<CookedValue, SgfError>;

    /// Build this flavor's point value from a wire letter
    fn create_point(&self, letter: char) -> Result<CookedValue, SgfError>;

    /// Build this flavor's stone value from a wire letter
    fn create_stone(&self, letter: char) -> Result<CookedValue, SgfError>;

    /// Expand one wire value (single point or `a:f` range) into points
    fn append_points(
        &self,
        out: &mut Vec<CookedValue>,
        property_id: &str,
        value: &str,
    ) -> Result<(), SgfError>;

    /// Render a point/stone list with range compression
    fn write_compressed_list(&self, items: &[CookedValue]) -> Result<Vec<String>, SgfError>;
}

/// The generic SGF flavor, game id "0"
///
/// Knows the FF4 general property set typed as Number, Real, Double,
/// Color, SimpleText, Text and Compose. Has no move, point or stone types
/// of its own.
pub struct BaseFlavor;

impl BaseFlavor {
    fn cook_single<'a>(&self, property_id: &str, raw: &'a Raw) -> Result<&'a str, SgfError> {
        if raw.len() > 1 {
            return Err(SgfError::ListTooLong(property_id.to_string()));
        }
        raw.get(0).ok_or_else(|| {
            SgfError::Usage(format!("property '{}' has no value", property_id))
        })
    }

    fn cook_double(&self, property_id: &str, raw: &Raw) -> Result<CookedValue, SgfError> {
        let value = self.cook_single(property_id, raw)?;
        match value {
            "1" => Ok(CookedValue::Double(Emphasis::Normal)),
            "2" => Ok(CookedValue::Double(Emphasis::Strong)),
            other => Err(SgfError::semantic(format!(
                "Property '{}': invalid emphasis value '{}'",
                property_id, other
            ))),
        }
    }

    fn cook_color(&self, property_id: &str, raw: &Raw) -> Result<CookedValue, SgfError> {
        let value = self.cook_single(property_id, raw)?;
        match value {
            "B" => Ok(CookedValue::Color(CheckerColor::Black)),
            "W" => Ok(CookedValue::Color(CheckerColor::White)),
            other => Err(SgfError::semantic(format!(
                "Property '{}': invalid color '{}'",
                property_id, other
            ))),
        }
    }
}

impl Flavor for BaseFlavor {
    fn game_id(&self) -> &str {
        "0"
    }

    fn cook(
        &self,
        property_id: &str,
        raw: &Raw,
        ctx: &CookContext,
    ) -> Result<Option<CookedValue>, SgfError> {
        let cooked = match property_id {
            "FF" | "GM" | "ST" | "MN" | "HA" | "SZ" | "OB" | "OW" | "PM" => {
                CookedValue::Number(parse_number(self.cook_single(property_id, raw)?)?)
            }
            "V" | "TM" | "BL" | "WL" => {
                CookedValue::Real(parse_real(self.cook_single(property_id, raw)?)?)
            }
            "DM" | "GB" | "GW" | "HO" | "UC" | "BM" | "TE" => {
                self.cook_double(property_id, raw)?
            }
            "PL" => self.cook_color(property_id, raw)?,
            "C" | "GC" => {
                let text = convert_charset(self.cook_single(property_id, raw)?, ctx.charset);
                CookedValue::Text(text)
            }
            "N" | "CA" | "PB" | "PW" | "BR" | "WR" | "RE" | "DT" | "EV" | "RO" | "GN"
            | "US" | "SO" | "AN" | "CP" | "PC" | "ON" | "OT" => {
                let text = convert_charset(self.cook_single(property_id, raw)?, ctx.charset);
                CookedValue::SimpleText(text.replace('\n', " "))
            }
            "AP" => {
                let value = self.cook_single(property_id, raw)?;
                let (name, version) = split_compose(value);
                CookedValue::Compose(
                    Box::new(CookedValue::SimpleText(name)),
                    Box::new(CookedValue::SimpleText(version)),
                )
            }
            "FG" => {
                let value = self.cook_single(property_id, raw)?;
                let (number, name) = split_compose(value);
                CookedValue::Compose(
                    Box::new(CookedValue::Number(parse_number(&number)?)),
                    Box::new(CookedValue::SimpleText(name)),
                )
            }
            _ => return Ok(None),
        };
        Ok(Some(cooked))
    }

    fn create_move(&self, _text: &str) -> Result<CookedValue, SgfError> {
        Err(SgfError::Usage("base flavor has no move type".into()))
    }

    fn create_point(&self, _letter: char) -> Result<CookedValue, SgfError> {
        Err(SgfError::Usage("base flavor has no point type".into()))
    }

    fn create_stone(&self, _letter: char) -> Result<CookedValue, SgfError> {
        Err(SgfError::Usage("base flavor has no stone type".into()))
    }

    fn append_points(
        &self,
        _out: &mut Vec<CookedValue>,
        _property_id: &str,
        _value: &str,
    ) -> Result<(), SgfError> {
        Err(SgfError::Usage("base flavor has no point type".into()))
    }

    fn write_compressed_list(&self, items: &[CookedValue]) -> Result<Vec<String>, SgfError> {
        CookedValue::List(items.to_vec()).wire_values()
    }
}

/// Split a compose value at the first unescaped-at-lex-time colon
///
/// The tokenizer already resolved escapes, so by the time a value reaches
/// cooking the first colon is the separator. A value without a colon
/// composes with an empty second half.
pub(crate) fn split_compose(value: &str) -> (String, String) {
    match value.split_once(':') {
        Some((a, b)) => (a.to_string(), b.to_string()),
        None => (value.to_string(), String::new()),
    }
}

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn Flavor>>>> = Lazy::new(|| {
    let mut map: HashMap<String, Arc<dyn Flavor>> = HashMap::new();
    map.insert("0".to_string(), Arc::new(BaseFlavor));
    map.insert("6".to_string(), Arc::new(BackgammonFlavor::new()));
    RwLock::new(map)
});

/// Look up the flavor for a `GM` game id
///
/// Unregistered ids fall back to the base flavor.
pub fn flavor_for(game_id: &str) -> Arc<dyn Flavor> {
    let registry = REGISTRY.read();
    match registry.get(game_id) {
        Some(flavor) => Arc::clone(flavor),
        None => {
            tracing::debug!("no flavor registered for game id '{}', using base", game_id);
            Arc::clone(registry.get("0").expect("base flavor registered"))
        }
    }
}

/// Register a flavor under its game id
///
/// Returns false (and leaves the registry untouched) if the id is taken.
pub fn register_flavor(flavor: Arc<dyn Flavor>) -> bool {
    let mut registry = REGISTRY.write();
    match registry.entry(flavor.game_id().to_string()) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(flavor);
            true
        }
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
    fn base_flavor_numbers() {
        let ctx = CookContext::default();
        let cooked = BaseFlavor.cook("GM", &raw_of(&["6"]), &ctx).unwrap();
        assert_eq!(cooked, Some(CookedValue::Number(6)));
    }

    #[test]
    fn base_flavor_rejects_multi_values_for_single() {
        let ctx = CookContext::default();
        let err = BaseFlavor.cook("GM", &raw_of(&["6", "1"]), &ctx).unwrap_err();
        assert!(matches!(err, SgfError::ListTooLong(id) if id == "GM"));
    }

    #[test]
    fn base_flavor_unknown_stays_raw() {
        let ctx = CookContext::default();
        let cooked = BaseFlavor.cook("XX", &raw_of(&["zzz"]), &ctx).unwrap();
        assert!(cooked.is_none());
    }

    #[test]
    fn registry_falls_back_to_base() {
        assert_eq!(flavor_for("6").game_id(), "6");
        assert_eq!(flavor_for("99").game_id(), "0");
    }

    #[test]
    fn registration_is_idempotent() {
        // The backgammon id is taken by initialization; re-registering is a no-op.
        assert!(!register_flavor(Arc::new(BackgammonFlavor::new())));
    }

    #[test]
    fn simpletext_collapses_whitespace() {
        let ctx = CookContext::default();
        let cooked = BaseFlavor
            .cook("PB", &raw_of(&["two\nlines"]), &ctx)
            .unwrap();
        assert_eq!(cooked, Some(CookedValue::SimpleText("two lines".into())));
    }
}
