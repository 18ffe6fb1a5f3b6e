//! Held inventory: user-entered material counts.

use crate::{Material, MaterialId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Raw user input for a held-quantity field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawQuantity<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for RawQuantity<'a> {
    fn from(s: &'a str) -> Self {
        RawQuantity::Text(s)
    }
}

impl From<f64> for RawQuantity<'_> {
    fn from(v: f64) -> Self {
        RawQuantity::Number(v)
    }
}

impl From<i64> for RawQuantity<'_> {
    fn from(v: i64) -> Self {
        RawQuantity::Number(v as f64)
    }
}

/// Coerce raw input to a non-negative whole quantity.
///
/// Text is read like a leading integer: surrounding whitespace is ignored and
/// digits after the first non-digit are dropped, so `"12abc"` is 12 and
/// `"3e2"` is 3. Numbers are floored. Anything negative, non-numeric, NaN or
/// infinite becomes 0.
pub fn coerce_quantity(raw: RawQuantity<'_>) -> u64 {
    match raw {
        RawQuantity::Text(s) => leading_integer(s),
        RawQuantity::Number(v) if v.is_finite() && v > 0.0 => {
            // `as` saturates at u64::MAX for very large values
            v.floor() as u64
        }
        RawQuantity::Number(_) => 0,
    }
}

fn leading_integer(s: &str) -> u64 {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if negative {
        return 0;
    }
    rest.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d - b'0')))
}

/// Mapping material → held quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<MaterialId, u64>);

impl Inventory {
    /// Every known material at 0.
    pub fn zeroed(materials: &[Material]) -> Self {
        Self(materials.iter().map(|m| (m.id.clone(), 0)).collect())
    }

    /// Held quantity; materials without an entry hold 0.
    pub fn held(&self, id: &MaterialId) -> u64 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// Store `quantity` for `id`. Returns `false` and leaves the map untouched
    /// when the value is unchanged.
    pub fn set_held(&mut self, id: &MaterialId, quantity: u64) -> bool {
        if self.held(id) == quantity {
            return false;
        }
        self.0.insert(id.clone(), quantity);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MaterialId, u64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a persisted inventory. Any JSON number is accepted and coerced
    /// like user input; `null` reads as 0.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<MaterialId, Option<f64>> = serde_json::from_str(text)?;
        Ok(Self(
            raw.into_iter()
                .map(|(k, v)| (k, v.map_or(0, |v| coerce_quantity(RawQuantity::Number(v)))))
                .collect(),
        ))
    }
}

impl FromIterator<(MaterialId, u64)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (MaterialId, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::line;
    use proptest::prelude::*;

    #[test]
    fn coercion_clamps_invalid_input() {
        assert_eq!(coerce_quantity("12".into()), 12);
        assert_eq!(coerce_quantity(" 7 ".into()), 7);
        assert_eq!(coerce_quantity("abc".into()), 0);
        assert_eq!(coerce_quantity("".into()), 0);
        assert_eq!(coerce_quantity("-4".into()), 0);
        assert_eq!(coerce_quantity(3.9.into()), 3);
        assert_eq!(coerce_quantity("3.9".into()), 3);
        assert_eq!(coerce_quantity(f64::NAN.into()), 0);
        assert_eq!(coerce_quantity(f64::INFINITY.into()), 0);
        assert_eq!(coerce_quantity((-2i64).into()), 0);
    }

    #[test]
    fn text_reads_leading_integer() {
        assert_eq!(coerce_quantity("12abc".into()), 12);
        assert_eq!(coerce_quantity("3e2".into()), 3);
        assert_eq!(coerce_quantity("+5".into()), 5);
        assert_eq!(coerce_quantity("  42\n".into()), 42);
        assert_eq!(coerce_quantity("-0".into()), 0);
        assert_eq!(coerce_quantity("x12".into()), 0);
        assert_eq!(coerce_quantity("99999999999999999999999".into()), u64::MAX);
    }

    #[test]
    fn zeroed_covers_every_material() {
        let inv = Inventory::zeroed(&line().materials);
        assert_eq!(inv.to_json().unwrap(), r#"{"ore":0,"token":0}"#);
    }

    #[test]
    fn set_held_reports_changes_only() {
        let mut inv = Inventory::zeroed(&line().materials);
        assert!(!inv.set_held(&"ore".into(), 0));
        assert!(inv.set_held(&"ore".into(), 5));
        assert!(!inv.set_held(&"ore".into(), 5));
        assert_eq!(inv.held(&"ore".into()), 5);
        assert_eq!(inv.held(&"unknown".into()), 0);
    }

    #[test]
    fn persisted_values_are_coerced() {
        let inv = Inventory::from_json(r#"{"ore":-3,"token":2.5,"extra":4}"#).unwrap();
        assert_eq!(inv.held(&"ore".into()), 0);
        assert_eq!(inv.held(&"token".into()), 2);
        assert_eq!(inv.held(&"extra".into()), 4);
        assert!(Inventory::from_json(r#"{"ore":"lots"}"#).is_err());
        assert!(Inventory::from_json("[1,2]").is_err());
    }

    #[test]
    fn null_entries_read_as_zero() {
        let inv = Inventory::from_json(r#"{"ore":null,"x":3}"#).unwrap();
        assert_eq!(inv.held(&"ore".into()), 0);
        assert_eq!(inv.held(&"x".into()), 3);
        assert_eq!(inv.to_json().unwrap(), r#"{"ore":0,"x":3}"#);
    }

    proptest! {
        #[test]
        fn coerced_text_matches_integer(n in 0u32..1_000_000) {
            prop_assert_eq!(coerce_quantity(n.to_string().as_str().into()), n as u64);
        }

        #[test]
        fn inventory_roundtrips(values in proptest::collection::btree_map("[a-z]{1,8}", 0u64..1_000_000, 0..16)) {
            let inv: Inventory = values.into_iter().map(|(k, v)| (MaterialId(k), v)).collect();
            let back = Inventory::from_json(&inv.to_json().unwrap()).unwrap();
            prop_assert_eq!(back, inv);
        }
    }
}
