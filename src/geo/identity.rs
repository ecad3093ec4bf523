//! Stable identities and ISO codes for rendered country features.

use super::CountryFeature;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Property fields holding a three-letter country code, in precedence order.
///
/// `ISO_A3` is `-99` for several countries in Natural Earth data (France,
/// Norway, Kosovo, ...), which is why the alternates matter.
pub const ISO_FIELDS: &[&str] = &["ISO_A3", "ISO_A3_EH", "ADM0_A3", "SOV_A3", "GU_A3", "BRK_A3"];

/// Property fields holding a display name, in precedence order.
pub const NAME_FIELDS: &[&str] = &["ADMIN", "NAME_EN", "NAME"];

/// Placeholder code used by boundary datasets for "no code".
const NO_CODE: &str = "-99";

/// Uppercase three-letter country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsoCode(String);

impl IsoCode {
    /// Normalizes a raw code (trimmed, uppercased). Returns None for blank
    /// input and for the `-99` placeholder.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NO_CODE {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IsoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the country code of a feature, trying [`ISO_FIELDS`] in order.
pub fn feature_iso(feature: &CountryFeature) -> Option<IsoCode> {
    ISO_FIELDS
        .iter()
        .filter_map(|field| feature.property(field))
        .find_map(IsoCode::parse)
}

/// Returns the display name of a feature, or `"Unknown"`.
pub fn feature_name(feature: &CountryFeature) -> &str {
    NAME_FIELDS
        .iter()
        .filter_map(|field| feature.property(field))
        .find(|name| !name.trim().is_empty())
        .unwrap_or("Unknown")
}

/// Keys already handed out in the current render pass.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    seen: HashSet<String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `key`, appending `_dup` until it is unique within this pass.
    fn reserve(&mut self, mut key: String) -> String {
        while self.seen.contains(&key) {
            key.push_str("_dup");
        }
        self.seen.insert(key.clone());
        key
    }
}

/// Identity of one rendered feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Key unique within a render pass
    pub key: String,
    /// Country code used for selection, if the feature has one
    pub iso: Option<IsoCode>,
}

/// Derives the identity of the feature drawn at `render_index`.
pub fn identify(
    feature: &CountryFeature,
    render_index: usize,
    seen: &mut KeyRegistry,
) -> Identity {
    let iso = feature_iso(feature);

    let base = match &iso {
        Some(code) => code.as_str(),
        None => NAME_FIELDS
            .iter()
            .filter_map(|field| feature.property(field))
            .find(|name| !name.is_empty())
            .unwrap_or("UNK"),
    };
    let id = feature.id.as_deref().unwrap_or("x");

    let key = seen.reserve(format!("{}-{}-{}", base, id, render_index));
    Identity { key, iso }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_fixtures::{lon_lat_box, props};
    use geo_types::MultiPolygon;

    fn feature_with(id: Option<&str>, pairs: &[(&str, &str)]) -> CountryFeature {
        CountryFeature::new(
            id.map(str::to_string),
            MultiPolygon(vec![lon_lat_box(0.0, 0.0, 1.0, 1.0)]),
            props(pairs),
        )
    }

    #[test]
    fn test_placeholder_code_is_ignored() {
        assert_eq!(feature_iso(&feature_with(None, &[("ISO_A3", "-99")])), None);
    }

    #[test]
    fn test_code_is_trimmed() {
        let iso = feature_iso(&feature_with(None, &[("ISO_A3", " USA ")]));
        assert_eq!(iso.as_ref().map(IsoCode::as_str), Some("USA"));
    }

    #[test]
    fn test_precedence_order() {
        let feature = feature_with(
            None,
            &[("ISO_A3", "-99"), ("ADM0_A3", "NOR"), ("ISO_A3_EH", "  "), ("SOV_A3", "NOX")],
        );
        assert_eq!(feature_iso(&feature).unwrap().as_str(), "NOR");
    }

    #[test]
    fn test_no_code_at_all() {
        assert_eq!(feature_iso(&feature_with(None, &[("ADMIN", "Nowhere")])), None);
    }

    #[test]
    fn test_name_fallbacks() {
        assert_eq!(feature_name(&feature_with(None, &[("NAME_EN", "Atlantis")])), "Atlantis");
        assert_eq!(feature_name(&feature_with(None, &[])), "Unknown");
    }

    #[test]
    fn test_key_format() {
        let mut seen = KeyRegistry::new();
        let feature = feature_with(Some("804"), &[("ISO_A3", "UKR")]);
        let identity = identify(&feature, 3, &mut seen);
        assert_eq!(identity.key, "UKR-804-3");
        assert_eq!(identity.iso.unwrap().as_str(), "UKR");

        let unnamed = feature_with(None, &[("ISO_A3", "-99")]);
        assert_eq!(identify(&unnamed, 0, &mut seen).key, "UNK-x-0");
    }

    #[test]
    fn test_duplicate_keys_are_disambiguated() {
        let mut seen = KeyRegistry::new();
        let unknown = feature_with(None, &[("ISO_A3", "-99"), ("ADMIN", "Unknown")]);

        let a = identify(&unknown, 0, &mut seen);
        let b = identify(&unknown, 0, &mut seen);
        let c = identify(&unknown, 0, &mut seen);

        assert_eq!(a.key, "Unknown-x-0");
        assert_eq!(b.key, "Unknown-x-0_dup");
        assert_eq!(c.key, "Unknown-x-0_dup_dup");
    }

    #[test]
    fn test_unique_within_a_pass() {
        let mut seen = KeyRegistry::new();
        let duplicates: Vec<CountryFeature> = (0..5)
            .map(|_| feature_with(None, &[("ISO_A3", "-99"), ("ADMIN", "Unknown")]))
            .collect();

        let keys: HashSet<String> = duplicates
            .iter()
            .enumerate()
            .map(|(i, f)| identify(f, i % 2, &mut seen).key)
            .collect();
        assert_eq!(keys.len(), duplicates.len());
    }
}
