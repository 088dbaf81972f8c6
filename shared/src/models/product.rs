//! Product master models

use serde::{Deserialize, Serialize};

use crate::types::SkuId;

/// Descriptive metadata for a SKU from the product master
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuMeta {
    pub sku_id: SkuId,
    pub display_name: String,
    pub rank: Rank,
    pub discontinued: bool,
}

impl SkuMeta {
    pub fn new(sku_id: SkuId, display_name: impl Into<String>, rank: Rank) -> Self {
        Self {
            sku_id,
            display_name: display_name.into(),
            rank,
            discontinued: false,
        }
    }

    /// A product with no usable name cannot be reviewed by a buyer
    pub fn is_identified(&self) -> bool {
        !self.display_name.trim().is_empty()
    }
}

/// Coarse SKU classification driving safety margins and lot policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
    A,
    B,
    C,
    Test,
    /// Missing or unrecognized label
    #[default]
    Unclassified,
}

impl Rank {
    pub const ALL: [Rank; 5] = [Rank::A, Rank::B, Rank::C, Rank::Test, Rank::Unclassified];

    /// Normalize a free-text rank label from the product master.
    ///
    /// Accepts `"A"`, `"Aランク"`, `"a rank"`, full-width `"Ａ"`, `"TEST"` and
    /// `"テスト"`. Anything else, including a missing label, is
    /// [`Rank::Unclassified`].
    pub fn normalize(label: Option<&str>) -> Rank {
        let Some(label) = label else {
            return Rank::Unclassified;
        };

        let folded: String = label.trim().chars().map(fold_full_width).collect();
        let lowered = folded.to_lowercase();
        let mut core = lowered.as_str().trim();
        for affix in ["ランク", "rank"] {
            core = core.strip_suffix(affix).unwrap_or(core).trim();
            core = core.strip_prefix(affix).unwrap_or(core).trim();
        }

        match core {
            "a" => Rank::A,
            "b" => Rank::B,
            "c" => Rank::C,
            "test" | "テスト" => Rank::Test,
            _ => Rank::Unclassified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::Test => "TEST",
            Rank::Unclassified => "UNCLASSIFIED",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Map full-width ASCII variants (U+FF01..U+FF5E) to plain ASCII
fn fold_full_width(c: char) -> char {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_letters() {
        assert_eq!(Rank::normalize(Some("A")), Rank::A);
        assert_eq!(Rank::normalize(Some("b")), Rank::B);
        assert_eq!(Rank::normalize(Some(" C ")), Rank::C);
    }

    #[test]
    fn test_normalize_japanese_labels() {
        assert_eq!(Rank::normalize(Some("Aランク")), Rank::A);
        assert_eq!(Rank::normalize(Some("Bランク")), Rank::B);
        assert_eq!(Rank::normalize(Some("ランクC")), Rank::C);
        assert_eq!(Rank::normalize(Some("Ａランク")), Rank::A);
        assert_eq!(Rank::normalize(Some("テスト")), Rank::Test);
    }

    #[test]
    fn test_normalize_english_variants() {
        assert_eq!(Rank::normalize(Some("A rank")), Rank::A);
        assert_eq!(Rank::normalize(Some("Rank B")), Rank::B);
        assert_eq!(Rank::normalize(Some("TEST")), Rank::Test);
        assert_eq!(Rank::normalize(Some("test")), Rank::Test);
    }

    #[test]
    fn test_normalize_defaults_to_unclassified() {
        assert_eq!(Rank::normalize(None), Rank::Unclassified);
        assert_eq!(Rank::normalize(Some("")), Rank::Unclassified);
        assert_eq!(Rank::normalize(Some("D")), Rank::Unclassified);
        assert_eq!(Rank::normalize(Some("新規")), Rank::Unclassified);
    }

    #[test]
    fn test_identified() {
        let sku = SkuId::parse("1").unwrap();
        assert!(SkuMeta::new(sku.clone(), "Green tea 500ml", Rank::A).is_identified());
        assert!(!SkuMeta::new(sku, "  ", Rank::A).is_identified());
    }
}
