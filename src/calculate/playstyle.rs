//! Playstyle dimensions and label classification.

use crate::models::{Category, CategoryBreakdown, PlaystyleProfile, StyleLabel};

/// A label and the dimensions it requires among the top two.
#[derive(Debug, Clone, Copy)]
pub struct StyleRule {
    pub keys: &'static [Category],
    pub label: StyleLabel,
}

/// Label rules in priority order. Two-key rules come first.
pub const STYLE_RULES: [StyleRule; 13] = [
    StyleRule {
        keys: &[Category::Battlefield, Category::Combat],
        label: StyleLabel::IronFist,
    },
    StyleRule {
        keys: &[Category::Combat, Category::Economy],
        label: StyleLabel::Tactician,
    },
    StyleRule {
        keys: &[Category::Teamwork, Category::Battlefield],
        label: StyleLabel::TeamCore,
    },
    StyleRule {
        keys: &[Category::Strategy, Category::Battlefield],
        label: StyleLabel::ObjHunter,
    },
    StyleRule {
        keys: &[Category::Battlefield, Category::Firepower],
        label: StyleLabel::Frontliner,
    },
    StyleRule {
        keys: &[Category::Economy, Category::Teamwork],
        label: StyleLabel::Logistics,
    },
    StyleRule {
        keys: &[Category::Firepower, Category::Combat],
        label: StyleLabel::Berserker,
    },
    StyleRule {
        keys: &[Category::Battlefield],
        label: StyleLabel::Dominator,
    },
    StyleRule {
        keys: &[Category::Combat],
        label: StyleLabel::Efficient,
    },
    StyleRule {
        keys: &[Category::Teamwork],
        label: StyleLabel::Collaborator,
    },
    StyleRule {
        keys: &[Category::Strategy],
        label: StyleLabel::PointRush,
    },
    StyleRule {
        keys: &[Category::Firepower],
        label: StyleLabel::HeavyFire,
    },
    StyleRule {
        keys: &[Category::Economy],
        label: StyleLabel::Economist,
    },
];

/// Turn summed per-match style ratios into 0-100 dimensions.
///
/// Each dimension is the mean ratio scaled by 50, rounded and clamped.
/// A ratio of 1 (exactly the match average) maps to 50.
pub fn dimensions(ratio_sums: &CategoryBreakdown, matches: usize) -> CategoryBreakdown {
    let n = matches.max(1) as f64;
    ratio_sums.map(|sum| (sum / n * 50.0).round().clamp(0.0, 100.0))
}

/// Pick the label for a set of dimensions.
///
/// Dimensions are ranked descending; equal values keep category order.
pub fn classify(dimensions: &CategoryBreakdown) -> StyleLabel {
    let mut ranked: Vec<(Category, f64)> = dimensions.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top: Vec<Category> = ranked.iter().take(2).map(|(c, _)| *c).collect();

    let pair = STYLE_RULES
        .iter()
        .filter(|rule| rule.keys.len() == 2)
        .find(|rule| rule.keys.iter().all(|k| top.contains(k)));
    if let Some(rule) = pair {
        return rule.label;
    }

    STYLE_RULES
        .iter()
        .filter(|rule| rule.keys.len() == 1)
        .find(|rule| top.first() == rule.keys.first())
        .map_or(StyleLabel::Balanced, |rule| rule.label)
}

/// Dimensions and label from summed style ratios.
pub fn profile(ratio_sums: &CategoryBreakdown, matches: usize) -> PlaystyleProfile {
    let dimensions = dimensions(ratio_sums, matches);
    PlaystyleProfile::new(dimensions, classify(&dimensions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(values: [f64; 6]) -> CategoryBreakdown {
        CategoryBreakdown {
            battlefield: values[0],
            combat: values[1],
            economy: values[2],
            teamwork: values[3],
            strategy: values[4],
            firepower: values[5],
        }
    }

    #[test]
    fn test_two_key_rule_wins_over_single() {
        let d = dims([90.0, 85.0, 50.0, 40.0, 30.0, 20.0]);
        assert_eq!(classify(&d), StyleLabel::IronFist);
    }

    #[test]
    fn test_pair_order_does_not_matter() {
        let d = dims([40.0, 70.0, 10.0, 10.0, 10.0, 95.0]);
        assert_eq!(classify(&d), StyleLabel::Berserker);
    }

    #[test]
    fn test_single_key_fallback_uses_top_dimension() {
        // strategy + economy has no pair rule
        let d = dims([10.0, 10.0, 60.0, 10.0, 80.0, 10.0]);
        assert_eq!(classify(&d), StyleLabel::PointRush);
    }

    #[test]
    fn test_ties_keep_category_order() {
        let d = CategoryBreakdown::uniform(50.0);
        // battlefield and combat rank first
        assert_eq!(classify(&d), StyleLabel::IronFist);
    }

    #[test]
    fn test_rule_table_shape() {
        assert_eq!(STYLE_RULES.iter().filter(|r| r.keys.len() == 2).count(), 7);
        assert_eq!(STYLE_RULES.iter().filter(|r| r.keys.len() == 1).count(), 6);
        for category in Category::ALL {
            assert!(STYLE_RULES
                .iter()
                .any(|r| r.keys == [category].as_slice()));
        }
    }

    #[test]
    fn test_dimensions_scale_and_clamp() {
        let sums = dims([12.0, 6.0, 0.0, 30.0, 5.0, 6.6]);
        let d = dimensions(&sums, 6);

        assert_eq!(d.battlefield, 100.0);
        assert_eq!(d.combat, 50.0);
        assert_eq!(d.economy, 0.0);
        assert_eq!(d.teamwork, 100.0);
        assert_eq!(d.strategy, 42.0);
        assert_eq!(d.firepower, 55.0);
    }

    #[test]
    fn test_profile() {
        let p = profile(&CategoryBreakdown::uniform(3.0), 3);
        assert_eq!(p.dimensions, CategoryBreakdown::uniform(50.0));
        assert_eq!(p.label, StyleLabel::IronFist);
        assert_eq!(p.label_name, "Iron Fist");
    }
}
