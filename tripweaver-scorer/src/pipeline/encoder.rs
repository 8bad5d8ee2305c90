//! One-hot encoding of the primary category.

use serde::{Deserialize, Serialize};

/// One-hot encoder that drops the first category as the reference level.
///
/// Categories are sorted before the first is dropped, so the encoding does
/// not depend on corpus order. Unseen categories encode to all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryEncoder {
    levels: Vec<String>,
}

impl CategoryEncoder {
    /// Learn the category levels from `categories`.
    pub fn fit<'a, I>(categories: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: Vec<String> = categories.into_iter().map(str::to_owned).collect();
        seen.sort_unstable();
        seen.dedup();
        let levels = seen.into_iter().skip(1).collect();
        Self { levels }
    }

    /// Number of output columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.levels.len()
    }

    /// Encoded levels in column order.
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Append the encoding of `category` to `out`.
    pub fn encode_into(&self, category: &str, out: &mut Vec<f64>) {
        out.extend(
            self.levels
                .iter()
                .map(|level| if level == category { 1.0 } else { 0.0 }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn drops_first_sorted_level() {
        let encoder = CategoryEncoder::fit(["park", "museum", "restaurant", "park"]);
        assert_eq!(encoder.levels(), ["park", "restaurant"]);
    }

    #[rstest]
    #[case("museum", vec![0.0, 0.0])]
    #[case("park", vec![1.0, 0.0])]
    #[case("casino", vec![0.0, 0.0])]
    fn encodes_known_reference_and_unseen(#[case] category: &str, #[case] expected: Vec<f64>) {
        let encoder = CategoryEncoder::fit(["museum", "park", "restaurant"]);
        let mut out = Vec::new();
        encoder.encode_into(category, &mut out);
        assert_eq!(out, expected);
    }
}
