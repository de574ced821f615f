//! Chip denominations and the session configuration that prices them.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// The five fixed chip colors of PerColor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipColor {
    Black,
    White,
    Green,
    Red,
    Blue,
}

impl ChipColor {
    pub const ALL: [ChipColor; 5] = [
        ChipColor::Black,
        ChipColor::White,
        ChipColor::Green,
        ChipColor::Red,
        ChipColor::Blue,
    ];
}

impl std::fmt::Display for ChipColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChipColor::Black => "black",
            ChipColor::White => "white",
            ChipColor::Green => "green",
            ChipColor::Red => "red",
            ChipColor::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Non-negative chip counts per color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipBreakdown {
    pub black: u32,
    pub white: u32,
    pub green: u32,
    pub red: u32,
    pub blue: u32,
}

impl ChipBreakdown {
    pub fn count(&self, color: ChipColor) -> u32 {
        match color {
            ChipColor::Black => self.black,
            ChipColor::White => self.white,
            ChipColor::Green => self.green,
            ChipColor::Red => self.red,
            ChipColor::Blue => self.blue,
        }
    }

    pub fn with(mut self, color: ChipColor, count: u32) -> Self {
        match color {
            ChipColor::Black => self.black = count,
            ChipColor::White => self.white = count,
            ChipColor::Green => self.green = count,
            ChipColor::Red => self.red = count,
            ChipColor::Blue => self.blue = count,
        }
        self
    }

    /// Total number of chips across all colors.
    pub fn total_chips(&self) -> i64 {
        ChipColor::ALL
            .iter()
            .map(|c| i64::from(self.count(*c)))
            .sum()
    }

    /// Dollar value of the breakdown: Σ count × value. `None` on overflow.
    pub fn value(&self, values: &ColorValues) -> Option<Decimal> {
        ChipColor::ALL.iter().try_fold(Decimal::zero(), |acc, c| {
            let subtotal =
                Decimal::from_i64(i64::from(self.count(*c))).checked_mul(values.value(*c))?;
            acc.checked_add(subtotal)
        })
    }
}

/// Dollar value of one chip of each color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorValues {
    pub black: Decimal,
    pub white: Decimal,
    pub green: Decimal,
    pub red: Decimal,
    pub blue: Decimal,
}

impl ColorValues {
    pub fn value(&self, color: ChipColor) -> Decimal {
        match color {
            ChipColor::Black => self.black,
            ChipColor::White => self.white,
            ChipColor::Green => self.green,
            ChipColor::Red => self.red,
            ChipColor::Blue => self.blue,
        }
    }
}

impl Default for ColorValues {
    fn default() -> Self {
        Self {
            black: Decimal::from_i64(100),
            white: Decimal::from_i64(1),
            green: Decimal::from_i64(25),
            red: Decimal::from_i64(5),
            blue: Decimal::from_i64(10),
        }
    }
}

/// How chips are priced for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChipValueMode {
    /// Every chip is worth `stack_unit_value / chips_per_stack`.
    #[default]
    Uniform,
    /// Each color carries its own denomination.
    PerColor,
}

/// Session pricing configuration. Set once when the session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub chip_value_mode: ChipValueMode,
    /// Dollar value of one stack.
    pub stack_unit_value: Decimal,
    /// Chips in one stack.
    pub chips_per_stack: i64,
    #[serde(default)]
    pub color_values: ColorValues,
}

impl SessionConfig {
    pub fn uniform(stack_unit_value: Decimal, chips_per_stack: i64) -> Self {
        Self {
            chip_value_mode: ChipValueMode::Uniform,
            stack_unit_value,
            chips_per_stack,
            color_values: ColorValues::default(),
        }
    }

    pub fn per_color(color_values: ColorValues) -> Self {
        Self {
            chip_value_mode: ChipValueMode::PerColor,
            color_values,
            ..Self::default()
        }
    }

    /// Dollar value of a single chip in Uniform mode; zero when `chips_per_stack` is not positive.
    pub fn uniform_chip_value(&self) -> Decimal {
        if self.chips_per_stack > 0 {
            self.stack_unit_value
                .checked_div(Decimal::from_i64(self.chips_per_stack))
                .unwrap_or_default()
        } else {
            Decimal::zero()
        }
    }

    pub fn per_color_chip_values(&self) -> &ColorValues {
        &self.color_values
    }

    /// Convert a dollar amount to a chip count at the uniform rate (round half-up).
    ///
    /// Zero-valued chips convert to zero; `None` when the count leaves the i64 range.
    pub fn chips_for_amount(&self, amount: Decimal) -> Option<i64> {
        let chip_value = self.uniform_chip_value();
        if chip_value.is_zero() {
            return Some(0);
        }
        amount
            .checked_div(chip_value)
            .and_then(|chips| chips.round_half_up())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::uniform(Decimal::from_i64(20), 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_uniform_chip_value() {
        assert_eq!(SessionConfig::uniform(d("20"), 20).uniform_chip_value(), d("1"));
        assert_eq!(SessionConfig::uniform(d("100"), 100).uniform_chip_value(), d("1"));
        assert_eq!(SessionConfig::uniform(d("10"), 40).uniform_chip_value(), d("0.25"));
    }

    #[test]
    fn test_zero_chips_per_stack_prices_chips_at_zero() {
        let config = SessionConfig::uniform(d("20"), 0);
        assert!(config.uniform_chip_value().is_zero());
        assert_eq!(config.chips_for_amount(d("100")), Some(0));
    }

    #[test]
    fn test_chips_for_amount_rounds_half_up() {
        let config = SessionConfig::uniform(d("10"), 4);
        // 2.50 per chip: 6.25 / 2.5 = 2.5 chips → 3
        assert_eq!(config.chips_for_amount(d("6.25")), Some(3));
        assert_eq!(config.chips_for_amount(d("6")), Some(2));
    }

    #[test]
    fn test_chips_for_amount_out_of_range() {
        let config = SessionConfig::uniform(d("1"), 1_000_000_000);
        assert_eq!(config.chips_for_amount(d("50000000000000000000")), None);
    }

    #[test]
    fn test_breakdown_value_and_total() {
        let breakdown = ChipBreakdown::default()
            .with(ChipColor::White, 10)
            .with(ChipColor::Red, 4)
            .with(ChipColor::Black, 1);
        assert_eq!(breakdown.total_chips(), 15);
        assert_eq!(breakdown.value(&ColorValues::default()), Some(d("130")));
    }

    #[test]
    fn test_breakdown_value_overflow_is_none() {
        let huge = Decimal::from_str_canonical("50000000000000000000000000000").unwrap();
        let values = ColorValues {
            black: huge,
            ..ColorValues::default()
        };
        let breakdown = ChipBreakdown::default().with(ChipColor::Black, 2);
        assert_eq!(breakdown.value(&values), None);
    }

    #[test]
    fn test_breakdown_missing_colors_default_to_zero() {
        let breakdown: ChipBreakdown = serde_json::from_str(r#"{"green": 2}"#).unwrap();
        assert_eq!(breakdown.green, 2);
        assert_eq!(breakdown.total_chips(), 2);
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&ChipValueMode::PerColor).unwrap(),
            "\"perColor\""
        );
        assert_eq!(
            serde_json::to_string(&ChipValueMode::Uniform).unwrap(),
            "\"uniform\""
        );
    }
}
