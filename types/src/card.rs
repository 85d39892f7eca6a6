//! Decision cards: synthetic fulfillment orders produced by the agents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CardId;

/// Address shown when a `Data` anomaly corrupts the address field.
pub const INVALID_ADDRESS: &str = "NULL_POINTER_EXCEPTION";

/// Due date shown when a `Data` anomaly corrupts the date field (Feb 31).
pub const INVALID_DUE_DATE: &str = "2025-02-31";

/// Category of anomaly injected into a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Total does not match price times quantity.
    Logic,
    /// Quantity rescaled into an incompatible unit.
    Unit,
    /// Calendar-invalid date or sentinel address.
    Data,
}

pub const ERROR_KINDS: [ErrorKind; 3] = [ErrorKind::Logic, ErrorKind::Unit, ErrorKind::Data];

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logic => "logic",
            Self::Unit => "unit",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Units,
    Liters,
    Milliliters,
    SquareMeters,
    Kilograms,
}

impl Unit {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::Liters => "L",
            Self::Milliliters => "mL",
            Self::SquareMeters => "m²",
            Self::Kilograms => "kg",
        }
    }

    /// The unit a `Unit` anomaly swaps this one for. Liters become
    /// milliliters; everything else becomes a mass.
    #[must_use]
    pub const fn mismatched(self) -> Self {
        match self {
            Self::Liters => Self::Milliliters,
            _ => Self::Kilograms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: u32,
    pub unit: Unit,
}

impl Quantity {
    #[must_use]
    pub const fn new(amount: u32, unit: Unit) -> Self {
        Self { amount, unit }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit.symbol())
    }
}

/// A single order awaiting an approve/reject decision.
///
/// Immutable once generated. At most one anomaly is present, recorded in
/// `error`; `None` means the card is clean and should be approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub customer_ref: String,
    pub address: String,
    pub item_name: String,
    pub quantity: Quantity,
    pub total_amount: u64,
    /// ISO `YYYY-MM-DD`. Not guaranteed to be a real calendar date.
    pub due_date: String,
    /// Local wall-clock time the card was produced, `HH:MM:SS`.
    pub spawned_at: String,
    #[serde(rename = "errorKind")]
    pub error: Option<ErrorKind>,
}

impl Card {
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub fn has_invalid_address(&self) -> bool {
        self.address == INVALID_ADDRESS
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardId, ErrorKind, Quantity, Unit};

    fn card(error: Option<ErrorKind>) -> Card {
        Card {
            id: CardId::new(7),
            customer_ref: "ORD-42".to_string(),
            address: "Lindenweg 3, 10115 Berlin, DE".to_string(),
            item_name: "Bio-Synth Gel".to_string(),
            quantity: Quantity::new(12, Unit::Liters),
            total_amount: 600,
            due_date: "2026-10-21".to_string(),
            spawned_at: "09:15:00".to_string(),
            error,
        }
    }

    #[test]
    fn quantity_displays_amount_and_symbol() {
        assert_eq!(Quantity::new(12, Unit::Liters).to_string(), "12 L");
        assert_eq!(Quantity::new(3, Unit::SquareMeters).to_string(), "3 m²");
        assert_eq!(Quantity::new(12000, Unit::Milliliters).to_string(), "12000 mL");
    }

    #[test]
    fn mismatched_unit_swaps_liquids_to_milliliters_and_rest_to_mass() {
        assert_eq!(Unit::Liters.mismatched(), Unit::Milliliters);
        assert_eq!(Unit::Units.mismatched(), Unit::Kilograms);
        assert_eq!(Unit::SquareMeters.mismatched(), Unit::Kilograms);
    }

    #[test]
    fn error_kind_serializes_for_consumers() {
        let clean = serde_json::to_value(card(None)).expect("serialize");
        assert_eq!(clean["errorKind"], serde_json::Value::Null);
        assert_eq!(clean["customerRef"], "ORD-42");

        let flagged = serde_json::to_value(card(Some(ErrorKind::Unit))).expect("serialize");
        assert_eq!(flagged["errorKind"], "unit");
        assert!(card(Some(ErrorKind::Logic)).has_error());
        assert!(!card(None).has_error());
    }
}
