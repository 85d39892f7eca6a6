//! Synthetic order generation with controlled error injection.
//!
//! Cards are plausible fulfillment orders. A fraction of them carries exactly
//! one anomaly; the fraction ramps from 10% to 40% over the first
//! [`ERROR_RAMP_CARDS`] cards of a game.

use chrono::{Days, Local, NaiveDateTime};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use rubberstamp_types::{
    Card, CardId, ERROR_KINDS, ErrorKind, INVALID_ADDRESS, INVALID_DUE_DATE, Quantity, Unit,
};

pub const BASE_ERROR_RATE: f64 = 0.1;
pub const ERROR_RATE_RAMP: f64 = 0.3;
pub const ERROR_RAMP_CARDS: u64 = 20;

const MAX_QUANTITY: u32 = 50;
const MAX_DUE_OFFSET_DAYS: u64 = 9;
const UNIT_ERROR_SCALE: u32 = 1000;

/// Something that can produce the next card for the decision queue.
///
/// `spawned_so_far` is the number of cards produced earlier in the same game.
pub trait CardSource {
    fn next_card(&mut self, id: CardId, spawned_so_far: u64) -> Card;
}

#[derive(Debug, Clone, Copy)]
struct CatalogItem {
    name: &'static str,
    unit_price: u64,
    unit: Unit,
}

const CATALOG: [CatalogItem; 4] = [
    CatalogItem {
        name: "Quantum Chip",
        unit_price: 1200,
        unit: Unit::Units,
    },
    CatalogItem {
        name: "Bio-Synth Gel",
        unit_price: 50,
        unit: Unit::Liters,
    },
    CatalogItem {
        name: "Neural Link",
        unit_price: 2500,
        unit: Unit::Units,
    },
    CatalogItem {
        name: "Graphene Sheet",
        unit_price: 10,
        unit: Unit::SquareMeters,
    },
];

const DE_STREETS: [&str; 5] = [
    "Hauptstr.",
    "Berliner Allee",
    "Gartenstr.",
    "Lindenweg",
    "Dorfstr.",
];
const DE_CITIES: [&str; 5] = ["Berlin", "München", "Hamburg", "Köln", "Frankfurt"];
const US_STREETS: [&str; 5] = ["Main St", "Broadway", "Park Ave", "Elm St", "Sunset Blvd"];
const US_CITIES: [&str; 5] = [
    "New York, NY",
    "San Francisco, CA",
    "Austin, TX",
    "Seattle, WA",
    "Miami, FL",
];

/// Probability that the card after `spawned_so_far` earlier cards carries an
/// anomaly: `0.1 + 0.3 * min(1, n / 20)`.
#[must_use]
pub fn error_probability(spawned_so_far: u64) -> f64 {
    let progress = (spawned_so_far as f64 / ERROR_RAMP_CARDS as f64).min(1.0);
    BASE_ERROR_RATE + ERROR_RATE_RAMP * progress
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Card generator over an injectable random source and clock.
#[derive(Debug, Clone)]
pub struct CardGenerator<R = SmallRng> {
    rng: R,
    clock: fn() -> NaiveDateTime,
}

impl CardGenerator<SmallRng> {
    /// Deterministic card stream for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(SmallRng::from_os_rng())
    }
}

impl<R: Rng> CardGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            clock: local_now,
        }
    }

    /// Replace the wall clock used for due dates and spawn timestamps.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn generate(&mut self, id: CardId, spawned_so_far: u64) -> Card {
        let error = self.roll_error(spawned_so_far);

        let item = CATALOG[self.rng.random_range(0..CATALOG.len())];
        let amount = self.rng.random_range(1..=MAX_QUANTITY);
        let nominal_total = item.unit_price * u64::from(amount);

        let now = (self.clock)();
        let offset = Days::new(self.rng.random_range(0..=MAX_DUE_OFFSET_DAYS));
        let due = now.date().checked_add_days(offset).unwrap_or(now.date());

        let mut quantity = Quantity::new(amount, item.unit);
        let mut total_amount = nominal_total;
        let mut due_date = due.format("%Y-%m-%d").to_string();
        let mut address = self.address();

        match error {
            Some(ErrorKind::Logic) => total_amount = nominal_total / 2,
            Some(ErrorKind::Unit) => {
                quantity = Quantity::new(amount * UNIT_ERROR_SCALE, item.unit.mismatched());
            }
            Some(ErrorKind::Data) => {
                if self.rng.random_bool(0.5) {
                    due_date = INVALID_DUE_DATE.to_string();
                } else {
                    address = INVALID_ADDRESS.to_string();
                }
            }
            None => {}
        }

        Card {
            id,
            customer_ref: format!("ORD-{}", self.rng.random_range(0..10_000)),
            address,
            item_name: item.name.to_string(),
            quantity,
            total_amount,
            due_date,
            spawned_at: now.format("%H:%M:%S").to_string(),
            error,
        }
    }

    fn roll_error(&mut self, spawned_so_far: u64) -> Option<ErrorKind> {
        if self.rng.random::<f64>() >= error_probability(spawned_so_far) {
            return None;
        }
        Some(ERROR_KINDS[self.rng.random_range(0..ERROR_KINDS.len())])
    }

    fn address(&mut self) -> String {
        let zip = self.rng.random_range(10_000..=99_999);
        if self.rng.random_bool(0.5) {
            let street = DE_STREETS[self.rng.random_range(0..DE_STREETS.len())];
            let number = self.rng.random_range(1..=100);
            let city = DE_CITIES[self.rng.random_range(0..DE_CITIES.len())];
            format!("{street} {number}, {zip} {city}, DE")
        } else {
            let number = self.rng.random_range(100..9_100);
            let street = US_STREETS[self.rng.random_range(0..US_STREETS.len())];
            let city = US_CITIES[self.rng.random_range(0..US_CITIES.len())];
            format!("{number} {street}, {city} {zip}, USA")
        }
    }
}

impl<R: Rng> CardSource for CardGenerator<R> {
    fn next_card(&mut self, id: CardId, spawned_so_far: u64) -> Card {
        self.generate(id, spawned_so_far)
    }
}
