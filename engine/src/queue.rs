//! FIFO backlog of undecided cards.
//!
//! Unbounded on purpose: a backlog that outgrows the player is the overload
//! the simulation is about.

use std::collections::VecDeque;

use rubberstamp_types::Card;

#[derive(Debug, Clone, Default)]
pub struct DecisionQueue {
    cards: VecDeque<Card>,
}

impl DecisionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    /// The only card eligible for a decision.
    #[must_use]
    pub fn head(&self) -> Option<&Card> {
        self.cards.front()
    }

    pub fn pop_head(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}
