//! Mana: colors, symbols, costs, and pools.
//!
//! A `Color` is a bitmask over the five basic colors. A `ManaSymbol`
//! wraps one color mask: zero set bits is generic mana, one bit is a
//! colored symbol, and two or more bits form a hybrid symbol payable by
//! any of its component colors.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Color bitmask. `Color::NONE` is colorless/generic.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Color(pub u8);

impl Color {
    pub const NONE: Color = Color(0);
    pub const WHITE: Color = Color(1);
    pub const BLUE: Color = Color(1 << 1);
    pub const BLACK: Color = Color(1 << 2);
    pub const RED: Color = Color(1 << 3);
    pub const GREEN: Color = Color(1 << 4);

    /// The five basic colors in WUBRG order.
    pub const BASICS: [Color; 5] = [
        Color::WHITE,
        Color::BLUE,
        Color::BLACK,
        Color::RED,
        Color::GREEN,
    ];

    /// Union of two masks.
    #[must_use]
    pub const fn union(self, other: Color) -> Color {
        Color(self.0 | other.0)
    }

    /// Remove `other`'s bits from this mask.
    #[must_use]
    pub const fn difference(self, other: Color) -> Color {
        Color(self.0 & !other.0)
    }

    /// Check whether every bit of `other` is set in this mask.
    #[must_use]
    pub const fn contains(self, other: Color) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of basic colors in this mask.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// True if no color bits are set.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Single-letter symbol for a basic color, `"1"` for generic.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Color::NONE => "1",
            Color::WHITE => "W",
            Color::BLUE => "U",
            Color::BLACK => "B",
            Color::RED => "R",
            Color::GREEN => "G",
            _ => "H",
        }
    }
}

/// A single mana symbol.
///
/// Generic symbols (no color) are payable by any mana. Colored symbols
/// are payable only by their color. Hybrid symbols (more than one color
/// bit) are payable by any of their component colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaSymbol(pub Color);

impl ManaSymbol {
    pub const GENERIC: ManaSymbol = ManaSymbol(Color::NONE);
    pub const WHITE: ManaSymbol = ManaSymbol(Color::WHITE);
    pub const BLUE: ManaSymbol = ManaSymbol(Color::BLUE);
    pub const BLACK: ManaSymbol = ManaSymbol(Color::BLACK);
    pub const RED: ManaSymbol = ManaSymbol(Color::RED);
    pub const GREEN: ManaSymbol = ManaSymbol(Color::GREEN);

    /// Create a symbol for the given color mask.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self(color)
    }

    /// The symbol's color mask.
    #[must_use]
    pub const fn color(self) -> Color {
        self.0
    }

    /// Converted cost contribution. Every symbol is worth one.
    #[must_use]
    pub const fn cmc(self) -> u32 {
        1
    }

    /// True if the symbol has at least one color bit.
    #[must_use]
    pub const fn is_colored(self) -> bool {
        !self.0.is_none()
    }

    /// Can `pool_mana` (a 0- or 1-color pool symbol) pay for this symbol?
    ///
    /// Generic symbols accept anything; colored and hybrid symbols accept
    /// mana of any of their component colors.
    ///
    /// Panics if `pool_mana` has more than one color bit: the pool only
    /// ever holds 0- or 1-color symbols.
    #[must_use]
    pub fn can_be_paid_by(self, pool_mana: ManaSymbol) -> bool {
        assert!(
            pool_mana.0.count() <= 1,
            "Mana being spent must have at most one color"
        );
        if self.0.is_none() {
            return true;
        }
        self.0.contains(pool_mana.0) && !pool_mana.0.is_none()
    }
}

impl std::fmt::Display for ManaSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.symbol())
    }
}

/// A bag of mana symbols forming a cost (or a mana production amount).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaCost {
    symbols: SmallVec<[ManaSymbol; 8]>,
}

impl ManaCost {
    /// Empty cost.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cost of `generic` generic symbols plus the given colored symbols.
    #[must_use]
    pub fn of(generic: u32, colored: &[ManaSymbol]) -> Self {
        let mut symbols = SmallVec::new();
        for _ in 0..generic {
            symbols.push(ManaSymbol::GENERIC);
        }
        symbols.extend_from_slice(colored);
        Self { symbols }
    }

    /// Converted mana cost: the sum of every symbol's contribution.
    #[must_use]
    pub fn cmc(&self) -> u32 {
        self.symbols.iter().map(|s| s.cmc()).sum()
    }

    /// Color identity: the union of every symbol's colors.
    #[must_use]
    pub fn identity(&self) -> Color {
        self.symbols
            .iter()
            .fold(Color::NONE, |acc, s| acc.union(s.color()))
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if there are no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate the symbols in cost order.
    pub fn iter(&self) -> impl Iterator<Item = ManaSymbol> + '_ {
        self.symbols.iter().copied()
    }

    /// Combine two costs.
    #[must_use]
    pub fn plus(&self, other: &ManaCost) -> ManaCost {
        let mut symbols = self.symbols.clone();
        symbols.extend(other.symbols.iter().copied());
        Self { symbols }
    }

    /// Per-color saturating subtraction: for each distinct color mask,
    /// the result keeps `count(self) - count(other)` symbols, floored at
    /// zero.
    #[must_use]
    pub fn minus(&self, other: &ManaCost) -> ManaCost {
        let mut symbols: SmallVec<[ManaSymbol; 8]> = SmallVec::new();
        let mut masks: Vec<Color> = self.symbols.iter().map(|s| s.color()).collect();
        masks.sort();
        masks.dedup();

        for mask in masks {
            let mine = self.symbols.iter().filter(|s| s.color() == mask).count();
            let theirs = other.symbols.iter().filter(|s| s.color() == mask).count();
            for _ in 0..mine.saturating_sub(theirs) {
                symbols.push(ManaSymbol::new(mask));
            }
        }
        Self { symbols }
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generic: u32 = self
            .symbols
            .iter()
            .filter(|s| !s.is_colored())
            .map(|s| s.cmc())
            .sum();
        if generic > 0 {
            write!(f, "{{{}}}", generic)?;
        }
        for symbol in self.symbols.iter().filter(|s| s.is_colored()) {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

/// A player's mana pool.
///
/// Holds 0- or 1-color symbols only; hybrid mana is resolved to a single
/// color before it is added. Emptied at the end of every phase.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    symbols: SmallVec<[ManaSymbol; 8]>,
}

impl ManaPool {
    /// Empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one symbol to the pool.
    ///
    /// Panics if the symbol has more than one color bit.
    pub fn add(&mut self, mana: ManaSymbol) {
        assert!(
            mana.color().count() <= 1,
            "Only 0-1 color mana can be added to a mana pool"
        );
        self.symbols.push(mana);
    }

    /// Remove one matching symbol. Returns false if none is present.
    pub fn remove(&mut self, mana: ManaSymbol) -> bool {
        if let Some(pos) = self.symbols.iter().position(|&s| s == mana) {
            self.symbols.remove(pos);
            true
        } else {
            false
        }
    }

    /// True if a matching symbol is in the pool.
    #[must_use]
    pub fn has(&self, mana: ManaSymbol) -> bool {
        self.symbols.contains(&mana)
    }

    /// Number of symbols in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate the pooled symbols.
    pub fn iter(&self) -> impl Iterator<Item = ManaSymbol> + '_ {
        self.symbols.iter().copied()
    }

    /// The pool symbols able to pay for `symbol`, deduplicated.
    #[must_use]
    pub fn payment_options(&self, symbol: ManaSymbol) -> Vec<ManaSymbol> {
        let mut options: Vec<ManaSymbol> = Vec::new();
        for &pooled in &self.symbols {
            if symbol.can_be_paid_by(pooled) && !options.contains(&pooled) {
                options.push(pooled);
            }
        }
        options
    }

    /// Discard all mana.
    pub fn empty(&mut self) {
        self.symbols.clear();
    }
}
