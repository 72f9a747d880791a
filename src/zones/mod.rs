//! Zones: ordered, membership-indexed containers of object ids.
//!
//! A `Zone` is an ordered sequence (front = index 0) plus a set for O(1)
//! membership tests. The battlefield, the stack, exile, and each player's
//! library, hand, and graveyard are all `Zone`s, addressed by `ZoneId`.
//!
//! `ZoneSet` owns every zone in a game and maintains the reverse index
//! from object to zone. All engine-level moves go through
//! `ZoneSet::transfer`, which removes and re-adds atomically so an object
//! is never in two zones at once.
//!
//! ## Empty-zone contract
//!
//! `get` and `pop` on an empty zone return `None`; they are defined
//! no-ops, not errors. `remove` of an absent object is the error case
//! (`ZoneError::NotPresent`). Inserting an object that is already present
//! is an invariant violation and panics.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::core::{GameRng, ObjectId, PlayerId, PlayerMap, ZoneError};

/// Identifies one zone in a game.
///
/// Battlefield, stack, and exile are shared; libraries, hands, and
/// graveyards are per-player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    Battlefield,
    Stack,
    Exile,
    Library(PlayerId),
    Hand(PlayerId),
    Graveyard(PlayerId),
}

impl ZoneId {
    /// Hidden zones make moves through them irreversible: once a card
    /// leaves or enters a library, its position is information a revert
    /// would have to un-reveal.
    #[must_use]
    pub fn is_hidden(self) -> bool {
        matches!(self, ZoneId::Library(_))
    }

    /// The owning player, for per-player zones.
    #[must_use]
    pub fn owner(self) -> Option<PlayerId> {
        match self {
            ZoneId::Library(p) | ZoneId::Hand(p) | ZoneId::Graveyard(p) => Some(p),
            _ => None,
        }
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneId::Battlefield => write!(f, "battlefield"),
            ZoneId::Stack => write!(f, "stack"),
            ZoneId::Exile => write!(f, "exile"),
            ZoneId::Library(p) => write!(f, "library[{}]", p.0),
            ZoneId::Hand(p) => write!(f, "hand[{}]", p.0),
            ZoneId::Graveyard(p) => write!(f, "graveyard[{}]", p.0),
        }
    }
}

/// An ordered, membership-indexed container of object ids.
///
/// Index 0 is the front: the top of a library or stack. All mutating
/// operations are O(1) amortized except indexed insertion and `remove`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    order: Vec<ObjectId>,
    members: FxHashSet<ObjectId>,
}

impl Zone {
    /// Create an empty zone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in the zone.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the zone holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// O(1) membership test.
    #[must_use]
    pub fn has(&self, oid: ObjectId) -> bool {
        self.members.contains(&oid)
    }

    /// Get the object at `index` (0 = front), or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ObjectId> {
        self.order.get(index).copied()
    }

    /// Add to the front.
    ///
    /// Panics if the object is already in the zone.
    pub fn push(&mut self, oid: ObjectId) {
        self.add(oid, 0);
    }

    /// Remove and return the front object, or `None` if empty.
    pub fn pop(&mut self) -> Option<ObjectId> {
        if self.order.is_empty() {
            return None;
        }
        let oid = self.order.remove(0);
        self.members.remove(&oid);
        Some(oid)
    }

    /// Insert at `index` (0 = front; past-the-end clamps to back).
    ///
    /// Panics if the object is already in the zone.
    pub fn add(&mut self, oid: ObjectId, index: usize) {
        if !self.members.insert(oid) {
            panic!("{} is already in this zone", oid);
        }
        let index = index.min(self.order.len());
        self.order.insert(index, oid);
    }

    /// Remove a specific object.
    pub fn remove(&mut self, oid: ObjectId) -> Result<(), ZoneError> {
        if !self.members.remove(&oid) {
            return Err(ZoneError::NotPresent);
        }
        let pos = self
            .order
            .iter()
            .position(|&o| o == oid)
            .expect("membership index out of sync with order");
        self.order.remove(pos);
        Ok(())
    }

    /// Uniform random permutation of the zone's order.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.order);
    }

    /// Iterate front-to-back.
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.order.iter().copied()
    }
}

/// Every zone in a game, plus the object-to-zone reverse index.
#[derive(Clone, Debug)]
pub struct ZoneSet {
    battlefield: Zone,
    stack: Zone,
    exile: Zone,
    libraries: PlayerMap<Zone>,
    hands: PlayerMap<Zone>,
    graveyards: PlayerMap<Zone>,
    locations: FxHashMap<ObjectId, ZoneId>,
}

impl ZoneSet {
    /// Create the zone set for a game with `player_count` players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            battlefield: Zone::new(),
            stack: Zone::new(),
            exile: Zone::new(),
            libraries: PlayerMap::with_default(player_count),
            hands: PlayerMap::with_default(player_count),
            graveyards: PlayerMap::with_default(player_count),
            locations: FxHashMap::default(),
        }
    }

    /// Borrow a zone by id.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> &Zone {
        match id {
            ZoneId::Battlefield => &self.battlefield,
            ZoneId::Stack => &self.stack,
            ZoneId::Exile => &self.exile,
            ZoneId::Library(p) => &self.libraries[p],
            ZoneId::Hand(p) => &self.hands[p],
            ZoneId::Graveyard(p) => &self.graveyards[p],
        }
    }

    fn zone_mut(&mut self, id: ZoneId) -> &mut Zone {
        match id {
            ZoneId::Battlefield => &mut self.battlefield,
            ZoneId::Stack => &mut self.stack,
            ZoneId::Exile => &mut self.exile,
            ZoneId::Library(p) => &mut self.libraries[p],
            ZoneId::Hand(p) => &mut self.hands[p],
            ZoneId::Graveyard(p) => &mut self.graveyards[p],
        }
    }

    /// The zone an object currently occupies, if any.
    #[must_use]
    pub fn find(&self, oid: ObjectId) -> Option<ZoneId> {
        self.locations.get(&oid).copied()
    }

    /// True if the object is in the given zone.
    #[must_use]
    pub fn is_in(&self, oid: ObjectId, id: ZoneId) -> bool {
        self.find(oid) == Some(id)
    }

    /// Place an object that is not in any zone.
    ///
    /// Panics if the object is already somewhere: an object may be a
    /// member of at most one zone at a time.
    pub fn insert(&mut self, oid: ObjectId, id: ZoneId) {
        if let Some(existing) = self.locations.get(&oid) {
            panic!("{} is already in {}", oid, existing);
        }
        self.locations.insert(oid, id);
        self.zone_mut(id).push(oid);
    }

    /// Move an object between zones: remove then add, atomically.
    ///
    /// The caller (the move-zone event) has already validated that the
    /// object actually is in `from`.
    pub fn transfer(&mut self, oid: ObjectId, from: ZoneId, to: ZoneId) -> Result<(), ZoneError> {
        if self.find(oid) != Some(from) {
            return Err(ZoneError::NotPresent);
        }
        self.zone_mut(from)
            .remove(oid)
            .expect("location index out of sync with zone");
        self.zone_mut(to).push(oid);
        self.locations.insert(oid, to);
        Ok(())
    }

    /// Remove an object from play entirely (object deletion).
    pub fn remove(&mut self, oid: ObjectId) -> Result<ZoneId, ZoneError> {
        let id = self.locations.remove(&oid).ok_or(ZoneError::NotPresent)?;
        self.zone_mut(id)
            .remove(oid)
            .expect("location index out of sync with zone");
        Ok(id)
    }

    /// Shuffle a zone's order.
    pub fn shuffle(&mut self, id: ZoneId, rng: &mut GameRng) {
        self.zone_mut(id).shuffle(rng);
    }

    /// Total number of objects tracked across all zones.
    #[must_use]
    pub fn total_objects(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_zone_defined_noops() {
        let mut zone = Zone::new();

        assert_eq!(zone.get(0), None);
        assert_eq!(zone.pop(), None);
        assert!(zone.is_empty());
    }

    #[test]
    fn test_push_pop_front() {
        let mut zone = Zone::new();
        zone.push(ObjectId::new(1));
        zone.push(ObjectId::new(2));

        // Front is the most recent push.
        assert_eq!(zone.get(0), Some(ObjectId::new(2)));
        assert_eq!(zone.pop(), Some(ObjectId::new(2)));
        assert_eq!(zone.pop(), Some(ObjectId::new(1)));
        assert_eq!(zone.pop(), None);
    }

    #[test]
    fn test_indexed_add() {
        let mut zone = Zone::new();
        zone.push(ObjectId::new(1));
        zone.push(ObjectId::new(2));
        // Order: [2, 1]

        zone.add(ObjectId::new(3), 1);
        let order: Vec<_> = zone.iter().collect();
        assert_eq!(
            order,
            vec![ObjectId::new(2), ObjectId::new(3), ObjectId::new(1)]
        );

        // Past-the-end clamps to back.
        zone.add(ObjectId::new(4), 99);
        assert_eq!(zone.get(3), Some(ObjectId::new(4)));
    }

    #[test]
    fn test_remove_absent_errors() {
        let mut zone = Zone::new();
        zone.push(ObjectId::new(1));

        assert_eq!(zone.remove(ObjectId::new(9)), Err(ZoneError::NotPresent));
        assert_eq!(zone.remove(ObjectId::new(1)), Ok(()));
        assert!(!zone.has(ObjectId::new(1)));
    }

    #[test]
    #[should_panic(expected = "already in this zone")]
    fn test_duplicate_add_panics() {
        let mut zone = Zone::new();
        zone.push(ObjectId::new(1));
        zone.push(ObjectId::new(1));
    }

    #[test]
    fn test_shuffle_permutes() {
        let mut zone = Zone::new();
        for i in 0..20 {
            zone.push(ObjectId::new(i));
        }
        let before: Vec<_> = zone.iter().collect();

        let mut rng = GameRng::new(42);
        zone.shuffle(&mut rng);

        let after: Vec<_> = zone.iter().collect();
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
        for oid in before {
            assert!(zone.has(oid));
        }
    }

    #[test]
    fn test_zone_set_insert_and_find() {
        let mut zones = ZoneSet::new(2);
        let oid = ObjectId::new(5);

        zones.insert(oid, ZoneId::Hand(PlayerId::new(0)));

        assert_eq!(zones.find(oid), Some(ZoneId::Hand(PlayerId::new(0))));
        assert!(zones.is_in(oid, ZoneId::Hand(PlayerId::new(0))));
        assert_eq!(zones.total_objects(), 1);
    }

    #[test]
    fn test_zone_set_transfer_exclusivity() {
        let mut zones = ZoneSet::new(2);
        let oid = ObjectId::new(5);
        let hand = ZoneId::Hand(PlayerId::new(0));

        zones.insert(oid, hand);
        zones.transfer(oid, hand, ZoneId::Battlefield).unwrap();

        assert!(!zones.zone(hand).has(oid));
        assert!(zones.zone(ZoneId::Battlefield).has(oid));
        assert_eq!(zones.find(oid), Some(ZoneId::Battlefield));
    }

    #[test]
    fn test_zone_set_transfer_wrong_source() {
        let mut zones = ZoneSet::new(2);
        let oid = ObjectId::new(5);
        zones.insert(oid, ZoneId::Exile);

        let result = zones.transfer(oid, ZoneId::Battlefield, ZoneId::Stack);
        assert_eq!(result, Err(ZoneError::NotPresent));
        // Unchanged on failure.
        assert_eq!(zones.find(oid), Some(ZoneId::Exile));
    }

    #[test]
    #[should_panic(expected = "already in")]
    fn test_zone_set_double_insert_panics() {
        let mut zones = ZoneSet::new(2);
        let oid = ObjectId::new(5);
        zones.insert(oid, ZoneId::Exile);
        zones.insert(oid, ZoneId::Battlefield);
    }

    #[test]
    fn test_zone_set_remove() {
        let mut zones = ZoneSet::new(2);
        let oid = ObjectId::new(5);
        zones.insert(oid, ZoneId::Stack);

        assert_eq!(zones.remove(oid), Ok(ZoneId::Stack));
        assert_eq!(zones.find(oid), None);
        assert_eq!(zones.remove(oid), Err(ZoneError::NotPresent));
    }

    #[test]
    fn test_hidden_zones() {
        assert!(ZoneId::Library(PlayerId::new(0)).is_hidden());
        assert!(!ZoneId::Hand(PlayerId::new(0)).is_hidden());
        assert!(!ZoneId::Battlefield.is_hidden());
    }

    #[test]
    fn test_zone_serde() {
        let mut zone = Zone::new();
        zone.push(ObjectId::new(1));
        zone.push(ObjectId::new(2));

        let json = serde_json::to_string(&zone).unwrap();
        let back: Zone = serde_json::from_str(&json).unwrap();
        assert_eq!(zone, back);
    }
}
