//! Object and player identification.
//!
//! Every game object (card, token, transient ability object) is addressed
//! by an `ObjectId`: a dense index into the game's object arena. Slots are
//! never recycled, so an `ObjectId` observed anywhere in the engine refers
//! to the same object for the lifetime of the game.
//!
//! Players are addressed separately by `PlayerId` (0-based seat order),
//! with `PlayerMap` providing O(1) per-player storage.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Handle to a game object in the object arena.
///
/// Compared and hashed by value; owns no data itself. An id is only
/// meaningful against the arena that allocated it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Create an object id from a raw arena index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw arena index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Player identifier supporting 1-255 players.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The next player in turn order, wrapping at `player_count`.
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        Self(((self.0 as usize + 1) % player_count) as u8)
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// Backed by a `Vec<T>` with one entry per player, indexed by `PlayerId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    ///
    /// The factory receives the `PlayerId` for each player.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Iterate over `(PlayerId, &T)` pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, t)| (PlayerId(i as u8), t))
    }

    /// Iterate mutably over `(PlayerId, &mut T)` pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, t)| (PlayerId(i as u8), t))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id() {
        let id = ObjectId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(format!("{}", id), "Object(7)");
    }

    #[test]
    fn test_object_id_ordering() {
        assert!(ObjectId::new(1) < ObjectId::new(2));
        assert_eq!(ObjectId::new(3), ObjectId::new(3));
    }

    #[test]
    fn test_player_next_wraps() {
        assert_eq!(PlayerId::new(0).next(2), PlayerId::new(1));
        assert_eq!(PlayerId::new(1).next(2), PlayerId::new(0));
        assert_eq!(PlayerId::new(3).next(4), PlayerId::new(0));
    }

    #[test]
    fn test_player_all() {
        let players: Vec<_> = PlayerId::all(3).collect();
        assert_eq!(
            players,
            vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]
        );
    }

    #[test]
    fn test_player_map_index() {
        let mut life: PlayerMap<i32> = PlayerMap::new(4, |_| 20);
        assert_eq!(life[PlayerId::new(0)], 20);

        life[PlayerId::new(1)] = 15;
        assert_eq!(life[PlayerId::new(1)], 15);
    }

    #[test]
    fn test_player_map_iter() {
        let map: PlayerMap<usize> = PlayerMap::new(3, |p| p.index() * 10);
        let collected: Vec<_> = map.iter().map(|(p, v)| (p.index(), *v)).collect();
        assert_eq!(collected, vec![(0, 0), (1, 10), (2, 20)]);
    }

    #[test]
    fn test_serialization() {
        let id = ObjectId::new(123);
        let json = serde_json::to_string(&id).unwrap();
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
