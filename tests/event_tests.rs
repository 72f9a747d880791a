//! Event tree tests: revert symmetry, idempotent failure, and the
//! forced partial-revert policy for cancelled cost payments.

use proptest::prelude::*;

use manastack::cards::{self, CardDefinition};
use manastack::{
    ActivatedAbility, CardType, ChoiceReply, Cost, Event, EventKind, Game, ManaCost, ManaSymbol,
    ObjectId, PlayerId, ScriptedSource, SubType, TraceEntry, ZoneId,
};

fn game_with(replies: Vec<ChoiceReply>, decks: Vec<Vec<CardDefinition>>) -> Game {
    Game::new(decks, 42, Box::new(ScriptedSource::new(replies)))
}

fn empty_game(replies: Vec<ChoiceReply>) -> Game {
    game_with(replies, vec![Vec::new(), Vec::new()])
}

fn put(game: &mut Game, definition: &CardDefinition, owner: PlayerId, zone: ZoneId) -> ObjectId {
    let oid = game.state.create_object(definition.instantiate(owner));
    game.state.zones.insert(oid, zone);
    game.state.recompute_characteristics();
    oid
}

fn mountain() -> CardDefinition {
    cards::basic_land("Mountain", SubType::Mountain, ManaSymbol::RED)
}

fn bear() -> CardDefinition {
    CardDefinition::new("Bear")
        .power_toughness(2, 2)
        .card_type(CardType::Creature)
}

/// An instant costing {R} with no targets and no resolution effects.
fn ritual() -> CardDefinition {
    CardDefinition::new("Ritual")
        .mana_cost(ManaCost::of(0, &[ManaSymbol::RED]))
        .card_type(CardType::Instant)
}

#[test]
fn test_tap_revert_restores_state() {
    let mut game = empty_game(vec![]);
    let oid = put(&mut game, &bear(), PlayerId::new(0), ZoneId::Battlefield);

    let mut event = Event::tap(oid);
    assert!(game.apply(&mut event));
    assert!(game.state.object(oid).unwrap().status.tapped);
    assert!(event.revertible());

    assert!(game.revert(&mut event));
    assert!(!game.state.object(oid).unwrap().status.tapped);
}

#[test]
fn test_failed_apply_never_mutates() {
    let mut game = empty_game(vec![]);
    let p0 = PlayerId::new(0);
    let oid = put(&mut game, &bear(), p0, ZoneId::Battlefield);
    game.state.object_mut(oid).unwrap().status.tapped = true;

    // Tapping an already-tapped permanent fails without effect.
    let mut tap = Event::tap(oid);
    assert!(!game.apply(&mut tap));
    assert!(game.state.object(oid).unwrap().status.tapped);
    assert!(tap.children.is_empty());

    // Drawing from an empty library fails without effect.
    let before = game.state.zones.zone(ZoneId::Hand(p0)).len();
    let mut draw = Event::draw(p0);
    assert!(!game.apply(&mut draw));
    assert_eq!(game.state.zones.zone(ZoneId::Hand(p0)).len(), before);

    // Moving from the wrong source zone fails without effect.
    let mut bad_move = Event::move_zone(oid, ZoneId::Exile, ZoneId::Battlefield);
    assert!(!game.apply(&mut bad_move));
    assert_eq!(game.state.zones.find(oid), Some(ZoneId::Battlefield));
}

#[test]
fn test_mana_ability_tree_reverts_completely() {
    let mut game = empty_game(vec![]);
    let p0 = PlayerId::new(0);
    let oid = put(&mut game, &mountain(), p0, ZoneId::Battlefield);

    let mut event = Event::activate_ability(oid, 0);
    assert!(game.apply(&mut event));
    assert!(game.state.object(oid).unwrap().status.tapped);
    assert_eq!(game.state.players[p0].mana_pool.len(), 1);
    assert!(event.revertible());

    assert!(game.revert(&mut event));
    assert!(!game.state.object(oid).unwrap().status.tapped);
    assert!(game.state.players[p0].mana_pool.is_empty());
}

#[test]
fn test_hidden_zone_move_refuses_revert() {
    let mut game = game_with(vec![], vec![vec![bear()], Vec::new()]);
    let p0 = PlayerId::new(0);

    let mut draw = Event::draw(p0);
    assert!(game.apply(&mut draw));
    assert!(!draw.revertible());

    assert!(!game.revert(&mut draw));
    // State untouched by the refused revert.
    assert_eq!(game.state.zones.zone(ZoneId::Hand(p0)).len(), 1);
    assert_eq!(
        game.trace
            .count_where(|e| matches!(e, TraceEntry::RevertRefused { .. })),
        1
    );
}

#[test]
fn test_cancelled_payment_fully_reverts() {
    // Activate tap-for-red during payment, then cancel the payment:
    // the source ends untapped and the pool empty.
    let mut game = empty_game(vec![
        ChoiceReply::Chosen(vec![0]), // pay {R}: activate the mountain
        ChoiceReply::Cancelled,       // then cancel instead of spending it
    ]);
    let p0 = PlayerId::new(0);
    let land = put(&mut game, &mountain(), p0, ZoneId::Battlefield);
    let spell = put(&mut game, &ritual(), p0, ZoneId::Hand(p0));

    assert!(!game.push_event(Event::cast_spell(spell)));

    assert_eq!(game.state.zones.find(spell), Some(ZoneId::Hand(p0)));
    assert!(!game.state.object(land).unwrap().status.tapped);
    assert!(game.state.players[p0].mana_pool.is_empty());
    assert!(game.state.zones.zone(ZoneId::Stack).is_empty());
}

#[test]
fn test_cancelled_payment_leaves_irreversible_subtree() {
    // A mana ability that also draws a card cannot be unwound: after
    // cancellation the drawn card stays, and the tap and mana beneath
    // the same irreversible subtree stay with it.
    let peak = CardDefinition::new("Scrying Peak")
        .card_type(CardType::Land)
        .sub_type(SubType::Mountain)
        .activated_ability(ActivatedAbility::mana(
            vec![Cost::tap_self()],
            vec![cards::add_mana(ManaSymbol::RED), cards::draw_cards(1)],
        ));

    let mut game = game_with(
        vec![
            ChoiceReply::Chosen(vec![0]), // pay {R}: activate the peak
            ChoiceReply::Cancelled,
        ],
        vec![vec![bear()], Vec::new()],
    );
    let p0 = PlayerId::new(0);
    let land = put(&mut game, &peak, p0, ZoneId::Battlefield);
    let spell = put(&mut game, &ritual(), p0, ZoneId::Hand(p0));

    assert!(!game.push_event(Event::cast_spell(spell)));

    // The cast itself unwound: the spell is back in hand.
    assert_eq!(game.state.zones.find(spell), Some(ZoneId::Hand(p0)));
    // The irreversible ability subtree was left committed.
    assert!(game.state.object(land).unwrap().status.tapped);
    assert!(game.state.players[p0].mana_pool.has(ManaSymbol::RED));
    assert!(game.state.zones.zone(ZoneId::Library(p0)).is_empty());
    assert_eq!(game.state.zones.zone(ZoneId::Hand(p0)).len(), 2);
    assert!(game
        .trace
        .entries()
        .any(|e| matches!(e, TraceEntry::RevertRefused { .. })));
}

#[test]
fn test_deal_damage_is_not_revertible() {
    let mut game = empty_game(vec![]);
    let oid = put(&mut game, &bear(), PlayerId::new(0), ZoneId::Battlefield);

    let mut event = Event::new(EventKind::DealDamage {
        target: manastack::TargetRef::Object(oid),
        amount: 1,
    });
    assert!(game.apply(&mut event));
    assert!(!event.revertible());
    assert!(!game.revert(&mut event));
    assert_eq!(game.state.object(oid).unwrap().status.damage, 1);
}

proptest! {
    /// Applying a chain of life events and reverting them in reverse
    /// order always lands back on the starting total.
    #[test]
    fn prop_life_events_revert_symmetrically(
        amounts in proptest::collection::vec(1..20i32, 1..10)
    ) {
        let mut game = empty_game(vec![]);
        let p0 = PlayerId::new(0);
        let start = game.state.players[p0].life;

        let mut applied = Vec::new();
        for (i, amount) in amounts.iter().enumerate() {
            let kind = if i % 2 == 0 {
                EventKind::GainLife { player: p0, amount: *amount }
            } else {
                EventKind::LoseLife { player: p0, amount: *amount }
            };
            let mut event = Event::new(kind);
            prop_assert!(game.apply(&mut event));
            applied.push(event);
        }

        for event in applied.iter_mut().rev() {
            prop_assert!(game.revert(event));
        }
        prop_assert_eq!(game.state.players[p0].life, start);
    }
}
