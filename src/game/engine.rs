//! The game controller.
//!
//! `Game` couples a `GameState` with a decision source and the trace
//! bus, and owns the two algorithms everything else hangs off:
//!
//! - **Event application.** `apply` runs an event's own action, records
//!   spawned children on the node, and scans for triggered abilities
//!   after every success. A composite that fails mid-way unwinds its
//!   already-applied children before reporting failure, so a failed
//!   apply leaves no partial effects (irreversible children excepted,
//!   which the trace records).
//!
//! - **The turn/priority/stack machine.** Each `step` recomputes
//!   characteristics, offers the priority player one choice, and feeds
//!   the outcome to the pass-count logic: all players passing resolves
//!   the stack top, or ends the phase when the stack is empty.

use crate::abilities::{DeclaredTarget, TargetRef};
use crate::core::{AbilityObjectKind, ActionError, GameObject, ObjectId, PlayerId};
use crate::events::{CostKind, Event, EventKind, PendingTrigger, RevertPolicy, TriggerOrigin, Undo};
use crate::game::choice::{
    ChoiceItem, ChoiceReply, ChoiceRequest, DecisionSource, ManaPaymentOption, PriorityAction,
};
use crate::game::state::GameState;
use crate::game::trace::{TraceBus, TraceEntry};
use crate::game::turn::Phase;
use crate::zones::ZoneId;

/// A running game: state, decision source, trace.
pub struct Game {
    pub state: GameState,
    pub trace: TraceBus,
    decisions: Box<dyn DecisionSource>,
    choice_open: bool,
    pass_count: usize,
    /// Deepest failure cause of the action in flight, for `take_action`.
    last_error: Option<ActionError>,
}

impl Game {
    /// Create a game from one deck per player.
    ///
    /// Cards are instantiated into their owners' libraries, unshuffled;
    /// call `start` to shuffle and draw opening hands.
    #[must_use]
    pub fn new(
        decks: Vec<Vec<crate::cards::CardDefinition>>,
        seed: u64,
        decisions: Box<dyn DecisionSource>,
    ) -> Self {
        let player_count = decks.len();
        let mut state = GameState::new(player_count, seed);

        for (seat, deck) in decks.into_iter().enumerate() {
            let player = PlayerId::new(seat as u8);
            for definition in deck {
                let object = definition.instantiate(player);
                let oid = state.create_object(object);
                state.zones.insert(oid, ZoneId::Library(player));
            }
        }

        Self {
            state,
            trace: TraceBus::new(),
            decisions,
            choice_open: false,
            pass_count: 0,
            last_error: None,
        }
    }

    /// Record the deepest failure cause of the current action.
    fn note_failure(&mut self, error: ActionError) {
        self.last_error.get_or_insert(error);
    }

    /// Shuffle libraries, draw opening hands, begin the first phase.
    pub fn start(&mut self) {
        let player_count = self.state.player_count();
        for player in PlayerId::all(player_count) {
            let state = &mut self.state;
            state.zones.shuffle(ZoneId::Library(player), &mut state.rng);
        }
        for player in PlayerId::all(player_count) {
            self.push_event(Event::draw_many(player, 7));
        }
        self.start_current_phase();
        self.state_check();
    }

    // === Event application ===

    /// Apply a root event, dropping the tree afterwards.
    pub fn push_event(&mut self, mut event: Event) -> bool {
        self.apply(&mut event)
    }

    /// Apply a root event, keeping the tree (for later revert).
    pub fn apply(&mut self, event: &mut Event) -> bool {
        self.apply_event(event, 0)
    }

    /// Revert an applied event tree under its own policy. Returns false
    /// if a strict revert was refused because the subtree is
    /// irreversible; state is then left as-is.
    pub fn revert(&mut self, event: &mut Event) -> bool {
        self.revert_event(event)
    }

    fn apply_event(&mut self, event: &mut Event, depth: usize) -> bool {
        let name = event.kind.name();
        let ok = self.apply_action(event, depth);
        if ok {
            self.trace.push(TraceEntry::Applied { name, depth });
            self.scan_triggers(event, depth);
        } else {
            self.trace.push(TraceEntry::Failed { name, depth });
        }
        ok
    }

    /// Apply `child`, recording it on `parent` when it succeeds. The
    /// child inherits the parent's source unless it has its own.
    fn apply_child(&mut self, parent: &mut Event, mut child: Event, depth: usize) -> bool {
        if child.source.is_none() {
            child.source = parent.source;
        }
        let ok = self.apply_event(&mut child, depth + 1);
        if ok {
            parent.children.push(child);
        }
        ok
    }

    /// Unwind every recorded child, newest first. Children revert under
    /// their own policies; irreversible subtrees refuse and are left in
    /// place (the trace records the refusal).
    fn revert_children(&mut self, event: &mut Event) {
        for child in event.children.iter_mut().rev() {
            let _ = self.revert_event(child);
        }
        event.children.clear();
    }

    fn revert_event(&mut self, event: &mut Event) -> bool {
        match event.revert_policy() {
            RevertPolicy::Strict => {
                if !event.revertible() {
                    self.trace
                        .push(TraceEntry::RevertRefused { name: event.kind.name() });
                    return false;
                }
                self.revert_subtree(event);
                true
            }
            RevertPolicy::Forced => {
                self.revert_children(event);
                self.revert_action(event);
                true
            }
        }
    }

    /// Revert a fully-revertible subtree: children in reverse order,
    /// then the node's own action.
    fn revert_subtree(&mut self, event: &mut Event) {
        for child in event.children.iter_mut().rev() {
            self.revert_subtree(child);
        }
        event.children.clear();
        self.revert_action(event);
    }

    fn revert_action(&mut self, event: &mut Event) {
        let undo = event.undo;
        match event.kind.clone() {
            EventKind::Tap { object } => {
                if let Some(o) = self.state.object_mut(object) {
                    o.status.tapped = false;
                }
            }
            EventKind::Untap { object } => {
                if let Some(o) = self.state.object_mut(object) {
                    o.status.tapped = true;
                }
            }
            EventKind::AddMana { player, mana } => {
                self.state.players[player].mana_pool.remove(mana);
            }
            EventKind::RemoveMana { player, mana } => {
                self.state.players[player].mana_pool.add(mana);
            }
            EventKind::MoveZone { object, from, to } => {
                if undo == Undo::Moved {
                    self.state
                        .zones
                        .transfer(object, to, from)
                        .expect("reverting a move the engine made");
                }
            }
            EventKind::GainLife { player, amount } => {
                self.state.players[player].life -= amount;
            }
            EventKind::LoseLife { player, amount } => {
                self.state.players[player].life += amount;
            }
            EventKind::MarkDamage { object, amount } => {
                if let Some(o) = self.state.object_mut(object) {
                    o.status.damage -= amount;
                }
            }
            EventKind::DeclareTarget { holder, slot } => {
                if undo == Undo::Declared {
                    if let Some(o) = self.state.object_mut(holder) {
                        o.declared_targets[slot].reset();
                    }
                }
            }
            EventKind::GenerateAbilityObject { .. } => {
                if let Undo::Created(oid) = undo {
                    self.state.delete_object(oid);
                }
            }
            EventKind::PushPendingTrigger { trigger } => {
                self.state.pending_triggers.retain(|t| *t != trigger);
            }
            EventKind::AddContinuousEffect { .. } => {
                if let Undo::EffectAdded(index) = undo {
                    self.state.effects.remove(index);
                }
            }
            // Composites have no action of their own.
            _ => {}
        }
        event.undo = Undo::None;
        self.trace.push(TraceEntry::Reverted {
            name: event.kind.name(),
        });
    }

    fn apply_action(&mut self, event: &mut Event, depth: usize) -> bool {
        match event.kind.clone() {
            EventKind::Tap { object } => {
                if !self.state.zones.is_in(object, ZoneId::Battlefield) {
                    return false;
                }
                let Some(o) = self.state.object_mut(object) else {
                    return false;
                };
                if o.status.tapped {
                    return false;
                }
                o.status.tapped = true;
                true
            }

            EventKind::Untap { object } => {
                if !self.state.zones.is_in(object, ZoneId::Battlefield) {
                    return false;
                }
                let Some(o) = self.state.object_mut(object) else {
                    return false;
                };
                if !o.status.tapped {
                    return false;
                }
                o.status.tapped = false;
                true
            }

            EventKind::AddMana { player, mana } => {
                self.state.players[player].mana_pool.add(mana);
                true
            }

            EventKind::RemoveMana { player, mana } => {
                self.state.players[player].mana_pool.remove(mana)
            }

            EventKind::MoveZone { object, from, to } => {
                if from == to {
                    return false;
                }
                if self.state.zones.find(object) != Some(from) {
                    return false;
                }
                if to == ZoneId::Battlefield {
                    let permanent = self
                        .state
                        .object(object)
                        .is_some_and(|o| o.computed.is_permanent());
                    if !permanent {
                        // Zone-change replacement: the object stays put.
                        event.undo = Undo::MoveDenied;
                        self.trace.push(TraceEntry::MoveDenied { object });
                        return true;
                    }
                }
                self.state
                    .zones
                    .transfer(object, from, to)
                    .expect("move preconditions already checked");
                event.undo = Undo::Moved;
                true
            }

            EventKind::GainLife { player, amount } => {
                if amount <= 0 {
                    return false;
                }
                self.state.players[player].life += amount;
                true
            }

            EventKind::LoseLife { player, amount } => {
                if amount <= 0 {
                    return false;
                }
                self.state.players[player].life -= amount;
                true
            }

            EventKind::MarkDamage { object, amount } => {
                if amount <= 0 {
                    return false;
                }
                if !self.state.zones.is_in(object, ZoneId::Battlefield) {
                    return false;
                }
                let Some(o) = self.state.object_mut(object) else {
                    return false;
                };
                o.status.damage += amount;
                true
            }

            EventKind::DealDamage { target, amount } => {
                if amount <= 0 {
                    return false;
                }
                match target {
                    TargetRef::Player(player) => self.apply_child(
                        event,
                        Event::new(EventKind::LoseLife { player, amount }),
                        depth,
                    ),
                    TargetRef::Object(object) => self.apply_child(
                        event,
                        Event::new(EventKind::MarkDamage { object, amount }),
                        depth,
                    ),
                }
            }

            EventKind::Draw { player } => {
                let library = ZoneId::Library(player);
                let hand = ZoneId::Hand(player);
                let Some(top) = self.state.zones.zone(library).get(0) else {
                    return false;
                };
                self.apply_child(event, Event::move_zone(top, library, hand), depth)
            }

            EventKind::DrawMany { player, count } => {
                let mut all = true;
                for _ in 0..count {
                    if !self.apply_child(event, Event::draw(player), depth) {
                        all = false;
                    }
                }
                all
            }

            EventKind::Discard { object } => {
                let Some(zone) = self.state.zones.find(object) else {
                    return false;
                };
                let ZoneId::Hand(owner) = zone else {
                    return false;
                };
                self.apply_child(
                    event,
                    Event::move_zone(object, zone, ZoneId::Graveyard(owner)),
                    depth,
                )
            }

            EventKind::DiscardMany { player, count } => {
                if count == 0 {
                    return true;
                }
                let hand: Vec<ObjectId> = self.state.zones.zone(ZoneId::Hand(player)).iter().collect();
                if hand.len() < count {
                    return false;
                }
                let items: Vec<ChoiceItem> = hand.iter().map(|&o| ChoiceItem::Object(o)).collect();
                let request = ChoiceRequest::pick_one(format!("Discard {} card(s)", count), items)
                    .with_bounds(count, count);
                let Some(indices) = self.request_choice(request) else {
                    return false;
                };
                let mut all = true;
                for index in indices {
                    let object = hand[index];
                    if !self.apply_child(event, Event::new(EventKind::Discard { object }), depth) {
                        all = false;
                    }
                }
                all
            }

            EventKind::PlayLand => {
                let Some(source) = event.source else {
                    return false;
                };
                let Some(zone) = self.state.zones.find(source) else {
                    return false;
                };
                self.apply_child(
                    event,
                    Event::move_zone(source, zone, ZoneId::Battlefield),
                    depth,
                )
            }

            EventKind::DeclareTarget { holder, slot } => {
                let Some(object) = self.state.object(holder) else {
                    return false;
                };
                if object
                    .declared_targets
                    .get(slot)
                    .is_some_and(|t| t.declared)
                {
                    panic!("target slot {} of {} is already declared", slot, holder);
                }
                let Some(spec) = object.target_spec(slot) else {
                    return false;
                };

                let mut options: Vec<TargetRef> = Vec::new();
                let ability_source = event.source;
                for (oid, _) in self.state.objects() {
                    if oid == holder || Some(oid) == ability_source {
                        continue;
                    }
                    let target = TargetRef::Object(oid);
                    if spec.predicate.matches(&self.state, target) {
                        options.push(target);
                    }
                }
                for player in PlayerId::all(self.state.player_count()) {
                    let target = TargetRef::Player(player);
                    if spec.predicate.matches(&self.state, target) {
                        options.push(target);
                    }
                }
                if options.len() < spec.min {
                    self.note_failure(ActionError::TargetNotDeclared);
                    return false;
                }

                let items: Vec<ChoiceItem> =
                    options.iter().map(|&t| ChoiceItem::Target(t)).collect();
                let request = ChoiceRequest::pick_one("Choose targets", items)
                    .with_bounds(spec.min, spec.max)
                    .cancellable();
                let Some(indices) = self.request_choice(request) else {
                    self.note_failure(ActionError::Cancelled);
                    return false;
                };

                let chosen: Vec<TargetRef> = indices.into_iter().map(|i| options[i]).collect();
                let o = self
                    .state
                    .object_mut(holder)
                    .expect("target holder vanished mid-declaration");
                o.declared_targets[slot] = DeclaredTarget {
                    chosen,
                    declared: true,
                };
                event.undo = Undo::Declared;
                true
            }

            EventKind::PushPendingTrigger { trigger } => {
                if self.state.pending_triggers.contains(&trigger) {
                    panic!("trigger of {} is already pending", trigger.source);
                }
                self.state.pending_triggers.push(trigger);
                true
            }

            EventKind::GenerateAbilityObject {
                kind,
                controller,
                resolution,
            } => {
                let Some(source) = event.source else {
                    return false;
                };
                let object = GameObject::ability(source, controller, kind, resolution);
                let oid = self.state.create_object(object);
                self.state.zones.insert(oid, ZoneId::Stack);
                event.undo = Undo::Created(oid);
                true
            }

            EventKind::AddContinuousEffect { effect } => {
                let index = self.state.effects.len();
                self.state.effects.push(effect);
                event.undo = Undo::EffectAdded(index);
                true
            }

            EventKind::CastSpell => {
                let Some(source) = event.source else {
                    return false;
                };
                let Some(current) = self.state.zones.find(source) else {
                    return false;
                };
                if !self.apply_child(event, Event::move_zone(source, current, ZoneId::Stack), depth)
                {
                    return false;
                }

                let (slots, costs) = {
                    let object = self
                        .state
                        .object(source)
                        .expect("cast source vanished mid-cast");
                    (object.spell.targets.len(), object.costs.clone())
                };
                if let Some(object) = self.state.object_mut(source) {
                    object.declared_targets = vec![DeclaredTarget::default(); slots];
                }

                for slot in 0..slots {
                    let declare = Event::new(EventKind::DeclareTarget {
                        holder: source,
                        slot,
                    });
                    if !self.apply_child(event, declare, depth) {
                        self.revert_children(event);
                        return false;
                    }
                }

                for mut cost in costs {
                    cost.set_source(source);
                    if !self.apply_child(event, Event::new(EventKind::PayCost { cost }), depth) {
                        self.revert_children(event);
                        return false;
                    }
                }
                true
            }

            EventKind::ActivateAbility { index } => {
                let Some(source) = event.source else {
                    return false;
                };
                let Some(ability) = self
                    .state
                    .object(source)
                    .and_then(|o| o.abilities.activated.get(index).cloned())
                else {
                    return false;
                };
                let Some(controller) = self.state.controller_of(source) else {
                    return false;
                };

                if !ability.mana {
                    let generate = Event::new(EventKind::GenerateAbilityObject {
                        kind: AbilityObjectKind::Activated,
                        controller,
                        resolution: ability.resolution.clone(),
                    });
                    if !self.apply_child(event, generate, depth) {
                        return false;
                    }
                    let created = match event.children.last().map(|c| c.undo) {
                        Some(Undo::Created(oid)) => oid,
                        _ => panic!("ability object generator recorded no object"),
                    };
                    for slot in 0..ability.resolution.targets.len() {
                        let declare = Event::new(EventKind::DeclareTarget {
                            holder: created,
                            slot,
                        });
                        if !self.apply_child(event, declare, depth) {
                            self.revert_children(event);
                            return false;
                        }
                    }
                }

                for mut cost in ability.costs.clone() {
                    cost.set_source(source);
                    if !self.apply_child(event, Event::new(EventKind::PayCost { cost }), depth) {
                        self.revert_children(event);
                        return false;
                    }
                }

                if ability.mana {
                    // Stack-exempt: resolve in the same tree.
                    let resolve = Event::new(EventKind::ResolveEffect {
                        resolution: ability.resolution.clone(),
                        targets: Vec::new(),
                    });
                    if !self.apply_child(event, resolve, depth) {
                        self.revert_children(event);
                        return false;
                    }
                }
                true
            }

            EventKind::StackTriggeredAbility {
                controller,
                resolution,
            } => {
                let generate = Event::new(EventKind::GenerateAbilityObject {
                    kind: AbilityObjectKind::Triggered,
                    controller,
                    resolution: resolution.clone(),
                });
                if !self.apply_child(event, generate, depth) {
                    return false;
                }
                let created = match event.children.last().map(|c| c.undo) {
                    Some(Undo::Created(oid)) => oid,
                    _ => panic!("ability object generator recorded no object"),
                };
                for slot in 0..resolution.targets.len() {
                    let declare = Event::new(EventKind::DeclareTarget {
                        holder: created,
                        slot,
                    });
                    if !self.apply_child(event, declare, depth) {
                        self.revert_children(event);
                        return false;
                    }
                }
                true
            }

            EventKind::PayCost { cost } => {
                let Some(source) = cost.source else {
                    return false;
                };
                event.source = Some(source);
                if !cost.can_pay(&self.state, source) {
                    self.note_failure(ActionError::CostNotPaid);
                    return false;
                }
                match cost.kind {
                    CostKind::TapSelf => self.apply_child(event, Event::tap(source), depth),
                    CostKind::Mana(mana_cost) => {
                        let Some(player) = self.state.controller_of(source) else {
                            return false;
                        };
                        for symbol in mana_cost.iter() {
                            let pay = Event::new(EventKind::PayManaSymbol { player, symbol });
                            if !self.apply_child(event, pay, depth) {
                                self.revert_children(event);
                                return false;
                            }
                        }
                        true
                    }
                }
            }

            EventKind::PayManaSymbol { player, symbol } => loop {
                let mut actions: Vec<ManaPaymentOption> = self.state.players[player]
                    .mana_pool
                    .payment_options(symbol)
                    .into_iter()
                    .map(ManaPaymentOption::UseMana)
                    .collect();
                for (oid, object) in self.state.objects() {
                    for (i, ability) in object.abilities.activated.iter().enumerate() {
                        if ability.mana && ability.can_be_activated(&self.state, oid, player) {
                            actions.push(ManaPaymentOption::ActivateManaAbility(oid, i));
                        }
                    }
                }
                if actions.is_empty() {
                    self.note_failure(ActionError::CostNotPaid);
                    self.revert_children(event);
                    return false;
                }

                let items: Vec<ChoiceItem> = actions
                    .iter()
                    .map(|&a| ChoiceItem::ManaPayment(a))
                    .collect();
                let request =
                    ChoiceRequest::pick_one(format!("Pay {}", symbol), items).cancellable();
                let Some(indices) = self.request_choice(request) else {
                    self.note_failure(ActionError::Cancelled);
                    self.revert_children(event);
                    return false;
                };

                match actions[indices[0]] {
                    ManaPaymentOption::UseMana(mana) => {
                        let remove = Event::new(EventKind::RemoveMana { player, mana });
                        if !self.apply_child(event, remove, depth) {
                            self.revert_children(event);
                            return false;
                        }
                        return true;
                    }
                    ManaPaymentOption::ActivateManaAbility(oid, i) => {
                        // A failed activation unwound itself; either way,
                        // re-offer the payment choice.
                        let _ = self.apply_child(event, Event::activate_ability(oid, i), depth);
                    }
                }
            },

            EventKind::ResolveEffect { resolution, targets } => {
                let source = event.source;
                let mut run = EffectRun {
                    game: self,
                    source,
                    targets,
                    children: Vec::new(),
                    depth,
                };
                for effect in &resolution.effects {
                    effect(&mut run);
                }
                let children = run.children;
                event.children.extend(children);
                true
            }
        }
    }

    // === Trigger detection ===

    /// After a successful apply, enqueue every triggered ability whose
    /// watch, activity predicate, and condition all hold right now.
    /// Conversion to stack objects happens at the next state check,
    /// never synchronously.
    fn scan_triggers(&mut self, event: &mut Event, depth: usize) {
        let mut fired: Vec<PendingTrigger> = Vec::new();

        for (oid, object) in self.state.objects() {
            for (index, ability) in object.abilities.triggered.iter().enumerate() {
                if ability.does_trigger(&self.state, oid, &event.kind) {
                    fired.push(PendingTrigger {
                        source: oid,
                        origin: TriggerOrigin::Printed { index },
                    });
                }
            }
        }
        for (effect_index, effect) in self.state.effects.iter().enumerate() {
            if !effect.is_active(&self.state) {
                continue;
            }
            for (index, ability) in effect.granted_triggers.iter().enumerate() {
                if ability.does_trigger(&self.state, effect.source, &event.kind) {
                    fired.push(PendingTrigger {
                        source: effect.source,
                        origin: TriggerOrigin::Granted {
                            effect: effect_index,
                            index,
                        },
                    });
                }
            }
        }

        for trigger in fired {
            let push = Event::new(EventKind::PushPendingTrigger { trigger });
            let _ = self.apply_child(event, push, depth);
        }
    }

    // === Choices ===

    /// Put a choice to the decision source and block until it answers
    /// acceptably. Returns `None` only for a permitted cancellation.
    ///
    /// Panics on re-entry: exactly one choice may be outstanding.
    fn request_choice(&mut self, request: ChoiceRequest) -> Option<Vec<usize>> {
        assert!(!self.choice_open, "re-entrant choice request");
        self.choice_open = true;
        self.trace.push(TraceEntry::ChoiceRequested {
            title: request.title.clone(),
        });

        let result = loop {
            match self.decisions.choose(&request) {
                ChoiceReply::Cancelled if request.cancellable => break None,
                ChoiceReply::Cancelled => continue,
                ChoiceReply::Chosen(indices) => {
                    if request.accepts(&indices) {
                        break Some(indices);
                    }
                }
            }
        };

        self.choice_open = false;
        result
    }

    // === State check ===

    /// Recompute layered characteristics, run the state-based-action
    /// hook, then convert pending triggers into stack objects.
    pub fn state_check(&mut self) {
        self.state.recompute_characteristics();
        self.state_based_actions();
        self.convert_pending_triggers();
    }

    /// State-based actions hook.
    ///
    /// Only the life-loss check is implemented; the remaining rules
    /// (tokens ceasing to exist, lethal damage, the legend rule, aura
    /// attachment, counter annihilation) are not yet here.
    fn state_based_actions(&mut self) {
        for (_, player) in self.state.players.iter_mut() {
            if player.life <= 0 {
                player.has_lost = true;
            }
        }
    }

    /// Convert pending triggers to ability objects on the stack. A new
    /// stack state returns priority to the active player.
    fn convert_pending_triggers(&mut self) {
        if self.state.pending_triggers.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.state.pending_triggers);
        let mut any_stacked = false;
        for trigger in pending {
            let Some((controller, resolution)) = self.state.trigger_resolution(&trigger) else {
                continue;
            };
            let event = Event::new(EventKind::StackTriggeredAbility {
                controller,
                resolution,
            })
            .with_source(trigger.source);
            if self.push_event(event) {
                any_stacked = true;
            }
        }
        if any_stacked {
            self.state.turn.reset_priority();
            self.pass_count = 0;
        }
    }

    // === Priority ===

    /// The actions available to `player` right now. "Pass" is always
    /// first.
    #[must_use]
    pub fn priority_actions(&self, player: PlayerId) -> Vec<PriorityAction> {
        let mut actions = vec![PriorityAction::Pass];
        let sorcery = self.state.sorcery_speed_for(player);

        for oid in self.state.zones.zone(ZoneId::Hand(player)).iter() {
            let Some(object) = self.state.object(oid) else {
                continue;
            };
            if object.computed.is_land() {
                // One land per turn is not enforced; only the timing is.
                if sorcery {
                    actions.push(PriorityAction::PlayLand(oid));
                }
            } else if object.computed.is_instant_speed() || sorcery {
                actions.push(PriorityAction::CastSpell(oid));
            }
        }

        for (oid, object) in self.state.objects() {
            for (i, ability) in object.abilities.activated.iter().enumerate() {
                if ability.can_be_activated(&self.state, oid, player) {
                    if ability.mana {
                        actions.push(PriorityAction::ActivateManaAbility(oid, i));
                    } else {
                        actions.push(PriorityAction::ActivateAbility(oid, i));
                    }
                }
            }
        }

        actions
    }

    /// Carry out one priority action.
    ///
    /// A pass is always `Ok`. Failed actions report the deepest cause
    /// (cost, target, cancellation, or a plain illegal state) with the
    /// whole event tree already unwound.
    pub fn take_action(&mut self, action: PriorityAction) -> Result<(), ActionError> {
        self.last_error = None;
        let event = match action {
            PriorityAction::Pass => return Ok(()),
            PriorityAction::CastSpell(oid) => Event::cast_spell(oid),
            PriorityAction::ActivateAbility(oid, i)
            | PriorityAction::ActivateManaAbility(oid, i) => Event::activate_ability(oid, i),
            PriorityAction::PlayLand(oid) => Event::play_land(oid),
        };
        if self.push_event(event) {
            Ok(())
        } else {
            Err(self.last_error.take().unwrap_or(ActionError::IllegalState))
        }
    }

    /// Offer the priority player one decision and carry it out.
    ///
    /// Returns true if an action was taken, false for a pass. A failed
    /// action re-offers the choice rather than retrying blindly.
    pub fn offer_priority(&mut self) -> bool {
        let player = self.state.turn.priority_player;
        loop {
            let actions = self.priority_actions(player);
            let items: Vec<ChoiceItem> =
                actions.iter().map(|&a| ChoiceItem::Priority(a)).collect();
            let request = ChoiceRequest::pick_one(format!("{}: priority", player), items);
            let indices = self
                .request_choice(request)
                .expect("priority choices are not cancellable");

            let action = actions[indices[0]];
            if self.take_action(action).is_ok() {
                return !matches!(action, PriorityAction::Pass);
            }
        }
    }

    /// Advance the pass/resolve/phase-end machine.
    ///
    /// An action resets the pass count and leaves priority with the
    /// actor. A pass advances priority; once every player has passed in
    /// sequence, the stack top resolves (stack non-empty) or the phase
    /// ends (stack empty).
    pub fn pass_priority(&mut self, actions_taken: bool) {
        if actions_taken {
            self.pass_count = 0;
            return;
        }

        self.pass_count += 1;
        if self.pass_count < self.state.player_count() {
            self.state.turn.advance_priority(self.state.player_count());
            return;
        }

        if !self.state.zones.zone(ZoneId::Stack).is_empty() {
            self.resolve_stack_top();
            self.state.turn.reset_priority();
            self.pass_count = 0;
            return;
        }

        self.advance_phase();
    }

    /// Resolve the front of the stack.
    ///
    /// Ability objects run their resolution and are deleted. Spells run
    /// their resolution, then move to the battlefield if they are
    /// currently permanent-capable, otherwise to their owner's
    /// graveyard.
    fn resolve_stack_top(&mut self) {
        let Some(top) = self.state.zones.zone(ZoneId::Stack).get(0) else {
            return;
        };
        self.trace.push(TraceEntry::StackResolved { object: top });

        let is_ability = self
            .state
            .object(top)
            .is_some_and(GameObject::is_ability_object);

        if is_ability {
            let (resolution, targets, source) = {
                let object = self.state.object(top).expect("stack object exists");
                let part = object.ability_part.as_ref().expect("checked above");
                (
                    part.resolution.clone(),
                    object.declared_targets.clone(),
                    part.source,
                )
            };
            self.push_event(
                Event::new(EventKind::ResolveEffect { resolution, targets }).with_source(source),
            );
            self.state.delete_object(top);
        } else {
            let (resolution, targets, permanent, owner) = {
                let object = self.state.object(top).expect("stack object exists");
                (
                    object.spell.clone(),
                    object.declared_targets.clone(),
                    object.computed.is_permanent(),
                    object.base.owner,
                )
            };
            if !resolution.effects.is_empty() {
                self.push_event(
                    Event::new(EventKind::ResolveEffect {
                        resolution,
                        targets,
                    })
                    .with_source(top),
                );
            }
            let destination = if permanent {
                ZoneId::Battlefield
            } else {
                ZoneId::Graveyard(owner)
            };
            self.push_event(Event::move_zone(top, ZoneId::Stack, destination));
            if let Some(object) = self.state.object_mut(top) {
                object.reset_transient_state();
            }
        }

        self.state_check();
    }

    // === Phases ===

    fn advance_phase(&mut self) {
        self.end_current_phase();
        let turn_ended = self.state.turn.advance_phase();
        if turn_ended {
            let player_count = self.state.player_count();
            self.state.turn.advance_turn(player_count);
        }
        self.state.turn.reset_priority();
        self.pass_count = 0;
        self.start_current_phase();
        self.state_check();
    }

    fn start_current_phase(&mut self) {
        let phase = self.state.turn.phase;
        let active = self.state.turn.active_player;
        self.trace.push(TraceEntry::PhaseStarted {
            phase,
            turn: self.state.turn.turn_count,
        });

        match phase {
            Phase::Untap => {
                let to_untap: Vec<ObjectId> = self
                    .state
                    .zones
                    .zone(ZoneId::Battlefield)
                    .iter()
                    .filter(|&oid| self.state.controller_of(oid) == Some(active))
                    .collect();
                for oid in to_untap {
                    let _ = self.push_event(Event::untap(oid));
                }
            }
            Phase::Draw => {
                let _ = self.push_event(Event::draw(active));
            }
            Phase::Cleanup => {
                let hand_size = self.state.zones.zone(ZoneId::Hand(active)).len();
                let max = self.state.players[active].max_hand_size;
                let discards = hand_size.saturating_sub(max);
                if discards > 0 {
                    let _ = self.push_event(Event::new(EventKind::DiscardMany {
                        player: active,
                        count: discards,
                    }));
                }

                let battlefield: Vec<ObjectId> =
                    self.state.zones.zone(ZoneId::Battlefield).iter().collect();
                for oid in battlefield {
                    if let Some(object) = self.state.object_mut(oid) {
                        object.status.damage = 0;
                    }
                }
            }
            _ => {}
        }
    }

    fn end_current_phase(&mut self) {
        for (_, player) in self.state.players.iter_mut() {
            player.mana_pool.empty();
        }
    }

    // === Driving ===

    /// One iteration of the game loop: state check, then either a
    /// priority window or an automatic phase advance.
    pub fn step(&mut self) {
        self.state_check();
        let stack_busy = !self.state.zones.zone(ZoneId::Stack).is_empty();
        if self.state.turn.phase.gives_priority() || stack_busy {
            let acted = self.offer_priority();
            self.pass_priority(acted);
        } else {
            self.advance_phase();
        }
    }

    /// Has any player lost?
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.state.players.iter().any(|(_, p)| p.has_lost)
    }

    /// Step until the game ends or `max_steps` runs out.
    pub fn run(&mut self, max_steps: usize) {
        for _ in 0..max_steps {
            if self.game_over() {
                break;
            }
            self.step();
        }
    }
}

/// The context handed to card-content effect closures.
///
/// Effects mutate the game only by pushing child events; the pushed
/// events are recorded so the surrounding resolution reverts like any
/// other composite.
pub struct EffectRun<'g> {
    game: &'g mut Game,
    source: Option<ObjectId>,
    targets: Vec<DeclaredTarget>,
    children: Vec<Event>,
    depth: usize,
}

impl EffectRun<'_> {
    /// The resolving object (spell or ability source).
    #[must_use]
    pub fn source(&self) -> Option<ObjectId> {
        self.source
    }

    /// A declared target slot.
    #[must_use]
    pub fn target(&self, slot: usize) -> Option<&DeclaredTarget> {
        self.targets.get(slot)
    }

    /// Read the game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.game.state
    }

    /// Apply a child event. Events without a source inherit the
    /// resolving object's.
    pub fn push(&mut self, mut event: Event) -> bool {
        if event.source.is_none() {
            event.source = self.source;
        }
        let ok = self.game.apply_event(&mut event, self.depth + 1);
        if ok {
            self.children.push(event);
        }
        ok
    }
}
