use crate::battle::pokemon::MonId;
use crate::battle::rng::Prng;
use dex::Id;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Priority brackets for the non-move actions. Moves use their own
/// priority from move data, which always falls inside [-7, +7].
pub const TEAM_PRIORITY: f64 = 102.0;
pub const PASS_PRIORITY: f64 = 102.0;
pub const START_PRIORITY: f64 = 101.0;
pub const INSTA_SWITCH_PRIORITY: f64 = 101.0;
pub const BEFORE_TURN_PRIORITY: f64 = 100.0;
pub const SWITCH_PRIORITY: f64 = 7.0;
pub const MEGA_PRIORITY: f64 = 6.9;
pub const TERA_PRIORITY: f64 = 6.7;
pub const RESIDUAL_PRIORITY: f64 = -100.0;

/// Shared sort key for everything that competes for execution order:
/// queued actions and collected event listeners alike.
pub trait Prioritized {
    /// Overriding primary key. Items with an order sort before items
    /// without one; two orders compare ascending.
    fn order(&self) -> Option<u32> {
        None
    }
    /// Higher first.
    fn priority(&self) -> OrderedFloat<f64>;
    /// Higher first.
    fn speed(&self) -> u32;
    /// Lower first. Separates effect kinds inside one priority bracket.
    fn sub_order(&self) -> u32 {
        0
    }
    /// Lower first. Start ordinal of the effect behind a listener; zero
    /// for actions so that full action ties stay ties.
    fn effect_order(&self) -> u32 {
        0
    }
}

/// Less means "runs first". Exact ties are left to the speed sort, which
/// breaks them with the battle PRNG.
pub fn compare_priority<T: Prioritized>(a: &T, b: &T) -> Ordering {
    match (a.order(), b.order()) {
        (Some(x), Some(y)) if x != y => return x.cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => {}
    }
    b.priority()
        .cmp(&a.priority())
        .then_with(|| b.speed().cmp(&a.speed()))
        .then_with(|| a.sub_order().cmp(&b.sub_order()))
        .then_with(|| a.effect_order().cmp(&b.effect_order()))
}

/// Selection sort that gathers each run of tied items and shuffles the run
/// with the battle PRNG before fixing its positions. Ties therefore cost
/// PRNG frames, which keeps replays faithful.
pub fn speed_sort<T>(
    items: &mut [T],
    prng: &mut Prng,
    cmp: impl Fn(&T, &T) -> Ordering,
) {
    if items.len() < 2 {
        return;
    }
    let mut sorted = 0;
    while sorted + 1 < items.len() {
        let mut tied = vec![sorted];
        for i in sorted + 1..items.len() {
            match cmp(&items[tied[0]], &items[i]) {
                Ordering::Greater => {
                    tied.clear();
                    tied.push(i);
                }
                Ordering::Equal => tied.push(i),
                Ordering::Less => {}
            }
        }
        for (offset, &index) in tied.iter().enumerate() {
            if index != sorted + offset {
                items.swap(sorted + offset, index);
            }
        }
        let run = tied.len();
        if run > 1 {
            prng.shuffle(&mut items[sorted..sorted + run]);
        }
        sorted += run;
    }
}

/// What a queued action does once it reaches the front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Send out the initial Pokemon on both sides.
    Start,
    /// A team-preview ordering submitted by one side.
    Team { side: usize, order: Vec<usize> },
    /// Deliberately do nothing this turn (recharge turns).
    Pass { actor: MonId },
    /// Mid-turn forced replacement; jumps ahead of everything pending.
    InstaSwitch { actor: MonId, target: usize },
    /// Runs once before any chosen action.
    BeforeTurn,
    Switch { actor: MonId, target: usize },
    MegaEvo { actor: MonId },
    Terastallize { actor: MonId },
    Move {
        actor: MonId,
        move_id: Id,
        target: Option<MonId>,
        zmove: bool,
    },
    /// End-of-turn effects.
    Residual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub priority: OrderedFloat<f64>,
    pub speed: u32,
    pub sub_order: u32,
}

impl Action {
    fn new(kind: ActionKind, priority: f64, speed: u32) -> Action {
        Action {
            kind,
            priority: OrderedFloat(priority),
            speed,
            sub_order: 0,
        }
    }

    pub fn start() -> Action {
        Action::new(ActionKind::Start, START_PRIORITY, 0)
    }

    pub fn team(side: usize, order: Vec<usize>) -> Action {
        Action::new(ActionKind::Team { side, order }, TEAM_PRIORITY, 0)
    }

    pub fn pass(actor: MonId) -> Action {
        Action::new(ActionKind::Pass { actor }, PASS_PRIORITY, 0)
    }

    pub fn before_turn() -> Action {
        Action::new(ActionKind::BeforeTurn, BEFORE_TURN_PRIORITY, 0)
    }

    pub fn switch(actor: MonId, target: usize, speed: u32) -> Action {
        Action::new(ActionKind::Switch { actor, target }, SWITCH_PRIORITY, speed)
    }

    pub fn insta_switch(actor: MonId, target: usize, speed: u32) -> Action {
        Action::new(
            ActionKind::InstaSwitch { actor, target },
            INSTA_SWITCH_PRIORITY,
            speed,
        )
    }

    pub fn mega(actor: MonId, speed: u32) -> Action {
        Action::new(ActionKind::MegaEvo { actor }, MEGA_PRIORITY, speed)
    }

    pub fn tera(actor: MonId, speed: u32) -> Action {
        Action::new(ActionKind::Terastallize { actor }, TERA_PRIORITY, speed)
    }

    pub fn move_action(
        actor: MonId,
        move_id: Id,
        target: Option<MonId>,
        priority: f64,
        speed: u32,
        zmove: bool,
    ) -> Action {
        Action::new(
            ActionKind::Move {
                actor,
                move_id,
                target,
                zmove,
            },
            priority,
            speed,
        )
    }

    pub fn residual() -> Action {
        Action::new(ActionKind::Residual, RESIDUAL_PRIORITY, 0)
    }

    /// The Pokemon performing this action, for speed updates.
    pub fn actor(&self) -> Option<MonId> {
        match &self.kind {
            ActionKind::Pass { actor }
            | ActionKind::InstaSwitch { actor, .. }
            | ActionKind::Switch { actor, .. }
            | ActionKind::MegaEvo { actor }
            | ActionKind::Terastallize { actor }
            | ActionKind::Move { actor, .. } => Some(*actor),
            _ => None,
        }
    }
}

impl Prioritized for Action {
    fn priority(&self) -> OrderedFloat<f64> {
        self.priority
    }

    fn speed(&self) -> u32 {
        self.speed
    }

    fn sub_order(&self) -> u32 {
        self.sub_order
    }
}

/// The pending actions of the current turn.
///
/// The queue re-sorts every time an action is taken, so speed changes that
/// happen mid-turn reorder whatever has not executed yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionQueue {
    actions: Vec<Action>,
}

impl ActionQueue {
    pub fn new() -> ActionQueue {
        ActionQueue::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Insert at the front. The next sort decides the real order; this
    /// only matters against actions the new one ties with.
    pub fn unshift(&mut self, action: Action) {
        self.actions.insert(0, action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Refresh every actor-bound action's speed from current battle state.
    pub fn update_speeds(&mut self, mut speed_of: impl FnMut(MonId) -> u32) {
        for action in &mut self.actions {
            if let Some(actor) = action.actor() {
                action.speed = speed_of(actor);
            }
        }
    }

    pub fn sort(&mut self, prng: &mut Prng) {
        speed_sort(&mut self.actions, prng, compare_priority);
    }

    /// Sort, then take the front action.
    pub fn shift(&mut self, prng: &mut Prng) -> Option<Action> {
        if self.actions.is_empty() {
            return None;
        }
        self.sort(prng);
        Some(self.actions.remove(0))
    }

    /// The action that would run next. Ties keep insertion order and no
    /// randomness is spent, so this is a pure lookahead.
    pub fn peek(&self) -> Option<&Action> {
        self.actions
            .iter()
            .reduce(|best, action| {
                if compare_priority(action, best) == Ordering::Less {
                    action
                } else {
                    best
                }
            })
    }

    /// Whether any pokemon still has a move or switch pending this turn.
    /// Protection moves fail when used after everyone else has acted.
    pub fn will_act(&self) -> bool {
        self.actions.iter().any(|action| {
            matches!(
                action.kind,
                ActionKind::Move { .. } | ActionKind::Switch { .. } | ActionKind::InstaSwitch { .. }
            )
        })
    }

    /// Drop every pending action owned by `side`. Used on forfeit and
    /// when a side's actions are invalidated mid-turn.
    pub fn cancel_actions_for(&mut self, side: usize) {
        self.actions
            .retain(|action| action.actor().map(|mon| mon.side != side).unwrap_or(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::rng::PrngSeed;
    use pretty_assertions::assert_eq;

    fn prng() -> Prng {
        Prng::new(PrngSeed::from_state(0x1234))
    }

    fn mon(side: usize, poke: usize) -> MonId {
        MonId::new(side, poke)
    }

    #[test]
    fn brackets_order_the_turn() {
        let mut queue = ActionQueue::new();
        queue.push(Action::residual());
        queue.push(Action::move_action(mon(0, 0), Id::new("tackle"), None, 0.0, 100, false));
        queue.push(Action::switch(mon(1, 0), 1, 50));
        queue.push(Action::mega(mon(0, 0), 100));
        queue.push(Action::before_turn());

        let mut prng = prng();
        let kinds: Vec<f64> = {
            queue.sort(&mut prng);
            queue.actions().iter().map(|a| a.priority.0).collect()
        };
        assert_eq!(kinds, vec![100.0, 7.0, 6.9, 0.0, -100.0]);
    }

    #[test]
    fn higher_move_priority_goes_first_regardless_of_speed() {
        let mut queue = ActionQueue::new();
        queue.push(Action::move_action(mon(0, 0), Id::new("tackle"), None, 0.0, 300, false));
        queue.push(Action::move_action(mon(1, 0), Id::new("quickattack"), None, 1.0, 10, false));

        let mut prng = prng();
        let first = queue.shift(&mut prng).unwrap();
        assert!(matches!(
            first.kind,
            ActionKind::Move { actor, .. } if actor == mon(1, 0)
        ));
    }

    #[test]
    fn speed_breaks_equal_priority() {
        let mut queue = ActionQueue::new();
        queue.push(Action::move_action(mon(0, 0), Id::new("tackle"), None, 0.0, 90, false));
        queue.push(Action::move_action(mon(1, 0), Id::new("tackle"), None, 0.0, 130, false));

        let mut prng = prng();
        let first = queue.shift(&mut prng).unwrap();
        assert_eq!(first.actor(), Some(mon(1, 0)));
    }

    #[test]
    fn peek_previews_without_consuming() {
        let mut queue = ActionQueue::new();
        queue.push(Action::move_action(mon(0, 0), Id::new("tackle"), None, 0.0, 100, false));
        queue.push(Action::move_action(mon(1, 0), Id::new("quickattack"), None, 1.0, 10, false));

        assert_eq!(queue.peek().and_then(Action::actor), Some(mon(1, 0)));
        assert_eq!(queue.len(), 2);

        let mut prng = prng();
        assert_eq!(queue.shift(&mut prng).unwrap().actor(), Some(mon(1, 0)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn fractional_priority_slots_between_brackets() {
        let mut queue = ActionQueue::new();
        queue.push(Action::tera(mon(0, 0), 100));
        queue.push(Action::mega(mon(1, 0), 10));
        queue.push(Action::switch(mon(1, 1), 2, 5));

        let mut prng = prng();
        queue.sort(&mut prng);
        let priorities: Vec<f64> = queue.actions().iter().map(|a| a.priority.0).collect();
        assert_eq!(priorities, vec![7.0, 6.9, 6.7]);
    }

    #[test]
    fn exact_ties_are_broken_by_the_prng() {
        // Same priority, same speed. Which goes first must depend only on
        // the seed, and over many seeds the split stays near even.
        let mut side_zero_first = 0;
        for seed in 0..200u64 {
            let mut queue = ActionQueue::new();
            queue.push(Action::move_action(mon(0, 0), Id::new("tackle"), None, 0.0, 100, false));
            queue.push(Action::move_action(mon(1, 0), Id::new("tackle"), None, 0.0, 100, false));
            let mut prng = Prng::new(PrngSeed::from_state(seed));
            let first = queue.shift(&mut prng).unwrap();
            if first.actor() == Some(mon(0, 0)) {
                side_zero_first += 1;
            }
        }
        assert_eq!(side_zero_first, 101);

        // Determinism: the same seed always picks the same winner.
        for seed in [7u64, 8, 9] {
            let run = |seed: u64| {
                let mut queue = ActionQueue::new();
                queue.push(Action::move_action(mon(0, 0), Id::new("tackle"), None, 0.0, 100, false));
                queue.push(Action::move_action(mon(1, 0), Id::new("tackle"), None, 0.0, 100, false));
                let mut prng = Prng::new(PrngSeed::from_state(seed));
                queue.shift(&mut prng).unwrap().actor()
            };
            assert_eq!(run(seed), run(seed));
        }
    }

    #[test]
    fn resorting_after_speed_update_reorders_pending_actions() {
        let mut queue = ActionQueue::new();
        queue.push(Action::move_action(mon(0, 0), Id::new("tackle"), None, 0.0, 200, false));
        queue.push(Action::move_action(mon(1, 0), Id::new("tackle"), None, 0.0, 150, false));

        // The faster side gets paralyzed mid-turn; its speed is halved
        // before the queue is consulted again.
        queue.update_speeds(|actor| if actor.side == 0 { 100 } else { 150 });

        let mut prng = prng();
        let first = queue.shift(&mut prng).unwrap();
        assert_eq!(first.actor(), Some(mon(1, 0)));
    }
}
