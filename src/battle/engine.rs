//! Turn orchestration: battle construction, the request/choose loop, and
//! the action loop that drives each turn from the speed sort down to the
//! residual phase.
//!
//! The engine never blocks. It hands out [`ChoiceRequest`]s, accepts
//! decisions through [`Battle::choose`], and runs as far as it can every
//! time the last owed side commits. A turn can therefore pause in the
//! middle (a self-switching move) and resume on the next submission.

use serde::{Deserialize, Serialize};

use crate::battle::actions;
use crate::battle::choices::{self, ChoiceRequest, Decision, RequestState};
use crate::battle::dispatch;
use crate::battle::field::Field;
use crate::battle::log::{BattleLog, LogEntry};
use crate::battle::pokemon::{MonId, Pokemon};
use crate::battle::queue::{Action, ActionKind, ActionQueue};
use crate::battle::rng::{Prng, PrngSeed};
use crate::battle::side::Side;
use crate::battle::state::{Battle, Outcome};
use crate::errors::{BattleError, BattleInitError, ChoiceResult};
use crate::pokemon::PokemonSet;
use dex::{Dex, FormatRules, GameType, Id};

/// One side's entry sheet: a display name plus the sets it fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSheet {
    pub name: String,
    pub sets: Vec<PokemonSet>,
}

impl TeamSheet {
    pub fn new(name: &str, sets: Vec<PokemonSet>) -> TeamSheet {
        TeamSheet {
            name: name.to_string(),
            sets,
        }
    }
}

impl Battle {
    /// Validate both teams against the rules and the dex, then assemble a
    /// battle ready for [`Battle::start`].
    pub fn new(
        rules: FormatRules,
        seed: PrngSeed,
        teams: [TeamSheet; 2],
    ) -> Result<Battle, BattleError> {
        let dex = Dex::gen9();
        let slots = rules.game_type.active_per_side();
        let mut sides = Vec::with_capacity(2);
        for (index, sheet) in teams.into_iter().enumerate() {
            if sheet.sets.is_empty() {
                return Err(BattleInitError::EmptyTeam(index).into());
            }
            if sheet.sets.len() > rules.team_size {
                return Err(BattleInitError::TeamTooLarge {
                    side: index,
                    size: sheet.sets.len(),
                    max: rules.team_size,
                }
                .into());
            }
            let mut team = Vec::with_capacity(sheet.sets.len());
            for set in &sheet.sets {
                if set.level > rules.level_cap {
                    return Err(BattleInitError::OverLevelCap {
                        level: set.level,
                        cap: rules.level_cap,
                    }
                    .into());
                }
                team.push(Pokemon::from_set(set, &dex).map_err(BattleError::from)?);
            }
            sides.push(Side::new(sheet.name, team, slots));
        }

        Ok(Battle {
            sides,
            field: Field::new(),
            queue: ActionQueue::new(),
            prng: Prng::new(seed),
            log: BattleLog::new(),
            dex,
            active_move: None,
            rules,
            turn: 0,
            requests: vec![None; 2],
            switch_slots: vec![Vec::new(); 2],
            pending: vec![None; 2],
            outcome: None,
            input_log: Vec::new(),
            effect_order: 0,
        })
    }

    /// Open the battle: log the header, then either ask for team preview
    /// or send the leads out and request the first turn's moves.
    pub fn start(&mut self) {
        if self.turn > 0 || self.ended() {
            return;
        }
        self.log.push(LogEntry::BattleStart {
            seed: self.prng.starting_seed().to_string(),
            format: format_label(&self.rules).to_string(),
        });
        if self.rules.team_preview {
            self.log.push(LogEntry::TeamPreview);
            for side in 0..self.sides.len() {
                self.requests[side] = Some(RequestState::TeamPreview);
            }
            return;
        }
        self.queue.push(Action::start());
        self.run_actions();
    }

    /// The decisions currently owed by `side`, if any.
    pub fn request_for(&self, side: usize) -> Option<ChoiceRequest> {
        choices::build_request(self, side)
    }

    /// Submit one side's decisions. Invalid submissions leave the battle
    /// untouched; a valid one runs the battle forward as far as the other
    /// side's outstanding request allows.
    pub fn choose(&mut self, side: usize, decisions: Vec<Decision>) -> ChoiceResult<()> {
        choices::validate(self, side, &decisions)?;
        let kind = self.requests[side];
        self.requests[side] = None;
        self.input_log.push((side, decisions.clone()));
        self.pending[side] = Some(decisions);
        if self.awaiting_choices() {
            return Ok(());
        }
        match kind {
            Some(RequestState::TeamPreview) => self.commit_team_preview(),
            Some(RequestState::Move) => self.commit_turn(),
            Some(RequestState::Switch) => self.commit_replacements(),
            None => {}
        }
        Ok(())
    }

    /// Concede on behalf of `side`.
    pub fn forfeit(&mut self, side: usize) {
        if self.ended() {
            return;
        }
        self.queue.cancel_actions_for(side);
        let winner = 1 - side;
        self.outcome = Some(Outcome::Win(winner));
        self.log.push(LogEntry::Win {
            side: winner,
            name: self.sides[winner].name.clone(),
        });
        self.close_requests();
    }

    /// End the battle in a draw by agreement.
    pub fn force_tie(&mut self) {
        if self.ended() {
            return;
        }
        self.queue.clear();
        self.outcome = Some(Outcome::Tie);
        self.log.push(LogEntry::Tie);
        self.close_requests();
    }

    fn close_requests(&mut self) {
        for side in 0..self.sides.len() {
            self.requests[side] = None;
            self.pending[side] = None;
            self.switch_slots[side].clear();
        }
    }

    fn commit_team_preview(&mut self) {
        for side in 0..self.sides.len() {
            if let Some(decisions) = self.pending[side].take() {
                for decision in decisions {
                    if let Decision::Team { order } = decision {
                        self.queue.push(Action::team(side, order));
                    }
                }
            }
        }
        self.queue.push(Action::start());
        self.run_actions();
    }

    fn commit_turn(&mut self) {
        for side in 0..self.sides.len() {
            if let Some(decisions) = self.pending[side].take() {
                for decision in decisions {
                    self.push_decision_action(side, decision);
                }
            }
        }
        self.queue.push(Action::before_turn());
        self.queue.push(Action::residual());
        self.run_actions();
    }

    fn commit_replacements(&mut self) {
        for side in 0..self.sides.len() {
            if let Some(decisions) = self.pending[side].take() {
                for decision in decisions {
                    if let Decision::Switch { slot, team_index } = decision {
                        let actor = self.sides[side]
                            .active_index(slot)
                            .map(|poke| MonId::new(side, poke))
                            .unwrap_or_else(|| MonId::new(side, team_index));
                        let speed = self.action_speed(MonId::new(side, team_index));
                        self.queue.unshift(Action::insta_switch(actor, team_index, speed));
                    }
                }
            }
            self.switch_slots[side].clear();
        }
        self.run_actions();
    }

    /// Turn a validated decision into its queue actions. Mega and tera
    /// ride along as separate actions in their own priority brackets.
    fn push_decision_action(&mut self, side: usize, decision: Decision) {
        match decision {
            Decision::Move {
                slot,
                move_slot,
                target,
                mega,
                zmove,
                tera,
            } => {
                let Some(poke) = self.sides[side].active_index(slot) else {
                    return;
                };
                let actor = MonId::new(side, poke);
                let speed = self.action_speed(actor);
                if mega {
                    self.queue.push(Action::mega(actor, speed));
                }
                if tera {
                    self.queue.push(Action::tera(actor, speed));
                }
                let move_id = self.chosen_move_id(actor, move_slot);
                let Some(data) = self.dex.move_data(&move_id).cloned() else {
                    return;
                };
                let priority =
                    dispatch::move_priority(self, actor, &data, f64::from(data.priority));
                self.queue
                    .push(Action::move_action(actor, move_id, target, priority, speed, zmove));
            }
            Decision::Switch { slot, team_index } => {
                let Some(poke) = self.sides[side].active_index(slot) else {
                    return;
                };
                let actor = MonId::new(side, poke);
                let speed = self.action_speed(actor);
                self.queue.push(Action::switch(actor, team_index, speed));
            }
            Decision::Pass { slot } => {
                if let Some(poke) = self.sides[side].active_index(slot) {
                    self.queue.push(Action::pass(MonId::new(side, poke)));
                }
            }
            Decision::Team { .. } => {}
        }
    }

    /// The move a slot choice resolves to, accounting for charge locks and
    /// the no-PP fallback.
    fn chosen_move_id(&self, actor: MonId, move_slot: usize) -> Id {
        if let Some(locked) = choices::charging_move(self, actor) {
            return locked;
        }
        if choices::usable_move_slots(self, actor).is_empty() {
            return Id::new("struggle");
        }
        self.mon(actor)
            .moves
            .get(move_slot)
            .map(|slot| slot.id.clone())
            .unwrap_or_else(|| Id::new("struggle"))
    }

    /// Drain the queue, re-sorting before every take so mid-turn speed
    /// changes reorder what is left. Pauses when a mid-turn switch request
    /// goes out; ends the battle the moment a side runs out.
    fn run_actions(&mut self) {
        let mut entered: Vec<MonId> = Vec::new();
        loop {
            if self.ended() {
                self.queue.clear();
                return;
            }
            self.refresh_queue_speeds();
            let Some(action) = self.queue.shift(&mut self.prng) else {
                break;
            };
            if !matches!(
                action.kind,
                ActionKind::Switch { .. } | ActionKind::InstaSwitch { .. }
            ) {
                self.flush_entered(&mut entered);
            }
            self.execute_action(action, &mut entered);
            if self.check_win() {
                self.queue.clear();
                return;
            }
            if self.awaiting_choices() {
                self.flush_entered(&mut entered);
                return;
            }
        }
        self.flush_entered(&mut entered);
        self.after_queue_drained();
    }

    /// Fire switch-in triggers for every Pokemon that entered since the
    /// last non-switch action. Batching lets simultaneous entries resolve
    /// their abilities and items in speed order.
    fn flush_entered(&mut self, entered: &mut Vec<MonId>) {
        if entered.is_empty() {
            return;
        }
        let live: Vec<MonId> = entered
            .drain(..)
            .filter(|&mon| !self.mon(mon).is_fainted())
            .collect();
        if !live.is_empty() {
            dispatch::run_switch_in(self, &live);
        }
    }

    fn refresh_queue_speeds(&mut self) {
        let speeds: Vec<(MonId, u32)> = self
            .queue
            .actions()
            .iter()
            .filter_map(Action::actor)
            .map(|actor| (actor, self.action_speed(actor)))
            .collect();
        self.queue.update_speeds(|actor| {
            speeds
                .iter()
                .find(|(id, _)| *id == actor)
                .map_or(0, |(_, speed)| *speed)
        });
    }

    fn execute_action(&mut self, action: Action, entered: &mut Vec<MonId>) {
        match action.kind {
            ActionKind::Start => self.execute_start(),
            ActionKind::Team { side, order } => self.apply_team_order(side, &order),
            ActionKind::BeforeTurn => self.execute_before_turn(),
            ActionKind::Pass { actor } => self.execute_pass(actor),
            ActionKind::Switch { actor, target } => {
                if !self.mon(actor).is_fainted() {
                    self.execute_switch(actor, target, entered);
                }
            }
            ActionKind::InstaSwitch { actor, target } => {
                self.execute_switch(actor, target, entered);
            }
            ActionKind::MegaEvo { actor } => self.execute_mega(actor),
            ActionKind::Terastallize { actor } => self.execute_tera(actor),
            ActionKind::Move {
                actor,
                move_id,
                target,
                zmove,
            } => actions::run_move_action(self, actor, &move_id, target, zmove),
            ActionKind::Residual => self.run_residual_phase(),
        }
    }

    /// Send the leading team members into every slot on both sides.
    fn execute_start(&mut self) {
        let mut leads = Vec::new();
        let slots = self.active_per_side();
        for side in 0..self.sides.len() {
            for slot in 0..slots {
                if slot < self.sides[side].team.len() {
                    self.perform_switch(side, slot, slot, false);
                    leads.push(MonId::new(side, slot));
                }
            }
        }
        let live: Vec<MonId> = leads
            .into_iter()
            .filter(|&mon| !self.mon(mon).is_fainted())
            .collect();
        dispatch::run_switch_in(self, &live);
    }

    fn apply_team_order(&mut self, side: usize, order: &[usize]) {
        let team = &mut self.sides[side].team;
        let reordered: Vec<Pokemon> = order.iter().map(|&index| team[index].clone()).collect();
        *team = reordered;
    }

    fn execute_before_turn(&mut self) {
        for mon in self.active_mon_ids() {
            if !self.mon(mon).is_fainted() {
                self.mon_mut(mon).active_turns += 1;
            }
        }
    }

    /// A deliberate no-op turn. The only reason to stand still is the
    /// recharge turn after a hyper-beam class move.
    fn execute_pass(&mut self, actor: MonId) {
        if self.mon(actor).is_fainted() || !self.is_on_field(actor) {
            return;
        }
        if self.mon(actor).has_volatile("mustrecharge") {
            self.log.push(LogEntry::Cant {
                name: self.name_of(actor),
                reason: "must recharge".to_string(),
            });
            self.remove_volatile_from(actor, "mustrecharge");
        }
    }

    fn execute_switch(&mut self, actor: MonId, team_index: usize, entered: &mut Vec<MonId>) {
        let Some(slot) = self.sides[actor.side].slot_of(actor.poke) else {
            return;
        };
        if self.sides[actor.side].is_active(team_index)
            || self.sides[actor.side].team[team_index].is_fainted()
        {
            return;
        }
        self.perform_switch(actor.side, slot, team_index, false);
        entered.push(MonId::new(actor.side, team_index));
    }

    fn execute_mega(&mut self, actor: MonId) {
        if self.mon(actor).is_fainted() || !self.is_on_field(actor) {
            return;
        }
        let mon = &mut self.sides[actor.side].team[actor.poke];
        let Some(forme_id) = mon.mega_evolve(&self.dex) else {
            return;
        };
        self.sides[actor.side].mega_used = true;
        let forme = self
            .dex
            .species_data(&forme_id)
            .map(|species| species.name.clone())
            .unwrap_or_else(|| forme_id.as_str().to_string());
        self.log.push(LogEntry::MegaEvolve {
            name: self.name_of(actor),
            forme,
        });
    }

    fn execute_tera(&mut self, actor: MonId) {
        if self.mon(actor).is_fainted() || !self.is_on_field(actor) {
            return;
        }
        let Some(tera) = self.mon(actor).tera_type else {
            return;
        };
        if self.mon(actor).terastallized.is_some() || self.sides[actor.side].tera_used {
            return;
        }
        self.mon_mut(actor).terastallize(tera);
        self.sides[actor.side].tera_used = true;
        self.log.push(LogEntry::Terastallize {
            name: self.name_of(actor),
            tera_type: tera.to_string(),
        });
    }

    /// The queue ran dry: settle the outcome, request replacements for
    /// fainted slots, or move on to the next turn.
    fn after_queue_drained(&mut self) {
        if self.ended() {
            return;
        }
        if self.check_win() {
            return;
        }
        if self.issue_replacements() {
            return;
        }
        self.begin_turn();
    }

    fn begin_turn(&mut self) {
        self.turn += 1;
        self.log.push(LogEntry::TurnStart { turn: self.turn });
        for side in 0..self.sides.len() {
            self.requests[side] = Some(RequestState::Move);
            self.pending[side] = None;
            self.switch_slots[side].clear();
        }
    }

    /// Ask for replacements wherever a slot holds a fainted Pokemon and
    /// the bench can still cover it. Returns whether anything is owed.
    fn issue_replacements(&mut self) -> bool {
        let mut any = false;
        for side in 0..self.sides.len() {
            let mut owed: Vec<usize> = (0..self.active_per_side())
                .filter(|&slot| {
                    self.sides[side]
                        .active_pokemon(slot)
                        .is_some_and(Pokemon::is_fainted)
                })
                .collect();
            let bench = self.sides[side].switchable().len();
            owed.truncate(bench);
            if owed.is_empty() {
                continue;
            }
            self.switch_slots[side] = owed;
            self.requests[side] = Some(RequestState::Switch);
            any = true;
        }
        any
    }

    /// Settle the battle if either side is out of usable Pokemon.
    fn check_win(&mut self) -> bool {
        if self.outcome.is_some() {
            return true;
        }
        let outcome = match (self.sides[0].all_fainted(), self.sides[1].all_fainted()) {
            (true, true) => Outcome::Tie,
            (true, false) => Outcome::Win(1),
            (false, true) => Outcome::Win(0),
            (false, false) => return false,
        };
        self.outcome = Some(outcome);
        match outcome {
            Outcome::Win(side) => self.log.push(LogEntry::Win {
                side,
                name: self.sides[side].name.clone(),
            }),
            Outcome::Tie => self.log.push(LogEntry::Tie),
        }
        self.close_requests();
        true
    }
}

fn format_label(rules: &FormatRules) -> &'static str {
    match rules.game_type {
        GameType::Singles => "Singles",
        GameType::Doubles => "Doubles",
    }
}
