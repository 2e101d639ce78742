//! Player decisions: what the engine asks a side for, what the side
//! submits back, and the legality checks between the two.
//!
//! Validation never mutates the battle. A rejected submission leaves the
//! request standing, so a driver can correct and resubmit.

use serde::{Deserialize, Serialize};

use crate::battle::pokemon::MonId;
use crate::battle::state::Battle;
use crate::errors::{ChoiceError, ChoiceResult};
use dex::{z_crystal_type, Id, MoveTarget};

/// What a side is currently being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Order the team before the battle proper starts.
    TeamPreview,
    /// Pick an action for every occupied active slot.
    Move,
    /// Fill emptied slots from the bench.
    Switch,
}

/// One slot's worth of player intent.
///
/// `slot` is the active position on the submitting side; `team_index`
/// and preview orders index into the side's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Move {
        slot: usize,
        move_slot: usize,
        target: Option<MonId>,
        mega: bool,
        zmove: bool,
        tera: bool,
    },
    Switch {
        slot: usize,
        team_index: usize,
    },
    Team {
        order: Vec<usize>,
    },
    Pass {
        slot: usize,
    },
}

impl Decision {
    pub fn use_move(slot: usize, move_slot: usize) -> Decision {
        Decision::Move {
            slot,
            move_slot,
            target: None,
            mega: false,
            zmove: false,
            tera: false,
        }
    }

    pub fn switch(slot: usize, team_index: usize) -> Decision {
        Decision::Switch { slot, team_index }
    }

    pub fn team(order: &[usize]) -> Decision {
        Decision::Team {
            order: order.to_vec(),
        }
    }

    pub fn pass(slot: usize) -> Decision {
        Decision::Pass { slot }
    }

    pub fn at_target(mut self, chosen: MonId) -> Decision {
        if let Decision::Move { target, .. } = &mut self {
            *target = Some(chosen);
        }
        self
    }

    pub fn mega(mut self) -> Decision {
        if let Decision::Move { mega, .. } = &mut self {
            *mega = true;
        }
        self
    }

    pub fn zmove(mut self) -> Decision {
        if let Decision::Move { zmove, .. } = &mut self {
            *zmove = true;
        }
        self
    }

    pub fn tera(mut self) -> Decision {
        if let Decision::Move { tera, .. } = &mut self {
            *tera = true;
        }
        self
    }

    fn slot(&self) -> Option<usize> {
        match self {
            Decision::Move { slot, .. } | Decision::Switch { slot, .. } | Decision::Pass { slot } => {
                Some(*slot)
            }
            Decision::Team { .. } => None,
        }
    }
}

/// A request serialized out to whoever is driving this side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceRequest {
    pub side: usize,
    pub state: RequestState,
    /// Slots that need a decision, in submission order.
    pub slots: Vec<SlotRequest>,
    /// Roster indices that could legally switch in.
    pub can_switch: Vec<usize>,
    pub team_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequest {
    pub slot: usize,
    pub pokemon: String,
    /// Options as presented; empty while fainted or recharging.
    pub moves: Vec<MoveOption>,
    pub must_recharge: bool,
    /// Set while a two-turn move is in progress.
    pub locked_move: Option<Id>,
    pub can_mega: bool,
    pub can_zmove: bool,
    pub can_tera: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOption {
    pub id: Id,
    pub name: String,
    pub pp: u8,
    pub max_pp: u8,
    pub disabled: bool,
}

/// Build the outward-facing request for a side, or `None` when nothing
/// is being asked of it.
pub fn build_request(battle: &Battle, side: usize) -> Option<ChoiceRequest> {
    let state = battle.requests[side]?;
    let side_ref = battle.side(side);
    let request = match state {
        RequestState::TeamPreview => ChoiceRequest {
            side,
            state,
            slots: Vec::new(),
            can_switch: Vec::new(),
            team_size: side_ref.team.len(),
        },
        RequestState::Switch => ChoiceRequest {
            side,
            state,
            slots: battle.switch_slots[side]
                .iter()
                .map(|&slot| SlotRequest {
                    slot,
                    pokemon: side_ref
                        .active_pokemon(slot)
                        .map(|mon| mon.name.clone())
                        .unwrap_or_default(),
                    moves: Vec::new(),
                    must_recharge: false,
                    locked_move: None,
                    can_mega: false,
                    can_zmove: false,
                    can_tera: false,
                })
                .collect(),
            can_switch: side_ref.switchable(),
            team_size: side_ref.team.len(),
        },
        RequestState::Move => ChoiceRequest {
            side,
            state,
            slots: decision_slots(battle, side)
                .into_iter()
                .map(|slot| slot_request(battle, side, slot))
                .collect(),
            can_switch: side_ref.switchable(),
            team_size: side_ref.team.len(),
        },
    };
    Some(request)
}

fn slot_request(battle: &Battle, side: usize, slot: usize) -> SlotRequest {
    let index = battle.side(side).active_index(slot).unwrap_or(0);
    let mon_id = MonId::new(side, index);
    let mon = battle.mon(mon_id);
    let must_recharge = mon.has_volatile("mustrecharge");
    let locked_move = charging_move(battle, mon_id);

    let moves = if mon.is_fainted() || must_recharge {
        Vec::new()
    } else if let Some(locked) = &locked_move {
        mon.moves
            .iter()
            .filter(|slot| slot.id == *locked)
            .map(|slot| MoveOption {
                id: slot.id.clone(),
                name: move_name(battle, &slot.id),
                pp: slot.pp,
                max_pp: slot.max_pp,
                disabled: false,
            })
            .collect()
    } else if usable_move_slots(battle, mon_id).is_empty() {
        vec![MoveOption {
            id: Id::new("struggle"),
            name: "Struggle".to_string(),
            pp: 1,
            max_pp: 1,
            disabled: false,
        }]
    } else {
        let usable = usable_move_slots(battle, mon_id);
        mon.moves
            .iter()
            .enumerate()
            .map(|(i, slot)| MoveOption {
                id: slot.id.clone(),
                name: move_name(battle, &slot.id),
                pp: slot.pp,
                max_pp: slot.max_pp,
                disabled: !usable.contains(&i),
            })
            .collect()
    };

    let can_zmove = mon
        .moves
        .iter()
        .any(|slot| can_zmove_with(battle, mon_id, &slot.id));
    SlotRequest {
        slot,
        pokemon: mon.name.clone(),
        moves,
        must_recharge,
        can_mega: locked_move.is_none() && can_mega(battle, mon_id),
        can_zmove: locked_move.is_none() && can_zmove,
        can_tera: locked_move.is_none() && can_tera(battle, mon_id),
        locked_move,
    }
}

fn move_name(battle: &Battle, id: &Id) -> String {
    battle
        .dex
        .move_data(id)
        .map(|data| data.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Check a side's full submission against its current request.
pub fn validate(battle: &Battle, side: usize, decisions: &[Decision]) -> ChoiceResult<()> {
    if battle.outcome.is_some() {
        return Err(ChoiceError::BattleEnded);
    }
    let Some(state) = battle.requests[side] else {
        return Err(ChoiceError::NotRequested);
    };
    match state {
        RequestState::TeamPreview => validate_team(battle, side, decisions),
        RequestState::Move => validate_moves(battle, side, decisions),
        RequestState::Switch => validate_switches(battle, side, decisions),
    }
}

fn validate_team(battle: &Battle, side: usize, decisions: &[Decision]) -> ChoiceResult<()> {
    if decisions.len() != 1 {
        return Err(ChoiceError::WrongDecisionCount {
            expected: 1,
            got: decisions.len(),
        });
    }
    let Decision::Team { order } = &decisions[0] else {
        return Err(ChoiceError::WrongKind);
    };
    let team_len = battle.side(side).team.len();
    if order.len() != team_len {
        return Err(ChoiceError::BadTeamOrder);
    }
    let mut seen = vec![false; team_len];
    for &index in order {
        if index >= team_len || seen[index] {
            return Err(ChoiceError::BadTeamOrder);
        }
        seen[index] = true;
    }
    Ok(())
}

fn validate_moves(battle: &Battle, side: usize, decisions: &[Decision]) -> ChoiceResult<()> {
    let slots = decision_slots(battle, side);
    if decisions.len() != slots.len() {
        return Err(ChoiceError::WrongDecisionCount {
            expected: slots.len(),
            got: decisions.len(),
        });
    }

    let mut switch_targets: Vec<usize> = Vec::new();
    let mut mega_now = false;
    let mut zmove_now = false;
    let mut tera_now = false;

    for (decision, &slot) in decisions.iter().zip(&slots) {
        if decision.slot() != Some(slot) {
            return Err(ChoiceError::WrongKind);
        }
        let index = battle
            .side(side)
            .active_index(slot)
            .ok_or(ChoiceError::WrongKind)?;
        let mon_id = MonId::new(side, index);
        let mon = battle.mon(mon_id);

        // A fainted slot that could not be refilled only passes.
        if mon.is_fainted() {
            match decision {
                Decision::Pass { .. } => continue,
                _ => return Err(ChoiceError::WrongKind),
            }
        }
        let recharging = mon.has_volatile("mustrecharge");

        match decision {
            Decision::Team { .. } => return Err(ChoiceError::WrongKind),
            Decision::Pass { .. } => {
                if !recharging {
                    return Err(ChoiceError::WrongKind);
                }
            }
            Decision::Switch { team_index, .. } => {
                if recharging {
                    return Err(ChoiceError::MustRecharge);
                }
                validate_switch_target(battle, side, *team_index, &switch_targets)?;
                switch_targets.push(*team_index);
            }
            Decision::Move {
                move_slot,
                target,
                mega,
                zmove,
                tera,
                ..
            } => {
                if recharging {
                    return Err(ChoiceError::MustRecharge);
                }

                let charging = charging_move(battle, mon_id);
                let move_id = if let Some(charging) = charging {
                    // Mid two-turn move: the release happens no matter which
                    // slot was sent. Only the one-time mechanics are refused.
                    if *mega || *zmove || *tera {
                        return Err(ChoiceError::MechanicUnavailable(mechanic_name(
                            *mega, *zmove,
                        )));
                    }
                    charging
                } else if usable_move_slots(battle, mon_id).is_empty() {
                    // Out of options; the request offered Struggle alone.
                    if *move_slot != 0 {
                        return Err(ChoiceError::InvalidMoveSlot(*move_slot));
                    }
                    Id::new("struggle")
                } else {
                    if *move_slot >= mon.moves.len() {
                        return Err(ChoiceError::InvalidMoveSlot(*move_slot));
                    }
                    let chosen = &mon.moves[*move_slot];
                    if let Some(locked) = choice_locked_move(battle, mon_id) {
                        if chosen.id != locked {
                            return Err(ChoiceError::MustUseLockedMove(locked));
                        }
                    }
                    if chosen.disabled {
                        return Err(ChoiceError::MoveDisabled(chosen.id.clone()));
                    }
                    if chosen.pp == 0 {
                        return Err(ChoiceError::NoPp(chosen.id.clone()));
                    }
                    chosen.id.clone()
                };

                if *mega {
                    if mega_now || !can_mega(battle, mon_id) {
                        return Err(ChoiceError::MechanicUnavailable("mega evolution"));
                    }
                    mega_now = true;
                }
                if *zmove {
                    if zmove_now || !can_zmove_with(battle, mon_id, &move_id) {
                        return Err(ChoiceError::MechanicUnavailable("z-move"));
                    }
                    zmove_now = true;
                }
                if *tera {
                    if tera_now || !can_tera(battle, mon_id) {
                        return Err(ChoiceError::MechanicUnavailable("terastallization"));
                    }
                    tera_now = true;
                }

                validate_target(battle, mon_id, &move_id, target)?;
            }
        }
    }
    Ok(())
}

fn mechanic_name(mega: bool, zmove: bool) -> &'static str {
    if mega {
        "mega evolution"
    } else if zmove {
        "z-move"
    } else {
        "terastallization"
    }
}

fn validate_switches(battle: &Battle, side: usize, decisions: &[Decision]) -> ChoiceResult<()> {
    let slots = &battle.switch_slots[side];
    if decisions.len() != slots.len() {
        return Err(ChoiceError::WrongDecisionCount {
            expected: slots.len(),
            got: decisions.len(),
        });
    }
    let mut targets: Vec<usize> = Vec::new();
    for (decision, &slot) in decisions.iter().zip(slots) {
        let Decision::Switch { slot: chosen, team_index } = decision else {
            return Err(ChoiceError::WrongKind);
        };
        if *chosen != slot {
            return Err(ChoiceError::WrongKind);
        }
        validate_switch_target(battle, side, *team_index, &targets)?;
        targets.push(*team_index);
    }
    Ok(())
}

fn validate_switch_target(
    battle: &Battle,
    side: usize,
    team_index: usize,
    already_chosen: &[usize],
) -> ChoiceResult<()> {
    let side_ref = battle.side(side);
    if team_index >= side_ref.team.len() {
        return Err(ChoiceError::InvalidSwitchTarget(team_index));
    }
    if side_ref.team[team_index].is_fainted() {
        return Err(ChoiceError::FaintedSwitchTarget(team_index));
    }
    if side_ref.is_active(team_index) || already_chosen.contains(&team_index) {
        return Err(ChoiceError::AlreadyActive(team_index));
    }
    Ok(())
}

fn validate_target(
    battle: &Battle,
    user: MonId,
    move_id: &Id,
    target: &Option<MonId>,
) -> ChoiceResult<()> {
    let kind = battle
        .dex
        .move_data(move_id)
        .map(|data| data.target)
        .unwrap_or(MoveTarget::Normal);
    match kind {
        MoveTarget::Normal => {
            if let Some(target) = target {
                if !battle.is_on_field(*target) || *target == user {
                    return Err(ChoiceError::InvalidTarget);
                }
            }
            Ok(())
        }
        _ => {
            if target.is_some() {
                return Err(ChoiceError::InvalidTarget);
            }
            Ok(())
        }
    }
}

/// Slots a Move request wants an answer for, in order.
pub(crate) fn decision_slots(battle: &Battle, side: usize) -> Vec<usize> {
    (0..battle.active_per_side())
        .filter(|&slot| battle.side(side).active_index(slot).is_some())
        .collect()
}

/// The move a slot is locked into by an in-progress two-turn move.
pub(crate) fn charging_move(battle: &Battle, mon: MonId) -> Option<Id> {
    battle
        .mon(mon)
        .volatiles
        .keys()
        .find(|id| {
            battle
                .dex
                .move_data(id)
                .map(|data| data.flags.charge)
                .unwrap_or(false)
        })
        .cloned()
}

/// The move a choice item has pinned this slot to, if any.
pub(crate) fn choice_locked_move(battle: &Battle, mon: MonId) -> Option<Id> {
    battle
        .mon(mon)
        .volatiles
        .get("choicelock")?
        .linked_move
        .clone()
}

/// Move slot indices legal to pick this turn. Empty means Struggle.
pub(crate) fn usable_move_slots(battle: &Battle, mon: MonId) -> Vec<usize> {
    let pokemon = battle.mon(mon);
    let locked = choice_locked_move(battle, mon);
    pokemon
        .moves
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.usable())
        .filter(|(_, slot)| locked.as_ref().map(|id| slot.id == *id).unwrap_or(true))
        .map(|(i, _)| i)
        .collect()
}

pub(crate) fn can_mega(battle: &Battle, mon: MonId) -> bool {
    let pokemon = battle.mon(mon);
    battle.rules.allow_mega
        && !battle.side(mon.side).mega_used
        && !pokemon.is_mega
        && pokemon
            .item
            .as_ref()
            .map(|item| battle.dex.mega_forme(&pokemon.species, item).is_some())
            .unwrap_or(false)
}

pub(crate) fn can_tera(battle: &Battle, mon: MonId) -> bool {
    let pokemon = battle.mon(mon);
    battle.rules.allow_tera
        && !battle.side(mon.side).tera_used
        && pokemon.terastallized.is_none()
        && pokemon.tera_type.is_some()
}

/// Whether the held crystal can turn this particular move into a Z-move.
pub(crate) fn can_zmove_with(battle: &Battle, mon: MonId, move_id: &Id) -> bool {
    if !battle.rules.allow_z || battle.side(mon.side).z_used {
        return false;
    }
    let pokemon = battle.mon(mon);
    let Some(item) = &pokemon.item else {
        return false;
    };
    let Some(crystal) = z_crystal_type(item) else {
        return false;
    };
    battle
        .dex
        .move_data(move_id)
        .map(|data| data.is_damaging() && data.move_type == crystal)
        .unwrap_or(false)
}
