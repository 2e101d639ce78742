//! Scripted demo battle: both sides always pick their first legal option,
//! so a given seed prints the same battle every run.
//!
//! Usage: `pokemon-arena [seed]`, where the seed is any form
//! [`PrngSeed::parse`] accepts (e.g. `gen5,1dea` or a decimal integer).

use std::env;

use pokemon_arena::{
    teams, Battle, ChoiceRequest, Decision, FormatRules, PrngSeed, RequestState,
};

fn main() {
    let seed = match env::args().nth(1) {
        Some(raw) => match PrngSeed::parse(&raw) {
            Ok(seed) => seed,
            Err(err) => {
                eprintln!("{}", err);
                return;
            }
        },
        None => PrngSeed::generate(),
    };

    let mut battle = match Battle::new(
        FormatRules::gen9_singles(),
        seed,
        [teams::team_red(), teams::team_blue()],
    ) {
        Ok(battle) => battle,
        Err(err) => {
            eprintln!("{}", err);
            return;
        }
    };

    battle.start();
    let mut printed = 0;
    print_new_lines(&battle, &mut printed);

    while !battle.ended() {
        let mut submitted = false;
        for side in 0..2 {
            if let Some(request) = battle.request_for(side) {
                if battle.choose(side, scripted(&request)).is_ok() {
                    submitted = true;
                }
            }
        }
        print_new_lines(&battle, &mut printed);
        if !submitted {
            break;
        }
        if battle.turn > 80 {
            battle.force_tie();
            print_new_lines(&battle, &mut printed);
        }
    }

    println!();
    println!(
        "seed {}  prng calls {}",
        battle.prng.starting_seed(),
        battle.prng.call_count()
    );
}

/// First legal option everywhere: leads in sheet order, the first usable
/// move, the first bench member for every replacement.
fn scripted(request: &ChoiceRequest) -> Vec<Decision> {
    match request.state {
        RequestState::TeamPreview => {
            let order: Vec<usize> = (0..request.team_size).collect();
            vec![Decision::team(&order)]
        }
        RequestState::Switch => {
            let mut bench = request.can_switch.iter().copied();
            request
                .slots
                .iter()
                .filter_map(|slot| bench.next().map(|index| Decision::switch(slot.slot, index)))
                .collect()
        }
        RequestState::Move => request
            .slots
            .iter()
            .map(|slot| {
                if slot.moves.is_empty() {
                    return Decision::pass(slot.slot);
                }
                let move_slot = slot
                    .moves
                    .iter()
                    .position(|option| !option.disabled && option.pp > 0)
                    .unwrap_or(0);
                Decision::use_move(slot.slot, move_slot)
            })
            .collect(),
    }
}

fn print_new_lines(battle: &Battle, printed: &mut usize) {
    for entry in battle.log.since(*printed) {
        if let Some(line) = entry.text() {
            println!("{}", line);
        }
    }
    *printed = battle.log.len();
}
