#[cfg(test)]
mod tests {
    use crate::battle::choices::Decision;
    use crate::battle::log::LogEntry;
    use crate::battle::state::Battle;
    use crate::battle::tests::common::{
        assert_ok, duel, duel_seeded, play_moves, play_turn, set, teams_battle,
    };
    use pretty_assertions::assert_eq;

    fn first_damage_to(battle: &Battle, target_name: &str) -> u16 {
        for entry in battle.log.entries() {
            if let LogEntry::Damage { target, amount, .. } = entry {
                if target == target_name {
                    return *amount;
                }
            }
        }
        panic!("{} never took damage", target_name);
    }

    #[test]
    fn test_identical_runs_produce_identical_transcripts() {
        // Arrange
        let script = [(0, 0), (1, 0), (0, 0)];
        let run = || {
            let mut battle = duel(
                set("pikachu", &["tackle", "thunderbolt"]),
                set("snorlax", &["swordsdance"]),
            );
            for (ours, theirs) in script {
                play_moves(&mut battle, ours, theirs);
            }
            battle
        };

        // Act
        let first = run();
        let second = run();

        // Assert: same transcript, same number of draws, same inputs.
        assert_eq!(first.log.to_json(), second.log.to_json());
        assert_eq!(first.prng.call_count(), second.prng.call_count());
        assert_eq!(first.input_log, second.input_log);
        assert_eq!(first.outcome, None);
        assert_eq!(second.outcome, None);
    }

    #[test]
    fn test_seeds_change_the_rolls() {
        // Arrange & Act: the same script under two seed states.
        let mut first = duel_seeded(
            0x1234,
            set("pikachu", &["tackle"]),
            set("snorlax", &["swordsdance"]),
        );
        let mut second = duel_seeded(
            0xDEADBEEF,
            set("pikachu", &["tackle"]),
            set("snorlax", &["swordsdance"]),
        );
        play_moves(&mut first, 0, 0);
        play_moves(&mut second, 0, 0);

        // Assert: the damage rolls came out differently.
        assert_eq!(first_damage_to(&first, "Snorlax"), 31);
        assert_eq!(first_damage_to(&second, "Snorlax"), 30);
        assert_ne!(first.log.to_json(), second.log.to_json());
    }

    #[test]
    fn test_the_input_log_replays_the_battle() {
        // Arrange
        let build = || {
            teams_battle(
                vec![set("pikachu", &["tackle"]), set("charizard", &["tackle"])],
                vec![set("snorlax", &["tackle", "swordsdance"])],
            )
        };
        let mut original = build();
        play_turn(
            &mut original,
            Decision::switch(0, 1),
            Decision::use_move(0, 0),
        );
        play_moves(&mut original, 0, 1);
        assert_eq!(original.input_log.len(), 4);

        // Act: feed the recorded inputs to a fresh battle.
        let mut replay = build();
        for (side, decisions) in original.input_log.clone() {
            assert_ok(replay.choose(side, decisions));
        }

        // Assert
        assert_eq!(original.log.to_json(), replay.log.to_json());
        assert_eq!(original.prng.call_count(), replay.prng.call_count());
    }
}
