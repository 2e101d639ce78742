#[cfg(test)]
mod tests {
    use crate::battle::choices::{Decision, RequestState};
    use crate::battle::log::LogEntry;
    use crate::battle::pokemon::{MonId, StatusId};
    use crate::battle::state::Outcome;
    use crate::battle::tests::common::{
        assert_ok, duel, play_moves, play_turn, set, teams_battle,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_switch_resolves_before_the_move() {
        // Arrange
        let mut battle = teams_battle(
            vec![set("pikachu", &["tackle"]), set("charizard", &["tackle"])],
            vec![set("snorlax", &["tackle"])],
        );

        // Act
        play_turn(&mut battle, Decision::switch(0, 1), Decision::use_move(0, 0));

        // Assert: the replacement is already in when the tackle arrives.
        let log = battle.log.entries();
        let switch_in = log
            .iter()
            .position(|e| matches!(e, LogEntry::SwitchIn { name, .. } if name == "Charizard"));
        let tackle = log
            .iter()
            .position(|e| matches!(e, LogEntry::MoveUsed { user, .. } if user == "Snorlax"));
        assert!(switch_in.is_some() && tackle.is_some());
        assert!(switch_in < tackle);
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::Damage { target, .. } if target == "Charizard")));
    }

    #[test]
    fn test_switching_clears_stages_and_field_time() {
        // Arrange
        let mut battle = teams_battle(
            vec![
                set("pikachu", &["swordsdance", "tackle"]),
                set("charizard", &["tackle"]),
            ],
            vec![set("snorlax", &["swordsdance"])],
        );

        // Act: boost, then leave.
        play_moves(&mut battle, 0, 0);
        assert_eq!(battle.mon(MonId::new(0, 0)).boosts.atk, 2);
        play_turn(&mut battle, Decision::switch(0, 1), Decision::use_move(0, 0));

        // Assert
        let benched = battle.mon(MonId::new(0, 0));
        assert_eq!(benched.boosts.atk, 0);
        assert_eq!(benched.active_turns, 0);
    }

    #[test]
    fn test_toxic_count_restarts_after_a_switch() {
        // Arrange: Pikachu badly poisons Snorlax, which then ducks out
        // for a turn and comes back.
        let mut battle = teams_battle(
            vec![set("pikachu", &["toxic", "swordsdance"])],
            vec![
                set("snorlax", &["swordsdance"]),
                set("garchomp", &["swordsdance"]),
            ],
        );

        // Act
        play_moves(&mut battle, 0, 0); // toxic lands; tick at 1/16
        play_turn(&mut battle, Decision::use_move(0, 1), Decision::switch(0, 1));
        play_turn(&mut battle, Decision::use_move(0, 1), Decision::switch(0, 0));

        // Assert: the count went back to one sixteenth, not two.
        let ticks: Vec<u16> = battle
            .log
            .entries()
            .iter()
            .filter_map(|e| match e {
                LogEntry::Damage {
                    amount,
                    source: Some(s),
                    ..
                } if s == "poison" => Some(*amount),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![28, 28]);
        assert_eq!(battle.mon(MonId::new(1, 0)).status, Some(StatusId::Toxic));
    }

    #[test]
    fn test_lead_intimidate_lowers_attack_at_start() {
        // Arrange & Act: triggers fire as the leads hit the field.
        let battle = duel(set("gyarados", &["tackle"]), set("snorlax", &["swordsdance"]));

        // Assert
        let log = battle.log.entries();
        assert!(log.iter().any(|e| matches!(
            e,
            LogEntry::AbilityActivated { name, ability } if name == "Gyarados" && ability == "Intimidate"
        )));
        assert!(log.iter().any(|e| matches!(
            e,
            LogEntry::BoostChanged { target, delta: -1, stage: -1, .. } if target == "Snorlax"
        )));
        assert_eq!(battle.mon(MonId::new(1, 0)).boosts.atk, -1);
    }

    #[test]
    fn test_sturdy_hangs_on_once_then_breaks() {
        // Arrange: a double-weak STAB hit that would flatten Skarmory
        // from full health.
        let mut battle = duel(
            set("charizard", &["flamethrower"]),
            set("skarmory", &["swordsdance"]),
        );

        // Act: turn one.
        play_moves(&mut battle, 0, 0);

        // Assert: held at exactly 1 HP.
        assert_eq!(battle.mon(MonId::new(1, 0)).hp, 1);
        assert!(battle.log.entries().iter().any(|e| matches!(
            e,
            LogEntry::AbilityActivated { name, ability } if name == "Skarmory" && ability == "Sturdy"
        )));

        // Act: turn two, no longer at full health.
        play_moves(&mut battle, 0, 0);

        // Assert
        assert!(battle
            .log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::Faint { name } if name == "Skarmory")));
        assert_eq!(battle.outcome, Some(Outcome::Win(0)));
    }

    #[test]
    fn test_sand_stream_summons_a_sandstorm() {
        // Arrange & Act
        let mut battle = duel(set("tyranitar", &["swordsdance"]), set("snorlax", &["swordsdance"]));

        // Assert: weather up before the first turn.
        let log = battle.log.entries();
        assert!(log.iter().any(|e| matches!(
            e,
            LogEntry::AbilityActivated { name, ability } if name == "Tyranitar" && ability == "Sand Stream"
        )));
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::WeatherStart { weather } if weather == "Sandstorm")));

        // Act: one full turn.
        play_moves(&mut battle, 0, 0);

        // Assert: the Rock type stands in its own storm unhurt.
        let chipped: Vec<String> = battle
            .log
            .entries()
            .iter()
            .filter_map(|e| match e {
                LogEntry::Damage {
                    target,
                    source: Some(s),
                    ..
                } if s == "the sandstorm" => Some(target.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(chipped, vec!["Snorlax".to_string()]);
    }

    #[test]
    fn test_fainting_requests_a_replacement() {
        // Arrange: Pikachu is down to a sliver and slower than nothing,
        // so Snorlax's tackle ends it.
        let mut battle = teams_battle(
            vec![set("pikachu", &["tackle"]), set("charizard", &["tackle"])],
            vec![set("snorlax", &["tackle"])],
        );
        battle.mon_mut(MonId::new(0, 0)).hp = 1;

        // Act
        play_moves(&mut battle, 0, 0);

        // Assert: the turn ended on a replacement request.
        assert!(battle
            .log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::Faint { name } if name == "Pikachu")));
        let request = match battle.request_for(0) {
            Some(request) => request,
            None => panic!("side 0 should owe a replacement"),
        };
        assert_eq!(request.state, RequestState::Switch);
        assert_eq!(request.can_switch, vec![1]);

        // Act: fill the slot.
        assert_ok(battle.choose(0, vec![Decision::switch(0, 1)]));

        // Assert
        assert!(battle
            .log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::SwitchIn { name, .. } if name == "Charizard")));
        assert!(battle
            .log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::TurnStart { turn: 2 })));
    }
}
