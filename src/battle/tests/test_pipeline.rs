#[cfg(test)]
mod tests {
    use crate::battle::actions::run_move_action;
    use crate::battle::choices::{Decision, RequestState};
    use crate::battle::log::LogEntry;
    use crate::battle::pokemon::MonId;
    use crate::battle::tests::common::{
        assert_ok, duel, lead_hp, play_moves, play_turn, set, teams_battle,
    };
    use dex::Id;
    use pretty_assertions::assert_eq;

    fn move_used_at(log: &[LogEntry], user: &str) -> Option<usize> {
        log.iter()
            .position(|e| matches!(e, LogEntry::MoveUsed { user: name, .. } if name == user))
    }

    #[test]
    fn test_tackle_trades_damage_and_spends_pp() {
        // Arrange
        let mut battle = duel(set("pikachu", &["tackle"]), set("snorlax", &["tackle"]));

        // Act
        play_moves(&mut battle, 0, 0);

        // Assert: the faster Pikachu moved first and both hits landed.
        let log = battle.log.entries();
        let pikachu = move_used_at(log, "Pikachu");
        let snorlax = move_used_at(log, "Snorlax");
        assert!(pikachu.is_some() && snorlax.is_some());
        assert!(pikachu < snorlax, "Pikachu outspeeds Snorlax");

        assert!(log.iter().any(
            |e| matches!(e, LogEntry::Damage { target, source: None, .. } if target == "Snorlax")
        ));
        assert!(lead_hp(&battle, 0) < battle.mon(MonId::new(0, 0)).max_hp);

        let slot = &battle.mon(MonId::new(0, 0)).moves[0];
        assert_eq!(slot.pp, slot.max_pp - 1);
    }

    #[test]
    fn test_priority_beats_raw_speed() {
        let mut battle = duel(set("snorlax", &["quickattack"]), set("pikachu", &["tackle"]));

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        assert!(move_used_at(log, "Snorlax") < move_used_at(log, "Pikachu"));
    }

    #[test]
    fn test_protect_blocks_the_incoming_hit() {
        let mut battle = duel(set("pikachu", &["protect"]), set("snorlax", &["tackle"]));

        play_moves(&mut battle, 0, 0);

        // Once for going up, once for eating the tackle.
        let shields = battle
            .log
            .entries()
            .iter()
            .filter(|e| matches!(e, LogEntry::Protected { name } if name == "Pikachu"))
            .count();
        assert_eq!(shields, 2);
        assert_eq!(lead_hp(&battle, 0), battle.mon(MonId::new(0, 0)).max_hp);
    }

    #[test]
    fn test_protect_fails_when_nothing_is_left_to_block() {
        // Both sides protect. The slower Snorlax acts last, with nothing
        // left in the queue to hide from.
        let mut battle = duel(set("pikachu", &["protect"]), set("snorlax", &["protect"]));

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::Protected { name } if name == "Pikachu")));
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::MoveFailed { user } if user == "Snorlax")));
        assert!(!battle.mon(MonId::new(1, 0)).has_volatile("protect"));
    }

    #[test]
    fn test_feint_tears_protection_down() {
        // Snorlax's protect goes up first on +4 priority; feint removes
        // it and connects instead of bouncing off.
        let mut battle = duel(set("pikachu", &["feint"]), set("snorlax", &["protect"]));

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        let shields = log
            .iter()
            .filter(|e| matches!(e, LogEntry::Protected { name } if name == "Snorlax"))
            .count();
        assert_eq!(shields, 1, "only the shield going up is announced");
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::Damage { target, .. } if target == "Snorlax")
        ));
        assert!(!battle.mon(MonId::new(1, 0)).has_volatile("protect"));
    }

    #[test]
    fn test_type_immunity_logs_zero_effectiveness() {
        let mut battle = duel(set("pikachu", &["tackle"]), set("gengar", &["tackle"]));

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::Effectiveness { target, multiplier } if target == "Gengar" && *multiplier == 0.0)
        ));
        assert_eq!(lead_hp(&battle, 1), battle.mon(MonId::new(1, 0)).max_hp);
    }

    #[test]
    fn test_levitate_shrugs_off_ground_moves() {
        let mut battle = duel(set("pikachu", &["earthquake"]), set("weezing", &["tackle"]));

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::Effectiveness { target, multiplier } if target == "Weezing" && *multiplier == 0.0)
        ));
        assert_eq!(lead_hp(&battle, 1), battle.mon(MonId::new(1, 0)).max_hp);
    }

    #[test]
    fn test_double_kick_lands_both_hits() {
        let mut battle = duel(set("pikachu", &["doublekick"]), set("snorlax", &["tackle"]));

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::HitCount { hits: 2 })));
        let hits = log
            .iter()
            .filter(|e| matches!(e, LogEntry::Damage { target, .. } if target == "Snorlax"))
            .count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_bullet_seed_rolls_the_weighted_table() {
        // With the fixed seed the hit-count sample comes up 4.
        let mut battle = duel(set("pikachu", &["bulletseed"]), set("snorlax", &["tackle"]));

        play_moves(&mut battle, 0, 0);

        assert!(battle
            .log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::HitCount { hits: 4 })));
    }

    #[test]
    fn test_multi_hit_stops_once_the_target_drops() {
        let mut battle = duel(set("pikachu", &["doublekick"]), set("snorlax", &["tackle"]));
        battle.mon_mut(MonId::new(1, 0)).hp = 10;

        play_moves(&mut battle, 0, 0);

        // The first kick faints Snorlax; the second never happens.
        let log = battle.log.entries();
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::Faint { name } if name == "Snorlax")));
        assert!(log.iter().any(|e| matches!(e, LogEntry::HitCount { hits: 1 })));
        let hits = log
            .iter()
            .filter(|e| matches!(e, LogEntry::Damage { target, .. } if target == "Snorlax"))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_false_swipe_stops_at_one_hp() {
        let mut battle = duel(set("pikachu", &["falseswipe"]), set("snorlax", &["tackle"]));
        battle.mon_mut(MonId::new(1, 0)).hp = 10;

        play_moves(&mut battle, 0, 0);

        assert_eq!(battle.mon(MonId::new(1, 0)).hp, 1);
        assert!(!battle
            .log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::Faint { .. })));
    }

    #[test]
    fn test_drain_heals_from_damage_dealt() {
        let mut battle = duel(set("pikachu", &["gigadrain"]), set("snorlax", &["tackle"]));
        battle.mon_mut(MonId::new(0, 0)).hp = 100;

        play_moves(&mut battle, 0, 0);

        assert!(battle.log.entries().iter().any(
            |e| matches!(e, LogEntry::Heal { target, source: Some(s), .. } if target == "Pikachu" && s == "drain")
        ));
    }

    #[test]
    fn test_recoil_comes_back_on_the_user() {
        let mut battle = duel(set("pikachu", &["bravebird"]), set("snorlax", &["tackle"]));

        play_moves(&mut battle, 0, 0);

        assert!(battle.log.entries().iter().any(
            |e| matches!(e, LogEntry::Damage { target, source: Some(s), .. } if target == "Pikachu" && s == "recoil")
        ));
    }

    #[test]
    fn test_struggle_covers_an_empty_moveset() {
        let mut battle = duel(set("pikachu", &["tackle"]), set("snorlax", &["tackle"]));
        battle.mon_mut(MonId::new(0, 0)).moves[0].pp = 0;

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::MoveUsed { user, move_name, .. } if user == "Pikachu" && move_name == "Struggle")
        ));
        // Quarter of 211 max HP, rounded half up.
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::Damage { target, amount: 53, source: Some(s), .. } if target == "Pikachu" && s == "recoil")
        ));
    }

    #[test]
    fn test_uturn_pauses_the_turn_for_its_switch() {
        // Arrange
        let mut battle = teams_battle(
            vec![set("pikachu", &["uturn"]), set("charizard", &["tackle"])],
            vec![set("snorlax", &["tackle"])],
        );

        // Act: Pikachu pivots out before Snorlax has moved.
        play_moves(&mut battle, 0, 0);

        // Assert: the turn is paused on a switch request.
        let request = match battle.request_for(0) {
            Some(request) => request,
            None => panic!("side 0 should owe a replacement"),
        };
        assert_eq!(request.state, RequestState::Switch);
        assert!(move_used_at(battle.log.entries(), "Snorlax").is_none());

        // Act: send in the replacement; the rest of the turn resumes.
        assert_ok(battle.choose(0, vec![Decision::switch(0, 1)]));

        let log = battle.log.entries();
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::SwitchIn { name, dragged: false, .. } if name == "Charizard")
        ));
        assert!(move_used_at(log, "Snorlax").is_some());
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::TurnStart { turn: 2 })));
    }

    #[test]
    fn test_hyper_beam_spends_the_next_turn_recharging() {
        // Arrange
        let mut battle = duel(set("pikachu", &["hyperbeam"]), set("snorlax", &["tackle"]));

        // Act: turn one, the beam lands.
        play_moves(&mut battle, 0, 0);

        // Assert
        assert!(battle
            .log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::MustRecharge { name } if name == "Pikachu")));

        let request = match battle.request_for(0) {
            Some(request) => request,
            None => panic!("turn two should owe decisions"),
        };
        assert!(request.slots[0].must_recharge);
        assert!(request.slots[0].moves.is_empty());

        // Act: turn two is a forced pass.
        play_turn(&mut battle, Decision::pass(0), Decision::use_move(0, 0));

        // Assert
        assert!(battle.log.entries().iter().any(
            |e| matches!(e, LogEntry::Cant { name, reason } if name == "Pikachu" && reason == "must recharge")
        ));
        assert!(!battle.mon(MonId::new(0, 0)).has_volatile("mustrecharge"));

        // Turn three offers moves again.
        let request = match battle.request_for(0) {
            Some(request) => request,
            None => panic!("turn three should owe decisions"),
        };
        assert!(!request.slots[0].moves.is_empty());
    }

    #[test]
    fn test_charge_turn_goes_semi_invulnerable() {
        // Arrange
        let mut battle = duel(set("pikachu", &["fly"]), set("snorlax", &["tackle"]));

        // Act: turn one, Pikachu goes up and the tackle whiffs.
        play_moves(&mut battle, 0, 0);

        // Assert
        let log = battle.log.entries();
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::MovePrepare { user, move_name } if user == "Pikachu" && move_name == "Fly")));
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::MoveMissed { user, target } if user == "Snorlax" && target == "Pikachu")
        ));

        let request = match battle.request_for(0) {
            Some(request) => request,
            None => panic!("turn two should owe decisions"),
        };
        assert!(request.slots[0].locked_move.is_some());

        // Act: turn two releases the move.
        play_moves(&mut battle, 0, 0);

        // Assert
        assert!(battle.log.entries().iter().any(
            |e| matches!(e, LogEntry::Damage { target, .. } if target == "Snorlax")
        ));
        assert!(!battle.mon(MonId::new(0, 0)).has_volatile("fly"));
    }

    #[test]
    fn test_gust_reaches_the_airborne() {
        let mut battle = duel(set("pikachu", &["fly"]), set("snorlax", &["gust"]));

        play_moves(&mut battle, 0, 0);

        // Gust connects during the charge turn.
        assert!(battle.log.entries().iter().any(
            |e| matches!(e, LogEntry::Damage { target, .. } if target == "Pikachu")
        ));
    }

    #[test]
    fn test_whirlwind_drags_out_the_bench() {
        let mut battle = teams_battle(
            vec![set("snorlax", &["whirlwind"])],
            vec![set("pikachu", &["tackle"]), set("charizard", &["tackle"])],
        );

        play_moves(&mut battle, 0, 0);

        let log = battle.log.entries();
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::SwitchIn { name, dragged: true, .. } if name == "Charizard")
        ));
        assert_eq!(battle.side(1).active, vec![Some(1)]);
    }

    #[test]
    fn test_spectral_thief_takes_positive_stages() {
        // Arrange: Garchomp is faster and boosts first.
        let mut battle = duel(
            set("pikachu", &["spectralthief"]),
            set("garchomp", &["swordsdance"]),
        );

        // Act
        play_moves(&mut battle, 0, 0);

        // Assert: the +2 moved across before the hit.
        assert!(battle.log.entries().iter().any(
            |e| matches!(e, LogEntry::BoostsStolen { user, target } if user == "Pikachu" && target == "Garchomp")
        ));
        assert_eq!(battle.mon(MonId::new(0, 0)).boosts.atk, 2);
        assert_eq!(battle.mon(MonId::new(1, 0)).boosts.atk, 0);
    }

    #[test]
    fn test_move_into_an_empty_slot_fizzles_silently() {
        // Arrange: the only foe is already down and nothing can redirect.
        let mut battle = duel(set("pikachu", &["tackle"]), set("snorlax", &["tackle"]));
        let snorlax = battle.mon_mut(MonId::new(1, 0));
        snorlax.hp = 0;
        snorlax.fainted = true;

        // Act: drive the queued move directly.
        run_move_action(
            &mut battle,
            MonId::new(0, 0),
            &Id::new("tackle"),
            Some(MonId::new(1, 0)),
            false,
        );

        // Assert: the move announces, then nothing. No damage, no
        // failure message.
        let log = battle.log.entries();
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::MoveUsed { user, .. } if user == "Pikachu")));
        assert!(!log.iter().any(|e| matches!(e, LogEntry::Damage { .. })));
        assert!(!log.iter().any(|e| matches!(e, LogEntry::MoveFailed { .. })));
    }
}
