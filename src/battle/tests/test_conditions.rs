#[cfg(test)]
mod tests {
    use crate::battle::actions::ActiveMove;
    use crate::battle::damage::compute_damage;
    use crate::battle::log::LogEntry;
    use crate::battle::pokemon::{MonId, StatusId};
    use crate::battle::state::Battle;
    use crate::battle::tests::common::{duel, play_moves, play_turn, set, teams_battle};
    use crate::battle::choices::Decision;
    use dex::{Id, MoveCategory, MoveFlags, Type};
    use pretty_assertions::assert_eq;

    /// Index range of one turn's log entries.
    fn turn_segment(log: &[LogEntry], turn: u32) -> (usize, usize) {
        let start = log
            .iter()
            .position(|e| matches!(e, LogEntry::TurnStart { turn: t } if *t == turn))
            .unwrap_or(0);
        let end = log
            .iter()
            .position(|e| matches!(e, LogEntry::TurnStart { turn: t } if *t == turn + 1))
            .unwrap_or(log.len());
        (start, end)
    }

    fn hazard_damages(log: &[LogEntry], source_name: &str) -> Vec<(String, u16)> {
        log.iter()
            .filter_map(|e| match e {
                LogEntry::Damage {
                    target,
                    amount,
                    source: Some(s),
                    ..
                } if s == source_name => Some((target.clone(), *amount)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_stealth_rock_chips_by_rock_weakness() {
        // Arrange
        let mut battle = teams_battle(
            vec![
                set("pikachu", &["tackle"]),
                set("charizard", &["tackle"]),
                set("metagross", &["tackle"]),
                set("garchomp", &["tackle"]),
            ],
            vec![set("snorlax", &["stealthrock", "swordsdance"])],
        );

        // Act: rocks go down, then three switch-ins of varying weakness.
        play_turn(&mut battle, Decision::use_move(0, 0), Decision::use_move(0, 0));
        play_turn(&mut battle, Decision::switch(0, 1), Decision::use_move(0, 1));
        play_turn(&mut battle, Decision::switch(0, 2), Decision::use_move(0, 1));
        play_turn(&mut battle, Decision::switch(0, 3), Decision::use_move(0, 1));

        // Assert: an eighth scaled by the Rock matchup each time.
        let log = battle.log.entries();
        assert!(log.iter().any(
            |e| matches!(e, LogEntry::SideConditionStart { side: 0, condition } if condition == "Stealth Rock")
        ));
        assert_eq!(
            hazard_damages(log, "Stealth Rock"),
            vec![
                ("Charizard".to_string(), 148), // 297 max, double weak
                ("Metagross".to_string(), 18),  // 301 max, resisted
                ("Garchomp".to_string(), 22),   // 357 max, resisted
            ]
        );
    }

    #[test]
    fn test_spikes_stack_and_spare_the_airborne() {
        // Arrange
        let mut battle = teams_battle(
            vec![
                set("pikachu", &["swordsdance"]),
                set("garchomp", &["tackle"]),
                set("charizard", &["tackle"]),
            ],
            vec![set("snorlax", &["spikes", "swordsdance"])],
        );

        // Act: three layers, then a grounded and an airborne switch-in.
        for _ in 0..3 {
            play_moves(&mut battle, 0, 0);
        }
        play_turn(&mut battle, Decision::switch(0, 1), Decision::use_move(0, 0));
        play_turn(&mut battle, Decision::switch(0, 2), Decision::use_move(0, 1));

        // Assert
        let log = battle.log.entries();
        let layers = log
            .iter()
            .filter(|e| matches!(e, LogEntry::SideConditionStart { side: 0, condition } if condition == "Spikes"))
            .count();
        assert_eq!(layers, 3);

        // Three layers cost a quarter of 357; Charizard floats over them.
        assert_eq!(
            hazard_damages(log, "Spikes"),
            vec![("Garchomp".to_string(), 89)]
        );

        // The fourth cast had nothing to add.
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::MoveFailed { user } if user == "Snorlax")));
    }

    /// Tuned duel from the damage tests: Atk 150 into Def 100.
    fn tuned_duel() -> (Battle, MonId, MonId) {
        let mut ours = set("pikachu", &["tackle"]);
        ours.evs.atk = 16;
        let mut theirs = set("pikachu", &["tackle"]);
        theirs.ivs.def = 0;
        theirs.evs.def = 60;
        let battle = duel(ours, theirs);
        (battle, MonId::new(0, 0), MonId::new(1, 0))
    }

    fn blow(battle: &Battle, user: MonId, category: MoveCategory) -> ActiveMove {
        let mut data = match battle.dex.move_data(&Id::new("tackle")) {
            Some(data) => data.clone(),
            None => panic!("tackle missing from the dex"),
        };
        data.name = "Test Blow".to_string();
        data.move_type = Type::Typeless;
        data.category = category;
        data.base_power = 80;
        data.accuracy = None;
        data.flags = MoveFlags::default();
        ActiveMove {
            id: Id::new("testblow"),
            data,
            user,
            zmove: false,
            spread: false,
            crit: false,
            total_damage: 0,
        }
    }

    #[test]
    fn test_reflect_halves_physical_but_crits_pierce() {
        let (mut battle, us, them) = tuned_duel();
        assert!(battle.add_side_condition(1, &Id::new("reflect")));

        let mv = blow(&battle, us, MoveCategory::Physical);
        battle.active_move = Some(mv.clone());

        assert_eq!(compute_damage(&battle, us, them, &mv, false, 0), 51);
        assert_eq!(compute_damage(&battle, us, them, &mv, true, 0), 153);
    }

    #[test]
    fn test_light_screen_covers_special_only() {
        let (mut battle, us, them) = tuned_duel();

        let mv = blow(&battle, us, MoveCategory::Special);
        battle.active_move = Some(mv.clone());
        let unscreened = compute_damage(&battle, us, them, &mv, false, 0);
        assert_eq!(unscreened, 69);

        // Reflect ignores special hits entirely.
        assert!(battle.add_side_condition(1, &Id::new("reflect")));
        assert_eq!(compute_damage(&battle, us, them, &mv, false, 0), 69);

        assert!(battle.add_side_condition(1, &Id::new("lightscreen")));
        assert_eq!(compute_damage(&battle, us, them, &mv, false, 0), 34);
    }

    #[test]
    fn test_screens_expire_on_the_fifth_turn() {
        // Arrange
        let mut battle = duel(
            set("pikachu", &["reflect", "swordsdance"]),
            set("snorlax", &["swordsdance"]),
        );

        // Act: Reflect on turn one, then coast to the end of turn five.
        play_moves(&mut battle, 0, 0);
        for _ in 0..4 {
            play_moves(&mut battle, 1, 0);
        }

        // Assert: the screen falls during turn five's residual phase.
        let log = battle.log.entries();
        let end = log
            .iter()
            .position(|e| matches!(e, LogEntry::SideConditionEnd { side: 0, condition } if condition == "Reflect"));
        let (from, to) = turn_segment(log, 5);
        match end {
            Some(at) => assert!(at > from && at < to, "Reflect should end in turn five"),
            None => panic!("Reflect never ended"),
        }
    }

    #[test]
    fn test_sandstorm_runs_four_pulses_then_clears() {
        // Arrange
        let mut battle = duel(
            set("pikachu", &["sandstorm", "swordsdance"]),
            set("snorlax", &["swordsdance"]),
        );

        // Act
        play_moves(&mut battle, 0, 0);
        for _ in 0..4 {
            play_moves(&mut battle, 1, 0);
        }

        // Assert: both bystanders chip on turns one through four; the
        // duration tick runs ahead of the damage hook, so turn five only
        // clears the sand.
        let log = battle.log.entries();
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::WeatherStart { weather } if weather == "Sandstorm")));
        let chips = log
            .iter()
            .filter(|e| matches!(e, LogEntry::Damage { source: Some(s), .. } if s == "the sandstorm"))
            .count();
        assert_eq!(chips, 8);

        let end = log
            .iter()
            .position(|e| matches!(e, LogEntry::WeatherEnd { weather } if weather == "Sandstorm"));
        let (from, to) = turn_segment(log, 5);
        match end {
            Some(at) => assert!(at > from && at < to, "sand should settle in turn five"),
            None => panic!("the sandstorm never ended"),
        }
    }

    #[test]
    fn test_trick_room_inverts_the_move_order() {
        // Arrange
        let mut battle = duel(
            set("snorlax", &["trickroom", "swordsdance"]),
            set("pikachu", &["swordsdance"]),
        );

        // Act: set the room, then play out its five turns.
        play_moves(&mut battle, 0, 0);
        for _ in 0..5 {
            play_moves(&mut battle, 1, 0);
        }

        let log = battle.log.entries();
        assert!(log
            .iter()
            .any(|e| matches!(e, LogEntry::FieldStart { effect } if effect == "Trick Room")));

        // Assert: inside the room the slow Snorlax moves first.
        let (from, to) = turn_segment(log, 2);
        let snorlax = log[from..to]
            .iter()
            .position(|e| matches!(e, LogEntry::MoveUsed { user, .. } if user == "Snorlax"));
        let pikachu = log[from..to]
            .iter()
            .position(|e| matches!(e, LogEntry::MoveUsed { user, .. } if user == "Pikachu"));
        assert!(snorlax < pikachu, "Trick Room should reverse the order");

        // The room tears down during turn five.
        let end = log
            .iter()
            .position(|e| matches!(e, LogEntry::FieldEnd { effect } if effect == "Trick Room"));
        let (from, to) = turn_segment(log, 5);
        match end {
            Some(at) => assert!(at > from && at < to, "the room should expire in turn five"),
            None => panic!("Trick Room never ended"),
        }

        // Assert: normal order is back on turn six.
        let (from, to) = turn_segment(log, 6);
        let snorlax = log[from..to]
            .iter()
            .position(|e| matches!(e, LogEntry::MoveUsed { user, .. } if user == "Snorlax"));
        let pikachu = log[from..to]
            .iter()
            .position(|e| matches!(e, LogEntry::MoveUsed { user, .. } if user == "Pikachu"));
        assert!(pikachu < snorlax, "order should revert once the room falls");
    }

    #[test]
    fn test_electric_terrain_blocks_sleep_for_the_grounded() {
        let mut battle = duel(set("snorlax", &["tackle"]), set("charizard", &["tackle"]));
        assert!(battle.set_terrain_id(&Id::new("electricterrain"), None));

        assert!(!battle.try_set_status(MonId::new(0, 0), None, StatusId::Sleep));
        assert_eq!(battle.mon(MonId::new(0, 0)).status, None);

        // Charizard floats above the terrain and sleeps fine.
        assert!(battle.try_set_status(MonId::new(1, 0), None, StatusId::Sleep));
        assert_eq!(battle.mon(MonId::new(1, 0)).status, Some(StatusId::Sleep));
    }

    #[test]
    fn test_electric_terrain_boosts_grounded_electric_power() {
        let (mut battle, us, them) = tuned_duel();
        battle.mon_mut(them).types = vec![Type::Normal];
        assert!(battle.set_terrain_id(&Id::new("electricterrain"), None));

        let mut mv = blow(&battle, us, MoveCategory::Physical);
        mv.data.move_type = Type::Electric;

        // 80 BP scaled by 5325/4096 before the formula, then STAB.
        assert_eq!(compute_damage(&battle, us, them, &mv, false, 0), 199);

        // An airborne attacker keeps STAB off its species types but loses
        // the terrain boost.
        battle.mon_mut(us).types = vec![Type::Flying];
        assert_eq!(compute_damage(&battle, us, them, &mv, false, 0), 153);
    }

    #[test]
    fn test_grassy_terrain_heals_the_damaged() {
        let mut battle = duel(set("snorlax", &["tackle"]), set("pikachu", &["tackle"]));
        assert!(battle.set_terrain_id(&Id::new("grassyterrain"), None));
        battle.mon_mut(MonId::new(0, 0)).hp = 100;

        battle.run_residual_phase();

        // A sixteenth of 461, and nothing for the untouched Pikachu.
        let log = battle.log.entries();
        assert!(log.iter().any(|e| matches!(
            e,
            LogEntry::Heal { target, amount: 28, source: Some(s), .. }
                if target == "Snorlax" && s == "Grassy Terrain"
        )));
        assert!(!log
            .iter()
            .any(|e| matches!(e, LogEntry::Heal { target, .. } if target == "Pikachu")));
    }
}
