//! Unit tests for col-agent.

#[cfg(test)]
mod stats {
    use col_core::{AgentRng, CitizenId};

    use crate::{Skill, Stats};

    #[test]
    fn low_cap_gives_all_ones() {
        let mut rng = AgentRng::new(1, CitizenId(0));
        assert_eq!(Stats::roll_new(0, &mut rng), Stats::uniform(1));
        assert_eq!(Stats::roll_new(1, &mut rng), Stats::uniform(1));
    }

    #[test]
    fn rolls_stay_below_cap() {
        let mut rng = AgentRng::new(7, CitizenId(3));
        for _ in 0..200 {
            let s = Stats::roll_new(6, &mut rng);
            for skill in Skill::ALL {
                assert!((1..=5).contains(&s.get(skill)), "{skill:?} = {}", s.get(skill));
            }
        }
    }

    #[test]
    fn raise_respects_cap_and_never_lowers() {
        let mut s = Stats::uniform(4);
        assert!(s.raise(Skill::Strength, 5));
        assert!(!s.raise(Skill::Strength, 5));
        assert_eq!(s.strength, 5);
        // cap dropped below the current value: kept as is
        assert!(!s.raise(Skill::Strength, 2));
        assert_eq!(s.strength, 5);
    }

    #[test]
    fn random_level_up_odds() {
        let mut rng = AgentRng::new(42, CitizenId(1));
        let mut s = Stats::uniform(1);
        let hits = (0..5_000)
            .filter(|_| s.try_random_level_up(&mut rng, 1_000, 0).is_some())
            .count();
        // one in fifty
        assert!((50..=160).contains(&hits), "hits = {hits}");
        let total: u32 = Skill::ALL.iter().map(|k| s.get(*k)).sum();
        assert_eq!(total as usize, 5 + hits);
    }

    #[test]
    fn custom_chance_of_one_always_levels() {
        let mut rng = AgentRng::new(0, CitizenId(0));
        let mut s = Stats::uniform(1);
        assert!(s.try_random_level_up(&mut rng, 10, 1).is_some());
    }
}

#[cfg(test)]
mod citizen {
    use col_core::{CitizenId, Vec3};
    use col_world::{ItemKind, ItemStack};

    use crate::stats::{FULL_SATURATION, MAX_SATURATION};
    use crate::{CitizenDataBuilder, Job, JobKind};

    #[test]
    fn saturation_is_bounded() {
        let mut d = CitizenDataBuilder::new(CitizenId(0)).saturation(18.0).build();
        d.increase_saturation(-5.0);
        assert_eq!(d.saturation(), MAX_SATURATION);
        d.decrease_saturation(4.0, 2.0);
        assert_eq!(d.saturation(), 12.0);
        d.decrease_saturation(100.0, 1.0);
        assert_eq!(d.saturation(), 0.0);
        d.set_saturation(FULL_SATURATION);
        assert_eq!(d.saturation(), FULL_SATURATION);
    }

    #[test]
    fn experience_only_with_a_job() {
        let mut d = CitizenDataBuilder::new(CitizenId(0)).build();
        assert_eq!(d.add_experience(100.0), 0);
        assert_eq!(d.level(), 0);

        d.set_job(Some(Job::new(JobKind::Miner, None)));
        assert!(d.add_experience(100.0) > 0);
        let miner_level = d.level();
        assert!(miner_level > 0);

        d.set_job(Some(Job::new(JobKind::Sifter, None)));
        assert_eq!(d.level(), 0, "experience is per job");
        assert_eq!(d.experience_in(JobKind::Miner).level, miner_level);
    }

    #[test]
    fn held_item_wears_out() {
        let mut d = CitizenDataBuilder::new(CitizenId(0))
            .item(ItemStack::new(ItemKind::WoodenSword, 1))
            .held_slot(0)
            .build();
        let max = ItemKind::WoodenSword.max_damage();
        for _ in 1..max {
            assert!(!d.damage_held_item(1));
        }
        assert!(d.damage_held_item(1));
        assert_eq!(d.held_item(), None);
        assert!(d.inventory().is_empty());
    }

    #[test]
    fn held_slot_out_of_range_is_ignored() {
        let d = CitizenDataBuilder::new(CitizenId(0)).inventory_slots(3).held_slot(9).build();
        assert_eq!(d.held_slot(), None);
    }

    #[test]
    fn builder_places_items() {
        let d = CitizenDataBuilder::new(CitizenId(2))
            .position(Vec3::new(1.5, 2.0, 3.5))
            .item(ItemStack::new(ItemKind::Bread, 70))
            .build();
        assert_eq!(d.inventory().iter().count(), 2);
        assert_eq!(d.position(), Vec3::new(1.5, 2.0, 3.5));
    }
}

#[cfg(test)]
mod interactions {
    use col_core::CitizenId;

    use crate::arena::Arena;
    use crate::{AgentError, CitizenData, CitizenDataBuilder, Interaction, InteractionPriority};

    fn live_citizen() -> CitizenData {
        let mut arena = Arena::new();
        let mut d = CitizenDataBuilder::new(CitizenId(1)).saturation(2.0).build();
        d.set_entity(Some(arena.insert(())));
        d
    }

    #[test]
    fn trigger_is_deduplicated() {
        let mut d = live_citizen();
        assert!(d.trigger_interaction(Interaction::new("no_restaurant", InteractionPriority::Blocking)));
        assert!(!d.trigger_interaction(Interaction::new("no_restaurant", InteractionPriority::Blocking)));
        assert_eq!(d.interactions().len(), 1);
        assert!(d.interactions().has_blocking());
    }

    #[test]
    fn invalid_and_failing_checks_are_removed() {
        let mut d = live_citizen();
        d.trigger_interaction(
            Interaction::new("hungry", InteractionPriority::Important).valid_while(|c| Ok(c.saturation() < 5.0)),
        );
        d.trigger_interaction(Interaction::new("broken", InteractionPriority::Chitchat).valid_while(|c| {
            Err(AgentError::InteractionCheck { key: "broken".into(), reason: format!("{}", c.id()) })
        }));
        d.trigger_interaction(Interaction::new("forever", InteractionPriority::Chitchat));

        let removed = d.tick_interactions();
        assert_eq!(removed, vec!["broken".to_string()]);

        d.increase_saturation(10.0);
        let removed = d.tick_interactions();
        assert_eq!(removed, vec!["hungry".to_string()]);
        assert!(d.interactions().contains("forever"));
    }

    #[test]
    fn no_checks_without_live_entity() {
        let mut d = CitizenDataBuilder::new(CitizenId(1)).build();
        d.trigger_interaction(Interaction::new("x", InteractionPriority::Chitchat).valid_while(|_| Ok(false)));
        assert!(d.tick_interactions().is_empty());
        assert!(d.interactions().contains("x"));
    }
}

#[cfg(test)]
mod persistence {
    use col_core::{CitizenId, Vec3};
    use col_world::{ItemKind, ItemStack};

    use crate::{CitizenData, CitizenDataBuilder, CitizenRecord, Interaction, InteractionPriority, Job, JobKind, Stats};

    fn sample() -> CitizenData {
        let mut d = CitizenDataBuilder::new(CitizenId(9))
            .name("Mira")
            .position(Vec3::new(4.5, 65.0, -2.5))
            .stats(Stats { intelligence: 3, charisma: 4, strength: 5, endurance: 2, dexterity: 1 })
            .saturation(6.5)
            .job(Job::new(JobKind::Knight, None))
            .item(ItemStack::new(ItemKind::IronSword, 1))
            .item(ItemStack::new(ItemKind::Bread, 12))
            .held_slot(0)
            .build();
        d.add_experience(42.0);
        d.trigger_interaction(
            Interaction::new("need_shield", InteractionPriority::Blocking).with_args(vec!["shield".into()]),
        );
        d
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let d = sample();
        let json = serde_json::to_string(&d.serialize()).unwrap();
        let record: CitizenRecord = serde_json::from_str(&json).unwrap();
        let back = CitizenData::deserialize(record).unwrap();
        assert_eq!(back.serialize(), d.serialize());
        assert_eq!(back.held_item(), Some(ItemStack::new(ItemKind::IronSword, 1)));
        assert_eq!(back.level(), d.level());
        assert!(back.interactions().contains("need_shield"));
        assert_eq!(back.entity(), None, "live link is not persisted");
    }

    #[test]
    fn rejects_bad_saturation() {
        let mut record = sample().serialize();
        record.saturation = f64::NAN;
        assert!(CitizenData::deserialize(record).is_err());
    }

    #[test]
    fn rejects_bad_held_slot() {
        let mut record = sample().serialize();
        record.held_slot = Some(500);
        assert!(CitizenData::deserialize(record).is_err());
    }
}

#[cfg(test)]
mod arena {
    use crate::Arena;

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.try_resolve(a), None);
        assert_eq!(arena.remove(a), None);

        let c = arena.insert("c");
        assert_eq!(c.index(), a.index(), "slot is reused");
        assert_ne!(c, a);
        assert_eq!(arena.try_resolve(a), None);
        assert_eq!(arena.try_resolve(c), Some(&"c"));
        assert_eq!(arena.try_resolve(b), Some(&"b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn iteration_is_in_slot_order() {
        let mut arena = Arena::new();
        let hs: Vec<_> = (0..5).map(|i| arena.insert(i)).collect();
        arena.remove(hs[1]);
        arena.remove(hs[3]);
        let seen: Vec<i32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(seen, vec![0, 2, 4]);
        let h = arena.insert(10);
        assert_eq!(h.index(), 1, "lowest free slot first");
        for (_, v) in arena.iter_mut() {
            *v += 1;
        }
        assert_eq!(arena.try_resolve(h), Some(&11));
    }
}
