//! Integration scenarios: the engine driven through its public API,
//! from activation gating to the composed damage numbers.

use ability_core::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const HERO: ActorId = ActorId(1);
const OGRE: ActorId = ActorId(2);

struct GridWorld {
    allies: Vec<ActorId>,
    enemies: Vec<ActorId>,
}

impl GridWorld {
    fn new(allies: Vec<ActorId>, enemies: Vec<ActorId>) -> Self {
        GridWorld { allies, enemies }
    }

    fn empty() -> Self {
        GridWorld::new(Vec::new(), Vec::new())
    }
}

impl SpatialQuery for GridWorld {
    fn nearby_allies(&self, _origin: ActorId, _radius: f64) -> Vec<ActorId> {
        self.allies.clone()
    }

    fn nearby_enemies(&self, _origin: ActorId, _radius: f64) -> Vec<ActorId> {
        self.enemies.clone()
    }

    fn distance(&self, _a: ActorId, b: ActorId) -> Option<f64> {
        if self.enemies.contains(&b) || self.allies.contains(&b) {
            Some(2.0)
        } else {
            None
        }
    }
}

struct TierProfile {
    multiplier: f64,
    tier: u32,
}

impl PowerProfile for TierProfile {
    fn stat_multiplier(&self, _actor: ActorId) -> f64 {
        self.multiplier
    }

    fn power_tier(&self, _actor: ActorId) -> u32 {
        self.tier
    }
}

fn baseline_profile() -> TierProfile {
    TierProfile {
        multiplier: 1.0,
        tier: 1,
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    events: Rc<RefCell<Vec<EngineEvent>>>,
}

impl FeedbackSink for RecordingSink {
    fn notify(&mut self, event: &EngineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

fn def(id: &str, cooldown_ticks: u64, behavior: AbilityBehavior) -> AbilityDef {
    AbilityDef {
        id: id.to_string(),
        name: id.to_string(),
        cooldown_ticks,
        crit_chance: 0.0,
        behavior,
    }
}

fn roster() -> HashMap<String, AbilityDef> {
    let defs = vec![
        def(
            "strike",
            30,
            AbilityBehavior::Strike {
                base_damage: 10.0,
                range: 20.0,
            },
        ),
        def(
            "bulwark",
            80,
            AbilityBehavior::ChargeRelease {
                window_ticks: 5,
                block_factor: 0.5,
                release_multiplier: 2.0,
                radius: 6.0,
            },
        ),
        def("amp", 0, AbilityBehavior::DamageAmp { factor: 0.25 }),
        def(
            "mark",
            0,
            AbilityBehavior::MarkPrey {
                effect_id: "prey_mark".to_string(),
                per_stack_bonus: 0.05,
                max_stacks: 5,
                duration_ticks: 10,
            },
        ),
        def(
            "surge",
            0,
            AbilityBehavior::ThresholdSurge {
                base_threshold: 12,
                counter_window_ticks: 600,
                bonus_effect: "surge_bonus".to_string(),
                bonus_value: 0.30,
                bonus_duration_ticks: 100,
            },
        ),
    ];
    defs.into_iter().map(|d| (d.id.clone(), d)).collect()
}

/// Constants with the momentum additive rates zeroed, isolating the
/// fever multiplier the way the reference numbers expect
fn flat_momentum_constants() -> EngineConstants {
    let mut constants = EngineConstants::default();
    constants.momentum.combo_bonus_per_event = 0.0;
    constants.momentum.streak_bonus_per_event = 0.0;
    constants
}

fn engine_with(constants: EngineConstants) -> (CombatEngine, Rc<RefCell<Vec<EngineEvent>>>) {
    let sink = RecordingSink::default();
    let events = sink.events.clone();
    let engine = CombatEngine::new(constants, roster(), Box::new(sink));
    (engine, events)
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

fn count_events(events: &Rc<RefCell<Vec<EngineEvent>>>, pred: fn(&EngineEvent) -> bool) -> usize {
    events.borrow().iter().filter(|e| pred(e)).count()
}

#[test]
fn cooldown_invariant_holds_under_power_scaling() {
    let (mut engine, _events) = engine_with(EngineConstants::default());
    let world = GridWorld::new(Vec::new(), vec![OGRE]);
    // Power level 10 would shrink the 30-tick cooldown to 3; the floor
    // keeps it at 20
    let profile = TierProfile {
        multiplier: 10.0,
        tier: 1,
    };
    let mut rng = rng();
    engine.register_actor(HERO);
    engine.register_actor(OGRE);
    engine.equip(HERO, "strike").unwrap();

    engine
        .activate(HERO, "strike", Some(OGRE), &world, &profile, &mut rng)
        .unwrap();

    for _ in 0..10 {
        engine.tick(0.05, &world, &profile, &mut rng);
        let err = engine
            .activate(HERO, "strike", Some(OGRE), &world, &profile, &mut rng)
            .unwrap_err();
        assert!(matches!(err, ActivationError::OnCooldown { .. }));
    }

    for _ in 0..10 {
        engine.tick(0.05, &world, &profile, &mut rng);
    }
    assert!(engine
        .activate(HERO, "strike", Some(OGRE), &world, &profile, &mut rng)
        .is_ok());
}

#[test]
fn marks_clamp_and_expire_lazily() {
    let (mut engine, _events) = engine_with(EngineConstants::default());
    let world = GridWorld::empty();
    let profile = baseline_profile();
    engine.register_actor(HERO);
    engine.equip(HERO, "mark").unwrap();

    for _ in 0..8 {
        engine.damage_dealt(
            HERO,
            OGRE,
            10.0,
            TargetVitals::new(500.0, 500.0),
            1,
            &world,
            &profile,
        );
    }
    // Eight hits, clamped at five stacks
    assert_eq!(engine.effects().stacks(OGRE, "prey_mark", engine.now()), 5);

    // Mark duration is 10 ticks; the read goes absent at the expiry
    // tick even though no sweep has run
    assert_eq!(engine.effects().get(OGRE, "prey_mark", engine.now() + 9), Some(5.0));
    assert_eq!(engine.effects().get(OGRE, "prey_mark", engine.now() + 10), None);
}

#[test]
fn combo_resets_one_past_the_timeout() {
    let (mut engine, _events) = engine_with(EngineConstants::default());
    let world = GridWorld::empty();
    let profile = baseline_profile();
    let mut rng = rng();
    engine.register_actor(HERO);

    for _ in 0..3 {
        engine.damage_dealt(
            HERO,
            OGRE,
            10.0,
            TargetVitals::new(500.0, 500.0),
            1,
            &world,
            &profile,
        );
    }
    assert_eq!(engine.momentum().combo_count(HERO, engine.clock_secs()), 3);

    // Advance one second past the combo timeout
    for _ in 0..6 {
        engine.tick(1.0, &world, &profile, &mut rng);
    }
    assert_eq!(engine.momentum().combo_count(HERO, engine.clock_secs()), 0);
    // The streak window is longer and survives
    assert_eq!(engine.momentum().streak_count(HERO, engine.clock_secs()), 3);
}

#[test]
fn fever_scenario_matches_reference_numbers() {
    let (mut engine, events) = engine_with(flat_momentum_constants());
    let world = GridWorld::empty();
    let profile = baseline_profile();
    engine.register_actor(HERO);
    engine.equip(HERO, "amp").unwrap();

    let vitals = TargetVitals::new(500.0, 500.0);

    // Cold start: 10 base with the +25% passive composes to 12.5
    let outcome = engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    assert!((outcome.amount - 12.5).abs() < 1e-9);

    // 49 more qualifying events bring the streak to 50 and light fever
    for _ in 0..49 {
        engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    }
    let fever_starts = count_events(&events, |e| matches!(e, EngineEvent::FeverStarted { .. }));
    assert_eq!(fever_starts, 1);

    // Next hit rides the fever stage: 10 * 1.25 * 2 = 25
    let outcome = engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    assert!((outcome.amount - 25.0).abs() < 1e-9);

    // More events while active never re-trigger
    for _ in 0..20 {
        engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    }
    let fever_starts = count_events(&events, |e| matches!(e, EngineEvent::FeverStarted { .. }));
    assert_eq!(fever_starts, 1);
}

#[test]
fn fever_ends_after_its_duration() {
    let (mut engine, events) = engine_with(flat_momentum_constants());
    let world = GridWorld::empty();
    let profile = baseline_profile();
    let mut rng = rng();
    engine.register_actor(HERO);
    engine.equip(HERO, "amp").unwrap();

    let vitals = TargetVitals::new(500.0, 500.0);
    for _ in 0..50 {
        engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    }

    // Sixteen seconds later the sweep has shut fever down
    for _ in 0..16 {
        engine.tick(1.0, &world, &profile, &mut rng);
    }
    let fever_ends = count_events(&events, |e| matches!(e, EngineEvent::FeverEnded { .. }));
    assert_eq!(fever_ends, 1);

    // Streak has also decayed by now (30s window is still open, but the
    // fever multiplier is gone): plain 12.5 again
    let outcome = engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    assert!((outcome.amount - 12.5).abs() < 1e-9);
}

#[test]
fn proximity_bonus_follows_the_table() {
    let profile = baseline_profile();
    let vitals = TargetVitals::new(500.0, 500.0);

    // Lone actor: no bonus
    let (mut engine, _) = engine_with(flat_momentum_constants());
    engine.register_actor(HERO);
    let outcome = engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &GridWorld::empty(), &profile);
    assert!((outcome.amount - 10.0).abs() < 1e-9);

    // One registered ally nearby: group of 2, +15%
    let (mut engine, _) = engine_with(flat_momentum_constants());
    engine.register_actor(HERO);
    engine.register_actor(ActorId(10));
    let world = GridWorld::new(vec![ActorId(10)], Vec::new());
    let outcome = engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    assert!((outcome.amount - 11.5).abs() < 1e-9);

    // Three registered allies plus one stranger the engine has never
    // seen: the stranger does not count, group of 4, +60%
    let (mut engine, _) = engine_with(flat_momentum_constants());
    engine.register_actor(HERO);
    for id in [10, 11, 12] {
        engine.register_actor(ActorId(id));
    }
    let world = GridWorld::new(
        vec![ActorId(10), ActorId(11), ActorId(12), ActorId(99)],
        Vec::new(),
    );
    let outcome = engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    assert!((outcome.amount - 16.0).abs() < 1e-9);
}

#[test]
fn surge_threshold_scales_with_power_but_respects_the_floor() {
    let (mut engine, events) = engine_with(flat_momentum_constants());
    let world = GridWorld::empty();
    // Power level 3 would cut the threshold of 12 to 4; the floor holds
    // it at 6
    let profile = TierProfile {
        multiplier: 3.0,
        tier: 1,
    };
    let vitals = TargetVitals::new(500.0, 500.0);
    engine.register_actor(HERO);
    engine.equip(HERO, "surge").unwrap();

    for _ in 0..5 {
        engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    }
    let applied = count_events(&events, |e| {
        matches!(e, EngineEvent::EffectApplied { effect_id, .. } if effect_id == "surge_bonus")
    });
    assert_eq!(applied, 0);

    // Sixth attack fires the bonus
    engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    let applied = count_events(&events, |e| {
        matches!(e, EngineEvent::EffectApplied { effect_id, .. } if effect_id == "surge_bonus")
    });
    assert_eq!(applied, 1);

    // Seventh hit rides the +30% bonus
    let outcome = engine.damage_dealt(HERO, OGRE, 10.0, vitals, 1, &world, &profile);
    assert!((outcome.amount - 13.0).abs() < 1e-9);
}

#[test]
fn charge_blocks_then_releases_double() {
    let (mut engine, events) = engine_with(EngineConstants::default());
    let world = GridWorld::new(Vec::new(), vec![OGRE]);
    let profile = baseline_profile();
    let mut rng = rng();
    engine.register_actor(HERO);
    engine.register_actor(OGRE);
    engine.equip(HERO, "bulwark").unwrap();

    engine
        .activate(HERO, "bulwark", None, &world, &profile, &mut rng)
        .unwrap();

    // Two incoming hits while charging; half of each is stored
    let first = engine.damage_received(HERO, Some(OGRE), 100.0);
    assert!((first.amount - 50.0).abs() < 1e-9);
    let second = engine.damage_received(HERO, Some(OGRE), 60.0);
    assert!((second.amount - 30.0).abs() < 1e-9);

    for _ in 0..5 {
        engine.tick(0.05, &world, &profile, &mut rng);
    }

    let release = events.borrow().iter().find_map(|e| match e {
        EngineEvent::AbilityResolved {
            amount, targets, ..
        } => Some((*amount, targets.clone())),
        _ => None,
    });
    let (amount, targets) = release.expect("charge never released");
    // 80 stored, released at x2
    assert!((amount - 160.0).abs() < 1e-9);
    assert_eq!(targets, vec![OGRE]);

    // Post-release hits pass through untouched
    let after = engine.damage_received(HERO, Some(OGRE), 100.0);
    assert!((after.amount - 100.0).abs() < 1e-9);
}

#[test]
fn execute_guarantees_lethality() {
    let (mut engine, _events) = engine_with(flat_momentum_constants());
    let world = GridWorld::empty();
    let profile = baseline_profile();
    engine.register_actor(HERO);
    engine.equip(HERO, "amp").unwrap();

    // 5% health target: whatever the stages produced, the amount is
    // replaced by current health + epsilon
    let outcome = engine.damage_dealt(
        HERO,
        OGRE,
        3.0,
        TargetVitals::new(5.0, 100.0),
        9,
        &world,
        &profile,
    );
    assert!((outcome.amount - 6.0).abs() < 1e-9);
    assert!(outcome.flags.execute);
}

#[test]
fn pipeline_is_order_insensitive_within_a_stage() {
    let forward = vec![
        Contribution::additive("passive", 0.25),
        Contribution::additive("momentum", 0.10),
    ];
    let backward: Vec<Contribution> = forward.iter().rev().cloned().collect();

    let one = compose(100.0, &forward, None);
    let two = compose(100.0, &backward, None);
    assert!((one.amount - 135.0).abs() < 1e-9);
    assert!((one.amount - two.amount).abs() < 1e-9);
}
