//! End-to-end registry scenarios: feed → rates → lifecycle → projections

use orbs_common::{OrbSettings, SkillKey, SkillNames, StatRows, REMOVAL_GRACE_MS};
use orbs_engine::{LifecycleEvent, LifecycleState, OrbRegistry, PlayerSnapshot, Point};
use serde_json::{json, Value};

fn names() -> SkillNames {
    SkillNames::from_lookup(&json!(["hitpoints", "mining", "fishing"]))
}

fn player(mining_xp: f64, fishing_xp: f64) -> Value {
    json!({
        "Skills": {
            "_skills": [
                { "_skill": 1, "_level": 5, "_xp": mining_xp },
                { "_skill": 2, "_level": 3, "_xp": fishing_xp }
            ]
        },
        "Combat": [{ "_skill": 0, "_level": 10, "_xp": 1154 }]
    })
}

fn tick(reg: &mut OrbRegistry, mining: f64, fishing: f64, now_ms: i64) {
    let p = player(mining, fishing);
    reg.process_tick(&PlayerSnapshot::new(&p), now_ms);
}

#[test]
fn test_session_from_player_snapshots() {
    let mut reg = OrbRegistry::default().with_names(names());

    tick(&mut reg, 470.0, 200.0, 0);
    assert!(reg.is_empty());

    tick(&mut reg, 480.0, 200.0, 1_000);
    let keys: Vec<&str> = reg.keys().map(SkillKey::as_str).collect();
    assert_eq!(keys, vec!["mining"]);

    tick(&mut reg, 480.0, 215.0, 2_000);
    let keys: Vec<&str> = reg.keys().map(SkillKey::as_str).collect();
    assert_eq!(keys, vec!["mining", "fishing"]);

    let projections = reg.projections(2_000);
    assert_eq!(projections.len(), 2);
    assert_eq!(projections[0].title, "Mining");
    assert_eq!(projections[0].level, 5);
    assert_eq!(projections[0].total_xp_display, "480");
    assert_eq!(projections[1].lifecycle, LifecycleState::Active);
}

#[test]
fn test_hover_during_fade_keeps_orb() {
    let mut reg = OrbRegistry::default().with_names(names());
    reg.set_canvas_width(800.0);

    tick(&mut reg, 0.0, 0.0, 0);
    tick(&mut reg, 10.0, 0.0, 0);
    assert_eq!(
        reg.advance(5_000),
        vec![LifecycleEvent::FadeStarted(SkillKey::new("mining"))]
    );

    // one orb at [372, 428] x [6, 62]
    reg.pointer_moved(Point::new(400.0, 20.0));
    reg.animation_frame(5_100);
    assert_eq!(reg.state_of("mining"), LifecycleState::Active);

    assert!(reg.advance(5_000 + REMOVAL_GRACE_MS).is_empty());
    assert_eq!(reg.len(), 1);
    let p = reg.projection("mining", 5_300).unwrap();
    assert!(p.hovered);
    assert_eq!(p.opacity, 1.0);
}

#[test]
fn test_removed_orb_is_recreated_fresh() {
    let mut reg = OrbRegistry::default().with_names(names());

    tick(&mut reg, 0.0, 0.0, 0);
    tick(&mut reg, 10.0, 0.0, 0);
    tick(&mut reg, 20.0, 0.0, 1_000);
    assert!(reg.get("mining").unwrap().rate.ema_xp_per_hour().is_some());

    let events = reg.advance(60_000);
    assert_eq!(events.last(), Some(&LifecycleEvent::Removed(SkillKey::new("mining"))));
    assert!(reg.is_empty());

    tick(&mut reg, 30.0, 0.0, 70_000);
    let record = reg.get("mining").unwrap();
    assert!(record.rate.ema_xp_per_hour().is_none());
    assert_eq!(record.rate.session_start_time_ms(), Some(70_000));
    assert_eq!(record.rate.session_start_xp(), Some(20.0));
}

#[test]
fn test_visibility_round_trip() {
    let mut reg = OrbRegistry::default().with_names(names());
    tick(&mut reg, 0.0, 0.0, 0);
    tick(&mut reg, 10.0, 0.0, 1_000);
    let before = reg.projection("mining", 1_500).unwrap();

    let hidden = OrbSettings {
        rows: StatRows {
            show_xp_hr: false,
            ..StatRows::default()
        },
        ..OrbSettings::default()
    };
    let change = reg.apply_settings(hidden, 1_500);
    assert!(change.rows);
    assert!(!change.fade);
    assert!(!reg.projection("mining", 1_500).unwrap().rows.xp_hr);

    reg.apply_settings(OrbSettings::default(), 1_500);
    let after = reg.projection("mining", 1_500).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_fade_change_rearms_every_orb() {
    let mut reg = OrbRegistry::default().with_names(names());
    tick(&mut reg, 0.0, 0.0, 0);
    tick(&mut reg, 10.0, 10.0, 0);

    // mining has started fading, fishing has not
    tick(&mut reg, 10.0, 20.0, 3_000);
    reg.advance(5_000);
    assert_eq!(reg.state_of("mining"), LifecycleState::Fading);

    reg.apply_settings(
        OrbSettings {
            fade_seconds: 10.0,
            ..OrbSettings::default()
        },
        5_100,
    );
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.state_of("mining"), LifecycleState::Active);
    assert_eq!(reg.next_deadline(), Some(15_100));
    assert!(reg.advance(15_099).is_empty());
}

#[test]
fn test_clear_all_then_tick_has_no_spurious_gain() {
    let mut reg = OrbRegistry::default().with_names(names());
    tick(&mut reg, 0.0, 0.0, 0);
    tick(&mut reg, 10.0, 10.0, 0);
    assert_eq!(reg.clear_all(), 2);

    tick(&mut reg, 10.0, 10.0, 1_000);
    assert!(reg.is_empty());

    tick(&mut reg, 11.0, 10.0, 2_000);
    assert_eq!(reg.len(), 1);
}

#[test]
fn test_hover_moves_between_orbs() {
    let mut reg = OrbRegistry::default().with_names(names());
    reg.set_canvas_width(1_000.0);
    tick(&mut reg, 0.0, 0.0, 0);
    tick(&mut reg, 10.0, 10.0, 0);

    let boxes = reg.boxes();
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].1.right() + 8.0, boxes[1].1.left);

    // moves are coalesced; only the last one before the frame counts
    let inside_first = Point::new(boxes[0].1.left + 1.0, 20.0);
    reg.pointer_moved(Point::new(0.0, 500.0));
    reg.pointer_moved(inside_first);
    let transition = reg.animation_frame(100).unwrap();
    assert_eq!(transition.entered, Some(SkillKey::new("mining")));

    let inside_second = Point::new(boxes[1].1.right() - 1.0, 20.0);
    reg.pointer_moved(inside_second);
    let transition = reg.animation_frame(200).unwrap();
    assert_eq!(transition.left, Some(SkillKey::new("mining")));
    assert_eq!(transition.entered, Some(SkillKey::new("fishing")));
    assert_eq!(reg.next_deadline(), Some(5_200));
}

#[test]
fn test_disable_then_enable_starts_over() {
    let mut reg = OrbRegistry::default().with_names(names());
    tick(&mut reg, 0.0, 0.0, 0);
    tick(&mut reg, 10.0, 0.0, 0);

    let off = OrbSettings {
        enabled: false,
        ..OrbSettings::default()
    };
    reg.apply_settings(off, 100);
    tick(&mut reg, 50.0, 0.0, 200);
    assert!(reg.is_empty());

    reg.apply_settings(OrbSettings::default(), 300);
    // first value after resume only primes
    tick(&mut reg, 60.0, 0.0, 400);
    assert!(reg.is_empty());
    tick(&mut reg, 70.0, 0.0, 500);
    assert_eq!(reg.len(), 1);
}

#[test]
fn test_fractional_id_cannot_alias_a_skill_on_first_tick() {
    let mut reg = OrbRegistry::default();
    let p = json!({
        "Skills": [
            { "_skill": 1, "_level": 1, "_xp": 100 },
            { "_skill": 1.5, "_level": 1, "_xp": 200 }
        ]
    });

    let report = reg.process_tick(&PlayerSnapshot::new(&p), 0);
    assert!(report.gains.is_empty());
    assert!(reg.is_empty());
    assert_eq!(reg.previous_xp("1"), Some(100.0));
}
