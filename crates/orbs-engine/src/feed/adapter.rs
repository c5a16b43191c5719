//! Skill feed adapter
//!
//! The game exposes skills in several shapes:
//! - a plain array of entries
//! - a container whose `_skills` field holds the array
//! - an object keyed by skill name or id
//!
//! All of them normalize to a flat list of [`SkillObservation`]. Entries that
//! are missing a field or carry a wrong-typed one are dropped.

use orbs_common::SkillObservation;
use serde_json::Value;
use tracing::debug;

/// Anything that can yield this tick's skill observations
pub trait SkillSource {
    fn observations(&self) -> Vec<SkillObservation>;
}

impl SkillSource for [SkillObservation] {
    fn observations(&self) -> Vec<SkillObservation> {
        self.to_vec()
    }
}

impl SkillSource for Vec<SkillObservation> {
    fn observations(&self) -> Vec<SkillObservation> {
        self.clone()
    }
}

/// Player object from the game's entity manager
#[derive(Debug, Clone)]
pub struct PlayerSnapshot<'a> {
    player: &'a Value,
}

impl<'a> PlayerSnapshot<'a> {
    pub fn new(player: &'a Value) -> Self {
        Self { player }
    }
}

impl SkillSource for PlayerSnapshot<'_> {
    fn observations(&self) -> Vec<SkillObservation> {
        player_observations(self.player)
    }
}

/// Resource skills followed by combat skills
pub fn player_observations(player: &Value) -> Vec<SkillObservation> {
    let mut out = skills_of(player, "Skills");
    out.extend(skills_of(player, "Combat"));
    out
}

fn skills_of(player: &Value, container: &str) -> Vec<SkillObservation> {
    let Some(holder) = player.get(container) else {
        return Vec::new();
    };
    match holder.get("_skills") {
        Some(inner) if !inner.is_null() => normalize_skills_bag(inner),
        _ => normalize_skills_bag(holder),
    }
}

/// Normalize one skills bag into observations
pub fn normalize_skills_bag(bag: &Value) -> Vec<SkillObservation> {
    let entries: Vec<&Value> = match bag {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("_skills") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => map.values().collect(),
        },
        _ => return Vec::new(),
    };

    let total = entries.len();
    let observations: Vec<SkillObservation> = entries
        .into_iter()
        .filter_map(|entry| SkillObservation::try_from(entry).ok())
        .collect();

    let dropped = total - observations.len();
    if dropped > 0 {
        debug!(dropped, kept = observations.len(), "Dropped malformed skill entries");
    }
    observations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_bag() {
        let bag = json!([
            { "_skill": 0, "_level": 5, "_xp": 470 },
            { "_skill": 1, "_level": 2 },
            null,
            { "_skill": 2, "_level": 3, "_xp": 215.5 }
        ]);
        let obs = normalize_skills_bag(&bag);
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[1], SkillObservation::new(2, 3, 215.5));
    }

    #[test]
    fn test_nested_container() {
        let bag = json!({ "_skills": [{ "_skill": 4, "_level": 1, "_xp": 0 }], "other": 1 });
        let obs = normalize_skills_bag(&bag);
        assert_eq!(obs, vec![SkillObservation::new(4, 1, 0.0)]);
    }

    #[test]
    fn test_keyed_map() {
        let bag = json!({
            "fishing": { "_skill": 6, "_level": 10, "_xp": 1500 },
            "broken": { "_skill": "x", "_level": 10, "_xp": 1500 },
            "count": 2
        });
        let obs = normalize_skills_bag(&bag);
        assert_eq!(obs, vec![SkillObservation::new(6, 10, 1500.0)]);
    }

    #[test]
    fn test_fractional_id_is_dropped() {
        let bag = json!([
            { "_skill": 1, "_level": 1, "_xp": 100 },
            { "_skill": 1.5, "_level": 1, "_xp": 200 },
            { "_skill": 2, "_level": 0.5, "_xp": 300 }
        ]);
        assert_eq!(
            normalize_skills_bag(&bag),
            vec![SkillObservation::new(1, 1, 100.0)]
        );
    }

    #[test]
    fn test_scalar_bag_is_empty() {
        assert!(normalize_skills_bag(&json!(null)).is_empty());
        assert!(normalize_skills_bag(&json!("skills")).is_empty());
    }

    #[test]
    fn test_player_orders_resource_before_combat() {
        let player = json!({
            "Combat": { "_skills": [{ "_skill": 20, "_level": 1, "_xp": 5 }] },
            "Skills": [{ "_skill": 1, "_level": 1, "_xp": 7 }]
        });
        let ids: Vec<i64> = PlayerSnapshot::new(&player)
            .observations()
            .iter()
            .map(|o| o.skill_id)
            .collect();
        assert_eq!(ids, vec![1, 20]);
    }

    #[test]
    fn test_player_without_skills() {
        assert!(player_observations(&json!({})).is_empty());
        assert!(player_observations(&json!({ "Skills": { "_skills": null } })).is_empty());
    }
}
