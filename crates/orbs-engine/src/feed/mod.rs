//! Skill feed module
//!
//! Normalizes the game's skill containers into [`SkillObservation`]s.
//!
//! [`SkillObservation`]: orbs_common::SkillObservation

pub mod adapter;

pub use adapter::{normalize_skills_bag, player_observations, PlayerSnapshot, SkillSource};
