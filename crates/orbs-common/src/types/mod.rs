//! Core data types for the Skill Orbs engine

pub mod observation;
pub mod settings;
pub mod xp_table;
