pub mod ruler;
pub mod rules;
pub mod tokenize;
pub mod types;

pub use ruler::EntityRuler;
pub use rules::{OverrideRule, RuleSet};
pub use types::*;

pub const TARGET_ENTITY: &str = "entity";
