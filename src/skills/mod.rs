// Skill normalization: raw skill strings in, ordered unique SkillSets out.

pub mod normalize;

pub use normalize::{parse_skill_list, Normalizer, SkillSet, SkillSource, SkillToken};
