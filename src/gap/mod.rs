// Gap classification: bucket every job skill as matched, partial or missing,
// and rank the resume skills closest to it.

pub mod classify;
pub mod rank;

pub use classify::{classify, GapClassification, GapCounts, GapStatus, SkillGap, Thresholds};
pub use rank::{top_k, top_k_all, top_k_row, RankedCandidate, TopMatches};
