// skillgap: skill gap analysis between a resume and a job description.
//
// This is the library root. Each module corresponds to one stage of the
// matching engine, plus the report/output layer that consumes it.

pub mod config;
pub mod error;
pub mod gap;
pub mod output;
pub mod pipeline;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod similarity;
pub mod skills;
pub mod vectorize;

pub use error::{Result, SkillGapError};
pub use pipeline::{analyze, Analysis, AnalysisConfig};
