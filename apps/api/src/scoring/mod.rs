// Local keyword scoring: sector matching, job scoring and recommendations.
// Pure and synchronous. The catalog is built once at startup and only read here.

pub mod catalog;
pub mod job_scorer;
pub mod recommendations;
pub mod report;
pub mod sector_matcher;
