pub mod aggregation;
pub mod attendance;
pub mod evaluations;
pub mod grades;
pub mod reports;
pub mod terms;
pub mod weights;

pub use aggregation::AggregationService;
pub use attendance::AttendanceService;
pub use evaluations::EvaluationService;
pub use grades::GradeService;
pub use reports::ReportService;
pub use terms::TermService;
pub use weights::WeightService;
