//! 预导入模块，方便使用

pub use super::annual_averages::{
    ActiveModel as AnnualAverageActiveModel, Entity as AnnualAverages,
    Model as AnnualAverageModel,
};
pub use super::attendance::{
    ActiveModel as AttendanceActiveModel, Entity as Attendance, Model as AttendanceModel,
};
pub use super::deliverable_evaluations::{
    ActiveModel as DeliverableActiveModel, Entity as DeliverableEvaluations,
    Model as DeliverableModel,
};
pub use super::evaluation_types::{
    ActiveModel as EvaluationTypeActiveModel, Entity as EvaluationTypes,
    Model as EvaluationTypeModel,
};
pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::participation_evaluations::{
    ActiveModel as ParticipationActiveModel, Entity as ParticipationEvaluations,
    Model as ParticipationModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::subjects::{
    ActiveModel as SubjectActiveModel, Entity as Subjects, Model as SubjectModel,
};
pub use super::term_averages::{
    ActiveModel as TermAverageActiveModel, Entity as TermAverages, Model as TermAverageModel,
};
pub use super::terms::{ActiveModel as TermActiveModel, Entity as Terms, Model as TermModel};
pub use super::weight_configs::{
    ActiveModel as WeightConfigActiveModel, Entity as WeightConfigs, Model as WeightConfigModel,
};
