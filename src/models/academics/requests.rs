use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub course_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubjectRequest {
    pub course_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvaluationTypeRequest {
    pub name: String,
    pub description: Option<String>,
}
