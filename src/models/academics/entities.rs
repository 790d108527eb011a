use serde::{Deserialize, Serialize};

// 学生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    // 所属课程（班级）
    pub course_id: i64,
    pub first_name: String,
    pub last_name: String,
    // 学号，全局唯一
    pub code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// 科目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 评价类型（如 EXAMEN、TRABAJO、PARTICIPACION）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}
