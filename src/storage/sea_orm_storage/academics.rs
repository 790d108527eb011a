//! 学籍存储操作：学生、科目、评价类型

use super::{IN_CHUNK, SeaOrmStorage, db_error};
use crate::entity::evaluation_types::{ActiveModel as EvaluationTypeActiveModel, Entity as EvaluationTypes};
use crate::entity::students::{self, ActiveModel as StudentActiveModel, Entity as Students};
use crate::entity::subjects::{self, ActiveModel as SubjectActiveModel, Entity as Subjects};
use crate::errors::Result;
use crate::models::academics::{
    entities::{EvaluationType, Student, Subject},
    requests::{CreateEvaluationTypeRequest, CreateStudentRequest, CreateSubjectRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// 多个课程的学生，按 ID 排序
pub(super) async fn students_of_courses<C: ConnectionTrait>(
    db: &C,
    course_ids: &[i64],
) -> Result<Vec<Student>> {
    let mut result = Vec::new();
    for chunk in course_ids.chunks(IN_CHUNK) {
        let rows = Students::find()
            .filter(students::Column::CourseId.is_in(chunk.to_vec()))
            .order_by_asc(students::Column::Id)
            .all(db)
            .await
            .map_err(db_error("查询课程学生失败"))?;
        result.extend(rows.into_iter().map(|m| m.into_student()));
    }
    result.sort_by_key(|s| s.id);
    Ok(result)
}

pub(super) async fn get_student<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Student>> {
    let result = Students::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("查询学生失败"))?;

    Ok(result.map(|m| m.into_student()))
}

pub(super) async fn get_students<C: ConnectionTrait>(db: &C, ids: &[i64]) -> Result<Vec<Student>> {
    let mut result = Vec::new();
    for chunk in ids.chunks(IN_CHUNK) {
        let rows = Students::find()
            .filter(students::Column::Id.is_in(chunk.to_vec()))
            .all(db)
            .await
            .map_err(db_error("查询学生失败"))?;
        result.extend(rows.into_iter().map(|m| m.into_student()));
    }
    result.sort_by_key(|s| s.id);
    Ok(result)
}

pub(super) async fn subjects_of<C: ConnectionTrait>(db: &C, course_id: i64) -> Result<Vec<Subject>> {
    let rows = Subjects::find()
        .filter(subjects::Column::CourseId.eq(course_id))
        .order_by_asc(subjects::Column::Id)
        .all(db)
        .await
        .map_err(db_error("查询课程科目失败"))?;

    Ok(rows.into_iter().map(|m| m.into_subject()).collect())
}

/// 列出科目，ids 为 None 时返回全部
pub(super) async fn list_subjects<C: ConnectionTrait>(
    db: &C,
    ids: Option<&[i64]>,
) -> Result<Vec<Subject>> {
    let Some(ids) = ids else {
        let rows = Subjects::find()
            .order_by_asc(subjects::Column::Id)
            .all(db)
            .await
            .map_err(db_error("查询科目列表失败"))?;
        return Ok(rows.into_iter().map(|m| m.into_subject()).collect());
    };

    let mut result = Vec::new();
    for chunk in ids.chunks(IN_CHUNK) {
        let rows = Subjects::find()
            .filter(subjects::Column::Id.is_in(chunk.to_vec()))
            .all(db)
            .await
            .map_err(db_error("查询科目列表失败"))?;
        result.extend(rows.into_iter().map(|m| m.into_subject()));
    }
    result.sort_by_key(|s| s.id);
    Ok(result)
}

pub(super) async fn get_subject<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Subject>> {
    let result = Subjects::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("查询科目失败"))?;

    Ok(result.map(|m| m.into_subject()))
}

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let model = StudentActiveModel {
            course_id: Set(req.course_id),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            code: Set(req.code),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建学生失败"))?;

        Ok(result.into_student())
    }

    /// 创建科目
    pub async fn create_subject_impl(&self, req: CreateSubjectRequest) -> Result<Subject> {
        let model = SubjectActiveModel {
            course_id: Set(req.course_id),
            name: Set(req.name),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建科目失败"))?;

        Ok(result.into_subject())
    }

    /// 创建评价类型
    pub async fn create_evaluation_type_impl(
        &self,
        req: CreateEvaluationTypeRequest,
    ) -> Result<EvaluationType> {
        let model = EvaluationTypeActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建评价类型失败"))?;

        Ok(result.into_evaluation_type())
    }

    /// 通过 ID 获取评价类型
    pub async fn get_evaluation_type_impl(&self, id: i64) -> Result<Option<EvaluationType>> {
        let result = EvaluationTypes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询评价类型失败"))?;

        Ok(result.map(|m| m.into_evaluation_type()))
    }
}
