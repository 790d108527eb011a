//! 批处理开始时构建的只读查找表
//!
//! 一次批量读取后放进快照，供并发计算共享，不存在全局缓存。

use std::collections::HashMap;

use crate::models::attendance::entities::AttendanceRecord;
use crate::models::averages::entities::{TermAverage, TermAverageFields};
use crate::models::evaluations::entities::{Evaluation, EvaluationRef};
use crate::models::grades::entities::GradeRecord;
use crate::models::terms::entities::Term;

/// 按科目分组的有效评价，组内按 (ID, 种类) 排序
#[derive(Debug, Default)]
pub struct EvaluationCatalog {
    by_subject: HashMap<i64, Vec<Evaluation>>,
}

impl EvaluationCatalog {
    pub fn new(evaluations: Vec<Evaluation>) -> Self {
        let mut by_subject: HashMap<i64, Vec<Evaluation>> = HashMap::new();
        for evaluation in evaluations.into_iter().filter(|e| e.active) {
            by_subject
                .entry(evaluation.subject_id)
                .or_default()
                .push(evaluation);
        }
        for list in by_subject.values_mut() {
            list.sort_by_key(|e| (e.id, e.kind()));
        }
        Self { by_subject }
    }

    pub fn for_subject(&self, subject_id: i64) -> &[Evaluation] {
        self.by_subject
            .get(&subject_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn references(&self) -> Vec<EvaluationRef> {
        let mut refs: Vec<_> = self
            .by_subject
            .values()
            .flatten()
            .map(Evaluation::reference)
            .collect();
        refs.sort();
        refs
    }

    pub fn len(&self) -> usize {
        self.by_subject.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 按 (评价, 学生) 索引的成绩
#[derive(Debug, Default)]
pub struct GradeBook {
    grades: HashMap<(EvaluationRef, i64), GradeRecord>,
}

impl GradeBook {
    pub fn new(grades: Vec<GradeRecord>) -> Self {
        Self {
            grades: grades
                .into_iter()
                .map(|g| ((g.evaluation, g.student_id), g))
                .collect(),
        }
    }

    pub fn get(&self, evaluation: EvaluationRef, student_id: i64) -> Option<&GradeRecord> {
        self.grades.get(&(evaluation, student_id))
    }
}

/// 按 (学生, 科目) 分组的出勤
#[derive(Debug, Default)]
pub struct AttendanceBook {
    records: HashMap<(i64, i64), Vec<AttendanceRecord>>,
}

impl AttendanceBook {
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        let mut grouped: HashMap<(i64, i64), Vec<AttendanceRecord>> = HashMap::new();
        for record in records {
            grouped
                .entry((record.student_id, record.subject_id))
                .or_default()
                .push(record);
        }
        Self { records: grouped }
    }

    pub fn records(&self, student_id: i64, subject_id: i64) -> &[AttendanceRecord] {
        self.records
            .get(&(student_id, subject_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// 学期汇总快照
#[derive(Debug)]
pub struct TermSnapshot {
    pub term: Term,
    pub catalog: EvaluationCatalog,
    pub grades: GradeBook,
    pub attendance: AttendanceBook,
}

/// 学年汇总快照：每个 (学生, 科目) 的 (学期序号, 学期平均)
#[derive(Debug, Default)]
pub struct AnnualSnapshot {
    by_pair: HashMap<(i64, i64), Vec<(i32, TermAverageFields)>>,
}

impl AnnualSnapshot {
    /// `term_numbers` 为学期 ID 到序号的映射，不在其中的学期平均被忽略
    pub fn new(term_numbers: &HashMap<i64, i32>, averages: Vec<TermAverage>) -> Self {
        let mut by_pair: HashMap<(i64, i64), Vec<(i32, TermAverageFields)>> = HashMap::new();
        for average in averages {
            let Some(&number) = term_numbers.get(&average.term_id) else {
                continue;
            };
            by_pair
                .entry((average.student_id, average.subject_id))
                .or_default()
                .push((number, average.fields));
        }
        for entries in by_pair.values_mut() {
            entries.sort_by_key(|(number, _)| *number);
        }
        Self { by_pair }
    }

    pub fn term_averages(&self, student_id: i64, subject_id: i64) -> &[(i32, TermAverageFields)] {
        self.by_pair
            .get(&(student_id, subject_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
