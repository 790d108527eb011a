use chrono::Datelike;
use rust_decimal::{Decimal, dec};

use crate::errors::{AggregatorError, Result};
use crate::models::terms::{
    entities::TermState,
    requests::{CreateTermRequest, NewTerm},
};
use crate::utils::{normalize, validate_percentage};

pub const DEFAULT_MIN_PASS_SCORE: Decimal = dec!(51.00);
pub const DEFAULT_MIN_ATTENDANCE_PCT: Decimal = dec!(80.00);

/// 校验学期请求并补全默认值
pub fn validate_new_term(req: CreateTermRequest) -> Result<NewTerm> {
    if !(1..=3).contains(&req.number) {
        return Err(AggregatorError::validation(format!(
            "学期序号必须为 1、2 或 3，实际为 {}",
            req.number
        )));
    }
    if req.end_date <= req.start_date {
        return Err(AggregatorError::validation(format!(
            "学期结束日期 {} 必须晚于开始日期 {}",
            req.end_date, req.start_date
        )));
    }
    if req.year != req.start_date.year() && req.year != req.end_date.year() {
        return Err(AggregatorError::validation(format!(
            "学年 {} 与学期日期 {} ~ {} 不匹配",
            req.year, req.start_date, req.end_date
        )));
    }

    let eval_deadline = req.eval_deadline.unwrap_or(req.end_date);
    let grade_deadline = req.grade_deadline.unwrap_or(req.end_date);
    if eval_deadline < req.start_date || grade_deadline < req.start_date {
        return Err(AggregatorError::validation("截止日期不能早于学期开始日期"));
    }

    let min_pass_score = normalize(req.min_pass_score.unwrap_or(DEFAULT_MIN_PASS_SCORE));
    let min_attendance_pct =
        normalize(req.min_attendance_pct.unwrap_or(DEFAULT_MIN_ATTENDANCE_PCT));
    validate_percentage(min_pass_score)
        .map_err(|e| AggregatorError::validation(format!("及格线: {e}")))?;
    validate_percentage(min_attendance_pct)
        .map_err(|e| AggregatorError::validation(format!("出勤要求: {e}")))?;

    let name = req
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Trimestre {} {}", req.number, req.year));

    Ok(NewTerm {
        number: req.number,
        year: req.year,
        name,
        start_date: req.start_date,
        end_date: req.end_date,
        eval_deadline,
        grade_deadline,
        min_pass_score,
        min_attendance_pct,
        state: req.state.unwrap_or(TermState::Planned),
    })
}
