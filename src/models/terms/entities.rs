use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// 学期状态：PLANNED → ACTIVE → FINISHED → CLOSED，只能前进一步
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermState {
    Planned,  // 计划中
    Active,   // 进行中
    Finished, // 已结束
    Closed,   // 已关闭
}

impl TermState {
    pub const PLANNED: &'static str = "planned";
    pub const ACTIVE: &'static str = "active";
    pub const FINISHED: &'static str = "finished";
    pub const CLOSED: &'static str = "closed";

    /// 下一个合法状态，CLOSED 之后没有后继
    pub fn next(self) -> Option<TermState> {
        match self {
            TermState::Planned => Some(TermState::Active),
            TermState::Active => Some(TermState::Finished),
            TermState::Finished => Some(TermState::Closed),
            TermState::Closed => None,
        }
    }

    pub fn can_transition_to(self, target: TermState) -> bool {
        self.next() == Some(target)
    }
}

impl<'de> Deserialize<'de> for TermState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的学期状态: '{s}'. 支持的状态: planned, active, finished, closed"
            ))
        })
    }
}

impl std::fmt::Display for TermState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermState::Planned => write!(f, "{}", TermState::PLANNED),
            TermState::Active => write!(f, "{}", TermState::ACTIVE),
            TermState::Finished => write!(f, "{}", TermState::FINISHED),
            TermState::Closed => write!(f, "{}", TermState::CLOSED),
        }
    }
}

impl std::str::FromStr for TermState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            TermState::PLANNED => Ok(TermState::Planned),
            TermState::ACTIVE => Ok(TermState::Active),
            TermState::FINISHED => Ok(TermState::Finished),
            TermState::CLOSED => Ok(TermState::Closed),
            _ => Err(format!("Invalid term state: {s}")),
        }
    }
}

// 学期实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    // 学期序号 1..=3
    pub number: i32,
    pub year: i32,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    // 评价登记截止日
    pub eval_deadline: NaiveDate,
    // 成绩登记截止日
    pub grade_deadline: NaiveDate,
    pub min_pass_score: Decimal,
    pub min_attendance_pct: Decimal,
    pub state: TermState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Term {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn is_currently_active(&self, today: NaiveDate) -> bool {
        self.state == TermState::Active && self.contains(today)
    }

    pub fn can_register_evaluations(&self, today: NaiveDate) -> bool {
        today <= self.eval_deadline
            && matches!(self.state, TermState::Planned | TermState::Active)
    }

    pub fn can_register_grades(&self, today: NaiveDate) -> bool {
        today <= self.grade_deadline
            && matches!(self.state, TermState::Active | TermState::Finished)
    }
}
