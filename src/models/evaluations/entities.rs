use chrono::NaiveDate;
use rust_decimal::{Decimal, dec};
use serde::{Deserialize, Serialize};

/// 参与类评价没有满分字段，按百分制处理
pub const PARTICIPATION_MAX_SCORE: Decimal = dec!(100.00);
/// 参与类评价的及格线
pub const PARTICIPATION_PASS_SCORE: Decimal = dec!(51.00);

// 评价种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Deliverable,   // 作业/考试等提交类
    Participation, // 课堂参与
}

impl EvaluationKind {
    pub const DELIVERABLE: &'static str = "deliverable";
    pub const PARTICIPATION: &'static str = "participation";
}

impl<'de> Deserialize<'de> for EvaluationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的评价种类: '{s}'. 支持的种类: deliverable, participation"
            ))
        })
    }
}

impl std::fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationKind::Deliverable => write!(f, "{}", EvaluationKind::DELIVERABLE),
            EvaluationKind::Participation => write!(f, "{}", EvaluationKind::PARTICIPATION),
        }
    }
}

impl std::str::FromStr for EvaluationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            EvaluationKind::DELIVERABLE => Ok(EvaluationKind::Deliverable),
            EvaluationKind::PARTICIPATION => Ok(EvaluationKind::Participation),
            _ => Err(format!("Invalid evaluation kind: {s}")),
        }
    }
}

/// 多态评价引用：种类 + 对应表中的 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationRef {
    pub kind: EvaluationKind,
    pub id: i64,
}

impl EvaluationRef {
    pub fn deliverable(id: i64) -> Self {
        Self {
            kind: EvaluationKind::Deliverable,
            id,
        }
    }

    pub fn participation(id: i64) -> Self {
        Self {
            kind: EvaluationKind::Participation,
            id,
        }
    }
}

impl std::fmt::Display for EvaluationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

// 提交类评价的专有字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverableDetails {
    pub assigned_date: NaiveDate,
    pub due_date: NaiveDate,
    pub limit_date: Option<NaiveDate>,
    pub max_score: Decimal,
    pub min_pass_score: Decimal,
    pub allows_late: bool,
    pub late_penalty_percentage: Decimal,
}

// 参与类评价的专有字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationDetails {
    pub registration_date: NaiveDate,
    pub criteria: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationDetails {
    Deliverable(DeliverableDetails),
    Participation(ParticipationDetails),
}

impl EvaluationDetails {
    pub fn kind(&self) -> EvaluationKind {
        match self {
            EvaluationDetails::Deliverable(_) => EvaluationKind::Deliverable,
            EvaluationDetails::Participation(_) => EvaluationKind::Participation,
        }
    }
}

// 评价实体（两种变体共用的字段 + 变体详情）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i64,
    pub subject_id: i64,
    pub term_id: i64,
    pub evaluation_type_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub weight_percentage: Decimal,
    pub active: bool,
    pub published: bool,
    pub details: EvaluationDetails,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Evaluation {
    pub fn kind(&self) -> EvaluationKind {
        self.details.kind()
    }

    pub fn reference(&self) -> EvaluationRef {
        EvaluationRef {
            kind: self.kind(),
            id: self.id,
        }
    }

    pub fn max_score(&self) -> Decimal {
        match &self.details {
            EvaluationDetails::Deliverable(d) => d.max_score,
            EvaluationDetails::Participation(_) => PARTICIPATION_MAX_SCORE,
        }
    }

    pub fn min_pass_score(&self) -> Decimal {
        match &self.details {
            EvaluationDetails::Deliverable(d) => d.min_pass_score,
            EvaluationDetails::Participation(_) => PARTICIPATION_PASS_SCORE,
        }
    }

    /// 迟交策略：None 表示该评价不接受迟交
    ///
    /// 参与类评价没有迟交概念，迟交标记被忽略，罚分为 0。
    pub fn late_penalty(&self) -> Option<Decimal> {
        match &self.details {
            EvaluationDetails::Deliverable(d) if d.allows_late => Some(d.late_penalty_percentage),
            EvaluationDetails::Deliverable(_) => None,
            EvaluationDetails::Participation(_) => Some(Decimal::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_ref_ordering_ties_on_kind() {
        let mut refs = vec![
            EvaluationRef::participation(2),
            EvaluationRef::deliverable(2),
            EvaluationRef::deliverable(1),
        ];
        refs.sort_by_key(|r| (r.id, r.kind));
        assert_eq!(
            refs,
            vec![
                EvaluationRef::deliverable(1),
                EvaluationRef::deliverable(2),
                EvaluationRef::participation(2),
            ]
        );
    }

    #[test]
    fn test_kind_round_trips_through_string() {
        assert_eq!(
            "participation".parse::<EvaluationKind>().unwrap(),
            EvaluationKind::Participation
        );
        assert_eq!(EvaluationRef::deliverable(7).to_string(), "deliverable#7");
        assert!("quiz".parse::<EvaluationKind>().is_err());
    }

    #[test]
    fn test_details_serialize_with_kind_tag() {
        let details = EvaluationDetails::Participation(ParticipationDetails {
            registration_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            criteria: None,
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "participation");
    }
}
