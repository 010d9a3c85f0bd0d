//! Multiple-choice questionnaire reference data and scoring.

mod bank;
mod scorer;

pub use bank::{QuestionBank, QuestionBankError};
pub use scorer::{points_earned, score_responses, CategoryResult, McqSummary};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct McqCategoryId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChoiceId(pub String);

/// Questionnaire category. `weight` is for display only; the blend uses `ScoringConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqCategory {
    pub id: McqCategoryId,
    pub name: String,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultiChoice,
    Scale,
    FreeText,
}

impl QuestionKind {
    /// Whether more than one choice may be ticked.
    pub const fn allows_multiple(self) -> bool {
        matches!(self, QuestionKind::MultiChoice)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqQuestion {
    pub id: QuestionId,
    pub category: McqCategoryId,
    pub prompt: String,
    pub kind: QuestionKind,
    pub max_points: f64,
    #[serde(default)]
    pub choices: Vec<McqChoice>,
}

impl McqQuestion {
    pub fn choice(&self, id: &ChoiceId) -> Option<&McqChoice> {
        self.choices.iter().find(|choice| &choice.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqChoice {
    pub id: ChoiceId,
    pub text: String,
    pub points: f64,
    #[serde(default)]
    pub contributes_to_risk: bool,
    /// 0.0 to 1.0; meaningful only when `contributes_to_risk` is set.
    #[serde(default)]
    pub risk_weight: f64,
}

/// A validated answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqResponse {
    pub question_id: QuestionId,
    pub selected: Vec<ChoiceId>,
    /// Sum of the selected choices' points, capped at the question maximum.
    pub points_earned: f64,
}

/// An answer flagged as contributing to a lifestyle or health risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub question_id: QuestionId,
    pub category: McqCategoryId,
    pub category_name: String,
    pub choice_text: String,
    pub weight: f64,
}
