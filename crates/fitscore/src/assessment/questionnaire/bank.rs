use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::{
    ChoiceId, McqCategory, McqCategoryId, McqChoice, McqQuestion, QuestionId, QuestionKind,
};

#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid question bank JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate category id '{0}'")]
    DuplicateCategory(String),
    #[error("duplicate question id '{0}'")]
    DuplicateQuestion(String),
    #[error("question '{question}' references unknown category '{category}'")]
    UnknownCategory { question: String, category: String },
    #[error("question '{question}' repeats choice id '{choice}'")]
    DuplicateChoice { question: String, choice: String },
    #[error("question '{0}' has a negative or non-finite maximum")]
    InvalidMaximum(String),
    #[error("choice '{choice}' of question '{question}' has risk weight {weight} outside 0..=1")]
    RiskWeightOutOfRange {
        question: String,
        choice: String,
        weight: f64,
    },
}

#[derive(Debug, Deserialize)]
struct QuestionBankDocument {
    categories: Vec<McqCategory>,
    questions: Vec<McqQuestion>,
}

/// Read-only MCQ definitions shared by every scoring run.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    categories: Vec<McqCategory>,
    questions: Vec<McqQuestion>,
    question_index: HashMap<QuestionId, usize>,
}

impl QuestionBank {
    pub fn new(
        categories: Vec<McqCategory>,
        questions: Vec<McqQuestion>,
    ) -> Result<Self, QuestionBankError> {
        let mut category_ids = HashSet::new();
        for category in &categories {
            if !category_ids.insert(category.id.clone()) {
                return Err(QuestionBankError::DuplicateCategory(category.id.0.clone()));
            }
        }

        let mut question_ids = HashSet::new();
        for question in &questions {
            if !question_ids.insert(question.id.clone()) {
                return Err(QuestionBankError::DuplicateQuestion(question.id.0.clone()));
            }
            if !category_ids.contains(&question.category) {
                return Err(QuestionBankError::UnknownCategory {
                    question: question.id.0.clone(),
                    category: question.category.0.clone(),
                });
            }
            if !question.max_points.is_finite() || question.max_points < 0.0 {
                return Err(QuestionBankError::InvalidMaximum(question.id.0.clone()));
            }

            let mut choice_ids = HashSet::new();
            for choice in &question.choices {
                if !choice_ids.insert(choice.id.clone()) {
                    return Err(QuestionBankError::DuplicateChoice {
                        question: question.id.0.clone(),
                        choice: choice.id.0.clone(),
                    });
                }
                if !(0.0..=1.0).contains(&choice.risk_weight) {
                    return Err(QuestionBankError::RiskWeightOutOfRange {
                        question: question.id.0.clone(),
                        choice: choice.id.0.clone(),
                        weight: choice.risk_weight,
                    });
                }
            }
        }

        Ok(Self::indexed(categories, questions))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, QuestionBankError> {
        let document: QuestionBankDocument = serde_json::from_reader(reader)?;
        let bank = Self::new(document.categories, document.questions)?;
        tracing::debug!(
            categories = bank.categories.len(),
            questions = bank.questions.len(),
            "question bank loaded"
        );
        Ok(bank)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, QuestionBankError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(file)
    }

    /// Built-in questionnaire covering the knowledge, lifestyle and readiness categories.
    pub fn standard() -> Self {
        Self::indexed(standard_categories(), standard_questions())
    }

    fn indexed(categories: Vec<McqCategory>, questions: Vec<McqQuestion>) -> Self {
        let question_index = questions
            .iter()
            .enumerate()
            .map(|(position, question)| (question.id.clone(), position))
            .collect();

        Self {
            categories,
            questions,
            question_index,
        }
    }

    pub fn categories(&self) -> &[McqCategory] {
        &self.categories
    }

    pub fn questions(&self) -> &[McqQuestion] {
        &self.questions
    }

    pub fn category(&self, id: &McqCategoryId) -> Option<&McqCategory> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn question(&self, id: &QuestionId) -> Option<&McqQuestion> {
        self.question_index
            .get(id)
            .and_then(|position| self.questions.get(*position))
    }
}

fn standard_categories() -> Vec<McqCategory> {
    vec![
        category("knowledge", "Exercise knowledge", 0.15),
        category("lifestyle", "Lifestyle habits", 0.15),
        category("readiness", "Training readiness", 0.10),
    ]
}

fn category(id: &str, name: &str, weight: f64) -> McqCategory {
    McqCategory {
        id: McqCategoryId(id.to_string()),
        name: name.to_string(),
        weight,
    }
}

fn standard_questions() -> Vec<McqQuestion> {
    vec![
        question(
            "knowledge_warmup",
            "knowledge",
            "What is the main purpose of a warm-up?",
            QuestionKind::SingleChoice,
            2.0,
            vec![
                choice("a", "Raise body temperature and prepare joints", 2.0),
                choice("b", "Burn calories before training", 0.0),
                choice("c", "It is not necessary", 0.0),
            ],
        ),
        question(
            "knowledge_weekly_activity",
            "knowledge",
            "How much moderate activity is recommended per week?",
            QuestionKind::SingleChoice,
            2.0,
            vec![
                choice("a", "About 30 minutes", 0.0),
                choice("b", "About 150 minutes", 2.0),
                choice("c", "About 600 minutes", 0.5),
            ],
        ),
        question(
            "knowledge_components",
            "knowledge",
            "Which are components of physical fitness? (select all)",
            QuestionKind::MultiChoice,
            3.0,
            vec![
                choice("a", "Muscular strength", 1.0),
                choice("b", "Flexibility", 1.0),
                choice("c", "Cardiorespiratory endurance", 1.0),
                choice("d", "Height", 0.0),
            ],
        ),
        question(
            "lifestyle_sleep",
            "lifestyle",
            "How many hours do you usually sleep?",
            QuestionKind::SingleChoice,
            2.0,
            vec![
                risky_choice("a", "Less than 5 hours", 0.0, 0.8),
                risky_choice("b", "5 to 6 hours", 1.0, 0.3),
                choice("c", "7 to 8 hours", 2.0),
            ],
        ),
        question(
            "lifestyle_smoking",
            "lifestyle",
            "Do you smoke?",
            QuestionKind::SingleChoice,
            2.0,
            vec![
                risky_choice("a", "Daily", 0.0, 1.0),
                risky_choice("b", "Occasionally", 1.0, 0.5),
                choice("c", "Never", 2.0),
            ],
        ),
        question(
            "lifestyle_sitting",
            "lifestyle",
            "How many hours per day do you spend sitting?",
            QuestionKind::Scale,
            2.0,
            vec![
                risky_choice("a", "More than 10 hours", 0.0, 0.6),
                choice("b", "6 to 10 hours", 1.0),
                choice("c", "Less than 6 hours", 2.0),
            ],
        ),
        question(
            "readiness_pain",
            "readiness",
            "Do you currently have joint pain during daily activity?",
            QuestionKind::SingleChoice,
            2.0,
            vec![
                risky_choice("a", "Yes, frequently", 0.0, 0.9),
                risky_choice("b", "Sometimes", 1.0, 0.4),
                choice("c", "No", 2.0),
            ],
        ),
        question(
            "readiness_motivation",
            "readiness",
            "How motivated are you to start a training program?",
            QuestionKind::Scale,
            3.0,
            vec![
                choice("1", "Not motivated", 0.0),
                choice("2", "Somewhat motivated", 1.0),
                choice("3", "Motivated", 2.0),
                choice("4", "Very motivated", 3.0),
            ],
        ),
        question(
            "readiness_goals",
            "readiness",
            "Describe your main training goal.",
            QuestionKind::FreeText,
            0.0,
            Vec::new(),
        ),
    ]
}

fn question(
    id: &str,
    category: &str,
    prompt: &str,
    kind: QuestionKind,
    max_points: f64,
    choices: Vec<McqChoice>,
) -> McqQuestion {
    McqQuestion {
        id: QuestionId(id.to_string()),
        category: McqCategoryId(category.to_string()),
        prompt: prompt.to_string(),
        kind,
        max_points,
        choices,
    }
}

fn choice(id: &str, text: &str, points: f64) -> McqChoice {
    McqChoice {
        id: ChoiceId(id.to_string()),
        text: text.to_string(),
        points,
        contributes_to_risk: false,
        risk_weight: 0.0,
    }
}

fn risky_choice(id: &str, text: &str, points: f64, risk_weight: f64) -> McqChoice {
    McqChoice {
        contributes_to_risk: true,
        risk_weight,
        ..choice(id, text, points)
    }
}
