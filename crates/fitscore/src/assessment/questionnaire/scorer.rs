use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    ChoiceId, McqCategoryId, McqQuestion, McqResponse, QuestionBank, QuestionKind, RiskFactor,
};

/// Percentage result for one questionnaire category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: McqCategoryId,
    pub name: String,
    pub percentage: f64,
    pub earned: f64,
    pub possible: f64,
    pub answered: usize,
    /// Display hint: zero answered questions, so `percentage` is a placeholder 0.
    pub no_responses: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McqSummary {
    pub categories: BTreeMap<McqCategoryId, CategoryResult>,
    pub risk_factors: Vec<RiskFactor>,
    /// Responses that contributed points; free-text answers are not counted.
    pub total_responses: usize,
}

impl McqSummary {
    pub fn percentage(&self, category_id: &str) -> f64 {
        self.categories
            .get(&McqCategoryId(category_id.to_string()))
            .map(|result| result.percentage)
            .unwrap_or(0.0)
    }

    pub fn has_responses(&self) -> bool {
        self.total_responses > 0
    }
}

/// Points for a selection: the selected choices' sum, capped at the question maximum.
pub fn points_earned(question: &McqQuestion, selected: &[ChoiceId]) -> f64 {
    let total: f64 = selected
        .iter()
        .filter_map(|id| question.choice(id))
        .map(|choice| choice.points)
        .sum();
    total.min(question.max_points).max(0.0)
}

/// Reduce responses to per-category percentages and the risk-factor list.
///
/// Responses are assumed referentially consistent with `bank`; anything that
/// does not resolve is skipped. Free-text answers carry no points and do not
/// count as answered.
pub fn score_responses(responses: &[McqResponse], bank: &QuestionBank) -> McqSummary {
    let mut categories: BTreeMap<McqCategoryId, CategoryResult> = bank
        .categories()
        .iter()
        .map(|category| {
            (
                category.id.clone(),
                CategoryResult {
                    category: category.id.clone(),
                    name: category.name.clone(),
                    percentage: 0.0,
                    earned: 0.0,
                    possible: 0.0,
                    answered: 0,
                    no_responses: true,
                },
            )
        })
        .collect();
    let mut risk_factors = Vec::new();
    let mut total_responses = 0;

    for response in responses {
        let Some(question) = bank.question(&response.question_id) else {
            continue;
        };
        if question.kind == QuestionKind::FreeText {
            continue;
        }
        let Some(result) = categories.get_mut(&question.category) else {
            continue;
        };

        result.earned += points_earned(question, &response.selected);
        result.possible += question.max_points;
        result.answered += 1;
        result.no_responses = false;
        total_responses += 1;

        for choice in response
            .selected
            .iter()
            .filter_map(|id| question.choice(id))
            .filter(|choice| choice.contributes_to_risk)
        {
            risk_factors.push(RiskFactor {
                question_id: question.id.clone(),
                category: question.category.clone(),
                category_name: result.name.clone(),
                choice_text: choice.text.clone(),
                weight: choice.risk_weight,
            });
        }
    }

    for result in categories.values_mut() {
        result.percentage = if result.possible > 0.0 {
            100.0 * result.earned / result.possible
        } else {
            0.0
        };
    }

    McqSummary {
        categories,
        risk_factors,
        total_responses,
    }
}
