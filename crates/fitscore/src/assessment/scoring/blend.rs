use super::super::domain::{QuestionnaireDomain, QuestionnaireScores};
use super::config::ComprehensiveWeights;

/// Blend the physical overall score with the questionnaire percentages.
///
/// Without any questionnaire responses the physical score passes through
/// unchanged rather than being diluted by empty categories.
pub fn comprehensive_score(
    physical_overall: Option<f64>,
    questionnaire: &QuestionnaireScores,
    has_responses: bool,
    weights: &ComprehensiveWeights,
) -> Option<f64> {
    let physical = physical_overall?;
    if !has_responses {
        return Some(physical);
    }

    let questionnaire_part: f64 = QuestionnaireDomain::ALL
        .iter()
        .map(|domain| {
            questionnaire.get(*domain).value().unwrap_or(0.0) * weights.questionnaire(*domain)
        })
        .sum();

    Some(physical * weights.physical + questionnaire_part)
}
