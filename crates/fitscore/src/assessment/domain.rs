use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::overrides::Scored;
use super::questionnaire::{ChoiceId, McqResponse, QuestionId, RiskFactor};

/// Identifier wrapper for recorded assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluatorId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gender category used purely as a lookup key into thresholds and norms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    /// Pooled reference data for clients whose gender is unspecified.
    Average,
}

impl Gender {
    /// Ordered keys to try when resolving reference data: exact match first, then pooled.
    pub const fn lookup_chain(self) -> &'static [Gender] {
        match self {
            Gender::Male => &[Gender::Male, Gender::Average],
            Gender::Female => &[Gender::Female, Gender::Average],
            Gender::Average => &[Gender::Average],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Average => "average",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" | "man" => Some(Gender::Male),
            "f" | "female" | "woman" => Some(Gender::Female),
            "a" | "avg" | "average" | "all" | "unspecified" | "u" => Some(Gender::Average),
            _ => None,
        }
    }
}

/// Demographics supplied by the client registry; read-only to scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<u8>,
}

impl ClientProfile {
    pub fn lookup_gender(&self) -> Gender {
        self.gender.unwrap_or(Gender::Average)
    }
}

/// The standardized physical test battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    OverheadSquat,
    PushUp,
    FarmerCarry,
    ToeTouch,
    ShoulderMobility,
    SingleLegBalance,
    StepTest,
}

impl TestKind {
    pub const ALL: [TestKind; 7] = [
        TestKind::OverheadSquat,
        TestKind::PushUp,
        TestKind::FarmerCarry,
        TestKind::ToeTouch,
        TestKind::ShoulderMobility,
        TestKind::SingleLegBalance,
        TestKind::StepTest,
    ];

    /// Identifier shared with normative reference tables.
    pub const fn identifier(self) -> &'static str {
        match self {
            TestKind::OverheadSquat => "overhead_squat",
            TestKind::PushUp => "push_up",
            TestKind::FarmerCarry => "farmer_carry",
            TestKind::ToeTouch => "toe_touch",
            TestKind::ShoulderMobility => "shoulder_mobility",
            TestKind::SingleLegBalance => "single_leg_balance",
            TestKind::StepTest => "step_test",
        }
    }
}

/// Physical score categories, each a 0-100 normalization of a fixed test subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Strength,
    Mobility,
    Balance,
    Cardio,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 4] = [
        CategoryKind::Strength,
        CategoryKind::Mobility,
        CategoryKind::Balance,
        CategoryKind::Cardio,
    ];

    pub const fn identifier(self) -> &'static str {
        match self {
            CategoryKind::Strength => "strength",
            CategoryKind::Mobility => "mobility",
            CategoryKind::Balance => "balance",
            CategoryKind::Cardio => "cardio",
        }
    }

    pub const fn members(self) -> &'static [TestKind] {
        match self {
            CategoryKind::Strength => &[TestKind::PushUp, TestKind::FarmerCarry],
            CategoryKind::Mobility => &[TestKind::ToeTouch, TestKind::ShoulderMobility],
            CategoryKind::Balance => &[TestKind::SingleLegBalance, TestKind::OverheadSquat],
            CategoryKind::Cardio => &[TestKind::StepTest],
        }
    }
}

/// Questionnaire categories that feed the comprehensive blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionnaireDomain {
    Knowledge,
    Lifestyle,
    Readiness,
}

impl QuestionnaireDomain {
    pub const ALL: [QuestionnaireDomain; 3] = [
        QuestionnaireDomain::Knowledge,
        QuestionnaireDomain::Lifestyle,
        QuestionnaireDomain::Readiness,
    ];

    /// Category identifier in the question bank.
    pub const fn category_id(self) -> &'static str {
        match self {
            QuestionnaireDomain::Knowledge => "knowledge",
            QuestionnaireDomain::Lifestyle => "lifestyle",
            QuestionnaireDomain::Readiness => "readiness",
        }
    }
}

pub const OVERALL_IDENTIFIER: &str = "overall";

/// Every score field carrying a manual-override flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    OverheadSquat,
    PushUp,
    FarmerCarry,
    ToeTouch,
    ShoulderMobility,
    SingleLegBalance,
    StepTest,
    Strength,
    Mobility,
    Balance,
    Cardio,
    Overall,
    Knowledge,
    Lifestyle,
    Readiness,
    Comprehensive,
}

impl ScoreField {
    pub const fn test(kind: TestKind) -> Self {
        match kind {
            TestKind::OverheadSquat => ScoreField::OverheadSquat,
            TestKind::PushUp => ScoreField::PushUp,
            TestKind::FarmerCarry => ScoreField::FarmerCarry,
            TestKind::ToeTouch => ScoreField::ToeTouch,
            TestKind::ShoulderMobility => ScoreField::ShoulderMobility,
            TestKind::SingleLegBalance => ScoreField::SingleLegBalance,
            TestKind::StepTest => ScoreField::StepTest,
        }
    }

    pub const fn category(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Strength => ScoreField::Strength,
            CategoryKind::Mobility => ScoreField::Mobility,
            CategoryKind::Balance => ScoreField::Balance,
            CategoryKind::Cardio => ScoreField::Cardio,
        }
    }

    pub const fn questionnaire(domain: QuestionnaireDomain) -> Self {
        match domain {
            QuestionnaireDomain::Knowledge => ScoreField::Knowledge,
            QuestionnaireDomain::Lifestyle => ScoreField::Lifestyle,
            QuestionnaireDomain::Readiness => ScoreField::Readiness,
        }
    }

    pub const fn as_test(self) -> Option<TestKind> {
        match self {
            ScoreField::OverheadSquat => Some(TestKind::OverheadSquat),
            ScoreField::PushUp => Some(TestKind::PushUp),
            ScoreField::FarmerCarry => Some(TestKind::FarmerCarry),
            ScoreField::ToeTouch => Some(TestKind::ToeTouch),
            ScoreField::ShoulderMobility => Some(TestKind::ShoulderMobility),
            ScoreField::SingleLegBalance => Some(TestKind::SingleLegBalance),
            ScoreField::StepTest => Some(TestKind::StepTest),
            _ => None,
        }
    }
}

/// Squat entry: the observed compensation checklist, or a legacy direct quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SquatInput {
    Compensations(SquatCompensations),
    LegacyQuality { quality: i32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquatCompensations {
    #[serde(default)]
    pub knee_valgus: bool,
    #[serde(default)]
    pub forward_lean: bool,
    #[serde(default)]
    pub heel_lift: bool,
    #[serde(default)]
    pub pain: bool,
}

impl SquatCompensations {
    pub fn count(&self) -> u8 {
        [self.knee_valgus, self.forward_lean, self.heel_lift]
            .iter()
            .filter(|flag| **flag)
            .count() as u8
    }
}

/// Single-leg stance durations in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceInput {
    #[serde(default)]
    pub left_eyes_open: Option<f64>,
    #[serde(default)]
    pub right_eyes_open: Option<f64>,
    #[serde(default)]
    pub left_eyes_closed: Option<f64>,
    #[serde(default)]
    pub right_eyes_closed: Option<f64>,
}

impl BalanceInput {
    pub fn is_empty(&self) -> bool {
        self.durations().iter().all(Option::is_none)
    }

    pub fn durations(&self) -> [Option<f64>; 4] {
        [
            self.left_eyes_open,
            self.right_eyes_open,
            self.left_eyes_closed,
            self.right_eyes_closed,
        ]
    }
}

/// Step test capture: exercise duration plus the three post-exercise pulse counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepTestInput {
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub recovery_pulses: Option<[u16; 3]>,
}

/// Raw per-test measurements; every entry may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(default)]
    pub overhead_squat: Option<SquatInput>,
    #[serde(default)]
    pub push_up_reps: Option<u32>,
    #[serde(default)]
    pub farmer_carry_seconds: Option<f64>,
    /// Signed reach past the toe line in cm; negative when the fingertips stop short.
    #[serde(default)]
    pub toe_touch_reach_cm: Option<f64>,
    /// Signed fingertip overlap behind the back in cm; negative for a gap.
    #[serde(default)]
    pub shoulder_reach_cm: Option<f64>,
    #[serde(default)]
    pub balance: BalanceInput,
    #[serde(default)]
    pub step_test: StepTestInput,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TestScores {
    #[serde(default)]
    pub overhead_squat: Scored<u8>,
    #[serde(default)]
    pub push_up: Scored<u8>,
    #[serde(default)]
    pub farmer_carry: Scored<u8>,
    #[serde(default)]
    pub toe_touch: Scored<u8>,
    #[serde(default)]
    pub shoulder_mobility: Scored<u8>,
    #[serde(default)]
    pub single_leg_balance: Scored<u8>,
    #[serde(default)]
    pub step_test: Scored<u8>,
}

impl TestScores {
    pub fn get(&self, kind: TestKind) -> &Scored<u8> {
        match kind {
            TestKind::OverheadSquat => &self.overhead_squat,
            TestKind::PushUp => &self.push_up,
            TestKind::FarmerCarry => &self.farmer_carry,
            TestKind::ToeTouch => &self.toe_touch,
            TestKind::ShoulderMobility => &self.shoulder_mobility,
            TestKind::SingleLegBalance => &self.single_leg_balance,
            TestKind::StepTest => &self.step_test,
        }
    }

    pub fn get_mut(&mut self, kind: TestKind) -> &mut Scored<u8> {
        match kind {
            TestKind::OverheadSquat => &mut self.overhead_squat,
            TestKind::PushUp => &mut self.push_up,
            TestKind::FarmerCarry => &mut self.farmer_carry,
            TestKind::ToeTouch => &mut self.toe_touch,
            TestKind::ShoulderMobility => &mut self.shoulder_mobility,
            TestKind::SingleLegBalance => &mut self.single_leg_balance,
            TestKind::StepTest => &mut self.step_test,
        }
    }

    pub fn any_present(&self) -> bool {
        TestKind::ALL
            .iter()
            .any(|kind| self.get(*kind).value().is_some())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    #[serde(default)]
    pub strength: Scored<f64>,
    #[serde(default)]
    pub mobility: Scored<f64>,
    #[serde(default)]
    pub balance: Scored<f64>,
    #[serde(default)]
    pub cardio: Scored<f64>,
}

impl CategoryScores {
    pub fn get(&self, kind: CategoryKind) -> &Scored<f64> {
        match kind {
            CategoryKind::Strength => &self.strength,
            CategoryKind::Mobility => &self.mobility,
            CategoryKind::Balance => &self.balance,
            CategoryKind::Cardio => &self.cardio,
        }
    }

    pub fn get_mut(&mut self, kind: CategoryKind) -> &mut Scored<f64> {
        match kind {
            CategoryKind::Strength => &mut self.strength,
            CategoryKind::Mobility => &mut self.mobility,
            CategoryKind::Balance => &mut self.balance,
            CategoryKind::Cardio => &mut self.cardio,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireScores {
    #[serde(default)]
    pub knowledge: Scored<f64>,
    #[serde(default)]
    pub lifestyle: Scored<f64>,
    #[serde(default)]
    pub readiness: Scored<f64>,
}

impl QuestionnaireScores {
    pub fn get(&self, domain: QuestionnaireDomain) -> &Scored<f64> {
        match domain {
            QuestionnaireDomain::Knowledge => &self.knowledge,
            QuestionnaireDomain::Lifestyle => &self.lifestyle,
            QuestionnaireDomain::Readiness => &self.readiness,
        }
    }

    pub fn get_mut(&mut self, domain: QuestionnaireDomain) -> &mut Scored<f64> {
        match domain {
            QuestionnaireDomain::Knowledge => &mut self.knowledge,
            QuestionnaireDomain::Lifestyle => &mut self.lifestyle,
            QuestionnaireDomain::Readiness => &mut self.readiness,
        }
    }
}

/// All persisted score fields of one assessment, each paired with its override flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentScores {
    #[serde(default)]
    pub tests: TestScores,
    #[serde(default)]
    pub categories: CategoryScores,
    #[serde(default)]
    pub overall: Scored<f64>,
    #[serde(default)]
    pub questionnaire: QuestionnaireScores,
    #[serde(default)]
    pub comprehensive: Scored<f64>,
}

impl AssessmentScores {
    pub fn value(&self, field: ScoreField) -> Option<f64> {
        if let Some(kind) = field.as_test() {
            return self.tests.get(kind).value().map(f64::from);
        }
        self.decimal(field).and_then(Scored::value)
    }

    pub fn is_manual(&self, field: ScoreField) -> bool {
        match field.as_test() {
            Some(kind) => self.tests.get(kind).is_manual(),
            None => self.decimal(field).is_some_and(Scored::is_manual),
        }
    }

    /// Pin a field to a trainer-entered value. Test scores must already be range checked.
    pub fn pin(&mut self, field: ScoreField, value: f64) {
        match field.as_test() {
            Some(kind) => {
                *self.tests.get_mut(kind) = Scored::manual(value.round() as u8);
            }
            None => {
                if let Some(slot) = self.decimal_mut(field) {
                    *slot = Scored::manual(value);
                }
            }
        }
    }

    /// Hand a field back to the engine; the next recompute overwrites it.
    pub fn release(&mut self, field: ScoreField) {
        match field.as_test() {
            Some(kind) => self.tests.get_mut(kind).release(),
            None => {
                if let Some(slot) = self.decimal_mut(field) {
                    slot.release();
                }
            }
        }
    }

    pub fn manual_fields(&self) -> Vec<ScoreField> {
        ALL_SCORE_FIELDS
            .iter()
            .copied()
            .filter(|field| self.is_manual(*field))
            .collect()
    }

    fn decimal(&self, field: ScoreField) -> Option<&Scored<f64>> {
        match field {
            ScoreField::Strength => Some(&self.categories.strength),
            ScoreField::Mobility => Some(&self.categories.mobility),
            ScoreField::Balance => Some(&self.categories.balance),
            ScoreField::Cardio => Some(&self.categories.cardio),
            ScoreField::Overall => Some(&self.overall),
            ScoreField::Knowledge => Some(&self.questionnaire.knowledge),
            ScoreField::Lifestyle => Some(&self.questionnaire.lifestyle),
            ScoreField::Readiness => Some(&self.questionnaire.readiness),
            ScoreField::Comprehensive => Some(&self.comprehensive),
            _ => None,
        }
    }

    fn decimal_mut(&mut self, field: ScoreField) -> Option<&mut Scored<f64>> {
        match field {
            ScoreField::Strength => Some(&mut self.categories.strength),
            ScoreField::Mobility => Some(&mut self.categories.mobility),
            ScoreField::Balance => Some(&mut self.categories.balance),
            ScoreField::Cardio => Some(&mut self.categories.cardio),
            ScoreField::Overall => Some(&mut self.overall),
            ScoreField::Knowledge => Some(&mut self.questionnaire.knowledge),
            ScoreField::Lifestyle => Some(&mut self.questionnaire.lifestyle),
            ScoreField::Readiness => Some(&mut self.questionnaire.readiness),
            ScoreField::Comprehensive => Some(&mut self.comprehensive),
            _ => None,
        }
    }
}

pub const ALL_SCORE_FIELDS: [ScoreField; 16] = [
    ScoreField::OverheadSquat,
    ScoreField::PushUp,
    ScoreField::FarmerCarry,
    ScoreField::ToeTouch,
    ScoreField::ShoulderMobility,
    ScoreField::SingleLegBalance,
    ScoreField::StepTest,
    ScoreField::Strength,
    ScoreField::Mobility,
    ScoreField::Balance,
    ScoreField::Cardio,
    ScoreField::Overall,
    ScoreField::Knowledge,
    ScoreField::Lifestyle,
    ScoreField::Readiness,
    ScoreField::Comprehensive,
];

/// One evaluation event for one client on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub client_id: ClientId,
    pub evaluator_id: EvaluatorId,
    pub assessed_on: NaiveDate,
    pub client: ClientProfile,
    pub measurements: Measurements,
    pub responses: Vec<McqResponse>,
    pub scores: AssessmentScores,
    pub risk_factors: Vec<RiskFactor>,
    #[serde(default)]
    pub archived: bool,
}

/// Inbound bundle from the forms layer before intake validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    pub client_id: ClientId,
    pub evaluator_id: EvaluatorId,
    pub assessed_on: NaiveDate,
    #[serde(default)]
    pub client: ClientProfile,
    #[serde(default)]
    pub measurements: Measurements,
    #[serde(default)]
    pub responses: Vec<ResponseSubmission>,
    /// Trainer-entered values; each listed field is pinned against recomputation.
    #[serde(default)]
    pub manual_scores: BTreeMap<ScoreField, f64>,
}

/// A raw questionnaire answer: which choices were ticked for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSubmission {
    pub question_id: QuestionId,
    #[serde(default)]
    pub selected: Vec<ChoiceId>,
}

/// Replacement raw inputs for an existing assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputUpdate {
    #[serde(default)]
    pub client: Option<ClientProfile>,
    #[serde(default)]
    pub measurements: Option<Measurements>,
    #[serde(default)]
    pub responses: Option<Vec<ResponseSubmission>>,
}
