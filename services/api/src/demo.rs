use crate::infra::{load_engine, InMemoryAssessmentRepository};
use chrono::{Local, NaiveDate};
use clap::Args;
use fitscore::assessment::questionnaire::{ChoiceId, QuestionId};
use fitscore::assessment::{
    AssessmentReport, AssessmentScoringService, AssessmentSubmission, BalanceInput, CategoryKind,
    ClientId, ClientProfile, EvaluatorId, Gender, Measurements, OverrideRequest,
    PercentileResult, ProgressReport, ResponseSubmission, ScoreDelta, ScoreField, Scored,
    SquatCompensations, SquatInput, StepTestInput, TestKind,
};
use fitscore::config::ReferenceDataConfig;
use fitscore::error::AppError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Assessment submission JSON (client, measurements, responses, manual scores)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Normative table CSV replacing the built-in reference cohort
    #[arg(long)]
    pub(crate) norms: Option<PathBuf>,
    /// Question bank JSON replacing the built-in questionnaire
    #[arg(long)]
    pub(crate) questions: Option<PathBuf>,
    /// Scoring weights and thresholds JSON replacing the defaults
    #[arg(long)]
    pub(crate) scoring_config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Test, category or `overall` identifier, e.g. push_up
    #[arg(long)]
    pub(crate) identifier: String,
    /// Raw metric or score to rank
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) score: f64,
    /// male, female or average; omitted ranks against pooled data
    #[arg(long, value_parser = crate::infra::parse_gender)]
    pub(crate) gender: Option<Gender>,
    /// Client age in years; without it no band can be chosen
    #[arg(long)]
    pub(crate) age: Option<u8>,
    /// Normative table CSV replacing the built-in reference cohort
    #[arg(long)]
    pub(crate) norms: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Normative table CSV replacing the built-in reference cohort
    #[arg(long)]
    pub(crate) norms: Option<PathBuf>,
    /// Also print the follow-up report payload as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        norms,
        questions,
        scoring_config,
    } = args;

    let engine = load_engine(&ReferenceDataConfig {
        norms_csv: norms,
        question_bank: questions,
        scoring_config,
    })?;
    let submission: AssessmentSubmission =
        serde_json::from_reader(BufReader::new(File::open(&input)?))?;

    let service =
        AssessmentScoringService::new(Arc::new(InMemoryAssessmentRepository::default()), engine);
    let record = service.submit(submission)?;
    println!("{}", serde_json::to_string_pretty(&record.report())?);
    Ok(())
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        identifier,
        score,
        gender,
        age,
        norms,
    } = args;

    let engine = load_engine(&ReferenceDataConfig {
        norms_csv: norms,
        ..ReferenceDataConfig::default()
    })?;
    let client = ClientProfile { gender, age };

    match engine.percentiles().rank(&identifier, score, &client) {
        PercentileResult::Ranked(rank) => {
            println!(
                "{} = {} ranks at the {:.1} percentile",
                rank.identifier, rank.score, rank.percentile
            );
            println!(
                "Reference: {} {}-{} ({}{})",
                rank.reference_gender.label(),
                rank.age_min,
                rank.age_max,
                rank.provenance.source,
                rank.provenance
                    .year
                    .map(|year| format!(", {year}"))
                    .unwrap_or_default()
            );
        }
        PercentileResult::NoData => {
            println!("No normative data available for '{identifier}' with the given demographics");
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { norms, json } = args;

    let engine = load_engine(&ReferenceDataConfig {
        norms_csv: norms,
        ..ReferenceDataConfig::default()
    })?;
    let service =
        AssessmentScoringService::new(Arc::new(InMemoryAssessmentRepository::default()), engine);

    let today = Local::now().date_naive();
    let baseline_on = today - chrono::Duration::days(91);

    println!("Fitness assessment scoring demo");
    let baseline = service.submit(demo_submission(baseline_on, 14))?;
    render_assessment_report("Baseline visit", &baseline.report());

    let follow_up = service.submit(demo_submission(today, 25))?;
    // shoulder mobility re-tested by hand after warm-up
    let mut pin = BTreeMap::new();
    pin.insert(ScoreField::ShoulderMobility, 4.0);
    let follow_up = service.set_overrides(
        &follow_up.assessment.id,
        OverrideRequest {
            pin,
            release: Vec::new(),
        },
    )?;
    render_assessment_report("Follow-up visit", &follow_up.report());

    let progress = service.client_progress(&follow_up.assessment.client_id)?;
    render_progress(&progress);

    if json {
        println!(
            "\nFollow-up report payload:\n{}",
            serde_json::to_string_pretty(&follow_up.report())?
        );
    }

    Ok(())
}

pub(crate) fn demo_submission(assessed_on: NaiveDate, push_up_reps: u32) -> AssessmentSubmission {
    let answer = |question: &str, choices: &[&str]| ResponseSubmission {
        question_id: QuestionId(question.to_string()),
        selected: choices
            .iter()
            .map(|choice| ChoiceId(choice.to_string()))
            .collect(),
    };

    AssessmentSubmission {
        client_id: ClientId("demo-client".to_string()),
        evaluator_id: EvaluatorId("demo-trainer".to_string()),
        assessed_on,
        client: ClientProfile {
            gender: Some(Gender::Male),
            age: Some(35),
        },
        measurements: Measurements {
            overhead_squat: Some(SquatInput::Compensations(SquatCompensations {
                forward_lean: true,
                ..SquatCompensations::default()
            })),
            push_up_reps: Some(push_up_reps),
            farmer_carry_seconds: Some(65.0),
            toe_touch_reach_cm: Some(2.0),
            shoulder_reach_cm: Some(-5.0),
            balance: BalanceInput {
                left_eyes_open: Some(32.0),
                right_eyes_open: Some(28.0),
                left_eyes_closed: Some(8.0),
                right_eyes_closed: Some(12.0),
            },
            step_test: StepTestInput {
                duration_seconds: Some(300.0),
                recovery_pulses: Some([80, 70, 60]),
            },
        },
        responses: vec![
            answer("knowledge_warmup", &["a"]),
            answer("knowledge_weekly_activity", &["b"]),
            answer("knowledge_components", &["a", "b"]),
            answer("lifestyle_sleep", &["b"]),
            answer("lifestyle_smoking", &["c"]),
            answer("readiness_pain", &["a"]),
            answer("readiness_motivation", &["4"]),
        ],
        manual_scores: BTreeMap::new(),
    }
}

pub(crate) fn render_assessment_report(title: &str, report: &AssessmentReport) {
    println!(
        "\n{title}: {} for {} on {} ({})",
        report.assessment_id, report.client_id, report.assessed_on, report.status
    );

    println!("Test scores:");
    for kind in TestKind::ALL {
        println!(
            "  - {}: {}",
            kind.identifier(),
            describe_score(report.scores.tests.get(kind), |value| value.to_string())
        );
    }

    println!("Category scores:");
    for kind in CategoryKind::ALL {
        println!(
            "  - {}: {}",
            kind.identifier(),
            describe_score(report.scores.categories.get(kind), |value| format!("{value:.1}"))
        );
    }
    println!(
        "Overall: {} | Comprehensive: {}",
        describe_score(&report.scores.overall, |value| format!("{value:.1}")),
        describe_score(&report.scores.comprehensive, |value| format!("{value:.1}"))
    );

    if !report.questionnaire.is_empty() {
        println!("Questionnaire:");
        for result in report.questionnaire.values() {
            if result.no_responses {
                println!("  - {}: no responses", result.name);
            } else {
                println!(
                    "  - {}: {:.1}% ({} answered)",
                    result.name, result.percentage, result.answered
                );
            }
        }
    }

    if report.risk_factors.is_empty() {
        println!("Risk factors: none flagged");
    } else {
        println!("Risk factors:");
        for risk in &report.risk_factors {
            println!(
                "  - [{}] {} (weight {:.2})",
                risk.category_name, risk.choice_text, risk.weight
            );
        }
    }

    println!("Percentiles:");
    for (identifier, result) in &report.percentiles {
        match result {
            PercentileResult::Ranked(rank) => println!(
                "  - {identifier}: {:.1} ({} {}-{})",
                rank.percentile,
                rank.reference_gender.label(),
                rank.age_min,
                rank.age_max
            ),
            PercentileResult::NoData => println!("  - {identifier}: no normative data"),
        }
    }

    match &report.performance_age {
        Some(age) => println!(
            "Performance age: {} (chronological {}, difference {:+}) - {}",
            age.performance_age,
            age.chronological_age,
            age.age_difference,
            age.interpretation.label()
        ),
        None => println!("Performance age: not available"),
    }
}

pub(crate) fn render_progress(progress: &ProgressReport) {
    println!(
        "\nProgress for {} over {} days ({} -> {})",
        progress.client_id, progress.days_between, progress.previous_date, progress.current_date
    );
    for (kind, delta) in &progress.categories {
        println!("  - {}: {}", kind.identifier(), describe_delta(delta));
    }
    println!("  - overall: {}", describe_delta(&progress.overall));
    println!("  - comprehensive: {}", describe_delta(&progress.comprehensive));
    if let Some(change) = progress.age_difference_change {
        println!("  - performance age gap moved by {change:+} years");
    }
}

fn describe_score<T: Copy>(scored: &Scored<T>, format: impl Fn(T) -> String) -> String {
    match scored.value() {
        Some(value) if scored.is_manual() => format!("{} (manual)", format(value)),
        Some(value) => format(value),
        None => "n/a".to_string(),
    }
}

fn describe_delta(delta: &ScoreDelta) -> String {
    match (delta.previous, delta.current, delta.change) {
        (Some(previous), Some(current), Some(change)) => {
            format!("{previous:.1} -> {current:.1} ({change:+.1})")
        }
        (None, Some(current), _) => format!("new {current:.1}"),
        (Some(previous), None, _) => format!("{previous:.1} -> n/a"),
        _ => "n/a".to_string(),
    }
}
