use crate::infra::InMemoryCertificateRepository;
use certflow::config::AppConfig;
use certflow::error::AppError;
use certflow::workflows::certificates::{
    CertificateOutcomeService, CertificateSubmission, EvaluationConfig, FindingEffect,
    OutcomeReport,
};
use clap::Args;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Certificate bundle (JSON) with type, observations, checklist and test results
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Instrument CSV export appended to the bundle's test results
    #[arg(long)]
    pub(crate) schedule_csv: Option<PathBuf>,
    /// Print the outcome report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        file,
        schedule_csv,
        json,
    } = args;

    let config = AppConfig::load()?;
    let submission = load_submission(&file, schedule_csv.as_deref())?;
    let report = evaluate_submission(submission, config.evaluation)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

pub(crate) fn load_submission(
    file: &Path,
    schedule_csv: Option<&Path>,
) -> Result<CertificateSubmission, AppError> {
    let raw = std::fs::read_to_string(file)?;
    let mut submission: CertificateSubmission = serde_json::from_str(&raw)?;
    if let Some(path) = schedule_csv {
        submission.test_schedule_csv = Some(std::fs::read_to_string(path)?);
    }
    Ok(submission)
}

pub(crate) fn evaluate_submission(
    submission: CertificateSubmission,
    config: EvaluationConfig,
) -> Result<OutcomeReport, AppError> {
    let service = CertificateOutcomeService::new(
        Arc::new(InMemoryCertificateRepository::default()),
        config,
    );
    Ok(service.preview_submission(submission)?)
}

fn effect_label(effect: FindingEffect) -> &'static str {
    match effect {
        FindingEffect::Failing => "failing",
        FindingEffect::Incomplete => "incomplete",
        FindingEffect::Caveat => "caveat",
        FindingEffect::Advisory => "advisory",
    }
}

pub(crate) fn render_report(report: &OutcomeReport) -> String {
    let result = &report.result;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} ({})",
        result.certificate_type.title(),
        result.certificate_type.label()
    );
    let _ = writeln!(
        out,
        "Outcome: {} [{}]",
        result.outcome.title(),
        result.reason.code()
    );
    if result.caveat {
        let _ = writeln!(out, "Caveat: further investigation or limitations recorded");
    }
    let _ = writeln!(out, "Explanation: {}", report.explanation);

    if result.details.is_empty() {
        let _ = writeln!(out, "\nFindings: none");
        return out;
    }

    let _ = writeln!(out, "\nFindings");
    let mut findings: Vec<_> = result.details.findings.iter().collect();
    findings.sort_by_key(|finding| std::cmp::Reverse(finding.effect));
    for finding in findings {
        let _ = writeln!(out, "- [{}] {}", effect_label(finding.effect), finding.notes);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use certflow::workflows::certificates::{Outcome, OutcomeReason};
    use serde_json::json;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("certflow-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).expect("temp file written");
        path
    }

    fn bundle() -> serde_json::Value {
        json!({
            "certificate_type": "EICR",
            "observations": [
                { "code": "FI", "location": "Loft", "description": "Junction box not accessible" },
                { "code": "C3", "location": "Hallway", "description": "No SPD fitted" }
            ],
            "checklist": [
                { "section": "Earthing", "question": "Main earthing conductor", "answer": "yes" }
            ]
        })
    }

    #[test]
    fn bundle_and_schedule_are_evaluated_together() {
        let bundle_path = write_temp("bundle.json", &bundle().to_string());
        let schedule_path = write_temp(
            "schedule.csv",
            "Circuit,R1+R2,Ring r1,Ring rn,Ring r2,IR,Polarity,Zs,Max Zs,RCD\n\
1,0.45,0.31,0.32,0.52,0.5,✓,0.82,1.37,18\n",
        );

        let submission =
            load_submission(&bundle_path, Some(&schedule_path)).expect("submission loads");
        let report =
            evaluate_submission(submission, EvaluationConfig::default()).expect("evaluates");

        assert_eq!(report.result.outcome, Outcome::Unsatisfactory);
        assert_eq!(report.result.reason, OutcomeReason::TestOutOfTolerance);
        assert!(report.result.caveat);

        let _ = std::fs::remove_file(bundle_path);
        let _ = std::fs::remove_file(schedule_path);
    }

    #[test]
    fn rendered_report_lists_findings_by_severity() {
        let bundle_path = write_temp("render.json", &bundle().to_string());
        let submission = load_submission(&bundle_path, None).expect("submission loads");
        let report =
            evaluate_submission(submission, EvaluationConfig::default()).expect("evaluates");

        let text = render_report(&report);

        assert!(text.starts_with("Electrical Installation Condition Report (EICR)"));
        assert!(text.contains("Outcome: Satisfactory [further_investigation]"));
        assert!(text.contains("Caveat:"));
        let caveat = text.find("- [caveat]").expect("caveat listed");
        let advisory = text.find("- [advisory]").expect("advisory listed");
        assert!(caveat < advisory);

        let _ = std::fs::remove_file(bundle_path);
    }

    #[test]
    fn malformed_bundle_is_a_json_error() {
        let path = write_temp("broken.json", "{ \"certificate_type\": ");
        assert!(matches!(
            load_submission(&path, None),
            Err(AppError::Json(_))
        ));
        let _ = std::fs::remove_file(path);
    }
}
