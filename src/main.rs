use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use bulkscan::config::AppConfig;
use bulkscan::error::AppError;
use bulkscan::telemetry;
use bulkscan::workflows::contacts::{ContactCheck, ContactChecker};
use bulkscan::workflows::plea::{validate_plea, Plea, Problem};
use bulkscan::workflows::scanning::{
    Clock, DocumentCommand, DocumentId, EnvelopeView, FixedClock, InMemoryEventLog,
    InMemoryScanStore, RegisterEnvelope, RetentionPolicy, ScanDocumentService, SystemClock,
};
use bulkscan::workflows::validation::{fix_postcode_spacing, FieldKind};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "bulkscan",
    about = "Track bulk-scanned court documents and validate what defendants sent in",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a single value against one of the format rules
    Validate(ValidateArgs),
    /// Validate a submitted plea against the authoritative case record
    Plea(FileArgs),
    /// Register an envelope and apply a scripted series of document commands
    Replay(ReplayArgs),
    /// Check every row of a defendant contact CSV export
    Contacts(ContactsArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Which rule to apply
    #[arg(value_enum)]
    kind: FieldArg,
    /// Value to check
    value: String,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// JSON input file
    #[arg(long)]
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON replay script: an envelope registration plus document commands
    #[arg(long)]
    file: PathBuf,
    /// Instant used for every command and the retention check (RFC 3339, defaults to now)
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct ContactsArgs {
    /// CSV export with Reference, Email, Phone, Driving Licence, NI Number and Postcode columns
    #[arg(long)]
    csv: PathBuf,
    /// Only list rows with at least one failing field
    #[arg(long)]
    failures_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FieldArg {
    Email,
    Phone,
    Licence,
    Ni,
    Postcode,
}

impl From<FieldArg> for FieldKind {
    fn from(value: FieldArg) -> Self {
        match value {
            FieldArg::Email => FieldKind::Email,
            FieldArg::Phone => FieldKind::Phone,
            FieldArg::Licence => FieldKind::DrivingLicence,
            FieldArg::Ni => FieldKind::NiNumber,
            FieldArg::Postcode => FieldKind::Postcode,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PleaRequest {
    document_id: String,
    submitted: Plea,
    #[serde(default)]
    authoritative: Plea,
}

#[derive(Debug, Deserialize)]
struct ReplayScript {
    envelope: RegisterEnvelope,
    #[serde(default)]
    commands: Vec<ScriptedCommand>,
}

#[derive(Debug, Deserialize)]
struct ScriptedCommand {
    document_id: DocumentId,
    #[serde(flatten)]
    command: DocumentCommand,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    steps: Vec<ReplayStep>,
    envelope: EnvelopeView,
    retention_days: u32,
    deletion_candidates: Vec<DocumentId>,
}

#[derive(Debug, Serialize)]
struct ReplayStep {
    document_id: DocumentId,
    command: &'static str,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    problems: Vec<Problem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let log_origin = telemetry::init(&config.telemetry)?;
    info!(?config.environment, ?log_origin, "bulkscan starting");

    match cli.command {
        Command::Validate(args) => {
            run_validate(args);
            Ok(())
        }
        Command::Plea(args) => run_plea(args),
        Command::Replay(args) => run_replay(args, config.retention.policy()),
        Command::Contacts(args) => run_contacts(args),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}

fn run_validate(args: ValidateArgs) {
    let kind = FieldKind::from(args.kind);
    let valid = kind.validator().is_valid(&args.value);
    let verdict = if valid { "valid" } else { "invalid" };
    println!("{} '{}': {}", kind.label(), args.value, verdict);

    if kind == FieldKind::Postcode && !valid {
        match fix_postcode_spacing(&args.value) {
            Some(fixed) => println!("suggested postcode: {fixed}"),
            None => println!("no spacing fix produces a valid postcode"),
        }
    }
}

fn run_plea(args: FileArgs) -> Result<(), AppError> {
    let request: PleaRequest = serde_json::from_str(&fs::read_to_string(args.file)?)?;
    let problems = plea_problems(&request);
    info!(
        document_id = %request.document_id,
        problems = problems.len(),
        "plea validated"
    );
    println!("{}", serde_json::to_string_pretty(&problems)?);
    Ok(())
}

fn plea_problems(request: &PleaRequest) -> Vec<Problem> {
    validate_plea(
        &request.submitted,
        &request.authoritative,
        &request.document_id,
    )
}

fn run_replay(args: ReplayArgs, retention: RetentionPolicy) -> Result<(), AppError> {
    let script: ReplayScript = serde_json::from_str(&fs::read_to_string(args.file)?)?;
    let report = match args.now {
        Some(now) => replay(script, FixedClock(now), retention)?,
        None => replay(script, SystemClock, retention)?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Refused commands are reported per step and do not stop the replay.
fn replay<C: Clock + 'static>(
    script: ReplayScript,
    clock: C,
    retention: RetentionPolicy,
) -> Result<ReplayReport, AppError> {
    let service = ScanDocumentService::new(
        Arc::new(InMemoryScanStore::default()),
        Arc::new(InMemoryEventLog::default()),
        Arc::new(clock),
        retention,
    );

    let envelope_id = script.envelope.envelope_id.clone();
    service.register_envelope(script.envelope)?;

    let mut steps = Vec::with_capacity(script.commands.len());
    for ScriptedCommand {
        document_id,
        command,
    } in script.commands
    {
        let label = command.label();
        let step = match service.handle(&envelope_id, &document_id, command) {
            Ok(outcome) => ReplayStep {
                document_id,
                command: label,
                accepted: true,
                status: Some(outcome.status().label()),
                version: Some(outcome.version),
                problems: outcome.problems,
                error: None,
            },
            Err(err) => ReplayStep {
                document_id,
                command: label,
                accepted: false,
                status: None,
                version: None,
                problems: Vec::new(),
                error: Some(err.to_string()),
            },
        };
        steps.push(step);
    }

    Ok(ReplayReport {
        steps,
        envelope: service.envelope(&envelope_id)?,
        retention_days: retention.retention_days(),
        deletion_candidates: service.deletion_candidates(&envelope_id)?,
    })
}

fn run_contacts(args: ContactsArgs) -> Result<(), AppError> {
    let checks = ContactChecker::from_path(&args.csv)?;
    let failing = checks.iter().filter(|check| !check.is_clean()).count();
    info!(rows = checks.len(), failing, "contact export checked");

    println!("Contact export: {}", args.csv.display());
    println!("{} rows, {} with invalid fields", checks.len(), failing);
    for check in &checks {
        if args.failures_only && check.is_clean() {
            continue;
        }
        println!("- {}", render_contact_check(check));
    }
    Ok(())
}

fn render_contact_check(check: &ContactCheck) -> String {
    let failed = check.failed_fields();
    let mut line = if failed.is_empty() {
        format!("{}: ok", check.reference)
    } else {
        format!("{}: invalid {}", check.reference, failed.join(", "))
    };
    if let Some(postcode) = &check.suggested_postcode {
        line.push_str(&format!(" (postcode could be '{postcode}')"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkscan::workflows::plea::ProblemCode;

    fn instant() -> DateTime<Utc> {
        parse_instant("2025-07-15T10:00:00Z").expect("valid instant")
    }

    const SCRIPT: &str = r#"{
        "envelope": {
            "envelope_id": "env-001",
            "archive_file_name": "bulkscan-2025-06-01.zip",
            "extracted_at": "2025-06-01T09:00:00Z",
            "documents": [
                { "document_id": "doc-1", "file_name": "plea-1.pdf", "case_urn": "TFL100" },
                { "document_id": "doc-2", "file_name": "plea-2.pdf", "pti_urn": "PTI200" }
            ]
        },
        "commands": [
            { "document_id": "doc-1", "command": "mark_auto_actioned", "actioned_by": "system" },
            { "document_id": "doc-2", "command": "delete_actioned" },
            { "document_id": "doc-9", "command": "expire" }
        ]
    }"#;

    #[test]
    fn replay_reports_each_step_and_continues_after_refusals() {
        let script: ReplayScript = serde_json::from_str(SCRIPT).expect("script parses");
        let report = replay(script, FixedClock(instant()), RetentionPolicy::new(30))
            .expect("replay runs");

        assert_eq!(report.steps.len(), 3);
        assert!(report.steps[0].accepted);
        assert_eq!(report.steps[0].status, Some("AUTO_ACTIONED"));
        assert_eq!(report.steps[0].version, Some(2));
        assert!(!report.steps[1].accepted);
        assert!(report.steps[1].error.is_some());
        assert!(!report.steps[2].accepted);
        assert_eq!(report.envelope.documents.len(), 2);
        assert!(report.deletion_candidates.is_empty());
    }

    #[test]
    fn replay_lists_documents_past_retention() {
        let script: ReplayScript = serde_json::from_str(SCRIPT).expect("script parses");
        let report =
            replay(script, FixedClock(instant()), RetentionPolicy::new(0)).expect("replay runs");

        assert_eq!(
            report.deletion_candidates,
            vec![DocumentId("doc-1".to_string())]
        );
    }

    #[test]
    fn plea_request_reports_problems() {
        let request: PleaRequest = serde_json::from_str(
            r#"{
                "document_id": "doc-1",
                "submitted": {
                    "offences": [{ "title": "Fare evasion", "plea": "GUILTY" }]
                }
            }"#,
        )
        .expect("request parses");

        let problems = plea_problems(&request);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].code, ProblemCode::WishToComeToCourtInvalid);
    }

    #[test]
    fn parse_instant_rejects_garbage() {
        assert!(parse_instant("yesterday").is_err());
    }

    #[test]
    fn field_args_map_to_field_kinds() {
        assert_eq!(FieldKind::from(FieldArg::Licence), FieldKind::DrivingLicence);
        assert_eq!(FieldKind::from(FieldArg::Ni), FieldKind::NiNumber);
    }

    #[test]
    fn contact_line_mentions_failures_and_fix() {
        let checks = ContactChecker::from_reader(std::io::Cursor::new(
            "Reference,Email,Phone,Driving Licence,NI Number,Postcode\nTFL-9,bad,,,,EC1A1BB\n",
        ))
        .expect("parses");

        let line = render_contact_check(&checks[0]);
        assert!(line.starts_with("TFL-9: invalid email"));
        assert!(line.contains("EC1A 1BB"));
    }
}
