//! Revlink - review-event hook linking commits to tracker issues
//!
//! Invoked once per review event by the calling pipeline. Extracts issue
//! keys and workflow tokens from the change's commit message, posts
//! cross-reference comments to the issue tracker, and exits with a status
//! the pipeline uses as a merge gate.
//!
//! ## Commands
//!
//! - `run`: process one review event end-to-end (the hook entry point)
//! - `extract`: parse commit-log text from a file or stdin and print the
//!   extracted record as JSON, for debugging scan behavior
//!
//! ## Exit codes (`run`)
//!
//! - `0`: accepted (issue reference or workflow token found)
//! - `1`: rejected (neither found)
//! - `2`: tracker configuration missing
//! - `3`: trigger information missing (not our event)
//! - otherwise: the underlying git status for repository failures, or `4`
//!   for any other fatal error

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn, Level};

use revlink_core::{
    default_token_vocabulary, ensure_mirror, evaluate_gate, extract, extract_bare,
    init_tracing, link_issues, parse_token_vocabulary, resolve_reviewer, show_revision,
    CommentTrigger, CommitRecord, EventKind, GateVerdict, MirrorSpec, Result, ReviewEvent,
    ReviewIdentity, RevlinkError, Scanner, TokenCase, TrackerConfig,
};
use revlink_tracker::RestTracker;

#[derive(Parser)]
#[command(name = "revlink")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Commit-to-issue linking hook for review pipelines", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one review event and gate it
    Run(RunArgs),

    /// Parse commit-log text and print the extracted record as JSON
    Extract {
        /// Input file (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat input as a bare subject line instead of full log text
        #[arg(long)]
        bare: bool,
    },
}

/// The invocation contract: every field the triggering pipeline supplies,
/// flag-overridable for local testing.
#[derive(Args, Debug)]
struct RunArgs {
    /// Tracker server base URL
    #[arg(long, env = "JIRA_SERVER")]
    jira_server: Option<String>,

    /// Tracker username
    #[arg(long, env = "JIRA_USERNAME")]
    jira_username: Option<String>,

    /// Tracker password
    #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true)]
    jira_password: Option<String>,

    /// Comma-separated workflow-token vocabulary
    #[arg(long, env = "TOKENS")]
    tokens: Option<String>,

    /// Review server host (enables repository fetch)
    #[arg(long, env = "GERRIT_HOST")]
    host: Option<String>,

    /// Review server git port
    #[arg(long, env = "GERRIT_PORT")]
    port: Option<u16>,

    /// Review server git protocol
    #[arg(long, env = "GERRIT_PROTO")]
    proto: Option<String>,

    /// Project identifier
    #[arg(long, env = "GERRIT_PROJECT")]
    project: Option<String>,

    /// Explicit revision to inspect
    #[arg(long, env = "GERRIT_PATCHSET_REVISION")]
    revision: Option<String>,

    /// Ref to fetch before inspection
    #[arg(long, env = "GERRIT_REFSPEC")]
    refspec: Option<String>,

    /// Change subject (fallback content)
    #[arg(long, env = "GERRIT_CHANGE_SUBJECT")]
    subject: Option<String>,

    /// Change author display name
    #[arg(long, env = "GERRIT_EVENT_ACCOUNT_NAME")]
    author_name: Option<String>,

    /// Change author email
    #[arg(long, env = "GERRIT_EVENT_ACCOUNT_EMAIL")]
    author_email: Option<String>,

    /// Commit message body (fallback content)
    #[arg(long, env = "GERRIT_CHANGE_COMMIT_MESSAGE")]
    message: Option<String>,

    /// URL of the change under review
    #[arg(long, env = "GERRIT_CHANGE_URL")]
    change_url: Option<String>,

    /// Event type (e.g. patchset-created, change-merged)
    #[arg(long, env = "GERRIT_EVENT_TYPE")]
    event_type: Option<String>,

    /// Token-match case sensitivity (sensitive | insensitive)
    #[arg(long, env = "REVLINK_TOKEN_CASE")]
    token_case: Option<String>,

    /// When to post comments (always | merged-only)
    #[arg(long, env = "REVLINK_COMMENT_TRIGGER")]
    comment_trigger: Option<String>,

    /// Root directory for repository mirrors
    #[arg(long, env = "REVLINK_MIRROR_ROOT", default_value = "repos")]
    mirror_root: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Run(args) => match cmd_run(&args).await {
            Ok(verdict) => {
                if verdict.accepted {
                    info!(message = %verdict.message, "gate accepted");
                    ExitCode::SUCCESS
                } else {
                    warn!(message = %verdict.message, "gate rejected");
                    ExitCode::from(1)
                }
            }
            Err(err) => {
                error!(error = %err, "run failed");
                ExitCode::from(exit_code_for(&err))
            }
        },
        Commands::Extract { file, bare } => match cmd_extract(file.as_deref(), bare) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(error = %format!("{err:#}"), "extract failed");
                ExitCode::FAILURE
            }
        },
    }
}

/// Process one review event: connect, resolve source, extract, link, gate.
async fn cmd_run(args: &RunArgs) -> Result<GateVerdict> {
    let tracker_config = tracker_config(args)?;
    let event = review_event(args)?;
    let scanner = build_scanner(args)?;
    let trigger = comment_trigger(args)?;

    // Fail fast on credentials before touching the repository.
    let tracker = RestTracker::connect(tracker_config)
        .await
        .map_err(|e| RevlinkError::TrackerConnection(e.to_string()))?;

    let record = resolve_record(args, &event, &scanner)?;
    info!(
        subject = record.subject.as_deref().unwrap_or(""),
        issues = ?record.issues,
        tokens = ?record.tokens,
        "extracted commit record"
    );

    let reviewer = resolve_reviewer(&tracker, &event.author).await?;
    let post = trigger.applies(&event.kind);
    let report = link_issues(&tracker, &record, &reviewer, &event.change_url, post).await?;
    info!(
        comments = report.comments.len(),
        posted = report.posted,
        "cross-reference pass complete"
    );

    Ok(evaluate_gate(&record))
}

/// Materialize the commit record: full log text when repository
/// coordinates are complete, otherwise the event-supplied subject/body.
fn resolve_record(args: &RunArgs, event: &ReviewEvent, scanner: &Scanner) -> Result<CommitRecord> {
    match mirror_spec(args) {
        Some((spec, refspec)) => {
            let dir = ensure_mirror(&spec, &args.mirror_root, &refspec)?;
            let revision = args.revision.as_deref().unwrap_or("FETCH_HEAD");
            let raw = show_revision(&dir, revision)?;
            Ok(extract(&raw, scanner))
        }
        None => {
            info!("repository coordinates incomplete, using event subject/body");
            Ok(extract_bare(&event.subject, &event.body, scanner))
        }
    }
}

/// Repository coordinates, when the event supplied all of them.
fn mirror_spec(args: &RunArgs) -> Option<(MirrorSpec, String)> {
    let spec = MirrorSpec {
        host: args.host.clone()?,
        port: args.port?,
        proto: args.proto.clone()?,
        project: args.project.clone()?,
    };
    Some((spec, args.refspec.clone()?))
}

fn tracker_config(args: &RunArgs) -> Result<TrackerConfig> {
    Ok(TrackerConfig {
        server_url: require(&args.jira_server, "JIRA_SERVER", missing_config)?,
        username: require(&args.jira_username, "JIRA_USERNAME", missing_config)?,
        password: require(&args.jira_password, "JIRA_PASSWORD", missing_config)?,
    })
}

fn review_event(args: &RunArgs) -> Result<ReviewEvent> {
    Ok(ReviewEvent {
        kind: EventKind::parse(&require(
            &args.event_type,
            "GERRIT_EVENT_TYPE",
            missing_trigger,
        )?),
        subject: require(&args.subject, "GERRIT_CHANGE_SUBJECT", missing_trigger)?,
        body: args.message.clone().unwrap_or_default(),
        author: ReviewIdentity::new(
            require(&args.author_name, "GERRIT_EVENT_ACCOUNT_NAME", missing_trigger)?,
            require(
                &args.author_email,
                "GERRIT_EVENT_ACCOUNT_EMAIL",
                missing_trigger,
            )?,
        ),
        change_url: require(&args.change_url, "GERRIT_CHANGE_URL", missing_trigger)?,
    })
}

fn build_scanner(args: &RunArgs) -> Result<Scanner> {
    let vocabulary = match &args.tokens {
        Some(raw) => parse_token_vocabulary(raw),
        None => default_token_vocabulary(),
    };
    let case = match &args.token_case {
        Some(raw) => TokenCase::parse(raw)
            .ok_or(RevlinkError::ConfigurationMissing("REVLINK_TOKEN_CASE"))?,
        None => TokenCase::default(),
    };
    Scanner::new(&vocabulary, case)
}

fn comment_trigger(args: &RunArgs) -> Result<CommentTrigger> {
    match &args.comment_trigger {
        Some(raw) => CommentTrigger::parse(raw)
            .ok_or(RevlinkError::ConfigurationMissing("REVLINK_COMMENT_TRIGGER")),
        None => Ok(CommentTrigger::default()),
    }
}

fn require(
    value: &Option<String>,
    name: &'static str,
    to_error: fn(&'static str) -> RevlinkError,
) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(to_error(name)),
    }
}

fn missing_config(name: &'static str) -> RevlinkError {
    RevlinkError::ConfigurationMissing(name)
}

fn missing_trigger(name: &'static str) -> RevlinkError {
    RevlinkError::TriggerInformationMissing(name)
}

/// Map the error taxonomy onto the exit-code contract. Repository
/// failures propagate the git subprocess's own status when it fits.
fn exit_code_for(err: &RevlinkError) -> u8 {
    match err {
        RevlinkError::ConfigurationMissing(_) => 2,
        RevlinkError::TriggerInformationMissing(_) => 3,
        RevlinkError::RepositoryAccess { status, .. } => status
            .and_then(|s| u8::try_from(s).ok())
            .filter(|s| *s != 0)
            .unwrap_or(4),
        _ => 4,
    }
}

/// Parse log text from a file or stdin and print the record as JSON.
fn cmd_extract(file: Option<&std::path::Path>, bare: bool) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let vocabulary = match std::env::var("TOKENS") {
        Ok(raw) => parse_token_vocabulary(&raw),
        Err(_) => default_token_vocabulary(),
    };
    let case = std::env::var("REVLINK_TOKEN_CASE")
        .ok()
        .and_then(|raw| TokenCase::parse(&raw))
        .unwrap_or_default();
    let scanner = Scanner::new(&vocabulary, case)?;

    let record = if bare {
        let (subject, body) = text.split_once('\n').unwrap_or((text.as_str(), ""));
        extract_bare(subject, body, &scanner)
    } else {
        extract(&text, &scanner)
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
