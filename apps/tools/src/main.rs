use std::{io::Read, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use evaluator_client::{HttpEvaluationBackend, SessionState, SubmissionController};
use shared::{
    domain::{question_by_number, ResultPanels},
    notice::{Banner, BannerLevel},
    protocol::question_entries,
};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "assessor", about = "Evaluate interview answers from the terminal")]
struct Cli {
    /// Evaluation backend base address.
    #[arg(long, env = "BACKEND_URL", global = true)]
    backend_url: Option<String>,
    #[arg(long, default_value_t = 600, global = true)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the numbered question catalog.
    Questions,
    /// Send one answer to the backend and print the verdict.
    Evaluate {
        /// Question number as printed by `questions`.
        #[arg(long)]
        question: usize,
        /// Candidate answer; `-` reads it from stdin.
        #[arg(long)]
        answer: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Questions => {
            for entry in question_entries() {
                println!("{:>2}. {}", entry.number, entry.question);
            }
        }
        Command::Evaluate { question, answer } => {
            let Some(question_text) = question_by_number(question) else {
                bail!("question number must be between 1 and 11, got {question}");
            };
            let answer = if answer == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read answer from stdin")?;
                buf
            } else {
                answer
            };

            let backend = HttpEvaluationBackend::new(cli.backend_url)
                .with_timeout(Duration::from_secs(cli.timeout_secs));
            let controller = SubmissionController::new(Arc::new(backend));
            let session = Mutex::new(SessionState::new());

            match controller.submit(&session, question_text, &answer).await {
                Ok(result) => print!("{}", format_panels(&result.panels())),
                Err(err) => {
                    eprint!("{}", format_banner(&Banner::from(&err)));
                    bail!("evaluation failed: {err}");
                }
            }
        }
    }

    Ok(())
}

fn format_panels(panels: &ResultPanels) -> String {
    format!(
        "Score: {}\n\nReasoning:\n{}\n\nImprovement:\n{}\n",
        panels.score, panels.reason, panels.improvement
    )
}

fn format_banner(banner: &Banner) -> String {
    let label = match banner.level {
        BannerLevel::Warning => "warning",
        BannerLevel::Error => "error",
    };
    let mut out = format!("{label}: {}\n", banner.headline);
    if let Some(hint) = &banner.hint {
        out.push_str(&format!("  {hint}\n"));
    }
    if let Some(detail) = &banner.detail {
        out.push_str(&format!("--- {} ---\n{}\n", detail.summary, detail.body));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::EvaluationError;

    #[test]
    fn evaluate_subcommand_parses_question_and_answer() {
        let cli = Cli::try_parse_from([
            "assessor",
            "--backend-url",
            "http://h/",
            "evaluate",
            "--question",
            "3",
            "--answer",
            "I stay calm",
        ])
        .expect("parse");
        assert_eq!(cli.backend_url.as_deref(), Some("http://h/"));
        assert_eq!(cli.timeout_secs, 600);
        let Command::Evaluate { question, answer } = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(question, 3);
        assert_eq!(answer, "I stay calm");
    }

    #[test]
    fn panels_print_in_order() {
        let text = format_panels(&ResultPanels {
            score: "85".into(),
            reason: "Clear".into(),
            improvement: "Add examples".into(),
        });
        let score_at = text.find("Score: 85").expect("score");
        let reason_at = text.find("Clear").expect("reason");
        let improvement_at = text.find("Add examples").expect("improvement");
        assert!(score_at < reason_at && reason_at < improvement_at);
    }

    #[test]
    fn banner_output_includes_raw_detail() {
        let text = format_banner(&Banner::from(&EvaluationError::MalformedResponse {
            body: "not json".into(),
        }));
        assert!(text.starts_with("error: "));
        assert!(text.contains("not json"));
    }
}
