//! Run command for Drill.
//!
//! Drives an exam session from line-based input: an item id is a guess,
//! `?` gives up, `q` quits. The view is printed after every action and the
//! session summary on exit.

use std::io::{BufRead, Write};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::{ExamSession, ExamView, GuessResult, RoundRecord, SessionSummary, Verdict};
use crate::error::{DrillError, Result};

/// Input that gives up on the current target.
pub const GIVE_UP_INPUT: &str = "?";

/// Inputs that end the session.
pub const QUIT_INPUTS: &[&str] = &["q", "quit"];

/// Options for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Output as JSON (one object per line).
    pub json: bool,
    /// Suppress per-round output.
    pub quiet: bool,
}

/// Final output of the run command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Whether the session ended cleanly.
    pub success: bool,
    /// Outcome totals.
    pub summary: SessionSummary,
    /// Closed rounds, oldest first.
    pub history: Vec<RoundRecord>,
    /// Error message if the session failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunOutput {
    /// Create a successful output.
    pub fn success(summary: SessionSummary, history: Vec<RoundRecord>) -> Self {
        Self {
            success: true,
            summary,
            history,
            error: None,
        }
    }

    /// Create a failed output, keeping what was recorded before the failure.
    pub fn failure(
        error: impl Into<String>,
        summary: SessionSummary,
        history: Vec<RoundRecord>,
    ) -> Self {
        Self {
            success: false,
            summary,
            history,
            error: Some(error.into()),
        }
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action<'a> {
    Guess(&'a str),
    GiveUp,
    Quit,
    Skip,
}

fn parse_action(line: &str) -> Action<'_> {
    let line = line.trim();
    if line.is_empty() {
        Action::Skip
    } else if line == GIVE_UP_INPUT {
        Action::GiveUp
    } else if QUIT_INPUTS.contains(&line) {
        Action::Quit
    } else {
        Action::Guess(line)
    }
}

fn emit<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{}", text).map_err(|e| DrillError::storage("<stdout>", e))
}

/// The run command implementation.
pub struct RunCommand<R = ChaCha8Rng> {
    session: ExamSession<R>,
}

impl<R: Rng> RunCommand<R> {
    /// Create a run command over a ready session.
    pub fn new(session: ExamSession<R>) -> Self {
        Self { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &ExamSession<R> {
        &self.session
    }

    /// Run until quit or end of input.
    pub fn run<I: BufRead, W: Write>(
        &mut self,
        input: I,
        out: &mut W,
        options: &RunOptions,
    ) -> RunOutput {
        match self.drive(input, out, options) {
            Ok(()) => RunOutput::success(self.session.summary(), self.session.history().to_vec()),
            Err(e) => RunOutput::failure(
                e.to_string(),
                self.session.summary(),
                self.session.history().to_vec(),
            ),
        }
    }

    fn drive<I: BufRead, W: Write>(
        &mut self,
        mut input: I,
        out: &mut W,
        options: &RunOptions,
    ) -> Result<()> {
        if !options.quiet {
            let view = self.session.view();
            emit(out, &self.format_view(&view, options))?;
        }

        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .map_err(|e| DrillError::storage("<stdin>", e))?;
            if read == 0 {
                break;
            }

            // Undecodable bytes become an ordinary unknown guess.
            let line = String::from_utf8_lossy(&buf);
            let result = match parse_action(&line) {
                Action::Skip => continue,
                Action::Quit => break,
                Action::GiveUp => self.session.give_up(),
                Action::Guess(id) => self.session.submit_guess(id),
            };

            if !options.quiet {
                emit(out, &self.format_result(&result, options))?;
            }
        }

        out.flush().map_err(|e| DrillError::storage("<stdout>", e))
    }

    /// Render one transition.
    pub fn format_result(&self, result: &GuessResult, options: &RunOptions) -> String {
        if options.json {
            return serde_json::to_string(result).unwrap_or_else(|_| "{}".to_string());
        }

        let verdict = match &result.verdict {
            Verdict::Correct {
                outcome,
                closed_target,
            } => format!("Correct: {} ({})", closed_target.display, outcome),
            Verdict::Incorrect {
                in_working_set: true,
            } => "Not quite.".to_string(),
            Verdict::Incorrect {
                in_working_set: false,
            } => "Not one of the choices.".to_string(),
        };

        format!("{}\n{}", verdict, self.format_view(&result.view, options))
    }

    /// Render the current view.
    pub fn format_view(&self, view: &ExamView, options: &RunOptions) -> String {
        if options.json {
            return serde_json::to_string(view).unwrap_or_else(|_| "{}".to_string());
        }

        let mut lines = Vec::new();

        let mut header = format!("Round {}  score {:.2}", view.round, view.display_score);
        if view.attempt_count > 0 {
            header.push_str(&format!("  misses {}", view.attempt_count));
        }
        lines.push(header);

        lines.push("Which one? (? to give up, q to quit)".to_string());

        let choices: Vec<String> = view
            .working_set
            .iter()
            .map(|item| {
                let mark = if view.reveal && item.answers(&view.target) {
                    "*"
                } else {
                    ""
                };
                format!("[{}{}] {}", item.id, mark, item.display)
            })
            .collect();
        lines.push(format!("  {}", choices.join("  ")));

        lines.join("\n")
    }

    /// Format the final output based on options.
    pub fn format_output(&self, output: &RunOutput, options: &RunOptions) -> String {
        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &RunOutput) -> String {
        let mut lines = Vec::new();

        if let Some(error) = &output.error {
            lines.push(format!("Session ended early: {}", error));
        }

        let summary = &output.summary;
        if summary.rounds == 0 {
            lines.push("No rounds completed.".to_string());
            return lines.join("\n") + "\n";
        }

        lines.push(format!(
            "Rounds: {}  pass {}  fail {}  hint {}",
            summary.rounds, summary.passes, summary.fails, summary.hints
        ));
        lines.push(format!("First-try rate: {:.0}%", summary.pass_rate() * 100.0));
        lines.push(format!(
            "Score: {:.2} across {} items",
            summary.score, summary.tracked_items
        ));

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExamConfig;
    use crate::core::{Catalog, Item, Outcome};
    use crate::selection::SetSampler;
    use crate::stats::ScoreTracker;
    use std::io::Cursor;

    fn command(seed: u64) -> RunCommand {
        let catalog = Catalog::new(
            ["a", "b", "c", "d", "e", "f", "g"]
                .iter()
                .map(|id| Item::new(*id, format!("{id}-slow")))
                .collect(),
        )
        .unwrap();
        let session = ExamSession::new(
            catalog,
            ExamConfig::default(),
            ScoreTracker::default(),
            SetSampler::seeded(seed),
        )
        .unwrap();
        RunCommand::new(session)
    }

    fn run_lines(cmd: &mut RunCommand, input: &str, options: &RunOptions) -> (RunOutput, String) {
        let mut out = Vec::new();
        let output = cmd.run(Cursor::new(input.to_string()), &mut out, options);
        (output, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("  a "), Action::Guess("a"));
        assert_eq!(parse_action("?"), Action::GiveUp);
        assert_eq!(parse_action("q"), Action::Quit);
        assert_eq!(parse_action("quit"), Action::Quit);
        assert_eq!(parse_action("   "), Action::Skip);
    }

    #[test]
    fn test_run_correct_guess() {
        let mut cmd = command(42);
        let target = cmd.session().round().target.id.clone();

        let (output, text) = run_lines(&mut cmd, &format!("{target}\nq\n"), &RunOptions::default());

        assert!(output.success);
        assert_eq!(output.summary.rounds, 1);
        assert_eq!(output.summary.passes, 1);
        assert_eq!(output.history[0].outcome, Outcome::Pass);
        assert!(text.contains("Correct:"));
        assert!(text.contains("Round 2"));
    }

    #[test]
    fn test_run_give_up() {
        let mut cmd = command(42);

        let (output, text) = run_lines(&mut cmd, "?\n", &RunOptions::default());

        assert!(output.success);
        assert_eq!(output.summary.hints, 1);
        assert!(text.contains("(hint)"));
    }

    #[test]
    fn test_run_stops_at_quit() {
        let mut cmd = command(42);

        let (output, _) = run_lines(&mut cmd, "q\n?\n?\n", &RunOptions::default());

        assert_eq!(output.summary.rounds, 0);
    }

    #[test]
    fn test_run_unknown_guess() {
        let mut cmd = command(42);

        let (output, text) = run_lines(&mut cmd, "zz\n\n", &RunOptions::default());

        assert!(output.success);
        assert_eq!(output.summary.rounds, 0);
        assert_eq!(cmd.session().round().attempt_count, 1);
        assert!(text.contains("Not one of the choices."));
        assert!(text.contains("misses 1"));
    }

    #[test]
    fn test_undecodable_line_is_unknown_guess() {
        let mut cmd = command(42);
        let target = cmd.session().round().target.id.clone();
        let mut input = b"\xff\xfe\n".to_vec();
        input.extend_from_slice(target.as_bytes());
        input.push(b'\n');

        let mut out = Vec::new();
        let output = cmd.run(Cursor::new(input), &mut out, &RunOptions::default());

        assert!(output.success);
        assert!(output.error.is_none());
        assert_eq!(output.summary.rounds, 1);
        assert_eq!(output.history[0].outcome, Outcome::Fail);
        assert_eq!(output.history[0].attempts, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Not one of the choices."));
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut cmd = command(42);
        let target = cmd.session().round().target.id.clone();

        let (output, _) = run_lines(&mut cmd, &format!("zz\r\n{target}"), &RunOptions::default());

        assert_eq!(output.summary.fails, 1);
    }

    #[test]
    fn test_text_view_hides_target() {
        let mut cmd = command(42);
        let answer = cmd.session().round().target.answer.clone();

        let (_, text) = run_lines(&mut cmd, "zz\n", &RunOptions::default());

        assert!(!text.contains(&answer));
        assert!(text.contains("Which one?"));
    }

    #[test]
    fn test_reveal_marks_correct_choice() {
        let mut cmd = command(42);
        let target = cmd.session().round().target.id.clone();

        let (_, text) = run_lines(&mut cmd, "zz\nzz\nzz\n", &RunOptions::default());

        assert!(text.contains(&format!("[{}*]", target)));
    }

    #[test]
    fn test_run_json_lines() {
        let mut cmd = command(42);
        let options = RunOptions {
            json: true,
            ..Default::default()
        };

        let (_, text) = run_lines(&mut cmd, "zz\n?\n", &options);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["round"], 1);
        let miss: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(miss["verdict"], "incorrect");
        assert_eq!(miss["view"]["attempt_count"], 1);
        let close: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(close["verdict"], "correct");
        assert_eq!(close["outcome"], "hint");
    }

    #[test]
    fn test_run_quiet() {
        let mut cmd = command(42);
        let options = RunOptions {
            quiet: true,
            ..Default::default()
        };

        let (output, text) = run_lines(&mut cmd, "?\n", &options);

        assert!(text.is_empty());
        assert_eq!(output.summary.rounds, 1);
    }

    #[test]
    fn test_format_output_summary() {
        let mut cmd = command(42);
        let (output, _) = run_lines(&mut cmd, "?\n", &RunOptions::default());

        let formatted = cmd.format_output(&output, &RunOptions::default());

        assert!(formatted.contains("Rounds: 1"));
        assert!(formatted.contains("hint 1"));
    }

    #[test]
    fn test_format_output_empty_session() {
        let cmd = command(42);
        let output = RunOutput::success(SessionSummary::default(), Vec::new());

        let formatted = cmd.format_output(&output, &RunOptions::default());

        assert!(formatted.contains("No rounds completed."));
    }

    #[test]
    fn test_format_output_json() {
        let cmd = command(42);
        let output = RunOutput::success(SessionSummary::default(), Vec::new());
        let options = RunOptions {
            json: true,
            ..Default::default()
        };

        let formatted = cmd.format_output(&output, &options);

        assert!(formatted.contains("\"success\": true"));
    }
}
