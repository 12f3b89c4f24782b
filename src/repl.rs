/// Interactive session over stdin.
///
/// Each line is one [`Command`]; commands map onto [`Workbench`] actions and
/// the resulting panels are printed to stdout.
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::model::RequestKind;
use crate::render;
use crate::session::{Rejected, Workbench};

pub const PASTE_TERMINATOR: &str = ".end";

pub const HELP: &str = "\
commands:
  load <path>         load a source file into the buffer
  paste               type or paste code, finish with a line '.end'
  code                show the buffer
  show                reprint the current results
  analyze             review the code
  trace               simulate execution step by step
  next | n            next step
  prev | p            previous step
  reset               back to the first step
  close               close the trace
  refine <request>    ask for a change to the corrected code
  refined             show the current corrected code
  clear               reset code and results
  help                this text
  quit                leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Paste,
    Code,
    Show,
    Analyze,
    Trace,
    Next,
    Prev,
    Reset,
    Close,
    Refine(String),
    Refined,
    Clear,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

impl Command {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let cmd = match word.to_ascii_lowercase().as_str() {
            "load" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("load"));
                }
                Command::Load(PathBuf::from(rest))
            }
            "paste" => Command::Paste,
            "code" => Command::Code,
            "show" => Command::Show,
            "analyze" => Command::Analyze,
            "trace" => Command::Trace,
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "reset" => Command::Reset,
            "close" => Command::Close,
            // An empty instruction is rejected by the refine loop itself
            "refine" => Command::Refine(rest.to_string()),
            "refined" => Command::Refined,
            "clear" => Command::Clear,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(cmd))
    }
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

fn spinner(kind: RequestKind) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(match kind {
        RequestKind::Analyze => "מנתח קוד...",
        RequestKind::Trace => "מריץ סימולציה...",
        RequestKind::Refine => "מעדכן קוד...",
    });
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run `action` with a spinner on stderr.
async fn with_spinner<F>(kind: RequestKind, action: F) -> Result<(), Rejected>
where
    F: std::future::Future<Output = Result<(), Rejected>>,
{
    let pb = spinner(kind);
    let result = action.await;
    pb.finish_and_clear();
    result
}

fn rejected(reason: &Rejected) -> String {
    format!("cannot do that now: {reason}")
}

/// Apply one command and return the text to print.
pub async fn execute(workbench: &Workbench, cmd: Command) -> Flow {
    let text = match cmd {
        Command::Quit => return Flow::Quit,
        Command::Help => HELP.to_string(),
        Command::Paste => "use 'paste' from the interactive prompt".to_string(),
        Command::Load(path) => {
            let mut session = workbench.session().await;
            match session.editor.load_file(&path) {
                Ok(()) => format!(
                    "loaded {} ({} lines)",
                    path.display(),
                    session.editor.text().lines().count()
                ),
                Err(e) => e.to_string(),
            }
        }
        Command::Code => {
            let session = workbench.session().await;
            if session.editor.is_blank() {
                "(empty)".to_string()
            } else {
                session.editor.text().to_string()
            }
        }
        Command::Show => {
            let text = render::render_session(&*workbench.session().await);
            if text.is_empty() {
                "nothing to show yet".to_string()
            } else {
                text
            }
        }
        Command::Analyze => match with_spinner(RequestKind::Analyze, workbench.analyze()).await {
            Ok(()) => {
                let session = workbench.session().await;
                match (session.analysis().data(), session.analysis().error()) {
                    (Some(result), _) => render::render_analysis(result),
                    (None, Some(message)) => render::render_error(message),
                    (None, None) => String::new(),
                }
            }
            Err(reason) => rejected(&reason),
        },
        Command::Trace => match with_spinner(RequestKind::Trace, workbench.trace()).await {
            Ok(()) => {
                let session = workbench.session().await;
                match (session.trace().data(), session.trace().error()) {
                    (Some(stepper), _) => render::render_trace_step(stepper),
                    (None, Some(message)) => render::render_error(message),
                    (None, None) => String::new(),
                }
            }
            Err(reason) => rejected(&reason),
        },
        Command::Next | Command::Prev | Command::Reset => {
            let mut session = workbench.session().await;
            match session.stepper_mut() {
                Ok(stepper) => {
                    match cmd {
                        Command::Next => {
                            stepper.next();
                        }
                        Command::Prev => {
                            stepper.previous();
                        }
                        _ => stepper.reset(),
                    }
                    render::render_trace_step(stepper)
                }
                Err(reason) => rejected(&reason),
            }
        }
        Command::Close => match workbench.session().await.close_trace() {
            Ok(()) => "trace closed".to_string(),
            Err(reason) => rejected(&reason),
        },
        Command::Refine(instruction) => {
            match with_spinner(RequestKind::Refine, workbench.refine(&instruction)).await {
                Ok(()) => {
                    let session = workbench.session().await;
                    if session.refine().last_error().is_some() {
                        // Failure already logged; the previous code stands
                        String::new()
                    } else {
                        render::render_refine(session.refine())
                    }
                }
                Err(reason) => rejected(&reason),
            }
        }
        Command::Refined => {
            let session = workbench.session().await;
            match session.refine().current_code() {
                Some(_) => render::render_refine(session.refine()),
                None => rejected(&Rejected::NothingToRefine),
            }
        }
        Command::Clear => match workbench.session().await.clear() {
            Ok(()) => "cleared".to_string(),
            Err(reason) => rejected(&reason),
        },
    };
    Flow::Continue(text)
}

fn prompt() {
    print!("codementor> ");
    let _ = std::io::stdout().flush();
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(workbench: &Workbench) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("type 'help' for commands");
    prompt();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Paste)) => {
                let mut code = String::new();
                while let Some(line) = lines.next_line().await? {
                    if line.trim_end() == PASTE_TERMINATOR {
                        break;
                    }
                    code.push_str(&line);
                    code.push('\n');
                }
                let count = code.lines().count();
                workbench.session().await.editor.set_text(code);
                println!("buffer set ({count} lines)");
            }
            Ok(Some(cmd)) => match execute(workbench, cmd).await {
                Flow::Continue(text) => {
                    if !text.is_empty() {
                        println!("{text}");
                    }
                }
                Flow::Quit => break,
            },
            Err(e) => println!("{e}"),
        }
        prompt();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::GenerationConfig;
    use crate::model::mock::MockProvider;
    use crate::review::ReviewService;

    fn workbench(mock: Arc<MockProvider>) -> Workbench {
        Workbench::new(ReviewService::new(mock, GenerationConfig::default()))
    }

    fn text(flow: Flow) -> String {
        match flow {
            Flow::Continue(text) => text,
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(Command::parse("n"), Ok(Some(Command::Next)));
        assert_eq!(Command::parse("show"), Ok(Some(Command::Show)));
        assert_eq!(Command::parse("PREV"), Ok(Some(Command::Prev)));
        assert_eq!(
            Command::parse("load src/main.py"),
            Ok(Some(Command::Load(PathBuf::from("src/main.py"))))
        );
        assert_eq!(
            Command::parse("refine   add comments please "),
            Ok(Some(Command::Refine("add comments please".into())))
        );
        assert_eq!(Command::parse("refine"), Ok(Some(Command::Refine(String::new()))));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("load"), Err(CommandError::MissingArgument("load")));
        assert_eq!(
            Command::parse("compile"),
            Err(CommandError::Unknown("compile".into()))
        );
    }

    #[tokio::test]
    async fn test_trace_then_navigate() {
        let mock = Arc::new(MockProvider::new());
        mock.push_text(
            r#"{"inputDescription": "n = 2", "finalOutput": "3", "steps": [
                {"step": 1, "lineContent": "a = 1", "variables": [], "explanation": "א"},
                {"step": 2, "lineContent": "b = 2", "variables": [{"name": "b", "value": "2"}], "explanation": "ב"}
            ]}"#,
        );
        let wb = workbench(mock);
        wb.session().await.editor.set_text("a = 1\nb = 2");

        let first = text(execute(&wb, Command::Trace).await);
        assert!(first.contains("צעד 1 מתוך 2"));

        let second = text(execute(&wb, Command::Next).await);
        assert!(second.contains("פלט סופי"));
        let again = text(execute(&wb, Command::Next).await);
        assert!(again.contains("צעד 2 מתוך 2"));

        assert!(text(execute(&wb, Command::Close).await).contains("closed"));
        assert!(text(execute(&wb, Command::Next).await).contains("no trace"));
    }

    #[tokio::test]
    async fn test_analyze_failure_prints_error_panel() {
        let mock = Arc::new(MockProvider::new());
        mock.push_text("not json");
        let wb = workbench(mock);
        wb.session().await.editor.set_text("x = 1");

        let out = text(execute(&wb, Command::Analyze).await);
        assert!(out.contains(render::ERROR_TITLE));
        assert!(out.contains(RequestKind::Analyze.failure_message()));
        assert!(!out.contains("not json"));
    }

    #[tokio::test]
    async fn test_show_reprints_error_and_trace() {
        let mock = Arc::new(MockProvider::new());
        mock.push_text("{}");
        mock.push_text(
            r#"{"inputDescription": "-", "finalOutput": "1", "steps": [
                {"step": 1, "lineContent": "x = 1", "variables": [], "explanation": "א"}
            ]}"#,
        );
        let wb = workbench(mock);
        assert_eq!(text(execute(&wb, Command::Show).await), "nothing to show yet");

        wb.session().await.editor.set_text("x = 1");
        execute(&wb, Command::Analyze).await;
        execute(&wb, Command::Trace).await;

        let out = text(execute(&wb, Command::Show).await);
        assert!(out.starts_with(render::ERROR_TITLE));
        assert!(out.contains("צעד 1 מתוך 1"));
    }

    #[tokio::test]
    async fn test_empty_buffer_is_rejected_without_a_call() {
        let mock = Arc::new(MockProvider::new());
        let wb = workbench(mock.clone());
        let out = text(execute(&wb, Command::Analyze).await);
        assert!(out.contains("no code"));
        assert_eq!(mock.calls(), 0);
        assert_eq!(execute(&wb, Command::Quit).await, Flow::Quit);
    }
}
