/// Plain-text panels for analysis results, trace steps and refinements.
///
/// Every function here is pure: it takes parsed results or view state and
/// returns a `String`. Printing is the caller's business.
use std::fmt::Write;

use crate::review::{AnalysisResult, Bug, Improvement, TraceStep};
use crate::session::{RefineState, Session, TraceStepper};

const RULE: &str = "────────────────────────────────────────";

pub const NO_BUGS: &str = "לא נמצאו שגיאות קריטיות. כל הכבוד!";
pub const NO_IMPROVEMENTS: &str = "לא נמצאו הצעות לשיפור מיוחדות.";
pub const NO_VARIABLES: &str = "אין משתנים פעילים בצעד זה";
pub const ERROR_TITLE: &str = "אופס, משהו השתבש";

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}\n{RULE}");
}

/// Indent every line of `code` so it reads as a block.
fn code_block(out: &mut String, code: &str) {
    for line in code.lines() {
        let _ = writeln!(out, "    {line}");
    }
}

/// One bug entry. The line prefix is shown only for a positive line number.
#[must_use]
pub fn render_bug(bug: &Bug) -> String {
    match bug.line {
        Some(line) if line > 0 => format!(
            "[{}] שורה {line}: {}",
            bug.severity.label(),
            bug.description
        ),
        _ => format!("[{}] {}", bug.severity.label(), bug.description),
    }
}

#[must_use]
pub fn render_improvement(item: &Improvement) -> String {
    format!("- {}\n  קטגוריה: {}", item.description, item.category.as_str())
}

/// The full review: summary, complexity, bugs, improvements and the
/// corrected code.
#[must_use]
pub fn render_analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();

    heading(&mut out, &format!("סיכום כללי ({})", result.language));
    let _ = writeln!(out, "{}", result.summary);

    heading(&mut out, "סיבוכיות");
    let _ = writeln!(out, "סיבוכיות זמן: {}", result.time_complexity);
    let _ = writeln!(out, "סיבוכיות מקום: {}", result.space_complexity);

    heading(&mut out, "שגיאות ובעיות שאותרו");
    if result.bugs.is_empty() {
        let _ = writeln!(out, "{NO_BUGS}");
    } else {
        for bug in &result.bugs {
            let _ = writeln!(out, "{}", render_bug(bug));
        }
    }

    heading(&mut out, "הצעות לשיפור");
    if result.improvements.is_empty() {
        let _ = writeln!(out, "{NO_IMPROVEMENTS}");
    } else {
        for item in &result.improvements {
            let _ = writeln!(out, "{}", render_improvement(item));
        }
    }

    heading(&mut out, "קוד מתוקן");
    code_block(&mut out, &result.corrected_code);

    out
}

fn render_variables(out: &mut String, step: &TraceStep) {
    if step.variables.is_empty() {
        let _ = writeln!(out, "{NO_VARIABLES}");
        return;
    }
    let width = step
        .variables
        .iter()
        .map(|v| v.name.chars().count())
        .max()
        .unwrap_or(0);
    for var in &step.variables {
        let _ = writeln!(out, "  {:<width$} = {}", var.name, var.value);
    }
}

/// The active step of a trace, with the final output on the last step.
#[must_use]
pub fn render_trace_step(stepper: &TraceStepper) -> String {
    let mut out = String::new();
    let trace = stepper.trace();
    let step = stepper.current_step();

    let _ = writeln!(
        out,
        "צעד {} מתוך {}",
        stepper.current_index() + 1,
        stepper.len()
    );
    let _ = writeln!(out, "קלט לדוגמה: {}", trace.input_description);

    heading(&mut out, "שורת קוד נוכחית");
    code_block(&mut out, &step.line_content);

    heading(&mut out, "משתנים בזיכרון");
    render_variables(&mut out, step);

    heading(&mut out, "מה קורה כאן?");
    let _ = writeln!(out, "{}", step.explanation);

    if let Some(output) = stepper.visible_final_output() {
        heading(&mut out, "פלט סופי");
        let _ = writeln!(out, "{output}");
    }

    let _ = writeln!(out, "\n{}", render_controls(stepper));
    out
}

/// The navigation line. A disabled control is shown in parentheses.
#[must_use]
pub fn render_controls(stepper: &TraceStepper) -> String {
    let prev = if stepper.is_first() {
        "(הקודם)"
    } else {
        "[p] הקודם"
    };
    let next = if stepper.is_last() {
        "(סיום)"
    } else {
        "[n] הבא"
    };
    format!("{prev}   {next}   [reset] התחלה   [close] סגירה")
}

/// Every step in order, for non-interactive output.
#[must_use]
pub fn render_full_trace(stepper: &TraceStepper) -> String {
    let mut walker = stepper.clone();
    walker.reset();
    let mut out = render_trace_step(&walker);
    while walker.next() {
        let _ = writeln!(out, "\n{RULE}{RULE}");
        out.push_str(&render_trace_step(&walker));
    }
    out
}

/// The refined code and its latest explanation. Failures are not shown.
#[must_use]
pub fn render_refine(state: &RefineState) -> String {
    let mut out = String::new();
    let Some(code) = state.current_code() else {
        return out;
    };
    heading(&mut out, "קוד מתוקן");
    code_block(&mut out, code);
    if let Some(explanation) = state.explanation() {
        let _ = writeln!(out, "\n{explanation}");
        let _ = writeln!(out, "מומלץ לעבור על השינויים");
    }
    out
}

#[must_use]
pub fn render_error(message: &str) -> String {
    format!("{ERROR_TITLE}\n{message}\n")
}

/// Everything the session currently shows, in display order.
#[must_use]
pub fn render_session(session: &Session) -> String {
    let mut out = String::new();
    if let Some(message) = session.error_message() {
        out.push_str(&render_error(message));
    }
    if let Some(result) = session.analysis().data() {
        out.push_str(&render_analysis(result));
    }
    if let Some(stepper) = session.trace().data() {
        out.push_str(&render_trace_step(stepper));
    }
    out
}
