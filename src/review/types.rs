/// Value records exchanged with the model.
///
/// Field names on the wire are camelCase; every struct here is the exact
/// shape the declared response schemas in [`super::schema`] describe.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Enumerations ─────────────────────────────────────────────────────

/// Defect severity. Ordered so that `Critical > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    /// Name used in the JSON contract.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Hebrew badge shown next to a bug.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "קריטי",
            Severity::Warning => "אזהרה",
            Severity::Info => "מידע",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Performance,
    Readability,
    Security,
    BestPractice,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Performance,
        Category::Readability,
        Category::Security,
        Category::BestPractice,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Performance => "performance",
            Category::Readability => "readability",
            Category::Security => "security",
            Category::BestPractice => "best-practice",
        }
    }
}

// ── Review ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bug {
    /// 1-based line number, when the model could attribute one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Improvement {
    pub description: String,
    pub category: Category,
}

/// Structured code review produced by one `analyze` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub language: String,
    pub bugs: Vec<Bug>,
    pub improvements: Vec<Improvement>,
    pub time_complexity: String,
    pub space_complexity: String,
    pub corrected_code: String,
}

impl AnalysisResult {
    /// Highest severity among the reported bugs, if any.
    #[must_use]
    pub fn worst_severity(&self) -> Option<Severity> {
        self.bugs.iter().map(|b| b.severity).max()
    }
}

// ── Execution trace ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariableState {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    /// Informational only; navigation uses the position in `steps`.
    pub step: i64,
    pub line_content: String,
    pub variables: Vec<VariableState>,
    pub explanation: String,
}

/// Simulated execution of the user's code on one sample input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTrace {
    pub input_description: String,
    pub steps: Vec<TraceStep>,
    pub final_output: String,
}

// ── Refinement ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub new_code: String,
    pub explanation: String,
}

// ── Tests ────────────────────────────────────────────────────────────
