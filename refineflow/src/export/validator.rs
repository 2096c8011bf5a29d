//! Structural lint for generated Jira breakdowns.
//!
//! The input is free-form LLM prose, so every check is a pattern heuristic
//! over a lowercased copy of the text. Checks are independent predicates
//! that each yield at most one warning; only the task counts and the
//! presence of week estimates decide the verdict.

use std::sync::OnceLock;

use regex::Regex;

const MAX_TASKS_PER_SIDE: usize = 7;
const MIN_WEEKS: f64 = 0.5;

const UNIT_TEST_KEYWORDS: &[&str] = &[
    "unit test",
    "teste unitário",
    "testes unitários",
    "unittest",
    "jest",
    "pytest",
    "tdd",
    "test-driven",
];

const E2E_KEYWORDS: &[&str] = &["e2e", "end-to-end", "teste e2e", "testes e2e", "test e2e"];

const DEPENDENCY_KEYWORDS: &[&str] = &[
    "dependência",
    "dependências",
    "dependency",
    "dependencies",
    "depends on",
    "depende de",
    "workflow",
    "fluxo",
    "→",
    "->",
    "=>",
    "after",
    "before",
    "após",
    "antes",
];

struct Patterns {
    backend_header: Regex,
    frontend_header: Regex,
    week_estimate: Regex,
    range_estimate: Regex,
    approximate_estimate: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            backend_header: header_pattern("backend")?,
            frontend_header: header_pattern("frontend")?,
            week_estimate: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:week|semana|wk)")?,
            range_estimate: Regex::new(
                r"\d+(?:[.,]\d+)?\s*(?:-|–|to|a)\s*\d+(?:[.,]\d+)?\s*(?:week|semana|wk)",
            )?,
            approximate_estimate: Regex::new(
                r"(?:\b(?:around|approximately|approx\.?|about|roughly|cerca de|aproximadamente|em torno de|mais ou menos)|~)\s*\d",
            )?,
        })
    }
}

fn patterns() -> Result<&'static Patterns, regex::Error> {
    static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(Clone::clone)
}

// A markdown header line naming the side, optionally numbered:
// `# Subtarefa Backend 2`, `# Backend1`, `# Frontend-3`, `# Backend #4`.
fn header_pattern(side: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?m)^[ \t]*#{{1,6}}[^\n]*?\b{side}(?:\s*[-#º]?\s*\d+)?\b"
    ))
}

/// What the heuristics found in one export.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureAnalysis {
    pub backend_tasks: usize,
    pub frontend_tasks: usize,
    pub week_estimates: Vec<f64>,
    pub mentions_unit_tests: bool,
    pub has_e2e_section: bool,
    pub has_vague_estimates: bool,
    pub mentions_dependencies: bool,
}

impl StructureAnalysis {
    pub fn has_tasks(&self) -> bool {
        self.backend_tasks > 0 || self.frontend_tasks > 0
    }

    pub fn min_weeks(&self) -> Option<f64> {
        self.week_estimates.iter().copied().reduce(f64::min)
    }

    pub fn is_valid(&self) -> bool {
        let counts_ok = |count: usize| count != 1 && count <= MAX_TASKS_PER_SIDE;
        self.has_tasks()
            && counts_ok(self.backend_tasks)
            && counts_ok(self.frontend_tasks)
            && !self.week_estimates.is_empty()
    }

    /// Warnings from every check, in a fixed order.
    pub fn warnings(&self) -> Vec<String> {
        [
            check_any_tasks(self),
            check_side_count("backend", self.backend_tasks),
            check_side_count("frontend", self.frontend_tasks),
            check_unit_tests(self),
            check_e2e_section(self),
            check_estimates_present(self),
            check_vague_estimates(self),
            check_minimum_granularity(self),
            check_dependencies(self),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn analyze_structure(text: &str) -> Result<StructureAnalysis, regex::Error> {
    let patterns = patterns()?;
    let lowered = text.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    let week_estimates = patterns
        .week_estimate
        .captures_iter(&lowered)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .collect();

    Ok(StructureAnalysis {
        backend_tasks: patterns.backend_header.find_iter(&lowered).count(),
        frontend_tasks: patterns.frontend_header.find_iter(&lowered).count(),
        week_estimates,
        mentions_unit_tests: contains_any(UNIT_TEST_KEYWORDS),
        has_e2e_section: contains_any(E2E_KEYWORDS),
        has_vague_estimates: patterns.range_estimate.is_match(&lowered)
            || patterns.approximate_estimate.is_match(&lowered),
        mentions_dependencies: contains_any(DEPENDENCY_KEYWORDS),
    })
}

/// Validate a generated Jira export, returning the verdict and its warnings.
///
/// Never fails: internal errors come back as a single
/// `"Validation error: ..."` warning with an invalid verdict.
pub fn validate_structure(text: Option<&str>) -> (bool, Vec<String>) {
    let text = match text {
        None => return (false, vec!["Jira export content is missing".to_string()]),
        Some(t) if t.trim().is_empty() => {
            return (false, vec!["Jira export content is empty".to_string()])
        }
        Some(t) => t,
    };

    match analyze_structure(text) {
        Ok(analysis) => (analysis.is_valid(), analysis.warnings()),
        Err(e) => (false, vec![format!("Validation error: {e}")]),
    }
}

fn check_any_tasks(a: &StructureAnalysis) -> Option<String> {
    (!a.has_tasks()).then(|| {
        "No backend or frontend subtasks found; expected 2-7 of each".to_string()
    })
}

// A side with no headers at all is only reported through `check_any_tasks`.
fn check_side_count(side: &str, count: usize) -> Option<String> {
    match count {
        1 => Some(format!(
            "Only 1 {side} subtask found; split {side} work into 2-7 subtasks (múltiplas subtarefas)"
        )),
        n if n > MAX_TASKS_PER_SIDE => Some(format!(
            "Found {n} {side} subtasks; expected 2-7"
        )),
        _ => None,
    }
}

fn check_unit_tests(a: &StructureAnalysis) -> Option<String> {
    (a.has_tasks() && !a.mentions_unit_tests).then(|| {
        "No unit test mentions in implementation subtasks (unit tests, TDD, Jest, pytest)"
            .to_string()
    })
}

fn check_e2e_section(a: &StructureAnalysis) -> Option<String> {
    (!a.has_e2e_section)
        .then(|| "No dedicated E2E/end-to-end test section found".to_string())
}

fn check_estimates_present(a: &StructureAnalysis) -> Option<String> {
    (a.has_tasks() && a.week_estimates.is_empty()).then(|| {
        "No estimates in weeks found for the subtasks (e.g. 'M / 2 weeks')".to_string()
    })
}

fn check_vague_estimates(a: &StructureAnalysis) -> Option<String> {
    a.has_vague_estimates.then(|| {
        "Vague week estimates found (ranges or approximations); use exact values like '2 weeks'"
            .to_string()
    })
}

fn check_minimum_granularity(a: &StructureAnalysis) -> Option<String> {
    let min = a.min_weeks()?;
    (min < MIN_WEEKS).then(|| {
        format!("Estimate of {min} weeks is below the 0.5 week minimum")
    })
}

fn check_dependencies(a: &StructureAnalysis) -> Option<String> {
    let several = a.backend_tasks > 1 || a.frontend_tasks > 1;
    (several && !a.mentions_dependencies).then(|| {
        "No dependency or workflow information between subtasks".to_string()
    })
}
