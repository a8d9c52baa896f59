use super::signature::{has_fresh_or_takeover, has_renewal};
use serde::{Deserialize, Serialize};

/// Loan lifecycle process a charge applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanProcess {
    FreshLoan,
    TakeoverLoan,
    Renewal,
    Release,
}

impl LoanProcess {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FreshLoan => "fresh-loan",
            Self::TakeoverLoan => "takeover-loan",
            Self::Renewal => "renewal",
            Self::Release => "release",
        }
    }
}

/// Short description written next to the process list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessLabel {
    Renewal,
    FreshTakeover,
}

impl ProcessLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Renewal => "RWL",
            Self::FreshTakeover => "FL TO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicableProcesses {
    pub processes: Vec<LoanProcess>,
    pub label: ProcessLabel,
}

impl ApplicableProcesses {
    fn new(lifecycle: Vec<LoanProcess>, label: ProcessLabel) -> Self {
        let mut processes = Vec::with_capacity(lifecycle.len() + 1);
        for process in lifecycle.into_iter().chain([LoanProcess::Release]) {
            if !processes.contains(&process) {
                processes.push(process);
            }
        }
        Self { processes, label }
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.processes.iter().map(|process| process.as_str()).collect()
    }

    /// Comma-joined tags for tabular cells (`fresh-loan,takeover-loan,release`).
    pub fn joined(&self) -> String {
        self.tags().join(",")
    }
}

/// Substrings checked in priority order; the first one present decides the result.
const PRIORITY_KEYWORDS: &[(&str, PriorityHit)] = &[
    ("fl to", PriorityHit::FreshTakeover),
    ("fresh", PriorityHit::FreshTakeover),
    ("takeover", PriorityHit::FreshTakeover),
    ("renewal", PriorityHit::Renewal),
];

#[derive(Debug, Clone, Copy)]
enum PriorityHit {
    FreshTakeover,
    Renewal,
}

pub fn resolve(identifier: &str) -> ApplicableProcesses {
    let lowered = identifier.to_lowercase();

    let hit = PRIORITY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, hit)| *hit);
    match hit {
        Some(PriorityHit::Renewal) => {
            return ApplicableProcesses::new(vec![LoanProcess::Renewal], ProcessLabel::Renewal)
        }
        Some(PriorityHit::FreshTakeover) => {
            return ApplicableProcesses::new(
                vec![LoanProcess::FreshLoan, LoanProcess::TakeoverLoan],
                ProcessLabel::FreshTakeover,
            )
        }
        None => {}
    }

    let chars: Vec<char> = lowered.chars().collect();
    let mut lifecycle = Vec::new();
    if has_fresh_or_takeover(&chars) {
        lifecycle.extend([LoanProcess::FreshLoan, LoanProcess::TakeoverLoan]);
    }
    if has_renewal(&chars) {
        lifecycle.push(LoanProcess::Renewal);
    }
    if lifecycle.is_empty() {
        lifecycle.push(LoanProcess::FreshLoan);
    }

    let label = if lifecycle == [LoanProcess::Renewal] {
        ProcessLabel::Renewal
    } else {
        ProcessLabel::FreshTakeover
    };
    ApplicableProcesses::new(lifecycle, label)
}
