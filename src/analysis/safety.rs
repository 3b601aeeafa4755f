//! Prompt safety filter: externally-sourced text is sanitized before it is
//! interpolated into a model prompt, and adversarial-looking content is
//! flagged so the model call can be skipped entirely.

use std::sync::OnceLock;

use regex::Regex;

/// Injection-style substrings stripped by `sanitize` and counted by
/// `is_suspicious`. Matched case-insensitively.
pub const INJECTION_PATTERNS: &[&str] = &[
    "ignore previous instructions",
    "ignore all instructions",
    "disregard previous instructions",
    "system:",
    "assistant:",
    "###",
    "<|",
    "|>",
    "you are now",
    "pretend you are",
    "act as if",
    "new instructions",
    "forget everything",
    "do anything now",
    "jailbreak",
    "prompt injection",
];

/// Ceiling on text forwarded to the model.
pub const MAX_PROMPT_LENGTH: usize = 1_000;

/// Two or more distinct patterns strongly suggest an injection attempt; a
/// single incidental match is common in legitimate advisory text.
const SUSPICION_THRESHOLD: usize = 2;

fn pattern_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        INJECTION_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", regex::escape(p))).expect("static pattern"))
            .collect()
    })
}

fn newline_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

/// Strip every configured injection substring, collapse runs of 3+ newlines
/// to 2, remove non-printable control characters except newline/tab, cap at
/// 1,000 characters, and trim surrounding whitespace.
pub fn sanitize(text: &str) -> String {
    // Strip to a fixpoint: removing one pattern can splice surrounding text
    // into another ("sys###tem:" loses "###" and becomes "system:")
    let mut cleaned = text.to_string();
    loop {
        let mut changed = false;
        for re in pattern_regexes() {
            let stripped = re.replace_all(&cleaned, "");
            if stripped != cleaned {
                cleaned = stripped.into_owned();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    cleaned = cleaned
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    cleaned = newline_runs().replace_all(&cleaned, "\n\n").into_owned();

    if cleaned.chars().count() > MAX_PROMPT_LENGTH {
        cleaned = cleaned.chars().take(MAX_PROMPT_LENGTH).collect();
    }

    cleaned.trim().to_string()
}

/// Count distinct injection patterns present in the raw text (nothing is
/// removed). True once the count reaches 2.
pub fn is_suspicious(text: &str) -> bool {
    let lower = text.to_lowercase();
    let count = INJECTION_PATTERNS.iter().filter(|p| lower.contains(*p)).count();
    count >= SUSPICION_THRESHOLD
}
