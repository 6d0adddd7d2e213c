use regex::Regex;
use std::sync::LazyLock;

static MATH_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"algebra|equation|solve|quadratic").expect("valid regex"));
static ENGLISH_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"essay|thesis|intro|paragraph").expect("valid regex"));
static PHYSICS_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"force|newton|velocity|acceleration").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Track {
    Mathematics,
    English,
    Physics,
    General,
}

/// A subject filter wins over keywords; keywords are checked in
/// maths, English, physics order.
fn track_for(subject: Option<&str>, question: &str) -> Track {
    let lower = question.to_lowercase();
    if subject == Some("Mathematics") || MATH_KEYWORDS.is_match(&lower) {
        Track::Mathematics
    } else if subject == Some("English") || ENGLISH_KEYWORDS.is_match(&lower) {
        Track::English
    } else if subject == Some("Physics") || PHYSICS_KEYWORDS.is_match(&lower) {
        Track::Physics
    } else {
        Track::General
    }
}

pub fn greeting(subject: Option<&str>) -> &'static str {
    match subject {
        Some("Mathematics") => {
            "Hi! Stuck on algebra or calculus? Share a problem and I'll walk through the steps."
        }
        Some("English") => {
            "Need help with thesis statements or structure? Paste a prompt and I'll suggest an outline."
        }
        _ => "Ask me any study question. I'll explain step by step.",
    }
}

/// Canned study help for a question
pub fn answer(subject: Option<&str>, question: &str) -> String {
    let lines: &[&str] = match track_for(subject, question) {
        Track::Mathematics => &[
            "Let's solve it together. General steps:",
            "1) Isolate like terms.",
            "2) If quadratic ax²+bx+c=0, try factoring or quadratic formula.",
            "3) Substitute back to check.",
            "Paste your exact problem and I'll show each step.",
        ],
        Track::English => &[
            "Here's a quick structure you can use:",
            "• Hook (1–2 sentences)",
            "• Context (2–3 sentences)",
            "• Clear thesis with stance",
            "Send me your prompt; I'll draft a thesis and topic sentences.",
        ],
        Track::Physics => &[
            "Tip: Start from known laws (e.g., F = m·a).",
            "• Draw a free-body diagram",
            "• Write equations along each axis",
            "• Solve, then check units",
            "Share the numbers; I'll compute it with you.",
        ],
        Track::General => &[
            "Got it! Tell me the exact question (and any numbers); I'll break it down step by step.",
        ],
    };
    lines.join("\n")
}
