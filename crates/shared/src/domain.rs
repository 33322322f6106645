use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Picker entry shown before the user chooses a real question.
pub const QUESTION_PLACEHOLDER: &str = "Choose a question...";

pub const DEFAULT_SCORE: &str = "0";
pub const DEFAULT_TEXT: &str = "-";

pub const QUESTION_CATALOG: [&str; 11] = [
    "apa nilai nilai (values) yang penting dalam hidupmu? Jelaskan!",
    "Apa tiga kelebihan teratasmu/terkuatmu? Jelaskan!",
    "Apa tiga kelemahan/kekurangan teratasmu dan bagaimana kamu mengatasinya? Jelaskan!",
    "Apa yang menjadi passion-mu? Aktivitas apa yang kamu lakukan yang berkaitan dengan passion tersebut?",
    "Topik seperti apa yang kamu sukai untuk didiskusikan dengan orang lain?",
    "Proyek komunitas atau kegiatan sosial apa yang pernah kamu ikuti sebelumnya? Ceritakan!",
    "Bagaimana caramu menghadapi orang-orang yang memiliki keyakinan, pendapat, atau prinsip yang berbeda darimu?",
    "Apa yang akan kamu lakukan jika local project ini tidak memenuhi harapanmu?",
    "Jika kamu menjadi presiden sebuah LSM (NGO) di Indonesia dan bebas memilih isu sosial yang ingin ditangani, isu apa yang akan kamu fokuskan? (lihat dari isu sosial terkini di Indonesia)",
    "Kriteria seperti apa yang kamu inginkan dari rekan kerjamu? jelaskan alasannya!",
    "Bagaimana reaksimu jika ada kesalahan yang terjadi di dalam projectmu (konteks kamu menjadi presiden LSM dan kamu melaksanakan project sosial terkait isu sosial terkini di indonesia) dan kesalahan itu berasal dari rekan kerjamu? apa langkah yang akan kamu lakukan untuk mengatasi masalah tersebut?",
];

/// Returns true only for exact catalog entries; the placeholder is never a question.
pub fn is_catalog_question(question: &str) -> bool {
    QUESTION_CATALOG.contains(&question)
}

/// 1-based lookup, matching the numbering shown to users.
pub fn question_by_number(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|index| QUESTION_CATALOG.get(index))
        .copied()
}

/// Request body sent to the evaluation backend. Missing fields decode as empty strings and
/// are then rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub question: String,
    pub answer: String,
}

impl Submission {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Backend verdict as received. Each field keeps whatever JSON value arrived; a missing key
/// or `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub reason: Option<Value>,
    #[serde(default)]
    pub improvement: Option<Value>,
}

impl EvaluationResult {
    pub fn panels(&self) -> ResultPanels {
        ResultPanels::from(self)
    }
}

/// Any JSON document is accepted. Objects contribute their `score`, `reason` and
/// `improvement` keys; every other shape carries no fields and renders the defaults.
impl From<Value> for EvaluationResult {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        let mut take = |key: &str| fields.remove(key).filter(|field| !field.is_null());
        Self {
            score: take("score"),
            reason: take("reason"),
            improvement: take("improvement"),
        }
    }
}

/// Strings are shown without quotes, everything else as compact JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Display strings for the three result panels with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPanels {
    pub score: String,
    pub reason: String,
    pub improvement: String,
}

impl From<&EvaluationResult> for ResultPanels {
    fn from(result: &EvaluationResult) -> Self {
        let show = |field: &Option<Value>, default: &str| {
            field
                .as_ref()
                .map(display_value)
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            score: show(&result.score, DEFAULT_SCORE),
            reason: show(&result.reason, DEFAULT_TEXT),
            improvement: show(&result.improvement, DEFAULT_TEXT),
        }
    }
}
