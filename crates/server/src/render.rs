//! Server-side HTML for the assessor page.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use shared::{
    domain::{ResultPanels, QUESTION_CATALOG, QUESTION_PLACEHOLDER},
    notice::{Banner, BannerLevel},
};

const PAGE_TITLE: &str = "AI Interview Assessor";

/// Seconds between reloads of `/` while the session has a submission in flight.
pub const BUSY_REFRESH_SECS: u32 = 5;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0 auto; max-width: 1200px; padding: 1rem 2rem; }
.input-row { display: grid; grid-template-columns: 1fr 2fr; gap: 1.5rem; }
select, textarea { width: 100%; font-size: 16px; }
textarea { height: 200px; }
button { width: 100%; padding: .75rem; font-size: 1rem; margin-top: 1rem; }
.hint { color: #666; font-size: .9rem; }
.progress { font-weight: bold; }
.banner { padding: .75rem 1rem; border-radius: .4rem; margin: 1rem 0; }
.banner.warning { background: #fff8e1; border: 1px solid #f5c518; }
.banner.error { background: #fdecea; border: 1px solid #e57373; }
.results { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; }
.score-card { font-size: 80px; font-weight: bold; text-align: center; color: #4CAF50; }
.reason { background: #e8f0fe; padding: 1rem; border-radius: .4rem; white-space: pre-wrap; }
.improvement { background: #e6f4ea; padding: 1rem; border-radius: .4rem; white-space: pre-wrap; }
pre { white-space: pre-wrap; }
"#;

// Locks the form as soon as it is sent; the server answers only when the cycle is over.
const SUBMIT_SCRIPT: &str = r#"
document.getElementById("assess-form").addEventListener("submit", function () {
  this.querySelector("button[type=submit]").disabled = true;
  document.getElementById("progress").hidden = false;
});
"#;

/// Everything one page render needs.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub selected_question: &'a str,
    pub answer: &'a str,
    pub busy: bool,
    pub banner: Option<&'a Banner>,
    pub panels: Option<&'a ResultPanels>,
    pub backend_caption: Option<&'a str>,
}

pub fn render_page(view: &PageView<'_>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                @if view.busy {
                    meta http-equiv="refresh" content=(format!("{BUSY_REFRESH_SECS};url=/"));
                }
                title { (PAGE_TITLE) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "🤖 " (PAGE_TITLE) }
                @if let Some(caption) = view.backend_caption {
                    p.hint { "Backend: " (caption) }
                }
                hr;
                (render_form(view))
                @if let Some(banner) = view.banner {
                    (render_banner(banner))
                }
                @if let Some(panels) = view.panels {
                    (render_results(panels))
                }
                hr;
                script { (PreEscaped(SUBMIT_SCRIPT)) }
            }
        }
    }
}

fn render_form(view: &PageView<'_>) -> Markup {
    html! {
        h2 { "1. Interview input" }
        form id="assess-form" method="post" action="/submit" {
            div.input-row {
                label {
                    "Question:"
                    select name="question" {
                        @for entry in std::iter::once(QUESTION_PLACEHOLDER).chain(QUESTION_CATALOG) {
                            option value=(entry) selected[entry == view.selected_question] { (entry) }
                        }
                    }
                }
                label {
                    "Candidate answer:"
                    textarea name="answer" placeholder="Answer..." { (view.answer) }
                }
            }
            button type="submit" disabled[view.busy] { "🔍 Evaluate answer" }
            p.hint { "Analysis may take 30-60 seconds." }
            p id="progress" class="hint progress" hidden[!view.busy] {
                "Analysing the answer... this page refreshes when the result is ready."
            }
        }
    }
}

fn render_banner(banner: &Banner) -> Markup {
    let level = match banner.level {
        BannerLevel::Warning => "warning",
        BannerLevel::Error => "error",
    };
    html! {
        div class=(format!("banner {level}")) role="alert" {
            strong { (banner.headline) }
            @if let Some(hint) = &banner.hint {
                p { (hint) }
            }
            @if let Some(detail) = &banner.detail {
                details {
                    summary { (detail.summary) }
                    pre { (detail.body) }
                }
            }
        }
    }
}

fn render_results(panels: &ResultPanels) -> Markup {
    html! {
        hr;
        h2 { "2. Assessment result" }
        div.results {
            section {
                h3 { "Score" }
                div.score-card { (panels.score) }
            }
            section {
                h3 { "Reasoning" }
                div.reason { (panels.reason) }
            }
            section {
                h3 { "Improvement" }
                div.improvement { (panels.improvement) }
            }
        }
    }
}
