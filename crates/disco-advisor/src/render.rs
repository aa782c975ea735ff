//! Display-safe HTML for the result screen.
//!
//! Every string that came from the model is escaped before it is placed in
//! markup; the failure view never shows raw diagnostics.

use disco_core::Verdict;

use crate::error::AdviceError;

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The two result panels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedVerdict {
    /// Score and advice text.
    pub summary_html: String,
    /// Pros and cons columns.
    pub pros_cons_html: String,
}

pub fn render_verdict(verdict: &Verdict) -> RenderedVerdict {
    let summary_html = format!(
        r#"<div class="score">{}</div><div class="advice-text">{}</div>"#,
        escape_html(&verdict.score),
        escape_html(&verdict.advice)
    );
    let pros_cons_html = format!(
        r#"<div class="pros-cons"><div class="column pro"><h3>Pros</h3><ul>{}</ul></div><div class="column con"><h3>Cons/Risks</h3><ul>{}</ul></div></div>"#,
        list_items(&verdict.pros),
        list_items(&verdict.cons)
    );
    RenderedVerdict {
        summary_html,
        pros_cons_html,
    }
}

/// Error panel. Shows only the user-facing message.
pub fn render_failure(err: &AdviceError) -> String {
    format!(
        r#"<div class="score">Error</div><div class="advice-text">{}</div>"#,
        escape_html(err.user_message())
    )
}

/// Placeholder shown while a request is in flight.
pub fn render_loading() -> String {
    r#"<div class="loader"></div><p style="text-align:center">Consulting the oracle...</p>"#
        .to_string()
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
