//! HTML results dashboard.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use knowcheck_core::report::QuizReport;
use knowcheck_core::scoring::CategoryScore;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML dashboard from a quiz report.
pub fn generate_html(report: &QuizReport) -> String {
    let results = &report.results;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Knowledge check results - {}</title>\n",
        html_escape(&report.bank.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.bank.name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | {}</p>\n",
        report.bank.question_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score headline
    let (verdict_class, verdict) = if report.passed {
        ("pass", "Passed")
    } else {
        ("fail", "Needs review")
    };
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"score\">{}/{} correct <strong>({}%)</strong></p>\n",
        results.correct, results.total, results.percentage
    ));
    html.push_str(&format!(
        "<p class=\"verdict {verdict_class}\">{verdict} (pass mark {}%)</p>\n",
        report.pass_threshold
    ));
    if results.unanswered > 0 {
        html.push_str(&format!(
            "<p class=\"meta\">{} question(s) unanswered, scored as incorrect</p>\n",
            results.unanswered
        ));
    }

    html.push_str("<h2>By category</h2>\n");
    if !results.categories.is_empty() {
        html.push_str(&generate_bar_chart(&results.categories));
    }
    html.push_str("</section>\n");

    // Per-question outcomes
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str("<thead><tr><th>#</th><th>Category</th><th>Prompt</th><th>Chosen</th><th>Answer</th><th>Result</th><th>Theory</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for outcome in &results.outcomes {
        let class = if outcome.correct { "pass" } else { "fail" };
        let text = if outcome.correct { "Correct" } else { "Incorrect" };
        let chosen = outcome
            .chosen
            .map(|c| c.to_ascii_uppercase().to_string())
            .unwrap_or_else(|| "-".to_string());

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            class,
            outcome.question_id,
            html_escape(outcome.category.as_str()),
            html_escape(&outcome.prompt),
            chosen,
            outcome.expected.to_ascii_uppercase(),
            class,
            text,
            html_escape(&outcome.theory)
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Remediation
    if !results.remediation.is_empty() {
        html.push_str("<section class=\"remediation\">\n");
        html.push_str("<h2>Review these modules</h2>\n<ul>\n");
        for module in &results.remediation {
            match &module.path {
                Some(path) => html.push_str(&format!(
                    "<li><a href=\"{}\">{}</a></li>\n",
                    html_escape(path),
                    html_escape(&module.title)
                )),
                None => html.push_str(&format!("<li>{}</li>\n", html_escape(&module.title))),
            }
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML dashboard to a file.
pub fn write_html_report(report: &QuizReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(categories: &[CategoryScore]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = categories.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, category) in categories.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let ratio = category.ratio();
        let width = (ratio * max_width as f64) as usize;

        let color = if ratio >= 0.8 {
            "#22c55e"
        } else if ratio >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(category.category.as_str())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            category.correct,
            category.total
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --accent: #7c3aed; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #0f172a; --fg: #f1f5f9; --border: #334155; --pass: #064e3b; --fail: #7f1d1d; --accent: #a78bfa; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #64748b; }
.score { font-size: 1.5rem; }
.score strong { color: var(--accent); }
.verdict { display: inline-block; padding: 0.25rem 0.75rem; border-radius: 9999px; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
a { color: var(--accent); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
