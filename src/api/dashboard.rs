//! Server-rendered dashboard page.
//!
//! Pure view glue over the same data the JSON API exposes: break warnings,
//! per-user progress toward the challenge, record tables, and submit/edit
//! forms that post back through the API.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::store::Record;
use crate::streak::StreakStatus;

use super::routes::{store_error, ApiError, AppState};
use super::types::UserOverview;

/// Render the dashboard.
pub(super) async fn page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let today = state.clock.today();
    let challenge_days = state.config.challenge_days;

    let mut boards = Vec::with_capacity(state.config.users.len());
    for user in &state.config.users {
        // Unknown users cannot appear here; state is built from the same list.
        if let Some(log) = state.log(user) {
            let records = log.read().map_err(store_error)?;
            let overview = UserOverview::build(user, &records, today, challenge_days);
            boards.push((overview, records));
        }
    }

    Ok(Html(render(&boards, challenge_days)))
}

fn render(boards: &[(UserOverview, Vec<Record>)], challenge_days: u32) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>75-Day Challenge</title>\n<style>\n\
         body { font-family: sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }\n\
         .warn { background: #fde2e2; border: 1px solid #c0392b; padding: .5rem 1rem; border-radius: 4px; }\n\
         .card { border: 1px solid #ddd; border-radius: 6px; padding: 1rem; margin: 1rem 0; }\n\
         table { border-collapse: collapse; width: 100%; }\n\
         th, td { border: 1px solid #ccc; padding: .3rem .6rem; text-align: left; }\n\
         progress { width: 100%; height: 1rem; }\n\
         </style>\n</head>\n<body>\n",
    );
    let _ = writeln!(html, "<h1>75-Day Challenge : Geek Edition 🤓</h1>");

    for (overview, _) in boards {
        if overview.status == StreakStatus::Broken {
            let _ = writeln!(
                html,
                "<p class=\"warn\">{} broke the streak!</p>",
                escape(&overview.user)
            );
        }
    }

    for (overview, records) in boards {
        let _ = writeln!(html, "<div class=\"card\">");
        let _ = writeln!(html, "<h2>{}</h2>", escape(&overview.user));
        let _ = writeln!(
            html,
            "<p>🔥 streak: <strong>{}</strong> &middot; {}/{} days logged</p>",
            overview.streak, overview.record_count, challenge_days
        );
        let _ = writeln!(
            html,
            "<progress max=\"{}\" value=\"{}\"></progress>",
            challenge_days, overview.record_count
        );
        if overview.completed {
            let _ = writeln!(
                html,
                "<p>🎉 Congratulations! {} has completed the challenge!</p>",
                escape(&overview.user)
            );
        }

        match overview.status {
            StreakStatus::NotStarted => {
                let _ = writeln!(html, "<p><em>Not started yet.</em></p>");
            }
            _ => {
                let _ = writeln!(
                    html,
                    "<table><tr><th>Task</th><th>Submission Time</th></tr>"
                );
                for record in records {
                    let _ = writeln!(
                        html,
                        "<tr><td>{}</td><td>{}</td></tr>",
                        escape(&record.task),
                        record.formatted_time()
                    );
                }
                let _ = writeln!(html, "</table>");
            }
        }

        if overview.submission_allowed {
            let _ = writeln!(
                html,
                "<p><input id=\"submit-{user}\" placeholder=\"Write today's work\"> \
                 <button onclick=\"submitTask('{user}')\">Submit</button></p>",
                user = escape(&overview.user)
            );
        } else if let Some(latest) = &overview.latest {
            let _ = writeln!(
                html,
                "<p><input id=\"edit-{user}\" value=\"{value}\"> \
                 <button onclick=\"editLatest('{user}')\">Update last entry</button></p>",
                user = escape(&overview.user),
                value = escape(&latest.task)
            );
        }
        let _ = writeln!(
            html,
            "<p><a href=\"/api/users/{user}/export\">Download CSV</a></p>",
            user = escape(&overview.user)
        );
        let _ = writeln!(html, "</div>");
    }

    html.push_str(
        "<script>\n\
         async function submitTask(user) {\n\
           const task = document.getElementById('submit-' + user).value;\n\
           const res = await fetch('/api/tasks', { method: 'POST',\n\
             headers: { 'Content-Type': 'application/json' },\n\
             body: JSON.stringify({ user, task }) });\n\
           if (!res.ok) { alert((await res.json()).error); return; }\n\
           location.reload();\n\
         }\n\
         async function editLatest(user) {\n\
           const task = document.getElementById('edit-' + user).value;\n\
           const res = await fetch('/api/users/' + user + '/log/latest', { method: 'PUT',\n\
             headers: { 'Content-Type': 'application/json' },\n\
             body: JSON.stringify({ task }) });\n\
           if (!res.ok) { alert((await res.json()).error); return; }\n\
           location.reload();\n\
         }\n\
         </script>\n</body>\n</html>\n",
    );
    html
}

/// Minimal HTML entity escaping for user-supplied text.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<b>\"x\" & 'y'</b>"),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn render_shows_break_warning_and_table() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let stale = vec![Record::new(
            "old <task>",
            NaiveDate::from_ymd_opt(2024, 3, 6)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )];
        let overview = UserOverview::build("Deep", &stale, today, 75);
        let html = render(&[(overview, stale)], 75);

        assert!(html.contains("Deep broke the streak!"));
        assert!(html.contains("old &lt;task&gt;"));
        assert!(html.contains("progress"));
    }
}
