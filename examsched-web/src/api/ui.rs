//! HTML page rendering
//!
//! Pages are plain server-rendered HTML; every user- or file-supplied string
//! goes through [`escape`].

use examsched_common::{Resolution, SubjectMatch};

use super::SELECTED_FIELD;

const STYLE: &str = r#"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }
        header {
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 30px;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }
        h1 {
            font-size: 26px;
            color: #4a9eff;
        }
        .build-info {
            text-align: right;
            font-size: 14px;
            color: #888;
            font-family: 'Courier New', monospace;
        }
        .content {
            padding: 0 20px 20px;
        }
        .subjects {
            list-style: none;
            columns: 3 260px;
            margin-bottom: 20px;
        }
        table {
            border-collapse: collapse;
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #3a3a3a;
            padding: 6px 12px;
            text-align: left;
        }
        th {
            background: #2a2a2a;
            color: #4a9eff;
        }
        .note {
            color: #888;
            font-size: 14px;
        }
        .button {
            padding: 10px 20px;
            background: #4a9eff;
            color: white;
            border: none;
            border-radius: 4px;
            font-weight: 600;
            text-decoration: none;
            cursor: pointer;
        }
"#;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn page(title: &str, body: &str) -> String {
    let git_hash = env!("GIT_HASH");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <div class="build-info">examsched-web v{version}<br>{hash} ({profile})</div>
    </header>
    <div class="content">
{body}
    </div>
</body>
</html>
"#,
        title = escape(title),
        style = STYLE,
        version = env!("CARGO_PKG_VERSION"),
        hash = &git_hash[..git_hash.len().min(8)],
        profile = env!("BUILD_PROFILE"),
        body = body,
    )
}

/// Selection form: one checkbox per subject, submitted to /process
pub fn select_page(sheet: &str, subjects: &[String]) -> String {
    let body = if subjects.is_empty() {
        "        <p>No subjects available.</p>\n".to_string()
    } else {
        let items: String = subjects
            .iter()
            .map(|s| {
                format!(
                    "            <li><label><input type=\"checkbox\" name=\"{field}\" value=\"{value}\"> {value}</label></li>\n",
                    field = SELECTED_FIELD,
                    value = escape(s),
                )
            })
            .collect();
        format!(
            "        <form method=\"post\" action=\"/process\">\n          <ul class=\"subjects\">\n{}          </ul>\n          <button type=\"submit\" class=\"button\">Show my exams</button>\n        </form>\n",
            items
        )
    };

    page(&format!("Select Subjects: {}", sheet), &body)
}

/// Raw selection, unresolved
pub fn echo_page(selected: &[String]) -> String {
    let body = if selected.is_empty() {
        "        <p>No subjects selected.</p>\n".to_string()
    } else {
        let items: String = selected
            .iter()
            .map(|s| format!("            <li>{}</li>\n", escape(s)))
            .collect();
        format!("        <ul>\n{}        </ul>\n", items)
    };

    page("Selected Subjects", &body)
}

/// Resolved exam sittings, one table row per record
pub fn schedule_page(sheet: &str, resolution: &Resolution) -> String {
    let mut body = String::new();

    if resolution.records.is_empty() {
        body.push_str("        <p>No exams found for the selected subjects.</p>\n");
    } else {
        body.push_str(
            "        <table>\n          <tr><th>Subject</th><th>Day</th><th>Date</th><th>Time</th></tr>\n",
        );
        for record in &resolution.records {
            body.push_str(&format!(
                "          <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&record.subject),
                escape(&record.day_name),
                escape(&record.date),
                escape(&record.time),
            ));
        }
        body.push_str("        </table>\n");
    }

    let noted: Vec<&SubjectMatch> = resolution
        .matches
        .iter()
        .filter(|m| !m.used || m.query != m.subject)
        .collect();
    if !noted.is_empty() {
        body.push_str(
            "        <p class=\"note\">Interpreted selections:</p>\n        <ul class=\"note\">\n",
        );
        for m in noted {
            body.push_str(&match_note(m));
        }
        body.push_str("        </ul>\n");
    }

    body.push_str("        <p><a href=\"/\" class=\"button\">Back</a></p>\n");
    page(&format!("Exam Schedule: {}", sheet), &body)
}

fn match_note(m: &SubjectMatch) -> String {
    if m.used {
        format!(
            "          <li>{} &rarr; {} ({:.0}% similar)</li>\n",
            escape(&m.query),
            escape(&m.subject),
            m.ratio * 100.0
        )
    } else {
        format!(
            "          <li>{} ignored: closest subject {} is only {:.0}% similar</li>\n",
            escape(&m.query),
            escape(&m.subject),
            m.ratio * 100.0
        )
    }
}
