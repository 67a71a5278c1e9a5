//! The single HTML page: input form plus an optional result line

use crate::inference::{FieldKind, FormFields, PredictionOutcome, FORM_FIELDS};
use std::fmt::Write;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Video Game Sales Predictor</title>
    <style>
        body { font-family: system-ui, sans-serif; background: #111827; color: #f3f4f6; margin: 0; }
        main { max-width: 32rem; margin: 3rem auto; padding: 2rem; background: #1f2937; border-radius: 0.5rem; }
        h1 { font-size: 1.4rem; margin-top: 0; }
        label { display: block; margin-top: 0.8rem; font-size: 0.9rem; color: #9ca3af; }
        input { width: 100%; box-sizing: border-box; padding: 0.5rem; margin-top: 0.2rem;
                background: #374151; color: #f9fafb; border: 1px solid #4b5563; border-radius: 0.25rem; }
        button { margin-top: 1.2rem; width: 100%; padding: 0.6rem; background: #3b82f6; color: white;
                 border: none; border-radius: 0.25rem; font-size: 1rem; cursor: pointer; }
        .result { margin-top: 1.5rem; padding: 0.8rem; background: #374151; border-radius: 0.25rem; }
    </style>
</head>
<body>
<main>
    <h1>Video Game Global Sales Prediction</h1>
    <form action="/predict" method="post">
"#;

const PAGE_TAIL: &str = r#"</main>
</body>
</html>
"#;

/// Render the page, echoing submitted values and the outcome if any
pub fn render(outcome: Option<&PredictionOutcome>, submitted: &FormFields) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(PAGE_HEAD);

    for field in &FORM_FIELDS {
        let value = submitted.get(field.name).unwrap_or("");
        let extra = match field.kind {
            FieldKind::Categorical => "",
            FieldKind::Numeric => r#" inputmode="decimal""#,
        };
        let _ = write!(
            html,
            "        <label for=\"{name}\">{label}</label>\n        \
             <input id=\"{name}\" name=\"{name}\" type=\"text\"{extra} value=\"{value}\" required>\n",
            name = field.name,
            label = field.label,
            value = escape_html(value),
        );
    }

    html.push_str("        <button type=\"submit\">Predict</button>\n    </form>\n");

    if let Some(outcome) = outcome {
        let _ = writeln!(
            html,
            "    <p class=\"result\">{}</p>",
            escape_html(&outcome.to_string())
        );
    }

    html.push_str(PAGE_TAIL);
    html
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_has_every_field() {
        let html = render(None, &FormFields::new());
        for field in &FORM_FIELDS {
            assert!(html.contains(&format!("name=\"{}\"", field.name)));
        }
        assert!(!html.contains("class=\"result\""));
    }

    #[test]
    fn test_outcome_and_values_are_escaped() {
        let submitted = FormFields::new().with("publisher", "<b>\"EA\"</b>");
        let outcome = PredictionOutcome::Failure("bad <input>".to_string());
        let html = render(Some(&outcome), &submitted);

        assert!(html.contains("value=\"&lt;b&gt;&quot;EA&quot;&lt;/b&gt;\""));
        assert!(html.contains("<p class=\"result\">Error: bad &lt;input&gt;</p>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b's"), "a &amp; b&#39;s");
        assert_eq!(escape_html("plain"), "plain");
    }
}
