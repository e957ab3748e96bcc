//! HTML pages for the SWOT engine.
//!
//! The service renders three pages: the static input form, the results page
//! for a completed run, and a small error page. Everything user- or
//! model-supplied goes through `escape_html` before it reaches a page.

use crate::model::{Dimension, Layer, RunSummary, SwotItem};

/// Escape text for safe interpolation into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Static input form.
pub const FORM_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Layered SWOT Engine</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 980px; margin: 0 auto; padding: 24px; background: #f7f7f7; }
    h1 { color: #222; }
    h2 { color: #444; margin-top: 28px; }
    .card { background: #fff; border-radius: 8px; padding: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.06); margin-bottom: 20px; }
    label { display: block; font-weight: bold; margin: 10px 0 6px; color: #333; }
    input[type=text], textarea { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 6px; box-sizing: border-box; }
    textarea { min-height: 90px; }
    .grid { display: grid; gap: 12px; grid-template-columns: 1fr 1fr; }
    .btn { background: #2d7a46; color: #fff; border: none; padding: 12px 18px; border-radius: 6px; cursor: pointer; font-size: 16px; }
    .btn:hover { background: #25663a; }
    .muted { color: #666; font-size: 14px; }
    .small { font-size: 12px; color: #777; }
    .status { display: none; margin-top: 12px; padding: 10px; border-radius: 6px; }
    .loading { display: block; background: #fff3cd; color: #856404; }
    .error { display: block; background: #f8d7da; color: #721c24; }
  </style>
  <script>
    function onSubmit(evt) {
      evt.preventDefault();
      const form = evt.target;
      const status = document.getElementById('status');
      status.className = 'status loading';
      status.textContent = 'Running layered SWOT analysis... this can take a minute.';
      const btn = document.getElementById('submitBtn');
      btn.disabled = true; btn.textContent = 'Analyzing...';

      const fd = new FormData(form);
      fetch('/analyze', { method: 'POST', body: new URLSearchParams(fd) })
        .then(r => r.text())
        .then(html => { document.open(); document.write(html); document.close(); })
        .catch(err => {
          status.className = 'status error';
          status.textContent = 'Error: ' + err.message;
          btn.disabled = false; btn.textContent = 'Analyze';
        });
    }
  </script>
</head>
<body>
  <h1>Layered SWOT Engine</h1>
  <div class="card">
    <p class="muted">Three-layer SWOT structuring with a gap &times; impact priority model. Results are persisted per run and exposed as a JSON API for downstream dashboards.</p>
  </div>

  <form class="card" onsubmit="onSubmit(event)">
    <h2>Company</h2>
    <label>Company Name</label>
    <input type="text" name="company_name" required>
    <label>Desired Outcomes / KPIs</label>
    <textarea name="desired_outcomes" required placeholder="e.g., 30% YoY revenue growth, +10% forecast accuracy"></textarea>

    <h2>Three-Layer Inputs (free text)</h2>
    <div class="small">Provide short summaries for each layer (paste notes, bullet points, extracts).</div>
    <label>Canonical (Internal Truth)</label>
    <textarea name="layer_canonical" placeholder="Playbooks, strategy docs, positioning..."></textarea>
    <label>Corpus (External Truth)</label>
    <textarea name="layer_corpus" placeholder="Market chatter, analyst notes, reviews, competitor messaging..."></textarea>
    <label>Transactional (Internal Reality)</label>
    <textarea name="layer_transactional" placeholder="Sales call patterns, objections, win/loss insights..."></textarea>

    <h2>(Optional) Canonical Quadrant Seed Inputs</h2>
    <div class="grid">
      <div>
        <label>Strengths (one per line)</label>
        <textarea name="strengths"></textarea>
      </div>
      <div>
        <label>Weaknesses (one per line)</label>
        <textarea name="weaknesses"></textarea>
      </div>
    </div>
    <div class="grid">
      <div>
        <label>Opportunities (one per line)</label>
        <textarea name="opportunities"></textarea>
      </div>
      <div>
        <label>Threats (one per line)</label>
        <textarea name="threats"></textarea>
      </div>
    </div>

    <div id="status" class="status"></div>
    <br>
    <button id="submitBtn" class="btn" type="submit">Analyze</button>
  </form>

  <div class="card">
    <p class="small">Tip: after a run, the JSON is available at <code>/api/result?id=&lt;run_id&gt;</code> for visualization.</p>
  </div>
</body>
</html>
"#;

/// Render the item list for one quadrant/layer section.
fn render_items(out: &mut String, items: &[SwotItem]) {
    if items.is_empty() {
        out.push_str("<div class=\"swot-item empty-item\">No items</div>");
        return;
    }
    for item in items {
        out.push_str(&format!(
            "<div class=\"swot-item\"><span class=\"impact-badge\">{}</span><span>{}</span></div>",
            item.impact,
            escape_html(&item.text)
        ));
    }
}

/// Render one SWOT quadrant with its three layer sections.
fn render_quadrant(out: &mut String, summary: &RunSummary, dimension: Dimension) {
    out.push_str(&format!(
        "<div class=\"swot-quadrant {}-quad\"><h3>{}</h3>",
        dimension.as_str(),
        dimension.title()
    ));
    for layer in Layer::ALL {
        out.push_str(&format!(
            "<div class=\"layer-section\"><span class=\"layer-badge {}\">{}</span>",
            layer.as_str(),
            layer.as_str()
        ));
        render_items(out, summary.layer(layer).items(dimension));
        out.push_str("</div>");
    }
    out.push_str("</div>");
}

/// Render the complete results page for a run.
pub fn render_results(summary: &RunSummary) -> String {
    let company = escape_html(&summary.company);
    let outcomes = escape_html(&summary.desired_outcomes);
    let run_id = escape_html(&summary.run_id);
    let pretty_json =
        serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string());

    let mut page = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>SWOT Results - {company}</title>
  <style>
    body {{ font-family: Arial, sans-serif; max-width: 1100px; margin: 0 auto; padding: 24px; background: #f5f5f5; }}
    h1 {{ color: #1f2937; margin-bottom: 8px; }}
    .card {{ background: #fff; border-radius: 8px; padding: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.06); margin-bottom: 20px; }}
    pre {{ background: #0f172a; color: #e2e8f0; padding: 16px; border-radius: 8px; overflow: auto; font-size: 12px; }}
    a.btn {{ display: inline-block; background: #2d7a46; color: #fff; padding: 10px 14px; border-radius: 6px; text-decoration: none; }}
    a.btn:hover {{ background: #25663a; }}
    .pill {{ display: inline-block; padding: 4px 10px; border-radius: 999px; background: #eef2ff; color: #3730a3; font-size: 12px; margin-left: 6px; }}
    table {{ width: 100%; border-collapse: collapse; }}
    th, td {{ text-align: left; padding: 10px; border-bottom: 1px solid #eee; }}
    th {{ background: #f9fafb; font-weight: 600; color: #374151; }}
    tr:hover {{ background: #f9fafb; }}
    .swot-grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }}
    .swot-quadrant {{ padding: 20px; border-radius: 8px; min-height: 200px; }}
    .strengths-quad {{ background: #d1fae5; border: 2px solid #34d399; }}
    .weaknesses-quad {{ background: #fee2e2; border: 2px solid #f87171; }}
    .opportunities-quad {{ background: #dbeafe; border: 2px solid #60a5fa; }}
    .threats-quad {{ background: #fef3c7; border: 2px solid #fbbf24; }}
    .swot-quadrant h3 {{ margin: 0 0 16px 0; font-size: 18px; color: #1f2937; }}
    .layer-section {{ margin-bottom: 16px; }}
    .layer-badge {{ display: inline-block; padding: 4px 12px; border-radius: 4px; font-size: 11px; font-weight: bold; text-transform: uppercase; margin-bottom: 8px; color: white; }}
    .layer-badge.canonical {{ background: #3b82f6; }}
    .layer-badge.corpus {{ background: #8b5cf6; }}
    .layer-badge.transactional {{ background: #ec4899; }}
    .swot-item {{ background: rgba(255,255,255,0.9); padding: 10px; margin: 6px 0; border-radius: 6px; font-size: 13px; line-height: 1.5; display: flex; align-items: flex-start; gap: 8px; }}
    .swot-item.empty-item {{ color: #9ca3af; font-style: italic; justify-content: center; }}
    .impact-badge {{ background: #1f2937; color: white; padding: 2px 8px; border-radius: 4px; font-size: 11px; font-weight: bold; min-width: 24px; text-align: center; flex-shrink: 0; }}
    .expand-btn {{ background: #6b7280; color: white; border: none; padding: 8px 16px; border-radius: 6px; cursor: pointer; font-size: 14px; margin-top: 12px; }}
    .expand-btn:hover {{ background: #4b5563; }}
    .json-section {{ display: none; margin-top: 16px; }}
    .json-section.expanded {{ display: block; }}
  </style>
  <script>
    function toggleJson() {{
      const section = document.getElementById('jsonSection');
      const btn = document.getElementById('toggleBtn');
      section.classList.toggle('expanded');
      btn.textContent = section.classList.contains('expanded') ? 'Hide Full JSON' : 'Show Full JSON';
    }}
  </script>
</head>
<body>
  <h1>SWOT Results - {company}</h1>
  <div class="card">
    <p><strong>Run ID:</strong> <code>{run_id}</code></p>
    <p><strong>Desired Outcomes:</strong> {outcomes}</p>
    <p>
      <a class="btn" href="/">New Analysis</a>
      &nbsp;&nbsp;
      <a class="btn" href="/api/result?id={run_id}">View JSON API</a>
    </p>
  </div>

  <div class="card">
    <h2>Top Priorities <span class="pill">Gap &times; Impact</span></h2>
    <table>
      <tr><th>Dimension</th><th>Priority</th><th>Gap</th><th>Impact Mean</th></tr>
"#
    );

    for entry in &summary.priorities.ranked {
        page.push_str(&format!(
            "      <tr><td><b>{}</b></td><td><b>{}</b></td><td>{}</td><td>{}</td></tr>\n",
            entry.dimension.title(),
            entry.priority,
            entry.gap,
            entry.impact_mean
        ));
    }

    page.push_str(
        r#"    </table>
  </div>

  <div class="card">
    <h2>SWOT Matrix</h2>
    <div class="swot-grid">
"#,
    );

    for dimension in Dimension::ALL {
        render_quadrant(&mut page, summary, dimension);
    }

    page.push_str(&format!(
        r#"    </div>
  </div>

  <div class="card">
    <h2>Data Export</h2>
    <p>Access the complete structured data via the API endpoint or expand the JSON below.</p>
    <button id="toggleBtn" class="expand-btn" onclick="toggleJson()">Show Full JSON</button>
    <div id="jsonSection" class="json-section">
      <pre>{}</pre>
    </div>
  </div>
</body>
</html>
"#,
        escape_html(&pretty_json)
    ));

    page
}

/// Render a small error page.
pub fn render_error(title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{title}</title>
  <style>
    body {{ font-family: Arial, sans-serif; max-width: 720px; margin: 0 auto; padding: 24px; background: #f7f7f7; }}
    .card {{ background: #fff; border-radius: 8px; padding: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.06); }}
    .error {{ background: #f8d7da; color: #721c24; padding: 12px; border-radius: 6px; }}
    a {{ color: #2d7a46; }}
  </style>
</head>
<body>
  <div class="card">
    <h1>{title}</h1>
    <p class="error">{message}</p>
    <p><a href="/">Back to the form</a></p>
  </div>
</body>
</html>
"#,
        title = escape_html(title),
        message = escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{make_run_id, LayerOutput};
    use crate::scoring::compute_priorities;
    use chrono::{TimeZone, Utc};

    fn summary_with_company(company: &str) -> RunSummary {
        let canonical = LayerOutput::new(Layer::Canonical, company, "growth");
        let corpus = LayerOutput::new(Layer::Corpus, company, "growth");
        let transactional = LayerOutput::new(Layer::Transactional, company, "growth");
        let priorities = compute_priorities(&canonical, &corpus, &transactional);
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        RunSummary {
            run_id: make_run_id(timestamp, company),
            timestamp,
            company: company.into(),
            desired_outcomes: "growth".into(),
            canonical,
            corpus,
            transactional,
            priorities,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"A & B's"</b>"#),
            "&lt;b&gt;&quot;A &amp; B&#39;s&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_form_has_all_fields() {
        for field in [
            "company_name",
            "desired_outcomes",
            "layer_canonical",
            "layer_corpus",
            "layer_transactional",
            "strengths",
            "weaknesses",
            "opportunities",
            "threats",
        ] {
            assert!(
                FORM_HTML.contains(&format!("name=\"{field}\"")),
                "form is missing field {field}"
            );
        }
    }

    #[test]
    fn test_results_page_escapes_company() {
        let summary = summary_with_company("<script>alert(1)</script>");
        let page = render_results(&summary);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_results_page_contains_run_id_and_ranking() {
        let summary = summary_with_company("Acme");
        let page = render_results(&summary);
        assert!(page.contains(&summary.run_id));
        assert!(page.contains("/api/result?id="));
        for dimension in Dimension::ALL {
            assert!(page.contains(dimension.title()));
        }
    }

    #[test]
    fn test_error_page_escapes_message() {
        let page = render_error("Analysis failed", "layer <corpus> blew up");
        assert!(page.contains("Analysis failed"));
        assert!(page.contains("&lt;corpus&gt;"));
    }
}
