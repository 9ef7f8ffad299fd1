//! Single-file HTML timeline generator.
//!
//! Produces a standalone document that renders:
//! - an interactive scatter timeline (Plotly) with per-point hover previews
//! - a click-to-expand panel showing the full payload of a selected point
//! - the device-metadata panel supplied by the extraction collaborator
//! - a button linking to the collaborator's full report
//!
//! Point data is embedded as JSON in a non-executing
//! `<script type="application/json">` container and rendered client-side.

use std::path::Path;

use serde::Serialize;

use crate::render::{TimelineRow, category_order, chart_height};

/// Inputs for one timeline document.
#[derive(Debug, Clone)]
pub struct TimelinePage<'a> {
    pub rows: &'a [TimelineRow],
    /// Device-metadata markup from the collaborator, embedded verbatim.
    pub device_info_html: &'a str,
    /// Location of the collaborator's full report, linked but never opened
    /// or validated here.
    pub report_index: Option<&'a Path>,
}

#[derive(Serialize)]
struct ChartData<'a> {
    rows: &'a [TimelineRow],
    categories: Vec<String>,
    chart_height: u32,
    report_href: Option<String>,
}

/// Escape already-serialized JSON for embedding inside an HTML script tag.
/// `<` becomes `\u003c` so sequences like `</script>` cannot terminate the
/// container; the output is still valid JSON for `JSON.parse`.
fn escape_json_for_html_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Render a timeline page as a standalone HTML string. Deterministic for a
/// given input.
pub fn render_html(page: &TimelinePage) -> String {
    let categories = category_order(page.rows);
    let data = ChartData {
        rows: page.rows,
        chart_height: chart_height(categories.len()),
        categories,
        report_href: page
            .report_index
            .map(|path| format!("file://{}", path.display())),
    };
    let data_json = serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string());
    let escaped_json = escape_json_for_html_script(&data_json);

    let mut html = String::with_capacity(32 * 1024 + escaped_json.len());

    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>ALEAPP Timeline</title>
<script src="https://cdn.plot.ly/plotly-latest.min.js"></script>
<style>
body {
  font-family: Arial, sans-serif;
  margin: 0;
  padding: 20px;
}
.timeline {
  width: 100%;
  margin-bottom: 20px;
}
.bottom-container {
  display: flex;
  gap: 20px;
  align-items: flex-start;
}
.device-info {
  border: 1px solid #ccc;
  padding: 10px;
  background: #f8f8f8;
  width: 350px;
  height: 400px;
  overflow-y: auto;
  box-sizing: border-box;
  font-size: 14px;
  white-space: normal;
  flex-shrink: 0;
}
.clicked-event-box {
  border: 1px solid #ccc;
  padding: 10px;
  font-size: 14px;
  width: 750px;
  height: 400px;
  overflow-y: auto;
  box-sizing: border-box;
  white-space: normal;
  flex-shrink: 0;
}
.clicked-event-box .payload {
  max-height: 300px;
  overflow-y: auto;
  border: 1px solid #eee;
  padding: 10px;
  background: #f8f8f8;
  font-family: monospace;
  white-space: pre-wrap;
}
.report-button {
  display: inline-block;
  margin: 15px 0;
  padding: 10px 20px;
  font-size: 16px;
  background-color: #007acc;
  color: white;
  border: none;
  border-radius: 6px;
  cursor: pointer;
}
.report-button:hover {
  background-color: #005fa3;
}
</style>
</head>
<body>
<h2>ALEAPP Timeline from Extracted Data</h2>

<button id="open-report" class="report-button">Open Full Report</button>

<div id="timeline" class="timeline"></div>

<div class="bottom-container">
  <div class="device-info">
    <h3>Device Details</h3>
"#,
    );

    // Collaborator-supplied markup, embedded as-is.
    html.push_str(page.device_info_html);

    html.push_str(
        r#"
  </div>
  <div id="details" class="clicked-event-box">
    <h3>Clicked Event</h3>
    <p>Click on a timeline point to see details here.</p>
  </div>
</div>

<script type="application/json" id="timeline-data">"#,
    );

    html.push_str(&escaped_json);

    html.push_str(
        r#"</script>
<script>
// Parse point data from the non-executing JSON container
const DATA = JSON.parse(document.getElementById('timeline-data').textContent);

// Escape HTML (including quotes for attribute contexts)
function esc(s) {
  if (typeof s !== 'string') return s;
  return s.replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;').replace(/'/g,'&#39;');
}

const rows = DATA.rows;
const trace = {
  type: 'scatter',
  mode: 'markers',
  x: rows.map(r => r.key),
  y: rows.map(r => r.activity_label),
  marker: { size: 8, symbol: 'circle', color: '#007acc', opacity: 0.75 },
  customdata: rows.map(r => [r.datalist, r.preview]),
  hovertemplate: '<b>%{y}</b><br>%{x}<br><b>Preview:</b> %{customdata[1]}<extra></extra>'
};
const layout = {
  height: DATA.chart_height,
  margin: { l: 260, r: 40, t: 40, b: 80 },
  xaxis: { title: 'Timestamp' },
  yaxis: {
    title: 'Activity',
    autorange: 'reversed',
    categoryorder: 'array',
    categoryarray: DATA.categories
  }
};
Plotly.newPlot('timeline', [trace], layout, { responsive: true });

document.getElementById('timeline').on('plotly_click', function(data) {
  const point = data.points[0];
  const fullText = point.customdata[0];
  document.getElementById('details').innerHTML =
    '<h3>Clicked Event</h3>' +
    '<b>Timestamp:</b> ' + esc(point.x) + '<br>' +
    '<b>Activity:</b> ' + esc(point.y) + '<br><br>' +
    '<b>Full datalist:</b><br>' +
    '<div class="payload">' + esc(fullText) + '</div>';
});

const reportBtn = document.getElementById('open-report');
if (DATA.report_href) {
  reportBtn.addEventListener('click', function() { window.open(DATA.report_href, '_blank'); });
} else {
  reportBtn.style.display = 'none';
}
</script>
</body>
</html>"#,
    );

    html
}

/// Write a timeline page as a standalone HTML file.
pub fn write_html(path: &Path, page: &TimelinePage) -> anyhow::Result<()> {
    let html = render_html(page);
    std::fs::write(path, html)?;
    Ok(())
}
