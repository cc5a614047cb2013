//! Self-contained HTML report.
//!
//! Everything the page needs is inlined: styles, the search script, and
//! the run data. All caller-supplied text goes through [`escape_html`].

use crate::analysis::{AggregateCounts, BrandList};
use crate::models::{ResultEntry, RunMetadata};
use crate::report::ReportDocument;

/// Number of domains listed in the top-domains table.
const TOP_DOMAINS: usize = 20;

/// Placeholder shown for questions the model never answered.
const UNANSWERED: &str = "No response (request failed)";

const STYLE: &str = r#"<style>
body { font-family: Arial, sans-serif; margin: 20px; color: #222; }
h1 { color: #333; }
pre { white-space: pre-wrap; background: #f7f7f7; padding: 8px; border-radius: 6px; }
dt { font-weight: bold; margin-top: 8px; }
table { border-collapse: collapse; }
th, td { padding: 4px 10px; border-bottom: 1px solid #ddd; text-align: left; }
.search-box { margin: 20px 0; }
.search-box input { width: 100%; padding: 8px; box-sizing: border-box; }
.result { border: 1px solid #ddd; border-radius: 8px; padding: 15px; margin-bottom: 10px; }
.question { font-weight: bold; margin-bottom: 10px; }
.response { white-space: pre-wrap; }
.unanswered { color: #999; font-style: italic; }
.badge { background: #007BFF; color: white; padding: 2px 6px; border-radius: 6px; margin-left: 6px; font-size: 12px; }
.badge.zero { background: #aaa; }
.tags { margin-top: 10px; font-size: 12px; color: #555; }
.tag { display: inline-block; background: #eef; border-radius: 4px; padding: 1px 5px; margin: 2px; }
footer { margin-top: 30px; color: #888; font-size: 12px; }
</style>
"#;

// Lowercases each entry's search text once at load time; keystrokes only
// lowercase the query.
const SEARCH_SCRIPT: &str = r##"<script>
(function () {
  var input = document.getElementById("searchInput");
  var empty = document.getElementById("noMatches");
  var entries = Array.prototype.map.call(
    document.querySelectorAll("#results .result"),
    function (el) {
      return { el: el, text: (el.getAttribute("data-search") || "").toLowerCase() };
    }
  );
  function filter() {
    var query = input.value.toLowerCase();
    var shown = 0;
    for (var i = 0; i < entries.length; i++) {
      var match = query === "" || entries[i].text.indexOf(query) !== -1;
      entries[i].el.style.display = match ? "" : "none";
      if (match) shown++;
    }
    empty.hidden = shown !== 0 || entries.length === 0;
  }
  input.addEventListener("input", filter);
  filter();
})();
</script>
"##;

/// Escape text for use in element content or a quoted attribute value.
pub fn escape_html(text: &str) -> String {
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

/// Text the search box matches against: question and response.
pub fn search_text(entry: &ResultEntry) -> String {
    match entry.response {
        Some(ref response) => format!("{}\n{}", entry.question, response),
        None => entry.question.clone(),
    }
}

/// Render the full report.
pub fn render(
    entries: &[ResultEntry],
    counts: &AggregateCounts,
    brands: &BrandList,
    metadata: &RunMetadata,
) -> ReportDocument {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>AI Visibility Report</title>\n");
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>🔍 AI Visibility Report</h1>\n");

    html.push_str(&generate_metadata_section(metadata, entries));
    html.push_str(&generate_brand_section(counts, brands));
    html.push_str(&generate_domain_section(counts));
    html.push_str(&generate_results_section(entries));

    html.push_str(&format!(
        "<footer>Generated by aivisor v{}</footer>\n",
        env!("CARGO_PKG_VERSION")
    ));
    html.push_str(SEARCH_SCRIPT);
    html.push_str("</body>\n</html>\n");

    ReportDocument::html(html)
}

fn generate_metadata_section(metadata: &RunMetadata, entries: &[ResultEntry]) -> String {
    let answered = entries.iter().filter(|e| e.is_answered()).count();
    let mut section = String::new();

    section.push_str("<section class=\"metadata\">\n<h2>⚙️ Run Details</h2>\n<dl>\n");
    section.push_str(&format!(
        "<dt>Model</dt><dd><code>{}</code></dd>\n",
        escape_html(&metadata.model)
    ));
    section.push_str(&format!(
        "<dt>Generated</dt><dd>{}</dd>\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "<dt>Responses</dt><dd>{} of {} question(s) answered</dd>\n",
        answered,
        entries.len()
    ));
    section.push_str(&format!(
        "<dt>System prompt</dt><dd><pre>{}</pre></dd>\n",
        escape_html(&metadata.system_prompt)
    ));
    section.push_str(&format!(
        "<dt>User prompt template</dt><dd><pre>{}</pre></dd>\n",
        escape_html(&metadata.user_prompt)
    ));
    section.push_str("</dl>\n<h3>Questions</h3>\n<ol class=\"questions\">\n");
    for question in &metadata.questions {
        section.push_str(&format!("<li>{}</li>\n", escape_html(question)));
    }
    section.push_str("</ol>\n</section>\n");

    section
}

fn generate_brand_section(counts: &AggregateCounts, brands: &BrandList) -> String {
    let mut section = String::new();

    section.push_str("<h2>🏢 Brand Mentions</h2>\n<ul class=\"brands\">\n");
    for (brand, count) in counts.brand_table(brands) {
        let class = if count == 0 { "badge zero" } else { "badge" };
        section.push_str(&format!(
            "<li>{} <span class=\"{}\">{}</span></li>\n",
            escape_html(brand),
            class,
            count
        ));
    }
    section.push_str("</ul>\n");

    section
}

fn generate_domain_section(counts: &AggregateCounts) -> String {
    let mut section = String::new();

    section.push_str("<h2>🌐 Top Domains</h2>\n");
    let domains = counts.top_domains(TOP_DOMAINS);
    if domains.is_empty() {
        section.push_str("<p>No domains were referenced.</p>\n");
        return section;
    }

    section.push_str("<table class=\"domains\">\n<tr><th>Domain</th><th>Responses</th></tr>\n");
    for (domain, count) in domains {
        section.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(domain),
            count
        ));
    }
    section.push_str("</table>\n");

    section
}

fn generate_results_section(entries: &[ResultEntry]) -> String {
    let mut section = String::new();

    section.push_str("<h2>📄 Responses</h2>\n");
    section.push_str("<div class=\"search-box\">\n");
    section.push_str(
        "<input type=\"search\" id=\"searchInput\" placeholder=\"Search in results...\" autocomplete=\"off\">\n",
    );
    section.push_str("</div>\n<div id=\"results\">\n");
    for entry in entries {
        section.push_str(&generate_result_block(entry));
    }
    section.push_str("</div>\n<p id=\"noMatches\" class=\"unanswered\" hidden>No matching responses.</p>\n");

    section
}

fn generate_result_block(entry: &ResultEntry) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "<div class=\"result\" data-search=\"{}\">\n",
        escape_html(&search_text(entry))
    ));
    block.push_str(&format!(
        "<div class=\"question\">{}</div>\n",
        escape_html(&entry.question)
    ));

    match entry.response {
        Some(ref response) => block.push_str(&format!(
            "<div class=\"response\">{}</div>\n",
            escape_html(response)
        )),
        None => block.push_str(&format!(
            "<div class=\"response unanswered\">{}</div>\n",
            UNANSWERED
        )),
    }

    if let Some(ref analysis) = entry.analysis {
        let tags: Vec<String> = analysis
            .products
            .iter()
            .chain(analysis.resources.domains.iter())
            .map(|t| format!("<span class=\"tag\">{}</span>", escape_html(t)))
            .collect();
        if !tags.is_empty() {
            block.push_str(&format!("<div class=\"tags\">{}</div>\n", tags.join("")));
        }
    }

    block.push_str("</div>\n");

    block
}
