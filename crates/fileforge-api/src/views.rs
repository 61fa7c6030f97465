//! Server-rendered HTML pages.

use std::fmt::Write;

use fileforge_converter::{
    ConversionOutcome, FsUtils, StatsSnapshot, ToolCatalog, ToolDescriptor, ToolOperation,
};

const STYLE: &str = "body{font-family:Arial,sans-serif;max-width:960px;margin:0 auto;padding:20px;color:#222}\
a{color:#2c3e50}.grid{display:flex;flex-wrap:wrap;gap:12px}\
.card{border:1px solid #ddd;border-radius:8px;padding:12px;width:200px;text-decoration:none}\
.ok{color:#27ae60}.fail{color:#c0392b}table{border-collapse:collapse}td,th{padding:4px 12px;text-align:left}";

/// Escape text for an HTML body or a double-quoted attribute.
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

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{} | FileForge</title><style>{STYLE}</style></head><body>\
         <header><a href=\"/\"><strong>FileForge</strong></a> · <a href=\"/stats\">Stats</a></header>\
         <main>{body}</main></body></html>",
        escape(title)
    )
}

fn tool_card(out: &mut String, tool: &ToolDescriptor) {
    let _ = write!(
        out,
        "<a class=\"card\" href=\"/tool/{id}\" style=\"border-color:{color}\">\
         <div>{icon} <strong>{name}</strong></div><small>{desc}</small></a>",
        id = escape(tool.id),
        color = tool.color,
        icon = tool.icon,
        name = escape(tool.name),
        desc = escape(tool.description),
    );
}

/// `GET /`: popular tools, every category, and headline counters.
pub fn home(catalog: &ToolCatalog, stats: &StatsSnapshot) -> String {
    let mut body = String::from("<h1>Convert your files</h1><h2>Popular tools</h2><div class=\"grid\">");
    for tool in catalog.list_popular() {
        tool_card(&mut body, tool);
    }
    body.push_str("</div>");

    for (category, tools) in catalog.group_by_category() {
        let _ = write!(body, "<h2>{category}</h2><div class=\"grid\">");
        for tool in tools {
            tool_card(&mut body, tool);
        }
        body.push_str("</div>");
    }

    let _ = write!(
        body,
        "<p>{} conversions so far · {} tools available</p>",
        stats.total_conversions,
        catalog.len()
    );
    layout("Home", &body)
}

/// `GET /tool/{id}`: the upload form.
pub fn tool(tool: &ToolDescriptor) -> String {
    let multiple = if tool.takes_multiple_files() { " multiple" } else { "" };
    let field = if tool.takes_multiple_files() { "files" } else { "file" };

    let mut body = format!(
        "<h1>{icon} {name}</h1><p>{desc}</p>\
         <form method=\"post\" action=\"/convert/{id}\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"{field}\" accept=\"{accept}\" required{multiple}>",
        icon = tool.icon,
        name = escape(tool.name),
        desc = escape(tool.description),
        id = escape(tool.id),
        accept = escape(&tool.accept_attribute()),
    );

    match tool.operation {
        ToolOperation::ImageResize => body.push_str(
            "<label>Width <input type=\"number\" name=\"width\" value=\"800\" min=\"1\" max=\"10000\"></label>\
             <label>Height <input type=\"number\" name=\"height\" value=\"600\" min=\"1\" max=\"10000\"></label>",
        ),
        ToolOperation::ImageCompress => body.push_str(
            "<label>Quality <input type=\"number\" name=\"quality\" value=\"0.8\" min=\"0\" max=\"1\" step=\"0.05\"></label>",
        ),
        _ => {}
    }
    let _ = write!(
        body,
        "<button type=\"submit\">Convert</button></form><p><small>Accepted: {}</small></p>",
        escape(&tool.accept_attribute())
    );
    layout(tool.name, &body)
}

/// Result page for a conversion attempt.
pub fn result(outcome: &ConversionOutcome, tool: Option<&ToolDescriptor>) -> String {
    let mut body = String::new();
    if outcome.success {
        let _ = write!(body, "<h1 class=\"ok\">{}</h1>", escape(&outcome.message));
        if let (Some(name), Some(url)) = (&outcome.file_name, &outcome.download_url) {
            let _ = write!(
                body,
                "<p><a href=\"{url}\" download>Download {display}</a> ({size})</p>",
                url = escape(url),
                display = escape(&FsUtils::display_name(name)),
                size = escape(&outcome.file_size_formatted),
            );
        }
    } else {
        let _ = write!(
            body,
            "<h1 class=\"fail\">Conversion failed</h1><p>{}</p>",
            escape(&outcome.message)
        );
    }

    let _ = write!(
        body,
        "<p>{label} · {ms} ms</p>",
        label = escape(&outcome.conversion_type),
        ms = outcome.processing_time_ms
    );
    if let Some(tool) = tool {
        let _ = write!(body, "<p><a href=\"/tool/{}\">Convert another file</a></p>", escape(tool.id));
    }
    body.push_str("<p><a href=\"/thankyou\">Done</a></p>");
    layout(&outcome.conversion_type, &body)
}

/// `GET /stats`.
pub fn stats(stats: &StatsSnapshot) -> String {
    let mut body = String::from("<h1>Conversion statistics</h1><table><tr><th>Category</th><th>Conversions</th></tr>");
    for (category, count) in &stats.categories {
        let _ = write!(body, "<tr><td>{}</td><td>{count}</td></tr>", escape(category));
    }
    let _ = write!(
        body,
        "</table><p>Total {} · succeeded {} · failed {} · success rate {:.1}%</p>",
        stats.total_conversions,
        stats.success_count,
        stats.failure_count,
        stats.success_rate()
    );
    layout("Stats", &body)
}

/// `GET /thankyou`.
pub fn thank_you() -> String {
    layout(
        "Thank you",
        "<h1>Thank you for using FileForge!</h1><p><a href=\"/\">Convert more files</a></p>",
    )
}

/// Generic error page for unknown routes.
pub fn error_page(status: u16, message: &str) -> String {
    layout(
        "Error",
        &format!(
            "<h1>{status}</h1><p>{}</p><p><a href=\"/\">Back to all tools</a></p>",
            escape(message)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_result_page_shows_download_link() {
        let outcome = ConversionOutcome::success(
            "CSV converted to JSON!",
            "CSV → JSON",
            "data__0190a0b0c0d0e0f00112233445566778.json".to_string(),
            10,
            Duration::from_millis(5),
        );
        let html = result(&outcome, None);
        assert!(html.contains("/download/data__0190a0b0c0d0e0f00112233445566778.json"));
        assert!(html.contains("CSV converted to JSON!"));
    }

    #[test]
    fn test_failure_page_escapes_message() {
        let outcome = ConversionOutcome::failure("Unknown tool: <script>", "Unknown", Duration::ZERO);
        let html = result(&outcome, None);
        assert!(html.contains("Unknown tool: &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_tool_form_for_multi_file_tool() {
        let catalog = ToolCatalog::builtin();
        let merge = catalog.find_by_id("pdf-merge").expect("tool");
        let html = tool(merge);
        assert!(html.contains("name=\"files\""));
        assert!(html.contains(" multiple"));
        assert!(html.contains("action=\"/convert/pdf-merge\""));
    }
}
