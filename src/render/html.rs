//! Minimal HTML construction helpers. Everything user-provided goes
//! through [`escape`]; builders return plain strings the dispatch layer
//! stitches together.

/// Escape text for safe interpolation into markup.
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

pub fn card(title: &str, body: &str) -> String {
    format!(
        "<section class=\"card\"><h2>{}</h2><div class=\"card-body\">{}</div></section>",
        escape(title),
        body
    )
}

pub fn card_full_width(title: &str, body: &str) -> String {
    format!(
        "<section class=\"card card-wide\"><h2>{}</h2><div class=\"card-body\">{}</div></section>",
        escape(title),
        body
    )
}

/// Container div a chart spec mounts into.
pub fn chart_container(id: &str) -> String {
    format!("<div id=\"{}\" class=\"chart-container\"></div>", escape(id))
}

/// Inline error block scoped to a single chart or section.
pub fn inline_error(message: &str) -> String {
    format!("<div class=\"chart-error\">{}</div>", escape(message))
}

pub fn kpi(label: &str, value: &str) -> String {
    format!(
        "<div class=\"kpi\"><div class=\"kpi-value\">{}</div><div class=\"kpi-label\">{}</div></div>",
        escape(value),
        escape(label)
    )
}

pub fn list(items: &[String]) -> String {
    if items.is_empty() {
        return "<p class=\"empty\">N/A</p>".to_string();
    }
    let mut out = String::from("<ul>");
    for item in items {
        out.push_str("<li>");
        out.push_str(&escape(item));
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::from("<table><thead><tr>");
    for h in headers {
        out.push_str("<th>");
        out.push_str(&escape(h));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&escape(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

pub fn badge(class: &str, text: &str) -> String {
    format!(
        "<span class=\"badge badge-{}\">{}</span>",
        escape(class),
        escape(text)
    )
}

pub fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<b a="1">&'x'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;&amp;&#39;x&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn card_escapes_title_but_not_body() {
        let c = card("A & B", "<p>body</p>");
        assert!(c.contains("A &amp; B"));
        assert!(c.contains("<p>body</p>"));
    }

    #[test]
    fn table_renders_headers_and_rows() {
        let t = table(
            &["Name", "Count"],
            &[vec!["a".to_string(), "1".to_string()]],
        );
        assert!(t.contains("<th>Name</th>"));
        assert!(t.contains("<td>a</td>"));
    }

    #[test]
    fn empty_list_shows_placeholder() {
        assert!(list(&[]).contains("N/A"));
    }
}
