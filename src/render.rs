//! Highlighted-entity HTML in the style of the pretrained library's entity visualizer.

use crate::entity::Doc;

const MARK_STYLE: &str =
    "padding: 0.45em 0.6em; margin: 0 0.25em; line-height: 1; border-radius: 0.35em;";
const LABEL_STYLE: &str = "font-size: 0.8em; font-weight: bold; line-height: 1; border-radius: 0.35em; vertical-align: middle; margin-left: 0.5rem";

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn push_plain(html: &mut String, text: &str) {
    let mut lines = text.split('\n');
    if let Some(first) = lines.next() {
        html.push_str(&escape_html(first));
    }
    for line in lines {
        html.push_str("<br>");
        html.push_str(&escape_html(line));
    }
}

/// Render `doc` with each entity wrapped in a coloured `<mark>` carrying its label.
pub fn render_entities(doc: &Doc) -> String {
    let mut html = String::from(r#"<div class="entities" style="line-height: 2.5; direction: ltr">"#);
    let mut cursor = 0;

    for ent in &doc.ents {
        if ent.start < cursor || doc.text.get(ent.start..ent.end).is_none() {
            continue;
        }
        push_plain(&mut html, &doc.text[cursor..ent.start]);

        html.push_str(&format!(
            r#"<mark class="entity" style="background: {}; {}">"#,
            ent.label.color(),
            MARK_STYLE
        ));
        push_plain(&mut html, &doc.text[ent.start..ent.end]);
        html.push_str(&format!(
            r#"<span style="{}">{}</span></mark>"#,
            LABEL_STYLE,
            escape_html(ent.label.as_str())
        ));

        cursor = ent.end;
    }

    push_plain(&mut html, &doc.text[cursor..]);
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityLabel, EntitySource, EntitySpan};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"AT&T"</b> 'x'"#),
            "&lt;b&gt;&quot;AT&amp;T&quot;&lt;/b&gt; &#x27;x&#x27;"
        );
    }

    #[test]
    fn test_entities_are_marked_in_order() {
        let text = "Elon Musk runs Tesla.";
        let doc = Doc::new(
            text,
            vec![
                EntitySpan::new(text, 0, 9, EntityLabel::Person, EntitySource::Ruler),
                EntitySpan::new(text, 15, 20, EntityLabel::Organization, EntitySource::Ruler),
            ],
        );
        let html = render_entities(&doc);
        let person = html.find("Elon Musk<span").unwrap();
        let org = html.find("Tesla<span").unwrap();
        assert!(person < org);
        assert!(html.contains("background: #aa9cfc"));
        assert!(html.contains("background: #7aecec"));
        assert!(html.contains(">ORG</span></mark>."));
        assert!(html.contains("</mark> runs <mark"));
    }

    #[test]
    fn test_plain_text_is_escaped_and_newlines_break() {
        let doc = Doc::new("<script>\nhi", Vec::new());
        let html = render_entities(&doc);
        assert!(html.contains("&lt;script&gt;<br>hi"));
        assert!(!html.contains("<script>"));
    }
}
