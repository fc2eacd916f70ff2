//! Extracción del texto visible de una página HTML.
//!
//! No es un parser HTML completo: junta todas las líneas en una sola (sin
//! indentación), se queda con el contenido de `<body>` y devuelve cada nodo de
//! texto en orden de documento.

use regex::Regex;
use std::sync::LazyLock;

static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)(?:</body\s*>|$)").expect("valid regex"));

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Nodos de texto del `<body>` (o del documento entero si no hay `<body>`)
///
/// # Ejemplo
/// ```
/// use raw_http::client::extract::text_nodes;
///
/// let html = "<html>\n  <body>\n    <h2>404 Not Found</h2>\n  </body>\n</html>";
/// assert_eq!(text_nodes(html.as_bytes()), vec!["404 Not Found"]);
/// ```
pub fn text_nodes(body: &[u8]) -> Vec<String> {
    let html = String::from_utf8_lossy(body);
    let collapsed: String = html.split('\n').map(str::trim).collect();
    let without_comments = COMMENT.replace_all(&collapsed, "");

    let section = BODY
        .captures(&without_comments)
        .and_then(|captures| captures.get(1))
        .map_or(&*without_comments, |inner| inner.as_str());

    TAG.split(section)
        .filter(|text| !text.is_empty())
        .map(decode_entities)
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::html::status_page;

    #[test]
    fn test_generated_page() {
        let page = status_page("400 Bad Request", Some("Invalid syntax"));
        assert_eq!(text_nodes(page.as_bytes()), vec!["400 Bad Request", "Invalid syntax"]);
    }

    #[test]
    fn test_head_text_is_ignored() {
        let html = "<html><head><title>Titulo</title></head><body><p>uno</p><p>dos</p></body></html>";
        assert_eq!(text_nodes(html.as_bytes()), vec!["uno", "dos"]);
    }

    #[test]
    fn test_lines_are_collapsed() {
        let html = "<body>\n  <p>Hola\n     mundo</p>\n</body>";
        assert_eq!(text_nodes(html.as_bytes()), vec!["Holamundo"]);
    }

    #[test]
    fn test_mixed_inline_text() {
        let html = "<body><p>Click <a href=\"/x\">here</a> now</p></body>";
        assert_eq!(text_nodes(html.as_bytes()), vec!["Click ", "here", " now"]);
    }

    #[test]
    fn test_comments_and_entities() {
        let html = "<body><!-- hidden --><p>a &amp; b &lt;c&gt;</p></body>";
        assert_eq!(text_nodes(html.as_bytes()), vec!["a & b <c>"]);
    }

    #[test]
    fn test_without_body_uses_whole_document() {
        assert_eq!(text_nodes(b"<h1>plain</h1>"), vec!["plain"]);
        assert!(text_nodes(b"").is_empty());
    }

    #[test]
    fn test_body_with_attributes() {
        let html = "<BODY class=\"main\"><p>ok</p></BODY>";
        assert_eq!(text_nodes(html.as_bytes()), vec!["ok"]);
    }
}
