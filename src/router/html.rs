//! Plantilla HTML de las páginas generadas (errores y confirmaciones).

/// Página con título = `status` y un párrafo opcional
///
/// # Ejemplo
/// ```
/// use raw_http::router::html::status_page;
///
/// let page = status_page("403 Forbidden", Some("You cannot access private files"));
/// assert!(page.contains("<title>403 Forbidden</title>"));
/// assert!(page.contains("<p>You cannot access private files</p>"));
/// ```
pub fn status_page(status: &str, description: Option<&str>) -> String {
    let mut page = format!(
        r#"<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta http-equiv="X-UA-Compatible" content="IE=edge">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{status}</title>
</head>
<body>
    <h2>{status}</h2>
"#,
        status = escape(status)
    );

    if let Some(description) = description {
        page.push_str(&format!("    <p>{}</p>\n", escape(description)));
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
