//! HTML page rendering.

use askama::Template;

/// The auto-refreshing demo page.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    /// Message from the backend, HTML-escaped on render
    pub content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_page() {
        let html = PageTemplate {
            content: "Last update at 10:00:00",
        }
        .render()
        .unwrap();
        assert!(html.starts_with("<html><head><meta http-equiv=\"Refresh\" content=\"3\">"));
        assert!(html.contains("<h1>Last update at 10:00:00</h1>"));
        assert!(html.contains("<a href=\"clear/\">Clear cache</a>"));
    }

    #[test]
    fn test_content_is_escaped() {
        let mut html = String::new();
        PageTemplate {
            content: "<script>alert(1)</script>",
        }
        .render_into(&mut html)
        .unwrap();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
