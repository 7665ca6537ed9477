//! Static content pages and the error view.

use super::html::escape;
use super::{Page, SiteContext};

/// Landing page.
#[derive(Debug, Clone)]
pub struct HomePage {
    title: String,
    name: String,
    tagline: String,
}

impl HomePage {
    pub fn new(ctx: &SiteContext) -> Self {
        Self {
            title: ctx.name.clone(),
            name: ctx.name.clone(),
            tagline: ctx.tagline.clone(),
        }
    }
}

impl Page for HomePage {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&self) -> String {
        format!(
            concat!(
                "<section class=\"hero\">",
                "<h1>{}</h1>",
                "<p class=\"tagline\">{}</p>",
                "<a class=\"cta\" href=\"/gallery\">View the gallery</a>",
                "</section>"
            ),
            escape(&self.name),
            escape(&self.tagline)
        )
    }
}

/// Biography page.
#[derive(Debug, Clone)]
pub struct AboutPage {
    title: String,
    name: String,
}

impl AboutPage {
    pub fn new(ctx: &SiteContext) -> Self {
        Self {
            title: format!("About | {}", ctx.name),
            name: ctx.name.clone(),
        }
    }
}

impl Page for AboutPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&self) -> String {
        format!(
            concat!(
                "<section class=\"about\">",
                "<h1>About</h1>",
                "<p>{} builds things for the web and photographs the places in between.</p>",
                "</section>"
            ),
            escape(&self.name)
        )
    }
}

/// Contact details page.
#[derive(Debug, Clone)]
pub struct ContactPage {
    title: String,
    email: String,
}

impl ContactPage {
    pub fn new(ctx: &SiteContext) -> Self {
        Self {
            title: format!("Contact | {}", ctx.name),
            email: ctx.email.clone(),
        }
    }
}

impl Page for ContactPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&self) -> String {
        let email = escape(&self.email);
        format!(
            concat!(
                "<section class=\"contact\">",
                "<h1>Contact</h1>",
                "<p>Write to <a href=\"mailto:{email}\">{email}</a>.</p>",
                "</section>"
            ),
            email = email
        )
    }
}

/// Terminal page for paths no route declares.
#[derive(Debug, Clone, Default)]
pub struct NotFoundPage;

impl Page for NotFoundPage {
    fn title(&self) -> &str {
        "Page not found"
    }

    fn render(&self) -> String {
        concat!(
            "<section class=\"not-found\">",
            "<h1>404</h1>",
            "<p>There is nothing at this address.</p>",
            "<a href=\"/\">Back home</a>",
            "</section>"
        )
        .to_string()
    }
}

/// View rendered by the error boundary when a page module fails to load.
///
/// Offers a manual reload of the failed route and a link home. There is no
/// automatic retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    message: String,
    reload_href: String,
}

impl ErrorView {
    /// Query parameter that asks the router to drop a memoized failure.
    pub const RELOAD_PARAM: &'static str = "reload";

    /// Create an error view for a failure at `path`.
    pub fn new(message: impl Into<String>, path: &str) -> Self {
        Self {
            message: message.into(),
            reload_href: format!("{}?{}=1", path, Self::RELOAD_PARAM),
        }
    }

    /// The failure message shown to the visitor.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Link target of the reload action.
    pub fn reload_href(&self) -> &str {
        &self.reload_href
    }
}

impl Page for ErrorView {
    fn title(&self) -> &str {
        "Something went wrong"
    }

    fn render(&self) -> String {
        format!(
            concat!(
                "<section class=\"error\" role=\"alert\">",
                "<h1>Something went wrong</h1>",
                "<p>{}</p>",
                "<a class=\"reload\" href=\"{}\">Reload</a> ",
                "<a href=\"/\">Go home</a>",
                "</section>"
            ),
            escape(&self.message),
            escape(&self.reload_href)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SiteContext {
        SiteContext {
            name: "Sam <Dev>".to_string(),
            tagline: "Photos & code".to_string(),
            email: "sam@example.com".to_string(),
            public_dir: "public".into(),
        }
    }

    #[test]
    fn test_home_page_escapes_context() {
        let page = HomePage::new(&context());
        let html = page.render();
        assert!(html.contains("Sam &lt;Dev&gt;"));
        assert!(html.contains("Photos &amp; code"));
    }

    #[test]
    fn test_contact_page_links_email() {
        let page = ContactPage::new(&context());
        assert!(page.render().contains("mailto:sam@example.com"));
        assert_eq!(page.title(), "Contact | Sam <Dev>");
    }

    #[test]
    fn test_error_view_offers_reload_and_home() {
        let view = ErrorView::new("chunk fetch failed", "/gallery");
        let html = view.render();
        assert_eq!(view.reload_href(), "/gallery?reload=1");
        assert!(html.contains("chunk fetch failed"));
        assert!(html.contains("href=\"/gallery?reload=1\""));
        assert!(html.contains("href=\"/\""));
    }
}
