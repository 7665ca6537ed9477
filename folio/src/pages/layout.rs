//! Document shell wrapped around page fragments.

use super::html::escape;
use super::Page;

/// One entry of the site navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    pub active: bool,
}

/// Render a full HTML document around `page`.
///
/// Navigation links carry `data-preload` so the client can attach a
/// visibility preload trigger to each of them.
pub fn render_document(site_name: &str, nav: &[NavLink], page: &dyn Page) -> String {
    let mut links = String::new();
    for link in nav {
        let current = if link.active {
            " aria-current=\"page\""
        } else {
            ""
        };
        links.push_str(&format!(
            "<a href=\"{href}\" data-preload=\"{href}\"{current}>{label}</a>",
            href = escape(&link.href),
            current = current,
            label = escape(&link.label)
        ));
    }

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">",
            "<head>",
            "<meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{title}</title>",
            "<link rel=\"icon\" href=\"/favicon.ico\" sizes=\"any\">",
            "<link rel=\"apple-touch-icon\" href=\"/apple-touch-icon.png\">",
            "<link rel=\"manifest\" href=\"/site.webmanifest\">",
            "</head>",
            "<body>",
            "<header><a class=\"brand\" href=\"/\">{site}</a><nav>{links}</nav></header>",
            "<main>{body}</main>",
            "</body>",
            "</html>\n"
        ),
        title = escape(page.title()),
        site = escape(site_name),
        links = links,
        body = page.render()
    )
}
