//! Routes command - print the route table.

use console::style;

use folio::pages::SiteContext;
use folio::routes::site_routes;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Print every route in resolution order.
pub fn run() -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    let table = site_routes(SiteContext::from_config(runner.config()))?;

    println!("Route Table");
    println!("===========");
    println!();
    println!("  {:<4} {:<12} {:<12} {:<12} {}", "#", "PATTERN", "ROUTE", "LABEL", "MATCH");

    for (position, entry) in table.entries().iter().enumerate() {
        let matching = if entry.pattern().is_catch_all() {
            "fallback"
        } else if entry.is_exact() {
            "exact"
        } else {
            "literal"
        };
        println!(
            "  {:<4} {:<12} {:<12} {:<12} {}",
            position + 1,
            entry.pattern().as_str(),
            entry.id(),
            entry.label(),
            style(matching).dim()
        );
    }

    Ok(())
}
