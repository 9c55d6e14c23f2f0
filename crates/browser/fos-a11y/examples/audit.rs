//! Example: Audit a small component page

use fos_a11y::{AuditConfig, Auditor, WcagLevel};
use fos_css::InlineStyleSource;
use fos_dom::{Document, ShadowRootInit};

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG=fos_a11y=debug for scan progress)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut doc = Document::new("https://example.com/");
    let body = doc.body();
    let tree = doc.tree_mut();
    tree.set_attribute(body, "style", "background-color: #fafafa")?;

    let heading = tree.append_element(body, "h1")?;
    tree.set_attribute(heading, "style", "color: #888; font-size: 2em")?;
    tree.append_text(heading, "Welcome")?;

    let card = tree.append_element(body, "x-card")?;
    let shadow = tree.attach_shadow(card, ShadowRootInit::open())?;
    tree.append_element(shadow, "img")?;
    let caption = tree.append_element(shadow, "p")?;
    tree.set_attribute(caption, "style", "color: rgba(0, 0, 0, 0.4)")?;
    tree.append_text(caption, "Photo of the team")?;

    let config = AuditConfig { level: WcagLevel::Aa, ..AuditConfig::default() };
    let auditor = Auditor::with_default_rules(config);
    let styles = InlineStyleSource::new();

    let report = smol::block_on(auditor.request_idle_scan(doc.tree(), &styles, None, None))?;

    println!("{} violations", report.violations.len());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
