use crate::error::Result;
use crate::model::InsightsReport;
use minijinja::{context, Environment};

const TEMPLATE_NAME: &str = "report.html";
const TEMPLATE_HTML: &str = include_str!("template.html");

/// Self-contained HTML page; the `.html` template name turns on auto-escaping.
pub(super) fn render(report: &InsightsReport) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE_HTML)?;

    let trend_max = report
        .insights
        .trend
        .points
        .iter()
        .map(|p| p.commits)
        .max()
        .unwrap_or(0);
    let contributor_max = report
        .insights
        .contributors
        .first()
        .map(|c| c.commits)
        .unwrap_or(0);

    let html = env.get_template(TEMPLATE_NAME)?.render(context! {
        report => report,
        insights => &report.insights,
        generated_at => report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        trend_max => trend_max,
        contributor_max => contributor_max,
    })?;
    Ok(html)
}
