//! Chart generation for the spending breakdown.
//!
//! The pie chart is generated as JSON configuration for the ECharts library
//! and rendered with a corresponding HTML container and JavaScript
//! initialization code.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::PreEscaped;

use crate::html::HeadElement;

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct LedgerChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for the given charts.
///
/// Creates a script that initializes ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn chart_script(charts: &[LedgerChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Builds the pie chart of spending per category.
///
/// `category_totals` should be sorted by total in descending order so the
/// largest slice starts at the top of the pie.
pub(super) fn spending_breakdown_chart(category_totals: &[(String, f64)]) -> Chart {
    let data: Vec<(f64, &str)> = category_totals
        .iter()
        .map(|(category, total)| (*total, category.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Spending breakdown")
                .subtext("Filtered expenses, by category"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().left("left").top("bottom"))
        .series(Pie::new().name("Spending").radius("65%").data(data))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
