//! Chart generation and rendering for the dashboard.
//!
//! The expenses chart is a bar chart with one bar per expense, labelled with
//! the expense's category. It is generated as JSON configuration for the
//! ECharts library on every request and rendered with its HTML container and
//! JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{expense::Expense, html::HeadElement};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl DashboardChart {
    /// The chart of `expenses` in the order they were added.
    pub(super) fn expenses(expenses: &[Expense]) -> Self {
        Self {
            id: "expenses-chart",
            options: expenses_chart(expenses).to_string(),
        }
    }
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing. ECharts 5 has no way to switch the theme of a live
/// chart, so the chart is created again when the colour scheme changes.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const option = {};
                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    let chart = null;

                    const render = () => {{
                        if (chart) {{
                            chart.dispose();
                        }}
                        chart = echarts.init(chartDom, darkModeMediaQuery.matches ? 'dark' : null);
                        chart.setOption(option);
                    }};

                    window.addEventListener('resize', () => chart.resize());
                    darkModeMediaQuery.addEventListener('change', render);
                    render();
                }})();"#,
                chart.id,
                escape_script_text(&chart.options)
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

/// Stop user entered text in the chart options from closing the script element
/// or switching the HTML parser into its escaped script state.
fn escape_script_text(options: &str) -> String {
    options.replace("</", "<\\/").replace("<!--", "<\\!--")
}

pub(super) fn expenses_chart(expenses: &[Expense]) -> Chart {
    let labels: Vec<String> = expenses
        .iter()
        .map(|expense| expense.category.clone())
        .collect();
    let values: Vec<f64> = expenses.iter().map(|expense| expense.amount).collect();

    Chart::new()
        .title(Title::new().text("Expenses").subtext("By category"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Amount").data(values))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return currencyFormatter.format(number);",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use maud::PreEscaped;

    use crate::{auth::UserID, expense::Expense, html::HeadElement};

    use super::{DashboardChart, charts_script, escape_script_text, expenses_chart};

    fn expense(id: i64, title: &str, amount: f64, category: &str) -> Expense {
        Expense {
            id,
            title: title.to_owned(),
            amount,
            category: category.to_owned(),
            user_id: UserID::new(1),
        }
    }

    /// Charts with a single axis or series may serialize it as an object or a one element list.
    fn first(value: &serde_json::Value) -> &serde_json::Value {
        if value.is_array() { &value[0] } else { value }
    }

    #[test]
    fn chart_has_one_bar_per_expense() {
        let expenses = [
            expense(1, "Coffee", 3.5, "Food"),
            expense(2, "Bagel", 4.25, "Food"),
            expense(3, "Bus", 2.0, "Transport"),
        ];

        let options = serde_json::to_value(expenses_chart(&expenses)).unwrap();

        assert_eq!(
            first(&options["xAxis"])["data"],
            serde_json::json!(["Food", "Food", "Transport"])
        );
        let series = first(&options["series"]);
        assert_eq!(series["type"], "bar");
        let amounts: Vec<f64> = series["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|value| value.as_f64().unwrap())
            .collect();
        assert_eq!(amounts, vec![3.5, 4.25, 2.0]);
    }

    #[test]
    fn script_cannot_be_closed_by_category() {
        let expenses = [expense(1, "Sneaky", 1.0, "</script><script>alert(1)")];
        let chart = DashboardChart::expenses(&expenses);

        let HeadElement::ScriptSource(PreEscaped(script)) = charts_script(&[chart]) else {
            panic!("want script source");
        };

        assert!(!script.contains("</script>"));
        assert!(script.contains("expenses-chart"));
    }

    #[test]
    fn script_cannot_enter_escaped_state() {
        let expenses = [expense(1, "Sneaky", 1.0, "<!--<script>")];
        let chart = DashboardChart::expenses(&expenses);

        let HeadElement::ScriptSource(PreEscaped(script)) = charts_script(&[chart]) else {
            panic!("want script source");
        };

        assert!(!script.contains("<!--"));
        assert!(script.contains(r"<\!--<script>"));
    }

    #[test]
    fn escape_only_changes_html_markup_sequences() {
        assert_eq!(escape_script_text(r#"{"data":["Food"]}"#), r#"{"data":["Food"]}"#);
        assert_eq!(escape_script_text("a</b<!--c"), r"a<\/b<\!--c");
    }
}
