//! Table views for dashboard data display.

use maud::{Markup, html};

use crate::{
    expense::Expense,
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
};

/// Renders a table with one row per expense, in the order they were added.
pub(super) fn expenses_table(expenses: &[Expense]) -> Markup {
    html! {
        div class="w-full" {
            h3 class="text-xl font-semibold mb-4" { "Expenses" }

            div class="overflow-x-auto rounded-lg shadow" {
                table id="expenses" class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        }
                    }

                    tbody {
                        @for expense in expenses {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (expense.title) }
                                td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(expense.amount)) }
                                td class=(TABLE_CELL_STYLE) { (expense.category) }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{auth::UserID, expense::Expense};

    use super::expenses_table;

    #[test]
    fn renders_one_row_per_expense() {
        let expenses = [
            Expense {
                id: 1,
                title: "Coffee".to_owned(),
                amount: 3.5,
                category: "Food".to_owned(),
                user_id: UserID::new(1),
            },
            Expense {
                id: 2,
                title: "<b>Bus</b>".to_owned(),
                amount: 2.0,
                category: "Transport".to_owned(),
                user_id: UserID::new(1),
            },
        ];

        let html = Html::parse_fragment(&expenses_table(&expenses).into_string());

        let row_selector = Selector::parse("tbody tr").unwrap();
        let cell_selector = Selector::parse("td").unwrap();
        let rows: Vec<Vec<String>> = html
            .select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| cell.text().collect::<String>())
                    .collect()
            })
            .collect();

        assert_eq!(
            rows,
            vec![
                vec!["Coffee", "$3.50", "Food"],
                vec!["<b>Bus</b>", "$2.00", "Transport"],
            ]
        );
    }
}
