use super::ui;
use crate::core::analytics::{self, SeriesSummary};
use crate::pipeline::RateFetch;
use anyhow::Result;
use comfy_table::Cell;

impl SeriesSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

        table.add_row(vec![Cell::new("Latest"), ui::rate_cell(self.latest)]);
        table.add_row(vec![
            Cell::new("As of"),
            Cell::new(self.latest_date.format("%Y-%m-%d")),
        ]);
        table.add_row(vec![
            Cell::new("Daily change"),
            ui::format_optional_cell(self.change, ui::change_cell),
        ]);
        table.add_row(vec![Cell::new("Mean"), ui::rate_cell(self.mean)]);
        table.add_row(vec![Cell::new("Min"), ui::rate_cell(self.min)]);
        table.add_row(vec![Cell::new("Max"), ui::rate_cell(self.max)]);
        table.add_row(vec![Cell::new("Observations"), Cell::new(self.count)]);

        table.to_string()
    }
}

pub fn run(fetch: &RateFetch) -> Result<()> {
    super::print_fetch_warnings(fetch);

    println!(
        "{} from {}\n",
        ui::style_text("TRM summary", ui::StyleType::Title),
        ui::source_label(fetch.source_kind())
    );
    match analytics::summarize(&fetch.series) {
        Some(summary) => println!("{}", summary.display_as_table()),
        None => println!("{}", ui::style_text("No observations", ui::StyleType::Subtle)),
    }
    Ok(())
}
