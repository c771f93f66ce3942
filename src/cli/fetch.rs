use super::ui;
use crate::pipeline::RateFetch;
use anyhow::Result;
use comfy_table::Cell;

impl RateFetch {
    /// Daily TRM table with the source in the title.
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Date"), ui::header_cell("TRM (COP/USD)")]);

        for observation in self.series.observations() {
            table.add_row(vec![
                Cell::new(observation.date.format("%Y-%m-%d")),
                ui::rate_cell(observation.rate),
            ]);
        }

        let mut output = format!(
            "{} from {}\n\n",
            ui::style_text("TRM", ui::StyleType::Title),
            ui::source_label(self.source_kind())
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Observations", ui::StyleType::Label),
            self.series.len()
        ));
        output
    }
}

pub fn run(fetch: &RateFetch) -> Result<()> {
    super::print_fetch_warnings(fetch);
    println!("{}", fetch.display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core::{RateSeries, SourceKind};
    use crate::pipeline::RateFetch;
    use chrono::NaiveDate;

    #[test]
    fn test_table_lists_every_observation() {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let fetch = RateFetch {
            series: RateSeries::from_points(
                SourceKind::OpenData,
                vec![(date("2024-01-02"), 3822.05), (date("2024-01-03"), 3875.61)],
            )
            .unwrap(),
            warnings: vec![],
        };

        let output = fetch.display_as_table();
        assert!(output.contains("2024-01-02"));
        assert!(output.contains("3875.61"));
        assert!(output.contains("open data"));
    }
}
