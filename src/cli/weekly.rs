use super::ui;
use crate::core::analytics::{self, WeeklyCandle};
use crate::pipeline::RateFetch;
use anyhow::Result;
use comfy_table::Cell;

fn candles_table(candles: &[WeeklyCandle]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Week ending"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Close"),
        ui::header_cell("Change"),
    ]);

    for candle in candles {
        table.add_row(vec![
            Cell::new(candle.week_ending.format("%Y-%m-%d")),
            ui::rate_cell(candle.open),
            ui::rate_cell(candle.high),
            ui::rate_cell(candle.low),
            ui::rate_cell(candle.close),
            ui::change_cell(candle.close - candle.open),
        ]);
    }
    table.to_string()
}

pub fn run(fetch: &RateFetch) -> Result<()> {
    super::print_fetch_warnings(fetch);

    println!(
        "{} from {}\n",
        ui::style_text("Weekly TRM", ui::StyleType::Title),
        ui::source_label(fetch.source_kind())
    );
    println!("{}", candles_table(&analytics::weekly_ohlc(&fetch.series)));
    Ok(())
}
