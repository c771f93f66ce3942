pub mod central_bank;
pub mod open_data;
pub mod sample;
pub mod scraping;
pub mod util;
