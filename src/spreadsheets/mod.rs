pub mod export_csv;
pub mod export_xlsx;

pub use export_csv::campaign_csv;
pub use export_xlsx::export_campaign_xlsx;
