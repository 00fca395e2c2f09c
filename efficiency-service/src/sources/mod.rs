pub mod calculation_ndjson_file;
pub mod period_csv_file;

pub use calculation_ndjson_file::CalculationNdjsonFileSource;
pub use period_csv_file::PeriodCsvFileSource;
