mod csv_import;
mod json;

pub(crate) use csv_import::CsvImporter;
pub(crate) use json::RestorePayload;
