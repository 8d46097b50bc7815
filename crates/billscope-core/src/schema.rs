/// Arrow schema definitions for bill data and derived statistics tables.
pub mod tables {
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn utf8_list(name: &str) -> Field {
        Field::new(
            name,
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            false,
        )
    }

    /// Schema for normalised bill records.
    pub fn bill_schema() -> Schema {
        Schema::new(vec![
            Field::new("identifier", DataType::Utf8, false),
            Field::new("jurisdiction", DataType::Utf8, false),
            Field::new("status", DataType::Utf8, false),
            Field::new("status_raw", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("description", DataType::Utf8, false),
            utf8_list("themes"),
            Field::new("introduced_date", DataType::Date32, true),
        ])
    }

    /// Schema for per-jurisdiction provision scores.
    pub fn jurisdiction_score_schema() -> Schema {
        Schema::new(vec![
            Field::new("jurisdiction", DataType::Utf8, false),
            Field::new("bill_count", DataType::UInt64, false),
            Field::new("score", DataType::UInt32, false),
            Field::new("tier", DataType::Utf8, false),
            utf8_list("provisions_present"),
        ])
    }

    /// Schema for the per-provision consensus table.
    pub fn provision_consensus_schema() -> Schema {
        Schema::new(vec![
            Field::new("provision", DataType::Utf8, false),
            Field::new("adopting_jurisdictions", DataType::UInt64, false),
            Field::new("total_jurisdictions", DataType::UInt64, false),
            Field::new("adoption_rate", DataType::Float64, false),
            Field::new("consensus_level", DataType::Utf8, false),
        ])
    }
}
