pub mod keywords;
pub mod normalize;
pub mod record;
pub mod schema;

pub use keywords::{KeywordError, KeywordTable};
pub use normalize::{normalize_jurisdiction, parse_intro_date, split_themes};
pub use record::{BillRecord, BillStatus, FEDERAL_JURISDICTION, UNKNOWN_JURISDICTION};
pub use schema::tables;
