//! Tour document model

use serde_json::json;

use crate::store::{ElementKind, FieldRule, InMemoryStore, Schema};

/// Allowed `difficulty` values
pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "difficult"];

/// `limit` injected by the top-tours alias
pub const TOP_TOURS_LIMIT: &str = "5";

/// `sort` injected by the top-tours alias
pub const TOP_TOURS_SORT: &str = "-ratingsAverage,price";

/// `fields` injected by the top-tours alias
pub const TOP_TOURS_FIELDS: &str = "name,price,ratingsAverage,summary,difficulty";

/// Schema checked on every tour write
pub fn tour_schema() -> Schema {
    Schema::new()
        .field(FieldRule::string("name").required())
        .field(FieldRule::number("duration"))
        .field(FieldRule::number("maxGroupSize"))
        .field(FieldRule::string("difficulty").one_of(&DIFFICULTIES))
        .field(
            FieldRule::number("ratingsAverage")
                .range(1.0, 5.0)
                .default_value(json!(4.5)),
        )
        .field(FieldRule::number("ratingsQuantity").default_value(json!(0)))
        .field(FieldRule::number("price").required())
        .field(FieldRule::string("summary"))
        .field(FieldRule::string("description"))
        .field(FieldRule::string("imageCover"))
        .field(FieldRule::array_of("images", ElementKind::String))
        .field(FieldRule::array_of("startDates", ElementKind::Date))
}

/// Empty tour collection
pub fn tour_store() -> InMemoryStore {
    InMemoryStore::with_schema(tour_schema())
}
