/// Number of facility types returned in the statistics top list
pub const TOP_FACILITIES_LIMIT: i64 = 10;
