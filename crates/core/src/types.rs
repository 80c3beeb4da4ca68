/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (appraisal period bounds) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Ratings are stored as SMALLINT on a 1-5 scale.
pub type Rating = i16;
