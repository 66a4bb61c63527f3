use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::records;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecordRow {
    pub key: String,
    pub value: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = records)]
pub struct NewRecordRow<'a> {
    pub key: &'a str,
    pub value: String,
    pub updated_at: NaiveDateTime,
}
