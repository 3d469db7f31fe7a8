use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::FromSql;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::ToSql;
use diesel::sql_types::Timestamp;
use diesel::{AsExpression, FromSqlRow};

/// Helper struct to store a UTC timestamp in a `TIMESTAMP` (without time zone) column. This
/// struct implements `ToSql<Timestamp, Pg>` and `FromSql<Timestamp, Pg>`.
///
/// We don't use `TIMESTAMPTZ` for reservation times, because `timestamptz + interval` is not
/// immutable in PostgreSQL and thus cannot be used in the exclusion constraint's range
/// expression. By convention, all stored timestamps are UTC.
#[derive(Debug, AsExpression, FromSqlRow)]
#[diesel(sql_type=Timestamp)]
pub struct UtcTimestampWrapper(NaiveDateTime);

impl ToSql<Timestamp, Pg> for UtcTimestampWrapper {
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, Pg>,
    ) -> diesel::serialize::Result {
        <NaiveDateTime as ToSql<Timestamp, Pg>>::to_sql(&self.0, out)
    }
}

impl FromSql<Timestamp, Pg> for UtcTimestampWrapper {
    fn from_sql(bytes: PgValue<'_>) -> diesel::deserialize::Result<Self> {
        Ok(Self(<NaiveDateTime as FromSql<Timestamp, Pg>>::from_sql(
            bytes,
        )?))
    }
}

impl From<UtcTimestampWrapper> for DateTime<Utc> {
    fn from(value: UtcTimestampWrapper) -> Self {
        value.0.and_utc()
    }
}

impl From<DateTime<Utc>> for UtcTimestampWrapper {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.naive_utc())
    }
}
