//! Typed column values and result rows.
//!
//! [`SqlValue`] is what the executor hands back for each column; a
//! [`Record`] keeps the columns of one row in result order.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tokio_postgres::types::{Date, FromSql, Kind, Timestamp, Type};
use uuid::Uuid;

use crate::error::{SnapError, SnapResult};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    /// Finite NUMERIC too wide for [`Decimal`], as exact decimal text.
    BigNumeric(String),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(serde_json::Value),
    Array(Vec<SqlValue>),
    /// `NaN` or `±infinity` of a type with no native representation here,
    /// e.g. `{ type_name: "date", text: "-infinity" }`.
    NonFinite {
        type_name: &'static str,
        text: &'static str,
    },
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "boolean",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Numeric(_) | SqlValue::BigNumeric(_) => "numeric",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Date(_) => "date",
            SqlValue::Time(_) => "time",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamptz",
            SqlValue::Json(_) => "json",
            SqlValue::Array(_) => "array",
            SqlValue::NonFinite { .. } => "non-finite",
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    SqlValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    f32 => Float,
    f64 => Float,
    Decimal => Numeric,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    serde_json::Value => Json,
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// One result row: column names in result order with their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column. A repeated name replaces the earlier value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode every column of a `tokio_postgres::Row`.
    pub fn from_row(row: &Row) -> SnapResult<Self> {
        let mut record = Record::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let value = decode_column(row, idx, column.name(), column.type_())?;
            record.insert(column.name(), value);
        }
        Ok(record)
    }
}

impl FromIterator<(String, SqlValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

fn get<'a, T>(row: &'a Row, idx: usize, column: &str) -> SnapResult<Option<T>>
where
    T: FromSql<'a>,
{
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| SnapError::decode(column, e.to_string()))
}

fn scalar<'a, T>(row: &'a Row, idx: usize, column: &str) -> SnapResult<SqlValue>
where
    T: FromSql<'a> + Into<SqlValue>,
{
    Ok(get::<T>(row, idx, column)?.into())
}

fn array<'a, T>(row: &'a Row, idx: usize, column: &str) -> SnapResult<SqlValue>
where
    T: FromSql<'a> + Into<SqlValue>,
{
    Ok(match get::<Vec<Option<T>>>(row, idx, column)? {
        Some(items) => SqlValue::Array(items.into_iter().map(SqlValue::from).collect()),
        None => SqlValue::Null,
    })
}

/// Text-format fallback for enums and other string-shaped types.
struct RawText(String);

impl<'a> FromSql<'a> for RawText {
    fn from_sql(
        _ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(RawText(std::str::from_utf8(raw)?.to_owned()))
    }

    fn accepts(ty: &Type) -> bool {
        <String as FromSql>::accepts(ty) || matches!(ty.kind(), Kind::Enum(_))
    }
}

impl From<RawText> for SqlValue {
    fn from(v: RawText) -> Self {
        SqlValue::Text(v.0)
    }
}

/// NUMERIC in binary format, keeping values [`Decimal`] cannot hold.
#[derive(Debug, Clone, PartialEq)]
enum PgNumeric {
    Finite(Decimal),
    Wide(String),
    NaN,
    PosInfinity,
    NegInfinity,
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

impl<'a> FromSql<'a> for PgNumeric {
    fn from_sql(
        ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        let word = |at: usize| -> Result<[u8; 2], Box<dyn std::error::Error + Sync + Send>> {
            raw.get(at..at + 2)
                .and_then(|b| b.try_into().ok())
                .ok_or_else(|| "truncated numeric value".into())
        };
        let ndigits = usize::from(u16::from_be_bytes(word(0)?));
        let weight = i16::from_be_bytes(word(2)?);
        let sign = u16::from_be_bytes(word(4)?);
        let dscale = u16::from_be_bytes(word(6)?);

        match sign {
            NUMERIC_NAN => return Ok(PgNumeric::NaN),
            NUMERIC_PINF => return Ok(PgNumeric::PosInfinity),
            NUMERIC_NINF => return Ok(PgNumeric::NegInfinity),
            NUMERIC_POS | NUMERIC_NEG => {}
            other => return Err(format!("invalid numeric sign 0x{other:04x}").into()),
        }

        if let Ok(d) = Decimal::from_sql(ty, raw) {
            return Ok(PgNumeric::Finite(d));
        }

        let digits = (0..ndigits)
            .map(|i| word(8 + 2 * i).map(i16::from_be_bytes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PgNumeric::Wide(numeric_text(
            weight,
            sign == NUMERIC_NEG,
            dscale,
            &digits,
        )))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

impl From<PgNumeric> for SqlValue {
    fn from(v: PgNumeric) -> Self {
        let non_finite = |text| SqlValue::NonFinite {
            type_name: "numeric",
            text,
        };
        match v {
            PgNumeric::Finite(d) => SqlValue::Numeric(d),
            PgNumeric::Wide(text) => SqlValue::BigNumeric(text),
            PgNumeric::NaN => non_finite("NaN"),
            PgNumeric::PosInfinity => non_finite("Infinity"),
            PgNumeric::NegInfinity => non_finite("-Infinity"),
        }
    }
}

/// Decimal text of a NUMERIC from its base-10000 digits.
///
/// `digits[i]` carries weight `weight - i`; `dscale` is the number of
/// fractional decimal digits to print.
fn numeric_text(weight: i16, negative: bool, dscale: u16, digits: &[i16]) -> String {
    let digit = |i: i32| {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i))
            .copied()
            .unwrap_or(0)
    };
    let weight = i32::from(weight);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        let _ = write!(out, "{}", digit(0));
        for i in 1..=weight {
            let _ = write!(out, "{:04}", digit(i));
        }
    }

    let scale = usize::from(dscale);
    if scale > 0 {
        let mut frac = String::with_capacity(scale + 4);
        let mut i = weight + 1;
        while frac.len() < scale {
            let _ = write!(frac, "{:04}", digit(i));
            i += 1;
        }
        frac.truncate(scale);
        out.push('.');
        out.push_str(&frac);
    }
    out
}

fn date_value<T: Into<SqlValue>>(v: Option<Date<T>>, type_name: &'static str) -> SqlValue {
    match v {
        Some(Date::Value(d)) => d.into(),
        Some(Date::PosInfinity) => SqlValue::NonFinite {
            type_name,
            text: "infinity",
        },
        Some(Date::NegInfinity) => SqlValue::NonFinite {
            type_name,
            text: "-infinity",
        },
        None => SqlValue::Null,
    }
}

fn timestamp_value<T: Into<SqlValue>>(
    v: Option<Timestamp<T>>,
    type_name: &'static str,
) -> SqlValue {
    match v {
        Some(Timestamp::Value(ts)) => ts.into(),
        Some(Timestamp::PosInfinity) => SqlValue::NonFinite {
            type_name,
            text: "infinity",
        },
        Some(Timestamp::NegInfinity) => SqlValue::NonFinite {
            type_name,
            text: "-infinity",
        },
        None => SqlValue::Null,
    }
}

fn decode_column(row: &Row, idx: usize, column: &str, ty: &Type) -> SnapResult<SqlValue> {
    match *ty {
        Type::BOOL => scalar::<bool>(row, idx, column),
        Type::INT2 => scalar::<i16>(row, idx, column),
        Type::INT4 => scalar::<i32>(row, idx, column),
        Type::INT8 => scalar::<i64>(row, idx, column),
        Type::OID => Ok(get::<u32>(row, idx, column)?.map(i64::from).into()),
        Type::FLOAT4 => scalar::<f32>(row, idx, column),
        Type::FLOAT8 => scalar::<f64>(row, idx, column),
        Type::NUMERIC => scalar::<PgNumeric>(row, idx, column),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            scalar::<String>(row, idx, column)
        }
        Type::BYTEA => scalar::<Vec<u8>>(row, idx, column),
        Type::UUID => scalar::<Uuid>(row, idx, column),
        Type::DATE => Ok(date_value(get::<Date<NaiveDate>>(row, idx, column)?, "date")),
        Type::TIME => scalar::<NaiveTime>(row, idx, column),
        Type::TIMESTAMP => Ok(timestamp_value(
            get::<Timestamp<NaiveDateTime>>(row, idx, column)?,
            "timestamp",
        )),
        Type::TIMESTAMPTZ => Ok(timestamp_value(
            get::<Timestamp<DateTime<Utc>>>(row, idx, column)?,
            "timestamptz",
        )),
        Type::JSON | Type::JSONB => scalar::<serde_json::Value>(row, idx, column),
        Type::BOOL_ARRAY => array::<bool>(row, idx, column),
        Type::INT2_ARRAY => array::<i16>(row, idx, column),
        Type::INT4_ARRAY => array::<i32>(row, idx, column),
        Type::INT8_ARRAY => array::<i64>(row, idx, column),
        Type::FLOAT4_ARRAY => array::<f32>(row, idx, column),
        Type::FLOAT8_ARRAY => array::<f64>(row, idx, column),
        Type::NUMERIC_ARRAY => array::<PgNumeric>(row, idx, column),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY => {
            array::<String>(row, idx, column)
        }
        Type::UUID_ARRAY => array::<Uuid>(row, idx, column),
        Type::DATE_ARRAY => array::<NaiveDate>(row, idx, column),
        Type::TIMESTAMP_ARRAY => array::<NaiveDateTime>(row, idx, column),
        Type::TIMESTAMPTZ_ARRAY => array::<DateTime<Utc>>(row, idx, column),
        Type::JSONB_ARRAY => array::<serde_json::Value>(row, idx, column),
        _ if <RawText as FromSql>::accepts(ty) => scalar::<RawText>(row, idx, column),
        _ => Err(SnapError::UnsupportedType {
            column: column.to_string(),
            type_name: ty.name().to_string(),
        }),
    }
}
