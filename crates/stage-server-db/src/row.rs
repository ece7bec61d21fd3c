// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column decoding shared by the repositories. Ids are UUID text, timestamps
//! RFC 3339 text, dates `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{DbError, Result};

/// Fixed-width encoding so lexical order matches chronological order.
pub(crate) fn timestamp(value: DateTime<Utc>) -> String {
	value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parse_opt_timestamp(value: Option<String>, column: &str) -> Result<Option<DateTime<Utc>>> {
	value.map(|s| parse_timestamp(&s, column)).transpose()
}

pub(crate) fn parse_date(value: &str, column: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(value, "%Y-%m-%d")
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

/// Ids and the string-backed enums all parse through `FromStr`.
pub(crate) fn parse<T>(value: &str, column: &str) -> Result<T>
where
	T: FromStr,
	T::Err: Display,
{
	value
		.parse()
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parse_opt<T>(value: Option<String>, column: &str) -> Result<Option<T>>
where
	T: FromStr,
	T::Err: Display,
{
	value.map(|s| parse(&s, column)).transpose()
}
