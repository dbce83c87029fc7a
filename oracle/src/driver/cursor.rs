//! Format-style placeholder cursor.
//!
//! Statements are written with `%s` (positional) or `%(name)s` (named)
//! placeholders and `%%` for a literal percent sign. Oracle wants `:name`
//! bind variables, so each placeholder is rewritten before execution.
//!
//! ```text
//! SELECT * FROM t WHERE a = %s AND b = %s AND c = %s     ["x", 1, "x"]
//! SELECT * FROM t WHERE a = :arg0 AND b = :arg1 AND c = :arg0
//! ```

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::{Binds, Cell, ColumnDescription, DbType, DriverCursor, InputSizes, RawCell};
use crate::error::{DriverErrorKind, OracleError, OracleResult, wrap_oracle_errors};
use crate::types::{OracleParam, Param};

/// Parameters for one execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Positional(Vec<Param>),
    Named(BTreeMap<String, Param>),
}

impl Params {
    pub fn positional<I, P>(values: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn named<I, K, P>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Param>,
    {
        Params::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parameters after conversion, before they become driver binds.
#[derive(Debug, Clone, PartialEq)]
enum Formatted {
    Positional(Vec<OracleParam>),
    Named(BTreeMap<String, OracleParam>),
}

impl Formatted {
    fn new(params: &Params, use_tz: bool) -> Self {
        match params {
            Params::Positional(values) => Formatted::Positional(
                values.iter().map(|p| OracleParam::new(p, use_tz)).collect(),
            ),
            Params::Named(values) => Formatted::Named(
                values
                    .iter()
                    .map(|(k, p)| (k.clone(), OracleParam::new(p, use_tz)))
                    .collect(),
            ),
        }
    }

    fn same_shape(&self, other: &Formatted) -> bool {
        match (self, other) {
            (Formatted::Positional(a), Formatted::Positional(b)) => a.len() == b.len(),
            (Formatted::Named(a), Formatted::Named(b)) => a.keys().eq(b.keys()),
            _ => false,
        }
    }

    fn into_binds(self) -> Binds {
        match self {
            Formatted::Positional(values) => {
                Binds::Positional(values.into_iter().map(|p| p.value).collect())
            }
            Formatted::Named(values) => {
                Binds::Named(values.into_iter().map(|(k, p)| (k, p.value)).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Placeholder<'a> {
    Positional(usize),
    Named(&'a str),
}

/// Rewrite every placeholder of `sql` to `:` plus the name `bind` returns.
fn rewrite_placeholders<'a>(
    sql: &'a str,
    mut bind: impl FnMut(Placeholder<'a>) -> OracleResult<String>,
) -> OracleResult<String> {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    let mut position = 0;

    while let Some(i) = rest.find('%') {
        out.push_str(&rest[..i]);
        let tail = &rest[i + 1..];
        rest = if let Some(after) = tail.strip_prefix('%') {
            out.push('%');
            after
        } else if let Some(after) = tail.strip_prefix('s') {
            out.push(':');
            out.push_str(&bind(Placeholder::Positional(position))?);
            position += 1;
            after
        } else if let Some(after) = tail.strip_prefix('(') {
            let close = after.find(")s").ok_or_else(|| {
                OracleError::params(format!("unterminated named placeholder in '{}'", sql))
            })?;
            out.push(':');
            out.push_str(&bind(Placeholder::Named(&after[..close]))?);
            &after[close + 2..]
        } else {
            return Err(OracleError::params(format!(
                "unsupported format character after '%' at byte {}",
                sql.len() - rest.len() + i
            )));
        };
    }
    out.push_str(rest);
    Ok(out)
}

/// Drop one trailing `;` or `/`, which Oracle rejects in a single statement.
fn strip_terminator(sql: &str) -> &str {
    sql.strip_suffix(';')
        .or_else(|| sql.strip_suffix('/'))
        .unwrap_or(sql)
}

/// Rewrite `sql` for `params`.
///
/// With `unify`, identical positional values share one bind variable,
/// numbered by first occurrence.
fn fix_for_params(
    sql: &str,
    params: &Params,
    unify: bool,
    use_tz: bool,
) -> OracleResult<(String, Formatted)> {
    match params {
        Params::Named(values) => {
            let sql = rewrite_placeholders(sql, |placeholder| match placeholder {
                Placeholder::Named(name) if values.contains_key(name) => Ok(name.to_string()),
                Placeholder::Named(name) => {
                    Err(OracleError::params(format!("missing named parameter '{}'", name)))
                }
                Placeholder::Positional(_) => Err(OracleError::params(
                    "positional placeholder used with named parameters",
                )),
            })?;
            Ok((sql, Formatted::new(params, use_tz)))
        }
        Params::Positional(values) if unify && !values.is_empty() => {
            let mut distinct: Vec<&Param> = Vec::new();
            let mut used = 0;
            let sql = rewrite_placeholders(sql, |placeholder| {
                let param = positional_arg(values, placeholder)?;
                used += 1;
                let index = match distinct.iter().position(|p| *p == param) {
                    Some(index) => index,
                    None => {
                        distinct.push(param);
                        distinct.len() - 1
                    }
                };
                Ok(format!("arg{}", index))
            })?;
            check_all_used(used, values.len())?;
            let named = distinct
                .into_iter()
                .enumerate()
                .map(|(i, p)| (format!("arg{}", i), OracleParam::new(p, use_tz)))
                .collect();
            Ok((sql, Formatted::Named(named)))
        }
        Params::Positional(values) => {
            let mut used = 0;
            let sql = rewrite_placeholders(sql, |placeholder| {
                positional_arg(values, placeholder)?;
                used += 1;
                Ok(format!("arg{}", used - 1))
            })?;
            check_all_used(used, values.len())?;
            Ok((sql, Formatted::new(params, use_tz)))
        }
    }
}

fn positional_arg<'p>(values: &'p [Param], placeholder: Placeholder<'_>) -> OracleResult<&'p Param> {
    match placeholder {
        Placeholder::Positional(i) => values
            .get(i)
            .ok_or_else(|| OracleError::params("not enough parameters for the statement")),
        Placeholder::Named(name) => Err(OracleError::params(format!(
            "named placeholder '{}' used with positional parameters",
            name
        ))),
    }
}

fn check_all_used(used: usize, given: usize) -> OracleResult<()> {
    if used < given {
        return Err(OracleError::params(format!(
            "statement has {} placeholders but {} parameters were given",
            used, given
        )));
    }
    Ok(())
}

/// Merge the input size hints of every row. `None` when no value needs one.
fn guess_input_sizes(rows: &[Formatted]) -> Option<InputSizes> {
    match rows.first()? {
        Formatted::Positional(first) => {
            let mut sizes = vec![None; first.len()];
            for row in rows {
                if let Formatted::Positional(values) = row {
                    for (slot, param) in sizes.iter_mut().zip(values) {
                        if param.input_size.is_some() {
                            *slot = param.input_size;
                        }
                    }
                }
            }
            sizes
                .iter()
                .any(Option::is_some)
                .then_some(InputSizes::Positional(sizes))
        }
        Formatted::Named(_) => {
            let mut sizes = BTreeMap::new();
            for row in rows {
                if let Formatted::Named(values) = row {
                    for (name, param) in values {
                        if let Some(size) = param.input_size {
                            sizes.insert(name.clone(), size);
                        }
                    }
                }
            }
            (!sizes.is_empty()).then_some(InputSizes::Named(sizes))
        }
    }
}

/// How a fetched NUMBER column is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberConverter {
    /// Integer, or decimal when the text has a decimal point.
    IntOrDecimal,
    /// Binary floating point (`FLOAT`).
    Float,
    /// `NUMBER(p, 0)`.
    Int,
    /// `NUMBER(p, s)`, quantized to `s` places.
    Fixed { precision: u32, scale: i16 },
}

impl NumberConverter {
    /// Converter for `column`, `None` for non-NUMBER columns.
    pub fn for_column(column: &ColumnDescription) -> Option<Self> {
        if column.db_type != DbType::Number {
            return None;
        }
        let converter = match (column.precision, column.scale) {
            (0, -127) => NumberConverter::IntOrDecimal,
            (_, -127) => NumberConverter::Float,
            (p, 0) if p > 0 => NumberConverter::Int,
            (p, scale) if p > 0 => NumberConverter::Fixed {
                precision: p as u32,
                scale,
            },
            _ => NumberConverter::IntOrDecimal,
        };
        Some(converter)
    }

    pub fn convert(&self, text: &str) -> OracleResult<Cell> {
        let fail = |reason: &str| OracleError::Conversion {
            value: text.to_string(),
            reason: reason.to_string(),
        };
        match self {
            NumberConverter::IntOrDecimal if text.contains('.') => {
                parse_decimal(text).map(Cell::Decimal)
            }
            NumberConverter::IntOrDecimal => text
                .parse::<i64>()
                .map(Cell::Int)
                .or_else(|_| parse_decimal(text).map(Cell::Decimal)),
            NumberConverter::Float => text
                .parse::<f64>()
                .map(Cell::Float)
                .map_err(|_| fail("not a float")),
            // NUMBER(38) holds more than an i64
            NumberConverter::Int => text
                .parse::<i64>()
                .map(Cell::Int)
                .or_else(|_| parse_decimal(text).map(Cell::Decimal)),
            NumberConverter::Fixed { precision, scale } => {
                let value = parse_decimal(text)?;
                quantize(value, *precision, *scale)
                    .map(Cell::Decimal)
                    .map_err(|reason| fail(reason))
            }
        }
    }
}

fn parse_decimal(text: &str) -> OracleResult<Decimal> {
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| OracleError::Conversion {
            value: text.to_string(),
            reason: e.to_string(),
        })
}

/// Round half-even to `scale` places, failing when the coefficient needs more
/// than `precision` digits.
fn quantize(value: Decimal, precision: u32, scale: i16) -> Result<Decimal, &'static str> {
    let (quantized, coefficient) = if scale >= 0 {
        let mut q = value.round_dp_with_strategy(scale as u32, RoundingStrategy::MidpointNearestEven);
        q.rescale(scale as u32);
        (q, q.mantissa())
    } else {
        let factor = 10i128
            .checked_pow(u32::from(scale.unsigned_abs()))
            .and_then(|f| Decimal::try_from_i128_with_scale(f, 0).ok())
            .ok_or("scale out of range")?;
        let units = (value / factor).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        let q = units.checked_mul(factor).ok_or("value out of range")?;
        (q, units.mantissa())
    };
    if coefficient.unsigned_abs().to_string().len() > precision as usize {
        return Err("value exceeds the column precision");
    }
    Ok(quantized)
}

/// Cursor wrapper that accepts format-style placeholders.
pub struct FormatStylePlaceholderCursor<C: DriverCursor> {
    cursor: C,
    use_tz: bool,
    converters: Vec<Option<NumberConverter>>,
}

impl<C: DriverCursor> FormatStylePlaceholderCursor<C> {
    pub fn new(cursor: C, use_tz: bool) -> Self {
        Self {
            cursor,
            use_tz,
            converters: Vec::new(),
        }
    }

    /// Execute once. `None` params leave the statement text untouched.
    pub fn execute(&mut self, sql: &str, params: Option<&Params>) -> OracleResult<()> {
        let sql = strip_terminator(sql);
        let (sql, formatted) = match params {
            Some(params) => fix_for_params(sql, params, true, self.use_tz)?,
            None => (sql.to_string(), Formatted::Positional(Vec::new())),
        };
        if let Some(sizes) = guess_input_sizes(std::slice::from_ref(&formatted)) {
            self.cursor.set_input_sizes(&sizes)?;
        }

        let binds = formatted.into_binds();
        debug!(sql = %sql, binds = binds.len(), "execute");
        self.cursor.execute(&sql, &binds).map_err(wrap_oracle_errors)?;
        self.load_converters();
        Ok(())
    }

    /// Execute once per row. Rows are not deduplicated; every row must have
    /// the first row's shape. No rows is a no-op.
    pub fn execute_many(&mut self, sql: &str, rows: &[Params]) -> OracleResult<()> {
        let Some((first, others)) = rows.split_first() else {
            return Ok(());
        };
        let (sql, first) = fix_for_params(strip_terminator(sql), first, false, self.use_tz)?;

        let mut formatted = Vec::with_capacity(rows.len());
        for row in others {
            let row = Formatted::new(row, self.use_tz);
            if !row.same_shape(&first) {
                return Err(OracleError::params(
                    "every row must have the same parameters as the first",
                ));
            }
            formatted.push(row);
        }
        formatted.insert(0, first);

        if let Some(sizes) = guess_input_sizes(&formatted) {
            self.cursor.set_input_sizes(&sizes)?;
        }
        let binds: Vec<Binds> = formatted.into_iter().map(Formatted::into_binds).collect();
        debug!(sql = %sql, rows = binds.len(), "execute_many");
        self.cursor
            .execute_many(&sql, &binds)
            .map_err(wrap_oracle_errors)?;
        self.load_converters();
        Ok(())
    }

    fn load_converters(&mut self) {
        self.converters = self
            .cursor
            .description()
            .iter()
            .map(NumberConverter::for_column)
            .collect();
    }

    pub fn description(&self) -> Vec<ColumnDescription> {
        self.cursor.description()
    }

    /// Next row, with NUMBER columns converted.
    pub fn fetch_one(&mut self) -> OracleResult<Option<Vec<Cell>>> {
        let Some(row) = self.cursor.fetch_row()? else {
            return Ok(None);
        };
        row.into_iter()
            .enumerate()
            .map(|(i, raw)| match (self.converters.get(i).copied().flatten(), raw) {
                (Some(converter), RawCell::Text(text)) => converter.convert(&text),
                (_, raw) => Ok(raw.into()),
            })
            .collect::<OracleResult<Vec<_>>>()
            .map(Some)
    }

    pub fn fetch_all(&mut self) -> OracleResult<Vec<Vec<Cell>>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Close the cursor. Closing an already closed cursor is not an error.
    pub fn close(&mut self) -> OracleResult<()> {
        match self.cursor.close() {
            Err(err) if err.kind == DriverErrorKind::Interface => {
                debug!(message = %err.message, "cursor already closed");
                Ok(())
            }
            other => other.map_err(Into::into),
        }
    }

    pub fn inner(&self) -> &C {
        &self.cursor
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.cursor
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }
}
