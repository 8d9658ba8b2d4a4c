use super::schema::{
    BINARIZED_COLUMNS, MISSING, MONETARY_COLUMNS, PAYMENT_MISSING, PROP_OVERDUE, PROP_SETTLED,
    RATIO_IOI, ROUNDED_INT_COLUMNS, TAX_OPTION_MISSING, TRUNCATED_INT_COLUMNS, bin_column,
    log1p_column,
};
use crate::error::{FeatureError, Result};
use polars::prelude::*;

/// How a float is brought to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntCast {
    /// Nearest integer, ties to even.
    Round,
    /// Drop the fractional part.
    Truncate,
}

impl IntCast {
    fn apply(self, value: f64) -> i64 {
        match self {
            Self::Round => value.round_ties_even() as i64,
            Self::Truncate => value.trunc() as i64,
        }
    }
}

/// Casts a numeric series to `Int64`, failing on null, NaN or infinity.
///
/// # Errors
///
/// [`FeatureError::NonFiniteValue`] naming the first offending row.
pub fn cast_to_int(series: &Series, mode: IntCast) -> Result<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let values = floats
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(mode.apply(v)),
            _ => Err(FeatureError::NonFiniteValue {
                column: series.name().to_string(),
                row,
            }),
        })
        .collect::<Result<Vec<i64>>>()?;

    Ok(Series::new(series.name().clone(), values))
}

/// Rounds the inactivity day counts and truncates the count/date columns,
/// replacing them in place with `Int64` columns.
///
/// # Errors
///
/// Fails if a column is absent or holds a value that cannot be cast.
pub fn normalize_types(df: &mut DataFrame) -> Result<()> {
    let plan = ROUNDED_INT_COLUMNS
        .iter()
        .map(|name| (*name, IntCast::Round))
        .chain(TRUNCATED_INT_COLUMNS.iter().map(|name| (*name, IntCast::Truncate)));

    for (name, mode) in plan {
        let column = df
            .column(name)
            .map_err(|_| FeatureError::MissingColumn(name.to_owned()))?;
        let cast = cast_to_int(column.as_materialized_series(), mode)?;
        df.with_column(cast)?;
    }

    Ok(())
}

/// `1` when the count is strictly positive, else `0`.
pub fn binarize(name: &str) -> Expr {
    col(name)
        .gt(lit(0))
        .cast(DataType::Int64)
        .alias(bin_column(name))
}

/// `ln(1 + x)`; `NaN` for `x <= -1`, null stays null.
pub fn log1p(name: &str) -> Expr {
    let amount = col(name).cast(DataType::Float64);
    when(amount.clone().lt_eq(lit(-1.0)))
        .then(lit(f64::NAN))
        .otherwise(amount.log1p())
        .alias(log1p_column(name))
}

/// `ioi_3months / (ioi_36months + 1)`.
pub fn ioi_ratio() -> Expr {
    (col("ioi_3months").cast(DataType::Float64)
        / (col("ioi_36months").cast(DataType::Float64) + lit(1.0)))
    .alias(RATIO_IOI)
}

/// `1` when the raw value is exactly the `"missing"` sentinel.
pub fn missing_flag(name: &str, alias: &str) -> Expr {
    col(name)
        .eq(lit(MISSING))
        .fill_null(lit(false))
        .cast(DataType::Int64)
        .alias(alias)
}

/// Overdue and settled amounts as shares of the settled plus open balance,
/// smoothed by one in the denominator.
pub fn settlement_proportions() -> [Expr; 2] {
    let settled = col("valor_quitado").cast(DataType::Float64);
    let denominator =
        settled.clone() + col("valor_por_vencer").cast(DataType::Float64) + lit(1.0);

    [
        (col("valor_vencido").cast(DataType::Float64) / denominator.clone()).alias(PROP_OVERDUE),
        (settled / denominator).alias(PROP_SETTLED),
    ]
}

/// Every expression-friendly derivation, in output order.
pub fn derived_exprs() -> Vec<Expr> {
    let mut exprs: Vec<Expr> = BINARIZED_COLUMNS.iter().map(|c| binarize(c)).collect();
    exprs.extend(MONETARY_COLUMNS.iter().map(|c| log1p(c)));
    exprs.push(ioi_ratio());
    exprs.push(missing_flag("opcao_tributaria", TAX_OPTION_MISSING));
    exprs.push(missing_flag("forma_pagamento", PAYMENT_MISSING));
    exprs.extend(settlement_proportions());
    exprs
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]

    use super::*;
    use anyhow::Result;

    fn eval(df: DataFrame, exprs: Vec<Expr>) -> Result<DataFrame> {
        Ok(df.lazy().with_columns(exprs).collect()?)
    }

    #[test]
    fn test_cast_to_int_rounds_ties_to_even() -> Result<()> {
        let s = Series::new("ioi_3months".into(), vec![2.5, 3.5, 4.4, 4.6, -0.5]);
        let cast = cast_to_int(&s, IntCast::Round)?;
        let values: Vec<Option<i64>> = cast.i64()?.into_iter().collect();
        assert_eq!(values, vec![Some(2), Some(4), Some(4), Some(5), Some(0)]);
        Ok(())
    }

    #[test]
    fn test_cast_to_int_truncates() -> Result<()> {
        let s = Series::new("month".into(), vec![3.9, -1.7, 12.0]);
        let cast = cast_to_int(&s, IntCast::Truncate)?;
        let values: Vec<Option<i64>> = cast.i64()?.into_iter().collect();
        assert_eq!(values, vec![Some(3), Some(-1), Some(12)]);
        Ok(())
    }

    #[test]
    fn test_cast_to_int_rejects_non_finite() {
        let s = Series::new("year".into(), vec![Some(2020.0), Some(f64::NAN)]);
        let err = cast_to_int(&s, IntCast::Truncate).err();
        assert!(matches!(
            err.as_ref(),
            Some(FeatureError::NonFiniteValue { column, row: 1 }) if column == "year"
        ));

        let s = Series::new("year".into(), vec![None, Some(2020.0)]);
        assert!(cast_to_int(&s, IntCast::Truncate).is_err());

        let s = Series::new("year".into(), vec![f64::INFINITY]);
        assert!(cast_to_int(&s, IntCast::Truncate).is_err());
    }

    #[test]
    fn test_binarize() -> Result<()> {
        let s = Series::new("quant_protestos".into(), vec![0_i64, 1, 7]);
        let df = eval(DataFrame::new(vec![Column::from(s)])?, vec![binarize("quant_protestos")])?;

        let bins = df.column("quant_protestos_bin")?.as_materialized_series();
        let values: Vec<Option<i64>> = bins.i64()?.into_iter().collect();
        assert_eq!(values, vec![Some(0), Some(1), Some(1)]);
        Ok(())
    }

    #[test]
    fn test_log1p_domain() -> Result<()> {
        let s = Series::new(
            "valor_vencido".into(),
            vec![Some(0.0), Some(99.0), Some(-1.0), Some(-3.0), None],
        );
        let df = eval(DataFrame::new(vec![Column::from(s)])?, vec![log1p("valor_vencido")])?;

        let logs = df.column("log1p_valor_vencido")?.as_materialized_series();
        let ca = logs.f64()?;
        assert_eq!(ca.get(0), Some(0.0));
        assert!((ca.get(1).unwrap() - 100.0_f64.ln()).abs() < 1e-12);
        assert!(ca.get(2).unwrap().is_nan());
        assert!(ca.get(3).unwrap().is_nan());
        assert_eq!(ca.get(4), None);
        Ok(())
    }

    #[test]
    fn test_ioi_ratio() -> Result<()> {
        let ioi_36 = Series::new("ioi_36months".into(), vec![0_i64, 26, 9]);
        let ioi_3 = Series::new("ioi_3months".into(), vec![0_i64, 2, 5]);
        let df = DataFrame::new(vec![Column::from(ioi_36), Column::from(ioi_3)])?;
        let df = eval(df, vec![ioi_ratio()])?;

        let ratio = df.column(RATIO_IOI)?.as_materialized_series();
        let ca = ratio.f64()?;
        assert_eq!(ca.get(0), Some(0.0));
        assert_eq!(ca.get(1), Some(2.0 / 27.0));
        assert_eq!(ca.get(2), Some(0.5));
        Ok(())
    }

    #[test]
    fn test_missing_flag_is_exact_match() -> Result<()> {
        let s = Series::new(
            "opcao_tributaria".into(),
            vec![Some("missing"), Some("MISSING"), Some("simples nacional"), None],
        );
        let df = eval(
            DataFrame::new(vec![Column::from(s)])?,
            vec![missing_flag("opcao_tributaria", TAX_OPTION_MISSING)],
        )?;

        let flags = df.column(TAX_OPTION_MISSING)?.as_materialized_series();
        let values: Vec<Option<i64>> = flags.i64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1), Some(0), Some(0), Some(0)]);
        Ok(())
    }

    #[test]
    fn test_settlement_proportions() -> Result<()> {
        let df = DataFrame::new(vec![
            Column::from(Series::new("valor_vencido".into(), vec![30.0, 0.0])),
            Column::from(Series::new("valor_quitado".into(), vec![50.0, 0.0])),
            Column::from(Series::new("valor_por_vencer".into(), vec![100.0, 0.0])),
        ])?;
        let df = eval(df, settlement_proportions().to_vec())?;

        let overdue = df.column(PROP_OVERDUE)?.as_materialized_series().f64()?.clone();
        let settled = df.column(PROP_SETTLED)?.as_materialized_series().f64()?.clone();
        assert_eq!(overdue.get(0), Some(30.0 / 151.0));
        assert_eq!(settled.get(0), Some(50.0 / 151.0));
        assert_eq!(overdue.get(1), Some(0.0));
        assert_eq!(settled.get(1), Some(0.0));
        Ok(())
    }
}
