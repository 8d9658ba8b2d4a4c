//! Column contract of the feature stage.
//!
//! Every column the stage reads, writes or drops is named here so the
//! input validation, the derivations and the output ordering share one
//! source of truth.

use crate::error::{FeatureError, Result};
use polars::prelude::*;

/// Sentinel used upstream for absent categorical values.
pub const MISSING: &str = "missing";

/// Day counts rounded (ties to even) before the integer cast.
pub const ROUNDED_INT_COLUMNS: [&str; 2] = ["ioi_36months", "ioi_3months"];

/// Counts and date parts truncated to integers.
pub const TRUNCATED_INT_COLUMNS: [&str; 7] = [
    "default_3months",
    "quant_protestos",
    "quant_acao_judicial",
    "dividas_vencidas_qtd",
    "falencia_concordata_qtd",
    "month",
    "year",
];

/// Mostly-zero counts that get a `_bin` indicator.
pub const BINARIZED_COLUMNS: [&str; 5] = [
    "quant_protestos",
    "quant_acao_judicial",
    "dividas_vencidas_qtd",
    "falencia_concordata_qtd",
    "default_3months",
];

/// Monetary amounts that get a `log1p_` sibling.
pub const MONETARY_COLUMNS: [&str; 7] = [
    "valor_por_vencer",
    "valor_vencido",
    "valor_quitado",
    "valor_protestos",
    "acao_judicial_valor",
    "dividas_vencidas_valor",
    "valor_total_pedido",
];

pub const TEXT_COLUMNS: [&str; 4] = [
    "tipo_sociedade",
    "forma_pagamento",
    "opcao_tributaria",
    "atividade_principal",
];

/// Raw columns superseded by derived features.
pub const DROPPED_COLUMNS: [&str; 15] = [
    "valor_por_vencer",
    "valor_vencido",
    "valor_quitado",
    "valor_protestos",
    "acao_judicial_valor",
    "dividas_vencidas_valor",
    "valor_total_pedido",
    "quant_protestos",
    "quant_acao_judicial",
    "dividas_vencidas_qtd",
    "falencia_concordata_qtd",
    "forma_pagamento",
    "tipo_sociedade",
    "atividade_principal",
    "month",
];

pub const IOI_36M_CAT: &str = "ioi_36m_cat";
pub const IOI_3M_CAT: &str = "ioi_3_cat";
pub const RATIO_IOI: &str = "ratio_ioi";
pub const SOCIETY_GROUP: &str = "tipo_sociedade_agrupado";
pub const INSTALLMENTS: &str = "n_parcelas";
pub const MEAN_TERM: &str = "prazo_medio";
pub const MAX_TERM: &str = "prazo_maximo";
pub const TERM_CLASS: &str = "classificacao_prazo";
pub const TAX_OPTION_MISSING: &str = "opcao_tributaria_missing";
pub const PAYMENT_MISSING: &str = "forma_pagamento_missing";
pub const ACTIVITY_GROUP: &str = "atividade_agrupada";
pub const PROP_OVERDUE: &str = "prop_vencido";
pub const PROP_SETTLED: &str = "prop_quitado";
pub const QUARTER: &str = "trimestre";

pub fn bin_column(source: &str) -> String {
    format!("{source}_bin")
}

pub fn log1p_column(source: &str) -> String {
    format!("log1p_{source}")
}

/// Derived columns in the order they are appended to the output.
pub fn derived_columns() -> Vec<String> {
    let mut names: Vec<String> = BINARIZED_COLUMNS.iter().map(|c| bin_column(c)).collect();
    names.extend(MONETARY_COLUMNS.iter().map(|c| log1p_column(c)));
    names.extend(
        [
            IOI_36M_CAT,
            IOI_3M_CAT,
            RATIO_IOI,
            SOCIETY_GROUP,
            INSTALLMENTS,
            MEAN_TERM,
            MAX_TERM,
            TERM_CLASS,
            TAX_OPTION_MISSING,
            PAYMENT_MISSING,
            ACTIVITY_GROUP,
            PROP_OVERDUE,
            PROP_SETTLED,
            QUARTER,
        ]
        .map(str::to_owned),
    );
    names
}

/// Numeric columns required on input, in validation order.
pub fn required_numeric_columns() -> impl Iterator<Item = &'static str> {
    ROUNDED_INT_COLUMNS
        .into_iter()
        .chain(TRUNCATED_INT_COLUMNS)
        .chain(MONETARY_COLUMNS)
}

/// Checks that every required column is present with a usable dtype.
///
/// # Errors
///
/// [`FeatureError::MissingColumn`] for the first absent column,
/// [`FeatureError::InvalidType`] for a column with the wrong dtype.
pub fn validate(df: &DataFrame) -> Result<()> {
    for name in required_numeric_columns() {
        let dtype = column_dtype(df, name)?;
        if !dtype.is_primitive_numeric() {
            return Err(FeatureError::InvalidType {
                column: name.to_owned(),
                expected: "numeric",
                found: dtype.to_string(),
            });
        }
    }

    for name in TEXT_COLUMNS {
        let dtype = column_dtype(df, name)?;
        if dtype != DataType::String {
            return Err(FeatureError::InvalidType {
                column: name.to_owned(),
                expected: "string",
                found: dtype.to_string(),
            });
        }
    }

    Ok(())
}

fn column_dtype(df: &DataFrame, name: &str) -> Result<DataType> {
    df.column(name)
        .map(|c| c.dtype().clone())
        .map_err(|_| FeatureError::MissingColumn(name.to_owned()))
}

/// Predicts the output column names for a given input column list.
///
/// Input columns keep their order; an input column that shares a derived
/// column's name is overwritten where it stands. Remaining derived columns
/// follow in [`derived_columns`] order.
pub fn output_columns<S: AsRef<str>>(input: &[S]) -> Vec<String> {
    let mut names: Vec<String> = input
        .iter()
        .filter_map(|s| {
            let name: &str = s.as_ref();
            (!DROPPED_COLUMNS.contains(&name)).then(|| name.to_owned())
        })
        .collect();
    let appended: Vec<String> = derived_columns()
        .into_iter()
        .filter(|d| !names.contains(d))
        .collect();
    names.extend(appended);
    names
}
