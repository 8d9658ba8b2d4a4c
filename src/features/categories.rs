//! Category remapping for society type and main activity.

use super::schema::{ACTIVITY_GROUP, SOCIETY_GROUP};
use crate::error::{FeatureError, Result};
use polars::prelude::*;

/// Society type (exact, pre-normalized spelling) to its group.
pub const SOCIETY_GROUPS: [(&str, &str); 16] = [
    ("empresario (individual)", "individual"),
    ("empresa individual respons limitada empresaria", "individual"),
    ("empresario-mei(microempreendedor individual)", "individual"),
    ("sociedade empresaria limitada", "sociedade empresarial"),
    ("sociedade anonima fechada", "sociedade empresarial"),
    ("sociedade anonima aberta", "sociedade empresarial"),
    ("sociedade de economia mista", "sociedade empresarial"),
    ("sociedade simples pura", "sociedade simples"),
    ("sociedade simples limitada", "sociedade simples"),
    ("cooperativa", "cooperativa"),
    ("entidade sindical", "outros"),
    ("municipio", "outros"),
    ("servico social autonomo", "outros"),
    ("organizacao religiosa", "outros"),
    ("fundacao privada", "outros"),
    ("outras formas de associacao", "outros"),
];

/// Activity keyword rules. Checked top to bottom; the first category with
/// a keyword contained in the lowercased activity wins.
pub const ACTIVITY_RULES: [(&str, &[&str]); 6] = [
    (
        "fundacao_ongs_instituicao",
        &["fundacao", "associacao", "instituicao", "fund", "sindicato"],
    ),
    ("cooperativas", &["cooperativa"]),
    (
        "educacao",
        &["escola", "ensino", "curso", "cientifica", "especializacao"],
    ),
    (
        "servicos",
        &[
            "servico",
            "reparacao",
            "hospedagem",
            "consultoria",
            "repar",
            "borracharia",
            "locacao",
            "servicos",
            "serraria",
            "laboratorio",
            "serv",
        ],
    ),
    (
        "comercio",
        &[
            "comercio",
            "venda",
            "mercado",
            "atacado",
            "com de",
            "supermercado",
            "papelaria",
            "bazar",
            "varejista",
            "farmacia",
            "concessionaria",
            "loja",
        ],
    ),
    (
        "industria",
        &[
            "industria",
            "fabrica",
            "producao",
            "manufatura",
            "ind",
            "usinagem",
        ],
    ),
];

pub const DEFAULT_ACTIVITY: &str = "outros";

/// Group for a society type; `None` when the type is not in the table.
pub fn group_society_type(society_type: &str) -> Option<&'static str> {
    SOCIETY_GROUPS
        .iter()
        .find(|(name, _)| *name == society_type)
        .map(|&(_, group)| group)
}

pub fn categorize_activity(activity: &str) -> &'static str {
    let activity = activity.to_lowercase();
    ACTIVITY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| activity.contains(k)))
        .map_or(DEFAULT_ACTIVITY, |&(category, _)| category)
}

fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| FeatureError::MissingColumn(name.to_owned()))?;
    Ok(column.as_materialized_series().str()?)
}

/// Adds `tipo_sociedade_agrupado` and returns how many non-null society
/// types were not in the lookup table.
///
/// Unknown types become null unless `fallback` names a group for them.
///
/// # Errors
///
/// Fails if `tipo_sociedade` is absent or not a string column.
pub fn add_society_groups(df: &mut DataFrame, fallback: Option<&str>) -> Result<usize> {
    let mut unmapped = 0_usize;
    let groups: Vec<Option<&str>> = str_column(df, "tipo_sociedade")?
        .into_iter()
        .map(|value| {
            let value = value?;
            let group = group_society_type(value);
            if group.is_none() {
                unmapped += 1;
                tracing::debug!(society_type = value, "Society type has no group");
            }
            group.or(fallback)
        })
        .collect();

    if unmapped > 0 {
        tracing::warn!(
            unmapped,
            fallback = fallback.unwrap_or("<null>"),
            "Society types outside the grouping table"
        );
    }

    df.with_column(Series::new(SOCIETY_GROUP.into(), groups))?;
    Ok(unmapped)
}

/// Adds `atividade_agrupada`.
///
/// # Errors
///
/// Fails if `atividade_principal` is absent, not a string column or holds
/// a null.
pub fn add_activity_groups(df: &mut DataFrame) -> Result<()> {
    let categories = str_column(df, "atividade_principal")?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(categorize_activity)
                .ok_or_else(|| FeatureError::NullValue {
                    column: "atividade_principal".to_owned(),
                    row,
                })
        })
        .collect::<Result<Vec<&str>>>()?;

    df.with_column(Series::new(ACTIVITY_GROUP.into(), categories))?;
    Ok(())
}
