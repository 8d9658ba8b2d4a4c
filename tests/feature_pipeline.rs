//! Integration tests for the feature stage through its public surfaces
//!
//! These tests build raw applicant tables, run them through the stage
//! directly and through a JSON-defined pipeline, and verify the results.

use credit_features::config::FeatureConfig;
use credit_features::features::{FeatureEngineering, Transformer as _, schema};
use credit_features::pipeline::{FeatureEngineeringTransform, TransformPipeline};
use polars::prelude::*;

fn raw_applicants() -> DataFrame {
    let columns = vec![
        Series::new("ioi_36months".into(), vec![12.0, 45.0]),
        Series::new("ioi_3months".into(), vec![18.0, 30.0]),
        Series::new("default_3months".into(), vec![0.0, 2.0]),
        Series::new("quant_protestos".into(), vec![0.0, 1.0]),
        Series::new("quant_acao_judicial".into(), vec![0.0, 0.0]),
        Series::new("dividas_vencidas_qtd".into(), vec![0.0, 4.0]),
        Series::new("falencia_concordata_qtd".into(), vec![1.0, 0.0]),
        Series::new("month".into(), vec![8.0, 5.0]),
        Series::new("year".into(), vec![2019.0, 2020.0]),
        Series::new("valor_por_vencer".into(), vec![0.0, 300.0]),
        Series::new("valor_vencido".into(), vec![0.0, 100.0]),
        Series::new("valor_quitado".into(), vec![0.0, 600.0]),
        Series::new("valor_protestos".into(), vec![0.0, 55.0]),
        Series::new("acao_judicial_valor".into(), vec![0.0, 0.0]),
        Series::new("dividas_vencidas_valor".into(), vec![0.0, 20.0]),
        Series::new("valor_total_pedido".into(), vec![0.0, 1500.0]),
        Series::new(
            "tipo_sociedade".into(),
            vec!["empresario (individual)", "consorcio"],
        ),
        Series::new(
            "forma_pagamento".into(),
            vec!["28/56/84/112/140/168/196 dd", "deposito antecipado"],
        ),
        Series::new("opcao_tributaria".into(), vec!["missing", "lucro real"]),
        Series::new(
            "atividade_principal".into(),
            vec!["Supermercado Bom Preco", "criacao de bovinos"],
        ),
    ];
    DataFrame::new(columns.into_iter().map(Column::from).collect()).unwrap()
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect()
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn test_feature_table_end_to_end() {
    let raw = raw_applicants();
    let features = FeatureEngineering::default()
        .fit_transform(&raw)
        .expect("Feature engineering should succeed");

    assert_eq!(features.height(), 2);
    assert_eq!(features.width(), 20 - 15 + 26);

    assert_eq!(
        strings(&features, schema::IOI_36M_CAT),
        vec![Some("<=20".to_owned()), Some("39-70".to_owned())]
    );
    assert_eq!(
        strings(&features, schema::IOI_3M_CAT),
        vec![Some("16-20".to_owned()), Some(">20".to_owned())]
    );
    assert_eq!(
        strings(&features, schema::SOCIETY_GROUP),
        vec![Some("individual".to_owned()), None]
    );
    assert_eq!(
        strings(&features, schema::ACTIVITY_GROUP),
        vec![Some("comercio".to_owned()), Some("outros".to_owned())]
    );
    assert_eq!(
        strings(&features, schema::QUARTER),
        vec![Some("3".to_owned()), Some("2".to_owned())]
    );
    assert_eq!(
        strings(&features, schema::TERM_CLASS),
        vec![Some("muito_longo".to_owned()), Some("curto".to_owned())]
    );

    // No digits in the second plan: zero installments, zero days.
    assert_eq!(floats(&features, schema::INSTALLMENTS), vec![Some(7.0), Some(0.0)]);
    assert_eq!(floats(&features, schema::MAX_TERM), vec![Some(196.0), Some(0.0)]);
    assert_eq!(floats(&features, schema::PROP_OVERDUE), vec![Some(0.0), Some(100.0 / 901.0)]);
}

#[test]
fn test_pipeline_from_json_matches_direct_call() {
    let raw = raw_applicants();
    let json = r#"{
        "transforms": [
            {
                "transform_type": "feature_engineering",
                "parameters": { "config": { "unmapped_society_group": "outros" } }
            }
        ]
    }"#;

    let pipeline = TransformPipeline::from_json(json).expect("Pipeline JSON should parse");
    let via_pipeline = pipeline
        .apply(raw.clone().lazy())
        .and_then(|lf| Ok(lf.collect()?))
        .expect("Pipeline should run");

    let config = FeatureConfig {
        unmapped_society_group: Some("outros".to_owned()),
        ..FeatureConfig::default()
    };
    let direct = FeatureEngineering::new(config).transform(&raw).unwrap();

    assert!(via_pipeline.equals_missing(&direct));
    assert_eq!(
        strings(&via_pipeline, schema::SOCIETY_GROUP),
        vec![Some("individual".to_owned()), Some("outros".to_owned())]
    );
}

#[test]
fn test_pipeline_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("features.json");

    let config = FeatureConfig {
        unmapped_society_group: Some("outros".to_owned()),
        ..FeatureConfig::default()
    };
    config.to_file(&config_path).unwrap();
    let loaded = FeatureConfig::from_file(&config_path).unwrap();
    assert_eq!(loaded, config);

    let mut pipeline = TransformPipeline::empty();
    pipeline.add(FeatureEngineeringTransform::new(loaded).to_spec());

    let pipeline_path = dir.path().join("pipeline.json");
    std::fs::write(&pipeline_path, pipeline.to_json().unwrap()).unwrap();
    let restored =
        TransformPipeline::from_json(&std::fs::read_to_string(&pipeline_path).unwrap()).unwrap();

    assert_eq!(restored.len(), 1);
    let out = restored
        .apply(raw_applicants().lazy())
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(out.width(), 31);
}

#[test]
fn test_pipeline_reports_failing_stage() {
    let pipeline = TransformPipeline::from_json(
        r#"{ "transforms": [ { "transform_type": "feature_engineering" } ] }"#,
    )
    .unwrap();

    let partial = raw_applicants().drop("forma_pagamento").unwrap();
    let err = pipeline.apply(partial.lazy()).err().unwrap();
    let message = format!("{err:#}");

    assert!(message.contains("Failed to apply transform 0"), "{message}");
    assert!(message.contains("forma_pagamento"), "{message}");
}
