//! Integration tests for pypeline-core's public domain API.

use pypeline_core::domain::{
    Manifest, PipelineDescriptor, ProcessorDescriptor, RenderContext, parse_dependency_file,
    registry::exports, scaffold, update_registry,
};

const AGGREGATOR: &str = r#""""Pipelines of sales_etl."""

__all__ = []
"#;

#[test]
fn pipelines_register_in_order_and_reapply_is_noop() {
    let daily = PipelineDescriptor::parse("daily sales").unwrap();
    let weekly = PipelineDescriptor::parse("weekly-returns").unwrap();

    let first = update_registry(AGGREGATOR, &daily.import_line(), &daily.class_name).unwrap();
    let second = update_registry(&first.content, &weekly.import_line(), &weekly.class_name).unwrap();
    assert!(first.changed && second.changed);

    assert_eq!(
        exports(&second.content).unwrap(),
        vec!["DailySalesPipeline".to_string(), "WeeklyReturnsPipeline".to_string()]
    );
    assert!(second
        .content
        .contains("from .pipelines.daily_sales.daily_sales_runner import DailySalesPipeline"));

    let again = update_registry(&second.content, &daily.import_line(), &daily.class_name).unwrap();
    assert!(!again.changed);
    assert_eq!(again.content, second.content);
}

#[test]
fn dependency_file_flows_into_manifest() {
    let source = r#"
"""Project dependencies."""

DEPENDENCIES = [
    "pandas>=2.3.3",  # dataframes
    "pyspark>=4.0.1",
]
"#;
    let requested = parse_dependency_file(source).unwrap();

    let mut manifest = Manifest::parse(
        "[project]\nname = \"sales-etl\"\ndependencies = [\"Pandas>=1.0\", \"requests\"]\n\n[tool.pypeline]\npackage = \"sales_etl\"\n",
    )
    .unwrap();
    let outcome = manifest.merge_dependencies(&requested).unwrap();

    assert_eq!(outcome.updated, vec!["pandas".to_string()]);
    assert_eq!(outcome.added, vec!["pyspark".to_string()]);

    let rewritten = Manifest::parse(&manifest.to_toml_string().unwrap()).unwrap();
    assert_eq!(
        rewritten.dependencies().unwrap(),
        vec![
            "pandas>=2.3.3".to_string(),
            "requests".to_string(),
            "pyspark>=4.0.1".to_string()
        ]
    );
    assert_eq!(rewritten.package(), Some("sales_etl"));
}

#[test]
fn processor_plan_destinations_resolve() {
    let processor = ProcessorDescriptor::parse("clean orders", "daily sales").unwrap();
    let ctx = processor.apply(RenderContext::new().with_variable("package", "sales_etl"));

    let destinations: Vec<String> = scaffold::processor_plan()
        .iter()
        .map(|file| file.render_destination(&ctx).unwrap())
        .collect();
    assert_eq!(
        destinations,
        vec![
            "src/sales_etl/pipelines/daily_sales/processors/clean_orders_processor.py".to_string(),
            "src/sales_etl/pipelines/daily_sales/tests/test_clean_orders_processor.py".to_string(),
        ]
    );
}
