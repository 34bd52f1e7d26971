//! End-to-end report pipeline tests: repository to template resolution to
//! chart calculation to assembled report.

use fansight_rust::api::{ProjectId, TemplateId};
use fansight_rust::db::repositories::LocalRepository;
use fansight_rust::db::{
    store_template, CatalogRepository, ProjectRepository, RepositoryError, TemplateScope,
};
use fansight_rust::models::{
    ChartConfig, ChartElement, ChartPayload, ChartType, DataBlock, KpiValue, ReportTemplate,
    ResolvedFrom, StatsRecord,
};
use fansight_rust::registry::VariableRegistry;
use fansight_rust::services::{build_project_report, TemplateResolver};

async fn project_with_stats(repo: &LocalRepository, stats: &[(&str, f64)]) -> ProjectId {
    let project = repo
        .create_project("Festival night", None, None)
        .await
        .unwrap();
    let mut record = StatsRecord::new();
    for (name, value) in stats {
        record.set_number(*name, *value);
    }
    repo.replace_stats_record(project.id, &record).await.unwrap();
    project.id
}

async fn store_default_template(repo: &LocalRepository, blocks: Vec<DataBlock>) {
    let template = ReportTemplate::new(TemplateId::new(0), "Test layout", blocks);
    store_template(repo, &template, TemplateScope::Default)
        .await
        .unwrap();
}

fn kpi_chart(chart_id: &str, formula: &str) -> ChartConfig {
    ChartConfig::new(chart_id, chart_id, ChartType::Kpi, vec![ChartElement::new(formula)])
}

#[tokio::test]
async fn test_demo_seed_renders_complete_report() {
    let repo = LocalRepository::with_demo_data();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    let report = build_project_report(&repo, &registry, &resolver, ProjectId::new(1))
        .await
        .unwrap();

    assert_eq!(report.resolved_from, ResolvedFrom::Default);
    assert_eq!(report.template_name, "Event recap");
    assert_eq!(report.blocks.len(), 8);
    assert!(report.blocks.iter().all(|b| b.error.is_none()));
    assert_eq!(report.checksum.len(), 64);

    let attendance = &report.blocks[0];
    assert_eq!(attendance.chart_id, "attendance");
    assert_eq!(
        attendance.results[0].payload,
        ChartPayload::Kpi {
            value: KpiValue::Number(1850.0)
        }
    );

    // The value composite expands into a KPI result and a bar result.
    let composite = report
        .blocks
        .iter()
        .find(|b| b.chart_id == "prints-and-shares")
        .unwrap();
    assert_eq!(composite.results.len(), 2);

    let cover = report
        .blocks
        .iter()
        .find(|b| b.chart_id == "cover-photo")
        .unwrap();
    assert!(matches!(
        cover.results[0].payload,
        ChartPayload::Image { .. }
    ));
}

#[tokio::test]
async fn test_kpi_reads_stored_value_and_degrades_to_no_data() {
    let repo = LocalRepository::new();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    repo.store_chart_config(&kpi_chart("images", "stats.remoteImages"))
        .await
        .unwrap();
    store_default_template(&repo, vec![DataBlock::new(1, "images", 0)]).await;

    let with_data = project_with_stats(&repo, &[("remoteImages", 120.0)]).await;
    let report = build_project_report(&repo, &registry, &resolver, with_data)
        .await
        .unwrap();
    assert_eq!(
        report.blocks[0].results[0].payload,
        ChartPayload::Kpi {
            value: KpiValue::Number(120.0)
        }
    );

    // A project with no stats record renders, with the KPI marked no-data.
    let empty = repo.create_project("No stats yet", None, None).await.unwrap();
    let report = build_project_report(&repo, &registry, &resolver, empty.id)
        .await
        .unwrap();
    assert_eq!(
        report.blocks[0].results[0].payload,
        ChartPayload::Kpi {
            value: KpiValue::NoData
        }
    );
}

#[tokio::test]
async fn test_pie_percentages_from_stored_stats() {
    let repo = LocalRepository::new();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    let chart = ChartConfig::new(
        "gender-split",
        "Gender split",
        ChartType::Pie,
        vec![
            ChartElement::labeled("stats.female", "Female"),
            ChartElement::labeled("stats.male", "Male"),
        ],
    );
    repo.store_chart_config(&chart).await.unwrap();
    store_default_template(&repo, vec![DataBlock::new(1, "gender-split", 0)]).await;

    let project_id = project_with_stats(&repo, &[("female", 180.0), ("male", 220.0)]).await;
    let report = build_project_report(&repo, &registry, &resolver, project_id)
        .await
        .unwrap();

    match &report.blocks[0].results[0].payload {
        ChartPayload::Segments { segments, total } => {
            assert_eq!(*total, 400.0);
            assert_eq!(segments[0].percentage, 45.0);
            assert_eq!(segments[1].percentage, 55.0);
        }
        other => panic!("expected segments, got {:?}", other),
    }
}

#[tokio::test]
async fn test_derived_rate_with_zero_denominator_reads_zero() {
    let repo = LocalRepository::new();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    repo.store_chart_config(&kpi_chart("approval", "stats.approvalRate"))
        .await
        .unwrap();
    store_default_template(&repo, vec![DataBlock::new(1, "approval", 0)]).await;

    let project_id =
        project_with_stats(&repo, &[("approvedImages", 50.0), ("remoteImages", 0.0)]).await;
    let report = build_project_report(&repo, &registry, &resolver, project_id)
        .await
        .unwrap();

    assert_eq!(
        report.blocks[0].results[0].payload,
        ChartPayload::Kpi {
            value: KpiValue::Number(0.0)
        }
    );
}

#[tokio::test]
async fn test_block_with_unknown_chart_recovers_in_place() {
    let repo = LocalRepository::new();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    repo.store_chart_config(&kpi_chart("attendance", "stats.attendance"))
        .await
        .unwrap();
    store_default_template(
        &repo,
        vec![
            DataBlock::new(1, "retired-chart", 0),
            DataBlock::new(2, "attendance", 1),
        ],
    )
    .await;

    let project_id = project_with_stats(&repo, &[("attendance", 900.0)]).await;
    let report = build_project_report(&repo, &registry, &resolver, project_id)
        .await
        .unwrap();

    assert_eq!(report.blocks.len(), 2);
    let broken = &report.blocks[0];
    assert!(broken.error.as_deref().unwrap().contains("retired-chart"));
    assert!(broken.results.is_empty());
    assert_eq!(
        report.blocks[1].results[0].payload,
        ChartPayload::Kpi {
            value: KpiValue::Number(900.0)
        }
    );
}

#[tokio::test]
async fn test_report_serialization_is_byte_identical_across_runs() {
    let repo = LocalRepository::with_demo_data();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    let first = build_project_report(&repo, &registry, &resolver, ProjectId::new(1))
        .await
        .unwrap();
    let second = build_project_report(&repo, &registry, &resolver, ProjectId::new(1))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_report_for_missing_project_is_not_found() {
    let repo = LocalRepository::new();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    let err = build_project_report(&repo, &registry, &resolver, ProjectId::new(404))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_preview_renders_whole_demo_catalog_cleanly() {
    let repo = LocalRepository::with_demo_data();
    let registry = VariableRegistry::with_builtins();

    let preview = fansight_rust::services::build_preview(&repo, &registry)
        .await
        .unwrap();

    assert_eq!(preview.entries.len(), 8);
    for entry in &preview.entries {
        assert!(entry.error.is_none(), "{}: {:?}", entry.chart_id, entry.error);
        for result in &entry.results {
            assert_ne!(
                result.payload,
                ChartPayload::InsufficientData,
                "{}",
                entry.chart_id
            );
        }
    }

    // Every non-derived registry variable is present in the synthetic record.
    for variable in registry.list().iter().filter(|v| !v.derived) {
        assert!(preview.stats.contains(&variable.name), "{}", variable.name);
    }
}

#[tokio::test]
async fn test_preview_of_empty_catalog_is_empty() {
    let repo = LocalRepository::new();
    let registry = VariableRegistry::with_builtins();

    let preview = fansight_rust::services::build_preview(&repo, &registry)
        .await
        .unwrap();

    assert!(preview.entries.is_empty());
}

#[tokio::test]
async fn test_explicit_block_width_clamps_per_breakpoint() {
    let repo = LocalRepository::new();
    let registry = VariableRegistry::with_builtins();
    let resolver = TemplateResolver::standard();

    let chart = ChartConfig::new(
        "funnel",
        "Images funnel",
        ChartType::Bar,
        vec![
            ChartElement::new("stats.remoteImages"),
            ChartElement::new("stats.approvedImages"),
        ],
    );
    repo.store_chart_config(&chart).await.unwrap();
    store_default_template(&repo, vec![DataBlock::new(1, "funnel", 0).with_width(5)]).await;

    let project_id =
        project_with_stats(&repo, &[("remoteImages", 100.0), ("approvedImages", 80.0)]).await;
    let report = build_project_report(&repo, &registry, &resolver, project_id)
        .await
        .unwrap();

    let widths = report.blocks[0].widths;
    assert_eq!(widths.desktop, 5);
    assert_eq!(widths.tablet, 2);
    assert_eq!(widths.mobile, 2);
}
