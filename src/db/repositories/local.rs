//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap and Vec structures, providing fast, deterministic,
//! and isolated execution.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{PartnerId, ProjectId, TemplateId};
use crate::db::repository::*;
use crate::models::{
    ChartConfig, ChartElement, ChartType, DataBlock, Partner, ProjectInfo, ReportTemplate,
    StatsRecord, Variable,
};

/// In-memory local repository.
///
/// This implementation stores all data in memory using HashMaps and Vecs,
/// making it ideal for unit tests and local development that need isolation
/// and speed.
///
/// # Example
/// ```ignore
/// use fansight_rust::db::repositories::LocalRepository;
///
/// #[tokio::test]
/// async fn test_project_storage() {
///     let repo = LocalRepository::new();
///
///     let project = repo.create_project("Launch party", None, None).await.unwrap();
///
///     let projects = repo.list_projects().await.unwrap();
///     assert_eq!(projects.len(), 1);
///     assert_eq!(projects[0].id, project.id);
/// }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    projects: HashMap<ProjectId, ProjectInfo>,
    partners: HashMap<PartnerId, Partner>,
    stats: HashMap<ProjectId, StatsRecord>,

    // Catalogs keep insertion order; upserts replace in place
    variables: Vec<Variable>,
    charts: Vec<ChartConfig>,

    // Template hierarchy
    project_templates: HashMap<ProjectId, ReportTemplate>,
    partner_templates: HashMap<PartnerId, ReportTemplate>,
    default_template: Option<ReportTemplate>,

    // ID counters
    next_project_id: ProjectId,
    next_partner_id: PartnerId,
    next_template_id: TemplateId,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            projects: HashMap::new(),
            partners: HashMap::new(),
            stats: HashMap::new(),
            variables: Vec::new(),
            charts: Vec::new(),
            project_templates: HashMap::new(),
            partner_templates: HashMap::new(),
            default_template: None,
            next_project_id: ProjectId(1),
            next_partner_id: PartnerId(1),
            next_template_id: TemplateId(1),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a local repository seeded with demo data.
    ///
    /// The seed contains one partner, one project with a filled stats
    /// record, a chart catalog covering every chart type, and a default
    /// report template wired to those charts.
    pub fn with_demo_data() -> Self {
        let repo = Self::new();
        repo.seed_demo();
        repo
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of projects stored.
    pub fn project_count(&self) -> usize {
        self.data.read().projects.len()
    }

    /// Check if a project exists.
    pub fn has_project(&self, project_id: ProjectId) -> bool {
        self.data.read().projects.contains_key(&project_id)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read();
        if !data.is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }

    /// Helper to get a project or return NotFound error.
    fn get_project_impl(&self, project_id: ProjectId) -> RepositoryResult<ProjectInfo> {
        let data = self.data.read();
        data.projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Project {} not found", project_id)))
    }

    fn seed_demo(&self) {
        let mut data = self.data.write();

        let partner = Partner {
            id: PartnerId(1),
            name: "Northside Live".to_string(),
        };
        let project = ProjectInfo {
            id: ProjectId(1),
            name: "Summer Street Festival".to_string(),
            partner_id: Some(partner.id),
            event_date: Utc.with_ymd_and_hms(2026, 6, 20, 17, 0, 0).single(),
        };
        data.partners.insert(partner.id, partner);
        data.projects.insert(project.id, project);
        data.next_partner_id = PartnerId(2);
        data.next_project_id = ProjectId(2);

        data.charts = vec![
            ChartConfig::new(
                "attendance",
                "Attendance",
                ChartType::Kpi,
                vec![ChartElement::new("stats.attendance")],
            )
            .with_emoji("👥"),
            ChartConfig::new(
                "approval-rate",
                "Approval rate",
                ChartType::Kpi,
                vec![ChartElement::new("stats.approvalRate")],
            ),
            ChartConfig::new(
                "gender-split",
                "Gender split",
                ChartType::Pie,
                vec![
                    ChartElement::labeled("stats.female", "Female").with_color("#d81b60"),
                    ChartElement::labeled("stats.male", "Male").with_color("#1e88e5"),
                ],
            ),
            ChartConfig::new(
                "images-funnel",
                "Image funnel",
                ChartType::Bar,
                vec![
                    ChartElement::new("stats.remoteImages"),
                    ChartElement::new("stats.approvedImages"),
                    ChartElement::new("stats.printedImages"),
                    ChartElement::new("stats.sharedImages"),
                ],
            ),
            ChartConfig::new(
                "prints-and-shares",
                "Prints and shares",
                ChartType::Value,
                vec![
                    ChartElement::labeled("stats.printedImages", "Printed"),
                    ChartElement::labeled("stats.sharedImages", "Shared"),
                ],
            ),
            ChartConfig::new(
                "event-summary",
                "Event summary",
                ChartType::Text,
                vec![ChartElement::new("stats.eventSummary")],
            ),
            ChartConfig::new(
                "highlights",
                "Highlights",
                ChartType::Table,
                vec![ChartElement::new("stats.highlightsTable")],
            ),
            ChartConfig::new(
                "cover-photo",
                "Cover photo",
                ChartType::Image,
                vec![ChartElement {
                    aspect_ratio: Some(1.78),
                    ..ChartElement::new("stats.coverImage")
                }],
            ),
        ];

        data.default_template = Some(ReportTemplate::new(
            TemplateId(1),
            "Event recap",
            vec![
                DataBlock::new(1, "attendance", 0),
                DataBlock::new(2, "approval-rate", 1),
                DataBlock::new(3, "gender-split", 2),
                DataBlock::new(4, "images-funnel", 3).with_width(4),
                DataBlock::new(5, "prints-and-shares", 4),
                DataBlock::new(6, "event-summary", 5),
                DataBlock::new(7, "highlights", 6),
                DataBlock::new(8, "cover-photo", 7),
            ],
        ));
        data.next_template_id = TemplateId(2);

        let mut stats = StatsRecord::new();
        stats.set_number("attendance", 1850.0);
        stats.set_number("female", 940.0);
        stats.set_number("male", 860.0);
        stats.set_number("kids", 210.0);
        stats.set_number("remoteImages", 1200.0);
        stats.set_number("approvedImages", 1080.0);
        stats.set_number("rejectedImages", 120.0);
        stats.set_number("printedImages", 640.0);
        stats.set_number("sharedImages", 410.0);
        stats.set_number("visitLinkClicks", 320.0);
        stats.set_number("qrScans", 540.0);
        stats.set_number("emailsCollected", 275.0);
        stats.set_number("optIns", 190.0);
        stats.set_number("merchandiseSold", 85.0);
        stats.set_number("merchandiseRevenue", 1275.5);
        stats.set_text(
            "eventSummary",
            "A sunny Saturday brought record walk-in traffic; the photo booth queue \
             never dropped below ten people.",
        );
        stats.set_text(
            "highlightsTable",
            "| Metric | Value |\n| Prints | 640 |\n| Shares | 410 |",
        );
        stats.set_text("coverImage", "https://cdn.example.com/summer-street/cover.jpg");
        data.stats.insert(ProjectId(1), stats);
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Project Repository ====================

#[async_trait]
impl ProjectRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read();
        Ok(data.is_healthy)
    }

    async fn create_project(
        &self,
        name: &str,
        partner_id: Option<PartnerId>,
        event_date: Option<DateTime<Utc>>,
    ) -> RepositoryResult<ProjectInfo> {
        self.check_health()?;

        let mut data = self.data.write();
        if let Some(partner_id) = partner_id {
            if !data.partners.contains_key(&partner_id) {
                return Err(RepositoryError::not_found(format!(
                    "Partner {} not found",
                    partner_id
                )));
            }
        }

        let project_id = data.next_project_id;
        data.next_project_id = ProjectId(project_id.0 + 1);

        let project = ProjectInfo {
            id: project_id,
            name: name.to_string(),
            partner_id,
            event_date,
        };
        data.projects.insert(project_id, project.clone());

        Ok(project)
    }

    async fn get_project(&self, project_id: ProjectId) -> RepositoryResult<ProjectInfo> {
        self.get_project_impl(project_id)
    }

    async fn list_projects(&self) -> RepositoryResult<Vec<ProjectInfo>> {
        let data = self.data.read();

        let mut projects: Vec<ProjectInfo> = data.projects.values().cloned().collect();

        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    async fn create_partner(&self, name: &str) -> RepositoryResult<Partner> {
        self.check_health()?;

        let mut data = self.data.write();
        let partner_id = data.next_partner_id;
        data.next_partner_id = PartnerId(partner_id.0 + 1);

        let partner = Partner {
            id: partner_id,
            name: name.to_string(),
        };
        data.partners.insert(partner_id, partner.clone());

        Ok(partner)
    }

    async fn get_partner(&self, partner_id: PartnerId) -> RepositoryResult<Partner> {
        let data = self.data.read();
        data.partners
            .get(&partner_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Partner {} not found", partner_id)))
    }

    async fn get_stats_record(
        &self,
        project_id: ProjectId,
    ) -> RepositoryResult<Option<StatsRecord>> {
        let data = self.data.read();
        Ok(data.stats.get(&project_id).cloned())
    }

    async fn replace_stats_record(
        &self,
        project_id: ProjectId,
        record: &StatsRecord,
    ) -> RepositoryResult<()> {
        self.check_health()?;

        let mut data = self.data.write();
        if !data.projects.contains_key(&project_id) {
            return Err(RepositoryError::not_found(format!(
                "Project {} not found",
                project_id
            )));
        }

        data.stats.insert(project_id, record.clone());
        Ok(())
    }
}

// ==================== Catalog Repository ====================

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn list_variables(&self) -> RepositoryResult<Vec<Variable>> {
        let data = self.data.read();
        Ok(data.variables.clone())
    }

    async fn store_variable(&self, variable: &Variable) -> RepositoryResult<()> {
        self.check_health()?;

        let mut data = self.data.write();
        match data.variables.iter().position(|v| v.name == variable.name) {
            Some(pos) => data.variables[pos] = variable.clone(),
            None => data.variables.push(variable.clone()),
        }
        Ok(())
    }

    async fn list_chart_configs(&self) -> RepositoryResult<Vec<ChartConfig>> {
        let data = self.data.read();
        Ok(data.charts.clone())
    }

    async fn get_chart_config(&self, chart_id: &str) -> RepositoryResult<ChartConfig> {
        let data = self.data.read();
        data.charts
            .iter()
            .find(|c| c.chart_id == chart_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Chart {} not found", chart_id)))
    }

    async fn store_chart_config(&self, chart: &ChartConfig) -> RepositoryResult<()> {
        self.check_health()?;

        let mut data = self.data.write();
        match data
            .charts
            .iter()
            .position(|c| c.chart_id == chart.chart_id)
        {
            Some(pos) => data.charts[pos] = chart.clone(),
            None => data.charts.push(chart.clone()),
        }
        Ok(())
    }
}

// ==================== Template Repository ====================

#[async_trait]
impl TemplateRepository for LocalRepository {
    async fn get_project_template(
        &self,
        project_id: ProjectId,
    ) -> RepositoryResult<Option<ReportTemplate>> {
        let data = self.data.read();
        Ok(data.project_templates.get(&project_id).cloned())
    }

    async fn get_partner_template(
        &self,
        partner_id: PartnerId,
    ) -> RepositoryResult<Option<ReportTemplate>> {
        let data = self.data.read();
        Ok(data.partner_templates.get(&partner_id).cloned())
    }

    async fn get_default_template(&self) -> RepositoryResult<Option<ReportTemplate>> {
        let data = self.data.read();
        Ok(data.default_template.clone())
    }

    async fn store_template(
        &self,
        template: &ReportTemplate,
        scope: TemplateScope,
    ) -> RepositoryResult<TemplateId> {
        self.check_health()?;

        let mut data = self.data.write();
        let template_id = data.next_template_id;
        data.next_template_id = TemplateId(template_id.0 + 1);

        let mut stored = template.clone();
        stored.id = template_id;

        match scope {
            TemplateScope::Project(project_id) => {
                if !data.projects.contains_key(&project_id) {
                    return Err(RepositoryError::not_found(format!(
                        "Project {} not found",
                        project_id
                    )));
                }
                data.project_templates.insert(project_id, stored);
            }
            TemplateScope::Partner(partner_id) => {
                if !data.partners.contains_key(&partner_id) {
                    return Err(RepositoryError::not_found(format!(
                        "Partner {} not found",
                        partner_id
                    )));
                }
                data.partner_templates.insert(partner_id, stored);
            }
            TemplateScope::Default => {
                data.default_template = Some(stored);
            }
        }

        Ok(template_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatValue;

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_and_retrieve_project() {
        let repo = LocalRepository::new();

        let created = repo
            .create_project("Launch party", None, None)
            .await
            .unwrap();

        let retrieved = repo.get_project(created.id).await.unwrap();
        assert_eq!(retrieved.name, "Launch party");
        assert_eq!(retrieved.partner_id, None);
    }

    #[tokio::test]
    async fn test_create_project_rejects_unknown_partner() {
        let repo = LocalRepository::new();

        let result = repo
            .create_project("Launch party", Some(PartnerId(99)), None)
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_projects_sorted_by_id() {
        let repo = LocalRepository::new();

        repo.create_project("Second stored first", None, None)
            .await
            .unwrap();
        repo.create_project("Stored after", None, None)
            .await
            .unwrap();

        let projects = repo.list_projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects[0].id < projects[1].id);
    }

    #[tokio::test]
    async fn test_not_found_error() {
        let repo = LocalRepository::new();

        let result = repo.get_project(ProjectId(999)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stats_record_replacement() {
        let repo = LocalRepository::new();
        let project = repo.create_project("Expo", None, None).await.unwrap();

        assert!(repo.get_stats_record(project.id).await.unwrap().is_none());

        let mut record = StatsRecord::new();
        record.set_number("attendance", 250.0);
        record.set_number("qrScans", 40.0);
        repo.replace_stats_record(project.id, &record).await.unwrap();

        let stored = repo.get_stats_record(project.id).await.unwrap().unwrap();
        assert_eq!(stored.number("attendance"), Some(250.0));

        // Whole-record replacement: keys absent from the new record vanish
        let mut smaller = StatsRecord::new();
        smaller.set_number("attendance", 260.0);
        repo.replace_stats_record(project.id, &smaller)
            .await
            .unwrap();

        let stored = repo.get_stats_record(project.id).await.unwrap().unwrap();
        assert_eq!(stored.number("attendance"), Some(260.0));
        assert_eq!(stored.get("qrScans"), None);
    }

    #[tokio::test]
    async fn test_replace_stats_requires_project() {
        let repo = LocalRepository::new();

        let record = StatsRecord::new();
        let result = repo.replace_stats_record(ProjectId(42), &record).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_variable_upsert_keeps_insertion_order() {
        let repo = LocalRepository::new();

        let first = Variable::input(
            "vipGuests",
            "VIP guests",
            crate::models::VariableType::Count,
            "Audience",
        )
        .custom();
        let second = Variable::input(
            "pressPasses",
            "Press passes",
            crate::models::VariableType::Count,
            "Audience",
        )
        .custom();
        repo.store_variable(&first).await.unwrap();
        repo.store_variable(&second).await.unwrap();

        let mut renamed = first.clone();
        renamed.label = "VIP list".to_string();
        repo.store_variable(&renamed).await.unwrap();

        let variables = repo.list_variables().await.unwrap();
        assert_eq!(variables.len(), 2);
        assert_eq!(variables[0].label, "VIP list");
        assert_eq!(variables[1].name, "pressPasses");
    }

    #[tokio::test]
    async fn test_chart_config_upsert() {
        let repo = LocalRepository::new();

        let chart = ChartConfig::new(
            "scans",
            "QR scans",
            ChartType::Kpi,
            vec![ChartElement::new("stats.qrScans")],
        );
        repo.store_chart_config(&chart).await.unwrap();

        let mut updated = chart.clone();
        updated.title = "Total scans".to_string();
        repo.store_chart_config(&updated).await.unwrap();

        let charts = repo.list_chart_configs().await.unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].title, "Total scans");

        let fetched = repo.get_chart_config("scans").await.unwrap();
        assert_eq!(fetched.title, "Total scans");
    }

    #[tokio::test]
    async fn test_template_scopes() {
        let repo = LocalRepository::new();
        let partner = repo.create_partner("Acme").await.unwrap();
        let project = repo
            .create_project("Acme expo", Some(partner.id), None)
            .await
            .unwrap();

        assert!(repo.get_default_template().await.unwrap().is_none());

        let template = ReportTemplate::new(
            TemplateId(0),
            "Recap",
            vec![DataBlock::new(1, "attendance", 0)],
        );

        let default_id = repo
            .store_template(&template, TemplateScope::Default)
            .await
            .unwrap();
        let partner_id = repo
            .store_template(&template, TemplateScope::Partner(partner.id))
            .await
            .unwrap();
        let project_id = repo
            .store_template(&template, TemplateScope::Project(project.id))
            .await
            .unwrap();

        assert!(default_id < partner_id && partner_id < project_id);
        assert_eq!(
            repo.get_default_template().await.unwrap().unwrap().id,
            default_id
        );
        assert_eq!(
            repo.get_partner_template(partner.id).await.unwrap().unwrap().id,
            partner_id
        );
        assert_eq!(
            repo.get_project_template(project.id).await.unwrap().unwrap().id,
            project_id
        );
    }

    #[tokio::test]
    async fn test_template_scope_requires_owner() {
        let repo = LocalRepository::new();

        let template = ReportTemplate::new(TemplateId(0), "Recap", vec![]);
        let result = repo
            .store_template(&template, TemplateScope::Project(ProjectId(7)))
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_demo_seed_contents() {
        let repo = LocalRepository::with_demo_data();

        let projects = repo.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);

        let charts = repo.list_chart_configs().await.unwrap();
        assert!(charts.len() >= 6);
        for chart in &charts {
            chart.validate().unwrap();
        }

        let template = repo.get_default_template().await.unwrap().unwrap();
        assert!(!template.blocks.is_empty());
        for block in &template.blocks {
            assert!(charts.iter().any(|c| c.chart_id == block.chart_id));
        }

        let stats = repo
            .get_stats_record(projects[0].id)
            .await
            .unwrap()
            .unwrap();
        assert!(stats.number("attendance").is_some());
        assert!(matches!(
            stats.get("eventSummary"),
            Some(StatValue::Text(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let repo = LocalRepository::with_demo_data();
        assert_eq!(repo.project_count(), 1);
        assert!(repo.has_project(ProjectId(1)));

        repo.set_healthy(false);
        repo.clear();

        assert_eq!(repo.project_count(), 0);
        assert!(!repo.health_check().await.unwrap());
    }
}
