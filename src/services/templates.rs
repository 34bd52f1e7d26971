//! Report template resolution.
//!
//! Templates exist at three stored levels (project, partner, global
//! default) with a built-in fallback behind them. Resolution walks that
//! hierarchy, first match wins, and always reports which level answered
//! so callers can surface a "using fallback template" notice.

use log::debug;

use crate::db::repository::{FullRepository, RepositoryError};
use crate::db::services::fetch_template_candidates;
use crate::models::{ProjectInfo, ReportTemplate, ResolvedFrom};

/// Stored templates fetched for one resolution, by hierarchy level.
#[derive(Debug, Clone, Default)]
pub struct TemplateCandidates {
    pub project: Option<ReportTemplate>,
    pub partner: Option<ReportTemplate>,
    pub default: Option<ReportTemplate>,
}

/// A resolved template with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub template: ReportTemplate,
    pub resolved_from: ResolvedFrom,
    /// Human-readable description of the winning level.
    pub source: String,
}

/// Walks the template hierarchy. Resolution is read-only and total: it
/// always produces a template, ultimately the injected fallback.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    fallback: ReportTemplate,
}

impl TemplateResolver {
    pub fn new(fallback: ReportTemplate) -> Self {
        Self { fallback }
    }

    /// Resolver with the built-in minimal fallback.
    pub fn standard() -> Self {
        Self::new(ReportTemplate::fallback())
    }

    pub fn fallback(&self) -> &ReportTemplate {
        &self.fallback
    }

    /// Pick the most specific candidate for a project.
    pub fn resolve(
        &self,
        project: &ProjectInfo,
        candidates: TemplateCandidates,
    ) -> ResolvedTemplate {
        if let Some(template) = candidates.project {
            return ResolvedTemplate {
                template,
                resolved_from: ResolvedFrom::Project,
                source: format!("template attached to project {}", project.id),
            };
        }
        if let Some(partner_id) = project.partner_id {
            if let Some(template) = candidates.partner {
                return ResolvedTemplate {
                    template,
                    resolved_from: ResolvedFrom::Partner,
                    source: format!("template attached to partner {partner_id}"),
                };
            }
        }
        if let Some(template) = candidates.default {
            return ResolvedTemplate {
                template,
                resolved_from: ResolvedFrom::Default,
                source: "global default template".to_string(),
            };
        }

        debug!(
            "no stored template for project {}, using built-in fallback",
            project.id
        );
        ResolvedTemplate {
            template: self.fallback.clone(),
            resolved_from: ResolvedFrom::Hardcoded,
            source: "built-in fallback template".to_string(),
        }
    }
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::standard()
    }
}

/// Fetch the stored candidates for a project and resolve them.
pub async fn resolve_report_template(
    repo: &dyn FullRepository,
    resolver: &TemplateResolver,
    project: &ProjectInfo,
) -> Result<ResolvedTemplate, RepositoryError> {
    let candidates = fetch_template_candidates(repo, project).await?;
    Ok(resolver.resolve(project, candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{PartnerId, ProjectId, TemplateId};
    use crate::models::DataBlock;

    fn project(partner: Option<i64>) -> ProjectInfo {
        ProjectInfo {
            id: ProjectId::new(7),
            name: "Summer tour opener".to_string(),
            partner_id: partner.map(PartnerId::new),
            event_date: None,
        }
    }

    fn template(id: i64, name: &str) -> ReportTemplate {
        ReportTemplate::new(
            TemplateId::new(id),
            name,
            vec![DataBlock::new(1, "attendance", 0)],
        )
    }

    #[test]
    fn test_project_level_wins_over_everything() {
        let resolver = TemplateResolver::standard();
        let resolved = resolver.resolve(
            &project(Some(2)),
            TemplateCandidates {
                project: Some(template(10, "Project special")),
                partner: Some(template(11, "Partner house style")),
                default: Some(template(12, "Default")),
            },
        );

        assert_eq!(resolved.resolved_from, ResolvedFrom::Project);
        assert_eq!(resolved.template.name, "Project special");
        assert_eq!(resolved.source, "template attached to project 7");
    }

    #[test]
    fn test_partner_level_answers_when_project_has_none() {
        let resolver = TemplateResolver::standard();
        let resolved = resolver.resolve(
            &project(Some(2)),
            TemplateCandidates {
                project: None,
                partner: Some(template(11, "Partner house style")),
                default: Some(template(12, "Default")),
            },
        );

        assert_eq!(resolved.resolved_from, ResolvedFrom::Partner);
        assert_eq!(resolved.source, "template attached to partner 2");
    }

    #[test]
    fn test_partner_template_ignored_without_declared_partner() {
        let resolver = TemplateResolver::standard();
        let resolved = resolver.resolve(
            &project(None),
            TemplateCandidates {
                project: None,
                partner: Some(template(11, "Partner house style")),
                default: Some(template(12, "Default")),
            },
        );

        assert_eq!(resolved.resolved_from, ResolvedFrom::Default);
        assert_eq!(resolved.source, "global default template");
    }

    #[test]
    fn test_resolution_never_comes_up_empty() {
        let resolver = TemplateResolver::standard();
        let resolved = resolver.resolve(&project(None), TemplateCandidates::default());

        assert_eq!(resolved.resolved_from, ResolvedFrom::Hardcoded);
        assert_eq!(resolved.source, "built-in fallback template");
        assert!(!resolved.template.blocks.is_empty());
    }
}
