//! Fact use-case service.
//!
//! # Responsibility
//! - Turn raw request parameters into bounded repository queries.
//! - Provide list/get/create/replace/patch/delete plus stats, search,
//!   random pick, bulk create, health and seed reload.
//!
//! # Invariants
//! - Existence is checked before validation on replace/patch, so an unknown
//!   id always reports `NotFound`.
//! - `date_enregistrement` is never touched after creation.
//! - Bulk create is best-effort: entries are inserted one by one and earlier
//!   inserts stay in place when a later entry fails.

use crate::model::fact::{Fact, FactDraft, FactId, FactPatch, FactValidationError};
use crate::repo::fact_repo::{
    FactListQuery, FactRepository, FactSearchQuery, RepoError, TechnoCount,
};
use crate::seed::SEED_FACTS;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const LIST_DEFAULT_LIMIT: u32 = 10;
pub const LIST_LIMIT_MAX: u32 = 100;
pub const SEARCH_DEFAULT_LIMIT: u32 = 10;
pub const SEARCH_LIMIT_MAX: u32 = 50;
pub const RECENT_FACTS_LIMIT: u32 = 5;
pub const SEARCH_USAGE_EXAMPLE: &str = "/api/examples/search?q=javascript&techno=PHP";

const SEARCH_USAGE_MESSAGE: &str =
    "You must provide at least one search term (q) or technology (techno)";
const BULK_REQUIRED_MESSAGE: &str = "Fields \"fact\" and \"techno\" are required";

/// Service error for fact use-cases.
#[derive(Debug)]
pub enum FactServiceError {
    /// Field-level constraint failures; nothing was written.
    Validation(FactValidationError),
    /// Target fact does not exist.
    NotFound(FactId),
    /// Request parameters do not form a usable query.
    Usage {
        message: &'static str,
        example: &'static str,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for FactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "fact not found: {id}"),
            Self::Usage { message, .. } => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::Usage { .. } => None,
        }
    }
}

impl From<RepoError> for FactServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<FactValidationError> for FactServiceError {
    fn from(value: FactValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, FactServiceError>;

/// Raw list parameters; out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Exact technology filter; empty means no filter.
    pub techno: Option<String>,
}

/// Pagination metadata for one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u64,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    fn new(page: u64, per_page: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(per_page));
        Self {
            current_page: page,
            per_page,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// One listing page with the filter that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactPage {
    pub items: Vec<Fact>,
    pub pagination: Pagination,
    pub techno: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactStats {
    pub total_facts: u64,
    pub technologies: Vec<TechnoCount>,
    pub recent_facts: Vec<Fact>,
}

/// Raw search parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub text: Option<String>,
    pub techno: Option<String>,
    pub limit: Option<i64>,
}

/// Search hits plus the normalized query that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub search_term: String,
    pub techno: String,
    pub limit: u32,
    pub results: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnologySummary {
    pub technologies: Vec<TechnoCount>,
    pub total_technologies: usize,
}

/// One bulk-create input entry. Missing fields count as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BulkEntry {
    #[serde(default)]
    pub fact: Option<String>,
    #[serde(default)]
    pub techno: Option<String>,
}

impl BulkEntry {
    pub fn new(fact: impl Into<String>, techno: impl Into<String>) -> Self {
        Self {
            fact: Some(fact.into()),
            techno: Some(techno.into()),
        }
    }

    fn to_draft(&self) -> FactDraft {
        FactDraft::new(
            self.fact.clone().unwrap_or_default(),
            self.techno.clone().unwrap_or_default(),
        )
    }
}

/// A rejected bulk entry, addressed by its position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkEntryError {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkCreateOutcome {
    pub created: Vec<Fact>,
    pub errors: Vec<BulkEntryError>,
}

/// Datastore liveness snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Probe failure message; `None` when the datastore answered.
    pub database_error: Option<String>,
    /// Row count, present only when the probe succeeded.
    pub total_facts: Option<u64>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.database_error.is_none()
    }
}

/// Fact use-case facade over a repository implementation.
pub struct FactService<R: FactRepository> {
    repo: R,
}

impl<R: FactRepository> FactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists one page of facts, newest first.
    pub fn list_facts(&self, request: &ListRequest) -> ServiceResult<FactPage> {
        let page = normalize_page(request.page);
        let per_page = normalize_limit(request.limit, LIST_DEFAULT_LIMIT, LIST_LIMIT_MAX);
        let techno = non_empty(request.techno.as_deref());

        let query = FactListQuery {
            techno: techno.clone(),
            offset: (page - 1).saturating_mul(u64::from(per_page)),
            limit: per_page,
        };
        let slice = self.repo.list_facts(&query)?;

        Ok(FactPage {
            items: slice.items,
            pagination: Pagination::new(page, per_page, slice.total),
            techno,
        })
    }

    pub fn get_fact(&self, id: FactId) -> ServiceResult<Fact> {
        self.repo
            .get_fact(id)?
            .ok_or(FactServiceError::NotFound(id))
    }

    /// Validates and persists a new fact.
    pub fn create_fact(&self, draft: &FactDraft) -> ServiceResult<Fact> {
        draft.validate()?;
        let fact = self.repo.insert_fact(draft)?;
        info!(
            "event=fact_create module=service status=ok id={} techno_len={}",
            fact.id,
            fact.techno.chars().count()
        );
        Ok(fact)
    }

    /// Replaces both mutable fields of an existing fact.
    pub fn replace_fact(&self, id: FactId, draft: &FactDraft) -> ServiceResult<Fact> {
        self.get_fact(id)?;
        draft.validate()?;
        let fact = self.repo.update_fact(id, draft)?;
        info!("event=fact_replace module=service status=ok id={id}");
        Ok(fact)
    }

    /// Applies only the fields present in `patch`, then validates the result.
    /// An empty patch writes nothing and returns the stored fact.
    pub fn patch_fact(&self, id: FactId, patch: &FactPatch) -> ServiceResult<Fact> {
        let current = self.get_fact(id)?;
        if patch.is_empty() {
            info!("event=fact_patch module=service status=noop id={id}");
            return Ok(current);
        }
        let draft = patch.apply_to(&current);
        draft.validate()?;
        let fact = self.repo.update_fact(id, &draft)?;
        info!(
            "event=fact_patch module=service status=ok id={} fact_set={} techno_set={}",
            id,
            patch.fact.is_some(),
            patch.techno.is_some()
        );
        Ok(fact)
    }

    /// Deletes an existing fact and returns its id.
    pub fn delete_fact(&self, id: FactId) -> ServiceResult<FactId> {
        if !self.repo.delete_fact(id)? {
            return Err(FactServiceError::NotFound(id));
        }
        info!("event=fact_delete module=service status=ok id={id}");
        Ok(id)
    }

    pub fn stats(&self) -> ServiceResult<FactStats> {
        Ok(FactStats {
            total_facts: self.repo.count_facts()?,
            technologies: self.repo.count_by_techno()?,
            recent_facts: self.repo.recent_facts(RECENT_FACTS_LIMIT)?,
        })
    }

    /// Searches by substring and/or technology; at least one is required.
    pub fn search(&self, request: &SearchRequest) -> ServiceResult<SearchResults> {
        let text = non_empty(request.text.as_deref());
        let techno = non_empty(request.techno.as_deref());
        let limit = normalize_limit(request.limit, SEARCH_DEFAULT_LIMIT, SEARCH_LIMIT_MAX);

        if text.is_none() && techno.is_none() {
            return Err(FactServiceError::Usage {
                message: SEARCH_USAGE_MESSAGE,
                example: SEARCH_USAGE_EXAMPLE,
            });
        }

        let query = FactSearchQuery {
            text: text.clone(),
            techno: techno.clone(),
            limit,
        };
        let results = self.repo.search_facts(&query)?;

        Ok(SearchResults {
            search_term: text.unwrap_or_default(),
            techno: techno.unwrap_or_default(),
            limit,
            results,
        })
    }

    pub fn technologies(&self) -> ServiceResult<TechnologySummary> {
        let technologies = self.repo.count_by_techno()?;
        Ok(TechnologySummary {
            total_technologies: technologies.len(),
            technologies,
        })
    }

    /// Picks one fact uniformly at random, optionally within one technology.
    pub fn random_fact(&self, techno: Option<&str>) -> ServiceResult<Option<Fact>> {
        Ok(self.repo.random_fact(non_empty(techno).as_deref())?)
    }

    /// Inserts each valid entry independently and reports the rest by index.
    pub fn bulk_create(&self, entries: &[BulkEntry]) -> BulkCreateOutcome {
        let mut outcome = BulkCreateOutcome::default();

        for (index, entry) in entries.iter().enumerate() {
            let draft = entry.to_draft();
            if draft.has_blank_field() {
                outcome.errors.push(BulkEntryError {
                    index,
                    message: BULK_REQUIRED_MESSAGE.to_string(),
                });
                continue;
            }

            match self.repo.insert_fact(&draft) {
                Ok(fact) => outcome.created.push(fact),
                Err(err) => {
                    warn!(
                        "event=fact_bulk_entry module=service status=error index={index} error={err}"
                    );
                    outcome.errors.push(BulkEntryError {
                        index,
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            "event=fact_bulk_create module=service status=ok received={} created={} rejected={}",
            entries.len(),
            outcome.created.len(),
            outcome.errors.len()
        );
        outcome
    }

    /// Probes the datastore; only a failed count after a good probe is an error.
    pub fn health(&self) -> ServiceResult<HealthReport> {
        if let Err(err) = self.repo.ping() {
            warn!("event=health_probe module=service status=error error={err}");
            return Ok(HealthReport {
                database_error: Some(err.to_string()),
                total_facts: None,
            });
        }

        Ok(HealthReport {
            database_error: None,
            total_facts: Some(self.repo.count_facts()?),
        })
    }

    /// Empties the table and loads the built-in catalog.
    pub fn reload_seed_facts(&self) -> ServiceResult<usize> {
        let removed = self.repo.clear_facts()?;
        for (fact, techno) in SEED_FACTS {
            self.repo.insert_fact(&FactDraft::new(*fact, *techno))?;
        }
        info!(
            "event=seed_reload module=service status=ok removed={} inserted={}",
            removed,
            SEED_FACTS.len()
        );
        Ok(SEED_FACTS.len())
    }
}

fn normalize_page(page: Option<i64>) -> u64 {
    u64::try_from(page.unwrap_or(1)).unwrap_or(0).max(1)
}

fn normalize_limit(limit: Option<i64>, default: u32, max: u32) -> u32 {
    let clamped = limit
        .unwrap_or(i64::from(default))
        .clamp(1, i64::from(max));
    u32::try_from(clamped).unwrap_or(default)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
