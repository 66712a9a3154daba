// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool and storage layers

use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::analytics::AnalyticsService;
use crate::audit::AuditStorage;
use crate::currency::CurrencyConverter;
use crate::documents::DocumentStorage;
use crate::employees::EmployeeStorage;
use crate::feedback::FeedbackStorage;
use crate::files::{FileStore, LocalFileStore};
use crate::jobs::JobPostingStorage;
use crate::notifications::NotificationStorage;
use crate::payouts::PayoutStorage;
use crate::projects::ProjectStorage;
use crate::storage::{self, StorageError};
use crate::suggestions::SuggestionStorage;
use crate::surveys::SurveyStorage;
use crate::templates::TemplateStorage;
use crate::workflows::{WorkflowEngine, WorkflowStorage};

/// Shared database state for API handlers
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub project_storage: Arc<ProjectStorage>,
    pub employee_storage: Arc<EmployeeStorage>,
    pub feedback_storage: Arc<FeedbackStorage>,
    pub suggestion_storage: Arc<SuggestionStorage>,
    pub survey_storage: Arc<SurveyStorage>,
    pub job_storage: Arc<JobPostingStorage>,
    pub document_storage: Arc<DocumentStorage>,
    pub payout_storage: Arc<PayoutStorage>,
    pub template_storage: Arc<TemplateStorage>,
    pub workflow_storage: Arc<WorkflowStorage>,
    pub audit_storage: Arc<AuditStorage>,
    pub notification_storage: Arc<NotificationStorage>,
    pub workflow_engine: Arc<WorkflowEngine>,
    pub analytics: Arc<AnalyticsService>,
    pub file_store: Arc<dyn FileStore>,
}

impl DbState {
    /// Create state from an existing pool and collaborators
    pub fn new(
        pool: SqlitePool,
        converter: Arc<dyn CurrencyConverter>,
        file_store: Arc<dyn FileStore>,
    ) -> Self {
        let workflow_storage = Arc::new(WorkflowStorage::new(pool.clone()));
        let audit_storage = Arc::new(AuditStorage::new(pool.clone()));
        let notification_storage = Arc::new(NotificationStorage::new(pool.clone()));
        let workflow_engine = Arc::new(WorkflowEngine::new(
            workflow_storage.clone(),
            notification_storage.clone(),
            audit_storage.clone(),
        ));
        let analytics = Arc::new(AnalyticsService::new(pool.clone(), converter));

        Self {
            project_storage: Arc::new(ProjectStorage::new(pool.clone())),
            employee_storage: Arc::new(EmployeeStorage::new(pool.clone())),
            feedback_storage: Arc::new(FeedbackStorage::new(pool.clone())),
            suggestion_storage: Arc::new(SuggestionStorage::new(pool.clone())),
            survey_storage: Arc::new(SurveyStorage::new(pool.clone())),
            job_storage: Arc::new(JobPostingStorage::new(pool.clone())),
            document_storage: Arc::new(DocumentStorage::new(pool.clone())),
            payout_storage: Arc::new(PayoutStorage::new(pool.clone())),
            template_storage: Arc::new(TemplateStorage::new(pool.clone())),
            workflow_storage,
            audit_storage,
            notification_storage,
            workflow_engine,
            analytics,
            file_store,
            pool,
        }
    }

    /// Initialize state with the default database location
    pub async fn init(
        converter: Arc<dyn CurrencyConverter>,
        file_store: Arc<dyn FileStore>,
    ) -> Result<Self, StorageError> {
        Self::init_with_path(None, converter, file_store).await
    }

    /// Initialize state with an optional custom database path
    pub async fn init_with_path(
        database_path: Option<PathBuf>,
        converter: Arc<dyn CurrencyConverter>,
        file_store: Arc<dyn FileStore>,
    ) -> Result<Self, StorageError> {
        let database_path = database_path.unwrap_or_else(opsdesk_core::database_file);
        let pool = storage::connect(&database_path).await?;

        info!("Storage initialized at {}", database_path.display());

        Ok(Self::new(pool, converter, file_store))
    }

    /// In-memory state used by tests; blobs land in a temp directory
    pub async fn init_in_memory(
        converter: Arc<dyn CurrencyConverter>,
        blob_root: PathBuf,
    ) -> Result<Self, StorageError> {
        let pool = storage::connect_in_memory().await?;
        Ok(Self::new(
            pool,
            converter,
            Arc::new(LocalFileStore::new(blob_root)),
        ))
    }
}
