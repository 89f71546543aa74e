//! PostgreSQL release store.
//!
//! Persistent backing for multi-instance deployments. Status updates are
//! single-row writes (last-write-wins, no versioning) and the sweep is one
//! `UPDATE … WHERE` statement, so all coordination happens through the
//! database.
//!
//! Queries are bound at runtime rather than through the compile-time-checked
//! macros, so the crate builds without a `DATABASE_URL` in the environment.

use crate::clock::ReferenceClock;
use crate::config::LifecycleConfig;
use crate::error::{PortalError, Result};
use crate::lifecycle::{self, ConfirmedStatus, EffectiveStatus, ReleaseStatus};
use crate::providers::{JobRoleRepository, ReleaseStore, ReportFilter, TutorialCatalog};
use crate::types::{
    Employee, JobRole, NewRelease, Release, ReleaseStats, ReleaseWithCreator, RoleType, Tutorial,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, QueryBuilder, Row};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const RELEASE_COLUMNS: &str = "id, user_id, client_name, client_cpf, client_email, client_phone, \
     company_name, company_document, company_role, tutorial_ids, status, expiration_date, created_at";

/// PostgreSQL-backed [`ReleaseStore`].
#[derive(Clone)]
pub struct PostgresReleaseStore {
    pool: PgPool,
    clock: Arc<dyn ReferenceClock>,
    config: LifecycleConfig,
}

impl PostgresReleaseStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: PgPool, clock: Arc<dyn ReferenceClock>, config: LifecycleConfig) -> Self {
        Self {
            pool,
            clock,
            config,
        }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PortalError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Insert or refresh an employee record.
    ///
    /// The portal binds sessions to employees provisioned out of band; this
    /// keeps the configured identity present for the creator join.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] if the write fails.
    pub async fn ensure_employee(&self, employee: &Employee) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, department) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE \
             SET name = EXCLUDED.name, email = EXCLUDED.email, department = EXCLUDED.department",
        )
        .bind(employee.id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.department)
        .execute(&self.pool)
        .await
        .map_err(|e| PortalError::Storage(format!("Employee upsert failed: {e}")))?;
        Ok(())
    }

    async fn sweep_now(&self) -> Result<usize> {
        let now = self.clock.now_utc();
        let result = sqlx::query(
            "UPDATE tutorial_releases \
             SET status = 'expired', expiration_date = NULL \
             WHERE status = 'success' \
               AND expiration_date IS NOT NULL \
               AND expiration_date <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| PortalError::Storage(format!("Sweep failed: {e}")))?;

        let rewritten = usize::try_from(result.rows_affected()).unwrap_or(usize::MAX);
        if rewritten > 0 {
            info!(count = rewritten, "Releases marked as expired");
        }
        Ok(rewritten)
    }

    fn push_effective_status_predicate(
        builder: &mut QueryBuilder<'_, sqlx::Postgres>,
        status: EffectiveStatus,
        now: DateTime<Utc>,
    ) {
        match status {
            EffectiveStatus::Pending => {
                builder.push("r.status = 'pending'");
            }
            EffectiveStatus::Failed => {
                builder.push("r.status = 'failed'");
            }
            EffectiveStatus::Success => {
                builder
                    .push("r.status = 'success' AND r.expiration_date IS NOT NULL AND r.expiration_date > ")
                    .push_bind(now);
            }
            EffectiveStatus::Expired => {
                builder
                    .push("(r.status = 'expired' OR (r.status = 'success' AND (r.expiration_date IS NULL OR r.expiration_date <= ")
                    .push_bind(now);
                builder.push(")))");
            }
        }
    }
}

/// Raw release row.
#[derive(FromRow)]
struct ReleaseRow {
    id: Uuid,
    user_id: Uuid,
    client_name: String,
    client_cpf: String,
    client_email: String,
    client_phone: Option<String>,
    company_name: String,
    company_document: String,
    company_role: String,
    tutorial_ids: Json<Vec<String>>,
    status: String,
    expiration_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ReleaseRow {
    fn into_release(self) -> Result<Release> {
        let status: ReleaseStatus = self
            .status
            .parse()
            .map_err(|_| PortalError::Storage(format!("Unknown stored status '{}'", self.status)))?;
        Ok(Release {
            id: self.id,
            user_id: self.user_id,
            client_name: self.client_name,
            client_cpf: self.client_cpf,
            client_email: self.client_email,
            client_phone: self.client_phone,
            company_name: self.company_name,
            company_document: self.company_document,
            company_role: self.company_role,
            tutorial_ids: self.tutorial_ids.0,
            status,
            expiration_date: self.expiration_date,
            created_at: self.created_at,
        })
    }
}

fn joined_from_row(row: &PgRow) -> Result<ReleaseWithCreator> {
    let release = ReleaseRow::from_row(row)
        .map_err(|e| PortalError::Storage(format!("Row decode failed: {e}")))?
        .into_release()?;
    let user = Employee {
        id: row
            .try_get("creator_id")
            .map_err(|e| PortalError::Storage(format!("Row decode failed: {e}")))?,
        name: row
            .try_get("creator_name")
            .map_err(|e| PortalError::Storage(format!("Row decode failed: {e}")))?,
        email: row
            .try_get("creator_email")
            .map_err(|e| PortalError::Storage(format!("Row decode failed: {e}")))?,
        department: row
            .try_get("creator_department")
            .map_err(|e| PortalError::Storage(format!("Row decode failed: {e}")))?,
    };
    Ok(ReleaseWithCreator { release, user })
}

fn joined_select() -> QueryBuilder<'static, sqlx::Postgres> {
    QueryBuilder::new(
        "SELECT r.id, r.user_id, r.client_name, r.client_cpf, r.client_email, r.client_phone, \
         r.company_name, r.company_document, r.company_role, r.tutorial_ids, r.status, \
         r.expiration_date, r.created_at, \
         u.id AS creator_id, u.name AS creator_name, u.email AS creator_email, \
         u.department AS creator_department \
         FROM tutorial_releases r \
         JOIN users u ON u.id = r.user_id",
    )
}

impl ReleaseStore for PostgresReleaseStore {
    fn create(
        &self,
        release: NewRelease,
    ) -> Pin<Box<dyn Future<Output = Result<Release>> + Send + '_>> {
        Box::pin(async move {
            let query = format!(
                "INSERT INTO tutorial_releases \
                 (id, user_id, client_name, client_cpf, client_email, client_phone, \
                  company_name, company_document, company_role, tutorial_ids, status, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending', $11) \
                 RETURNING {RELEASE_COLUMNS}"
            );
            let row: ReleaseRow = sqlx::query_as(&query)
                .bind(Uuid::new_v4())
                .bind(release.user_id)
                .bind(&release.client_name)
                .bind(&release.client_cpf)
                .bind(&release.client_email)
                .bind(&release.client_phone)
                .bind(&release.company_name)
                .bind(&release.company_document)
                .bind(&release.company_role)
                .bind(Json(&release.tutorial_ids))
                .bind(self.clock.now_utc())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| PortalError::Storage(format!("Insert failed: {e}")))?;
            row.into_release()
        })
    }

    fn get_by_user(
        &self,
        user_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now().await?;
            let query = format!(
                "SELECT {RELEASE_COLUMNS} FROM tutorial_releases \
                 WHERE user_id = $1 ORDER BY created_at DESC"
            );
            let rows: Vec<ReleaseRow> = sqlx::query_as(&query)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;
            rows.into_iter().map(ReleaseRow::into_release).collect()
        })
    }

    fn get_all(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReleaseWithCreator>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now().await?;
            let mut builder = joined_select();
            builder.push(" ORDER BY r.created_at DESC");
            let rows = builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;
            rows.iter().map(joined_from_row).collect()
        })
    }

    fn update_status(
        &self,
        id: Uuid,
        status: ConfirmedStatus,
    ) -> Pin<Box<dyn Future<Output = Result<Release>> + Send + '_>> {
        Box::pin(async move {
            let now = self.clock.now_utc();
            let (new_status, expiration) = lifecycle::apply_confirmation(status, now, &self.config);

            let query = format!(
                "UPDATE tutorial_releases \
                 SET status = $2, expiration_date = $3 \
                 WHERE id = $1 \
                 RETURNING {RELEASE_COLUMNS}"
            );
            let row: Option<ReleaseRow> = sqlx::query_as(&query)
                .bind(id)
                .bind(new_status.as_str())
                .bind(expiration)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortalError::Storage(format!("Update failed: {e}")))?;

            row.map_or_else(
                || Err(PortalError::not_found("release", id)),
                ReleaseRow::into_release,
            )
        })
    }

    fn get_by_effective_status(
        &self,
        status: EffectiveStatus,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now().await?;
            let now = self.clock.now_utc();
            let mut builder = QueryBuilder::new(format!(
                "SELECT {RELEASE_COLUMNS} FROM tutorial_releases r WHERE "
            ));
            Self::push_effective_status_predicate(&mut builder, status, now);
            builder.push(" ORDER BY created_at DESC");

            let rows: Vec<ReleaseRow> = builder
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;
            rows.into_iter().map(ReleaseRow::into_release).collect()
        })
    }

    fn stats(&self) -> Pin<Box<dyn Future<Output = Result<ReleaseStats>> + Send + '_>> {
        Box::pin(async move {
            let now = self.clock.now_utc();
            let rows: Vec<(String, Option<DateTime<Utc>>)> =
                sqlx::query_as("SELECT status, expiration_date FROM tutorial_releases")
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;

            let mut stats = ReleaseStats {
                total: rows.len() as u64,
                pending: 0,
                success: 0,
                failed: 0,
                expired: 0,
                success_rate: 0,
            };
            for (status, expiration) in rows {
                let stored: ReleaseStatus = status.parse().map_err(|_| {
                    PortalError::Storage(format!("Unknown stored status '{status}'"))
                })?;
                match lifecycle::effective_status(stored, expiration, now) {
                    EffectiveStatus::Pending => stats.pending += 1,
                    EffectiveStatus::Success => stats.success += 1,
                    EffectiveStatus::Failed => stats.failed += 1,
                    EffectiveStatus::Expired => stats.expired += 1,
                }
            }
            Ok(stats.with_rate())
        })
    }

    fn sweep_expired(&self) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>> {
        Box::pin(self.sweep_now())
    }

    fn get_for_report(
        &self,
        filter: ReportFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReleaseWithCreator>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now().await?;
            let now = self.clock.now_utc();

            let mut builder = joined_select();
            let mut has_where = false;
            if let Some(user_id) = filter.user_id {
                builder.push(" WHERE r.user_id = ").push_bind(user_id);
                has_where = true;
            }
            if let Some(status) = filter.status {
                builder.push(if has_where { " AND " } else { " WHERE " });
                Self::push_effective_status_predicate(&mut builder, status, now);
            }
            builder.push(" ORDER BY r.created_at DESC");

            let rows = builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;
            rows.iter().map(joined_from_row).collect()
        })
    }
}

/// PostgreSQL-backed [`TutorialCatalog`].
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a catalog over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TutorialCatalog for PostgresCatalog {
    fn get_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Tutorial>>> + Send + '_>> {
        Box::pin(async move {
            let rows: Vec<(String, String, String, String, i64)> = sqlx::query_as(
                "SELECT id, name, description, tag, id_cademi FROM tutorials ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;
            Ok(rows.into_iter().map(tutorial_from_row).collect())
        })
    }

    fn get_by_ids(
        &self,
        ids: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Tutorial>>> + Send + '_>> {
        Box::pin(async move {
            let rows: Vec<(String, String, String, String, i64)> = sqlx::query_as(
                "SELECT id, name, description, tag, id_cademi FROM tutorials \
                 WHERE id = ANY($1) ORDER BY name",
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;
            Ok(rows.into_iter().map(tutorial_from_row).collect())
        })
    }
}

fn tutorial_from_row(
    (id, name, description, tag, id_cademi): (String, String, String, String, i64),
) -> Tutorial {
    Tutorial {
        id,
        name,
        description,
        tag,
        id_cademi,
    }
}

/// PostgreSQL-backed [`JobRoleRepository`].
#[derive(Clone)]
pub struct PostgresJobRoles {
    pool: PgPool,
}

impl PostgresJobRoles {
    /// Create a lookup over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl JobRoleRepository for PostgresJobRoles {
    fn get_active(
        &self,
        role_type: Option<RoleType>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<JobRole>>> + Send + '_>> {
        Box::pin(async move {
            let mut builder = QueryBuilder::new(
                "SELECT id, name, role_type, sort_order, active FROM job_roles WHERE active",
            );
            if let Some(role_type) = role_type {
                builder.push(" AND role_type = ").push_bind(match role_type {
                    RoleType::Department => "department",
                    RoleType::ClientRole => "client_role",
                });
            }
            builder.push(" ORDER BY sort_order, name");

            let rows: Vec<(Uuid, String, String, i32, bool)> = builder
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortalError::Storage(format!("Query failed: {e}")))?;

            rows.into_iter()
                .map(|(id, name, role_type, sort_order, active)| {
                    let role_type = match role_type.as_str() {
                        "department" => RoleType::Department,
                        "client_role" => RoleType::ClientRole,
                        other => {
                            return Err(PortalError::Storage(format!(
                                "Unknown role type '{other}'"
                            )))
                        }
                    };
                    Ok(JobRole {
                        id,
                        name,
                        role_type,
                        sort_order,
                        active,
                    })
                })
                .collect()
        })
    }
}
