//! In-memory provider implementations.
//!
//! These back the default single-process deployment and all tests. Every
//! lifecycle rule goes through [`crate::lifecycle`], exactly like the
//! PostgreSQL store, so the two backings can never disagree about semantics.

use crate::clock::ReferenceClock;
use crate::config::LifecycleConfig;
use crate::error::{PortalError, Result};
use crate::lifecycle::{self, ConfirmedStatus, EffectiveStatus, ReleaseStatus};
use crate::providers::{
    JobRoleRepository, ReleaseStore, ReportFilter, SessionValidator, TutorialCatalog,
};
use crate::types::{
    Employee, JobRole, NewRelease, Release, ReleaseStats, ReleaseWithCreator, RoleType, Tutorial,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use tracing::info;
use uuid::Uuid;

const LOCK_POISONED: &str = "store lock poisoned";

/// In-memory release store.
///
/// Releases are kept in insertion order (which is creation order), so
/// newest-first reads are a reversal, deterministic even under a pinned test
/// clock where `created_at` ties.
pub struct MemoryReleaseStore {
    releases: RwLock<Vec<Release>>,
    employees: RwLock<HashMap<Uuid, Employee>>,
    clock: Arc<dyn ReferenceClock>,
    config: LifecycleConfig,
}

impl MemoryReleaseStore {
    /// Create an empty store driven by `clock`.
    pub fn new(clock: Arc<dyn ReferenceClock>, config: LifecycleConfig) -> Self {
        Self {
            releases: RwLock::new(Vec::new()),
            employees: RwLock::new(HashMap::new()),
            clock,
            config,
        }
    }

    /// Register an employee so creator joins can resolve.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] if the lock is poisoned.
    pub fn add_employee(&self, employee: Employee) -> Result<()> {
        self.employees
            .write()
            .map_err(|_| PortalError::Storage(LOCK_POISONED.to_string()))?
            .insert(employee.id, employee);
        Ok(())
    }

    /// Remove an employee, orphaning their releases (used to exercise the
    /// orphan-filtering read path).
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] if the lock is poisoned.
    pub fn remove_employee(&self, id: Uuid) -> Result<()> {
        self.employees
            .write()
            .map_err(|_| PortalError::Storage(LOCK_POISONED.to_string()))?
            .remove(&id);
        Ok(())
    }

    fn storage_err() -> PortalError {
        PortalError::Storage(LOCK_POISONED.to_string())
    }

    fn sweep_now(&self) -> Result<usize> {
        let now = self.clock.now_utc();
        let mut releases = self.releases.write().map_err(|_| Self::storage_err())?;
        let mut rewritten = 0;
        for release in releases.iter_mut() {
            if release.status == ReleaseStatus::Success
                && release.expiration_date.is_some_and(|expiration| expiration <= now)
            {
                release.status = ReleaseStatus::Expired;
                release.expiration_date = None;
                rewritten += 1;
            }
        }
        if rewritten > 0 {
            info!(count = rewritten, "Releases marked as expired");
        }
        Ok(rewritten)
    }

    fn joined(&self, filter: ReportFilter) -> Result<Vec<ReleaseWithCreator>> {
        let now = self.clock.now_utc();
        let releases = self.releases.read().map_err(|_| Self::storage_err())?;
        let employees = self.employees.read().map_err(|_| Self::storage_err())?;

        let mut rows: Vec<ReleaseWithCreator> = releases
            .iter()
            .filter(|release| filter.user_id.is_none_or(|user| release.user_id == user))
            .filter(|release| {
                filter.status.is_none_or(|status| {
                    lifecycle::effective_status(release.status, release.expiration_date, now)
                        == status
                })
            })
            .filter_map(|release| {
                // Orphaned rows (creator deleted) are dropped, not errors.
                employees.get(&release.user_id).map(|user| ReleaseWithCreator {
                    release: release.clone(),
                    user: user.clone(),
                })
            })
            .collect();
        rows.reverse();
        Ok(rows)
    }
}

impl ReleaseStore for MemoryReleaseStore {
    fn create(
        &self,
        release: NewRelease,
    ) -> Pin<Box<dyn Future<Output = Result<Release>> + Send + '_>> {
        Box::pin(async move {
            let release = Release {
                id: Uuid::new_v4(),
                user_id: release.user_id,
                client_name: release.client_name,
                client_cpf: release.client_cpf,
                client_email: release.client_email,
                client_phone: release.client_phone,
                company_name: release.company_name,
                company_document: release.company_document,
                company_role: release.company_role,
                tutorial_ids: release.tutorial_ids,
                status: ReleaseStatus::Pending,
                expiration_date: None,
                created_at: self.clock.now_utc(),
            };
            self.releases
                .write()
                .map_err(|_| Self::storage_err())?
                .push(release.clone());
            Ok(release)
        })
    }

    fn get_by_user(
        &self,
        user_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now()?;
            let releases = self.releases.read().map_err(|_| Self::storage_err())?;
            let mut rows: Vec<Release> = releases
                .iter()
                .filter(|release| release.user_id == user_id)
                .cloned()
                .collect();
            rows.reverse();
            Ok(rows)
        })
    }

    fn get_all(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReleaseWithCreator>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now()?;
            self.joined(ReportFilter::default())
        })
    }

    fn update_status(
        &self,
        id: Uuid,
        status: ConfirmedStatus,
    ) -> Pin<Box<dyn Future<Output = Result<Release>> + Send + '_>> {
        Box::pin(async move {
            let now = self.clock.now_utc();
            let (new_status, expiration) =
                lifecycle::apply_confirmation(status, now, &self.config);

            let mut releases = self.releases.write().map_err(|_| Self::storage_err())?;
            let release = releases
                .iter_mut()
                .find(|release| release.id == id)
                .ok_or_else(|| PortalError::not_found("release", id))?;

            release.status = new_status;
            release.expiration_date = expiration;
            Ok(release.clone())
        })
    }

    fn get_by_effective_status(
        &self,
        status: EffectiveStatus,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now()?;
            let now = self.clock.now_utc();
            let releases = self.releases.read().map_err(|_| Self::storage_err())?;
            let mut rows: Vec<Release> = releases
                .iter()
                .filter(|release| {
                    lifecycle::effective_status(release.status, release.expiration_date, now)
                        == status
                })
                .cloned()
                .collect();
            rows.reverse();
            Ok(rows)
        })
    }

    fn stats(&self) -> Pin<Box<dyn Future<Output = Result<ReleaseStats>> + Send + '_>> {
        Box::pin(async move {
            let now = self.clock.now_utc();
            let releases = self.releases.read().map_err(|_| Self::storage_err())?;

            let mut stats = ReleaseStats {
                total: releases.len() as u64,
                pending: 0,
                success: 0,
                failed: 0,
                expired: 0,
                success_rate: 0,
            };
            for release in releases.iter() {
                match lifecycle::effective_status(release.status, release.expiration_date, now) {
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
        Box::pin(async move { self.sweep_now() })
    }

    fn get_for_report(
        &self,
        filter: ReportFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReleaseWithCreator>>> + Send + '_>> {
        Box::pin(async move {
            self.sweep_now()?;
            self.joined(filter)
        })
    }
}

/// In-memory tutorial catalog.
#[derive(Default)]
pub struct MemoryCatalog {
    tutorials: RwLock<Vec<Tutorial>>,
}

impl MemoryCatalog {
    /// Create a catalog seeded with `tutorials`.
    #[must_use]
    pub fn new(tutorials: Vec<Tutorial>) -> Self {
        Self {
            tutorials: RwLock::new(tutorials),
        }
    }
}

impl TutorialCatalog for MemoryCatalog {
    fn get_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Tutorial>>> + Send + '_>> {
        Box::pin(async move {
            Ok(self
                .tutorials
                .read()
                .map_err(|_| MemoryReleaseStore::storage_err())?
                .clone())
        })
    }

    fn get_by_ids(
        &self,
        ids: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Tutorial>>> + Send + '_>> {
        Box::pin(async move {
            let tutorials = self
                .tutorials
                .read()
                .map_err(|_| MemoryReleaseStore::storage_err())?;
            Ok(tutorials
                .iter()
                .filter(|tutorial| ids.contains(&tutorial.id))
                .cloned()
                .collect())
        })
    }
}

/// In-memory job role lookup.
#[derive(Default)]
pub struct MemoryJobRoles {
    roles: RwLock<Vec<JobRole>>,
}

impl MemoryJobRoles {
    /// Create a lookup seeded with `roles`.
    #[must_use]
    pub fn new(roles: Vec<JobRole>) -> Self {
        Self {
            roles: RwLock::new(roles),
        }
    }
}

impl JobRoleRepository for MemoryJobRoles {
    fn get_active(
        &self,
        role_type: Option<RoleType>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<JobRole>>> + Send + '_>> {
        Box::pin(async move {
            let roles = self
                .roles
                .read()
                .map_err(|_| MemoryReleaseStore::storage_err())?;
            let mut active: Vec<JobRole> = roles
                .iter()
                .filter(|role| role.active)
                .filter(|role| role_type.is_none_or(|kind| role.role_type == kind))
                .cloned()
                .collect();
            active.sort_by(|a, b| {
                a.sort_order
                    .cmp(&b.sort_order)
                    .then_with(|| a.name.cmp(&b.name))
            });
            Ok(active)
        })
    }
}

/// Static token-to-employee session table.
///
/// Stands in for the portal's real session backend in development and tests;
/// auth mechanics are out of scope for this core.
#[derive(Default)]
pub struct StaticSessions {
    sessions: RwLock<HashMap<String, Employee>>,
}

impl StaticSessions {
    /// Create an empty session table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `token` to `employee`.
    pub fn insert(&self, token: impl Into<String>, employee: Employee) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(token.into(), employee);
        }
    }
}

impl SessionValidator for StaticSessions {
    fn resolve(
        &self,
        token: String,
    ) -> Pin<Box<dyn Future<Output = Option<Employee>> + Send + '_>> {
        Box::pin(async move {
            self.sessions
                .read()
                .ok()
                .and_then(|sessions| sessions.get(&token).cloned())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Duration;

    fn employee() -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: "Marina Lopes".to_string(),
            email: "marina@nextest.com.br".to_string(),
            department: "Vendas".to_string(),
        }
    }

    fn new_release(user_id: Uuid) -> NewRelease {
        NewRelease {
            user_id,
            client_name: "Ana Souza".to_string(),
            client_cpf: "12345678901".to_string(),
            client_email: "ana@cliente.com.br".to_string(),
            client_phone: None,
            company_name: "Acme Ltda".to_string(),
            company_document: "12345678000199".to_string(),
            company_role: "Compras".to_string(),
            tutorial_ids: vec!["t1".to_string(), "t2".to_string()],
        }
    }

    fn store_with_clock() -> (Arc<FixedClock>, MemoryReleaseStore) {
        let clock = Arc::new(FixedClock::now());
        let store = MemoryReleaseStore::new(clock.clone(), LifecycleConfig::default());
        (clock, store)
    }

    #[tokio::test]
    async fn test_create_starts_pending_without_expiration() {
        let (_, store) = store_with_clock();
        let creator = employee();
        let release = store.create(new_release(creator.id)).await.unwrap();

        assert_eq!(release.status, ReleaseStatus::Pending);
        assert_eq!(release.expiration_date, None);
        assert_eq!(release.tutorial_ids, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_update_status_unknown_id_is_not_found() {
        let (_, store) = store_with_clock();
        let err = store
            .update_status(Uuid::new_v4(), ConfirmedStatus::Success)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_success_opens_window_then_lapses() {
        let (clock, store) = store_with_clock();
        let creator = employee();
        store.add_employee(creator.clone()).unwrap();
        let release = store.create(new_release(creator.id)).await.unwrap();

        let updated = store
            .update_status(release.id, ConfirmedStatus::Success)
            .await
            .unwrap();
        assert_eq!(updated.status, ReleaseStatus::Success);
        let expiration = updated.expiration_date.expect("window must be open");
        let delta = expiration - clock.now_utc();
        assert!(delta >= Duration::days(89) && delta <= Duration::days(91));

        // Invariant: expiration present iff effectively success.
        let successes = store
            .get_by_effective_status(EffectiveStatus::Success)
            .await
            .unwrap();
        assert_eq!(successes.len(), 1);

        // Past the window the same row reads as expired...
        clock.advance(Duration::days(91));
        let expired = store
            .get_by_effective_status(EffectiveStatus::Expired)
            .await
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].status, ReleaseStatus::Expired);
        assert_eq!(expired[0].expiration_date, None);

        // ...and no longer as success.
        let successes = store
            .get_by_effective_status(EffectiveStatus::Success)
            .await
            .unwrap();
        assert!(successes.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let (clock, store) = store_with_clock();
        let creator = employee();
        store.add_employee(creator.clone()).unwrap();
        let release = store.create(new_release(creator.id)).await.unwrap();
        store
            .update_status(release.id, ConfirmedStatus::Success)
            .await
            .unwrap();

        clock.advance(Duration::days(91));
        assert_eq!(store.sweep_expired().await.unwrap(), 1);
        assert_eq!(store.sweep_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_last_write_wins_success_then_failed() {
        let (_, store) = store_with_clock();
        let creator = employee();
        let release = store.create(new_release(creator.id)).await.unwrap();

        store
            .update_status(release.id, ConfirmedStatus::Success)
            .await
            .unwrap();
        let after = store
            .update_status(release.id, ConfirmedStatus::Failed)
            .await
            .unwrap();

        assert_eq!(after.status, ReleaseStatus::Failed);
        assert_eq!(after.expiration_date, None);
    }

    #[tokio::test]
    async fn test_get_by_user_filters_creator_newest_first() {
        let (clock, store) = store_with_clock();
        let creator = employee();
        let other = employee();
        let first = store.create(new_release(creator.id)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = store.create(new_release(creator.id)).await.unwrap();
        store.create(new_release(other.id)).await.unwrap();

        let rows = store.get_by_user(creator.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[1].id, first.id);
    }

    #[tokio::test]
    async fn test_get_by_user_sweeps_lapsed_successes() {
        let (clock, store) = store_with_clock();
        let creator = employee();
        let release = store.create(new_release(creator.id)).await.unwrap();
        store
            .update_status(release.id, ConfirmedStatus::Success)
            .await
            .unwrap();

        clock.advance(Duration::days(91));
        let rows = store.get_by_user(creator.id).await.unwrap();

        // A lapsed success must read back as expired with no window, the
        // same as through every other list read.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ReleaseStatus::Expired);
        assert_eq!(rows[0].expiration_date, None);
    }

    #[tokio::test]
    async fn test_get_all_joins_creator_and_drops_orphans() {
        let (_, store) = store_with_clock();
        let kept = employee();
        let gone = employee();
        store.add_employee(kept.clone()).unwrap();
        store.add_employee(gone.clone()).unwrap();
        store.create(new_release(kept.id)).await.unwrap();
        store.create(new_release(gone.id)).await.unwrap();

        store.remove_employee(gone.id).unwrap();
        let rows = store.get_all().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user.id, kept.id);
    }

    #[tokio::test]
    async fn test_get_all_is_newest_first() {
        let (clock, store) = store_with_clock();
        let creator = employee();
        store.add_employee(creator.clone()).unwrap();
        let first = store.create(new_release(creator.id)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = store.create(new_release(creator.id)).await.unwrap();

        let rows = store.get_all().await.unwrap();
        assert_eq!(rows[0].release.id, second.id);
        assert_eq!(rows[1].release.id, first.id);
    }

    #[tokio::test]
    async fn test_stats_use_effective_status() {
        let (clock, store) = store_with_clock();
        let creator = employee();
        store.add_employee(creator.clone()).unwrap();

        let lapsing = store.create(new_release(creator.id)).await.unwrap();
        store
            .update_status(lapsing.id, ConfirmedStatus::Success)
            .await
            .unwrap();
        let open = store.create(new_release(creator.id)).await.unwrap();
        let failed = store.create(new_release(creator.id)).await.unwrap();
        store
            .update_status(failed.id, ConfirmedStatus::Failed)
            .await
            .unwrap();
        store.create(new_release(creator.id)).await.unwrap(); // stays pending

        // Lapse the first success, refresh the second afterwards.
        clock.advance(Duration::days(91));
        store
            .update_status(open.id, ConfirmedStatus::Success)
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.success_rate, 25);
    }

    #[tokio::test]
    async fn test_report_filters_by_effective_status() {
        let (_, store) = store_with_clock();
        let creator = employee();
        store.add_employee(creator.clone()).unwrap();
        let release = store.create(new_release(creator.id)).await.unwrap();
        store
            .update_status(release.id, ConfirmedStatus::Failed)
            .await
            .unwrap();
        store.create(new_release(creator.id)).await.unwrap();

        let failed = store
            .get_for_report(ReportFilter {
                user_id: None,
                status: Some(EffectiveStatus::Failed),
            })
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);

        let all = store.get_for_report(ReportFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_catalog_resolves_only_known_ids() {
        let catalog = MemoryCatalog::new(vec![
            Tutorial {
                id: "t1".to_string(),
                name: "Basics".to_string(),
                description: "Getting started".to_string(),
                tag: "intro".to_string(),
                id_cademi: 101,
            },
            Tutorial {
                id: "t2".to_string(),
                name: "Advanced".to_string(),
                description: "Deep dive".to_string(),
                tag: "advanced".to_string(),
                id_cademi: 102,
            },
        ]);

        let resolved = catalog
            .get_by_ids(vec!["t2".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id_cademi, 102);
    }

    #[tokio::test]
    async fn test_job_roles_filter_and_order() {
        let roles = MemoryJobRoles::new(vec![
            JobRole {
                id: Uuid::new_v4(),
                name: "Compras".to_string(),
                role_type: RoleType::ClientRole,
                sort_order: 2,
                active: true,
            },
            JobRole {
                id: Uuid::new_v4(),
                name: "Engenharia".to_string(),
                role_type: RoleType::Department,
                sort_order: 1,
                active: true,
            },
            JobRole {
                id: Uuid::new_v4(),
                name: "Obsoleto".to_string(),
                role_type: RoleType::Department,
                sort_order: 0,
                active: false,
            },
        ]);

        let departments = roles.get_active(Some(RoleType::Department)).await.unwrap();
        assert_eq!(departments.len(), 1);
        assert_eq!(departments[0].name, "Engenharia");

        let all = roles.get_active(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Engenharia");
    }

    #[tokio::test]
    async fn test_static_sessions_resolve() {
        let sessions = StaticSessions::new();
        let owner = employee();
        sessions.insert("token-abc", owner.clone());

        assert_eq!(
            sessions.resolve("token-abc".to_string()).await.map(|e| e.id),
            Some(owner.id)
        );
        assert!(sessions.resolve("other".to_string()).await.is_none());
    }
}
