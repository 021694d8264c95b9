//! Theme provisioning: upsert the bootstrap extension view and its
//! enablement parameters.

use std::path::PathBuf;

use serde_json::json;
use tracing::{info, warn};

use odoo_bridge_rpc::store::{row_id, row_text};
use odoo_bridge_rpc::{Domain, RecordStore, Row};

use crate::error::{CoreError, CoreResult};
use crate::outcome::{RunOutcome, RunStatus};
use crate::upsert::{desired_differs, field_values, upsert_param, PARAMETER_MODEL};

use super::assets::AssetBuilder;
use super::config::AppUiConfig;

const VIEW_MODEL: &str = "ir.ui.view";
const BASE_VIEW_KEY: &str = "web.webclient_bootstrap";

pub struct AppUiRunner<'a> {
    store: &'a dyn RecordStore,
    project_root: PathBuf,
    config: AppUiConfig,
}

impl<'a> AppUiRunner<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        project_root: impl Into<PathBuf>,
        config: AppUiConfig,
    ) -> Self {
        Self {
            store,
            project_root: project_root.into(),
            config,
        }
    }

    /// Compose the assets and upsert the view plus its parameters.
    pub async fn apply(&self) -> RunOutcome {
        let mut outcome = RunOutcome::new(RunStatus::Ready);
        if let Err(error) = self.apply_steps(&mut outcome).await {
            warn!(%error, "theme apply aborted");
            outcome.fail(&error);
        }
        outcome
    }

    async fn apply_steps(&self, outcome: &mut RunOutcome) -> CoreResult<()> {
        let arch_db = AssetBuilder::new(&self.project_root, &self.config).build_arch_db()?;
        let base_view_id = self.webclient_bootstrap_view_id().await?;
        let (view_id, changed) = self.upsert_assets_view(base_view_id, &arch_db).await?;
        info!(view_id, changed, "assets view ready");

        upsert_param(self.store, &self.config.enabled_param, "1").await?;
        upsert_param(self.store, &self.config.version_param, &self.config.version).await?;

        outcome.set(
            "view",
            json!({"id": view_id, "key": self.config.view_key, "changed": changed}),
        );
        outcome.set("version", &self.config.version);
        outcome.set("webclient_bootstrap_id", base_view_id);
        Ok(())
    }

    /// Read-only roster: the managed view (if any) and parameters.
    pub async fn status(&self) -> CoreResult<RunOutcome> {
        let view = self.current_view().await?;
        let params = self
            .store
            .find(
                PARAMETER_MODEL,
                &Domain::in_("key", self.config.parameter_keys()),
                &["id", "key", "value"],
                Some(20),
                None,
            )
            .await?;

        let mut outcome = RunOutcome::new(RunStatus::Ok);
        outcome.set("view", view);
        outcome.set("params", params);
        Ok(outcome)
    }

    /// Soft-deactivate the view (views are versioned, never hard-deleted
    /// here) and hard-delete the parameters.
    pub async fn rollback(&self) -> CoreResult<RunOutcome> {
        let mut deactivated = false;
        if let Some(view) = self.current_view().await? {
            if let Some(id) = row_id(&view) {
                self.store
                    .update(VIEW_MODEL, &[id], field_values([("active", false.into())]))
                    .await?;
                deactivated = true;
            }
        }

        let params = self
            .store
            .find(
                PARAMETER_MODEL,
                &Domain::in_("key", self.config.parameter_keys()),
                &["id", "key"],
                Some(20),
                None,
            )
            .await?;
        let param_ids: Vec<i64> = params.iter().filter_map(row_id).collect();
        if !param_ids.is_empty() {
            self.store
                .invoke(PARAMETER_MODEL, "unlink", vec![json!(param_ids)])
                .await?;
        }

        let mut outcome = RunOutcome::new(RunStatus::RolledBack);
        outcome.set("view_deactivated", deactivated);
        outcome.set("deleted_params", param_ids.len());
        Ok(outcome)
    }

    async fn webclient_bootstrap_view_id(&self) -> CoreResult<i64> {
        let rows = self
            .store
            .find(
                VIEW_MODEL,
                &Domain::eq("key", BASE_VIEW_KEY).and_eq("type", "qweb"),
                &["id"],
                Some(1),
                None,
            )
            .await?;
        rows.first()
            .and_then(row_id)
            .ok_or_else(|| CoreError::MissingBaseView(BASE_VIEW_KEY.to_string()))
    }

    /// The managed view under the current key, falling back to the legacy
    /// key from before the namespace migration.
    async fn current_view(&self) -> CoreResult<Option<Row>> {
        let rows = self
            .store
            .find(
                VIEW_MODEL,
                &Domain::in_("key", self.config.candidate_view_keys()),
                &[
                    "id",
                    "name",
                    "key",
                    "active",
                    "inherit_id",
                    "priority",
                    "arch_db",
                    "mode",
                    "type",
                ],
                Some(2),
                None,
            )
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(rows
            .iter()
            .find(|row| row_text(row, "key") == self.config.view_key)
            .or_else(|| rows.first())
            .cloned())
    }

    async fn upsert_assets_view(&self, base_view_id: i64, arch_db: &str) -> CoreResult<(i64, bool)> {
        let desired = field_values([
            ("name", self.config.view_name.as_str().into()),
            ("type", "qweb".into()),
            ("key", self.config.view_key.as_str().into()),
            ("mode", "extension".into()),
            ("inherit_id", base_view_id.into()),
            ("priority", 95.into()),
            ("active", true.into()),
            ("arch_db", arch_db.into()),
        ]);

        if let Some(current) = self.current_view().await? {
            let id = row_id(&current).ok_or_else(|| {
                CoreError::Rpc(odoo_bridge_rpc::RpcError::UnexpectedPayload(format!(
                    "{VIEW_MODEL} row without id"
                )))
            })?;
            let drifted = desired_differs(&current, &desired);
            if drifted {
                self.store.update(VIEW_MODEL, &[id], desired).await?;
            }
            return Ok((id, drifted));
        }

        let id = self.store.create(VIEW_MODEL, desired).await?;
        Ok((id, true))
    }
}
