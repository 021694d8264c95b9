//! The invoice API provisioning runner: an ordered pipeline of upserts and
//! remote-dependent steps collected into one [`RunOutcome`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{json, Value};
use tracing::{info, warn};

use odoo_bridge_rpc::store::{row_id, row_text};
use odoo_bridge_rpc::{Domain, RecordStore, Row, RpcError, SchemaCache};

use crate::catalog::{load_or_seed_addenda_catalog, AddendaEntry};
use crate::error::{CoreError, CoreResult};
use crate::outcome::{RunOutcome, RunStatus};
use crate::payload::{filter_payload, PayloadMode};
use crate::token::random_token;
use crate::upsert::{
    desired_differs, field_values, resolve_param_with_fallback, upsert_param, upsert_record,
    PARAMETER_MODEL,
};

use super::config::InvoiceApiConfig;
use super::payloads;

const ACTION_MODEL: &str = "ir.actions.server";
const MODULE_MODEL: &str = "ir.module.module";
const ADDENDA_MODEL: &str = "l10n_mx_edi.addenda";

pub struct InvoiceApiRunner<'a> {
    store: &'a dyn RecordStore,
    project_root: PathBuf,
    config: InvoiceApiConfig,
    payload_mode: PayloadMode,
    schema: SchemaCache,
}

impl<'a> InvoiceApiRunner<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        project_root: impl Into<PathBuf>,
        config: InvoiceApiConfig,
        payload_mode: PayloadMode,
    ) -> Self {
        Self {
            store,
            project_root: project_root.into(),
            config,
            payload_mode,
            schema: SchemaCache::new(),
        }
    }

    /// Run the full provisioning pipeline. A fatal step aborts the rest and
    /// is reported in the outcome; the outcome itself is always returned.
    pub async fn run(&self) -> RunOutcome {
        let mut outcome = RunOutcome::new(RunStatus::Ready);
        outcome.set(
            "token",
            json!({"key": self.config.token_param, "created": false}),
        );
        outcome.set("baseline", self.config.baseline_complements());

        if let Err(error) = self.run_steps(&mut outcome).await {
            warn!(%error, "provisioning aborted");
            outcome.fail(&error);
        }
        outcome
    }

    async fn run_steps(&self, outcome: &mut RunOutcome) -> CoreResult<()> {
        let created = self.ensure_token().await?;
        outcome.set(
            "token",
            json!({"key": self.config.token_param, "created": created}),
        );
        info!(created, "token ready");

        let baseline = serde_json::to_string(&self.config.baseline_complements())
            .unwrap_or_default();
        upsert_param(self.store, &self.config.baseline_param, &baseline).await?;

        let mut modules = BTreeMap::new();
        modules.insert(
            self.config.required_module.clone(),
            self.ensure_module(&self.config.required_module, true)
                .await?,
        );
        for module in &self.config.optional_modules {
            let state = self.ensure_module(module, false).await?;
            // Absent optional modules are omitted from the output entirely.
            if state != "missing" {
                modules.insert(module.clone(), state);
            }
        }
        outcome.set("modules", &modules);

        let discovery = self.discover_complements().await?;
        let serialized = serde_json::to_string(&discovery).unwrap_or_default();
        upsert_param(self.store, &self.config.discovery_param, &serialized).await?;
        outcome.set("discovery", discovery);

        let addendas = self.sync_known_addendas().await?;
        // The persisted snapshot carries only the roster, not the per-run
        // create/update counters, so an unchanged catalog writes nothing.
        let snapshot = json!({
            "records": addendas.get("records").cloned().unwrap_or_else(|| json!([])),
            "catalog_count": addendas.get("catalog_count").cloned().unwrap_or_else(|| json!(0)),
        });
        let serialized = serde_json::to_string(&snapshot).unwrap_or_default();
        upsert_param(self.store, &self.config.addendas_param, &serialized).await?;
        outcome.set("addendas", addendas);

        let sale_order_model = self.model_id("sale.order").await?;
        let move_model = self.model_id("account.move").await?;
        let picking_model = self.model_id("stock.picking").await?;
        let (Some(sale_order_model), Some(move_model)) = (sale_order_model, move_model) else {
            return Err(CoreError::MissingModel(
                "sale.order/account.move".to_string(),
            ));
        };

        let mut actions = BTreeMap::new();
        actions.insert(
            "invoice_bridge",
            self.upsert_action(
                sale_order_model,
                &self.config.action_invoice,
                &payloads::invoice_bridge(&self.config),
            )
            .await?,
        );
        actions.insert(
            "payment_complement_bridge",
            self.upsert_action(
                move_model,
                &self.config.action_payment,
                &payloads::payment_bridge(&self.config),
            )
            .await?,
        );
        actions.insert(
            "foreign_trade_bridge",
            self.upsert_action(
                move_model,
                &self.config.action_foreign_trade,
                &payloads::foreign_trade_bridge(&self.config),
            )
            .await?,
        );
        actions.insert(
            "addenda_bridge",
            self.upsert_action(
                move_model,
                &self.config.action_addenda,
                &payloads::addenda_bridge(&self.config),
            )
            .await?,
        );
        actions.insert(
            "generic_complement_bridge",
            self.upsert_action(
                move_model,
                &self.config.action_generic,
                &payloads::generic_complements_bridge(&self.config),
            )
            .await?,
        );
        if let Some(picking_model) = picking_model {
            actions.insert(
                "carta_porte_bridge",
                self.upsert_action(
                    picking_model,
                    &self.config.action_carta_porte,
                    &payloads::carta_porte_bridge(&self.config),
                )
                .await?,
            );
        } else {
            outcome.warn("stock.picking model not found; carta porte bridge not created");
        }
        outcome.set("actions", &actions);

        Ok(())
    }

    /// Read-only roster of every artifact this bridge owns.
    pub async fn status(&self) -> CoreResult<RunOutcome> {
        let actions = self
            .store
            .find(
                ACTION_MODEL,
                &Domain::in_("name", self.config.action_names()),
                &["id", "name", "state", "model_id", "binding_model_id"],
                Some(200),
                None,
            )
            .await?;
        let params = self
            .store
            .find(
                PARAMETER_MODEL,
                &Domain::in_("key", self.config.parameter_keys()),
                &["id", "key", "value"],
                Some(200),
                None,
            )
            .await?;

        let mut outcome = RunOutcome::new(RunStatus::Ok);
        outcome.set("action_count", actions.len());
        outcome.set("param_count", params.len());
        outcome.set("actions", actions);
        outcome.set("params", params);
        Ok(outcome)
    }

    /// Hard-delete every owned action and parameter. Not atomic across
    /// kinds: a failure after the action pass leaves actions deleted.
    pub async fn rollback(&self) -> CoreResult<RunOutcome> {
        let action_ids = self.owned_ids(ACTION_MODEL, "name", self.config.action_names()).await?;
        if !action_ids.is_empty() {
            self.store
                .invoke(ACTION_MODEL, "unlink", vec![json!(action_ids)])
                .await?;
        }

        let param_ids = self
            .owned_ids(PARAMETER_MODEL, "key", self.config.parameter_keys())
            .await?;
        if !param_ids.is_empty() {
            self.store
                .invoke(PARAMETER_MODEL, "unlink", vec![json!(param_ids)])
                .await?;
        }

        let post = self.status().await?;
        let mut outcome = RunOutcome::new(RunStatus::RolledBack);
        outcome.set(
            "deleted",
            json!({"actions": action_ids.len(), "params": param_ids.len()}),
        );
        outcome.set(
            "remaining",
            json!({
                "actions": post.get("action_count").cloned().unwrap_or(json!(0)),
                "params": post.get("param_count").cloned().unwrap_or(json!(0)),
            }),
        );
        Ok(outcome)
    }

    async fn owned_ids(&self, model: &str, key_field: &str, keys: Vec<&str>) -> CoreResult<Vec<i64>> {
        let rows = self
            .store
            .find(model, &Domain::in_(key_field, keys), &["id"], Some(200), None)
            .await?;
        Ok(rows.iter().filter_map(row_id).collect())
    }

    /// Resolve the API token: primary key, then legacy key (migrating it
    /// forward), then a freshly synthesized secret. Returns whether the
    /// primary value was (re)created.
    async fn ensure_token(&self) -> CoreResult<bool> {
        let resolved = resolve_param_with_fallback(
            self.store,
            &self.config.token_param,
            &[&self.config.legacy_token_param],
        )
        .await?;

        match resolved {
            Some(token) => Ok(token.migrated),
            None => {
                upsert_param(self.store, &self.config.token_param, &random_token()).await?;
                Ok(true)
            }
        }
    }

    /// Check one capability module, installing it when present but not yet
    /// installed. Absence is fatal only for required modules.
    async fn ensure_module(&self, name: &str, required: bool) -> CoreResult<String> {
        let rows = self
            .store
            .find(
                MODULE_MODEL,
                &Domain::eq("name", name),
                &["id", "state"],
                Some(1),
                None,
            )
            .await?;
        let Some(row) = rows.first() else {
            if required {
                return Err(CoreError::MissingModule(name.to_string()));
            }
            return Ok("missing".to_string());
        };

        let state = row_text(row, "state");
        match state {
            "installed" => Ok("installed".to_string()),
            "to install" | "to upgrade" => Ok(state.to_string()),
            _ => {
                let module_id = row_id(row).unwrap_or_default();
                self.store
                    .invoke(MODULE_MODEL, "button_immediate_install", vec![json!([module_id])])
                    .await?;
                Ok("installed".to_string())
            }
        }
    }

    /// Discovery: which complement fields the instance actually carries,
    /// grouped by owning model. The remote schema is data here.
    async fn discover_complements(&self) -> CoreResult<Value> {
        let fields = self
            .store
            .find(
                "ir.model.fields",
                &Domain::ilike("name", "l10n_mx_edi%"),
                &["model", "name", "ttype", "relation", "modules"],
                Some(5000),
                None,
            )
            .await?;

        let mut by_model: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for row in &fields {
            by_model
                .entry(row_text(row, "model").to_string())
                .or_default()
                .push(json!({
                    "name": row.get("name"),
                    "type": row.get("ttype"),
                    "relation": row.get("relation"),
                    "modules": row.get("modules"),
                }));
        }

        Ok(json!({
            "field_count": fields.len(),
            "models": by_model,
        }))
    }

    /// Sync the local addenda catalog 1:1 against remote rows keyed by name.
    async fn sync_known_addendas(&self) -> CoreResult<Value> {
        let catalog_path = self.project_root.join(&self.config.addenda_catalog_path);
        let catalog = load_or_seed_addenda_catalog(&catalog_path)?;

        if self.model_id(ADDENDA_MODEL).await?.is_none() {
            return Ok(json!({
                "created": 0,
                "updated": 0,
                "records": [],
                "catalog_count": catalog.len(),
                "status": "model_missing",
            }));
        }

        // Desired value set per entry, with extra catalog fields validated
        // against the remote schema under the run's payload mode.
        let mut desired_entries: Vec<(&AddendaEntry, Row)> = Vec::new();
        for entry in &catalog {
            if entry.name.trim().is_empty() || entry.arch.trim().is_empty() {
                continue;
            }
            let mut desired = field_values([("arch", entry.arch.trim().into())]);
            if !entry.extra.is_empty() {
                let known = self.schema.fields_of(self.store, ADDENDA_MODEL).await?;
                let extra =
                    filter_payload(ADDENDA_MODEL, &known, &entry.extra, self.payload_mode)?;
                for (field, value) in extra {
                    desired.insert(field, value);
                }
            }
            desired_entries.push((entry, desired));
        }

        // One fetch covering every tracked field keeps drift detection exact.
        let mut fetch_fields: Vec<&str> = vec!["id", "name", "arch"];
        for (_, desired) in &desired_entries {
            for field in desired.keys() {
                if !fetch_fields.contains(&field.as_str()) {
                    fetch_fields.push(field);
                }
            }
        }
        let existing = self
            .store
            .find(ADDENDA_MODEL, &Domain::all(), &fetch_fields, Some(500), None)
            .await?;

        let mut created = 0;
        let mut updated = 0;
        for (entry, desired) in &desired_entries {
            let name = entry.name.trim();
            let current = existing.iter().find(|row| row_text(row, "name") == name);
            match current {
                Some(current) => {
                    if desired_differs(current, desired) {
                        let id = row_id(current).ok_or_else(|| {
                            CoreError::Rpc(RpcError::UnexpectedPayload(format!(
                                "{ADDENDA_MODEL} row without id"
                            )))
                        })?;
                        self.store.update(ADDENDA_MODEL, &[id], desired.clone()).await?;
                        updated += 1;
                    }
                }
                None => {
                    let mut values = desired.clone();
                    values.insert("name".to_string(), name.into());
                    self.store.create(ADDENDA_MODEL, values).await?;
                    created += 1;
                }
            }
        }

        let roster = self
            .store
            .find(ADDENDA_MODEL, &Domain::all(), &["id", "name"], Some(500), None)
            .await?;
        let records: Vec<Value> = roster
            .iter()
            .map(|row| json!({"id": row.get("id"), "name": row.get("name")}))
            .collect();

        Ok(json!({
            "created": created,
            "updated": updated,
            "records": records,
            "catalog_count": catalog.len(),
        }))
    }

    async fn model_id(&self, model_name: &str) -> CoreResult<Option<i64>> {
        let rows = self
            .store
            .find(
                "ir.model",
                &Domain::eq("model", model_name),
                &["id"],
                Some(1),
                None,
            )
            .await?;
        Ok(rows.first().and_then(row_id))
    }

    async fn upsert_action(
        &self,
        model_id: i64,
        name: &str,
        code: &str,
    ) -> CoreResult<crate::upsert::Upsert> {
        let key_domain = Domain::eq("name", name)
            .and_eq("model_id", model_id)
            .and_eq("type", ACTION_MODEL)
            .and_eq("state", "code");
        let desired = field_values([
            ("name", name.into()),
            ("type", ACTION_MODEL.into()),
            ("state", "code".into()),
            ("model_id", model_id.into()),
            ("binding_model_id", model_id.into()),
            ("binding_type", "action".into()),
            ("usage", "ir_actions_server".into()),
            ("code", code.into()),
        ]);
        upsert_record(self.store, ACTION_MODEL, &key_domain, &Row::new(), &desired).await
    }
}
