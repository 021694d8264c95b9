//! End-to-end runner tests for the app UI theme against the in-memory
//! store and a temp asset tree.

mod common;

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use common::MemoryStore;
use odoo_bridge_core::app_ui::{AppUiConfig, AppUiRunner};
use odoo_bridge_core::RunStatus;

const VIEW_MODEL: &str = "ir.ui.view";

fn write_asset_tree(root: &Path) {
    let base = root.join("data/app_ui");
    for dir in ["js", "css", "i18n", "components"] {
        fs::create_dir_all(base.join(dir)).unwrap();
    }

    fs::write(
        base.join("assets_backend.xml"),
        r#"<data inherit_id="web.webclient_bootstrap">
  <xpath expr="//head" position="inside">
    <style><![CDATA[
__APP_UI_CSS__
    ]]></style>
    <script><![CDATA[
__APP_UI_CONFIG_JS__
__APP_UI_I18N_JS__
__APP_UI_API_JS__
__APP_UI_STATE_JS__
__APP_UI_JS__
    ]]></script>
  </xpath>
</data>"#,
    )
    .unwrap();

    fs::write(
        base.join("app_ui_config.js"),
        "window.APP_UI_CONFIG = { messages: __APP_UI_I18N__ };",
    )
    .unwrap();
    fs::write(base.join("app_ui_i18n.js"), "window.appUiTranslate = k => k;").unwrap();
    // Embedded CDATA terminator, exercises the escape on the way in.
    fs::write(base.join("js/app_ui_api.js"), r#"var marker = "]]>";"#).unwrap();
    fs::write(base.join("js/app_ui_state.js"), "window.appUiState = {};").unwrap();
    fs::write(
        base.join("app_ui_vue.js"),
        "window.APP_UI_COMPONENTS = __APP_UI_COMPONENTS_MAP__;",
    )
    .unwrap();
    fs::write(base.join("css/00_core.css"), ":root { --app-ui-accent: #0af; }").unwrap();
    fs::write(base.join("css/10_dashboard.css"), ".o_dashboard { padding: 8px; }").unwrap();
    fs::write(base.join("css/20_tables.css"), ".o_list_table { width: 100%; }").unwrap();
    fs::write(base.join("css/30_forms.css"), ".o_form_view { margin: 0; }").unwrap();
    fs::write(base.join("i18n/messages.yml"), "greeting: Hola\n").unwrap();
    fs::write(
        base.join("components/app_card.vue"),
        "<template><div class=\"app-card\"/></template>",
    )
    .unwrap();
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(
        VIEW_MODEL,
        vec![json!({"key": "web.webclient_bootstrap", "type": "qweb", "active": true})],
    );
    store
}

fn base_view_id(store: &MemoryStore) -> i64 {
    store
        .row_by(VIEW_MODEL, "key", "web.webclient_bootstrap")
        .and_then(|row| row.get("id").and_then(Value::as_i64))
        .unwrap()
}

fn managed_views(store: &MemoryStore) -> Vec<serde_json::Map<String, Value>> {
    store
        .rows(VIEW_MODEL)
        .into_iter()
        .filter(|row| row.get("key").and_then(Value::as_str) != Some("web.webclient_bootstrap"))
        .collect()
}

#[tokio::test]
async fn test_apply_creates_composed_extension_view() {
    let store = seeded_store();
    let root = TempDir::new().unwrap();
    write_asset_tree(root.path());

    let outcome = AppUiRunner::new(&store, root.path(), AppUiConfig::default())
        .apply()
        .await;
    assert_eq!(outcome.status, RunStatus::Ready);
    assert_eq!(outcome.get("view").unwrap()["changed"], json!(true));
    assert_eq!(outcome.get("version"), Some(&json!("1.0.1")));
    assert_eq!(
        outcome.get("webclient_bootstrap_id"),
        Some(&json!(base_view_id(&store)))
    );

    let views = managed_views(&store);
    assert_eq!(views.len(), 1);
    let view = &views[0];
    assert_eq!(view.get("key").and_then(Value::as_str), Some("app_ui_bridge.webclient_bootstrap_extension"));
    assert_eq!(view.get("mode").and_then(Value::as_str), Some("extension"));
    assert_eq!(view.get("priority"), Some(&json!(95)));
    assert_eq!(view.get("inherit_id"), Some(&json!(base_view_id(&store))));
    assert_eq!(view.get("active"), Some(&json!(true)));

    let arch = view.get("arch_db").and_then(Value::as_str).unwrap();
    // Placeholders substituted with real asset content.
    assert!(!arch.contains("__APP_UI_"));
    assert!(arch.contains("--app-ui-accent"));
    assert!(arch.contains(r#"messages: {"greeting":"Hola"}"#));
    assert!(arch.contains("app_card.vue"));
    // The embedded terminator was split, the section's own terminators kept.
    assert!(arch.contains(r#"var marker = "]]]]><![CDATA[>";"#));
    assert!(arch.contains("]]></script>"));

    // Enablement parameters written.
    assert_eq!(
        store
            .row_by("ir.config_parameter", "key", "app_ui_bridge.enabled")
            .unwrap()
            .get("value"),
        Some(&json!("1"))
    );
    assert_eq!(
        store
            .row_by("ir.config_parameter", "key", "app_ui_bridge.version")
            .unwrap()
            .get("value"),
        Some(&json!("1.0.1"))
    );
}

#[tokio::test]
async fn test_second_apply_is_a_no_op() {
    let store = seeded_store();
    let root = TempDir::new().unwrap();
    write_asset_tree(root.path());
    let runner = AppUiRunner::new(&store, root.path(), AppUiConfig::default());

    assert_eq!(runner.apply().await.status, RunStatus::Ready);
    let writes_after_first = store.write_count();

    let second = runner.apply().await;
    assert_eq!(second.status, RunStatus::Ready);
    assert_eq!(second.get("view").unwrap()["changed"], json!(false));
    assert_eq!(store.write_count(), writes_after_first);
    assert_eq!(managed_views(&store).len(), 1);
}

#[tokio::test]
async fn test_legacy_view_is_migrated_in_place() {
    let store = seeded_store();
    store.seed(
        VIEW_MODEL,
        vec![json!({
            "key": "yo_app_ui.webclient_bootstrap_extension",
            "name": "Old Theme",
            "type": "qweb",
            "mode": "extension",
            "active": true,
            "arch_db": "<data/>",
        })],
    );
    let legacy_id = store
        .row_by(VIEW_MODEL, "key", "yo_app_ui.webclient_bootstrap_extension")
        .unwrap()
        .get("id")
        .and_then(Value::as_i64)
        .unwrap();
    let root = TempDir::new().unwrap();
    write_asset_tree(root.path());

    let outcome = AppUiRunner::new(&store, root.path(), AppUiConfig::default())
        .apply()
        .await;
    assert_eq!(outcome.status, RunStatus::Ready);
    assert_eq!(outcome.get("view").unwrap()["id"], json!(legacy_id));

    // Same row, rekeyed under the current namespace.
    let views = managed_views(&store);
    assert_eq!(views.len(), 1);
    assert_eq!(
        views[0].get("key").and_then(Value::as_str),
        Some("app_ui_bridge.webclient_bootstrap_extension")
    );
    assert_eq!(views[0].get("id").and_then(Value::as_i64), Some(legacy_id));
}

#[tokio::test]
async fn test_rollback_deactivates_view_and_deletes_params() {
    let store = seeded_store();
    let root = TempDir::new().unwrap();
    write_asset_tree(root.path());
    let runner = AppUiRunner::new(&store, root.path(), AppUiConfig::default());

    assert_eq!(runner.apply().await.status, RunStatus::Ready);

    let rolled_back = runner.rollback().await.unwrap();
    assert_eq!(rolled_back.status, RunStatus::RolledBack);
    assert_eq!(rolled_back.get("view_deactivated"), Some(&json!(true)));
    assert_eq!(rolled_back.get("deleted_params"), Some(&json!(2)));

    // The view survives deactivated; the parameters are gone.
    let views = managed_views(&store);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].get("active"), Some(&json!(false)));
    assert!(store
        .row_by("ir.config_parameter", "key", "app_ui_bridge.enabled")
        .is_none());
    assert!(store
        .row_by("ir.config_parameter", "key", "app_ui_bridge.version")
        .is_none());

    let status = runner.status().await.unwrap();
    assert_eq!(status.status, RunStatus::Ok);
    assert_eq!(status.get("params"), Some(&json!([])));
}

#[tokio::test]
async fn test_missing_asset_aborts_before_any_write() {
    let store = seeded_store();
    let root = TempDir::new().unwrap();
    write_asset_tree(root.path());
    fs::remove_file(root.path().join("data/app_ui/js/app_ui_api.js")).unwrap();

    let outcome = AppUiRunner::new(&store, root.path(), AppUiConfig::default())
        .apply()
        .await;
    assert_eq!(outcome.status, RunStatus::Error);
    assert!(outcome.errors[0].contains("required asset not found"));
    assert!(outcome.errors[0].contains("app_ui_api.js"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_missing_base_view_is_fatal() {
    let store = MemoryStore::new();
    let root = TempDir::new().unwrap();
    write_asset_tree(root.path());

    let outcome = AppUiRunner::new(&store, root.path(), AppUiConfig::default())
        .apply()
        .await;
    assert_eq!(outcome.status, RunStatus::Error);
    assert_eq!(
        outcome.errors,
        vec!["base view not found: web.webclient_bootstrap"]
    );
    assert!(managed_views(&store).is_empty());
}
