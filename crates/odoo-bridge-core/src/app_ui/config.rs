//! Theme variants: natural keys, versions and asset paths.

use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

/// One theme variant's fixed keys and asset layout.
#[derive(Debug, Clone)]
pub struct AppUiConfig {
    pub variant: String,

    pub view_key: String,
    pub view_name: String,
    pub version: String,

    pub enabled_param: String,
    pub version_param: String,

    pub legacy_view_key: String,
    pub legacy_enabled_param: String,
    pub legacy_version_param: String,

    pub xml_template_path: PathBuf,
    pub config_js_path: PathBuf,
    pub i18n_js_path: PathBuf,
    pub api_js_path: PathBuf,
    pub state_js_path: PathBuf,
    pub runtime_js_path: PathBuf,
    pub components_dir: PathBuf,
    pub i18n_yaml_path: PathBuf,
    pub css_bundle_paths: Vec<PathBuf>,
}

impl Default for AppUiConfig {
    fn default() -> Self {
        Self {
            variant: "classic".to_string(),

            view_key: "app_ui_bridge.webclient_bootstrap_extension".to_string(),
            view_name: "Generic App UI Theme".to_string(),
            version: "1.0.1".to_string(),

            enabled_param: "app_ui_bridge.enabled".to_string(),
            version_param: "app_ui_bridge.version".to_string(),

            legacy_view_key: "yo_app_ui.webclient_bootstrap_extension".to_string(),
            legacy_enabled_param: "yo_app_ui.enabled".to_string(),
            legacy_version_param: "yo_app_ui.version".to_string(),

            xml_template_path: "data/app_ui/assets_backend.xml".into(),
            config_js_path: "data/app_ui/app_ui_config.js".into(),
            i18n_js_path: "data/app_ui/app_ui_i18n.js".into(),
            api_js_path: "data/app_ui/js/app_ui_api.js".into(),
            state_js_path: "data/app_ui/js/app_ui_state.js".into(),
            runtime_js_path: "data/app_ui/app_ui_vue.js".into(),
            components_dir: "data/app_ui/components".into(),
            i18n_yaml_path: "data/app_ui/i18n/messages.yml".into(),
            css_bundle_paths: vec![
                "data/app_ui/css/00_core.css".into(),
                "data/app_ui/css/10_dashboard.css".into(),
                "data/app_ui/css/20_tables.css".into(),
                "data/app_ui/css/30_forms.css".into(),
            ],
        }
    }
}

impl AppUiConfig {
    /// Build the config for a named variant. Unknown names are a
    /// configuration error, surfaced before any remote call.
    pub fn for_variant(variant: &str) -> CoreResult<Self> {
        match variant.trim().to_lowercase().as_str() {
            "classic" | "default" | "" => Ok(Self::default()),
            "unocss" => Ok(Self {
                variant: "unocss".to_string(),
                view_name: "Generic App UI Theme (UnoCSS)".to_string(),
                version: "1.1.0-unocss".to_string(),
                xml_template_path: "data/app_ui_unocss/assets_backend.xml".into(),
                config_js_path: "data/app_ui_unocss/app_ui_config.js".into(),
                i18n_js_path: "data/app_ui_unocss/app_ui_i18n.js".into(),
                api_js_path: "data/app_ui_unocss/js/app_ui_api.js".into(),
                state_js_path: "data/app_ui_unocss/js/app_ui_state.js".into(),
                runtime_js_path: "data/app_ui_unocss/app_ui_vue.js".into(),
                components_dir: "data/app_ui_unocss/components".into(),
                i18n_yaml_path: "data/app_ui_unocss/i18n/messages.yml".into(),
                css_bundle_paths: vec![
                    "data/app_ui_unocss/css/00_core.css".into(),
                    "data/app_ui_unocss/css/10_dashboard.css".into(),
                    "data/app_ui_unocss/css/20_tables.css".into(),
                    "data/app_ui_unocss/css/30_forms.css".into(),
                ],
                ..Self::default()
            }),
            other => Err(CoreError::UnsupportedVariant(other.to_string())),
        }
    }

    /// Parameter keys this theme owns, current and legacy.
    pub fn parameter_keys(&self) -> Vec<&str> {
        vec![
            &self.enabled_param,
            &self.version_param,
            &self.legacy_enabled_param,
            &self.legacy_version_param,
        ]
    }

    /// View keys to look up, current first.
    pub fn candidate_view_keys(&self) -> Vec<&str> {
        vec![&self.view_key, &self.legacy_view_key]
    }
}
