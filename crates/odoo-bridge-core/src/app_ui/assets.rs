//! Composition of the deployable view body from local assets.
//!
//! The XML template carries disjoint placeholder tokens; each is replaced
//! with the (escaped) content of a named sub-asset. Embedded text lives in
//! CDATA sections, so any `]]>` inside it must be split or the section
//! closes early. That is the one format-correctness rule here.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::load_yaml_mapping;
use crate::error::{CoreError, CoreResult};

use super::config::AppUiConfig;

pub struct AssetBuilder<'a> {
    project_root: &'a Path,
    config: &'a AppUiConfig,
}

impl<'a> AssetBuilder<'a> {
    pub fn new(project_root: &'a Path, config: &'a AppUiConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    /// Build the full `arch_db` body for the assets view.
    pub fn build_arch_db(&self) -> CoreResult<String> {
        let xml_template = self.read_asset(&self.config.xml_template_path)?;
        let config_js_template = self.read_asset(&self.config.config_js_path)?;
        let i18n_js = self.read_asset(&self.config.i18n_js_path)?;
        let api_js = self.read_asset(&self.config.api_js_path)?;
        let state_js = self.read_asset(&self.config.state_js_path)?;
        let runtime_js_template = self.read_asset(&self.config.runtime_js_path)?;
        let css_bundle = self.build_css_bundle()?;

        let i18n_catalog = load_yaml_mapping(&self.project_root.join(&self.config.i18n_yaml_path))?;
        let components_map = self.collect_components_map()?;

        let config_js = config_js_template.replace(
            "__APP_UI_I18N__",
            &serde_json::to_string(&i18n_catalog).unwrap_or_default(),
        );
        let runtime_js = runtime_js_template.replace(
            "__APP_UI_COMPONENTS_MAP__",
            &serde_json::to_string(&components_map).unwrap_or_default(),
        );

        Ok(xml_template
            .replace("__APP_UI_CONFIG_JS__", &for_cdata(&config_js))
            .replace("__APP_UI_I18N_JS__", &for_cdata(&i18n_js))
            .replace("__APP_UI_API_JS__", &for_cdata(&api_js))
            .replace("__APP_UI_STATE_JS__", &for_cdata(&state_js))
            .replace("__APP_UI_CSS__", &for_cdata(&css_bundle))
            .replace("__APP_UI_JS__", &for_cdata(&runtime_js)))
    }

    fn build_css_bundle(&self) -> CoreResult<String> {
        let parts: CoreResult<Vec<String>> = self
            .config
            .css_bundle_paths
            .iter()
            .map(|path| self.read_asset(path))
            .collect();
        Ok(parts?.join("\n\n"))
    }

    /// Single-file components keyed by file name. A missing components
    /// directory degrades to an empty map.
    fn collect_components_map(&self) -> CoreResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        let dir = self.project_root.join(&self.config.components_dir);
        if !dir.is_dir() {
            return Ok(map);
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("vue") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            map.insert(name.to_string(), fs::read_to_string(&path)?.trim().to_string());
        }
        Ok(map)
    }

    fn read_asset(&self, relative: &PathBuf) -> CoreResult<String> {
        let path = self.project_root.join(relative);
        if !path.exists() {
            return Err(CoreError::MissingAsset(path));
        }
        Ok(fs::read_to_string(&path)?.trim().to_string())
    }
}

/// Escape a CDATA terminator appearing inside embedded text.
pub fn for_cdata(content: &str) -> String {
    content.replace("]]>", "]]]]><![CDATA[>")
}
