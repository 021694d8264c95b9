//! Parameter keys, action names and baseline data for the invoice bridge.

use serde_json::{json, Value};

/// Natural keys owned by the invoice API bridge.
///
/// Legacy `yo_invoice_api.*` keys are read (and rolled back) but never
/// written, except when a legacy value is migrated forward.
#[derive(Debug, Clone)]
pub struct InvoiceApiConfig {
    pub token_param: String,
    pub baseline_param: String,
    pub discovery_param: String,
    pub addendas_param: String,

    pub legacy_token_param: String,
    pub legacy_baseline_param: String,
    pub legacy_discovery_param: String,
    pub legacy_addendas_param: String,

    pub action_invoice: String,
    pub action_payment: String,
    pub action_foreign_trade: String,
    pub action_addenda: String,
    pub action_generic: String,
    pub action_carta_porte: String,

    pub required_module: String,
    pub optional_modules: Vec<String>,

    /// Relative path of the addenda catalog under the project root.
    pub addenda_catalog_path: String,
}

impl Default for InvoiceApiConfig {
    fn default() -> Self {
        Self {
            token_param: "invoice_api.token".to_string(),
            baseline_param: "invoice_api.complements_baseline_json".to_string(),
            discovery_param: "invoice_api.complements_discovery_json".to_string(),
            addendas_param: "invoice_api.addendas_known_json".to_string(),

            legacy_token_param: "yo_invoice_api.token".to_string(),
            legacy_baseline_param: "yo_invoice_api.complements_baseline_json".to_string(),
            legacy_discovery_param: "yo_invoice_api.complements_discovery_json".to_string(),
            legacy_addendas_param: "yo_invoice_api.addendas_known_json".to_string(),

            action_invoice: "API - Invoice Workflow Bridge".to_string(),
            action_payment: "API - Payment Complement Bridge".to_string(),
            action_foreign_trade: "API - Foreign Trade Complement Bridge".to_string(),
            action_addenda: "API - Addenda Bridge".to_string(),
            action_generic: "API - Generic Complement Bridge".to_string(),
            action_carta_porte: "API - Carta Porte Complement Bridge".to_string(),

            required_module: "l10n_mx_edi".to_string(),
            optional_modules: vec![
                "l10n_mx_edi_extended".to_string(),
                "l10n_mx_edi_stock".to_string(),
                "l10n_mx_edi_40".to_string(),
                "l10n_mx_edi_payment".to_string(),
            ],

            addenda_catalog_path: "data/addendas/known_addendas.json".to_string(),
        }
    }
}

impl InvoiceApiConfig {
    /// Every action name this bridge owns, for status and rollback.
    pub fn action_names(&self) -> Vec<&str> {
        vec![
            &self.action_invoice,
            &self.action_payment,
            &self.action_foreign_trade,
            &self.action_addenda,
            &self.action_generic,
            &self.action_carta_porte,
        ]
    }

    /// Every parameter key this bridge owns, current and legacy.
    pub fn parameter_keys(&self) -> Vec<&str> {
        vec![
            &self.token_param,
            &self.baseline_param,
            &self.discovery_param,
            &self.addendas_param,
            &self.legacy_token_param,
            &self.legacy_baseline_param,
            &self.legacy_discovery_param,
            &self.legacy_addendas_param,
        ]
    }

    /// Built-in baseline of known CFDI complements, persisted as JSON.
    pub fn baseline_complements(&self) -> Value {
        json!({
            "pago": {
                "display_name": "Complemento para Recepcion de Pagos",
                "version": "2.0",
                "scope": "account.move/account.payment",
                "note": "Applies to PPD flows and payment registration.",
            },
            "comercio_exterior": {
                "display_name": "Complemento de Comercio Exterior",
                "version": "2.0",
                "scope": "account.move",
                "note": "Requires foreign-trade fields and tariff fractions.",
            },
            "carta_porte": {
                "display_name": "Complemento Carta Porte",
                "version": "3.1",
                "scope": "stock.picking",
                "note": "Requires stock transport fields/module availability.",
            },
        })
    }
}
