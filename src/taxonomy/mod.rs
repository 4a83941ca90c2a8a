//! Canonical event taxonomy and ad-platform conversion mappings.
//!
//! Pure reference data. The tables are `'static` and indexed once at first
//! use; lookups are read-only and safe to share across threads.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Broad grouping used by business rules and conversion handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Engagement,
    Ecommerce,
    Lead,
}

/// One canonical event definition in the standard taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct StandardEventDefinition {
    pub name: &'static str,
    pub category: EventCategory,
    /// Server-side conversion API event this maps to, when forwardable
    pub ad_platform_event: Option<&'static str>,
    pub required_properties: &'static [&'static str],
    pub optional_properties: &'static [&'static str],
    pub legacy_names: &'static [&'static str],
}

/// Conversion API requirements for a forwardable event.
#[derive(Debug, Clone, Copy)]
pub struct ConversionMapping {
    pub event: &'static str,
    pub required_params: &'static [&'static str],
    pub category: EventCategory,
}

static STANDARD_EVENTS: &[StandardEventDefinition] = &[
    StandardEventDefinition {
        name: "PageView",
        category: EventCategory::Engagement,
        ad_platform_event: Some("PageView"),
        required_properties: &[],
        optional_properties: &["page_title", "referrer"],
        legacy_names: &["page_view", "pageview", "page_viewed"],
    },
    StandardEventDefinition {
        name: "ViewContent",
        category: EventCategory::Ecommerce,
        ad_platform_event: Some("ViewContent"),
        required_properties: &["content_ids"],
        optional_properties: &["content_type", "value", "currency"],
        legacy_names: &["view_content", "product_view", "view_item"],
    },
    StandardEventDefinition {
        name: "Search",
        category: EventCategory::Engagement,
        ad_platform_event: Some("Search"),
        required_properties: &["search_string"],
        optional_properties: &["content_category"],
        legacy_names: &["search", "site_search"],
    },
    StandardEventDefinition {
        name: "AddToCart",
        category: EventCategory::Ecommerce,
        ad_platform_event: Some("AddToCart"),
        required_properties: &["content_ids", "value", "currency"],
        optional_properties: &["content_type", "quantity"],
        legacy_names: &["add_to_cart", "cart_add", "added_to_cart"],
    },
    StandardEventDefinition {
        name: "InitiateCheckout",
        category: EventCategory::Ecommerce,
        ad_platform_event: Some("InitiateCheckout"),
        required_properties: &["value", "currency"],
        optional_properties: &["content_ids", "num_items"],
        legacy_names: &["begin_checkout", "initiate_checkout", "checkout_started"],
    },
    StandardEventDefinition {
        name: "Purchase",
        category: EventCategory::Ecommerce,
        ad_platform_event: Some("Purchase"),
        required_properties: &["value", "currency", "content_ids"],
        optional_properties: &["order_id", "transaction_id", "num_items", "coupon"],
        legacy_names: &["purchase", "order_completed", "checkout_complete"],
    },
    StandardEventDefinition {
        name: "Lead",
        category: EventCategory::Lead,
        ad_platform_event: Some("Lead"),
        required_properties: &[],
        optional_properties: &["email", "phone", "lead_source"],
        legacy_names: &["lead", "generate_lead", "lead_submitted"],
    },
    StandardEventDefinition {
        name: "CompleteRegistration",
        category: EventCategory::Lead,
        ad_platform_event: Some("CompleteRegistration"),
        required_properties: &[],
        optional_properties: &["email", "registration_method"],
        legacy_names: &["sign_up", "complete_registration", "registration_completed"],
    },
    StandardEventDefinition {
        name: "Contact",
        category: EventCategory::Lead,
        ad_platform_event: None,
        required_properties: &[],
        optional_properties: &["email", "phone"],
        legacy_names: &["contact", "contact_form_submitted"],
    },
];

static CONVERSION_MAPPINGS: &[ConversionMapping] = &[
    ConversionMapping {
        event: "PageView",
        required_params: &[],
        category: EventCategory::Engagement,
    },
    ConversionMapping {
        event: "ViewContent",
        required_params: &["content_ids"],
        category: EventCategory::Ecommerce,
    },
    ConversionMapping {
        event: "Search",
        required_params: &["search_string"],
        category: EventCategory::Engagement,
    },
    ConversionMapping {
        event: "AddToCart",
        required_params: &["content_ids", "content_type", "value", "currency"],
        category: EventCategory::Ecommerce,
    },
    ConversionMapping {
        event: "InitiateCheckout",
        required_params: &["value", "currency"],
        category: EventCategory::Ecommerce,
    },
    ConversionMapping {
        event: "Purchase",
        required_params: &["value", "currency", "content_ids"],
        category: EventCategory::Ecommerce,
    },
    ConversionMapping {
        event: "Lead",
        required_params: &[],
        category: EventCategory::Lead,
    },
    ConversionMapping {
        event: "CompleteRegistration",
        required_params: &[],
        category: EventCategory::Lead,
    },
];

static BY_NAME: Lazy<HashMap<&'static str, &'static StandardEventDefinition>> =
    Lazy::new(|| STANDARD_EVENTS.iter().map(|def| (def.name, def)).collect());

static BY_LEGACY_NAME: Lazy<HashMap<&'static str, &'static StandardEventDefinition>> =
    Lazy::new(|| {
        STANDARD_EVENTS
            .iter()
            .flat_map(|def| def.legacy_names.iter().map(move |legacy| (*legacy, def)))
            .collect()
    });

static CONVERSION_BY_EVENT: Lazy<HashMap<&'static str, &'static ConversionMapping>> =
    Lazy::new(|| {
        CONVERSION_MAPPINGS
            .iter()
            .map(|mapping| (mapping.event, mapping))
            .collect()
    });

/// How an incoming event name relates to the taxonomy.
#[derive(Debug, Clone, Copy)]
pub enum NameResolution {
    /// Exact match against a canonical name
    Canonical(&'static StandardEventDefinition),
    /// Exact match against a legacy alias of a canonical event
    Legacy(&'static StandardEventDefinition),
    /// Not in the taxonomy at all
    Unknown,
}

/// Look up a canonical definition by its exact name.
pub fn definition(name: &str) -> Option<&'static StandardEventDefinition> {
    BY_NAME.get(name).copied()
}

/// Resolve an incoming event name against canonical names first, then
/// legacy aliases.
pub fn resolve(name: &str) -> NameResolution {
    if let Some(def) = BY_NAME.get(name) {
        return NameResolution::Canonical(def);
    }
    if let Some(def) = BY_LEGACY_NAME.get(name) {
        return NameResolution::Legacy(def);
    }
    NameResolution::Unknown
}

/// Conversion API requirements for a canonical event, if it is forwardable.
pub fn conversion_mapping(event: &str) -> Option<&'static ConversionMapping> {
    CONVERSION_BY_EVENT.get(event).copied()
}

/// All canonical event names, for diagnostics and demos.
pub fn canonical_names() -> impl Iterator<Item = &'static str> {
    STANDARD_EVENTS.iter().map(|def| def.name)
}
