//! Engine configuration loaded from the environment.

use licitacao_observability::LogFormat;

pub const STRICT_LINKAGE_QUANTITY_VAR: &str = "LICITACAO_STRICT_LINKAGE_QUANTITY";
pub const AUTO_CLOSE_ON_PAYMENT_VAR: &str = "LICITACAO_AUTO_CLOSE_ON_PAYMENT";
pub const LOG_FORMAT_VAR: &str = "LICITACAO_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Refuse linkages that would exceed the item quantity.
    pub strict_linkage_quantity: bool,
    /// Let a payment confirmation close the process when every accepted item is settled.
    pub auto_close_on_payment: bool,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_linkage_quantity: false,
            auto_close_on_payment: true,
            log_format: LogFormat::Json,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            strict_linkage_quantity: parse_var(
                &lookup,
                STRICT_LINKAGE_QUANTITY_VAR,
                defaults.strict_linkage_quantity,
            ),
            auto_close_on_payment: parse_var(
                &lookup,
                AUTO_CLOSE_ON_PAYMENT_VAR,
                defaults.auto_close_on_payment,
            ),
            log_format: parse_var(&lookup, LOG_FORMAT_VAR, defaults.log_format),
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + core::fmt::Debug,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    raw.trim().to_ascii_lowercase().parse::<T>().unwrap_or_else(|_| {
        tracing::warn!(var = name, value = %raw, ?default, "invalid value, using default");
        default
    })
}
