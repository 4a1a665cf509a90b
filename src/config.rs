//! Elaboration options.
//!
//! Parsing only — this crate never touches the filesystem (§1 out-of-scope:
//! CLI, file I/O). A caller reads its own config file and hands us the
//! already-read text.

use serde::Deserialize;

use crate::decl::ByteOrder;
use crate::error::Error;

/// Knobs for one elaboration run, surfaced to the surrounding tool and
/// consumed by [`crate::elaborate::construct_metadata_with_options`].
#[derive(Debug, Deserialize)]
pub struct ElaborationOptions {
    /// Overrides the trace's default byte order before elaboration starts.
    /// Falls back to the trace's own `byte_order` field when absent.
    #[serde(default)]
    pub byte_order_override: Option<ConfigByteOrder>,
    /// When `true` (the default), an unrecognized integer/float/string
    /// attribute name (§4.6) is an error. When `false`, it is silently
    /// skipped instead.
    #[serde(default = "default_true")]
    pub strict_unknown_attributes: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ElaborationOptions {
    fn default() -> Self {
        ElaborationOptions {
            byte_order_override: None,
            strict_unknown_attributes: true,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigByteOrder {
    Le,
    Be,
}

impl From<ConfigByteOrder> for ByteOrder {
    fn from(v: ConfigByteOrder) -> Self {
        match v {
            ConfigByteOrder::Le => ByteOrder::Le,
            ConfigByteOrder::Be => ByteOrder::Be,
        }
    }
}

/// Parse an [`ElaborationOptions`] from TOML text.
pub fn parse_options(toml_text: &str) -> Result<ElaborationOptions, Error> {
    toml::from_str(toml_text).map_err(|e| Error::ParseValue {
        kind: "elaboration options",
        raw: e.to_string(),
    })
}
