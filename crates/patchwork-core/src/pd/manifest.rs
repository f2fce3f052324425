//! Binding manifest: which patch objects the editor mirrors
//!
//! libpd exposes no object graph, so the editor learns about a patch's GUI
//! objects from a YAML file next to it (`synth.pd` → `synth.bindings.yaml`).
//! Each entry names the send symbol the editor writes to and the receive
//! symbol the patch reports changes on.
//!
//! ```yaml
//! objects:
//!   - id: 1
//!     kind: horizontal_slider
//!     bounds: { x: 20, y: 40, w: 130, h: 18 }
//!     range: { min: 0, max: 127 }
//!     send: cutoff-in
//!     receive: cutoff-out
//!   - id: 2
//!     kind: array
//!     bounds: { x: 20, y: 80, w: 200, h: 140 }
//!     array: wavetable
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{PdError, PdResult};
use crate::types::{Bounds, GuiKind, ObjectId, ValueRange};

/// One mirrored object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundObject {
    pub id: ObjectId,
    pub kind: GuiKind,
    #[serde(default)]
    pub parent: Option<ObjectId>,
    pub bounds: Bounds,
    /// Falls back to the kind's default range
    #[serde(default)]
    pub range: Option<ValueRange>,
    /// Symbol the editor sends to
    #[serde(default)]
    pub send: Option<String>,
    /// Symbol the patch reports changes on
    #[serde(default)]
    pub receive: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub array: Option<String>,
}

impl BoundObject {
    pub fn value_range(&self) -> ValueRange {
        self.range.unwrap_or_else(|| self.kind.default_range())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingManifest {
    #[serde(default)]
    pub objects: Vec<BoundObject>,
}

impl BindingManifest {
    /// `synth.pd` → `synth.bindings.yaml`
    pub fn path_for_patch(patch: &Path) -> PathBuf {
        patch.with_extension("bindings.yaml")
    }

    /// Load the manifest for a patch; a missing manifest mirrors nothing
    pub fn load_for_patch(patch: &Path) -> PdResult<Self> {
        let path = Self::path_for_patch(patch);
        if !path.exists() {
            log::warn!(
                "No binding manifest at {:?}, the editor will show an empty canvas",
                path
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        Self::parse(&contents).map_err(|reason| PdError::InvalidManifest { path, reason })
    }

    /// Parse and validate manifest YAML
    pub fn parse(contents: &str) -> Result<Self, String> {
        let manifest: Self = serde_yaml::from_str(contents).map_err(|e| e.to_string())?;

        let mut seen = std::collections::HashSet::new();
        for object in &manifest.objects {
            if !seen.insert(object.id) {
                return Err(format!("duplicate object id {}", object.id));
            }
            if object.kind == GuiKind::Array && object.array.is_none() {
                return Err(format!("array object {} has no array name", object.id));
            }
        }
        if let Some(orphan) = manifest
            .objects
            .iter()
            .find(|o| o.parent.is_some_and(|p| !seen.contains(&p)))
        {
            return Err(format!("object {} has an unknown parent", orphan.id));
        }

        Ok(manifest)
    }
}
