//! Lahan (plantation plot) models

use serde::{Deserialize, Serialize};

/// The four categorical attributes of a lahan that the yield model was
/// trained on. They are forwarded to the predictor verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LahanAttributes {
    pub penanggung_jawab: String,
    pub jenis_tanah: String,
    pub sistem_irigasi: String,
    pub lahan_kabupaten: String,
}

impl Default for LahanAttributes {
    fn default() -> Self {
        Self {
            penanggung_jawab: "Tim A".to_string(),
            jenis_tanah: "Alluvial".to_string(),
            sistem_irigasi: "Tanpa Irigasi".to_string(),
            lahan_kabupaten: "Kampar".to_string(),
        }
    }
}

/// Caller-supplied values for the categorical attributes.
///
/// Missing or blank entries fall back to a base set of attributes: the
/// configured defaults on creation, the stored values on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeOverrides {
    pub penanggung_jawab: Option<String>,
    pub jenis_tanah: Option<String>,
    pub sistem_irigasi: Option<String>,
    pub lahan_kabupaten: Option<String>,
}

impl AttributeOverrides {
    /// Resolve against `base`, keeping base values where no override is given
    pub fn apply_to(self, base: &LahanAttributes) -> LahanAttributes {
        LahanAttributes {
            penanggung_jawab: pick(self.penanggung_jawab, &base.penanggung_jawab),
            jenis_tanah: pick(self.jenis_tanah, &base.jenis_tanah),
            sistem_irigasi: pick(self.sistem_irigasi, &base.sistem_irigasi),
            lahan_kabupaten: pick(self.lahan_kabupaten, &base.lahan_kabupaten),
        }
    }
}

fn pick(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}
