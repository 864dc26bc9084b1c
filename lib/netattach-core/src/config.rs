//! Annotation key configuration

use std::collections::BTreeMap;

use netattach_api::v1::{NETWORK_ATTACHMENT_ANNOT, NETWORK_STATUS_ANNOT, OLD_NETWORK_STATUS_ANNOT};

/// Pod annotation keys used for network selection and status
///
/// Status is written under `status` only; reads fall back to
/// `legacy_status` in order when `status` is absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationKeys {
    pub status: String,
    pub legacy_status: Vec<String>,
    pub selection: String,
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self {
            status: NETWORK_STATUS_ANNOT.to_string(),
            legacy_status: vec![OLD_NETWORK_STATUS_ANNOT.to_string()],
            selection: NETWORK_ATTACHMENT_ANNOT.to_string(),
        }
    }
}

impl AnnotationKeys {
    /// Keys consulted when reading status, in priority order
    pub fn status_read_order(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.status.as_str()).chain(self.legacy_status.iter().map(String::as_str))
    }

    /// Find the status annotation, returning the key it was found under
    pub fn lookup_status<'a>(
        &'a self,
        annotations: &'a BTreeMap<String, String>,
    ) -> Option<(&'a str, &'a str)> {
        self.status_read_order()
            .find_map(|key| annotations.get(key).map(|value| (key, value.as_str())))
    }

    pub fn lookup_selection<'a>(&self, annotations: &'a BTreeMap<String, String>) -> Option<&'a str> {
        annotations.get(&self.selection).map(String::as_str)
    }
}
