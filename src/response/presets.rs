// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `GET /api/presets` response parsing.

use serde::Deserialize;

use crate::types::Preset;

/// Ordered list of presets stored on the processor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresetList {
    presets: Vec<Preset>,
}

impl PresetList {
    /// Returns the presets in device order.
    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Consumes the list.
    #[must_use]
    pub fn into_presets(self) -> Vec<Preset> {
        self.presets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PresetId;

    #[test]
    fn keeps_device_order() {
        let list: PresetList = serde_json::from_str(
            r#"{"presets": [{"id": 5, "label": "B"}, {"id": 1, "label": "A"}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = list.presets().iter().map(Preset::id).collect();
        assert_eq!(ids, vec![PresetId::new(5), PresetId::new(1)]);
    }

    #[test]
    fn entry_without_id_is_rejected() {
        assert!(serde_json::from_str::<PresetList>(r#"{"presets": [{"label": "A"}]}"#).is_err());
    }

    #[test]
    fn missing_list_is_rejected() {
        assert!(serde_json::from_str::<PresetList>("{}").is_err());
    }
}
