//! Unit-name catalog.

use std::collections::HashMap;

use serde_json::Value;

use crate::calculate::UnitNameLookup;

/// Unit type id to display name, loaded once from the service's unit list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitCatalog {
    names: HashMap<u32, String>,
}

impl UnitCatalog {
    /// Build from a JSON array of `{Id|id, Name|name}` objects. Entries
    /// without a positive id or a non-empty name are ignored.
    pub fn from_value(value: &Value) -> Self {
        let names = value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|unit| {
                let id = unit.get("Id").or_else(|| unit.get("id"))?.as_u64()?;
                let name = unit.get("Name").or_else(|| unit.get("name"))?.as_str()?;
                let id = u32::try_from(id).ok().filter(|&id| id != 0)?;
                (!name.is_empty()).then(|| (id, name.to_string()))
            })
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl UnitNameLookup for UnitCatalog {
    fn unit_name(&self, unit_type: u32) -> Option<String> {
        self.names.get(&unit_type).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_accepts_both_casings() {
        let catalog = UnitCatalog::from_value(&json!([
            { "Id": 7, "Name": "Leopard 2A6" },
            { "id": 12, "name": "M1A2 Abrams" },
            { "Id": 0, "Name": "Placeholder" },
            { "Id": 13, "Name": "" },
            { "Name": "No id" }
        ]));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.unit_name(7).as_deref(), Some("Leopard 2A6"));
        assert_eq!(catalog.unit_name(12).as_deref(), Some("M1A2 Abrams"));
        assert_eq!(catalog.unit_name(13), None);
    }

    #[test]
    fn test_non_array_is_empty() {
        assert!(UnitCatalog::from_value(&json!({ "error": "nope" })).is_empty());
    }
}
