use serde::{Deserialize, Serialize};

use stockroom_core::{DomainResult, Entity, FormFields, LocationId};

/// A place stock can be moved into or out of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    pub name: String,
    pub address: Option<String>,
}

/// Mutable location fields, as submitted by the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEdit {
    pub name: String,
    pub address: Option<String>,
}

impl Location {
    /// Parse a new location from an add-form post.
    pub fn from_fields(fields: &FormFields) -> DomainResult<Self> {
        let location_id = fields.parse_required::<LocationId>("location_id")?;
        let edit = LocationEdit::from_fields(fields)?;
        Ok(Self {
            location_id,
            name: edit.name,
            address: edit.address,
        })
    }

    pub fn apply_edit(&mut self, edit: LocationEdit) {
        self.name = edit.name;
        self.address = edit.address;
    }
}

impl LocationEdit {
    pub fn from_fields(fields: &FormFields) -> DomainResult<Self> {
        Ok(Self {
            name: fields.required("name")?.to_string(),
            address: fields.optional("address").map(str::to_string),
        })
    }
}

impl Entity for Location {
    type Id = LocationId;
    const KIND: &'static str = "location";

    fn id(&self) -> &LocationId {
        &self.location_id
    }
}
