use serde::{Deserialize, Serialize};

use stockroom_core::{DomainResult, Entity, FormFields, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
}

/// Mutable product fields, as submitted by the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEdit {
    pub name: String,
    pub description: Option<String>,
}

impl Product {
    /// Parse a new product from an add-form post.
    ///
    /// Required: `product_id`, `name`. Optional: `description`.
    pub fn from_fields(fields: &FormFields) -> DomainResult<Self> {
        let product_id = fields.parse_required::<ProductId>("product_id")?;
        let edit = ProductEdit::from_fields(fields)?;
        Ok(Self {
            product_id,
            name: edit.name,
            description: edit.description,
        })
    }

    /// Replace the mutable fields; the identifier never changes.
    pub fn apply_edit(&mut self, edit: ProductEdit) {
        self.name = edit.name;
        self.description = edit.description;
    }
}

impl ProductEdit {
    pub fn from_fields(fields: &FormFields) -> DomainResult<Self> {
        Ok(Self {
            name: fields.required("name")?.to_string(),
            description: fields.optional("description").map(str::to_string),
        })
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> &ProductId {
        &self.product_id
    }
}
