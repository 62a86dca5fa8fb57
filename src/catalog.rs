//! The documented endpoint catalog, embedded at build time.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::template::placeholder_names;
use crate::types::EndpointDescriptor;

const CATALOG_JSON: &str = include_str!("../data/catalog.json");

/// A named group of endpoints
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub endpoints: Vec<EndpointDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Parse and validate the embedded catalog.
    pub fn builtin() -> Result<Self, ApiError> {
        Self::from_json(CATALOG_JSON)
    }

    pub fn from_json(text: &str) -> Result<Self, ApiError> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every `{name}` in a path must be declared as a url param of that endpoint.
    pub fn validate(&self) -> Result<(), ApiError> {
        for endpoint in self.endpoints() {
            for placeholder in placeholder_names(&endpoint.path_template) {
                if !endpoint.url_params.iter().any(|p| p.name == placeholder) {
                    return Err(ApiError::UndeclaredPlaceholder {
                        endpoint: endpoint.id.clone(),
                        placeholder,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.categories.iter().flat_map(|c| c.endpoints.iter())
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn find(&self, id: &str) -> Result<&EndpointDescriptor, ApiError> {
        self.endpoints()
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::UnknownEndpoint(id.to_string()))
    }
}

impl Category {
    /// Endpoints whose path, description or method contain `term`, ignoring case.
    /// A blank term matches everything.
    pub fn filter<'a>(&'a self, term: &str) -> Vec<&'a EndpointDescriptor> {
        let term = term.trim().to_lowercase();
        self.endpoints
            .iter()
            .filter(|e| {
                term.is_empty()
                    || e.path_template.to_lowercase().contains(&term)
                    || e.description.to_lowercase().contains(&term)
                    || e.method.as_str().to_lowercase().contains(&term)
            })
            .collect()
    }
}
