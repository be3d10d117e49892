use serde::Serialize;
use std::collections::HashMap;

/// Id of the synthetic item the wiki uses to show crafting durations
pub const TIME_ID: &str = "/Time";

/// An image scraped from an icon, plus the caption shown on top of it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub relative_url: Option<String>,
    pub absolute_url: Option<String>,
    /// Quantity, duration or label; empty when the markup has none
    pub text: String,
}

/// A single item or concept found on the wiki
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: String,
    pub title: Option<String>,
    pub image: ImageRef,
}

impl Resource {
    pub fn is_time(&self) -> bool {
        self.id == TIME_ID
    }

    pub fn to_part(&self) -> RecipePart {
        RecipePart {
            id: self.id.clone(),
            time: self.image.text.clone(),
        }
    }
}

/// Reference to a resource inside a recipe.
///
/// `time` carries the icon caption of the resource, which is a quantity for
/// ingredients and products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipePart {
    pub id: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub inputs: Vec<RecipePart>,
    pub outputs: Vec<RecipePart>,
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<ImageRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub machines: Vec<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech: Option<ImageRef>,
}

impl Recipe {
    /// Images referenced by the recipe itself, not by its parts
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.process
            .iter()
            .chain(self.machine.iter())
            .chain(self.machines.iter())
            .chain(self.tech.iter())
    }
}

/// Product registry and recipe list of a run.
///
/// Products are keyed by id, kept in insertion order, and never overwritten.
/// Recipes are appended as-is.
#[derive(Debug, Default)]
pub struct Catalogue {
    products: Vec<Resource>,
    index: HashMap<String, usize>,
    recipes: Vec<Recipe>,
}

#[derive(Serialize)]
struct CatalogueDocument<'a> {
    products: &'a [Resource],
    recipes: &'a [Recipe],
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product unless its id is empty or already known.
    /// Returns whether the product was inserted.
    pub fn add_product(&mut self, resource: Resource) -> bool {
        if resource.id.is_empty() || self.index.contains_key(&resource.id) {
            return false;
        }
        self.index.insert(resource.id.clone(), self.products.len());
        self.products.push(resource);
        true
    }

    /// Appends a recipe; recipes without outputs are rejected.
    pub fn add_recipe(&mut self, recipe: Recipe) -> bool {
        if recipe.outputs.is_empty() {
            return false;
        }
        self.recipes.push(recipe);
        true
    }

    pub fn product(&self, id: &str) -> Option<&Resource> {
        self.index.get(id).map(|&i| &self.products[i])
    }

    pub fn products(&self) -> &[Resource] {
        &self.products
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&CatalogueDocument {
            products: &self.products,
            recipes: &self.recipes,
        })
    }
}
