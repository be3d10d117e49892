use super::{element_text, selector, Extractor, PageExtract, ParsingContext, TABBED_RECIPE_BOX};
use crate::error::ImportError;
use crate::model::Recipe;
use log::{debug, warn};

const RECIPE_LABEL: &str = "tr.border-top td p";
const RECIPE_ROW: &str = "tr + tr > td.infobox-vrow-value";

/// Infobox with tabs whose second row lists the crafting recipe:
/// ingredients, the `/Time` icon, and the product last.
pub struct TabbedRecipeExtractor;

impl Extractor for TabbedRecipeExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<PageExtract, ImportError> {
        debug!("Parsing tabbed recipe box on {}", context.url);

        let body = context
            .document
            .select(&selector(TABBED_RECIPE_BOX))
            .next()
            .ok_or_else(|| context.data_error("no tabbed infobox"))?;

        let label = body
            .select(&selector(RECIPE_LABEL))
            .next()
            .map(element_text)
            .unwrap_or_default();
        if !label.eq_ignore_ascii_case("recipe") {
            return Err(context.data_error(format!("no recipe label, found '{label}'")));
        }

        let row = body
            .select(&selector(RECIPE_ROW))
            .next()
            .ok_or_else(|| context.data_error("no recipe row after the label"))?;

        let mut extract = PageExtract {
            products: super::icon_resources(row, &context.url),
            recipes: Vec::new(),
        };

        let resources = &extract.products;
        let Some((output, rest)) = resources.split_last() else {
            warn!("Recipe row on {} has no icons", context.url);
            return Ok(extract);
        };

        let time_index = rest.iter().rposition(|r| r.is_time());
        let inputs = rest
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != time_index)
            .map(|(_, r)| r.to_part())
            .collect();

        let recipe = Recipe {
            inputs,
            outputs: vec![output.to_part()],
            time: time_index.map(|i| rest[i].image.text.clone()),
            ..Default::default()
        };
        extract.recipes.push(recipe);

        Ok(extract)
    }
}
