use super::{extract_resource, selector, Extractor, PageExtract, ParsingContext, INFOBOX};
use crate::error::ImportError;
use log::debug;

/// Infobox without a recipe; the page only contributes its own item.
pub struct InfoboxExtractor;

impl Extractor for InfoboxExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<PageExtract, ImportError> {
        debug!("Parsing plain infobox on {}", context.url);

        let cell = context
            .document
            .select(&selector(INFOBOX))
            .next()
            .and_then(|body| body.select(&selector("tr td")).next())
            .ok_or_else(|| context.data_error("infobox has no cells"))?;

        Ok(PageExtract {
            products: extract_resource(cell, &context.url).into_iter().collect(),
            recipes: Vec::new(),
        })
    }
}
