use super::{
    cells, element_text, extract_image, icon_resources, selector, Extractor, PageExtract,
    ParsingContext, WIKI_TABLE,
};
use crate::error::ImportError;
use crate::model::{Recipe, RecipePart, Resource};
use log::{debug, warn};

const COLUMNS: usize = 5;

/// Table of processes, one per row:
/// `process | inputs (time last) | outputs | machine | technology`.
pub struct ProcessTableExtractor;

impl Extractor for ProcessTableExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<PageExtract, ImportError> {
        debug!("Parsing process table on {}", context.url);

        let table = context
            .document
            .select(&selector(WIKI_TABLE))
            .next()
            .ok_or_else(|| context.data_error("no process table"))?;

        let base = &context.url;
        let mut extract = PageExtract::default();

        for (index, row) in table.select(&selector("tr")).enumerate().skip(1) {
            let columns = cells(row);
            if columns.is_empty() {
                continue;
            }
            if columns.len() < COLUMNS {
                return Err(context.data_error(format!(
                    "process row {index} has {} columns, expected {COLUMNS}",
                    columns.len()
                )));
            }

            let process_text = element_text(columns[0]);
            let process = extract_image(columns[0], base, Some(process_text.as_str()));

            let inputs = icon_resources(columns[1], base);
            let outputs = icon_resources(columns[2], base);
            let (input_parts, time) = split_time(&inputs);
            let output_parts = outputs.iter().map(Resource::to_part).collect::<Vec<_>>();

            extract.products.extend(inputs);
            extract.products.extend(outputs);

            if output_parts.is_empty() {
                warn!("Process '{}' on {} has no outputs", process_text, base);
                continue;
            }

            extract.recipes.push(Recipe {
                inputs: input_parts,
                outputs: output_parts,
                time,
                process: Some(process),
                machine: Some(extract_image(columns[3], base, None)),
                tech: Some(extract_image(columns[4], base, None)),
                ..Default::default()
            });
        }

        Ok(extract)
    }
}

/// Splits an input cell whose last icon is the duration
pub(super) fn split_time(resources: &[Resource]) -> (Vec<RecipePart>, Option<String>) {
    match resources.split_last() {
        Some((time, inputs)) => (
            inputs.iter().map(Resource::to_part).collect(),
            Some(time.image.text.clone()),
        ),
        None => (Vec::new(), None),
    }
}
