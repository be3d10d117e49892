use super::process_table::split_time;
use super::{
    cells, element_text, extract_image, extract_resource, icon_resources, selector, Extractor,
    PageExtract, ParsingContext, ICON, WIKI_TABLE,
};
use crate::error::ImportError;
use crate::model::{ImageRef, Recipe, Resource};
use log::{debug, warn};
use scraper::ElementRef;
use url::Url;

const COLUMNS: usize = 4;

/// Barrel-style page.
///
/// The first table holds the recipe of the container itself as a row of
/// three icons (input, time, output) followed by a row with the unlocking
/// technology. Every wiki table after it lists filling and emptying
/// processes as `process | inputs (time last) | machines | outputs`, all
/// unlocked by that same technology.
pub struct FillingTableExtractor;

impl Extractor for FillingTableExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<PageExtract, ImportError> {
        debug!("Parsing filling tables on {}", context.url);

        let base = &context.url;
        let first = context
            .document
            .select(&selector("table"))
            .next()
            .ok_or_else(|| context.data_error("page has no tables"))?;

        let mut extract = PageExtract::default();
        let tech = parse_container_recipe(context, first, &mut extract)?;

        for table in context.document.select(&selector(WIKI_TABLE)) {
            if table.id() == first.id() {
                continue;
            }
            for (index, row) in table.select(&selector("tr")).enumerate().skip(1) {
                let columns = cells(row);
                if columns.is_empty() {
                    continue;
                }
                if columns.len() < COLUMNS {
                    return Err(context.data_error(format!(
                        "filling row {index} has {} columns, expected {COLUMNS}",
                        columns.len()
                    )));
                }

                let process_text = element_text(columns[0]);
                let process = extract_image(columns[0], base, Some(process_text.as_str()));

                let inputs = icon_resources(columns[1], base);
                let machines = machine_images(columns[2], base);
                let outputs = icon_resources(columns[3], base);
                let (input_parts, time) = split_time(&inputs);
                let output_parts = outputs.iter().map(Resource::to_part).collect::<Vec<_>>();

                extract.products.extend(inputs);
                extract.products.extend(outputs);

                if output_parts.is_empty() {
                    warn!("Filling process '{}' on {} has no outputs", process_text, base);
                    continue;
                }

                extract.recipes.push(Recipe {
                    inputs: input_parts,
                    outputs: output_parts,
                    time,
                    process: Some(process),
                    machines,
                    tech: tech.clone(),
                    ..Default::default()
                });
            }
        }

        Ok(extract)
    }
}

/// Emits the recipe of the first table and returns the technology found
/// below it.
fn parse_container_recipe(
    context: &ParsingContext,
    table: ElementRef,
    extract: &mut PageExtract,
) -> Result<Option<ImageRef>, ImportError> {
    let base = &context.url;
    let icon = selector(ICON);

    let row = table
        .select(&selector("tr"))
        .find(|row| row.select(&icon).count() >= 3)
        .ok_or_else(|| context.data_error("no row with input, time and output icons"))?;

    let mut resources = Vec::with_capacity(3);
    for fragment in row.select(&icon).take(3) {
        let resource = extract_resource(fragment, base)
            .ok_or_else(|| context.data_error("recipe icon has neither link nor image"))?;
        resources.push(resource);
    }
    let [input, time, output]: [Resource; 3] = resources
        .try_into()
        .map_err(|_| context.data_error("expected three recipe icons"))?;

    let tech = row
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "tr")
        .filter(|next| {
            next.select(&selector("a")).next().is_some()
                || next.select(&selector("img")).next().is_some()
        })
        .map(|next| extract_image(next, base, None));

    if tech.is_none() {
        warn!("No technology row below the recipe on {}", base);
    }

    extract.recipes.push(Recipe {
        inputs: vec![input.to_part()],
        outputs: vec![output.to_part()],
        time: Some(time.image.text.clone()),
        tech: tech.clone(),
        ..Default::default()
    });
    extract.products.extend([input, time, output]);

    Ok(tech)
}

/// One image per building icon, or the whole cell when it has no icons
fn machine_images(cell: ElementRef, base: &Url) -> Vec<ImageRef> {
    let icons: Vec<ImageRef> = cell
        .select(&selector(ICON))
        .map(|icon| extract_image(icon, base, None))
        .filter(|image| image.relative_url.is_some())
        .collect();

    if icons.is_empty() && cell.select(&selector("img")).next().is_some() {
        return vec![extract_image(cell, base, None)];
    }
    icons
}
