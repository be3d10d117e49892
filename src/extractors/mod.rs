use crate::config::SpecialPages;
use crate::error::ImportError;
use crate::model::{ImageRef, Recipe, Resource};
use scraper::{ElementRef, Html, Selector};
use url::Url;

mod filling_table;
mod icon;
mod infobox;
mod process_table;
mod tabbed;

pub use filling_table::FillingTableExtractor;
pub use icon::{extract_image, extract_resource};
pub use infobox::InfoboxExtractor;
pub use process_table::ProcessTableExtractor;
pub use tabbed::TabbedRecipeExtractor;

pub(crate) const ICON: &str = "div.factorio-icon";
const TABBED_RECIPE_BOX: &str = "div.infobox div.tabbertab table>tbody";
const WIKI_TABLE: &str = "table.wikitable";
const INFOBOX: &str = "div.infobox table>tbody";

pub struct ParsingContext {
    pub url: Url,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(url: Url, html: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
        }
    }

    pub(crate) fn data_error(&self, message: impl Into<String>) -> ImportError {
        ImportError::DataFormat {
            url: self.url.to_string(),
            message: message.into(),
        }
    }
}

/// Products and recipes found on one page
#[derive(Debug, Default)]
pub struct PageExtract {
    /// Every resource encountered, in markup order, duplicates included
    pub products: Vec<Resource>,
    pub recipes: Vec<Recipe>,
}

impl PageExtract {
    /// Every image referenced by the extract, in the order it was scraped
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.products
            .iter()
            .map(|resource| &resource.image)
            .chain(self.recipes.iter().flat_map(Recipe::images))
    }
}

pub trait Extractor {
    fn parse(&self, context: &ParsingContext) -> Result<PageExtract, ImportError>;
}

/// Page layouts told apart by [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// No known layout matched
    Unrecognized,
    /// Layout is known but deliberately not parsed
    Skipped,
    TabbedRecipe,
    PlainInfobox,
    GenericTable,
    FillingTable,
}

impl PageKind {
    /// The parser handling this kind, if any
    pub fn extractor(self) -> Option<Box<dyn Extractor>> {
        match self {
            PageKind::Unrecognized | PageKind::Skipped => None,
            PageKind::TabbedRecipe => Some(Box::new(TabbedRecipeExtractor)),
            PageKind::PlainInfobox => Some(Box::new(InfoboxExtractor)),
            PageKind::GenericTable => Some(Box::new(ProcessTableExtractor)),
            PageKind::FillingTable => Some(Box::new(FillingTableExtractor)),
        }
    }
}

/// Picks the layout of a page. The configured special pages always get
/// their own parser. Other checks run from most to least specific: a tabbed
/// recipe box also matches the plain infobox pattern.
pub fn classify(context: &ParsingContext, pages: &SpecialPages) -> PageKind {
    let url = context.url.as_str();

    if same_url(url, &pages.steam_url) {
        return PageKind::Skipped;
    }
    if pages.barrel_url.as_deref().is_some_and(|b| same_url(url, b)) {
        return PageKind::FillingTable;
    }
    if pages.oil_url.as_deref().is_some_and(|o| same_url(url, o)) {
        return PageKind::GenericTable;
    }
    if has_match(&context.document, TABBED_RECIPE_BOX) {
        return PageKind::TabbedRecipe;
    }
    if has_match(&context.document, WIKI_TABLE) {
        return PageKind::Skipped;
    }
    if has_match(&context.document, INFOBOX) {
        return PageKind::PlainInfobox;
    }
    PageKind::Unrecognized
}

fn has_match(document: &Html, css: &str) -> bool {
    document.select(&selector(css)).next().is_some()
}

fn same_url(url: &str, configured: &str) -> bool {
    Url::parse(configured).is_ok_and(|configured| configured.as_str() == url)
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must be valid CSS")
}

/// Concatenated text of an element, trimmed
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Direct `td` children of a table row
pub(crate) fn cells(row: ElementRef) -> Vec<ElementRef> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "td")
        .collect()
}

/// Resources of every icon inside `element`, skipping icons that yield none
pub(crate) fn icon_resources(element: ElementRef, base: &Url) -> Vec<Resource> {
    element
        .select(&selector(ICON))
        .filter_map(|icon| extract_resource(icon, base))
        .collect()
}
