use super::{element_text, selector};
use crate::model::{ImageRef, Resource};
use log::warn;
use scraper::ElementRef;
use url::Url;

const ICON_TEXT: &str = "div.factorio-icon-text";
const IMAGE_DIR: &str = "/images/";
const THUMB_DIR: &str = "thumb/";

/// Reads the first image of `element` and the caption drawn over it.
///
/// `default_text` replaces the caption when given. Without either, the text
/// is empty.
pub fn extract_image(element: ElementRef, base: &Url, default_text: Option<&str>) -> ImageRef {
    let relative_url = element
        .select(&selector("img"))
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    let absolute_url = relative_url.as_deref().and_then(|src| match base.join(src) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!("Cannot resolve image '{}' against {}: {}", src, base, e);
            None
        }
    });

    let text = match default_text {
        Some(text) => text.trim().to_string(),
        None => element
            .select(&selector(ICON_TEXT))
            .next()
            .map(element_text)
            .unwrap_or_default(),
    };

    ImageRef {
        relative_url,
        absolute_url,
        text,
    }
}

/// Turns one icon fragment into a resource.
///
/// Linked icons take their id and title from the link. Icons with only an
/// image fall back to the image file name. Returns `None` when the fragment
/// has neither.
pub fn extract_resource(element: ElementRef, base: &Url) -> Option<Resource> {
    let image = extract_image(element, base, None);

    if let Some(link) = element.select(&selector("a")).next() {
        let id = link.value().attr("href").unwrap_or_default().to_string();
        let title = link.value().attr("title").map(str::to_string);
        return Some(Resource { id, title, image });
    }

    let stem = image_stem(image.relative_url.as_deref()?)?;
    Some(Resource {
        id: format!("/{stem}"),
        title: Some(stem.replace('_', " ")),
        image,
    })
}

/// File name of a wiki image without directory, query or extension.
///
/// Thumbnails (`/images/thumb/Name.png/32px-Name.png`) resolve to the
/// original file name.
fn image_stem(src: &str) -> Option<&str> {
    let path = src.split(|c: char| c == '?' || c == '#').next()?;

    let file = match path.strip_prefix(IMAGE_DIR) {
        Some(rest) => rest.strip_prefix(THUMB_DIR).unwrap_or(rest).split('/').next()?,
        None => path.rsplit('/').next()?,
    };
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);

    (!stem.is_empty()).then_some(stem)
}
