use factorio_wiki_import::{
    import_catalogue, write_catalogue, ErrorPolicy, ImportConfig, ImportError, SpecialPages,
};
use mockito::{Matcher, Mock, ServerGuard};
use std::path::Path;

fn icon(href: &str, text: &str) -> String {
    format!(
        r#"<div class="factorio-icon"><a href="{href}" title="{title}"><img src="/images{href}.png"></a><div class="factorio-icon-text">{text}</div></div>"#,
        title = href.trim_start_matches('/').replace('_', " ")
    )
}

fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>Factorio Wiki</title></head><body>{body}</body></html>")
}

fn category(links: &[&str]) -> String {
    let items: String = links
        .iter()
        .map(|l| format!(r#"<li><a href="{l}">{l}</a></li>"#))
        .collect();
    page(&format!(
        r#"<a href="/Main_Page">Main page</a><div class="mw-category"><ul>{items}</ul></div>"#
    ))
}

fn infobox_page(href: &str) -> String {
    page(&format!(
        r#"<div class="infobox"><table><tr><td>{}</td></tr><tr><td>Stack size</td><td>50</td></tr></table></div>"#,
        icon(href, "")
    ))
}

fn tabbed_page(label: &str) -> String {
    page(&format!(
        r#"<div class="infobox"><div class="tabbertab"><table>
            <tr class="border-top"><td><p>{label}</p></td></tr>
            <tr><td class="infobox-vrow-value">{}{}{}</td></tr>
        </table></div></div>"#,
        icon("/Time", "0.5"),
        icon("/Iron_plate", "2"),
        icon("/Iron_gear_wheel", "1"),
    ))
}

async fn serve(server: &mut ServerGuard, path: &str, body: String) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(body)
        .create_async()
        .await
}

async fn serve_images(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", Matcher::Regex(r"^/images/".to_string()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([0x89, b'P', b'N', b'G'])
        .create_async()
        .await
}

fn config(server: &ServerGuard, cache: &Path) -> ImportConfig {
    ImportConfig {
        root_url: format!("{}/Intermediate_products", server.url()),
        pages: SpecialPages {
            steam_url: format!("{}/Steam", server.url()),
            oil_url: None,
            barrel_url: None,
        },
        cache_dir: cache.to_path_buf(),
        exclusions_file: None,
        ..ImportConfig::default()
    }
}

#[tokio::test]
async fn test_category_with_infobox_and_tabbed_pages() {
    let mut server = mockito::Server::new_async().await;
    let _root = serve(
        &mut server,
        "/Intermediate_products",
        category(&["/Wood", "/Iron_gear_wheel"]),
    )
    .await;
    let _wood = serve(&mut server, "/Wood", infobox_page("/Wood")).await;
    let _gear = serve(&mut server, "/Iron_gear_wheel", tabbed_page("Recipe")).await;
    let _images = serve_images(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let catalogue = import_catalogue(config(&server, dir.path())).await.unwrap();

    let ids: Vec<&str> = catalogue.products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["/Wood", "/Time", "/Iron_plate", "/Iron_gear_wheel"]);
    assert_eq!(catalogue.recipes().len(), 1);

    let recipe = &catalogue.recipes()[0];
    assert_eq!(recipe.time.as_deref(), Some("0.5"));
    assert_eq!(recipe.inputs[0].id, "/Iron_plate");
    assert_eq!(recipe.outputs[0].id, "/Iron_gear_wheel");

    // pages and icons are cached
    assert!(dir.path().join(".Wood.html").is_file());
    assert!(dir.path().join("images").join(".Iron_plate.png").is_file());

    let output = dir.path().join("products.json");
    write_catalogue(&catalogue, &output).await.unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["products"].as_array().unwrap().len(), 4);
    assert_eq!(json["recipes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_run_uses_cache_only() {
    let mut server = mockito::Server::new_async().await;
    let root = server
        .mock("GET", "/Intermediate_products")
        .with_status(200)
        .with_body(category(&["/Iron_gear_wheel"]))
        .expect(1)
        .create_async()
        .await;
    let gear = server
        .mock("GET", "/Iron_gear_wheel")
        .with_status(200)
        .with_body(tabbed_page("Recipe"))
        .expect(1)
        .create_async()
        .await;
    let images = server
        .mock("GET", Matcher::Regex(r"^/images/".to_string()))
        .with_status(200)
        .with_body([0u8; 4])
        .expect(3)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let first = import_catalogue(config(&server, dir.path())).await.unwrap();
    let second = import_catalogue(config(&server, dir.path())).await.unwrap();

    root.assert_async().await;
    gear.assert_async().await;
    images.assert_async().await;
    assert_eq!(first.products(), second.products());
    assert_eq!(first.recipes(), second.recipes());
}

#[tokio::test]
async fn test_excluded_unrecognized_and_steam_pages_are_skipped() {
    let mut server = mockito::Server::new_async().await;
    let _root = serve(
        &mut server,
        "/Intermediate_products",
        category(&["/Coal", "/Tutorial", "/Steam", "/Wood"]),
    )
    .await;
    let coal = server
        .mock("GET", "/Coal")
        .with_status(200)
        .with_body(infobox_page("/Coal"))
        .expect(0)
        .create_async()
        .await;
    let _tutorial = serve(&mut server, "/Tutorial", page("<p>Welcome</p>")).await;
    let _steam = serve(&mut server, "/Steam", infobox_page("/Steam")).await;
    let _wood = serve(&mut server, "/Wood", infobox_page("/Wood")).await;
    let _images = serve_images(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let exclusions = dir.path().join("productExclusions.txt");
    std::fs::write(&exclusions, format!("{}/Coal\n", server.url())).unwrap();

    let mut config = config(&server, &dir.path().join("cache"));
    config.exclusions_file = Some(exclusions);

    let catalogue = import_catalogue(config).await.unwrap();

    coal.assert_async().await;
    let ids: Vec<&str> = catalogue.products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["/Wood"]);
    assert!(catalogue.recipes().is_empty());
}

#[tokio::test]
async fn test_broken_page_fails_fast_by_default() {
    let mut server = mockito::Server::new_async().await;
    let _root = serve(
        &mut server,
        "/Intermediate_products",
        category(&["/Iron_gear_wheel", "/Wood"]),
    )
    .await;
    let _gear = serve(&mut server, "/Iron_gear_wheel", tabbed_page("Mining time")).await;
    let _wood = serve(&mut server, "/Wood", infobox_page("/Wood")).await;
    let _images = serve_images(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let result = import_catalogue(config(&server, dir.path())).await;

    assert!(matches!(result, Err(ImportError::DataFormat { .. })));
}

#[tokio::test]
async fn test_broken_page_is_skipped_when_configured() {
    let mut server = mockito::Server::new_async().await;
    let _root = serve(
        &mut server,
        "/Intermediate_products",
        category(&["/Iron_gear_wheel", "/Missing", "/Wood"]),
    )
    .await;
    let _gear = serve(&mut server, "/Iron_gear_wheel", tabbed_page("Mining time")).await;
    let _wood = serve(&mut server, "/Wood", infobox_page("/Wood")).await;
    let _images = serve_images(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, dir.path());
    config.on_page_error = ErrorPolicy::Skip;

    let catalogue = import_catalogue(config).await.unwrap();

    assert_eq!(catalogue.products().len(), 1);
    assert_eq!(catalogue.products()[0].id, "/Wood");
}

#[tokio::test]
async fn test_barrel_page_is_parsed_after_the_category() {
    let mut server = mockito::Server::new_async().await;
    let _root = serve(&mut server, "/Intermediate_products", category(&["/Wood"])).await;
    let _wood = serve(&mut server, "/Wood", infobox_page("/Wood")).await;
    let barrel_body = page(&format!(
        r#"<div class="infobox"><table>
            <tr><td>Recipe</td><td>{}{}{}</td></tr>
            <tr><td>Required technologies</td><td>{}</td></tr>
        </table></div>
        <table class="wikitable">
            <tr><th>Process</th><th>Input</th><th>Building</th><th>Output</th></tr>
            <tr><td>Fill water barrel</td><td>{}{}{}</td><td>{}</td><td>{}</td></tr>
        </table>"#,
        icon("/Steel_plate", "1"),
        icon("/Time", "1"),
        icon("/Barrel", "1"),
        icon("/Fluid_handling_(research)", ""),
        icon("/Water", "50"),
        icon("/Barrel", "1"),
        icon("/Time", "0.2"),
        icon("/Assembling_machine_2", ""),
        icon("/Water_barrel", "1"),
    ));
    let barrel = server
        .mock("GET", "/Barrel")
        .with_status(200)
        .with_body(barrel_body)
        .expect(1)
        .create_async()
        .await;
    let _images = serve_images(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, dir.path());
    config.pages.barrel_url = Some(format!("{}/Barrel", server.url()));

    let catalogue = import_catalogue(config).await.unwrap();

    barrel.assert_async().await;
    assert_eq!(catalogue.recipes().len(), 2);
    assert_eq!(catalogue.recipes()[1].outputs[0].id, "/Water_barrel");
    assert_eq!(catalogue.recipes()[1].tech, catalogue.recipes()[0].tech);
    assert!(catalogue.product("/Water_barrel").is_some());

    // building and technology icons are only referenced by recipes
    let images = dir.path().join("images");
    assert!(images.join(".Assembling_machine_2.png").is_file());
    assert!(images.join(".Fluid_handling_(research).png").is_file());
}

fn tabbed_barrel_page() -> String {
    page(&format!(
        r#"<div class="infobox"><div class="tabbertab"><table>
            <tr class="border-top"><td><p>Recipe</p></td></tr>
            <tr><td class="infobox-vrow-value">{}{}{}</td></tr>
            <tr><td>Required technologies</td><td>{}</td></tr>
        </table></div></div>
        <table class="wikitable">
            <tr><th>Process</th><th>Input</th><th>Building</th><th>Output</th></tr>
            <tr><td>Fill water barrel</td><td>{}{}{}</td><td>{}</td><td>{}</td></tr>
        </table>"#,
        icon("/Steel_plate", "1"),
        icon("/Time", "1"),
        icon("/Barrel", "1"),
        icon("/Fluid_handling_(research)", ""),
        icon("/Water", "50"),
        icon("/Barrel", "1"),
        icon("/Time", "0.2"),
        icon("/Assembling_machine_2", ""),
        icon("/Water_barrel", "1"),
    ))
}

#[tokio::test]
async fn test_barrel_page_linked_from_category_uses_filling_tables() {
    let mut server = mockito::Server::new_async().await;
    let _root = serve(&mut server, "/Intermediate_products", category(&["/Barrel"])).await;
    let barrel = server
        .mock("GET", "/Barrel")
        .with_status(200)
        .with_body(tabbed_barrel_page())
        .expect(1)
        .create_async()
        .await;
    let _images = serve_images(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, dir.path());
    config.pages.barrel_url = Some(format!("{}/Barrel", server.url()));

    let catalogue = import_catalogue(config).await.unwrap();

    barrel.assert_async().await;
    assert_eq!(catalogue.recipes().len(), 2);
    assert_eq!(catalogue.recipes()[0].outputs[0].id, "/Barrel");
    assert_eq!(catalogue.recipes()[1].outputs[0].id, "/Water_barrel");
    assert!(catalogue.recipes()[1].tech.is_some());
    assert!(catalogue.product("/Water_barrel").is_some());
}

#[tokio::test]
async fn test_skipped_barrel_page_is_retried_by_its_own_pass() {
    let mut server = mockito::Server::new_async().await;
    let _root = serve(
        &mut server,
        "/Intermediate_products",
        category(&["/Barrel", "/Wood"]),
    )
    .await;
    let _barrel = serve(&mut server, "/Barrel", page("<p>No tables</p>")).await;
    let _wood = serve(&mut server, "/Wood", infobox_page("/Wood")).await;
    let _images = serve_images(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, dir.path());
    config.on_page_error = ErrorPolicy::Skip;
    config.pages.barrel_url = Some(format!("{}/Barrel", server.url()));

    let result = import_catalogue(config).await;

    assert!(matches!(result, Err(ImportError::DataFormat { .. })));
}
