use rockslide::{Config, Generator, RockslideError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// 1x1 PNG
const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Build a small talk: two chapters, an image, notes, fx and a QR code
fn create_talk(base: &Path) {
    write(
        &base.join("talk/01-intro/01-title.md"),
        b"# Rust Slides\n\n.fx: title\n\nA talk about slides\n\n---\n\n## Agenda\n\n- Parsing\n- Rendering\n",
    );
    write(
        &base.join("talk/01-intro/02-picture.md"),
        b"## A Picture\n\n![dot](img/dot.png)\n\n.notes: mention the dot\n",
    );
    write(&base.join("talk/01-intro/img/dot.png"), PNG_BYTES);
    write(
        &base.join("talk/02-details.md"),
        b"# Details\n\n```python\nprint(\"hi\")\n```\n\n---\n\n### Deep dive\n\nNot in the TOC\n\n---\n\n.qr: 300|slides rock\n",
    );
    write(&base.join("talk/README.txt"), b"ignored");
    write(&base.join("extra.css"), b".slide h1 { color: #c00; }");
}

#[test]
fn test_config_file_pipeline() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let base = temp_dir.path();
    create_talk(base);
    write(
        &base.join("talk.cfg"),
        b"[rockslide]\nsource = \"talk\"\ndestination = \"build/talk.html\"\nembed = true\ncss = [\"extra.css\"]\n",
    );

    let config = Config::load(&base.join("talk.cfg")).expect("Failed to load config");
    let generator = Generator::new(config, None).expect("Failed to configure generator");
    let records = generator.fetch_contents().expect("Failed to walk sources");
    let vars = generator.template_vars(records).expect("Failed to build vars");

    let titles: Vec<_> = vars
        .slides
        .iter()
        .map(|s| s.title.clone().unwrap_or_default())
        .collect();
    assert_eq!(
        titles,
        vec!["Rust Slides", "Agenda", "A Picture", "Details", "Deep dive", ""]
    );
    assert_eq!(vars.num_slides, 6);
    assert_eq!(vars.head_title, "Rust Slides");

    // Outline: two roots, level-3 slide left out
    let toc = vars.toc.entries();
    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].sub.len(), 2);
    assert_eq!(toc[0].sub[1].title, "A Picture");
    assert_eq!(toc[0].sub[1].number, Some(3));
    assert_eq!(toc[1].title, "Details");
    assert!(toc[1].sub.is_empty());

    assert_eq!(vars.slides[0].classes, vec!["title"]);
    assert_eq!(vars.slides[2].classes, vec!["has_notes"]);
    assert!(vars.slides[2].content.contains("src=\"data:image/png;base64,"));
    assert_eq!(vars.slides[3].classes, vec!["has_code"]);
    assert_eq!(vars.slides[5].classes, vec!["has_qr"]);

    let source = vars.slides[2].source.as_ref().expect("provenance");
    assert!(source.rel_path.ends_with("talk/01-intro/02-picture.md"));

    generator.execute().expect("Failed to write presentation");
    let html = fs::read_to_string(base.join("build/talk.html")).expect("Failed to read output");
    assert!(html.contains("<title>Rust Slides</title>"));
    assert!(html.contains(".slide h1 { color: #c00; }"));
    assert!(html.contains("<p class=\"notes\">mention the dot</p>"));
    assert!(html.contains("data-count=\"6\""));
}

#[test]
fn test_linked_images_point_at_source_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let base = temp_dir.path();
    create_talk(base);

    let mut config = Config::new(base.join("talk/01-intro"));
    config.destination = base.join("out.html");
    let generator = Generator::new(config, None).expect("Failed to configure generator");
    let html = generator.render().expect("Failed to render");

    let image_dir = url::Url::from_directory_path(
        fs::canonicalize(base.join("talk/01-intro")).expect("canonical path"),
    )
    .expect("file url");
    assert!(
        html.contains(&format!("src=\"{}img/dot.png\"", image_dir)),
        "image path not rewritten"
    );
}

#[test]
fn test_config_without_source() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cfg = temp_dir.path().join("talk.toml");
    write(&cfg, b"[rockslide]\ntheme = \"default\"\n");

    let result = Config::load(&cfg);
    assert!(matches!(result, Err(RockslideError::ConfigError(_))));
}

#[test]
#[ignore] // Ignore by default as it requires a headless browser
fn test_pdf_export() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let base = temp_dir.path();
    create_talk(base);

    let mut config = Config::new(base.join("talk"));
    config.destination = base.join("talk.pdf");
    let generator = Generator::new(config, None).expect("Failed to configure generator");
    generator.write().expect("Failed to export PDF");

    let bytes = fs::read(base.join("talk.pdf")).expect("Failed to read PDF");
    assert!(bytes.starts_with(b"%PDF"));
}
