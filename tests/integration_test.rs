use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rockslide"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_generate_html_command() {
    // Create temporary directory
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();

    // Create sample markdown file
    let markdown_path = temp_path.join("test.md");
    let markdown_content = "# Test Slide\n\nThis is a test slide.";
    fs::write(&markdown_path, markdown_content).expect("Failed to write markdown file");

    // Create sample CSS file
    let css_path = temp_path.join("test.css");
    let css_content = "body { font-family: Arial; }";
    fs::write(&css_path, css_content).expect("Failed to write CSS file");

    // Output HTML path
    let output_path = temp_path.join("output.html");

    let output = run_command(&[
        markdown_path.to_str().unwrap(),
        "-d",
        output_path.to_str().unwrap(),
        "--css",
        css_path.to_str().unwrap(),
        "--embed",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(output_path.exists(), "Output file was not created");

    let html_content = fs::read_to_string(&output_path).expect("Failed to read output file");
    assert!(
        html_content.contains("<header><h1>Test Slide</h1></header>"),
        "Missing markdown content"
    );
    assert!(
        html_content.contains("<p>This is a test slide.</p>"),
        "Missing slide body"
    );
    assert!(
        html_content.contains("<style>\nbody { font-family: Arial; }\n</style>"),
        "Missing CSS"
    );
}

#[test]
fn test_linked_theme_assets() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();

    let markdown_path = temp_path.join("test.md");
    fs::write(&markdown_path, "# Linked").expect("Failed to write markdown file");
    let output_path = temp_path.join("output.html");

    let output = run_command(&[
        markdown_path.to_str().unwrap(),
        "--destination",
        output_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let html_content = fs::read_to_string(&output_path).expect("Failed to read output file");
    assert!(
        html_content.contains("<link rel=\"stylesheet\" media=\"print\" href=\"file://"),
        "Theme CSS should be linked outside embed mode"
    );
    assert!(
        html_content.contains("<script src=\"file://"),
        "Theme JS should be linked outside embed mode"
    );
}

#[test]
fn test_direct_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = temp_dir.path().join("deck.md");
    fs::write(&markdown_path, "# Direct\n\n---\n\n# Second").expect("Failed to write markdown");

    let output = run_command(&[markdown_path.to_str().unwrap(), "-o"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<title>Direct</title>"));
    assert!(stdout.contains("id=\"slide2\""));
    // direct mode implies verbose progress on stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Adding"), "Missing progress log: {}", stderr);
    assert!(!temp_dir.path().join("presentation.html").exists());
}

#[test]
fn test_unsupported_destination_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = temp_dir.path().join("deck.md");
    fs::write(&markdown_path, "# Deck").expect("Failed to write markdown");
    let output_path = temp_dir.path().join("deck.docx");

    let output = run_command(&[
        markdown_path.to_str().unwrap(),
        "-d",
        output_path.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("can only write html or pdf"), "stderr: {}", stderr);
    assert!(!output_path.exists());
}

#[test]
fn test_missing_source_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_command(&[temp_dir.path().join("missing.md").to_str().unwrap(), "-o"]);
    assert!(!output.status.success());
}

#[test]
fn test_unknown_macro_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = temp_dir.path().join("deck.md");
    fs::write(&markdown_path, "# Deck").expect("Failed to write markdown");

    let output = run_command(&[
        markdown_path.to_str().unwrap(),
        "-o",
        "--macros",
        "fx,sparkles",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sparkles"), "stderr: {}", stderr);
}
