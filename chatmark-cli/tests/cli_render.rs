use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[allow(deprecated)]
fn chatmark() -> Command {
    let mut cmd = Command::cargo_bin("chatmark").expect("chatmark binary");
    cmd.env_remove("CHATMARK_CONFIG");
    cmd
}

#[test]
fn render_stdin_compact() {
    chatmark()
        .args(["--preset", "compact", "render"])
        .write_stdin("**hi** `a+b`\n\nnext")
        .assert()
        .success()
        .stdout("<p><strong>hi</strong> <code>a+b</code></p><p>next</p>\n");
}

#[test]
fn render_rich_by_default() {
    chatmark()
        .arg("render")
        .write_stdin("# Title")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<h1 class=\"text-2xl font-bold mt-4 mb-2 text-gray-800 dark:text-gray-200\">Title</h1>",
        ));
}

#[test]
fn render_file_to_page() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("reply.md");
    let output = dir.path().join("reply.html");
    fs::write(&input, "Visit www.example.com today")?;

    chatmark()
        .args(["render", "--page", "--title", "Reply", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let html = fs::read_to_string(&output)?;
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("<title>Reply</title>"));
    assert!(html.contains("href=\"https://www.example.com\""));
    Ok(())
}

#[test]
fn config_file_controls_rules() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("chatmark.yml");
    fs::write(
        &config,
        r#"
preset: compact
rules: [inline_code, italic]
"#,
    )?;

    chatmark()
        .arg("--config")
        .arg(&config)
        .arg("render")
        .write_stdin("# not a heading *but italic*")
        .assert()
        .success()
        .stdout("<p># not a heading <em>but italic</em></p>\n");
    Ok(())
}

#[test]
fn bad_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("chatmark.yml");
    fs::write(&config, "style:\n  sparkle: x\n")?;

    chatmark()
        .arg("--config")
        .arg(&config)
        .arg("render")
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown style key: sparkle"));
    Ok(())
}

#[test]
fn demo_source_and_html() {
    chatmark()
        .args(["demo", "--source"])
        .assert()
        .success()
        .stdout(predicate::str::contains("```javascript"));

    chatmark()
        .args(["--preset", "compact", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<table>").and(predicate::str::contains("<kbd>Ctrl</kbd>")));
}
