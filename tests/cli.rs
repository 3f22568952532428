use std::process::Command;

fn page_scanner() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_page-scanner"));
    cmd.env_remove("PAGE_SCANNER_READY")
        .env_remove("PAGE_SCANNER_SETTLE_MS")
        .env_remove("PAGE_SCANNER_TIMEOUT_SECS")
        .env_remove("PAGE_SCANNER_CHROME");
    cmd
}

#[test]
fn test_no_url_prints_error_object() {
    let output = page_scanner().output().expect("Failed to run page-scanner");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "{\"error\": \"No URL provided\"}\n"
    );
}

#[test]
fn test_launch_failure_still_prints_json() {
    let output = page_scanner()
        .args(["--chrome", "/nonexistent/chrome-binary", "https://example.com"])
        .output()
        .expect("Failed to run page-scanner");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "stdout was: {stdout}");

    let value: serde_json::Value = serde_json::from_str(stdout.trim()).expect("stdout is JSON");
    assert_eq!(value["title"], "");
    assert_eq!(value["images"], serde_json::json!([]));
    assert_eq!(value["console_errors"], serde_json::json!([]));
    assert!(value["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[test]
fn test_extra_arguments_are_ignored() {
    let output = page_scanner()
        .args(["--chrome", "/nonexistent/chrome-binary", "https://a.example", "https://b.example"])
        .output()
        .expect("Failed to run page-scanner");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).expect("stdout is JSON");
    assert!(value["error"].as_str().is_some_and(|e| e.starts_with("Browser launch failed")));
}
