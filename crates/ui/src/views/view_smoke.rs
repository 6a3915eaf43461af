use quiz_core::access::PageLocation;

use super::test_harness::setup_view_harness;

#[tokio::test(flavor = "current_thread")]
async fn dashboard_signed_out_lists_quizzes() {
    let mut harness = setup_view_harness(None, "/");
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("Practice web development"), "missing intro in {html}");
    assert!(html.contains("HTML Quiz"), "missing html quiz in {html}");
    assert!(html.contains("JS Quiz"), "missing js quiz in {html}");
    assert!(html.contains("Sign in"), "missing sign in link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_signed_in_greets_user() {
    let mut harness = setup_view_harness(Some("ada@example.com"), "/");
    harness.rebuild();
    for _ in 0..3 {
        harness.drive_async().await;
    }
    let html = harness.render();

    assert!(html.contains("Welcome back"), "missing greeting in {html}");
    assert!(html.contains("Not attempted yet"), "missing empty card in {html}");
    assert!(html.contains("No attempts yet."), "missing empty history in {html}");
    assert!(html.contains("ada@example.com"), "missing profile label in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn signed_out_quiz_page_redirects_to_login() {
    let mut harness = setup_view_harness(None, "/quiz/html");
    harness.rebuild();
    for _ in 0..3 {
        harness.drive_async().await;
    }

    let path = harness.current_path();
    let page = PageLocation::parse(&path);
    assert_eq!(page.path(), "/login", "unexpected location {path}");
    assert_eq!(page.redirect_param().as_deref(), Some("/quiz/html"));

    let html = harness.render();
    assert!(html.contains("Sign in to continue"), "missing login hint in {html}");
    assert!(!html.contains("Start quiz"), "quiz rendered for signed-out user: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn signed_in_quiz_page_shows_start_form() {
    let mut harness = setup_view_harness(Some("ada@example.com"), "/quiz/html");
    harness.rebuild();
    for _ in 0..3 {
        harness.drive_async().await;
    }

    assert_eq!(harness.current_path(), "/quiz/html");
    let html = harness.render();
    assert!(html.contains("HTML Quiz"), "missing heading in {html}");
    assert!(html.contains("Start quiz"), "missing start button in {html}");
}
