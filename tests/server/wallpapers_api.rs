use std::time::Duration;

use image::GenericImageView;
use wallfeed::application::retry::RetryPolicy;
use wiremock::ResponseTemplate;

use crate::helpers::{
    FEED_PATH_PREFIX, IMAGE_PATH_PREFIX, content_type, decode_jpeg, image_urls, mount_feed,
    mount_feed_response, mount_feed_response_times, mount_image_response, mount_png_images,
    png_bytes, spawn_app, spawn_app_with, spawn_app_with_retry,
};

// ===========================================================================
// Serving wallpapers
// ===========================================================================

#[tokio::test]
async fn serves_full_frame_jpeg_for_named_community() {
    let app = spawn_app().await;
    let urls = image_urls(&app, 25);
    mount_feed(&app, "EarthPorn", &urls).await;
    mount_png_images(&app, 3000, 2000).await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 200);
    assert_eq!(content_type(&response), Some("image/jpeg"));
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
    let img = decode_jpeg(response).await;
    assert_eq!(img.dimensions(), (1920, 1080));

    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 1);
    assert_eq!(app.upstream_requests(IMAGE_PATH_PREFIX).await, 1);
}

#[tokio::test]
async fn root_serves_default_community() {
    let app = spawn_app().await;
    let urls = image_urls(&app, 3);
    mount_feed(&app, "EarthPorn", &urls).await;
    mount_png_images(&app, 64, 36).await;

    let response = app.get("/").await;

    assert_eq!(response.status(), 200);
    assert_eq!(content_type(&response), Some("image/jpeg"));
    assert_eq!(decode_jpeg(response).await.dimensions(), (1920, 1080));
}

#[tokio::test]
async fn serves_any_valid_community() {
    let app = spawn_app().await;
    let urls = image_urls(&app, 1);
    mount_feed(&app, "wallpapers", &urls).await;
    mount_png_images(&app, 40, 40).await;

    let response = app.get("/wallpapers").await;

    assert_eq!(response.status(), 200);
    assert_eq!(decode_jpeg(response).await.dimensions(), (1920, 1080));
}

#[tokio::test]
async fn responses_carry_nosniff_header() {
    let app = spawn_app().await;

    let response = app.get("/favicon.ico").await;

    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
}

// ===========================================================================
// Rejected routes
// ===========================================================================

#[tokio::test]
async fn favicon_is_not_found_without_upstream_calls() {
    let app = spawn_app().await;

    let response = app.get("/favicon.ico").await;

    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "Not Found");
    assert_eq!(app.upstream_requests("/").await, 0);
}

#[tokio::test]
async fn invalid_community_is_not_found_without_upstream_calls() {
    let app = spawn_app().await;

    for path in ["/robots.txt", "/not.a.community", "/way_too_long_for_a_community_name"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), 404, "{path} should be rejected");
    }

    assert_eq!(app.upstream_requests("/").await, 0);
}

// ===========================================================================
// Retries
// ===========================================================================

#[tokio::test]
async fn failing_feed_exhausts_default_budget() {
    let app = spawn_app().await;
    mount_feed_response(&app, "EarthPorn", ResponseTemplate::new(503)).await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "Internal Server Error");
    // One attempt plus five retries
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 6);
    assert_eq!(app.upstream_requests(IMAGE_PATH_PREFIX).await, 0);
}

#[tokio::test]
async fn failing_feed_respects_configured_budget() {
    let app = spawn_app_with_retry(RetryPolicy::new(4)).await;
    mount_feed_response(&app, "EarthPorn", ResponseTemplate::new(500)).await;

    let response = app.get("/").await;

    assert_eq!(response.status(), 500);
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 5);
}

#[tokio::test]
async fn disabled_retry_makes_a_single_attempt() {
    let app = spawn_app_with_retry(RetryPolicy::disabled()).await;
    mount_feed_response(&app, "EarthPorn", ResponseTemplate::new(502)).await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 1);
}

#[tokio::test]
async fn flaky_feed_recovers_within_budget() {
    let app = spawn_app().await;
    let urls = image_urls(&app, 5);
    mount_feed(&app, "EarthPorn", &urls).await;
    mount_feed_response_times(&app, "EarthPorn", ResponseTemplate::new(500), 2).await;
    mount_png_images(&app, 32, 18).await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 200);
    assert_eq!(decode_jpeg(response).await.dimensions(), (1920, 1080));
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 3);
}

#[tokio::test]
async fn malformed_listing_is_retried_then_fails() {
    let app = spawn_app_with_retry(RetryPolicy::new(2)).await;
    mount_feed_response(
        &app,
        "EarthPorn",
        ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"),
    )
    .await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 3);
}

#[tokio::test]
async fn empty_feed_fails_after_every_attempt() {
    let app = spawn_app().await;
    mount_feed(&app, "EarthPorn", &[]).await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "Internal Server Error");
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 6);
}

#[tokio::test]
async fn missing_image_retries_whole_pipeline() {
    let app = spawn_app_with_retry(RetryPolicy::new(2)).await;
    // Links to the image host, but nothing is mounted there, so every fetch 404s
    let urls = image_urls(&app, 25);
    mount_feed(&app, "EarthPorn", &urls).await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 3);
    assert_eq!(app.upstream_requests(IMAGE_PATH_PREFIX).await, 3);
}

#[tokio::test]
async fn non_image_link_fails() {
    let app = spawn_app_with_retry(RetryPolicy::disabled()).await;
    let urls = vec![app.image_url("gallery.html")];
    mount_feed(&app, "EarthPorn", &urls).await;
    wiremock::Mock::given(wiremock::matchers::path("/images/gallery.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>gallery</html>", "text/html"),
        )
        .mount(&app.mock_server)
        .await;

    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert_eq!(app.upstream_requests(IMAGE_PATH_PREFIX).await, 1);
}

#[tokio::test]
async fn slow_feed_times_out_and_counts_as_a_failed_attempt() {
    let app = spawn_app_with(|config| {
        config.retry = RetryPolicy::new(1);
        config.upstream_timeout = Duration::from_millis(200);
    })
    .await;
    mount_feed_response(
        &app,
        "EarthPorn",
        ResponseTemplate::new(200)
            .set_body_json(crate::helpers::listing_body(&[]))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let started = std::time::Instant::now();
    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert!(
        started.elapsed() < Duration::from_secs(4),
        "request should not wait for the slow upstream"
    );
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 2);
}

#[tokio::test]
async fn slow_image_host_times_out_and_counts_as_a_failed_attempt() {
    let app = spawn_app_with(|config| {
        config.retry = RetryPolicy::new(2);
        config.upstream_timeout = Duration::from_millis(200);
    })
    .await;
    let urls = image_urls(&app, 25);
    mount_feed(&app, "EarthPorn", &urls).await;
    mount_image_response(
        &app,
        ResponseTemplate::new(200)
            .set_body_raw(png_bytes(48, 27), "image/png")
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let started = std::time::Instant::now();
    let response = app.get("/EarthPorn").await;

    assert_eq!(response.status(), 500);
    assert!(
        started.elapsed() < Duration::from_secs(4),
        "request should not wait for the slow image host"
    );
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 3);
    assert_eq!(app.upstream_requests(IMAGE_PATH_PREFIX).await, 3);
}

#[tokio::test]
async fn concurrent_requests_are_served_independently() {
    let app = spawn_app().await;
    let urls = image_urls(&app, 25);
    mount_feed(&app, "EarthPorn", &urls).await;
    mount_png_images(&app, 48, 27).await;

    let (a, b, c, d) = tokio::join!(
        app.get("/EarthPorn"),
        app.get("/EarthPorn"),
        app.get("/"),
        app.get("/"),
    );

    for response in [a, b, c, d] {
        assert_eq!(response.status(), 200);
    }
    assert_eq!(app.upstream_requests(FEED_PATH_PREFIX).await, 4);
}
