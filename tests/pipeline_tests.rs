//! # Pipeline Tests
//!
//! Drive [`Generator`] and [`Studio`] end to end against a scripted backend.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::Notify;

use adhyatmik::model::{AspectRatio, CaptionRequest};
use adhyatmik::{AdhyatmikError, Generator, StatusBoard, Studio};
use common::{FailAt, ScriptedBackend, compositor, png_background};

fn generator(backend: Arc<ScriptedBackend>) -> Generator {
    Generator::new(backend, compositor()).with_status_period(Duration::from_millis(50))
}

#[tokio::test]
async fn test_empty_caption_never_reaches_backend() {
    let backend = Arc::new(ScriptedBackend::new(&png_background(64, 64)));
    let generator = generator(backend.clone());
    let board = StatusBoard::new();
    let rx = board.subscribe();

    let err = generator
        .generate(&CaptionRequest::new("   ", AspectRatio::Portrait), &board)
        .await
        .unwrap_err();

    assert!(matches!(err, AdhyatmikError::Validation(_)));
    assert_eq!(backend.total_calls(), 0);
    assert!(!rx.has_changed().unwrap(), "status indicator must never start");
    assert!(!board.current().busy);
}

#[tokio::test]
async fn test_analysis_failure_stops_pipeline() {
    let backend = Arc::new(ScriptedBackend::new(&png_background(64, 64)).failing_at(FailAt::Analyze));
    let compositor = compositor();
    let generator = Generator::new(backend.clone(), compositor.clone())
        .with_status_period(Duration::from_millis(50));
    let board = StatusBoard::new();

    let err = generator
        .generate(&CaptionRequest::new("जय श्री राम", AspectRatio::Square), &board)
        .await
        .unwrap_err();

    assert!(matches!(err, AdhyatmikError::Upstream(_)));
    assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.synth_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 1);
    assert_eq!(compositor.surfaces_acquired(), 0, "nothing may be drawn");

    let status = board.current();
    assert!(!status.busy);
    assert!(status.message.is_empty());

    // No late rotation after the failure.
    let rx = board.subscribe();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_planning_failure_skips_later_stages() {
    let backend = Arc::new(ScriptedBackend::new(&png_background(64, 64)).failing_at(FailAt::Plan));
    let generator = generator(backend.clone());

    let err = generator
        .generate(&CaptionRequest::new("ॐ नमः शिवाय", AspectRatio::Story), &StatusBoard::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AdhyatmikError::Upstream(_)));
    assert_eq!(backend.synth_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_undecodable_background_is_asset_error() {
    let backend = Arc::new(
        ScriptedBackend::new(&png_background(8, 8))
            .with_background_b64("bm90IGFuIGltYWdl"), // "not an image"
    );
    let generator = generator(backend.clone());
    let board = StatusBoard::new();

    let err = generator
        .generate(&CaptionRequest::new("शुभ रात्रि", AspectRatio::Portrait), &board)
        .await
        .unwrap_err();

    assert!(matches!(err, AdhyatmikError::Asset(_)));
    assert!(!board.current().busy);
}

#[tokio::test]
async fn test_malformed_base64_is_upstream_error() {
    let backend = Arc::new(ScriptedBackend::new(&png_background(8, 8)).with_background_b64("%%%"));
    let generator = generator(backend.clone());

    let err = generator
        .generate(&CaptionRequest::new("शुभ रात्रि", AspectRatio::Portrait), &StatusBoard::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AdhyatmikError::Upstream(_)));
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_success_produces_jpeg_sized_from_background() {
    let compositor = compositor();
    let backend = Arc::new(ScriptedBackend::new(&png_background(1200, 1500)));
    let generator = Generator::new(backend.clone(), compositor.clone());
    let board = StatusBoard::new();

    let image = generator
        .generate(&CaptionRequest::new("कर्म करो, फल की चिंता मत करो।", AspectRatio::Portrait), &board)
        .await
        .unwrap();

    assert_eq!((image.width, image.height), (1080, 1350));
    assert_eq!(&image.bytes[..3], &[0xFF, 0xD8, 0xFF]);
    let decoded = image::load_from_memory(&image.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1350));
    assert!(image.to_data_url().starts_with("data:image/jpeg;base64,"));

    assert_eq!(backend.total_calls(), 3);
    assert_eq!(compositor.surfaces_acquired(), 1);
    assert!(!board.current().busy);
}

#[tokio::test]
async fn test_studio_rejects_concurrent_submit() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(
        ScriptedBackend::new(&png_background(64, 64))
            .failing_at(FailAt::Synthesize)
            .gated(gate.clone()),
    );
    let studio = Arc::new(Studio::new(generator(backend.clone())));

    let first = {
        let studio = studio.clone();
        tokio::spawn(async move {
            studio
                .submit(&CaptionRequest::new("पहला", AspectRatio::Portrait))
                .await
        })
    };

    // Wait until the first submit is parked inside planning.
    while backend.plan_calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert!(studio.is_busy());
    assert!(studio.status().current().busy);

    let second = studio
        .submit(&CaptionRequest::new("दूसरा", AspectRatio::Portrait))
        .await;
    assert!(matches!(second, Err(AdhyatmikError::Busy)));
    assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 1);

    gate.notify_one();
    let first = first.await.unwrap();
    assert!(matches!(first, Err(AdhyatmikError::Upstream(_))));
    assert!(!studio.is_busy());
    assert!(!studio.status().current().busy);
}

#[tokio::test]
async fn test_studio_clears_latest_on_failed_attempt() {
    let compositor = compositor();
    let backend = Arc::new(ScriptedBackend::new(&png_background(200, 100)));
    let studio = Studio::new(Generator::new(backend.clone(), compositor));
    assert!(studio.latest().await.is_none());

    studio
        .submit(&CaptionRequest::new("हर हर महादेव", AspectRatio::Landscape))
        .await
        .unwrap();
    let latest = studio.latest().await.unwrap();
    assert_eq!((latest.width, latest.height), (200, 100));

    backend.set_failure(Some(FailAt::Analyze));
    let err = studio
        .submit(&CaptionRequest::new("जय माता दी", AspectRatio::Square))
        .await
        .unwrap_err();
    assert!(matches!(err, AdhyatmikError::Upstream(_)));
    assert!(studio.latest().await.is_none());
}
