//! End-to-end runs of the capture orchestrator against stub collaborators

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::json;
use textsnap_translator::TranslateError;
use textsnap_types::CaptureId;

use super::{captured_image, fixture, fixture_with, region, write_page};
use crate::capture::{CaptureError, CaptureSource, run_preprocess};

fn files_in(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_file_capture_delivers_text_and_cleans_up() {
    let fx = fixture("HELLO");
    let image = write_page(fx.dir.path(), "page.png");
    let original = fs::read(&image).unwrap();

    let result = fx
        .orchestrator
        .run(CaptureSource::File(image.clone()))
        .await
        .unwrap();

    assert_eq!(result.extracted_text, "HELLO");
    assert_eq!(result.translation, None);

    assert_eq!(*fx.sink.clipboard.lock().unwrap(), vec!["HELLO".to_string()]);
    assert_eq!(
        *fx.sink.sounds.lock().unwrap(),
        vec![PathBuf::from("assets/sound/sound.wav")]
    );
    let displayed = fx.sink.displayed.lock().unwrap();
    assert_eq!(displayed.len(), 1);
    assert_eq!(displayed[0].1, result);

    let seen = fx.recognizer.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (working, existed) = &seen[0];
    assert!(*existed, "engine should see the working copy");
    assert_ne!(working, &image);
    assert!(!working.exists(), "working copy should be deleted");

    assert_eq!(fs::read(&image).unwrap(), original);
    assert!(!fx.state.is_capturing());
}

#[tokio::test]
async fn test_screen_capture_saves_raw_and_enhanced_images() {
    let fx = fixture("HELLO");
    let out = fx.dir.path().join("out");
    fx.state.store.update(json!({
        "output": {
            "save_captured_image": true,
            "save_enhanced_image": true,
            "output_folder_path": out.to_string_lossy(),
        }
    }));

    fx.orchestrator
        .run(CaptureSource::Screen {
            image: captured_image(8, 6),
            region: region(8, 6),
        })
        .await
        .unwrap();

    let names = files_in(&out);
    assert_eq!(names.len(), 2, "{names:?}");
    assert!(names.iter().any(|name| name.ends_with("_enhanced.png")));
    assert!(
        names
            .iter()
            .any(|name| name.ends_with(".png") && !name.contains("enhanced"))
    );

    let (working, _) = fx.recognizer.seen.lock().unwrap()[0].clone();
    assert!(!working.exists());
}

#[tokio::test]
async fn test_enhanced_image_holds_preprocessed_pixels() {
    let fx = fixture("HELLO");
    let out = fx.dir.path().join("out");
    fx.state.store.update(json!({
        "preprocess": {
            "enable_preprocess": true,
            "enable_thresholding": true,
            "thresholding": "global",
            "threshold_global": 128,
        },
        "output": {
            "save_enhanced_image": true,
            "output_folder_path": out.to_string_lossy(),
        }
    }));
    let image = write_page(fx.dir.path(), "page.png");

    fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    let names = files_in(&out);
    assert_eq!(names.len(), 1);
    let saved = image::open(out.join(&names[0])).unwrap().to_luma8();
    assert!(saved.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
}

#[tokio::test]
async fn test_second_trigger_is_rejected_while_busy() {
    let fx = fixture("HELLO");
    let image = write_page(fx.dir.path(), "page.png");

    let _guard = fx.state.begin_capture().unwrap();
    let err = fx
        .orchestrator
        .run(CaptureSource::File(image))
        .await
        .unwrap_err();

    assert!(matches!(err, CaptureError::Busy));
    assert!(fx.recognizer.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_text_skips_side_effects() {
    let fx = fixture("  \n\n");
    fx.state
        .store
        .update(json!({ "translate": { "enable_translation": true } }));
    let image = write_page(fx.dir.path(), "page.png");

    let result = fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    assert_eq!(result.translation, None);
    assert!(fx.sink.clipboard.lock().unwrap().is_empty());
    assert!(fx.sink.sounds.lock().unwrap().is_empty());
    assert_eq!(fx.translator.calls(), 0);
    assert_eq!(fx.sink.displayed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_disabled_outputs_are_not_touched() {
    let fx = fixture("HELLO");
    fx.state.store.update(json!({
        "output": { "copy_to_clipboard": false, "show_popup_window": false },
        "preferences": { "enable_sound": false }
    }));
    let image = write_page(fx.dir.path(), "page.png");

    let result = fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    assert_eq!(result.extracted_text, "HELLO");
    assert!(fx.sink.clipboard.lock().unwrap().is_empty());
    assert!(fx.sink.sounds.lock().unwrap().is_empty());
    assert!(fx.sink.displayed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_lines_removed_when_configured() {
    let fx = fixture("first\n\n   \nsecond");
    fx.state
        .store
        .update(json!({ "output": { "remove_empty_lines": true } }));
    let image = write_page(fx.dir.path(), "page.png");

    let result = fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    assert_eq!(result.extracted_text, "first\nsecond");
}

#[tokio::test]
async fn test_structured_mode_follows_interword_spacing() {
    let fx = fixture("HELLO");
    fx.state
        .store
        .update(json!({ "ocr": { "preserve_interword_spaces": true } }));
    let image = write_page(fx.dir.path(), "page.png");

    fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    assert_eq!(*fx.recognizer.structured.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn test_default_destinations_translate_italian() {
    let fx = fixture("CIAO");
    fx.state.store.update(json!({
        "ocr": { "language": "ita" },
        "translate": { "enable_translation": true }
    }));
    let image = write_page(fx.dir.path(), "page.png");

    let result = fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    let translation = result.translation.unwrap();
    assert_eq!(translation.text, "CIAO (it->en)");
    assert_eq!(translation.source_name, "italian");
}

#[tokio::test]
async fn test_translation_attached_to_result() {
    let fx = fixture("HOLA");
    fx.state.store.update(json!({
        "ocr": { "language": "spa" },
        "translate": { "enable_translation": true }
    }));
    let image = write_page(fx.dir.path(), "page.png");

    let result = fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    let translation = result.translation.unwrap();
    assert_eq!(translation.text, "HOLA (es->en)");
    assert_eq!(translation.source_name, "spanish");
    assert_eq!(translation.destination_name, "english");
    assert_eq!(translation.destination_code, "en");
    assert!(translation.available);
}

#[tokio::test]
async fn test_service_failure_becomes_placeholder() {
    let fx = fixture_with("HOLA", true, None);
    fx.state.store.update(json!({
        "ocr": { "language": "spa" },
        "translate": { "enable_translation": true }
    }));
    let image = write_page(fx.dir.path(), "page.png");

    let result = fx.orchestrator.run(CaptureSource::File(image)).await.unwrap();

    let translation = result.translation.unwrap();
    assert!(!translation.available);
    assert!(translation.text.starts_with("Translation unavailable: "));
    assert_eq!(result.extracted_text, "HOLA");
}

#[tokio::test]
async fn test_unmapped_language_surfaces_and_cleans_up() {
    let fx = fixture("ᏣᎳᎩ");
    fx.state.store.update(json!({
        "ocr": { "language": "chr" },
        "translate": { "enable_translation": true }
    }));
    let image = write_page(fx.dir.path(), "page.png");

    let err = fx
        .orchestrator
        .run(CaptureSource::File(image))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CaptureError::LanguageMapping(TranslateError::UnsupportedSourceLanguage(_))
    ));
    assert!(err.to_string().contains("Cherokee"));
    assert_eq!(fx.translator.calls(), 0);

    let (working, _) = fx.recognizer.seen.lock().unwrap()[0].clone();
    assert!(!working.exists());
    assert!(!fx.state.is_capturing());
}

#[tokio::test]
async fn test_missing_destination_surfaces() {
    let fx = fixture("CIAO");
    fx.state.store.update(json!({
        "ocr": { "language": "ita" },
        "translate": {
            "enable_translation": true,
            "destinations": { "spanish": "en" }
        }
    }));
    let image = write_page(fx.dir.path(), "page.png");

    let err = fx
        .orchestrator
        .run(CaptureSource::File(image))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CaptureError::LanguageMapping(TranslateError::MissingDestination(_))
    ));
}

#[tokio::test]
async fn test_unwritable_output_folder_surfaces() {
    let fx = fixture("HELLO");
    let blocker = fx.dir.path().join("not_a_dir");
    fs::write(&blocker, b"file").unwrap();
    fx.state.store.update(json!({
        "output": {
            "save_captured_image": true,
            "output_folder_path": blocker.join("out").to_string_lossy(),
        }
    }));

    let err = fx
        .orchestrator
        .run(CaptureSource::Screen {
            image: captured_image(4, 4),
            region: region(4, 4),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CaptureError::OutputFolder { .. }));
    assert!(fx.recognizer.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_mismatched_capture_buffer_is_rejected() {
    let fx = fixture("HELLO");
    let mut image = captured_image(4, 4);
    image.rgba.truncate(10);

    let err = fx
        .orchestrator
        .run(CaptureSource::Screen {
            image,
            region: region(4, 4),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CaptureError::InvalidCapture {
            width: 4,
            height: 4
        }
    ));
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let fx = fixture("HELLO");
    let missing = fx.dir.path().join("missing.png");

    let err = fx
        .orchestrator
        .run(CaptureSource::File(missing))
        .await
        .unwrap_err();

    assert!(matches!(err, CaptureError::ReadSource { .. }));
    assert!(err.to_string().contains("missing.png"));
}

#[tokio::test]
async fn test_preprocess_panic_is_not_fatal() {
    run_preprocess(CaptureId::new(), || panic!("decoder fell over")).await;

    let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = ran.clone();
    run_preprocess(CaptureId::new(), move || {
        flag.store(true, std::sync::atomic::Ordering::SeqCst)
    })
    .await;
    assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test]
async fn test_announcement_waits_for_the_guard() {
    let fx = fixture("HELLO");
    let image = write_page(fx.dir.path(), "page.png");
    let announced = std::sync::atomic::AtomicBool::new(false);

    let guard = fx.state.begin_capture().unwrap();
    let err = fx
        .orchestrator
        .run_announced(CaptureSource::File(image.clone()), async {
            announced.store(true, std::sync::atomic::Ordering::SeqCst)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Busy));
    assert!(!announced.load(std::sync::atomic::Ordering::SeqCst));

    drop(guard);
    fx.orchestrator
        .run_announced(CaptureSource::File(image), async {
            announced.store(true, std::sync::atomic::Ordering::SeqCst)
        })
        .await
        .unwrap();
    assert!(announced.load(std::sync::atomic::Ordering::SeqCst));
}
