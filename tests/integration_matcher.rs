//! Integration tests for the image matcher.
//!
//! These tests exercise the matcher end to end against real files:
//! - Self-match and threshold behavior
//! - Corrupt and non-image files in the corpus
//! - Empty and missing corpora

use assert_fs::prelude::*;
use assert_fs::TempDir;
use canscan_lite::core::matcher::{find_match, ImageMatcher, MatcherConfig};
use canscan_lite::error::MatchError;
use image::{GrayImage, Luma, Rgb, RgbImage};
use predicates::prelude::*;
use std::path::Path;

/// A bright disc on a darker, shaded background
fn lesion(width: u32, height: u32, cx: f64, cy: f64, radius: f64) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let base = 40.0 + 60.0 * (y as f64 / height as f64);
        let value = if (dx * dx + dy * dy).sqrt() < radius {
            210.0
        } else {
            base
        };
        Luma([value as u8])
    })
}

/// Fine diagonal texture with no large structures
fn texture(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| Luma([(((x * 13) ^ (y * 29)) % 256) as u8]))
}

/// The lesion image with deterministic speckle added
fn speckled(source: &GrayImage, amplitude: i32) -> GrayImage {
    GrayImage::from_fn(source.width(), source.height(), |x, y| {
        let noise = ((x * 7919 + y * 104_729) % 17) as i32 - 8;
        let value = source.get_pixel(x, y)[0] as i32 + noise * amplitude / 8;
        Luma([value.clamp(0, 255) as u8])
    })
}

fn save(image: &GrayImage, path: &Path) {
    image.save(path).unwrap();
}

#[test]
fn self_match_scores_maximum() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    let corpus = temp.child("corpus");
    corpus.create_dir_all().unwrap();

    save(&lesion(120, 90, 60.0, 45.0, 20.0), query.path());
    std::fs::copy(query.path(), corpus.child("copy.png").path()).unwrap();

    let report = ImageMatcher::new().scan(query.path(), corpus.path()).unwrap();
    let matched = report.matched.expect("identical copy should match");

    assert!((matched.score - 1.0).abs() < 1e-9);
    assert!(find_match(query.path(), corpus.path(), 1.0).unwrap());
}

#[test]
fn self_match_works_for_jpeg() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.jpg");
    let corpus = temp.child("corpus");
    corpus.create_dir_all().unwrap();

    let rgb = RgbImage::from_fn(80, 80, |x, y| Rgb([(x * 3) as u8, (y * 3) as u8, 128]));
    rgb.save(query.path()).unwrap();
    std::fs::copy(query.path(), corpus.child("copy.jpg").path()).unwrap();

    assert!(ImageMatcher::new()
        .find_match(query.path(), corpus.path())
        .unwrap());
}

#[test]
fn unrelated_image_does_not_match() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    let corpus = temp.child("corpus");
    corpus.create_dir_all().unwrap();

    save(&lesion(120, 90, 60.0, 45.0, 20.0), query.path());
    save(&texture(120, 90), corpus.child("texture.png").path());

    assert!(!ImageMatcher::new()
        .find_match(query.path(), corpus.path())
        .unwrap());
}

#[test]
fn threshold_is_monotonic() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    let corpus = temp.child("corpus");
    corpus.create_dir_all().unwrap();

    let original = lesion(100, 100, 50.0, 50.0, 25.0);
    save(&original, query.path());
    save(&speckled(&original, 24), corpus.child("noisy.png").path());

    let score = MatcherConfig::new()
        .threshold(-1.0)
        .build()
        .unwrap()
        .scan(query.path(), corpus.path())
        .unwrap()
        .matched
        .unwrap()
        .score;

    let thresholds = [1.0, 0.99, 0.95, 0.9, 0.85, 0.7, 0.5, 0.0, -0.5, -1.0];
    let mut seen_match = false;
    for threshold in thresholds {
        let matched = find_match(query.path(), corpus.path(), threshold).unwrap();
        assert_eq!(matched, score >= threshold, "threshold {}", threshold);
        assert!(matched || !seen_match, "match lost when lowering to {}", threshold);
        seen_match |= matched;
    }
    assert!(seen_match);
}

#[test]
fn result_is_the_same_for_every_file_order() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    let original = lesion(100, 100, 40.0, 55.0, 18.0);
    save(&original, query.path());

    // Scores spread around the thresholds below: near-copy high, others low
    let candidates = [
        speckled(&original, 16),
        lesion(100, 100, 70.0, 20.0, 10.0),
        texture(100, 100),
    ];

    let mut scores = Vec::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let single = temp.child(format!("single_{}", i));
        single.create_dir_all().unwrap();
        save(candidate, single.child("candidate.png").path());
        let report = MatcherConfig::new()
            .threshold(-1.0)
            .build()
            .unwrap()
            .scan(query.path(), single.path())
            .unwrap();
        scores.push(report.matched.unwrap().score);
    }

    let best = scores.iter().cloned().fold(f64::MIN, f64::max);
    let worst = scores.iter().cloned().fold(f64::MAX, f64::min);
    let thresholds = [1.0, best, (best + worst) / 2.0, worst, -1.0];

    // Every rotation, written in that order with names that sort that way
    for rotation in 0..candidates.len() {
        let corpus = temp.child(format!("rotation_{}", rotation));
        corpus.create_dir_all().unwrap();
        for step in 0..candidates.len() {
            let index = (rotation + step) % candidates.len();
            save(
                &candidates[index],
                corpus.child(format!("{}_candidate_{}.png", step, index)).path(),
            );
        }

        for threshold in thresholds {
            let expected = scores.iter().any(|&score| score >= threshold);
            assert_eq!(
                find_match(query.path(), corpus.path(), threshold).unwrap(),
                expected,
                "rotation {} threshold {}",
                rotation,
                threshold
            );
        }
    }
}

#[test]
fn out_of_range_threshold_is_rejected_not_a_miss() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    let corpus = temp.child("corpus");
    corpus.create_dir_all().unwrap();
    save(&lesion(64, 64, 32.0, 32.0, 10.0), query.path());
    std::fs::copy(query.path(), corpus.child("copy.png").path()).unwrap();

    for threshold in [1.5, -1.5, f64::NAN] {
        assert!(matches!(
            find_match(query.path(), corpus.path(), threshold),
            Err(MatchError::InvalidThreshold { .. })
        ));
    }
}

#[test]
fn corrupt_files_do_not_change_the_result() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    let original = lesion(90, 90, 45.0, 45.0, 15.0);
    save(&original, query.path());

    let corpus = temp.child("corpus");
    corpus.create_dir_all().unwrap();
    save(&texture(90, 90), corpus.child("texture.png").path());

    let matcher = ImageMatcher::new();
    let before = matcher.find_match(query.path(), corpus.path()).unwrap();

    corpus.child("corrupt.png").write_binary(b"\x89PNG\r\n\x1a\nbroken").unwrap();
    corpus.child("readme.txt").write_str("reference scans").unwrap();
    corpus.child("corrupt.png").assert(predicate::path::is_file());

    let report = matcher.scan(query.path(), corpus.path()).unwrap();
    assert_eq!(report.is_match(), before);
    assert_eq!(report.skipped, 2);

    save(&original, corpus.child("copy.png").path());
    assert!(matcher.find_match(query.path(), corpus.path()).unwrap());
}

#[test]
fn subdirectories_are_not_candidates() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    let original = lesion(90, 90, 45.0, 45.0, 15.0);
    save(&original, query.path());

    let corpus = temp.child("corpus");
    corpus.child("nested").create_dir_all().unwrap();
    save(&original, corpus.child("nested").child("copy.png").path());

    let report = ImageMatcher::new().scan(query.path(), corpus.path()).unwrap();
    assert!(!report.is_match());
    assert_eq!(report.compared + report.skipped, 0);
}

#[test]
fn empty_corpus_never_matches() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    save(&lesion(64, 64, 32.0, 32.0, 10.0), query.path());
    let corpus = temp.child("empty");
    corpus.create_dir_all().unwrap();

    assert!(!find_match(query.path(), corpus.path(), -1.0).unwrap());
}

#[test]
fn undecodable_query_is_an_error_not_a_miss() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    query.write_str("not an image").unwrap();
    let corpus = temp.child("corpus");
    corpus.create_dir_all().unwrap();

    let result = ImageMatcher::new().find_match(query.path(), corpus.path());
    assert!(matches!(result, Err(MatchError::QueryDecode { .. })));
}

#[test]
fn unlistable_corpus_is_an_error() {
    let temp = TempDir::new().unwrap();
    let query = temp.child("query.png");
    save(&lesion(64, 64, 32.0, 32.0, 10.0), query.path());

    let result = ImageMatcher::new().find_match(query.path(), query.path());
    assert!(matches!(result, Err(MatchError::NotADirectory { .. })));

    let result = ImageMatcher::new().find_match(query.path(), &temp.path().join("missing"));
    assert!(matches!(result, Err(MatchError::CorpusEnumeration { .. })));
}
