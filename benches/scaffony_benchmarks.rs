//! # Scaffony Performance Benchmarks
//!
//! Benchmarks for the hot paths of the library engine.
//!
//! ## Benchmark Categories
//!
//! - **Filter Evaluation**: Playlist matching over libraries of growing size
//! - **Tag Maintenance**: Cascading renames across every entry
//! - **Scanning**: Directory walk, cover detection and deduplication
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench filters
//! cargo bench scanning
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;

use scaffony::config::LibraryPathCache;
use scaffony::playlists::FilterContext;
use scaffony::store::DATA_FILE_NAME;
use scaffony::{CatalogDocument, CatalogStore, Filter, LibraryEntry, TagEntry};

const RATINGS: [&str; 3] = ["rate:5", "rate:4", "rate:3"];
const MOODS: [&str; 4] = ["mood:happy", "mood:sad", "mood:chill", "mood:angry"];

/// Helper function to build a tagged library of the given size
fn create_benchmark_document(count: usize) -> CatalogDocument {
    let mut document = CatalogDocument::default();
    document.library = (0..count)
        .map(|i| {
            let mut entry = LibraryEntry::new(
                format!("Track {i}"),
                format!("/music/Artist {}/Album {}/Track {i}.flac", i % 50, i % 200),
                None,
            );
            if i % 3 != 0 {
                entry.tags.insert(RATINGS[i % RATINGS.len()].to_string(), true);
            }
            entry.tags.insert(MOODS[i % MOODS.len()].to_string(), i % 5 != 0);
            entry
        })
        .collect();
    document
}

/// Helper function to lay out an album tree on disk
fn create_benchmark_tree(artists: usize, albums: usize, tracks: usize) -> TempDir {
    let root = TempDir::new().expect("Failed to create temp directory");
    for artist in 0..artists {
        for album in 0..albums {
            let dir = root.path().join(format!("Artist {artist}/Album {album}"));
            fs::create_dir_all(&dir).expect("Failed to create album directory");
            fs::write(dir.join("cover.jpg"), b"").expect("Failed to write cover");
            for track in 0..tracks {
                fs::write(dir.join(format!("{track:02} Song.mp3")), b"").expect("Failed to write track");
                if track % 2 == 0 {
                    fs::write(dir.join(format!("{track:02} Song.flac")), b"")
                        .expect("Failed to write track");
                }
            }
        }
    }
    root
}

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    let playlists = [
        ("not_rated", vec![Filter::excludes_category("rate")]),
        (
            "two_tags",
            vec![Filter::includes_tag("rate:5"), Filter::excludes_tag("mood:sad")],
        ),
    ];

    for size in [100, 1_000, 10_000].iter() {
        let document = create_benchmark_document(*size);

        for (label, filters) in &playlists {
            group.bench_with_input(BenchmarkId::new(*label, size), &document, |b, document| {
                b.iter(|| document.matching_entries(black_box(filters)).len())
            });
        }
    }

    let document = create_benchmark_document(1_000);
    let context = FilterContext::new(&document.tags);
    let entry = &document.library[1];
    group.bench_function("single_entry", |b| {
        b.iter(|| context.matches(black_box(entry), black_box(&playlists[1].1)))
    });

    group.finish();
}

fn benchmark_tag_maintenance(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_maintenance");
    let document = create_benchmark_document(5_000);

    group.bench_function("rename_tag_5000_entries", |b| {
        b.iter_batched(
            || document.clone(),
            |mut document| {
                document
                    .edit_tag("mood:sad", TagEntry::new("mood:blue", "#4b87f7", "frown"))
                    .expect("tag exists");
                document
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function("delete_tag_5000_entries", |b| {
        b.iter_batched(
            || document.clone(),
            |mut document| {
                document.delete_tag("rate:5");
                document
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn benchmark_scanning(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanning");
    group.sample_size(20);

    let root = create_benchmark_tree(10, 5, 12);
    let app_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = app_dir.path().join("scaffony_current_library.txt");
    let cache = LibraryPathCache::with_cache_file(cache_file.clone());
    assert!(cache.set_library_path(root.path()));

    let fresh_store = |data_file: &Path| {
        let _ = fs::remove_file(data_file);
        let mut store = CatalogStore::new(LibraryPathCache::with_cache_file(cache_file.clone()));
        store.read_data().expect("Failed to load catalog");
        store
    };
    let data_file = root.path().join(DATA_FILE_NAME);

    group.bench_function("initial_scan_600_files", |b| {
        b.iter_batched(
            || fresh_store(&data_file),
            |mut store| store.scan().expect("Scan failed"),
            BatchSize::PerIteration,
        )
    });

    let mut indexed = fresh_store(&data_file);
    indexed.scan().expect("Scan failed");
    group.bench_function("rescan_unchanged", |b| {
        b.iter(|| indexed.scan().expect("Scan failed"))
    });

    group.finish();
}

// Group all benchmarks
criterion_group!(
    benches,
    benchmark_filters,
    benchmark_tag_maintenance,
    benchmark_scanning
);

criterion_main!(benches);
