use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use placeholder_engine::{
    ArchiveEntry, ArchiveSettings, Archiver, Compression, EntrySource, Readiness, ZipArchiver,
};
use pretty_assertions::assert_eq;
use zip::{CompressionMethod, ZipArchive};

fn entry(path: &str, bytes: Vec<u8>, source: EntrySource) -> ArchiveEntry {
    ArchiveEntry {
        path: path.to_string(),
        bytes: Arc::from(bytes),
        source,
    }
}

fn members(archive: Vec<u8>) -> Vec<(String, Vec<u8>, CompressionMethod)> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..zip.len())
        .map(|index| {
            let mut file = zip.by_index(index).unwrap();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).unwrap();
            (file.name().to_string(), bytes, file.compression())
        })
        .collect()
}

async fn pack(
    archiver: &ZipArchiver,
    entries: &[ArchiveEntry],
) -> (Vec<u8>, Vec<u8>) {
    let seen = Mutex::new(Vec::new());
    let report = |percent: u8| seen.lock().unwrap().push(percent);
    let archive = archiver.create_archive(entries, &report).await.unwrap();
    let percents = seen.into_inner().unwrap();
    (archive, percents)
}

#[tokio::test]
async fn entries_keep_paths_and_order() {
    let archiver = ZipArchiver::probe(ArchiveSettings::default());
    assert_eq!(archiver.readiness(), Readiness::Ready);

    let entries = vec![
        entry("photos/b.png", b"generated".to_vec(), EntrySource::Placeholder),
        entry("photos/nested/deeper/a.jpg", vec![0xff, 0xd8, 0x00, 0xff], EntrySource::Original),
        entry("photos/c.webp", Vec::new(), EntrySource::Original),
    ];
    let (archive, _) = pack(&archiver, &entries).await;

    let found = members(archive);
    let names: Vec<_> = found.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["photos/b.png", "photos/nested/deeper/a.jpg", "photos/c.webp"]
    );
    assert_eq!(found[0].1, b"generated".to_vec());
    assert_eq!(found[1].1, vec![0xff, 0xd8, 0x00, 0xff]);
    assert!(found[2].1.is_empty());
    assert_eq!(found[0].2, CompressionMethod::Deflated);
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_100() {
    let archiver = ZipArchiver::probe(ArchiveSettings::default());
    let entries: Vec<_> = (0..10)
        .map(|i| entry(&format!("f{i}.bin"), vec![i as u8; 1000 * (i + 1)], EntrySource::Original))
        .collect();

    let (_, percents) = pack(&archiver, &entries).await;

    assert!(!percents.is_empty());
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(percents.last(), Some(&100));
    assert_eq!(percents.iter().filter(|p| **p == 100).count(), 1);
    assert!(percents.iter().all(|p| *p <= 100));
}

#[tokio::test(flavor = "current_thread")]
async fn compression_runs_off_the_async_worker() {
    let archiver = ZipArchiver::probe(ArchiveSettings::default());
    let payload: Vec<u8> = (0..4_000_000u32).map(|i| (i.wrapping_mul(31) % 251) as u8).collect();
    let entries = vec![entry("big.bin", payload.clone(), EntrySource::Original)];

    let other_task_ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&other_task_ran);
    tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

    let (archive, percents) = pack(&archiver, &entries).await;

    // The single runtime thread was free while deflate ran elsewhere.
    assert!(other_task_ran.load(Ordering::SeqCst));
    assert_eq!(percents.last(), Some(&100));
    assert_eq!(members(archive)[0].1, payload);
}

#[tokio::test]
async fn empty_archive_reports_completion() {
    let archiver = ZipArchiver::probe(ArchiveSettings::default());
    let (archive, percents) = pack(&archiver, &[]).await;

    assert_eq!(percents, vec![100]);
    assert!(members(archive).is_empty());
}

#[tokio::test]
async fn stored_compression_is_honoured() {
    let archiver = ZipArchiver::probe(ArchiveSettings {
        compression: Compression::Stored,
    });
    let entries = vec![entry("a.png", vec![1, 2, 3], EntrySource::Placeholder)];
    let (archive, _) = pack(&archiver, &entries).await;

    let found = members(archive);
    assert_eq!(found[0].2, CompressionMethod::Stored);
    assert_eq!(found[0].1, vec![1, 2, 3]);
}

#[tokio::test]
async fn duplicate_paths_collapse_to_last_payload() {
    let archiver = ZipArchiver::probe(ArchiveSettings::default());
    let entries = vec![
        entry("dir/a.png", b"first".to_vec(), EntrySource::Placeholder),
        entry("dir/b.png", b"other".to_vec(), EntrySource::Placeholder),
        entry("dir/a.png", b"second".to_vec(), EntrySource::Original),
    ];
    let (archive, _) = pack(&archiver, &entries).await;

    let found = members(archive);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].0, "dir/a.png");
    assert_eq!(found[0].1, b"second".to_vec());
    assert_eq!(found[1].0, "dir/b.png");
}
