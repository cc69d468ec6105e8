use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flipbook_core::layout::detect_format;
use flipbook_core::render::{DrawOp, FoldRenderer};
use flipbook_core::{Document, FlipbookError, ImageFetcher, PageCache, PageFormat, PageImage, Result, TurnView};

/// Serves blank pages after a page-dependent delay and fails one of them.
struct FlakyFetcher {
    failing_page: u32,
    calls: AtomicU32,
}

impl ImageFetcher for FlakyFetcher {
    async fn fetch(&self, page: u32) -> Result<PageImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(u64::from(6 - page) * 5)).await;
        if page == self.failing_page {
            return Err(FlipbookError::MissingPage(page));
        }
        Ok(PageImage::blank(40, 50))
    }
}

#[tokio::test]
async fn preload_waits_for_every_page() {
    let fetcher = Arc::new(FlakyFetcher {
        failing_page: 3,
        calls: AtomicU32::new(0),
    });

    let cache = PageCache::preload_all(Arc::clone(&fetcher), 5).await;

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 5);
    assert_eq!(cache.len(), 5);
    let available: Vec<bool> = (1..=5).map(|page| cache.is_available(page)).collect();
    assert_eq!(available, vec![true, true, false, true, true]);
}

#[tokio::test]
async fn failed_first_page_falls_back_to_placeholder_format() {
    let fetcher = Arc::new(FlakyFetcher {
        failing_page: 1,
        calls: AtomicU32::new(0),
    });
    let cache = PageCache::preload_all(fetcher, 2).await;
    assert_eq!(detect_format(cache.get(1)), PageFormat::PLACEHOLDER);
}

#[test]
fn missing_pages_render_blank() {
    let cache = PageCache::from_pages(vec![None, Some(PageImage::blank(40, 50))]);
    let layout = flipbook_core::LayoutState {
        is_landscape: false,
        page_width: 40.0,
        page_height: 50.0,
    };
    let spread = flipbook_core::spread::spread_of(1, false, 2);
    let ops = FoldRenderer::new(layout, 2, &cache).frame(TurnView::Settled, spread);

    assert!(ops.iter().any(|op| matches!(op, DrawOp::FillRect { .. })));
    assert!(ops.iter().any(|op| matches!(op, DrawOp::Blit { page: 2, .. })));
}

#[tokio::test]
async fn document_directory_preloads_through_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    for page in 1..=2 {
        PageImage::blank(30, 20)
            .pixels()
            .save(dir.path().join(format!("page_{page}.png")))
            .unwrap();
    }
    std::fs::write(
        dir.path().join("flipbook.json"),
        r#"{ "id": "spring", "pages_count": 3, "mode": "magazine", "hotspots": [] }"#,
    )
    .unwrap();

    let document = Document::open(dir.path()).unwrap();
    assert_eq!(document.total_pages, 3);
    assert_eq!(document.manifest.mode.as_deref(), Some("magazine"));

    let cache = document.preload().await;
    assert!(cache.is_available(1));
    assert!(cache.is_available(2));
    assert!(!cache.is_available(3));
}
