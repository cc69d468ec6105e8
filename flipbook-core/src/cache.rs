//! Page image preloading and lookup.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use tokio::task::{JoinHandle, JoinSet};

use crate::error::{FlipbookError, Result};

/// A decoded page. Cheap to clone.
#[derive(Clone)]
pub struct PageImage {
    pixels: Arc<RgbaImage>,
}

impl fmt::Debug for PageImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PageImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// A white page of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255])))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Source of page images, addressed by 1-based page number.
pub trait ImageFetcher: Send + Sync + 'static {
    fn fetch(&self, page: u32) -> impl Future<Output = Result<PageImage>> + Send;
}

/// Reads `page_<n>.jpg` (or `.jpeg` / `.png`) files from a directory, the
/// layout produced by the rasterizer.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    const EXTENSIONS: [&'static str; 3] = ["jpg", "jpeg", "png"];

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the file backing `page`, if one exists.
    pub fn page_path(&self, page: u32) -> Option<PathBuf> {
        Self::EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("page_{page}.{ext}")))
            .find(|path| path.is_file())
    }

    /// Count consecutive pages starting at 1.
    pub fn count_pages(&self) -> u32 {
        let mut count = 0;
        while self.page_path(count + 1).is_some() {
            count += 1;
        }
        count
    }
}

impl ImageFetcher for DirectoryFetcher {
    async fn fetch(&self, page: u32) -> Result<PageImage> {
        let path = self.page_path(page).ok_or(FlipbookError::MissingPage(page))?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| FlipbookError::Io { path, source })?;

        join_decode(
            page,
            tokio::task::spawn_blocking(move || {
                image::load_from_memory(&bytes)
                    .map(|decoded| PageImage::new(decoded.to_rgba8()))
                    .map_err(|source| FlipbookError::Decode { page, source })
            }),
        )
        .await
    }
}

async fn join_decode(page: u32, task: JoinHandle<Result<PageImage>>) -> Result<PageImage> {
    task.await
        .map_err(|source| FlipbookError::DecodeTask { page, source })?
}

/// Every page of the document, indexed by page number. Pages that failed to
/// load are held as `None`.
#[derive(Debug, Clone, Default)]
pub struct PageCache {
    pages: Vec<Option<PageImage>>,
}

impl PageCache {
    /// Fetch all `total` pages concurrently and wait for every one of them.
    ///
    /// A failed fetch leaves that page empty; the batch itself never fails.
    pub async fn preload_all<F: ImageFetcher>(fetcher: Arc<F>, total: u32) -> Self {
        let mut pages = vec![None; total as usize];
        let mut tasks = JoinSet::new();

        for page in 1..=total {
            let fetcher = Arc::clone(&fetcher);
            tasks.spawn(async move { (page, fetcher.fetch(page).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((page, Ok(image))) => pages[(page - 1) as usize] = Some(image),
                Ok((page, Err(err))) => {
                    tracing::warn!("Page {} failed to load: {}", page, err);
                }
                Err(err) => {
                    tracing::warn!("Page load task aborted: {}", err);
                }
            }
        }

        let loaded = pages.iter().filter(|page| page.is_some()).count();
        tracing::info!("Preloaded {}/{} pages", loaded, total);

        Self { pages }
    }

    pub fn from_pages(pages: Vec<Option<PageImage>>) -> Self {
        Self { pages }
    }

    pub fn len(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Image for a 1-based page number.
    pub fn get(&self, page: u32) -> Option<&PageImage> {
        let index = page.checked_sub(1)? as usize;
        self.pages.get(index).and_then(Option::as_ref)
    }

    pub fn is_available(&self, page: u32) -> bool {
        self.get(page).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_one_based() {
        let cache = PageCache::from_pages(vec![Some(PageImage::blank(2, 3)), None]);
        assert_eq!(cache.get(1).map(PageImage::width), Some(2));
        assert!(cache.get(0).is_none());
        assert!(!cache.is_available(2));
        assert!(cache.get(3).is_none());
    }

    #[test]
    fn debug_output_skips_pixels() {
        let page = PageImage::blank(640, 480);
        assert_eq!(format!("{page:?}"), "PageImage { width: 640, height: 480 }");
    }

    #[tokio::test]
    async fn panicked_decode_is_reported_as_such() {
        let task = tokio::task::spawn_blocking(|| -> Result<PageImage> { panic!("decoder blew up") });
        let err = join_decode(4, task).await.unwrap_err();
        assert!(matches!(err, FlipbookError::DecodeTask { page: 4, .. }));
        assert!(err.to_string().starts_with("decode task for page 4 failed"));
    }

    #[tokio::test]
    async fn directory_fetcher_reads_and_counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        for page in 1..=3 {
            RgbaImage::new(4, 5)
                .save(dir.path().join(format!("page_{page}.png")))
                .unwrap();
        }
        std::fs::write(dir.path().join("page_5.jpg"), b"gap").unwrap();

        let fetcher = DirectoryFetcher::new(dir.path());
        assert_eq!(fetcher.count_pages(), 3);

        let page = fetcher.fetch(2).await.unwrap();
        assert_eq!((page.width(), page.height()), (4, 5));
        assert!(matches!(
            fetcher.fetch(4).await,
            Err(FlipbookError::MissingPage(4))
        ));
        assert!(matches!(
            fetcher.fetch(5).await,
            Err(FlipbookError::Decode { page: 5, .. })
        ));
    }
}
