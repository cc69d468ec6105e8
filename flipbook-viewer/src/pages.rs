use flipbook_core::PageCache;
use iced::widget::image::Handle;
use std::collections::HashMap;

/// GPU-ready handles for every preloaded page.
///
/// Built once after preloading; iced keys its texture cache on the handle
/// id, so reusing the same handles keeps pages uploaded between frames.
#[derive(Debug, Default)]
pub struct PageHandles {
    handles: HashMap<u32, Handle>,
}

impl PageHandles {
    pub fn from_cache(cache: &PageCache) -> Self {
        let handles = (1..=cache.len())
            .filter_map(|page| {
                let image = cache.get(page)?;
                Some((page, to_handle(image.pixels())))
            })
            .collect::<HashMap<_, _>>();

        tracing::debug!("Prepared {} page handles", handles.len());
        Self { handles }
    }

    pub fn get(&self, page: u32) -> Option<&Handle> {
        self.handles.get(&page)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}

fn to_handle(pixels: &image::RgbaImage) -> Handle {
    Handle::from_rgba(pixels.width(), pixels.height(), pixels.as_raw().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipbook_core::PageImage;

    #[test]
    fn missing_pages_have_no_handle() {
        let cache = PageCache::from_pages(vec![Some(PageImage::blank(2, 2)), None, Some(PageImage::blank(3, 1))]);
        let handles = PageHandles::from_cache(&cache);
        assert_eq!(handles.len(), 2);
        assert!(handles.get(1).is_some());
        assert!(handles.get(2).is_none());
        assert!(handles.get(3).is_some());
    }
}
