use crate::dom::{Document, Element};

pub const LAZYSIZES_SRC: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/lazysizes/5.3.2/lazysizes.min.js";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LazyLoad {
    /// `data-src` was copied to `src` on this many images.
    Native { promoted: usize },
    /// The browser lacks native lazy loading; the polyfill was injected.
    Fallback,
}

pub fn load_lazy_images<D: Document>(
    document: &D,
    native_support: bool,
    images: &[D::Element],
) -> LazyLoad {
    if !native_support {
        document.append_script(LAZYSIZES_SRC);
        return LazyLoad::Fallback;
    }

    let mut promoted = 0;
    for image in images {
        if let Some(src) = image.attribute("data-src").filter(|src| !src.is_empty()) {
            image.set_attribute("src", &src);
            promoted += 1;
        }
    }
    LazyLoad::Native { promoted }
}
