use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::path::Path;

use ember_common::Image;
use serde::de::DeserializeOwned;

use crate::ContentError;

/// Turns a file into a value of one type and releases it again.
///
/// One processor is registered per output type; the content manager picks it
/// by the type requested in `load::<T>`.
pub trait ContentProcessor: 'static {
    type Output: 'static;

    /// Read and decode the file at `path` (already resolved against the
    /// content root).
    fn load(&self, path: &Path) -> Result<Self::Output, ContentError>;

    /// Release a value produced by [`load`](Self::load). Dropping is enough
    /// unless the value holds something outside Rust's ownership.
    fn unload(&self, content: Self::Output) {
        drop(content);
    }
}

/// Object-safe face of [`ContentProcessor`] used by the manager's registry.
pub(crate) trait ErasedProcessor {
    fn load_any(&self, path: &Path) -> Result<Box<dyn Any>, ContentError>;
    fn unload_any(&self, content: Box<dyn Any>);
    fn output_name(&self) -> &'static str;
}

impl<P: ContentProcessor> ErasedProcessor for P {
    fn load_any(&self, path: &Path) -> Result<Box<dyn Any>, ContentError> {
        Ok(Box::new(self.load(path)?))
    }

    fn unload_any(&self, content: Box<dyn Any>) {
        match content.downcast::<P::Output>() {
            Ok(value) => self.unload(*value),
            Err(_) => tracing::warn!(
                "content handed to the {} processor has a different type",
                self.output_name()
            ),
        }
    }

    fn output_name(&self) -> &'static str {
        type_name::<P::Output>()
    }
}

fn read_error(path: &Path, source: std::io::Error) -> ContentError {
    ContentError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// UTF-8 text files as `String`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextProcessor;

impl ContentProcessor for TextProcessor {
    type Output = String;

    fn load(&self, path: &Path) -> Result<String, ContentError> {
        std::fs::read_to_string(path).map_err(|e| read_error(path, e))
    }
}

/// Any file as raw `Vec<u8>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesProcessor;

impl ContentProcessor for BytesProcessor {
    type Output = Vec<u8>;

    fn load(&self, path: &Path) -> Result<Vec<u8>, ContentError> {
        std::fs::read(path).map_err(|e| read_error(path, e))
    }
}

/// Images decoded to RGBA8. Decoding is delegated to the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageProcessor;

impl ContentProcessor for ImageProcessor {
    type Output = Image;

    fn load(&self, path: &Path) -> Result<Image, ContentError> {
        let decoded = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => read_error(path, source),
            other => ContentError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
        let rgba = decoded.to_rgba8();
        Ok(Image {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }
}

/// JSON documents deserialized into `T`. Not registered by default; add one
/// per data type with [`ContentManager::add_processor`](crate::ContentManager::add_processor).
pub struct JsonProcessor<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonProcessor<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonProcessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned + 'static> ContentProcessor for JsonProcessor<T> {
    type Output = T;

    fn load(&self, path: &Path) -> Result<T, ContentError> {
        let file = std::fs::File::open(path).map_err(|e| read_error(path, e))?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| ContentError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
