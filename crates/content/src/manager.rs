use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::ContentError;
use crate::processor::{
    BytesProcessor, ContentProcessor, ErasedProcessor, ImageProcessor, TextProcessor,
};

/// Typed reference to a value owned by a [`ContentManager`].
///
/// Handles are plain ids: copying one does not keep the content alive, and a
/// handle to unloaded content simply resolves to `None`.
pub struct Handle<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", type_name::<T>(), self.id)
    }
}

struct Entry {
    type_id: TypeId,
    path: PathBuf,
    value: Box<dyn Any>,
}

/// Loads files through type-keyed processors and tracks everything it loaded.
///
/// Paths given to [`load`](Self::load) are resolved against the content root.
/// Tracked content is iterated in load order (ids only increase).
pub struct ContentManager {
    root: PathBuf,
    processors: HashMap<TypeId, Box<dyn ErasedProcessor>>,
    content: BTreeMap<u64, Entry>,
    next_id: u64,
}

impl ContentManager {
    /// Create a manager rooted at `root` with the built-in text, bytes and
    /// image processors registered.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut manager = Self::empty(root);
        manager.register(TextProcessor);
        manager.register(BytesProcessor);
        manager.register(ImageProcessor);
        manager
    }

    /// Create a manager with no processors at all.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            processors: HashMap::new(),
            content: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a processor for `P::Output`. Each output type can have only
    /// one processor.
    pub fn add_processor<P: ContentProcessor>(&mut self, processor: P) -> Result<(), ContentError> {
        if self.processors.contains_key(&TypeId::of::<P::Output>()) {
            return Err(ContentError::DuplicateProcessor {
                type_name: type_name::<P::Output>(),
            });
        }
        self.register(processor);
        Ok(())
    }

    pub fn has_processor<T: 'static>(&self) -> bool {
        self.processors.contains_key(&TypeId::of::<T>())
    }

    fn register<P: ContentProcessor>(&mut self, processor: P) {
        self.processors
            .insert(TypeId::of::<P::Output>(), Box::new(processor));
    }

    fn processor_for(
        &self,
        type_id: TypeId,
        name: &'static str,
    ) -> Result<&dyn ErasedProcessor, ContentError> {
        match self.processors.get(&type_id) {
            Some(p) => Ok(p.as_ref()),
            None => {
                tracing::error!("unable to locate a content processor for type [{name}]");
                Err(ContentError::MissingProcessor { type_name: name })
            }
        }
    }

    /// Load `path` (relative to the root) as a `T` and start tracking it.
    pub fn load<T: 'static>(&mut self, path: impl AsRef<Path>) -> Result<Handle<T>, ContentError> {
        let type_id = TypeId::of::<T>();
        let full = self.root.join(path.as_ref());
        let value = self
            .processor_for(type_id, type_name::<T>())?
            .load_any(&full)?;

        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!("loaded {} as {}", full.display(), type_name::<T>());
        self.content.insert(
            id,
            Entry {
                type_id,
                path: full,
                value,
            },
        );
        Ok(Handle {
            id,
            _marker: PhantomData,
        })
    }

    /// Borrow tracked content.
    pub fn get<T: 'static>(&self, handle: Handle<T>) -> Option<&T> {
        self.content
            .get(&handle.id)
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    /// Resolved path the content was loaded from.
    pub fn path_of<T: 'static>(&self, handle: Handle<T>) -> Option<&Path> {
        self.content
            .get(&handle.id)
            .filter(|entry| entry.type_id == TypeId::of::<T>())
            .map(|entry| entry.path.as_path())
    }

    pub fn contains<T: 'static>(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Unload tracked content through its processor.
    ///
    /// Returns `false` and logs a warning when the handle does not refer to
    /// tracked content; that case is not an error.
    pub fn unload<T: 'static>(&mut self, handle: Handle<T>) -> bool {
        let type_id = TypeId::of::<T>();
        let tracked = self
            .content
            .get(&handle.id)
            .is_some_and(|entry| entry.type_id == type_id);
        if !tracked {
            tracing::warn!(
                "unable to unload content for the specified type {}",
                type_name::<T>()
            );
            return false;
        }

        if let Some(entry) = self.content.remove(&handle.id) {
            self.release(entry);
        }
        true
    }

    fn release(&self, entry: Entry) {
        match self.processors.get(&entry.type_id) {
            Some(processor) => processor.unload_any(entry.value),
            None => drop(entry.value),
        }
    }

    /// Unload everything still tracked, in load order.
    pub fn dispose(&mut self) {
        let content = std::mem::take(&mut self.content);
        let count = content.len();
        for (_, entry) in content {
            self.release(entry);
        }
        tracing::debug!("content manager disposed ({count} item(s) unloaded)");
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Debug for ContentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentManager")
            .field("root", &self.root)
            .field("processors", &self.processors.len())
            .field("loaded", &self.content.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonProcessor;
    use ember_common::Image;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Loads the file name as a marker and records every unload.
    struct Tracking {
        unloaded: Rc<RefCell<Vec<String>>>,
    }

    #[derive(Debug, PartialEq)]
    struct Marker(String);

    impl ContentProcessor for Tracking {
        type Output = Marker;

        fn load(&self, path: &Path) -> Result<Marker, ContentError> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            Ok(Marker(name))
        }

        fn unload(&self, content: Marker) {
            self.unloaded.borrow_mut().push(content.0);
        }
    }

    fn tracking_manager(root: &Path) -> (ContentManager, Rc<RefCell<Vec<String>>>) {
        let unloaded = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ContentManager::new(root);
        manager
            .add_processor(Tracking {
                unloaded: Rc::clone(&unloaded),
            })
            .unwrap();
        (manager, unloaded)
    }

    #[test]
    fn load_text_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("intro.txt"), "once upon a time").unwrap();

        let mut content = ContentManager::new(dir.path());
        let handle = content.load::<String>("intro.txt").unwrap();
        assert_eq!(content.get(handle).map(String::as_str), Some("once upon a time"));
        assert_eq!(content.path_of(handle), Some(dir.path().join("intro.txt").as_path()));
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn load_bytes_and_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.bin"), [1u8, 2, 3]).unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]))
            .save(dir.path().join("icon.png"))
            .unwrap();

        let mut content = ContentManager::new(dir.path());
        let bytes = content.load::<Vec<u8>>("blob.bin").unwrap();
        let icon = content.load::<Image>("icon.png").unwrap();
        assert_eq!(content.get(bytes), Some(&vec![1u8, 2, 3]));
        assert_eq!(content.get(icon).unwrap().width, 4);
    }

    #[test]
    fn missing_processor_is_an_error() {
        let mut content = ContentManager::new(".");
        let err = content.load::<u32>("anything").unwrap_err();
        assert!(matches!(err, ContentError::MissingProcessor { .. }));
        assert!(content.is_empty());
    }

    #[test]
    fn load_failure_propagates_and_tracks_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = ContentManager::new(dir.path());
        let err = content.load::<String>("missing.txt").unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
        assert!(content.is_empty());
    }

    #[test]
    fn duplicate_processor_rejected() {
        let mut content = ContentManager::new(".");
        let err = content.add_processor(TextProcessor).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateProcessor { .. }));
    }

    #[test]
    fn empty_manager_has_no_processors() {
        let content = ContentManager::empty(".");
        assert!(!content.has_processor::<String>());
        assert!(ContentManager::new(".").has_processor::<Image>());
    }

    #[test]
    fn unload_goes_through_processor_once() {
        let dir = tempfile::tempdir().unwrap();
        let (mut content, unloaded) = tracking_manager(dir.path());
        let handle = content.load::<Marker>("hero.sprite").unwrap();

        assert!(content.unload(handle));
        assert_eq!(*unloaded.borrow(), vec!["hero.sprite".to_string()]);
        assert!(!content.contains(handle));

        // Second unload is a warning, not a failure.
        assert!(!content.unload(handle));
        assert_eq!(unloaded.borrow().len(), 1);
    }

    #[test]
    fn dispose_unloads_everything_in_load_order() {
        let dir = tempfile::tempdir().unwrap();
        let (mut content, unloaded) = tracking_manager(dir.path());
        let a = content.load::<Marker>("a").unwrap();
        content.load::<Marker>("b").unwrap();
        content.load::<Marker>("c").unwrap();
        content.unload(a);

        content.dispose();
        assert_eq!(*unloaded.borrow(), vec!["a", "b", "c"]);
        assert!(content.is_empty());
    }

    #[test]
    fn json_processor_deserializes() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Wave {
            enemies: u32,
        }

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wave.json"), r#"{ "enemies": 3 }"#).unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ enemies").unwrap();

        let mut content = ContentManager::new(dir.path());
        content.add_processor(JsonProcessor::<Wave>::new()).unwrap();
        let wave = content.load::<Wave>("wave.json").unwrap();
        assert_eq!(content.get(wave), Some(&Wave { enemies: 3 }));

        let err = content.load::<Wave>("bad.json").unwrap_err();
        assert!(matches!(err, ContentError::Json { .. }));
    }
}
