#![forbid(unsafe_code)]

//! Classpath reading.
//!
//! Each archive is indexed eagerly enough to enumerate its class names; the
//! class files themselves are parsed lazily, the first time a bound-class
//! view is requested, and memoized. A class file that fails to parse is
//! treated as absent and never retried; an archive that fails to open fails
//! the whole classpath with the offending path.

mod bind;
mod ct_sym;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use javelin_classfile::{parse_module_info, ClassFile};
use javelin_modules::ModuleInfo;
use javelin_types::{BoundClass, ClassSymbol};

pub use crate::ct_sym::release_version_label;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid archive {path}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("release {0} is outside the supported range")]
    Release(u16),
}

#[derive(Debug)]
struct Archive {
    path: PathBuf,
    zip: RefCell<zip::ZipArchive<File>>,
}

#[derive(Clone, Copy, Debug)]
struct EntryRef {
    archive: usize,
    entry: usize,
}

/// A sequence of class archives with lazy, memoized class materialization.
#[derive(Debug)]
pub struct Classpath {
    archives: Vec<Archive>,
    /// Binary class name → first archive entry claiming it.
    index: HashMap<String, EntryRef>,
    /// Module descriptors found in the archives, in archive order.
    modules: Vec<ModuleInfo>,
    cells: RefCell<HashMap<ClassSymbol, Option<Rc<BoundClass>>>>,
}

impl Classpath {
    /// Opens and indexes `paths` in order; earlier archives win name
    /// collisions.
    pub fn open(paths: &[PathBuf]) -> Result<Classpath, ClasspathError> {
        let mut cp = Classpath {
            archives: Vec::new(),
            index: HashMap::new(),
            modules: Vec::new(),
            cells: RefCell::new(HashMap::new()),
        };
        for path in paths {
            cp.add_archive(path, |name| {
                name.strip_suffix(".class")
                    .filter(|_| !name.starts_with("META-INF/"))
                    .map(str::to_string)
            })?;
        }
        Ok(cp)
    }

    /// Opens a ct.sym archive restricted to the given release level.
    pub fn open_ct_sym(path: &Path, release: u16) -> Result<Classpath, ClasspathError> {
        let label = ct_sym::release_version_label(release).ok_or(ClasspathError::Release(release))?;
        let mut cp = Classpath {
            archives: Vec::new(),
            index: HashMap::new(),
            modules: Vec::new(),
            cells: RefCell::new(HashMap::new()),
        };
        cp.add_archive(path, |name| ct_sym::class_name_for_release(name, label))?;
        Ok(cp)
    }

    /// `entry_class_name` maps an archive entry name to the binary class
    /// name it provides, or `None` to skip the entry.
    fn add_archive(
        &mut self,
        path: &Path,
        entry_class_name: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ClasspathError> {
        let file = File::open(path).map_err(|source| ClasspathError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut zip = zip::ZipArchive::new(file).map_err(|source| ClasspathError::Archive {
            path: path.to_path_buf(),
            source,
        })?;

        let archive_idx = self.archives.len();
        let mut module_entry = None;
        for entry in 0..zip.len() {
            let name = match zip.by_index_raw(entry) {
                Ok(file) => file.name().to_string(),
                Err(_) => continue,
            };
            let Some(class_name) = entry_class_name(&name) else {
                continue;
            };
            if class_name.ends_with("module-info") {
                module_entry = Some(entry);
                continue;
            }
            self.index
                .entry(class_name)
                .or_insert(EntryRef {
                    archive: archive_idx,
                    entry,
                });
        }
        debug!(path = %path.display(), classes = self.index.len(), "indexed archive");

        if let Some(entry) = module_entry {
            if let Ok(bytes) = read_entry(&mut zip, entry) {
                if let Ok(info) = parse_module_info(&bytes) {
                    self.modules.push(info);
                }
            }
        }

        self.archives.push(Archive {
            path: path.to_path_buf(),
            zip: RefCell::new(zip),
        });
        Ok(())
    }

    /// All indexed binary class names, for top-level index construction.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn contains(&self, sym: &ClassSymbol) -> bool {
        self.index.contains_key(sym.binary_name())
    }

    /// Module descriptors found on this classpath.
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// The bound class for `sym`, materializing it on first request.
    ///
    /// An entry whose class file does not parse is memoized as absent.
    pub fn lookup(&self, sym: &ClassSymbol) -> Option<Rc<BoundClass>> {
        if let Some(cell) = self.cells.borrow().get(sym) {
            return cell.clone();
        }
        let materialized = self.materialize(sym);
        self.cells
            .borrow_mut()
            .entry(sym.clone())
            .or_insert(materialized)
            .clone()
    }

    fn materialize(&self, sym: &ClassSymbol) -> Option<Rc<BoundClass>> {
        let entry = *self.index.get(sym.binary_name())?;
        let archive = &self.archives[entry.archive];
        let bytes = match read_entry(&mut archive.zip.borrow_mut(), entry.entry) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(
                    class = sym.binary_name(),
                    path = %archive.path.display(),
                    %err,
                    "skipping unreadable classpath entry"
                );
                return None;
            }
        };
        let class_file = match ClassFile::parse(&bytes) {
            Ok(cf) => cf,
            Err(err) => {
                debug!(
                    class = sym.binary_name(),
                    path = %archive.path.display(),
                    %err,
                    "skipping unparseable class file"
                );
                return None;
            }
        };
        Some(Rc::new(bind::bind_class(sym, &class_file)))
    }
}

fn read_entry(
    zip: &mut zip::ZipArchive<File>,
    entry: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut file = zip.by_index(entry)?;
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}
