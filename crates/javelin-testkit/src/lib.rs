#![forbid(unsafe_code)]

//! Test support: a minimal class-file emitter and jar writer, used to build
//! synthetic classpaths for classpath and binder tests. Not part of the
//! compiler itself — the real lowering path lives downstream.

mod emit;
mod jdk;

pub use crate::emit::{AnnoSpec, ClassBuilder, ConstSpec, ElemSpec};
pub use crate::jdk::minimal_jdk_classes;

use std::io::Write;
use std::path::Path;

/// Writes `entries` (entry name, bytes) into a jar at `path`.
pub fn write_jar(path: &Path, entries: &[(String, Vec<u8>)]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes)?;
    }
    writer.finish()?;
    Ok(())
}

/// Writes a jar holding the minimal JDK surface the binder needs.
pub fn write_minimal_jdk_jar(path: &Path) -> std::io::Result<()> {
    write_jar(path, &minimal_jdk_classes())
}
