//! `module-info.class` parsing.

use javelin_modules::{
    Exports, ModuleInfo, ModuleKind, ModuleName, Opens, Provides, Requires, Uses,
};

use crate::bytes::ByteReader;
use crate::error::{ClassFileError, Result};
use crate::pool::ConstPool;

const ACC_OPEN: u16 = 0x0020;
const ACC_TRANSITIVE: u16 = 0x0020;
const ACC_STATIC_PHASE: u16 = 0x0040;

/// Parses a `module-info.class` into a module descriptor.
pub fn parse_module_info(bytes: &[u8]) -> Result<ModuleInfo> {
    let mut r = ByteReader::new(bytes);
    let magic = r.take_u32()?;
    if magic != 0xCAFE_BABE {
        return Err(ClassFileError::BadMagic(magic));
    }
    let _minor = r.take_u16()?;
    let _major = r.take_u16()?;
    let pool = ConstPool::parse(&mut r)?;

    let _access_flags = r.take_u16()?;
    let _this_class = r.take_u16()?;
    let _super_class = r.take_u16()?;

    let interface_count = r.take_u16()? as usize;
    r.skip(interface_count * 2)?;

    for _ in 0..r.take_u16()? as usize {
        skip_member(&mut r)?;
    }
    for _ in 0..r.take_u16()? as usize {
        skip_member(&mut r)?;
    }

    let attr_count = r.take_u16()? as usize;
    for _ in 0..attr_count {
        let name_index = r.take_u16()?;
        let len = r.take_u32()? as usize;
        let payload = r.take_slice(len)?;
        if pool.utf8(name_index)? == "Module" {
            let mut sub = ByteReader::new(payload);
            let module = parse_module_attribute(&mut sub, &pool)?;
            sub.finish()?;
            return Ok(module);
        }
    }
    Err(ClassFileError::Malformed("missing Module attribute"))
}

fn skip_member(r: &mut ByteReader<'_>) -> Result<()> {
    r.skip(6)?; // access_flags, name_index, descriptor_index
    let attr_count = r.take_u16()? as usize;
    for _ in 0..attr_count {
        r.skip(2)?;
        let len = r.take_u32()? as usize;
        r.skip(len)?;
    }
    Ok(())
}

fn parse_module_attribute(r: &mut ByteReader<'_>, pool: &ConstPool) -> Result<ModuleInfo> {
    let name = ModuleName::new(pool.module_name(r.take_u16()?)?);
    let flags = r.take_u16()?;
    let version_index = r.take_u16()?;
    let version = if version_index == 0 {
        None
    } else {
        Some(pool.utf8(version_index)?.to_string())
    };

    let mut requires = Vec::new();
    for _ in 0..r.take_u16()? as usize {
        let module = ModuleName::new(pool.module_name(r.take_u16()?)?);
        let req_flags = r.take_u16()?;
        let _req_version = r.take_u16()?;
        requires.push(Requires {
            module,
            is_transitive: req_flags & ACC_TRANSITIVE != 0,
            is_static: req_flags & ACC_STATIC_PHASE != 0,
        });
    }

    let mut exports = Vec::new();
    for _ in 0..r.take_u16()? as usize {
        let package = pool.package_name(r.take_u16()?)?.replace('/', ".");
        let _exp_flags = r.take_u16()?;
        let mut to = Vec::new();
        for _ in 0..r.take_u16()? as usize {
            to.push(ModuleName::new(pool.module_name(r.take_u16()?)?));
        }
        exports.push(Exports { package, to });
    }

    let mut opens = Vec::new();
    for _ in 0..r.take_u16()? as usize {
        let package = pool.package_name(r.take_u16()?)?.replace('/', ".");
        let _open_flags = r.take_u16()?;
        let mut to = Vec::new();
        for _ in 0..r.take_u16()? as usize {
            to.push(ModuleName::new(pool.module_name(r.take_u16()?)?));
        }
        opens.push(Opens { package, to });
    }

    let mut uses = Vec::new();
    for _ in 0..r.take_u16()? as usize {
        uses.push(Uses {
            service: pool.class_name(r.take_u16()?)?.replace('/', "."),
        });
    }

    let mut provides = Vec::new();
    for _ in 0..r.take_u16()? as usize {
        let service = pool.class_name(r.take_u16()?)?.replace('/', ".");
        let mut implementations = Vec::new();
        for _ in 0..r.take_u16()? as usize {
            implementations.push(pool.class_name(r.take_u16()?)?.replace('/', "."));
        }
        provides.push(Provides {
            service,
            implementations,
        });
    }

    Ok(ModuleInfo {
        kind: ModuleKind::Explicit,
        name,
        is_open: flags & ACC_OPEN != 0,
        version,
        requires,
        exports,
        opens,
        uses,
        provides,
    })
}
