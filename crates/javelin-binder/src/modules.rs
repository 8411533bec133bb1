//! Binding `module-info.java`.

use javelin_modules::{
    Exports, ModuleInfo, ModuleKind, ModuleName, Opens, Provides, Requires, Uses,
};
use javelin_syntax::{dotted, Ident, ModDecl, ModDirective};
use javelin_types::HeaderView;

use crate::diag::{DiagSink, ErrorKind};
use crate::env::Env;
use crate::lookup::{LookupKey, Scope};
use crate::resolve::{resolve_member, Origin};

const JAVA_BASE: &str = "java.base";

pub(crate) fn bind_module(
    decl: &ModDecl,
    file: usize,
    scope: &dyn Scope,
    env: &dyn Env<dyn HeaderView>,
    module_version: Option<&str>,
    diags: &DiagSink,
) -> ModuleInfo {
    let name = ModuleName::new(dotted(&decl.name));

    let mut requires = Vec::new();
    let mut exports = Vec::new();
    let mut opens = Vec::new();
    let mut uses = Vec::new();
    let mut provides = Vec::new();

    for directive in &decl.directives {
        match directive {
            ModDirective::Requires {
                is_transitive,
                is_static,
                module,
                ..
            } => requires.push(Requires {
                module: ModuleName::new(dotted(module)),
                is_transitive: *is_transitive,
                is_static: *is_static,
            }),
            ModDirective::Exports { package, to, .. } => exports.push(Exports {
                package: dotted(package),
                to: to.iter().map(|m| ModuleName::new(dotted(m))).collect(),
            }),
            ModDirective::Opens { package, to, .. } => opens.push(Opens {
                package: dotted(package),
                to: to.iter().map(|m| ModuleName::new(dotted(m))).collect(),
            }),
            ModDirective::Uses { service, .. } => {
                check_service(service, file, scope, env, diags);
                uses.push(Uses {
                    service: dotted(service),
                });
            }
            ModDirective::Provides {
                service,
                implementations,
                ..
            } => {
                check_service(service, file, scope, env, diags);
                for implementation in implementations {
                    check_service(implementation, file, scope, env, diags);
                }
                provides.push(Provides {
                    service: dotted(service),
                    implementations: implementations.iter().map(|i| dotted(i)).collect(),
                });
            }
        }
    }

    // Every module implicitly requires java.base.
    if name.as_str() != JAVA_BASE
        && !requires.iter().any(|r| r.module.as_str() == JAVA_BASE)
    {
        requires.push(Requires {
            module: ModuleName::new(JAVA_BASE),
            is_transitive: false,
            is_static: false,
        });
    }

    ModuleInfo {
        kind: ModuleKind::Explicit,
        name,
        is_open: decl.is_open,
        version: module_version.map(str::to_string),
        requires,
        exports,
        opens,
        uses,
        provides,
    }
}

fn check_service(
    name: &[Ident],
    file: usize,
    scope: &dyn Scope,
    env: &dyn Env<dyn HeaderView>,
    diags: &DiagSink,
) {
    let origin = Origin::default();
    let resolved = scope
        .lookup(&LookupKey::new(name.to_vec()))
        .and_then(|hit| {
            let mut sym = hit.sym;
            for ident in &hit.remaining {
                sym = resolve_member(env, &origin, &sym, ident.as_str())?;
            }
            Some(sym)
        });
    if resolved.is_none() {
        diags.error(
            file,
            name[0].pos,
            ErrorKind::CannotResolve,
            format!("could not resolve {}", dotted(name)),
        );
    }
}
