//! C# text of a holder's generated cleanup override

use parser::{ModifierList, TypeDeclaration};

use crate::code_writer::CodeWriter;
use crate::config::AutoDisposeConfig;
use crate::enum_strings::emit::GENERATED_HEADER;

use super::scanner::ResourceHolder;

/// `Ns.Outer.Holder`1.AutoDispose.g.cs`: namespace, enclosing types and
/// class, with generic arity in metadata form so overloads by arity stay
/// apart.
pub fn hint_name(holder: &ResourceHolder<'_>) -> String {
    let mut parts = Vec::with_capacity(holder.containers.len() + 2);
    if let Some(namespace) = &holder.namespace {
        parts.push(namespace.clone());
    }
    parts.extend(holder.containers.iter().map(|ty| metadata_name(ty)));
    parts.push(metadata_name(holder.declaration));
    format!("{}.AutoDispose.g.cs", parts.join("."))
}

fn metadata_name(ty: &TypeDeclaration) -> String {
    match &ty.type_parameters {
        Some(list) => format!("{}`{}", ty.identifier.value_text(), list.parameters.len()),
        None => ty.identifier.value_text().to_string(),
    }
}

pub fn render_holder(config: &AutoDisposeConfig, holder: &ResourceHolder<'_>) -> String {
    let mut writer = CodeWriter::new();
    writer.line(GENERATED_HEADER);

    let mut depth = 0;
    if let Some(namespace) = &holder.namespace {
        writer.open_block(format!("namespace {namespace}"));
        depth += 1;
    }
    for container in &holder.containers {
        writer.open_block(format!(
            "partial {} {}",
            container.kind.keyword(),
            container.display_name()
        ));
        depth += 1;
    }

    let class = holder.declaration;
    let access: Vec<&str> = class
        .modifiers
        .accessibility()
        .iter()
        .map(|modifier| modifier.kind.as_str())
        .collect();
    let header = if access.is_empty() {
        format!("partial class {}", class.display_name())
    } else {
        format!("{} partial class {}", access.join(" "), class.display_name())
    };
    writer.open_block(header);
    writer.open_block(format!("protected override void {}()", config.cleanup_hook));
    for identifier in &holder.tracked {
        writer.line(format!("{}.{}();", identifier, config.release_method));
    }
    writer.line(format!("base.{}();", config.cleanup_hook));
    writer.close_block();
    writer.close_block();

    for _ in 0..depth {
        writer.close_block();
    }
    writer.finish()
}
