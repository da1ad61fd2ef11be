//! C# text of the enum extension class

use crate::code_writer::CodeWriter;
use crate::config::EnumStringsConfig;

use super::path::ResolvedPath;
use super::scanner::Visibility;

/// Everything needed to write one `ToFastString` overload
#[derive(Debug, Clone)]
pub struct EnumExtension {
    pub visibility: Visibility,
    pub path: ResolvedPath,
    /// Member names in declaration order, one per distinct value
    pub members: Vec<String>,
}

pub const GENERATED_HEADER: &str = "// <auto-generated/>";

/// The whole extension compilation unit
pub fn render_enum_extensions(config: &EnumStringsConfig, extensions: &[EnumExtension]) -> String {
    let mut writer = CodeWriter::new();
    writer.line(GENERATED_HEADER);
    writer.open_block(format!("namespace {}", config.namespace));
    writer.open_block(format!("public static class {}", config.class_name));

    for (i, extension) in extensions.iter().enumerate() {
        if i > 0 {
            writer.blank_line();
        }
        render_method(&mut writer, &config.method_name, extension);
    }

    writer.close_block();
    writer.close_block();
    writer.finish()
}

fn render_method(writer: &mut CodeWriter, method_name: &str, extension: &EnumExtension) {
    let enum_type = extension.path.qualified();
    writer.open_block(format!(
        "{} static string {}{}(this {} @enum)",
        extension.visibility.keyword(),
        method_name,
        extension.path.generic_suffix(),
        enum_type
    ));
    writer.line("return @enum switch");
    writer.line("{");
    writer.increase_indent();
    for member in &extension.members {
        let constant = format!("{enum_type}.{member}");
        log::trace!("arm {constant}");
        writer.line(format!("{constant} => nameof({constant}),"));
    }
    writer.line("_ => throw new System.ArgumentOutOfRangeException(nameof(@enum), @enum, null)");
    writer.close_block_with(";");
    writer.close_block();
}
