//! EnumFastString: a switch-based `ToFastString` extension for every
//! accessible enum.
//!
//! The pipeline runs in four steps:
//!
//! 1. **Scan** every syntax tree for enums whose effective visibility is
//!    public or internal (`scanner`).
//! 2. **Path** each enum to its canonical dotted name and the type
//!    parameters of its enclosing types (`path`). The first declaration
//!    of a path wins.
//! 3. **Values** of members are computed through the `ConstantEvaluator`
//!    and aliases of an earlier value are dropped (`values`).
//! 4. **Emit** one `EnumFastString.g.cs` unit holding all overloads
//!    (`emit`).

pub mod emit;
pub mod path;
pub mod scanner;
pub mod values;

use diagnostics::generator::GeneratorDiagnostics;
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{debug, info};
use parser::{EnumDeclaration, SyntaxTree};

use crate::config::{DuplicatePathPolicy, EnumStringsConfig};
use crate::context::{GeneratorContext, PublishError, SourceGenerator};
use crate::syntax_walk::{walk_tree, Ancestor, DeclarationVisitor};

use emit::{render_enum_extensions, EnumExtension};
use path::{resolve_path, ResolvedPath};
use scanner::{effective_visibility, Visibility};
use values::{deduplicate, resolve_values};

/// Hint name of the generated extension class
pub const ENUM_HINT_NAME: &str = "EnumFastString.g.cs";

/// An enum that passed the scan, keyed by its canonical path
#[derive(Debug, Clone)]
pub struct EnumTarget<'t> {
    pub tree: &'t SyntaxTree,
    pub declaration: &'t EnumDeclaration,
    pub visibility: Visibility,
    pub path: ResolvedPath,
}

pub struct EnumFastStringGenerator {
    config: EnumStringsConfig,
}

impl EnumFastStringGenerator {
    pub fn new(config: EnumStringsConfig) -> Self {
        Self { config }
    }

    /// Scan and path every enum, keeping the first declaration of each path
    fn collect_targets<'t>(
        &self,
        context: &mut GeneratorContext<'t>,
    ) -> IndexMap<String, EnumTarget<'t>> {
        let mut found = FoundEnums::default();
        for tree in context.compilation().syntax_trees() {
            walk_tree(tree, &mut found);
        }

        let mut targets: IndexMap<String, EnumTarget<'t>> = IndexMap::new();
        for candidate in found.enums {
            let declaration = candidate.declaration;
            let visibility = match effective_visibility(declaration, &candidate.ancestors) {
                Ok(Some(visibility)) => visibility,
                Ok(None) => {
                    debug!("skipping enum {}: not accessible", declaration.identifier);
                    continue;
                }
                Err(malformed) => {
                    let span = context.span(candidate.tree, malformed.span);
                    context.report(GeneratorDiagnostics::malformed_declaration(
                        span,
                        &declaration.identifier.text,
                        &malformed.reason,
                    ));
                    continue;
                }
            };

            let path = resolve_path(&declaration.identifier, &candidate.ancestors);
            match targets.entry(path.path.clone()) {
                Entry::Occupied(first) => {
                    debug!("enum {} declared again in {}", path.path, candidate.tree.path);
                    if self.config.duplicate_paths == DuplicatePathPolicy::Warn {
                        let first = first.get();
                        let first_span = context.span(first.tree, first.declaration.identifier.span);
                        let span = context.span(candidate.tree, declaration.identifier.span);
                        context.report(GeneratorDiagnostics::duplicate_canonical_path(
                            span, &path.path, first_span,
                        ));
                    }
                }
                Entry::Vacant(slot) => {
                    debug!("enum {} is {}", path.path, visibility.keyword());
                    slot.insert(EnumTarget {
                        tree: candidate.tree,
                        declaration,
                        visibility,
                        path,
                    });
                }
            }
        }
        targets
    }
}

impl SourceGenerator for EnumFastStringGenerator {
    fn name(&self) -> &str {
        "EnumFastString"
    }

    fn execute(&self, context: &mut GeneratorContext<'_>) {
        let targets = self.collect_targets(context);

        let mut extensions = Vec::with_capacity(targets.len());
        for target in targets.values() {
            let declaration = target.declaration;
            match resolve_values(declaration, context.semantic()) {
                Ok(members) => extensions.push(EnumExtension {
                    visibility: target.visibility,
                    path: target.path.clone(),
                    members: deduplicate(members)
                        .iter()
                        .map(|member| member.declaration.identifier.text.clone())
                        .collect(),
                }),
                Err(failure) => {
                    let member = failure.member;
                    let node = member
                        .initializer
                        .as_ref()
                        .map_or(member.span, |initializer| initializer.span);
                    let span = context.span(target.tree, node);
                    context.report(GeneratorDiagnostics::unresolvable_constant(
                        span,
                        &declaration.identifier.text,
                        &member.identifier.text,
                        &failure.error.to_string(),
                    ));
                }
            }
        }

        if extensions.is_empty() {
            info!("no enums to extend");
            return;
        }
        info!("{} enum(s) get a {} method", extensions.len(), self.config.method_name);

        let text = render_enum_extensions(&self.config, &extensions);
        match context.add_source(ENUM_HINT_NAME, text) {
            Ok(()) => {}
            Err(PublishError::DuplicateHintName(_)) => {
                if let Some(first) = targets.values().next() {
                    let span = context.span(first.tree, first.declaration.identifier.span);
                    context.report(GeneratorDiagnostics::duplicate_hint_name(span, ENUM_HINT_NAME));
                }
            }
            Err(error) => log::error!("{error}"),
        }
    }
}

struct FoundEnum<'t> {
    tree: &'t SyntaxTree,
    ancestors: Vec<Ancestor<'t>>,
    declaration: &'t EnumDeclaration,
}

#[derive(Default)]
struct FoundEnums<'t> {
    enums: Vec<FoundEnum<'t>>,
}

impl<'t> DeclarationVisitor<'t> for FoundEnums<'t> {
    fn visit_enum(
        &mut self,
        tree: &'t SyntaxTree,
        ancestors: &[Ancestor<'t>],
        declaration: &'t EnumDeclaration,
    ) {
        self.enums.push(FoundEnum {
            tree,
            ancestors: ancestors.to_vec(),
            declaration,
        });
    }
}
