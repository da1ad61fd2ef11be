//! AutoDispose: a generated cleanup override for classes deriving from
//! the configured base type that own native handles.
//!
//! Each holder gets its own unit overriding the cleanup hook; the
//! override releases every tracked member in declaration order and then
//! calls the base hook. Holders the generated partial part could not
//! attach to are reported and skipped.

pub mod emit;
pub mod scanner;

use diagnostics::generator::GeneratorDiagnostics;
use log::{debug, info};
use parser::ModifierKind;

use crate::config::AutoDisposeConfig;
use crate::context::{GeneratorContext, PublishError, SourceGenerator};
use crate::syntax_walk::walk_tree;

use emit::{hint_name, render_holder};
use scanner::{HolderScanner, ResourceHolder};

pub struct AutoDisposeGenerator {
    config: AutoDisposeConfig,
}

impl AutoDisposeGenerator {
    pub fn new(config: AutoDisposeConfig) -> Self {
        Self { config }
    }

    /// Report why a holder cannot get a generated override, if it can't
    fn validate(&self, context: &mut GeneratorContext<'_>, holder: &ResourceHolder<'_>) -> bool {
        let class = holder.declaration;
        let class_span = context.span(holder.tree, class.identifier.span);

        if !class.has_modifier(ModifierKind::Partial) {
            context.report(GeneratorDiagnostics::holder_not_partial(
                class_span,
                &class.identifier.text,
                &self.config.base_type,
            ));
            return false;
        }

        if let Some(container) = holder
            .containers
            .iter()
            .find(|container| !container.has_modifier(ModifierKind::Partial))
        {
            context.report(GeneratorDiagnostics::container_not_partial(
                class_span,
                &class.identifier.text,
                &container.identifier.text,
            ));
            return false;
        }

        let hook = &self.config.cleanup_hook;
        if let Some(existing) = class.methods().find(|method| {
            method.explicit_interface.is_none()
                && method.parameter_count == 0
                && method.identifier.value_text() == hook
        }) {
            let span = context.span(holder.tree, existing.identifier.span);
            context.report(GeneratorDiagnostics::cleanup_hook_defined(
                span,
                &class.identifier.text,
                hook,
            ));
            return false;
        }

        true
    }
}

impl SourceGenerator for AutoDisposeGenerator {
    fn name(&self) -> &str {
        "AutoDispose"
    }

    fn execute(&self, context: &mut GeneratorContext<'_>) {
        let mut scanner = HolderScanner::new(&self.config);
        for tree in context.compilation().syntax_trees() {
            walk_tree(tree, &mut scanner);
        }

        let mut generated = 0;
        for holder in &scanner.holders {
            if holder.tracked.is_empty() {
                debug!("{} owns no handles", holder.declaration.identifier);
                continue;
            }
            if !self.validate(context, holder) {
                continue;
            }

            let hint = hint_name(holder);
            let text = render_holder(&self.config, holder);
            match context.add_source(hint.as_str(), text) {
                Ok(()) => generated += 1,
                Err(PublishError::DuplicateHintName(_)) => {
                    let span = context.span(holder.tree, holder.declaration.identifier.span);
                    context.report(GeneratorDiagnostics::duplicate_hint_name(span, &hint));
                }
                Err(error) => log::error!("{error}"),
            }
        }
        info!(
            "{} of {} holder(s) get a generated {}",
            generated,
            scanner.holders.len(),
            self.config.cleanup_hook
        );
    }
}
