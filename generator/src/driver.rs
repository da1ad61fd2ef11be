//! Runs the registered generators over one compilation

use diagnostics::Diagnostics;
use log::info;
use parser::{Compilation, ConstantEvaluator};

use crate::auto_dispose::AutoDisposeGenerator;
use crate::config::GeneratorConfig;
use crate::context::{GeneratedSource, GeneratorContext, SourceGenerator};
use crate::enum_strings::EnumFastStringGenerator;

/// Everything one run produced
#[derive(Debug, Clone, Default)]
pub struct GeneratorRunResult {
    /// Published units, in the order they were added
    pub sources: Vec<GeneratedSource>,
    pub diagnostics: Diagnostics,
}

impl GeneratorRunResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn source(&self, hint_name: &str) -> Option<&GeneratedSource> {
        self.sources.iter().find(|source| source.hint_name == hint_name)
    }
}

/// Ordered set of generators sharing one context per run.
///
/// Runs keep no state between them; the same compilation always gives
/// the same result.
#[derive(Default)]
pub struct GeneratorDriver {
    generators: Vec<Box<dyn SourceGenerator>>,
}

impl GeneratorDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both generators, each only if enabled in `config`
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let mut driver = Self::new();
        if config.enum_strings.enabled {
            driver.register(EnumFastStringGenerator::new(config.enum_strings.clone()));
        }
        if config.auto_dispose.enabled {
            driver.register(AutoDisposeGenerator::new(config.auto_dispose.clone()));
        }
        driver
    }

    pub fn register(&mut self, generator: impl SourceGenerator + 'static) -> &mut Self {
        self.generators.push(Box::new(generator));
        self
    }

    pub fn generator_names(&self) -> Vec<&str> {
        self.generators.iter().map(|generator| generator.name()).collect()
    }

    pub fn run(
        &self,
        compilation: &Compilation,
        semantic: &dyn ConstantEvaluator,
    ) -> GeneratorRunResult {
        let mut context = GeneratorContext::new(compilation, semantic);
        for generator in &self.generators {
            let sources_before = context.sources().len();
            let diagnostics_before = context.diagnostics().len();
            generator.execute(&mut context);
            info!(
                "{}: {} source(s), {} diagnostic(s)",
                generator.name(),
                context.sources().len() - sources_before,
                context.diagnostics().len() - diagnostics_before
            );
        }
        let (sources, diagnostics) = context.into_parts();
        GeneratorRunResult {
            sources,
            diagnostics,
        }
    }
}
