//! Source generators for Unity C# projects.
//!
//! Two pipelines run over a parsed `Compilation`:
//!
//! - `enum_strings`: a `ToFastString()` extension per accessible enum that
//!   maps each value to its member name through a `switch` expression.
//! - `auto_dispose`: an `OnDestroy()` override for every partial class
//!   deriving from `SystemBase` that releases its native collections.
//!
//! ```rust,ignore
//! let (compilation, mut diagnostics) = Compilation::from_sources(files);
//! let driver = GeneratorDriver::from_config(&GeneratorConfig::default());
//! let result = driver.run(&compilation, &ConstantFolder::new());
//! ```

pub mod auto_dispose;
pub mod code_writer;
pub mod config;
pub mod context;
pub mod driver;
pub mod enum_strings;
pub mod logging;
pub mod syntax_walk;

pub use parser::semantic;

pub use auto_dispose::AutoDisposeGenerator;
pub use config::{
    AutoDisposeConfig, ConfigError, DuplicatePathPolicy, EnumStringsConfig, GeneratorConfig,
};
pub use context::{GeneratedSource, GeneratorContext, PublishError, SourceGenerator};
pub use driver::{GeneratorDriver, GeneratorRunResult};
pub use enum_strings::EnumFastStringGenerator;
