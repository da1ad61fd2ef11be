/// End-to-end tests of the AutoDispose pipeline
use diagnostics::generator::codes;
use generator::{AutoDisposeConfig, AutoDisposeGenerator, GeneratorDriver, GeneratorRunResult};
use parser::{Compilation, ConstantFolder};

fn run_with(config: AutoDisposeConfig, files: &[(&str, &str)]) -> GeneratorRunResult {
    generator::logging::init_test();
    let (compilation, parse_diagnostics) = Compilation::from_sources(files.iter().copied());
    assert!(parse_diagnostics.is_empty(), "{parse_diagnostics:?}");
    let mut driver = GeneratorDriver::new();
    driver.register(AutoDisposeGenerator::new(config));
    driver.run(&compilation, &ConstantFolder::new())
}

fn run(files: &[(&str, &str)]) -> GeneratorRunResult {
    run_with(AutoDisposeConfig::default(), files)
}

const MOVEMENT: &str = r#"
using Unity.Collections;
using Unity.Entities;

namespace Game.Systems
{
    public partial class MovementSystem : SystemBase
    {
        private NativeArray<float3> _positions;
        private int _frame;
        private NativeList<Entity> _pending;

        protected override void OnCreate()
        {
            _positions = new NativeArray<float3>(64, Allocator.Persistent);
            _pending = new NativeList<Entity>(Allocator.Persistent);
        }

        protected override void OnUpdate() { }
    }
}
"#;

#[test]
fn test_two_fields_released_in_order_then_base() {
    let result = run(&[("MovementSystem.cs", MOVEMENT)]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    let source = result
        .source("Game.Systems.MovementSystem.AutoDispose.g.cs")
        .expect("holder source");
    let expected = "\
// <auto-generated/>
namespace Game.Systems
{
    public partial class MovementSystem
    {
        protected override void OnDestroy()
        {
            _positions.Dispose();
            _pending.Dispose();
            base.OnDestroy();
        }
    }
}
";
    assert_eq!(source.text, expected);
    assert_eq!(source.text.matches("base.OnDestroy();").count(), 1);
}

#[test]
fn test_non_partial_holder_is_reported() {
    let result = run(&[(
        "S.cs",
        "public class Sealed : SystemBase { NativeArray<int> _data; }",
    )]);
    assert!(result.sources.is_empty());
    let warnings: Vec<_> = result.diagnostics.with_code(codes::HOLDER_NOT_PARTIAL).collect();
    assert_eq!(warnings.len(), 1);
    assert!(!result.has_errors());
}

#[test]
fn test_non_partial_container_is_reported() {
    let result = run(&[(
        "S.cs",
        "public class Outer { public partial class Inner : SystemBase { NativeList<int> _ids; } }",
    )]);
    assert!(result.sources.is_empty());
    let warnings: Vec<_> = result.diagnostics.with_code(codes::CONTAINER_NOT_PARTIAL).collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("'Outer'"));
}

#[test]
fn test_existing_hook_is_reported() {
    let source = r#"
public partial class Manual : SystemBase
{
    NativeArray<int> _data;
    protected override void OnDestroy() { _data.Dispose(); }
}
public partial class Overloaded : SystemBase
{
    NativeArray<int> _data;
    void OnDestroy(bool force) { }
}
"#;
    let result = run(&[("S.cs", source)]);

    let warnings: Vec<_> = result.diagnostics.with_code(codes::CLEANUP_HOOK_DEFINED).collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("Manual"));
    assert_eq!(warnings[0].span.start.line, 5);

    let hints: Vec<_> = result.sources.iter().map(|s| s.hint_name.as_str()).collect();
    assert_eq!(hints, vec!["Overloaded.AutoDispose.g.cs"]);
}

#[test]
fn test_holders_without_handles_are_ignored() {
    let result = run(&[(
        "S.cs",
        "public class Plain : SystemBase { int _count; }\npublic partial class Empty : SystemBase { }",
    )]);
    assert!(result.sources.is_empty());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_nested_generic_holder() {
    let source = r#"
namespace Game
{
    public static partial class Pools
    {
        internal partial class Pool<T> : SystemBase where T : unmanaged
        {
            public NativeList<T> Items { get; private set; }
        }
    }
}
"#;
    let result = run(&[("Pools.cs", source)]);
    let source = result
        .source("Game.Pools.Pool`1.AutoDispose.g.cs")
        .expect("nested holder source");
    assert!(source.text.contains("    partial class Pools\n    {\n"));
    assert!(source.text.contains("        internal partial class Pool<T>\n"));
    assert!(source.text.contains("                Items.Dispose();\n"));
}

#[test]
fn test_same_class_name_in_different_namespaces() {
    let result = run(&[
        ("A.cs", "namespace A { public partial class Sys : SystemBase { NativeArray<int> _a; } }"),
        ("B.cs", "namespace B { public partial class Sys : SystemBase { NativeArray<int> _b; } }"),
    ]);
    let hints: Vec<_> = result.sources.iter().map(|s| s.hint_name.as_str()).collect();
    assert_eq!(hints, vec!["A.Sys.AutoDispose.g.cs", "B.Sys.AutoDispose.g.cs"]);
}

#[test]
fn test_partial_parts_with_same_name_collide() {
    let result = run(&[
        ("Part1.cs", "public partial class Split : SystemBase { NativeArray<int> _a; }"),
        ("Part2.cs", "public partial class Split : SystemBase { NativeArray<int> _b; }"),
    ]);
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.diagnostics.with_code(codes::DUPLICATE_HINT_NAME).count(), 1);
}

#[test]
fn test_configured_names() {
    let config = AutoDisposeConfig {
        base_type: "JobComponentSystem".to_string(),
        handle_types: vec!["NativeHashMap".to_string()],
        cleanup_hook: "OnStopRunning".to_string(),
        release_method: "Release".to_string(),
        ..AutoDisposeConfig::default()
    };
    let source = "public partial class Lookup : JobComponentSystem { NativeHashMap<int, int> _map; NativeArray<int> _ignored; }";
    let result = run_with(config, &[("L.cs", source)]);

    let text = &result.source("Lookup.AutoDispose.g.cs").expect("holder source").text;
    assert!(text.contains("protected override void OnStopRunning()"));
    assert!(text.contains("_map.Release();"));
    assert!(!text.contains("_ignored"));
    assert!(text.contains("base.OnStopRunning();"));
}
