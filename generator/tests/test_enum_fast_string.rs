/// End-to-end tests of the EnumFastString pipeline.
///
/// Each test parses a few C# files, runs only the enum generator with the
/// constant folder, and checks the generated extension class and the
/// diagnostics of the run.
use diagnostics::generator::codes;
use generator::enum_strings::ENUM_HINT_NAME;
use generator::{
    DuplicatePathPolicy, EnumFastStringGenerator, EnumStringsConfig, GeneratorDriver,
    GeneratorRunResult,
};
use parser::{Compilation, ConstantFolder};

fn run_with(config: EnumStringsConfig, files: &[(&str, &str)]) -> GeneratorRunResult {
    generator::logging::init_test();
    let (compilation, parse_diagnostics) = Compilation::from_sources(files.iter().copied());
    assert!(parse_diagnostics.is_empty(), "{parse_diagnostics:?}");
    let mut driver = GeneratorDriver::new();
    driver.register(EnumFastStringGenerator::new(config));
    driver.run(&compilation, &ConstantFolder::new())
}

fn run(files: &[(&str, &str)]) -> GeneratorRunResult {
    run_with(EnumStringsConfig::default(), files)
}

fn generated(result: &GeneratorRunResult) -> &str {
    match result.source(ENUM_HINT_NAME) {
        Some(source) => &source.text,
        None => panic!("no {ENUM_HINT_NAME} was generated: {:?}", result.diagnostics),
    }
}

/// Member names of the switch arms, in order
fn arms(text: &str, path: &str) -> Vec<String> {
    let prefix = format!("global::{path}.");
    text.lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(&prefix))
        .filter_map(|rest| rest.split(" => ").next())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_implicit_members_get_one_arm_each() {
    let result = run(&[("Color.cs", "namespace Game { public enum Color { Red, Green, Blue } }")]);
    let text = generated(&result);

    assert_eq!(arms(text, "Game.Color"), vec!["Red", "Green", "Blue"]);
    assert!(text.contains("public static string ToFastString(this global::Game.Color @enum)"));
    assert!(text.contains(
        "global::Game.Color.Green => nameof(global::Game.Color.Green),"
    ));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_explicit_value_in_the_middle() {
    let result = run(&[("E.cs", "public enum Step { A, B = 5, C }")]);
    assert_eq!(arms(generated(&result), "Step"), vec!["A", "B", "C"]);
}

#[test]
fn test_aliases_never_get_an_arm() {
    let result = run(&[(
        "E.cs",
        "public enum Pair { A, B = 0 }\npublic enum Flags : byte { None = 0, Walk = 1 << 0, Run = 1 << 1, Sprint = Run, All = Walk | Run }",
    )]);
    let text = generated(&result);

    assert_eq!(arms(text, "Pair"), vec!["A"]);
    assert!(!text.contains("global::Pair.B"));
    assert_eq!(arms(text, "Flags"), vec!["None", "Walk", "Run", "All"]);
    assert!(!text.contains("Sprint"));
}

#[test]
fn test_shifts_past_the_int_width_alias_earlier_members() {
    let result = run(&[(
        "Masks.cs",
        "namespace N { public enum E { A = 1, B = 1 << 32 }\npublic enum Wide : long { A = 1, B = 1L << 32 } }",
    )]);
    let text = generated(&result);

    assert_eq!(arms(text, "N.E"), vec!["A"]);
    assert!(!text.contains("global::N.E.B =>"));
    assert_eq!(arms(text, "N.Wide"), vec!["A", "B"]);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_enums_in_private_or_protected_types_are_excluded() {
    let source = r#"
namespace Game
{
    public class Host
    {
        private class Secret { public enum Hidden { A } }
        protected class Family { public enum Guarded { A } }
        public class Open { public enum Visible { A } }
        internal class Assembly { public enum Shared { A } }
    }
}
"#;
    let result = run(&[("Host.cs", source)]);
    let text = generated(&result);

    assert!(!text.contains("Hidden"));
    assert!(!text.contains("Guarded"));
    assert!(text.contains("public static string ToFastString(this global::Game.Host.Open.Visible @enum)"));
    assert!(text.contains(
        "internal static string ToFastString(this global::Game.Host.Assembly.Shared @enum)"
    ));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_protected_internal_enum_gets_an_internal_method() {
    let source = "namespace N { public class C { protected internal enum PI { A } protected enum P { A } } }";
    let result = run(&[("C.cs", source)]);
    let text = generated(&result);

    assert!(text.contains("internal static string ToFastString(this global::N.C.PI @enum)"));
    assert_eq!(arms(text, "N.C.PI"), vec!["A"]);
    assert!(!text.contains("global::N.C.P "));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_generic_containers_contribute_type_parameters() {
    let source = r#"
namespace Data
{
    public class Table<TKey, TValue>
    {
        public class Cursor<T>
        {
            public enum State { Before, On, After }
        }
    }
}
"#;
    let result = run(&[("Table.cs", source)]);
    let text = generated(&result);

    assert!(text.contains(
        "public static string ToFastString<TKey, TValue, T>(this global::Data.Table<TKey, TValue>.Cursor<T>.State @enum)"
    ));
    assert_eq!(arms(text, "Data.Table<TKey, TValue>.Cursor<T>.State"), vec!["Before", "On", "After"]);
}

#[test]
fn test_same_leaf_name_in_different_namespaces() {
    let result = run(&[
        ("A.cs", "namespace Audio { public enum Mode { Mono, Stereo } }"),
        ("B.cs", "namespace Video { public enum Mode { Windowed, Fullscreen } }"),
    ]);
    let text = generated(&result);

    assert_eq!(arms(text, "Audio.Mode"), vec!["Mono", "Stereo"]);
    assert_eq!(arms(text, "Video.Mode"), vec!["Windowed", "Fullscreen"]);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_duplicate_canonical_path_keeps_first() {
    let files = [
        ("First.cs", "namespace N { public enum E { A, B } }"),
        ("Second.cs", "namespace N { public enum E { X, Y, Z } }"),
    ];
    let result = run(&files);
    let text = generated(&result);

    assert_eq!(arms(text, "N.E"), vec!["A", "B"]);
    assert_eq!(text.matches("ToFastString(").count(), 1);
    let warnings: Vec<_> = result.diagnostics.with_code(codes::DUPLICATE_CANONICAL_PATH).collect();
    assert_eq!(warnings.len(), 1);
    assert!(!warnings[0].is_error());

    let config = EnumStringsConfig {
        duplicate_paths: DuplicatePathPolicy::Silent,
        ..EnumStringsConfig::default()
    };
    assert!(run_with(config, &files).diagnostics.is_empty());
}

#[test]
fn test_malformed_container_is_reported_and_isolated() {
    let source = r#"
namespace N
{
    class NoAccess { public enum Lost { A } }
    public enum Kept { A }
}
"#;
    let result = run(&[("M.cs", source)]);

    let errors: Vec<_> = result.diagnostics.with_code(codes::MALFORMED_DECLARATION).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Lost"));
    assert_eq!(errors[0].span.start.line, 4);

    let text = generated(&result);
    assert!(!text.contains("Lost"));
    assert_eq!(arms(text, "N.Kept"), vec!["A"]);
}

#[test]
fn test_unresolvable_constant_skips_only_that_enum() {
    let result = run(&[(
        "U.cs",
        "public enum Bad { A = SomeClass.Value }\npublic enum Good { A = 1 << 2 }",
    )]);

    let errors: Vec<_> = result.diagnostics.with_code(codes::UNRESOLVABLE_CONSTANT).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Bad.A"));
    assert!(result.has_errors());

    let text = generated(&result);
    assert!(!text.contains("global::Bad"));
    assert_eq!(arms(text, "Good"), vec!["A"]);
}

#[test]
fn test_empty_enum_still_gets_a_method() {
    let result = run(&[("E.cs", "public enum Nothing { }")]);
    let text = generated(&result);
    assert!(text.contains("ToFastString(this global::Nothing @enum)"));
    assert!(arms(text, "Nothing").is_empty());
}

#[test]
fn test_no_accessible_enums_publishes_nothing() {
    let result = run(&[("E.cs", "enum Implicit { A }\nclass C { }")]);
    assert!(result.sources.is_empty());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_configured_names_are_used() {
    let config = EnumStringsConfig {
        namespace: "Game.Text".to_string(),
        class_name: "Names".to_string(),
        method_name: "ToName".to_string(),
        ..EnumStringsConfig::default()
    };
    let result = run_with(config, &[("E.cs", "public enum E { A }")]);
    let text = generated(&result);
    assert!(text.contains("namespace Game.Text\n"));
    assert!(text.contains("public static class Names\n"));
    assert!(text.contains("public static string ToName(this global::E @enum)"));
}

#[test]
fn test_output_is_identical_across_runs() {
    let files = [
        ("B.cs", "namespace B { public enum Z { One = 1, Two, Three = One | Two } }"),
        ("A.cs", "namespace A { internal enum Y { Q, R } public class Box<T> { public enum S { X } } }"),
    ];
    let first = run(&files);
    let second = run(&files);
    assert_eq!(first.sources, second.sources);

    let text = generated(&first);
    let b = text.find("global::B.Z @enum").unwrap();
    let a = text.find("global::A.Y @enum").unwrap();
    assert!(b < a, "overloads follow the order files were given");
}
