//! Extended tests for the tokenizer
//!
//! These tests pin down the token shapes consumed by the dependency
//! resolver, including how malformed input degrades.

use super::*;
use pretty_assertions::assert_eq;

fn define(name: &str, value: &str) -> Token {
    Token::Define {
        name: name.into(),
        value: value.into(),
    }
}

fn undef(name: &str) -> Token {
    Token::Undef { name: name.into() }
}

fn if_token(elements: Vec<ConditionElement>) -> Token {
    Token::If { elements }
}

fn defined(name: &str) -> ConditionElement {
    ConditionElement::Defined { name: name.into() }
}

fn equals(left: &str, right: &str) -> ConditionElement {
    ConditionElement::Equals {
        left: left.into(),
        right: right.into(),
    }
}

fn include_local(name: &str) -> Token {
    Token::IncludeLocal { name: name.into() }
}

fn import_local(name: &str, visibility: Visibility) -> Token {
    Token::ImportIncludeLocal {
        name: name.into(),
        visibility,
    }
}

fn import_module(name: &str, visibility: Visibility) -> Token {
    Token::ImportModule {
        name: name.into(),
        visibility,
    }
}

fn import_partition(name: &str, visibility: Visibility) -> Token {
    Token::ImportModulePartition {
        name: name.into(),
        visibility,
    }
}

fn module_partition(module: &str, name: &str, visibility: Visibility) -> Token {
    Token::ModulePartition {
        module: module.into(),
        name: name.into(),
        visibility,
    }
}

fn condition(source: &str) -> Vec<ConditionElement> {
    let tokens = tokenize(source);
    assert!(!tokens.is_empty(), "no tokens for {source:?}");
    match &tokens[0] {
        Token::If { elements } => elements.clone(),
        other => panic!("expected an if token, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// #define / #undef
// ---------------------------------------------------------------------------

#[test]
fn test_define_with_value() {
    assert_eq!(tokenize("#define MY_MACRO 1"), vec![define("MY_MACRO", "1")]);
}

#[test]
fn test_define_without_value() {
    assert_eq!(tokenize("#define MY_MACRO"), vec![define("MY_MACRO", "")]);
}

#[test]
fn test_define_split_by_continuations() {
    assert_eq!(
        tokenize("# \\\n\t\tdefine \\\n MY_MACRO \\\n 1"),
        vec![define("MY_MACRO", "1")]
    );
}

#[test]
fn test_define_string_value_keeps_quotes() {
    assert_eq!(
        tokenize("#define MY_MACRO \"111\""),
        vec![define("MY_MACRO", "\"111\"")]
    );
}

/// A value continued over several lines is emitted once, joined.
#[test]
fn test_define_multiline_value() {
    assert_eq!(
        tokenize("#define MY_MACRO 1 \\\n 1"),
        vec![define("MY_MACRO", "1 1")]
    );
    assert_eq!(
        tokenize("#define LIST \\\n  a, \\\n  b\nint x;"),
        vec![define("LIST", "a, b")]
    );
}

#[test]
fn test_undef() {
    assert_eq!(tokenize("#undef MY_MACRO"), vec![undef("MY_MACRO")]);
}

#[test]
fn test_two_undefs_with_comment() {
    assert_eq!(
        tokenize("#   undef MY_MACRO\t\n#undef /* SOME_OTHER_MACRO */ MY_OTHER_MACRO"),
        vec![undef("MY_MACRO"), undef("MY_OTHER_MACRO")]
    );
}

// ---------------------------------------------------------------------------
// conditions
// ---------------------------------------------------------------------------

#[test]
fn test_ifdef() {
    assert_eq!(
        tokenize("#ifdef MY_MACRO\n#endif"),
        vec![if_token(vec![defined("MY_MACRO")]), Token::EndIf]
    );
}

#[test]
fn test_ifndef_is_not_defined_pair() {
    assert_eq!(
        tokenize("#ifndef MY_MACRO\n#endif"),
        vec![
            if_token(vec![ConditionElement::Not, defined("MY_MACRO")]),
            Token::EndIf
        ]
    );
}

#[test]
fn test_if_comparisons() {
    assert_eq!(condition("#if MY_MACRO == 2"), vec![equals("MY_MACRO", "2")]);
    assert_eq!(
        condition("#if MY_MACRO != 2"),
        vec![ConditionElement::NotEquals {
            left: "MY_MACRO".into(),
            right: "2".into()
        }]
    );
    assert_eq!(
        condition("#if MY_MACRO < 2"),
        vec![ConditionElement::LessThan {
            left: "MY_MACRO".into(),
            right: "2".into()
        }]
    );
    assert_eq!(
        condition("#if MY_MACRO <= 2"),
        vec![ConditionElement::LessThanOrEquals {
            left: "MY_MACRO".into(),
            right: "2".into()
        }]
    );
    assert_eq!(
        condition("#if MY_MACRO > OTHER"),
        vec![ConditionElement::GreaterThan {
            left: "MY_MACRO".into(),
            right: "OTHER".into()
        }]
    );
    assert_eq!(
        condition("#if MY_MACRO >= 2"),
        vec![ConditionElement::GreaterThanOrEquals {
            left: "MY_MACRO".into(),
            right: "2".into()
        }]
    );
}

#[test]
fn test_if_string_operand() {
    assert_eq!(
        condition("#if \"some string\" == MY_MACRO"),
        vec![equals("\"some string\"", "MY_MACRO")]
    );
}

#[test]
fn test_if_bare_macros() {
    assert_eq!(
        condition("#if A && B"),
        vec![
            ConditionElement::Not,
            equals("A", "0"),
            ConditionElement::And,
            ConditionElement::Not,
            equals("B", "0"),
        ]
    );
}

#[test]
fn test_if_or() {
    assert_eq!(
        condition("#if A == 1 || B == 2"),
        vec![equals("A", "1"), ConditionElement::Or, equals("B", "2")]
    );
}

#[test]
fn test_if_defined() {
    assert_eq!(
        tokenize("#if defined(MY_MACRO)\n#endif"),
        vec![if_token(vec![defined("MY_MACRO")]), Token::EndIf]
    );
    assert_eq!(
        condition("#if \\\n defined \\\n ( \\\n MY_MACRO \\\n )\n#endif"),
        vec![defined("MY_MACRO")]
    );
}

#[test]
fn test_if_not_defined() {
    let expected = vec![ConditionElement::NotDefined {
        name: "MY_MACRO".into(),
    }];
    assert_eq!(condition("#if !defined(MY_MACRO)\n#endif"), expected);
    assert_eq!(
        condition("#if \\\n ! \\\n defined \\\n ( \\\n MY_MACRO \\\n )\n#endif"),
        expected
    );
}

#[test]
fn test_if_brackets() {
    assert_eq!(
        condition("#if A == 3 && (B < 5 || defined(C))"),
        vec![
            equals("A", "3"),
            ConditionElement::And,
            ConditionElement::LeftBracket,
            ConditionElement::LessThan {
                left: "B".into(),
                right: "5".into()
            },
            ConditionElement::Or,
            defined("C"),
            ConditionElement::RightBracket,
        ]
    );
}

#[test]
fn test_if_comment_between_elements() {
    assert_eq!(
        condition("#if A /* first */ == /* second */ 1 // trailing\n#endif"),
        vec![equals("A", "1")]
    );
}

#[test]
fn test_has_include() {
    assert_eq!(
        condition("#if __has_include(\"my_header.hpp\")"),
        vec![ConditionElement::HasIncludeLocal {
            name: "my_header.hpp".into()
        }]
    );
    assert_eq!(
        condition("#if __has_include(<my_header.hpp>)"),
        vec![ConditionElement::HasIncludeExternal {
            name: "my_header.hpp".into()
        }]
    );
    assert_eq!(
        condition("#if __has_include(\"   my_header.hpp   \")"),
        vec![ConditionElement::HasIncludeLocal {
            name: "my_header.hpp".into()
        }]
    );
}

#[test]
fn test_has_include_empty_name() {
    assert_eq!(
        tokenize("#if __has_include(\"\")\n#endif"),
        vec![
            if_token(vec![ConditionElement::HasIncludeLocal { name: String::new() }]),
            Token::EndIf
        ]
    );
}

/// Malformed `__has_include` keeps the if/endif pair but drops the element.
#[test]
fn test_has_include_malformed() {
    for source in [
        "#if __has_include(<my_header)\n#endif",
        "#if __has_include <my_header>\n#endif",
        "#if __has_include(my_header)\n#endif",
    ] {
        assert_eq!(
            tokenize(source),
            vec![if_token(vec![]), Token::EndIf],
            "{source:?}"
        );
    }

    assert_eq!(tokenize("#if __has_include(<my_header"), vec![if_token(vec![])]);
}

#[test]
fn test_else() {
    assert_eq!(
        tokenize("#ifndef MY_MACRO\n#define MY_MACRO\n#else\n#define MY_OTHER_MACRO\n#endif"),
        vec![
            if_token(vec![ConditionElement::Not, defined("MY_MACRO")]),
            define("MY_MACRO", ""),
            Token::Else,
            define("MY_OTHER_MACRO", ""),
            Token::EndIf,
        ]
    );
}

#[test]
fn test_elif() {
    assert_eq!(
        tokenize("#ifndef MY_MACRO\n#define MY_MACRO\n#elif MY_MACRO == 2\n#define MY_OTHER_MACRO\n#endif"),
        vec![
            if_token(vec![ConditionElement::Not, defined("MY_MACRO")]),
            define("MY_MACRO", ""),
            Token::Else,
            if_token(vec![equals("MY_MACRO", "2")]),
            define("MY_OTHER_MACRO", ""),
            Token::EndIf,
        ]
    );
}

#[test]
fn test_elifdef_and_elifndef() {
    assert_eq!(
        tokenize("#ifdef A\n#elifdef B\n#elifndef C\n#endif"),
        vec![
            if_token(vec![defined("A")]),
            Token::Else,
            if_token(vec![defined("B")]),
            Token::Else,
            if_token(vec![ConditionElement::Not, defined("C")]),
            Token::EndIf,
        ]
    );
}

/// Nested guards and `#elif` chains keep their structure.
#[test]
fn test_nested_conditions_balance() {
    let source = r#"
#ifndef GUARD
#define GUARD
#if defined(_WIN32)
#   include <windows.h>
#elif __has_include(<unistd.h>)
#   include <unistd.h>
#else
#   error "unsupported"
#endif
#endif
"#;
    let tokens = tokenize(source);
    let ifs = tokens
        .iter()
        .filter(|t| matches!(t, Token::If { .. }))
        .count();
    let elses = tokens.iter().filter(|t| matches!(t, Token::Else)).count();
    let endifs = tokens.iter().filter(|t| matches!(t, Token::EndIf)).count();
    // the `#elif` opens an extra if that shares the outer endif
    assert_eq!((ifs, elses, endifs), (3, 2, 2));
    assert!(tokens.contains(&Token::IncludeExternal {
        name: "windows.h".into()
    }));
}

// ---------------------------------------------------------------------------
// #include
// ---------------------------------------------------------------------------

#[test]
fn test_include_local_forms() {
    for source in [
        "#include \"header.hpp\"",
        "#include\"header.hpp\"",
        "    #   include    \"header.hpp\"",
        "/*\n\n*/#include/*\n\n*/\"header.hpp\"",
        "#include \"  header.hpp  \"",
        "#include \"header.hpp\" /* some comment */",
    ] {
        assert_eq!(tokenize(source), vec![include_local("header.hpp")], "{source:?}");
    }
}

#[test]
fn test_include_inner_space_kept() {
    assert_eq!(
        tokenize("#include \"hea der.hpp\""),
        vec![include_local("hea der.hpp")]
    );
}

#[test]
fn test_include_with_continuations() {
    assert_eq!(
        tokenize("# \\\ninclude \\ \n\"my_header.hpp\"\n"),
        vec![include_local("my_header.hpp")]
    );
}

#[test]
fn test_include_malformed() {
    assert_eq!(tokenize("#include \"aaa"), vec![]);
    assert_eq!(tokenize("#include aaa\""), vec![]);
    assert_eq!(
        tokenize("#include \"header.hpp\n#include \"otherheader.hpp\""),
        vec![include_local("otherheader.hpp")]
    );
}

#[test]
fn test_include_external_and_stl() {
    assert_eq!(
        tokenize("#include <my/header.hpp>\n#include <vector>"),
        vec![
            Token::IncludeExternal {
                name: "my/header.hpp".into()
            },
            Token::IncludeStl {
                name: "vector".into()
            },
        ]
    );
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

#[test]
fn test_import_include_local_forms() {
    for source in [
        "import \"header.hpp\";",
        "import\"header.hpp\";",
        "    import    \"header.hpp\"   ;",
        "/*\n\n*/import/*\n\n*/\"header.hpp\";",
        "import \"  header.hpp  \";",
        "import \"header.hpp\" /* some comment */ ;",
    ] {
        assert_eq!(
            tokenize(source),
            vec![import_local("header.hpp", Visibility::Private)],
            "{source:?}"
        );
    }

    assert_eq!(
        tokenize("\nimport \n\"my_header.hpp\"\n;"),
        vec![import_local("my_header.hpp", Visibility::Private)]
    );
}

#[test]
fn test_export_import_include_local() {
    for source in [
        "export import \"header.hpp\";",
        "export import\"header.hpp\";",
        "  export    import   \"header.hpp\"   ;",
        "export import \"  header.hpp  \";",
        "export\nimport\n\n\"header.hpp\"\n\n;",
        "/*\n\n*/export/*\n\n*/import/*\n\n*/\"header.hpp\"/*\n\n*/;",
    ] {
        assert_eq!(
            tokenize(source),
            vec![import_local("header.hpp", Visibility::Exported)],
            "{source:?}"
        );
    }
}

#[test]
fn test_import_include_broken_quote() {
    assert_eq!(
        tokenize("import \"header.hpp;\nimport \"otherheader.hpp\";"),
        vec![import_local("otherheader.hpp", Visibility::Private)]
    );
    assert_eq!(tokenize("import \"aaa;"), vec![]);
    assert_eq!(tokenize("import aaa\";"), vec![]);
}

#[test]
fn test_import_include_external() {
    assert_eq!(
        tokenize("export import <vector>;"),
        vec![Token::ImportIncludeExternal {
            name: "vector".into(),
            visibility: Visibility::Exported
        }]
    );
}

#[test]
fn test_import_module() {
    for source in [
        "import mymodule;",
        "   import    mymodule   ;",
        "import\n  mymodule  \n;",
        "/*\n\n*/import/*\n\n*/mymodule/*\n*/;",
    ] {
        assert_eq!(
            tokenize(source),
            vec![import_module("mymodule", Visibility::Private)],
            "{source:?}"
        );
    }

    for source in [
        "export import mymodule;",
        "   export   import    mymodule   ;",
        "export\nimport\nmymodule\n;",
        "/*\n*/export/*\n\n*/import/*\n\n*/mymodule/*\n*/;",
    ] {
        assert_eq!(
            tokenize(source),
            vec![import_module("mymodule", Visibility::Exported)],
            "{source:?}"
        );
    }
}

#[test]
fn test_import_module_malformed() {
    assert_eq!(tokenize("import ;"), vec![]);
    assert_eq!(tokenize("import mymodule"), vec![]);
}

#[test]
fn test_import_module_partition() {
    for source in [
        "import : mypartition;",
        "   import  :   mypartition   ;",
        "   import:mypartition;",
        "import\n  :\n  mypartition  \n;",
        "/*\n\n*/import/*\n\n*/:/*\n\n*/mypartition/*\n*/;",
    ] {
        assert_eq!(
            tokenize(source),
            vec![import_partition("mypartition", Visibility::Private)],
            "{source:?}"
        );
    }

    assert_eq!(
        tokenize("export\nimport\n:\nmypartition\n;"),
        vec![import_partition("mypartition", Visibility::Exported)]
    );
    assert_eq!(tokenize("import : mypartition"), vec![]);
}

// ---------------------------------------------------------------------------
// module
// ---------------------------------------------------------------------------

#[test]
fn test_module() {
    assert_eq!(
        tokenize("export module my.module;"),
        vec![Token::Module {
            name: "my.module".into(),
            visibility: Visibility::Exported
        }]
    );
    assert_eq!(
        tokenize("module mymodule;"),
        vec![Token::Module {
            name: "mymodule".into(),
            visibility: Visibility::Private
        }]
    );
}

#[test]
fn test_module_partition() {
    for source in [
        "module mymodule : my_partition;",
        "module mymodule:my_partition;",
        "   module    mymodule   :   my_partition  ;",
        "module\nmymodule\n:\nmy_partition\n;",
        "/*\n\n*/module/*\n\n*/mymodule/*\n\n*/:/*\n\n*/my_partition/*\n\n*/;",
    ] {
        assert_eq!(
            tokenize(source),
            vec![module_partition("mymodule", "my_partition", Visibility::Private)],
            "{source:?}"
        );
    }

    for source in [
        "export module mymodule : my_partition;",
        "   export   module    mymodule  :   my_partition ;",
        "export\nmodule\nmymodule\n:\nmy_partition\n;",
        "/*\n*/export/*\n\n*/module/*\n\n*/mymodule/*\n*/:/*\n*/my_partition/*\n*/;/*\n*/",
    ] {
        assert_eq!(
            tokenize(source),
            vec![module_partition("mymodule", "my_partition", Visibility::Exported)],
            "{source:?}"
        );
    }
}

#[test]
fn test_module_malformed() {
    for source in [
        "module;",
        "module ;",
        "module mymodule",
        "module m\n\nmodule other;",
        "module my module;",
        "module mymodule : mypartition\n\nmodule mymodule : otherpartition;",
        "module mymodule : my_partition",
        "module mymodule : my partition;",
        "module mymodule :;",
        "module mymodule : ;",
    ] {
        assert_eq!(tokenize(source), vec![], "{source:?}");
    }
}

#[test]
fn test_not_module_declarations() {
    for source in [
        "export my_class;",
        "export void foo();",
        "extern \"C\" {}",
        "class my_class;",
        "int mymodule = 1;",
    ] {
        assert_eq!(tokenize(source), vec![], "{source:?}");
    }
}

#[test]
fn test_keywords_inside_code_are_not_declarations() {
    assert_eq!(
        tokenize("void init(py::module &m) {\n#ifdef WITH_X\n    bind_x(m);\n#endif\n}\n"),
        vec![if_token(vec![defined("WITH_X")]), Token::EndIf]
    );
    assert_eq!(
        tokenize("struct import {\n#include <vector>\n};\n"),
        vec![Token::IncludeStl {
            name: "vector".into()
        }]
    );
    assert_eq!(tokenize("auto m = module; import x;"), vec![]);
}

#[test]
fn test_malformed_declaration_stops_at_directive() {
    let source = r#"
enum class Kind {
    module,
#include "x.hpp"
#ifdef A
    import,
  #endif
};
"#;
    assert_eq!(
        tokenize(source),
        vec![
            include_local("x.hpp"),
            if_token(vec![defined("A")]),
            Token::EndIf,
        ]
    );
}

// ---------------------------------------------------------------------------
// other
// ---------------------------------------------------------------------------

#[test]
fn test_unterminated_comment() {
    assert_eq!(tokenize("/* unended multiline comment #define A 1"), vec![]);
}

#[test]
fn test_bare_and_unknown_directives() {
    assert_eq!(tokenize("# "), vec![]);
    assert_eq!(tokenize("#"), vec![]);
    assert_eq!(tokenize("#error"), vec![]);
    assert_eq!(tokenize("#pragma once\n#define A"), vec![define("A", "")]);
}

#[test]
fn test_literals_are_skipped() {
    let source = r##"
const char *a = "#define NOT_A_MACRO";
const char *b = R"x(
import fake;
)x";
char c = '"';
int d = 1'000'000;
#define REAL 1
"##;
    assert_eq!(tokenize(source), vec![define("REAL", "1")]);
}

#[test]
fn test_line_comments_hide_declarations() {
    assert_eq!(
        tokenize("// import commented;\nimport real;"),
        vec![import_module("real", Visibility::Private)]
    );
}

#[test]
fn test_tokenize_is_idempotent() {
    let source = "export module app;\nimport <vector>;\n#ifdef X\n#include \"a.hpp\"\n#endif\n";
    assert_eq!(tokenize(source), tokenize(source));
}

#[test]
fn test_display_round_trip_through_tokenizer() {
    let source = "#if defined(A) && B == 2\n#endif\nexport import : part;";
    let rendered: Vec<String> = tokenize(source).iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["#if defined(A) && B == 2", "#endif", "export import : part;"]
    );
}

#[test]
fn test_non_ascii_text() {
    let source = "// ünïcödé\nconst char *s = \"日本\";\n#define NAME \"ü\"\n";
    assert_eq!(tokenize(source), vec![define("NAME", "\"ü\"")]);
}
