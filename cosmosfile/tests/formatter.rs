use cosmosfile::{format, Config};
use proptest::prelude::*;

struct Case {
    description: &'static str,
    input: &'static str,
    expect: &'static str,
}

const CASES: &[Case] = &[
    Case {
        description: "very simple",
        input: "abc   def\n\tg hi jkl\nmn",
        expect: "abc def\ng hi jkl\nmn",
    },
    Case {
        description: "basic indentation, line breaks, and nesting",
        input: "  a\nb\n\n\tc {\n\t\td\n}\n\ne { f\n}\n\n\n\ng {\nh {\ni\n}\n}\n\nj { k {\nl\n}\n}\n\nm {\n\tn { o\n\t}\n\tp { q r\ns }\n}\n\n\t{\n{ t\n\t\tu\n\n\tv\n\nw\n}\n}",
        expect: "a\nb\n\nc {\n\td\n}\n\ne {\n\tf\n}\n\ng {\n\th {\n\t\ti\n\t}\n}\n\nj {\n\tk {\n\t\tl\n\t}\n}\n\nm {\n\tn {\n\t\to\n\t}\n\tp {\n\t\tq r\n\t\ts\n\t}\n}\n\n{\n\t{\n\t\tt\n\t\tu\n\n\t\tv\n\n\t\tw\n\t}\n}",
    },
    Case {
        description: "block spacing",
        input: "a{\n\tb\n}\n\nc{ d\n}",
        expect: "a {\n\tb\n}\n\nc {\n\td\n}",
    },
    Case {
        description: "advanced spacing",
        input: "abc {\n\tdef\n}ghi{\n\tjkl mno\npqr}",
        expect: "abc {\n\tdef\n}\n\nghi {\n\tjkl mno\n\tpqr\n}",
    },
    Case {
        description: "env var placeholders",
        input: "{$A}\n\nb {\n{$C}\n}\n\nd { {$E}\n}\n\n{ {$F}\n}\n",
        expect: "{$A}\n\nb {\n\t{$C}\n}\n\nd {\n\t{$E}\n}\n\n{\n\t{$F}\n}",
    },
    Case {
        description: "comments",
        input: "#a \"\\n\"\n\n #b {\n\tc\n}\n\nd {\ne#f\n# g\n}\n\nh { # i\n}",
        expect: "#a \"\\n\"\n\n#b {\nc\n}\n\nd {\n\te#f\n\t# g\n}\n\nh {\n\t# i\n}",
    },
    Case {
        description: "quotes and escaping",
        input: "\"a \\\"b\\\" \"#c\n\td\n\ne {\n\"f\"\n}\n\ng { \"h\"\n}\n\ni {\n\t\"foo\nbar\"\n}\n\nj {\n\"\\\"k\\\" l m\"\n}",
        expect: "\"a \\\"b\\\" \"#c\nd\n\ne {\n\t\"f\"\n}\n\ng {\n\t\"h\"\n}\n\ni {\n\t\"foo\nbar\"\n}\n\nj {\n\t\"\\\"k\\\" l m\"\n}",
    },
    Case {
        description: "bad nesting (too many open)",
        input: "a\n{\n\t{\n}",
        expect: "a {\n\t{\n\t}\n",
    },
    Case {
        description: "bad nesting (too many close)",
        input: "a\n{\n\t{\n}}}",
        expect: "a {\n\t{\n\t}\n}\n}\n",
    },
    Case {
        description: "json",
        input: "foo\nbar      \"{\\\"key\\\":34}\"\n",
        expect: "foo\nbar \"{\\\"key\\\":34}\"",
    },
    Case {
        description: "escaping after spaces",
        input: "foo \\\"literal\\\"",
        expect: "foo \\\"literal\\\"",
    },
    Case {
        description: "simple placeholders as standalone tokens",
        input: "foo {bar}",
        expect: "foo {bar}",
    },
    Case {
        description: "simple placeholders within tokens",
        input: "foo{bar} foo{bar}baz",
        expect: "foo{bar} foo{bar}baz",
    },
    Case {
        description: "placeholders and malformed braces",
        input: "foo{bar} foo{ bar}baz",
        expect: "foo{bar} foo {\n\tbar\n}\n\nbaz",
    },
    Case {
        description: "hash within string is not a comment",
        input: "redir / /some/#/path",
        expect: "redir / /some/#/path",
    },
    Case {
        description: "brace does not fold into comment above",
        input: "# comment\n{\n\tfoo\n}",
        expect: "# comment\n{\n\tfoo\n}",
    },
    Case {
        description: "backtick span is copied verbatim",
        input: "a   `b  \"c\n\t\td` {\n  e\n}",
        expect: "a `b  \"c\n\t\td` {\n\te\n}",
    },
    Case {
        description: "crlf line endings",
        input: "a {\r\n\tb\r\n}\r\n",
        expect: "a {\n\tb\n}",
    },
];

/// The formatter always emits a trailing newline, whether or not a case
/// spells it out.
fn expected(case: &Case) -> String {
    if case.expect.ends_with('\n') {
        case.expect.to_string()
    } else {
        format!("{}\n", case.expect)
    }
}

fn fmt(input: &str) -> String {
    String::from_utf8(format(input.as_bytes())).expect("formatter output is utf-8")
}

#[test]
fn formats_canonically() {
    for (i, case) in CASES.iter().enumerate() {
        let actual = fmt(case.input);
        assert_eq!(
            actual,
            expected(case),
            "\n[TEST {}: {}]\n====== EXPECTED ======\n{}\n====== ACTUAL ======\n{}",
            i,
            case.description,
            expected(case),
            actual
        );
    }
}

#[test]
fn formatting_is_idempotent() {
    for case in CASES {
        let once = fmt(case.input);
        let twice = fmt(&once);
        assert_eq!(once, twice, "not idempotent: {}", case.description);
    }
}

#[test]
fn brace_normalization() {
    assert_eq!(fmt("a{\n\tb\n}\n\nc{ d\n}"), "a {\n\tb\n}\n\nc {\n\td\n}\n");
}

#[test]
fn malformed_nesting_is_tolerated() {
    assert_eq!(fmt("a\n{\n\t{\n}"), "a {\n\t{\n\t}\n");
    assert_eq!(fmt("}}}"), "}\n}\n}\n");
}

#[test]
fn blank_lines_collapse_to_one() {
    assert_eq!(fmt("a\n\n\n\n\nb"), "a\n\nb\n");
}

#[test]
fn escaped_newline_is_preserved() {
    assert_eq!(fmt("a \\\n\tb"), "a \\\n b\n");
    assert_eq!(fmt("a \\\n b"), "a \\\n b\n");
}

#[test]
fn stray_close_after_word_is_stable() {
    let once = fmt("{a }}");
    assert_eq!(once, "{a\n}\n}\n");
    assert_eq!(fmt(&once), once);
}

#[test]
fn close_then_comment_is_stable() {
    let once = fmt("}#{\t\"");
    assert_eq!(once, "}\n\n#{\t\"\n");
    assert_eq!(fmt(&once), once);
}

#[test]
fn escaped_backslash_before_closes_is_stable() {
    let once = fmt("a{\\\\ }}");
    assert_eq!(once, "a{\\\\\n}\n}\n");
    assert_eq!(fmt(&once), once);
}

/// Keys and statement texts of every block, for comparing parses.
fn outline(config: &Config) -> Vec<(Vec<String>, Vec<Vec<String>>)> {
    config
        .blocks
        .iter()
        .map(|block| {
            let segments = block
                .segments
                .iter()
                .map(|s| s.tokens().iter().map(|t| t.text.clone()).collect())
                .collect();
            (block.keys.clone(), segments)
        })
        .collect()
}

proptest! {
    #[test]
    fn formatting_twice_matches_formatting_once(input in "[ab{}#\"`\\\\ \t\n]{0,40}") {
        let once = format(input.as_bytes());
        let twice = format(&once);
        prop_assert_eq!(
            String::from_utf8_lossy(&twice),
            String::from_utf8_lossy(&once),
            "input {:?}",
            input
        );
    }

    #[test]
    fn formatting_arbitrary_bytes_is_idempotent(input in proptest::collection::vec(any::<u8>(), 0..96)) {
        let once = format(&input);
        prop_assert_eq!(format(&once), once);
    }

    #[test]
    fn formatting_preserves_the_parse(input in "[ab{}# \t\n]{0,40}") {
        if let Ok(config) = Config::parse("in", input.as_bytes()) {
            let formatted = format(input.as_bytes());
            let reparsed = Config::parse("in", &formatted);
            prop_assert!(reparsed.is_ok(), "{:?} formatted to {:?}", input, String::from_utf8_lossy(&formatted));
            if let Ok(reparsed) = reparsed {
                prop_assert_eq!(outline(&reparsed), outline(&config));
            }
        }
    }

    #[test]
    fn output_ends_with_exactly_one_newline(input in "[a-z{}#\"`\\\\ \t\n]{0,64}") {
        let out = format(input.as_bytes());
        prop_assert!(out.ends_with(b"\n"));
        prop_assert!(!out.ends_with(b"\n\n"));
    }

    #[test]
    fn arbitrary_bytes_never_panic(input in proptest::collection::vec(any::<u8>(), 0..128)) {
        let out = format(&input);
        prop_assert_eq!(out.last(), Some(&b'\n'));
    }

    #[test]
    fn quoted_span_survives(body in "[a-z{}# \t\n`]{0,24}") {
        let span = format!("\"{}\"", body);
        let out = fmt(&format!("x {{\n  a {} b\n}}", span));
        prop_assert!(out.contains(&span), "{:?} not in {:?}", span, out);
    }

    #[test]
    fn backtick_span_survives(body in "[a-z{}#\"\\\\ \t\n]{0,24}") {
        let span = format!("`{}`", body);
        let out = fmt(&format!("a {} b", span));
        prop_assert!(out.contains(&span), "{:?} not in {:?}", span, out);
    }
}
