//! Built-in language tables.

use crate::{Attribute, CommentConfig, KeywordSet, Language, LanguageMode, MarkupTables};

const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "break", "case", "catch", "class", "continue", "default", "do",
    "else", "enum", "extends", "final", "finally", "for", "if", "implements", "import",
    "instanceof", "interface", "native", "new", "package", "private", "protected", "public",
    "return", "static", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "volatile", "while", "true", "false", "null",
];

const JAVA_TYPES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void", "var",
    "String", "Object", "Integer", "Long", "Double", "Boolean", "Character", "System",
    "List", "Map", "Set", "ArrayList", "HashMap", "Exception",
];

const C_RESERVED: &[&str] = &[
    "auto", "break", "case", "const", "continue", "default", "do", "else", "enum", "extern",
    "for", "goto", "if", "inline", "register", "restrict", "return", "sizeof", "static",
    "struct", "switch", "typedef", "union", "volatile", "while", "NULL",
];

const C_TYPES: &[&str] = &[
    "char", "double", "float", "int", "long", "short", "signed", "unsigned", "void",
    "size_t", "bool", "FILE", "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t",
    "uint16_t", "uint32_t", "uint64_t",
];

const CPP_RESERVED: &[&str] = &[
    "auto", "break", "case", "catch", "class", "const", "constexpr", "continue", "default",
    "delete", "do", "else", "enum", "explicit", "extern", "for", "friend", "goto", "if",
    "inline", "mutable", "namespace", "new", "noexcept", "nullptr", "operator", "private",
    "protected", "public", "return", "sizeof", "static", "struct", "switch", "template",
    "this", "throw", "try", "typedef", "typename", "union", "using", "virtual", "volatile",
    "while", "true", "false",
];

const CPP_TYPES: &[&str] = &[
    "bool", "char", "double", "float", "int", "long", "short", "signed", "unsigned", "void",
    "size_t", "string", "vector", "map", "std",
];

const JS_RESERVED: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "return", "super", "switch", "this",
    "throw", "try", "typeof", "var", "void", "while", "with", "yield", "true", "false",
    "null", "undefined",
];

const JS_BUILTINS: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "JSON", "Map", "Math", "Number", "Object", "Promise",
    "RegExp", "Set", "String", "Symbol", "console", "document", "window",
];

const PYTHON_RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield", "True", "False", "None",
];

const PYTHON_BUILTINS: &[&str] = &[
    "bool", "bytes", "dict", "float", "int", "len", "list", "object", "print", "range",
    "self", "set", "str", "super", "tuple", "type",
];

const SHELL_RESERVED: &[&str] = &[
    "case", "do", "done", "elif", "else", "esac", "fi", "for", "function", "if", "in",
    "select", "then", "until", "while",
];

const SHELL_BUILTINS: &[&str] = &[
    "cd", "echo", "eval", "exec", "exit", "export", "local", "printf", "read", "readonly",
    "return", "set", "shift", "source", "test", "trap", "unset",
];

const HTML_TAGS: &[&str] = &[
    "a", "body", "br", "button", "div", "em", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "img", "input", "label", "li", "link", "meta",
    "nav", "ol", "option", "p", "pre", "script", "section", "select", "span", "strong",
    "style", "table", "tbody", "td", "textarea", "th", "thead", "title", "tr", "ul",
];

const HTML_ATTRIBUTES: &[&str] = &[
    "action", "alt", "charset", "class", "content", "disabled", "for", "height", "href", "id",
    "lang", "method", "name", "placeholder", "rel", "src", "style", "target", "title", "type",
    "value", "width",
];

pub(crate) fn mode(language: Language) -> LanguageMode {
    let plain = LanguageMode {
        language,
        keyword_sets: Vec::new(),
        comments: CommentConfig::none(),
        string_delimiters: Vec::new(),
        triple_quotes: Vec::new(),
        escape: '\\',
        uses_curly_brackets: false,
        variable_sigil: None,
        markup: None,
    };

    match language {
        Language::PlainText => plain,
        Language::Java => c_family(plain, JAVA_RESERVED, JAVA_TYPES),
        Language::C => c_family(plain, C_RESERVED, C_TYPES),
        Language::Cpp => c_family(plain, CPP_RESERVED, CPP_TYPES),
        Language::JavaScript => LanguageMode {
            string_delimiters: vec!['"', '\'', '`'],
            ..c_family(plain, JS_RESERVED, JS_BUILTINS)
        },
        Language::Python => LanguageMode {
            keyword_sets: keyword_sets(PYTHON_RESERVED, PYTHON_BUILTINS),
            comments: CommentConfig::line("#"),
            string_delimiters: vec!['"', '\''],
            triple_quotes: vec!["\"\"\"".to_string(), "'''".to_string()],
            ..plain
        },
        Language::Shell => LanguageMode {
            keyword_sets: keyword_sets(SHELL_RESERVED, SHELL_BUILTINS),
            comments: CommentConfig::line("#"),
            string_delimiters: vec!['"', '\''],
            variable_sigil: Some('$'),
            ..plain
        },
        Language::Html => LanguageMode {
            comments: CommentConfig::block("<!--", "-->"),
            string_delimiters: vec!['"', '\''],
            markup: Some(MarkupTables {
                tag_names: HTML_TAGS,
                attribute_names: HTML_ATTRIBUTES,
                case_insensitive: true,
                any_name: false,
            }),
            ..plain
        },
        Language::Xml => LanguageMode {
            comments: CommentConfig::block("<!--", "-->"),
            string_delimiters: vec!['"', '\''],
            markup: Some(MarkupTables {
                tag_names: &[],
                attribute_names: &[],
                case_insensitive: false,
                any_name: true,
            }),
            ..plain
        },
    }
}

fn c_family(
    base: LanguageMode,
    reserved: &'static [&'static str],
    types: &'static [&'static str],
) -> LanguageMode {
    LanguageMode {
        keyword_sets: keyword_sets(reserved, types),
        comments: CommentConfig::line_and_block("//", "/*", "*/"),
        string_delimiters: vec!['"', '\''],
        uses_curly_brackets: true,
        ..base
    }
}

fn keyword_sets(
    reserved: &'static [&'static str],
    types: &'static [&'static str],
) -> Vec<KeywordSet> {
    vec![
        KeywordSet {
            attribute: Attribute::KeywordRed,
            words: reserved,
        },
        KeywordSet {
            attribute: Attribute::KeywordBlue,
            words: types,
        },
    ]
}
