//! End-to-end rewrites through the public library API.
#![allow(clippy::unwrap_used)]

use auto_deprecator::annotation::SourceForm;
use auto_deprecator::{rewrite_source, DeprecateError, RewriteContext, Version};

fn rewrite(source: &str, current: &str) -> auto_deprecator::Rewrite {
    rewrite_source(source, &RewriteContext::new(Version::new(current))).unwrap()
}

// =============================================================================
// Functions
// =============================================================================

const IMPORT_STATEMENT: &str = "from auto_deprecator import deprecate";

const NORMAL_FUNCTION: &str = "


def normal_function():
    pass";

const DEPRECATE_FUNCTION_2_0_0: &str = "


@deprecate(expiry=\"2.0.0\", current=\"2.1.0\")
def deprecate_version_2_0_0():
    pass";

const DEPRECATE_FUNCTION_2_1_0: &str = "


@deprecate(expiry=\"2.1.0\", current=\"2.1.0\")
def deprecate_version_2_1_0():
    pass";

const DEPRECATE_FUNCTION_2_2_0: &str = "


@deprecate(expiry=\"2.2.0\", current=\"2.1.0\")
def deprecate_version_2_2_0():
    pass";

fn function_file() -> String {
    [
        IMPORT_STATEMENT,
        NORMAL_FUNCTION,
        DEPRECATE_FUNCTION_2_0_0,
        DEPRECATE_FUNCTION_2_1_0,
        DEPRECATE_FUNCTION_2_2_0,
    ]
    .concat()
}

#[test]
fn test_functions_at_2_1_0_keep_expiring() {
    let result = rewrite(&function_file(), "2.1.0");
    assert_eq!(
        result.text,
        [
            IMPORT_STATEMENT,
            NORMAL_FUNCTION,
            DEPRECATE_FUNCTION_2_1_0,
            DEPRECATE_FUNCTION_2_2_0
        ]
        .concat()
    );
    assert_eq!(result.expiring.len(), 1);
    assert_eq!(result.expiring[0].name, "deprecate_version_2_1_0");
}

#[test]
fn test_functions_past_2_1_0() {
    let result = rewrite(&function_file(), "2.1.1");
    assert_eq!(
        result.text,
        [IMPORT_STATEMENT, NORMAL_FUNCTION, DEPRECATE_FUNCTION_2_2_0].concat()
    );
    assert!(!result.import_retracted);
}

#[test]
fn test_all_functions_expired_retracts_import() {
    let result = rewrite(&function_file(), "3.0.0");
    assert_eq!(result.text, NORMAL_FUNCTION.trim_start());
    assert!(result.import_retracted);
    assert_eq!(result.removed.len(), 3);
}

#[test]
fn test_comment_marker_with_shebang() {
    let shebang = "#!/bin/python";
    let deprecated = "


def deprecate_version_2_0_0():
    # auto-deprecate: expiry=2.0.0
    pass";
    let source = [shebang, NORMAL_FUNCTION, deprecated].concat();

    let result = rewrite(&source, "2.1.0");
    assert_eq!(result.text, [shebang, NORMAL_FUNCTION].concat());
    assert_eq!(result.removed[0].form, SourceForm::CommentBased);
}

#[test]
fn test_async_function() {
    let source = "\
import asyncio


@deprecate('1.0')
async def fetch():
    await asyncio.sleep(0)


async def fetch_v2():
    await asyncio.sleep(0)
";
    let result = rewrite(source, "1.1");
    assert_eq!(
        result.text,
        "import asyncio


async def fetch_v2():
    await asyncio.sleep(0)
"
    );
}

#[test]
fn test_marker_text_inside_string_is_not_a_marker() {
    let source = "\
def documented():
    \"\"\"
    # auto-deprecate: expiry=1.0
    \"\"\"
    return 1
";
    let result = rewrite(source, "5.0");
    assert!(!result.changed);
    assert!(result.removed.is_empty());
}

// =============================================================================
// Classes
// =============================================================================

const CLASS_IMPORT: &str = "from auto_deprecator import deprecate\n\n\n";

const CLASS_DECLARATION: &str = "class DummyClass:";

const INIT_METHOD: &str = "

    def __init__(self):
        pass";

const DEPRECATE_2_0_0: &str = "

    @deprecate(expiry=\"2.0.0\", current=\"2.1.0\")
    def deprecate_version_2_0_0(self):
        pass";

const DEPRECATE_2_1_0: &str = "

    @deprecate(expiry=\"2.1.0\", current=\"2.1.0\")
    def deprecate_version_2_1_0(self):
        pass";

const DEPRECATE_2_2_0: &str = "

    @deprecate(expiry=\"2.2.0\", current=\"2.1.0\")
    def deprecate_version_2_2_0(self):
        pass";

const INNER_CLASS: &str = "

    class DummyClass2:
        @deprecate(expiry=\"2.3.0\", current=\"2.1.0\")
        def deprecate_version_2_3_0(self):
            pass";

fn class_file() -> String {
    [
        CLASS_IMPORT,
        CLASS_DECLARATION,
        INIT_METHOD,
        DEPRECATE_2_0_0,
        DEPRECATE_2_1_0,
        DEPRECATE_2_2_0,
        INNER_CLASS,
    ]
    .concat()
}

#[test]
fn test_class_methods_at_2_2_0() {
    let result = rewrite(&class_file(), "2.2.0");
    assert_eq!(
        result.text,
        [
            CLASS_IMPORT,
            CLASS_DECLARATION,
            INIT_METHOD,
            DEPRECATE_2_2_0,
            INNER_CLASS
        ]
        .concat()
    );
    let names: Vec<&str> = result.removed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "DummyClass.deprecate_version_2_0_0",
            "DummyClass.deprecate_version_2_1_0"
        ]
    );
}

#[test]
fn test_inner_class_collapses_after_2_3_0() {
    let result = rewrite(&class_file(), "2.3.1");
    assert_eq!(result.text, [CLASS_DECLARATION, INIT_METHOD].concat());
    assert_eq!(result.collapsed, vec!["DummyClass.DummyClass2".to_owned()]);
    assert!(result.import_retracted);
}

#[test]
fn test_second_pass_is_a_no_op() {
    for current in ["2.0.0", "2.1.5", "2.2.1", "9.9.9"] {
        let first = rewrite(&class_file(), current);
        let second = rewrite(&first.text, current);
        assert!(!second.changed, "second pass changed the file at {current}");
        assert_eq!(second.text, first.text);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_two_decorators_on_one_method() {
    let source = "\
class A:
    @deprecate('1.0')
    @deprecate('2.0')
    def twice(self):
        pass
";
    let err = rewrite_source(source, &RewriteContext::new(Version::new("3.0"))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "More than one deprecate decorator is found in \"twice\" (line 4)"
    );
}

#[test]
fn test_comment_marker_without_expiry() {
    let source = "def f():\n    # auto-deprecate: soon\n    pass\n";
    let err = rewrite_source(source, &RewriteContext::new(Version::new("3.0"))).unwrap_err();
    assert!(matches!(err, DeprecateError::MalformedAnnotation { line: 2, .. }));
}

#[test]
fn test_custom_marker_and_helper_module() {
    let source = "\
from mypkg.compat import retire


@retire('1.0')
def old():
    pass


@deprecate('1.0')
def untouched():
    pass
";
    let ctx = RewriteContext {
        current: Version::new("2.0"),
        marker: "retire".to_owned(),
        helper_module: "mypkg.compat".to_owned(),
    };
    let result = rewrite_source(source, &ctx).unwrap();
    assert_eq!(
        result.text,
        "@deprecate('1.0')\ndef untouched():\n    pass\n"
    );
}
