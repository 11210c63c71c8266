//! End-to-end parses of realistic translation units through the public API.

use talonc::ast::StmtKind;
use talonc::{DiagnosticKind, ErrorCode, ParseOptions, Parser};

#[test]
fn parses_a_realistic_plugin() {
    let source = r#"
using __intrinsics__.Handle;

struct PluginInfo
{
    public const char[] name;
    public const char[] author;
};

public PluginInfo myinfo = { name = "tracker", author = "core" };

const int MAX_CLIENTS = 64;
const Float:TICK = 15;

enum Phase
{
    Phase_Idle,
    Phase_Active = 5,
    Phase_Done,
};

enum struct Position
{
    float x;
    float y;

    float LengthSquared() {
        return this.x * this.x + this.y * this.y;
    }
}

typedef TimerCallback = function int (int serial, float delay);

typeset EventHook
{
    function void (int client);
    function int ();
};

native float FloatAbs(float value);
forward void OnTick(int serial);

static int g_counts[MAX_CLIENTS];
int g_phase = Phase_Idle;

stock int Clamp(int value, int lo, int hi) {
    if (value < lo) return lo;
    if (value > hi) return hi;
    return value;
}

public void OnTick(int serial) {
    int total = 0;
    for (int i = 0; i < MAX_CLIENTS; i++) {
        total += g_counts[i];
    }
    switch (total) {
        case 0: g_phase = Phase_Idle;
        case 1, 2: g_phase = Phase_Active;
        default: g_phase = Phase_Done;
    }
    while (total > 0) {
        total--;
    }
}
"#;

    let mut parser = Parser::new(source);
    let tree = parser.parse_program().expect("the plugin should parse");
    assert_eq!(tree.decls.len(), 15);

    // Spot-check a few shapes.
    assert_eq!(tree.ast[tree.decls[0]].kind, StmtKind::Using);
    assert!(matches!(tree.ast[tree.decls[1]].kind, StmtKind::Pstruct(_)));
    assert!(matches!(
        tree.ast[tree.decls[5]].kind,
        StmtKind::Enum(_)
    ));
    assert!(matches!(
        tree.ast[tree.decls[6]].kind,
        StmtKind::EnumStruct(_)
    ));
    assert!(matches!(
        tree.ast[tree.decls[14]].kind,
        StmtKind::Function(_)
    ));
}

#[test]
fn reports_numbered_errors_with_positions() {
    let mut parser = Parser::new("int x = ;");
    let errors = parser.parse_program().expect_err("the parse should fail");
    assert!(errors
        .iter()
        .any(|d| d.code == ErrorCode::InvalidExpression));
    assert!(errors[0].span.line >= 1);
    assert!(errors[0].to_string().contains("error"));
}

#[test]
fn warnings_do_not_fail_the_parse() {
    let mut parser = Parser::new("void check(int a) { if (a = 1) a++; }");
    let tree = parser.parse_program().expect("warnings should not fail");
    assert_eq!(tree.decls.len(), 1);
    assert!(parser
        .diagnostics()
        .iter()
        .any(|d| d.kind == DiagnosticKind::Warning));
}

#[test]
fn semicolon_pragma_is_honored() {
    let source = "int a = 1\nint b = 2\n";

    let mut relaxed = Parser::new(source);
    assert!(relaxed.parse_program().is_ok());

    let mut strict = Parser::with_options(
        source,
        ParseOptions {
            need_semicolon: true,
            ..ParseOptions::default()
        },
    );
    assert!(strict.parse_program().is_err());
}
