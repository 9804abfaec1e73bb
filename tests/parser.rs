use hackvm_rs::command::ContractViolation;
use hackvm_rs::parser::parse_command;
use hackvm_rs::{ArithOp, Command, CommandKind, ParseError, Parser, Segment, TranslateError};

#[test]
fn classifies_every_command_form() {
    let src = "\
push constant 7
pop local 2
add
label LOOP
goto LOOP
if-goto LOOP
function Main.f 3
call Main.f 2
return
";
    let kinds: Vec<CommandKind> = Parser::new("Main", src).map(|c| c.unwrap().kind()).collect();
    assert_eq!(
        kinds,
        vec![
            CommandKind::Push,
            CommandKind::Pop,
            CommandKind::Arithmetic,
            CommandKind::Label,
            CommandKind::Goto,
            CommandKind::IfGoto,
            CommandKind::Function,
            CommandKind::Call,
            CommandKind::Return,
        ]
    );
}

#[test]
fn arguments_by_kind() {
    let cmd = parse_command("push constant 7").unwrap();
    assert_eq!(cmd, Command::Push { segment: Segment::Constant, index: 7 });
    assert_eq!(cmd.arg1().unwrap(), "constant");
    assert_eq!(cmd.arg2().unwrap(), 7);

    let cmd = parse_command("function Main.f 3").unwrap();
    assert_eq!(cmd.arg1().unwrap(), "Main.f");
    assert_eq!(cmd.arg2().unwrap(), 3);

    let cmd = parse_command("sub").unwrap();
    assert_eq!(cmd, Command::Arithmetic(ArithOp::Sub));
    assert_eq!(cmd.arg1().unwrap(), "sub");
    assert_eq!(cmd.arg2(), Err(ContractViolation { kind: "arithmetic", arg: "arg2" }));

    assert!(parse_command("return").unwrap().arg1().is_err());
    assert!(parse_command("goto X").unwrap().arg2().is_err());
}

#[test]
fn tolerates_extra_whitespace_and_trailing_comments() {
    let mut p = Parser::new("Main", "   push   local\t3   // three\n");
    let cmd = p.advance().unwrap().unwrap();
    assert_eq!(cmd, Command::Push { segment: Segment::Local, index: 3 });
    assert!(!p.has_more_commands());
    assert!(p.advance().is_none());
}

#[test]
fn comment_only_source_is_empty() {
    let p = Parser::new("Main", "// nothing\n\n   // here\n");
    assert!(p.is_empty());
    assert!(!p.has_more_commands());
}

#[test]
fn errors_name_unit_and_line() {
    let mut p = Parser::new("Main", "push constant 1\n\n// c\nfrobnicate\n");
    assert!(p.advance().unwrap().is_ok());
    match p.advance().unwrap() {
        Err(TranslateError::Parse { unit, line, text, source }) => {
            assert_eq!(unit, "Main");
            assert_eq!(line, 4);
            assert_eq!(text, "frobnicate");
            assert!(matches!(source, ParseError::UnknownCommand(_)));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn malformed_lines() {
    assert!(matches!(parse_command("push heap 1"), Err(ParseError::UnknownSegment(_))));
    assert!(matches!(parse_command("push constant"), Err(ParseError::Arity { expected: 2, found: 1, .. })));
    assert!(matches!(parse_command("add 1"), Err(ParseError::Arity { keyword: "add", .. })));
    assert!(matches!(parse_command("return now"), Err(ParseError::Arity { .. })));
    assert!(matches!(parse_command("push constant -1"), Err(ParseError::BadInteger(_))));
    assert!(matches!(parse_command("call Main.f x"), Err(ParseError::BadInteger(_))));
    assert!(matches!(parse_command("Push constant 1"), Err(ParseError::UnknownCommand(_))));
}

#[test]
fn seek_and_reset_replay_commands() {
    let mut p = Parser::new("Main", "push constant 1\npush constant 2\nadd\n");
    assert_eq!(p.len(), 3);
    p.advance();
    p.advance();
    assert_eq!(p.position(), 2);
    assert_eq!(p.current_line().unwrap().text, "push constant 2");

    p.seek(1);
    let again = p.advance().unwrap().unwrap();
    assert_eq!(again, Command::Push { segment: Segment::Constant, index: 2 });

    p.reset();
    assert_eq!(p.position(), 0);
    assert!(p.current_line().is_none());
    assert_eq!(p.count(), 3);
}

#[test]
fn display_reproduces_source_text() {
    for line in ["push argument 1", "pop that 5", "if-goto END", "call Foo.bar 2", "return", "neg"] {
        assert_eq!(parse_command(line).unwrap().to_string(), line);
    }
}
