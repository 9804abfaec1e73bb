use std::fs;
use std::path::PathBuf;

use hackvm_rs::translator::Job;
use hackvm_rs::{Bootstrap, TranslateError, TranslatorConfig};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hackvm-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn single_file_writes_sibling_asm_without_bootstrap() {
    let dir = scratch("single");
    let input = dir.join("Simple.vm");
    fs::write(&input, "push constant 1\npush constant 2\nadd\n").unwrap();

    let job = Job::plan(&input).unwrap();
    assert!(!job.multi_unit);
    assert_eq!(job.output, dir.join("Simple.asm"));

    let out = job.run(&TranslatorConfig::default()).unwrap();
    let asm = fs::read_to_string(out).unwrap();
    assert!(asm.starts_with("// push constant 1\n"));
    assert!(!asm.contains("Sys.init"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn directory_units_are_sorted_and_bootstrapped() {
    let dir = scratch("Prog");
    fs::write(dir.join("Sys.vm"), "function Sys.init 0\nlabel END\ngoto END\n").unwrap();
    fs::write(dir.join("Main.vm"), "function Main.main 0\npush static 1\nreturn\n").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let job = Job::plan(&dir).unwrap();
    assert!(job.multi_unit);
    let names: Vec<_> = job.units.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
    assert_eq!(names, vec!["Main.vm", "Sys.vm"]);
    let dir_name = dir.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(job.output, dir.join(format!("{dir_name}.asm")));

    let asm = fs::read_to_string(job.run(&TranslatorConfig::default()).unwrap()).unwrap();
    let boot = asm.find("@Sys.init").unwrap();
    let main = asm.find("(Main.main)").unwrap();
    let sys = asm.find("(Sys.init)").unwrap();
    assert!(boot < main && main < sys);
    assert!(asm.contains("@Main.1"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bootstrap_can_be_disabled_for_directories() {
    let dir = scratch("nobootstrap");
    fs::write(dir.join("A.vm"), "push constant 1\n").unwrap();
    let cfg = TranslatorConfig { bootstrap: Bootstrap::Never, ..TranslatorConfig::default() };
    let asm = fs::read_to_string(Job::plan(&dir).unwrap().run(&cfg).unwrap()).unwrap();
    assert!(!asm.contains("Sys.init"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_directory_is_an_error() {
    let dir = scratch("empty");
    assert!(matches!(Job::plan(&dir), Err(TranslateError::EmptyDirectory(_))));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn other_inputs_are_rejected() {
    let dir = scratch("other");
    let txt = dir.join("prog.txt");
    fs::write(&txt, "add").unwrap();
    assert!(matches!(Job::plan(&txt), Err(TranslateError::UnsupportedInput(_))));
    assert!(matches!(Job::plan(&dir.join("missing.vm")), Err(TranslateError::Io { .. })));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failed_run_leaves_no_output() {
    let dir = scratch("failed");
    let input = dir.join("Bad.vm");
    fs::write(&input, "push constant 1\npop constant 0\n").unwrap();
    let job = Job::plan(&input).unwrap();
    let err = job.run(&TranslatorConfig::default()).unwrap_err();
    assert!(matches!(err, TranslateError::Emit { line: 2, .. }));
    assert!(!job.output.exists());
    let _ = fs::remove_dir_all(&dir);
}
