use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

// Write some repetitive text into the temporary directory
fn make_text(temp_dir: &tempfile::TempDir,name: &str,lines: usize) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let mut txt = String::new();
    for i in 0..lines {
        txt += &format!("{}: I am Sam. Sam I am. I do not like this Sam I am.\r\n",i % 37);
    }
    let path = temp_dir.path().join(name);
    std::fs::write(&path,txt)?;
    Ok(path)
}

fn round_trip(extra_args: &[&str]) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"sam.txt",500)?;
    let cmp_path = temp_dir.path().join("sam.lzr");
    let out_path = temp_dir.path().join("sam_expanded.txt");
    Command::cargo_bin("lzrange")?
        .arg("compress")
        .args(extra_args)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed"));
    Command::cargo_bin("lzrange")?
        .arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("expanded"));
    match (std::fs::read(in_path),std::fs::read(cmp_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(c),Ok(v2)) => {
            assert!(c.len() < v1.len() / 4);
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

#[test]
fn default_round_trip() -> STDRESULT {
    round_trip(&[])
}

#[test]
fn bt2_round_trip() -> STDRESULT {
    round_trip(&["--mf","bt2","-d","12","--fast-bytes","257"])
}

#[test]
fn rejects_bad_options() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"sam.txt",10)?;
    Command::cargo_bin("lzrange")?
        .arg("compress")
        .arg("--fast-bytes").arg("300")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(temp_dir.path().join("sam.lzr"))
        .assert()
        .failure();
    Ok(())
}

#[test]
fn rejects_foreign_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"sam.txt",10)?;
    Command::cargo_bin("lzrange")?
        .arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(temp_dir.path().join("sam_expanded.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("FileFormatMismatch"));
    Ok(())
}
