use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EVENT_LOG: &str = r#"{"Event":"SparkListenerLogStart","Spark Version":"3.5.0"}
{"Event":"SparkListenerApplicationStart","App Name":"Spark shell","App ID":"local-1","Timestamp":1000,"User":"alice"}
{"Event":"SparkListenerJobStart","Job ID":0,"Submission Time":1010,"Stage Infos":[{"Stage ID":0,"Stage Attempt ID":0}]}
{"Event":"SparkListenerStageSubmitted","Stage Info":{"Stage ID":7,"Stage Attempt ID":0,"Stage Name":"X","Number of Tasks":3,"RDD Info":[{"RDD ID":1,"Name":"a;b"}],"Submission Time":1011}}
{"Event":"SparkListenerTaskStart","Stage ID":7,"Stage Attempt ID":0,"Task Info":{"Task ID":1,"Index":0,"Attempt":0,"Executor ID":"driver","Host":"first-host","Launch Time":1012}}
{"Event":"SparkListenerTaskEnd","Stage ID":7,"Stage Attempt ID":0,"Task Type":"ResultTask","Task End Reason":{"Reason":"Success"},"Task Info":{"Task ID":1,"Index":0,"Attempt":0,"Executor ID":"driver","Host":"second-host","Launch Time":1012,"Finish Time":1020,"Failed":false}}
{"Event":"SparkListenerStageCompleted","Stage Info":{"Stage ID":7,"Stage Attempt ID":0,"Stage Name":"X","Number of Tasks":3,"Completion Time":1021}}
{"Event":"SparkListenerJobEnd","Job ID":0,"Completion Time":1022,"Job Result":{"Result":"JobSucceeded"}}
{"Event":"SparkListenerFooBar"}
"#;

struct Fixture {
    _temp_dir: TempDir,
    input: PathBuf,
}

impl Fixture {
    fn new(name: &str, contents: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let input = temp_dir.path().join(name);
        fs::write(&input, contents).expect("Failed to write event log");
        Self {
            _temp_dir: temp_dir,
            input,
        }
    }

    fn dir(&self) -> &Path {
        self.input.parent().unwrap()
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("eventlog2csv");
        cmd.arg(&self.input);
        cmd
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir().join(name))
            .unwrap_or_else(|e| panic!("Failed to read {name}: {e}"))
    }
}

fn records(text: &str, delimiter: u8) -> Vec<csv::StringRecord> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
        .records()
        .collect::<Result<_, _>>()
        .expect("output should be valid CSV")
}

#[test]
fn test_fixed_mode_writes_four_files() {
    let fixture = Fixture::new("app.json", EVENT_LOG);

    fixture
        .command()
        .assert()
        .success()
        .stdout(predicate::str::contains("successfully completed"));

    let passthrough = fixture.read("app.csv");
    let lines: Vec<&str> = passthrough.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "LogStart;Spark Version: 3.5.0");
    assert_eq!(lines[1], "ApplicationStart;Spark shell;local-1;alice;Timestamp: 1000");
    assert_eq!(lines[3], "StageSubmitted;7");
    assert_eq!(lines[8], "FooBar");

    let jobs = records(&fixture.read("app_jobs_.csv"), b';');
    assert_eq!(jobs.len(), 2);
    assert_eq!(&jobs[0][0], "Event");
    assert_eq!(&jobs[1][1], "0");
    assert_eq!(&jobs[1][2], "(0, 0)");
    assert_eq!(&jobs[1][3], "1010");
    assert_eq!(&jobs[1][4], "1022");
    assert_eq!(&jobs[1][5], "JobSucceeded");
}

#[test]
fn test_fixed_mode_merges_stage_once() {
    let fixture = Fixture::new("app.json", EVENT_LOG);
    fixture.command().assert().success();

    let stages = records(&fixture.read("app_stages_.csv"), b';');
    assert_eq!(stages.len(), 2, "header plus one row for stage 7");

    let row = &stages[1];
    assert_eq!(&row[0], "StageCompleted");
    assert_eq!(&row[1], "7");
    assert_eq!(&row[3], "X");
    assert_eq!(&row[4], "3");
    assert_eq!(&row[5], r#"[{"RDD ID":1,"Name":"a;b"}]"#);
    assert_eq!(&row[7], "1021");
}

#[test]
fn test_fixed_mode_task_reflects_end_event() {
    let fixture = Fixture::new("app.json", EVENT_LOG);
    fixture.command().assert().success();

    let tasks = records(&fixture.read("app_tasks_.csv"), b';');
    assert_eq!(tasks.len(), 2);

    let row = &tasks[1];
    assert_eq!(&row[0], "TaskEnd");
    assert_eq!(&row[5], "second-host");
    assert_eq!(&row[8], "1020");
    assert_eq!(&row[9], "false");
    assert_eq!(&row[10], "ResultTask");
    assert_eq!(&row[11], "Success");
}

#[test]
fn test_orphan_end_fails_unless_lenient() {
    let log = r#"{"Event":"SparkListenerJobEnd","Job ID":42,"Completion Time":1,"Job Result":{"Result":"JobSucceeded"}}
"#;
    let fixture = Fixture::new("orphan.json", log);

    fixture
        .command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("job 42 completed without a matching start event"));

    fixture
        .command()
        .args(["--pairing", "lenient"])
        .assert()
        .success();
    let jobs = records(&fixture.read("orphan_jobs_.csv"), b';');
    assert_eq!(&jobs[1][1], "42");
}

#[test]
fn test_malformed_line_fails() {
    let fixture = Fixture::new("bad.json", "{\"Event\":\"SparkListenerLogStart\"}\nnot json\n");

    fixture
        .command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_missing_input_fails() {
    let mut cmd = cargo_bin_cmd!("eventlog2csv");
    cmd.arg("/nonexistent/eventlog.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open input file"));
}

#[test]
fn test_generic_mode_discovers_columns() {
    let log = r#"{"Event":"A","x":1,"info":{"host":"h1"}}
{"Event":"B","y":"two","info":{"port":80}}
"#;
    let fixture = Fixture::new("generic.json", log);

    fixture
        .command()
        .args(["--mode", "generic", "--delimiter", ","])
        .assert()
        .success();

    assert_eq!(
        fixture.read("generic.csv"),
        "Event,x,info.host,y,info.port\nA,1,h1,,\nB,,,two,80\n"
    );
    assert!(!fixture.dir().join("generic_jobs_.csv").exists());
}

#[test]
fn test_generic_mode_flattens_arrays() {
    let fixture = Fixture::new("arrays.json", "{\"a\":[{\"b\":1},{\"b\":2}]}\n");

    fixture
        .command()
        .args(["--mode", "generic", "--flatten-arrays"])
        .assert()
        .success();

    assert_eq!(fixture.read("arrays.csv"), "a.0.b;a.1.b\n1;2\n");
}

#[test]
fn test_generic_mode_is_repeatable() {
    let fixture = Fixture::new("app.json", EVENT_LOG);

    fixture.command().args(["--mode", "generic"]).assert().success();
    let first = fixture.read("app.csv");
    fixture.command().args(["--mode", "generic"]).assert().success();
    let second = fixture.read("app.csv");

    assert_eq!(first, second);
    let rows = records(&first, b';');
    let width = rows[0].len();
    assert!(rows.iter().all(|r| r.len() == width));
}

#[test]
fn test_name_without_json_suffix() {
    let fixture = Fixture::new("eventlog", "{\"Event\":\"SparkListenerApplicationEnd\",\"Timestamp\":5}\n");
    fixture.command().assert().success();

    assert_eq!(fixture.read("eventlog.csv"), "ApplicationEnd;Timestamp: 5\n");
    assert!(fixture.dir().join("eventlog_tasks_.csv").exists());
}

#[test]
fn test_help_describes_every_option() {
    let mut cmd = cargo_bin_cmd!("eventlog2csv");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Log verbosity"))
        .stdout(predicate::str::contains("Handling of end events"));
}
