//! End-to-end builds over the in-memory filesystem and the echo backend.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use thnk_adapters::{EchoBackend, MemoryFilesystem, SimpleRenderer, parser};
use thnk_core::prelude::*;

fn load(fs: &MemoryFilesystem, dialect: Dialect, source: &str) -> ThnkResult<BuildService> {
    let parser = parser::parser_for(
        dialect,
        Arc::new(SimpleRenderer::new()),
        Arc::new(fs.clone()),
        Path::new(""),
    );
    let thnkfile = Thnkfile::build(parser.parse(source)?)?;
    Ok(BuildService::new(
        thnkfile,
        Box::new(fs.clone()),
        Box::new(EchoBackend::new()),
    ))
}

#[derive(Default)]
struct Recorder {
    started: Vec<String>,
    written: Vec<String>,
}

impl ProgressObserver for Recorder {
    fn on_event(&mut self, target: &str, event: &GenerationEvent) {
        if let GenerationEvent::Started { .. } = event {
            self.started.push(target.to_string());
        }
    }

    fn on_written(&mut self, target: &str) {
        self.written.push(target.to_string());
    }
}

#[test]
fn greeting_uses_runtime_data() {
    let fs = MemoryFilesystem::new();
    let service = load(
        &fs,
        Dialect::Structured,
        r#"
        [targets.greeting]
        prompt = "Say hi to {{ name }}"
        "#,
    )
    .unwrap();

    let options = BuildOptions::default().with_runtime(Settings::new().with_data("name", "Jacob"));
    let text = service.text("greeting", &options).unwrap();
    assert_eq!(text, "Say hi to Jacob");
    assert_eq!(fs.read_file("greeting").as_deref(), Some("Say hi to Jacob"));
}

#[test]
fn json_target_with_schema_file_is_written_as_an_object() {
    let fs = MemoryFilesystem::new()
        .with_file("notes.txt", "buy milk")
        .with_file(
            "schema.json",
            r#"{"type":"object","properties":{"title":{"type":"string"},"count":{"type":"integer"}}}"#,
        );
    let service = load(
        &fs,
        Dialect::Makefile,
        "summary.json: notes.txt schema.json\n\tSummarise the notes\n",
    )
    .unwrap();

    let object = service.object("summary.json", &BuildOptions::default()).unwrap();
    assert_eq!(object, json!({"title": "", "count": 0}));
    let stored = fs.read_file("summary.json").unwrap();
    assert!(stored.contains("\n"), "objects are pretty-printed");
}

#[test]
fn diamond_builds_once_then_is_up_to_date() {
    let fs = MemoryFilesystem::new().with_file("src.txt", "seed");
    let service = load(
        &fs,
        Dialect::Makefile,
        "\
all: a.txt
a.txt: b.txt c.txt
\tCombine
b.txt: d.txt
\tLeft
c.txt: d.txt
\tRight
d.txt: src.txt
\tBase
",
    )
    .unwrap();

    let mut recorder = Recorder::default();
    let report = service
        .build(None, &BuildOptions::default(), &mut recorder)
        .unwrap();
    assert_eq!(report.target, "all");
    assert_eq!(report.generated, ["d.txt", "b.txt", "c.txt", "a.txt"]);
    assert_eq!(recorder.written, report.generated);
    assert_eq!(report.summary(), "Thgt 4 files.");

    let again = service
        .build(None, &BuildOptions::default(), &mut NoopObserver)
        .unwrap();
    assert!(again.generated.is_empty());
    assert_eq!(again.summary(), "All files thgt.");
}

#[test]
fn touching_a_source_rebuilds_only_its_dependents() {
    let fs = MemoryFilesystem::new()
        .with_file("one.txt", "1")
        .with_file("two.txt", "2");
    let service = load(
        &fs,
        Dialect::Makefile,
        "\
all: x.txt y.txt
x.txt: one.txt
\tX
y.txt: two.txt
\tY
",
    )
    .unwrap();
    service
        .build(None, &BuildOptions::default(), &mut NoopObserver)
        .unwrap();

    fs.touch("two.txt");
    let mut recorder = Recorder::default();
    let report = service
        .build(None, &BuildOptions::default(), &mut recorder)
        .unwrap();
    assert_eq!(report.generated, ["y.txt"]);
    assert_eq!(recorder.started, ["y.txt"]);
}

#[test]
fn force_rebuilds_everything_reachable() {
    let fs = MemoryFilesystem::new().with_file("in.txt", "i");
    let service = load(&fs, Dialect::Makefile, "out.txt: in.txt\n\tCopy\n").unwrap();
    service
        .build(None, &BuildOptions::default(), &mut NoopObserver)
        .unwrap();

    let report = service
        .build(None, &BuildOptions::default().forced(), &mut NoopObserver)
        .unwrap();
    assert_eq!(report.generated, ["out.txt"]);
}

#[test]
fn content_targets_never_reach_the_backend() {
    let fs = MemoryFilesystem::new();
    let service = load(
        &fs,
        Dialect::Structured,
        r##"
        [defaults]
        data = { project = "thnk" }

        [targets."README.md"]
        content = "# {{ project }}"
        "##,
    )
    .unwrap();

    let mut recorder = Recorder::default();
    service
        .build(None, &BuildOptions::default(), &mut recorder)
        .unwrap();
    assert!(recorder.started.is_empty());
    assert_eq!(fs.read_file("README.md").as_deref(), Some("# thnk"));
}

#[test]
fn nested_output_directories_are_created() {
    let fs = MemoryFilesystem::new();
    let service = load(&fs, Dialect::Makefile, "docs/guide/intro.md:\n\tWrite an intro\n").unwrap();
    service
        .build(None, &BuildOptions::default(), &mut NoopObserver)
        .unwrap();
    assert_eq!(
        fs.read_file("docs/guide/intro.md").as_deref(),
        Some("Write an intro")
    );
}

#[test]
fn prompt_in_file_and_recipe_is_rejected() {
    let fs = MemoryFilesystem::new().with_file("out.prompt.md", "From the file");
    let err = load(
        &fs,
        Dialect::Makefile,
        "out.md: out.prompt.md\n\tFrom the recipe\n",
    )
    .err()
    .unwrap();
    assert!(
        err.to_string()
            .contains("Cannot have prompt both in file and in Thnkfile"),
        "{err}"
    );
}

#[test]
fn failure_halts_the_build_but_keeps_earlier_outputs() {
    let fs = MemoryFilesystem::new().with_file("schema.json", "{broken");
    let service = load(
        &fs,
        Dialect::Makefile,
        "\
all: first.txt second.json
first.txt:
\tFirst
second.json: schema.json
\tSecond
",
    )
    .unwrap();

    let err = service
        .build(None, &BuildOptions::default(), &mut NoopObserver)
        .unwrap_err();
    assert_eq!(err.target(), Some("second.json"));
    assert!(fs.read_file("first.txt").is_some());
    assert!(fs.read_file("second.json").is_none());
}

#[test]
fn greeting_feeds_a_structured_summary() {
    let fs = MemoryFilesystem::new();
    let service = load(
        &fs,
        Dialect::Structured,
        r#"
        [targets.greeting]
        prompt = "Say hi to {{name}}"
        data = { name = "Jacob" }

        [targets."summary.json"]
        needs = ["greeting"]
        prompt = "Summarise the greeting"
        schema = { type = "object" }
        "#,
    )
    .unwrap();

    let plan = service.plan(Some("summary.json"), false).unwrap();
    assert_eq!(plan.names(), ["greeting", "summary.json"]);

    let dispatch = DispatchService::new(service.thnkfile(), service.filesystem());
    let greeting = service.thnkfile().rule("greeting").unwrap();
    match dispatch.generation(greeting, None).unwrap() {
        Generation::Request(request) => {
            assert_eq!(request.mode, OutputMode::Text);
            assert_eq!(request.prompt, "Say hi to Jacob");
        }
        other => panic!("expected a request, got {other:?}"),
    }

    let report = service
        .build(Some("summary.json"), &BuildOptions::default(), &mut NoopObserver)
        .unwrap();
    assert_eq!(report.generated, ["greeting", "summary.json"]);
    assert_eq!(fs.read_file("greeting").as_deref(), Some("Say hi to Jacob"));

    // The summary request carries the freshly generated greeting.
    let summary = service.thnkfile().rule("summary.json").unwrap();
    match dispatch.generation(summary, None).unwrap() {
        Generation::Request(request) => {
            assert_eq!(request.mode, OutputMode::Object);
            assert!(
                request.system.contains("greeting:\n```\nSay hi to Jacob\n```"),
                "{}",
                request.system
            );
        }
        other => panic!("expected a request, got {other:?}"),
    }

    let again = service
        .build(Some("summary.json"), &BuildOptions::default(), &mut NoopObserver)
        .unwrap();
    assert!(again.generated.is_empty());
    assert!(service.plan(Some("summary.json"), false).unwrap().is_empty());
}
