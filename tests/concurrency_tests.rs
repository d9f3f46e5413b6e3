//! Concurrent uploads and previews over one content directory

use std::sync::Arc;
use std::thread;

use filedock::{Filedock, FiledockConfig, PreviewRequest, UploadBatch, UploadPart};

fn shared_dock() -> (tempfile::TempDir, Arc<Filedock>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = FiledockConfig::default().with_content_dir(dir.path());
    let dock = Filedock::init(&config).expect("init");
    (dir, Arc::new(dock))
}

fn single(label: &str, filename: String, content: String) -> UploadBatch {
    UploadBatch::new()
        .with_part(UploadPart::new(label, Some(filename), content))
        .expect("part")
}

#[test]
fn concurrent_uploads_of_distinct_names_all_land() {
    let (dir, dock) = shared_dock();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let dock = Arc::clone(&dock);
            thread::spawn(move || {
                let content = format!("id,value\n{i},{}\n", i * 10);
                dock.upload(single("csv", format!("part {i}.csv"), content))
                    .expect("upload")
            })
        })
        .collect();

    for handle in handles {
        let saved = handle.join().expect("thread");
        let name = &saved["csv"].stored_name;
        let result = dock.preview(&PreviewRequest::new(name.clone())).expect("preview");
        assert_eq!(result.headers, vec!["id", "value"]);
        assert_eq!(result.row_count, 1);
    }

    let files = std::fs::read_dir(dir.path()).expect("read_dir").count();
    assert_eq!(files, 16);
}

#[test]
fn racing_uploads_to_one_name_leave_one_complete_file() {
    let (dir, dock) = shared_dock();
    let contents: Vec<String> = (0..8)
        .map(|i| format!("writer,n\n{}\n", format!("{i},{i}\n").repeat(2_000)))
        .collect();

    let handles: Vec<_> = contents
        .iter()
        .cloned()
        .map(|content| {
            let dock = Arc::clone(&dock);
            thread::spawn(move || {
                dock.upload(single("csv", "same.csv".into(), content))
                    .expect("upload")
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let on_disk = String::from_utf8(dock.store().read("csv__same.csv").expect("read")).expect("utf8");
    assert!(contents.contains(&on_disk), "file holds a mix of writers");

    // No temp files are left behind.
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["csv__same.csv".to_string()]);
}

#[test]
fn previews_run_in_parallel_with_uploads() {
    let (_dir, dock) = shared_dock();
    dock.upload(single("csv", "base.csv".into(), "a;b\n1;2\n".into()))
        .expect("seed");

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let dock = Arc::clone(&dock);
            thread::spawn(move || {
                for _ in 0..20 {
                    let result = dock
                        .preview(&PreviewRequest::new("csv__base.csv"))
                        .expect("preview");
                    assert_eq!(result.delimiter, ';');
                }
            })
        })
        .collect();

    let writer = {
        let dock = Arc::clone(&dock);
        thread::spawn(move || {
            for i in 0..20 {
                dock.upload(single("spec", format!("doc{i}.md"), "# doc\n".into()))
                    .expect("upload");
            }
        })
    };

    for handle in readers {
        handle.join().expect("reader");
    }
    writer.join().expect("writer");
}
