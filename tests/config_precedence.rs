use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

const CHECKLIST: &str = "id;Status\ncontent-h1;offen\n";
const PAGE: &str = "<html><body><h1>Willkommen</h1></body></html>";

fn base_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_seocheck"));
    cmd.current_dir(dir);
    for key in [
        "SEOCHECK_CONFIG",
        "SEOCHECK_CHECKLIST",
        "SEOCHECK_CHECKLIST_OUT",
        "SEOCHECK_SUGGESTIONS",
        "SEOCHECK_FETCH_TIMEOUT",
        "SEOCHECK_TEXT_MAX_CHARS",
        "SEOCHECK_SUGGEST_ENABLED",
        "SEOCHECK_SUGGEST_MODEL",
        "SEOCHECK_SUGGEST_API_BASE",
        "SEOCHECK_LOGS_ENABLED",
        "SEOCHECK_LOGS_DIR",
        "SEOCHECK_UI_COLOR",
        "OPENAI_API_KEY",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn make_temp_dir() -> PathBuf {
    static DIR_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("seocheck-config-test-{}-{seq}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create dir");
    dir
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdirs");
    }
    std::fs::write(path, bytes).expect("write");
}

fn serve_page() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}/", listener.local_addr().expect("addr"));
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{PAGE}",
                PAGE.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    url
}

#[test]
fn default_config_file_in_working_dir_sets_paths() {
    let dir = make_temp_dir();
    write_file(&dir.join("input/liste.csv"), CHECKLIST.as_bytes());
    write_file(
        &dir.join("seocheck.toml"),
        br#"
[paths]
checklist = "input/liste.csv"
checklist_out = "output/liste.csv"
suggestions = "output/vorschlaege.txt"

[logs]
enabled = false
"#,
    );

    let url = serve_page();
    let out = base_cmd(&dir).args(["--quiet", &url]).output().expect("run seocheck");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let updated = std::fs::read_to_string(dir.join("output/liste.csv")).expect("read");
    assert_eq!(updated, "\"id\";\"Status\"\r\n\"content-h1\";\"erledigt\"\r\n");
    assert!(dir.join("output/vorschlaege.txt").exists());
    assert!(!dir.join("docs").exists());
    assert!(!dir.join(".seocheck").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn env_overrides_config_file() {
    let dir = make_temp_dir();
    write_file(&dir.join("input/liste.csv"), CHECKLIST.as_bytes());
    write_file(
        &dir.join("seocheck.toml"),
        br#"
[paths]
checklist = "input/liste.csv"
checklist_out = "output/liste.csv"
"#,
    );

    let url = serve_page();
    let out = base_cmd(&dir)
        .env("SEOCHECK_CHECKLIST_OUT", "env/liste.csv")
        .env("SEOCHECK_LOGS_DIR", "env/logs")
        .args(["--quiet", &url])
        .output()
        .expect("run seocheck");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    assert!(dir.join("env/liste.csv").exists());
    assert!(!dir.join("output/liste.csv").exists());
    let logs = std::fs::read_dir(dir.join("env/logs")).expect("logs dir").count();
    assert_eq!(logs, 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn config_flag_beats_config_env() {
    let dir = make_temp_dir();
    write_file(&dir.join("docs/checklist.csv"), CHECKLIST.as_bytes());
    write_file(
        &dir.join("flag.toml"),
        b"[paths]\nchecklist_out = \"flag/liste.csv\"\n[logs]\nenabled = false\n",
    );
    write_file(
        &dir.join("env.toml"),
        b"[paths]\nchecklist_out = \"env/liste.csv\"\n[logs]\nenabled = false\n",
    );

    let url = serve_page();
    let out = base_cmd(&dir)
        .env("SEOCHECK_CONFIG", "env.toml")
        .args(["--quiet", "--config", "flag.toml", &url])
        .output()
        .expect("run seocheck");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.join("flag/liste.csv").exists());
    assert!(!dir.join("env").exists());

    let url = serve_page();
    let out = base_cmd(&dir)
        .env("SEOCHECK_CONFIG", "env.toml")
        .args(["--quiet", &url])
        .output()
        .expect("run seocheck");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.join("env/liste.csv").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn disabled_suggestions_skip_the_service_even_with_a_key() {
    let dir = make_temp_dir();
    write_file(&dir.join("docs/checklist.csv"), CHECKLIST.as_bytes());
    write_file(&dir.join("seocheck.toml"), b"[suggest]\nenabled = false\n");

    let url = serve_page();
    let out = base_cmd(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .env("SEOCHECK_SUGGEST_API_BASE", "http://127.0.0.1:9/v1")
        .arg(&url)
        .output()
        .expect("run seocheck");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Vorschläge sind in der Konfiguration deaktiviert.\nKeine Vorschläge erzeugt.\n"),
        "{stdout}"
    );
    assert_eq!(
        std::fs::read_to_string(dir.join("vorschlaege.txt")).expect("read"),
        "Keine Vorschläge verfügbar."
    );

    let _ = std::fs::remove_dir_all(&dir);
}
