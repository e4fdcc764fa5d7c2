use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

use edcards::{CardStore, NewCard};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("cards.db")
    }

    fn home(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("edcards").unwrap();
        cmd.current_dir(self.home())
            .env("HOME", self.home())
            .env("EDCARDS_DATABASE", self.db())
            .env_remove("EDCARDS_CONFIG")
            .env_remove("HUGGINGFACEHUB_API_TOKEN")
            .env_remove("RUST_LOG");
        cmd
    }

    fn seed(&self) -> CardStore {
        let store = CardStore::open(self.db()).unwrap();
        let now = Utc::now();
        store
            .save(
                &NewCard::new(
                    "Transfer Learning",
                    "Reusing a trained model for a new task.",
                    vec!["Fine-tuning pretrained weights".into()],
                    "llama3-8b",
                    "en",
                )
                .with_timestamp(now - Duration::days(30)),
            )
            .unwrap();
        store
            .save(
                &NewCard::new(
                    "Redes Neurais",
                    "Modelos inspirados no cérebro.",
                    vec!["Funções de ativação não lineares".into()],
                    "llama3-8b",
                    "pt",
                )
                .with_timestamp(now),
            )
            .unwrap();
        store
    }
}

#[test]
fn list_on_empty_store() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cards found."));
}

#[test]
fn list_json_is_newest_first() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let output = sandbox
        .cmd()
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let cards: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let topics: Vec<&str> = cards
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["topic"].as_str().unwrap())
        .collect();
    assert_eq!(topics, vec!["Redes Neurais", "Transfer Learning"]);
}

#[test]
fn search_is_case_insensitive() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    sandbox
        .cmd()
        .args(["search", "TRANSFER", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transfer Learning"))
        .stdout(predicate::str::contains("Redes Neurais").not());
}

#[test]
fn stats_json() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let output = sandbox.cmd().args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_count"], 2);
    assert_eq!(stats["recent_count"], 1);
    assert_eq!(stats["count_by_model"]["llama3-8b"], 2);
    assert_eq!(stats["count_by_language"]["pt"], 1);
}

#[test]
fn show_and_delete() {
    let sandbox = Sandbox::new();
    let store = sandbox.seed();
    let id = store.get_all(1).unwrap()[0].id.to_string();

    sandbox
        .cmd()
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Redes Neurais"));

    sandbox.cmd().args(["delete", &id]).assert().success();

    sandbox
        .cmd()
        .args(["delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Card not found"));
    sandbox.cmd().args(["show", &id]).assert().failure();

    assert_eq!(store.get_statistics().total_count, 1);
}

#[test]
fn clear_with_yes() {
    let sandbox = Sandbox::new();
    let store = sandbox.seed();

    sandbox
        .cmd()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 card(s)"));
    assert!(store.get_all(10).unwrap().is_empty());

    sandbox
        .cmd()
        .args(["clear", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cards to clear."));
}

#[test]
fn clear_works_when_statistics_cannot_be_read() {
    let sandbox = Sandbox::new();
    let store = sandbox.seed();

    let conn = rusqlite::Connection::open(sandbox.db()).unwrap();
    conn.execute(
        "INSERT INTO cards (topic, summary, subtopics, model, language, timestamp)
         VALUES ('Odd', 's', '[]', X'00', 'en', '2026-01-01 00:00:00')",
        [],
    )
    .unwrap();
    assert_eq!(store.get_statistics().total_count, 0);

    sandbox
        .cmd()
        .args(["clear", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 3 card(s)"));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn clear_fails_loudly_on_a_broken_store() {
    let sandbox = Sandbox::new();
    std::fs::create_dir_all(sandbox.db()).unwrap();

    sandbox
        .cmd()
        .args(["clear", "-y"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No cards to clear").not());
}

#[test]
fn generate_without_token_is_an_auth_failure() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["generate", "Transfer Learning"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authorization failed"));

    let store = CardStore::open(sandbox.db()).unwrap();
    assert_eq!(store.get_statistics().total_count, 0);
}

#[test]
fn generate_rejects_out_of_range_temperature() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["generate", "GANs", "--temperature", "1.5", "--token", "hf_test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn init_then_config_roundtrip() {
    let sandbox = Sandbox::new();

    sandbox.cmd().arg("init").assert().success();
    assert!(sandbox.home().join(".edcards/config.toml").exists());
    assert!(sandbox.home().join(".edcards/cards.db").exists());

    sandbox.cmd().arg("init").assert().failure();

    sandbox
        .cmd()
        .args(["config", "generator.default_language", "pt"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["config", "generator.default_language"])
        .assert()
        .success()
        .stdout(predicate::str::diff("pt\n"));
}
