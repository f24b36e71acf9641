mod common;

use assert_cmd::Command;
use common::{sample_records, spawn_stub_server, StubState};
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn script_command(home: &TempDir, base_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("racao_core_cli").unwrap();
    cmd.env("RACAO_CORE_CLI_SCRIPT", "1")
        .env("RACAO_CORE_HOME", home.path())
        .env("RACAO_API_URL", base_url)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn run_with_samples(input: &str) -> (StubState, assert_cmd::assert::Assert) {
    let state = StubState::with_records(sample_records());
    let base_url = spawn_stub_server(state.clone());
    let home = TempDir::new().unwrap();
    let assert = script_command(&home, &base_url).write_stdin(input).assert();
    (state, assert)
}

#[test]
fn list_shows_purchases_and_total() {
    let (_, assert) = run_with_samples("list\nexit\n");
    assert
        .success()
        .stdout(contains("3 compra(s) carregada(s)"))
        .stdout(contains("Premier"))
        .stdout(contains("10/03/2024"))
        .stdout(contains("R$ 25,50"))
        .stdout(contains("valor total gasto: R$ 77,50"));
}

#[test]
fn add_with_assignments_creates_a_purchase() {
    let (state, assert) = run_with_samples(
        "add marca=Golden quantidade=10,5 valor=89,90 data=2024-03-15\nlist março\n",
    );
    assert
        .success()
        .stdout(contains("Compra inserida com sucesso"))
        .stdout(contains("valor total gasto: R$ 115,40"));

    let records = state.records();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3]["marca"], "Golden");
    assert_eq!(records[3]["data"], "2024-03-15");
}

#[test]
fn invalid_fields_are_reported_without_a_request() {
    let (state, assert) =
        run_with_samples("add marca= quantidade=600 valor=1 data=2024-01-01\n");
    assert
        .success()
        .stdout(contains("Marca: Campo obrigatório"))
        .stdout(contains("Quantidade: Digite um valor abaixo de 500kg"));
    assert_eq!(state.records().len(), 3);
    assert!(state
        .requests()
        .iter()
        .all(|request| request.method == axum::http::Method::GET));
}

#[test]
fn rows_from_the_last_listing_can_be_edited_and_deleted() {
    let (state, assert) = run_with_samples("list\nedit #2 valor=50\nlist\ndelete #1\n");
    assert
        .success()
        .stdout(contains("Produto alterado com sucesso"))
        .stdout(contains("Produto excluído com sucesso"));

    let records = state.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record["_id"] != "b2"));
    let edited = records.iter().find(|record| record["_id"] == "c3").unwrap();
    assert_eq!(edited["valor"].as_f64(), Some(50.0));
    assert_eq!(edited["marca"], "Pedigree");
}

#[test]
fn filter_changes_the_default_view() {
    let (_, assert) = run_with_samples("months\nfilter março\ntotal\nfilter todos\ntotal\n");
    assert
        .success()
        .stdout(contains("Exibir todos"))
        .stdout(contains("Fevereiro 2024"))
        .stdout(contains("Filtro: Março 2024"))
        .stdout(contains("valor total gasto (Março 2024): R$ 25,50"))
        .stdout(contains("valor total gasto (Exibir todos): R$ 77,50"));
}

#[test]
fn unknown_months_and_rows_are_rejected() {
    let (_, assert) = run_with_samples("filter abril\ndelete #1\n");
    assert
        .success()
        .stdout(contains("Unknown month `abril`"))
        .stdout(contains("No row #1 in the last listing"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let (_, assert) = run_with_samples("lsit\n");
    assert
        .success()
        .stdout(contains("Unknown command `lsit`"))
        .stdout(contains("Suggestion: `list`?"));
}

#[test]
fn server_failures_do_not_stop_the_shell() {
    let state = StubState::with_records(sample_records());
    state.set_failing(true);
    let base_url = spawn_stub_server(state.clone());
    let home = TempDir::new().unwrap();

    script_command(&home, &base_url)
        .write_stdin("refresh\nversion\n")
        .assert()
        .success()
        .stdout(contains("Não foi possível carregar as compras"))
        .stdout(contains("Falha na comunicação com o servidor"))
        .stdout(contains("Racao Core"));
}

#[test]
fn config_set_is_persisted() {
    let state = StubState::new();
    let base_url = spawn_stub_server(state);
    let home = TempDir::new().unwrap();

    script_command(&home, &base_url)
        .write_stdin("config set price_max 8000\nconfig get price_max\n")
        .assert()
        .success()
        .stdout(contains("price_max set to 8000"))
        .stdout(contains("price_max = 8000"));

    let stored = std::fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(stored.contains("\"price_max\": 8000"));
    assert!(!stored.contains(&base_url));
}

#[test]
fn invalid_config_file_fails_startup() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.json"), "{ not json").unwrap();

    script_command(&home, "http://127.0.0.1:9")
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stderr(contains("Error:"))
        .stdout(predicate::str::is_empty());
}
