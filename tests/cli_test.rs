use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::TempDir;

mod common;

use common::{ALLOWANCE_FLOOR, BALANCE_TARGET, SPENDER, TOKEN, WALLET, WHALE};

fn funder(subcommand: &str) -> Command {
    let mut cmd = Command::new(cargo_bin!("funder"));
    cmd.arg(subcommand)
        .args(["--token", TOKEN])
        .args(["--whale", WHALE])
        .args(["--wallet", WALLET])
        .args(["--spender", SPENDER])
        .args(["--allowance-floor", &ALLOWANCE_FLOOR.to_string()])
        .args(["--balance-target", &BALANCE_TARGET.to_string()]);
    cmd
}

#[test]
fn test_simulated_fund_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = funder("fund");
    cmd.args(["--simulated", "--settle-ms", "0"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "\"balance\":\"{}\"",
            BALANCE_TARGET
        )))
        .stdout(predicate::str::contains(format!(
            "\"allowance\":\"{}\"",
            ALLOWANCE_FLOOR
        )))
        .stdout(predicate::str::contains("\"converged\":true"))
        .stderr(predicate::str::contains("funding converged"));

    Ok(())
}

#[test]
fn test_simulated_fund_claws_back_surplus() {
    let mut cmd = funder("fund");
    cmd.args(["--simulated", "--settle-ms", "0"])
        .args(["--simulated-balance", &(BALANCE_TARGET + 500).to_string()]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "\"balance\":\"{}\"",
            BALANCE_TARGET
        )))
        .stderr(predicate::str::contains("clawing back surplus"));
}

#[test]
fn test_simulated_status_reports_unconverged_wallet() {
    let mut cmd = funder("status");
    cmd.args(["--simulated", "--simulated-balance", "7"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"balance\":\"7\""))
        .stdout(predicate::str::contains("\"allowance\":\"0\""))
        .stdout(predicate::str::contains("\"converged\":false"));
}

#[test]
fn test_unreachable_node_exits_non_zero() {
    let mut cmd = funder("fund");
    cmd.args(["--rpc-url", "http://127.0.0.1:1"])
        .args(["--ready-attempts", "2", "--poll-ms", "10"]);

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("did not become ready after 2 attempts"));
}

#[test]
fn test_configuration_from_environment() {
    let mut cmd = Command::new(cargo_bin!("funder"));
    cmd.args(["fund", "--simulated"])
        .env("FUNDER_TOKEN", TOKEN)
        .env("FUNDER_WHALE", WHALE)
        .env("FUNDER_WALLET", WALLET)
        .env("FUNDER_SPENDER", SPENDER)
        .env("FUNDER_ALLOWANCE_FLOOR", "1000")
        .env("FUNDER_BALANCE_TARGET", "0x64")
        .env("FUNDER_SETTLE_MS", "0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"balance\":\"100\""))
        .stdout(predicate::str::contains("\"allowance_floor\":\"1000\""));
}

#[test]
fn test_configuration_from_dotenv_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut env_file = std::fs::File::create(dir.path().join(".env"))?;
    writeln!(env_file, "FUNDER_TOKEN={}", TOKEN)?;
    writeln!(env_file, "FUNDER_WHALE={}", WHALE)?;
    writeln!(env_file, "FUNDER_WALLET={}", WALLET)?;
    writeln!(env_file, "FUNDER_SPENDER={}", SPENDER)?;
    writeln!(env_file, "FUNDER_ALLOWANCE_FLOOR=5")?;
    writeln!(env_file, "FUNDER_BALANCE_TARGET=9")?;

    let mut cmd = Command::new(cargo_bin!("funder"));
    cmd.current_dir(dir.path())
        .args(["status", "--simulated"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"balance_target\":\"9\""));

    Ok(())
}

#[test]
fn test_invalid_address_is_rejected() {
    let mut cmd = Command::new(cargo_bin!("funder"));
    cmd.args(["status", "--token", "0xnot-an-address"])
        .args(["--whale", WHALE, "--wallet", WALLET, "--spender", SPENDER])
        .args(["--allowance-floor", "1", "--balance-target", "1"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("could not parse address"));
}

#[test]
fn test_self_funding_is_rejected() {
    let mut cmd = Command::new(cargo_bin!("funder"));
    cmd.args(["fund", "--simulated", "--token", TOKEN])
        .args(["--whale", WHALE, "--wallet", WHALE, "--spender", SPENDER])
        .args(["--allowance-floor", "1", "--balance-target", "1"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("same account"));
}
