//! Smoke tests for the `schemaforge` binary's offline commands

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn schemaforge() -> Command {
    let mut cmd = Command::cargo_bin("schemaforge").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

fn shop_project(dir: &Path) -> PathBuf {
    write_json(
        dir,
        "shop.json",
        json!({
            "id": 3,
            "name": "Shop",
            "config": null,
            "other_config": null,
            "class_model": [],
            "nodes": {
                "nodes": [
                    {
                        "id": "u",
                        "type": "classNode",
                        "position": {"x": 0.0, "y": 0.0},
                        "data": {
                            "name": "User",
                            "attributes": [
                                {"name": "id", "type": "INT", "is_primary": true}
                            ]
                        }
                    },
                    {
                        "id": "o",
                        "type": "classNode",
                        "position": {"x": 300.0, "y": 0.0},
                        "data": {
                            "name": "Order",
                            "attributes": [
                                {"name": "id", "type": "INT", "is_primary": true},
                                {
                                    "name": "user_id",
                                    "type": "INT",
                                    "is_foreign": true,
                                    "foreign_key_class": "User",
                                    "foreign_key": "id"
                                }
                            ]
                        }
                    }
                ],
                "edges": [],
                "enums": []
            }
        }),
    )
}

#[test]
fn help_lists_commands() {
    schemaforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diagram"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn edges_are_derived_from_foreign_keys() {
    let dir = TempDir::new().unwrap();
    let file = shop_project(dir.path());

    schemaforge()
        .args(["diagram", "edges"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Order.user_id → User.id"))
        .stdout(predicate::str::contains("edge-o-u-user_id"));
}

#[test]
fn search_filters_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let file = shop_project(dir.path());

    schemaforge()
        .args(["diagram", "search"])
        .arg(&file)
        .arg("ORD")
        .assert()
        .success()
        .stdout(predicate::str::contains("Order"))
        .stdout(predicate::str::contains("User").not());
}

#[test]
fn export_writes_nodes_and_edges() {
    let dir = TempDir::new().unwrap();
    let file = shop_project(dir.path());
    let output = dir.path().join("diagram-interface.json");

    schemaforge()
        .args(["diagram", "export"])
        .arg(&file)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(written["edges"][0]["sourceHandle"], "fk-user_id");
    assert!(written.get("enums").is_none());
}

#[test]
fn check_passes_a_consistent_project() {
    let dir = TempDir::new().unwrap();
    let file = shop_project(dir.path());

    schemaforge()
        .args(["diagram", "check"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Diagram is valid"));
}

#[test]
fn check_fails_on_unresolved_foreign_key() {
    let dir = TempDir::new().unwrap();
    let file = write_json(
        dir.path(),
        "broken.json",
        json!({
            "nodes": [
                {
                    "id": "o",
                    "position": {"x": 0.0, "y": 0.0},
                    "data": {
                        "name": "Order",
                        "attributes": [
                            {"name": "id", "type": "INT", "is_primary": true},
                            {
                                "name": "coupon_id",
                                "type": "INT",
                                "is_foreign": true,
                                "foreign_key_class": "Coupon",
                                "foreign_key": "id"
                            }
                        ]
                    }
                }
            ],
            "edges": []
        }),
    );

    schemaforge()
        .args(["diagram", "check"])
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Coupon"));
}

#[test]
fn missing_file_is_reported() {
    schemaforge()
        .args(["diagram", "edges", "/nonexistent/shop.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to open"));
}
