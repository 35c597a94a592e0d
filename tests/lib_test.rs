//! Library integration tests.

use prereqs::PrereqError;

#[test]
fn error_types_are_public() {
    let err = PrereqError::LedgerBusy {
        id: "cave-7".into(),
    };
    assert!(err.to_string().contains("cave-7"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> prereqs::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use prereqs::cli::{Cli, Commands};

    let cli = Cli::parse_from(["prereqs", "status", "C:/Games/Foo", "--id", "cave-7"]);

    if let Commands::Status(args) = cli.command {
        assert_eq!(args.id.as_deref(), Some("cave-7"));
    } else {
        panic!("Expected Status command");
    }
}

#[test]
fn descriptor_parses_catalog_payload() {
    use prereqs::catalog::{Arch, PrerequisiteDescriptor};

    let descriptor = PrerequisiteDescriptor::from_json(
        r#"{
            "fullName": "Microsoft Visual C++ 2015 Redistributable",
            "version": "14.0.24215",
            "arch": "amd64",
            "command": "vc_redist.x64.exe",
            "args": ["/install", "/quiet", "/norestart"],
            "elevate": true,
            "registryKeys": ["HKLM\\SOFTWARE\\Classes\\Installer\\Dependencies\\{d992c12e-cab2-426f-bde3-fb8c53950b0d}"],
            "dlls": ["vcruntime140.dll"],
            "exitCodes": [
                {"code": 1638, "success": true, "message": "Newer version already installed"},
                {"code": 3010, "success": true, "message": "Reboot required"}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(descriptor.arch, Arch::X64);
    assert!(descriptor.elevate);
    assert!(descriptor.exit_code(1638).unwrap().success);
}

#[test]
fn ledger_round_trips_through_store() {
    use prereqs::manifest::PrerequisiteRequest;
    use prereqs::state::{InstallationId, LedgerStore};

    let temp = tempfile::TempDir::new().unwrap();
    let store = LedgerStore::new(temp.path(), InstallationId::new("cave-7"));
    store.record_satisfied(["dx-june-2010"]).unwrap();

    let pending = store
        .pending(&[
            PrerequisiteRequest::new("dx-june-2010"),
            PrerequisiteRequest::new("vcredist-2010-x86"),
        ])
        .unwrap();
    assert_eq!(pending, vec![PrerequisiteRequest::new("vcredist-2010-x86")]);
}
