//! Library integration tests.

use depprobe::ProbeError;

#[test]
fn error_types_are_public() {
    let err = ProbeError::UnknownCapability("libfoo".into());
    assert!(err.to_string().contains("libfoo"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> depprobe::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use depprobe::cli::{normalize_args, Cli, Commands};
    use clap::Parser;

    let args = normalize_args(
        ["depprobe", "--with-openssl=/opt/local", "probe", "openssl"]
            .iter()
            .map(|s| s.to_string()),
    );
    let cli = Cli::parse_from(args);
    assert_eq!(cli.with.len(), 1);

    if let Some(Commands::Probe(args)) = cli.command {
        assert_eq!(args.name, "openssl");
    } else {
        panic!("Expected Probe command");
    }
}
