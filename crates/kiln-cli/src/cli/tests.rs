#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_start_defaults() {
        let cli = Cli::try_parse_from(["kiln", "start"]).unwrap();
        assert!(!cli.verbose);
        assert!(!cli.quiet);

        let Command::Start(args) = cli.command;
        assert_eq!(args.root, None);
        assert_eq!(args.port, None);
        assert_eq!(args.host, None);
    }

    #[test]
    fn test_start_with_all_options() {
        let cli = Cli::try_parse_from([
            "kiln",
            "start",
            "public",
            "--port",
            "3000",
            "--port-end",
            "3010",
            "--host",
            "0.0.0.0",
            "--config",
            "custom.json",
        ])
        .unwrap();

        let Command::Start(args) = cli.command;
        assert_eq!(args.root, Some(PathBuf::from("public")));
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.port_end, Some(3010));
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.config, Some(PathBuf::from("custom.json")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kiln", "start", "-q", "--no-color"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.no_color);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["kiln", "-v", "-q", "start"]).is_err());
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Cli::try_parse_from(["kiln", "start", "--port", "0"]).is_err());
        assert!(Cli::try_parse_from(["kiln", "start", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["kiln"]).is_err());
    }
}
