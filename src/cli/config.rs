//! Config file application

use super::Cli;

/// Apply config file defaults to CLI options
/// CLI flags always override config values
pub(super) fn apply_config_defaults(cli: &mut Cli, config: &transcript_md::config::Config) {
    // Boolean flags can only be switched on by config; there is no
    // --no-quiet style flag to switch them back off.
    if !cli.quiet && config.quiet_or_default() {
        cli.quiet = true;
    }
    if !cli.verbose && config.verbose_or_default() {
        cli.verbose = true;
    }
    if !cli.no_clobber && config.no_clobber_or_default() {
        cli.no_clobber = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use transcript_md::config::Config;

    #[test]
    fn test_config_switches_flags_on() {
        let mut cli = Cli::try_parse_from(["transcript-md", "a.html"]).unwrap();
        let config = Config {
            quiet: Some(true),
            no_clobber: Some(true),
            ..Default::default()
        };
        apply_config_defaults(&mut cli, &config);
        assert!(cli.quiet);
        assert!(cli.no_clobber);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_flag_wins_over_config() {
        let mut cli = Cli::try_parse_from(["transcript-md", "a.html", "-q"]).unwrap();
        let config = Config {
            quiet: Some(false),
            ..Default::default()
        };
        apply_config_defaults(&mut cli, &config);
        assert!(cli.quiet);
    }
}
