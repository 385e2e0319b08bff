// CLI commands invoked through the binary's subcommands
pub mod seed;
