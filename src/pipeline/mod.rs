// End-to-end flows behind the CLI subcommands.

pub mod collect;
pub mod visualize;
