use clap::Args;
use itertools::Itertools;
use miette::Result;
use vnrip_anm::AnmOptions;

#[derive(Args)]
pub struct FormatsArgs {}

impl FormatsArgs {
    pub fn handle(&self) -> Result<()> {
        let registry = super::registry(AnmOptions::default());
        println!("{}", registry.names().join("\n"));
        Ok(())
    }
}
