use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;
use vnrip_anm::{read_table, read_texture_header, TableEntry, TextureFormat, TextureHeader};
use vnrip_fmt::File;

#[derive(Args)]
pub struct ListArgs {
    /// An input ANM file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Print the table as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let mut file = File::open(&self.file).context(format!("opening {}", self.file.display()))?;
        let table = read_table(&mut file.stream).context("reading entry table")?;

        let textures = table
            .iter()
            .map(|entry| match entry.texture_offset {
                Some(offset) => read_texture_header(&mut file.stream, offset)
                    .map(Some)
                    .map_err(|e| e.to_string()),
                None => Ok(None),
            })
            .collect::<Vec<_>>();

        if self.json {
            let entries = table
                .iter()
                .zip(&textures)
                .map(|(entry, texture)| match texture {
                    Ok(header) => json!({ "entry": entry, "texture": header }),
                    Err(e) => json!({ "entry": entry, "texture": null, "error": e }),
                })
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
        } else {
            for (entry, texture) in table.iter().zip(&textures) {
                print_entry(entry, texture);
            }
        }

        Ok(())
    }
}

fn print_entry(entry: &TableEntry, texture: &core::result::Result<Option<TextureHeader>, String>) {
    print!("{:#08x}  {}", entry.start_offset.dimmed(), entry.name1.green());
    if !entry.name2.is_empty() {
        print!("  alpha {}", entry.name2.cyan());
    }
    println!(
        "  version {}  sprites {}  scripts {}",
        entry.version,
        entry.sprite_offsets.len(),
        entry.script_offsets.len()
    );

    match (entry.texture_offset, texture) {
        (Some(offset), Ok(Some(header))) => {
            let format = match TextureFormat::try_from(header.format) {
                Ok(format) => format!("{format:?}"),
                Err(_) => "unsupported".red().to_string(),
            };
            println!(
                "          texture at {:#x}: {}x{} format {} ({})",
                offset, header.width, header.height, header.format, format
            );
        }
        (_, Err(e)) => println!("          {}", e.red()),
        _ => println!("          {}", "no texture".dimmed()),
    }
}
