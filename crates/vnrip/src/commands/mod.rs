use vnrip_anm::{AnmArchive, AnmOptions, ThtxImageDecoder};
use vnrip_fmt::Registry;

pub mod extract;
pub mod formats;
pub mod list;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Extract images and resources from a file or a directory of files
    Extract(extract::ExtractArgs),
    /// Show the entry table of an ANM archive
    List(list::ListArgs),
    /// Show the available decoders in detection order
    Formats(formats::FormatsArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Extract(extract) => extract.handle(),
            Commands::List(list) => list.handle(),
            Commands::Formats(formats) => formats.handle(),
        }
    }
}

/// Every decoder the tool knows, in detection order
pub fn registry(options: AnmOptions) -> Registry {
    Registry::new()
        .with_archive(AnmArchive::new(options))
        .with_image(ThtxImageDecoder)
}
