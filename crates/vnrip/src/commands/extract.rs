use clap::Args;
use miette::{miette, Context, Result};
use std::{
    collections::HashSet,
    fs,
    io::{BufWriter, Write},
    path::{Component, Path, PathBuf},
};
use tracing::{info, warn};
use vnrip_anm::{AnmOptions, ErrorPolicy};
use vnrip_fmt::{Error, File, FileSaver, PixelGrid, Registry};
use walkdir::WalkDir;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input file, or a directory searched for input files
    #[arg(short, long, value_name = "PATH")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Use this decoder instead of detecting the format
    #[arg(long, value_name = "NAME")]
    format: Option<String>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Skip textures that fail to decode instead of stopping
    #[arg(long, default_value_t = false)]
    skip_corrupt: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let error_policy = if self.skip_corrupt {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        };
        let registry = super::registry(AnmOptions::builder().error_policy(error_policy).build());

        let walking = self.file.is_dir();
        let inputs = WalkDir::new(&self.file)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if inputs.is_empty() {
            return Err(miette!("no input files in {}", self.file.display()));
        }

        let mut written = 0;
        for input in inputs {
            written += self.extract(&registry, input.path(), walking)?;
        }
        info!("extracted {written} files");

        Ok(())
    }

    /// Unpack one input beneath its own directory, returning how many files were written
    fn extract(&self, registry: &Registry, path: &Path, walking: bool) -> Result<usize> {
        let mut file = File::open(path).context(format!("opening {}", path.display()))?;
        // Image decoders name their output after the input
        if let Some(name) = path.file_name() {
            file.name = name.to_string_lossy().into_owned();
        }

        let decoder = match &self.format {
            Some(name) => registry.by_name(name)?,
            None => match registry.detect(&mut file) {
                Ok(decoder) => decoder,
                Err(e @ Error::FormatNotRecognized { .. }) if walking => {
                    warn!("skipping: {e}");
                    return Ok(0);
                }
                Err(e) => return Err(e.into()),
            },
        };

        let target = self.target_for(path);
        info!("unpacking {} as {} into {}", path.display(), decoder.name(), target.display());

        let mut saver = DirectorySaver::new(target, self.overwrite);
        decoder
            .unpack(&mut file, &mut saver)
            .context(format!("unpacking {}", path.display()))?;

        Ok(saver.written())
    }

    /// `DIR/<path relative to the input root, without extension>`
    fn target_for(&self, path: &Path) -> PathBuf {
        let relative = match path.strip_prefix(&self.file) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => PathBuf::from(path.file_name().unwrap_or_default()),
        };
        self.directory.join(relative.with_extension(""))
    }
}

/// Writes decoded files beneath a root directory, images as PNG
///
/// Entries sharing a name within one run get a numbered suffix (`face (1).png`). Files left over from
/// earlier runs are only replaced with `overwrite`.
pub struct DirectorySaver {
    root: PathBuf,
    overwrite: bool,
    written: HashSet<PathBuf>,
}

impl DirectorySaver {
    pub fn new(root: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            root: root.into(),
            overwrite,
            written: HashSet::new(),
        }
    }

    pub fn written(&self) -> usize {
        self.written.len()
    }

    fn path_for(&self, file: &File) -> PathBuf {
        let path = self.root.join(sanitize(&file.name));
        let path = if file.is_image() {
            path.with_extension("png")
        } else {
            path
        };
        self.unique(path)
    }

    /// First of `path`, `stem (1).ext`, `stem (2).ext`, ... not yet written by this saver
    fn unique(&self, path: PathBuf) -> PathBuf {
        if !self.written.contains(&path) {
            return path;
        }

        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let extension = path.extension().map(|e| e.to_string_lossy());
        let mut counter = 1;
        loop {
            let name = match &extension {
                Some(extension) => format!("{stem} ({counter}).{extension}"),
                None => format!("{stem} ({counter})"),
            };
            let candidate = path.with_file_name(name);
            if !self.written.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, file: File) -> vnrip_fmt::Result<()> {
        if let Some(grid) = file.grid() {
            if grid.width() == 0 || grid.height() == 0 {
                warn!(
                    "skipping {}: image is {}x{}",
                    file.name,
                    grid.width(),
                    grid.height()
                );
                return Ok(());
            }
        }

        let path = self.path_for(&file);
        info!("writing {}", path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let out = if !self.overwrite {
            fs::File::create_new(&path)?
        } else {
            fs::File::create(&path)?
        };

        let mut out = BufWriter::new(out);
        match file.grid() {
            Some(grid) => write_png(&mut out, grid)?,
            None => out.write_all(file.stream.as_slice())?,
        }
        out.flush()?;

        self.written.insert(path);
        Ok(())
    }
}

fn write_png(out: impl Write, grid: &PixelGrid) -> vnrip_fmt::Result<()> {
    let png_error = |e: png::EncodingError| Error::CustomError(format!("PNG encoding error: {e}"));

    let mut encoder = png::Encoder::new(out, grid.width(), grid.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().map_err(png_error)?;
    writer.write_image_data(&grid.to_rgba()).map_err(png_error)?;
    writer.finish().map_err(png_error)
}

/// Turn an archive entry name into a relative path that stays beneath the target directory
pub fn sanitize(name: &str) -> PathBuf {
    let path = name
        .split(['/', '\\'])
        .map(Path::new)
        .flat_map(Path::components)
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect::<PathBuf>();

    if path.as_os_str().is_empty() {
        PathBuf::from("unnamed")
    } else {
        path
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::{fs, path::PathBuf};
    use vnrip_fmt::{Error, File, FileSaver, PixelGrid};

    use super::{sanitize, DirectorySaver, ExtractArgs};

    fn args(file: PathBuf, directory: PathBuf) -> ExtractArgs {
        ExtractArgs {
            file,
            directory,
            format: None,
            overwrite: false,
            skip_corrupt: false,
        }
    }

    /// A 2x1 BGRA4444 texture record
    fn thtx() -> Vec<u8> {
        let mut data = b"THTX".to_vec();
        for word in [0u16, 5, 2, 1] {
            data.extend_from_slice(&word.to_le_bytes());
        }
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&[0x0f, 0xf0, 0xf0, 0x0f]);
        data
    }

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize("face.png"), PathBuf::from("face.png"));
        assert_eq!(
            sanitize("data/face/face.png"),
            ["data", "face", "face.png"].iter().collect::<PathBuf>()
        );
    }

    #[test]
    fn sanitize_cannot_escape() {
        assert_eq!(
            sanitize("../../etc/shadow"),
            ["etc", "shadow"].iter().collect::<PathBuf>()
        );
        assert_eq!(
            sanitize("/abs/path.png"),
            ["abs", "path.png"].iter().collect::<PathBuf>()
        );
        assert_eq!(
            sanitize("..\\win\\.\\x.png"),
            ["win", "x.png"].iter().collect::<PathBuf>()
        );
        assert_eq!(sanitize(""), PathBuf::from("unnamed"));
        assert_eq!(sanitize("../.."), PathBuf::from("unnamed"));
    }

    #[test]
    fn repeated_names_get_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = DirectorySaver::new(dir.path(), false);

        saver.save(File::from_grid("face.png", PixelGrid::new(1, 1))).unwrap();
        saver.save(File::from_grid("face.png", PixelGrid::new(2, 2))).unwrap();
        saver.save(File::from_grid("face", PixelGrid::new(1, 1))).unwrap();
        saver.save(File::new("notes", b"a".to_vec())).unwrap();
        saver.save(File::new("notes", b"b".to_vec())).unwrap();

        assert_eq!(saver.written(), 5);
        for name in ["face.png", "face (1).png", "face (2).png", "notes", "notes (1)"] {
            assert!(dir.path().join(name).is_file(), "{name} was not written");
        }
        assert_eq!(fs::read(dir.path().join("notes (1)")).unwrap(), b"b");
    }

    #[test]
    fn empty_images_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = DirectorySaver::new(dir.path(), false);

        saver.save(File::from_grid("wide.png", PixelGrid::new(4, 0))).unwrap();
        saver.save(File::from_grid("tall.png", PixelGrid::new(0, 4))).unwrap();

        assert_eq!(saver.written(), 0);
        assert!(!dir.path().join("wide.png").exists());
        assert!(!dir.path().join("tall.png").exists());
    }

    #[test]
    fn existing_files_need_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("face.png"), b"old").unwrap();

        let mut saver = DirectorySaver::new(dir.path(), false);
        let result = saver.save(File::from_grid("face.png", PixelGrid::new(1, 1)));
        assert!(matches!(result, Err(Error::IOError(_))));
        assert_eq!(saver.written(), 0);

        let mut saver = DirectorySaver::new(dir.path(), true);
        saver.save(File::from_grid("face.png", PixelGrid::new(1, 1))).unwrap();
        assert_eq!(saver.written(), 1);
        assert!(fs::read(dir.path().join("face.png")).unwrap().starts_with(b"\x89PNG"));
    }

    #[test]
    fn target_mirrors_input_tree() {
        let walked = args(PathBuf::from("data"), PathBuf::from("out"));
        assert_eq!(
            walked.target_for(&["data", "stage1", "boss.anm"].iter().collect::<PathBuf>()),
            ["out", "stage1", "boss"].iter().collect::<PathBuf>()
        );

        let single = args(["data", "face.anm"].iter().collect(), PathBuf::from("out"));
        assert_eq!(
            single.target_for(&["data", "face.anm"].iter().collect::<PathBuf>()),
            ["out", "face"].iter().collect::<PathBuf>()
        );
    }

    #[test]
    fn directory_walk_skips_unrecognized_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("face.thtx"), thtx()).unwrap();
        fs::write(input.join("notes.txt"), b"nothing to see").unwrap();

        args(input.clone(), output.clone()).handle().unwrap();

        assert!(output.join("face").join("face.png").is_file());
        assert!(!output.join("notes").exists());

        let single = args(input.join("notes.txt"), output);
        assert!(single.handle().is_err());
    }
}
