use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lottie_tgs::batch::ItemError;
use lottie_tgs::document::media_type;
use lottie_tgs::{BatchOpts, ConversionItem, TranscodeOpts};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lottie-tgs", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the metadata of Lottie files, one JSON object per line.
    Inspect(InspectArgs),
    /// Convert Lottie files into TGS stickers.
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input Lottie JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Media type to declare instead of the one implied by the file extension.
    #[arg(long)]
    media_type: Option<String>,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input Lottie JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory to write stickers into. Defaults to each input's directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Gzip compression level (0-9).
    #[arg(long, default_value_t = 6)]
    level: u32,

    /// Convert files in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Media type to declare instead of the one implied by the file extension.
    #[arg(long)]
    media_type: Option<String>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Convert(args) => cmd_convert(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct Upload {
    path: PathBuf,
    name: String,
    bytes: Vec<u8>,
    media_type: String,
}

fn read_upload(path: &Path, media_type_override: Option<&str>) -> anyhow::Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    let media_type = match media_type_override {
        Some(m) => m.to_string(),
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .map(media_type::from_extension)
            .unwrap_or_default()
            .to_string(),
    };
    Ok(Upload {
        path: path.to_path_buf(),
        name,
        bytes,
        media_type,
    })
}

fn report_error(name: &str, err: &ItemError) {
    eprintln!("{name}: {:?}: {}", err.kind, err.message);
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for path in &args.inputs {
        let upload = read_upload(path, args.media_type.as_deref())?;
        let line = match lottie_tgs::parse(&upload.bytes, &upload.media_type) {
            Ok(parsed) => serde_json::json!({
                "file": upload.name,
                "metadata": parsed.metadata,
            }),
            Err(err) => {
                failed += 1;
                serde_json::json!({
                    "file": upload.name,
                    "error": ItemError::from(&err),
                })
            }
        };
        println!("{line}");
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed to parse", args.inputs.len());
    }
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let uploads = args
        .inputs
        .iter()
        .map(|p| read_upload(p, args.media_type.as_deref()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut items: Vec<ConversionItem> = uploads
        .iter()
        .map(|u| ConversionItem::from_upload(&u.name, &u.bytes, &u.media_type))
        .collect();

    let mut failed = 0usize;
    for item in &items {
        if let (Some(err), None) = (item.error(), item.parsed()) {
            failed += 1;
            report_error(item.name(), err);
        }
    }

    let batch = BatchOpts {
        parallel: args.parallel,
        threads: args.threads,
    };
    let opts = TranscodeOpts {
        compression_level: args.level,
    };
    let outcomes = lottie_tgs::convert_all(&mut items, &batch, &opts)?;

    for outcome in outcomes {
        let upload = &uploads[outcome.index];
        match outcome.result {
            Ok(file) => {
                let dir = match &args.out_dir {
                    Some(dir) => dir.as_path(),
                    None => upload.path.parent().unwrap_or_else(|| Path::new(".")),
                };
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("create output dir '{}'", dir.display()))?;
                let out = dir.join(&file.file_name);
                std::fs::write(&out, &file.bytes)
                    .with_context(|| format!("write sticker '{}'", out.display()))?;
                eprintln!("wrote {}", out.display());
            }
            Err(err) => {
                failed += 1;
                report_error(&upload.name, &err);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed to convert", items.len());
    }
    Ok(())
}
