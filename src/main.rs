use clap::Parser;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use handscript::{
    error::ContextError,
    extraction::{extract_with_progress, PlaceholderExtractor},
    storage::{DirectoryNoteStore, NoteStore as _},
    validation::{mime_type_from_extension, validate_image_bytes},
    InkColor, PageRenderer, PaperBackground, RandomSampler, RendererConfiguration, StyleConfig,
};

/// Writes text onto a handwritten-looking page and saves it as a PNG image.
#[derive(Parser, Debug)]
#[command(version, long_about = None)]
#[command(group = clap::ArgGroup::new("source").required(true).args(["text", "input_path", "image_path"]))]
struct CliArguments {
    /// The text to write.
    #[arg(short = 't', long = "text", value_name = "text")]
    text: Option<String>,
    /// A text file to write, `-` reads the standard input.
    #[arg(short = 'i', long = "input", value_name = "text_file")]
    input_path: Option<PathBuf>,
    /// A PNG or JPG image whose text is extracted and written.
    #[arg(long = "image", value_name = "image_file")]
    image_path: Option<PathBuf>,
    #[arg(long = "ink", value_enum, default_value_t = InkColor::Blue)]
    ink_color: InkColor,
    #[arg(long = "paper", value_enum, default_value_t = PaperBackground::Ruled)]
    paper_background: PaperBackground,
    /// The path of the output PNG file.
    #[arg(short = 'o', long = "output", value_name = "png_file")]
    output_path: Option<PathBuf>,
    /// A JSON file configuring the font and the page layout.
    #[arg(short = 'c', long = "configuration", value_name = "json_file")]
    configuration_path: Option<PathBuf>,
    /// Makes the handwriting variations reproducible.
    #[arg(long = "seed")]
    seed: Option<u64>,
    /// A directory where the page is also stored as a note.
    #[arg(long = "store", value_name = "directory")]
    store_directory: Option<PathBuf>,
    /// The title of the stored note.
    #[arg(long = "title", default_value = "Handwritten note")]
    title: String,
    /// Increases the verbosity of the logs, may be repeated.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn main() {
    let arguments = CliArguments::parse();
    env_logger::builder()
        .filter_level(match arguments.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    if let Err(error) = fallible_main(arguments) {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main(arguments: CliArguments) -> Result<(), ContextError> {
    log::debug!("{:?}", arguments);
    if arguments.output_path.is_none() && arguments.store_directory.is_none() {
        return Err(ContextError::with_context(
            "Nowhere to put the page, provide an output file via `--output` or a directory via `--store`",
        ));
    }

    let text = read_text(&arguments)?;
    let configuration = match &arguments.configuration_path {
        Some(configuration_path) => RendererConfiguration::from_path(configuration_path)?,
        None => RendererConfiguration::default(),
    };
    let renderer = PageRenderer::new(configuration)?;
    let style = StyleConfig::new(arguments.ink_color, arguments.paper_background);

    let rendered_page = match arguments.seed {
        Some(seed) => {
            renderer.render_with_sampler(&text, &style, &mut RandomSampler::seeded(seed))?
        }
        None => renderer.render(&text, &style)?,
    };
    if rendered_page.truncated {
        log::warn!(
            "The text did not fit on the page, only the first {} lines were written",
            rendered_page.lines_painted
        );
    }

    if let Some(output_path) = &arguments.output_path {
        std::fs::write(output_path, &rendered_page.png).map_err(|error| {
            ContextError::with_error(
                format!("Failed to write the output file {:?}", output_path),
                &error,
            )
        })?;
        log::info!("Saved the page to the path: {:?}", output_path);
    }

    if let Some(store_directory) = &arguments.store_directory {
        let mut store = DirectoryNoteStore::open(store_directory)?;
        let note = store.save_note(
            &arguments.title,
            &rendered_page.png,
            Some(&mut |progress| log::debug!("Storing the note: {}%", progress)),
        )?;
        println!("{}", store.note_url(&note));
    }

    Ok(())
}

fn read_text(arguments: &CliArguments) -> Result<String, ContextError> {
    if let Some(text) = &arguments.text {
        return Ok(text.clone());
    }
    if let Some(input_path) = &arguments.input_path {
        return read_text_file(input_path);
    }
    if let Some(image_path) = &arguments.image_path {
        return extract_text_from_image(image_path);
    }

    Err(ContextError::with_context(
        "No text provided, you need to provide it via `--text`, `--input` or `--image`",
    ))
}

fn read_text_file(input_path: &Path) -> Result<String, ContextError> {
    if input_path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|error| ContextError::with_error("Failed to read the standard input", &error))?;
        return Ok(text);
    }

    std::fs::read_to_string(input_path).map_err(|error| {
        ContextError::with_error(format!("Failed to read the text file {:?}", input_path), &error)
    })
}

fn extract_text_from_image(image_path: &Path) -> Result<String, ContextError> {
    let image_bytes = std::fs::read(image_path).map_err(|error| {
        ContextError::with_error(format!("Failed to read the image {:?}", image_path), &error)
    })?;
    let mime_type = image_path
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(mime_type_from_extension)
        .unwrap_or("application/octet-stream");
    validate_image_bytes(mime_type, &image_bytes)
        .into_result()
        .map_err(|error| {
            ContextError::with_error(format!("Refused the image {:?}", image_path), &error)
        })?;

    extract_with_progress(&PlaceholderExtractor, &image_bytes, &mut |progress| {
        log::info!("Extracting the text: {}%", progress)
    })
}
